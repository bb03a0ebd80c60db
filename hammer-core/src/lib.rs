#![warn(missing_docs)]
//! Core domain for the hammer live auction engine.
//!
//! An auction is a timed competitive sale of a single item: the seller lists
//! the item with a base price, a start time, and a duration; buyers submit
//! competing bids while the auction is active; everyone observing the auction
//! sees the current highest bid and a leaderboard of the best offers.
//!
//! This crate holds the pieces of that system that are pure data and pure
//! logic: the domain models, the bid acceptance rule, the leaderboard
//! projection, and the port traits that adapters (storage, transport)
//! implement. It performs no I/O and owns no mutable state; the runtime
//! pieces live in `hammer-engine`.

/// Core domain models for the auction system.
///
/// The models in this module are primarily data structures with minimal
/// business logic, following the principles of the hexagonal architecture to
/// separate domain entities from their persistence and processing
/// implementations. The two exceptions are deliberate: the bid acceptance
/// rule lives on [`models::Auction`] and the leaderboard projection lives in
/// [`models::leaderboard`], because both are pure functions of auction state.
pub mod models;

/// Interface traits for the auction system.
///
/// This module contains the "ports" in the hexagonal architecture pattern.
/// These traits define the contract between the domain logic and external
/// adapters (such as databases) without specifying implementation details.
pub mod ports;
