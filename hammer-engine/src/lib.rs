#![warn(missing_docs)]
//! Runtime half of the hammer live auction engine.
//!
//! Each live auction is owned by exactly one [`Session`]: the serialization
//! domain for that auction's mutable state. Bid submissions on one auction
//! are processed strictly one at a time under the session's lock, so the
//! "evaluate highest bid, then accept" sequence is race-free by
//! construction; different auctions share nothing and proceed concurrently.
//!
//! The [`Registry`] is the sole creator and destroyer of sessions: it loads
//! auctions from the store lazily on first interaction, hands out the same
//! session for concurrent lookups, and retires sessions once an auction has
//! closed and its last observer has gone. Observers attach through a
//! per-session `tokio::sync::watch` channel, which delivers the latest
//! auction snapshot to every subscriber: best-effort for intermediate
//! states, always eventually consistent with the authoritative state.

mod config;
mod error;
mod registry;
mod session;

pub use config::EngineConfig;
pub use error::{EngineError, SubmitError};
pub use registry::Registry;
pub use session::Session;
