use crate::models::{Auction, AuctionId, Bid};
use std::future::Future;
use thiserror::Error;
use time::OffsetDateTime;

/// The persistence layer detected a write it has already applied.
///
/// `(auction_id, seq)` is unique, so this can only fire if two processes (or
/// a retried write) raced for the same sequence number. Within one process
/// the session serializes appends, so a conflict is treated as an internal
/// fault, not a user-facing outcome.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("bid sequence already written")]
pub struct BidConflict;

/// Durable record of auctions and their bid history.
///
/// The engine is the only caller: it loads an auction once when a session is
/// created and writes through for every accepted bid and close. The in-memory
/// session state is authoritative while it lives: a failed write is logged
/// and caught up later, never allowed to roll back an already-broadcast
/// acceptance.
pub trait AuctionStore: Clone + Send + Sync + 'static {
    /// Error type for store operations
    type Error: std::error::Error + Send + Sync + 'static;

    /// Persist a freshly finalized listing.
    fn create_auction(
        &self,
        auction: Auction,
    ) -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Load an auction and its full bid history, or `None` if unknown.
    fn load_auction(
        &self,
        auction_id: AuctionId,
    ) -> impl Future<Output = Result<Option<Auction>, Self::Error>> + Send;

    /// Append one accepted bid to an auction's history.
    ///
    /// # Returns
    ///
    /// - `Ok(Ok(()))` if the bid was written
    /// - `Ok(Err(BidConflict))` if `(auction_id, seq)` already exists
    /// - `Err` for any other store failure
    fn append_bid(
        &self,
        auction_id: AuctionId,
        bid: Bid,
    ) -> impl Future<Output = Result<Result<(), BidConflict>, Self::Error>> + Send;

    /// Record that an auction's bidding window has ended.
    ///
    /// Idempotent: marking an already-closed auction is a no-op.
    fn mark_closed(
        &self,
        auction_id: AuctionId,
        closed_at: OffsetDateTime,
    ) -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// List auctions whose window has elapsed but whose close has not been
    /// recorded yet.
    ///
    /// Used by the sweeper to surface closes for auctions nobody is
    /// interacting with, and to catch up closes that failed to persist.
    fn list_expired(
        &self,
        now: OffsetDateTime,
    ) -> impl Future<Output = Result<Vec<AuctionId>, Self::Error>> + Send;
}
