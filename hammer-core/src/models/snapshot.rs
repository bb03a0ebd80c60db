use super::{Auction, AuctionId, AuctionStatus, Bid, BidderId, ItemSnapshot, LeaderboardEntry};
use super::leaderboard;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// The full current state of an auction, as delivered to observers.
///
/// A snapshot is sent on `join` and after every accepted bid (and on close).
/// Carrying the full state rather than a delta avoids partial-update bugs on
/// the client; `version` is auction-local and monotonically increasing, so an
/// observer that suspects it missed an update can compare versions and
/// re-`join` for a fresh snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuctionSnapshot {
    /// The auction this snapshot describes
    pub auction_id: AuctionId,
    /// The seller who listed the item
    pub seller_id: BidderId,
    /// Display name of the seller
    pub seller_name: String,
    /// Immutable snapshot of the listed item
    pub item: ItemSnapshot,
    /// Price floor for the first bid
    pub base_price: i64,
    /// Scheduled start of the bidding window
    #[serde(with = "time::serde::rfc3339")]
    pub opens_at: OffsetDateTime,
    /// Scheduled end of the bidding window
    #[serde(with = "time::serde::rfc3339")]
    pub closes_at: OffsetDateTime,
    /// Lifecycle status at the time the snapshot was taken
    pub status: AuctionStatus,
    /// Monotonically increasing state version, bumped on every accepted bid
    /// and on status transitions. Derived from the bid count and the
    /// lifecycle stage, so it never regresses across process restarts or
    /// session recreation.
    pub version: u64,
    /// Total number of accepted bids
    pub bid_count: u64,
    /// The current highest accepted bid, if any
    pub highest_bid: Option<Bid>,
    /// Ranked best offers per distinct bidder
    pub leaderboard: Vec<LeaderboardEntry>,
}

impl AuctionSnapshot {
    /// Take a snapshot of `auction` as of `now`.
    ///
    /// The version is `bid_count` plus the lifecycle stage (0 while
    /// scheduled, 1 once active, 2 once closed): bids are only accepted
    /// while active and the status only moves forward, so the version
    /// increases by one on every accepted bid and on every transition, and
    /// any two snapshots of the same auction compare consistently no matter
    /// which session produced them.
    pub fn of(auction: &Auction, now: OffsetDateTime) -> Self {
        let status = auction.status_at(now);
        let stage = match status {
            AuctionStatus::Scheduled => 0,
            AuctionStatus::Active => 1,
            AuctionStatus::Closed => 2,
        };
        Self {
            auction_id: auction.id,
            seller_id: auction.seller_id,
            seller_name: auction.seller_name.clone(),
            item: auction.item.clone(),
            base_price: auction.base_price,
            opens_at: auction.opens_at,
            closes_at: auction.closes_at(),
            status,
            version: auction.bids.len() as u64 + stage,
            bid_count: auction.bids.len() as u64,
            highest_bid: auction.highest_bid().cloned(),
            leaderboard: leaderboard::project(&auction.bids),
        }
    }
}
