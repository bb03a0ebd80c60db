use super::BidderId;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// A single accepted offer against an auction.
///
/// Bids are created only by the acceptance rule inside an auction session and
/// are immutable from then on. Within one auction, `seq` is assigned
/// monotonically in acceptance order, so `(auction_id, seq)` identifies a bid
/// globally and the bid list is totally ordered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bid {
    /// Auction-local sequence number, increasing in acceptance order
    pub seq: u64,
    /// The bidder who placed this bid
    pub bidder_id: BidderId,
    /// Display name of the bidder, resolved by the identity collaborator
    pub bidder_name: String,
    /// Offered amount, in integer currency units
    pub amount: i64,
    /// When the engine accepted the bid
    #[serde(with = "time::serde::rfc3339")]
    pub accepted_at: OffsetDateTime,
}
