use super::{AuctionId, Bid, BidderId, ItemSnapshot};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::{Duration, OffsetDateTime};

/// Lifecycle status of an auction, derived from the wall clock and the
/// stored schedule.
///
/// Transitions only move forward: `Scheduled → Active → Closed`. There is no
/// stored state machine; every operation derives the status from the schedule
/// at its own timestamp, so an idle process cannot hold an auction open past
/// its end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuctionStatus {
    /// The start time has not been reached yet; no bids are accepted
    Scheduled,
    /// The auction is open for bidding
    Active,
    /// The auction has ended; the bid list is immutable
    Closed,
}

/// A timed competitive sale of one item.
///
/// Everything except `bids` and `closed_at` is fixed when the seller
/// finalizes the listing. The bid list is append-only and strictly increasing
/// in amount; `closed_at` records when the close was first observed and made
/// durable, and is informational; the authoritative close instant is always
/// `closes_at()`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Auction {
    /// Unique identifier of this auction
    pub id: AuctionId,
    /// The seller who listed the item; sellers cannot bid on their own auction
    pub seller_id: BidderId,
    /// Display name of the seller
    pub seller_name: String,
    /// Immutable snapshot of the listed item
    pub item: ItemSnapshot,
    /// Price floor for the first bid, in integer currency units; always positive
    pub base_price: i64,
    /// Scheduled start of the bidding window
    #[serde(with = "time::serde::rfc3339")]
    pub opens_at: OffsetDateTime,
    /// Length of the bidding window, in minutes; always positive
    pub duration_minutes: u32,
    /// Accepted bids, ordered by acceptance (and therefore by amount)
    pub bids: Vec<Bid>,
    /// When the close was recorded, if it has been
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub closed_at: Option<OffsetDateTime>,
}

impl Auction {
    /// Construct a fresh listing, checking the listing invariants.
    ///
    /// The catalog collaborator validates the payload before it reaches the
    /// engine, but the two invariants the engine itself depends on (positive
    /// base price, positive duration) are re-checked here.
    pub fn new_listing(
        id: AuctionId,
        seller_id: BidderId,
        seller_name: String,
        item: ItemSnapshot,
        base_price: i64,
        opens_at: OffsetDateTime,
        duration_minutes: u32,
    ) -> Result<Self, ListingError> {
        if base_price <= 0 {
            return Err(ListingError::NonPositiveBasePrice);
        }
        if duration_minutes == 0 {
            return Err(ListingError::ZeroDuration);
        }
        Ok(Self {
            id,
            seller_id,
            seller_name,
            item,
            base_price,
            opens_at,
            duration_minutes,
            bids: Vec::new(),
            closed_at: None,
        })
    }

    /// The instant the bidding window ends.
    pub fn closes_at(&self) -> OffsetDateTime {
        self.opens_at + Duration::minutes(self.duration_minutes as i64)
    }

    /// Derive the lifecycle status as of `now`.
    ///
    /// A recorded close is sticky: once `closed_at` is set the auction is
    /// `Closed` regardless of the clock, so status never moves backwards.
    pub fn status_at(&self, now: OffsetDateTime) -> AuctionStatus {
        if self.closed_at.is_some() || now >= self.closes_at() {
            AuctionStatus::Closed
        } else if now < self.opens_at {
            AuctionStatus::Scheduled
        } else {
            AuctionStatus::Active
        }
    }

    /// The current highest accepted bid, if any.
    ///
    /// Because accepted amounts are strictly increasing, this is simply the
    /// last element of the bid list.
    pub fn highest_bid(&self) -> Option<&Bid> {
        self.bids.last()
    }

    /// The sequence number the next accepted bid will take.
    pub fn next_seq(&self) -> u64 {
        self.bids.last().map(|b| b.seq + 1).unwrap_or(0)
    }

    /// The bid acceptance rule.
    ///
    /// Evaluates, in order: the lifecycle status (strictly before any amount
    /// rule, which resolves the expiry race in favor of the clock), the
    /// seller restriction, amount sanity, and the price floor. The floor is
    /// meet-or-exceed against the base price while no bids exist, and
    /// strictly-exceed against the current highest bid afterwards: an
    /// equal-to-highest bid is always rejected.
    ///
    /// This is a pure function of the auction state; the session applies it
    /// and the state mutation under one lock so two racing bids are always
    /// evaluated one against the result of the other.
    pub fn check_bid(
        &self,
        bidder_id: BidderId,
        amount: i64,
        now: OffsetDateTime,
    ) -> Result<(), BidRejection> {
        if self.status_at(now) != AuctionStatus::Active {
            return Err(BidRejection::AuctionNotActive);
        }
        if bidder_id == self.seller_id {
            return Err(BidRejection::SellerCannotBid);
        }
        if amount <= 0 {
            return Err(BidRejection::InvalidAmount);
        }
        match self.highest_bid() {
            None if amount >= self.base_price => Ok(()),
            None => Err(BidRejection::BidTooLow {
                minimum: self.base_price,
            }),
            Some(highest) if amount > highest.amount => Ok(()),
            Some(highest) => Err(BidRejection::BidTooLow {
                minimum: highest.amount.saturating_add(1),
            }),
        }
    }
}

/// The ways a listing can violate the engine's own invariants.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ListingError {
    /// The base price must be a positive amount
    #[error("base price must be positive")]
    NonPositiveBasePrice,
    /// The bidding window must be at least one minute long
    #[error("duration must be positive")]
    ZeroDuration,
}

impl ListingError {
    /// Stable machine-readable tag for transport payloads.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NonPositiveBasePrice => "non_positive_base_price",
            Self::ZeroDuration => "zero_duration",
        }
    }
}

/// The ways a proposed bid can be rejected.
///
/// These are expected, recoverable, user-facing outcomes: they are returned
/// to the submitting client only, never broadcast to other observers, and a
/// rejection leaves the auction state untouched.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BidRejection {
    /// The auction is not currently accepting bids
    #[error("the auction is not currently active")]
    AuctionNotActive,
    /// Sellers cannot bid on their own auction
    #[error("the seller cannot bid on their own auction")]
    SellerCannotBid,
    /// The amount does not meet the current price floor
    #[error("the bid must be at least {minimum}")]
    BidTooLow {
        /// The smallest amount that would currently be accepted
        minimum: i64,
    },
    /// The amount is not a positive number
    #[error("the bid amount must be a positive number")]
    InvalidAmount,
}

impl BidRejection {
    /// Stable machine-readable tag for transport payloads.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::AuctionNotActive => "auction_not_active",
            Self::SellerCannotBid => "seller_cannot_bid",
            Self::BidTooLow { .. } => "bid_too_low",
            Self::InvalidAmount => "invalid_amount",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn item() -> ItemSnapshot {
        ItemSnapshot {
            name: "brass candlestick".into(),
            description: "victorian, slightly dented".into(),
            image_ref: "img/candlestick.jpg".into(),
            material: "brass".into(),
            weight_grams: 740,
            color: "gold".into(),
        }
    }

    fn listing(base_price: i64) -> Auction {
        Auction::new_listing(
            AuctionId(uuid::Uuid::new_v4()),
            BidderId(uuid::Uuid::new_v4()),
            "sally".into(),
            item(),
            base_price,
            datetime!(2026-01-01 12:00 UTC),
            60,
        )
        .unwrap()
    }

    fn accepted(auction: &Auction, amount: i64, at: OffsetDateTime) -> Bid {
        Bid {
            seq: auction.next_seq(),
            bidder_id: BidderId(uuid::Uuid::new_v4()),
            bidder_name: "bidder".into(),
            amount,
            accepted_at: at,
        }
    }

    #[test]
    fn listing_invariants() {
        let a = listing(50);
        assert_eq!(a.base_price, 50);
        assert!(
            Auction::new_listing(
                a.id,
                a.seller_id,
                "sally".into(),
                item(),
                0,
                a.opens_at,
                60
            ) == Err(ListingError::NonPositiveBasePrice)
        );
        assert!(
            Auction::new_listing(
                a.id,
                a.seller_id,
                "sally".into(),
                item(),
                50,
                a.opens_at,
                0
            ) == Err(ListingError::ZeroDuration)
        );
    }

    #[test]
    fn status_follows_schedule() {
        let a = listing(50);
        assert_eq!(
            a.status_at(datetime!(2026-01-01 11:59 UTC)),
            AuctionStatus::Scheduled
        );
        assert_eq!(
            a.status_at(datetime!(2026-01-01 12:00 UTC)),
            AuctionStatus::Active
        );
        // the exact end instant is already closed
        assert_eq!(
            a.status_at(datetime!(2026-01-01 13:00 UTC)),
            AuctionStatus::Closed
        );
    }

    #[test]
    fn recorded_close_is_sticky() {
        let mut a = listing(50);
        a.closed_at = Some(datetime!(2026-01-01 12:30 UTC));
        assert_eq!(
            a.status_at(datetime!(2026-01-01 12:45 UTC)),
            AuctionStatus::Closed
        );
    }

    #[test]
    fn first_bid_meets_base_price() {
        let a = listing(50);
        let now = datetime!(2026-01-01 12:10 UTC);
        let bidder = BidderId(uuid::Uuid::new_v4());
        assert_eq!(a.check_bid(bidder, 50, now), Ok(()));
        assert_eq!(
            a.check_bid(bidder, 49, now),
            Err(BidRejection::BidTooLow { minimum: 50 })
        );
    }

    #[test]
    fn later_bids_strictly_improve() {
        let mut a = listing(50);
        let now = datetime!(2026-01-01 12:10 UTC);
        a.bids.push(accepted(&a, 100, now));
        let bidder = BidderId(uuid::Uuid::new_v4());
        assert_eq!(
            a.check_bid(bidder, 100, now),
            Err(BidRejection::BidTooLow { minimum: 101 })
        );
        assert_eq!(a.check_bid(bidder, 101, now), Ok(()));
    }

    #[test]
    fn maximal_highest_bid_cannot_be_improved() {
        let mut a = listing(50);
        let now = datetime!(2026-01-01 12:10 UTC);
        a.bids.push(accepted(&a, i64::MAX, now));
        let bidder = BidderId(uuid::Uuid::new_v4());
        assert_eq!(
            a.check_bid(bidder, i64::MAX, now),
            Err(BidRejection::BidTooLow { minimum: i64::MAX })
        );
    }

    #[test]
    fn seller_cannot_bid() {
        let a = listing(50);
        let now = datetime!(2026-01-01 12:10 UTC);
        assert_eq!(
            a.check_bid(a.seller_id, 1000, now),
            Err(BidRejection::SellerCannotBid)
        );
    }

    #[test]
    fn amount_must_be_positive() {
        let a = listing(50);
        let now = datetime!(2026-01-01 12:10 UTC);
        let bidder = BidderId(uuid::Uuid::new_v4());
        assert_eq!(a.check_bid(bidder, 0, now), Err(BidRejection::InvalidAmount));
        assert_eq!(
            a.check_bid(bidder, -5, now),
            Err(BidRejection::InvalidAmount)
        );
    }

    #[test]
    fn status_is_checked_before_amount() {
        let a = listing(50);
        // would be a perfectly good amount, but the window has elapsed
        let bidder = BidderId(uuid::Uuid::new_v4());
        assert_eq!(
            a.check_bid(bidder, 1000, datetime!(2026-01-01 13:00 UTC)),
            Err(BidRejection::AuctionNotActive)
        );
        assert_eq!(
            a.check_bid(bidder, 1000, datetime!(2026-01-01 11:00 UTC)),
            Err(BidRejection::AuctionNotActive)
        );
    }
}
