//! Leaderboard projection.
//!
//! The leaderboard is the ranked list of distinct bidders' best offers for
//! one auction. It is derived, never stored: the projection runs over the
//! bid list after every accepted bid, before the new state is broadcast.
//! O(bids) per recomputation, which is fine for auctions bounded in duration
//! and volume.

use super::{Bid, BidderId};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// How many distinct bidders the leaderboard shows.
pub const LEADERBOARD_SIZE: usize = 5;

/// One bidder's best accepted bid, as shown on the leaderboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    /// The bidder this entry belongs to
    pub bidder_id: BidderId,
    /// Display name of the bidder
    pub bidder_name: String,
    /// The bidder's best amount
    pub amount: i64,
    /// Sequence number of the bid holding that amount
    pub bid_seq: u64,
}

/// Project the leaderboard from an auction's bid list.
///
/// Keeps the maximum amount per distinct bidder (earliest acceptance wins a
/// tie), sorts descending by amount with ties broken by earliest acceptance,
/// and truncates to [`LEADERBOARD_SIZE`].
pub fn project(bids: &[Bid]) -> Vec<LeaderboardEntry> {
    let mut best: FxHashMap<BidderId, &Bid> = FxHashMap::default();
    for bid in bids {
        best.entry(bid.bidder_id)
            .and_modify(|current| {
                if bid.amount > current.amount {
                    *current = bid;
                }
            })
            .or_insert(bid);
    }

    let mut entries: Vec<LeaderboardEntry> = best
        .into_values()
        .map(|bid| LeaderboardEntry {
            bidder_id: bid.bidder_id,
            bidder_name: bid.bidder_name.clone(),
            amount: bid.amount,
            bid_seq: bid.seq,
        })
        .collect();

    entries.sort_by(|a, b| b.amount.cmp(&a.amount).then(a.bid_seq.cmp(&b.bid_seq)));
    entries.truncate(LEADERBOARD_SIZE);
    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn bid(seq: u64, bidder_id: BidderId, name: &str, amount: i64) -> Bid {
        Bid {
            seq,
            bidder_id,
            bidder_name: name.into(),
            amount,
            accepted_at: datetime!(2026-01-01 12:00 UTC) + time::Duration::seconds(seq as i64),
        }
    }

    #[test]
    fn empty_bid_list_projects_empty() {
        assert!(project(&[]).is_empty());
    }

    #[test]
    fn keeps_only_best_bid_per_bidder() {
        let a = BidderId(uuid::Uuid::new_v4());
        let b = BidderId(uuid::Uuid::new_v4());
        let bids = vec![
            bid(0, a, "alice", 1000),
            bid(1, b, "bob", 1200),
            bid(2, a, "alice", 1800),
        ];
        let board = project(&bids);
        assert_eq!(board.len(), 2);
        assert_eq!(board[0].bidder_id, a);
        assert_eq!(board[0].amount, 1800);
        assert_eq!(board[1].bidder_id, b);
        assert_eq!(board[1].amount, 1200);
    }

    #[test]
    fn truncates_to_top_five() {
        let bids: Vec<Bid> = (0..8)
            .map(|i| {
                bid(
                    i,
                    BidderId(uuid::Uuid::new_v4()),
                    &format!("bidder{i}"),
                    100 + i as i64,
                )
            })
            .collect();
        let board = project(&bids);
        assert_eq!(board.len(), LEADERBOARD_SIZE);
        // descending by amount
        assert_eq!(board[0].amount, 107);
        assert_eq!(board[4].amount, 103);
    }

    #[test]
    fn ordering_is_stable_for_equal_amounts() {
        // equal amounts cannot occur within one auction's accepted bids, but
        // the projection itself is total: earliest acceptance ranks first
        let a = BidderId(uuid::Uuid::new_v4());
        let b = BidderId(uuid::Uuid::new_v4());
        let bids = vec![bid(0, a, "alice", 500), bid(1, b, "bob", 500)];
        let board = project(&bids);
        assert_eq!(board[0].bidder_id, a);
        assert_eq!(board[1].bidder_id, b);
    }
}
