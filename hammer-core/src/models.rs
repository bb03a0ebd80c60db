mod auction;
mod bid;
mod ids;
mod item;
pub mod leaderboard;
mod snapshot;

pub use auction::{Auction, AuctionStatus, BidRejection, ListingError};
pub use bid::Bid;
pub use ids::{AuctionId, BidderId};
pub use item::ItemSnapshot;
pub use leaderboard::LeaderboardEntry;
pub use snapshot::AuctionSnapshot;

macro_rules! uuid_wrapper {
    ($struct:ident, $doc:literal) => {
        #[doc = $doc]
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            serde::Serialize,
            serde::Deserialize,
        )]
        #[serde(transparent)]
        #[repr(transparent)]
        pub struct $struct(pub uuid::Uuid);

        impl From<uuid::Uuid> for $struct {
            fn from(value: uuid::Uuid) -> Self {
                Self(value)
            }
        }

        impl From<$struct> for uuid::Uuid {
            fn from(value: $struct) -> Self {
                value.0
            }
        }

        impl std::str::FromStr for $struct {
            type Err = <uuid::Uuid as std::str::FromStr>::Err;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(s.parse()?))
            }
        }

        impl std::fmt::Display for $struct {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                self.0.fmt(f)
            }
        }
    };
}

pub(crate) use uuid_wrapper;
