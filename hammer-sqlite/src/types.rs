//! Type definitions for the SQLite implementation.
//!
//! Public types cover what callers need to interoperate with the store
//! (currently just [`DateTime`]); the row structs used for database mapping
//! are internal.

use hammer_core::models::{Auction, AuctionId, Bid, ItemSnapshot};

mod datetime;
pub use datetime::DateTime;

#[derive(sqlx::FromRow)]
pub(crate) struct AuctionRow {
    pub id: String,
    pub seller_id: String,
    pub seller_name: String,
    pub item: String,
    pub base_price: i64,
    pub opens_at: DateTime,
    pub duration_minutes: i64,
    pub closed_at: Option<DateTime>,
}

#[derive(sqlx::FromRow)]
pub(crate) struct BidRow {
    pub seq: i64,
    pub bidder_id: String,
    pub bidder_name: String,
    pub amount: i64,
    pub accepted_at: DateTime,
}

fn decode_err(error: impl std::error::Error + Send + Sync + 'static) -> sqlx::Error {
    sqlx::Error::Decode(Box::new(error))
}

impl AuctionRow {
    pub(crate) fn into_auction(self, bids: Vec<BidRow>) -> Result<Auction, sqlx::Error> {
        let item: ItemSnapshot = serde_json::from_str(&self.item).map_err(decode_err)?;
        let bids = bids
            .into_iter()
            .map(BidRow::into_bid)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Auction {
            id: self.id.parse::<AuctionId>().map_err(decode_err)?,
            seller_id: self.seller_id.parse().map_err(decode_err)?,
            seller_name: self.seller_name,
            item,
            base_price: self.base_price,
            opens_at: self.opens_at.into(),
            duration_minutes: u32::try_from(self.duration_minutes).map_err(decode_err)?,
            bids,
            closed_at: self.closed_at.map(Into::into),
        })
    }
}

impl BidRow {
    pub(crate) fn into_bid(self) -> Result<Bid, sqlx::Error> {
        Ok(Bid {
            seq: u64::try_from(self.seq).map_err(decode_err)?,
            bidder_id: self.bidder_id.parse().map_err(decode_err)?,
            bidder_name: self.bidder_name,
            amount: self.amount,
            accepted_at: self.accepted_at.into(),
        })
    }
}
