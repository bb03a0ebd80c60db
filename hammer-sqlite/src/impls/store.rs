use crate::{
    Db,
    types::{AuctionRow, BidRow, DateTime},
};
use hammer_core::{
    models::{Auction, AuctionId, Bid},
    ports::{AuctionStore, BidConflict},
};
use time::OffsetDateTime;

impl AuctionStore for Db {
    type Error = sqlx::Error;

    async fn create_auction(&self, auction: Auction) -> Result<(), Self::Error> {
        let mut tx = self.writer.begin().await?;

        sqlx::query(
            r#"
            insert into
                auctions (id, seller_id, seller_name, item, base_price, opens_at, closes_at, duration_minutes, closed_at)
            values
                (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(auction.id.to_string())
        .bind(auction.seller_id.to_string())
        .bind(&auction.seller_name)
        .bind(serde_json::to_string(&auction.item).expect("infallible"))
        .bind(auction.base_price)
        .bind(DateTime::from(auction.opens_at))
        .bind(DateTime::from(auction.closes_at()))
        .bind(auction.duration_minutes as i64)
        .bind(auction.closed_at.map(DateTime::from))
        .execute(&mut *tx)
        .await?;

        // a freshly finalized listing has no bids, but a full record
        // round-trips regardless
        for bid in &auction.bids {
            insert_bid(&mut *tx, auction.id, bid).await?;
        }

        tx.commit().await
    }

    async fn load_auction(&self, auction_id: AuctionId) -> Result<Option<Auction>, Self::Error> {
        let row = sqlx::query_as::<_, AuctionRow>(
            r#"
            select
                id, seller_id, seller_name, item, base_price, opens_at, duration_minutes, closed_at
            from
                auctions
            where
                id = ?1
            "#,
        )
        .bind(auction_id.to_string())
        .fetch_optional(&self.reader)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let bids = sqlx::query_as::<_, BidRow>(
            r#"
            select
                seq, bidder_id, bidder_name, amount, accepted_at
            from
                bids
            where
                auction_id = ?1
            order by
                seq
            "#,
        )
        .bind(auction_id.to_string())
        .fetch_all(&self.reader)
        .await?;

        row.into_auction(bids).map(Some)
    }

    async fn append_bid(
        &self,
        auction_id: AuctionId,
        bid: Bid,
    ) -> Result<Result<(), BidConflict>, Self::Error> {
        match insert_bid(&self.writer, auction_id, &bid).await {
            Ok(()) => Ok(Ok(())),
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => Ok(Err(BidConflict)),
            Err(error) => Err(error),
        }
    }

    async fn mark_closed(
        &self,
        auction_id: AuctionId,
        closed_at: OffsetDateTime,
    ) -> Result<(), Self::Error> {
        sqlx::query(
            r#"
            update auctions
            set
                closed_at = ?1
            where
                id = ?2
                and closed_at is null
            "#,
        )
        .bind(DateTime::from(closed_at))
        .bind(auction_id.to_string())
        .execute(&self.writer)
        .await?;

        Ok(())
    }

    async fn list_expired(&self, now: OffsetDateTime) -> Result<Vec<AuctionId>, Self::Error> {
        let ids = sqlx::query_scalar::<_, String>(
            r#"
            select
                id
            from
                auctions
            where
                closed_at is null
                and closes_at <= ?1
            "#,
        )
        .bind(DateTime::from(now))
        .fetch_all(&self.reader)
        .await?;

        ids.into_iter()
            .map(|id| {
                id.parse::<AuctionId>()
                    .map_err(|e| sqlx::Error::Decode(Box::new(e)))
            })
            .collect()
    }
}

async fn insert_bid<'e, E>(executor: E, auction_id: AuctionId, bid: &Bid) -> Result<(), sqlx::Error>
where
    E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
{
    sqlx::query(
        r#"
        insert into
            bids (auction_id, seq, bidder_id, bidder_name, amount, accepted_at)
        values
            (?1, ?2, ?3, ?4, ?5, ?6)
        "#,
    )
    .bind(auction_id.to_string())
    .bind(bid.seq as i64)
    .bind(bid.bidder_id.to_string())
    .bind(&bid.bidder_name)
    .bind(bid.amount)
    .bind(DateTime::from(bid.accepted_at))
    .execute(executor)
    .await?;

    Ok(())
}
