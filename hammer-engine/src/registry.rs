use crate::{EngineConfig, EngineError, Session, SubmitError};
use dashmap::DashMap;
use hammer_core::{
    models::{Auction, AuctionId, AuctionSnapshot, Bid, BidderId},
    ports::AuctionStore,
};
use rustc_hash::FxBuildHasher;
use std::sync::Arc;
use time::OffsetDateTime;
use tokio::{sync::watch, task::JoinHandle};
use tracing::{Instrument as _, Level, event, span};

/// The single authoritative owner of "which auctions are live in memory".
///
/// Sessions are created lazily on first interaction (loading the auction
/// from the store) and retired by the sweep once the auction has closed and
/// nobody has observed it for the configured grace period. Lookup is a
/// sharded map; creation for a never-before-seen id is serialized through
/// one async lock with a double-check, so concurrent first-joins produce
/// exactly one session per auction.
pub struct Registry<S: AuctionStore> {
    store: S,
    config: EngineConfig,
    sessions: DashMap<AuctionId, Arc<Session<S>>, FxBuildHasher>,
    creation: tokio::sync::Mutex<()>,
}

impl<S: AuctionStore> Registry<S> {
    /// Build a registry over the given store.
    pub fn new(store: S, config: EngineConfig) -> Arc<Self> {
        Arc::new(Self {
            store,
            config,
            sessions: DashMap::default(),
            creation: tokio::sync::Mutex::new(()),
        })
    }

    /// The underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Persist a finalized listing handed over by the catalog collaborator.
    ///
    /// No session is created here; the first join or bid will load it.
    pub async fn create_auction(&self, auction: Auction) -> Result<(), S::Error> {
        event!(Level::INFO, auction_id = %auction.id, seller_id = %auction.seller_id, "auction listed");
        self.store.create_auction(auction).await
    }

    /// Attach an observer to an auction: returns the current snapshot and
    /// the subscription receiver. Dropping the receiver is `leave`.
    pub async fn join(
        &self,
        auction_id: AuctionId,
        now: OffsetDateTime,
    ) -> Result<(AuctionSnapshot, watch::Receiver<AuctionSnapshot>), EngineError<S::Error>> {
        let session = self.get_or_create(auction_id, now).await?;
        Ok(session.join(now).await)
    }

    /// Take a one-shot snapshot of an auction without subscribing.
    pub async fn snapshot(
        &self,
        auction_id: AuctionId,
        now: OffsetDateTime,
    ) -> Result<AuctionSnapshot, EngineError<S::Error>> {
        let session = self.get_or_create(auction_id, now).await?;
        Ok(session.snapshot(now).await)
    }

    /// Route a bid submission to the auction's session.
    pub async fn submit_bid(
        &self,
        auction_id: AuctionId,
        bidder_id: BidderId,
        bidder_name: String,
        amount: i64,
        now: OffsetDateTime,
    ) -> Result<Bid, SubmitError<S::Error>> {
        let session = self
            .get_or_create(auction_id, now)
            .await
            .map_err(SubmitError::from)?;
        Ok(session.submit(bidder_id, bidder_name, amount, now).await?)
    }

    /// Number of sessions currently live in memory.
    pub fn live_sessions(&self) -> usize {
        self.sessions.len()
    }

    async fn get_or_create(
        &self,
        auction_id: AuctionId,
        now: OffsetDateTime,
    ) -> Result<Arc<Session<S>>, EngineError<S::Error>> {
        if let Some(session) = self.sessions.get(&auction_id) {
            return Ok(session.clone());
        }

        let _guard = self.creation.lock().await;
        // somebody else may have created it while we waited for the lock
        if let Some(session) = self.sessions.get(&auction_id) {
            return Ok(session.clone());
        }

        let auction = self
            .store
            .load_auction(auction_id)
            .await
            .map_err(EngineError::Store)?
            .ok_or(EngineError::NotFound)?;
        let session = Arc::new(Session::new(auction, self.store.clone(), now));
        self.sessions.insert(auction_id, session.clone());
        event!(Level::DEBUG, %auction_id, "session created");
        Ok(session)
    }

    /// One pass of proactive maintenance.
    ///
    /// Closes expired auctions among the live sessions (so idle observers
    /// see the closed state without waiting for the next bid attempt),
    /// retires sessions that have been closed and unobserved past the grace
    /// period, and records closes for expired auctions nobody has loaded,
    /// which also catches up close marks that previously failed to persist.
    pub async fn sweep(&self, now: OffsetDateTime) {
        let live: Vec<_> = self
            .sessions
            .iter()
            .map(|entry| (*entry.key(), entry.value().clone()))
            .collect();

        for (auction_id, session) in live {
            session.poll_close(now).await;
            if session.retirable(now, self.config.close_grace).await {
                // re-check observer count under the shard lock; a racing
                // join that slipped past anyway just recreates the session
                // from the store on its next operation
                let removed = self
                    .sessions
                    .remove_if(&auction_id, |_, s| {
                        Arc::ptr_eq(s, &session) && s.observer_count() == 0
                    })
                    .is_some();
                if removed {
                    event!(Level::DEBUG, %auction_id, "session retired");
                }
            }
        }

        match self.store.list_expired(now).await {
            Ok(expired) => {
                for auction_id in expired {
                    if let Err(error) = self.store.mark_closed(auction_id, now).await {
                        event!(Level::ERROR, %auction_id, %error, "failed to record auction close");
                    }
                }
            }
            Err(error) => {
                event!(Level::ERROR, %error, "failed to list expired auctions");
            }
        }
    }

    /// Run [`Registry::sweep`] forever at the configured interval.
    pub fn spawn_sweeper(self: &Arc<Self>) -> JoinHandle<()> {
        let registry = Arc::clone(self);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(registry.config.sweep_every);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                let sweep = span!(Level::DEBUG, "sweep");
                registry
                    .sweep(OffsetDateTime::now_utc())
                    .instrument(sweep)
                    .await;
            }
        })
    }
}
