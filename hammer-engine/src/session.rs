use hammer_core::{
    models::{Auction, AuctionSnapshot, AuctionStatus, Bid, BidRejection, BidderId},
    ports::AuctionStore,
};
use time::OffsetDateTime;
use tokio::sync::{Mutex, watch};
use tracing::{Level, event};

/// The runtime owner of one auction's live state.
///
/// A session is the serialization domain for its auction: the auction state
/// lives behind a single async mutex, and every operation
/// that reads or mutates it goes through that lock. The critical section
/// (validate, append, project, publish) is CPU-only, so submissions are
/// ordered, short, and never block on I/O. Persistence is dispatched after
/// the in-memory commit.
///
/// The session doubles as the broadcast hub for its auction: observers hold
/// `watch::Receiver`s on the session's snapshot channel. `watch` keeps only
/// the latest value, which is exactly the delivery contract: a slow observer
/// may skip intermediate states but always sees the current one, and
/// broadcast order matches acceptance order because snapshots are published
/// under the session lock.
pub struct Session<S: AuctionStore> {
    store: S,
    state: Mutex<SessionState>,
    events: watch::Sender<AuctionSnapshot>,
}

struct SessionState {
    auction: Auction,
    /// Status as of the last snapshot published on the channel
    published_status: AuctionStatus,
    /// When this session first observed the auction closed
    closed_seen: Option<OffsetDateTime>,
}

impl<S: AuctionStore> Session<S> {
    /// Wrap a loaded auction in a live session.
    pub(crate) fn new(auction: Auction, store: S, now: OffsetDateTime) -> Self {
        let published_status = auction.status_at(now);
        let closed_seen = match published_status {
            AuctionStatus::Closed => Some(now),
            _ => None,
        };
        let (events, _) = watch::channel(AuctionSnapshot::of(&auction, now));
        Self {
            store,
            state: Mutex::new(SessionState {
                auction,
                published_status,
                closed_seen,
            }),
            events,
        }
    }

    /// Attach an observer: returns the current snapshot and a receiver that
    /// will yield every subsequent published snapshot (latest-wins).
    ///
    /// Leaving is dropping the receiver; that is idempotent by construction
    /// and detaching an already-gone observer is a no-op.
    pub async fn join(
        &self,
        now: OffsetDateTime,
    ) -> (AuctionSnapshot, watch::Receiver<AuctionSnapshot>) {
        let mut state = self.state.lock().await;
        self.refresh(&mut state, now);
        let snapshot = AuctionSnapshot::of(&state.auction, now);
        (snapshot, self.events.subscribe())
    }

    /// Take a one-shot snapshot without subscribing.
    pub async fn snapshot(&self, now: OffsetDateTime) -> AuctionSnapshot {
        let mut state = self.state.lock().await;
        self.refresh(&mut state, now);
        AuctionSnapshot::of(&state.auction, now)
    }

    /// Submit a bid against this auction.
    ///
    /// Runs the acceptance rule and the state mutation atomically under the
    /// session lock: two racing submissions are serialized, and the second is
    /// evaluated against a state that includes the first. On acceptance the
    /// new snapshot is published to all observers before the store write is
    /// dispatched; a rejection changes nothing and is seen only by the
    /// caller.
    pub async fn submit(
        &self,
        bidder_id: BidderId,
        bidder_name: String,
        amount: i64,
        now: OffsetDateTime,
    ) -> Result<Bid, BidRejection> {
        let mut state = self.state.lock().await;
        self.refresh(&mut state, now);

        if let Err(rejection) = state.auction.check_bid(bidder_id, amount, now) {
            event!(Level::DEBUG, auction_id = %state.auction.id, %bidder_id, amount, kind = rejection.kind(), "bid rejected");
            return Err(rejection);
        }

        let bid = Bid {
            seq: state.auction.next_seq(),
            bidder_id,
            bidder_name,
            amount,
            accepted_at: now,
        };
        state.auction.bids.push(bid.clone());
        self.events
            .send_replace(AuctionSnapshot::of(&state.auction, now));

        // durability is caught up off the critical path; the in-memory state
        // stays authoritative even if this write fails
        let store = self.store.clone();
        let auction_id = state.auction.id;
        let record = bid.clone();
        tokio::spawn(async move {
            let seq = record.seq;
            match store.append_bid(auction_id, record).await {
                Ok(Ok(())) => {}
                Ok(Err(conflict)) => {
                    event!(Level::ERROR, %auction_id, seq, %conflict, "bid write conflict")
                }
                Err(error) => {
                    event!(Level::ERROR, %auction_id, seq, %error, "failed to persist accepted bid")
                }
            }
        });

        Ok(bid)
    }

    /// Evaluate the close transition as of `now`, notifying observers if it
    /// just happened. Returns whether this call performed the transition.
    pub async fn poll_close(&self, now: OffsetDateTime) -> bool {
        let mut state = self.state.lock().await;
        let was_closed = state.closed_seen.is_some();
        self.refresh(&mut state, now);
        !was_closed && state.closed_seen.is_some()
    }

    /// Number of currently attached observers.
    pub fn observer_count(&self) -> usize {
        self.events.receiver_count()
    }

    /// Whether this session may be destroyed: closed, unobserved, and past
    /// the grace period since the close was observed.
    pub async fn retirable(&self, now: OffsetDateTime, grace: std::time::Duration) -> bool {
        let state = self.state.lock().await;
        let grace = time::Duration::try_from(grace).unwrap_or(time::Duration::MAX);
        state
            .closed_seen
            .is_some_and(|seen| now - seen >= grace)
            && self.events.receiver_count() == 0
    }

    /// Publish any lifecycle transition the schedule has reached by `now`.
    ///
    /// Status only moves forward, so an unchanged status means the channel
    /// is current. Opening publishes the active snapshot; closing publishes
    /// the closed snapshot and dispatches the durable close mark. Runs at
    /// the top of every operation, so the first interaction after a boundary
    /// surfaces the transition; the sweeper calls it proactively for
    /// auctions nobody is interacting with.
    fn refresh(&self, state: &mut SessionState, now: OffsetDateTime) {
        let status = state.auction.status_at(now);
        if status == state.published_status {
            return;
        }
        state.published_status = status;

        if status == AuctionStatus::Active {
            self.events
                .send_replace(AuctionSnapshot::of(&state.auction, now));
            event!(Level::INFO, auction_id = %state.auction.id, "auction opened");
            return;
        }

        let closes_at = state.auction.closes_at();
        let already_recorded = state.auction.closed_at.is_some();
        state.auction.closed_at.get_or_insert(closes_at);
        state.closed_seen = Some(now);
        self.events
            .send_replace(AuctionSnapshot::of(&state.auction, now));
        event!(Level::INFO, auction_id = %state.auction.id, "auction closed");

        if !already_recorded {
            let store = self.store.clone();
            let auction_id = state.auction.id;
            tokio::spawn(async move {
                if let Err(error) = store.mark_closed(auction_id, closes_at).await {
                    event!(Level::ERROR, %auction_id, %error, "failed to record auction close");
                }
            });
        }
    }
}
