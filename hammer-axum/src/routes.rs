use crate::{
    AppState,
    utils::{Bidder, Now},
};
use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{
        IntoResponse, Response, Sse,
        sse::{Event, KeepAlive},
    },
    routing,
};
use hammer_core::{
    models::{Auction, AuctionId, AuctionSnapshot, ItemSnapshot},
    ports::AuctionStore,
};
use hammer_engine::{EngineError, SubmitError};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tokio_stream::{StreamExt as _, wrappers::WatchStream};
use tracing::{Level, event};
use uuid::Uuid;

pub fn router<S: AuctionStore>() -> Router<AppState<S>> {
    Router::new()
        // Hand over a finalized listing from the catalog
        .route("/", routing::post(create_auction))
        // One-shot view of an auction
        .route("/{auction_id}", routing::get(get_auction))
        // Subscribe to state broadcasts; disconnecting leaves the room
        .route("/{auction_id}/live", routing::get(live_stream))
        // Place a bid
        .route("/{auction_id}/bids", routing::post(submit_bid))
}

/// A finalized listing, as handed over by the catalog collaborator.
#[derive(Deserialize)]
struct CreateAuctionRequest {
    item: ItemSnapshot,
    base_price: i64,
    /// Start of the bidding window; defaults to the time of the request
    #[serde(default, with = "time::serde::rfc3339::option")]
    opens_at: Option<OffsetDateTime>,
    duration_minutes: u32,
}

#[derive(Deserialize)]
struct BidRequest {
    amount: i64,
}

/// Body returned to the submitter when a bid or listing is rejected.
///
/// `kind` is a stable machine-readable discriminant; `reason` is the
/// human-readable message.
#[derive(Serialize)]
struct RejectionBody {
    kind: &'static str,
    reason: String,
}

async fn create_auction<S: AuctionStore>(
    State(state): State<AppState<S>>,
    bidder: Bidder,
    Now(now): Now,
    Json(input): Json<CreateAuctionRequest>,
) -> Response {
    let auction = match Auction::new_listing(
        Uuid::new_v4().into(),
        bidder.id,
        bidder.name,
        input.item,
        input.base_price,
        input.opens_at.unwrap_or(now),
        input.duration_minutes,
    ) {
        Ok(auction) => auction,
        Err(error) => {
            return (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(RejectionBody {
                    kind: error.kind(),
                    reason: error.to_string(),
                }),
            )
                .into_response();
        }
    };

    let snapshot = AuctionSnapshot::of(&auction, now);
    if let Err(error) = state.registry.create_auction(auction).await {
        event!(Level::ERROR, ?error);
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }

    (StatusCode::CREATED, Json(snapshot)).into_response()
}

async fn get_auction<S: AuctionStore>(
    State(state): State<AppState<S>>,
    Path(auction_id): Path<AuctionId>,
    Now(now): Now,
) -> Result<Json<AuctionSnapshot>, StatusCode> {
    let snapshot = state
        .registry
        .snapshot(auction_id, now)
        .await
        .map_err(|error| match error {
            EngineError::NotFound => StatusCode::NOT_FOUND,
            EngineError::Store(error) => {
                event!(Level::ERROR, ?error);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        })?;

    Ok(Json(snapshot))
}

async fn live_stream<S: AuctionStore>(
    State(state): State<AppState<S>>,
    Path(auction_id): Path<AuctionId>,
    Now(now): Now,
) -> Result<Sse<impl tokio_stream::Stream<Item = Result<Event, axum::Error>>>, StatusCode> {
    let (_, receiver) = state
        .registry
        .join(auction_id, now)
        .await
        .map_err(|error| match error {
            EngineError::NotFound => StatusCode::NOT_FOUND,
            EngineError::Store(error) => {
                event!(Level::ERROR, ?error);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        })?;

    // The watch stream yields the current snapshot immediately, then the
    // latest state after each change; intermediate states may be skipped.
    let stream = WatchStream::new(receiver)
        .map(|snapshot| Event::default().event("snapshot").json_data(&snapshot));

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}

async fn submit_bid<S: AuctionStore>(
    State(state): State<AppState<S>>,
    Path(auction_id): Path<AuctionId>,
    bidder: Bidder,
    Now(now): Now,
    Json(input): Json<BidRequest>,
) -> Response {
    let result = state
        .registry
        .submit_bid(auction_id, bidder.id, bidder.name, input.amount, now)
        .await;

    match result {
        Ok(bid) => (StatusCode::CREATED, Json(bid)).into_response(),
        Err(SubmitError::Rejected(rejection)) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(RejectionBody {
                kind: rejection.kind(),
                reason: rejection.to_string(),
            }),
        )
            .into_response(),
        Err(SubmitError::NotFound) => StatusCode::NOT_FOUND.into_response(),
        Err(SubmitError::Store(error)) => {
            event!(Level::ERROR, ?error);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
