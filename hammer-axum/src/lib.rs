#![warn(missing_docs)]
//! HTTP and SSE transport for the live auction engine.
//!
//! Three inbound operations (join, leave, submit a bid) map onto the web
//! as one SSE stream per observer (connect is `join`, disconnect is
//! `leave`) and a JSON POST for bids. Outbound, every observer receives
//! `snapshot` events carrying the full auction state; a rejected bid is
//! answered synchronously to the submitter only and never broadcast.
//!
//! Bidder identity comes exclusively from verified JWT claims (subject is
//! the bidder id, a custom claim carries the display name); the request
//! payload never names the bidder.

use axum::{Json, Router, http::header, routing};
use hammer_core::ports::AuctionStore;
use hammer_engine::Registry;
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors;

pub mod config;
mod routes;
mod utils;

use config::HttpConfig;
pub use utils::{Bidder, CustomClaims, JwtVerifier, Now, generate_token};

/// Shared state for all request handlers.
pub struct AppState<S: AuctionStore> {
    registry: Arc<Registry<S>>,
    jwt: JwtVerifier,
}

impl<S: AuctionStore> AppState<S> {
    /// Bundle the engine registry and the JWT verification key.
    pub fn new(registry: Arc<Registry<S>>, jwt: JwtVerifier) -> Self {
        Self { registry, jwt }
    }
}

impl<S: AuctionStore> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            registry: self.registry.clone(),
            jwt: self.jwt.clone(),
        }
    }
}

/// Response for the health check endpoint
#[derive(Serialize)]
struct HealthResponse {
    status: String,
}

/// Simple health check endpoint
async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

/// Construct the full API router with the given state.
pub fn router<S: AuctionStore>(state: AppState<S>) -> Router {
    // To allow for web app access, we use a permissive CORS policy. Notably,
    // this strips any implicit authorization, making this a pretty decent policy.
    let policy = cors::CorsLayer::new()
        .allow_origin(cors::Any)
        .allow_methods(cors::Any)
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    Router::new()
        .route("/health", routing::get(health_check))
        .nest("/v0/auctions", routes::router())
        .layer(policy)
        .with_state(state)
}

/// Starts the HTTP server with the provided configuration.
pub async fn start_server<S: AuctionStore>(
    config: HttpConfig,
    state: AppState<S>,
) -> Result<(), std::io::Error> {
    let listener = tokio::net::TcpListener::bind(config.bind_address).await?;

    tracing::info!("Listening for requests on {}", listener.local_addr()?);

    axum::serve(listener, router(state)).await
}
