use axum::http::StatusCode;
use axum_test::TestServer;
use hammer_axum::{AppState, JwtVerifier, generate_token, router};
use hammer_core::models::{AuctionSnapshot, AuctionStatus, Bid};
use hammer_engine::{EngineConfig, Registry};
use hammer_sqlite::{Db, config::SqliteConfig};
use serde_json::{Value, json};
use uuid::Uuid;

const SECRET: &str = "secret";

async fn test_server() -> anyhow::Result<TestServer> {
    let db = Db::open(&SqliteConfig::default()).await?;
    let registry = Registry::new(db, EngineConfig::default());
    let state = AppState::new(registry, JwtVerifier::from(SECRET));
    TestServer::new(router(state))
}

fn listing_body(base_price: i64, duration_minutes: u32) -> Value {
    json!({
        "item": {
            "name": "Vermeer-school oil sketch",
            "description": "Interior scene, unsigned, mid-restoration",
            "image_ref": "media/lot-17.jpg",
            "material": "oil on panel",
            "weight_grams": 850,
            "color": "umber"
        },
        "base_price": base_price,
        "duration_minutes": duration_minutes
    })
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn listing_then_bidding_round_trip() -> anyhow::Result<()> {
    let server = test_server().await?;
    let (seller_token, seller_id) = generate_token(SECRET, "Margaux", 1)?;
    let (bidder_token, bidder_id) = generate_token(SECRET, "Sam", 1)?;

    // The seller hands over a finalized listing opening immediately
    let created = server
        .post("/v0/auctions")
        .authorization_bearer(&seller_token)
        .json(&listing_body(1000, 30))
        .await;
    created.assert_status(StatusCode::CREATED);
    let snapshot = created.json::<AuctionSnapshot>();
    assert_eq!(snapshot.seller_id.to_string(), seller_id);
    assert_eq!(snapshot.status, AuctionStatus::Active);
    assert_eq!(snapshot.version, 1);
    assert!(snapshot.highest_bid.is_none());

    // A first bid at the base price is accepted
    let accepted = server
        .post(&format!("/v0/auctions/{}/bids", snapshot.auction_id))
        .authorization_bearer(&bidder_token)
        .json(&json!({ "amount": 1000 }))
        .await;
    accepted.assert_status(StatusCode::CREATED);
    let bid = accepted.json::<Bid>();
    assert_eq!(bid.amount, 1000);
    assert_eq!(bid.bidder_id.to_string(), bidder_id);
    assert_eq!(bid.bidder_name, "Sam");

    // The one-shot view reflects the accepted bid
    let current = server
        .get(&format!("/v0/auctions/{}", snapshot.auction_id))
        .await
        .json::<AuctionSnapshot>();
    assert_eq!(current.version, 2);
    assert_eq!(current.bid_count, 1);
    assert_eq!(current.highest_bid.map(|b| b.amount), Some(1000));
    assert_eq!(current.leaderboard.len(), 1);

    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn rejections_carry_a_machine_readable_kind() -> anyhow::Result<()> {
    let server = test_server().await?;
    let (seller_token, _) = generate_token(SECRET, "Margaux", 1)?;
    let (bidder_token, _) = generate_token(SECRET, "Sam", 1)?;

    let snapshot = server
        .post("/v0/auctions")
        .authorization_bearer(&seller_token)
        .json(&listing_body(1000, 30))
        .await
        .json::<AuctionSnapshot>();

    // Below the base price: rejected, with the minimum spelled out
    let too_low = server
        .post(&format!("/v0/auctions/{}/bids", snapshot.auction_id))
        .authorization_bearer(&bidder_token)
        .json(&json!({ "amount": 999 }))
        .await;
    too_low.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    let body = too_low.json::<Value>();
    assert_eq!(body["kind"], "bid_too_low");
    assert!(body["reason"].as_str().unwrap_or_default().contains("1000"));

    // The seller cannot bid on their own auction
    let own_goal = server
        .post(&format!("/v0/auctions/{}/bids", snapshot.auction_id))
        .authorization_bearer(&seller_token)
        .json(&json!({ "amount": 2000 }))
        .await;
    own_goal.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(own_goal.json::<Value>()["kind"], "seller_cannot_bid");

    // A rejected bid leaves the auction untouched
    let current = server
        .get(&format!("/v0/auctions/{}", snapshot.auction_id))
        .await
        .json::<AuctionSnapshot>();
    assert_eq!(current.version, 1);
    assert_eq!(current.bid_count, 0);

    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn invalid_listings_are_rejected() -> anyhow::Result<()> {
    let server = test_server().await?;
    let (seller_token, _) = generate_token(SECRET, "Margaux", 1)?;

    let free = server
        .post("/v0/auctions")
        .authorization_bearer(&seller_token)
        .json(&listing_body(0, 30))
        .await;
    free.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(free.json::<Value>()["kind"], "non_positive_base_price");

    let instant = server
        .post("/v0/auctions")
        .authorization_bearer(&seller_token)
        .json(&listing_body(1000, 0))
        .await;
    instant.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(instant.json::<Value>()["kind"], "zero_duration");

    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn unknown_auctions_are_not_found() -> anyhow::Result<()> {
    let server = test_server().await?;
    let (token, _) = generate_token(SECRET, "Sam", 1)?;
    let missing = Uuid::new_v4();

    server
        .get(&format!("/v0/auctions/{missing}"))
        .await
        .assert_status(StatusCode::NOT_FOUND);

    server
        .get(&format!("/v0/auctions/{missing}/live"))
        .await
        .assert_status(StatusCode::NOT_FOUND);

    server
        .post(&format!("/v0/auctions/{missing}/bids"))
        .authorization_bearer(&token)
        .json(&json!({ "amount": 1000 }))
        .await
        .assert_status(StatusCode::NOT_FOUND);

    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn bids_require_a_verified_identity() -> anyhow::Result<()> {
    let server = test_server().await?;
    let (seller_token, _) = generate_token(SECRET, "Margaux", 1)?;

    let snapshot = server
        .post("/v0/auctions")
        .authorization_bearer(&seller_token)
        .json(&listing_body(1000, 30))
        .await
        .json::<AuctionSnapshot>();

    // No token at all
    server
        .post(&format!("/v0/auctions/{}/bids", snapshot.auction_id))
        .json(&json!({ "amount": 1000 }))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);

    // A token signed with the wrong key
    let (forged, _) = generate_token("not-the-secret", "Mallory", 1)?;
    server
        .post(&format!("/v0/auctions/{}/bids", snapshot.auction_id))
        .authorization_bearer(&forged)
        .json(&json!({ "amount": 1000 }))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);

    // Listings need an identity too
    server
        .post("/v0/auctions")
        .json(&listing_body(1000, 30))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);

    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn health_check_is_open() -> anyhow::Result<()> {
    let server = test_server().await?;
    let response = server.get("/health").await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["status"], "ok");
    Ok(())
}
