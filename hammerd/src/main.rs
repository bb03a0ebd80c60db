use hammer_axum::{AppState, JwtVerifier, generate_token, start_server};
use hammer_engine::Registry;
use hammer_sqlite::Db;
use hammerd::{AppConfig, Cli};
use tokio::select;
use tracing_subscriber::{layer::SubscriberExt as _, util::SubscriberInitExt as _};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // By convention, we leverage `tracing` to instrument and log various
    // operations throughout this project.
    // Accordingly, we likely want to subscribe to these events so we can
    // write them to stdio and possibly some durable location.
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Parse CLI args
    let cli = Cli::import()?;

    // If requested, mint some bidder credentials and exit. Useful for
    // exercising the API with external tools.
    if let Some(n) = cli.mint {
        for i in 1..=n {
            let (jwt, id) = generate_token(&cli.secret, &format!("bidder-{i}"), 365)?;
            println!("Bidder({}):\n\tUUID: {}\n\tJWT: {}\n", i, id, jwt);
        }
        return Ok(());
    }

    // Create config with proper layering of CLI args
    let AppConfig {
        server,
        database,
        engine,
    } = AppConfig::load(&cli)?;

    // Open the database and stand up the session registry over it
    let db = Db::open(&database).await?;
    let registry = Registry::new(db, engine);

    // Proactive maintenance: close expired auctions, retire idle sessions
    let sweeper = registry.spawn_sweeper();

    let state = AppState::new(registry, JwtVerifier::from(&cli.secret));
    let server_task = tokio::spawn(async move { start_server(server, state).await });

    select! {
        r = server_task => r??,
        r = sweeper => r?,
    }

    Ok(())
}
