use mimalloc::MiMalloc;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use quoter::api::QuoteApi;
use quoter::config::Config;
use quoter::db::QuoteStorage;
use quoter::service::{CoinFlip, QuoteService};
use quoter::{QuoterState, quoter_router};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let cfg = Config::load()?;

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cfg.basic.loglevel.clone()));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_level(true)
                .with_target(false),
        )
        .init();

    let coin = CoinFlip::new(cfg.remote.probability);
    info!(
        database_url = %cfg.basic.database_url,
        remote_url = %cfg.remote.url,
        remote_category = %cfg.remote.category,
        remote_probability = coin.remote_probability(),
        proxy = %cfg.remote.proxy.as_ref().map(|u| u.as_str()).unwrap_or("<none>"),
        loglevel = %cfg.basic.loglevel,
        admin_enabled = !cfg.basic.admin_key.is_empty()
    );

    let storage = QuoteStorage::connect(&cfg.basic.database_url).await?;
    let stored = storage.count_quotes().await?;
    info!(quotes = stored, "quote storage ready");

    let api = QuoteApi::new(&cfg.remote)?;
    let service = QuoteService::new(storage, api, Arc::new(coin), cfg.remote.category.clone());

    let state = QuoterState::new(service, cfg.basic.admin_key.clone());
    let app = quoter_router(state);

    let listener = TcpListener::bind(&cfg.basic.listen_addr).await?;
    info!("HTTP server listening on {}", cfg.basic.listen_addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("shutdown signal received");
    }
}
