use std::net::SocketAddr;

use anyhow::Context;
use tracing::{Level, info};

use shorts_server::config::AppConfig;
use shorts_server::database::{ensure_indexes, init_db};
use shorts_server::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_max_level(Level::INFO).init();

    let config = AppConfig::load().context("Failed to load configuration")?;

    let db = init_db(&config.database.url)
        .await
        .context("Failed to initialize database")?;
    ensure_indexes(&db)
        .await
        .context("Failed to create indexes")?;

    let store = common::storage::connect(&config.storage)
        .await
        .context("Failed to connect object store")?;
    info!(backend = ?config.storage.backend, "Object store ready");

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("Invalid server address")?;

    let app = shorts_server::build_router(AppState::new(db, store, config));

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Server running at http://{}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
