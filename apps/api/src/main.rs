mod config;
mod db;
mod errors;
mod extract;
mod models;
mod routes;
mod state;
mod users;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::db::{create_pool, run_migrations};
use crate::routes::build_router;
use crate::state::AppState;
use crate::users::repository::{MapperUserRepository, OrmUserRepository};
use crate::users::service::{DataSource, UserService};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting User API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL
    let db = create_pool(&config.database_url, config.database_max_connections).await?;
    run_migrations(&db).await?;

    match config.recent_users_limit {
        Some(limit) => info!("Recent users listing capped at {limit}"),
        None => info!("Recent users listing is unbounded"),
    }

    // One service per data-access backend, both over the same pool
    let orm = UserService::new(
        Arc::new(OrmUserRepository::new(db.clone())),
        DataSource::Orm,
        config.recent_users_limit,
        config.max_page_size,
    );
    let mapper = UserService::new(
        Arc::new(MapperUserRepository::new(db)),
        DataSource::Mapper,
        config.recent_users_limit,
        config.max_page_size,
    );

    let state = AppState {
        config: config.clone(),
        orm,
        mapper,
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
