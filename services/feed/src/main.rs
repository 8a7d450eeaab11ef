use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

mod config;
mod credentials;
mod error;
mod identity;
mod middleware;
mod models;
mod pagination;
mod repositories;
mod routes;
mod state;

use common::database::{DatabaseConfig, health_check, init_pool, run_migrations};

use crate::{
    config::{FeedConfig, StoreBackend},
    identity::IdAssigner,
    pagination::FeedPaginator,
    repositories::{
        memory::MemoryStore,
        postgres::{MIGRATOR, PostRepository, UserRepository},
    },
    state::AppState,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("Starting feed service");

    let feed_config = FeedConfig::from_env()?;
    let app_state = build_state(&feed_config).await?;

    info!("Feed service initialized successfully");

    // Start the web server
    let app = routes::create_router(app_state);

    let listener = TcpListener::bind(&feed_config.bind_address).await?;
    info!("Feed service listening on {}", feed_config.bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Feed service stopped");
    Ok(())
}

/// Wire the configured store into the shared handler state
async fn build_state(feed_config: &FeedConfig) -> Result<AppState> {
    let paginator = FeedPaginator::new(feed_config.max_page_size);

    let state = match feed_config.store {
        StoreBackend::Postgres => {
            let db_config = DatabaseConfig::from_env()?;
            let pool = init_pool(&db_config).await?;

            // Check database connectivity
            health_check(&pool)
                .await
                .context("Failed to connect to database")?;
            info!("Database connection successful");

            run_migrations(&pool, &MIGRATOR).await?;

            let ids = Arc::new(IdAssigner::new());
            AppState {
                users: Arc::new(UserRepository::new(pool.clone(), ids.clone())),
                posts: Arc::new(PostRepository::new(pool, ids)),
                paginator,
            }
        }
        StoreBackend::Memory => {
            warn!("Using the in-memory store; data will not survive a restart");

            let store = MemoryStore::new();
            AppState {
                users: Arc::new(store.clone()),
                posts: Arc::new(store),
                paginator,
            }
        }
    };

    Ok(state)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
    }
    info!("Shutdown signal received");
}
