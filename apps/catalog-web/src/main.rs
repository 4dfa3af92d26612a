//! Product catalog web app: server-rendered pages plus JSON endpoints over MongoDB

use axum_helpers::server::{create_production_app, health_router};
use core_config::tracing::{init_tracing, install_color_eyre};
use database::mongodb::{self, Client};
use std::time::Duration;
use tracing::{info, warn};

mod api;
mod config;
mod openapi;
mod state;

use config::Config;
use state::AppState;

/// Verify the server at startup; if it never answers, fall back to a lazy
/// client so pages render with a degraded notice instead of the process
/// exiting.
async fn connect(config: &Config) -> eyre::Result<Client> {
    match mongodb::connect_from_config_with_retry(&config.mongodb, None).await {
        Ok(client) => Ok(client),
        Err(e) => {
            warn!(
                error = %e,
                "MongoDB unreachable at startup, serving in degraded mode"
            );
            Ok(mongodb::connect_lazy(&config.mongodb).await?)
        }
    }
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    install_color_eyre();

    let config = Config::from_env()?;
    init_tracing(&config.environment);

    info!(
        url = %config.mongodb.redacted_url(),
        database = config.mongodb.database(),
        collection = %config.collection,
        "Connecting to MongoDB"
    );

    let mongo_client = connect(&config).await?;
    let db = mongo_client.database(config.mongodb.database());

    let state = AppState {
        config,
        mongo_client,
        db,
    };

    api::init_indexes(&state).await;

    let router = axum_helpers::create_router::<openapi::ApiDoc>(api::routes(&state)?)?;
    let app = router.merge(health_router(state.config.app));

    info!("Starting catalog web app with graceful shutdown (30s timeout)");

    let mongo_client = state.mongo_client.clone();
    create_production_app(
        app,
        &state.config.server,
        Duration::from_secs(30),
        async move {
            info!("Shutting down: closing MongoDB connections");
            mongo_client.shutdown().await;
            info!("MongoDB connections closed");
        },
    )
    .await
    .map_err(|e| eyre::eyre!("Server error: {}", e))?;

    info!("Catalog web app shutdown complete");
    Ok(())
}
