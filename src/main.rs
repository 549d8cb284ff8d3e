use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use player_lookup_api::config::Config;
use player_lookup_api::prober::Prober;
use player_lookup_api::routes::{self, AppState};
use player_lookup_api::upstream::HttpTransport;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing/logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting player lookup server...");

    dotenvy::dotenv().ok();

    let config = Config::from_env().inspect_err(|e| {
        tracing::error!(error = %e, "invalid configuration");
    })?;

    let transport = HttpTransport::new(&config.headers)?;
    let prober = Prober::new(&config, Arc::new(transport));

    tracing::info!(
        endpoints = config.endpoints.len(),
        timeout_secs = config.probe_timeout.as_secs(),
        max_concurrent_probes = config.max_concurrent_probes,
        policy = config.policy.as_str(),
        "Upstream prober ready."
    );

    let addr = SocketAddr::from((config.host, config.port));
    let app = routes::router(AppState::new(config, prober));

    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!("Server listening on {}", addr);
    tracing::info!("Health check: http://{}/api/health", addr);
    tracing::info!("Player lookup: http://{}/api/player/{{uid}}", addr);
    tracing::info!("Connectivity: http://{}/api/test-connectivity", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
