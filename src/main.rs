//! Kashidashi Server - Equipment Lending System
//!
//! REST API server for tracking equipment lent to classes during a school
//! event.

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use kashidashi_server::{
    api, config::AppConfig, repository::Repository, services::Services, store::DocStore, AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Load configuration
    let config = AppConfig::load().expect("Failed to load configuration");

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("kashidashi_server={},tower_http=debug", config.logging.level).into()
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Kashidashi Server v{}", env!("CARGO_PKG_VERSION"));

    // Create the document store, seeding it if configured
    let store = DocStore::new();
    if let Some(ref seed_file) = config.store.seed_file {
        let summary = kashidashi_server::store::seed::load_file(&store, Path::new(seed_file))
            .await
            .expect("Failed to load seed file");
        tracing::info!(
            admins = summary.admins,
            classes = summary.classes,
            items = summary.items,
            instances = summary.instances,
            "Loaded seed data from {}",
            seed_file
        );
    }

    // Save server address before moving config
    let server_host = config.server.host.clone();
    let server_port = config.server.port;

    // Create repository and services
    let repository = Repository::new(store);
    let services = Services::new(repository, config.auth.clone());

    // Create application state
    let state = AppState {
        config: Arc::new(config),
        services: Arc::new(services),
    };

    // Build router
    let app = api::create_router(state);

    // Start server
    let addr = SocketAddr::new(server_host.parse().expect("Invalid host address"), server_port);

    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
