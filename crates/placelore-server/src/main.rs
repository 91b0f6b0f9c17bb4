use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use placelore_generate::client::GenerationClient;
use placelore_server::config::Config;
use placelore_server::service::ContentService;
use placelore_server::state::AppState;
use placelore_storage::mongo::MongoContentStore;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .init();

    let config = Config::from_env()?;

    // No store, no service: a failed connection ends the process here.
    let store = Arc::new(MongoContentStore::connect(&config.mongo).await?);
    if let Err(e) = store.ensure_indexes().await {
        warn!(error = %e, "continuing without unique place index");
    }

    let missing = config.generation.missing();
    if !missing.is_empty() {
        warn!(
            missing = ?missing,
            "generation is not configured, only stored content will be served"
        );
    }
    let generator = Arc::new(GenerationClient::new(config.generation.clone())?);

    let service = ContentService::new(store.clone(), generator)
        .serve_unpersisted(config.serve_unpersisted);
    let app = placelore_server::router(AppState::new(service));

    let address = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = TcpListener::bind(address).await?;
    info!(%address, "server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(placelore_server::shutdown_signal())
        .await?;

    store.shutdown().await;
    info!("server stopped");
    Ok(())
}
