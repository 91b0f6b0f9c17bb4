//! placelore-server
//!
//! HTTP front for PlaceLore: look up stored place content, generate it on a
//! miss, and serve it raw or segmented for display.

use axum::Router;
use axum::middleware as axum_mw;
use axum::routing::{get, post};
use tokio::signal;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};

pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod service;
pub mod single_flight;
pub mod state;

use state::AppState;

/// Build the application router around an already-wired state.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/api/content/{place}", get(routes::content::get_content))
        .route(
            "/api/content/{place}/sections",
            get(routes::content::get_sections),
        )
        .route("/api/generate", post(routes::generate::generate))
        .layer(axum_mw::from_fn(middleware::access_log::access_log))
        .layer(cors)
        .with_state(state)
}

/// Resolves on Ctrl+C or SIGTERM.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
        info!("received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("received terminate signal, shutting down");
            }
            Err(e) => {
                error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
