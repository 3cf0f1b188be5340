//! appraise-ui library interface for testing
//!
//! Exposes the prediction controller and the HTTP router

pub mod api;
pub mod controller;
pub mod error;
pub mod logging;
pub mod services;

pub use crate::controller::{ControllerSettings, PredictionController};
pub use crate::error::{ApiError, ApiResult};

use axum::Router;
use chrono::{DateTime, Utc};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Sole owner of the prediction state
    pub controller: Arc<PredictionController>,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(controller: Arc<PredictionController>) -> Self {
        Self {
            controller,
            startup_time: Utc::now(),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::get;

    Router::new()
        // UI routes (HTML pages)
        .merge(api::ui_routes())
        // API routes
        .merge(api::prediction_routes())
        .route("/events", get(api::state_event_stream))
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind the listener and report the address actually bound
///
/// Port 0 picks an ephemeral port; the returned address carries it.
pub async fn bind_listener(address: &str) -> std::io::Result<(TcpListener, SocketAddr)> {
    let listener = TcpListener::bind(address).await?;
    let local_addr = listener.local_addr()?;
    Ok((listener, local_addr))
}
