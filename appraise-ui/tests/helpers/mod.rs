//! Shared test helpers for appraise-ui integration tests

#![allow(dead_code)]

use appraise_ui::services::{PredictError, PricePredictor};
use appraise_ui::{build_router, AppState, ControllerSettings, PredictionController};
use async_trait::async_trait;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// price = 200*sf + 10000*bedrooms
pub fn linear_price(square_footage: f64, bedrooms: f64) -> f64 {
    200.0 * square_footage + 10_000.0 * bedrooms
}

/// Mock predictor with a linear price model
///
/// Fails every request at `fail_square_footage`, and delays every request
/// by `delay`.
pub struct LinearPredictor {
    pub fail_square_footage: Option<f64>,
    pub delay: Duration,
    calls: AtomicUsize,
}

impl LinearPredictor {
    pub fn new() -> Arc<Self> {
        Self::with(None, Duration::ZERO)
    }

    pub fn with(fail_square_footage: Option<f64>, delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            fail_square_footage,
            delay,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PricePredictor for LinearPredictor {
    async fn predict(&self, square_footage: f64, bedrooms: f64) -> Result<f64, PredictError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if self.fail_square_footage == Some(square_footage) {
            return Err(PredictError::ApiError(500, "scoring failed".to_string()));
        }
        Ok(linear_price(square_footage, bedrooms))
    }
}

/// Router and controller backed by `predictor`
pub fn create_test_app(
    predictor: Arc<dyn PricePredictor>,
) -> (axum::Router, Arc<PredictionController>) {
    let controller = Arc::new(PredictionController::new(
        predictor,
        ControllerSettings::default(),
    ));
    let app = build_router(AppState::new(controller.clone()));
    (app, controller)
}

/// Serve `router` on an ephemeral local port
pub async fn spawn_server(router: axum::Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let addr = listener.local_addr().expect("Failed to read local addr");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("Test server failed");
    });
    addr
}

/// Wait until the controller leaves `Loading`
pub async fn wait_for_settled(controller: &PredictionController) -> appraise_common::models::StateSnapshot {
    let mut rx = controller.subscribe();
    tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            let current = rx.borrow_and_update().clone();
            if !current.state.is_loading() {
                return current;
            }
            rx.changed().await.expect("Controller dropped");
        }
    })
    .await
    .expect("Timed out waiting for prediction to settle")
}
