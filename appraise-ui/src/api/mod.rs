//! HTTP API handlers for appraise-ui
//!
//! The browser form talks to the prediction controller via HTTP REST + SSE

pub mod health;
pub mod prediction;
pub mod sse;
pub mod ui;

pub use health::health_routes;
pub use prediction::prediction_routes;
pub use sse::state_event_stream;
pub use ui::ui_routes;
