//! Service layer for appraise-ui

pub mod prediction_client;

pub use prediction_client::{HttpPredictor, PredictError, PricePredictor};
