//! # Appraise Common Library
//!
//! Shared code for the Appraise crates including:
//! - Prediction data model and controller state
//! - Configuration loading
//! - Common error type

pub mod config;
pub mod error;
pub mod models;

pub use error::{Error, Result};
pub use models::{ControllerState, FailureReason, PredictionRequest, PredictionResult};
