//! Remote price prediction client
//!
//! The scoring service is consumed as a single async call:
//! `GET {base_url}/predict/{square_footage}/{bedrooms}` answering
//! `{ "predicted_price": number }`. Any non-2xx status or malformed body is a
//! failed prediction.

use appraise_common::FailureReason;
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

const USER_AGENT: &str = concat!("appraise/", env!("CARGO_PKG_VERSION"));

/// Prediction client errors
#[derive(Debug, Clone, Error)]
pub enum PredictError {
    /// Form text could not be coerced to numbers
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Network communication error
    #[error("Network error: {0}")]
    NetworkError(String),

    /// No answer within the allowed time
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    /// Prediction service returned an error response
    #[error("API error {0}: {1}")]
    ApiError(u16, String),

    /// Failed to parse the response body
    #[error("Parse error: {0}")]
    ParseError(String),
}

impl PredictError {
    /// Diagnostic category reported alongside the static user message
    pub fn reason(&self) -> FailureReason {
        match self {
            PredictError::InvalidInput(_) => FailureReason::InvalidInput,
            PredictError::NetworkError(_) => FailureReason::Network,
            PredictError::Timeout(_) => FailureReason::Timeout,
            PredictError::ApiError(..) => FailureReason::Server,
            PredictError::ParseError(_) => FailureReason::MalformedResponse,
        }
    }
}

/// Source of price predictions
///
/// The controller only ever talks to this trait, so tests substitute
/// scripted implementations for the network client.
#[async_trait]
pub trait PricePredictor: Send + Sync {
    /// Predict the price of a home
    async fn predict(&self, square_footage: f64, bedrooms: f64) -> Result<f64, PredictError>;
}

#[derive(Debug, Deserialize)]
struct PredictResponse {
    predicted_price: f64,
}

/// HTTP client for the remote scoring endpoint
pub struct HttpPredictor {
    http_client: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl HttpPredictor {
    /// Create a client for `base_url` with a per-request timeout
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, PredictError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| PredictError::NetworkError(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn predict_url(&self, square_footage: f64, bedrooms: f64) -> String {
        format!("{}/predict/{}/{}", self.base_url, square_footage, bedrooms)
    }
}

#[async_trait]
impl PricePredictor for HttpPredictor {
    async fn predict(&self, square_footage: f64, bedrooms: f64) -> Result<f64, PredictError> {
        let url = self.predict_url(square_footage, bedrooms);

        tracing::debug!(url = %url, "Requesting price prediction");

        let response = self.http_client.get(&url).send().await.map_err(|e| {
            if e.is_timeout() {
                PredictError::Timeout(self.timeout)
            } else {
                PredictError::NetworkError(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(PredictError::ApiError(status.as_u16(), error_text));
        }

        let body: PredictResponse = response
            .json()
            .await
            .map_err(|e| PredictError::ParseError(e.to_string()))?;

        if !body.predicted_price.is_finite() {
            return Err(PredictError::ParseError(format!(
                "predicted_price is not finite: {}",
                body.predicted_price
            )));
        }

        tracing::debug!(
            square_footage,
            bedrooms,
            price = body.predicted_price,
            "Prediction received"
        );

        Ok(body.predicted_price)
    }
}
