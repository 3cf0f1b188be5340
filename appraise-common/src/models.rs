//! Prediction data model
//!
//! Values exchanged between the form, the prediction controller and the
//! chart collaborator. The controller state is replaced wholesale on every
//! transition, so every type here is a plain value.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Square-footage values of the auxiliary reference sweep, in chart order
pub const REFERENCE_SQUARE_FOOTAGES: [f64; 5] = [1000.0, 1500.0, 2000.0, 2500.0, 3000.0];

/// The only failure text ever shown to the user
pub const FAILURE_MESSAGE: &str = "Error predicting price. Please try again.";

/// Label of the reference curve dataset
pub const REFERENCE_SERIES_LABEL: &str = "Predicted Prices";

/// Label of the user's own highlighted point
pub const HIGHLIGHT_SERIES_LABEL: &str = "Your Prediction";

/// Numeric inputs of one prediction call
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictionRequest {
    pub square_footage: f64,
    pub bedrooms: f64,
}

impl PredictionRequest {
    /// Coerce raw form text into a request
    ///
    /// Only numeric coercion happens here. Range and positivity are left to
    /// the remote service, which reports violations as a failed prediction.
    pub fn from_raw(raw_square_footage: &str, raw_bedrooms: &str) -> Result<Self> {
        Ok(Self {
            square_footage: coerce_number("square_footage", raw_square_footage)?,
            bedrooms: coerce_number("bedrooms", raw_bedrooms)?,
        })
    }
}

fn coerce_number(field: &str, raw: &str) -> Result<f64> {
    let value: f64 = raw
        .trim()
        .parse()
        .map_err(|_| Error::InvalidInput(format!("{} is not a number: {:?}", field, raw)))?;

    if !value.is_finite() {
        return Err(Error::InvalidInput(format!(
            "{} is not a finite number: {:?}",
            field, raw
        )));
    }

    Ok(value)
}

/// Price returned for one request
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub square_footage: f64,
    pub price: f64,
}

/// Single `{x, y}` chart point
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    pub x: f64,
    pub y: f64,
}

impl From<PredictionResult> for ChartPoint {
    fn from(result: PredictionResult) -> Self {
        Self {
            x: result.square_footage,
            y: result.price,
        }
    }
}

/// Labeled, ordered set of chart points
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartDataset {
    pub label: String,
    pub points: Vec<ChartPoint>,
}

/// Chart-ready data handed to the rendering collaborator
///
/// Rebuilt in full on every successful submission, never patched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSeries {
    /// Reference sweep at the submitted bedroom count, in sweep order
    pub reference: ChartDataset,
    /// Exactly one point: the user's own submission
    pub highlighted: ChartDataset,
}

impl ChartSeries {
    /// Build the series from sweep results (already in sweep order) and the
    /// primary result
    pub fn build(reference: Vec<PredictionResult>, primary: PredictionResult) -> Self {
        Self {
            reference: ChartDataset {
                label: REFERENCE_SERIES_LABEL.to_string(),
                points: reference.into_iter().map(ChartPoint::from).collect(),
            },
            highlighted: ChartDataset {
                label: HIGHLIGHT_SERIES_LABEL.to_string(),
                points: vec![ChartPoint::from(primary)],
            },
        }
    }

    /// The highlighted point
    pub fn highlighted_point(&self) -> Option<ChartPoint> {
        self.highlighted.points.first().copied()
    }
}

/// Diagnostic category of a failed submission
///
/// Never changes the user-facing text; it exists for logs and monitoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureReason {
    /// Form text could not be coerced to numbers
    InvalidInput,
    /// Connection or transport failure
    Network,
    /// Request exceeded the configured timeout
    Timeout,
    /// Endpoint answered with a non-2xx status
    Server,
    /// Body was not `{ "predicted_price": number }`
    MalformedResponse,
}

impl FailureReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureReason::InvalidInput => "invalid_input",
            FailureReason::Network => "network",
            FailureReason::Timeout => "timeout",
            FailureReason::Server => "server",
            FailureReason::MalformedResponse => "malformed_response",
        }
    }
}

/// Observable presentation state of the prediction form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ControllerState {
    Idle,
    Loading,
    Success {
        price: f64,
        chart: ChartSeries,
    },
    Failure {
        message: String,
        reason: FailureReason,
    },
}

impl ControllerState {
    /// Failure carrying the static user-facing message
    pub fn failure(reason: FailureReason) -> Self {
        ControllerState::Failure {
            message: FAILURE_MESSAGE.to_string(),
            reason,
        }
    }

    /// Short name used in logs and SSE payloads
    pub fn name(&self) -> &'static str {
        match self {
            ControllerState::Idle => "idle",
            ControllerState::Loading => "loading",
            ControllerState::Success { .. } => "success",
            ControllerState::Failure { .. } => "failure",
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, ControllerState::Loading)
    }

    /// Predicted price, only present on success
    pub fn price(&self) -> Option<f64> {
        match self {
            ControllerState::Success { price, .. } => Some(*price),
            _ => None,
        }
    }
}

/// Controller state tagged with the submission generation that produced it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateSnapshot {
    /// Zero until the first submission
    pub generation: u64,
    #[serde(flatten)]
    pub state: ControllerState,
    pub updated_at: DateTime<Utc>,
}

impl StateSnapshot {
    pub fn idle() -> Self {
        Self {
            generation: 0,
            state: ControllerState::Idle,
            updated_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_raw_coerces_numbers() {
        let request = PredictionRequest::from_raw("1200", " 3 ").unwrap();
        assert_eq!(request.square_footage, 1200.0);
        assert_eq!(request.bedrooms, 3.0);

        // Range is not checked here
        let request = PredictionRequest::from_raw("-5", "0.5").unwrap();
        assert_eq!(request.square_footage, -5.0);
        assert_eq!(request.bedrooms, 0.5);
    }

    #[test]
    fn test_from_raw_rejects_non_numeric() {
        assert!(matches!(
            PredictionRequest::from_raw("twelve hundred", "3"),
            Err(Error::InvalidInput(_))
        ));
        assert!(matches!(
            PredictionRequest::from_raw("1200", "NaN"),
            Err(Error::InvalidInput(_))
        ));
        assert!(matches!(
            PredictionRequest::from_raw("inf", "3"),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn test_chart_series_build_keeps_order_and_labels() {
        let reference: Vec<PredictionResult> = REFERENCE_SQUARE_FOOTAGES
            .iter()
            .map(|&sf| PredictionResult {
                square_footage: sf,
                price: sf * 100.0,
            })
            .collect();
        let primary = PredictionResult {
            square_footage: 1200.0,
            price: 120_000.0,
        };

        let series = ChartSeries::build(reference, primary);

        assert_eq!(series.reference.label, "Predicted Prices");
        assert_eq!(series.highlighted.label, "Your Prediction");
        let xs: Vec<f64> = series.reference.points.iter().map(|p| p.x).collect();
        assert_eq!(xs, REFERENCE_SQUARE_FOOTAGES.to_vec());
        assert_eq!(
            series.highlighted_point(),
            Some(ChartPoint {
                x: 1200.0,
                y: 120_000.0
            })
        );
    }

    #[test]
    fn test_state_serialization_shape() {
        let snapshot = StateSnapshot {
            generation: 4,
            state: ControllerState::failure(FailureReason::Timeout),
            updated_at: Utc::now(),
        };

        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["generation"], 4);
        assert_eq!(json["state"], "failure");
        assert_eq!(json["message"], FAILURE_MESSAGE);
        assert_eq!(json["reason"], "timeout");

        let parsed: StateSnapshot = serde_json::from_value(json).unwrap();
        assert_eq!(parsed.state, snapshot.state);
    }

    #[test]
    fn test_state_helpers() {
        assert!(ControllerState::Loading.is_loading());
        assert_eq!(ControllerState::Idle.price(), None);
        assert_eq!(ControllerState::Idle.name(), "idle");
        assert_eq!(FailureReason::MalformedResponse.as_str(), "malformed_response");
    }
}
