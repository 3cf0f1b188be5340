//! Prediction controller
//!
//! Owns the request lifecycle behind the form:
//! 1. Enter `Loading` synchronously on submit
//! 2. Primary prediction for the submitted inputs
//! 3. Concurrent reference sweep at the submitted bedroom count
//! 4. Merge into a [`ChartSeries`] and publish `Success` or `Failure`
//!
//! Every submission is tagged with a generation. A completion is published
//! only while its generation is still the latest one issued, so a slow
//! earlier submission can never overwrite a newer result.

use appraise_common::config::{ServiceConfig, SweepPolicy};
use appraise_common::models::{ChartSeries, StateSnapshot, REFERENCE_SQUARE_FOOTAGES};
use appraise_common::{ControllerState, PredictionRequest, PredictionResult};
use chrono::Utc;
use futures::future::{join_all, try_join_all};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, RwLock};
use tracing::{debug, info, warn};

use crate::services::{PredictError, PricePredictor};

/// Controller tuning taken from the service configuration
#[derive(Debug, Clone, PartialEq)]
pub struct ControllerSettings {
    /// Upper bound for each individual prediction request
    pub request_timeout: Duration,
    pub sweep_policy: SweepPolicy,
    /// Sweep values, in chart order
    pub reference_square_footages: Vec<f64>,
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(10),
            sweep_policy: SweepPolicy::AllOrNothing,
            reference_square_footages: REFERENCE_SQUARE_FOOTAGES.to_vec(),
        }
    }
}

impl From<&ServiceConfig> for ControllerSettings {
    fn from(config: &ServiceConfig) -> Self {
        Self {
            request_timeout: config.request_timeout,
            sweep_policy: config.sweep_policy,
            reference_square_footages: config.reference_square_footages.clone(),
        }
    }
}

/// Owner of the observable prediction state
pub struct PredictionController {
    predictor: Arc<dyn PricePredictor>,
    settings: ControllerSettings,
    state_tx: watch::Sender<StateSnapshot>,
    /// Detail of the most recent failure, for diagnostics only
    last_error: RwLock<Option<String>>,
}

impl PredictionController {
    pub fn new(predictor: Arc<dyn PricePredictor>, settings: ControllerSettings) -> Self {
        let (state_tx, _) = watch::channel(StateSnapshot::idle());
        Self {
            predictor,
            settings,
            state_tx,
            last_error: RwLock::new(None),
        }
    }

    /// Current state and the generation that produced it
    pub fn snapshot(&self) -> StateSnapshot {
        self.state_tx.borrow().clone()
    }

    /// Receiver that observes every published transition
    pub fn subscribe(&self) -> watch::Receiver<StateSnapshot> {
        self.state_tx.subscribe()
    }

    pub async fn last_error(&self) -> Option<String> {
        self.last_error.read().await.clone()
    }

    /// Start a prediction for raw form values
    ///
    /// The state is `Loading` when this returns. The requests run on a
    /// spawned task; the outcome is observed through [`Self::subscribe`].
    /// Returns the generation assigned to this submission.
    pub fn submit(self: &Arc<Self>, raw_square_footage: &str, raw_bedrooms: &str) -> u64 {
        let generation = self.begin_submission();

        let controller = Arc::clone(self);
        let raw_square_footage = raw_square_footage.to_string();
        let raw_bedrooms = raw_bedrooms.to_string();
        tokio::spawn(async move {
            controller
                .run_submission(generation, &raw_square_footage, &raw_bedrooms)
                .await;
        });

        generation
    }

    /// Same as [`Self::submit`] but runs the requests on the caller's task
    ///
    /// Returns the snapshot visible once this submission has finished, which
    /// belongs to a newer generation if one was issued in the meantime.
    pub async fn submit_and_wait(&self, raw_square_footage: &str, raw_bedrooms: &str) -> StateSnapshot {
        let generation = self.begin_submission();
        self.run_submission(generation, raw_square_footage, raw_bedrooms)
            .await;
        self.snapshot()
    }

    /// Issue a new generation and enter `Loading` (clears price and error)
    fn begin_submission(&self) -> u64 {
        let mut generation = 0;
        self.state_tx.send_modify(|snapshot| {
            snapshot.generation += 1;
            snapshot.state = ControllerState::Loading;
            snapshot.updated_at = Utc::now();
            generation = snapshot.generation;
        });
        debug!(generation, "Prediction submission started");
        generation
    }

    async fn run_submission(&self, generation: u64, raw_square_footage: &str, raw_bedrooms: &str) {
        let outcome = match PredictionRequest::from_raw(raw_square_footage, raw_bedrooms) {
            Ok(request) => self.evaluate(request).await,
            Err(e) => Err(PredictError::InvalidInput(e.to_string())),
        };

        let state = match outcome {
            Ok((price, chart)) => {
                info!(
                    generation,
                    price,
                    reference_points = chart.reference.points.len(),
                    "Prediction succeeded"
                );
                ControllerState::Success { price, chart }
            }
            Err(e) => {
                warn!(generation, reason = e.reason().as_str(), error = %e, "Prediction failed");
                *self.last_error.write().await = Some(e.to_string());
                ControllerState::failure(e.reason())
            }
        };

        self.apply(generation, state);
    }

    /// Publish `state` if `generation` is still the latest submission
    fn apply(&self, generation: u64, state: ControllerState) -> bool {
        let applied = self.state_tx.send_if_modified(|snapshot| {
            if snapshot.generation != generation {
                return false;
            }
            snapshot.state = state;
            snapshot.updated_at = Utc::now();
            true
        });

        if !applied {
            debug!(generation, "Discarding stale prediction result");
        }
        applied
    }

    /// Primary prediction followed by the reference sweep
    ///
    /// The sweep is never issued when the primary fails.
    pub async fn evaluate(&self, request: PredictionRequest) -> Result<(f64, ChartSeries), PredictError> {
        let primary = self
            .predict_bounded(request.square_footage, request.bedrooms)
            .await?;

        let reference = self.sweep(request.bedrooms).await?;

        Ok((primary.price, ChartSeries::build(reference, primary)))
    }

    /// Reference sweep at a fixed bedroom count
    ///
    /// All requests are in flight together. Results come back in sweep
    /// order regardless of completion order.
    async fn sweep(&self, bedrooms: f64) -> Result<Vec<PredictionResult>, PredictError> {
        let requests = self
            .settings
            .reference_square_footages
            .iter()
            .map(|&square_footage| self.predict_bounded(square_footage, bedrooms));

        match self.settings.sweep_policy {
            SweepPolicy::AllOrNothing => try_join_all(requests).await,
            SweepPolicy::BestEffort => Ok(join_all(requests)
                .await
                .into_iter()
                .filter_map(|result| match result {
                    Ok(point) => Some(point),
                    Err(e) => {
                        warn!(error = %e, "Dropping failed reference point");
                        None
                    }
                })
                .collect()),
        }
    }

    async fn predict_bounded(&self, square_footage: f64, bedrooms: f64) -> Result<PredictionResult, PredictError> {
        let timeout = self.settings.request_timeout;
        let price = tokio::time::timeout(timeout, self.predictor.predict(square_footage, bedrooms))
            .await
            .map_err(|_| PredictError::Timeout(timeout))??;

        Ok(PredictionResult {
            square_footage,
            price,
        })
    }
}
