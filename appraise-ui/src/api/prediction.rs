//! Prediction form endpoints
//!
//! - `POST /predict`: raw form values in, submission generation out
//! - `GET /state`: current controller state snapshot

use axum::{
    async_trait,
    extract::{FromRequest, Request, State},
    http::{header, StatusCode},
    routing::{get, post},
    Form, Json, Router,
};
use appraise_common::models::StateSnapshot;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{ApiError, ApiResult, AppState};

/// Raw form values, exactly as typed by the user
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PredictForm {
    pub square_footage: String,
    pub bedrooms: String,
}

/// Response to an accepted submission
#[derive(Debug, Serialize, Deserialize)]
pub struct SubmitResponse {
    /// Generation that will carry this submission's result
    pub generation: u64,
}

/// Form body accepted as either `application/x-www-form-urlencoded` or JSON
pub struct SubmittedForm(pub PredictForm);

#[async_trait]
impl<S> FromRequest<S> for SubmittedForm
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_json = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|content_type| content_type.starts_with("application/json"));

        let form = if is_json {
            let Json(form) = Json::<PredictForm>::from_request(req, state)
                .await
                .map_err(|e| ApiError::BadRequest(e.body_text()))?;
            form
        } else {
            let Form(form) = Form::<PredictForm>::from_request(req, state)
                .await
                .map_err(|e| ApiError::BadRequest(e.body_text()))?;
            form
        };

        Ok(Self(form))
    }
}

/// Emptiness is the form's precondition; numeric coercion is the controller's job
fn require_value(field: &str, value: &str) -> ApiResult<()> {
    if value.trim().is_empty() {
        return Err(appraise_common::Error::InvalidInput(format!("{} is required", field)).into());
    }
    Ok(())
}

/// POST /predict
///
/// Fire-and-forget: the controller is already `Loading` when this returns
/// `202 Accepted`; the outcome arrives on `/events` or `/state`.
pub async fn submit_prediction(
    State(state): State<AppState>,
    SubmittedForm(form): SubmittedForm,
) -> ApiResult<(StatusCode, Json<SubmitResponse>)> {
    require_value("square_footage", &form.square_footage)?;
    require_value("bedrooms", &form.bedrooms)?;

    let generation = state
        .controller
        .submit(&form.square_footage, &form.bedrooms);

    info!(
        generation,
        square_footage = %form.square_footage,
        bedrooms = %form.bedrooms,
        "Prediction submitted"
    );

    Ok((StatusCode::ACCEPTED, Json(SubmitResponse { generation })))
}

/// GET /state
pub async fn current_state(State(state): State<AppState>) -> Json<StateSnapshot> {
    Json(state.controller.snapshot())
}

/// Build prediction routes
pub fn prediction_routes() -> Router<AppState> {
    Router::new()
        .route("/predict", post(submit_prediction))
        .route("/state", get(current_state))
}
