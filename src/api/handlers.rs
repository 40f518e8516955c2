//! Request handlers

use super::page::{self, Outcome};
use super::{AppState, ErrorResponse, HealthResponse, PredictResponse};
use crate::error::PredictorError;
use crate::metrics::MetricsSnapshot;
use crate::types::passenger::PassengerRecord;
use axum::extract::rejection::{FormRejection, JsonRejection};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Html;
use axum::{Form, Json};

const GENERIC_FAILURE: &str = "prediction failed";

fn failure_status(err: &PredictorError) -> StatusCode {
    if err.is_client_error() {
        StatusCode::UNPROCESSABLE_ENTITY
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

/// Input form with the metrics panel
pub async fn index(State(state): State<AppState>) -> Html<String> {
    Html(page::render(&state, &PassengerRecord::default(), None))
}

fn generic_failure(status: StatusCode) -> (StatusCode, Json<ErrorResponse>) {
    (
        status,
        Json(ErrorResponse {
            error: GENERIC_FAILURE.to_string(),
        }),
    )
}

/// Form submission; renders the page with the outcome
pub async fn predict_form(
    State(state): State<AppState>,
    form: Result<Form<PassengerRecord>, FormRejection>,
) -> Html<String> {
    let passenger = match form {
        Ok(Form(passenger)) => passenger,
        Err(rejection) => {
            state.record_rejected_input(&rejection.body_text());
            return Html(page::render(
                &state,
                &PassengerRecord::default(),
                Some(&Outcome::Failure),
            ));
        }
    };
    let outcome = match state.predict(&passenger) {
        Ok(prediction) => Outcome::Success(prediction),
        Err(_) => Outcome::Failure,
    };
    Html(page::render(&state, &passenger, Some(&outcome)))
}

/// JSON prediction
pub async fn predict_json(
    State(state): State<AppState>,
    body: Result<Json<PassengerRecord>, JsonRejection>,
) -> Result<Json<PredictResponse>, (StatusCode, Json<ErrorResponse>)> {
    let Json(passenger) = body.map_err(|rejection| {
        state.record_rejected_input(&rejection.body_text());
        generic_failure(StatusCode::UNPROCESSABLE_ENTITY)
    })?;
    state
        .predict(&passenger)
        .map(|prediction| {
            Json(PredictResponse {
                request_id: prediction.request_id,
                label: prediction.label,
                probability: prediction.probability,
                latency_ms: prediction.latency_ms,
            })
        })
        .map_err(|e| generic_failure(failure_status(&e)))
}

/// Metrics snapshot
pub async fn metrics(State(state): State<AppState>) -> Json<MetricsSnapshot> {
    Json(state.snapshot())
}

/// Health check
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let info = state.info();
    Json(HealthResponse {
        status: "healthy".to_string(),
        app_env: info.app_env.clone(),
        model_version: info.model_version.clone(),
    })
}
