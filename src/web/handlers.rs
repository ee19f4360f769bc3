use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    Form, Json,
};
use serde_json::json;
use std::sync::Arc;
use tracing::debug;

use crate::{
    error::{AssessmentError, SubmissionError},
    metrics::MetricsSnapshot,
    types::{
        prediction::PredictionReport,
        student::{StudentForm, StudentSubmission},
    },
    web::{
        routes::AppState,
        views::{self, Output},
    },
};

impl IntoResponse for AssessmentError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            AssessmentError::Submission(SubmissionError::MissingFields(fields)) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                json!({ "error": self.to_string(), "missing_fields": fields }),
            ),
            AssessmentError::Submission(SubmissionError::InvalidField { field, .. }) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                json!({ "error": self.to_string(), "field": field }),
            ),
            AssessmentError::Inference(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": self.to_string() }),
            ),
        };
        (status, Json(body)).into_response()
    }
}

fn warning_message(err: &SubmissionError) -> String {
    match err {
        SubmissionError::MissingFields(fields) => format!(
            "Please fill in all fields before predicting. Missing: {}",
            fields.join(", ")
        ),
        other => other.to_string(),
    }
}

pub async fn prediction_form() -> Html<String> {
    Html(views::prediction_page(&StudentForm::default(), Output::Idle))
}

pub async fn submit_form(
    State(state): State<Arc<AppState>>,
    Form(form): Form<StudentForm>,
) -> (StatusCode, Html<String>) {
    let result = form
        .clone()
        .into_submission()
        .map_err(|e| {
            state.assessor.metrics().record_rejected();
            AssessmentError::from(e)
        })
        .and_then(|submission| state.assessor.assess(&submission));

    match result {
        Ok(report) => (
            StatusCode::OK,
            Html(views::prediction_page(&form, Output::Report(&report))),
        ),
        Err(AssessmentError::Submission(e)) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Html(views::prediction_page(&form, Output::Warning(warning_message(&e)))),
        ),
        Err(AssessmentError::Inference(e)) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Html(views::prediction_page(&form, Output::Failure(e.to_string()))),
        ),
    }
}

/// Body-level failures (bad JSON, wrong types, unknown enum values) are
/// reported in the same JSON error shape as validation failures.
pub async fn predict_json(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<StudentSubmission>, JsonRejection>,
) -> Result<Json<PredictionReport>, Response> {
    let Json(submission) = payload.map_err(|rejection| {
        state.assessor.metrics().record_rejected();
        debug!(error = %rejection.body_text(), "Rejected malformed submission body");
        (rejection.status(), Json(json!({ "error": rejection.body_text() }))).into_response()
    })?;

    let report = state.assessor.assess(&submission).map_err(IntoResponse::into_response)?;
    Ok(Json(report))
}

pub async fn how_it_works() -> Html<String> {
    Html(views::how_it_works_page())
}

pub async fn about() -> Html<String> {
    Html(views::about_page())
}

pub async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let artifacts = state.assessor.artifacts();
    Json(json!({
        "status": "ok",
        "model": artifacts.model().name(),
        "columns": artifacts.template().len(),
    }))
}

pub async fn metrics(State(state): State<Arc<AppState>>) -> Json<MetricsSnapshot> {
    Json(state.assessor.metrics().snapshot())
}
