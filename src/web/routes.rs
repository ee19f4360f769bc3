use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::{assessment::RiskAssessor, web::handlers};

#[derive(Clone)]
pub struct AppState {
    pub assessor: Arc<RiskAssessor>,
}

pub fn create_router(assessor: Arc<RiskAssessor>) -> Router {
    let state = Arc::new(AppState { assessor });

    Router::new()
        .route("/", get(handlers::prediction_form))
        .route("/predict", post(handlers::submit_form))
        .route("/how-it-works", get(handlers::how_it_works))
        .route("/about", get(handlers::about))
        .route("/health", get(handlers::health))
        .route("/api/v1/predict", post(handlers::predict_json))
        .route("/api/v1/metrics", get(handlers::metrics))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
