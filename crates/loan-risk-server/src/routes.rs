use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{
        rejection::{FormRejection, JsonRejection},
        State,
    },
    response::{Html, Json},
    routing::{get, post},
    Form, Router,
};
use serde_json::{json, Value};
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use loan_risk_core::application::LoanApplicationInput;
use loan_risk_core::prediction::{self, PredictionRecord, ScoredApplication};
use loan_risk_core::scoring::LoanScorer;
use loan_risk_core::ComputationOutput;

use crate::error::{AppError, HtmlError};
use crate::render;
use crate::warehouse::PredictionSink;

/// Shared, read-only collaborators for every request
#[derive(Clone)]
pub struct AppState {
    pub scorer: Arc<dyn LoanScorer>,
    pub sink: Arc<dyn PredictionSink>,
}

impl AppState {
    pub fn new(scorer: Arc<dyn LoanScorer>, sink: Arc<dyn PredictionSink>) -> Self {
        Self { scorer, sink }
    }
}

/// Build application router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(render::index_page))
        .route("/predict", post(predict_form))
        .route("/api/v1/predict", post(predict_json))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Score, reconcile, then persist. Persistence must succeed before the
/// caller sees any label.
async fn score_and_persist(
    state: &AppState,
    input: &LoanApplicationInput,
) -> Result<ScoredApplication, AppError> {
    let scored = prediction::score(input, state.scorer.as_ref())?;
    let record = &scored.record;
    info!(
        predicted_risk = %record.predicted_risk,
        predicted_grade = %record.predicted_grade,
        final_prediction = %record.final_prediction,
        "scored loan application"
    );

    if let Err(e) = state.sink.persist(record).await {
        error!(error = %e, "failed to persist prediction record");
        return Err(e.into());
    }
    Ok(scored)
}

/// Handler for POST /predict - form submission, HTML result
pub async fn predict_form(
    State(state): State<AppState>,
    form: Result<Form<HashMap<String, String>>, FormRejection>,
) -> Result<Html<String>, HtmlError> {
    let Form(fields) = form?;
    let input = LoanApplicationInput::from_fields(&fields)?;
    let scored = score_and_persist(&state, &input).await?;
    Ok(render::result_page(&scored.record))
}

/// Handler for POST /api/v1/predict - JSON body, JSON envelope
pub async fn predict_json(
    State(state): State<AppState>,
    payload: Result<Json<LoanApplicationInput>, JsonRejection>,
) -> Result<Json<ComputationOutput<PredictionRecord>>, AppError> {
    let Json(input) = payload?;
    let start = Instant::now();
    let scored = score_and_persist(&state, &input).await?;
    Ok(Json(scored.into_output(start.elapsed().as_micros() as u64)))
}

/// Handler for GET /health
pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
