use axum::{
    extract::{Json, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use textlens_schemas::{AnalyzeRequest, SearchParams, SearchResponse};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::error::AnalysisError;
use crate::service::AnalysisService;

#[derive(Clone)]
struct AppState {
    service: Arc<AnalysisService>,
}

/// HTTP routes over a shared analysis service
pub fn router(service: Arc<AnalysisService>) -> Router {
    let state = AppState { service };

    // Browser front-ends are served from anywhere
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_check))
        .route("/analyze", post(analyze_text))
        .route("/search", get(search_analyses))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> impl IntoResponse {
    Json(json!({
        "service": "analysis",
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

async fn analyze_text(
    State(state): State<AppState>,
    Json(request): Json<AnalyzeRequest>,
) -> Result<impl IntoResponse, (StatusCode, Json<Value>)> {
    info!(
        "Analyze request: model_choice={}, {} chars",
        request.model_choice,
        request.text.len()
    );

    let record = state
        .service
        .analyze(&request.text, &request.model_choice, request.api_key.as_deref())
        .await
        .map_err(error_response)?;

    Ok(Json(record))
}

async fn search_analyses(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> impl IntoResponse {
    let results = state.service.search(params.topic.as_deref());
    info!("Search {:?} returned {} results", params.topic, results.len());

    Json(SearchResponse { results })
}

fn error_response(err: AnalysisError) -> (StatusCode, Json<Value>) {
    let (status, detail) = match &err {
        AnalysisError::BadInput(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
        AnalysisError::AnalysisFailed(cause) => {
            error!("Analysis failed: {:#}", cause);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("LLM analysis failed: {:#}", cause),
            )
        }
    };

    (status, Json(json!({ "detail": detail })))
}
