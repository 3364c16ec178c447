use crate::error::{AppError, Result};
use crate::types::{PipelineRequest, PipelineResponse};
use crate::AppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    routing::post,
    Json, Router,
};
use tracing::warn;

/// POST /api/run_pipeline
async fn run_pipeline(
    State(state): State<AppState>,
    payload: std::result::Result<Json<PipelineRequest>, JsonRejection>,
) -> Result<Json<PipelineResponse>> {
    let Json(request) = payload.map_err(|rejection| {
        warn!("Rejected pipeline request: {}", rejection.body_text());
        AppError::BadRequest(rejection.body_text())
    })?;

    let response = state.pipeline.run(&request).await?;
    Ok(Json(response))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/run_pipeline", post(run_pipeline))
}
