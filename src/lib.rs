//! Chaste Indicator - technical indicator and anomaly pipeline for OHLCV bars

pub mod api;
pub mod config;
pub mod error;
pub mod services;
pub mod sources;
pub mod types;

use std::sync::Arc;

use axum::Router;
use services::PipelineService;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<PipelineService>,
}

impl AppState {
    pub fn new(pipeline: Arc<PipelineService>) -> Self {
        Self { pipeline }
    }
}

/// Build the application router with state attached.
pub fn app(state: AppState) -> Router {
    api::router().with_state(state)
}

// Re-export commonly used types
pub use error::{AppError, Result};
pub use types::{Bar, BarRecord, BarTable, Interval, PipelineRequest, PipelineResponse, RawTable};
