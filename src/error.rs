use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde_json::json;
use thiserror::Error;

/// Application error types.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("No data: {0}")]
    NoData(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Missing column: {0}")]
    MissingColumn(String),

    #[error("Duplicate timestamp: {0}")]
    DuplicateTimestamp(DateTime<Utc>),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("External API error: {0}")]
    ExternalApi(String),

    #[error(transparent)]
    Reqwest(#[from] reqwest::Error),

    #[error(transparent)]
    SerdeJson(#[from] serde_json::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NoData(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) | AppError::InvalidConfig(_) => StatusCode::BAD_REQUEST,
            AppError::MissingColumn(_) | AppError::DuplicateTimestamp(_) => StatusCode::BAD_GATEWAY,
            // Request bodies are rejected by the extractor; serde errors here
            // come from upstream payloads.
            AppError::ExternalApi(_) | AppError::Reqwest(_) | AppError::SerdeJson(_) => {
                StatusCode::BAD_GATEWAY
            }
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(json!({
            "error": self.to_string(),
            "status": status.as_u16(),
        }));

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
