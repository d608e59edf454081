use std::path::PathBuf;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BoardError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("missing form field `{0}`")]
    MissingField(&'static str),

    #[error("invalid config file {path}: {source}")]
    InvalidConfig {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("path {0} is outside the document root")]
    OutsideRoot(PathBuf),
}

/// Error returned by route handlers.
///
/// A bad submission is the client's fault, a failed relay is ours.
#[derive(Debug)]
pub struct AppError(pub BoardError);

impl From<BoardError> for AppError {
    fn from(err: BoardError) -> Self {
        AppError(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self.0 {
            BoardError::MissingField(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::SERVICE_UNAVAILABLE,
        };

        tracing::warn!("request failed with {}: {}", status, self.0);
        (status, self.0.to_string()).into_response()
    }
}
