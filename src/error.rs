//! Error types for command execution and the HTTP API

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Failure to obtain any output from an external command.
///
/// A command that ran and exited non-zero is not an error here; its exit
/// status travels with the output so callers can still parse the text.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("failed to spawn `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{command}` did not finish within {timeout:?}")]
    Timeout { command: String, timeout: Duration },
}

/// Failure to read host metrics from procfs
#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unexpected format in {}", path.display())]
    Format { path: PathBuf },
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("command execution failed: {0}")]
    Execution(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("failed to get system stats: {0}")]
    Metrics(String),
}

impl From<CommandError> for ApiError {
    fn from(err: CommandError) -> Self {
        ApiError::Execution(err.to_string())
    }
}

impl From<MetricsError> for ApiError {
    fn from(err: MetricsError) -> Self {
        ApiError::Metrics(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::BadRequest(msg) => (
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({ "error": msg })),
            )
                .into_response(),
            other => {
                tracing::error!("{}", other);
                (StatusCode::INTERNAL_SERVER_ERROR, other.to_string()).into_response()
            }
        }
    }
}
