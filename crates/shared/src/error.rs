use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Machine-readable rejection categories the remote service reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    Unauthorized,
    Forbidden,
    NotFound,
    Validation,
    Internal,
}

/// Error body the remote service attaches to non-2xx responses.
#[derive(Debug, Clone, Serialize, Deserialize, Error)]
#[error("{code:?}: {message}")]
pub struct ApiErrorBody {
    pub code: ErrorCode,
    pub message: String,
}
