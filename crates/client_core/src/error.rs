use shared::error::{ApiErrorBody, ErrorCode};
use thiserror::Error;

/// Client-side failure taxonomy.
///
/// `Transport` covers requests that never completed cleanly, timeouts
/// included. `Unauthenticated` means the bearer token was missing or
/// rejected; it is never retried and tells the surrounding application to
/// discard the session. `Validation` failures are raised before any network
/// call. `Api` is any other remote rejection.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("transport failure: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("bearer token missing or rejected")]
    Unauthenticated,
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("remote rejected request ({status}): {message}")]
    Api {
        status: u16,
        code: Option<ErrorCode>,
        message: String,
    },
}

impl ClientError {
    pub fn validation(message: impl Into<String>) -> Self {
        ClientError::Validation(message.into())
    }

    pub(crate) fn from_rejection(status: u16, body: Option<ApiErrorBody>) -> Self {
        if status == 401 || status == 403 {
            return ClientError::Unauthenticated;
        }
        match body {
            Some(body) => ClientError::Api {
                status,
                code: Some(body.code),
                message: body.message,
            },
            None => ClientError::Api {
                status,
                code: None,
                message: format!("http status {status}"),
            },
        }
    }

    /// True when the failure means the session itself is no longer valid.
    pub fn is_unauthenticated(&self) -> bool {
        matches!(self, ClientError::Unauthenticated)
    }
}
