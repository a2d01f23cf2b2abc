//! Ошибки обращения к API

use thiserror::Error;

/// Ошибка запроса к серверу заявок.
///
/// Хранится в состоянии хранилища, поэтому клонируется и не держит
/// внутри `reqwest::Error`.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ApiError {
    #[error("Failed to send request: {0}")]
    Transport(String),

    #[error("API error {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Not authorized")]
    Unauthorized,

    #[error("Failed to parse response: {0}")]
    Decode(String),

    #[error("No carbonate draft is loaded")]
    NoDraft,
}

impl ApiError {
    /// Build from a non-success HTTP status
    pub fn from_status(status: u16, body: String) -> Self {
        if status == 401 || status == 403 {
            ApiError::Unauthorized
        } else {
            ApiError::Status { status, body }
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ApiError::Decode(err.to_string())
        } else {
            ApiError::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Decode(err.to_string())
    }
}
