use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AccountError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Media upload failed: {0}")]
    UpstreamFailure(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Token generation failed: {0}")]
    TokenGeneration(String),

    #[error("Cryptographic error: {0}")]
    Crypto(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

/// Uniform error envelope: `{statusCode, message, success: false}`.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorEnvelope {
    status_code: u16,
    message: String,
    success: bool,
}

impl AccountError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AccountError::Validation(_) => StatusCode::BAD_REQUEST,
            AccountError::Conflict(_) => StatusCode::CONFLICT,
            AccountError::NotFound(_) => StatusCode::NOT_FOUND,
            AccountError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AccountError::UpstreamFailure(_) => StatusCode::BAD_GATEWAY,
            AccountError::Database(_)
            | AccountError::TokenGeneration(_)
            | AccountError::Crypto(_)
            | AccountError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message shown to callers. Client-class errors surface their detail;
    /// server-class errors stay generic (the cause is logged, not returned).
    fn public_message(&self) -> String {
        match self {
            AccountError::Validation(msg)
            | AccountError::Conflict(msg)
            | AccountError::NotFound(msg)
            | AccountError::Unauthorized(msg) => msg.clone(),
            AccountError::UpstreamFailure(_) => "Media upload failed".to_string(),
            AccountError::Database(_)
            | AccountError::TokenGeneration(_)
            | AccountError::Crypto(_)
            | AccountError::Internal(_) => "An internal error occurred".to_string(),
        }
    }
}

impl IntoResponse for AccountError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        }

        let envelope = ErrorEnvelope {
            status_code: status.as_u16(),
            message: self.public_message(),
            success: false,
        };

        (status, Json(envelope)).into_response()
    }
}
