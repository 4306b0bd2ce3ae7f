use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use thiserror::Error as ThisError;
use tracing::error;

use super::oauth::OauthError;

#[derive(Debug, ThisError)]
pub enum NudgeError {
    #[error("OAuth code exchange failed: {0}")]
    AuthExchange(#[from] OauthError),

    #[error("could not resolve authenticated email: {0}")]
    IdentityLookup(String),

    #[error("user not connected: {0}")]
    UserNotConnected(String),

    #[error("required request fields are missing")]
    MissingFields,

    #[error("mail send failed: {reason}")]
    MailSend { reason: String },

    #[error("reminder webhook failed: {reason}")]
    Webhook { reason: String },

    #[error("HTTP request error: {0}")]
    ReqwestError(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("URL parse error: {0}")]
    UrlError(#[from] url::ParseError),

    #[error("Ractor error: {0}")]
    RactorError(String),

    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
}

/// Wire shape for failed requests: `{"error": "..."}`.
#[derive(Serialize)]
pub struct ErrorBody {
    pub error: String,
}

impl IntoResponse for NudgeError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match &self {
            NudgeError::AuthExchange(_) | NudgeError::IdentityLookup(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "OAuth failed")
            }

            NudgeError::UserNotConnected(_) => (StatusCode::BAD_REQUEST, "User not connected"),

            NudgeError::MissingFields => (StatusCode::BAD_REQUEST, "Missing fields"),

            NudgeError::MailSend { .. } => (StatusCode::INTERNAL_SERVER_ERROR, "Email failed"),

            NudgeError::Webhook { .. }
            | NudgeError::ReqwestError(_)
            | NudgeError::JsonError(_)
            | NudgeError::UrlError(_)
            | NudgeError::RactorError(_)
            | NudgeError::DatabaseError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "An internal server error occurred.",
            ),
        };

        // Detail stays server-side; callers only see the generic message.
        if status.is_server_error() {
            error!(error = ?self, "request failed");
        }

        (
            status,
            Json(ErrorBody {
                error: message.to_string(),
            }),
        )
            .into_response()
    }
}
