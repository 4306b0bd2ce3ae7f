use crate::{error::NudgeError, router::AppState};
use axum::{
    Json,
    extract::State,
};
use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Debug, Deserialize)]
pub struct SendEmailRequest {
    pub to: Option<String>,
    pub subject: Option<String>,
    pub body: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SendEmailResponse {
    pub success: bool,
}

/// POST /send-email
///
/// Used by the external automation system: looks up the recipient's stored
/// credentials and sends the message as that user.
pub async fn send_email(
    State(state): State<AppState>,
    Json(req): Json<SendEmailRequest>,
) -> Result<Json<SendEmailResponse>, NudgeError> {
    let (Some(to), Some(subject), Some(body)) = (
        req.to.filter(|s| !s.is_empty()),
        req.subject.filter(|s| !s.is_empty()),
        req.body.filter(|s| !s.is_empty()),
    ) else {
        return Err(NudgeError::MissingFields);
    };

    let user = state
        .db
        .get_user(&to)
        .await?
        .ok_or_else(|| NudgeError::UserNotConnected(to.clone()))?;

    state
        .mailer
        .send(&to, &subject, &body, &user.access_token)
        .await?;

    info!(%to, "email dispatched with stored credentials");
    Ok(Json(SendEmailResponse { success: true }))
}
