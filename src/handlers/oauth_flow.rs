use crate::{
    config::CONFIG,
    db::NewUser,
    error::NudgeError,
    google_oauth::{GoogleOauthOps, endpoints::GoogleOauthEndpoints},
    router::AppState,
};
use axum::{
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tracing::{error, info};

#[derive(Debug, Deserialize)]
pub struct AuthCallbackQuery {
    pub code: Option<String>,
}

/// GET /auth/google
pub async fn google_oauth_entry() -> Result<impl IntoResponse, NudgeError> {
    let auth_url = GoogleOauthEndpoints::build_authorize_url(&CONFIG.google)?;
    info!("dispatching OAuth consent redirect");
    Ok(Redirect::temporary(auth_url.as_str()))
}

/// GET /auth/google/callback
///
/// A request without a `code` is rejected before any provider contact.
pub async fn google_oauth_callback(
    State(state): State<AppState>,
    Query(query): Query<AuthCallbackQuery>,
) -> Response {
    let Some(code) = query.code.filter(|c| !c.is_empty()) else {
        return NudgeError::MissingFields.into_response();
    };

    match process_oauth_exchange(&state, code).await {
        Ok(email) => {
            info!(%email, "gmail account connected, tokens saved");
            Redirect::to("/success").into_response()
        }
        Err(err) => {
            error!("OAuth failure: {err:?}");
            err.into_response()
        }
    }
}

async fn process_oauth_exchange(state: &AppState, code: String) -> Result<String, NudgeError> {
    let tokens = GoogleOauthOps::exchange_code(&CONFIG.google, code, &state.http).await?;

    let record = NewUser {
        email: tokens.email.clone(),
        access_token: tokens.access_token,
        refresh_token: tokens.refresh_token,
        token_type: tokens.token_type,
        scope: tokens.scope,
        expiry_date: tokens.expiry_date,
        webhook_url: CONFIG
            .notifier
            .default_webhook_url
            .as_ref()
            .map(|u| u.as_str().to_string()),
    };
    state.db.upsert_user(record).await?;

    Ok(tokens.email)
}
