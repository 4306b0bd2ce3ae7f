use super::endpoints::GoogleOauthEndpoints;
use super::utils::attach_email_from_id_token;
use crate::config::GoogleConfig;
use crate::error::{NudgeError, OauthError};
use chrono::Utc;
use oauth2::AuthorizationCode;
use serde_json::Value;
use tracing::debug;

/// Result of a completed code exchange, ready to be persisted.
#[derive(Debug, Clone)]
pub struct ExchangedTokens {
    pub email: String,
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: Option<String>,
    pub scope: Option<String>,
    /// Access token expiry, ms since epoch.
    pub expiry_date: i64,
}

/// Operations layer composing the Google OAuth endpoints.
pub struct GoogleOauthOps;

const DEFAULT_EXPIRES_IN_SECS: i64 = 3600;

impl GoogleOauthOps {
    /// Exchange an authorization code and resolve the authenticated email.
    ///
    /// The email comes from the `id_token` claim when present; otherwise the
    /// userinfo endpoint is queried with the fresh access token. Exhausting
    /// both is an identity lookup failure.
    pub async fn exchange_code(
        cfg: &GoogleConfig,
        code: String,
        http_client: &reqwest::Client,
    ) -> Result<ExchangedTokens, NudgeError> {
        let token_response = GoogleOauthEndpoints::exchange_authorization_code(
            cfg,
            AuthorizationCode::new(code),
            http_client.clone(),
        )
        .await?;

        let mut payload: Value = serde_json::to_value(&token_response)?;
        debug!("token response payload received");
        attach_email_from_id_token(&mut payload);

        let access_token = payload
            .get("access_token")
            .and_then(Value::as_str)
            .map(str::to_owned)
            .ok_or_else(|| {
                NudgeError::AuthExchange(OauthError::Other {
                    message: "token response carried no access_token".to_string(),
                })
            })?;

        let refresh_token = payload
            .get("refresh_token")
            .and_then(Value::as_str)
            .map(str::to_owned)
            .ok_or_else(|| {
                NudgeError::AuthExchange(OauthError::Other {
                    message: "missing refresh_token (check access_type=offline)".to_string(),
                })
            })?;

        let email = match payload.get("email").and_then(Value::as_str) {
            Some(email) => email.to_owned(),
            None => {
                GoogleOauthEndpoints::fetch_userinfo_email(cfg, &access_token, http_client.clone())
                    .await?
                    .ok_or_else(|| {
                        NudgeError::IdentityLookup(
                            "no email claim in id_token and none from userinfo".to_string(),
                        )
                    })?
            }
        };

        let expires_in = payload
            .get("expires_in")
            .and_then(Value::as_i64)
            .unwrap_or(DEFAULT_EXPIRES_IN_SECS);
        let expiry_date = (Utc::now() + chrono::Duration::seconds(expires_in)).timestamp_millis();

        let token_type = payload
            .get("token_type")
            .and_then(Value::as_str)
            .map(str::to_owned);
        let scope = payload
            .get("scope")
            .and_then(Value::as_str)
            .map(str::to_owned);

        Ok(ExchangedTokens {
            email,
            access_token,
            refresh_token,
            token_type,
            scope,
            expiry_date,
        })
    }
}
