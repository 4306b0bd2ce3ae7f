use crate::{config::GoogleConfig, error::NudgeError};
use oauth2::{
    AuthUrl, AuthorizationCode, Client as OAuth2Client, ClientId, ClientSecret, CsrfToken,
    EndpointNotSet, EndpointSet, ExtraTokenFields, RedirectUrl, Scope, StandardRevocableToken,
    StandardTokenResponse, TokenUrl,
    basic::{
        BasicErrorResponse, BasicRevocationErrorResponse, BasicTokenIntrospectionResponse,
        BasicTokenType,
    },
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::LazyLock;
use tracing::info;

/// Stateless Google OAuth endpoints.
pub(crate) struct GoogleOauthEndpoints;

pub(crate) static DEFAULT_SCOPES: LazyLock<Vec<Scope>> = LazyLock::new(|| {
    vec![
        Scope::new("https://www.googleapis.com/auth/gmail.send".to_string()),
        Scope::new("https://www.googleapis.com/auth/gmail.readonly".to_string()),
        Scope::new("https://www.googleapis.com/auth/userinfo.email".to_string()),
    ]
});

impl GoogleOauthEndpoints {
    /// Build the consent URL: offline access (so a refresh token is issued),
    /// forced re-consent, default scopes.
    pub(crate) fn build_authorize_url(cfg: &GoogleConfig) -> Result<url::Url, NudgeError> {
        let client = build_oauth2_client(cfg)?;
        let mut req = client
            .authorize_url(CsrfToken::new_random)
            .add_extra_param("access_type", "offline")
            .add_extra_param("prompt", "consent");

        for scope in DEFAULT_SCOPES.iter() {
            req = req.add_scope(scope.clone());
        }

        // The callback contract is `code`-only; the state parameter is not
        // round-tripped.
        let (auth_url, _csrf_token) = req.url();
        Ok(auth_url)
    }

    /// Exchange an authorization code for tokens.
    pub(crate) async fn exchange_authorization_code(
        cfg: &GoogleConfig,
        code: AuthorizationCode,
        http_client: reqwest::Client,
    ) -> Result<GoogleTokenResponse, NudgeError> {
        let token_result: GoogleTokenResponse = build_oauth2_client(cfg)?
            .exchange_code(code)
            .request_async(&http_client)
            .await?;
        info!("OAuth2 code exchange completed successfully");
        Ok(token_result)
    }

    /// Resolve the authenticated account's email via the userinfo endpoint.
    pub(crate) async fn fetch_userinfo_email(
        cfg: &GoogleConfig,
        access_token: impl AsRef<str>,
        http_client: reqwest::Client,
    ) -> Result<Option<String>, NudgeError> {
        let resp = http_client
            .get(cfg.userinfo_uri.clone())
            .bearer_auth(access_token.as_ref())
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(NudgeError::IdentityLookup(format!(
                "userinfo endpoint returned {}",
                resp.status()
            )));
        }

        let body: Value = resp.json().await?;
        Ok(body
            .get("email")
            .and_then(Value::as_str)
            .map(str::to_owned))
    }
}

/// Build a Google OAuth2 client from the configured credentials.
///
/// Constructed fresh per operation; the client is never stored in shared
/// state, so no credential context can bleed between concurrent requests.
fn build_oauth2_client(cfg: &GoogleConfig) -> Result<GoogleOauth2Client, NudgeError> {
    let client = OAuth2Client::new(ClientId::new(cfg.client_id.clone()))
        .set_client_secret(ClientSecret::new(cfg.client_secret.clone()))
        .set_auth_uri(AuthUrl::new(cfg.auth_uri.as_str().to_string())?)
        .set_token_uri(TokenUrl::new(cfg.token_uri.as_str().to_string())?)
        .set_redirect_uri(RedirectUrl::new(cfg.redirect_uri.clone())?);
    Ok(client)
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub(crate) struct GoogleTokenField {
    #[serde(rename = "id_token")]
    pub id_token: Option<String>,
}
impl ExtraTokenFields for GoogleTokenField {}

pub(crate) type GoogleTokenResponse = StandardTokenResponse<GoogleTokenField, BasicTokenType>;

pub(crate) type GoogleOauth2Client<
    HasAuthUrl = EndpointSet,
    HasDeviceAuthUrl = EndpointNotSet,
    HasIntrospectionUrl = EndpointNotSet,
    HasRevocationUrl = EndpointNotSet,
    HasTokenUrl = EndpointSet,
> = OAuth2Client<
    BasicErrorResponse,
    GoogleTokenResponse,
    BasicTokenIntrospectionResponse,
    StandardRevocableToken,
    BasicRevocationErrorResponse,
    HasAuthUrl,
    HasDeviceAuthUrl,
    HasIntrospectionUrl,
    HasRevocationUrl,
    HasTokenUrl,
>;
