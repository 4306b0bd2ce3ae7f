use serde::{Deserialize, Serialize};
use url::Url;

/// Google OAuth client and API endpoint configuration.
///
/// The endpoint URLs default to the public Google endpoints and only need to
/// be overridden for tests or local mocks.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GoogleConfig {
    /// OAuth client id from the Google Cloud console.
    /// TOML: `google.client_id`.
    #[serde(default)]
    pub client_id: String,

    /// OAuth client secret from the Google Cloud console.
    /// TOML: `google.client_secret`.
    #[serde(default)]
    pub client_secret: String,

    /// Redirect URI registered for the OAuth client; must point at
    /// `/auth/google/callback` on this server.
    /// TOML: `google.redirect_uri`.
    #[serde(default = "default_redirect_uri")]
    pub redirect_uri: String,

    /// Authorization (consent screen) endpoint.
    #[serde(default = "default_auth_uri")]
    pub auth_uri: Url,

    /// Token exchange endpoint.
    #[serde(default = "default_token_uri")]
    pub token_uri: Url,

    /// Userinfo endpoint, used to resolve the authenticated email when the
    /// `id_token` carries no email claim.
    #[serde(default = "default_userinfo_uri")]
    pub userinfo_uri: Url,

    /// Gmail send endpoint for `users/me`.
    #[serde(default = "default_gmail_send_uri")]
    pub gmail_send_uri: Url,
}

impl Default for GoogleConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: String::new(),
            redirect_uri: default_redirect_uri(),
            auth_uri: default_auth_uri(),
            token_uri: default_token_uri(),
            userinfo_uri: default_userinfo_uri(),
            gmail_send_uri: default_gmail_send_uri(),
        }
    }
}

fn default_redirect_uri() -> String {
    "http://localhost:3000/auth/google/callback".to_string()
}

fn default_auth_uri() -> Url {
    Url::parse("https://accounts.google.com/o/oauth2/v2/auth").expect("valid default auth uri")
}

fn default_token_uri() -> Url {
    Url::parse("https://oauth2.googleapis.com/token").expect("valid default token uri")
}

fn default_userinfo_uri() -> Url {
    Url::parse("https://www.googleapis.com/oauth2/v2/userinfo").expect("valid default userinfo uri")
}

fn default_gmail_send_uri() -> Url {
    Url::parse("https://gmail.googleapis.com/gmail/v1/users/me/messages/send")
        .expect("valid default gmail send uri")
}
