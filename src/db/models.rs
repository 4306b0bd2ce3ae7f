use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// One connected Gmail identity, keyed by email.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, FromRow)]
pub struct DbUser {
    pub email: String,
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: Option<String>,
    pub scope: Option<String>,
    /// Access token expiry, ms since epoch.
    pub expiry_date: i64,
    /// Per-user reminder webhook endpoint. A record without one is skipped by
    /// the notifier.
    pub webhook_url: Option<String>,
    /// Last successful notifier trigger, ms since epoch. NULL until the first
    /// trigger; reset on re-authentication.
    pub last_summary_sent_at: Option<i64>,
}

/// Payload for creating or fully replacing a user row after an OAuth exchange.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: Option<String>,
    pub scope: Option<String>,
    pub expiry_date: i64,
    pub webhook_url: Option<String>,
}
