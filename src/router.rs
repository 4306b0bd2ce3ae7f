use crate::config::CONFIG;
use crate::db::DbActorHandle;
use crate::gmail::GmailSender;
use crate::handlers::oauth_flow::{google_oauth_callback, google_oauth_entry};
use crate::handlers::send_email::send_email;
use axum::{
    Router,
    http::StatusCode,
    routing::{get, post},
};
use std::time::Duration;
use tower_http::trace::TraceLayer;

/// Shared state: the store handle and outbound HTTP plumbing, constructed once
/// at startup and injected into every handler.
#[derive(Clone)]
pub struct AppState {
    pub db: DbActorHandle,
    pub http: reqwest::Client,
    pub mailer: GmailSender,
}

impl AppState {
    pub fn new(db: DbActorHandle) -> Self {
        let http = reqwest::Client::builder()
            .user_agent(concat!("dailynudge/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(30))
            .build()
            .expect("FATAL: initialize outbound HTTP client failed");

        let mailer = GmailSender::new(http.clone(), CONFIG.google.gmail_send_uri.clone());

        Self { db, http, mailer }
    }
}

async fn health() -> &'static str {
    "dailynudge backend is running"
}

async fn success_page() -> &'static str {
    "Gmail connected successfully. You can close this tab."
}

async fn not_found_handler() -> StatusCode {
    StatusCode::NOT_FOUND
}

pub fn app_router(state: AppState) -> Router {
    let oauth = Router::new()
        .route("/auth/google", get(google_oauth_entry))
        .route("/auth/google/callback", get(google_oauth_callback))
        .route("/success", get(success_page));

    Router::new()
        .route("/", get(health))
        .route("/send-email", post(send_email))
        .merge(oauth)
        .fallback(not_found_handler)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
