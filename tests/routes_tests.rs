use axum::{
    Json, Router,
    body::{Body, to_bytes},
    extract::State,
    http::{Request, StatusCode, header},
    routing::post,
};
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use dailynudge::db::NewUser;
use dailynudge::gmail::GmailSender;
use dailynudge::router::{AppState, app_router};
use serde_json::{Value, json};
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::fs;
use tower::ServiceExt;

/// (bearer token, request body) pairs captured by the Gmail mock.
type SendCalls = Arc<Mutex<Vec<(String, Value)>>>;

fn unique_sqlite_path(prefix: &str) -> std::path::PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system time before UNIX_EPOCH")
        .as_nanos();

    let mut temp_path = std::env::temp_dir();
    temp_path.push(format!(
        "dailynudge-{prefix}-{}-{}.sqlite",
        std::process::id(),
        nanos
    ));
    temp_path
}

async fn capture_send(
    State(calls): State<SendCalls>,
    headers: axum::http::HeaderMap,
    Json(body): Json<Value>,
) -> Json<Value> {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .unwrap_or_default()
        .to_string();
    calls.lock().expect("calls lock poisoned").push((bearer, body));
    Json(json!({ "id": "msg-1" }))
}

/// Local stand-in for the Gmail messages.send endpoint.
async fn spawn_gmail_mock(calls: SendCalls) -> String {
    let app = Router::new()
        .route("/gmail/send", post(capture_send))
        .with_state(calls);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind gmail mock listener");
    let addr = listener.local_addr().expect("gmail mock local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("gmail mock server");
    });
    format!("http://{addr}/gmail/send")
}

async fn body_json(resp: axum::response::Response) -> Value {
    let bytes = to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("read response body");
    serde_json::from_slice(&bytes).expect("response body was not json")
}

fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("failed to build request")
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .expect("failed to build request")
}

#[tokio::test]
async fn http_surface_contracts() {
    // NOTE: `dailynudge::db::spawn()` registers a singleton ractor actor by
    // name within a process. Keep all route assertions in one test.
    let temp_path = unique_sqlite_path("routes");
    let database_url = format!("sqlite:{}", temp_path.display());
    let db = dailynudge::db::spawn(&database_url).await;

    let calls: SendCalls = Arc::new(Mutex::new(Vec::new()));
    let gmail_endpoint = spawn_gmail_mock(calls.clone()).await;

    let http = reqwest::Client::new();
    let state = AppState {
        db: db.clone(),
        http: http.clone(),
        mailer: GmailSender::new(
            http,
            url::Url::parse(&gmail_endpoint).expect("valid mock url"),
        ),
    };
    let app = app_router(state);

    // Liveness and terminal UX pages.
    let resp = app.clone().oneshot(get("/")).await.expect("request failed");
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = app
        .clone()
        .oneshot(get("/success"))
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = app
        .clone()
        .oneshot(get("/definitely-not-a-route"))
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    // OAuth entry redirects to the Google consent screen.
    let resp = app
        .clone()
        .oneshot(get("/auth/google"))
        .await
        .expect("request failed");
    assert!(resp.status().is_redirection());
    let location = resp
        .headers()
        .get(header::LOCATION)
        .expect("missing location header")
        .to_str()
        .expect("location header was not utf-8");
    assert!(location.starts_with("https://accounts.google.com/o/oauth2/v2/auth"));
    assert!(location.contains("access_type=offline"));

    // Callback without a code is rejected before any provider contact.
    let resp = app
        .clone()
        .oneshot(get("/auth/google/callback"))
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    // send-email with missing fields.
    let resp = app
        .clone()
        .oneshot(post_json("/send-email", &json!({ "to": "a@x.com" })))
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(resp).await,
        json!({ "error": "Missing fields" })
    );

    // send-email for a user that never connected: 400, no send attempt.
    let resp = app
        .clone()
        .oneshot(post_json(
            "/send-email",
            &json!({ "to": "ghost@x.com", "subject": "Hi", "body": "Hello" }),
        ))
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(resp).await,
        json!({ "error": "User not connected" })
    );
    assert!(calls.lock().expect("calls lock poisoned").is_empty());

    // Connect a user, then send.
    db.upsert_user(NewUser {
        email: "a@x.com".to_string(),
        access_token: "tok-123".to_string(),
        refresh_token: "refresh-123".to_string(),
        token_type: Some("Bearer".to_string()),
        scope: None,
        expiry_date: 1_900_000_000_000,
        webhook_url: None,
    })
    .await
    .unwrap();

    let resp = app
        .clone()
        .oneshot(post_json(
            "/send-email",
            &json!({ "to": "a@x.com", "subject": "Hello", "body": "Daily reminder" }),
        ))
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await, json!({ "success": true }));

    let calls = calls.lock().expect("calls lock poisoned");
    assert_eq!(calls.len(), 1);
    let (bearer, body) = &calls[0];
    assert_eq!(bearer, "tok-123");

    let expected_raw = URL_SAFE_NO_PAD.encode(
        "To: a@x.com\r\nSubject: Hello\r\nContent-Type: text/plain; charset=utf-8\r\n\r\nDaily reminder",
    );
    assert_eq!(
        body.get("raw").and_then(Value::as_str),
        Some(expected_raw.as_str())
    );

    let wal_path = std::path::PathBuf::from(format!("{}-wal", temp_path.to_string_lossy()));
    let shm_path = std::path::PathBuf::from(format!("{}-shm", temp_path.to_string_lossy()));
    let _ = fs::remove_file(&wal_path).await;
    let _ = fs::remove_file(&shm_path).await;
    fs::remove_file(&temp_path).await.unwrap();
}
