use axum::{Json, Router, extract::State, http::StatusCode, routing::post};
use chrono::{FixedOffset, Utc};
use dailynudge::db::NewUser;
use dailynudge::notifier::{NotifierRunReport, run_once};
use serde_json::Value;
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::fs;

type Hits = Arc<Mutex<Vec<Value>>>;

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

async fn capture_hook(State(hits): State<Hits>, Json(payload): Json<Value>) -> StatusCode {
    hits.lock().expect("hits lock poisoned").push(payload);
    StatusCode::OK
}

async fn failing_hook() -> StatusCode {
    StatusCode::INTERNAL_SERVER_ERROR
}

/// Local stand-in for the external automation system: `/hook` records the
/// payload, `/fail` always rejects.
async fn spawn_webhook_server(hits: Hits) -> String {
    let app = Router::new()
        .route("/hook", post(capture_hook))
        .route("/fail", post(failing_hook))
        .with_state(hits);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind webhook listener");
    let addr = listener.local_addr().expect("webhook local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("webhook server");
    });
    format!("http://{addr}")
}

fn connected_user(email: &str, webhook_url: Option<String>) -> NewUser {
    NewUser {
        email: email.to_string(),
        access_token: "tok".to_string(),
        refresh_token: "refresh".to_string(),
        token_type: Some("Bearer".to_string()),
        scope: None,
        expiry_date: 1_900_000_000_000,
        webhook_url,
    }
}

#[tokio::test]
async fn notifier_gates_per_day_and_isolates_failures() {
    // NOTE: `dailynudge::db::spawn()` registers a singleton ractor actor by
    // name within a process. Keep all notifier assertions in one test.
    let temp_path = unique_sqlite_path("notifier");
    let database_url = format!("sqlite:{}", temp_path.display());
    let db = dailynudge::db::spawn(&database_url).await;

    let hits: Hits = Arc::new(Mutex::new(Vec::new()));
    let base = spawn_webhook_server(hits.clone()).await;
    let http = reqwest::Client::new();
    let tz = FixedOffset::east_opt(0).expect("valid offset");

    db.upsert_user(connected_user("a@x.com", Some(format!("{base}/hook"))))
        .await
        .unwrap();
    db.upsert_user(connected_user("b@x.com", Some(format!("{base}/fail"))))
        .await
        .unwrap();
    db.upsert_user(connected_user("c@x.com", Some(format!("{base}/hook"))))
        .await
        .unwrap();
    db.upsert_user(connected_user("d@x.com", None))
        .await
        .unwrap();

    // c was already notified today.
    db.mark_notified("c@x.com", Utc::now().timestamp_millis())
        .await
        .unwrap();

    // First run: a triggers, b fails, c and d are skipped.
    let report = run_once(&db, &http, tz).await;
    assert_eq!(
        report,
        NotifierRunReport {
            triggered: 1,
            skipped: 2,
            failed: 1,
        }
    );

    {
        let hits = hits.lock().expect("hits lock poisoned");
        assert_eq!(hits.len(), 1, "exactly one webhook call expected");
        assert_eq!(
            hits[0].get("userEmail").and_then(Value::as_str),
            Some("a@x.com")
        );
    }

    let today = Utc::now().with_timezone(&tz).date_naive();
    let a = db.get_user("a@x.com").await.unwrap().unwrap();
    let a_stamp = a
        .last_summary_sent_at
        .and_then(chrono::DateTime::from_timestamp_millis)
        .map(|dt| dt.with_timezone(&tz).date_naive());
    assert_eq!(a_stamp, Some(today), "successful trigger stamps today");

    // b's webhook failed: record untouched so b is retried next run.
    let b = db.get_user("b@x.com").await.unwrap().unwrap();
    assert_eq!(b.last_summary_sent_at, None);
    let d = db.get_user("d@x.com").await.unwrap().unwrap();
    assert_eq!(d.last_summary_sent_at, None);

    // Second run the same day: a joins the skip set, b fails again, no new
    // webhook call reaches the capture endpoint.
    let report = run_once(&db, &http, tz).await;
    assert_eq!(
        report,
        NotifierRunReport {
            triggered: 0,
            skipped: 3,
            failed: 1,
        }
    );
    assert_eq!(hits.lock().expect("hits lock poisoned").len(), 1);

    let wal_path = std::path::PathBuf::from(format!("{}-wal", temp_path.to_string_lossy()));
    let shm_path = std::path::PathBuf::from(format!("{}-shm", temp_path.to_string_lossy()));
    let _ = fs::remove_file(&wal_path).await;
    let _ = fs::remove_file(&shm_path).await;
    fs::remove_file(&temp_path).await.unwrap();
}
