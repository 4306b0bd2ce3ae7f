//! Daily notifier: visits every stored user once per run, fires each user's
//! reminder webhook at most once per calendar day and stamps the record on
//! success.

pub mod scheduler;

use crate::db::DbActorHandle;
use crate::error::NudgeError;
use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use serde_json::json;
use tracing::{error, info, warn};

/// Per-run counters, logged by the scheduler and asserted in tests.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct NotifierRunReport {
    /// Webhook fired and record stamped.
    pub triggered: usize,
    /// Already notified today, or no webhook URL on the record.
    pub skipped: usize,
    /// Webhook or store failure; record left unchanged.
    pub failed: usize,
}

/// One notifier pass over all stored users.
///
/// Users are processed sequentially; a failure for one user is logged and
/// never aborts the remaining users. The calendar-day gate is evaluated in
/// the fixed reference offset `tz`.
pub async fn run_once(
    db: &DbActorHandle,
    http: &reqwest::Client,
    tz: FixedOffset,
) -> NotifierRunReport {
    let mut report = NotifierRunReport::default();

    let users = match db.list_users().await {
        Ok(users) => users,
        Err(e) => {
            error!(error = %e, "daily notifier could not list users");
            return report;
        }
    };

    let today = Utc::now().with_timezone(&tz).date_naive();

    for user in users {
        if calendar_date(user.last_summary_sent_at, tz) == Some(today) {
            info!(email = %user.email, "already notified today, skipping");
            report.skipped += 1;
            continue;
        }

        let Some(webhook_url) = user.webhook_url.as_deref() else {
            warn!(email = %user.email, "record has no webhook url, skipping");
            report.skipped += 1;
            continue;
        };

        match trigger_webhook(http, webhook_url, &user.email).await {
            Ok(()) => {
                let now_millis = Utc::now().timestamp_millis();
                match db.mark_notified(&user.email, now_millis).await {
                    Ok(()) => {
                        info!(email = %user.email, "reminder webhook triggered");
                        report.triggered += 1;
                    }
                    Err(e) => {
                        // Record stays unstamped; the user is retried on the
                        // next run.
                        error!(email = %user.email, error = %e, "failed to stamp notified record");
                        report.failed += 1;
                    }
                }
            }
            Err(e) => {
                error!(email = %user.email, error = %e, "reminder webhook failed");
                report.failed += 1;
            }
        }
    }

    report
}

/// POST `{"userEmail": ...}` to the user's reminder webhook. The webhook
/// decides the reminder content; this system only decides who to notify.
async fn trigger_webhook(
    http: &reqwest::Client,
    webhook_url: &str,
    email: &str,
) -> Result<(), NudgeError> {
    let resp = http
        .post(webhook_url)
        .json(&json!({ "userEmail": email }))
        .send()
        .await
        .map_err(|e| NudgeError::Webhook {
            reason: e.to_string(),
        })?;

    if !resp.status().is_success() {
        return Err(NudgeError::Webhook {
            reason: format!("webhook returned {}", resp.status()),
        });
    }
    Ok(())
}

/// Calendar date of a ms-since-epoch stamp in the reference offset.
fn calendar_date(millis: Option<i64>, tz: FixedOffset) -> Option<NaiveDate> {
    millis
        .and_then(DateTime::from_timestamp_millis)
        .map(|dt| dt.with_timezone(&tz).date_naive())
}
