//! Fires the daily notifier at a fixed wall-clock time in the configured
//! offset. The loop awaits each run to completion before computing the next
//! fire time, so overlapping runs cannot happen.

use super::run_once;
use crate::config::NotifierConfig;
use crate::db::DbActorHandle;
use chrono::{DateTime, Duration as ChronoDuration, FixedOffset, NaiveTime, Utc};
use std::time::Duration;
use tracing::info;

/// Spawn the background scheduler task.
pub fn spawn(
    db: DbActorHandle,
    http: reqwest::Client,
    cfg: NotifierConfig,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let tz = cfg.reference_tz();
        info!(
            hour = cfg.hour,
            minute = cfg.minute,
            timezone = %cfg.timezone,
            "daily notifier scheduler started"
        );

        loop {
            let wait = duration_until_next_run(Utc::now(), &cfg, tz);
            info!(seconds = wait.as_secs(), "next daily notifier run scheduled");
            tokio::time::sleep(wait).await;

            let report = run_once(&db, &http, tz).await;
            info!(
                triggered = report.triggered,
                skipped = report.skipped,
                failed = report.failed,
                "daily notifier run finished"
            );
        }
    })
}

/// Time until the next occurrence of `HH:MM` in the reference offset.
fn duration_until_next_run(
    now_utc: DateTime<Utc>,
    cfg: &NotifierConfig,
    tz: FixedOffset,
) -> Duration {
    let now_local = now_utc.with_timezone(&tz);

    let fire_time = NaiveTime::from_hms_opt(
        u32::from(cfg.hour.min(23)),
        u32::from(cfg.minute.min(59)),
        0,
    )
    .unwrap_or(NaiveTime::MIN);

    let mut next_local = now_local.date_naive().and_time(fire_time);
    if next_local <= now_local.naive_local() {
        next_local += ChronoDuration::days(1);
    }

    // A fixed offset maps every local time to exactly one instant.
    match next_local.and_local_timezone(tz).single() {
        Some(next) => (next - now_local).to_std().unwrap_or(Duration::ZERO),
        None => Duration::from_secs(60),
    }
}
