use chrono::FixedOffset;
use serde::{Deserialize, Serialize};
use tracing::warn;
use url::Url;

/// Daily notifier and scheduler configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NotifierConfig {
    /// Whether the daily scheduler task is spawned at startup.
    /// TOML: `notifier.enabled`. Default: `true`.
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Webhook URL written into a user record when the account is connected.
    /// Each record carries its own URL; the notifier never falls back to a
    /// shared endpoint.
    /// TOML: `notifier.default_webhook_url`.
    #[serde(default)]
    pub default_webhook_url: Option<Url>,

    /// Fixed UTC offset for the calendar-day gate and the schedule,
    /// as `"+05:30"` / `"-08:00"`. Default: `+05:30`.
    #[serde(default = "default_timezone")]
    pub timezone: String,

    /// Hour of day (0-23, in `timezone`) at which the daily run fires.
    /// TOML: `notifier.hour`. Default: `8`.
    #[serde(default = "default_hour")]
    pub hour: u8,

    /// Minute of `hour` at which the daily run fires.
    /// TOML: `notifier.minute`. Default: `0`.
    #[serde(default)]
    pub minute: u8,
}

impl NotifierConfig {
    /// Parse the configured offset; falls back to UTC on a malformed value.
    pub fn reference_tz(&self) -> FixedOffset {
        self.timezone.parse().unwrap_or_else(|_| {
            warn!(
                timezone = %self.timezone,
                "invalid notifier.timezone offset, falling back to UTC"
            );
            FixedOffset::east_opt(0).unwrap_or_else(|| unreachable!("zero offset is valid"))
        })
    }
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            default_webhook_url: None,
            timezone: default_timezone(),
            hour: default_hour(),
            minute: 0,
        }
    }
}

fn default_enabled() -> bool {
    true
}

fn default_timezone() -> String {
    "+05:30".to_string()
}

fn default_hour() -> u8 {
    8
}
