//! SQL DDL for initializing the database schema.
//! SQLite-first design; can be adapted for other RDBMS.

/// SQLite schema: one `users` table, one row per connected Gmail identity.
///
/// `last_summary_sent_at` is compared by calendar date (not exact timestamp)
/// to gate at most one notifier trigger per user per day.
pub const SQLITE_INIT: &str = r"
CREATE TABLE IF NOT EXISTS users (
    email TEXT PRIMARY KEY NOT NULL,
    access_token TEXT NOT NULL,
    refresh_token TEXT NOT NULL,
    token_type TEXT NULL,
    scope TEXT NULL,
    expiry_date INTEGER NOT NULL, -- ms since epoch
    webhook_url TEXT NULL,
    last_summary_sent_at INTEGER NULL -- ms since epoch
);

CREATE INDEX IF NOT EXISTS idx_users_last_sent ON users(last_summary_sent_at);
";
