use crate::db::models::{DbUser, NewUser};
use crate::db::schema::SQLITE_INIT;
use crate::error::NudgeError;
use ractor::{Actor, ActorProcessingErr, ActorRef, RpcReplyPort};
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use std::{str::FromStr, time::Duration};
use tracing::info;

#[derive(Debug)]
pub enum DbActorMessage {
    /// Create or fully replace the record for an email.
    UpsertUser(NewUser, RpcReplyPort<Result<(), NudgeError>>),

    /// Fetch one record by email; `None` when the user never connected.
    GetUser(String, RpcReplyPort<Result<Option<DbUser>, NudgeError>>),

    /// List all records, ordered by email.
    ListUsers(RpcReplyPort<Result<Vec<DbUser>, NudgeError>>),

    /// Stamp `last_summary_sent_at` (ms since epoch) for an existing record.
    MarkNotified(String, i64, RpcReplyPort<Result<(), NudgeError>>),
}

/// Cloneable handle to the store actor. Constructed once at startup and passed
/// into the router state and the notifier.
#[derive(Clone)]
pub struct DbActorHandle {
    actor: ActorRef<DbActorMessage>,
}

impl DbActorHandle {
    pub async fn upsert_user(&self, user: NewUser) -> Result<(), NudgeError> {
        ractor::call!(self.actor, DbActorMessage::UpsertUser, user)
            .map_err(|e| NudgeError::RactorError(format!("DbActor UpsertUser RPC failed: {e}")))?
    }

    pub async fn get_user(&self, email: &str) -> Result<Option<DbUser>, NudgeError> {
        ractor::call!(self.actor, DbActorMessage::GetUser, email.to_string())
            .map_err(|e| NudgeError::RactorError(format!("DbActor GetUser RPC failed: {e}")))?
    }

    pub async fn list_users(&self) -> Result<Vec<DbUser>, NudgeError> {
        ractor::call!(self.actor, DbActorMessage::ListUsers)
            .map_err(|e| NudgeError::RactorError(format!("DbActor ListUsers RPC failed: {e}")))?
    }

    pub async fn mark_notified(&self, email: &str, sent_at_millis: i64) -> Result<(), NudgeError> {
        ractor::call!(
            self.actor,
            DbActorMessage::MarkNotified,
            email.to_string(),
            sent_at_millis
        )
        .map_err(|e| NudgeError::RactorError(format!("DbActor MarkNotified RPC failed: {e}")))?
    }
}

struct DbActorState {
    pool: SqlitePool,
}

struct DbActor;

#[ractor::async_trait]
impl Actor for DbActor {
    type Msg = DbActorMessage;
    type State = DbActorState;
    type Arguments = String;

    async fn pre_start(
        &self,
        _myself: ActorRef<Self::Msg>,
        database_url: Self::Arguments,
    ) -> Result<Self::State, ActorProcessingErr> {
        let connect_opts = SqliteConnectOptions::from_str(database_url.as_str())
            .map_err(|e| ActorProcessingErr::from(format!("invalid database url: {e}")))?
            .create_if_missing(true)
            .busy_timeout(Duration::from_secs(5))
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal);

        let pool = SqlitePoolOptions::new()
            .connect_with(connect_opts)
            .await
            .map_err(|e| ActorProcessingErr::from(format!("db connect failed: {e}")))?;

        apply_schema(&pool)
            .await
            .map_err(|e| ActorProcessingErr::from(format!("db schema init failed: {e}")))?;

        info!("DbActor initialized");
        Ok(DbActorState { pool })
    }

    async fn handle(
        &self,
        _myself: ActorRef<Self::Msg>,
        message: Self::Msg,
        state: &mut Self::State,
    ) -> Result<(), ActorProcessingErr> {
        match message {
            DbActorMessage::UpsertUser(user, reply) => {
                let res = self.upsert_user(&state.pool, user).await;
                let _ = reply.send(res);
            }
            DbActorMessage::GetUser(email, reply) => {
                let res = self.get_user(&state.pool, &email).await;
                let _ = reply.send(res);
            }
            DbActorMessage::ListUsers(reply) => {
                let res = self.list_users(&state.pool).await;
                let _ = reply.send(res);
            }
            DbActorMessage::MarkNotified(email, sent_at_millis, reply) => {
                let res = self.mark_notified(&state.pool, &email, sent_at_millis).await;
                let _ = reply.send(res);
            }
        }
        Ok(())
    }
}

impl DbActor {
    /// Full replacement on conflict: re-authenticating resets the stored
    /// credentials, the webhook URL and the daily-send stamp.
    async fn upsert_user(&self, pool: &SqlitePool, user: NewUser) -> Result<(), NudgeError> {
        sqlx::query(
            r"
        INSERT INTO users (
            email, access_token, refresh_token, token_type, scope, expiry_date, webhook_url, last_summary_sent_at
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, NULL)
        ON CONFLICT(email) DO UPDATE SET
            access_token=excluded.access_token,
            refresh_token=excluded.refresh_token,
            token_type=excluded.token_type,
            scope=excluded.scope,
            expiry_date=excluded.expiry_date,
            webhook_url=excluded.webhook_url,
            last_summary_sent_at=NULL
        ",
        )
        .bind(user.email)
        .bind(user.access_token)
        .bind(user.refresh_token)
        .bind(user.token_type)
        .bind(user.scope)
        .bind(user.expiry_date)
        .bind(user.webhook_url)
        .execute(pool)
        .await?;

        Ok(())
    }

    async fn get_user(&self, pool: &SqlitePool, email: &str) -> Result<Option<DbUser>, NudgeError> {
        let row = sqlx::query_as::<_, DbUser>(
            r"
        SELECT email, access_token, refresh_token, token_type, scope, expiry_date, webhook_url, last_summary_sent_at
        FROM users
        WHERE email = ?
        ",
        )
        .bind(email)
        .fetch_optional(pool)
        .await?;

        Ok(row)
    }

    async fn list_users(&self, pool: &SqlitePool) -> Result<Vec<DbUser>, NudgeError> {
        let rows = sqlx::query_as::<_, DbUser>(
            r"
        SELECT email, access_token, refresh_token, token_type, scope, expiry_date, webhook_url, last_summary_sent_at
        FROM users
        ORDER BY email
        ",
        )
        .fetch_all(pool)
        .await?;

        Ok(rows)
    }

    async fn mark_notified(
        &self,
        pool: &SqlitePool,
        email: &str,
        sent_at_millis: i64,
    ) -> Result<(), NudgeError> {
        let result = sqlx::query("UPDATE users SET last_summary_sent_at = ? WHERE email = ?")
            .bind(sent_at_millis)
            .bind(email)
            .execute(pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(NudgeError::UserNotConnected(email.to_string()));
        }
        Ok(())
    }
}

/// Spawn the database actor and return a cloneable handle.
pub async fn spawn(database_url: &str) -> DbActorHandle {
    let (actor, _jh) = ractor::Actor::spawn(
        Some("DbActor".to_string()),
        DbActor,
        database_url.to_string(),
    )
    .await
    .expect("failed to spawn DbActor");

    DbActorHandle { actor }
}

async fn apply_schema(pool: &SqlitePool) -> Result<(), NudgeError> {
    for stmt in SQLITE_INIT.split(';') {
        let s = stmt.trim();
        if s.is_empty() {
            continue;
        }
        sqlx::query(s).execute(pool).await?;
    }
    Ok(())
}
