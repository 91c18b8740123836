//! PostgreSQL implementation of the persistence layer.

use std::time::Duration;

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use uuid::Uuid;

use super::models::{SnapshotKind, SnapshotRow};
use crate::config::TicketingConfig;
use crate::domain::TicketingEvent;
use crate::error::TicketingError;

fn db_error(e: impl std::fmt::Display) -> TicketingError {
    TicketingError::PersistenceError(e.to_string())
}

/// PostgreSQL-backed persistence layer using `sqlx::PgPool`.
#[derive(Debug, Clone)]
pub struct PostgresPersistence {
    pool: PgPool,
}

impl PostgresPersistence {
    /// Creates a new persistence layer with the given connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Opens a connection pool sized from `config`.
    ///
    /// # Errors
    ///
    /// Returns a [`TicketingError::PersistenceError`] if the database is
    /// unreachable.
    pub async fn connect(config: &TicketingConfig) -> Result<Self, TicketingError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.database_max_connections)
            .min_connections(config.database_min_connections)
            .acquire_timeout(Duration::from_secs(config.database_connect_timeout_secs))
            .connect(&config.database_url)
            .await
            .map_err(db_error)?;
        Ok(Self::new(pool))
    }

    /// Applies the embedded migrations.
    ///
    /// # Errors
    ///
    /// Returns a [`TicketingError::PersistenceError`] if a migration fails.
    pub async fn migrate(&self) -> Result<(), TicketingError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(db_error)
    }

    /// Appends a domain event to the ticketing log.
    ///
    /// # Errors
    ///
    /// Returns a [`TicketingError::PersistenceError`] on database failure.
    pub async fn append_log(&self, event: &TicketingEvent) -> Result<i64, TicketingError> {
        let payload = serde_json::to_value(event).map_err(db_error)?;
        sqlx::query_scalar::<_, i64>(
            "INSERT INTO ticketing_log (event_id, event_type, payload) VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(*event.event_id().as_uuid())
        .bind(event.event_type_str())
        .bind(payload)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error)
    }

    /// Saves a batch of snapshots of one kind in a single transaction.
    ///
    /// # Errors
    ///
    /// Returns a [`TicketingError::PersistenceError`] on database failure;
    /// nothing from the batch is written in that case.
    pub async fn save_snapshots(
        &self,
        kind: SnapshotKind,
        rows: &[(Uuid, serde_json::Value)],
    ) -> Result<usize, TicketingError> {
        if rows.is_empty() {
            return Ok(0);
        }
        let mut tx = self.pool.begin().await.map_err(db_error)?;
        for (entity_id, state_json) in rows {
            sqlx::query("INSERT INTO snapshots (kind, entity_id, state_json) VALUES ($1, $2, $3)")
                .bind(kind.as_str())
                .bind(entity_id)
                .bind(state_json)
                .execute(&mut *tx)
                .await
                .map_err(db_error)?;
        }
        tx.commit().await.map_err(db_error)?;
        Ok(rows.len())
    }

    /// Loads the latest snapshot of every entity of `kind` using
    /// `DISTINCT ON`.
    ///
    /// # Errors
    ///
    /// Returns a [`TicketingError::PersistenceError`] on database failure.
    pub async fn load_latest_snapshots(
        &self,
        kind: SnapshotKind,
    ) -> Result<Vec<SnapshotRow>, TicketingError> {
        let rows = sqlx::query_as::<_, (i64, String, Uuid, serde_json::Value, DateTime<Utc>)>(
            "SELECT DISTINCT ON (entity_id) id, kind, entity_id, state_json, snapshot_at \
             FROM snapshots WHERE kind = $1 ORDER BY entity_id, snapshot_at DESC, id DESC",
        )
        .bind(kind.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;

        Ok(rows
            .into_iter()
            .map(|(id, kind, entity_id, state_json, snapshot_at)| SnapshotRow {
                id,
                kind,
                entity_id,
                state_json,
                snapshot_at,
            })
            .collect())
    }

    /// Deletes snapshots older than the given number of days, keeping the
    /// latest row of every entity.
    ///
    /// # Errors
    ///
    /// Returns a [`TicketingError::PersistenceError`] on database failure.
    pub async fn delete_old_snapshots(&self, before_days: u64) -> Result<u64, TicketingError> {
        let cutoff = i64::try_from(before_days)
            .ok()
            .and_then(chrono::Duration::try_days)
            .and_then(|age| Utc::now().checked_sub_signed(age))
            .unwrap_or(DateTime::<Utc>::MIN_UTC);

        let result = sqlx::query(
            "DELETE FROM snapshots WHERE snapshot_at < $1 AND id NOT IN ( \
                SELECT DISTINCT ON (kind, entity_id) id FROM snapshots \
                ORDER BY kind, entity_id, snapshot_at DESC, id DESC)",
        )
        .bind(cutoff)
        .execute(&self.pool)
        .await
        .map_err(db_error)?;

        Ok(result.rows_affected())
    }
}
