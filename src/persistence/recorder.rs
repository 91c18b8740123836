//! Background tasks that keep PostgreSQL in step with in-memory state.
//!
//! - [`restore_state`] loads the latest snapshots at startup.
//! - [`spawn_event_log`] appends every bus event to `ticketing_log`.
//! - [`spawn_snapshots`] periodically writes changed aggregates to
//!   `snapshots` and prunes old rows.

use std::collections::HashMap;
use std::hash::{DefaultHasher, Hash, Hasher};
use std::time::Duration;

use serde::de::DeserializeOwned;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use uuid::Uuid;

use super::models::SnapshotKind;
use super::postgres::PostgresPersistence;
use crate::app_state::AppState;
use crate::domain::{Account, Event, EventBus, Purchase};
use crate::error::TicketingError;

/// How many aggregates of each kind were loaded by [`restore_state`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RestoreReport {
    /// Events restored.
    pub events: usize,
    /// Accounts restored.
    pub accounts: usize,
    /// Purchases restored.
    pub purchases: usize,
}

/// Remembers what was last written per aggregate so unchanged ones are
/// skipped.
#[derive(Debug, Default)]
pub struct SnapshotCache {
    written: HashMap<(SnapshotKind, Uuid), u64>,
}

fn digest(state: &serde_json::Value) -> u64 {
    let mut hasher = DefaultHasher::new();
    state.to_string().hash(&mut hasher);
    hasher.finish()
}

impl SnapshotCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// `true` if `state` differs from the last state recorded for the
    /// aggregate with [`SnapshotCache::mark_written`].
    #[must_use]
    pub fn changed(&self, kind: SnapshotKind, id: Uuid, state: &serde_json::Value) -> bool {
        self.written.get(&(kind, id)) != Some(&digest(state))
    }

    /// Records `rows` as stored. Call only once the write succeeded.
    pub fn mark_written(&mut self, kind: SnapshotKind, rows: &[(Uuid, serde_json::Value)]) {
        for (id, state) in rows {
            self.written.insert((kind, *id), digest(state));
        }
    }
}

async fn load_kind<T: DeserializeOwned>(
    db: &PostgresPersistence,
    kind: SnapshotKind,
) -> Result<Vec<T>, TicketingError> {
    let rows = db.load_latest_snapshots(kind).await?;
    let mut items = Vec::with_capacity(rows.len());
    for row in rows {
        match serde_json::from_value(row.state_json) {
            Ok(item) => items.push(item),
            Err(e) => {
                tracing::warn!(%kind, entity_id = %row.entity_id, error = %e, "skipping unreadable snapshot");
            }
        }
    }
    Ok(items)
}

/// Loads the latest snapshot of every aggregate into `state`.
///
/// # Errors
///
/// Returns a [`TicketingError::PersistenceError`] if the snapshots cannot
/// be read.
pub async fn restore_state(
    db: &PostgresPersistence,
    state: &AppState,
) -> Result<RestoreReport, TicketingError> {
    let accounts: Vec<Account> = load_kind(db, SnapshotKind::Account).await?;
    let events: Vec<Event> = load_kind(db, SnapshotKind::Event).await?;
    let purchases: Vec<Purchase> = load_kind(db, SnapshotKind::Purchase).await?;

    let report = RestoreReport {
        accounts: state.account_service.directory().restore(accounts).await,
        events: state.ticket_service.registry().restore(events).await,
        purchases: state.ticket_service.ledger().restore(purchases).await,
    };
    tracing::info!(
        events = report.events,
        accounts = report.accounts,
        purchases = report.purchases,
        "state restored from snapshots"
    );
    Ok(report)
}

fn changed_rows<T, F>(
    cache: &SnapshotCache,
    kind: SnapshotKind,
    items: &[T],
    id_of: F,
) -> Vec<(Uuid, serde_json::Value)>
where
    T: serde::Serialize,
    F: Fn(&T) -> Uuid,
{
    items
        .iter()
        .filter_map(|item| {
            let id = id_of(item);
            match serde_json::to_value(item) {
                Ok(value) => cache.changed(kind, id, &value).then_some((id, value)),
                Err(e) => {
                    tracing::warn!(%kind, entity_id = %id, error = %e, "snapshot serialization failed");
                    None
                }
            }
        })
        .collect()
}

/// Writes every aggregate that changed since the last successful write.
/// Returns how many rows were written.
///
/// Events, purchases and accounts are copied as one consistent cut. Rows
/// of a kind whose write fails stay pending and are retried next call.
///
/// # Errors
///
/// Returns a [`TicketingError::PersistenceError`] on database failure.
pub async fn snapshot_once(
    db: &PostgresPersistence,
    state: &AppState,
    cache: &mut SnapshotCache,
) -> Result<usize, TicketingError> {
    let snapshot = state.ticket_service.state_snapshot().await;

    let mut written = 0;
    let rows = changed_rows(cache, SnapshotKind::Event, &snapshot.events, |e| *e.id.as_uuid());
    written += db.save_snapshots(SnapshotKind::Event, &rows).await?;
    cache.mark_written(SnapshotKind::Event, &rows);

    let rows = changed_rows(cache, SnapshotKind::Account, &snapshot.accounts, |a| {
        *a.id.as_uuid()
    });
    written += db.save_snapshots(SnapshotKind::Account, &rows).await?;
    cache.mark_written(SnapshotKind::Account, &rows);

    let rows = changed_rows(cache, SnapshotKind::Purchase, &snapshot.purchases, |p| {
        *p.id.as_uuid()
    });
    written += db.save_snapshots(SnapshotKind::Purchase, &rows).await?;
    cache.mark_written(SnapshotKind::Purchase, &rows);
    Ok(written)
}

/// Appends every event published on `event_bus` to the ticketing log.
/// The task ends when the bus closes.
pub fn spawn_event_log(db: PostgresPersistence, event_bus: &EventBus) -> JoinHandle<()> {
    let mut rx = event_bus.subscribe();
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(event) => {
                    if let Err(e) = db.append_log(&event).await {
                        tracing::error!(
                            event_type = event.event_type_str(),
                            error = %e,
                            "failed to append ticketing log"
                        );
                    }
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(lagged = n, "ticketing log fell behind the event bus");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
        tracing::debug!("ticketing log writer stopped");
    })
}

/// Snapshots state every `interval_secs` and, when `cleanup_after_days`
/// is non-zero, prunes older snapshots.
pub fn spawn_snapshots(
    db: PostgresPersistence,
    state: AppState,
    interval_secs: u64,
    cleanup_after_days: u64,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut cache = SnapshotCache::new();
        let mut ticker = tokio::time::interval(Duration::from_secs(interval_secs.max(1)));
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            match snapshot_once(&db, &state, &mut cache).await {
                Ok(0) => {}
                Ok(written) => tracing::debug!(written, "snapshots saved"),
                Err(e) => tracing::error!(error = %e, "snapshot failed"),
            }
            if cleanup_after_days > 0 {
                match db.delete_old_snapshots(cleanup_after_days).await {
                    Ok(0) => {}
                    Ok(deleted) => tracing::info!(deleted, "old snapshots pruned"),
                    Err(e) => tracing::error!(error = %e, "snapshot cleanup failed"),
                }
            }
        }
    })
}
