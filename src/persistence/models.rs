//! Database models for the ticketing log and state snapshots.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Which aggregate a snapshot row holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SnapshotKind {
    /// An [`crate::domain::Event`] with its tier inventory.
    Event,
    /// An [`crate::domain::Account`] with its holdings.
    Account,
    /// A [`crate::domain::Purchase`] record.
    Purchase,
}

impl SnapshotKind {
    /// All kinds, in restore order.
    pub const ALL: [Self; 3] = [Self::Account, Self::Event, Self::Purchase];

    /// Value stored in the `kind` column.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Event => "event",
            Self::Account => "account",
            Self::Purchase => "purchase",
        }
    }
}

impl fmt::Display for SnapshotKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A row from the `snapshots` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotRow {
    /// Auto-increment row ID.
    pub id: i64,
    /// Aggregate kind.
    pub kind: String,
    /// Aggregate ID.
    pub entity_id: Uuid,
    /// Serialized aggregate.
    pub state_json: serde_json::Value,
    /// Snapshot timestamp.
    pub snapshot_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn restore_order_loads_accounts_first() {
        assert_eq!(SnapshotKind::ALL.first(), Some(&SnapshotKind::Account));
        assert_eq!(SnapshotKind::Purchase.to_string(), "purchase");
    }
}
