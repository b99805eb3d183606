//! The persisted per-table load state record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Load state for one table, persisted across invocations.
///
/// Created on the first emission for a table, updated on every subsequent
/// emission, and deleted only by an explicit reset. `rows_emitted` doubles
/// as the next row index for incremental generation.
///
/// # File Format
///
/// ```json
/// {
///     "table": "users",
///     "last_load_type": "incremental",
///     "watermark": 8,
///     "rows_emitted": 8,
///     "updated_at": "2024-01-01T00:00:00Z"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadState {
    /// Table this state belongs to
    pub table: String,

    /// Load type applied by the most recent emission ("full"/"incremental")
    pub last_load_type: String,

    /// Highest key value emitted so far; `None` for tables without a
    /// designated key column
    pub watermark: Option<i64>,

    /// Cumulative rows emitted since the last full load; also the next
    /// generation index
    pub rows_emitted: u64,

    /// When this state was last written
    pub updated_at: DateTime<Utc>,
}

impl LoadState {
    /// Build a fresh state record stamped with the current time.
    pub fn new(
        table: impl Into<String>,
        last_load_type: impl Into<String>,
        watermark: Option<i64>,
        rows_emitted: u64,
    ) -> Self {
        Self {
            table: table.into(),
            last_load_type: last_load_type.into(),
            watermark,
            rows_emitted,
            updated_at: Utc::now(),
        }
    }
}
