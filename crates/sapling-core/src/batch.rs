//! Batch and load-semantics tags.
//!
//! A [`Batch`] is the generated in-memory rows for one table for one
//! invocation, tagged with the load type and the source group's simulated
//! arrival time. It is owned by the pipeline for the duration of one run and
//! handed to exactly one sink call.

use crate::values::Value;
use chrono::{DateTime, TimeZone, Utc};

/// How a batch relates to previously emitted data for the same table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadType {
    /// Complete, self-contained snapshot superseding prior state
    Full,
    /// Only new rows since the last emitted watermark
    Incremental,
}

impl LoadType {
    /// Parse a load-type token (case-insensitive). Returns `None` for
    /// anything other than `full` / `incremental`.
    pub fn parse(token: &str) -> Option<LoadType> {
        match token.to_ascii_lowercase().as_str() {
            "full" => Some(LoadType::Full),
            "incremental" => Some(LoadType::Incremental),
            _ => None,
        }
    }

    /// Token form, used in state files and output file names.
    pub fn as_str(&self) -> &'static str {
        match self {
            LoadType::Full => "full",
            LoadType::Incremental => "incremental",
        }
    }
}

impl std::fmt::Display for LoadType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Simulated arrival time of a source group.
///
/// This is a logical timestamp attached to output, never an actual delay.
/// Relative offsets render as the bare second count so staggered artifacts
/// sort naturally; absolute arrivals render as a compact UTC stamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimTime {
    /// Seconds relative to the run's logical origin
    Offset(i64),
    /// Absolute arrival time
    At(DateTime<Utc>),
}

impl SimTime {
    /// The absolute instant this simulated time denotes, used for ordering.
    /// Relative offsets count from the Unix epoch.
    pub fn instant(&self) -> DateTime<Utc> {
        match self {
            SimTime::Offset(secs) => Utc
                .timestamp_opt(*secs, 0)
                .single()
                .unwrap_or_default(),
            SimTime::At(dt) => *dt,
        }
    }

    /// Filename-safe stamp: `0` / `10` for offsets, `20240601T120000Z` for
    /// absolute arrivals.
    pub fn stamp(&self) -> String {
        match self {
            SimTime::Offset(secs) => secs.to_string(),
            SimTime::At(dt) => dt.format("%Y%m%dT%H%M%SZ").to_string(),
        }
    }
}

impl std::fmt::Display for SimTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.stamp())
    }
}

/// Generated rows for one table for one invocation.
///
/// Rows are positionally aligned with `columns`; the metadata injector may
/// append audit columns to both before the batch reaches a sink.
#[derive(Debug, Clone)]
pub struct Batch {
    /// Table the rows belong to
    pub table: String,

    /// Column names in output order
    pub columns: Vec<String>,

    /// Row values, one `Vec<Value>` per row, aligned with `columns`
    pub rows: Vec<Vec<Value>>,

    /// Load semantics this batch was produced under
    pub load_type: LoadType,

    /// Simulated arrival time of the owning source group
    pub sim_time: SimTime,
}

impl Batch {
    /// Number of rows in the batch.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Position of a column by name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }
}
