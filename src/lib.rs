//! DataSapling Library
//!
//! A simulator that stands in for upstream data sources during pipeline
//! testing. Given a declarative YAML schema it generates deterministic,
//! type-correct synthetic rows, injects optional audit metadata, and emits
//! batches through pluggable sinks while honoring full vs. incremental load
//! semantics and time-staggered arrival across source groups.
//!
//! # Features
//!
//! - Deterministic generation: one seeded RNG per table, same seed same data
//! - Full loads: complete snapshots that reset the table's watermark
//! - Incremental loads: new rows strictly after the last emitted key
//! - Source groups: independent simulated arrival times per set of tables
//! - Pluggable sinks: CSV and TSV today, one file per batch
//!
//! # Pipeline
//!
//! ```text
//! Config (sapling-core)
//!    │
//!    ▼  per source group, ordered by simulated arrival (schedule)
//! RowGenerator (sapling-generator)
//!    │
//!    ▼
//! LoadController (loader) ── LoadState (loadstate)
//!    │
//!    ▼
//! Metadata injector (metadata)
//!    │
//!    ▼
//! CsvSink / TsvSink (sink)
//! ```
//!
//! # CLI Usage
//!
//! ```bash
//! # Full load of every table
//! datasapling run --config config.yml --out-dir ./out
//!
//! # Incremental load continuing after the stored watermarks
//! datasapling run --config config.yml --out-dir ./out --load-type incremental
//!
//! # Drop the stored watermarks
//! datasapling reset --state-dir .datasapling-state
//! ```

pub mod loader;
pub mod metadata;
pub mod pipeline;
pub mod schedule;
pub mod sink;

// Re-exports for convenience
pub use loader::{LoadController, LoadError, LoadPlan};
pub use pipeline::{run, RunOptions, RunReport, TableError, TableOutcome};
pub use schedule::{plan, Emission};
pub use sink::{CsvSink, Sink, SinkError, TsvSink, WriteResult};
