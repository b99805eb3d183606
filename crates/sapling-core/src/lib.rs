//! Core types for datasapling.
//!
//! This crate owns the schema model: the declarative YAML configuration,
//! its validated in-memory form, the logical type and value universe, the
//! field generator registry, and the batch/load-semantics tags shared by
//! the generator and the pipeline.
//!
//! # Architecture
//!
//! ```text
//! YAML document
//!      │  Config::from_yaml (parse + validate, all-or-nothing)
//!      ▼
//! Config { groups: [SourceGroup { tables: [TableSchema] }], metadata }
//!      │
//!      ▼
//! sapling-generator (RowGenerator) ──▶ Batch ──▶ sinks
//! ```
//!
//! Generator identifiers are resolved against [`registry`] during
//! validation, so an unknown generator or a bad parameter fails the parse
//! with the offending table/column named, before any generation happens.

pub mod batch;
pub mod registry;
pub mod schema;
pub mod types;
pub mod values;

// Re-exports for convenience
pub use batch::{Batch, LoadType, SimTime};
pub use registry::{resolve, GeneratorKind, GeneratorSpec};
pub use schema::{
    Cardinality, ColumnSpec, Config, ConfigError, MetadataColumn, MetadataPolicy, SourceGroup,
    TableSchema,
};
pub use types::LogicalType;
pub use values::Value;
