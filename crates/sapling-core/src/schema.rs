//! Declarative configuration: parse and validation.
//!
//! Parsing is two-phase. Serde first deserializes the raw document, then
//! [`Config::validate`] resolves it into the typed model: source groups with
//! owned table schemas, registry-validated generator specs, and a checked
//! metadata policy. Validation either succeeds completely or fails with a
//! [`ConfigError`] naming the offending table/column path; a partially
//! constructed schema is never observable.
//!
//! ## YAML Format
//!
//! ```yaml
//! seed: 42
//! tables:
//!   - name: users
//!     rows: 5
//!     key: id
//!     columns:
//!       - name: id
//!         type: integer
//!         generator: sequence
//!       - name: name
//!         type: string
//!         generator: name
//! metadata:
//!   - name: created_by
//!     enabled: true
//! source_groups:
//!   - name: g1
//!     tables: [users]
//!     offset: 0
//! ```
//!
//! Tables and groups are sequences of named entries; names are validated
//! unique, so the sequence is semantically a name-keyed mapping that keeps
//! declaration order.

use crate::batch::SimTime;
use crate::registry::{self, GeneratorSpec};
use crate::types::LogicalType;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;

/// Error produced while parsing or validating a configuration.
///
/// All variants are fatal for the whole run: nothing is generated from an
/// invalid configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Error reading the config file
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    /// Error parsing YAML
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Two tables share a name
    #[error("Duplicate table name '{0}'")]
    DuplicateTable(String),

    /// Two columns in one table share a name
    #[error("Duplicate column '{column}' in table '{table}'")]
    DuplicateColumn { table: String, column: String },

    /// Two source groups share a name
    #[error("Duplicate source group name '{0}'")]
    DuplicateGroup(String),

    /// Two metadata columns share a name
    #[error("Duplicate metadata column '{0}'")]
    DuplicateMetadata(String),

    /// A column references a generator id missing from the registry
    #[error("Unknown generator '{generator}' for column '{table}.{column}'")]
    UnknownGenerator {
        table: String,
        column: String,
        generator: String,
    },

    /// Generator parameters failed validation
    #[error("Invalid parameters for generator '{generator}' on column '{table}.{column}': {reason}")]
    BadGeneratorParams {
        table: String,
        column: String,
        generator: String,
        reason: String,
    },

    /// Generator output cannot feed the column's declared type
    #[error("Generator '{generator}' cannot produce values of type '{ty}' for column '{table}.{column}'")]
    GeneratorTypeMismatch {
        table: String,
        column: String,
        generator: String,
        ty: String,
    },

    /// A metadata column references an unknown generator
    #[error("Unknown generator '{generator}' for metadata column '{column}'")]
    UnknownMetadataGenerator { column: String, generator: String },

    /// Metadata generator parameters failed validation
    #[error("Invalid parameters for generator '{generator}' on metadata column '{column}': {reason}")]
    BadMetadataParams {
        column: String,
        generator: String,
        reason: String,
    },

    /// The declared key column does not exist
    #[error("Key column '{key}' is not declared in table '{table}'")]
    KeyColumnMissing { table: String, key: String },

    /// The key column's generator cannot provide a monotonic watermark
    #[error("Key column '{key}' of table '{table}' must use the 'sequence' generator to be incremental-eligible")]
    KeyColumnNotSequence { table: String, key: String },

    /// A metadata column collides with a declared column
    #[error("Metadata column '{column}' collides with a declared column in table '{table}'")]
    MetadataCollision { table: String, column: String },

    /// A source group references a table that does not exist
    #[error("Source group '{group}' references unknown table '{table}'")]
    GroupUnknownTable { group: String, table: String },

    /// A table appears in more than one source group
    #[error("Table '{table}' is assigned to more than one source group")]
    TableInMultipleGroups { table: String },

    /// Groups were declared but a table belongs to none of them
    #[error("Table '{table}' is not assigned to any source group")]
    TableUnassigned { table: String },

    /// A group's arrival time could not be interpreted
    #[error("Invalid arrival time for source group '{group}': {reason}")]
    BadArrival { group: String, reason: String },
}

// ============================================================================
// Raw (wire) representation
// ============================================================================

#[derive(Debug, Deserialize)]
struct RawConfig {
    #[serde(default)]
    seed: Option<u64>,
    tables: Vec<RawTable>,
    #[serde(default)]
    metadata: Vec<RawMetadataColumn>,
    #[serde(default)]
    source_groups: Vec<RawGroup>,
}

#[derive(Debug, Deserialize)]
struct RawTable {
    name: String,
    rows: u64,
    #[serde(default)]
    key: Option<String>,
    #[serde(default)]
    load_type: Option<String>,
    columns: Vec<RawColumn>,
}

#[derive(Debug, Deserialize)]
struct RawColumn {
    name: String,
    #[serde(rename = "type")]
    logical_type: LogicalType,
    generator: String,
    #[serde(default)]
    params: serde_yaml::Mapping,
    #[serde(default)]
    nullable: bool,
}

fn default_enabled() -> bool {
    true
}

#[derive(Debug, Deserialize)]
struct RawMetadataColumn {
    name: String,
    #[serde(default = "default_enabled")]
    enabled: bool,
    #[serde(default)]
    generator: Option<String>,
    #[serde(default)]
    params: serde_yaml::Mapping,
    #[serde(default)]
    cardinality: Cardinality,
}

#[derive(Debug, Deserialize)]
struct RawGroup {
    name: String,
    tables: Vec<String>,
    #[serde(default)]
    offset: Option<i64>,
    #[serde(default)]
    arrives_at: Option<String>,
    #[serde(default)]
    load_type: Option<String>,
}

// ============================================================================
// Validated model
// ============================================================================

/// A single column of a table schema.
#[derive(Debug, Clone)]
pub struct ColumnSpec {
    /// Column name
    pub name: String,

    /// Declared logical type
    pub logical_type: LogicalType,

    /// Validated generator configuration
    pub generator: GeneratorSpec,

    /// Whether null values are permitted
    pub nullable: bool,
}

/// Schema of one table: ordered columns plus generation targets.
#[derive(Debug, Clone)]
pub struct TableSchema {
    /// Table name (unique across the configuration)
    pub name: String,

    /// Row count target per invocation
    pub rows: u64,

    /// Designated primary-key column; required for incremental loads
    pub key: Option<String>,

    /// Per-table load-type override token (resolved at load time)
    pub load_type: Option<String>,

    /// Columns in declaration order
    pub columns: Vec<ColumnSpec>,
}

impl TableSchema {
    /// Get a column by name.
    pub fn get_column(&self, name: &str) -> Option<&ColumnSpec> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Column names in declaration order.
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }
}

/// How often a metadata value is generated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cardinality {
    /// One value per batch, stamped on every row ("who ran this load")
    #[default]
    PerBatch,
    /// A fresh value per row
    PerRow,
}

/// One optional audit column.
#[derive(Debug, Clone)]
pub struct MetadataColumn {
    /// Column name appended to the output
    pub name: String,

    /// Disabled columns are omitted entirely, never emitted as null
    pub enabled: bool,

    /// Validated generator configuration
    pub generator: GeneratorSpec,

    /// Per-batch (default) or per-row generation
    pub cardinality: Cardinality,
}

/// The configured set of audit columns, in declaration order.
#[derive(Debug, Clone, Default)]
pub struct MetadataPolicy {
    pub columns: Vec<MetadataColumn>,
}

impl MetadataPolicy {
    /// Metadata columns that will actually be emitted.
    pub fn enabled(&self) -> impl Iterator<Item = &MetadataColumn> {
        self.columns.iter().filter(|c| c.enabled)
    }
}

/// A set of tables that arrive together at a shared simulated time.
#[derive(Debug, Clone)]
pub struct SourceGroup {
    /// Group name (unique)
    pub name: String,

    /// Simulated arrival time
    pub arrival: SimTime,

    /// Default load-type token for member tables
    pub load_type: Option<String>,

    /// Member tables in declared order
    pub tables: Vec<TableSchema>,
}

/// Fully validated configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Optional deterministic seed for the whole run
    pub seed: Option<u64>,

    /// Source groups in declaration order (every table lives in exactly one)
    pub groups: Vec<SourceGroup>,

    /// Audit column policy shared by all tables
    pub metadata: MetadataPolicy,
}

impl Config {
    /// Load and validate a configuration from a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse and validate a configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let raw: RawConfig = serde_yaml::from_str(yaml)?;
        validate(raw)
    }

    /// All tables across all groups, in group order then declared order.
    pub fn tables(&self) -> impl Iterator<Item = &TableSchema> {
        self.groups.iter().flat_map(|g| g.tables.iter())
    }

    /// Look up a table by name.
    pub fn get_table(&self, name: &str) -> Option<&TableSchema> {
        self.tables().find(|t| t.name == name)
    }
}

// ============================================================================
// Validation
// ============================================================================

fn validate(raw: RawConfig) -> Result<Config, ConfigError> {
    let mut tables = Vec::with_capacity(raw.tables.len());
    let mut seen_tables = HashSet::new();

    for raw_table in raw.tables {
        if !seen_tables.insert(raw_table.name.clone()) {
            return Err(ConfigError::DuplicateTable(raw_table.name));
        }
        tables.push(validate_table(raw_table)?);
    }

    let metadata = validate_metadata(raw.metadata, &tables)?;
    let groups = validate_groups(raw.source_groups, tables)?;

    Ok(Config {
        seed: raw.seed,
        groups,
        metadata,
    })
}

fn validate_table(raw: RawTable) -> Result<TableSchema, ConfigError> {
    let mut columns = Vec::with_capacity(raw.columns.len());
    let mut seen = HashSet::new();

    for raw_col in raw.columns {
        if !seen.insert(raw_col.name.clone()) {
            return Err(ConfigError::DuplicateColumn {
                table: raw.name,
                column: raw_col.name,
            });
        }

        let kind = registry::resolve(&raw_col.generator).ok_or_else(|| {
            ConfigError::UnknownGenerator {
                table: raw.name.clone(),
                column: raw_col.name.clone(),
                generator: raw_col.generator.clone(),
            }
        })?;

        let spec = kind.validate(&raw_col.params).map_err(|reason| {
            ConfigError::BadGeneratorParams {
                table: raw.name.clone(),
                column: raw_col.name.clone(),
                generator: raw_col.generator.clone(),
                reason,
            }
        })?;

        if !spec.feeds(&raw_col.logical_type) {
            return Err(ConfigError::GeneratorTypeMismatch {
                table: raw.name,
                column: raw_col.name,
                generator: raw_col.generator,
                ty: raw_col.logical_type.to_string(),
            });
        }

        columns.push(ColumnSpec {
            name: raw_col.name,
            logical_type: raw_col.logical_type,
            generator: spec,
            nullable: raw_col.nullable,
        });
    }

    if let Some(key) = &raw.key {
        let key_col = columns.iter().find(|c| c.name == *key).ok_or_else(|| {
            ConfigError::KeyColumnMissing {
                table: raw.name.clone(),
                key: key.clone(),
            }
        })?;

        // Incremental watermarks require a monotonic key.
        if !matches!(key_col.generator, GeneratorSpec::Sequence { .. }) {
            return Err(ConfigError::KeyColumnNotSequence {
                table: raw.name,
                key: key.clone(),
            });
        }
    }

    Ok(TableSchema {
        name: raw.name,
        rows: raw.rows,
        key: raw.key,
        load_type: raw.load_type,
        columns,
    })
}

fn validate_metadata(
    raw: Vec<RawMetadataColumn>,
    tables: &[TableSchema],
) -> Result<MetadataPolicy, ConfigError> {
    let mut columns = Vec::with_capacity(raw.len());
    let mut seen = HashSet::new();

    for raw_col in raw {
        if !seen.insert(raw_col.name.clone()) {
            return Err(ConfigError::DuplicateMetadata(raw_col.name));
        }

        for table in tables {
            if table.get_column(&raw_col.name).is_some() {
                return Err(ConfigError::MetadataCollision {
                    table: table.name.clone(),
                    column: raw_col.name,
                });
            }
        }

        // Audit columns default to a person name, "who ran this load".
        let generator_id = raw_col.generator.as_deref().unwrap_or("name");

        let kind = registry::resolve(generator_id).ok_or_else(|| {
            ConfigError::UnknownMetadataGenerator {
                column: raw_col.name.clone(),
                generator: generator_id.to_string(),
            }
        })?;

        let spec = kind
            .validate(&raw_col.params)
            .map_err(|reason| ConfigError::BadMetadataParams {
                column: raw_col.name.clone(),
                generator: generator_id.to_string(),
                reason,
            })?;

        columns.push(MetadataColumn {
            name: raw_col.name,
            enabled: raw_col.enabled,
            generator: spec,
            cardinality: raw_col.cardinality,
        });
    }

    Ok(MetadataPolicy { columns })
}

fn validate_groups(
    raw_groups: Vec<RawGroup>,
    tables: Vec<TableSchema>,
) -> Result<Vec<SourceGroup>, ConfigError> {
    // No groups declared: everything arrives together at offset 0.
    if raw_groups.is_empty() {
        return Ok(vec![SourceGroup {
            name: "default".to_string(),
            arrival: SimTime::Offset(0),
            load_type: None,
            tables,
        }]);
    }

    let mut by_name: HashMap<String, TableSchema> =
        tables.into_iter().map(|t| (t.name.clone(), t)).collect();

    let mut groups = Vec::with_capacity(raw_groups.len());
    let mut seen_groups = HashSet::new();

    for raw_group in raw_groups {
        if !seen_groups.insert(raw_group.name.clone()) {
            return Err(ConfigError::DuplicateGroup(raw_group.name));
        }

        let arrival = parse_arrival(&raw_group)?;

        let mut members = Vec::with_capacity(raw_group.tables.len());
        for table_name in &raw_group.tables {
            match by_name.remove(table_name) {
                Some(table) => members.push(table),
                None => {
                    // Already claimed (by an earlier group or earlier in
                    // this one), or never declared.
                    let claimed = seen_claimed(&groups, table_name)
                        || members.iter().any(|t: &TableSchema| t.name == *table_name);
                    return Err(if claimed {
                        ConfigError::TableInMultipleGroups {
                            table: table_name.clone(),
                        }
                    } else {
                        ConfigError::GroupUnknownTable {
                            group: raw_group.name.clone(),
                            table: table_name.clone(),
                        }
                    });
                }
            }
        }

        groups.push(SourceGroup {
            name: raw_group.name,
            arrival,
            load_type: raw_group.load_type,
            tables: members,
        });
    }

    if let Some(orphan) = by_name.into_keys().next() {
        return Err(ConfigError::TableUnassigned { table: orphan });
    }

    Ok(groups)
}

fn seen_claimed(groups: &[SourceGroup], table_name: &str) -> bool {
    groups
        .iter()
        .any(|g| g.tables.iter().any(|t| t.name == table_name))
}

fn parse_arrival(raw: &RawGroup) -> Result<SimTime, ConfigError> {
    match (raw.offset, &raw.arrives_at) {
        (Some(_), Some(_)) => Err(ConfigError::BadArrival {
            group: raw.name.clone(),
            reason: "specify either 'offset' or 'arrives_at', not both".to_string(),
        }),
        (Some(secs), None) => Ok(SimTime::Offset(secs)),
        (None, Some(stamp)) => {
            let dt: DateTime<Utc> = DateTime::parse_from_rfc3339(stamp)
                .map_err(|e| ConfigError::BadArrival {
                    group: raw.name.clone(),
                    reason: format!("'{stamp}' is not RFC 3339: {e}"),
                })?
                .with_timezone(&Utc);
            Ok(SimTime::At(dt))
        }
        (None, None) => Ok(SimTime::Offset(0)),
    }
}

// ============================================================================
// Tests
// ============================================================================
