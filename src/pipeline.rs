//! Pipeline orchestration: schema -> rows -> metadata -> load control -> sink.
//!
//! One run walks the scheduler plan and, per source group, processes the
//! group's tables in declared order. Failures are caught at the table
//! boundary: a bad table is reported and skipped, and cannot corrupt the
//! load state or outputs of unrelated tables.

use crate::loader::{LoadController, LoadError};
use crate::metadata;
use crate::schedule;
use crate::sink::{Sink, SinkError, WriteResult};
use loadstate::LoadStateStore;
use rand::rngs::StdRng;
use rand::SeedableRng;
use sapling_core::{Config, SimTime, TableSchema};
use sapling_generator::{GeneratorError, RowGenerator};
use std::path::PathBuf;
use tracing::{error, info};

/// Options for one pipeline run.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Directory sink artifacts land in
    pub out_dir: PathBuf,

    /// Run-wide load-type token; table and group settings override it
    pub load_type: String,

    /// Resolved seed for the whole run
    pub seed: u64,

    /// Override every table's configured row count for this invocation
    pub rows: Option<u64>,

    /// Restrict the run to these tables (empty means all)
    pub tables: Vec<String>,

    /// Validate and print the plan without generating anything
    pub dry_run: bool,
}

/// Error that stopped one table's batch. Other tables proceed.
#[derive(Debug, thiserror::Error)]
pub enum TableError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Generator(#[from] GeneratorError),

    #[error(transparent)]
    Sink(#[from] SinkError),
}

impl TableError {
    /// Short error kind for the run report.
    pub fn kind(&self) -> &'static str {
        match self {
            TableError::Load(LoadError::InvalidLoadType { .. }) => "invalid-load-type",
            TableError::Load(LoadError::WatermarkRegression { .. }) => "watermark-regression",
            TableError::Load(_) => "load",
            TableError::Generator(_) => "constraint-violation",
            TableError::Sink(_) => "sink-write",
        }
    }
}

/// Per-table outcome of a run.
#[derive(Debug)]
pub struct TableOutcome {
    /// Table name
    pub table: String,

    /// Owning source group
    pub group: String,

    /// Simulated arrival the batch was tagged with
    pub sim_time: SimTime,

    /// Write result, or what stopped the table
    pub result: Result<WriteResult, TableError>,
}

/// Everything that happened in one run, per table.
#[derive(Debug, Default)]
pub struct RunReport {
    /// Outcomes in emission order
    pub outcomes: Vec<TableOutcome>,
}

impl RunReport {
    /// Whether every table succeeded.
    pub fn success(&self) -> bool {
        self.outcomes.iter().all(|o| o.result.is_ok())
    }

    /// Total rows written across successful tables.
    pub fn rows_written(&self) -> u64 {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().ok())
            .map(|w| w.rows)
            .sum()
    }

    /// Number of failed tables.
    pub fn failed_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.result.is_err()).count()
    }
}

/// Execute one run over a validated configuration.
///
/// The pipeline is single-threaded and synchronous; simulated time is a
/// logical tag on output, never an actual delay.
pub fn run<S: LoadStateStore>(
    config: &Config,
    opts: &RunOptions,
    sink: &dyn Sink,
    controller: &LoadController<S>,
) -> RunReport {
    let mut report = RunReport::default();
    let plan = schedule::plan(&config.groups);

    for emission in plan {
        let group = &config.groups[emission.group];
        info!(
            "Source group '{}' arriving at simulated time {}",
            group.name, emission.sim_time
        );

        for table in &group.tables {
            if !opts.tables.is_empty() && !opts.tables.iter().any(|t| t == &table.name) {
                continue;
            }

            let token = LoadController::<S>::resolve_token(table, group, &opts.load_type);
            let count = opts.rows.unwrap_or(table.rows);

            if opts.dry_run {
                info!(
                    "[dry-run] table '{}': {} rows as '{}' at simulated time {}",
                    table.name, count, token, emission.sim_time
                );
                continue;
            }

            let result = process_table(
                table,
                emission.sim_time,
                token,
                count,
                config,
                opts,
                sink,
                controller,
            );

            match &result {
                Ok(written) => info!(
                    "Table '{}': {} rows written to {}",
                    table.name,
                    written.rows,
                    written.path.display()
                ),
                Err(e) => error!("Table '{}' failed ({}): {}", table.name, e.kind(), e),
            }

            report.outcomes.push(TableOutcome {
                table: table.name.clone(),
                group: group.name.clone(),
                sim_time: emission.sim_time,
                result,
            });
        }
    }

    report
}

#[allow(clippy::too_many_arguments)]
fn process_table<S: LoadStateStore>(
    table: &TableSchema,
    sim_time: SimTime,
    token: &str,
    count: u64,
    config: &Config,
    opts: &RunOptions,
    sink: &dyn Sink,
    controller: &LoadController<S>,
) -> Result<WriteResult, TableError> {
    let plan = controller.plan(table, token)?;

    let mut generator = RowGenerator::new(table.clone(), table_seed(opts.seed, &table.name))
        .with_start_index(plan.start_index);
    let batch = generator.generate(count, plan.load_type, sim_time)?;

    // Verify the watermark before anything touches disk.
    let staged = controller.stage(table, &plan, &batch)?;

    let mut meta_rng = StdRng::seed_from_u64(metadata_seed(opts.seed, &table.name));
    let batch = metadata::apply(batch, &config.metadata, &mut meta_rng);

    let written = sink.write(&batch, &opts.out_dir)?;

    // State advances only once the artifact exists.
    controller.commit(&staged)?;

    Ok(written)
}

/// Per-table RNG stream: tables stay independent of each other's row
/// counts and of run-wide table ordering.
fn table_seed(seed: u64, table: &str) -> u64 {
    seed.wrapping_add(fnv1a(table.as_bytes()))
}

/// Metadata draws from its own stream so audit values do not perturb the
/// data columns.
fn metadata_seed(seed: u64, table: &str) -> u64 {
    table_seed(seed, table).wrapping_add(fnv1a(b"metadata"))
}

fn fnv1a(bytes: &[u8]) -> u64 {
    let mut hash = 0xcbf29ce484222325u64;
    for b in bytes {
        hash ^= *b as u64;
        hash = hash.wrapping_mul(0x100000001b3);
    }
    hash
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::CsvSink;
    use loadstate::FilesystemStore;
    use tempfile::TempDir;

    const USERS_CONFIG: &str = r#"
seed: 42
tables:
  - name: users
    rows: 5
    key: id
    columns:
      - name: id
        type: integer
        generator: sequence
      - name: name
        type: string
        generator: name
metadata:
  - name: created_by
    enabled: true
"#;

    fn options(out_dir: &TempDir, load_type: &str) -> RunOptions {
        RunOptions {
            out_dir: out_dir.path().to_path_buf(),
            load_type: load_type.to_string(),
            seed: 42,
            rows: None,
            tables: Vec::new(),
            dry_run: false,
        }
    }

    #[test]
    fn test_full_then_incremental_scenario() {
        let out = TempDir::new().unwrap();
        let state = TempDir::new().unwrap();

        let config = Config::from_yaml(USERS_CONFIG).unwrap();
        let controller = LoadController::new(FilesystemStore::new(state.path()));

        // First call: full load of 5 rows
        let report = run(&config, &options(&out, "full"), &CsvSink, &controller);
        assert!(report.success());
        assert_eq!(report.rows_written(), 5);

        let full_path = out.path().join("users_full_0.csv");
        let content = std::fs::read_to_string(&full_path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines[0], "id,name,created_by");
        assert_eq!(lines.len(), 6);
        assert!(lines[1].starts_with("1,"));
        assert!(lines[5].starts_with("5,"));

        // Second call: incremental load of 3 rows continues at id 6
        let mut opts = options(&out, "incremental");
        opts.rows = Some(3);
        let report = run(&config, &opts, &CsvSink, &controller);
        assert!(report.success());

        let inc_path = out.path().join("users_incremental_0.csv");
        let content = std::fs::read_to_string(&inc_path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines[0], "id,name,created_by");
        let ids: Vec<&str> = lines[1..]
            .iter()
            .map(|l| l.split(',').next().unwrap())
            .collect();
        assert_eq!(ids, vec!["6", "7", "8"]);
    }

    #[test]
    fn test_seeded_runs_are_identical() {
        let config = Config::from_yaml(USERS_CONFIG).unwrap();

        let mut contents = Vec::new();
        for _ in 0..2 {
            let out = TempDir::new().unwrap();
            let state = TempDir::new().unwrap();
            let controller = LoadController::new(FilesystemStore::new(state.path()));

            let report = run(&config, &options(&out, "full"), &CsvSink, &controller);
            assert!(report.success());

            contents
                .push(std::fs::read_to_string(out.path().join("users_full_0.csv")).unwrap());
        }

        assert_eq!(contents[0], contents[1]);
    }

    #[test]
    fn test_source_groups_stagger_timestamps() {
        let yaml = r#"
tables:
  - name: early_t
    rows: 2
    columns:
      - name: id
        type: integer
        generator: sequence
  - name: late_t
    rows: 2
    columns:
      - name: id
        type: integer
        generator: sequence
source_groups:
  - name: g2
    tables: [late_t]
    offset: 10
  - name: g1
    tables: [early_t]
    offset: 0
"#;
        let out = TempDir::new().unwrap();
        let state = TempDir::new().unwrap();

        let config = Config::from_yaml(yaml).unwrap();
        let controller = LoadController::new(FilesystemStore::new(state.path()));

        let report = run(&config, &options(&out, "full"), &CsvSink, &controller);
        assert!(report.success());

        // g1 emitted first despite being declared second
        assert_eq!(report.outcomes[0].table, "early_t");
        assert_eq!(report.outcomes[1].table, "late_t");

        assert!(out.path().join("early_t_full_0.csv").exists());
        assert!(out.path().join("late_t_full_10.csv").exists());
    }

    #[test]
    fn test_bad_table_does_not_abort_siblings() {
        let yaml = r#"
tables:
  - name: good
    rows: 2
    columns:
      - name: id
        type: integer
        generator: sequence
  - name: bad
    rows: 2
    columns:
      - name: broken
        type: string
        generator: "null"
"#;
        let out = TempDir::new().unwrap();
        let state = TempDir::new().unwrap();

        let config = Config::from_yaml(yaml).unwrap();
        let controller = LoadController::new(FilesystemStore::new(state.path()));

        let report = run(&config, &options(&out, "full"), &CsvSink, &controller);
        assert!(!report.success());
        assert_eq!(report.failed_count(), 1);
        assert_eq!(report.outcomes.len(), 2);

        assert!(out.path().join("good_full_0.csv").exists());
        assert!(!out.path().join("bad_full_0.csv").exists());

        let failed = report
            .outcomes
            .iter()
            .find(|o| o.table == "bad")
            .unwrap();
        assert_eq!(
            failed.result.as_ref().unwrap_err().kind(),
            "constraint-violation"
        );
    }

    #[test]
    fn test_invalid_load_type_is_per_table() {
        let yaml = r#"
tables:
  - name: odd
    rows: 1
    load_type: sideways
    columns:
      - name: id
        type: integer
        generator: sequence
  - name: fine
    rows: 1
    columns:
      - name: id
        type: integer
        generator: sequence
"#;
        let out = TempDir::new().unwrap();
        let state = TempDir::new().unwrap();

        let config = Config::from_yaml(yaml).unwrap();
        let controller = LoadController::new(FilesystemStore::new(state.path()));

        let report = run(&config, &options(&out, "full"), &CsvSink, &controller);
        assert_eq!(report.failed_count(), 1);

        let failed = report.outcomes.iter().find(|o| o.table == "odd").unwrap();
        assert_eq!(failed.result.as_ref().unwrap_err().kind(), "invalid-load-type");
        assert!(out.path().join("fine_full_0.csv").exists());
    }

    #[test]
    fn test_table_filter() {
        let out = TempDir::new().unwrap();
        let state = TempDir::new().unwrap();

        let config = Config::from_yaml(USERS_CONFIG).unwrap();
        let controller = LoadController::new(FilesystemStore::new(state.path()));

        let mut opts = options(&out, "full");
        opts.tables = vec!["nonexistent".to_string()];

        let report = run(&config, &opts, &CsvSink, &controller);
        assert!(report.outcomes.is_empty());
    }

    #[test]
    fn test_dry_run_writes_nothing() {
        let out = TempDir::new().unwrap();
        let state = TempDir::new().unwrap();

        let config = Config::from_yaml(USERS_CONFIG).unwrap();
        let controller = LoadController::new(FilesystemStore::new(state.path()));

        let mut opts = options(&out, "full");
        opts.dry_run = true;

        let report = run(&config, &opts, &CsvSink, &controller);
        assert!(report.success());
        assert!(std::fs::read_dir(out.path()).unwrap().next().is_none());
        assert!(controller.tracked_tables().unwrap().is_empty());
    }
}
