//! Load controller: the full/incremental state machine.
//!
//! Each table moves through `UNINITIALIZED -> FULL_LOADED ->
//! INCREMENTAL_APPENDED (self-loop)`, with an explicit reset back to
//! `UNINITIALIZED`. The controller owns the persisted [`LoadState`]
//! exclusively: it decides before generation where a batch starts
//! ([`LoadController::plan`]), verifies after generation that the batch
//! honors the watermark ([`LoadController::stage`]), and persists the new
//! state only once the sink write has succeeded
//! ([`LoadController::commit`]). An error at any step leaves the persisted
//! state untouched.

use loadstate::{LoadState, LoadStateError, LoadStateStore};
use sapling_core::{Batch, LoadType, SourceGroup, TableSchema};
use tracing::info;

/// Error type for load-control operations. Fatal for the affected table's
/// batch only; sibling tables proceed independently.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// The resolved load-type token is neither `full` nor `incremental`
    #[error("Invalid load type '{token}' for table '{table}' (expected 'full' or 'incremental')")]
    InvalidLoadType { table: String, token: String },

    /// Incremental load requested for a table without a key column
    #[error("Table '{table}' declares no key column and cannot be loaded incrementally")]
    MissingKeyColumn { table: String },

    /// A generated key did not continue past the persisted watermark
    #[error("Watermark regression on table '{table}': first new key {got} does not exceed watermark {floor}")]
    WatermarkRegression {
        table: String,
        floor: i64,
        got: i64,
    },

    /// Load-state storage failure
    #[error(transparent)]
    State(#[from] LoadStateError),
}

/// Where a batch starts and what it must stay beyond.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoadPlan {
    /// Effective load type after implicit-full resolution
    pub load_type: LoadType,

    /// Row index generation resumes from
    pub start_index: u64,

    /// Watermark the first new key must exceed (incremental only)
    pub floor: Option<i64>,
}

/// Per-table load-state machine over a [`LoadStateStore`].
pub struct LoadController<S: LoadStateStore> {
    store: S,
}

impl<S: LoadStateStore> LoadController<S> {
    /// Create a controller over the given state store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Resolve the effective load-type token for a table: table override,
    /// then group default, then the run-wide selector.
    pub fn resolve_token<'a>(
        table: &'a TableSchema,
        group: &'a SourceGroup,
        run_default: &'a str,
    ) -> &'a str {
        table
            .load_type
            .as_deref()
            .or(group.load_type.as_deref())
            .unwrap_or(run_default)
    }

    /// Decide how the next batch for `table` relates to prior emissions.
    ///
    /// An incremental load on a table with no prior state is treated as an
    /// implicit full load: there is nothing to append to. An invalid token
    /// fails without touching state.
    pub fn plan(&self, table: &TableSchema, token: &str) -> Result<LoadPlan, LoadError> {
        let requested = LoadType::parse(token).ok_or_else(|| LoadError::InvalidLoadType {
            table: table.name.clone(),
            token: token.to_string(),
        })?;

        match requested {
            LoadType::Full => Ok(LoadPlan {
                load_type: LoadType::Full,
                start_index: 0,
                floor: None,
            }),
            LoadType::Incremental => {
                if table.key.is_none() {
                    return Err(LoadError::MissingKeyColumn {
                        table: table.name.clone(),
                    });
                }

                match self.store.load(&table.name)? {
                    None => {
                        info!(
                            "No prior load state for table '{}'; running the incremental load as an initial full load",
                            table.name
                        );
                        Ok(LoadPlan {
                            load_type: LoadType::Full,
                            start_index: 0,
                            floor: None,
                        })
                    }
                    Some(state) => Ok(LoadPlan {
                        load_type: LoadType::Incremental,
                        start_index: state.rows_emitted,
                        floor: state.watermark,
                    }),
                }
            }
        }
    }

    /// Verify a generated batch against its plan and compute the state that
    /// a successful emission will persist. Pure with respect to storage.
    pub fn stage(
        &self,
        table: &TableSchema,
        plan: &LoadPlan,
        batch: &Batch,
    ) -> Result<LoadState, LoadError> {
        let watermark = match &table.key {
            None => None,
            Some(key) => {
                let keys = key_values(batch, key);

                if let (Some(floor), Some(&first)) = (plan.floor, keys.first()) {
                    if first <= floor {
                        return Err(LoadError::WatermarkRegression {
                            table: table.name.clone(),
                            floor,
                            got: first,
                        });
                    }
                }

                // An empty batch advances nothing; carry the floor forward.
                keys.last().copied().or(plan.floor)
            }
        };

        Ok(LoadState::new(
            table.name.clone(),
            plan.load_type.as_str(),
            watermark,
            plan.start_index + batch.rows.len() as u64,
        ))
    }

    /// Persist a staged state. Called only after the sink write succeeded,
    /// so a failed write never advances the watermark.
    pub fn commit(&self, state: &LoadState) -> Result<(), LoadError> {
        self.store.save(state)?;
        Ok(())
    }

    /// Explicit reset: drop the table back to `UNINITIALIZED`. Returns
    /// whether any state existed.
    pub fn reset(&self, table: &str) -> Result<bool, LoadError> {
        let existed = self.store.delete(table)?;
        if existed {
            info!("Reset load state for table '{table}'");
        }
        Ok(existed)
    }

    /// Tables with persisted state.
    pub fn tracked_tables(&self) -> Result<Vec<String>, LoadError> {
        Ok(self.store.list()?)
    }
}

fn key_values(batch: &Batch, key: &str) -> Vec<i64> {
    let Some(idx) = batch.column_index(key) else {
        return Vec::new();
    };
    batch
        .rows
        .iter()
        .filter_map(|row| row.get(idx).and_then(|v| v.as_i64()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use loadstate::FilesystemStore;
    use sapling_core::{Config, SimTime};
    use sapling_generator::RowGenerator;
    use tempfile::TempDir;

    fn users_table() -> TableSchema {
        let yaml = r#"
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
"#;
        Config::from_yaml(yaml)
            .unwrap()
            .get_table("users")
            .unwrap()
            .clone()
    }

    fn generate_batch(table: &TableSchema, plan: &LoadPlan, count: u64) -> Batch {
        RowGenerator::new(table.clone(), 42)
            .with_start_index(plan.start_index)
            .generate(count, plan.load_type, SimTime::Offset(0))
            .unwrap()
    }

    #[test]
    fn test_invalid_token_leaves_state_untouched() {
        let dir = TempDir::new().unwrap();
        let controller = LoadController::new(FilesystemStore::new(dir.path()));
        let table = users_table();

        let err = controller.plan(&table, "snapshotty").unwrap_err();
        assert!(matches!(err, LoadError::InvalidLoadType { .. }));
        assert!(controller.tracked_tables().unwrap().is_empty());
    }

    #[test]
    fn test_incremental_without_state_is_implicit_full() {
        let dir = TempDir::new().unwrap();
        let controller = LoadController::new(FilesystemStore::new(dir.path()));
        let table = users_table();

        let plan = controller.plan(&table, "incremental").unwrap();
        assert_eq!(plan.load_type, LoadType::Full);
        assert_eq!(plan.start_index, 0);
        assert_eq!(plan.floor, None);
    }

    #[test]
    fn test_full_then_incremental_continues_after_watermark() {
        let dir = TempDir::new().unwrap();
        let controller = LoadController::new(FilesystemStore::new(dir.path()));
        let table = users_table();

        // Full load of 5 rows: keys 1..=5
        let plan = controller.plan(&table, "full").unwrap();
        let batch = generate_batch(&table, &plan, 5);
        let state = controller.stage(&table, &plan, &batch).unwrap();
        assert_eq!(state.watermark, Some(5));
        assert_eq!(state.rows_emitted, 5);
        controller.commit(&state).unwrap();

        // Incremental load of 3 rows: keys 6, 7, 8
        let plan = controller.plan(&table, "incremental").unwrap();
        assert_eq!(plan.load_type, LoadType::Incremental);
        assert_eq!(plan.start_index, 5);
        assert_eq!(plan.floor, Some(5));

        let batch = generate_batch(&table, &plan, 3);
        let keys: Vec<i64> = batch.rows.iter().map(|r| r[0].as_i64().unwrap()).collect();
        assert_eq!(keys, vec![6, 7, 8]);

        let state = controller.stage(&table, &plan, &batch).unwrap();
        assert_eq!(state.watermark, Some(8));
        assert_eq!(state.rows_emitted, 8);
    }

    #[test]
    fn test_full_resets_watermark() {
        let dir = TempDir::new().unwrap();
        let controller = LoadController::new(FilesystemStore::new(dir.path()));
        let table = users_table();

        // Run full + two incrementals
        for (token, count) in [("full", 5u64), ("incremental", 3), ("incremental", 2)] {
            let plan = controller.plan(&table, token).unwrap();
            let batch = generate_batch(&table, &plan, count);
            let state = controller.stage(&table, &plan, &batch).unwrap();
            controller.commit(&state).unwrap();
        }

        // A new full load starts over
        let plan = controller.plan(&table, "full").unwrap();
        let batch = generate_batch(&table, &plan, 5);
        let state = controller.stage(&table, &plan, &batch).unwrap();
        controller.commit(&state).unwrap();
        assert_eq!(state.watermark, Some(5));

        // The next incremental continues from the fresh snapshot
        let plan = controller.plan(&table, "incremental").unwrap();
        assert_eq!(plan.start_index, 5);
        assert_eq!(plan.floor, Some(5));
    }

    #[test]
    fn test_watermark_regression_detected() {
        let dir = TempDir::new().unwrap();
        let controller = LoadController::new(FilesystemStore::new(dir.path()));
        let table = users_table();

        let plan = LoadPlan {
            load_type: LoadType::Incremental,
            start_index: 5,
            floor: Some(10),
        };
        // Keys 6..=8 do not clear a floor of 10
        let batch = generate_batch(&table, &plan, 3);

        let err = controller.stage(&table, &plan, &batch).unwrap_err();
        match err {
            LoadError::WatermarkRegression { floor, got, .. } => {
                assert_eq!(floor, 10);
                assert_eq!(got, 6);
            }
            other => panic!("expected WatermarkRegression, got {other:?}"),
        }
    }

    #[test]
    fn test_incremental_requires_key_column() {
        let yaml = r#"
tables:
  - name: logs
    rows: 2
    columns:
      - name: message
        type: string
        generator: pattern
        params: { pattern: "log {index}" }
"#;
        let table = Config::from_yaml(yaml)
            .unwrap()
            .get_table("logs")
            .unwrap()
            .clone();

        let dir = TempDir::new().unwrap();
        let controller = LoadController::new(FilesystemStore::new(dir.path()));

        let err = controller.plan(&table, "incremental").unwrap_err();
        assert!(matches!(err, LoadError::MissingKeyColumn { .. }));
    }

    #[test]
    fn test_empty_batch_carries_watermark() {
        let dir = TempDir::new().unwrap();
        let controller = LoadController::new(FilesystemStore::new(dir.path()));
        let table = users_table();

        let plan = LoadPlan {
            load_type: LoadType::Incremental,
            start_index: 5,
            floor: Some(5),
        };
        let batch = generate_batch(&table, &plan, 0);

        let state = controller.stage(&table, &plan, &batch).unwrap();
        assert_eq!(state.watermark, Some(5));
        assert_eq!(state.rows_emitted, 5);
    }

    #[test]
    fn test_reset_returns_to_uninitialized() {
        let dir = TempDir::new().unwrap();
        let controller = LoadController::new(FilesystemStore::new(dir.path()));
        let table = users_table();

        let plan = controller.plan(&table, "full").unwrap();
        let batch = generate_batch(&table, &plan, 5);
        let state = controller.stage(&table, &plan, &batch).unwrap();
        controller.commit(&state).unwrap();

        assert!(controller.reset("users").unwrap());
        assert!(!controller.reset("users").unwrap());

        // Incremental after reset behaves like first contact
        let plan = controller.plan(&table, "incremental").unwrap();
        assert_eq!(plan.load_type, LoadType::Full);
    }

    #[test]
    fn test_resolve_token_precedence() {
        let group_yaml = r#"
tables:
  - name: a
    rows: 1
    load_type: full
    columns:
      - name: id
        type: integer
        generator: sequence
  - name: b
    rows: 1
    columns:
      - name: id
        type: integer
        generator: sequence
source_groups:
  - name: g
    tables: [a, b]
    load_type: incremental
"#;
        let config = Config::from_yaml(group_yaml).unwrap();
        let group = &config.groups[0];

        type Controller = LoadController<FilesystemStore>;
        // Table override wins, then group default, then the run selector
        assert_eq!(Controller::resolve_token(&group.tables[0], group, "full"), "full");
        assert_eq!(
            Controller::resolve_token(&group.tables[1], group, "full"),
            "incremental"
        );
    }
}
