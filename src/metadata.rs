//! Metadata injector: appends audit columns to a generated batch.

use rand::Rng;
use sapling_core::{Batch, Cardinality, LogicalType, MetadataPolicy};
use sapling_generator::generators::generate;

/// Append each enabled metadata column to the batch.
///
/// `per_batch` columns generate one value and stamp it on every row: they
/// record who ran the load, not per-row authorship. `per_row` columns draw
/// a fresh value per row. Disabled columns are omitted entirely, never
/// emitted as null placeholders.
pub fn apply<R: Rng>(mut batch: Batch, policy: &MetadataPolicy, rng: &mut R) -> Batch {
    for column in policy.enabled() {
        batch.columns.push(column.name.clone());

        match column.cardinality {
            Cardinality::PerBatch => {
                let value = generate(&column.generator, &LogicalType::String, rng, 0);
                for row in &mut batch.rows {
                    row.push(value.clone());
                }
            }
            Cardinality::PerRow => {
                for (i, row) in batch.rows.iter_mut().enumerate() {
                    row.push(generate(&column.generator, &LogicalType::String, rng, i as u64));
                }
            }
        }
    }

    batch
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use sapling_core::{Config, LoadType, SimTime};
    use sapling_generator::RowGenerator;

    fn config_with_metadata(metadata_yaml: &str) -> Config {
        let yaml = format!(
            r#"
tables:
  - name: users
    rows: 3
    columns:
      - name: id
        type: integer
        generator: sequence
{metadata_yaml}
"#
        );
        Config::from_yaml(&yaml).unwrap()
    }

    fn batch_for(config: &Config) -> Batch {
        let table = config.get_table("users").unwrap().clone();
        RowGenerator::new(table, 42)
            .generate(3, LoadType::Full, SimTime::Offset(0))
            .unwrap()
    }

    #[test]
    fn test_per_batch_stamps_one_value() {
        let config = config_with_metadata(
            r#"
metadata:
  - name: created_by
    enabled: true
"#,
        );
        let mut rng = StdRng::seed_from_u64(7);
        let batch = apply(batch_for(&config), &config.metadata, &mut rng);

        assert_eq!(batch.columns, vec!["id", "created_by"]);
        let stamped: Vec<_> = batch.rows.iter().map(|r| r[1].clone()).collect();
        assert_eq!(stamped[0], stamped[1]);
        assert_eq!(stamped[1], stamped[2]);
        assert!(!stamped[0].is_null());
    }

    #[test]
    fn test_disabled_column_is_absent() {
        let config = config_with_metadata(
            r#"
metadata:
  - name: created_by
    enabled: true
  - name: modified_by
    enabled: false
"#,
        );
        let mut rng = StdRng::seed_from_u64(7);
        let batch = apply(batch_for(&config), &config.metadata, &mut rng);

        assert_eq!(batch.columns, vec!["id", "created_by"]);
        assert!(batch.rows.iter().all(|r| r.len() == 2));
    }

    #[test]
    fn test_per_row_generates_each_row() {
        let config = config_with_metadata(
            r#"
metadata:
  - name: trace_id
    generator: uuid
    cardinality: per_row
"#,
        );
        let mut rng = StdRng::seed_from_u64(7);
        let batch = apply(batch_for(&config), &config.metadata, &mut rng);

        let values: Vec<_> = batch.rows.iter().map(|r| r[1].clone()).collect();
        assert_ne!(values[0], values[1]);
        assert_ne!(values[1], values[2]);
    }

    #[test]
    fn test_no_metadata_is_identity() {
        let config = config_with_metadata("");
        let before = batch_for(&config);
        let mut rng = StdRng::seed_from_u64(7);
        let after = apply(before.clone(), &config.metadata, &mut rng);

        assert_eq!(before.columns, after.columns);
        assert_eq!(before.rows, after.rows);
    }
}
