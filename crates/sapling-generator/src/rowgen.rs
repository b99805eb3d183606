//! Row generator: assembles batches from per-column generators.

use crate::generators::generate;
use rand::rngs::StdRng;
use rand::SeedableRng;
use sapling_core::{Batch, LoadType, SimTime, TableSchema, Value};

/// Error type for row generation.
#[derive(Debug, thiserror::Error)]
pub enum GeneratorError {
    /// A non-nullable column received a null value
    #[error("Non-nullable column '{table}.{column}' produced a null value at row {row_index}")]
    ConstraintViolation {
        table: String,
        column: String,
        row_index: u64,
    },
}

/// Deterministic row generator for one table.
///
/// All columns of a batch draw from one seeded RNG, so the same seed and
/// start index reproduce an identical batch. The start index can be moved
/// with [`RowGenerator::with_start_index`] to continue a table across
/// incremental invocations; the RNG is re-seeded from `(seed, index)` so a
/// resumed run stays deterministic without replaying earlier rows.
pub struct RowGenerator {
    table: TableSchema,
    seed: u64,
    rng: StdRng,
    index: u64,
}

impl RowGenerator {
    /// Create a generator positioned at row index 0.
    pub fn new(table: TableSchema, seed: u64) -> Self {
        Self {
            table,
            seed,
            rng: StdRng::seed_from_u64(rng_seed_for_index(seed, 0)),
            index: 0,
        }
    }

    /// Set the starting row index, re-seeding the RNG for that position.
    pub fn with_start_index(mut self, index: u64) -> Self {
        self.index = index;
        self.rng = StdRng::seed_from_u64(rng_seed_for_index(self.seed, index));
        self
    }

    /// Current row index (the index the next generated row will carry).
    pub fn current_index(&self) -> u64 {
        self.index
    }

    /// The table schema this generator serves.
    pub fn table(&self) -> &TableSchema {
        &self.table
    }

    /// Generate the next row, invoking column generators in declaration
    /// order.
    pub fn next_row(&mut self) -> Result<Vec<Value>, GeneratorError> {
        let index = self.index;
        let mut row = Vec::with_capacity(self.table.columns.len());

        for column in &self.table.columns {
            let value = generate(&column.generator, &column.logical_type, &mut self.rng, index);

            if value.is_null() && !column.nullable {
                return Err(GeneratorError::ConstraintViolation {
                    table: self.table.name.clone(),
                    column: column.name.clone(),
                    row_index: index,
                });
            }

            row.push(value);
        }

        self.index += 1;
        Ok(row)
    }

    /// Generate a batch of `count` rows tagged with the given load
    /// semantics.
    pub fn generate(
        &mut self,
        count: u64,
        load_type: LoadType,
        sim_time: SimTime,
    ) -> Result<Batch, GeneratorError> {
        let mut rows = Vec::with_capacity(count as usize);
        for _ in 0..count {
            rows.push(self.next_row()?);
        }

        Ok(Batch {
            table: self.table.name.clone(),
            columns: self
                .table
                .columns
                .iter()
                .map(|c| c.name.clone())
                .collect(),
            rows,
            load_type,
            sim_time,
        })
    }
}

/// RNG seed for a specific row index, so generation can jump to any
/// position while staying deterministic.
fn rng_seed_for_index(seed: u64, index: u64) -> u64 {
    seed.wrapping_add(index.wrapping_mul(0x9E3779B97F4A7C15))
}
