//! Deterministic field and row generation for datasapling.
//!
//! The generator turns a validated [`sapling_core::TableSchema`] into
//! batches of rows. A seeded RNG is threaded through every generator call
//! so runs with the same seed reproduce identical batches.
//!
//! # Architecture
//!
//! ```text
//! TableSchema (validated)
//!        │
//!        ▼
//! ┌──────────────────┐
//! │   RowGenerator   │
//! │                  │
//! │  - seed          │
//! │  - rng (StdRng)  │
//! │  - index         │
//! └────────┬─────────┘
//!          │
//!          ▼
//!    Batch { columns, rows, load_type, sim_time }
//! ```
//!
//! # Example
//!
//! ```rust
//! use sapling_core::{Config, LoadType, SimTime};
//! use sapling_generator::RowGenerator;
//!
//! let config = Config::from_yaml(r#"
//! tables:
//!   - name: users
//!     rows: 5
//!     columns:
//!       - name: id
//!         type: integer
//!         generator: sequence
//!       - name: email
//!         type: string
//!         generator: pattern
//!         params:
//!           pattern: "user_{index}@example.com"
//! "#).unwrap();
//!
//! let table = config.get_table("users").unwrap().clone();
//! let mut generator = RowGenerator::new(table, 42);
//! let batch = generator.generate(5, LoadType::Full, SimTime::Offset(0)).unwrap();
//! assert_eq!(batch.row_count(), 5);
//! ```

pub mod generators;
pub mod rowgen;

// Re-exports for convenience
pub use rowgen::{GeneratorError, RowGenerator};
