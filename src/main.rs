//! Command-line interface for datasapling
//!
//! # Usage Examples
//!
//! ## Full Load
//! ```bash
//! # Generate every table as a fresh snapshot
//! datasapling run \
//!   --config config/config.yml \
//!   --out-dir ./out
//! ```
//!
//! ## Incremental Load
//! ```bash
//! # Append rows continuing after the stored watermarks
//! datasapling run \
//!   --config config/config.yml \
//!   --out-dir ./out \
//!   --load-type incremental \
//!   --rows 100
//! ```
//!
//! ## Reset
//! ```bash
//! # Forget the watermark for one table
//! datasapling reset --state-dir .datasapling-state --tables users
//! ```
//!
//! Exit code is 0 only when the configuration was valid and every table
//! succeeded; any failed table or invalid configuration exits 1.

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use datasapling::loader::LoadController;
use datasapling::pipeline::{self, RunOptions};
use datasapling::sink::{CsvSink, Sink, TsvSink};
use loadstate::FilesystemStore;
use sapling_core::Config;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser)]
#[command(name = "datasapling")]
#[command(about = "A simulator that generates upstream source data for pipeline testing")]
#[command(long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Output format of generated artifacts.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum Format {
    Csv,
    Tsv,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate batches for every configured table and write them to sinks
    Run {
        /// Path to the configuration YAML
        #[arg(long, short = 'c', env = "DATASAPLING_CONFIG")]
        config: PathBuf,

        /// Directory generated artifacts are written to
        #[arg(long, short = 'o', default_value = "./out")]
        out_dir: PathBuf,

        /// Run-wide load type; per-table and per-group settings override it
        #[arg(long, default_value = "full")]
        load_type: String,

        /// Directory holding per-table load state
        #[arg(long, default_value = ".datasapling-state")]
        state_dir: PathBuf,

        /// Output format
        #[arg(long, value_enum, default_value = "csv")]
        format: Format,

        /// Random seed (defaults to the config's seed, else OS entropy)
        #[arg(long)]
        seed: Option<u64>,

        /// Override every table's configured row count for this run
        #[arg(long)]
        rows: Option<u64>,

        /// Only process these tables (comma-separated, empty = all)
        #[arg(long, value_delimiter = ',')]
        tables: Vec<String>,

        /// Validate the configuration and print the plan without generating
        #[arg(long)]
        dry_run: bool,
    },

    /// Drop stored load state, returning tables to the uninitialized state
    Reset {
        /// Directory holding per-table load state
        #[arg(long, default_value = ".datasapling-state")]
        state_dir: PathBuf,

        /// Tables to reset (comma-separated, empty = all tracked tables)
        #[arg(long, value_delimiter = ',')]
        tables: Vec<String>,
    },
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config,
            out_dir,
            load_type,
            state_dir,
            format,
            seed,
            rows,
            tables,
            dry_run,
        } => {
            let config_model = Config::from_file(&config)
                .with_context(|| format!("Failed to load configuration from {config:?}"))?;

            let seed = seed.or(config_model.seed).unwrap_or_else(rand::random);
            info!("Using seed {seed} (pass --seed {seed} to reproduce this run)");

            let sink: Box<dyn Sink> = match format {
                Format::Csv => Box::new(CsvSink),
                Format::Tsv => Box::new(TsvSink),
            };

            let controller = LoadController::new(FilesystemStore::new(&state_dir));
            let opts = RunOptions {
                out_dir,
                load_type,
                seed,
                rows,
                tables,
                dry_run,
            };

            let report = pipeline::run(&config_model, &opts, sink.as_ref(), &controller);

            for outcome in &report.outcomes {
                match &outcome.result {
                    Ok(written) => println!(
                        "ok   {} ({} rows) -> {}",
                        outcome.table,
                        written.rows,
                        written.path.display()
                    ),
                    Err(e) => println!("FAIL {} [{}]: {e}", outcome.table, e.kind()),
                }
            }

            if !report.success() {
                anyhow::bail!("{} table(s) failed", report.failed_count());
            }

            info!(
                "Run complete: {} rows across {} table(s)",
                report.rows_written(),
                report.outcomes.len()
            );
        }

        Commands::Reset { state_dir, tables } => {
            let controller = LoadController::new(FilesystemStore::new(&state_dir));

            let targets = if tables.is_empty() {
                controller
                    .tracked_tables()
                    .context("Failed to list stored load state")?
            } else {
                tables
            };

            for table in &targets {
                let existed = controller
                    .reset(table)
                    .with_context(|| format!("Failed to reset table '{table}'"))?;
                if existed {
                    println!("reset {table}");
                } else {
                    println!("no state for {table}");
                }
            }
        }
    }

    Ok(())
}
