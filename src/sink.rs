//! Sinks: render a finalized batch into an external format.
//!
//! `CsvSink` and `TsvSink` share the delimited-writer path; mock API and
//! mock database endpoints are future variants behind the same [`Sink`]
//! trait. One batch becomes one file named
//! `<table>_<load_type>_<sim_time>.<ext>`, so full and incremental
//! artifacts stay distinguishable and orderable downstream.

use sapling_core::Batch;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use tracing::info;

/// Default buffer size for sink writers.
pub const DEFAULT_BUFFER_SIZE: usize = 8192;

/// Error type for sink writes. Fatal for the affected table's batch;
/// upstream generation work is lost and not retried here.
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    /// IO error on the destination
    #[error("Sink IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV writer error
    #[error("Sink write error: {0}")]
    Csv(#[from] csv::Error),
}

/// Outcome of a successful sink write.
#[derive(Debug, Clone)]
pub struct WriteResult {
    /// Resolved output file
    pub path: PathBuf,

    /// Rows written (excluding the header)
    pub rows: u64,

    /// Bytes written
    pub bytes: u64,
}

/// Destination abstraction: renders one batch into an external,
/// consumable representation.
pub trait Sink {
    /// File extension of this sink's artifacts.
    fn extension(&self) -> &'static str;

    /// Write the batch under the destination directory.
    fn write(&self, batch: &Batch, dir: &Path) -> Result<WriteResult, SinkError>;
}

/// Comma-separated output, header row first.
pub struct CsvSink;

impl Sink for CsvSink {
    fn extension(&self) -> &'static str {
        "csv"
    }

    fn write(&self, batch: &Batch, dir: &Path) -> Result<WriteResult, SinkError> {
        write_delimited(batch, dir, b',', self.extension())
    }
}

/// Tab-separated output, header row first.
pub struct TsvSink;

impl Sink for TsvSink {
    fn extension(&self) -> &'static str {
        "tsv"
    }

    fn write(&self, batch: &Batch, dir: &Path) -> Result<WriteResult, SinkError> {
        write_delimited(batch, dir, b'\t', self.extension())
    }
}

/// Artifact name: encodes table, load type and simulated timestamp.
fn output_filename(batch: &Batch, ext: &str) -> String {
    format!(
        "{}_{}_{}.{}",
        batch.table,
        batch.load_type,
        batch.sim_time.stamp(),
        ext
    )
}

fn write_delimited(
    batch: &Batch,
    dir: &Path,
    delimiter: u8,
    ext: &str,
) -> Result<WriteResult, SinkError> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(output_filename(batch, ext));

    let file = File::create(&path)?;
    let buf_writer = BufWriter::with_capacity(DEFAULT_BUFFER_SIZE, file);
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(buf_writer);

    writer.write_record(&batch.columns)?;
    for row in &batch.rows {
        writer.write_record(row.iter().map(|v| v.render()))?;
    }

    writer.flush()?;
    drop(writer);

    let bytes = std::fs::metadata(&path)?.len();
    info!(
        "Wrote {} rows ({} bytes) to {}",
        batch.rows.len(),
        bytes,
        path.display()
    );

    Ok(WriteResult {
        path,
        rows: batch.rows.len() as u64,
        bytes,
    })
}
