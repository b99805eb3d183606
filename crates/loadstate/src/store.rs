//! Storage abstraction for load-state records.

use crate::state::LoadState;

/// Error type for load-state storage operations.
#[derive(Debug, thiserror::Error)]
pub enum LoadStateError {
    /// IO error touching the backing store
    #[error("Load state IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Corrupt or unreadable state record
    #[error("Load state serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Backend-agnostic store for per-table load state.
///
/// The pipeline holds exactly one store and serializes all operations for a
/// given table through it; implementations do not need their own locking.
pub trait LoadStateStore {
    /// Read the state for a table, `None` if the table has never emitted.
    fn load(&self, table: &str) -> Result<Option<LoadState>, LoadStateError>;

    /// Persist the state for a table, replacing any previous record.
    fn save(&self, state: &LoadState) -> Result<(), LoadStateError>;

    /// Remove the state for a table. Returns whether a record existed.
    fn delete(&self, table: &str) -> Result<bool, LoadStateError>;

    /// Names of all tables with persisted state.
    fn list(&self) -> Result<Vec<String>, LoadStateError>;
}
