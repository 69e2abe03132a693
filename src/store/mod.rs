pub mod json_store;
pub mod schema;

use thiserror::Error;

use crate::session::result::RunResult;
use crate::store::schema::Progress;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("could not encode progress: {0}")]
    Json(#[from] serde_json::Error),
}

/// Durable home of the player's progress.
pub trait ProgressStore {
    /// Never fails: missing or corrupt data yields the default progress.
    fn load_progress(&self) -> Progress;
    fn save_progress(&self, progress: &Progress) -> Result<(), StoreError>;
    fn append_history(&self, result: &RunResult) -> Result<(), StoreError>;
}

/// Apply a finished run to `progress` and persist it. The in-memory progress
/// is updated even when the write fails.
pub fn commit(
    progress: &mut Progress,
    store: Option<&dyn ProgressStore>,
    result: &RunResult,
) -> Result<bool, StoreError> {
    let unlocked = progress.record_run(result);
    if let Some(store) = store {
        store.save_progress(progress)?;
        store.append_history(result)?;
    }
    Ok(unlocked)
}
