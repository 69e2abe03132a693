use std::fs;
use std::io::Write;
use std::path::PathBuf;

use log::warn;
use serde::{Serialize, de::DeserializeOwned};

use crate::session::result::RunResult;
use crate::store::schema::{Progress, RunHistoryData};
use crate::store::{ProgressStore, StoreError};

const PROGRESS_FILE: &str = "progress.json";
const HISTORY_FILE: &str = "run_history.json";
const MAX_HISTORY: usize = 500;

pub struct JsonStore {
    base_dir: PathBuf,
}

impl JsonStore {
    pub fn new() -> Result<Self, StoreError> {
        let base_dir = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("typequiz");
        fs::create_dir_all(&base_dir)?;
        Ok(Self { base_dir })
    }

    pub fn with_base_dir(base_dir: PathBuf) -> Result<Self, StoreError> {
        fs::create_dir_all(&base_dir)?;
        Ok(Self { base_dir })
    }

    pub fn base_dir(&self) -> &PathBuf {
        &self.base_dir
    }

    fn file_path(&self, name: &str) -> PathBuf {
        self.base_dir.join(name)
    }

    /// Read and parse a file. Missing, unreadable and corrupt files all come
    /// back as the default value.
    fn load<T: DeserializeOwned + Default>(&self, name: &str) -> T {
        let path = self.file_path(name);
        if !path.exists() {
            return T::default();
        }
        match fs::read_to_string(&path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                warn!("Ignoring corrupt {}: {e}", path.display());
                T::default()
            }),
            Err(e) => {
                warn!("Failed to read {}: {e}", path.display());
                T::default()
            }
        }
    }

    fn save<T: Serialize>(&self, name: &str, data: &T) -> Result<(), StoreError> {
        let path = self.file_path(name);
        let tmp_path = path.with_extension("tmp");

        let json = serde_json::to_string_pretty(data)?;
        let mut file = fs::File::create(&tmp_path)?;
        file.write_all(json.as_bytes())?;
        file.sync_all()?;

        fs::rename(&tmp_path, &path)?;
        Ok(())
    }

    pub fn load_history(&self) -> RunHistoryData {
        self.load(HISTORY_FILE)
    }

    pub fn reset(&self) -> Result<(), StoreError> {
        for name in [PROGRESS_FILE, HISTORY_FILE] {
            let path = self.file_path(name);
            if path.exists() {
                fs::remove_file(path)?;
            }
        }
        Ok(())
    }
}

impl ProgressStore for JsonStore {
    fn load_progress(&self) -> Progress {
        let loaded: Progress = self.load(PROGRESS_FILE);
        Progress::merge(loaded, Progress::default())
    }

    fn save_progress(&self, progress: &Progress) -> Result<(), StoreError> {
        self.save(PROGRESS_FILE, progress)
    }

    fn append_history(&self, result: &RunResult) -> Result<(), StoreError> {
        let mut history = self.load_history();
        history.runs.push(result.clone());
        if history.runs.len() > MAX_HISTORY {
            let excess = history.runs.len() - MAX_HISTORY;
            history.runs.drain(..excess);
        }
        self.save(HISTORY_FILE, &history)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Session;
    use crate::config::Difficulty;
    use crate::session::result::tests::result_with;
    use tempfile::TempDir;

    fn make_test_store() -> (TempDir, JsonStore) {
        let dir = TempDir::new().unwrap();
        let store = JsonStore::with_base_dir(dir.path().to_path_buf()).unwrap();
        (dir, store)
    }

    #[test]
    fn test_missing_file_loads_defaults() {
        let (_dir, store) = make_test_store();
        assert_eq!(store.load_progress(), Progress::default());
        assert!(store.load_history().runs.is_empty());
    }

    #[test]
    fn test_corrupt_file_loads_defaults() {
        let (_dir, store) = make_test_store();
        fs::write(store.file_path(PROGRESS_FILE), "{ not json").unwrap();
        fs::write(store.file_path(HISTORY_FILE), "[1, 2").unwrap();
        assert_eq!(store.load_progress(), Progress::default());
        assert!(store.load_history().runs.is_empty());
    }

    #[test]
    fn test_progress_round_trip() {
        let (_dir, store) = make_test_store();
        let mut progress = Progress::default();
        progress.record_run(&result_with(100, 100, 1));
        store.save_progress(&progress).unwrap();

        let loaded = store.load_progress();
        assert_eq!(loaded.total_experience, 100);
        assert_eq!(loaded.highest_unlocked(Session::Vocabulary, Difficulty::Easy), 2);
        assert!(!store.file_path("progress.tmp").exists());
    }

    #[test]
    fn test_old_save_gains_new_sessions() {
        let (_dir, store) = make_test_store();
        fs::write(
            store.file_path(PROGRESS_FILE),
            r#"{ "total_exp": 40, "sessions": { "vocabulary": { "hard": 1 } } }"#,
        )
        .unwrap();
        let loaded = store.load_progress();
        assert_eq!(loaded.total_experience, 40);
        assert_eq!(loaded.highest_unlocked(Session::Vocabulary, Difficulty::Hard), 1);
        assert_eq!(loaded.sessions["sentence_quiz"]["easy"], 0);
    }

    #[test]
    fn test_history_is_capped() {
        let (_dir, store) = make_test_store();
        let mut history = RunHistoryData::default();
        for i in 0..MAX_HISTORY {
            history.runs.push(result_with(i as u64, 1000, 0));
        }
        store.save(HISTORY_FILE, &history).unwrap();

        store.append_history(&result_with(9999, 1000, 0)).unwrap();
        let history = store.load_history();
        assert_eq!(history.runs.len(), MAX_HISTORY);
        assert_eq!(history.runs[0].score, 1);
        assert_eq!(history.runs.last().unwrap().score, 9999);
    }

    #[test]
    fn test_save_into_removed_dir_fails() {
        let (dir, store) = make_test_store();
        let base = dir.path().to_path_buf();
        drop(dir);
        assert!(!base.exists());
        assert!(store.save_progress(&Progress::default()).is_err());
    }

    #[test]
    fn test_reset_removes_files() {
        let (_dir, store) = make_test_store();
        store.save_progress(&Progress::default()).unwrap();
        store.append_history(&result_with(1, 1, 0)).unwrap();
        store.reset().unwrap();
        assert!(!store.file_path(PROGRESS_FILE).exists());
        assert!(!store.file_path(HISTORY_FILE).exists());
    }
}
