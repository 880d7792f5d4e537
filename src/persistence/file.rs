//! JSON file backend

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::{BestScoreStore, StoreError};

#[derive(Debug, Serialize, Deserialize)]
struct BestScoreRecord {
    best_score: u64,
}

/// Best score kept in a small JSON file
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl BestScoreStore for JsonFileStore {
    fn load(&self) -> Result<u64, StoreError> {
        let json = match std::fs::read_to_string(&self.path) {
            Ok(json) => json,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(e.into()),
        };
        let record: BestScoreRecord = serde_json::from_str(&json)?;
        Ok(record.best_score)
    }

    fn save(&mut self, best_score: u64) -> Result<(), StoreError> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)?;
        }
        let json = serde_json::to_string_pretty(&BestScoreRecord { best_score })?;
        // Write-then-rename so a crash never leaves a truncated record
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, &self.path)?;
        log::info!("Best score {} saved to {}", best_score, self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_is_zero() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("best_score.json"));
        assert_eq!(store.load().unwrap(), 0);
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = JsonFileStore::new(dir.path().join("nested").join("best_score.json"));
        store.save(17).unwrap();
        assert_eq!(store.load().unwrap(), 17);
        store.save(23).unwrap();
        assert_eq!(JsonFileStore::new(store.path()).load().unwrap(), 23);
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("best_score.json");
        std::fs::write(&path, "not json").unwrap();
        let store = JsonFileStore::new(&path);
        assert!(matches!(store.load(), Err(StoreError::Json(_))));
        assert_eq!(super::super::load_or_zero(&store), 0);
    }
}
