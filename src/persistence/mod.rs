//! Best score persistence
//!
//! The core reads the stored best score when a session starts and writes it
//! back at game over. Backends:
//! - [`MemoryStore`]: in-process, for tests and hosts without storage
//! - [`JsonFileStore`]: `{"best_score": n}` on disk (native)
//! - `LocalStorageStore`: browser LocalStorage (wasm32)

use std::fmt;

use thiserror::Error;

#[cfg(not(target_arch = "wasm32"))]
mod file;
#[cfg(target_arch = "wasm32")]
mod web;

#[cfg(not(target_arch = "wasm32"))]
pub use file::JsonFileStore;
#[cfg(target_arch = "wasm32")]
pub use web::LocalStorageStore;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
    #[error("Corrupt best score: {0:?}")]
    Corrupt(String),
}

/// Where the best score lives between sessions
pub trait BestScoreStore: fmt::Debug {
    /// Stored best score; a store that has never been written returns 0
    fn load(&self) -> Result<u64, StoreError>;

    fn save(&mut self, best_score: u64) -> Result<(), StoreError>;
}

/// Load the best score, treating any failure as "no record yet"
pub fn load_or_zero(store: &dyn BestScoreStore) -> u64 {
    match store.load() {
        Ok(best) => best,
        Err(e) => {
            log::warn!("Failed to load best score ({}), starting from 0", e);
            0
        }
    }
}

/// In-memory store
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    best_score: u64,
}

impl MemoryStore {
    pub fn new(best_score: u64) -> Self {
        Self { best_score }
    }
}

impl BestScoreStore for MemoryStore {
    fn load(&self) -> Result<u64, StoreError> {
        Ok(self.best_score)
    }

    fn save(&mut self, best_score: u64) -> Result<(), StoreError> {
        self.best_score = best_score;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct BrokenStore;

    impl BestScoreStore for BrokenStore {
        fn load(&self) -> Result<u64, StoreError> {
            Err(StoreError::Unavailable("offline".into()))
        }

        fn save(&mut self, _best_score: u64) -> Result<(), StoreError> {
            Err(StoreError::Unavailable("offline".into()))
        }
    }

    #[test]
    fn test_memory_store_round_trip() {
        let mut store = MemoryStore::default();
        assert_eq!(store.load().unwrap(), 0);
        store.save(42).unwrap();
        assert_eq!(store.load().unwrap(), 42);
    }

    #[test]
    fn test_load_or_zero_swallows_errors() {
        assert_eq!(load_or_zero(&BrokenStore), 0);
        assert_eq!(load_or_zero(&MemoryStore::new(7)), 7);
    }
}
