//! Browser LocalStorage backend

use super::{BestScoreStore, StoreError};

/// Best score kept under a LocalStorage key as a decimal string
#[derive(Debug, Clone)]
pub struct LocalStorageStore {
    key: String,
}

impl Default for LocalStorageStore {
    fn default() -> Self {
        Self::new(Self::DEFAULT_KEY)
    }
}

impl LocalStorageStore {
    pub const DEFAULT_KEY: &'static str = "bestScore";

    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }

    fn storage() -> Result<web_sys::Storage, StoreError> {
        web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten()
            .ok_or_else(|| StoreError::Unavailable("LocalStorage".into()))
    }
}

impl BestScoreStore for LocalStorageStore {
    fn load(&self) -> Result<u64, StoreError> {
        let storage = Self::storage()?;
        match storage.get_item(&self.key) {
            Ok(Some(raw)) => raw.trim().parse().map_err(|_| StoreError::Corrupt(raw)),
            Ok(None) => Ok(0),
            Err(_) => Err(StoreError::Unavailable(format!("get_item({})", self.key))),
        }
    }

    fn save(&mut self, best_score: u64) -> Result<(), StoreError> {
        let storage = Self::storage()?;
        storage
            .set_item(&self.key, &best_score.to_string())
            .map_err(|_| StoreError::Unavailable(format!("set_item({})", self.key)))?;
        log::info!("Best score {} saved", best_score);
        Ok(())
    }
}
