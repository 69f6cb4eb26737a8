//! Session storage backed by the browser's `localStorage`.

use super::TokenStorage;
use crate::error::StorageError;
use rootcause::prelude::Report;

/// Reads and writes `window.localStorage`.
///
/// The storage handle is looked up on every call; browsers may revoke it
/// while the page is open.
#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserStorage;

impl BrowserStorage {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn local_storage() -> Result<web_sys::Storage, Report<StorageError>> {
        let window = web_sys::window().ok_or_else(|| StorageError::Unavailable {
            reason: "no window".to_string(),
        })?;
        let storage = window
            .local_storage()
            .map_err(|e| StorageError::Unavailable {
                reason: format!("{e:?}"),
            })?
            .ok_or_else(|| StorageError::Unavailable {
                reason: "localStorage is disabled".to_string(),
            })?;
        Ok(storage)
    }

    fn js_error(e: &impl std::fmt::Debug) -> StorageError {
        StorageError::Unavailable {
            reason: format!("{e:?}"),
        }
    }
}

impl TokenStorage for BrowserStorage {
    fn get(&self, key: &str) -> Result<Option<String>, Report<StorageError>> {
        let storage = Self::local_storage()?;
        let value = storage.get_item(key).map_err(|e| Self::js_error(&e))?;
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), Report<StorageError>> {
        let storage = Self::local_storage()?;
        storage.set_item(key, value).map_err(|e| Self::js_error(&e))?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), Report<StorageError>> {
        let storage = Self::local_storage()?;
        storage.remove_item(key).map_err(|e| Self::js_error(&e))?;
        Ok(())
    }
}
