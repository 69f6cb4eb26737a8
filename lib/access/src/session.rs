//! Durable token storage.
//!
//! The session is exactly two string entries, `accessToken` and
//! `refreshToken`, kept in a durable key/value store that survives restarts.
//! [`SessionStore`] is the only code that touches those keys. Reads are open to
//! everyone; writes are crate-private so that only the authentication gateway
//! can establish, rotate or clear a session.

mod file;

#[cfg(feature = "browser")]
mod browser;

#[cfg(feature = "browser")]
pub use browser::BrowserStorage;
pub use file::FileStorage;

use crate::error::StorageError;
use rootcause::prelude::Report;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tracing::{debug, warn};

/// Storage key holding the short-lived bearer credential.
pub const ACCESS_TOKEN_KEY: &str = "accessToken";
/// Storage key holding the long-lived refresh credential.
pub const REFRESH_TOKEN_KEY: &str = "refreshToken";

/// A durable string key/value store.
///
/// Implementations must be safe to share between tasks. A missing key is
/// `Ok(None)`, never an error.
pub trait TokenStorage: Send + Sync {
    /// Reads a value.
    fn get(&self, key: &str) -> Result<Option<String>, Report<StorageError>>;

    /// Writes a value, replacing any previous one.
    fn set(&self, key: &str, value: &str) -> Result<(), Report<StorageError>>;

    /// Removes a value. Removing a missing key succeeds.
    fn remove(&self, key: &str) -> Result<(), Report<StorageError>>;
}

/// Process-local storage; sessions last as long as the value lives.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates storage pre-populated with entries.
    #[must_use]
    pub fn with_entries<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            entries: RwLock::new(
                entries
                    .into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
        }
    }

    fn poisoned() -> StorageError {
        StorageError::Unavailable {
            reason: "storage lock poisoned".to_string(),
        }
    }
}

impl TokenStorage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, Report<StorageError>> {
        let entries = self.entries.read().map_err(|_| Self::poisoned())?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), Report<StorageError>> {
        let mut entries = self.entries.write().map_err(|_| Self::poisoned())?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), Report<StorageError>> {
        let mut entries = self.entries.write().map_err(|_| Self::poisoned())?;
        entries.remove(key);
        Ok(())
    }
}

/// Storage that rejects every operation, as in a private browsing window
/// with storage disabled.
#[derive(Debug, Clone, Default)]
pub struct UnavailableStorage;

impl UnavailableStorage {
    fn error() -> StorageError {
        StorageError::Unavailable {
            reason: "storage is disabled".to_string(),
        }
    }
}

impl TokenStorage for UnavailableStorage {
    fn get(&self, _key: &str) -> Result<Option<String>, Report<StorageError>> {
        Err(Self::error().into())
    }

    fn set(&self, _key: &str, _value: &str) -> Result<(), Report<StorageError>> {
        Err(Self::error().into())
    }

    fn remove(&self, _key: &str) -> Result<(), Report<StorageError>> {
        Err(Self::error().into())
    }
}

/// A point-in-time copy of both tokens.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Session {
    access_token: Option<String>,
    refresh_token: Option<String>,
}

impl Session {
    /// Returns the access token, if present.
    #[must_use]
    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_deref()
    }

    /// Returns the refresh token, if present.
    #[must_use]
    pub fn refresh_token(&self) -> Option<&str> {
        self.refresh_token.as_deref()
    }

    /// Returns true if an access token is present.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.access_token.is_some()
    }
}

// Tokens are credentials; keep them out of logs and panic messages.
impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("access_token", &self.access_token.as_ref().map(|_| "<redacted>"))
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Single owner of the persisted token pair.
#[derive(Clone)]
pub struct SessionStore {
    storage: Arc<dyn TokenStorage>,
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore").finish_non_exhaustive()
    }
}

impl SessionStore {
    /// Creates a store over the given backend.
    #[must_use]
    pub fn new(storage: impl TokenStorage + 'static) -> Self {
        Self {
            storage: Arc::new(storage),
        }
    }

    /// Creates a store over fresh process-local storage.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(MemoryStorage::new())
    }

    /// Persists a token pair.
    ///
    /// With no refresh token, any previously stored one is removed so a stale
    /// refresh token never outlives the access token it was issued with. If
    /// a write fails the store is cleared so no half-written pair remains.
    pub(crate) fn save(
        &self,
        access: &str,
        refresh: Option<&str>,
    ) -> Result<(), Report<StorageError>> {
        let result = self.storage.set(ACCESS_TOKEN_KEY, access).and_then(|()| {
            match refresh {
                Some(token) => self.storage.set(REFRESH_TOKEN_KEY, token),
                None => self.storage.remove(REFRESH_TOKEN_KEY),
            }
        });

        match result {
            Ok(()) => {
                debug!(has_refresh = refresh.is_some(), "session saved");
                Ok(())
            }
            Err(e) => {
                self.clear();
                Err(e)
            }
        }
    }

    /// Replaces only the access token, keeping the refresh token.
    pub(crate) fn replace_access(&self, access: &str) -> Result<(), Report<StorageError>> {
        self.storage.set(ACCESS_TOKEN_KEY, access)?;
        debug!("access token replaced");
        Ok(())
    }

    /// Removes both tokens. Never fails; storage errors are logged.
    pub(crate) fn clear(&self) {
        for key in [ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY] {
            if let Err(e) = self.storage.remove(key) {
                warn!(key, error = %e, "failed to remove session entry");
            }
        }
        debug!("session cleared");
    }

    /// Returns the access token, or `None` when absent or unreadable.
    #[must_use]
    pub fn read(&self) -> Option<String> {
        self.read_key(ACCESS_TOKEN_KEY)
    }

    /// Returns the refresh token, or `None` when absent or unreadable.
    #[must_use]
    pub fn read_refresh(&self) -> Option<String> {
        self.read_key(REFRESH_TOKEN_KEY)
    }

    /// Returns true if an access token is stored.
    #[must_use]
    pub fn is_present(&self) -> bool {
        self.read().is_some()
    }

    /// Returns both tokens as they are right now.
    #[must_use]
    pub fn snapshot(&self) -> Session {
        Session {
            access_token: self.read(),
            refresh_token: self.read_refresh(),
        }
    }

    fn read_key(&self, key: &str) -> Option<String> {
        match self.storage.get(key) {
            Ok(value) => value.filter(|v| !v.is_empty()),
            Err(e) => {
                warn!(key, error = %e, "session storage read failed");
                None
            }
        }
    }
}
