//! Key-value persistence for recipebox.
//!
//! The store above this layer only needs two primitives: read the string
//! under a key, and replace it atomically. [`SqliteStore`] keeps the values in
//! a local database file; [`MemoryStore`] keeps them in process memory and is
//! the substitute used by tests.

pub mod migrations;
pub mod schema;
mod sqlite;

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::Config;
use crate::error::{Error, Result};

pub use sqlite::SqliteStore;

/// An asynchronous string key-value store.
///
/// `set` must replace the whole value for a key atomically: a reader sees
/// either the old value or the new one, never a mix.
#[async_trait]
pub trait KeyValueStore: Send + Sync + std::fmt::Debug {
    /// Read the value stored under `key`, or `None` if nothing was stored.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StorageRead`] if the backend fails.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StorageWrite`] if the backend fails.
    async fn set(&self, key: &str, value: &str) -> Result<()>;
}

/// Which backend to persist into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Backend {
    /// `SQLite` database file.
    #[default]
    Sqlite,
    /// Process memory; nothing survives exit.
    Memory,
}

impl std::fmt::Display for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite => write!(f, "sqlite"),
            Self::Memory => write!(f, "memory"),
        }
    }
}

/// Open the backend selected by the configuration.
///
/// # Errors
///
/// Returns an error if the database cannot be opened.
pub fn open_backend(config: &Config) -> Result<Arc<dyn KeyValueStore>> {
    match config.storage.backend {
        Backend::Sqlite => Ok(Arc::new(SqliteStore::open(config.database_path())?)),
        Backend::Memory => {
            info!("Using in-memory storage; data will not be kept");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}

/// In-memory key-value store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys currently holding a value.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.lock().map_or(0, |values| values.len())
    }

    /// Check if nothing has been stored yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let values = self
            .values
            .lock()
            .map_err(|_| Error::storage_read(key, "memory store lock poisoned"))?;
        Ok(values.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut values = self
            .values
            .lock()
            .map_err(|_| Error::storage_write(key, "memory store lock poisoned"))?;
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
