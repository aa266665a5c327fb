//! Error types for recipebox.
//!
//! Every failure in the store is returned to the immediate caller. The
//! variants keep enough context for the log, while [`Error::user_notice`]
//! gives the short message shown to the person using the app.

use std::path::PathBuf;
use thiserror::Error;

/// Boxed error produced by a key-value backend.
pub type BackendError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// The main error type for recipebox operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Store Errors ===
    /// The backend could not read the value stored under a key.
    #[error("failed to read '{key}' from storage: {source}")]
    StorageRead {
        /// Storage key that was being read.
        key: String,
        /// The underlying backend error.
        #[source]
        source: BackendError,
    },

    /// The backend could not write the value for a key.
    #[error("failed to write '{key}' to storage: {source}")]
    StorageWrite {
        /// Storage key that was being written.
        key: String,
        /// The underlying backend error.
        #[source]
        source: BackendError,
    },

    /// The stored value is not a valid recipe collection.
    #[error("stored value under '{key}' is not a valid recipe list: {source}")]
    Parse {
        /// Storage key holding the corrupt value.
        key: String,
        /// The decoding error.
        #[source]
        source: serde_json::Error,
    },

    /// A record with this id is already present in the collection.
    #[error("a record with id '{id}' already exists in '{key}'")]
    DuplicateId {
        /// Storage key of the collection.
        key: String,
        /// The clashing id.
        id: String,
    },

    /// The single-writer task has stopped accepting mutations.
    #[error("the store writer has shut down")]
    WriterClosed,

    // === Validation Errors ===
    /// A recipe draft is missing a required field or has a malformed one.
    #[error("invalid recipe field '{field}': {message}")]
    Validation {
        /// Name of the offending field.
        field: &'static str,
        /// What is wrong with it.
        message: String,
    },

    // === Database Errors ===
    /// Failed to open or create the database.
    #[error("failed to open database at {path}: {source}")]
    DatabaseOpen {
        /// Path to the database file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: rusqlite::Error,
    },

    /// A database query failed.
    #[error("database query failed: {0}")]
    DatabaseQuery(#[from] rusqlite::Error),

    /// Failed to run database migrations.
    #[error("database migration failed: {message}")]
    DatabaseMigration {
        /// Description of what went wrong.
        message: String,
    },

    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    // === I/O Errors ===
    /// Failed to create a required directory.
    #[error("failed to create directory {path}: {source}")]
    DirectoryCreate {
        /// Path that couldn't be created.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    // === Serialization Errors ===
    /// JSON serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A specialized Result type for recipebox operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create a storage read error for `key`.
    #[must_use]
    pub fn storage_read(key: impl Into<String>, source: impl Into<BackendError>) -> Self {
        Self::StorageRead {
            key: key.into(),
            source: source.into(),
        }
    }

    /// Create a storage write error for `key`.
    #[must_use]
    pub fn storage_write(key: impl Into<String>, source: impl Into<BackendError>) -> Self {
        Self::StorageWrite {
            key: key.into(),
            source: source.into(),
        }
    }

    /// Create a validation error for a draft field.
    #[must_use]
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }

    /// Check if this error came from reading storage.
    #[must_use]
    pub fn is_read_error(&self) -> bool {
        matches!(self, Self::StorageRead { .. })
    }

    /// Check if this error came from writing storage.
    #[must_use]
    pub fn is_write_error(&self) -> bool {
        matches!(self, Self::StorageWrite { .. } | Self::WriterClosed)
    }

    /// Check if the stored data could not be decoded.
    #[must_use]
    pub fn is_parse_error(&self) -> bool {
        matches!(self, Self::Parse { .. })
    }

    /// Check if a draft was rejected before reaching the store.
    #[must_use]
    pub fn is_validation_error(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }

    /// Short, non-technical message for the end user.
    ///
    /// Diagnostic detail stays in the log; the user only learns whether
    /// loading or saving failed.
    #[must_use]
    pub fn user_notice(&self) -> String {
        match self {
            Self::StorageRead { .. } | Self::Parse { .. } => "Could not load recipes.".to_string(),
            Self::StorageWrite { .. } | Self::WriterClosed | Self::DuplicateId { .. } => {
                "Could not save recipe.".to_string()
            }
            Self::Validation { .. } => "Please fill in all required fields.".to_string(),
            Self::ConfigLoad(_) | Self::ConfigValidation { .. } => {
                "Could not load configuration.".to_string()
            }
            _ => "Something went wrong.".to_string(),
        }
    }
}
