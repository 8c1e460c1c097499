//! Error types for the species catalog core library.

use crate::FieldErrors;
use thiserror::Error;

/// All errors that can occur within the species catalog core library.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// A SQLite operation failed.
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// A species ID was requested that does not exist in the store.
    #[error("Species not found: {0}")]
    SpeciesNotFound(i64),

    /// The acting identity does not own the record it tried to modify.
    #[error("Not authorized to modify species {0}")]
    NotAuthorized(i64),

    /// A payload failed schema validation before reaching the store.
    #[error("Validation failed: {0}")]
    ValidationFailed(FieldErrors),

    /// The opened file is not a valid catalog database.
    #[error("Invalid catalog: {0}")]
    InvalidCatalog(String),

    /// A remote store or directory reported a failure.
    #[error("Remote error: {0}")]
    Remote(String),

    /// An I/O operation on the filesystem failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Stored data could not be serialized or deserialized as JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience alias that pins the error type to [`CatalogError`].
pub type Result<T> = std::result::Result<T, CatalogError>;

impl CatalogError {
    /// Returns a short, human-readable message suitable for a notification body.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Database(e) => format!("Failed to save: {e}"),
            Self::SpeciesNotFound(_) => "Species no longer exists".to_string(),
            Self::NotAuthorized(_) => "Only the author of this species can change it".to_string(),
            Self::ValidationFailed(errors) => errors.to_string(),
            Self::InvalidCatalog(_) => "Could not open catalog file".to_string(),
            Self::Remote(msg) => msg.clone(),
            Self::Io(e) => format!("File error: {e}"),
            Self::Json(e) => format!("Data format error: {e}"),
        }
    }
}
