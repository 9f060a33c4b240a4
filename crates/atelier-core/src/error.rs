//! Error type shared by the store, mutation layer and studio facade.

use crate::record::EntityKind;

/// Result alias used throughout the crate.
pub type StudioResult<T> = Result<T, StudioError>;

#[derive(Debug, thiserror::Error)]
pub enum StudioError {
    /// A submitted field set failed validation (empty required field, out-of-set enum).
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// No record with this id exists in the collection.
    #[error("{kind} '{id}' not found")]
    NotFound { kind: EntityKind, id: String },

    #[error("Store error: {0}")]
    Store(#[from] sled::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Config write error: {0}")]
    ConfigWrite(#[from] toml::ser::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Remote sync failed. Only ever logged by the sync worker.
    #[error("Sync error: {0}")]
    Sync(String),
}

impl StudioError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    pub fn not_found(kind: EntityKind, id: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            id: id.into(),
        }
    }

    /// True for validation failures (the operation simply did not apply).
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::InvalidArgument(_))
    }
}
