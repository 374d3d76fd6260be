//! Storage error types.

use std::path::PathBuf;

use holocron_core::TipId;
use thiserror::Error;

/// Errors that can occur while navigating or persisting a tip store.
#[derive(Debug, Error)]
pub enum StorageError {
    /// SQLx error (connection, query, etc.)
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    /// Migration error
    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Snapshot could not be encoded or decoded.
    #[error("snapshot serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Shape configuration could not be read.
    #[error("failed to read store shape {path:?}: {source}")]
    ShapeIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Shape configuration is not valid.
    #[error("failed to parse store shape {path:?}: {source}")]
    ShapeParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A path does not exist in the store's shape.
    #[error("no store node at {0}")]
    PathNotFound(String),

    /// A path leads to a node that holds no tip collection.
    #[error("store node at {0} is not a tip collection")]
    NotALeaf(String),

    /// The tip is not in the collection.
    #[error("tip not found: {0}")]
    TipNotFound(TipId),

    /// No squad with this lead id.
    #[error("squad not found: {0}")]
    SquadNotFound(String),

    /// Record already exists
    #[error("{entity} already exists: {id}")]
    AlreadyExists { entity: &'static str, id: String },

    /// Operation needs a different kind of store.
    #[error("operation requires a {0} store")]
    WrongStoreKind(&'static str),

    /// Save rejected by a test persistence.
    #[error("save rejected: {0}")]
    Rejected(String),
}

impl StorageError {
    /// Whether the error means a tip, squad or store node is gone.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::PathNotFound(_) | Self::TipNotFound(_) | Self::SquadNotFound(_)
        )
    }
}

/// Result type for storage operations.
pub type Result<T> = std::result::Result<T, StorageError>;
