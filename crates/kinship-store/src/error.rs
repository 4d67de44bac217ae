//! Error types for the store crate.

use kinship::MemberId;

#[cfg(feature = "snapshot")]
use std::path::PathBuf;

/// Result type for in-memory store writes.
pub type MemoryStoreResult<T> = Result<T, MemoryStoreError>;

/// Errors raised by [`InMemoryStore`](crate::InMemoryStore) writes.
///
/// Only referential problems are checked here; genealogical rules belong to
/// the engine's validators.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MemoryStoreError {
    /// A link references a member that is not stored.
    #[error("member {0} not found")]
    UnknownMember(MemberId),

    /// A link pairs a member with itself.
    #[error("member {0} cannot be linked to itself")]
    SelfLink(MemberId),

    /// No link joins the pair.
    #[error("no spousal link between members {0} and {1}")]
    LinkNotFound(MemberId, MemberId),
}

/// Result type for snapshot file operations.
#[cfg(feature = "snapshot")]
pub type StoreFileResult<T> = Result<T, StoreFileError>;

/// Errors raised while reading or writing a snapshot file.
#[cfg(feature = "snapshot")]
#[derive(Debug, thiserror::Error)]
pub enum StoreFileError {
    /// I/O error on the snapshot path.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// File being read or written.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The file is not a valid snapshot document.
    #[error("invalid snapshot: {0}")]
    Format(#[from] serde_json::Error),

    /// The snapshot was written by an incompatible format version.
    #[error("unsupported snapshot version {found} (expected {expected})")]
    UnsupportedVersion {
        /// Version found in the file.
        found: u32,
        /// Version this build reads.
        expected: u32,
    },
}

#[cfg(feature = "snapshot")]
impl StoreFileError {
    /// Creates an I/O error with path context.
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
