//! Error types for the genealogy data model.

use thiserror::Error;

/// Errors raised while constructing model values.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KinshipError {
    /// A gender code other than `M` or `F`.
    #[error("invalid gender code: {0:?}")]
    InvalidGender(String),
}

/// Result type for model operations.
pub type KinshipResult<T> = std::result::Result<T, KinshipError>;
