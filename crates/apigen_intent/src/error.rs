//! Error types for descriptor decoding and validation.

use thiserror::Error;

/// Errors that can occur when a descriptor comes from outside the extractor.
///
/// Extraction itself never fails; these only surface when a descriptor is
/// decoded from a payload (for example a confirmation request).
#[derive(Debug, Error)]
pub enum Error {
    /// Descriptor violates a structural invariant.
    #[error("invalid descriptor: {0}")]
    Validation(String),

    /// Descriptor JSON could not be decoded.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Result type alias for descriptor operations.
pub type Result<T> = std::result::Result<T, Error>;
