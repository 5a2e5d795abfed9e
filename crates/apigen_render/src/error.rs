//! Error types for bundle packaging.

use thiserror::Error;

/// Errors that can occur while packaging a rendered bundle.
///
/// Rendering itself cannot fail; only archive and file output can.
#[derive(Debug, Error)]
pub enum Error {
    /// A generated path would leave the bundle root.
    #[error("refusing to write '{0}' outside the bundle")]
    UnsafePath(String),

    /// Archive could not be written.
    #[error(transparent)]
    Zip(#[from] zip::result::ZipError),

    /// File output failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Result type alias for packaging operations.
pub type Result<T> = std::result::Result<T, Error>;
