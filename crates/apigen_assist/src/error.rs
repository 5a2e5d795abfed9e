//! Error types for the confirm step.
//!
//! These never cross the chat boundary. [`crate::Assistant`] turns them into
//! failure responses.

use thiserror::Error;

/// Errors that can occur while executing a confirmed action.
#[derive(Debug, Error)]
pub enum Error {
    /// The action tag is not one this service performs.
    #[error("Unknown action: {0}")]
    UnknownAction(String),

    /// The details payload does not decode as a proxy creation.
    #[error("Invalid action details: {0}")]
    InvalidDetails(#[from] serde_json::Error),

    /// No deploy client is configured.
    #[error("Deployment is not configured")]
    DeployUnavailable,

    /// The import failed.
    #[error("Failed to create proxy: {0}")]
    Deploy(#[from] apigen_deploy::Error),
}

/// Result type alias for assistant operations.
pub type Result<T> = std::result::Result<T, Error>;
