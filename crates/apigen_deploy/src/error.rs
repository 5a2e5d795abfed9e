//! Error types for deployment.

use thiserror::Error;

/// Errors that can occur while importing a bundle.
#[derive(Debug, Error)]
pub enum Error {
    /// No bearer token was supplied.
    #[error("no Apigee access token available")]
    MissingToken,

    /// Neither the call nor the configuration names an organization.
    #[error("no Apigee organization configured")]
    MissingOrganization,

    /// The organization is not a plain Apigee organization name.
    #[error("invalid Apigee organization '{0}'")]
    InvalidOrganization(String),

    /// The management API answered with status >= 400.
    #[error("API error {status}: {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Response body, verbatim.
        body: String,
    },

    /// The descriptor failed validation.
    #[error(transparent)]
    Descriptor(#[from] apigen_intent::Error),

    /// The bundle could not be packaged.
    #[error("failed to package bundle: {0}")]
    Package(#[from] apigen_render::Error),

    /// Network error.
    #[error(transparent)]
    Network(#[from] reqwest::Error),
}

/// Result type alias for deployment operations.
pub type Result<T> = std::result::Result<T, Error>;
