//! Apigee management API client.

use crate::error::{Error, Result};
use apigen_intent::ProxyDescriptor;
use apigen_render::{package, render, validate};
use reqwest::multipart::{Form, Part};
use serde::Serialize;
use tracing::{debug, info, warn};

/// Default management API root.
pub const DEFAULT_BASE_URL: &str = "https://apigee.googleapis.com/v1";

/// Default deployment environment, used for the test URL.
pub const DEFAULT_ENVIRONMENT: &str = "apim-dev";

/// Returns true if `organization` can stand as one management API path
/// segment: lowercase ASCII letters, digits and `-`.
fn is_organization_name(organization: &str) -> bool {
    !organization.is_empty()
        && organization
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}

/// Configuration for the deploy client.
#[derive(Debug, Clone)]
pub struct DeployConfig {
    /// Management API root, without trailing slash.
    pub base_url: String,
    /// Organization used when a call names none. Empty means unset.
    pub organization: String,
    /// Environment the test URL points at.
    pub environment: String,
    /// Request timeout in seconds.
    pub timeout_seconds: u64,
}

impl Default for DeployConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            organization: String::new(),
            environment: DEFAULT_ENVIRONMENT.to_string(),
            timeout_seconds: 60,
        }
    }
}

/// Outcome of a successful import.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Deployment {
    /// Imported proxy name.
    pub proxy_name: String,
    /// Organization the proxy was imported into.
    pub organization: String,
    /// Where the proxy answers once deployed to the configured environment.
    pub test_url: String,
    /// Decoded response body, or `null` when empty.
    pub response: serde_json::Value,
}

/// Uploads proxy bundles through the management API.
///
/// The bearer token is an argument of every call. Nothing here reads or
/// writes process-wide credentials.
pub struct Deployer {
    http: reqwest::Client,
    config: DeployConfig,
}

impl Deployer {
    /// Creates a new deploy client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: DeployConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_seconds))
            .build()?;
        Ok(Self { http, config })
    }

    /// Environment used for test URLs.
    pub fn environment(&self) -> &str {
        &self.config.environment
    }

    /// Configured fallback organization, if any.
    pub fn default_organization(&self) -> Option<&str> {
        Some(self.config.organization.trim()).filter(|org| !org.is_empty())
    }

    /// Public URL of a deployed proxy.
    pub fn test_url(&self, organization: &str, base_path: &str) -> String {
        format!(
            "https://{organization}-{}.apigee.net{base_path}",
            self.config.environment
        )
    }

    /// Renders, packages and imports a proxy.
    ///
    /// `request` is the text the descriptor was extracted from; templates
    /// read the spike rate from it. `organization` overrides the configured
    /// default. Failures are never retried.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - the token is empty, no organization is known, or the organization
    ///   is not a plain name
    /// - the descriptor is invalid or packaging fails
    /// - the request fails or the API answers with status >= 400
    pub async fn deploy(
        &self,
        descriptor: &ProxyDescriptor,
        request: &str,
        organization: Option<&str>,
        token: &str,
    ) -> Result<Deployment> {
        if token.trim().is_empty() {
            return Err(Error::MissingToken);
        }
        let organization = organization
            .map(str::trim)
            .filter(|org| !org.is_empty())
            .or_else(|| self.default_organization())
            .ok_or(Error::MissingOrganization)?
            .to_string();
        if !is_organization_name(&organization) {
            return Err(Error::InvalidOrganization(organization));
        }
        descriptor.validate()?;

        let bundle = render(descriptor, request);
        for warning in validate(descriptor) {
            warn!(proxy = %descriptor.name, "{}", warning);
        }
        let archive = package(&bundle)?;

        info!(
            proxy = %descriptor.name,
            organization = %organization,
            bytes = archive.len(),
            environment = self.environment(),
            "importing proxy bundle"
        );

        let part = Part::bytes(archive)
            .file_name(format!("{}.zip", descriptor.name))
            .mime_str("application/zip")?;
        let form = Form::new().part("file", part);

        let url = format!(
            "{}/organizations/{}/apis",
            self.config.base_url.trim_end_matches('/'),
            organization
        );
        let response = self
            .http
            .post(&url)
            .query(&[("action", "import"), ("name", descriptor.name.as_str())])
            .bearer_auth(token)
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        debug!("Received response with status: {}", status);
        let body = response.text().await?;

        if status.as_u16() >= 400 {
            return Err(Error::Api {
                status: status.as_u16(),
                body,
            });
        }

        let response = if body.trim().is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_str(&body).unwrap_or(serde_json::Value::String(body))
        };

        let deployment = Deployment {
            test_url: self.test_url(&organization, &descriptor.base_path),
            proxy_name: descriptor.name.clone(),
            organization,
            response,
        };
        info!(
            proxy = %deployment.proxy_name,
            test_url = %deployment.test_url,
            "proxy imported"
        );
        Ok(deployment)
    }
}
