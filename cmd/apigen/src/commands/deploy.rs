//! Deploy command implementation.

use crate::{DeployArgs, ExtractorKind, ModelArgs};
use anyhow::{Context, Result};
use apigen_intent::Extractor;
use tracing::info;

/// Runs the deploy command.
pub async fn run(
    request: &str,
    kind: ExtractorKind,
    model: &ModelArgs,
    deploy: &DeployArgs,
) -> Result<()> {
    let token = deploy
        .token
        .as_deref()
        .with_context(|| "APIGEE_TOKEN environment variable not set")?;
    let deployer = super::deployer(deploy)?;

    let descriptor = super::extractor(kind, model)?.extract(request).await;
    info!("Deploying proxy '{}'", descriptor.name);

    let deployment = deployer
        .deploy(&descriptor, request, deploy.org.as_deref(), token)
        .await
        .with_context(|| format!("Failed to create proxy '{}'", descriptor.name))?;

    info!("Proxy '{}' created successfully", deployment.proxy_name);
    super::print_json(&deployment)
}
