//! Confirm command implementation.

use crate::DeployArgs;
use anyhow::{Context, Result};
use apigen_assist::ConfirmationRequest;
use std::fs;

/// Runs the confirm command.
pub async fn run(payload_path: &str, decline: bool, deploy: &DeployArgs) -> Result<()> {
    let content = fs::read_to_string(payload_path)
        .with_context(|| format!("Failed to read payload file: {payload_path}"))?;
    let mut confirmation: ConfirmationRequest =
        serde_json::from_str(&content).with_context(|| "Failed to parse confirmation payload")?;
    if decline {
        confirmation.user_confirmation = false;
    }
    if deploy.token.is_some() {
        confirmation.token.clone_from(&deploy.token);
    }

    let assistant = super::assistant(None, deploy)?.with_deployer(super::deployer(deploy)?);
    let response = assistant.confirm(confirmation).await;
    super::print_json(&response)?;

    if !response.success {
        anyhow::bail!("{}", response.response);
    }
    Ok(())
}
