//! Chat command implementation.

use crate::{DeployArgs, Mode, ModelArgs};
use anyhow::{Context, Result};
use apigen_assist::{ChatMode, ChatRequest, ConfirmationRequest};
use std::fs;
use tracing::info;

/// Runs the chat command.
pub async fn run(
    message: &str,
    mode: Mode,
    save_path: Option<&str>,
    model: &ModelArgs,
    deploy: &DeployArgs,
) -> Result<()> {
    let assistant = super::assistant(Some(model), deploy)?;

    let response = assistant
        .chat(ChatRequest {
            message: message.to_string(),
            mode: match mode {
                Mode::Ask => ChatMode::Ask,
                Mode::Agent => ChatMode::Agent,
            },
            organization: deploy.org.clone(),
            token: None,
        })
        .await;

    if let (Some(path), Some(action), Some(details)) =
        (save_path, &response.action, &response.details)
    {
        let payload = ConfirmationRequest {
            action: action.clone(),
            details: serde_json::to_value(details)
                .with_context(|| "Failed to encode action details")?,
            user_confirmation: true,
            token: None,
        };
        let json = serde_json::to_string_pretty(&payload)
            .with_context(|| "Failed to encode confirmation payload")?;
        fs::write(path, json).with_context(|| format!("Failed to write payload file: {path}"))?;
        info!("Confirmation payload written to: {}", path);
    }

    super::print_json(&response)
}
