//! Command implementations and the wiring they share.

pub mod bundle;
pub mod chat;
pub mod confirm;
pub mod deploy;
pub mod health;
pub mod preview;

use crate::{DeployArgs, ExtractorKind, ModelArgs};
use anyhow::{Context, Result};
use apigen_assist::{Assistant, AssistantConfig};
use apigen_deploy::{DeployConfig, Deployer};
use apigen_intent::{Extractor, RegexExtractor};
use apigen_llm::{Client, ClientConfig, LlmExtractor};
use tracing::warn;

/// Builds the model client, if a key is configured.
pub fn model_client(model: &ModelArgs) -> Result<Option<Client>> {
    let Some(api_key) = model.api_key.clone().filter(|k| !k.trim().is_empty()) else {
        return Ok(None);
    };
    let client = Client::new(ClientConfig {
        api_key,
        ..Default::default()
    })
    .with_context(|| "Failed to create Claude client")?;
    Ok(Some(client))
}

/// Builds the requested extractor.
///
/// Asking for the model without a key falls back to patterns.
pub fn extractor(kind: ExtractorKind, model: &ModelArgs) -> Result<Box<dyn Extractor>> {
    match kind {
        ExtractorKind::Regex => Ok(Box::new(RegexExtractor)),
        ExtractorKind::Llm => match model_client(model)? {
            Some(client) => Ok(Box::new(LlmExtractor::new(client))),
            None => {
                warn!("ANTHROPIC_API_KEY not set, using pattern extraction");
                Ok(Box::new(RegexExtractor))
            }
        },
    }
}

/// Builds the deploy client from CLI settings.
pub fn deployer(deploy: &DeployArgs) -> Result<Deployer> {
    Deployer::new(DeployConfig {
        base_url: deploy.base_url.clone(),
        organization: deploy.org.clone().unwrap_or_default(),
        environment: deploy.environment.clone(),
        ..Default::default()
    })
    .with_context(|| "Failed to create Apigee client")
}

/// Builds the chat service.
///
/// Deployment is enabled once an organization or token is configured.
pub fn assistant(model: Option<&ModelArgs>, deploy: &DeployArgs) -> Result<Assistant> {
    let mut assistant = Assistant::new(AssistantConfig {
        default_organization: deploy.org.clone(),
        deploy_token: deploy.token.clone(),
        ..Default::default()
    });

    if let Some(client) = model.map(model_client).transpose()?.flatten() {
        assistant = assistant.with_model(client);
    }
    if deploy.org.is_some() || deploy.token.is_some() {
        assistant = assistant.with_deployer(deployer(deploy)?);
    }
    Ok(assistant)
}

/// Prints a value as pretty JSON on stdout.
pub fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).with_context(|| "Failed to encode output")?;
    println!("{json}");
    Ok(())
}
