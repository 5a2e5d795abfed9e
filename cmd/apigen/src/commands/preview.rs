//! Preview command implementation.

use crate::{ExtractorKind, ModelArgs};
use anyhow::{Context, Result};
use apigen_intent::Extractor;
use apigen_render::{generate_preview, render, validate};
use std::fs;
use tracing::{info, warn};

/// Runs the preview command.
pub async fn run(
    request: &str,
    kind: ExtractorKind,
    model: &ModelArgs,
    output_path: Option<&str>,
) -> Result<()> {
    let extractor = super::extractor(kind, model)?;
    let descriptor = extractor.extract(request).await;
    info!(
        "Extracted proxy '{}' with {} policies ({} extractor)",
        descriptor.name,
        descriptor.policies.len(),
        extractor.name()
    );

    let bundle = render(&descriptor, request);
    let warnings = validate(&descriptor);
    for warning in &warnings {
        warn!("{}", warning);
    }
    let preview = generate_preview(&descriptor, &bundle, &warnings);

    match output_path {
        Some(path) => {
            fs::write(path, &preview)
                .with_context(|| format!("Failed to write preview file: {path}"))?;
            info!("Preview written to: {}", path);
        }
        None => println!("{preview}"),
    }
    Ok(())
}
