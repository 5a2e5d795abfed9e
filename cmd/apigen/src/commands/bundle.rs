//! Bundle command implementation.

use crate::{ExtractorKind, ModelArgs};
use anyhow::{Context, Result};
use apigen_intent::Extractor;
use apigen_render::{package, render, validate, write_tree};
use std::fs;
use tracing::{info, warn};

/// Runs the bundle command.
pub async fn run(
    request: &str,
    kind: ExtractorKind,
    model: &ModelArgs,
    output_path: Option<&str>,
    dir: Option<&str>,
) -> Result<()> {
    let descriptor = super::extractor(kind, model)?.extract(request).await;
    descriptor
        .validate()
        .with_context(|| "Extracted descriptor is invalid")?;

    let bundle = render(&descriptor, request);
    for warning in validate(&descriptor) {
        warn!("{}", warning);
    }

    let archive = package(&bundle).with_context(|| "Failed to package bundle")?;
    let output_path = output_path.map_or_else(|| format!("{}.zip", descriptor.name), str::to_string);
    fs::write(&output_path, &archive)
        .with_context(|| format!("Failed to write bundle: {output_path}"))?;
    info!(
        "Bundle for '{}' written to: {} ({} files, {} bytes)",
        descriptor.name,
        output_path,
        bundle.files().len(),
        archive.len()
    );

    if let Some(dir) = dir {
        write_tree(&bundle, dir).with_context(|| format!("Failed to write bundle tree: {dir}"))?;
        info!("Bundle tree written to: {}", dir);
    }
    Ok(())
}
