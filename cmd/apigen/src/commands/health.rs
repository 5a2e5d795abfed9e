//! Health command implementation.

use crate::{DeployArgs, ModelArgs};
use anyhow::Result;

/// Runs the health command.
pub fn run(model: &ModelArgs, deploy: &DeployArgs) -> Result<()> {
    let report = super::assistant(Some(model), deploy)?.health();
    super::print_json(&report)
}
