//! Configuration preview report.
//!
//! The preview is what a user sees before confirming a deployment: the
//! extracted details followed by every generated file in fenced blocks.

use crate::bundle::{FileRole, RenderedBundle};
use crate::validate::Warning;
use apigen_intent::ProxyDescriptor;

/// Generates a Markdown preview of a rendered bundle.
#[must_use]
pub fn generate_preview(
    descriptor: &ProxyDescriptor,
    bundle: &RenderedBundle,
    warnings: &[Warning],
) -> String {
    let mut report = String::new();

    report.push_str("# API Proxy Configuration\n\n");

    report.push_str("## Details\n\n");
    report.push_str(&format!("- **Name**: `{}`\n", descriptor.name));
    report.push_str(&format!("- **Base Path**: `{}`\n", descriptor.base_path));
    report.push_str(&format!("- **Target**: `{}`\n", descriptor.target_url));
    let policies = if descriptor.policies.is_empty() {
        "None".to_string()
    } else {
        descriptor.policies.names().join(", ")
    };
    report.push_str(&format!("- **Policies**: `{}`\n", policies));
    report.push('\n');

    for (title, role) in [
        ("Main Proxy XML", FileRole::ProxyDescriptor),
        ("Proxy Endpoint XML", FileRole::ProxyEndpoint),
        ("Target Endpoint XML", FileRole::TargetEndpoint),
    ] {
        if let Some(xml) = bundle.get(&role) {
            report.push_str(&format!("## {}\n\n```xml\n{}\n```\n\n", title, xml));
        }
    }

    let policy_files: Vec<_> = bundle
        .files()
        .iter()
        .filter_map(|f| match &f.role {
            FileRole::Policy(kind) => Some((kind, &f.contents)),
            _ => None,
        })
        .collect();

    if !policy_files.is_empty() {
        report.push_str("## Policy Configurations\n\n");
        for (kind, xml) in policy_files {
            report.push_str(&format!("### {} Policy\n\n```xml\n{}\n```\n\n", kind, xml));
        }
    }

    if let Some(js) = bundle.get(&FileRole::Script) {
        report.push_str(&format!(
            "## JavaScript Code (transformation.js)\n\n```javascript\n{}\n```\n\n",
            js
        ));
    }

    if !warnings.is_empty() {
        report.push_str("## Warnings\n\n");
        for warning in warnings {
            report.push_str(&format!("- {}\n", warning));
        }
        report.push('\n');
    }

    report.trim_end().to_string()
}
