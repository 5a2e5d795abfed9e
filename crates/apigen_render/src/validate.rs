//! Pre-packaging checks on a descriptor.
//!
//! These never block packaging. They report references the generated bundle
//! cannot satisfy on its own.

use crate::flow::stage_for;
use crate::templates::{GENERIC_ERROR_STEP, INVALID_KEY_STEP};
use apigen_intent::{PolicyKind, ProxyDescriptor};
use std::fmt;

/// A problem found in a descriptor before packaging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Warning {
    /// A fault rule calls a step that no generated policy provides.
    DanglingFaultStep {
        /// Fault rule that references the step.
        rule: &'static str,
        /// Missing step name.
        step: &'static str,
    },
    /// A policy has a descriptor but no flow step, so it never executes.
    UnplacedPolicy(String),
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DanglingFaultStep { rule, step } => write!(
                f,
                "fault rule '{rule}' calls step '{step}', which is not part of the bundle"
            ),
            Self::UnplacedPolicy(name) => write!(
                f,
                "policy '{name}' is declared but not attached to any flow"
            ),
        }
    }
}

/// Lists every warning for a descriptor, in a stable order.
#[must_use]
pub fn validate(descriptor: &ProxyDescriptor) -> Vec<Warning> {
    let mut warnings = Vec::new();

    if descriptor.policies.contains(&PolicyKind::VerifyApiKey) {
        for (rule, step) in [
            ("InvalidAPIKey", INVALID_KEY_STEP),
            ("defaultRule", GENERIC_ERROR_STEP),
        ] {
            let provided = descriptor.policies.contains(&PolicyKind::from_name(step));
            if !provided {
                warnings.push(Warning::DanglingFaultStep { rule, step });
            }
        }
    }

    for kind in &descriptor.policies {
        if stage_for(kind).is_none() {
            warnings.push(Warning::UnplacedPolicy(kind.to_string()));
        }
    }

    warnings
}
