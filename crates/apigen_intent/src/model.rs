//! Typed proxy descriptor model.
//!
//! A [`ProxyDescriptor`] is the flat record the extractor produces from one
//! request. Every field has a documented default, so a descriptor is always
//! fully populated.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

/// Proxy name used when the request names none.
pub const DEFAULT_NAME: &str = "generated-proxy";

/// Backend used when the request carries no usable URL.
pub const DEFAULT_TARGET_URL: &str = "https://mocktarget.apigee.net/json";

/// Spike arrest rate used when the request states none.
pub const DEFAULT_SPIKE_RATE: &str = "10ps";

/// Transformation intent used when the request states none.
pub const DEFAULT_TRANSFORMATION_INTENT: &str = "custom data transformation";

/// A fully-populated proxy configuration derived from one request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProxyDescriptor {
    /// Proxy identifier.
    pub name: String,
    /// Absolute backend URL.
    pub target_url: String,
    /// Path prefix routed to this proxy.
    pub base_path: String,
    /// Detected policies, in detection order.
    pub policies: PolicySet,
    /// Spike arrest rate, `<N>ps`.
    pub spike_rate: String,
    /// Free text steering the JavaScript policy body.
    pub transformation_intent: String,
}

impl ProxyDescriptor {
    /// Creates a descriptor with every field at its default.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            base_path: format!("/{name}"),
            name,
            target_url: DEFAULT_TARGET_URL.to_string(),
            policies: PolicySet::new(),
            spike_rate: DEFAULT_SPIKE_RATE.to_string(),
            transformation_intent: DEFAULT_TRANSFORMATION_INTENT.to_string(),
        }
    }

    /// Returns true if the descriptor requires the JavaScript resource.
    #[must_use]
    pub fn needs_script(&self) -> bool {
        self.policies.contains(&PolicyKind::JavaScript)
    }

    /// Checks the structural invariants of a descriptor built elsewhere.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if:
    /// - the name or an [`PolicyKind::Other`] name is not an identifier
    ///   (see [`is_identifier`])
    /// - the base path is not of the form `/segment[/segment...]`
    /// - the target is not an absolute http(s) URL with a host
    pub fn validate(&self) -> Result<()> {
        if !is_identifier(&self.name) {
            return Err(Error::Validation(format!(
                "proxy name '{}' may only contain letters, digits, '-' and '_'",
                self.name
            )));
        }
        if let Some(kind) = self
            .policies
            .iter()
            .find(|kind| !is_identifier(kind.as_str()))
        {
            return Err(Error::Validation(format!(
                "policy name '{kind}' may only contain letters, digits, '-' and '_'"
            )));
        }
        if !is_well_formed_base_path(&self.base_path) {
            return Err(Error::Validation(format!(
                "base path '{}' must have one leading '/' and no trailing '/'",
                self.base_path
            )));
        }
        if !is_absolute_url(&self.target_url) {
            return Err(Error::Validation(format!(
                "target '{}' is not an absolute http(s) URL",
                self.target_url
            )));
        }
        Ok(())
    }

    /// Decodes and validates a descriptor from JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or the descriptor is invalid.
    pub fn from_json(json: &str) -> Result<Self> {
        let descriptor: Self = serde_json::from_str(json)?;
        descriptor.validate()?;
        Ok(descriptor)
    }
}

impl Default for ProxyDescriptor {
    fn default() -> Self {
        Self::new(DEFAULT_NAME)
    }
}

/// Returns true if `name` is non-empty and made of ASCII letters, digits,
/// `-` and `_`.
///
/// Proxy and policy names become archive paths, so nothing else is allowed.
#[must_use]
pub fn is_identifier(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_'))
}

/// Normalizes a raw path capture to `/segment[/segment...]`.
///
/// Returns `None` when nothing but slashes remains.
#[must_use]
pub fn normalize_base_path(raw: &str) -> Option<String> {
    let trimmed = raw.trim().trim_matches('/');
    if trimmed.is_empty() {
        None
    } else {
        Some(format!("/{trimmed}"))
    }
}

/// Returns true if `path` has exactly one leading `/` and no trailing `/`.
#[must_use]
pub fn is_well_formed_base_path(path: &str) -> bool {
    path.len() > 1 && path.starts_with('/') && !path.starts_with("//") && !path.ends_with('/')
}

/// Returns true if `candidate` is an absolute http(s) URL with a host.
#[must_use]
pub fn is_absolute_url(candidate: &str) -> bool {
    Url::parse(candidate).is_ok_and(|url| {
        matches!(url.scheme(), "http" | "https") && url.host_str().is_some_and(|h| !h.is_empty())
    })
}

/// A policy kind the generator knows how to place and render.
///
/// The six named kinds form the fixed enumeration the keyword tables detect.
/// [`PolicyKind::Other`] only arises from descriptors produced elsewhere (the
/// language-model path or a decoded payload) and is carried by name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PolicyKind {
    /// API key verification.
    VerifyApiKey,
    /// Cross-origin resource sharing.
    Cors,
    /// Long-window request quota.
    Quota,
    /// Per-second traffic smoothing.
    SpikeArrest,
    /// Scripted response transformation.
    JavaScript,
    /// Header and variable assignment.
    AssignMessage,
    /// Any other policy, named verbatim.
    Other(String),
}

impl PolicyKind {
    /// The fixed enumeration, in detection priority order.
    pub const KNOWN: [Self; 6] = [
        Self::VerifyApiKey,
        Self::Cors,
        Self::Quota,
        Self::SpikeArrest,
        Self::JavaScript,
        Self::AssignMessage,
    ];

    /// Returns the Apigee policy name, also used as the descriptor file stem.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::VerifyApiKey => "VerifyAPIKey",
            Self::Cors => "CORS",
            Self::Quota => "Quota",
            Self::SpikeArrest => "SpikeArrest",
            Self::JavaScript => "JavaScript",
            Self::AssignMessage => "AssignMessage",
            Self::Other(name) => name,
        }
    }

    /// Resolves a policy name, tolerating case, spaces, `-` and `_`.
    ///
    /// Unrecognized names become [`PolicyKind::Other`] with the trimmed input.
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        let folded: String = name
            .chars()
            .filter(|c| !matches!(c, ' ' | '-' | '_'))
            .collect::<String>()
            .to_lowercase();

        match folded.as_str() {
            "verifyapikey" | "apikey" => Self::VerifyApiKey,
            "cors" => Self::Cors,
            "quota" => Self::Quota,
            "spikearrest" => Self::SpikeArrest,
            "javascript" | "js" => Self::JavaScript,
            "assignmessage" => Self::AssignMessage,
            _ => Self::Other(name.trim().to_string()),
        }
    }
}

impl fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for PolicyKind {
    fn from(name: String) -> Self {
        Self::from_name(&name)
    }
}

impl From<PolicyKind> for String {
    fn from(kind: PolicyKind) -> Self {
        kind.as_str().to_string()
    }
}

/// An insertion-ordered set of policy kinds.
///
/// Membership is what matters: inserting a kind twice keeps the first
/// position.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<PolicyKind>", into = "Vec<PolicyKind>")]
pub struct PolicySet(Vec<PolicyKind>);

impl PolicySet {
    /// Creates an empty set.
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Inserts a kind; returns false if it was already present.
    pub fn insert(&mut self, kind: PolicyKind) -> bool {
        if self.0.contains(&kind) {
            return false;
        }
        self.0.push(kind);
        true
    }

    /// Returns true if the kind is present.
    #[must_use]
    pub fn contains(&self, kind: &PolicyKind) -> bool {
        self.0.contains(kind)
    }

    /// Iterates kinds in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, PolicyKind> {
        self.0.iter()
    }

    /// Number of kinds.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if no kind is present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Policy names in order.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.0.iter().map(PolicyKind::as_str).collect()
    }
}

impl FromIterator<PolicyKind> for PolicySet {
    fn from_iter<I: IntoIterator<Item = PolicyKind>>(iter: I) -> Self {
        let mut set = Self::new();
        for kind in iter {
            set.insert(kind);
        }
        set
    }
}

impl From<Vec<PolicyKind>> for PolicySet {
    fn from(kinds: Vec<PolicyKind>) -> Self {
        kinds.into_iter().collect()
    }
}

impl From<PolicySet> for Vec<PolicyKind> {
    fn from(set: PolicySet) -> Self {
        set.0
    }
}

impl<'a> IntoIterator for &'a PolicySet {
    type Item = &'a PolicyKind;
    type IntoIter = std::slice::Iter<'a, PolicyKind>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
