//! Ordered-pattern extraction of proxy descriptors from free text.
//!
//! Every field is resolved by trying a declared list of patterns in order;
//! the first match wins and a miss falls back to the field's default. The
//! ordering is a deliberate tie-break and part of the observable behavior.

use crate::model::{
    is_absolute_url, normalize_base_path, PolicyKind, PolicySet, ProxyDescriptor, DEFAULT_NAME,
    DEFAULT_SPIKE_RATE, DEFAULT_TARGET_URL, DEFAULT_TRANSFORMATION_INTENT,
};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

/// Name patterns, most explicit first. Matched against lower-cased text.
static NAME_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    compile(&[
        r"named\s+([a-zA-Z0-9\-_]+)",
        r"called\s+([a-zA-Z0-9\-_]+)",
        r"proxy\s+([a-zA-Z0-9\-_]+)",
        r"create.*?(?:proxy|api).*?named\s+([a-zA-Z0-9\-_]+)",
        r"create.*?([a-zA-Z0-9\-_]+).*?(?:proxy|api)",
        r"api proxy named\s+([a-zA-Z0-9\-_]+)",
        r"apigee api proxy named\s+([a-zA-Z0-9\-_]+)",
    ])
});

/// Target URL patterns, most specific context first. Case-insensitive.
static URL_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    compile(&[
        r"(?i)target endpoint should be:\s*(https?://[^\s]+)",
        r"(?i)target.*?endpoint.*?(?:be|is|:)\s*(https?://[^\s]+)",
        r"(?i)pointing to\s+(https?://[^\s]+)",
        r"(?i)target.*?(https?://[^\s]+)",
        r"(?i)backend.*?(https?://[^\s]+)",
        r"(?i)endpoint.*?(https?://[^\s,;.]+)",
        r"(?i)(https?://[a-zA-Z0-9\-_./:]+(?:/[a-zA-Z0-9\-_./:]*)?)",
    ])
});

/// Base path patterns. Matched against lower-cased text.
static BASE_PATH_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    compile(&[
        r"base path\s+([a-zA-Z0-9\-_/]+)",
        r"basepath\s+([a-zA-Z0-9\-_/]+)",
        r"path\s+([a-zA-Z0-9\-_/]+)",
        r"with base path\s+([a-zA-Z0-9\-_/]+)",
    ])
});

/// Spike rate patterns. Matched against lower-cased text.
static RATE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    compile(&[
        r"(\d+)\s*requests?\s*per\s*sec",
        r"(\d+)\s*per\s*sec",
        r"(\d+)\s*per\s*second",
        r"(\d+)ps",
        r"spike arrest.*?(\d+)",
        r"(\d+)\s*req.*?sec",
    ])
});

/// Transformation intent patterns. Matched against lower-cased text.
static INTENT_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    compile(&[
        r"combine\s+([^.]+)",
        r"transform\s+([^.]+)",
        r"modify\s+([^.]+)",
        r"add\s+([^.]+)",
        r"javascript.*?(?:to|that)\s+([^.]+)",
    ])
});

/// Keyword table for policy detection, in output priority order.
///
/// A kind is detected if any of its phrases occurs in the lower-cased text.
pub static POLICY_PHRASES: [(PolicyKind, &[&str]); 6] = [
    (
        PolicyKind::VerifyApiKey,
        &["api key", "apikey", "authentication", "verify api key"],
    ),
    (PolicyKind::Cors, &["cors"]),
    (
        PolicyKind::Quota,
        &["quota", "rate limit", "requests per hour", "requests per day"],
    ),
    (
        PolicyKind::SpikeArrest,
        &["spike arrest", "spike", "burst", "requests per sec", "per second"],
    ),
    (
        PolicyKind::JavaScript,
        &["javascript", "transform", "modify", "combine", "js policy"],
    ),
    (
        PolicyKind::AssignMessage,
        &["assign message", "set variable", "add header", "set header"],
    ),
];

/// Minimum length a URL candidate must exceed to be accepted.
const MIN_URL_LEN: usize = 10;

fn compile(patterns: &[&str]) -> Vec<Regex> {
    patterns
        .iter()
        .map(|p| Regex::new(p).expect("extraction pattern must compile"))
        .collect()
}

/// Returns capture group 1 of the first pattern that matches.
fn first_capture<'t>(patterns: &[Regex], text: &'t str) -> Option<&'t str> {
    patterns
        .iter()
        .find_map(|re| re.captures(text).and_then(|c| c.get(1)).map(|m| m.as_str()))
}

/// Extracts a complete descriptor from a request. Never fails.
///
/// # Example
///
/// ```rust
/// use apigen_intent::extract;
///
/// let descriptor = extract("please help");
/// assert_eq!(descriptor.name, "generated-proxy");
/// assert_eq!(descriptor.base_path, "/generated-proxy");
/// assert_eq!(descriptor.target_url, "https://mocktarget.apigee.net/json");
/// ```
#[must_use]
pub fn extract(request: &str) -> ProxyDescriptor {
    let lower = request.to_lowercase();

    let name = extract_name(&lower);
    let base_path = extract_base_path(&lower).unwrap_or_else(|| format!("/{name}"));
    let descriptor = ProxyDescriptor {
        target_url: extract_target_url(request),
        base_path,
        policies: detect_policies(&lower),
        spike_rate: spike_rate(request),
        transformation_intent: extract_transformation_intent(request),
        name,
    };

    debug!(
        name = %descriptor.name,
        base_path = %descriptor.base_path,
        target = %descriptor.target_url,
        policies = ?descriptor.policies.names(),
        "extracted proxy descriptor"
    );

    descriptor
}

fn extract_name(lower: &str) -> String {
    first_capture(&NAME_PATTERNS, lower).map_or_else(
        || DEFAULT_NAME.to_string(),
        |name| name.replace(' ', "-"),
    )
}

fn extract_target_url(request: &str) -> String {
    for re in URL_PATTERNS.iter() {
        let Some(m) = re.captures(request).and_then(|c| c.get(1)) else {
            continue;
        };
        let candidate = m.as_str().trim_end_matches(['.', ',', ';']);
        if candidate.len() > MIN_URL_LEN && candidate.contains('.') && is_absolute_url(candidate)
        {
            return candidate.to_string();
        }
        debug!(candidate, "rejected target URL candidate");
    }
    DEFAULT_TARGET_URL.to_string()
}

fn extract_base_path(lower: &str) -> Option<String> {
    BASE_PATH_PATTERNS
        .iter()
        .filter_map(|re| re.captures(lower).and_then(|c| c.get(1)))
        .find_map(|m| normalize_base_path(m.as_str()))
}

fn detect_policies(lower: &str) -> PolicySet {
    POLICY_PHRASES
        .iter()
        .filter(|(_, phrases)| phrases.iter().any(|phrase| lower.contains(phrase)))
        .map(|(kind, _)| kind.clone())
        .collect()
}

/// Derives the spike arrest rate (`<N>ps`) from request text.
///
/// Shared by extraction and policy rendering so both always agree.
#[must_use]
pub fn spike_rate(request: &str) -> String {
    let lower = request.to_lowercase();
    first_capture(&RATE_PATTERNS, &lower)
        .map_or_else(|| DEFAULT_SPIKE_RATE.to_string(), |n| format!("{n}ps"))
}

/// Captures what follows a transformation verb, up to the next sentence end.
#[must_use]
pub fn extract_transformation_intent(request: &str) -> String {
    let lower = request.to_lowercase();
    INTENT_PATTERNS
        .iter()
        .filter_map(|re| re.captures(&lower).and_then(|c| c.get(1)))
        .map(|m| m.as_str().trim())
        .find(|intent| !intent.is_empty())
        .map_or_else(|| DEFAULT_TRANSFORMATION_INTENT.to_string(), str::to_string)
}

/// Turns request text into a descriptor.
///
/// Implementations must never fail: a miss on any field degrades to the
/// field's default.
#[async_trait]
pub trait Extractor: Send + Sync {
    /// Produces a fully-populated descriptor for the request.
    async fn extract(&self, request: &str) -> ProxyDescriptor;

    /// Short name for logs.
    fn name(&self) -> &str;
}

/// The pattern-table extractor.
#[derive(Debug, Clone, Copy, Default)]
pub struct RegexExtractor;

#[async_trait]
impl Extractor for RegexExtractor {
    async fn extract(&self, request: &str) -> ProxyDescriptor {
        extract(request)
    }

    fn name(&self) -> &str {
        "regex"
    }
}
