//! Language-model extraction with pattern fallback.

use crate::client::Client;
use crate::error::{Error, Result};
use crate::response::MessageResponse;
use apigen_intent::model::{
    is_absolute_url, is_identifier, normalize_base_path, DEFAULT_NAME, DEFAULT_TARGET_URL,
};
use apigen_intent::{
    extract_transformation_intent, spike_rate, Extractor, PolicyKind, ProxyDescriptor,
    RegexExtractor,
};
use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, warn};

/// Fields the model reported. Missing or empty keys are `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedRequest {
    /// `proxy_name` or `name`.
    pub proxy_name: Option<String>,
    /// `target_url` or `target`.
    pub target_url: Option<String>,
    /// `base_path` or `path`.
    pub base_path: Option<String>,
    /// `policies` or `policy`; a bare string counts as one entry.
    pub policies: Vec<String>,
    /// `transformation` or `transform`.
    pub transformation: Option<String>,
}

impl ParsedRequest {
    /// Parses the JSON object inside a model response.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ParseError`] if the reply holds no JSON object.
    pub fn from_response(response: &MessageResponse) -> Result<Self> {
        let json = response.extract_json();
        debug!("Extracted JSON:\n{}", json);
        Self::from_json(&json)
    }

    /// Parses a JSON object with the loose key aliases models tend to use.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ParseError`] if `json` is not a JSON object.
    pub fn from_json(json: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(json)
            .map_err(|e| Error::ParseError(format!("model output is not JSON: {e}")))?;
        let Value::Object(map) = value else {
            return Err(Error::ParseError(
                "model output is not a JSON object".to_string(),
            ));
        };

        let text = |keys: &[&str]| -> Option<String> {
            keys.iter()
                .filter_map(|k| map.get(*k).and_then(Value::as_str))
                .map(str::trim)
                .find(|s| !s.is_empty())
                .map(str::to_string)
        };

        let policies = ["policies", "policy"]
            .iter()
            .filter_map(|k| map.get(*k))
            .map(|v| match v {
                Value::Array(items) => items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect(),
                Value::String(name) => vec![name.clone()],
                _ => Vec::new(),
            })
            .find(|names: &Vec<String>| !names.is_empty())
            .unwrap_or_default();

        Ok(Self {
            proxy_name: text(&["proxy_name", "name"]),
            target_url: text(&["target_url", "target"]),
            base_path: text(&["base_path", "path"]),
            policies,
            transformation: text(&["transformation", "transform"]),
        })
    }

    /// Builds a descriptor, applying the same defaults and invariants as
    /// pattern extraction.
    ///
    /// `request` supplies the spike rate and, when the model gave none, the
    /// transformation intent. A proxy name that is not an identifier falls
    /// back to [`DEFAULT_NAME`]; a policy name that is not one is dropped.
    #[must_use]
    pub fn into_descriptor(self, request: &str) -> ProxyDescriptor {
        let name = match self.proxy_name.map(|n| n.replace(' ', "-")) {
            Some(name) if is_identifier(&name) => name,
            Some(name) => {
                warn!(proxy = %name, "model proxy name is not an identifier, using default");
                DEFAULT_NAME.to_string()
            }
            None => DEFAULT_NAME.to_string(),
        };

        let target_url = self
            .target_url
            .map(|u| u.trim_end_matches(['.', ',', ';']).to_string())
            .filter(|u| is_absolute_url(u))
            .unwrap_or_else(|| DEFAULT_TARGET_URL.to_string());

        let base_path = self
            .base_path
            .as_deref()
            .and_then(normalize_base_path)
            .or_else(|| normalize_base_path(&name))
            .unwrap_or_else(|| format!("/{DEFAULT_NAME}"));

        ProxyDescriptor {
            name,
            target_url,
            base_path,
            policies: self
                .policies
                .iter()
                .filter(|p| !p.trim().is_empty())
                .map(|p| PolicyKind::from_name(p))
                .filter(|kind| {
                    let keep = is_identifier(kind.as_str());
                    if !keep {
                        warn!(policy = %kind, "dropping model policy name that is not an identifier");
                    }
                    keep
                })
                .collect(),
            spike_rate: spike_rate(request),
            transformation_intent: self
                .transformation
                .unwrap_or_else(|| extract_transformation_intent(request)),
        }
    }
}

/// Extractor backed by the language model.
///
/// Any failure (transport, status, non-JSON reply) is logged and the request
/// is handed to [`RegexExtractor`] instead, so callers always get a
/// descriptor.
pub struct LlmExtractor {
    client: Client,
    fallback: RegexExtractor,
}

impl LlmExtractor {
    /// Wraps a client.
    #[must_use]
    pub const fn new(client: Client) -> Self {
        Self {
            client,
            fallback: RegexExtractor,
        }
    }
}

#[async_trait]
impl Extractor for LlmExtractor {
    async fn extract(&self, request: &str) -> ProxyDescriptor {
        match self.client.parse_request(request).await {
            Ok(parsed) => parsed.into_descriptor(request),
            Err(e) => {
                warn!(
                    error = %e,
                    "model parse failed, falling back to pattern extraction"
                );
                self.fallback.extract(request).await
            }
        }
    }

    fn name(&self) -> &str {
        "llm"
    }
}
