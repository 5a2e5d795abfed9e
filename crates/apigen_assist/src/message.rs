//! Chat boundary payloads.

use apigen_intent::ProxyDescriptor;
use serde::{Deserialize, Serialize};

/// Action tag for a pending proxy creation.
pub const CREATE_PROXY_ACTION: &str = "create_proxy";

/// How a chat message is handled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatMode {
    /// Documentation answers only.
    #[default]
    Ask,
    /// Creation requests produce a confirmable proxy; anything else is
    /// answered like ask mode.
    Agent,
}

/// One incoming chat message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    /// Free text from the user.
    pub message: String,
    /// Handling mode.
    #[serde(default)]
    pub mode: ChatMode,
    /// Target organization for a later deployment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization: Option<String>,
    /// Access token for a later deployment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

/// Reply to a chat message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatResponse {
    /// Text shown to the user.
    pub response: String,
    /// Mode the message was handled in.
    pub mode: ChatMode,
    /// False when the reply is an apology, timeout or error.
    pub success: bool,
    /// True when `action` awaits a confirm step.
    pub requires_confirmation: bool,
    /// Pending action tag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    /// Payload to hand back with the confirmation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<CreateProxyDetails>,
}

impl ChatResponse {
    pub(crate) fn answer(mode: ChatMode, response: impl Into<String>) -> Self {
        Self {
            response: response.into(),
            mode,
            success: true,
            requires_confirmation: false,
            action: None,
            details: None,
        }
    }

    pub(crate) fn failure(mode: ChatMode, response: impl Into<String>) -> Self {
        Self {
            success: false,
            ..Self::answer(mode, response)
        }
    }
}

/// Everything the confirm step needs to deploy without re-parsing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateProxyDetails {
    /// The extracted descriptor.
    pub descriptor: ProxyDescriptor,
    /// The request text the descriptor came from.
    pub request: String,
    /// Organization to deploy into.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization: Option<String>,
    /// Access token supplied with the chat message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    /// Markdown preview shown to the user.
    pub preview: String,
}

/// The user's answer to a pending action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfirmationRequest {
    /// Action tag from the chat response.
    pub action: String,
    /// Details payload from the chat response, passed back unchanged.
    pub details: serde_json::Value,
    /// Whether the user approved.
    pub user_confirmation: bool,
    /// Access token; takes precedence over one carried in `details`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

/// Result of a confirm step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfirmationResponse {
    /// Text shown to the user.
    pub response: String,
    /// Whether the step succeeded. A declined action counts as success.
    pub success: bool,
    /// Imported proxy name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proxy_name: Option<String>,
    /// Organization the proxy went to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization: Option<String>,
    /// URL the proxy answers on.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_url: Option<String>,
}

impl ConfirmationResponse {
    pub(crate) fn message(success: bool, response: impl Into<String>) -> Self {
        Self {
            response: response.into(),
            success,
            proxy_name: None,
            organization: None,
            test_url: None,
        }
    }
}

/// Service status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthReport {
    /// Always `healthy` while the process answers.
    pub status: String,
    /// Which extractor handles creation requests.
    pub extractor: String,
    /// Whether a language model is configured.
    pub model_configured: bool,
    /// Model name, when configured.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Whether deployment is configured.
    pub deploy_configured: bool,
    /// Environment test URLs point at, when deployment is configured.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chat_request_defaults_to_ask_mode() {
        let request: ChatRequest = serde_json::from_str(r#"{"message": "hi"}"#).unwrap();
        assert_eq!(request.mode, ChatMode::Ask);
        assert_eq!(request.organization, None);

        let request: ChatRequest =
            serde_json::from_str(r#"{"message": "hi", "mode": "agent", "organization": "acme"}"#)
                .unwrap();
        assert_eq!(request.mode, ChatMode::Agent);
        assert_eq!(request.organization.as_deref(), Some("acme"));
    }

    #[test]
    fn plain_answer_omits_action_fields() {
        let json = serde_json::to_value(ChatResponse::answer(ChatMode::Ask, "ok")).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "response": "ok",
                "mode": "ask",
                "success": true,
                "requires_confirmation": false
            })
        );
    }
}
