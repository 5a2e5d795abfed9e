//! Ask and agent mode handling plus the confirm step.

use crate::error::{Error, Result};
use crate::message::{
    ChatMode, ChatRequest, ChatResponse, ConfirmationRequest, ConfirmationResponse,
    CreateProxyDetails, HealthReport, CREATE_PROXY_ACTION,
};
use apigen_deploy::{Deployer, Deployment};
use apigen_intent::{Extractor, RegexExtractor};
use apigen_llm::{Client, LlmExtractor};
use apigen_render::{generate_preview, render, validate};
use std::time::Duration;
use tracing::{error, info, warn};

/// Reply when no model can answer.
pub const APOLOGY: &str =
    "Sorry, I can't answer questions right now because the language model is unavailable. \
     You can still describe a proxy to create in agent mode.";

/// Reply when a request exceeds its time budget.
pub const TIMEOUT_MESSAGE: &str = "Request timeout. Please try again.";

const CREATION_VERBS: [&str; 4] = ["create", "build", "generate", "make"];
const CREATION_NOUNS: [&str; 3] = ["proxy", "api", "endpoint"];

/// Returns true if the message asks for a new proxy.
///
/// Needs one creation verb and one resource noun, case-insensitive.
pub fn is_creation_request(message: &str) -> bool {
    let lower = message.to_lowercase();
    CREATION_VERBS.iter().any(|w| lower.contains(w))
        && CREATION_NOUNS.iter().any(|w| lower.contains(w))
}

/// Configuration for the assistant.
#[derive(Debug, Clone)]
pub struct AssistantConfig {
    /// Time budget for ask mode.
    pub ask_timeout: Duration,
    /// Time budget for agent mode.
    pub agent_timeout: Duration,
    /// Organization used when a chat message names none.
    pub default_organization: Option<String>,
    /// Token used when neither the confirmation nor its details carry one.
    pub deploy_token: Option<String>,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            ask_timeout: Duration::from_secs(30),
            agent_timeout: Duration::from_secs(45),
            default_organization: None,
            deploy_token: None,
        }
    }
}

/// The chat service.
///
/// Holds no conversation state; every call stands alone.
pub struct Assistant {
    config: AssistantConfig,
    extractor: Box<dyn Extractor>,
    model: Option<Client>,
    deployer: Option<Deployer>,
}

impl Assistant {
    /// Creates an assistant with pattern extraction, no model and no
    /// deployment.
    pub fn new(config: AssistantConfig) -> Self {
        Self {
            config,
            extractor: Box::new(RegexExtractor),
            model: None,
            deployer: None,
        }
    }

    /// Uses the model for answers and for extraction.
    #[must_use]
    pub fn with_model(mut self, client: Client) -> Self {
        self.extractor = Box::new(LlmExtractor::new(client.clone()));
        self.model = Some(client);
        self
    }

    /// Enables the confirm step.
    #[must_use]
    pub fn with_deployer(mut self, deployer: Deployer) -> Self {
        self.deployer = Some(deployer);
        self
    }

    /// Handles one chat message within the mode's time budget.
    pub async fn chat(&self, request: ChatRequest) -> ChatResponse {
        let mode = request.mode;
        let budget = match mode {
            ChatMode::Ask => self.config.ask_timeout,
            ChatMode::Agent => self.config.agent_timeout,
        };

        let handled = async move {
            match mode {
                ChatMode::Ask => self.ask(&request.message).await,
                ChatMode::Agent => self.agent(request).await,
            }
        };

        if let Ok(response) = tokio::time::timeout(budget, handled).await {
            response
        } else {
            warn!(?mode, timeout = ?budget, "chat request timed out");
            ChatResponse::failure(mode, TIMEOUT_MESSAGE)
        }
    }

    async fn ask(&self, message: &str) -> ChatResponse {
        match self.answer(message).await {
            Some(text) => ChatResponse::answer(ChatMode::Ask, text),
            None => ChatResponse::failure(ChatMode::Ask, APOLOGY),
        }
    }

    async fn agent(&self, request: ChatRequest) -> ChatResponse {
        let ChatRequest {
            message,
            organization,
            token,
            ..
        } = request;

        if !is_creation_request(&message) {
            return match self.answer(&message).await {
                Some(text) => ChatResponse::answer(ChatMode::Agent, text),
                None => ChatResponse::failure(ChatMode::Agent, APOLOGY),
            };
        }

        let descriptor = self.extractor.extract(&message).await;
        let bundle = render(&descriptor, &message);
        let warnings = validate(&descriptor);
        for warning in &warnings {
            warn!(proxy = %descriptor.name, "{}", warning);
        }
        let preview = generate_preview(&descriptor, &bundle, &warnings);
        info!(
            proxy = %descriptor.name,
            extractor = self.extractor.name(),
            "prepared proxy for confirmation"
        );

        let response = format!(
            "{preview}\n\nReady to create proxy \"{}\".\n\n\
             Confirm this action to deploy it to Apigee.",
            descriptor.name
        );
        let details = CreateProxyDetails {
            organization: organization.or_else(|| self.config.default_organization.clone()),
            token,
            request: message,
            descriptor,
            preview,
        };

        ChatResponse {
            requires_confirmation: true,
            action: Some(CREATE_PROXY_ACTION.to_string()),
            details: Some(details),
            ..ChatResponse::answer(ChatMode::Agent, response)
        }
    }

    async fn answer(&self, message: &str) -> Option<String> {
        let client = self.model.as_ref()?;
        match client.answer(message).await {
            Ok(text) => Some(text),
            Err(e) => {
                warn!(error = %e, "model could not answer");
                None
            }
        }
    }

    /// Executes or cancels a pending action.
    pub async fn confirm(&self, confirmation: ConfirmationRequest) -> ConfirmationResponse {
        if !confirmation.user_confirmation {
            return ConfirmationResponse::message(true, "Action cancelled");
        }

        match self.execute(confirmation).await {
            Ok(deployment) => ConfirmationResponse {
                response: format!("Proxy '{}' created successfully", deployment.proxy_name),
                success: true,
                proxy_name: Some(deployment.proxy_name),
                organization: Some(deployment.organization),
                test_url: Some(deployment.test_url),
            },
            Err(e) => {
                error!(error = %e, "confirmed action failed");
                ConfirmationResponse::message(false, e.to_string())
            }
        }
    }

    async fn execute(&self, confirmation: ConfirmationRequest) -> Result<Deployment> {
        if confirmation.action != CREATE_PROXY_ACTION {
            return Err(Error::UnknownAction(confirmation.action));
        }
        let details: CreateProxyDetails = serde_json::from_value(confirmation.details)?;
        let deployer = self.deployer.as_ref().ok_or(Error::DeployUnavailable)?;

        let token = confirmation
            .token
            .or(details.token)
            .or_else(|| self.config.deploy_token.clone())
            .ok_or(apigen_deploy::Error::MissingToken)?;
        let organization = details
            .organization
            .as_deref()
            .or(self.config.default_organization.as_deref());

        Ok(deployer
            .deploy(&details.descriptor, &details.request, organization, &token)
            .await?)
    }

    /// Reports what is configured.
    pub fn health(&self) -> HealthReport {
        HealthReport {
            status: "healthy".to_string(),
            extractor: self.extractor.name().to_string(),
            model_configured: self.model.is_some(),
            model: self.model.as_ref().map(|client| client.model().to_string()),
            deploy_configured: self.deployer.is_some(),
            environment: self
                .deployer
                .as_ref()
                .map(|deployer| deployer.environment().to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use apigen_deploy::DeployConfig;
    use apigen_llm::ClientConfig;

    const CREATE: &str = "Create a proxy named weather pointing to https://weather.example.com \
        with cors and spike arrest at 5 requests per sec";

    fn agent_request(message: &str) -> ChatRequest {
        ChatRequest {
            message: message.to_string(),
            mode: ChatMode::Agent,
            organization: Some("acme".to_string()),
            token: None,
        }
    }

    fn model_at(url: String) -> Client {
        Client::new(ClientConfig {
            api_key: "test-key".to_string(),
            api_url: url,
            ..Default::default()
        })
        .unwrap()
    }

    fn reply_body(text: &str) -> String {
        serde_json::json!({
            "id": "msg_1",
            "model": "claude-sonnet-4-20250514",
            "stop_reason": "end_turn",
            "content": [{"type": "text", "text": text}],
            "usage": {"input_tokens": 10, "output_tokens": 5}
        })
        .to_string()
    }

    #[test]
    fn creation_needs_verb_and_noun() {
        assert!(is_creation_request("Please BUILD an endpoint for orders"));
        assert!(is_creation_request("generate api"));
        assert!(!is_creation_request("create something nice"));
        assert!(!is_creation_request("what is a proxy?"));
    }

    #[tokio::test]
    async fn agent_creation_requires_confirmation() {
        let assistant = Assistant::new(AssistantConfig::default());
        let response = assistant.chat(agent_request(CREATE)).await;

        assert!(response.success);
        assert!(response.requires_confirmation);
        assert_eq!(response.mode, ChatMode::Agent);
        assert_eq!(response.action.as_deref(), Some(CREATE_PROXY_ACTION));
        assert!(response.response.starts_with("# API Proxy Configuration"));
        assert!(response.response.contains("Ready to create proxy \"weather\"."));

        let details = response.details.unwrap();
        assert_eq!(details.descriptor.name, "weather");
        assert_eq!(details.descriptor.spike_rate, "5ps");
        assert_eq!(details.request, CREATE);
        assert_eq!(details.organization.as_deref(), Some("acme"));
        assert!(details.preview.contains("<Rate>5ps</Rate>"));
    }

    #[tokio::test]
    async fn organization_falls_back_to_config() {
        let assistant = Assistant::new(AssistantConfig {
            default_organization: Some("fallback-org".to_string()),
            ..Default::default()
        });
        let mut request = agent_request(CREATE);
        request.organization = None;

        let details = assistant.chat(request).await.details.unwrap();
        assert_eq!(details.organization.as_deref(), Some("fallback-org"));
    }

    #[tokio::test]
    async fn no_model_yields_apology() {
        let assistant = Assistant::new(AssistantConfig::default());

        let ask = assistant
            .chat(ChatRequest {
                message: "How do quotas work?".to_string(),
                ..Default::default()
            })
            .await;
        assert!(!ask.success);
        assert_eq!(ask.response, APOLOGY);

        let agent = assistant.chat(agent_request("How do quotas work?")).await;
        assert!(!agent.success);
        assert!(!agent.requires_confirmation);
        assert_eq!(agent.response, APOLOGY);
    }

    #[tokio::test]
    async fn ask_mode_uses_model_answer() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/v1/messages")
            .with_status(200)
            .with_body(reply_body("Quota counts requests over an interval."))
            .create_async()
            .await;

        let assistant = Assistant::new(AssistantConfig::default())
            .with_model(model_at(format!("{}/v1/messages", server.url())));
        let response = assistant
            .chat(ChatRequest {
                message: "How do quotas work?".to_string(),
                ..Default::default()
            })
            .await;

        assert!(response.success);
        assert_eq!(response.response, "Quota counts requests over an interval.");
    }

    #[tokio::test]
    async fn slow_model_times_out() {
        // Accepts connections but never answers.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}/v1/messages", listener.local_addr().unwrap());

        let assistant = Assistant::new(AssistantConfig {
            ask_timeout: Duration::from_millis(50),
            ..Default::default()
        })
        .with_model(model_at(url));
        let response = assistant
            .chat(ChatRequest {
                message: "How do quotas work?".to_string(),
                ..Default::default()
            })
            .await;

        assert!(!response.success);
        assert_eq!(response.response, TIMEOUT_MESSAGE);
        drop(listener);
    }

    #[tokio::test]
    async fn declined_confirmation_is_cancelled() {
        let assistant = Assistant::new(AssistantConfig::default());
        let response = assistant
            .confirm(ConfirmationRequest {
                action: CREATE_PROXY_ACTION.to_string(),
                details: serde_json::Value::Null,
                user_confirmation: false,
                token: None,
            })
            .await;

        assert!(response.success);
        assert_eq!(response.response, "Action cancelled");
    }

    #[tokio::test]
    async fn unknown_action_fails() {
        let assistant = Assistant::new(AssistantConfig::default());
        let response = assistant
            .confirm(ConfirmationRequest {
                action: "delete_proxy".to_string(),
                details: serde_json::json!({}),
                user_confirmation: true,
                token: None,
            })
            .await;

        assert!(!response.success);
        assert_eq!(response.response, "Unknown action: delete_proxy");
    }

    #[tokio::test]
    async fn confirmed_creation_deploys_with_explicit_token() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/organizations/acme/apis")
            .match_query(mockito::Matcher::Any)
            .match_header("authorization", "Bearer chat-token")
            .with_status(200)
            .with_body(r#"{"revision": "1"}"#)
            .create_async()
            .await;

        let deployer = Deployer::new(DeployConfig {
            base_url: server.url(),
            ..Default::default()
        })
        .unwrap();
        let assistant = Assistant::new(AssistantConfig::default()).with_deployer(deployer);

        let mut request = agent_request(CREATE);
        request.token = Some("chat-token".to_string());
        let chat = assistant.chat(request).await;

        let response = assistant
            .confirm(ConfirmationRequest {
                action: chat.action.unwrap(),
                details: serde_json::to_value(chat.details.unwrap()).unwrap(),
                user_confirmation: true,
                token: None,
            })
            .await;

        assert!(response.success, "{}", response.response);
        assert_eq!(response.proxy_name.as_deref(), Some("weather"));
        assert_eq!(response.organization.as_deref(), Some("acme"));
        assert_eq!(
            response.test_url.as_deref(),
            Some("https://acme-apim-dev.apigee.net/weather")
        );
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn tampered_payload_is_not_uploaded() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", mockito::Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        let deployer = Deployer::new(DeployConfig {
            base_url: server.url(),
            ..Default::default()
        })
        .unwrap();
        let assistant = Assistant::new(AssistantConfig::default()).with_deployer(deployer);
        let chat = assistant.chat(agent_request(CREATE)).await;

        let mut details = serde_json::to_value(chat.details.unwrap()).unwrap();
        details["descriptor"]["name"] = serde_json::json!("../../escaped");

        let response = assistant
            .confirm(ConfirmationRequest {
                action: CREATE_PROXY_ACTION.to_string(),
                details,
                user_confirmation: true,
                token: Some("secret-token".to_string()),
            })
            .await;

        assert!(!response.success);
        assert!(response.response.contains("../../escaped"), "{}", response.response);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn confirmation_without_token_fails() {
        let deployer = Deployer::new(DeployConfig::default()).unwrap();
        let assistant = Assistant::new(AssistantConfig::default()).with_deployer(deployer);
        let chat = assistant.chat(agent_request(CREATE)).await;

        let response = assistant
            .confirm(ConfirmationRequest {
                action: CREATE_PROXY_ACTION.to_string(),
                details: serde_json::to_value(chat.details.unwrap()).unwrap(),
                user_confirmation: true,
                token: None,
            })
            .await;

        assert!(!response.success);
        assert_eq!(
            response.response,
            "Failed to create proxy: no Apigee access token available"
        );
    }

    #[test]
    fn health_reflects_configuration() {
        let report = Assistant::new(AssistantConfig::default()).health();
        assert_eq!(report.status, "healthy");
        assert_eq!(report.extractor, "regex");
        assert!(!report.model_configured);
        assert!(!report.deploy_configured);
        assert_eq!(report.model, None);
        assert_eq!(report.environment, None);

        let report = Assistant::new(AssistantConfig::default())
            .with_model(model_at("http://127.0.0.1:9/v1/messages".to_string()))
            .with_deployer(Deployer::new(DeployConfig::default()).unwrap())
            .health();
        assert_eq!(report.extractor, "llm");
        assert!(report.model_configured);
        assert_eq!(
            report.model.as_deref(),
            Some(ClientConfig::default().model.as_str())
        );
        assert!(report.deploy_configured);
        assert_eq!(report.environment.as_deref(), Some("apim-dev"));
    }
}
