//! Prompt building for request parsing and documentation questions.

use serde_json::json;

/// System prompt for strict request parsing.
pub const PARSER_SYSTEM_PROMPT: &str =
    "You convert API proxy requests into JSON. Output a single JSON object and nothing else.";

/// System prompt for documentation questions.
pub const CONSULTANT_SYSTEM_PROMPT: &str = r"You are an expert Apigee API management consultant.

Rules:
- Provide detailed, practical guidance with configuration examples
- All JavaScript must be Apigee-compatible (Rhino ES5):
  - Use context.getVariable('var') to access request/response variables
  - Do not use browser or node functions like fetch() or console.log
  - Do not use ES6+ syntax (let, const, arrow functions)

You help with:
- API proxy creation and configuration
- Security policies and other available policies
- Rate limiting and quota management
- JavaScript policies for transformations
- Best practices and troubleshooting";

const SCHEMA: &str = r#"{"proxy_name": string, "target_url": string, "base_path": string, "policies": [string], "routes": [{"path": string, "methods": [string]}], "transformation": string}"#;

/// Builds the few-shot prompt that asks the model for a proxy JSON object.
#[derive(Default)]
pub struct PromptBuilder<'a> {
    request: Option<&'a str>,
}

impl<'a> PromptBuilder<'a> {
    /// Creates a new prompt builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the user request to parse.
    #[must_use]
    pub const fn with_request(mut self, request: &'a str) -> Self {
        self.request = Some(request);
        self
    }

    /// Builds the prompt string.
    #[must_use]
    pub fn build(self) -> String {
        let request = self.request.unwrap_or_default().trim();

        let mut lines = vec![
            "You are a strict parser. Convert the user's natural language request into a single JSON object only.".to_string(),
            "Do not output any explanation or extra text, only valid JSON that matches this schema:".to_string(),
            SCHEMA.to_string(),
            String::new(),
            "Examples:".to_string(),
        ];

        for (example_request, example_json) in examples() {
            lines.push(format!("Request: {example_request}"));
            lines.push(format!("JSON: {example_json}"));
            lines.push(String::new());
        }

        lines.push("User request:".to_string());
        lines.push(request.to_string());
        lines.push(String::new());
        lines.push("Output only the JSON object (compact or pretty JSON is OK).".to_string());
        lines.join("\n")
    }
}

fn examples() -> [(&'static str, serde_json::Value); 3] {
    [
        (
            "Create an Apigee API proxy named booking-api with base path /booking pointing to https://backend.example.com/api. Add a VerifyAPIKey policy to all requests.",
            json!({
                "proxy_name": "booking-api",
                "target_url": "https://backend.example.com/api",
                "base_path": "/booking",
                "policies": ["VerifyAPIKey"],
                "routes": [],
                "transformation": ""
            }),
        ),
        (
            "Create an Apigee API proxy named googledemo with base path /google pointing to https://www.google.com. Add these routes: /getuser (GET), /adduser (POST), /updateuser (PUT), /deleteuser (DELETE). Attach SpikeArrest with 4ps.",
            json!({
                "proxy_name": "googledemo",
                "target_url": "https://www.google.com",
                "base_path": "/google",
                "policies": ["SpikeArrest"],
                "routes": [
                    {"path": "/getuser", "methods": ["GET"]},
                    {"path": "/adduser", "methods": ["POST"]},
                    {"path": "/updateuser", "methods": ["PUT"]},
                    {"path": "/deleteuser", "methods": ["DELETE"]}
                ],
                "transformation": ""
            }),
        ),
        (
            "Create a proxy user-transform that combines firstName and lastName into fullName in response using JavaScript. Use base path /user-transform and target https://backend.example.com/user.",
            json!({
                "proxy_name": "user-transform",
                "target_url": "https://backend.example.com/user",
                "base_path": "/user-transform",
                "policies": ["JavaScript"],
                "routes": [],
                "transformation": "combine firstName and lastName into fullName in response"
            }),
        ),
    ]
}

/// Wraps a documentation question so the answer stays grounded in Apigee.
#[must_use]
pub fn question_prompt(question: &str) -> String {
    format!(
        "Based on Apigee documentation and best practices, help with:\n\n{}\n\nImportant: prefer documented Apigee behavior and say so when unsure.",
        question.trim()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_ends_with_user_request() {
        let prompt = PromptBuilder::new()
            .with_request("  Create a proxy named orders  ")
            .build();

        assert!(prompt.contains("User request:\nCreate a proxy named orders\n"));
        assert!(prompt.ends_with("Output only the JSON object (compact or pretty JSON is OK)."));
    }

    #[test]
    fn prompt_carries_three_examples_as_json() {
        let prompt = PromptBuilder::new().with_request("x").build();

        assert_eq!(prompt.matches("\nRequest: ").count(), 3);
        assert!(prompt.contains(r#""proxy_name":"booking-api""#));
        assert!(prompt.contains(r#""transformation":"combine firstName and lastName into fullName in response""#));
    }

    #[test]
    fn question_prompt_embeds_question() {
        let prompt = question_prompt(" How do I rotate API keys? ");
        assert!(prompt.contains("\n\nHow do I rotate API keys?\n\n"));
    }
}
