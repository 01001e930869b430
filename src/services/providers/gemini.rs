//! Gemini AI provider implementation.
//!
//! Implements non-streamed text generation against Google's Gemini API,
//! including the URL-context and web-search tools and the optional
//! thinking-budget configuration.

use super::{GenerationRequest, ProviderError, TextProvider};
use crate::models::{ChatMessage, Role};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

/// Gemini provider configuration.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_base: String,
    pub timeout_secs: u64,
}

/// Gemini text provider.
///
/// Holds only the shared HTTP client; the credential and model arrive with
/// each call, so a single provider instance serves every request.
pub struct GeminiTextProvider {
    config: GeminiConfig,
    client: Client,
}

impl GeminiTextProvider {
    pub fn new(config: GeminiConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        Self { config, client }
    }

    /// Build the API URL for the given model and method.
    fn api_url(&self, model: &str, method: &str, api_key: &str) -> String {
        format!(
            "{}/models/{}:{}?key={}",
            self.config.api_base, model, method, api_key
        )
    }
}

#[async_trait]
impl TextProvider for GeminiTextProvider {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, ProviderError> {
        let body = GenerateContentRequest {
            contents: contents_from_messages(&request.messages),
            system_instruction: request.system_instruction.as_deref().map(|text| {
                SystemInstruction {
                    parts: vec![Part::text(text)],
                }
            }),
            tools: build_tools(request.enable_search),
            generation_config: build_generation_config(request.thinking_budget),
        };

        let url = self.api_url(&request.model, "generateContent", &request.api_key);

        tracing::debug!(
            model = %request.model,
            message_count = request.messages.len(),
            search_enabled = request.enable_search,
            "Sending request to Gemini API"
        );

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(ProviderError::Api(extract_error_message(
                &error_text,
                status,
            )));
        }

        let api_response: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Api(format!("Failed to parse response: {}", e)))?;

        let candidate = api_response
            .candidates
            .first()
            .ok_or_else(|| ProviderError::Api("No candidates in Gemini response".to_string()))?;

        if candidate.finish_reason.as_deref() == Some("SAFETY") {
            return Err(ProviderError::Api(
                "Gemini blocked the response for safety reasons".to_string(),
            ));
        }

        // Thought parts are internal reasoning; only answer text is relayed.
        let text: String = candidate
            .content
            .parts
            .iter()
            .filter(|p| !p.thought)
            .filter_map(|p| p.text.as_deref())
            .collect();

        Ok(text)
    }
}

/// Map conversation roles onto the two roles the Gemini wire format knows.
/// System turns normally travel as `systemInstruction`, but callers that put
/// them in the message list still get them forwarded in order.
fn wire_role(role: Role) -> &'static str {
    match role {
        Role::Assistant => "model",
        Role::User | Role::System | Role::Tool => "user",
    }
}

fn contents_from_messages(messages: &[ChatMessage]) -> Vec<Content> {
    messages
        .iter()
        .map(|message| Content {
            role: Some(wire_role(message.role).to_string()),
            parts: parts_from_content(&message.content),
        })
        .collect()
}

fn parts_from_content(content: &Value) -> Vec<Part> {
    match content {
        Value::String(text) => vec![Part::text(text)],
        // Structured content: keep the text items, in order.
        Value::Array(items) => {
            let parts: Vec<Part> = items
                .iter()
                .filter_map(|item| item.get("text").and_then(Value::as_str))
                .map(Part::text)
                .collect();
            if parts.is_empty() {
                vec![Part::text(&content.to_string())]
            } else {
                parts
            }
        }
        other => vec![Part::text(&other.to_string())],
    }
}

/// Assemble the tool set: URL context is always available, web search only on
/// explicit opt-in.
fn build_tools(enable_search: bool) -> Vec<Tool> {
    let mut tools = vec![Tool {
        url_context: Some(EmptyToolConfig {}),
        google_search: None,
    }];

    if enable_search {
        tools.push(Tool {
            url_context: None,
            google_search: Some(EmptyToolConfig {}),
        });
    }

    tools
}

/// A positive thinking budget turns on extended reasoning, with thoughts
/// always included so the budget is actually spent on them.
fn build_generation_config(thinking_budget: Option<i64>) -> Option<GenerationConfig> {
    match thinking_budget {
        Some(budget) if budget > 0 => Some(GenerationConfig {
            thinking_config: Some(ThinkingConfig {
                thinking_budget: budget,
                include_thoughts: true,
            }),
        }),
        _ => None,
    }
}

/// Pull the human-readable message out of a Gemini error body, falling back
/// to the raw payload when it is not the documented error shape.
fn extract_error_message(body: &str, status: StatusCode) -> String {
    serde_json::from_str::<GeminiErrorResponse>(body)
        .map(|e| e.error.message)
        .unwrap_or_else(|_| format!("Gemini API error {}: {}", status, body))
}

// ============================================================================
// Gemini API Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<SystemInstruction>,
    tools: Vec<Tool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    thought: bool,
}

impl Part {
    fn text(text: &str) -> Self {
        Self {
            text: Some(text.to_string()),
            thought: false,
        }
    }
}

#[derive(Debug, Serialize)]
struct SystemInstruction {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Tool {
    #[serde(skip_serializing_if = "Option::is_none")]
    url_context: Option<EmptyToolConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    google_search: Option<EmptyToolConfig>,
}

#[derive(Debug, Serialize)]
struct EmptyToolConfig {}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    thinking_config: Option<ThinkingConfig>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ThinkingConfig {
    thinking_budget: i64,
    include_thoughts: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Content,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorResponse {
    error: GeminiErrorBody,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorBody {
    message: String,
}
