use crate::error::AppError;
use crate::models::{GenerateRequest, GenerateResponse};
use crate::services::providers::GenerationRequest;
use crate::startup::AppState;
use axum::{Json, extract::State, extract::rejection::JsonRejection};

/// Kept stable for callers that match on the error text.
const MISSING_FIELDS: &str = "Missing required fields: apikey, model or messageList.";

/// `POST /api/generate`: validate the body, resolve the credential, forward
/// the conversation to the upstream provider and relay its text.
///
/// The body arrives as a `Result` so a malformed payload becomes our error
/// envelope instead of axum's default rejection.
pub async fn generate(
    State(state): State<AppState>,
    payload: Result<Json<GenerateRequest>, JsonRejection>,
) -> Result<Json<GenerateResponse>, AppError> {
    let Json(request) = payload.map_err(|e| AppError::MalformedRequest(e.body_text()))?;

    if request.model.trim().is_empty() || request.message_list.is_empty() {
        return Err(AppError::Validation(MISSING_FIELDS.to_string()));
    }

    // Per-request key wins; the configured key is the deployment fallback.
    let api_key = request
        .apikey
        .as_deref()
        .filter(|key| !key.is_empty())
        .map(str::to_string)
        .or_else(|| state.config.google.api_key.clone())
        .ok_or_else(|| AppError::Validation(MISSING_FIELDS.to_string()))?;

    let generation = GenerationRequest {
        api_key,
        model: request.model,
        messages: request.message_list,
        system_instruction: request.system_instruction,
        thinking_budget: request.thinking_budget,
        enable_search: request.search,
    };

    tracing::info!(
        model = %generation.model,
        message_count = generation.messages.len(),
        search_enabled = generation.enable_search,
        "Forwarding generation request"
    );

    let text = state.text_provider.generate(&generation).await?;

    Ok(Json(GenerateResponse::success(text)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{GoogleConfig, RelayConfig, ServerConfig};
    use crate::services::providers::mock::MockTextProvider;
    use serde_json::json;
    use std::sync::Arc;

    fn test_state(provider: Arc<MockTextProvider>, default_key: Option<&str>) -> AppState {
        AppState {
            config: RelayConfig {
                server: ServerConfig { port: 0 },
                google: GoogleConfig {
                    api_key: default_key.map(str::to_string),
                    api_base: "http://unused.invalid".to_string(),
                    timeout_secs: 5,
                },
            },
            text_provider: provider,
        }
    }

    fn request(body: serde_json::Value) -> GenerateRequest {
        serde_json::from_value(body).expect("request should deserialize")
    }

    #[tokio::test]
    async fn valid_request_returns_success_envelope() {
        let provider = Arc::new(MockTextProvider::replying("hello"));
        let state = test_state(provider.clone(), None);

        let response = generate(
            State(state),
            Ok(Json(request(json!({
                "apikey": "k1",
                "model": "m1",
                "messageList": [{"role": "user", "content": "hi"}],
            })))),
        )
        .await
        .expect("request should succeed");

        assert_eq!(response.0.response, "hello");
        assert_eq!(provider.request_count(), 1);
    }

    #[tokio::test]
    async fn missing_model_is_a_validation_error() {
        let provider = Arc::new(MockTextProvider::replying("unused"));
        let state = test_state(provider.clone(), Some("env-key"));

        let result = generate(
            State(state),
            Ok(Json(request(json!({
                "messageList": [{"role": "user", "content": "hi"}],
            })))),
        )
        .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
        assert_eq!(provider.request_count(), 0);
    }

    #[tokio::test]
    async fn empty_message_list_is_a_validation_error() {
        let provider = Arc::new(MockTextProvider::replying("unused"));
        let state = test_state(provider.clone(), Some("env-key"));

        let result = generate(
            State(state),
            Ok(Json(request(json!({"model": "m1", "messageList": []})))),
        )
        .await;

        match result {
            Err(AppError::Validation(message)) => {
                assert!(message.contains("model or messageList"));
            }
            other => panic!("expected validation error, got {:?}", other.is_ok()),
        }
        assert_eq!(provider.request_count(), 0);
    }

    #[tokio::test]
    async fn missing_credential_everywhere_is_a_validation_error() {
        let provider = Arc::new(MockTextProvider::replying("unused"));
        let state = test_state(provider.clone(), None);

        let result = generate(
            State(state),
            Ok(Json(request(json!({
                "model": "m1",
                "messageList": [{"role": "user", "content": "hi"}],
            })))),
        )
        .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
        assert_eq!(provider.request_count(), 0);
    }

    #[tokio::test]
    async fn request_key_overrides_configured_default() {
        let provider = Arc::new(MockTextProvider::replying("ok"));
        let state = test_state(provider.clone(), Some("env-key"));

        generate(
            State(state),
            Ok(Json(request(json!({
                "apikey": "request-key",
                "model": "m1",
                "messageList": [{"role": "user", "content": "hi"}],
            })))),
        )
        .await
        .expect("request should succeed");

        let forwarded = provider.last_request().expect("provider was called");
        assert_eq!(forwarded.api_key, "request-key");
    }

    #[tokio::test]
    async fn configured_default_is_used_when_request_key_is_absent() {
        let provider = Arc::new(MockTextProvider::replying("ok"));
        let state = test_state(provider.clone(), Some("env-key"));

        generate(
            State(state),
            Ok(Json(request(json!({
                "model": "m1",
                "messageList": [{"role": "user", "content": "hi"}],
            })))),
        )
        .await
        .expect("request should succeed");

        let forwarded = provider.last_request().expect("provider was called");
        assert_eq!(forwarded.api_key, "env-key");
    }

    #[tokio::test]
    async fn options_are_forwarded_without_reordering() {
        let provider = Arc::new(MockTextProvider::replying("ok"));
        let state = test_state(provider.clone(), None);

        generate(
            State(state),
            Ok(Json(request(json!({
                "apikey": "k1",
                "model": "m1",
                "messageList": [
                    {"role": "user", "content": "one"},
                    {"role": "assistant", "content": "two"},
                    {"role": "user", "content": "three"},
                ],
                "system_instruction": "Be terse.",
                "thinkingBudget": 2048,
                "search": true,
            })))),
        )
        .await
        .expect("request should succeed");

        let forwarded = provider.last_request().expect("provider was called");
        assert_eq!(forwarded.model, "m1");
        assert_eq!(forwarded.system_instruction.as_deref(), Some("Be terse."));
        assert_eq!(forwarded.thinking_budget, Some(2048));
        assert!(forwarded.enable_search);

        let contents: Vec<&str> = forwarded
            .messages
            .iter()
            .filter_map(|m| m.content.as_str())
            .collect();
        assert_eq!(contents, vec!["one", "two", "three"]);
    }

    #[tokio::test]
    async fn upstream_failure_is_relayed_as_upstream_error() {
        let provider = Arc::new(MockTextProvider::failing("invalid API key"));
        let state = test_state(provider, None);

        let result = generate(
            State(state),
            Ok(Json(request(json!({
                "apikey": "bad-key",
                "model": "m1",
                "messageList": [{"role": "user", "content": "hi"}],
            })))),
        )
        .await;

        match result {
            Err(AppError::Upstream(err)) => assert_eq!(err.to_string(), "invalid API key"),
            other => panic!("expected upstream error, got {:?}", other.is_ok()),
        }
    }
}
