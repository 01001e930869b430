//! Upstream text-generation provider abstraction.
//!
//! The relay treats the upstream as an opaque capability: one request in,
//! one text result out. `GeminiTextProvider` is the real implementation;
//! `MockTextProvider` stands in for tests.

pub mod gemini;
pub mod mock;

use crate::models::ChatMessage;
use async_trait::async_trait;
use thiserror::Error;

/// Error type for provider operations.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    /// The upstream rejected the call. Displays the upstream message bare so
    /// the caller-facing envelope relays it unchanged.
    #[error("{0}")]
    Api(String),

    #[error("Network error: {0}")]
    Network(String),
}

/// Fully-resolved options for a single upstream generation call.
///
/// Built immutably in one step by the handler once validation has passed;
/// optional behavior is modeled as optional fields, never as ad-hoc mutation.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    /// Resolved credential: per-request key if supplied, else the
    /// process-wide default.
    pub api_key: String,
    pub model: String,
    /// Conversation in caller order. Order must survive all the way to the
    /// wire; multi-turn context is the point of the relay.
    pub messages: Vec<ChatMessage>,
    pub system_instruction: Option<String>,
    /// Enables extended reasoning upstream when positive.
    pub thinking_budget: Option<i64>,
    pub enable_search: bool,
}

/// Trait for text generation providers (e.g., Gemini).
#[async_trait]
pub trait TextProvider: Send + Sync {
    /// Perform one blocking generation call and return the response text.
    async fn generate(&self, request: &GenerationRequest) -> Result<String, ProviderError>;
}
