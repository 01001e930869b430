//! Mock provider implementation for testing.

use super::{GenerationRequest, ProviderError, TextProvider};
use async_trait::async_trait;
use std::sync::Mutex;

/// Mock text provider that records every request it receives, so tests can
/// assert on what the handler actually forwarded.
pub struct MockTextProvider {
    reply: Result<String, String>,
    requests: Mutex<Vec<GenerationRequest>>,
}

impl MockTextProvider {
    /// A provider that answers every call with the given text.
    pub fn replying(text: &str) -> Self {
        Self {
            reply: Ok(text.to_string()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// A provider that rejects every call with the given upstream message.
    pub fn failing(message: &str) -> Self {
        Self {
            reply: Err(message.to_string()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// The most recent request forwarded to the provider, if any.
    pub fn last_request(&self) -> Option<GenerationRequest> {
        self.requests.lock().unwrap().last().cloned()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl TextProvider for MockTextProvider {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, ProviderError> {
        self.requests.lock().unwrap().push(request.clone());

        match &self.reply {
            Ok(text) => Ok(text.clone()),
            Err(message) => Err(ProviderError::Api(message.clone())),
        }
    }
}
