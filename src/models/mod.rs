//! Request and response DTOs for the relay endpoint.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Inbound body for `POST /api/generate`.
///
/// Field names follow the original client contract (`apikey`, `messageList`,
/// `system_instruction`); the camelCase spellings are accepted as aliases so
/// existing callers keep working.
#[derive(Debug, Clone, Deserialize)]
pub struct GenerateRequest {
    #[serde(default, alias = "apiKey")]
    pub apikey: Option<String>,

    #[serde(default)]
    pub model: String,

    #[serde(default, rename = "messageList", alias = "messages")]
    pub message_list: Vec<ChatMessage>,

    #[serde(default, alias = "systemInstruction")]
    pub system_instruction: Option<String>,

    #[serde(default, rename = "thinkingBudget")]
    pub thinking_budget: Option<i64>,

    /// Search is opt-in on exact boolean `true` only. `"true"`, `1` and
    /// friends deserialize to `false` rather than accidentally enabling the
    /// tool or failing the whole request.
    #[serde(default, alias = "enableSearch", deserialize_with = "strict_bool")]
    pub search: bool,
}

/// One turn of the conversation, forwarded upstream in order.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    /// Either a plain string or the structured parts array some SDK clients
    /// send (`[{type: "text", text: "..."}]`).
    pub content: Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
    Tool,
}

/// The uniform envelope returned for both success and failure.
#[derive(Debug, Clone, Serialize)]
pub struct GenerateResponse {
    pub status: ResponseStatus,
    pub response: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseStatus {
    Success,
    Error,
}

impl GenerateResponse {
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            status: ResponseStatus::Success,
            response: text.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: ResponseStatus::Error,
            response: message.into(),
        }
    }
}

/// Deserialize any JSON value, yielding `true` only for the boolean `true`.
fn strict_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(matches!(value, Value::Bool(true)))
}
