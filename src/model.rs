//! Wire types for the OpenAI-compatible Chat Completions API.

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::options::ModelOptions;

/// Fallback message when an error body carries no readable message.
pub const UNKNOWN_ERROR: &str = "unknown error";

/// Role of the message sender.
#[derive(Debug, Copy, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// A single message in a conversation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    /// A user turn carrying `content`.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// Request body for `POST /v1/chat/completions`.
///
/// Built fresh for every call, so concurrent sessions never see each
/// other's messages or `stream` flag.
#[derive(Debug, Clone, Serialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stream: Option<bool>,
}

impl ChatCompletionRequest {
    /// Single user prompt. `stream` is only sent when true.
    pub fn new(model_options: &ModelOptions, prompt: impl Into<String>, stream: bool) -> Self {
        Self {
            model: model_options.model.clone(),
            max_tokens: model_options.max_tokens,
            temperature: model_options.temperature,
            messages: vec![ChatMessage::user(prompt)],
            stream: stream.then_some(true),
        }
    }
}

// --- Single-shot response ---

#[derive(Debug, Clone, Deserialize)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    pub choices: Vec<Choice>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Choice {
    pub message: Option<ResponseMessage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResponseMessage {
    #[serde(default)]
    pub content: Option<MessageContent>,
}

/// Message content is normally a plain string; some gateways return a list
/// of content blocks instead.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Blocks(Vec<ContentBlock>),
}

#[derive(Debug, Clone, Deserialize)]
pub struct ContentBlock {
    #[serde(default)]
    pub text: Option<BlockText>,
}

/// Block text, either `"text": "..."` or `"text": {"content": "..."}`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum BlockText {
    Plain(String),
    Nested {
        #[serde(default)]
        content: Option<String>,
    },
}

impl MessageContent {
    /// Flatten to text. Blocks without text are skipped.
    pub fn text(&self) -> String {
        match self {
            MessageContent::Text(text) => text.clone(),
            MessageContent::Blocks(blocks) => blocks
                .iter()
                .filter_map(|block| match block.text.as_ref()? {
                    BlockText::Plain(text) => Some(text.as_str()),
                    BlockText::Nested { content } => content.as_deref(),
                })
                .join(""),
        }
    }
}

// --- Streaming chunk ---

/// One `data: {...}` payload of a streamed completion.
///
/// Every level defaults, so a chunk without choices or content simply
/// carries an empty delta.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatCompletionChunk {
    #[serde(default)]
    pub choices: Vec<ChunkChoice>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChunkChoice {
    #[serde(default)]
    pub delta: Option<ChunkDelta>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChunkDelta {
    #[serde(default)]
    pub content: Option<String>,
}

impl ChatCompletionChunk {
    /// Text delta of the first choice, empty when absent.
    pub fn delta(&self) -> &str {
        self.choices
            .first()
            .and_then(|choice| choice.delta.as_ref())
            .and_then(|delta| delta.content.as_deref())
            .unwrap_or_default()
    }
}

// --- Errors ---

#[derive(Debug, Clone, Deserialize)]
struct ErrorEnvelope {
    error: Option<ErrorBody>,
}

#[derive(Debug, Clone, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// Extract `error.message` from an error body, or [`UNKNOWN_ERROR`].
pub fn server_message(body: &str) -> String {
    serde_json::from_str::<ErrorEnvelope>(body)
        .ok()
        .and_then(|envelope| envelope.error)
        .and_then(|error| error.message)
        .unwrap_or_else(|| UNKNOWN_ERROR.to_string())
}
