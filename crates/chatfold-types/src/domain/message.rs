use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::usage::{LanguageModelUsage, ProviderMetadata};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

// ==========================================
// 1. Message
// ==========================================

/// A chat message as persisted and replayed by the backend.
///
/// Also the unit handed to prompt construction after sanitization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: String,
    pub role: Role,
    #[serde(default)]
    pub parts: Vec<MessagePart>,
    #[serde(default)]
    pub metadata: MessageMetadata,
}

impl ChatMessage {
    /// Build a single-text-part message (handy for user turns and tests)
    pub fn text(id: impl Into<String>, role: Role, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            role,
            parts: vec![MessagePart::Text(TextPart::done(text))],
            metadata: MessageMetadata::default(),
        }
    }

    pub fn with_metadata(mut self, metadata: MessageMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Concatenated text of every text part
    pub fn text_content(&self) -> String {
        self.parts
            .iter()
            .filter_map(|part| match part {
                MessagePart::Text(text) => Some(text.text.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn tool_parts(&self) -> impl Iterator<Item = &ToolPart> {
        self.parts.iter().filter_map(|part| match part {
            MessagePart::DynamicTool(tool) => Some(tool),
            _ => None,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageMetadata {
    /// Stable position in workspace history; deletion addresses messages by this.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub history_sequence: Option<u64>,

    /// Epoch milliseconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    /// Cumulative usage of the turn that produced this message
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<LanguageModelUsage>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_metadata: Option<ProviderMetadata>,

    /// Wall-clock duration of the stream in milliseconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<u64>,

    /// True when the message was persisted before its stream finished
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub partial: Option<bool>,

    /// Assistant summary that replaced earlier history
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub compacted: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_type: Option<String>,

    /// Slash-command bookkeeping attached to user turns
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command_metadata: Option<CommandMetadata>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandMetadata {
    /// Command kind, e.g. "compaction-request"
    #[serde(rename = "type")]
    pub kind: String,
    /// Who issued it, e.g. "idle-compaction" for automatic requests
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl CommandMetadata {
    /// Automatic compaction requests are not user activity.
    pub fn is_idle_compaction(&self) -> bool {
        self.kind == "compaction-request" && self.source.as_deref() == Some("idle-compaction")
    }
}

// ==========================================
// 2. Parts
// ==========================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum MessagePart {
    Text(TextPart),
    Reasoning(ReasoningPart),
    DynamicTool(ToolPart),
}

impl MessagePart {
    pub fn kind(&self) -> PartKind {
        match self {
            MessagePart::Text(_) => PartKind::Text,
            MessagePart::Reasoning(_) => PartKind::Reasoning,
            MessagePart::DynamicTool(_) => PartKind::Tool,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartKind {
    Text,
    Reasoning,
    Tool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PartState {
    Streaming,
    #[default]
    Done,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextPart {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
    #[serde(default)]
    pub state: PartState,
}

impl TextPart {
    pub fn done(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            timestamp: None,
            state: PartState::Done,
        }
    }
}

/// Reasoning span. `timestamp` is the timestamp of the first delta of the span.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReasoningPart {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
    #[serde(default)]
    pub state: PartState,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ToolState {
    /// Input is still streaming in
    Pending,
    /// Input is complete; waiting for the result
    Executing,
    OutputAvailable,
    Failed,
    /// The stream ended before a result arrived
    Interrupted,
}

impl ToolState {
    pub fn is_finished(self) -> bool {
        matches!(
            self,
            ToolState::OutputAvailable | ToolState::Failed | ToolState::Interrupted
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolPart {
    pub tool_call_id: String,
    pub tool_name: String,
    pub state: ToolState,

    /// Expected to be a JSON object; upstream output is untrusted, so anything goes here.
    #[serde(default)]
    pub input: Value,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_text: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
}

impl ToolPart {
    pub fn new(tool_call_id: impl Into<String>, tool_name: impl Into<String>) -> Self {
        Self {
            tool_call_id: tool_call_id.into(),
            tool_name: tool_name.into(),
            state: ToolState::Pending,
            input: Value::Object(Map::new()),
            output: None,
            error_text: None,
            timestamp: None,
        }
    }
}
