use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::{LanguageModelUsage, MessagePart, ProviderMetadata};

// NOTE: Wire conventions
//
// - Field names are camelCase, matching the backend's JSON.
// - Timestamps are epoch milliseconds.
// - `tokens` on delta events is the producer's estimate for that fragment only.
// - `workspaceId` defaults to "" so hand-written feeds can omit it.
// - `replay` marks events re-emitted after a reconnect.

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamStartEvent {
    #[serde(default)]
    pub workspace_id: String,
    pub message_id: String,
    /// Re-emitted after reconnect; must not feed live timing
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub replay: bool,
    pub history_sequence: u64,
    pub model: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<i64>,
    /// Agent mode the turn runs in ("exec", "plan", ...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
}

/// Text fragment of an assistant message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamDeltaEvent {
    #[serde(default)]
    pub workspace_id: String,
    pub message_id: String,
    /// Re-emitted after reconnect; must not feed live timing
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub replay: bool,
    pub delta: String,
    #[serde(default)]
    pub tokens: u64,
    pub timestamp: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReasoningDeltaEvent {
    #[serde(default)]
    pub workspace_id: String,
    pub message_id: String,
    /// Re-emitted after reconnect; must not feed live timing
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub replay: bool,
    pub delta: String,
    #[serde(default)]
    pub tokens: u64,
    pub timestamp: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReasoningEndEvent {
    #[serde(default)]
    pub workspace_id: String,
    pub message_id: String,
    /// Re-emitted after reconnect; must not feed live timing
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub replay: bool,
}

/// Terminal metadata reported when a stream completes
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamEndMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<LanguageModelUsage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_metadata: Option<ProviderMetadata>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub history_sequence: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamEndEvent {
    #[serde(default)]
    pub workspace_id: String,
    pub message_id: String,
    #[serde(default)]
    pub metadata: StreamEndMetadata,
    /// Final parts as persisted by the backend; may be empty
    #[serde(default)]
    pub parts: Vec<MessagePart>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AbortReason {
    User,
    Startup,
    System,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamAbortEvent {
    #[serde(default)]
    pub workspace_id: String,
    pub message_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub abort_reason: Option<AbortReason>,
    #[serde(default)]
    pub metadata: StreamEndMetadata,
    /// Drop whatever was streamed instead of keeping it as an interrupted message
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub abandon_partial: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamErrorEvent {
    #[serde(default)]
    pub workspace_id: String,
    pub message_id: String,
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolCallStartEvent {
    #[serde(default)]
    pub workspace_id: String,
    pub message_id: String,
    /// Re-emitted after reconnect; must not feed live timing
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub replay: bool,
    pub tool_call_id: String,
    pub tool_name: String,
    /// Complete input when the producer already knows it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub args: Option<Value>,
    #[serde(default)]
    pub tokens: u64,
    pub timestamp: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolCallDeltaEvent {
    #[serde(default)]
    pub workspace_id: String,
    pub message_id: String,
    /// Re-emitted after reconnect; must not feed live timing
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub replay: bool,
    pub tool_call_id: String,
    #[serde(default)]
    pub tool_name: String,
    /// Input fragment; strings are appended verbatim, anything else as compact JSON
    pub delta: Value,
    #[serde(default)]
    pub tokens: u64,
    pub timestamp: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolCallEndEvent {
    #[serde(default)]
    pub workspace_id: String,
    pub message_id: String,
    /// Re-emitted after reconnect; must not feed live timing
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub replay: bool,
    pub tool_call_id: String,
    #[serde(default)]
    pub tool_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    /// Set when the tool failed; takes priority over `result`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
}

/// Usage of one finished step of an in-flight turn.
///
/// Producers may also send the running totals; consumers that get only the
/// step figures accumulate them themselves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageDeltaEvent {
    #[serde(default)]
    pub workspace_id: String,
    pub message_id: String,
    pub usage: LanguageModelUsage,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_metadata: Option<ProviderMetadata>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cumulative_usage: Option<LanguageModelUsage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cumulative_provider_metadata: Option<ProviderMetadata>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteMessageEvent {
    #[serde(default)]
    pub workspace_id: String,
    pub history_sequences: Vec<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RuntimePhase {
    Checking,
    Starting,
    Waiting,
    Ready,
    Error,
    #[serde(other)]
    Other,
}

impl RuntimePhase {
    /// `ready` and `error` end the startup barrier
    pub fn is_terminal(self) -> bool {
        matches!(self, RuntimePhase::Ready | RuntimePhase::Error)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuntimeStatusEvent {
    #[serde(default)]
    pub workspace_id: String,
    pub phase: RuntimePhase,
    pub runtime_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// Startup status exposed to the UI while a workspace runtime is not yet usable
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuntimeStatus {
    pub phase: RuntimePhase,
    pub runtime_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl From<&RuntimeStatusEvent> for RuntimeStatus {
    fn from(event: &RuntimeStatusEvent) -> Self {
        Self {
            phase: event.phase,
            runtime_type: event.runtime_type.clone(),
            detail: event.detail.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueuedMessageChangedEvent {
    #[serde(default)]
    pub workspace_id: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub queued_messages: Vec<String>,
}
