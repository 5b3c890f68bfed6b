use serde::{Deserialize, Serialize};

use super::payload::*;
use crate::domain::ChatMessage;

/// One event of a workspace-scoped chat feed.
///
/// Closed set: adding a variant forces every `match` in the router to be revisited.
/// Tags the consumer does not know decode to [`ChatEvent::Unknown`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ChatEvent {
    StreamStart(StreamStartEvent),
    StreamDelta(StreamDeltaEvent),
    StreamEnd(StreamEndEvent),
    StreamAbort(StreamAbortEvent),
    StreamError(StreamErrorEvent),

    ToolCallStart(ToolCallStartEvent),
    ToolCallDelta(ToolCallDeltaEvent),
    ToolCallEnd(ToolCallEndEvent),

    ReasoningDelta(ReasoningDeltaEvent),
    ReasoningEnd(ReasoningEndEvent),

    UsageDelta(UsageDeltaEvent),
    #[serde(alias = "delete")]
    DeleteMessage(DeleteMessageEvent),

    /// Fully-formed persisted message (history replay)
    Message(ChatMessage),

    RuntimeStatus(RuntimeStatusEvent),

    /// Replay finished; live events follow
    CaughtUp,
    QueuedMessageChanged(QueuedMessageChangedEvent),

    #[serde(other)]
    Unknown,
}

impl ChatEvent {
    /// Wire tag of the event, for logging
    pub fn kind(&self) -> &'static str {
        match self {
            ChatEvent::StreamStart(_) => "stream-start",
            ChatEvent::StreamDelta(_) => "stream-delta",
            ChatEvent::StreamEnd(_) => "stream-end",
            ChatEvent::StreamAbort(_) => "stream-abort",
            ChatEvent::StreamError(_) => "stream-error",
            ChatEvent::ToolCallStart(_) => "tool-call-start",
            ChatEvent::ToolCallDelta(_) => "tool-call-delta",
            ChatEvent::ToolCallEnd(_) => "tool-call-end",
            ChatEvent::ReasoningDelta(_) => "reasoning-delta",
            ChatEvent::ReasoningEnd(_) => "reasoning-end",
            ChatEvent::UsageDelta(_) => "usage-delta",
            ChatEvent::DeleteMessage(_) => "delete-message",
            ChatEvent::Message(_) => "message",
            ChatEvent::RuntimeStatus(_) => "runtime-status",
            ChatEvent::CaughtUp => "caught-up",
            ChatEvent::QueuedMessageChanged(_) => "queued-message-changed",
            ChatEvent::Unknown => "unknown",
        }
    }

    /// Workspace the event is addressed to.
    ///
    /// `None` for replayed messages and lifecycle markers, which carry no workspace id.
    pub fn workspace_id(&self) -> Option<&str> {
        let id = match self {
            ChatEvent::StreamStart(e) => &e.workspace_id,
            ChatEvent::StreamDelta(e) => &e.workspace_id,
            ChatEvent::StreamEnd(e) => &e.workspace_id,
            ChatEvent::StreamAbort(e) => &e.workspace_id,
            ChatEvent::StreamError(e) => &e.workspace_id,
            ChatEvent::ToolCallStart(e) => &e.workspace_id,
            ChatEvent::ToolCallDelta(e) => &e.workspace_id,
            ChatEvent::ToolCallEnd(e) => &e.workspace_id,
            ChatEvent::ReasoningDelta(e) => &e.workspace_id,
            ChatEvent::ReasoningEnd(e) => &e.workspace_id,
            ChatEvent::UsageDelta(e) => &e.workspace_id,
            ChatEvent::DeleteMessage(e) => &e.workspace_id,
            ChatEvent::RuntimeStatus(e) => &e.workspace_id,
            ChatEvent::QueuedMessageChanged(e) => &e.workspace_id,
            ChatEvent::Message(_) | ChatEvent::CaughtUp | ChatEvent::Unknown => return None,
        };
        Some(id.as_str())
    }

    /// Message the event targets, if it is message-scoped
    pub fn message_id(&self) -> Option<&str> {
        match self {
            ChatEvent::StreamStart(e) => Some(&e.message_id),
            ChatEvent::StreamDelta(e) => Some(&e.message_id),
            ChatEvent::StreamEnd(e) => Some(&e.message_id),
            ChatEvent::StreamAbort(e) => Some(&e.message_id),
            ChatEvent::StreamError(e) => Some(&e.message_id),
            ChatEvent::ToolCallStart(e) => Some(&e.message_id),
            ChatEvent::ToolCallDelta(e) => Some(&e.message_id),
            ChatEvent::ToolCallEnd(e) => Some(&e.message_id),
            ChatEvent::ReasoningDelta(e) => Some(&e.message_id),
            ChatEvent::ReasoningEnd(e) => Some(&e.message_id),
            ChatEvent::UsageDelta(e) => Some(&e.message_id),
            ChatEvent::Message(m) => Some(&m.id),
            ChatEvent::DeleteMessage(_)
            | ChatEvent::RuntimeStatus(_)
            | ChatEvent::CaughtUp
            | ChatEvent::QueuedMessageChanged(_)
            | ChatEvent::Unknown => None,
        }
    }
}
