//! Fluent builder for scripted event feeds.
//!
//! Every content event is stamped with the script clock, which then advances
//! by `step_ms`. Use `at` / `advance` to control timing explicitly.

use chatfold_types::*;
use serde_json::Value;

/// Scripted workspace feed.
///
/// # Example
/// ```
/// use chatfold_testing::EventScript;
///
/// let events = EventScript::new("ws-1")
///     .start("m1", 2, "anthropic:claude-sonnet-4-5")
///     .text("m1", "Hello", 2)
///     .end("m1", None)
///     .into_events();
/// assert_eq!(events.len(), 3);
/// ```
#[derive(Debug, Clone)]
pub struct EventScript {
    workspace_id: String,
    now: i64,
    step_ms: i64,
    events: Vec<ChatEvent>,
}

impl EventScript {
    pub fn new(workspace_id: impl Into<String>) -> Self {
        Self {
            workspace_id: workspace_id.into(),
            now: 1_000,
            step_ms: 100,
            events: Vec::new(),
        }
    }

    /// Set the clock
    pub fn at(mut self, timestamp: i64) -> Self {
        self.now = timestamp;
        self
    }

    pub fn advance(mut self, ms: i64) -> Self {
        self.now += ms;
        self
    }

    /// Clock increment applied after each stamped event
    pub fn step(mut self, step_ms: i64) -> Self {
        self.step_ms = step_ms;
        self
    }

    pub fn now(&self) -> i64 {
        self.now
    }

    fn tick(&mut self) -> i64 {
        let stamp = self.now;
        self.now += self.step_ms;
        stamp
    }

    fn ws(&self) -> String {
        self.workspace_id.clone()
    }

    /// Append any event as-is
    pub fn push(mut self, event: ChatEvent) -> Self {
        self.events.push(event);
        self
    }

    // ==========================================
    // Persisted history
    // ==========================================

    pub fn user(mut self, id: &str, history_sequence: u64, text: &str) -> Self {
        let timestamp = self.tick();
        let message = ChatMessage::text(id, Role::User, text).with_metadata(MessageMetadata {
            history_sequence: Some(history_sequence),
            timestamp: Some(timestamp),
            ..Default::default()
        });
        self.push(ChatEvent::Message(message))
    }

    pub fn message(self, message: ChatMessage) -> Self {
        self.push(ChatEvent::Message(message))
    }

    // ==========================================
    // Stream lifecycle
    // ==========================================

    pub fn start(mut self, message_id: &str, history_sequence: u64, model: &str) -> Self {
        let start_time = self.tick();
        let event = ChatEvent::StreamStart(StreamStartEvent {
            workspace_id: self.ws(),
            message_id: message_id.to_string(),
            replay: false,
            history_sequence,
            model: model.to_string(),
            start_time: Some(start_time),
            mode: None,
        });
        self.push(event)
    }

    pub fn text(mut self, message_id: &str, delta: &str, tokens: u64) -> Self {
        let timestamp = self.tick();
        let event = ChatEvent::StreamDelta(StreamDeltaEvent {
            workspace_id: self.ws(),
            message_id: message_id.to_string(),
            replay: false,
            delta: delta.to_string(),
            tokens,
            timestamp,
        });
        self.push(event)
    }

    pub fn reasoning(mut self, message_id: &str, delta: &str, tokens: u64) -> Self {
        let timestamp = self.tick();
        let event = ChatEvent::ReasoningDelta(ReasoningDeltaEvent {
            workspace_id: self.ws(),
            message_id: message_id.to_string(),
            replay: false,
            delta: delta.to_string(),
            tokens,
            timestamp,
        });
        self.push(event)
    }

    pub fn reasoning_end(self, message_id: &str) -> Self {
        let event = ChatEvent::ReasoningEnd(ReasoningEndEvent {
            workspace_id: self.ws(),
            message_id: message_id.to_string(),
            replay: false,
        });
        self.push(event)
    }

    /// End with optional final usage; duration is the time since the stream started
    pub fn end(self, message_id: &str, usage: Option<LanguageModelUsage>) -> Self {
        let metadata = StreamEndMetadata {
            usage,
            ..Default::default()
        };
        self.end_with(message_id, metadata)
    }

    pub fn end_with(mut self, message_id: &str, metadata: StreamEndMetadata) -> Self {
        let timestamp = self.tick();
        let metadata = StreamEndMetadata {
            timestamp: metadata.timestamp.or(Some(timestamp)),
            ..metadata
        };
        let event = ChatEvent::StreamEnd(StreamEndEvent {
            workspace_id: self.ws(),
            message_id: message_id.to_string(),
            metadata,
            parts: Vec::new(),
        });
        self.push(event)
    }

    pub fn abort(self, message_id: &str) -> Self {
        let event = ChatEvent::StreamAbort(StreamAbortEvent {
            workspace_id: self.ws(),
            message_id: message_id.to_string(),
            abort_reason: Some(AbortReason::User),
            metadata: StreamEndMetadata::default(),
            abandon_partial: false,
        });
        self.push(event)
    }

    pub fn error(self, message_id: &str, error: &str, error_type: &str) -> Self {
        let event = ChatEvent::StreamError(StreamErrorEvent {
            workspace_id: self.ws(),
            message_id: message_id.to_string(),
            error: error.to_string(),
            error_type: Some(error_type.to_string()),
        });
        self.push(event)
    }

    // ==========================================
    // Tools
    // ==========================================

    pub fn tool_start(mut self, message_id: &str, tool_call_id: &str, tool_name: &str, args: Option<Value>) -> Self {
        let timestamp = self.tick();
        let event = ChatEvent::ToolCallStart(ToolCallStartEvent {
            workspace_id: self.ws(),
            message_id: message_id.to_string(),
            replay: false,
            tool_call_id: tool_call_id.to_string(),
            tool_name: tool_name.to_string(),
            args,
            tokens: 0,
            timestamp,
        });
        self.push(event)
    }

    pub fn tool_delta(mut self, message_id: &str, tool_call_id: &str, fragment: &str, tokens: u64) -> Self {
        let timestamp = self.tick();
        let event = ChatEvent::ToolCallDelta(ToolCallDeltaEvent {
            workspace_id: self.ws(),
            message_id: message_id.to_string(),
            replay: false,
            tool_call_id: tool_call_id.to_string(),
            tool_name: String::new(),
            delta: Value::String(fragment.to_string()),
            tokens,
            timestamp,
        });
        self.push(event)
    }

    pub fn tool_end(mut self, message_id: &str, tool_call_id: &str, result: Value) -> Self {
        let timestamp = self.tick();
        let event = ChatEvent::ToolCallEnd(ToolCallEndEvent {
            workspace_id: self.ws(),
            message_id: message_id.to_string(),
            replay: false,
            tool_call_id: tool_call_id.to_string(),
            tool_name: String::new(),
            input: None,
            result: Some(result),
            error: None,
            timestamp: Some(timestamp),
        });
        self.push(event)
    }

    pub fn tool_failed(mut self, message_id: &str, tool_call_id: &str, error: &str) -> Self {
        let timestamp = self.tick();
        let event = ChatEvent::ToolCallEnd(ToolCallEndEvent {
            workspace_id: self.ws(),
            message_id: message_id.to_string(),
            replay: false,
            tool_call_id: tool_call_id.to_string(),
            tool_name: String::new(),
            input: None,
            result: None,
            error: Some(error.to_string()),
            timestamp: Some(timestamp),
        });
        self.push(event)
    }

    // ==========================================
    // Usage, deletion, runtime
    // ==========================================

    /// Step usage only; the consumer accumulates
    pub fn usage_step(self, message_id: &str, usage: LanguageModelUsage, provider_metadata: Option<ProviderMetadata>) -> Self {
        let event = ChatEvent::UsageDelta(UsageDeltaEvent {
            workspace_id: self.ws(),
            message_id: message_id.to_string(),
            usage,
            provider_metadata,
            cumulative_usage: None,
            cumulative_provider_metadata: None,
        });
        self.push(event)
    }

    pub fn delete(self, history_sequences: &[u64]) -> Self {
        let event = ChatEvent::DeleteMessage(DeleteMessageEvent {
            workspace_id: self.ws(),
            history_sequences: history_sequences.to_vec(),
        });
        self.push(event)
    }

    pub fn runtime(self, phase: RuntimePhase, runtime_type: &str) -> Self {
        let event = ChatEvent::RuntimeStatus(RuntimeStatusEvent {
            workspace_id: self.ws(),
            phase,
            runtime_type: runtime_type.to_string(),
            detail: None,
        });
        self.push(event)
    }

    pub fn caught_up(self) -> Self {
        self.push(ChatEvent::CaughtUp)
    }

    // ==========================================
    // Output
    // ==========================================

    pub fn events(&self) -> &[ChatEvent] {
        &self.events
    }

    pub fn into_events(self) -> Vec<ChatEvent> {
        self.events
    }

    /// One JSON object per line, as the CLI reads it
    pub fn to_jsonl(&self) -> String {
        self.events
            .iter()
            .filter_map(|event| serde_json::to_string(event).ok())
            .map(|line| line + "\n")
            .collect()
    }
}

/// Usage record with input/output counts only
pub fn usage(input: u64, output: u64) -> LanguageModelUsage {
    LanguageModelUsage {
        input_tokens: Some(input),
        output_tokens: Some(output),
        total_tokens: Some(input + output),
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_advances_per_stamped_event() {
        let script = EventScript::new("ws")
            .at(0)
            .step(50)
            .start("m1", 1, "x")
            .text("m1", "a", 1)
            .reasoning_end("m1")
            .text("m1", "b", 1);

        let stamps: Vec<i64> = script
            .events()
            .iter()
            .filter_map(|event| match event {
                ChatEvent::StreamDelta(delta) => Some(delta.timestamp),
                _ => None,
            })
            .collect();
        assert_eq!(stamps, vec![50, 100]);
        assert_eq!(script.now(), 150);
    }

    #[test]
    fn test_jsonl_parses_back() {
        let script = EventScript::new("ws")
            .user("u1", 1, "hi")
            .start("m1", 2, "openai:gpt-5")
            .end("m1", Some(usage(10, 5)))
            .caught_up();

        let parsed = parse_event_stream(&script.to_jsonl()).unwrap();
        assert_eq!(parsed, script.into_events());
    }
}
