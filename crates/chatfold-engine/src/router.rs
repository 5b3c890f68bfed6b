use chatfold_types::*;
use serde::{Deserialize, Serialize};

/// How urgently the presentation layer should reflect an applied event.
///
/// The router never schedules redraws; coalescing throttled hints is up to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UpdateHint {
    Immediate,
    Throttled,
    Ignored,
}

/// Consumer of routed chat events.
///
/// Each method is the single legal transition for one event kind. The
/// aggregator implements it; tests use recording stubs.
pub trait ChatEventSink {
    fn handle_stream_start(&mut self, event: &StreamStartEvent);
    fn handle_stream_delta(&mut self, event: &StreamDeltaEvent);
    fn handle_stream_end(&mut self, event: &StreamEndEvent);
    fn handle_stream_abort(&mut self, event: &StreamAbortEvent);
    fn handle_stream_error(&mut self, event: &StreamErrorEvent);

    fn handle_tool_call_start(&mut self, event: &ToolCallStartEvent);
    fn handle_tool_call_delta(&mut self, event: &ToolCallDeltaEvent);
    fn handle_tool_call_end(&mut self, event: &ToolCallEndEvent);

    fn handle_reasoning_delta(&mut self, event: &ReasoningDeltaEvent);
    fn handle_reasoning_end(&mut self, event: &ReasoningEndEvent);

    fn handle_usage_delta(&mut self, event: &UsageDeltaEvent);
    fn handle_delete_message(&mut self, event: &DeleteMessageEvent);
    fn handle_message(&mut self, message: &ChatMessage);
    fn handle_runtime_status(&mut self, event: &RuntimeStatusEvent);

    /// Drop live rate/timing state for a message
    fn clear_token_state(&mut self, message_id: &str);
}

/// Dispatch one event to `sink` and classify it.
///
/// NOTE: Ordering around token state
/// - stream-end: content first, then token state is cleared, so the final
///   delta still lands in the last rate sample.
/// - stream-abort: token state is cleared first, so rate accounting stops
///   before the message is finalized.
pub fn apply_chat_event<S: ChatEventSink + ?Sized>(sink: &mut S, event: &ChatEvent) -> UpdateHint {
    match event {
        ChatEvent::StreamStart(e) => {
            sink.handle_stream_start(e);
            UpdateHint::Immediate
        }
        ChatEvent::StreamDelta(e) => {
            sink.handle_stream_delta(e);
            UpdateHint::Throttled
        }
        ChatEvent::StreamEnd(e) => {
            sink.handle_stream_end(e);
            sink.clear_token_state(&e.message_id);
            UpdateHint::Immediate
        }
        ChatEvent::StreamAbort(e) => {
            sink.clear_token_state(&e.message_id);
            sink.handle_stream_abort(e);
            UpdateHint::Immediate
        }
        ChatEvent::StreamError(e) => {
            sink.handle_stream_error(e);
            UpdateHint::Immediate
        }

        ChatEvent::ToolCallStart(e) => {
            sink.handle_tool_call_start(e);
            UpdateHint::Immediate
        }
        ChatEvent::ToolCallDelta(e) => {
            sink.handle_tool_call_delta(e);
            UpdateHint::Throttled
        }
        ChatEvent::ToolCallEnd(e) => {
            sink.handle_tool_call_end(e);
            UpdateHint::Immediate
        }

        ChatEvent::ReasoningDelta(e) => {
            sink.handle_reasoning_delta(e);
            UpdateHint::Throttled
        }
        ChatEvent::ReasoningEnd(e) => {
            sink.handle_reasoning_end(e);
            UpdateHint::Throttled
        }

        ChatEvent::UsageDelta(e) => {
            sink.handle_usage_delta(e);
            UpdateHint::Throttled
        }
        ChatEvent::DeleteMessage(e) => {
            sink.handle_delete_message(e);
            UpdateHint::Immediate
        }
        ChatEvent::Message(message) => {
            sink.handle_message(message);
            UpdateHint::Immediate
        }
        ChatEvent::RuntimeStatus(e) => {
            sink.handle_runtime_status(e);
            UpdateHint::Immediate
        }

        ChatEvent::CaughtUp | ChatEvent::QueuedMessageChanged(_) | ChatEvent::Unknown => {
            UpdateHint::Ignored
        }
    }
}
