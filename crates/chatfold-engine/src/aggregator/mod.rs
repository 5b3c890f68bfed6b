mod display;
mod parts;
mod timing;

pub use display::{DisplayedMessage, MessageStatus};
pub use timing::ActiveStreamStats;

use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};

use chatfold_providers::{ModelPricing, create_display_usage};
use chatfold_types::*;
use serde_json::Value;
use tracing::debug;

use crate::rate::{DEFAULT_WINDOW_MS, DeltaKind};
use crate::router::ChatEventSink;
use crate::usage::{accumulate_provider_metadata, add_usage};
use timing::StreamTiming;

/// Per-message bookkeeping next to the message itself
#[derive(Debug, Clone)]
struct TrackedMessage {
    message: ChatMessage,
    status: MessageStatus,
    /// Tie-breaker for messages sharing a history sequence
    arrival: u64,
    /// Raw input fragments of pending tool calls, by tool call id
    tool_buffers: HashMap<String, String>,
    live_usage: Option<LanguageModelUsage>,
    live_provider_metadata: Option<ProviderMetadata>,
}

impl TrackedMessage {
    fn new(message: ChatMessage, status: MessageStatus, arrival: u64) -> Self {
        Self {
            message,
            status,
            arrival,
            tool_buffers: HashMap::new(),
            live_usage: None,
            live_provider_metadata: None,
        }
    }

    fn is_streaming(&self) -> bool {
        self.status == MessageStatus::Streaming
    }

    fn sort_key(&self) -> (u64, u64) {
        (
            self.message.metadata.history_sequence.unwrap_or(u64::MAX),
            self.arrival,
        )
    }
}

/// Folds one workspace's event feed into displayable messages.
///
/// State per message id: `absent -> streaming -> {complete, aborted, errored}`.
/// Every transition goes through a [`ChatEventSink`] method; feed events with
/// [`crate::apply_chat_event`].
#[derive(Debug, Clone)]
pub struct StreamingMessageAggregator {
    workspace_id: String,
    messages: HashMap<String, TrackedMessage>,
    next_arrival: u64,
    timings: HashMap<String, StreamTiming>,
    window_ms: i64,
    runtime_status: Option<RuntimeStatus>,
    active_message: Option<String>,
}

impl StreamingMessageAggregator {
    /// An empty `workspace_id` accepts events for any workspace.
    pub fn new(workspace_id: impl Into<String>) -> Self {
        Self::with_window(workspace_id, DEFAULT_WINDOW_MS)
    }

    /// Same as [`Self::new`] with a custom trailing window for live TPS
    pub fn with_window(workspace_id: impl Into<String>, window_ms: i64) -> Self {
        Self {
            workspace_id: workspace_id.into(),
            messages: HashMap::new(),
            next_arrival: 0,
            timings: HashMap::new(),
            window_ms,
            runtime_status: None,
            active_message: None,
        }
    }

    pub fn workspace_id(&self) -> &str {
        &self.workspace_id
    }

    /// Message currently streaming, if any
    pub fn active_message_id(&self) -> Option<&str> {
        self.active_message.as_deref()
    }

    pub fn get_runtime_status(&self) -> Option<&RuntimeStatus> {
        self.runtime_status.as_ref()
    }

    /// Ordered view for rendering: by history sequence, then arrival.
    ///
    /// Pure; safe to call on every render tick.
    pub fn get_displayed_messages(&self) -> Vec<DisplayedMessage> {
        self.ordered()
            .into_iter()
            .map(|tracked| {
                let message = &tracked.message;
                let metadata = &message.metadata;
                DisplayedMessage {
                    id: message.id.clone(),
                    role: message.role,
                    history_sequence: metadata.history_sequence,
                    status: tracked.status,
                    parts: message.parts.clone(),
                    model: metadata.model.clone(),
                    timestamp: metadata.timestamp,
                    duration: metadata.duration,
                    usage: metadata.usage.clone().or_else(|| tracked.live_usage.clone()),
                    provider_metadata: metadata
                        .provider_metadata
                        .clone()
                        .or_else(|| tracked.live_provider_metadata.clone()),
                    error: metadata.error.clone(),
                    error_type: metadata.error_type.clone(),
                    compacted: metadata.compacted,
                }
            })
            .collect()
    }

    /// Every message in display order, in the persisted shape
    pub fn get_all_messages(&self) -> Vec<ChatMessage> {
        self.ordered()
            .into_iter()
            .map(|tracked| tracked.message.clone())
            .collect()
    }

    /// Live figures of a streaming message at `now` (epoch ms).
    ///
    /// `None` once the stream has ended, or for replayed streams.
    pub fn active_stream_stats(&mut self, message_id: &str, now: i64) -> Option<ActiveStreamStats> {
        self.timings.get_mut(message_id).map(|timing| timing.stats(now))
    }

    /// One normalized snapshot per finished assistant message that reported usage, in display order
    pub fn usage_history(&self, pricing: &ModelPricing) -> Vec<UsageSnapshot> {
        self.message_usage(pricing)
            .into_iter()
            .map(|(_, snapshot)| snapshot)
            .collect()
    }

    /// [`Self::usage_history`] paired with the message id of each snapshot
    pub fn message_usage(&self, pricing: &ModelPricing) -> Vec<(String, UsageSnapshot)> {
        self.ordered()
            .into_iter()
            .filter(|tracked| tracked.message.role == Role::Assistant && tracked.status.is_final())
            .filter_map(|tracked| {
                let metadata = &tracked.message.metadata;
                let snapshot = create_display_usage(
                    metadata.usage.as_ref(),
                    metadata.model.as_deref().unwrap_or_default(),
                    metadata.provider_metadata.as_ref(),
                    pricing,
                )?;
                Some((tracked.message.id.clone(), snapshot))
            })
            .collect()
    }

    /// Normalized running usage of a streaming message
    pub fn live_usage(&self, message_id: &str, pricing: &ModelPricing) -> Option<UsageSnapshot> {
        let tracked = self.messages.get(message_id)?;
        if !tracked.is_streaming() {
            return None;
        }
        create_display_usage(
            tracked.live_usage.as_ref(),
            tracked.message.metadata.model.as_deref().unwrap_or_default(),
            tracked.live_provider_metadata.as_ref(),
            pricing,
        )
    }

    /// Forget everything (history cleared or workspace closed)
    pub fn clear(&mut self) {
        self.messages.clear();
        self.timings.clear();
        self.runtime_status = None;
        self.active_message = None;
        self.next_arrival = 0;
    }

    fn ordered(&self) -> Vec<&TrackedMessage> {
        let mut ordered: Vec<&TrackedMessage> = self.messages.values().collect();
        ordered.sort_by_key(|tracked| tracked.sort_key());
        ordered
    }

    fn accepts(&self, workspace_id: &str, kind: &'static str) -> bool {
        let accepted = self.workspace_id.is_empty()
            || workspace_id.is_empty()
            || workspace_id == self.workspace_id;
        if !accepted {
            debug!(
                workspace = %self.workspace_id,
                event_workspace = workspace_id,
                kind,
                "ignoring event for another workspace"
            );
        }
        accepted
    }

    /// Insert or replace a message, keeping its original arrival slot on replace
    fn install(&mut self, message: ChatMessage, status: MessageStatus) -> &mut TrackedMessage {
        match self.messages.entry(message.id.clone()) {
            Entry::Occupied(mut slot) => {
                let arrival = slot.get().arrival;
                slot.insert(TrackedMessage::new(message, status, arrival));
                slot.into_mut()
            }
            Entry::Vacant(slot) => {
                self.next_arrival += 1;
                slot.insert(TrackedMessage::new(message, status, self.next_arrival))
            }
        }
    }

    /// Streaming message targeted by a content event, or `None` (logged) when the
    /// event arrives late or for an unknown id.
    fn streaming_mut(
        &mut self,
        workspace_id: &str,
        message_id: &str,
        kind: &'static str,
    ) -> Option<&mut TrackedMessage> {
        if !self.accepts(workspace_id, kind) {
            return None;
        }
        match self.messages.get_mut(message_id) {
            Some(tracked) if tracked.is_streaming() => Some(tracked),
            Some(tracked) => {
                debug!(message_id, kind, status = ?tracked.status, "ignoring late event for finished message");
                None
            }
            None => {
                debug!(message_id, kind, "ignoring event for unknown message");
                None
            }
        }
    }

    fn timing_mut(&mut self, message_id: &str, replay: bool) -> Option<&mut StreamTiming> {
        if replay {
            return None;
        }
        self.timings.get_mut(message_id)
    }

    fn finish_active(&mut self, message_id: &str) {
        if self.active_message.as_deref() == Some(message_id) {
            self.active_message = None;
            self.runtime_status = None;
        }
    }
}

impl ChatEventSink for StreamingMessageAggregator {
    fn handle_stream_start(&mut self, event: &StreamStartEvent) {
        if !self.accepts(&event.workspace_id, "stream-start") {
            return;
        }

        let message = ChatMessage {
            id: event.message_id.clone(),
            role: Role::Assistant,
            parts: Vec::new(),
            metadata: MessageMetadata {
                history_sequence: Some(event.history_sequence),
                timestamp: event.start_time,
                model: Some(event.model.clone()),
                ..Default::default()
            },
        };
        if self.messages.contains_key(&event.message_id) {
            debug!(message_id = %event.message_id, "duplicate stream-start, replacing message");
        }
        self.install(message, MessageStatus::Streaming);

        if !event.replay {
            self.timings.insert(
                event.message_id.clone(),
                StreamTiming::new(event.start_time, self.window_ms),
            );
        }
        self.active_message = Some(event.message_id.clone());
        self.runtime_status = None;
    }

    fn handle_stream_delta(&mut self, event: &StreamDeltaEvent) {
        let Some(tracked) = self.streaming_mut(&event.workspace_id, &event.message_id, "stream-delta")
        else {
            return;
        };
        parts::append_delta(
            &mut tracked.message.parts,
            PartKind::Text,
            &event.delta,
            event.timestamp,
        );

        if let Some(timing) = self.timing_mut(&event.message_id, event.replay) {
            timing.record_delta(
                DeltaKind::Text,
                event.tokens,
                event.timestamp,
                !event.delta.is_empty(),
            );
        }
    }

    fn handle_stream_end(&mut self, event: &StreamEndEvent) {
        if !self.accepts(&event.workspace_id, "stream-end") {
            return;
        }

        let meta = &event.metadata;
        let tracked = match self.messages.get_mut(&event.message_id) {
            Some(tracked) if tracked.is_streaming() => tracked,
            Some(tracked) => {
                debug!(message_id = %event.message_id, status = ?tracked.status, "ignoring stream-end for finished message");
                return;
            }
            None if event.parts.is_empty() => {
                debug!(message_id = %event.message_id, "ignoring stream-end for unknown message");
                return;
            }
            None => {
                let message = ChatMessage {
                    id: event.message_id.clone(),
                    role: Role::Assistant,
                    parts: Vec::new(),
                    metadata: MessageMetadata::default(),
                };
                self.install(message, MessageStatus::Streaming)
            }
        };

        let message = &mut tracked.message;
        if message.parts.is_empty() {
            message.parts = event.parts.clone();
        }
        parts::finalize(&mut message.parts);

        let metadata = &mut message.metadata;
        if let Some(model) = &meta.model {
            metadata.model = Some(model.clone());
        }
        metadata.usage = meta.usage.clone().or_else(|| tracked.live_usage.take());
        metadata.provider_metadata = meta
            .provider_metadata
            .clone()
            .or_else(|| tracked.live_provider_metadata.take());
        metadata.duration = meta.duration.or(metadata.duration);
        metadata.history_sequence = meta.history_sequence.or(metadata.history_sequence);
        metadata.timestamp = meta.timestamp.or(metadata.timestamp);

        tracked.status = MessageStatus::Complete;
        tracked.tool_buffers.clear();
        self.finish_active(&event.message_id);
    }

    fn handle_stream_abort(&mut self, event: &StreamAbortEvent) {
        if !self.accepts(&event.workspace_id, "stream-abort") {
            return;
        }

        if event.abandon_partial {
            if self.messages.remove(&event.message_id).is_some() {
                debug!(message_id = %event.message_id, reason = ?event.abort_reason, "abandoned partial message");
            }
            self.timings.remove(&event.message_id);
            self.finish_active(&event.message_id);
            return;
        }

        let Some(tracked) = self.streaming_mut(&event.workspace_id, &event.message_id, "stream-abort")
        else {
            return;
        };
        parts::finalize(&mut tracked.message.parts);

        let meta = &event.metadata;
        let metadata = &mut tracked.message.metadata;
        metadata.usage = meta.usage.clone().or_else(|| tracked.live_usage.take());
        metadata.provider_metadata = meta
            .provider_metadata
            .clone()
            .or_else(|| tracked.live_provider_metadata.take());
        metadata.duration = meta.duration.or(metadata.duration);
        metadata.partial = Some(true);

        tracked.status = MessageStatus::Aborted;
        tracked.tool_buffers.clear();
        self.finish_active(&event.message_id);
    }

    fn handle_stream_error(&mut self, event: &StreamErrorEvent) {
        if !self.accepts(&event.workspace_id, "stream-error") {
            return;
        }

        let tracked = match self.messages.get_mut(&event.message_id) {
            Some(tracked) if tracked.is_streaming() => tracked,
            Some(tracked) => {
                debug!(message_id = %event.message_id, status = ?tracked.status, "ignoring stream-error for finished message");
                return;
            }
            // Errors before any content still need a visible message
            None => {
                let message = ChatMessage {
                    id: event.message_id.clone(),
                    role: Role::Assistant,
                    parts: Vec::new(),
                    metadata: MessageMetadata::default(),
                };
                self.install(message, MessageStatus::Streaming)
            }
        };

        parts::finalize(&mut tracked.message.parts);
        let metadata = &mut tracked.message.metadata;
        metadata.error = Some(event.error.clone());
        metadata.error_type = event.error_type.clone();
        if metadata.usage.is_none() {
            metadata.usage = tracked.live_usage.take();
            metadata.provider_metadata = tracked.live_provider_metadata.take();
        }

        tracked.status = MessageStatus::Errored;
        tracked.tool_buffers.clear();
        self.timings.remove(&event.message_id);
        self.finish_active(&event.message_id);
    }

    fn handle_tool_call_start(&mut self, event: &ToolCallStartEvent) {
        let Some(tracked) =
            self.streaming_mut(&event.workspace_id, &event.message_id, "tool-call-start")
        else {
            return;
        };

        let mut tool = ToolPart::new(&event.tool_call_id, &event.tool_name);
        tool.timestamp = Some(event.timestamp);
        match &event.args {
            Some(args) => {
                tool.input = args.clone();
                tool.state = ToolState::Executing;
                tracked.tool_buffers.remove(&event.tool_call_id);
            }
            None => {
                tracked
                    .tool_buffers
                    .insert(event.tool_call_id.clone(), String::new());
            }
        }
        parts::upsert_tool(&mut tracked.message.parts, tool);

        if let Some(timing) = self.timing_mut(&event.message_id, event.replay) {
            timing.tool_started(&event.tool_call_id, event.timestamp);
            if event.tokens > 0 {
                timing.record_delta(DeltaKind::ToolArgs, event.tokens, event.timestamp, true);
            }
        }
    }

    fn handle_tool_call_delta(&mut self, event: &ToolCallDeltaEvent) {
        let Some(tracked) =
            self.streaming_mut(&event.workspace_id, &event.message_id, "tool-call-delta")
        else {
            return;
        };
        if parts::find_tool(&mut tracked.message.parts, &event.tool_call_id).is_none() {
            debug!(tool_call_id = %event.tool_call_id, "ignoring delta for unknown tool call");
            return;
        }

        let buffer = tracked
            .tool_buffers
            .entry(event.tool_call_id.clone())
            .or_default();
        parts::push_input_fragment(buffer, &event.delta);

        if let Some(timing) = self.timing_mut(&event.message_id, event.replay) {
            timing.record_delta(DeltaKind::ToolArgs, event.tokens, event.timestamp, true);
        }
    }

    fn handle_tool_call_end(&mut self, event: &ToolCallEndEvent) {
        let Some(tracked) =
            self.streaming_mut(&event.workspace_id, &event.message_id, "tool-call-end")
        else {
            return;
        };

        let buffer = tracked.tool_buffers.remove(&event.tool_call_id);
        let Some(tool) = parts::find_tool(&mut tracked.message.parts, &event.tool_call_id) else {
            debug!(tool_call_id = %event.tool_call_id, "ignoring end for unknown tool call");
            return;
        };

        if let Some(input) = &event.input {
            tool.input = input.clone();
        } else if let Some(buffer) = buffer.filter(|b| !b.trim().is_empty()) {
            tool.input = parts::parse_input_buffer(&event.tool_call_id, &buffer);
        }

        match &event.error {
            Some(error) => {
                tool.state = ToolState::Failed;
                tool.error_text = Some(error.clone());
                tool.output = event.result.clone();
            }
            None => {
                tool.state = ToolState::OutputAvailable;
                tool.output = Some(event.result.clone().unwrap_or(Value::Null));
            }
        }

        if let Some(timestamp) = event.timestamp
            && let Some(timing) = self.timing_mut(&event.message_id, event.replay)
        {
            timing.tool_finished(&event.tool_call_id, timestamp);
        }
    }

    fn handle_reasoning_delta(&mut self, event: &ReasoningDeltaEvent) {
        let Some(tracked) =
            self.streaming_mut(&event.workspace_id, &event.message_id, "reasoning-delta")
        else {
            return;
        };
        parts::append_delta(
            &mut tracked.message.parts,
            PartKind::Reasoning,
            &event.delta,
            event.timestamp,
        );

        if let Some(timing) = self.timing_mut(&event.message_id, event.replay) {
            timing.record_delta(
                DeltaKind::Reasoning,
                event.tokens,
                event.timestamp,
                !event.delta.is_empty(),
            );
        }
    }

    fn handle_reasoning_end(&mut self, event: &ReasoningEndEvent) {
        if let Some(tracked) =
            self.streaming_mut(&event.workspace_id, &event.message_id, "reasoning-end")
        {
            parts::close_reasoning(&mut tracked.message.parts);
        }
    }

    fn handle_usage_delta(&mut self, event: &UsageDeltaEvent) {
        let Some(tracked) = self.streaming_mut(&event.workspace_id, &event.message_id, "usage-delta")
        else {
            return;
        };

        match &event.cumulative_usage {
            Some(cumulative) => {
                tracked.live_usage = Some(cumulative.clone());
                tracked.live_provider_metadata = event.cumulative_provider_metadata.clone();
            }
            None => {
                tracked.live_usage = Some(add_usage(tracked.live_usage.as_ref(), &event.usage));
                tracked.live_provider_metadata = accumulate_provider_metadata(
                    tracked.live_provider_metadata.as_ref(),
                    event.provider_metadata.as_ref(),
                );
            }
        }
    }

    fn handle_delete_message(&mut self, event: &DeleteMessageEvent) {
        if !self.accepts(&event.workspace_id, "delete-message") {
            return;
        }

        let targets: HashSet<u64> = event.history_sequences.iter().copied().collect();
        let doomed: Vec<String> = self
            .messages
            .values()
            .filter(|tracked| {
                tracked
                    .message
                    .metadata
                    .history_sequence
                    .is_some_and(|seq| targets.contains(&seq))
            })
            .map(|tracked| tracked.message.id.clone())
            .collect();

        for id in doomed {
            self.messages.remove(&id);
            self.timings.remove(&id);
            if self.active_message.as_deref() == Some(id.as_str()) {
                self.active_message = None;
            }
        }
    }

    fn handle_message(&mut self, message: &ChatMessage) {
        let status = MessageStatus::of_persisted(message);
        self.install(message.clone(), status);
        self.timings.remove(&message.id);
        if self.active_message.as_deref() == Some(message.id.as_str()) {
            self.active_message = None;
        }
    }

    fn handle_runtime_status(&mut self, event: &RuntimeStatusEvent) {
        if !self.accepts(&event.workspace_id, "runtime-status") {
            return;
        }
        self.runtime_status = if event.phase.is_terminal() {
            None
        } else {
            Some(RuntimeStatus::from(event))
        };
    }

    fn clear_token_state(&mut self, message_id: &str) {
        self.timings.remove(message_id);
    }
}

