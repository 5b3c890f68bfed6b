// Engine layer - folds a workspace's chat event feed into displayable messages
// and does the usage bookkeeping around it. Synchronous and I/O free; callers
// own transport, persistence and redraw scheduling.

pub mod aggregator;
pub mod rate;
pub mod router;
pub mod sanitize;
pub mod stats;
pub mod usage;

pub use aggregator::{ActiveStreamStats, DisplayedMessage, MessageStatus, StreamingMessageAggregator};
pub use rate::{DEFAULT_WINDOW_MS, DeltaKind, DeltaRecord, RateWindowTracker};
pub use router::{ChatEventSink, UpdateHint, apply_chat_event};
pub use sanitize::{RedactionOptions, apply_tool_output_redaction, sanitize_tool_inputs};
pub use stats::{ModelRollup, compute_recency_timestamp, model_rollups};
pub use usage::{accumulate_provider_metadata, add_usage, get_total_cost, sum_usage_history};

use chatfold_types::{ChatEvent, ChatMessage};

// Façade API - what the CLI and embedding UIs call

/// Replay a recorded feed into a fresh aggregator, returning it with the hints produced
pub fn replay_events<'a>(
    workspace_id: &str,
    events: impl IntoIterator<Item = &'a ChatEvent>,
) -> (StreamingMessageAggregator, Vec<UpdateHint>) {
    let mut aggregator = StreamingMessageAggregator::new(workspace_id);
    let hints = events
        .into_iter()
        .map(|event| apply_chat_event(&mut aggregator, event))
        .collect();
    (aggregator, hints)
}

/// Input repair followed by output redaction, ready for prompt construction
pub fn prepare_for_prompt(messages: &[ChatMessage], options: &RedactionOptions) -> Vec<ChatMessage> {
    apply_tool_output_redaction(&sanitize_tool_inputs(messages), options)
}
