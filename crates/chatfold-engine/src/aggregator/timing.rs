use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::rate::{DeltaKind, DeltaRecord, RateWindowTracker};

/// Live timing of one in-flight stream.
///
/// Lives only while the stream runs; the router drops it on end/abort.
#[derive(Debug, Clone)]
pub(crate) struct StreamTiming {
    start_time: Option<i64>,
    first_token_time: Option<i64>,
    tracker: RateWindowTracker,
    output_tokens: u64,
    reasoning_tokens: u64,
    tool_execution_ms: i64,
    pending_tools: HashMap<String, i64>,
}

impl StreamTiming {
    pub(crate) fn new(start_time: Option<i64>, window_ms: i64) -> Self {
        Self {
            start_time,
            first_token_time: None,
            tracker: RateWindowTracker::new(window_ms),
            output_tokens: 0,
            reasoning_tokens: 0,
            tool_execution_ms: 0,
            pending_tools: HashMap::new(),
        }
    }

    /// `visible` is false for empty fragments, which do not count as a first token.
    pub(crate) fn record_delta(&mut self, kind: DeltaKind, tokens: u64, timestamp: i64, visible: bool) {
        self.start_time.get_or_insert(timestamp);
        if visible && kind != DeltaKind::ToolArgs {
            self.first_token_time.get_or_insert(timestamp);
        }

        match kind {
            DeltaKind::Text => self.output_tokens += tokens,
            DeltaKind::Reasoning => self.reasoning_tokens += tokens,
            DeltaKind::ToolArgs => {}
        }
        self.tracker.add_delta(DeltaRecord::new(tokens, timestamp, kind));
    }

    pub(crate) fn tool_started(&mut self, tool_call_id: &str, timestamp: i64) {
        self.start_time.get_or_insert(timestamp);
        self.pending_tools.insert(tool_call_id.to_string(), timestamp);
    }

    pub(crate) fn tool_finished(&mut self, tool_call_id: &str, timestamp: i64) {
        if let Some(started) = self.pending_tools.remove(tool_call_id) {
            self.tool_execution_ms += (timestamp - started).max(0);
        }
    }

    pub(crate) fn stats(&mut self, now: i64) -> ActiveStreamStats {
        ActiveStreamStats {
            elapsed_ms: self.start_time.map(|start| (now - start).max(0)),
            time_to_first_token_ms: self
                .start_time
                .zip(self.first_token_time)
                .map(|(start, first)| (first - start).max(0)),
            output_tokens: self.output_tokens,
            reasoning_tokens: self.reasoning_tokens,
            live_token_count: self.tracker.token_count(),
            live_tps: self.tracker.calculate_tps(now),
            tool_execution_ms: self.tool_execution_ms,
            pending_tool_calls: self.pending_tools.len(),
        }
    }
}

/// Live figures of a streaming message, as shown next to its spinner
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveStreamStats {
    pub elapsed_ms: Option<i64>,
    pub time_to_first_token_ms: Option<i64>,
    pub output_tokens: u64,
    pub reasoning_tokens: u64,
    /// Every estimated token so far, tool arguments included
    pub live_token_count: u64,
    pub live_tps: f64,
    /// Wall time of tool calls that already finished
    pub tool_execution_ms: i64,
    pub pending_tool_calls: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_token_ignores_empty_and_tool_deltas() {
        let mut timing = StreamTiming::new(Some(1_000), 60_000);
        timing.record_delta(DeltaKind::Text, 0, 1_100, false);
        timing.record_delta(DeltaKind::ToolArgs, 3, 1_200, true);
        timing.record_delta(DeltaKind::Reasoning, 5, 1_500, true);

        let stats = timing.stats(2_000);
        assert_eq!(stats.elapsed_ms, Some(1_000));
        assert_eq!(stats.time_to_first_token_ms, Some(500));
        assert_eq!(stats.reasoning_tokens, 5);
        assert_eq!(stats.output_tokens, 0);
        assert_eq!(stats.live_token_count, 8);
    }

    #[test]
    fn test_start_time_falls_back_to_first_event() {
        let mut timing = StreamTiming::new(None, 60_000);
        timing.record_delta(DeltaKind::Text, 10, 4_000, true);

        let stats = timing.stats(6_000);
        assert_eq!(stats.elapsed_ms, Some(2_000));
        assert_eq!(stats.time_to_first_token_ms, Some(0));
        assert_eq!(stats.live_tps, 5.0);
    }

    #[test]
    fn test_tool_wall_time() {
        let mut timing = StreamTiming::new(Some(0), 60_000);
        timing.tool_started("t1", 100);
        timing.tool_started("t2", 200);
        timing.tool_finished("t1", 1_100);
        timing.tool_finished("unknown", 5_000);

        let stats = timing.stats(2_000);
        assert_eq!(stats.tool_execution_ms, 1_000);
        assert_eq!(stats.pending_tool_calls, 1);
    }
}
