use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

/// Default trailing window for live tokens-per-second
pub const DEFAULT_WINDOW_MS: i64 = 60_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DeltaKind {
    Text,
    Reasoning,
    ToolArgs,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeltaRecord {
    pub tokens: u64,
    /// Epoch milliseconds
    pub timestamp: i64,
    pub kind: DeltaKind,
}

impl DeltaRecord {
    pub fn new(tokens: u64, timestamp: i64, kind: DeltaKind) -> Self {
        Self {
            tokens,
            timestamp,
            kind,
        }
    }
}

/// Trailing-window token counter.
///
/// Records inside the window are kept in arrival order; everything pruned out of
/// the window is folded into a scalar so the cumulative count stays O(1).
/// Arrival order is assumed to be timestamp order (the feed is ordered per message).
#[derive(Debug, Clone)]
pub struct RateWindowTracker {
    window_ms: i64,
    recent: VecDeque<DeltaRecord>,
    /// Sum over `recent`
    recent_tokens: u64,
    pruned_tokens: u64,
}

impl Default for RateWindowTracker {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW_MS)
    }
}

impl RateWindowTracker {
    pub fn new(window_ms: i64) -> Self {
        Self {
            window_ms,
            recent: VecDeque::new(),
            recent_tokens: 0,
            pruned_tokens: 0,
        }
    }

    pub fn window_ms(&self) -> i64 {
        self.window_ms
    }

    /// Record a delta. The delta's own timestamp is "now" for pruning.
    pub fn add_delta(&mut self, record: DeltaRecord) {
        self.recent.push_back(record);
        self.recent_tokens += record.tokens;
        self.prune(record.timestamp);
    }

    /// Every token ever recorded, pruned or not
    pub fn token_count(&self) -> u64 {
        self.pruned_tokens + self.recent_tokens
    }

    /// Tokens per second over the window ending at `now`.
    ///
    /// 0.0 when the window is empty or spans no time (also covers clock skew).
    pub fn calculate_tps(&mut self, now: i64) -> f64 {
        self.prune(now);

        let Some(earliest) = self.recent.front().map(|r| r.timestamp) else {
            return 0.0;
        };
        let span_ms = now - earliest;
        if span_ms <= 0 {
            return 0.0;
        }

        self.recent_tokens as f64 / (span_ms as f64 / 1000.0)
    }

    pub fn recent_deltas(&self) -> impl Iterator<Item = &DeltaRecord> {
        self.recent.iter()
    }

    fn prune(&mut self, now: i64) {
        let cutoff = now - self.window_ms;
        while let Some(front) = self.recent.front()
            && front.timestamp < cutoff
        {
            self.pruned_tokens += front.tokens;
            self.recent_tokens -= front.tokens;
            self.recent.pop_front();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(tokens: u64, timestamp: i64) -> DeltaRecord {
        DeltaRecord::new(tokens, timestamp, DeltaKind::Text)
    }

    #[test]
    fn test_empty_tracker() {
        let mut tracker = RateWindowTracker::default();
        assert_eq!(tracker.token_count(), 0);
        assert_eq!(tracker.calculate_tps(1_000), 0.0);
    }

    #[test]
    fn test_tps_over_five_seconds() {
        let mut tracker = RateWindowTracker::new(5_000);
        tracker.add_delta(text(40, 0));
        tracker.add_delta(text(30, 2_500));
        tracker.add_delta(text(30, 5_000));

        assert_eq!(tracker.calculate_tps(5_000), 20.0);
        assert_eq!(tracker.token_count(), 100);
    }

    #[test]
    fn test_deltas_older_than_window_give_zero() {
        let mut tracker = RateWindowTracker::default();
        tracker.add_delta(text(50, 0));
        tracker.add_delta(text(50, 1_000));

        assert_eq!(tracker.calculate_tps(120_000), 0.0);
        assert_eq!(tracker.recent_deltas().count(), 0);
        // Pruned tokens still count toward the cumulative total
        assert_eq!(tracker.token_count(), 100);
    }

    #[test]
    fn test_single_delta_has_no_span() {
        let mut tracker = RateWindowTracker::default();
        tracker.add_delta(text(10, 1_000));
        assert_eq!(tracker.calculate_tps(1_000), 0.0);
    }

    #[test]
    fn test_clock_skew_gives_zero() {
        let mut tracker = RateWindowTracker::default();
        tracker.add_delta(text(10, 5_000));
        assert_eq!(tracker.calculate_tps(4_000), 0.0);
    }

    #[test]
    fn test_add_delta_prunes_prefix() {
        let mut tracker = RateWindowTracker::new(1_000);
        tracker.add_delta(text(1, 0));
        tracker.add_delta(DeltaRecord::new(2, 500, DeltaKind::Reasoning));
        tracker.add_delta(DeltaRecord::new(3, 1_600, DeltaKind::ToolArgs));

        let kinds: Vec<DeltaKind> = tracker.recent_deltas().map(|r| r.kind).collect();
        assert_eq!(kinds, vec![DeltaKind::ToolArgs]);
        assert_eq!(tracker.token_count(), 6);
    }

    #[test]
    fn test_window_total_follows_pruning() {
        let mut tracker = RateWindowTracker::new(1_000);
        tracker.add_delta(text(10, 0));
        tracker.add_delta(text(20, 800));
        tracker.add_delta(text(30, 1_500));

        // 10@0 is out; 20@800 sits exactly on the cutoff
        assert_eq!(tracker.calculate_tps(1_800), 50.0);
        assert_eq!(tracker.token_count(), 60);

        assert_eq!(tracker.calculate_tps(2_000), 60.0);
        assert_eq!(tracker.recent_deltas().count(), 1);
        assert_eq!(tracker.token_count(), 60);

        tracker.add_delta(text(5, 10_000));
        assert_eq!(tracker.recent_deltas().count(), 1);
        assert_eq!(tracker.token_count(), 65);
    }
}
