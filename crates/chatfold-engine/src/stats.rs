use std::collections::BTreeMap;

use chatfold_providers::{ModelPricing, create_display_usage, normalize_gateway_model};
use chatfold_types::{ChatMessage, Role};
use chrono::DateTime;
use serde::{Deserialize, Serialize};

use crate::aggregator::{DisplayedMessage, MessageStatus};

/// Timestamp (epoch ms) used to sort workspaces by recent activity.
///
/// The latest of:
/// - the last user message that carries a timestamp, skipping idle-compaction requests
/// - the last compacted assistant summary that carries a timestamp
/// - `created_at` (RFC 3339); unparsable values are ignored
pub fn compute_recency_timestamp(messages: &[ChatMessage], created_at: Option<&str>) -> Option<i64> {
    let last_user = messages
        .iter()
        .rev()
        .filter(|m| m.role == Role::User)
        .filter(|m| {
            !m.metadata
                .command_metadata
                .as_ref()
                .is_some_and(|command| command.is_idle_compaction())
        })
        .find_map(|m| m.metadata.timestamp);

    let last_compacted = messages
        .iter()
        .rev()
        .filter(|m| m.role == Role::Assistant && m.metadata.compacted)
        .find_map(|m| m.metadata.timestamp);

    let created = created_at
        .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
        .map(|dt| dt.timestamp_millis());

    [last_user, last_compacted, created].into_iter().flatten().max()
}

/// Per-model totals over finished assistant responses
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelRollup {
    pub model: String,
    pub responses: u64,
    /// Summed stream duration in milliseconds
    pub duration_ms: u64,
    pub output_tokens: u64,
    pub reasoning_tokens: u64,
}

impl ModelRollup {
    /// Output plus reasoning tokens per second of streaming; `None` without timing data
    pub fn average_tps(&self) -> Option<f64> {
        if self.duration_ms == 0 {
            return None;
        }
        let tokens = self.output_tokens + self.reasoning_tokens;
        Some(tokens as f64 / (self.duration_ms as f64 / 1000.0))
    }
}

/// Group completed assistant messages by normalized model id.
///
/// Token figures go through the usage normalizer, so `output_tokens` excludes reasoning.
/// Results are sorted by model id.
pub fn model_rollups(messages: &[DisplayedMessage], pricing: &ModelPricing) -> Vec<ModelRollup> {
    let mut rollups: BTreeMap<String, ModelRollup> = BTreeMap::new();

    for message in messages {
        if message.role != Role::Assistant || message.status != MessageStatus::Complete {
            continue;
        }
        let Some(model) = message.model.as_deref() else {
            continue;
        };
        let model = normalize_gateway_model(model).into_owned();

        let rollup = rollups.entry(model.clone()).or_insert_with(|| ModelRollup {
            model: model.clone(),
            ..Default::default()
        });
        rollup.responses += 1;
        rollup.duration_ms += message.duration.unwrap_or(0);

        if let Some(snapshot) = create_display_usage(
            message.usage.as_ref(),
            &model,
            message.provider_metadata.as_ref(),
            pricing,
        ) {
            rollup.output_tokens += snapshot.output.tokens;
            rollup.reasoning_tokens += snapshot.reasoning.tokens;
        }
    }

    rollups.into_values().collect()
}
