use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Opaque provider-specific side channel, keyed by provider namespace.
///
/// Example: `{ "anthropic": { "cacheCreationInputTokens": 800 } }`
pub type ProviderMetadata = Map<String, Value>;

/// Provider-native usage counts for one model turn (or one step of it).
///
/// Every field is optional because upstream SDKs report sparse records.
/// `None` means "not reported", which downstream code treats as zero.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LanguageModelUsage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_tokens: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_tokens: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_tokens: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cached_input_tokens: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning_tokens: Option<u64>,
}

/// Token count and optional USD cost for one usage component.
///
/// `cost_usd == None` means the price is unknown, never "free".
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct UsageComponent {
    pub tokens: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost_usd: Option<f64>,
}

impl UsageComponent {
    pub fn new(tokens: u64, cost_usd: Option<f64>) -> Self {
        Self { tokens, cost_usd }
    }
}

/// Provider-agnostic usage breakdown used for display and cost totals.
///
/// `output` never includes reasoning tokens.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageSnapshot {
    pub input: UsageComponent,
    pub cached: UsageComponent,
    pub cache_create: UsageComponent,
    pub output: UsageComponent,
    pub reasoning: UsageComponent,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    /// Set by summation when any contributing component had no known cost.
    /// A total carrying this flag is a lower bound.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub has_unknown_costs: bool,
}

impl UsageSnapshot {
    /// Components in display order: input, cached, cache-create, output, reasoning
    pub fn components(&self) -> [&UsageComponent; 5] {
        [
            &self.input,
            &self.cached,
            &self.cache_create,
            &self.output,
            &self.reasoning,
        ]
    }

    pub fn total_tokens(&self) -> u64 {
        self.components().iter().map(|c| c.tokens).sum()
    }
}

/// Read a non-negative integer field from one provider namespace of the side channel.
///
/// Fractional or negative values are treated as absent.
pub fn metadata_u64(metadata: &ProviderMetadata, namespace: &str, field: &str) -> Option<u64> {
    metadata
        .get(namespace)
        .and_then(|ns| ns.get(field))
        .and_then(Value::as_u64)
}
