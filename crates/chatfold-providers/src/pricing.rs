// NOTE: Pricing resolution
//
// Built-in prices live next to each provider (anthropic/models.rs, openai/models.rs, ...)
// and are merged into one base table here. A second, smaller override table
// (overrides.rs) is checked first so corrected figures win over stale upstream data.
// Both tables can be replaced at startup with litellm-shaped JSON files.

use std::collections::HashMap;
use std::path::Path;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::normalization::{ModelId, normalize_gateway_model};
use crate::{anthropic, google, ollama, openai, overrides};

/// Suffix under which hosted ("cloud") variants of local models are published
const CLOUD_SUFFIX: &str = "-cloud";

/// Per-token prices for one model, in USD
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricingRecord {
    pub max_input_tokens: u64,
    pub input_cost_per_token: f64,
    pub output_cost_per_token: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_creation_input_token_cost: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_read_input_token_cost: Option<f64>,
}

impl PricingRecord {
    /// Structural validation of a raw table entry.
    ///
    /// Valid = numeric `max_input_tokens`, `input_cost_per_token` and `output_cost_per_token`.
    /// Everything else in the entry is ignored.
    pub fn from_entry(entry: &Value) -> Option<Self> {
        let max_input_tokens = entry.get("max_input_tokens")?.as_f64()?;
        let input_cost_per_token = entry.get("input_cost_per_token")?.as_f64()?;
        let output_cost_per_token = entry.get("output_cost_per_token")?.as_f64()?;

        Some(Self {
            max_input_tokens: max_input_tokens.max(0.0) as u64,
            input_cost_per_token,
            output_cost_per_token,
            cache_creation_input_token_cost: entry
                .get("cache_creation_input_token_cost")
                .and_then(Value::as_f64),
            cache_read_input_token_cost: entry
                .get("cache_read_input_token_cost")
                .and_then(Value::as_f64),
        })
    }
}

/// Compile-time price entry used by the built-in provider tables
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceSpec {
    pub key: &'static str,
    pub max_input_tokens: u64,
    pub input_cost_per_token: f64,
    pub output_cost_per_token: f64,
    pub cache_creation_input_token_cost: Option<f64>,
    pub cache_read_input_token_cost: Option<f64>,
}

impl PriceSpec {
    pub const fn new(key: &'static str, max_input_tokens: u64, input: f64, output: f64) -> Self {
        Self {
            key,
            max_input_tokens,
            input_cost_per_token: input,
            output_cost_per_token: output,
            cache_creation_input_token_cost: None,
            cache_read_input_token_cost: None,
        }
    }

    pub const fn with_cache_read(mut self, cost: f64) -> Self {
        self.cache_read_input_token_cost = Some(cost);
        self
    }

    pub const fn with_cache_write(mut self, cost: f64) -> Self {
        self.cache_creation_input_token_cost = Some(cost);
        self
    }

    fn to_entry(self) -> Value {
        let mut entry = json!({
            "max_input_tokens": self.max_input_tokens,
            "input_cost_per_token": self.input_cost_per_token,
            "output_cost_per_token": self.output_cost_per_token,
        });
        if let Some(cost) = self.cache_creation_input_token_cost {
            entry["cache_creation_input_token_cost"] = json!(cost);
        }
        if let Some(cost) = self.cache_read_input_token_cost {
            entry["cache_read_input_token_cost"] = json!(cost);
        }
        entry
    }
}

/// Raw pricing table keyed by model key (`name` or `provider/name`).
///
/// Entries are kept as loaded; validation happens at lookup so one bad entry
/// never poisons the rest of the table.
#[derive(Debug, Clone, Default)]
pub struct PricingTable {
    entries: HashMap<String, Value>,
}

impl PricingTable {
    pub fn from_specs<'a>(specs: impl IntoIterator<Item = &'a PriceSpec>) -> Self {
        let entries = specs
            .into_iter()
            .map(|spec| (spec.key.to_string(), spec.to_entry()))
            .collect();
        Self { entries }
    }

    /// Parse a litellm `model_prices` style document
    pub fn from_json_str(content: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(content)?;
        let Value::Object(map) = value else {
            return Err(Error::Pricing(
                "top-level value must be an object keyed by model".to_string(),
            ));
        };
        Ok(Self::from_map(map))
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let table = Self::from_json_str(&content)?;
        debug!(path = %path.display(), entries = table.len(), "loaded pricing table");
        Ok(table)
    }

    fn from_map(map: Map<String, Value>) -> Self {
        let invalid = map
            .iter()
            .filter(|(_, entry)| PricingRecord::from_entry(entry).is_none())
            .count();
        if invalid > 0 {
            debug!(invalid, "pricing table has entries without usable prices; they will be skipped");
        }
        Self {
            entries: map.into_iter().collect(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// First candidate with a structurally valid entry
    fn lookup_first(&self, candidates: &[String]) -> Option<(String, PricingRecord)> {
        candidates.iter().find_map(|key| {
            let entry = self.get(key)?;
            match PricingRecord::from_entry(entry) {
                Some(record) => Some((key.clone(), record)),
                None => {
                    trace!(key = %key, "skipping structurally invalid pricing entry");
                    None
                }
            }
        })
    }
}

/// Override + base pricing tables. Read-only after construction.
#[derive(Debug, Clone, Default)]
pub struct ModelPricing {
    overrides: PricingTable,
    base: PricingTable,
}

static BUILTIN: Lazy<ModelPricing> =
    Lazy::new(|| ModelPricing::new(builtin_overrides(), builtin_base()));

/// Base table assembled from every provider module
pub fn builtin_base() -> PricingTable {
    PricingTable::from_specs(
        anthropic::models::PRICE_SPECS
            .iter()
            .chain(openai::models::PRICE_SPECS)
            .chain(google::models::PRICE_SPECS)
            .chain(ollama::models::PRICE_SPECS),
    )
}

pub fn builtin_overrides() -> PricingTable {
    PricingTable::from_specs(overrides::PRICE_SPECS)
}

impl ModelPricing {
    pub fn new(overrides: PricingTable, base: PricingTable) -> Self {
        Self { overrides, base }
    }

    /// Shared built-in tables
    pub fn builtin() -> &'static ModelPricing {
        &BUILTIN
    }

    /// Resolve a provider-qualified model id (`provider:name` or bare `name`).
    ///
    /// Every candidate key is tried against the override table before the base table.
    pub fn resolve(&self, model_id: &str) -> Option<PricingRecord> {
        let candidates = candidate_keys(model_id);

        let hit = self
            .overrides
            .lookup_first(&candidates)
            .or_else(|| self.base.lookup_first(&candidates));

        match hit {
            Some((key, record)) => {
                trace!(model = model_id, key = %key, "resolved model pricing");
                Some(record)
            }
            None => {
                debug!(model = model_id, "no pricing found for model");
                None
            }
        }
    }
}

/// Lookup keys for a model id, most specific first.
///
/// `ollama:llama3:8b` yields `llama3:8b`, `ollama/llama3:8b`, `ollama/llama3:8b-cloud`,
/// then the size-stripped `llama3` and `ollama/llama3`.
pub fn candidate_keys(model_id: &str) -> Vec<String> {
    let normalized = normalize_gateway_model(model_id);
    let id = ModelId::parse(&normalized);

    let mut keys = vec![id.name.to_string()];
    if let Some(provider) = id.provider {
        keys.push(format!("{}/{}", provider, id.name));
        keys.push(format!("{}/{}{}", provider, id.name, CLOUD_SUFFIX));
    }

    if let Some((base, _size)) = id.name.split_once(':') {
        keys.push(base.to_string());
        if let Some(provider) = id.provider {
            keys.push(format!("{}/{}", provider, base));
        }
    }

    keys
}
