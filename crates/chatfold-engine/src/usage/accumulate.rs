use chatfold_providers::anthropic;
use chatfold_types::{LanguageModelUsage, ProviderMetadata};
use serde_json::{Map, Value};

/// Field-wise sum of two raw usage records.
///
/// Missing fields count as zero on both sides, and every field of the result is set,
/// so `add_usage(None, b) == add_usage(Some(&Default::default()), b)`.
pub fn add_usage(prev: Option<&LanguageModelUsage>, next: &LanguageModelUsage) -> LanguageModelUsage {
    let prev = prev.cloned().unwrap_or_default();
    let sum = |a: Option<u64>, b: Option<u64>| Some(a.unwrap_or(0) + b.unwrap_or(0));

    LanguageModelUsage {
        input_tokens: sum(prev.input_tokens, next.input_tokens),
        output_tokens: sum(prev.output_tokens, next.output_tokens),
        total_tokens: sum(prev.total_tokens, next.total_tokens),
        cached_input_tokens: sum(prev.cached_input_tokens, next.cached_input_tokens),
        reasoning_tokens: sum(prev.reasoning_tokens, next.reasoning_tokens),
    }
}

/// Fold one step's provider metadata into the running total.
///
/// Anthropic reports cache-creation tokens per step, so that one counter is summed.
/// Everything else is taken from the latest step as-is; namespaces present only in
/// `existing` are dropped. Either side absent returns the other unchanged.
pub fn accumulate_provider_metadata(
    existing: Option<&ProviderMetadata>,
    step: Option<&ProviderMetadata>,
) -> Option<ProviderMetadata> {
    let (existing, step) = match (existing, step) {
        (None, None) => return None,
        (Some(existing), None) => return Some(existing.clone()),
        (None, Some(step)) => return Some(step.clone()),
        (Some(existing), Some(step)) => (existing, step),
    };

    let existing_create = anthropic::cache_creation_tokens(existing).unwrap_or(0);
    let step_create = anthropic::cache_creation_tokens(step).unwrap_or(0);
    let total = existing_create + step_create;

    if total == 0 {
        return Some(step.clone());
    }

    let mut merged = step.clone();
    let namespace = merged
        .entry(anthropic::NAMESPACE)
        .or_insert_with(|| Value::Object(Map::new()));

    // A non-object anthropic entry is replaced; the counter has to live somewhere.
    if !namespace.is_object() {
        *namespace = Value::Object(Map::new());
    }
    if let Value::Object(fields) = namespace {
        fields.insert(anthropic::CACHE_CREATION_FIELD.to_string(), Value::from(total));
    }

    Some(merged)
}
