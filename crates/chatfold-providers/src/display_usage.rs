use chatfold_types::{LanguageModelUsage, ProviderMetadata, UsageComponent, UsageSnapshot};

use crate::normalization::{InputAccounting, ProviderFamily, normalize_gateway_model};
use crate::pricing::{ModelPricing, PricingRecord};
use crate::{anthropic, openai};

/// Convert a raw provider usage record into the provider-agnostic display form.
///
/// Returns `None` only when `usage` is `None`: "no usage yet" is not "zero usage".
/// Unknown models still get token counts, with every cost left unset.
pub fn create_display_usage(
    usage: Option<&LanguageModelUsage>,
    model: &str,
    provider_metadata: Option<&ProviderMetadata>,
    pricing: &ModelPricing,
) -> Option<UsageSnapshot> {
    let usage = usage?;
    let model = normalize_gateway_model(model);

    let cached = usage.cached_input_tokens.unwrap_or(0);
    let raw_input = usage.input_tokens.unwrap_or(0);

    // NOTE: Getting this backwards double-counts every cached token.
    // OpenAI and Google report input inclusive of cache reads; Anthropic reports it exclusive.
    let input = match ProviderFamily::detect(&model).input_accounting() {
        InputAccounting::Inclusive => raw_input.saturating_sub(cached),
        InputAccounting::Exclusive => raw_input,
    };

    let cache_create = provider_metadata
        .and_then(anthropic::cache_creation_tokens)
        .unwrap_or(0);

    let reasoning = usage
        .reasoning_tokens
        .or_else(|| provider_metadata.and_then(openai::reasoning_tokens))
        .unwrap_or(0);

    let output = usage.output_tokens.unwrap_or(0).saturating_sub(reasoning);

    let rates = pricing.resolve(&model).map(ComponentRates::from);
    let cost = |tokens: u64, rate: fn(&ComponentRates) -> f64| {
        rates.as_ref().map(|r| tokens as f64 * rate(r))
    };

    Some(UsageSnapshot {
        input: UsageComponent::new(input, cost(input, |r| r.input)),
        cached: UsageComponent::new(cached, cost(cached, |r| r.cache_read)),
        cache_create: UsageComponent::new(cache_create, cost(cache_create, |r| r.cache_write)),
        output: UsageComponent::new(output, cost(output, |r| r.output)),
        reasoning: UsageComponent::new(reasoning, cost(reasoning, |r| r.output)),
        model: Some(model.into_owned()),
        has_unknown_costs: false,
    })
}

/// Per-component rate; cache prices a model does not publish count as free.
struct ComponentRates {
    input: f64,
    output: f64,
    cache_read: f64,
    cache_write: f64,
}

impl From<PricingRecord> for ComponentRates {
    fn from(record: PricingRecord) -> Self {
        Self {
            input: record.input_cost_per_token,
            output: record.output_cost_per_token,
            cache_read: record.cache_read_input_token_cost.unwrap_or(0.0),
            cache_write: record.cache_creation_input_token_cost.unwrap_or(0.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn usage(input: u64, output: u64, cached: Option<u64>) -> LanguageModelUsage {
        LanguageModelUsage {
            input_tokens: Some(input),
            output_tokens: Some(output),
            total_tokens: Some(input + output),
            cached_input_tokens: cached,
            reasoning_tokens: None,
        }
    }

    fn meta(value: serde_json::Value) -> ProviderMetadata {
        serde_json::from_value(value).unwrap()
    }

    fn display(
        usage: &LanguageModelUsage,
        model: &str,
        metadata: Option<&ProviderMetadata>,
    ) -> UsageSnapshot {
        create_display_usage(Some(usage), model, metadata, ModelPricing::builtin()).unwrap()
    }

    #[test]
    fn test_openai_input_is_inclusive_of_cache() {
        let result = display(&usage(108_200, 227, Some(71_600)), "openai:gpt-5.2", None);
        assert_eq!(result.cached.tokens, 71_600);
        assert_eq!(result.input.tokens, 36_600);
    }

    #[test]
    fn test_anthropic_input_is_exclusive_of_cache() {
        let result = display(
            &usage(36_600, 227, Some(71_600)),
            "anthropic:claude-sonnet-4-5",
            None,
        );
        assert_eq!(result.cached.tokens, 71_600);
        assert_eq!(result.input.tokens, 36_600);
    }

    #[test]
    fn test_google_input_is_inclusive_of_cache() {
        let result = display(
            &usage(74_300, 1_600, Some(42_600)),
            "google:gemini-3-pro-preview",
            None,
        );
        assert_eq!(result.input.tokens, 31_700);
    }

    #[test]
    fn test_gateway_model_uses_inner_vendor_accounting() {
        let result = display(
            &usage(108_200, 227, Some(71_600)),
            "gateway:openai/gpt-5.2",
            None,
        );
        assert_eq!(result.input.tokens, 36_600);
        assert_eq!(result.model.as_deref(), Some("openai:gpt-5.2"));
    }

    #[test]
    fn test_cached_larger_than_input_clamps_to_zero() {
        let result = display(&usage(10, 5, Some(50)), "openai:gpt-5.2", None);
        assert_eq!(result.input.tokens, 0);
    }

    #[test]
    fn test_absent_usage_is_none() {
        assert_eq!(
            create_display_usage(None, "openai:gpt-5.2", None, ModelPricing::builtin()),
            None
        );
    }

    #[test]
    fn test_missing_cached_field_is_zero() {
        let result = display(&usage(1_000, 500, None), "openai:gpt-5.2", None);
        assert_eq!(result.input.tokens, 1_000);
        assert_eq!(result.cached.tokens, 0);
    }

    #[test]
    fn test_cache_creation_comes_from_side_channel() {
        let raw = usage(1_000, 50, None);
        let model = "anthropic:claude-sonnet-4-20250514";

        let with = meta(json!({"anthropic": {"cacheCreationInputTokens": 800}}));
        assert_eq!(display(&raw, model, Some(&with)).cache_create.tokens, 800);

        assert_eq!(display(&raw, model, None).cache_create.tokens, 0);

        let other = meta(json!({"anthropic": {"someOtherField": 123}}));
        assert_eq!(display(&raw, model, Some(&other)).cache_create.tokens, 0);
    }

    #[test]
    fn test_reasoning_fallback_order() {
        let side = meta(json!({"openai": {"reasoningTokens": 999}}));
        let mut raw = LanguageModelUsage {
            output_tokens: Some(500),
            reasoning_tokens: Some(100),
            ..Default::default()
        };

        let result = display(&raw, "openai:gpt-5.2", Some(&side));
        assert_eq!(result.reasoning.tokens, 100);
        assert_eq!(result.output.tokens, 400);

        raw.reasoning_tokens = None;
        let side = meta(json!({"openai": {"reasoningTokens": 150}}));
        let result = display(&raw, "openai:gpt-5.2", Some(&side));
        assert_eq!(result.reasoning.tokens, 150);
        assert_eq!(result.output.tokens, 350);

        let result = display(&raw, "openai:gpt-5.2", None);
        assert_eq!(result.reasoning.tokens, 0);
        assert_eq!(result.output.tokens, 500);
    }

    #[test]
    fn test_costs_use_component_rates() {
        let raw = LanguageModelUsage {
            input_tokens: Some(1_000),
            output_tokens: Some(200),
            cached_input_tokens: Some(10_000),
            reasoning_tokens: Some(50),
            ..Default::default()
        };
        let side = meta(json!({"anthropic": {"cacheCreationInputTokens": 2_000}}));
        let result = display(&raw, "anthropic:claude-sonnet-4-5", Some(&side));

        let close = |actual: Option<f64>, expected: f64| {
            let actual = actual.unwrap();
            assert!((actual - expected).abs() < 1e-12, "{} != {}", actual, expected);
        };
        close(result.input.cost_usd, 1_000.0 * 0.000003);
        close(result.cached.cost_usd, 10_000.0 * 3e-7);
        close(result.cache_create.cost_usd, 2_000.0 * 0.00000375);
        close(result.output.cost_usd, 150.0 * 0.000015);
        close(result.reasoning.cost_usd, 50.0 * 0.000015);
    }

    #[test]
    fn test_missing_cache_price_costs_nothing() {
        let result = display(&usage(100, 10, Some(40)), "ollama:llama3.1", None);
        assert_eq!(result.cached.cost_usd, Some(0.0));
        assert_eq!(result.cache_create.cost_usd, Some(0.0));
    }

    #[test]
    fn test_unknown_model_has_tokens_but_no_costs() {
        let result = display(&usage(100, 10, Some(40)), "unknown:fake-model-9000", None);
        assert_eq!(result.input.tokens, 100);
        assert_eq!(result.output.tokens, 10);
        assert!(result.components().iter().all(|c| c.cost_usd.is_none()));
    }
}
