use crate::pricing::PriceSpec;

/// OpenAI pricing (USD per token, as of 2025-12)
///
/// OpenAI bills cache reads but not cache writes.
pub const PRICE_SPECS: &[PriceSpec] = &[
    // GPT-5.2 series
    PriceSpec::new("gpt-5.2", 400_000, 0.00000175, 0.000014).with_cache_read(1.75e-7),
    // NOTE: upstream lists the codex variant with the full 400k window; the override table corrects it
    PriceSpec::new("gpt-5.2-codex", 400_000, 0.00000175, 0.000014).with_cache_read(1.75e-7),
    // GPT-5 series
    PriceSpec::new("gpt-5", 272_000, 0.00000125, 0.00001).with_cache_read(1.25e-7),
    PriceSpec::new("gpt-5-mini", 272_000, 2.5e-7, 0.000002).with_cache_read(2.5e-8),
    PriceSpec::new("gpt-5-codex", 272_000, 0.00000125, 0.00001).with_cache_read(1.25e-7),
    // GPT-4o (fallback)
    PriceSpec::new("gpt-4o", 128_000, 0.0000025, 0.00001).with_cache_read(0.00000125),
];

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_no_duplicate_keys() {
        let keys: HashSet<&str> = PRICE_SPECS.iter().map(|spec| spec.key).collect();
        assert_eq!(keys.len(), PRICE_SPECS.len());
    }

    #[test]
    fn test_no_cache_write_prices() {
        assert!(
            PRICE_SPECS
                .iter()
                .all(|spec| spec.cache_creation_input_token_cost.is_none())
        );
    }
}
