use crate::pricing::PriceSpec;

/// Gemini pricing (USD per token, as of 2025-12, lowest context tier)
pub const PRICE_SPECS: &[PriceSpec] = &[
    // Gemini 3 series
    PriceSpec::new("gemini-3-pro-preview", 1_048_576, 0.000002, 0.000012).with_cache_read(2e-7),
    // Gemini 2.5 series
    PriceSpec::new("gemini-2.5-pro", 1_048_576, 0.00000125, 0.00001).with_cache_read(1.25e-7),
    PriceSpec::new("gemini-2.5-flash", 1_048_576, 3e-7, 0.0000025).with_cache_read(3e-8),
];
