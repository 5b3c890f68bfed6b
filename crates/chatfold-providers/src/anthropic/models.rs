use crate::pricing::PriceSpec;

/// Claude pricing (USD per token, as of 2025-12)
///
/// Keys are bare model names; dated snapshots that price differently from
/// their alias get their own entry.
pub const PRICE_SPECS: &[PriceSpec] = &[
    // Claude 4.5 series
    PriceSpec::new("claude-opus-4-5", 200_000, 0.000005, 0.000025)
        .with_cache_write(0.00000625)
        .with_cache_read(5e-7),
    PriceSpec::new("claude-sonnet-4-5", 200_000, 0.000003, 0.000015)
        .with_cache_write(0.00000375)
        .with_cache_read(3e-7),
    PriceSpec::new("claude-haiku-4-5", 200_000, 0.000001, 0.000005)
        .with_cache_write(0.00000125)
        .with_cache_read(1e-7),
    // Claude 4 series
    PriceSpec::new("claude-opus-4-1", 200_000, 0.000015, 0.000075)
        .with_cache_write(0.00001875)
        .with_cache_read(0.0000015),
    PriceSpec::new("claude-sonnet-4-20250514", 200_000, 0.000003, 0.000015)
        .with_cache_write(0.00000375)
        .with_cache_read(3e-7),
];
