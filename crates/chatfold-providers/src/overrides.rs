use crate::pricing::PriceSpec;

/// Corrections and additions checked before the base table.
///
/// Entries here either fill gaps upstream has not caught up with yet or fix
/// figures upstream has wrong.
pub const PRICE_SPECS: &[PriceSpec] = &[
    PriceSpec::new("gpt-5.2-pro", 272_000, 0.000021, 0.000168),
    PriceSpec::new("gpt-5.2-codex", 272_000, 0.00000175, 0.000014).with_cache_read(1.75e-7),
];
