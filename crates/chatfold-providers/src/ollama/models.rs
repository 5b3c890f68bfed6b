use crate::pricing::PriceSpec;

/// Ollama models run locally (or on Ollama's own cloud), so every price is zero.
///
/// Keys are `ollama/<name>`. Hosted variants carry the `-cloud` suffix, which
/// the resolver appends when probing.
pub const PRICE_SPECS: &[PriceSpec] = &[
    // Local
    PriceSpec::new("ollama/llama3.1", 8_192, 0.0, 0.0),
    PriceSpec::new("ollama/llama3", 8_192, 0.0, 0.0),
    PriceSpec::new("ollama/llama2", 4_096, 0.0, 0.0),
    PriceSpec::new("ollama/codellama", 4_096, 0.0, 0.0),
    // Cloud
    PriceSpec::new("ollama/gpt-oss:20b-cloud", 131_072, 0.0, 0.0),
    PriceSpec::new("ollama/gpt-oss:120b-cloud", 131_072, 0.0, 0.0),
    PriceSpec::new("ollama/deepseek-v3.1:671b-cloud", 163_840, 0.0, 0.0),
];
