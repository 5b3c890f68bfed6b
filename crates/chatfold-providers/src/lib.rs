pub mod anthropic;
pub mod display_usage;
pub mod error;
pub mod google;
pub mod normalization;
pub mod ollama;
pub mod openai;
pub mod overrides;
pub mod pricing;

pub use display_usage::create_display_usage;
pub use error::{Error, Result};
pub use normalization::{InputAccounting, ModelId, ProviderFamily, normalize_gateway_model};
pub use pricing::{ModelPricing, PriceSpec, PricingRecord, PricingTable, candidate_keys};
