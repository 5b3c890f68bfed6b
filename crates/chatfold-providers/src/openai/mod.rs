pub mod models;

use chatfold_types::{ProviderMetadata, metadata_u64};

/// Provider-metadata namespace OpenAI reports under
pub const NAMESPACE: &str = "openai";

pub const REASONING_FIELD: &str = "reasoningTokens";

/// Reasoning tokens from the side channel, for SDKs that leave them out of the usage record
pub fn reasoning_tokens(metadata: &ProviderMetadata) -> Option<u64> {
    metadata_u64(metadata, NAMESPACE, REASONING_FIELD)
}
