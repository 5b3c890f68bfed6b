pub mod models;

use chatfold_types::{ProviderMetadata, metadata_u64};

/// Provider-metadata namespace Anthropic reports under
pub const NAMESPACE: &str = "anthropic";

/// Cache-write tokens; only reported through provider metadata, and per step
pub const CACHE_CREATION_FIELD: &str = "cacheCreationInputTokens";

pub fn cache_creation_tokens(metadata: &ProviderMetadata) -> Option<u64> {
    metadata_u64(metadata, NAMESPACE, CACHE_CREATION_FIELD)
}
