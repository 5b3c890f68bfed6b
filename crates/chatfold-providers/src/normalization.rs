use std::borrow::Cow;

/// Rewrite gateway-routed ids to the provider they route to.
///
/// `gateway:anthropic/claude-sonnet-4-5` and `mux-gateway:anthropic/claude-sonnet-4-5`
/// both become `anthropic:claude-sonnet-4-5`. Anything else comes back trimmed.
pub fn normalize_gateway_model(model_id: &str) -> Cow<'_, str> {
    let trimmed = model_id.trim();

    if let Some((provider, rest)) = trimmed.split_once(':')
        && is_gateway(provider)
        && let Some((vendor, name)) = rest.split_once('/')
        && !vendor.is_empty()
        && !name.is_empty()
    {
        return Cow::Owned(format!("{}:{}", vendor, name));
    }

    Cow::Borrowed(trimmed)
}

fn is_gateway(provider: &str) -> bool {
    provider == "gateway" || provider.ends_with("-gateway")
}

/// `provider:name` split of a model id. The name may itself contain colons
/// (`ollama:gpt-oss:20b`), so only the first one separates the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelId<'a> {
    pub provider: Option<&'a str>,
    pub name: &'a str,
}

impl<'a> ModelId<'a> {
    pub fn parse(model_id: &'a str) -> Self {
        match model_id.split_once(':') {
            Some((provider, name)) if !provider.is_empty() => Self {
                provider: Some(provider),
                name,
            },
            _ => Self {
                provider: None,
                name: model_id,
            },
        }
    }
}

/// Upstream vendor whose accounting conventions apply to a model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderFamily {
    Anthropic,
    OpenAi,
    Google,
    Other,
}

/// Whether a provider's reported input tokens already include cached tokens
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputAccounting {
    Inclusive,
    Exclusive,
}

impl ProviderFamily {
    fn from_vendor(vendor: &str) -> Option<Self> {
        match vendor {
            "anthropic" => Some(Self::Anthropic),
            "openai" => Some(Self::OpenAi),
            "google" => Some(Self::Google),
            _ => None,
        }
    }

    /// Family of an already gateway-normalized id.
    ///
    /// Routers such as `openrouter:openai/gpt-5` resolve to their inner vendor.
    pub fn detect(model_id: &str) -> Self {
        let id = ModelId::parse(model_id);
        let Some(provider) = id.provider else {
            return Self::Other;
        };

        if let Some(family) = Self::from_vendor(provider) {
            return family;
        }

        id.name
            .split_once('/')
            .and_then(|(vendor, _)| Self::from_vendor(vendor))
            .unwrap_or(Self::Other)
    }

    pub fn input_accounting(self) -> InputAccounting {
        match self {
            Self::OpenAi | Self::Google => InputAccounting::Inclusive,
            Self::Anthropic | Self::Other => InputAccounting::Exclusive,
        }
    }
}
