//! Registry routing a [`Provider`] to its configured [`LmAdapter`],
//! grounded on the teacher's `SubstrateRegistry::create_by_type`.

use std::collections::HashMap;
use std::sync::Arc;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{config::ProvidersConfig, Provider};
use crate::domain::ports::LmAdapter;

use super::http::HttpLmAdapter;

pub struct LmAdapterRegistry {
    adapters: HashMap<&'static str, Arc<dyn LmAdapter>>,
}

impl LmAdapterRegistry {
    /// Build a registry with one HTTP adapter per provider, reading API
    /// keys from the env var named in `config`. A provider whose key is
    /// unset is simply omitted; routing to it then fails with
    /// [`DomainError::UpstreamLm`] rather than panicking at startup.
    pub fn from_config(config: &ProvidersConfig) -> Self {
        let mut adapters: HashMap<&'static str, Arc<dyn LmAdapter>> = HashMap::new();

        let entries = [
            (Provider::OpenAi, &config.openai),
            (Provider::Anthropic, &config.anthropic),
            (Provider::Groq, &config.groq),
            (Provider::Gemini, &config.gemini),
        ];

        for (provider, endpoint) in entries {
            if let Ok(api_key) = std::env::var(&endpoint.api_key_env) {
                adapters.insert(
                    provider.as_str(),
                    Arc::new(HttpLmAdapter::new(provider, endpoint.base_url.clone(), api_key)),
                );
            }
        }

        Self { adapters }
    }

    pub fn with_adapter(mut self, provider: Provider, adapter: Arc<dyn LmAdapter>) -> Self {
        self.adapters.insert(provider.as_str(), adapter);
        self
    }

    pub fn get(&self, provider: Provider) -> DomainResult<Arc<dyn LmAdapter>> {
        self.adapters
            .get(provider.as_str())
            .cloned()
            .ok_or_else(|| DomainError::UpstreamLm(format!("no adapter configured for provider '{}'", provider.as_str())))
    }
}

impl Default for LmAdapterRegistry {
    fn default() -> Self {
        Self { adapters: HashMap::new() }
    }
}
