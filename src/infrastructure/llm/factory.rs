use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, warn};

use super::http_client::HttpClient;
use super::{AnthropicProvider, OpenAiProvider};
use crate::config::LlmConfig;
use crate::domain::{DomainError, LlmProvider, ProviderKind};

/// Factory for creating LLM providers
#[derive(Debug)]
pub struct LlmProviderFactory;

impl LlmProviderFactory {
    /// Create a provider of `kind` talking to its configured base URL
    pub fn create(
        kind: ProviderKind,
        api_key: &str,
        config: &LlmConfig,
    ) -> Result<Arc<dyn LlmProvider>, DomainError> {
        let http_client = match config.request_timeout() {
            Some(timeout) => HttpClient::with_timeout(timeout)?,
            None => HttpClient::new(),
        };
        let base_url = config.base_url(kind);

        let provider: Arc<dyn LlmProvider> = match kind {
            ProviderKind::OpenAi => {
                Arc::new(OpenAiProvider::with_base_url(http_client, api_key, base_url))
            }
            ProviderKind::Anthropic => {
                Arc::new(AnthropicProvider::with_base_url(http_client, api_key, base_url))
            }
            ProviderKind::Groq => Arc::new(OpenAiProvider::groq(http_client, api_key, base_url)),
        };

        Ok(provider)
    }
}

/// Providers available to this process, keyed by kind
#[derive(Debug, Default, Clone)]
pub struct ProviderRegistry {
    providers: HashMap<ProviderKind, Arc<dyn LlmProvider>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_provider(mut self, kind: ProviderKind, provider: Arc<dyn LlmProvider>) -> Self {
        self.providers.insert(kind, provider);
        self
    }

    /// Build every provider whose API key is set in the environment
    pub fn from_env(config: &LlmConfig) -> Result<Self, DomainError> {
        Self::from_keys(config, |name| std::env::var(name).ok())
    }

    /// Build every provider for which `lookup` yields a non-empty API key
    pub fn from_keys<F>(config: &LlmConfig, lookup: F) -> Result<Self, DomainError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut registry = Self::new();

        for kind in [ProviderKind::OpenAi, ProviderKind::Anthropic, ProviderKind::Groq] {
            match lookup(kind.api_key_env()).filter(|key| !key.trim().is_empty()) {
                Some(api_key) => {
                    debug!(provider = %kind, "Registering LLM provider");
                    let provider = LlmProviderFactory::create(kind, &api_key, config)?;
                    registry = registry.with_provider(kind, provider);
                }
                None => {
                    debug!(provider = %kind, env = kind.api_key_env(), "No API key, skipping provider");
                }
            }
        }

        if registry.is_empty() {
            warn!("No LLM provider API keys found in the environment");
        }

        Ok(registry)
    }

    pub fn get(&self, kind: ProviderKind) -> Result<Arc<dyn LlmProvider>, DomainError> {
        self.providers.get(&kind).cloned().ok_or_else(|| {
            DomainError::configuration(format!(
                "Provider '{}' is not configured (set {})",
                kind,
                kind.api_key_env()
            ))
        })
    }

    pub fn contains(&self, kind: ProviderKind) -> bool {
        self.providers.contains_key(&kind)
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}
