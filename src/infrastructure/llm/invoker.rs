use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use super::ProviderRegistry;
use crate::domain::{DomainError, GenerationOptions, ModelInvoker, ModelSpec};

/// Invokes models through the registered LLM providers
///
/// Each prompt is sent as a user message, after the configured system prompt
/// if any; the reply text is returned as is.
#[derive(Debug, Clone)]
pub struct ProviderInvoker {
    registry: Arc<ProviderRegistry>,
    options: GenerationOptions,
}

impl ProviderInvoker {
    pub fn new(registry: Arc<ProviderRegistry>) -> Self {
        Self {
            registry,
            options: GenerationOptions::default(),
        }
    }

    pub fn with_options(mut self, options: GenerationOptions) -> Self {
        self.options = options;
        self
    }

    /// Fail early if any model's provider has no credentials
    pub fn ensure_available(&self, models: &[ModelSpec]) -> Result<(), DomainError> {
        models
            .iter()
            .try_for_each(|model| self.registry.get(model.provider).map(|_| ()))
    }
}

#[async_trait]
impl ModelInvoker<ModelSpec> for ProviderInvoker {
    async fn invoke(&self, model: &ModelSpec, prompt: &str) -> Result<String, DomainError> {
        let provider = self.registry.get(model.provider)?;

        let response = provider
            .chat(model.id(), self.options.request_for(prompt))
            .await?;

        debug!(
            model = %model,
            finish_reason = ?response.finish_reason,
            total_tokens = response.usage.as_ref().map(|u| u.total_tokens),
            "Model replied"
        );

        if response.is_truncated() {
            warn!(
                model = %model,
                max_tokens = self.options.max_tokens,
                "Model reply was cut short"
            );
        }

        Ok(response.content().to_string())
    }
}
