//! LLM provider domain models and traits

mod message;
mod model_spec;
mod provider;
mod request;
mod response;

pub use message::{Message, MessageRole};
pub use model_spec::{ModelSpec, ProviderKind};
pub use provider::LlmProvider;
pub use request::{GenerationOptions, LlmRequest, LlmRequestBuilder};
pub use response::{FinishReason, LlmResponse, Usage};

#[cfg(test)]
pub use provider::mock::MockLlmProvider;
