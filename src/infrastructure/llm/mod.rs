//! LLM provider implementations

mod anthropic;
mod factory;
mod http_client;
mod invoker;
mod openai;

pub use anthropic::{AnthropicProvider, DEFAULT_ANTHROPIC_BASE_URL};
pub use factory::{LlmProviderFactory, ProviderRegistry};
pub use http_client::{HttpClient, HttpClientTrait};
pub use invoker::ProviderInvoker;
pub use openai::{OpenAiProvider, DEFAULT_GROQ_BASE_URL, DEFAULT_OPENAI_BASE_URL};
