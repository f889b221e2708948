//! Domain layer - prompt chains, model competitions and their exports

pub mod chain;
pub mod error;
pub mod export;
pub mod fusion;
pub mod llm;

pub use chain::{
    ChainContext, ChainExecutor, ChainResult, FnInvoker, MetricsObserver, ModelInvoker,
    NoopObserver, StepObserver, StepOutput, StepTiming, TimeoutInvoker, TracingObserver,
};
pub use error::DomainError;
pub use export::{export_delimited, render_delimited};
pub use fusion::{
    Evaluation, Evaluator, FnEvaluator, FusionChain, FusionChainResult, FusionConfig,
    LongestOutputEvaluator,
};
pub use llm::{
    FinishReason, GenerationOptions, LlmProvider, LlmRequest, LlmRequestBuilder, LlmResponse, Message, MessageRole,
    ModelSpec, ProviderKind, Usage,
};
