//! Prompt chains - sequential prompts with context and output back-references

mod context;
mod executor;
mod invoker;
mod observer;
mod output;

pub use context::ChainContext;
pub use executor::{ChainExecutor, ChainResult};
pub use invoker::{FnInvoker, ModelInvoker, TimeoutInvoker};
pub use observer::{MetricsObserver, NoopObserver, StepObserver, StepTiming, TracingObserver};
pub use output::StepOutput;

#[cfg(test)]
pub use observer::MockStepObserver;
