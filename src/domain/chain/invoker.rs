//! Model invocation seam
//!
//! The chain executor only needs one capability from the outside world: send
//! a prompt to a model and get its text back.

use std::time::Duration;

use async_trait::async_trait;
use tokio::time::timeout;

use crate::domain::DomainError;

/// Sends a fully resolved prompt to a model and returns the raw reply text
#[async_trait]
pub trait ModelInvoker<M: Sync + ?Sized>: Send + Sync {
    async fn invoke(&self, model: &M, prompt: &str) -> Result<String, DomainError>;
}

/// Invoker backed by a synchronous closure
pub struct FnInvoker<F>(pub F);

#[async_trait]
impl<M, F> ModelInvoker<M> for FnInvoker<F>
where
    M: Sync + ?Sized,
    F: Fn(&M, &str) -> Result<String, DomainError> + Send + Sync,
{
    async fn invoke(&self, model: &M, prompt: &str) -> Result<String, DomainError> {
        (self.0)(model, prompt)
    }
}

/// Wraps an invoker so a stuck call fails instead of blocking its worker
#[derive(Debug, Clone)]
pub struct TimeoutInvoker<I> {
    inner: I,
    limit: Duration,
}

impl<I> TimeoutInvoker<I> {
    pub fn new(inner: I, limit: Duration) -> Self {
        Self { inner, limit }
    }

    pub fn limit(&self) -> Duration {
        self.limit
    }
}

#[async_trait]
impl<M, I> ModelInvoker<M> for TimeoutInvoker<I>
where
    M: Sync + ?Sized,
    I: ModelInvoker<M>,
{
    async fn invoke(&self, model: &M, prompt: &str) -> Result<String, DomainError> {
        match timeout(self.limit, self.inner.invoke(model, prompt)).await {
            Ok(result) => result,
            Err(_) => Err(DomainError::timeout(
                "model invocation",
                self.limit.as_millis() as u64,
            )),
        }
    }
}
