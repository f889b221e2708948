//! Chain executor - Runs an ordered list of prompt templates against one model

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use serde::Serialize;
use tracing::{debug, warn};

use super::context::ChainContext;
use super::invoker::ModelInvoker;
use super::observer::{NoopObserver, StepObserver, StepTiming};
use super::output::StepOutput;
use crate::domain::DomainError;

/// Result of running a chain against one model
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ChainResult {
    /// Interpreted output of each step, in step order
    pub outputs: Vec<StepOutput>,
    /// Prompt sent at each step after placeholder substitution
    pub resolved_prompts: Vec<String>,
    /// Timing of each step's model call
    pub timings: Vec<StepTiming>,
}

impl ChainResult {
    fn with_capacity(steps: usize) -> Self {
        Self {
            outputs: Vec::with_capacity(steps),
            resolved_prompts: Vec::with_capacity(steps),
            timings: Vec::with_capacity(steps),
        }
    }

    /// Output of the final step
    pub fn last_output(&self) -> Option<&StepOutput> {
        self.outputs.last()
    }

    pub fn len(&self) -> usize {
        self.outputs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outputs.is_empty()
    }

    /// Sum of all step latencies in milliseconds
    pub fn total_latency_ms(&self) -> u64 {
        self.timings.iter().map(|t| t.latency_ms).sum()
    }
}

/// Chain executor - threads context and prior outputs through each prompt
///
/// Steps run strictly in order since any prompt may reference the output of
/// the step before it.
#[derive(Clone)]
pub struct ChainExecutor {
    observer: Arc<dyn StepObserver>,
}

impl std::fmt::Debug for ChainExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChainExecutor").finish_non_exhaustive()
    }
}

impl Default for ChainExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl ChainExecutor {
    /// Create an executor without step observation
    pub fn new() -> Self {
        Self::with_observer(Arc::new(NoopObserver))
    }

    /// Create an executor that reports every step to `observer`
    pub fn with_observer(observer: Arc<dyn StepObserver>) -> Self {
        Self { observer }
    }

    /// Run every template against `model`
    ///
    /// An invocation failure aborts the run and is returned as-is; outputs
    /// of steps already completed are discarded.
    pub async fn run<M, I>(
        &self,
        context: &ChainContext,
        model: &M,
        invoker: &I,
        templates: &[String],
    ) -> Result<ChainResult, DomainError>
    where
        M: Sync + ?Sized,
        I: ModelInvoker<M> + ?Sized,
    {
        let mut result = ChainResult::with_capacity(templates.len());

        for (step, template) in templates.iter().enumerate() {
            let prompt = context.resolve_prompt(template, &result.outputs);

            for token in ChainContext::unresolved_placeholders(&prompt) {
                warn!(step, token = %token, "Unresolved placeholder left in prompt");
            }

            let started_at = Utc::now();
            let start = Instant::now();
            let raw = invoker.invoke(model, &prompt).await?;

            let timing = StepTiming {
                step,
                started_at,
                latency_ms: start.elapsed().as_millis() as u64,
            };
            let output = StepOutput::interpret(&raw);

            debug!(
                step,
                latency_ms = timing.latency_ms,
                structured = output.is_structured(),
                "Chain step completed"
            );

            self.observer.on_step(&prompt, &output, &timing);

            result.resolved_prompts.push(prompt);
            result.outputs.push(output);
            result.timings.push(timing);
        }

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::chain::invoker::FnInvoker;
    use crate::domain::chain::observer::MockStepObserver;
    use serde_json::json;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Invoker replaying canned replies and recording prompts it received
    fn scripted(
        replies: &[&str],
    ) -> (
        FnInvoker<impl Fn(&str, &str) -> Result<String, DomainError> + Send + Sync>,
        Arc<Mutex<Vec<String>>>,
    ) {
        let queue = Mutex::new(replies.iter().map(|r| r.to_string()).collect::<VecDeque<_>>());
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = seen.clone();

        let invoker = FnInvoker(move |_model: &str, prompt: &str| {
            seen_clone.lock().unwrap().push(prompt.to_string());
            queue
                .lock()
                .unwrap()
                .pop_front()
                .ok_or_else(|| DomainError::provider("stub", "No more replies"))
        });

        (invoker, seen)
    }

    fn templates(items: &[&str]) -> Vec<String> {
        items.iter().map(|t| t.to_string()).collect()
    }

    #[tokio::test]
    async fn test_end_to_end_two_step_chain() {
        let (invoker, seen) = scripted(&["Cats are great.", "Summary: cats."]);
        let ctx = ChainContext::new().with("topic", "cats");

        let result = ChainExecutor::new()
            .run(
                &ctx,
                "stub-model",
                &invoker,
                &templates(&["Tell me about {{topic}}", "Summarize: {{output[-1]}}"]),
            )
            .await
            .unwrap();

        assert_eq!(
            result.outputs,
            vec![
                StepOutput::from("Cats are great."),
                StepOutput::from("Summary: cats.")
            ]
        );
        assert_eq!(
            result.resolved_prompts,
            vec!["Tell me about cats", "Summarize: Cats are great."]
        );
        assert_eq!(*seen.lock().unwrap(), result.resolved_prompts);
        assert_eq!(result.timings.len(), 2);
        assert_eq!(result.timings[1].step, 1);
    }

    #[tokio::test]
    async fn test_fourth_step_sees_all_prior_outputs() {
        let (invoker, _) = scripted(&["A", "B", "C", "done"]);

        let result = ChainExecutor::new()
            .run(
                &ChainContext::new(),
                "stub-model",
                &invoker,
                &templates(&[
                    "one",
                    "two",
                    "three",
                    "{{output[-1]}}|{{output[-2]}}|{{output[-3]}}",
                ]),
            )
            .await
            .unwrap();

        assert_eq!(result.resolved_prompts[3], "C|B|A");
    }

    #[tokio::test]
    async fn test_structured_output_feeds_field_reference() {
        let (invoker, _) = scripted(&["intro", "```json\n{\"x\": 5}\n```", "ok"]);

        let result = ChainExecutor::new()
            .run(
                &ChainContext::new(),
                "stub-model",
                &invoker,
                &templates(&["start", "give json", "x={{output[-1].x}} first={{output[-2]}}"]),
            )
            .await
            .unwrap();

        assert_eq!(result.outputs[1], StepOutput::from(json!({"x": 5})));
        assert_eq!(result.resolved_prompts[2], "x=5 first=intro");
        assert_eq!(result.last_output(), Some(&StepOutput::from("ok")));
    }

    #[tokio::test]
    async fn test_invocation_failure_propagates() {
        let (invoker, seen) = scripted(&["only one reply"]);

        let result = ChainExecutor::new()
            .run(
                &ChainContext::new(),
                "stub-model",
                &invoker,
                &templates(&["first", "second", "third"]),
            )
            .await;

        assert!(matches!(result, Err(DomainError::Provider { .. })));
        // The failing step was attempted, later steps never were
        assert_eq!(seen.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_empty_template_list() {
        let (invoker, seen) = scripted(&[]);

        let result = ChainExecutor::new()
            .run(&ChainContext::new(), "stub-model", &invoker, &[])
            .await
            .unwrap();

        assert!(result.is_empty());
        assert!(result.last_output().is_none());
        assert_eq!(result.total_latency_ms(), 0);
        assert!(seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_observer_notified_for_each_step() {
        let (invoker, _) = scripted(&["first", "{\"done\": true}"]);

        let mut observer = MockStepObserver::new();
        observer
            .expect_on_step()
            .withf(|prompt, _, timing| timing.step == 0 && prompt == "go")
            .times(1)
            .return_const(());
        observer
            .expect_on_step()
            .withf(|prompt, output, timing| {
                timing.step == 1 && prompt == "after first" && output.is_structured()
            })
            .times(1)
            .return_const(());

        let executor = ChainExecutor::with_observer(Arc::new(observer));
        let result = executor
            .run(
                &ChainContext::new(),
                "stub-model",
                &invoker,
                &templates(&["go", "after {{output[-1]}}"]),
            )
            .await
            .unwrap();

        assert_eq!(result.len(), 2);
    }
}
