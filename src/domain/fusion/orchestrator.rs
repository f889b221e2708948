//! Fusion chain - Runs one chain against competing models and picks a winner

use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info};

use super::evaluator::Evaluator;
use super::result::FusionChainResult;
use crate::domain::chain::{ChainContext, ChainExecutor, ChainResult, ModelInvoker};
use crate::domain::DomainError;

/// Configuration for competition runs
#[derive(Debug, Clone)]
pub struct FusionConfig {
    /// Maximum number of chains running at once in parallel mode
    pub worker_count: usize,
}

impl Default for FusionConfig {
    fn default() -> Self {
        Self { worker_count: 4 }
    }
}

/// Fusion chain - competition orchestrator
///
/// Both modes return per-model sequences aligned to the caller's model order.
/// Any failed chain fails the whole competition.
#[derive(Debug, Clone, Default)]
pub struct FusionChain {
    executor: ChainExecutor,
    config: FusionConfig,
}

impl FusionChain {
    /// Create an orchestrator with the given configuration
    pub fn new(config: FusionConfig) -> Self {
        Self {
            executor: ChainExecutor::new(),
            config,
        }
    }

    /// Use a specific chain executor (e.g. one with a step observer)
    pub fn with_executor(mut self, executor: ChainExecutor) -> Self {
        self.executor = executor;
        self
    }

    pub fn config(&self) -> &FusionConfig {
        &self.config
    }

    /// Run the chain for each model in list order
    pub async fn run<M, I, E, N>(
        &self,
        context: &ChainContext,
        models: &[M],
        invoker: &I,
        templates: &[String],
        evaluator: &E,
        name: N,
    ) -> Result<FusionChainResult, DomainError>
    where
        M: Sync,
        I: ModelInvoker<M> + ?Sized,
        E: Evaluator + ?Sized,
        N: Fn(&M) -> String,
    {
        validate_competition(models.len(), templates)?;

        info!(
            models = models.len(),
            steps = templates.len(),
            "Running sequential fusion chain"
        );

        let mut results = Vec::with_capacity(models.len());

        for model in models {
            let result = self.executor.run(context, model, invoker, templates).await?;
            debug!(model = %name(model), latency_ms = result.total_latency_ms(), "Model chain finished");
            results.push(result);
        }

        assemble(results, models, evaluator, name).await
    }

    /// Run the chain for every model concurrently
    ///
    /// At most `worker_count` chains run at once. Each task carries the index
    /// of its model so results are put back in list order regardless of
    /// completion order. On the first failure the remaining tasks are
    /// aborted.
    pub async fn run_parallel<M, I, E, N>(
        &self,
        context: &ChainContext,
        models: &[M],
        invoker: Arc<I>,
        templates: &[String],
        evaluator: &E,
        name: N,
    ) -> Result<FusionChainResult, DomainError>
    where
        M: Clone + Send + Sync + 'static,
        I: ModelInvoker<M> + ?Sized + 'static,
        E: Evaluator + ?Sized,
        N: Fn(&M) -> String,
    {
        validate_competition(models.len(), templates)?;

        let worker_count = self.config.worker_count.max(1);

        info!(
            models = models.len(),
            steps = templates.len(),
            worker_count,
            "Running parallel fusion chain"
        );

        let context = Arc::new(context.clone());
        let templates: Arc<[String]> = templates.to_vec().into();
        let permits = Arc::new(Semaphore::new(worker_count));
        let mut tasks = JoinSet::new();

        for (index, model) in models.iter().cloned().enumerate() {
            let executor = self.executor.clone();
            let context = context.clone();
            let templates = templates.clone();
            let invoker = invoker.clone();
            let permits = permits.clone();

            tasks.spawn(async move {
                let _permit = permits
                    .acquire_owned()
                    .await
                    .map_err(|e| DomainError::internal(format!("Worker pool closed: {}", e)))?;

                let result = executor
                    .run(&context, &model, invoker.as_ref(), &templates)
                    .await?;

                Ok::<_, DomainError>((index, result))
            });
        }

        let mut slots: Vec<Option<ChainResult>> = vec![None; models.len()];

        while let Some(joined) = tasks.join_next().await {
            let (index, result) = joined
                .map_err(|e| DomainError::internal(format!("Chain task failed: {}", e)))??;

            debug!(
                model = %name(&models[index]),
                latency_ms = result.total_latency_ms(),
                "Model chain finished"
            );
            slots[index] = Some(result);
        }

        let results = slots
            .into_iter()
            .map(|slot| slot.ok_or_else(|| DomainError::internal("Chain task produced no result")))
            .collect::<Result<Vec<_>, _>>()?;

        assemble(results, models, evaluator, name).await
    }
}

fn validate_competition(model_count: usize, templates: &[String]) -> Result<(), DomainError> {
    if model_count == 0 {
        return Err(DomainError::validation("Fusion chain has no models to compete"));
    }

    if templates.is_empty() {
        return Err(DomainError::validation(
            "Fusion chain has no prompts, so there is no final output to evaluate",
        ));
    }

    Ok(())
}

/// Evaluate the final outputs and build the aligned result
async fn assemble<M, E, N>(
    results: Vec<ChainResult>,
    models: &[M],
    evaluator: &E,
    name: N,
) -> Result<FusionChainResult, DomainError>
where
    E: Evaluator + ?Sized,
    N: Fn(&M) -> String,
{
    let last_outputs = results
        .iter()
        .filter_map(|result| result.last_output().cloned())
        .collect::<Vec<_>>();

    let evaluation = evaluator.evaluate(&last_outputs).await?;

    if evaluation.scores.len() != models.len() {
        return Err(DomainError::validation(format!(
            "Evaluator returned {} scores for {} models",
            evaluation.scores.len(),
            models.len()
        )));
    }

    let chain_model_names: Vec<String> = models.iter().map(|model| name(model)).collect();

    let mut all_prompt_responses = Vec::with_capacity(results.len());
    let mut all_context_filled_prompts = Vec::with_capacity(results.len());
    let mut all_step_timings = Vec::with_capacity(results.len());

    for result in results {
        all_prompt_responses.push(result.outputs);
        all_context_filled_prompts.push(result.resolved_prompts);
        all_step_timings.push(result.timings);
    }

    info!(
        models = ?chain_model_names,
        scores = ?evaluation.scores,
        "Fusion chain evaluated"
    );

    Ok(FusionChainResult {
        top_response: evaluation.top_response,
        all_prompt_responses,
        all_context_filled_prompts,
        performance_scores: evaluation.scores,
        chain_model_names,
        all_step_timings,
    })
}
