//! Fuse command - runs a prompt chain against competing models

use std::sync::Arc;

use clap::Args;

use super::ChainInput;
use crate::domain::{
    export_delimited, ChainExecutor, FusionChain, FusionConfig, LongestOutputEvaluator, ModelSpec,
    StepOutput, TracingObserver,
};

/// Arguments for the fuse command
#[derive(Args, Clone, Debug)]
pub struct FuseArgs {
    #[command(flatten)]
    pub input: ChainInput,

    /// Competing models as provider:model, comma separated (defaults to the configured roster)
    #[arg(long, value_delimiter = ',')]
    pub models: Vec<ModelSpec>,

    /// Run the model chains concurrently
    #[arg(long)]
    pub parallel: bool,

    /// Concurrent chains in parallel mode (overrides config)
    #[arg(long)]
    pub workers: Option<usize>,
}

/// Run the competition and print its result as JSON
///
/// The winner is picked by output length. Exports hold each model's final
/// output in model order.
pub async fn run(args: FuseArgs) -> anyhow::Result<()> {
    let config = super::bootstrap();

    let templates = args.input.load_templates().await?;
    let context = args.input.load_context().await?;

    let models = if args.models.is_empty() {
        config.models.clone()
    } else {
        args.models
    };

    let invoker = super::build_invoker(&config, &models)?;

    let fusion = FusionChain::new(FusionConfig {
        worker_count: args.workers.unwrap_or(config.fusion.worker_count),
    })
    .with_executor(ChainExecutor::with_observer(Arc::new(TracingObserver)));

    let name = |model: &ModelSpec| model.id().to_string();

    let result = if args.parallel {
        fusion
            .run_parallel(&context, &models, invoker, &templates, &LongestOutputEvaluator, name)
            .await?
    } else {
        fusion
            .run(&context, &models, invoker.as_ref(), &templates, &LongestOutputEvaluator, name)
            .await?
    };

    println!("{}", serde_json::to_string_pretty(&result)?);

    if let Some(export_name) = &args.input.export {
        let finals: Vec<StepOutput> = result
            .all_prompt_responses
            .iter()
            .filter_map(|outputs| outputs.last().cloned())
            .collect();

        export_delimited(&config.fusion.export_dir, export_name, &finals).await?;
    }

    Ok(())
}
