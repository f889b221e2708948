//! Chain command - runs a prompt chain against one model

use std::sync::Arc;

use clap::Args;
use tracing::info;

use super::ChainInput;
use crate::domain::{export_delimited, ChainExecutor, ModelSpec, TracingObserver};

/// Arguments for the chain command
#[derive(Args, Clone, Debug)]
pub struct ChainArgs {
    #[command(flatten)]
    pub input: ChainInput,

    /// Model as provider:model (defaults to the first configured model)
    #[arg(long)]
    pub model: Option<ModelSpec>,
}

/// Run the chain and print its result as JSON
pub async fn run(args: ChainArgs) -> anyhow::Result<()> {
    let config = super::bootstrap();

    let templates = args.input.load_templates().await?;
    let context = args.input.load_context().await?;

    let model = match args.model {
        Some(model) => model,
        None => config
            .models
            .first()
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("No model given and none configured"))?,
    };

    let invoker = super::build_invoker(&config, std::slice::from_ref(&model))?;
    let executor = ChainExecutor::with_observer(Arc::new(TracingObserver));

    info!(model = %model, steps = templates.len(), "Running prompt chain");

    let result = executor
        .run(&context, &model, invoker.as_ref(), &templates)
        .await?;

    println!("{}", serde_json::to_string_pretty(&result)?);

    if let Some(name) = &args.input.export {
        export_delimited(&config.fusion.export_dir, name, &result.outputs).await?;
    }

    Ok(())
}
