//! CLI module for fusion-chain
//!
//! Provides subcommands for running prompt chains:
//! - `chain`: one chain against one model
//! - `fuse`: one chain against several competing models

pub mod chain;
pub mod fuse;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use serde_json::Value;

use crate::config::AppConfig;
use crate::domain::{ChainContext, ModelInvoker, ModelSpec, TimeoutInvoker};
use crate::infrastructure::llm::{ProviderInvoker, ProviderRegistry};
use crate::infrastructure::logging;

/// fusion-chain - Run prompt chains and model competitions
#[derive(Parser)]
#[command(name = "fusion-chain")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run a prompt chain against one model
    Chain(chain::ChainArgs),

    /// Run a prompt chain against competing models and pick a winner
    Fuse(fuse::FuseArgs),
}

/// Chain inputs shared by every subcommand
#[derive(Args, Clone, Debug)]
pub struct ChainInput {
    /// JSON file holding an array of prompt templates
    #[arg(long)]
    pub templates: PathBuf,

    /// JSON file holding an object of context values
    #[arg(long)]
    pub context: Option<PathBuf>,

    /// Context value as key=value; JSON values are decoded, anything else is text
    #[arg(long = "var", value_name = "KEY=VALUE")]
    pub vars: Vec<String>,

    /// Export outputs to <export_dir>/<NAME>.txt
    #[arg(long, value_name = "NAME")]
    pub export: Option<String>,
}

impl ChainInput {
    pub async fn load_templates(&self) -> anyhow::Result<Vec<String>> {
        load_templates(&self.templates).await
    }

    /// Context file values first, then `--var` overrides
    pub async fn load_context(&self) -> anyhow::Result<ChainContext> {
        let mut context = match &self.context {
            Some(path) => {
                let value = read_json(path).await?;
                ChainContext::from_value(value)
                    .with_context(|| format!("Invalid context file {}", path.display()))?
            }
            None => ChainContext::new(),
        };

        for var in &self.vars {
            let (key, value) = parse_var(var)?;
            context = context.with(key, value);
        }

        Ok(context)
    }
}

async fn read_json(path: &Path) -> anyhow::Result<Value> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;

    serde_json::from_str(&raw).with_context(|| format!("Failed to parse {}", path.display()))
}

async fn load_templates(path: &Path) -> anyhow::Result<Vec<String>> {
    let value = read_json(path).await?;

    serde_json::from_value(value).with_context(|| {
        format!(
            "{} must hold a JSON array of template strings",
            path.display()
        )
    })
}

fn parse_var(var: &str) -> anyhow::Result<(String, Value)> {
    let (key, raw) = var
        .split_once('=')
        .with_context(|| format!("Context variable '{}' must be written as key=value", var))?;

    let key = key.trim();
    if key.is_empty() {
        anyhow::bail!("Context variable '{}' has an empty key", var);
    }

    let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));

    Ok((key.to_string(), value))
}

/// Load `.env` and configuration, then install logging
pub(crate) fn bootstrap() -> AppConfig {
    dotenvy::dotenv().ok();

    let config = AppConfig::load().unwrap_or_default();
    logging::init_logging(&config.logging);

    config
}

/// Provider-backed invoker, bounded by the configured request timeout
pub(crate) fn build_invoker(
    config: &AppConfig,
    models: &[ModelSpec],
) -> anyhow::Result<Arc<dyn ModelInvoker<ModelSpec>>> {
    let registry = ProviderRegistry::from_env(&config.llm)?;
    let invoker =
        ProviderInvoker::new(Arc::new(registry)).with_options(config.llm.generation_options());
    invoker.ensure_available(models)?;

    let invoker: Arc<dyn ModelInvoker<ModelSpec>> = match config.llm.request_timeout() {
        Some(limit) => Arc::new(TimeoutInvoker::new(invoker, limit)),
        None => Arc::new(invoker),
    };

    Ok(invoker)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use serde_json::json;
    use tempfile::NamedTempFile;

    fn temp_file(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_parse_var() {
        assert_eq!(parse_var("topic=cats").unwrap(), ("topic".to_string(), json!("cats")));
        assert_eq!(parse_var("count=3").unwrap(), ("count".to_string(), json!(3)));
        assert_eq!(parse_var("eq=a=b").unwrap(), ("eq".to_string(), json!("a=b")));
        assert!(parse_var("novalue").is_err());
        assert!(parse_var("=x").is_err());
    }

    #[tokio::test]
    async fn test_load_inputs() {
        let templates = temp_file(r#"["Tell me about {{topic}}", "Summarize {{output[-1]}}"]"#);
        let context = temp_file(r#"{"topic": "dogs", "tone": "dry"}"#);

        let input = ChainInput {
            templates: templates.path().to_path_buf(),
            context: Some(context.path().to_path_buf()),
            vars: vec!["topic=cats".to_string()],
            export: None,
        };

        assert_eq!(input.load_templates().await.unwrap().len(), 2);

        let loaded = input.load_context().await.unwrap();
        assert_eq!(loaded.get("topic"), Some(&json!("cats")));
        assert_eq!(loaded.get("tone"), Some(&json!("dry")));
    }

    #[tokio::test]
    async fn test_rejects_non_array_templates_and_non_object_context() {
        let templates = temp_file(r#"{"not": "an array"}"#);
        let context = temp_file(r#"["not", "an object"]"#);

        let input = ChainInput {
            templates: templates.path().to_path_buf(),
            context: Some(context.path().to_path_buf()),
            vars: Vec::new(),
            export: None,
        };

        assert!(input.load_templates().await.is_err());
        assert!(input.load_context().await.is_err());
    }

    #[tokio::test]
    async fn test_missing_template_file_names_the_path() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.json");

        let err = load_templates(&missing).await.unwrap_err();
        assert!(err.to_string().contains("absent.json"));
    }

    #[test]
    fn test_cli_parses_fuse_models() {
        let cli = Cli::try_parse_from([
            "fusion-chain",
            "fuse",
            "--templates",
            "t.json",
            "--models",
            "openai:gpt-4o,anthropic:claude-3-5-sonnet-latest",
            "--parallel",
            "--workers",
            "2",
        ])
        .unwrap();

        match cli.command {
            Command::Fuse(args) => {
                assert_eq!(args.models.len(), 2);
                assert!(args.parallel);
                assert_eq!(args.workers, Some(2));
            }
            Command::Chain(_) => panic!("expected fuse command"),
        }
    }
}
