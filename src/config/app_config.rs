use serde::Deserialize;

use crate::domain::{GenerationOptions, ModelSpec, ProviderKind};
use crate::infrastructure::llm::{
    DEFAULT_ANTHROPIC_BASE_URL, DEFAULT_GROQ_BASE_URL, DEFAULT_OPENAI_BASE_URL,
};

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub logging: LoggingConfig,
    pub fusion: FusionSettings,
    pub llm: LlmConfig,
    /// Default competitor roster, in competition order
    pub models: Vec<ModelSpec>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FusionSettings {
    /// Concurrent model chains in parallel competitions
    pub worker_count: usize,
    /// Directory export artifacts are written to
    pub export_dir: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Per-invocation limit; 0 disables it
    pub request_timeout_secs: u64,
    pub openai_base_url: String,
    pub anthropic_base_url: String,
    pub groq_base_url: String,
    /// Sent as a system message ahead of every prompt
    pub system_prompt: Option<String>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            logging: LoggingConfig::default(),
            fusion: FusionSettings::default(),
            llm: LlmConfig::default(),
            models: vec![
                ModelSpec::new(ProviderKind::Anthropic, "claude-3-5-sonnet-latest"),
                ModelSpec::new(ProviderKind::OpenAi, "gpt-4o"),
                ModelSpec::new(ProviderKind::OpenAi, "gpt-4o-mini"),
            ],
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl Default for FusionSettings {
    fn default() -> Self {
        Self {
            worker_count: 4,
            export_dir: ".".to_string(),
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: 120,
            openai_base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            anthropic_base_url: DEFAULT_ANTHROPIC_BASE_URL.to_string(),
            groq_base_url: DEFAULT_GROQ_BASE_URL.to_string(),
            system_prompt: None,
            temperature: None,
            max_tokens: None,
        }
    }
}

impl LlmConfig {
    pub fn base_url(&self, provider: ProviderKind) -> &str {
        match provider {
            ProviderKind::OpenAi => &self.openai_base_url,
            ProviderKind::Anthropic => &self.anthropic_base_url,
            ProviderKind::Groq => &self.groq_base_url,
        }
    }

    pub fn request_timeout(&self) -> Option<std::time::Duration> {
        (self.request_timeout_secs > 0)
            .then(|| std::time::Duration::from_secs(self.request_timeout_secs))
    }

    pub fn generation_options(&self) -> GenerationOptions {
        GenerationOptions {
            system_prompt: self.system_prompt.clone(),
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}
