//! Application configuration

mod app_config;

pub use app_config::{AppConfig, FusionSettings, LlmConfig, LogFormat, LoggingConfig};
