//! Infrastructure layer - LLM providers and process-level setup

pub mod llm;
pub mod logging;
