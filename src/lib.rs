//! fusion-chain
//!
//! Prompt chaining for LLMs:
//! - Templates that pull in context values and earlier step outputs
//! - Fenced or bare JSON replies decoded into structured outputs
//! - Competitions running one chain against several models, scored by an evaluator
//! - Delimited text export of chain outputs

pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;
