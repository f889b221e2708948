//! Step outputs and interpretation of raw model text
//!
//! A model reply is kept as structured JSON when it decodes as such, either
//! inside a markdown fence (```` ```json ... ``` ````) or as the whole text.
//! Anything else stays as the original text.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use serde_json::{Map, Value};

/// Regex for a fenced code block, optionally tagged `json`
static FENCED_BLOCK_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"```(?:json)?\s*([\s\S]*?)\s*```").unwrap());

/// The interpreted result of one chain step
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum StepOutput {
    /// Reply decoded as JSON
    Structured(Value),
    /// Reply kept verbatim
    Text(String),
}

impl StepOutput {
    /// Interpret a raw model reply
    ///
    /// A fenced block takes precedence over the whole text. If the fenced
    /// content does not decode, the reply is kept as text without trying the
    /// whole text.
    pub fn interpret(raw: &str) -> Self {
        let candidate = match FENCED_BLOCK_PATTERN.captures(raw) {
            Some(caps) => caps.get(1).map_or("", |m| m.as_str()),
            None => raw,
        };

        match serde_json::from_str::<Value>(candidate) {
            Ok(value) => Self::Structured(value),
            Err(_) => Self::Text(raw.to_string()),
        }
    }

    pub fn is_structured(&self) -> bool {
        matches!(self, Self::Structured(_))
    }

    pub fn as_structured(&self) -> Option<&Value> {
        match self {
            Self::Structured(value) => Some(value),
            Self::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Structured(_) => None,
        }
    }

    /// Fields of a structured record, if this output is a JSON object
    pub fn fields(&self) -> Option<&Map<String, Value>> {
        self.as_structured().and_then(Value::as_object)
    }

    /// Text form used for prompt substitution and export
    ///
    /// Structured outputs render as compact JSON, except bare strings,
    /// numbers and booleans which render by their natural form.
    pub fn to_text(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::Structured(value) => value_text(value),
        }
    }
}

impl fmt::Display for StepOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}

impl From<String> for StepOutput {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<&str> for StepOutput {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<Value> for StepOutput {
    fn from(value: Value) -> Self {
        Self::Structured(value)
    }
}

/// Convert a JSON value to the string substituted into prompts
pub(crate) fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Null => "null".to_string(),

        // Arrays and objects use their compact JSON encoding
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}
