//! Chain context and prompt template resolution
//!
//! Supports placeholders in prompt templates:
//! - `{{key}}` - Context value
//! - `{{output[-N]}}` - Whole output of the step N positions back
//! - `{{output[-N].field}}` - Field of a structured output N positions back
//!
//! Placeholders without a matching key or step are left in place.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};

use super::output::{value_text, StepOutput};
use crate::domain::DomainError;

/// Regex for any `{{...}}` placeholder still present after resolution
static PLACEHOLDER_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{\{[^{}]+\}\}").unwrap());

/// Caller-supplied values available to every step of a chain
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChainContext {
    values: Map<String, Value>,
}

impl ChainContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a context from a JSON object
    pub fn from_value(value: Value) -> Result<Self, DomainError> {
        match value {
            Value::Object(values) => Ok(Self { values }),
            other => Err(DomainError::validation(format!(
                "Chain context must be a JSON object, got: {}",
                other
            ))),
        }
    }

    /// Add a value, keeping insertion order
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.values.iter()
    }

    /// Resolve one prompt template against this context and prior outputs
    ///
    /// Context values are substituted first, then back-references from the
    /// farthest prior output to the nearest.
    pub fn resolve_prompt(&self, template: &str, outputs: &[StepOutput]) -> String {
        let mut prompt = template.to_string();

        for (key, value) in &self.values {
            let token = format!("{{{{{}}}}}", key);

            if prompt.contains(&token) {
                prompt = prompt.replace(&token, &value_text(value));
            }
        }

        for back in (1..=outputs.len()).rev() {
            let previous = &outputs[outputs.len() - back];

            let token = format!("{{{{output[-{}]}}}}", back);
            if prompt.contains(&token) {
                prompt = prompt.replace(&token, &previous.to_text());
            }

            if let Some(fields) = previous.fields() {
                for (field, value) in fields {
                    let token = format!("{{{{output[-{}].{}}}}}", back, field);

                    if prompt.contains(&token) {
                        prompt = prompt.replace(&token, &value_text(value));
                    }
                }
            }
        }

        prompt
    }

    /// List placeholders left unresolved in a prompt, in order of appearance
    pub fn unresolved_placeholders(prompt: &str) -> Vec<String> {
        PLACEHOLDER_PATTERN
            .find_iter(prompt)
            .map(|m| m.as_str().to_string())
            .collect()
    }
}

impl From<Map<String, Value>> for ChainContext {
    fn from(values: Map<String, Value>) -> Self {
        Self { values }
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for ChainContext {
    fn from_iter<T: IntoIterator<Item = (K, Value)>>(iter: T) -> Self {
        Self {
            values: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_context_substitution_replaces_every_occurrence() {
        let ctx = ChainContext::new().with("topic", "cats");

        let result = ctx.resolve_prompt("{{topic}}, {{topic}} and more {{topic}}", &[]);
        assert_eq!(result, "cats, cats and more cats");
    }

    #[test]
    fn test_context_value_text_forms() {
        let ctx = ChainContext::new()
            .with("count", 3)
            .with("enabled", true)
            .with("tags", json!(["a", "b"]))
            .with("meta", json!({"k": "v"}));

        let result = ctx.resolve_prompt("{{count}} {{enabled}} {{tags}} {{meta}}", &[]);
        assert_eq!(result, r#"3 true ["a","b"] {"k":"v"}"#);
    }

    #[test]
    fn test_back_references_select_relative_outputs() {
        let ctx = ChainContext::new();
        let outputs = vec![
            StepOutput::from("A"),
            StepOutput::from("B"),
            StepOutput::from("C"),
        ];

        let result = ctx.resolve_prompt("{{output[-1]}} {{output[-2]}} {{output[-3]}}", &outputs);
        assert_eq!(result, "C B A");
    }

    #[test]
    fn test_structured_field_back_reference() {
        let ctx = ChainContext::new();
        let outputs = vec![StepOutput::from("intro"), StepOutput::from(json!({"x": 5}))];

        let result = ctx.resolve_prompt("x is {{output[-1].x}}", &outputs);
        assert_eq!(result, "x is 5");
    }

    #[test]
    fn test_structured_whole_output_is_compact_json() {
        let ctx = ChainContext::new();
        let outputs = vec![StepOutput::from(json!({"title": "Cats", "score": 9}))];

        let result = ctx.resolve_prompt("Data: {{output[-1]}}", &outputs);
        assert_eq!(result, r#"Data: {"title":"Cats","score":9}"#);
    }

    #[test]
    fn test_unresolved_tokens_left_verbatim() {
        let ctx = ChainContext::new().with("known", "yes");
        let outputs = vec![StepOutput::from("only")];

        let result = ctx.resolve_prompt(
            "{{known}} {{unknown}} {{output[-2]}} {{output[-1].field}}",
            &outputs,
        );
        assert_eq!(result, "yes {{unknown}} {{output[-2]}} {{output[-1].field}}");
        assert_eq!(
            ChainContext::unresolved_placeholders(&result),
            vec!["{{unknown}}", "{{output[-2]}}", "{{output[-1].field}}"]
        );
    }

    #[test]
    fn test_context_substituted_before_back_references() {
        // A context value carrying a back-reference token is expanded afterwards
        let ctx = ChainContext::new().with("previous", "{{output[-1]}}");
        let outputs = vec![StepOutput::from("earlier answer")];

        let result = ctx.resolve_prompt("Refine: {{previous}}", &outputs);
        assert_eq!(result, "Refine: earlier answer");
    }

    #[test]
    fn test_from_value_requires_object() {
        let ctx = ChainContext::from_value(json!({"topic": "cats"})).unwrap();
        assert_eq!(ctx.get("topic"), Some(&json!("cats")));
        assert_eq!(ctx.len(), 1);

        let err = ChainContext::from_value(json!(["not", "an", "object"]));
        assert!(matches!(err, Err(DomainError::Validation { .. })));
    }

    #[test]
    fn test_no_placeholders() {
        assert!(ChainContext::unresolved_placeholders("No variables here").is_empty());
        assert!(ChainContext::unresolved_placeholders("{single} braces").is_empty());
    }
}
