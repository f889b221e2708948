//! Evaluator contract for model competitions
//!
//! An evaluator receives the final output of every competing model, aligned
//! to the caller's model order, and returns the winning output plus one score
//! per model in `[0, 1]`. Ties go to the model listed first; the orchestrator
//! does not check this, each evaluator is responsible for it.

use async_trait::async_trait;
use serde::Serialize;

use crate::domain::chain::StepOutput;
use crate::domain::DomainError;

/// Winner and per-model scores produced by an evaluator
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Evaluation {
    pub top_response: StepOutput,
    pub scores: Vec<f64>,
}

impl Evaluation {
    pub fn new(top_response: StepOutput, scores: Vec<f64>) -> Self {
        Self {
            top_response,
            scores,
        }
    }
}

/// Scores the final outputs of competing models
#[async_trait]
pub trait Evaluator: Send + Sync {
    async fn evaluate(&self, outputs: &[StepOutput]) -> Result<Evaluation, DomainError>;
}

/// Evaluator created from a closure
pub struct FnEvaluator<F>(pub F);

#[async_trait]
impl<F> Evaluator for FnEvaluator<F>
where
    F: Fn(&[StepOutput]) -> Result<Evaluation, DomainError> + Send + Sync,
{
    async fn evaluate(&self, outputs: &[StepOutput]) -> Result<Evaluation, DomainError> {
        (self.0)(outputs)
    }
}

/// Prefers the longest final output
///
/// Scores are each output's length relative to the longest one.
#[derive(Debug, Clone, Copy, Default)]
pub struct LongestOutputEvaluator;

#[async_trait]
impl Evaluator for LongestOutputEvaluator {
    async fn evaluate(&self, outputs: &[StepOutput]) -> Result<Evaluation, DomainError> {
        let lengths: Vec<usize> = outputs
            .iter()
            .map(|output| output.to_text().chars().count())
            .collect();

        let longest = lengths.iter().copied().max().ok_or_else(|| {
            DomainError::validation("Cannot evaluate an empty list of outputs")
        })?;

        // `position` keeps the earliest model on ties
        let winner = lengths.iter().position(|&len| len == longest).unwrap_or(0);

        let scores = lengths
            .iter()
            .map(|&len| {
                if longest == 0 {
                    0.0
                } else {
                    len as f64 / longest as f64
                }
            })
            .collect();

        Ok(Evaluation::new(outputs[winner].clone(), scores))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_longest_output_wins() {
        let outputs = vec![
            StepOutput::from("short"),
            StepOutput::from("a much longer answer"),
            StepOutput::from("mid length"),
        ];

        let evaluation = LongestOutputEvaluator.evaluate(&outputs).await.unwrap();

        assert_eq!(evaluation.top_response, outputs[1]);
        assert_eq!(evaluation.scores[1], 1.0);
        assert_eq!(evaluation.scores[0], 0.25);
    }

    #[tokio::test]
    async fn test_longest_output_tie_goes_to_first_model() {
        let outputs = vec![StepOutput::from("same"), StepOutput::from("SAME")];

        let evaluation = LongestOutputEvaluator.evaluate(&outputs).await.unwrap();

        assert_eq!(evaluation.top_response, StepOutput::from("same"));
        assert_eq!(evaluation.scores, vec![1.0, 1.0]);
    }

    #[tokio::test]
    async fn test_longest_output_measures_structured_text() {
        let outputs = vec![StepOutput::from(json!({"k": 1})), StepOutput::from("tiny")];

        let evaluation = LongestOutputEvaluator.evaluate(&outputs).await.unwrap();

        assert_eq!(evaluation.top_response, StepOutput::from(json!({"k": 1})));
    }

    #[tokio::test]
    async fn test_longest_output_rejects_empty_input() {
        let result = LongestOutputEvaluator.evaluate(&[]).await;
        assert!(matches!(result, Err(DomainError::Validation { .. })));
    }

    #[tokio::test]
    async fn test_fn_evaluator() {
        let evaluator = FnEvaluator(|outputs: &[StepOutput]| -> Result<Evaluation, DomainError> {
            Ok(Evaluation::new(outputs[0].clone(), vec![0.5; outputs.len()]))
        });

        let evaluation = evaluator
            .evaluate(&[StepOutput::from("a"), StepOutput::from("b")])
            .await
            .unwrap();

        assert_eq!(evaluation.top_response, StepOutput::from("a"));
        assert_eq!(evaluation.scores, vec![0.5, 0.5]);
    }
}
