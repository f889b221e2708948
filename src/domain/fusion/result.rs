//! Competition result

use serde::Serialize;

use crate::domain::chain::{StepOutput, StepTiming};

/// Outcome of running one chain against several competing models
///
/// Every per-model sequence is aligned to the order the models were given in.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FusionChainResult {
    /// Winning output chosen by the evaluator
    pub top_response: StepOutput,
    /// Every step output, per model
    pub all_prompt_responses: Vec<Vec<StepOutput>>,
    /// Every resolved prompt, per model
    pub all_context_filled_prompts: Vec<Vec<String>>,
    /// Evaluator score, per model
    pub performance_scores: Vec<f64>,
    /// Display name, per model
    pub chain_model_names: Vec<String>,
    /// Step timings, per model
    pub all_step_timings: Vec<Vec<StepTiming>>,
}

impl FusionChainResult {
    pub fn model_count(&self) -> usize {
        self.chain_model_names.len()
    }

    /// Model names paired with their scores
    pub fn scores_by_model(&self) -> Vec<(&str, f64)> {
        self.chain_model_names
            .iter()
            .map(String::as_str)
            .zip(self.performance_scores.iter().copied())
            .collect()
    }

    /// Final output of the named model
    pub fn final_output_of(&self, model_name: &str) -> Option<&StepOutput> {
        let index = self
            .chain_model_names
            .iter()
            .position(|name| name == model_name)?;

        self.all_prompt_responses.get(index)?.last()
    }
}
