//! Model competitions - one chain, several models, one winner

mod evaluator;
mod orchestrator;
mod result;

pub use evaluator::{Evaluation, Evaluator, FnEvaluator, LongestOutputEvaluator};
pub use orchestrator::{FusionChain, FusionConfig};
pub use result::FusionChainResult;
