//! Per-step observation hooks
//!
//! The executor reports every completed step to an injected observer. Timing
//! data is also kept on the chain result itself.

use chrono::{DateTime, Utc};
use metrics::{counter, histogram};
use serde::Serialize;
use tracing::info;

use super::output::StepOutput;

/// Timing record for one executed step
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepTiming {
    /// Zero-based step index
    pub step: usize,
    /// When the model call started
    pub started_at: DateTime<Utc>,
    /// Model call latency in milliseconds
    pub latency_ms: u64,
}

/// Receives a notification after each chain step completes
#[cfg_attr(test, mockall::automock)]
pub trait StepObserver: Send + Sync {
    fn on_step(&self, prompt: &str, output: &StepOutput, timing: &StepTiming);
}

/// Observer that ignores every step
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl StepObserver for NoopObserver {
    fn on_step(&self, _prompt: &str, _output: &StepOutput, _timing: &StepTiming) {}
}

/// Logs a line per step through `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl StepObserver for TracingObserver {
    fn on_step(&self, prompt: &str, output: &StepOutput, timing: &StepTiming) {
        info!(
            step = timing.step,
            latency_ms = timing.latency_ms,
            prompt_chars = prompt.chars().count(),
            structured = output.is_structured(),
            "Chain step took {:.2} seconds",
            timing.latency_ms as f64 / 1000.0
        );
    }
}

/// Records step counts and latencies through the `metrics` facade
#[derive(Debug, Clone, Copy, Default)]
pub struct MetricsObserver;

impl StepObserver for MetricsObserver {
    fn on_step(&self, _prompt: &str, output: &StepOutput, timing: &StepTiming) {
        let kind = if output.is_structured() {
            "structured"
        } else {
            "text"
        };

        counter!("chain_steps_total", "output" => kind).increment(1);
        histogram!("chain_step_duration_seconds").record(timing.latency_ms as f64 / 1000.0);
    }
}
