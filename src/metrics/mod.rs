use std::time::{Duration, Instant};
use tracing::info;

use crate::models::{PipelineState, RunReport};

/// Timing and counts for one pipeline stage, emitted as structured fields
#[derive(Debug, Clone)]
pub struct StageMetrics {
    pub stage: PipelineState,
    pub input: usize,
    pub output: usize,
    pub dropped: usize,
    pub elapsed: Duration,
}

/// Measures a stage from construction until `finish`
pub struct StageTimer {
    stage: PipelineState,
    started: Instant,
}

impl StageTimer {
    pub fn start(stage: PipelineState) -> Self {
        Self {
            stage,
            started: Instant::now(),
        }
    }

    pub fn finish(self, input: usize, output: usize, dropped: usize) -> StageMetrics {
        let metrics = StageMetrics {
            stage: self.stage,
            input,
            output,
            dropped,
            elapsed: self.started.elapsed(),
        };
        metrics.log();
        metrics
    }
}

impl StageMetrics {
    pub fn log(&self) {
        info!(
            stage = %self.stage,
            input = self.input,
            output = self.output,
            dropped = self.dropped,
            elapsed_ms = self.elapsed.as_millis() as u64,
            "Stage completed"
        );
    }
}

/// Summary line for a finished run
pub fn log_run_summary(report: &RunReport) {
    info!(
        source = %report.source_url,
        state = %report.final_state,
        extracted = report.extracted,
        strategy = ?report.extraction_strategy,
        fallback_used = report.fallback_used,
        filtered_out = report.filtered_out,
        enriched = report.enriched,
        unparseable = report.unparseable_addresses,
        documents = report.documents.len(),
        "Run finished"
    );
}
