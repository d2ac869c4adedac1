//! Structured run logging.
//!
//! Every lifecycle event of a pipeline run carries the run id, the
//! operation and the scene directory as structured fields.

use std::path::Path;
use tracing::{error, info, warn, Span};

use burns_models::RunId;

/// Logger bound to one pipeline run.
#[derive(Debug, Clone)]
pub struct RunLogger {
    run_id: String,
    operation: String,
    scene: String,
}

impl RunLogger {
    pub fn new(run_id: &RunId, operation: &str, scene_dir: &Path) -> Self {
        Self {
            run_id: run_id.to_string(),
            operation: operation.to_string(),
            scene: scene_dir.display().to_string(),
        }
    }

    pub fn log_start(&self, message: &str) {
        info!(
            run_id = %self.run_id,
            operation = %self.operation,
            scene = %self.scene,
            "Run started: {}", message
        );
    }

    /// Log the completion of one pipeline stage.
    pub fn log_stage(&self, stage: &str, message: &str) {
        info!(
            run_id = %self.run_id,
            operation = %self.operation,
            stage,
            "Stage {}: {}", stage, message
        );
    }

    pub fn log_warning(&self, message: &str) {
        warn!(
            run_id = %self.run_id,
            operation = %self.operation,
            "Run warning: {}", message
        );
    }

    pub fn log_error(&self, message: &str) {
        error!(
            run_id = %self.run_id,
            operation = %self.operation,
            scene = %self.scene,
            "Run error: {}", message
        );
    }

    pub fn log_completion(&self, message: &str) {
        info!(
            run_id = %self.run_id,
            operation = %self.operation,
            scene = %self.scene,
            "Run completed: {}", message
        );
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    pub fn operation(&self) -> &str {
        &self.operation
    }

    /// Span wrapping the whole run.
    pub fn create_span(&self) -> Span {
        tracing::info_span!(
            "run",
            run_id = %self.run_id,
            operation = %self.operation,
            scene = %self.scene
        )
    }
}
