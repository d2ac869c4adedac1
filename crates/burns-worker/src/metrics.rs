//! Pipeline metrics.
//!
//! Recorded through the `metrics` facade; nothing is exported unless the
//! binary installs a recorder.

use std::path::Path;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

/// Metric names as constants for consistency.
pub mod names {
    pub const STAGE_DURATION_SECONDS: &str = "burns_stage_duration_seconds";
    pub const CLIPS_RENDERED_TOTAL: &str = "burns_clips_rendered_total";
    pub const CLIPS_FAILED_TOTAL: &str = "burns_clips_failed_total";
    pub const STAGE_DEGRADED_TOTAL: &str = "burns_stage_degraded_total";
    pub const RUNS_COMPLETED_TOTAL: &str = "burns_runs_completed_total";
    pub const RUNS_FAILED_TOTAL: &str = "burns_runs_failed_total";
}

/// Install the Prometheus recorder without an HTTP listener.
pub fn init_recorder() -> Result<PrometheusHandle, String> {
    PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| e.to_string())
}

/// Write the rendered text exposition to `path`.
pub async fn write_snapshot(handle: &PrometheusHandle, path: &Path) -> std::io::Result<()> {
    tokio::fs::write(path, handle.render()).await
}

pub fn record_stage_duration(stage: &'static str, duration_secs: f64) {
    histogram!(names::STAGE_DURATION_SECONDS, "stage" => stage).record(duration_secs);
}

pub fn record_clip_rendered() {
    counter!(names::CLIPS_RENDERED_TOTAL).increment(1);
}

pub fn record_clip_failed() {
    counter!(names::CLIPS_FAILED_TOTAL).increment(1);
}

/// A non-fatal stage failed and the deliverable fell back.
pub fn record_stage_degraded(stage: &'static str) {
    counter!(names::STAGE_DEGRADED_TOTAL, "stage" => stage).increment(1);
}

pub fn record_run_completed() {
    counter!(names::RUNS_COMPLETED_TOTAL).increment(1);
}

pub fn record_run_failed(kind: &'static str) {
    counter!(names::RUNS_FAILED_TOTAL, "kind" => kind).increment(1);
}
