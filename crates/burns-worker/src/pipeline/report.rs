//! Machine-readable run summary.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::PathBuf;

use burns_models::{EffectParams, RunId};

use super::state::StageOutcome;

/// What happened to one clip.
#[derive(Debug, Clone, Serialize)]
pub struct ClipReport {
    pub number: usize,
    pub image: PathBuf,
    pub duration: f64,
    pub frames: u32,
    pub effect: EffectParams,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Summary of a finished run.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineReport {
    pub run_id: RunId,
    pub scene_dir: PathBuf,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub narration_duration: f64,
    pub time_per_image: f64,
    pub clips: Vec<ClipReport>,
    pub audio_verified: bool,
    pub subtitles: StageOutcome,
    pub music: StageOutcome,
    pub deliverable: Option<PathBuf>,
    /// Intermediate files removed on success
    pub cleaned_up: usize,
}

impl PipelineReport {
    pub fn new(run_id: RunId, scene_dir: PathBuf) -> Self {
        Self {
            run_id,
            scene_dir,
            started_at: Utc::now(),
            finished_at: None,
            narration_duration: 0.0,
            time_per_image: 0.0,
            clips: Vec::new(),
            audio_verified: false,
            subtitles: StageOutcome::Skipped,
            music: StageOutcome::Skipped,
            deliverable: None,
            cleaned_up: 0,
        }
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    /// Wall-clock seconds between start and finish.
    pub fn elapsed_secs(&self) -> Option<f64> {
        self.finished_at
            .map(|end| (end - self.started_at).num_milliseconds() as f64 / 1000.0)
    }

    pub fn failed_clips(&self) -> usize {
        self.clips.iter().filter(|c| c.error.is_some()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_json_shape() {
        let mut report = PipelineReport::new(RunId::from_string("run-1"), PathBuf::from("/s"));
        report.deliverable = Some(PathBuf::from("/s/movie.mp4"));
        report.finish();

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["run_id"], "run-1");
        assert_eq!(json["subtitles"]["status"], "skipped");
        assert_eq!(json["deliverable"], "/s/movie.mp4");
        assert!(json["finished_at"].is_string());
        assert!(report.elapsed_secs().unwrap() >= 0.0);
        assert_eq!(report.failed_clips(), 0);
    }
}
