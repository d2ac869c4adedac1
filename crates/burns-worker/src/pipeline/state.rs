//! Per-run pipeline state.

use serde::Serialize;
use std::path::{Path, PathBuf};

/// Outcome of an optional stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Default)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum StageOutcome {
    /// Stage input was absent, nothing attempted
    #[default]
    Skipped,
    /// Stage wrote this file
    Succeeded(PathBuf),
    /// Stage ran and failed with this reason
    Failed(String),
}

impl StageOutcome {
    pub fn output(&self) -> Option<&Path> {
        match self {
            StageOutcome::Succeeded(path) => Some(path),
            _ => None,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, StageOutcome::Failed(_))
    }

    pub fn label(&self) -> &'static str {
        match self {
            StageOutcome::Skipped => "skipped",
            StageOutcome::Succeeded(_) => "succeeded",
            StageOutcome::Failed(_) => "failed",
        }
    }
}

/// Transient state of one run, owned by the orchestrator.
#[derive(Debug, Clone, Default)]
pub struct PipelineState {
    /// Expected clip paths in image order
    pub clip_paths: Vec<PathBuf>,
    pub manifest: Option<PathBuf>,
    pub temp_video: Option<PathBuf>,
    /// Narration-muxed video
    pub movie: Option<PathBuf>,
    pub trimmed_music: Option<PathBuf>,
    pub subtitles: StageOutcome,
    pub music: StageOutcome,
}

impl PipelineState {
    /// Video the music stage mixes under.
    ///
    /// The subtitled movie only when burn-in succeeded; skipped and failed
    /// burn-in both fall back to the muxed movie.
    pub fn music_input(&self) -> Option<&Path> {
        self.subtitles.output().or(self.movie.as_deref())
    }

    /// Most finished video produced so far.
    pub fn deliverable(&self) -> Option<&Path> {
        self.music.output().or_else(|| self.music_input())
    }

    /// Core-owned files removed after a successful run.
    pub fn intermediates(&self) -> Vec<PathBuf> {
        self.clip_paths
            .iter()
            .cloned()
            .chain(self.manifest.clone())
            .chain(self.trimmed_music.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn muxed() -> PipelineState {
        PipelineState {
            movie: Some(PathBuf::from("/s/movie.mp4")),
            ..Default::default()
        }
    }

    #[test]
    fn test_music_input_when_subtitles_skipped() {
        let state = muxed();
        assert_eq!(state.music_input(), Some(Path::new("/s/movie.mp4")));
    }

    #[test]
    fn test_music_input_when_subtitles_failed() {
        let state = PipelineState {
            subtitles: StageOutcome::Failed("encoder exited 1".into()),
            ..muxed()
        };
        assert_eq!(state.music_input(), Some(Path::new("/s/movie.mp4")));
    }

    #[test]
    fn test_music_input_when_subtitles_succeeded() {
        let state = PipelineState {
            subtitles: StageOutcome::Succeeded(PathBuf::from("/s/movie_subtitled.mp4")),
            ..muxed()
        };
        assert_eq!(
            state.music_input(),
            Some(Path::new("/s/movie_subtitled.mp4"))
        );
        assert_eq!(
            state.deliverable(),
            Some(Path::new("/s/movie_subtitled.mp4"))
        );
    }

    #[test]
    fn test_deliverable_prefers_music_output() {
        let state = PipelineState {
            music: StageOutcome::Succeeded(PathBuf::from("/s/movie_final.mp4")),
            ..muxed()
        };
        assert_eq!(state.deliverable(), Some(Path::new("/s/movie_final.mp4")));
    }

    #[test]
    fn test_intermediates() {
        let state = PipelineState {
            clip_paths: vec![PathBuf::from("/s/temp_clip_01.mp4")],
            manifest: Some(PathBuf::from("/s/concat_list.txt")),
            trimmed_music: Some(PathBuf::from("/s/music_trimmed.mp3")),
            ..muxed()
        };
        assert_eq!(state.intermediates().len(), 3);
    }

    #[test]
    fn test_outcome_serializes_tagged() {
        let json = serde_json::to_value(StageOutcome::Failed("bad srt".into())).unwrap();
        assert_eq!(json["status"], "failed");
        assert_eq!(json["detail"], "bad srt");
        let json = serde_json::to_value(StageOutcome::Skipped).unwrap();
        assert_eq!(json["status"], "skipped");
    }
}
