//! Pipeline error types.

use std::path::PathBuf;
use thiserror::Error;

use burns_media::{MediaError, SilenceReason};

pub type PipelineResult<T> = Result<T, PipelineError>;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("No images found in {}", .0.display())]
    NoImages(PathBuf),

    #[error("Clip {number} ({}) failed to render: {source}", image.display())]
    ClipRender {
        number: usize,
        image: PathBuf,
        #[source]
        source: MediaError,
    },

    #[error("{} clip(s) missing before concatenation", .0.len())]
    MissingClip(Vec<PathBuf>),

    #[error("Concatenation failed: {0}")]
    ConcatFailed(#[source] MediaError),

    #[error("Narration {} is silent or invalid: {reason}", path.display())]
    SilentAudio { path: PathBuf, reason: SilenceReason },

    #[error("Muxing narration failed: {0}")]
    MuxFailed(#[source] MediaError),

    #[error("Subtitle burn-in failed: {0}")]
    SubtitleBurn(#[source] MediaError),

    #[error("Music mix failed: {0}")]
    MusicMix(#[source] MediaError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Media error: {0}")]
    Media(#[from] MediaError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl PipelineError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Map a concatenation-stage media error onto the taxonomy.
    pub fn from_concat(err: MediaError) -> Self {
        match err {
            MediaError::MissingClips(paths) => Self::MissingClip(paths),
            other => Self::ConcatFailed(other),
        }
    }

    /// Map a mux-stage media error onto the taxonomy.
    pub fn from_mux(err: MediaError) -> Self {
        match err {
            MediaError::SilentAudio { path, reason } => Self::SilentAudio { path, reason },
            other => Self::MuxFailed(other),
        }
    }

    /// Whether the run must abort.
    ///
    /// Subtitle and music failures only degrade the deliverable. A single
    /// clip render failure is collected and surfaces as [`Self::MissingClip`].
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            PipelineError::SubtitleBurn(_)
                | PipelineError::MusicMix(_)
                | PipelineError::ClipRender { .. }
        )
    }

    /// Failing command and encoder output, when captured.
    pub fn diagnostics(&self) -> Option<String> {
        match self {
            PipelineError::ClipRender { source, .. }
            | PipelineError::ConcatFailed(source)
            | PipelineError::MuxFailed(source)
            | PipelineError::SubtitleBurn(source)
            | PipelineError::MusicMix(source)
            | PipelineError::Media(source) => source.diagnostics(),
            PipelineError::MissingClip(paths) => Some(
                paths
                    .iter()
                    .map(|p| format!("missing: {}", p.display()))
                    .collect::<Vec<_>>()
                    .join("\n"),
            ),
            _ => None,
        }
    }

    /// Short stable name for logs and metrics labels.
    pub fn kind(&self) -> &'static str {
        match self {
            PipelineError::NoImages(_) => "no_images",
            PipelineError::ClipRender { .. } => "clip_render",
            PipelineError::MissingClip(_) => "missing_clip",
            PipelineError::ConcatFailed(_) => "concat_failed",
            PipelineError::SilentAudio { .. } => "silent_audio",
            PipelineError::MuxFailed(_) => "mux_failed",
            PipelineError::SubtitleBurn(_) => "subtitle_burn",
            PipelineError::MusicMix(_) => "music_mix",
            PipelineError::Config(_) => "config",
            PipelineError::Media(_) => "media",
            PipelineError::Io(_) => "io",
        }
    }
}
