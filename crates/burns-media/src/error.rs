//! Error types for media operations.

use std::path::PathBuf;
use thiserror::Error;

use crate::filters::FilterError;
use crate::silence::SilenceReason;
use crate::srt::SrtError;

/// Result type for media operations.
pub type MediaResult<T> = Result<T, MediaError>;

/// Errors that can occur during media processing.
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("FFmpeg not found in PATH")]
    FfmpegNotFound,

    #[error("FFprobe not found in PATH")]
    FfprobeNotFound,

    #[error("FFmpeg command failed: {message}")]
    FfmpegFailed {
        message: String,
        command: Option<String>,
        stderr: Option<String>,
        exit_code: Option<i32>,
    },

    #[error("FFprobe command failed: {message}")]
    FfprobeFailed {
        message: String,
        stderr: Option<String>,
    },

    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Missing clips: {}", display_paths(.0))]
    MissingClips(Vec<PathBuf>),

    #[error("Narration audio {} is silent or invalid: {reason}", path.display())]
    SilentAudio { path: PathBuf, reason: SilenceReason },

    #[error("Invalid filter: {0}")]
    InvalidFilter(#[from] FilterError),

    #[error("Invalid subtitles: {0}")]
    InvalidSubtitles(#[from] SrtError),

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Operation timed out after {0} seconds")]
    Timeout(u64),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("Invalid media file: {0}")]
    InvalidMedia(String),
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

impl MediaError {
    /// Create an FFmpeg failure error.
    pub fn ffmpeg_failed(
        message: impl Into<String>,
        stderr: Option<String>,
        exit_code: Option<i32>,
    ) -> Self {
        Self::FfmpegFailed {
            message: message.into(),
            command: None,
            stderr,
            exit_code,
        }
    }

    /// Attach the rendered command line to an FFmpeg failure.
    pub fn with_command(self, command_line: impl Into<String>) -> Self {
        match self {
            Self::FfmpegFailed {
                message,
                stderr,
                exit_code,
                ..
            } => Self::FfmpegFailed {
                message,
                command: Some(command_line.into()),
                stderr,
                exit_code,
            },
            other => other,
        }
    }

    /// Create an invalid media error.
    pub fn invalid_media(message: impl Into<String>) -> Self {
        Self::InvalidMedia(message.into())
    }

    /// Diagnostic context (command line and encoder output) if any was captured.
    pub fn diagnostics(&self) -> Option<String> {
        match self {
            Self::FfmpegFailed {
                command, stderr, ..
            } => {
                let mut out = String::new();
                if let Some(cmd) = command {
                    out.push_str("command: ");
                    out.push_str(cmd);
                }
                if let Some(stderr) = stderr.as_deref().filter(|s| !s.trim().is_empty()) {
                    if !out.is_empty() {
                        out.push('\n');
                    }
                    out.push_str("stderr: ");
                    out.push_str(stderr.trim());
                }
                (!out.is_empty()).then_some(out)
            }
            Self::FfprobeFailed { stderr, .. } => stderr.clone(),
            _ => None,
        }
    }
}
