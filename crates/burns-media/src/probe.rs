//! FFprobe duration and stream queries.

use serde::Deserialize;
use std::path::Path;
use tracing::warn;

use crate::command::{CommandExecutor, FfprobeCommand};
use crate::error::{MediaError, MediaResult};

/// Duration assumed when a file's metadata cannot be read.
pub const FALLBACK_DURATION_SECS: f64 = 30.0;

/// FFprobe JSON output format.
#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    format: FfprobeFormat,
}

#[derive(Debug, Deserialize)]
struct FfprobeFormat {
    duration: Option<String>,
}

/// Probe a media file's container duration in seconds.
pub async fn probe_duration(
    executor: &dyn CommandExecutor,
    path: impl AsRef<Path>,
) -> MediaResult<f64> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(MediaError::FileNotFound(path.to_path_buf()));
    }

    let cmd = FfprobeCommand::new(path).format_json();
    let output = executor.ffprobe(&cmd).await?;

    parse_duration_json(&output.stdout)
}

/// Probe a file's duration, falling back to [`FALLBACK_DURATION_SECS`].
///
/// Never fails: duration is advisory everywhere this is used.
pub async fn duration_or_fallback(executor: &dyn CommandExecutor, path: impl AsRef<Path>) -> f64 {
    let path = path.as_ref();
    match probe_duration(executor, path).await {
        Ok(duration) => duration,
        Err(e) => {
            warn!(
                path = %path.display(),
                error = %e,
                fallback = FALLBACK_DURATION_SECS,
                "Failed to probe duration, using fallback"
            );
            FALLBACK_DURATION_SECS
        }
    }
}

/// Whether the container has at least one audio stream.
pub async fn has_audio_stream(
    executor: &dyn CommandExecutor,
    path: impl AsRef<Path>,
) -> MediaResult<bool> {
    let cmd = FfprobeCommand::new(path.as_ref())
        .select_streams("a")
        .show_entries("stream=codec_name,duration")
        .output_format("csv=p=0");

    let output = executor.ffprobe(&cmd).await?;
    Ok(!output.stdout.trim().is_empty())
}

fn parse_duration_json(stdout: &str) -> MediaResult<f64> {
    let probe: FfprobeOutput = serde_json::from_str(stdout)?;

    probe
        .format
        .duration
        .as_deref()
        .and_then(|d| d.trim().parse::<f64>().ok())
        .filter(|d| d.is_finite() && *d >= 0.0)
        .ok_or_else(|| MediaError::invalid_media("container reports no duration"))
}
