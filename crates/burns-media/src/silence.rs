//! Narration silence detection.
//!
//! Audio is rejected when its duration is zero or unreadable, or when the
//! mean volume reported by FFmpeg's `volumedetect` filter is below
//! [`SILENCE_THRESHOLD_DB`].

use serde::Serialize;
use std::fmt;
use std::path::Path;
use tracing::{debug, warn};

use crate::command::{CommandExecutor, FfmpegCommand};
use crate::probe::probe_duration;

/// Mean volume below which narration counts as silent.
pub const SILENCE_THRESHOLD_DB: f64 = -60.0;

/// Why narration audio was rejected.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SilenceReason {
    Missing,
    Unreadable,
    ZeroDuration,
    BelowThreshold { mean_volume_db: f64, threshold_db: f64 },
}

impl fmt::Display for SilenceReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SilenceReason::Missing => write!(f, "file not found"),
            SilenceReason::Unreadable => write!(f, "duration could not be read"),
            SilenceReason::ZeroDuration => write!(f, "duration is zero"),
            SilenceReason::BelowThreshold {
                mean_volume_db,
                threshold_db,
            } => write!(
                f,
                "mean volume {:.1} dB is below {:.1} dB",
                mean_volume_db, threshold_db
            ),
        }
    }
}

/// Outcome of checking a narration file.
#[derive(Debug, Clone, PartialEq)]
pub enum AudioCheck {
    Audible {
        duration: f64,
        /// `None` when volume analysis produced no reading
        mean_volume_db: Option<f64>,
    },
    Silent(SilenceReason),
}

impl AudioCheck {
    pub fn is_silent(&self) -> bool {
        matches!(self, AudioCheck::Silent(_))
    }
}

/// Classify narration audio as audible or silent/invalid.
pub async fn check_narration(
    executor: &dyn CommandExecutor,
    audio: &Path,
    threshold_db: f64,
) -> AudioCheck {
    if !audio.exists() {
        return AudioCheck::Silent(SilenceReason::Missing);
    }

    let duration = match probe_duration(executor, audio).await {
        Ok(d) if d <= 0.0 => return AudioCheck::Silent(SilenceReason::ZeroDuration),
        Ok(d) => d,
        Err(e) => {
            debug!(path = %audio.display(), error = %e, "Narration duration unreadable");
            return AudioCheck::Silent(SilenceReason::Unreadable);
        }
    };

    let cmd = FfmpegCommand::analyze(audio).audio_filter("volumedetect");
    let mean_volume_db = match executor.ffmpeg(&cmd).await {
        Ok(output) => parse_mean_volume(&output.stderr),
        Err(e) => {
            // Analysis failure is not evidence of silence
            warn!(path = %audio.display(), error = %e, "Volume analysis failed");
            None
        }
    };

    match mean_volume_db {
        Some(db) if db < threshold_db => AudioCheck::Silent(SilenceReason::BelowThreshold {
            mean_volume_db: db,
            threshold_db,
        }),
        _ => AudioCheck::Audible {
            duration,
            mean_volume_db,
        },
    }
}

/// Extract `mean_volume: -23.4 dB` from `volumedetect` output.
pub fn parse_mean_volume(stderr: &str) -> Option<f64> {
    stderr.lines().find_map(|line| {
        let (_, rest) = line.split_once("mean_volume:")?;
        let value = rest.split_whitespace().next()?;
        value.trim_end_matches("dB").parse::<f64>().ok()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::FakeExecutor;
    use tempfile::TempDir;

    #[test]
    fn test_parse_mean_volume() {
        let stderr = "\
[Parsed_volumedetect_0 @ 0x5581] n_samples: 529200
[Parsed_volumedetect_0 @ 0x5581] mean_volume: -23.4 dB
[Parsed_volumedetect_0 @ 0x5581] max_volume: -4.0 dB";
        assert_eq!(parse_mean_volume(stderr), Some(-23.4));
        assert_eq!(parse_mean_volume("mean_volume: -inf dB"), Some(f64::NEG_INFINITY));
        assert_eq!(parse_mean_volume("no analysis here"), None);
    }

    #[tokio::test]
    async fn test_missing_file_is_silent() {
        let fake = FakeExecutor::default();
        let check = check_narration(&fake, Path::new("/nonexistent/speech.mp3"), -60.0).await;
        assert_eq!(check, AudioCheck::Silent(SilenceReason::Missing));
        assert_eq!(fake.invocation_count(), 0);
    }

    #[tokio::test]
    async fn test_zero_duration_is_silent() {
        let dir = TempDir::new().unwrap();
        let audio = dir.path().join("speech.mp3");
        std::fs::write(&audio, b"id3").unwrap();

        let fake = FakeExecutor {
            duration: Some(0.0),
            ..Default::default()
        };
        let check = check_narration(&fake, &audio, -60.0).await;
        assert_eq!(check, AudioCheck::Silent(SilenceReason::ZeroDuration));
        assert!(fake.ffmpeg_calls().is_empty());
    }

    #[tokio::test]
    async fn test_unreadable_duration_is_silent() {
        let dir = TempDir::new().unwrap();
        let audio = dir.path().join("speech.mp3");
        std::fs::write(&audio, b"garbage").unwrap();

        let fake = FakeExecutor {
            duration: None,
            ..Default::default()
        };
        let check = check_narration(&fake, &audio, -60.0).await;
        assert_eq!(check, AudioCheck::Silent(SilenceReason::Unreadable));
    }

    #[tokio::test]
    async fn test_quiet_audio_is_silent() {
        let dir = TempDir::new().unwrap();
        let audio = dir.path().join("speech.mp3");
        std::fs::write(&audio, b"id3").unwrap();

        let fake = FakeExecutor {
            mean_volume_db: Some(-72.5),
            ..Default::default()
        };
        let check = check_narration(&fake, &audio, -60.0).await;
        assert!(check.is_silent());
        assert!(matches!(
            check,
            AudioCheck::Silent(SilenceReason::BelowThreshold { mean_volume_db, .. }) if mean_volume_db == -72.5
        ));
    }

    #[tokio::test]
    async fn test_normal_audio_is_audible() {
        let dir = TempDir::new().unwrap();
        let audio = dir.path().join("speech.mp3");
        std::fs::write(&audio, b"id3").unwrap();

        let fake = FakeExecutor::default();
        let check = check_narration(&fake, &audio, -60.0).await;
        assert_eq!(
            check,
            AudioCheck::Audible {
                duration: 12.0,
                mean_volume_db: Some(-20.0)
            }
        );
    }
}
