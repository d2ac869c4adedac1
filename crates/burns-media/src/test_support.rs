//! Scripted executor for stage tests.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::command::{CommandExecutor, FfmpegCommand, FfprobeCommand, ProcessOutput};
use crate::error::{MediaError, MediaResult};

/// Records every invocation and fakes encoder behavior.
///
/// FFmpeg calls create their output file; ffprobe calls answer from the
/// configured duration and stream presence.
pub(crate) struct FakeExecutor {
    /// Container duration reported by ffprobe; `None` makes probing fail
    pub duration: Option<f64>,
    /// Mean volume printed by `volumedetect`
    pub mean_volume_db: Option<f64>,
    pub has_audio: bool,
    /// FFmpeg fails when any argument contains this text
    pub fail_when: Option<String>,
    /// Whether FFmpeg calls create their output file
    pub write_outputs: bool,
    pub(crate) ffmpeg_calls: Mutex<Vec<Vec<String>>>,
    pub(crate) ffprobe_calls: Mutex<Vec<Vec<String>>>,
}

impl Default for FakeExecutor {
    fn default() -> Self {
        Self {
            duration: Some(12.0),
            mean_volume_db: Some(-20.0),
            has_audio: true,
            fail_when: None,
            write_outputs: true,
            ffmpeg_calls: Mutex::new(Vec::new()),
            ffprobe_calls: Mutex::new(Vec::new()),
        }
    }
}

impl FakeExecutor {
    pub fn failing_on(pattern: &str) -> Self {
        Self {
            fail_when: Some(pattern.to_string()),
            ..Default::default()
        }
    }

    pub fn ffmpeg_calls(&self) -> Vec<Vec<String>> {
        self.ffmpeg_calls.lock().unwrap().clone()
    }

    pub fn invocation_count(&self) -> usize {
        self.ffmpeg_calls.lock().unwrap().len() + self.ffprobe_calls.lock().unwrap().len()
    }
}

#[async_trait]
impl CommandExecutor for FakeExecutor {
    async fn ffmpeg(&self, cmd: &FfmpegCommand) -> MediaResult<ProcessOutput> {
        let args = cmd.build_args();
        self.ffmpeg_calls.lock().unwrap().push(args.clone());

        if let Some(pattern) = &self.fail_when {
            if args.iter().any(|a| a.contains(pattern.as_str())) {
                return Err(MediaError::ffmpeg_failed(
                    "scripted failure",
                    Some("Conversion failed!".to_string()),
                    Some(1),
                )
                .with_command(cmd.command_line()));
            }
        }

        if self.write_outputs {
            if let Some(out) = cmd.output_path() {
                std::fs::write(out, b"fake media")?;
            }
        }

        let stderr = match self.mean_volume_db {
            Some(db) if args.iter().any(|a| a == "volumedetect") => {
                format!("[Parsed_volumedetect_0 @ 0x1] mean_volume: {:.1} dB", db)
            }
            _ => String::new(),
        };

        Ok(ProcessOutput {
            stderr,
            exit_code: Some(0),
            ..Default::default()
        })
    }

    async fn ffprobe(&self, cmd: &FfprobeCommand) -> MediaResult<ProcessOutput> {
        let args = cmd.build_args();
        self.ffprobe_calls.lock().unwrap().push(args.clone());

        let stdout = if args.iter().any(|a| a == "-show_format") {
            match self.duration {
                Some(d) => format!(r#"{{"format": {{"duration": "{:.6}"}}}}"#, d),
                None => {
                    return Err(MediaError::FfprobeFailed {
                        message: "scripted failure".to_string(),
                        stderr: None,
                    })
                }
            }
        } else if self.has_audio {
            "aac,12.000000\n".to_string()
        } else {
            String::new()
        };

        Ok(ProcessOutput {
            stdout,
            exit_code: Some(0),
            ..Default::default()
        })
    }
}
