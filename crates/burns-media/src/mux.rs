//! Narration muxing.

use std::path::{Path, PathBuf};
use tracing::{info, warn};

use burns_models::EncodingConfig;

use crate::command::{CommandExecutor, FfmpegCommand};
use crate::error::{MediaError, MediaResult};
use crate::fs_utils::verify_output;
use crate::probe::has_audio_stream;
use crate::silence::{check_narration, AudioCheck};

/// Result of a successful mux.
#[derive(Debug, Clone, PartialEq)]
pub struct MuxOutcome {
    pub output: PathBuf,
    /// Narration duration measured during the silence check
    pub narration_duration: f64,
    /// Whether ffprobe found an audio stream in the output
    pub audio_verified: bool,
}

/// Attach narration audio to the concatenated video.
///
/// Silent or unreadable narration fails with [`MediaError::SilentAudio`]
/// before the encoder runs. The video stream is copied, audio encoded to
/// the configured AAC settings, and the output cut to the shorter input.
/// A missing audio stream in the result is only logged.
pub async fn mux_narration(
    executor: &dyn CommandExecutor,
    video: &Path,
    narration: &Path,
    output: &Path,
    encoding: &EncodingConfig,
    silence_threshold_db: f64,
) -> MediaResult<MuxOutcome> {
    let narration_duration = match check_narration(executor, narration, silence_threshold_db).await
    {
        AudioCheck::Audible {
            duration,
            mean_volume_db,
        } => {
            info!(
                path = %narration.display(),
                duration,
                mean_volume_db = ?mean_volume_db,
                "Narration audio accepted"
            );
            duration
        }
        AudioCheck::Silent(reason) => {
            return Err(MediaError::SilentAudio {
                path: narration.to_path_buf(),
                reason,
            })
        }
    };

    info!("Muxing narration {} -> {}", narration.display(), output.display());

    let cmd = FfmpegCommand::new(video, output)
        .add_input(narration)
        .map("0:v:0")
        .map("1:a:0")
        .video_codec("copy")
        .audio_codec(&encoding.audio_codec)
        .audio_bitrate(&encoding.audio_bitrate)
        .audio_channels(encoding.audio_channels)
        .audio_sample_rate(encoding.audio_sample_rate)
        .shortest();

    executor.ffmpeg(&cmd).await?;
    verify_output(output).await?;

    let audio_verified = match has_audio_stream(executor, output).await {
        Ok(true) => true,
        Ok(false) => {
            warn!("Muxed output {} has no audio stream", output.display());
            false
        }
        Err(e) => {
            warn!("Could not verify audio in {}: {}", output.display(), e);
            false
        }
    };

    Ok(MuxOutcome {
        output: output.to_path_buf(),
        narration_duration,
        audio_verified,
    })
}
