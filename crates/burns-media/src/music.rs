//! Background music trim and mix.

use std::path::{Path, PathBuf};
use tracing::info;

use burns_models::EncodingConfig;

use crate::command::{CommandExecutor, FfmpegCommand};
use crate::error::MediaResult;
use crate::filters::{AudioMix, FilterSpec};
use crate::fs_utils::verify_output;

/// Losslessly cut `music` to its first `duration` seconds.
pub async fn trim_music(
    executor: &dyn CommandExecutor,
    music: &Path,
    duration: f64,
    output: &Path,
) -> MediaResult<PathBuf> {
    info!(
        "Trimming music {} to {:.2}s -> {}",
        music.display(),
        duration,
        output.display()
    );

    let cmd = FfmpegCommand::new(music, output)
        .seek(0.0)
        .duration(duration)
        .audio_codec("copy");

    executor.ffmpeg(&cmd).await?;
    verify_output(output).await?;
    Ok(output.to_path_buf())
}

/// Mix `music` under the audio of `video`, copying the picture stream.
///
/// The mix lasts as long as the video's own (narration) audio.
pub async fn mix_music(
    executor: &dyn CommandExecutor,
    video: &Path,
    music: &Path,
    output: &Path,
    encoding: &EncodingConfig,
) -> MediaResult<PathBuf> {
    let mix = AudioMix::narration_led();

    info!("Mixing music {} under {} -> {}", music.display(), video.display(), output.display());

    let cmd = FfmpegCommand::new(video, output)
        .add_input(music)
        .filter_complex(mix.to_filter())
        .map("0:v")
        .map(mix.output_map())
        .video_codec("copy")
        .audio_codec(&encoding.audio_codec)
        .shortest();

    executor.ffmpeg(&cmd).await?;
    verify_output(output).await?;
    Ok(output.to_path_buf())
}

/// Trim `music` to the narration length, then mix it under `video`.
pub async fn add_background_music(
    executor: &dyn CommandExecutor,
    video: &Path,
    music: &Path,
    narration_duration: f64,
    trimmed: &Path,
    output: &Path,
    encoding: &EncodingConfig,
) -> MediaResult<PathBuf> {
    trim_music(executor, music, narration_duration, trimmed).await?;
    mix_music(executor, video, trimmed, output, encoding).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MediaError;
    use crate::test_support::FakeExecutor;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_trim_then_mix() {
        let dir = TempDir::new().unwrap();
        let video = dir.path().join("movie_subtitled.mp4");
        let music = dir.path().join("music_calm.mp3");
        std::fs::write(&video, b"video").unwrap();
        std::fs::write(&music, b"music").unwrap();
        let trimmed = dir.path().join("music_trimmed.mp3");
        let output = dir.path().join("movie_final.mp4");

        let fake = FakeExecutor::default();
        let path = add_background_music(
            &fake,
            &video,
            &music,
            12.0,
            &trimmed,
            &output,
            &EncodingConfig::default(),
        )
        .await
        .unwrap();
        assert_eq!(path, output);

        let calls = fake.ffmpeg_calls();
        assert_eq!(calls.len(), 2);

        let trim = &calls[0];
        assert!(trim.windows(2).any(|w| w == ["-ss", "0.000000"]));
        assert!(trim.windows(2).any(|w| w == ["-t", "12.000000"]));
        assert!(trim.windows(2).any(|w| w == ["-c:a", "copy"]));

        let mix = &calls[1];
        assert!(mix.windows(2).any(|w| w
            == [
                "-filter_complex",
                "[0:a][1:a]amix=inputs=2:duration=first:dropout_transition=2[aout]"
            ]));
        assert!(mix.windows(2).any(|w| w == ["-map", "0:v"]));
        assert!(mix.windows(2).any(|w| w == ["-map", "[aout]"]));
        assert!(mix.windows(2).any(|w| w == ["-c:v", "copy"]));
        assert!(mix.iter().any(|a| a == "-shortest"));
    }

    #[tokio::test]
    async fn test_trim_failure_skips_mix() {
        let dir = TempDir::new().unwrap();
        let video = dir.path().join("movie.mp4");
        let music = dir.path().join("music_calm.mp3");
        std::fs::write(&video, b"video").unwrap();
        std::fs::write(&music, b"music").unwrap();

        let fake = FakeExecutor::failing_on("music_trimmed.mp3");
        let err = add_background_music(
            &fake,
            &video,
            &music,
            12.0,
            &dir.path().join("music_trimmed.mp3"),
            &dir.path().join("movie_final.mp4"),
            &EncodingConfig::default(),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, MediaError::FfmpegFailed { .. }));
        assert_eq!(fake.ffmpeg_calls().len(), 1);
        assert!(!dir.path().join("movie_final.mp4").exists());
    }
}
