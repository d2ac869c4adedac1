//! Subtitle burn-in stage.

use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::info;

use burns_models::EncodingConfig;

use crate::command::{CommandExecutor, FfmpegCommand};
use crate::error::MediaResult;
use crate::filters::{FilterSpec, SubtitlesFilter};
use crate::fs_utils::verify_output;
use crate::srt::parse_srt;

/// Overlay the cues in `srt` onto `video`, copying the audio stream.
///
/// The cue file is parsed first so a malformed file never reaches the
/// encoder. Returns the number of cues burned in.
pub async fn burn_subtitles(
    executor: &dyn CommandExecutor,
    video: &Path,
    srt: &Path,
    output: &Path,
    encoding: &EncodingConfig,
) -> MediaResult<(PathBuf, usize)> {
    let text = fs::read_to_string(srt).await?;
    let cues = parse_srt(&text)?;

    let srt = fs::canonicalize(srt).await?;
    let filter = SubtitlesFilter::for_path(&srt);

    info!(
        "Burning {} subtitle cues from {} -> {}",
        cues.len(),
        srt.display(),
        output.display()
    );

    let cmd = FfmpegCommand::new(video, output)
        .video_filter(filter.to_filter())
        .video_codec(&encoding.codec)
        .preset(&encoding.preset)
        .pixel_format(&encoding.pixel_format)
        .audio_codec("copy");

    executor.ffmpeg(&cmd).await?;
    verify_output(output).await?;

    Ok((output.to_path_buf(), cues.len()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MediaError;
    use crate::srt::SrtError;
    use crate::test_support::FakeExecutor;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_burn_subtitles_copies_audio() {
        let dir = TempDir::new().unwrap();
        let video = dir.path().join("movie.mp4");
        let srt = dir.path().join("speech.srt");
        std::fs::write(&video, b"movie").unwrap();
        std::fs::write(&srt, "1\n00:00:00,000 --> 00:00:03,000\nHello there\n").unwrap();
        let output = dir.path().join("movie_subtitled.mp4");

        let fake = FakeExecutor::default();
        let (path, cues) = burn_subtitles(&fake, &video, &srt, &output, &EncodingConfig::default())
            .await
            .unwrap();

        assert_eq!(path, output);
        assert_eq!(cues, 1);
        let args = &fake.ffmpeg_calls()[0];
        let vf = &args[args.iter().position(|a| a == "-vf").unwrap() + 1];
        assert!(vf.starts_with("subtitles='/"));
        assert!(vf.ends_with("speech.srt'"));
        assert!(args.windows(2).any(|w| w == ["-c:a", "copy"]));
    }

    #[tokio::test]
    async fn test_malformed_srt_skips_encoder() {
        let dir = TempDir::new().unwrap();
        let video = dir.path().join("movie.mp4");
        let srt = dir.path().join("speech.srt");
        std::fs::write(&video, b"movie").unwrap();
        std::fs::write(&srt, "not subtitles\n").unwrap();

        let fake = FakeExecutor::default();
        let err = burn_subtitles(
            &fake,
            &video,
            &srt,
            &dir.path().join("movie_subtitled.mp4"),
            &EncodingConfig::default(),
        )
        .await
        .unwrap_err();

        assert!(matches!(
            err,
            MediaError::InvalidSubtitles(SrtError::InvalidIndex { .. })
        ));
        assert_eq!(fake.invocation_count(), 0);
    }
}
