//! Clip concatenation through FFmpeg's concat demuxer.

use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::info;

use burns_models::EncodingConfig;

use crate::command::{CommandExecutor, FfmpegCommand};
use crate::error::{MediaError, MediaResult};
use crate::fs_utils::verify_output;

/// Fail with [`MediaError::MissingClips`] if any clip is absent.
pub fn verify_clips<P: AsRef<Path>>(clips: &[P]) -> MediaResult<()> {
    let missing: Vec<PathBuf> = clips
        .iter()
        .map(|p| p.as_ref())
        .filter(|p| !p.is_file())
        .map(|p| p.to_path_buf())
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(MediaError::MissingClips(missing))
    }
}

/// Render concat demuxer directives, one `file '<path>'` line per clip.
pub fn manifest_contents<P: AsRef<Path>>(clips: &[P]) -> String {
    clips
        .iter()
        .map(|p| {
            let path = p.as_ref().to_string_lossy().replace('\'', r"'\''");
            format!("file '{}'\n", path)
        })
        .collect()
}

/// Write the manifest for `clips` (in the given order) using absolute paths.
pub async fn write_manifest<P: AsRef<Path>>(clips: &[P], manifest: &Path) -> MediaResult<()> {
    let mut absolute = Vec::with_capacity(clips.len());
    for clip in clips {
        absolute.push(fs::canonicalize(clip.as_ref()).await?);
    }
    fs::write(manifest, manifest_contents(&absolute)).await?;
    Ok(())
}

/// Join `clips` in order into one silent video at `output`.
///
/// Every clip is checked before the encoder runs. The join re-encodes so
/// independently rendered clips end up with uniform codec parameters.
pub async fn concat_clips(
    executor: &dyn CommandExecutor,
    clips: &[PathBuf],
    manifest: &Path,
    output: &Path,
    encoding: &EncodingConfig,
) -> MediaResult<PathBuf> {
    verify_clips(clips)?;
    write_manifest(clips, manifest).await?;

    info!(
        "Concatenating {} clips -> {}",
        clips.len(),
        output.display()
    );

    let cmd = FfmpegCommand::new(manifest, output)
        .input_format("concat")
        .input_args(["-safe", "0"])
        .video_codec(&encoding.codec)
        .preset(&encoding.preset)
        .pixel_format(&encoding.pixel_format);

    executor.ffmpeg(&cmd).await?;
    verify_output(output).await?;

    Ok(output.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::FakeExecutor;
    use tempfile::TempDir;

    fn touch(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, b"clip").unwrap();
        path
    }

    #[test]
    fn test_manifest_contents_preserve_order() {
        let text = manifest_contents(&["/s/temp_clip_01.mp4", "/s/temp_clip_02.mp4"]);
        assert_eq!(
            text,
            "file '/s/temp_clip_01.mp4'\nfile '/s/temp_clip_02.mp4'\n"
        );
    }

    #[test]
    fn test_manifest_escapes_quotes() {
        let text = manifest_contents(&["/s/it's/temp_clip_01.mp4"]);
        assert_eq!(text, "file '/s/it'\\''s/temp_clip_01.mp4'\n");
    }

    #[tokio::test]
    async fn test_missing_clip_skips_encoder() {
        let dir = TempDir::new().unwrap();
        let clips = vec![
            touch(dir.path(), "temp_clip_01.mp4"),
            touch(dir.path(), "temp_clip_02.mp4"),
            dir.path().join("temp_clip_03.mp4"),
        ];
        let output = dir.path().join("temp_video.mp4");

        let fake = FakeExecutor::default();
        let err = concat_clips(
            &fake,
            &clips,
            &dir.path().join("concat_list.txt"),
            &output,
            &EncodingConfig::default(),
        )
        .await
        .unwrap_err();

        match err {
            MediaError::MissingClips(missing) => {
                assert_eq!(missing, vec![dir.path().join("temp_clip_03.mp4")])
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(fake.invocation_count(), 0);
        assert!(!output.exists());
    }

    #[tokio::test]
    async fn test_concat_writes_absolute_manifest() {
        let dir = TempDir::new().unwrap();
        let clips = vec![
            touch(dir.path(), "temp_clip_01.mp4"),
            touch(dir.path(), "temp_clip_02.mp4"),
        ];
        let manifest = dir.path().join("concat_list.txt");
        let output = dir.path().join("temp_video.mp4");

        let fake = FakeExecutor::default();
        concat_clips(&fake, &clips, &manifest, &output, &EncodingConfig::default())
            .await
            .unwrap();

        let text = std::fs::read_to_string(&manifest).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with("temp_clip_01.mp4'"));
        assert!(lines[1].ends_with("temp_clip_02.mp4'"));
        assert!(lines.iter().all(|l| l.starts_with("file '/")));

        let args = &fake.ffmpeg_calls()[0];
        assert!(args.windows(2).any(|w| w == ["-f", "concat"]));
        assert!(args.windows(2).any(|w| w == ["-safe", "0"]));
        assert!(args.windows(2).any(|w| w == ["-c:v", "libx264"]));
        assert!(!args.iter().any(|a| a == "copy"), "concat must re-encode");
    }
}
