//! Per-image clip rendering.

use std::path::{Path, PathBuf};
use tracing::{debug, info};

use burns_models::{ClipSpec, EncodingConfig};

use crate::command::{CommandExecutor, FfmpegCommand};
use crate::error::{MediaError, MediaResult};
use crate::filters::{Fps, VideoFilterChain, ZoomPan};
use crate::fs_utils::{remove_if_exists, verify_output};

/// Build the FFmpeg command that turns one still image into a clip.
pub fn clip_command(
    clip: &ClipSpec,
    output: &Path,
    encoding: &EncodingConfig,
) -> MediaResult<FfmpegCommand> {
    let zoompan = ZoomPan::new(&clip.effect, clip.frames, encoding.frame_size)?;
    let fps = Fps::new(encoding.fps)?;
    let filter = VideoFilterChain::new().then(&zoompan).then(&fps);

    Ok(FfmpegCommand::new(&clip.image, output)
        .loop_input()
        .video_codec(&encoding.codec)
        .preset(&encoding.preset)
        .pixel_format(&encoding.pixel_format)
        .video_filter(filter.to_filter())
        .duration(clip.duration))
}

/// Render one image into a Ken Burns clip at `output`.
///
/// On failure any partial output is removed, so a later existence check
/// reports the clip as missing.
pub async fn render_clip(
    executor: &dyn CommandExecutor,
    clip: &ClipSpec,
    output: impl AsRef<Path>,
    encoding: &EncodingConfig,
) -> MediaResult<PathBuf> {
    let output = output.as_ref();

    if !clip.image.exists() {
        return Err(MediaError::FileNotFound(clip.image.clone()));
    }

    info!(
        "Rendering clip {}: {} -> {} ({:.2}s, {} frames)",
        clip.number(),
        clip.image.display(),
        output.display(),
        clip.duration,
        clip.frames
    );
    debug!(clip = clip.number(), effect = %clip.effect.summary(), "Clip effect");

    let result = async {
        let cmd = clip_command(clip, output, encoding)?;
        executor.ffmpeg(&cmd).await?;
        verify_output(output).await
    }
    .await;

    if let Err(e) = result {
        if let Err(cleanup) = remove_if_exists(output).await {
            debug!("Could not remove partial clip {}: {}", output.display(), cleanup);
        }
        return Err(e);
    }

    Ok(output.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::FilterError;
    use crate::test_support::FakeExecutor;
    use burns_models::effect::PanPoint;
    use burns_models::{Easing, EffectParams};
    use tempfile::TempDir;

    fn clip(image: PathBuf, duration: f64) -> ClipSpec {
        ClipSpec {
            index: 0,
            image,
            duration,
            frames: ClipSpec::frames_for(duration, 25),
            effect: EffectParams {
                zoom_start: 1.3,
                zoom_end: 1.1,
                pan_start: PanPoint::new(0.05, 0.25),
                pan_end: PanPoint::new(0.25, 0.05),
                easing: Easing::EaseOut,
            },
        }
    }

    #[test]
    fn test_clip_command_shape() {
        let spec = clip(PathBuf::from("/s/beat_01.png"), 3.0);
        let cmd = clip_command(&spec, Path::new("/s/temp_clip_01.mp4"), &EncodingConfig::default())
            .unwrap();
        let args = cmd.build_args();

        let loop_pos = args.iter().position(|a| a == "-loop").unwrap();
        let input_pos = args.iter().position(|a| a == "/s/beat_01.png").unwrap();
        assert!(loop_pos < input_pos);

        let vf = &args[args.iter().position(|a| a == "-vf").unwrap() + 1];
        assert!(vf.starts_with("zoompan="));
        assert!(vf.ends_with(",fps=25"));
        assert!(vf.contains(":d=75:s=768x1280"));

        assert!(args.windows(2).any(|w| w == ["-c:v", "libx264"]));
        assert!(args.windows(2).any(|w| w == ["-preset", "fast"]));
        assert!(args.windows(2).any(|w| w == ["-pix_fmt", "yuv420p"]));
        assert!(args.windows(2).any(|w| w == ["-t", "3.000000"]));
    }

    #[test]
    fn test_too_short_clip_is_rejected() {
        let spec = clip(PathBuf::from("/s/beat_01.png"), 0.04);
        let err = clip_command(&spec, Path::new("/s/out.mp4"), &EncodingConfig::default())
            .unwrap_err();
        assert!(matches!(
            err,
            MediaError::InvalidFilter(FilterError::TooFewFrames(1))
        ));
    }

    #[tokio::test]
    async fn test_render_clip_writes_output() {
        let dir = TempDir::new().unwrap();
        let image = dir.path().join("beat_01.png");
        std::fs::write(&image, b"png").unwrap();
        let out = dir.path().join("temp_clip_01.mp4");

        let fake = FakeExecutor::default();
        let path = render_clip(&fake, &clip(image, 2.0), &out, &EncodingConfig::default())
            .await
            .unwrap();
        assert_eq!(path, out);
        assert!(out.exists());
        assert_eq!(fake.ffmpeg_calls().len(), 1);
    }

    #[tokio::test]
    async fn test_failed_render_removes_partial_output() {
        let dir = TempDir::new().unwrap();
        let image = dir.path().join("beat_01.png");
        std::fs::write(&image, b"png").unwrap();
        let out = dir.path().join("temp_clip_01.mp4");
        std::fs::write(&out, b"partial").unwrap();

        let fake = FakeExecutor::failing_on("beat_01.png");
        let err = render_clip(&fake, &clip(image, 2.0), &out, &EncodingConfig::default())
            .await
            .unwrap_err();
        assert!(matches!(err, MediaError::FfmpegFailed { .. }));
        assert!(!out.exists());
    }

    #[tokio::test]
    async fn test_missing_image_skips_encoder() {
        let dir = TempDir::new().unwrap();
        let fake = FakeExecutor::default();
        let err = render_clip(
            &fake,
            &clip(dir.path().join("beat_09.png"), 2.0),
            dir.path().join("temp_clip_09.mp4"),
            &EncodingConfig::default(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, MediaError::FileNotFound(_)));
        assert_eq!(fake.invocation_count(), 0);
    }
}
