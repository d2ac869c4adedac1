//! Caption file generation from narration text.

use std::path::{Path, PathBuf};
use tracing::info;

use burns_media::{cues_from_text, duration_or_fallback, format_srt, CommandExecutor};
use burns_models::scene::SUBTITLE_FILE;
use burns_models::SceneAssets;

use crate::error::{PipelineError, PipelineResult};

/// Time `text` over the scene's narration and write `speech.srt`.
///
/// Returns the written path and the number of cues.
pub async fn write_captions(
    executor: &dyn CommandExecutor,
    scene_dir: &Path,
    text: &str,
) -> PipelineResult<(PathBuf, usize)> {
    let scene = SceneAssets::for_dir(scene_dir);
    let duration = duration_or_fallback(executor, &scene.narration).await;

    let cues = cues_from_text(text, duration);
    if cues.is_empty() {
        return Err(PipelineError::config("caption text has no words"));
    }

    let path = scene_dir.join(SUBTITLE_FILE);
    tokio::fs::write(&path, format_srt(&cues)).await?;

    info!(
        path = %path.display(),
        cues = cues.len(),
        duration,
        "Captions written"
    );
    Ok((path, cues.len()))
}
