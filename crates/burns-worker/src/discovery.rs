//! Scene directory discovery.
//!
//! Both functions only read the filesystem; the orchestrator never calls
//! them and receives an explicit [`SceneAssets`] instead.

use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tokio::fs;
use tracing::debug;

use burns_models::scene::{
    IMAGE_EXTENSION, IMAGE_PREFIX, MUSIC_EXTENSION, MUSIC_PREFIX, SCENE_DIR_PREFIX, SUBTITLE_FILE,
    TRIMMED_MUSIC_FILE,
};
use burns_models::SceneAssets;

use crate::error::PipelineResult;

/// File names in `dir` (regular files only), sorted ascending.
async fn sorted_file_names(dir: &Path) -> PipelineResult<Vec<String>> {
    let mut names = Vec::new();
    let mut entries = fs::read_dir(dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        if !entry.file_type().await?.is_file() {
            continue;
        }
        if let Some(name) = entry.file_name().to_str() {
            names.push(name.to_string());
        }
    }
    names.sort();
    Ok(names)
}

fn matches(name: &str, prefix: &str, extension: &str) -> bool {
    name.starts_with(prefix)
        && Path::new(name)
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case(extension))
}

/// Build the asset set for one scene directory.
///
/// Images are `beat_*.png` and music candidates `music_*.mp3`, both in file
/// name order. The pipeline's own `music_trimmed.mp3` is never a candidate.
pub async fn discover_scene(dir: impl AsRef<Path>) -> PipelineResult<SceneAssets> {
    let dir = dir.as_ref();
    let names = sorted_file_names(dir).await?;
    let mut scene = SceneAssets::for_dir(dir);

    scene.images = names
        .iter()
        .filter(|n| matches(n, IMAGE_PREFIX, IMAGE_EXTENSION))
        .map(|n| dir.join(n))
        .collect();

    scene.music = names
        .iter()
        .filter(|n| n.as_str() != TRIMMED_MUSIC_FILE)
        .find(|n| matches(n, MUSIC_PREFIX, MUSIC_EXTENSION))
        .map(|n| dir.join(n));

    scene.subtitles = names
        .iter()
        .any(|n| n == SUBTITLE_FILE)
        .then(|| dir.join(SUBTITLE_FILE));

    debug!(
        scene = %dir.display(),
        images = scene.images.len(),
        subtitles = scene.subtitles.is_some(),
        music = ?scene.music,
        "Discovered scene assets"
    );

    Ok(scene)
}

/// The `scene_*` directory under `static_root` modified most recently.
pub async fn latest_scene_dir(static_root: impl AsRef<Path>) -> PipelineResult<Option<PathBuf>> {
    let mut latest: Option<(SystemTime, PathBuf)> = None;
    let mut entries = fs::read_dir(static_root.as_ref()).await?;

    while let Some(entry) = entries.next_entry().await? {
        let is_scene = entry
            .file_name()
            .to_str()
            .is_some_and(|n| n.starts_with(SCENE_DIR_PREFIX));
        if !is_scene {
            continue;
        }
        let meta = entry.metadata().await?;
        if !meta.is_dir() {
            continue;
        }
        let modified = meta.modified()?;
        if latest.as_ref().map_or(true, |(t, _)| modified > *t) {
            latest = Some((modified, entry.path()));
        }
    }

    Ok(latest.map(|(_, path)| path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tempfile::TempDir;

    fn touch(dir: &Path, name: &str) {
        std::fs::write(dir.join(name), b"x").unwrap();
    }

    #[tokio::test]
    async fn test_discover_orders_images_by_name() {
        let dir = TempDir::new().unwrap();
        for name in ["beat_03.png", "beat_01.png", "beat_02.png", "cover.png", "beat_04.jpg"] {
            touch(dir.path(), name);
        }
        touch(dir.path(), "speech.mp3");

        let scene = discover_scene(dir.path()).await.unwrap();
        let names: Vec<_> = scene
            .images
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, ["beat_01.png", "beat_02.png", "beat_03.png"]);
        assert_eq!(scene.narration, dir.path().join("speech.mp3"));
        assert!(scene.subtitles.is_none());
        assert!(scene.music.is_none());
        assert_eq!(scene.output_dir, dir.path());
    }

    #[tokio::test]
    async fn test_discover_optional_assets() {
        let dir = TempDir::new().unwrap();
        for name in [
            "beat_01.png",
            "speech.srt",
            "music_trimmed.mp3",
            "music_zen.mp3",
            "music_ambient.mp3",
        ] {
            touch(dir.path(), name);
        }

        let scene = discover_scene(dir.path()).await.unwrap();
        assert_eq!(scene.subtitles, Some(dir.path().join("speech.srt")));
        assert_eq!(scene.music, Some(dir.path().join("music_ambient.mp3")));
    }

    #[tokio::test]
    async fn test_trimmed_music_is_not_a_candidate() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "music_trimmed.mp3");
        let scene = discover_scene(dir.path()).await.unwrap();
        assert!(scene.music.is_none());
    }

    #[tokio::test]
    async fn test_latest_scene_dir() {
        let root = TempDir::new().unwrap();
        assert!(latest_scene_dir(root.path()).await.unwrap().is_none());

        std::fs::create_dir(root.path().join("scene_1")).unwrap();
        touch(root.path(), "scene_notes.txt");
        std::thread::sleep(Duration::from_millis(1100));
        std::fs::create_dir(root.path().join("scene_2")).unwrap();
        std::fs::create_dir(root.path().join("other")).unwrap();

        assert_eq!(
            latest_scene_dir(root.path()).await.unwrap(),
            Some(root.path().join("scene_2"))
        );
    }
}
