//! Scene asset sets and the per-scene file layout.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Prefix of ordered still images (`beat_NN.png`).
pub const IMAGE_PREFIX: &str = "beat_";
/// Extension of still images.
pub const IMAGE_EXTENSION: &str = "png";
/// Narration audio produced by the speech collaborator.
pub const NARRATION_FILE: &str = "speech.mp3";
/// Subtitle cues matching the narration.
pub const SUBTITLE_FILE: &str = "speech.srt";
/// Prefix of background-music candidates (`music_*.mp3`).
pub const MUSIC_PREFIX: &str = "music_";
/// Extension of background-music candidates.
pub const MUSIC_EXTENSION: &str = "mp3";
/// Concatenation manifest (core-owned, deleted on success).
pub const CONCAT_MANIFEST_FILE: &str = "concat_list.txt";
/// Silent concatenated video (core-owned, retained).
pub const TEMP_VIDEO_FILE: &str = "temp_video.mp4";
/// Trimmed background music (core-owned, deleted on success).
pub const TRIMMED_MUSIC_FILE: &str = "music_trimmed.mp3";
/// Narration-muxed deliverable.
pub const MOVIE_FILE: &str = "movie.mp4";
/// Subtitled deliverable.
pub const SUBTITLED_MOVIE_FILE: &str = "movie_subtitled.mp4";
/// Music-mixed deliverable.
pub const FINAL_MOVIE_FILE: &str = "movie_final.mp4";
/// Prefix of per-image intermediate clips (`temp_clip_NN.mp4`).
pub const TEMP_CLIP_PREFIX: &str = "temp_clip_";
/// Prefix of scene directories under the static root.
pub const SCENE_DIR_PREFIX: &str = "scene_";

/// Everything one pipeline run consumes, plus where it writes.
///
/// `images` is sorted by file name ascending and that order is kept by
/// every stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneAssets {
    /// Ordered still images
    pub images: Vec<PathBuf>,
    /// Narration audio
    pub narration: PathBuf,
    /// Subtitle cues, if the scene has any
    pub subtitles: Option<PathBuf>,
    /// Background-music candidate, first in discovery order
    pub music: Option<PathBuf>,
    /// Directory all artifacts are written to
    pub output_dir: PathBuf,
}

impl SceneAssets {
    /// Asset set for a scene directory using the standard file names, with
    /// no images, subtitles or music attached yet.
    pub fn for_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            images: Vec::new(),
            narration: dir.join(NARRATION_FILE),
            subtitles: None,
            music: None,
            output_dir: dir.to_path_buf(),
        }
    }

    /// Number of still images.
    pub fn image_count(&self) -> usize {
        self.images.len()
    }

    /// Intermediate clip path for a one-based clip number.
    pub fn temp_clip_path(&self, number: usize) -> PathBuf {
        self.output_dir
            .join(format!("{}{:02}.mp4", TEMP_CLIP_PREFIX, number))
    }

    pub fn concat_manifest_path(&self) -> PathBuf {
        self.output_dir.join(CONCAT_MANIFEST_FILE)
    }

    pub fn temp_video_path(&self) -> PathBuf {
        self.output_dir.join(TEMP_VIDEO_FILE)
    }

    pub fn trimmed_music_path(&self) -> PathBuf {
        self.output_dir.join(TRIMMED_MUSIC_FILE)
    }

    pub fn movie_path(&self) -> PathBuf {
        self.output_dir.join(MOVIE_FILE)
    }

    pub fn subtitled_movie_path(&self) -> PathBuf {
        self.output_dir.join(SUBTITLED_MOVIE_FILE)
    }

    pub fn final_movie_path(&self) -> PathBuf {
        self.output_dir.join(FINAL_MOVIE_FILE)
    }
}
