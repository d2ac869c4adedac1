//! Per-image timing from the narration length.

use rand::Rng;

use burns_media::synthesize_effect;
use burns_models::{ClipSpec, SceneAssets};

use crate::error::{PipelineError, PipelineResult};

/// Seconds each image stays on screen, or `None` with no images.
pub fn time_per_image(narration_duration: f64, image_count: usize) -> Option<f64> {
    (image_count > 0).then(|| narration_duration / image_count as f64)
}

/// One [`ClipSpec`] per image, in image order, each with a fresh effect.
pub fn plan_clips<R: Rng + ?Sized>(
    scene: &SceneAssets,
    narration_duration: f64,
    fps: u32,
    rng: &mut R,
) -> PipelineResult<Vec<ClipSpec>> {
    let per_image = time_per_image(narration_duration, scene.image_count())
        .ok_or_else(|| PipelineError::NoImages(scene.output_dir.clone()))?;
    let frames = ClipSpec::frames_for(per_image, fps);

    Ok(scene
        .images
        .iter()
        .enumerate()
        .map(|(index, image)| ClipSpec {
            index,
            image: image.clone(),
            duration: per_image,
            frames,
            effect: synthesize_effect(&mut *rng, frames),
        })
        .collect())
}
