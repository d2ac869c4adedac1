//! Bounded parallel clip rendering.

use futures::future::join_all;
use std::path::PathBuf;
use std::time::Instant;
use tokio::sync::Semaphore;
use tracing::{info, warn};

use burns_media::{render_clip, CommandExecutor};
use burns_models::{ClipSpec, EncodingConfig, SceneAssets};

use crate::error::PipelineError;
use crate::metrics;

/// Result of rendering one clip.
#[derive(Debug)]
pub struct RenderedClip {
    pub spec: ClipSpec,
    pub output: PathBuf,
    pub result: Result<(), PipelineError>,
}

/// Render every clip with at most `max_parallel` encoder processes.
///
/// Results come back in clip order regardless of completion order. A failed
/// render never stops its siblings.
pub async fn render_clips(
    executor: &dyn CommandExecutor,
    scene: &SceneAssets,
    clips: Vec<ClipSpec>,
    encoding: &EncodingConfig,
    max_parallel: usize,
) -> Vec<RenderedClip> {
    let semaphore = Semaphore::new(max_parallel.max(1));
    let total = clips.len();

    let futures = clips.into_iter().map(|spec| {
        let semaphore = &semaphore;
        let output = scene.temp_clip_path(spec.number());

        async move {
            let result = match semaphore.acquire().await {
                Ok(_permit) => {
                    let started = Instant::now();
                    let rendered = render_clip(executor, &spec, &output, encoding).await;
                    metrics::record_stage_duration("clip", started.elapsed().as_secs_f64());
                    rendered.map(|_| ())
                }
                Err(_) => Err(burns_media::MediaError::Cancelled),
            };

            let result = result.map_err(|source| PipelineError::ClipRender {
                number: spec.number(),
                image: spec.image.clone(),
                source,
            });

            match &result {
                Ok(()) => {
                    metrics::record_clip_rendered();
                    info!(
                        clip = spec.number(),
                        total,
                        effect = %spec.effect.summary(),
                        "Clip rendered"
                    );
                }
                Err(e) => {
                    metrics::record_clip_failed();
                    warn!(clip = spec.number(), total, error = %e, "Clip failed");
                }
            }

            RenderedClip {
                spec,
                output,
                result,
            }
        }
    });

    join_all(futures).await
}
