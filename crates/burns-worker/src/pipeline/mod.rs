//! Slideshow assembly orchestrator.
//!
//! Stages run in a fixed order: plan, render clips, concatenate, mux
//! narration, burn subtitles, mix music, clean up. Fatal failures abort
//! with intermediates left in place; subtitle and music failures degrade
//! the deliverable to the previous stage's output.

mod clips;
mod report;
mod state;

use rand::rngs::StdRng;
use rand::SeedableRng;
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing::Instrument;

use burns_media::{
    add_background_music, burn_subtitles, concat_clips, duration_or_fallback, mux_narration,
    remove_files, CommandExecutor, SilenceReason,
};
use burns_models::{RunId, SceneAssets};

use crate::config::WorkerConfig;
use crate::error::{PipelineError, PipelineResult};
use crate::logging::RunLogger;
use crate::metrics;
use crate::timing::{plan_clips, time_per_image};

pub use clips::{render_clips, RenderedClip};
pub use report::{ClipReport, PipelineReport};
pub use state::{PipelineState, StageOutcome};

/// Drives one scene through every stage.
pub struct Pipeline {
    executor: Arc<dyn CommandExecutor>,
    config: WorkerConfig,
}

impl Pipeline {
    pub fn new(executor: Arc<dyn CommandExecutor>, config: WorkerConfig) -> Self {
        Self { executor, config }
    }

    pub fn config(&self) -> &WorkerConfig {
        &self.config
    }

    /// Assemble the slideshow for `scene`.
    pub async fn run(&self, scene: &SceneAssets) -> PipelineResult<PipelineReport> {
        let run_id = RunId::new();
        let logger = RunLogger::new(&run_id, "assemble", &scene.output_dir);
        let span = logger.create_span();

        let result = self.run_stages(scene, run_id, &logger).instrument(span).await;
        match &result {
            Ok(report) => {
                metrics::record_run_completed();
                logger.log_completion(&format!(
                    "{} ({} clips, {:.1}s)",
                    report
                        .deliverable
                        .as_deref()
                        .map(|p| p.display().to_string())
                        .unwrap_or_default(),
                    report.clips.len(),
                    report.elapsed_secs().unwrap_or_default()
                ));
            }
            Err(e) => {
                metrics::record_run_failed(e.kind());
                logger.log_error(&e.to_string());
                if let Some(diag) = e.diagnostics() {
                    logger.log_error(&diag);
                }
            }
        }
        result
    }

    async fn run_stages(
        &self,
        scene: &SceneAssets,
        run_id: RunId,
        logger: &RunLogger,
    ) -> PipelineResult<PipelineReport> {
        let executor = self.executor.as_ref();
        let encoding = &self.config.encoding;
        let mut report = PipelineReport::new(run_id, scene.output_dir.clone());
        let mut state = PipelineState::default();

        // Checked before anything touches the encoder
        if scene.images.is_empty() {
            return Err(PipelineError::NoImages(scene.output_dir.clone()));
        }
        logger.log_start(&format!("{} images", scene.image_count()));

        let narration_duration = duration_or_fallback(executor, &scene.narration).await;
        // Zero-length narration leaves no frames to plan
        if narration_duration <= 0.0 {
            return Err(PipelineError::SilentAudio {
                path: scene.narration.clone(),
                reason: SilenceReason::ZeroDuration,
            });
        }
        let mut rng = match self.config.effect_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let clips = plan_clips(scene, narration_duration, encoding.fps, &mut rng)?;
        report.narration_duration = narration_duration;
        report.time_per_image =
            time_per_image(narration_duration, scene.image_count()).unwrap_or_default();
        logger.log_stage(
            "plan",
            &format!(
                "{:.2}s narration, {:.2}s per image",
                narration_duration, report.time_per_image
            ),
        );

        // Clips
        let rendered = timed(
            "render",
            render_clips(
                executor,
                scene,
                clips,
                encoding,
                self.config.max_render_parallel,
            ),
        )
        .await;
        for clip in &rendered {
            state.clip_paths.push(clip.output.clone());
            report.clips.push(ClipReport {
                number: clip.spec.number(),
                image: clip.spec.image.clone(),
                duration: clip.spec.duration,
                frames: clip.spec.frames,
                effect: clip.spec.effect,
                error: clip.result.as_ref().err().map(ToString::to_string),
            });
        }
        if report.failed_clips() > 0 {
            logger.log_warning(&format!(
                "{} of {} clips failed to render",
                report.failed_clips(),
                rendered.len()
            ));
        }

        // Concatenation
        let manifest = scene.concat_manifest_path();
        state.manifest = Some(manifest.clone());
        let temp_video = timed(
            "concat",
            concat_clips(
                executor,
                &state.clip_paths,
                &manifest,
                &scene.temp_video_path(),
                encoding,
            ),
        )
        .await
        .map_err(PipelineError::from_concat)?;
        state.temp_video = Some(temp_video.clone());
        logger.log_stage("concat", &temp_video.display().to_string());

        // Narration
        let muxed = timed(
            "mux",
            mux_narration(
                executor,
                &temp_video,
                &scene.narration,
                &scene.movie_path(),
                encoding,
                self.config.silence_threshold_db,
            ),
        )
        .await
        .map_err(PipelineError::from_mux)?;
        report.audio_verified = muxed.audio_verified;
        if !muxed.audio_verified {
            logger.log_warning("muxed movie has no audio stream");
        }
        state.movie = Some(muxed.output.clone());
        logger.log_stage("mux", &muxed.output.display().to_string());

        // Subtitles
        state.subtitles = match &scene.subtitles {
            None => StageOutcome::Skipped,
            Some(srt) => {
                let burned = timed(
                    "subtitles",
                    burn_subtitles(
                        executor,
                        &muxed.output,
                        srt,
                        &scene.subtitled_movie_path(),
                        encoding,
                    ),
                )
                .await;
                match burned {
                    Ok((path, _)) => StageOutcome::Succeeded(path),
                    Err(e) => degrade(logger, "subtitles", PipelineError::SubtitleBurn(e)),
                }
            }
        };
        logger.log_stage("subtitles", state.subtitles.label());

        // Music
        let music_input = state.music_input().map(PathBuf::from);
        state.music = match (&scene.music, music_input) {
            (Some(music), Some(input)) => {
                let trimmed = scene.trimmed_music_path();
                state.trimmed_music = Some(trimmed.clone());
                let mixed = timed(
                    "music",
                    add_background_music(
                        executor,
                        &input,
                        music,
                        muxed.narration_duration,
                        &trimmed,
                        &scene.final_movie_path(),
                        encoding,
                    ),
                )
                .await;
                match mixed {
                    Ok(path) => StageOutcome::Succeeded(path),
                    Err(e) => degrade(logger, "music", PipelineError::MusicMix(e)),
                }
            }
            _ => StageOutcome::Skipped,
        };
        logger.log_stage("music", state.music.label());

        report.cleaned_up = remove_files(&state.intermediates()).await;
        report.subtitles = state.subtitles.clone();
        report.music = state.music.clone();
        report.deliverable = state.deliverable().map(PathBuf::from);
        report.finish();

        Ok(report)
    }
}

/// Log a non-fatal stage failure and turn it into a failed outcome.
fn degrade(logger: &RunLogger, stage: &'static str, err: PipelineError) -> StageOutcome {
    metrics::record_stage_degraded(stage);
    logger.log_warning(&format!("{}; keeping previous output", err));
    if let Some(diag) = err.diagnostics() {
        logger.log_warning(&diag);
    }
    StageOutcome::Failed(err.to_string())
}

async fn timed<F: Future>(stage: &'static str, fut: F) -> F::Output {
    let started = Instant::now();
    let output = fut.await;
    metrics::record_stage_duration(stage, started.elapsed().as_secs_f64());
    output
}
