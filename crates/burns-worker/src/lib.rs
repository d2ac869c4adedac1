//! Ken Burns slideshow assembly.
//!
//! This crate provides:
//! - Scene discovery and per-image timing
//! - The stage orchestrator with fallback and cleanup rules
//! - Run logging, metrics and configuration for the CLI

pub mod captions;
pub mod config;
pub mod discovery;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod pipeline;
pub mod timing;

pub use captions::write_captions;
pub use config::WorkerConfig;
pub use discovery::{discover_scene, latest_scene_dir};
pub use error::{PipelineError, PipelineResult};
pub use logging::RunLogger;
pub use pipeline::{Pipeline, PipelineReport, PipelineState, StageOutcome};
pub use timing::{plan_clips, time_per_image};
