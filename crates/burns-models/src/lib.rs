//! Shared data models for the Ken Burns slideshow pipeline.
//!
//! This crate provides Serde-serializable types for:
//! - Scene asset sets and the per-scene file layout
//! - Per-image clip specifications
//! - Pan/zoom effect parameters and easing tags
//! - Encoding configuration for the fixed vertical output

pub mod clip;
pub mod effect;
pub mod encoding;
pub mod run;
pub mod scene;

// Re-export common types
pub use clip::ClipSpec;
pub use effect::{Easing, EasingParseError, EffectParams};
pub use encoding::{EncodingConfig, FrameSize};
pub use run::RunId;
pub use scene::SceneAssets;
