//! Per-image clip specification.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::effect::EffectParams;

/// One image's slot in the slideshow.
///
/// Created once per image at pipeline start and dropped after its clip
/// has been rendered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClipSpec {
    /// Zero-based position in image order
    pub index: usize,
    /// Source still image
    pub image: PathBuf,
    /// Clip length in seconds
    pub duration: f64,
    /// `duration * fps`, truncated
    pub frames: u32,
    /// Pan/zoom motion for this clip
    pub effect: EffectParams,
}

impl ClipSpec {
    /// One-based clip number as used in intermediate file names.
    pub fn number(&self) -> usize {
        self.index + 1
    }

    /// Frame count for a duration at the given frame rate, truncated.
    pub fn frames_for(duration: f64, fps: u32) -> u32 {
        if duration <= 0.0 || !duration.is_finite() {
            return 0;
        }
        (duration * f64::from(fps)) as u32
    }
}
