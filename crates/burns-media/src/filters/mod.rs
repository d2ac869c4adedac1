//! Typed FFmpeg filter-graph builders.
//!
//! Filter values are validated when built and only rendered to FFmpeg's
//! textual syntax when a command is assembled.

mod audio;
mod subtitles;
mod zoompan;

use thiserror::Error;

pub use audio::{AudioMix, MixDuration, MIX_OUTPUT_LABEL};
pub use subtitles::{escape_subtitles_path, SubtitlesFilter};
pub use zoompan::{ZoomPan, PAN_EXPONENT, ZOOM_EXPONENT};

/// Errors raised while building a filter value.
#[derive(Debug, Error, PartialEq)]
pub enum FilterError {
    #[error("{name} = {value} is outside [{min}, {max}]")]
    OutOfRange {
        name: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("zoompan needs at least 2 frames, got {0}")]
    TooFewFrames(u32),

    #[error("frame rate must be positive")]
    InvalidFrameRate,
}

/// A single filter that can be rendered to FFmpeg syntax.
pub trait FilterSpec {
    fn to_filter(&self) -> String;
}

/// Output frame rate filter (`fps=N`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fps(u32);

impl Fps {
    pub fn new(fps: u32) -> Result<Self, FilterError> {
        if fps == 0 {
            return Err(FilterError::InvalidFrameRate);
        }
        Ok(Self(fps))
    }
}

impl FilterSpec for Fps {
    fn to_filter(&self) -> String {
        format!("fps={}", self.0)
    }
}

/// Linear `-vf` chain of filters joined with `,`.
#[derive(Debug, Clone, Default)]
pub struct VideoFilterChain {
    filters: Vec<String>,
}

impl VideoFilterChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a filter to the chain.
    pub fn then(mut self, filter: &dyn FilterSpec) -> Self {
        self.filters.push(filter.to_filter());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    pub fn to_filter(&self) -> String {
        self.filters.join(",")
    }
}

pub(crate) fn check_range(
    name: &'static str,
    value: f64,
    min: f64,
    max: f64,
) -> Result<f64, FilterError> {
    if value.is_finite() && (min..=max).contains(&value) {
        Ok(value)
    } else {
        Err(FilterError::OutOfRange {
            name,
            value,
            min,
            max,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fps_rejects_zero() {
        assert_eq!(Fps::new(0), Err(FilterError::InvalidFrameRate));
        assert_eq!(Fps::new(25).unwrap().to_filter(), "fps=25");
    }

    #[test]
    fn test_chain_joins_with_commas() {
        let chain = VideoFilterChain::new()
            .then(&Fps::new(25).unwrap())
            .then(&Fps::new(30).unwrap());
        assert_eq!(chain.to_filter(), "fps=25,fps=30");
        assert!(VideoFilterChain::new().is_empty());
    }

    #[test]
    fn test_check_range_rejects_nan() {
        assert!(check_range("zoom", f64::NAN, 1.0, 1.5).is_err());
        assert_eq!(check_range("zoom", 1.2, 1.0, 1.5), Ok(1.2));
    }
}
