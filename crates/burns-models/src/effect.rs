//! Ken Burns pan/zoom effect parameters.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Smallest zoom factor (no magnification).
pub const ZOOM_MIN: f64 = 1.0;
/// Largest zoom factor.
pub const ZOOM_MAX: f64 = 1.5;
/// Smallest normalized pan coordinate.
pub const PAN_MIN: f64 = 0.0;
/// Largest normalized pan coordinate.
pub const PAN_MAX: f64 = 0.3;
/// Minimum per-axis distance between pan start and end.
pub const MIN_PAN_TRAVEL: f64 = 0.1;

/// Easing tag attached to an effect.
///
/// The tag is recorded and logged; the renderer's motion curves do not
/// depend on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Easing {
    #[default]
    None,
    EaseIn,
    EaseOut,
    EaseInOut,
}

impl Easing {
    pub const ALL: &'static [Easing] = &[
        Easing::None,
        Easing::EaseIn,
        Easing::EaseOut,
        Easing::EaseInOut,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Easing::None => "none",
            Easing::EaseIn => "ease-in",
            Easing::EaseOut => "ease-out",
            Easing::EaseInOut => "ease-in-out",
        }
    }
}

impl fmt::Display for Easing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Easing {
    type Err = EasingParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "none" | "" => Ok(Easing::None),
            "ease-in" | "in" => Ok(Easing::EaseIn),
            "ease-out" | "out" => Ok(Easing::EaseOut),
            "ease-in-out" | "in_out" => Ok(Easing::EaseInOut),
            _ => Err(EasingParseError(s.to_string())),
        }
    }
}

#[derive(Debug, Error)]
#[error("Unknown easing: {0}")]
pub struct EasingParseError(String);

/// Normalized pan coordinate, both axes in `[PAN_MIN, PAN_MAX]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PanPoint {
    pub x: f64,
    pub y: f64,
}

impl PanPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// One randomized pan/zoom parameter set for a single image.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EffectParams {
    pub zoom_start: f64,
    pub zoom_end: f64,
    pub pan_start: PanPoint,
    pub pan_end: PanPoint,
    pub easing: Easing,
}

impl EffectParams {
    /// Whether the zoom factor decreases over the clip.
    pub fn is_zoom_out(&self) -> bool {
        self.zoom_end < self.zoom_start
    }

    /// Absolute horizontal pan distance.
    pub fn pan_travel_x(&self) -> f64 {
        (self.pan_end.x - self.pan_start.x).abs()
    }

    /// Absolute vertical pan distance.
    pub fn pan_travel_y(&self) -> f64 {
        (self.pan_end.y - self.pan_start.y).abs()
    }

    /// Check every range and travel invariant of a generated effect.
    pub fn is_valid(&self) -> bool {
        let zoom_ok = |z: f64| (ZOOM_MIN..=ZOOM_MAX).contains(&z);
        let pan_ok = |p: f64| (PAN_MIN..=PAN_MAX).contains(&p);

        zoom_ok(self.zoom_start)
            && zoom_ok(self.zoom_end)
            && pan_ok(self.pan_start.x)
            && pan_ok(self.pan_start.y)
            && pan_ok(self.pan_end.x)
            && pan_ok(self.pan_end.y)
            && self.pan_travel_x() >= MIN_PAN_TRAVEL - f64::EPSILON
            && self.pan_travel_y() >= MIN_PAN_TRAVEL - f64::EPSILON
    }

    /// Short human-readable summary used in logs.
    pub fn summary(&self) -> String {
        format!(
            "zoom {:.2}->{:.2}, pan ({:.2},{:.2})->({:.2},{:.2}), easing {}",
            self.zoom_start,
            self.zoom_end,
            self.pan_start.x,
            self.pan_start.y,
            self.pan_end.x,
            self.pan_end.y,
            self.easing
        )
    }
}
