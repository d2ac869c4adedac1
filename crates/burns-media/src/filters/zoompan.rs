//! Ken Burns pan/zoom as an FFmpeg `zoompan` filter.

use burns_models::effect::{PanPoint, PAN_MAX, PAN_MIN, ZOOM_MAX, ZOOM_MIN};
use burns_models::{EffectParams, FrameSize};

use super::{check_range, FilterError, FilterSpec};

/// Exponent of the zoom curve in normalized progress.
pub const ZOOM_EXPONENT: f64 = 2.0;
/// Exponent of the pan curve in normalized progress.
pub const PAN_EXPONENT: f64 = 1.5;

/// Validated zoompan parameters for one clip.
///
/// Zoom holds `zoom_start` for the first output frame, then follows
/// `start + (end - start) * ((n - 1) / (D - 1))^2`. Pan follows
/// `start + (end - start) * (n / D)^1.5` on each axis, scaled by the input
/// width/height.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomPan {
    zoom_start: f64,
    zoom_end: f64,
    pan_start: PanPoint,
    pan_end: PanPoint,
    frames: u32,
    size: FrameSize,
}

impl ZoomPan {
    pub fn new(effect: &EffectParams, frames: u32, size: FrameSize) -> Result<Self, FilterError> {
        if frames < 2 {
            return Err(FilterError::TooFewFrames(frames));
        }

        Ok(Self {
            zoom_start: check_range("zoom_start", effect.zoom_start, ZOOM_MIN, ZOOM_MAX)?,
            zoom_end: check_range("zoom_end", effect.zoom_end, ZOOM_MIN, ZOOM_MAX)?,
            pan_start: PanPoint::new(
                check_range("pan_start.x", effect.pan_start.x, PAN_MIN, PAN_MAX)?,
                check_range("pan_start.y", effect.pan_start.y, PAN_MIN, PAN_MAX)?,
            ),
            pan_end: PanPoint::new(
                check_range("pan_end.x", effect.pan_end.x, PAN_MIN, PAN_MAX)?,
                check_range("pan_end.y", effect.pan_end.y, PAN_MIN, PAN_MAX)?,
            ),
            frames,
            size,
        })
    }

    pub fn frames(&self) -> u32 {
        self.frames
    }

    /// Zoom factor FFmpeg will use at output frame `frame` (`on`).
    pub fn zoom_at(&self, frame: u32) -> f64 {
        if frame <= 1 {
            return self.zoom_start;
        }
        let progress = f64::from(frame - 1) / f64::from(self.frames - 1);
        self.zoom_start + (self.zoom_end - self.zoom_start) * progress.powf(ZOOM_EXPONENT)
    }

    /// Normalized pan offset at output frame `frame` (`on`).
    pub fn pan_at(&self, frame: u32) -> PanPoint {
        let progress = (f64::from(frame) / f64::from(self.frames)).powf(PAN_EXPONENT);
        PanPoint::new(
            self.pan_start.x + (self.pan_end.x - self.pan_start.x) * progress,
            self.pan_start.y + (self.pan_end.y - self.pan_start.y) * progress,
        )
    }

    fn zoom_expr(&self) -> String {
        let (zs, ze, d) = (self.zoom_start, self.zoom_end, self.frames);
        format!(
            "if(lte(on,1),{zs:.4},{zs:.4}+({ze:.4}-{zs:.4})*pow((on-1)/({d}-1),{ZOOM_EXPONENT}))"
        )
    }

    fn pan_expr(&self, dim: &str, start: f64, end: f64) -> String {
        let d = self.frames;
        format!("{dim}*({start:.4}+({end:.4}-{start:.4})*pow(on/{d},{PAN_EXPONENT}))")
    }
}

impl FilterSpec for ZoomPan {
    fn to_filter(&self) -> String {
        format!(
            "zoompan=z='{}':x='{}':y='{}':d={}:s={}",
            self.zoom_expr(),
            self.pan_expr("iw", self.pan_start.x, self.pan_end.x),
            self.pan_expr("ih", self.pan_start.y, self.pan_end.y),
            self.frames,
            self.size
        )
    }
}
