//! Video encoding configuration.
//!
//! The pipeline produces exactly one output format: a 768x1280 portrait
//! H.264 video at 25 fps with AAC stereo narration.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Default video codec (H.264)
pub const DEFAULT_VIDEO_CODEC: &str = "libx264";
/// Default encoding preset
pub const DEFAULT_PRESET: &str = "fast";
/// Default pixel format
pub const DEFAULT_PIXEL_FORMAT: &str = "yuv420p";
/// Output frame rate
pub const DEFAULT_FPS: u32 = 25;
/// Default audio codec
pub const DEFAULT_AUDIO_CODEC: &str = "aac";
/// Default audio bitrate
pub const DEFAULT_AUDIO_BITRATE: &str = "128k";
/// Narration channel count (stereo)
pub const DEFAULT_AUDIO_CHANNELS: u8 = 2;
/// Narration sample rate
pub const DEFAULT_AUDIO_SAMPLE_RATE: u32 = 44_100;

/// Portrait output width.
pub const OUTPUT_WIDTH: u32 = 768;
/// Portrait output height.
pub const OUTPUT_HEIGHT: u32 = 1280;

/// Output frame dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FrameSize {
    pub width: u32,
    pub height: u32,
}

impl FrameSize {
    /// The fixed vertical frame every clip is rendered at.
    pub const PORTRAIT: FrameSize = FrameSize {
        width: OUTPUT_WIDTH,
        height: OUTPUT_HEIGHT,
    };
}

impl Default for FrameSize {
    fn default() -> Self {
        Self::PORTRAIT
    }
}

impl fmt::Display for FrameSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Video encoding configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncodingConfig {
    /// Video codec (e.g., "libx264")
    #[serde(default = "default_video_codec")]
    pub codec: String,

    /// Encoding preset (e.g., "fast", "medium")
    #[serde(default = "default_preset")]
    pub preset: String,

    /// Pixel format for maximum player compatibility
    #[serde(default = "default_pixel_format")]
    pub pixel_format: String,

    /// Output frame rate
    #[serde(default = "default_fps")]
    pub fps: u32,

    /// Output frame size
    #[serde(default)]
    pub frame_size: FrameSize,

    /// Audio codec
    #[serde(default = "default_audio_codec")]
    pub audio_codec: String,

    /// Audio bitrate
    #[serde(default = "default_audio_bitrate")]
    pub audio_bitrate: String,

    /// Audio channels
    #[serde(default = "default_audio_channels")]
    pub audio_channels: u8,

    /// Audio sample rate in Hz
    #[serde(default = "default_audio_sample_rate")]
    pub audio_sample_rate: u32,
}

fn default_video_codec() -> String {
    DEFAULT_VIDEO_CODEC.to_string()
}
fn default_preset() -> String {
    DEFAULT_PRESET.to_string()
}
fn default_pixel_format() -> String {
    DEFAULT_PIXEL_FORMAT.to_string()
}
fn default_fps() -> u32 {
    DEFAULT_FPS
}
fn default_audio_codec() -> String {
    DEFAULT_AUDIO_CODEC.to_string()
}
fn default_audio_bitrate() -> String {
    DEFAULT_AUDIO_BITRATE.to_string()
}
fn default_audio_channels() -> u8 {
    DEFAULT_AUDIO_CHANNELS
}
fn default_audio_sample_rate() -> u32 {
    DEFAULT_AUDIO_SAMPLE_RATE
}

impl Default for EncodingConfig {
    fn default() -> Self {
        Self {
            codec: default_video_codec(),
            preset: default_preset(),
            pixel_format: default_pixel_format(),
            fps: DEFAULT_FPS,
            frame_size: FrameSize::PORTRAIT,
            audio_codec: default_audio_codec(),
            audio_bitrate: default_audio_bitrate(),
            audio_channels: DEFAULT_AUDIO_CHANNELS,
            audio_sample_rate: DEFAULT_AUDIO_SAMPLE_RATE,
        }
    }
}

impl EncodingConfig {
    /// Create a new encoding configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a new config with updated preset.
    pub fn with_preset(mut self, preset: impl Into<String>) -> Self {
        self.preset = preset.into();
        self
    }

    /// Duration of a single output frame in seconds.
    pub fn frame_interval(&self) -> f64 {
        1.0 / f64::from(self.fps.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_encoding() {
        let config = EncodingConfig::default();
        assert_eq!(config.codec, "libx264");
        assert_eq!(config.fps, 25);
        assert_eq!(config.frame_size, FrameSize::PORTRAIT);
        assert_eq!(config.audio_bitrate, "128k");
        assert_eq!(config.audio_channels, 2);
        assert_eq!(config.audio_sample_rate, 44_100);
    }

    #[test]
    fn test_frame_size_display() {
        assert_eq!(FrameSize::PORTRAIT.to_string(), "768x1280");
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let config: EncodingConfig = serde_json::from_str(r#"{"preset":"slow"}"#).unwrap();
        assert_eq!(config.preset, "slow");
        assert_eq!(config.codec, DEFAULT_VIDEO_CODEC);
        assert!((config.frame_interval() - 0.04).abs() < 1e-9);
    }
}
