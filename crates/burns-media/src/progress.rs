//! FFmpeg `-progress` parsing.

use serde::{Deserialize, Serialize};

/// Keys FFmpeg writes in `-progress` blocks.
const PROGRESS_KEYS: &[&str] = &[
    "frame",
    "fps",
    "bitrate",
    "total_size",
    "out_time_us",
    "out_time_ms",
    "out_time",
    "dup_frames",
    "drop_frames",
    "speed",
    "progress",
];

/// Progress snapshot, emitted once per `progress=` block.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FfmpegProgress {
    pub frame: u64,
    pub fps: f64,
    /// Output time in milliseconds
    pub out_time_ms: i64,
    /// Output time as string (HH:MM:SS.microseconds)
    pub out_time: String,
    /// Encoding speed (1.5 = 1.5x realtime)
    pub speed: f64,
    pub is_complete: bool,
}

impl FfmpegProgress {
    /// Whether a stderr line belongs to a progress block rather than the log.
    pub fn is_progress_line(line: &str) -> bool {
        line.trim()
            .split_once('=')
            .map(|(key, _)| PROGRESS_KEYS.contains(&key) || key.starts_with("stream_"))
            .unwrap_or(false)
    }

    /// Fold one `key=value` line into the running snapshot.
    ///
    /// Returns a copy when the line closes a block.
    pub fn apply_line(&mut self, line: &str) -> Option<FfmpegProgress> {
        let (key, value) = line.trim().split_once('=')?;
        match key {
            // Both keys carry microseconds despite the name
            "out_time_ms" | "out_time_us" => {
                if let Ok(us) = value.parse::<i64>() {
                    self.out_time_ms = us / 1000;
                }
            }
            "out_time" => self.out_time = value.to_string(),
            "frame" => {
                if let Ok(frame) = value.parse() {
                    self.frame = frame;
                }
            }
            "fps" => {
                if let Ok(fps) = value.parse() {
                    self.fps = fps;
                }
            }
            // "1.5x" or "N/A"
            "speed" => {
                if let Some(speed) = value.strip_suffix('x').and_then(|s| s.trim().parse().ok()) {
                    self.speed = speed;
                }
            }
            "progress" => {
                self.is_complete = value == "end";
                return Some(self.clone());
            }
            _ => {}
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_is_emitted_on_progress_key() {
        let mut progress = FfmpegProgress::default();

        assert!(progress.apply_line("frame=75").is_none());
        assert!(progress.apply_line("out_time_us=3000000").is_none());
        assert!(progress.apply_line("speed=1.5x").is_none());

        let snapshot = progress.apply_line("progress=continue").unwrap();
        assert_eq!(snapshot.frame, 75);
        assert_eq!(snapshot.out_time_ms, 3000);
        assert!((snapshot.speed - 1.5).abs() < 0.01);
        assert!(!snapshot.is_complete);

        assert!(progress.apply_line("progress=end").unwrap().is_complete);
    }

    #[test]
    fn test_unparseable_speed_keeps_previous_value() {
        let mut progress = FfmpegProgress {
            speed: 2.0,
            ..Default::default()
        };
        progress.apply_line("speed=N/A");
        assert_eq!(progress.speed, 2.0);
    }

    #[test]
    fn test_progress_line_detection() {
        assert!(FfmpegProgress::is_progress_line("frame=12"));
        assert!(FfmpegProgress::is_progress_line("stream_0_0_q=28.0"));
        assert!(!FfmpegProgress::is_progress_line(
            "[Parsed_volumedetect_0 @ 0x1] mean_volume: -20.1 dB"
        ));
        assert!(!FfmpegProgress::is_progress_line("Error opening input"));
    }
}
