//! Worker configuration.

use std::path::PathBuf;
use std::time::Duration;

use burns_media::SILENCE_THRESHOLD_DB;
use burns_models::EncodingConfig;

/// Default per-stage encoder timeout.
pub const DEFAULT_STAGE_TIMEOUT_SECS: u64 = 600;

/// Worker configuration.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Root holding `scene_*` directories
    pub static_dir: PathBuf,
    /// Timeout applied to every encoder invocation
    pub stage_timeout: Duration,
    /// Maximum clips rendered concurrently (1 = sequential)
    pub max_render_parallel: usize,
    /// Mean volume below which narration counts as silent
    pub silence_threshold_db: f64,
    /// Where to write Prometheus text exposition at exit
    pub metrics_path: Option<PathBuf>,
    /// Seed for effect synthesis; fresh entropy when unset
    pub effect_seed: Option<u64>,
    /// Encoder settings
    pub encoding: EncodingConfig,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            static_dir: PathBuf::from("static"),
            stage_timeout: Duration::from_secs(DEFAULT_STAGE_TIMEOUT_SECS),
            max_render_parallel: 1,
            silence_threshold_db: SILENCE_THRESHOLD_DB,
            metrics_path: None,
            effect_seed: None,
            encoding: EncodingConfig::default(),
        }
    }
}

impl WorkerConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create config from an arbitrary key lookup.
    ///
    /// Unparseable values fall back to their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let parsed = |key: &str| lookup(key).and_then(|s| s.trim().parse::<u64>().ok());

        Self {
            static_dir: lookup("BURNS_STATIC_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.static_dir),
            stage_timeout: parsed("BURNS_STAGE_TIMEOUT_SECS")
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs)
                .unwrap_or(defaults.stage_timeout),
            max_render_parallel: parsed("BURNS_MAX_RENDER_PARALLEL")
                .map(|n| (n as usize).max(1))
                .unwrap_or(defaults.max_render_parallel),
            silence_threshold_db: lookup("BURNS_SILENCE_THRESHOLD_DB")
                .and_then(|s| s.trim().parse::<f64>().ok())
                .filter(|db| db.is_finite())
                .unwrap_or(defaults.silence_threshold_db),
            metrics_path: lookup("BURNS_METRICS_PATH")
                .filter(|s| !s.trim().is_empty())
                .map(PathBuf::from),
            effect_seed: parsed("BURNS_EFFECT_SEED"),
            encoding: EncodingConfig::default().with_preset(
                lookup("BURNS_X264_PRESET").unwrap_or(defaults.encoding.preset),
            ),
        }
    }
}
