#![deny(unreachable_patterns)]
//! FFmpeg CLI wrapper for Ken Burns slideshow rendering.
//!
//! This crate provides:
//! - Type-safe FFmpeg/FFprobe command building
//! - A process executor abstraction with timeout and cancellation
//! - Typed filter-graph builders (zoompan, subtitles, amix)
//! - Randomized pan/zoom effect synthesis
//! - One module per pipeline stage (render, concat, mux, subtitles, music)

pub mod command;
pub mod concat;
pub mod effect;
pub mod error;
pub mod filters;
pub mod fs_utils;
pub mod music;
pub mod mux;
pub mod probe;
pub mod progress;
pub mod render;
pub mod silence;
pub mod srt;
pub mod subtitles;

#[cfg(test)]
mod test_support;

pub use command::{
    check_ffmpeg, check_ffprobe, CommandExecutor, FfmpegCommand, FfmpegRunner, FfprobeCommand,
    ProcessOutput,
};
pub use concat::{concat_clips, manifest_contents, verify_clips, write_manifest};
pub use effect::{random_effect, synthesize_effect};
pub use error::{MediaError, MediaResult};
pub use filters::{
    AudioMix, FilterError, FilterSpec, Fps, SubtitlesFilter, VideoFilterChain, ZoomPan,
};
pub use fs_utils::{remove_files, remove_if_exists, verify_output};
pub use music::{add_background_music, mix_music, trim_music};
pub use mux::{mux_narration, MuxOutcome};
pub use probe::{duration_or_fallback, has_audio_stream, probe_duration, FALLBACK_DURATION_SECS};
pub use progress::FfmpegProgress;
pub use render::{clip_command, render_clip};
pub use silence::{
    check_narration, parse_mean_volume, AudioCheck, SilenceReason, SILENCE_THRESHOLD_DB,
};
pub use srt::{chunk_words, cues_from_text, format_srt, parse_srt, SrtError, SubtitleCue};
pub use subtitles::burn_subtitles;
