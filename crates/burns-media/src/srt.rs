//! SubRip (`.srt`) cue parsing and generation.

use serde::Serialize;
use std::fmt::Write as _;
use thiserror::Error;

/// Fewest words per generated caption.
pub const MIN_CAPTION_WORDS: usize = 4;
/// Most words per generated caption.
pub const MAX_CAPTION_WORDS: usize = 8;

/// One timed caption.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubtitleCue {
    /// One-based cue number
    pub index: usize,
    pub start_ms: u64,
    pub end_ms: u64,
    pub text: String,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SrtError {
    #[error("subtitle file contains no cues")]
    Empty,

    #[error("line {line}: expected cue number, got {found:?}")]
    InvalidIndex { line: usize, found: String },

    #[error("line {line}: invalid timing line {found:?}")]
    InvalidTiming { line: usize, found: String },

    #[error("cue {index}: ends before it starts")]
    EndBeforeStart { index: usize },

    #[error("cue {index}: no text")]
    MissingText { index: usize },
}

/// Parse `HH:MM:SS,mmm` into milliseconds.
pub fn parse_timestamp(value: &str) -> Option<u64> {
    let (hms, ms) = value.trim().split_once(',')?;
    let mut parts = hms.split(':');
    let h: u64 = parts.next()?.parse().ok()?;
    let m: u64 = parts.next()?.parse().ok()?;
    let s: u64 = parts.next()?.parse().ok()?;
    if parts.next().is_some() || m >= 60 || s >= 60 || ms.len() != 3 {
        return None;
    }
    let ms: u64 = ms.parse().ok()?;
    Some(((h * 60 + m) * 60 + s) * 1000 + ms)
}

/// Format milliseconds as `HH:MM:SS,mmm`.
pub fn format_timestamp(ms: u64) -> String {
    let (h, rest) = (ms / 3_600_000, ms % 3_600_000);
    let (m, rest) = (rest / 60_000, rest % 60_000);
    let (s, ms) = (rest / 1000, rest % 1000);
    format!("{h:02}:{m:02}:{s:02},{ms:03}")
}

/// Parse SubRip text into cues.
///
/// Accepts CRLF line endings and a leading byte-order mark.
pub fn parse_srt(text: &str) -> Result<Vec<SubtitleCue>, SrtError> {
    let text = text.trim_start_matches('\u{feff}');
    let lines: Vec<&str> = text.lines().map(|l| l.trim_end_matches('\r')).collect();

    let mut cues = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        if lines[i].trim().is_empty() {
            i += 1;
            continue;
        }

        let line_no = i + 1;
        let index: usize = lines[i]
            .trim()
            .parse()
            .map_err(|_| SrtError::InvalidIndex {
                line: line_no,
                found: lines[i].to_string(),
            })?;
        i += 1;

        let timing = lines.get(i).copied().unwrap_or_default();
        let invalid_timing = || SrtError::InvalidTiming {
            line: i + 1,
            found: timing.to_string(),
        };
        let (start, end) = timing.split_once("-->").ok_or_else(invalid_timing)?;
        let start_ms = parse_timestamp(start).ok_or_else(invalid_timing)?;
        // Positioning hints may follow the end timestamp
        let end = end.split_whitespace().next().unwrap_or_default();
        let end_ms = parse_timestamp(end).ok_or_else(invalid_timing)?;
        if end_ms < start_ms {
            return Err(SrtError::EndBeforeStart { index });
        }
        i += 1;

        let mut body = Vec::new();
        while i < lines.len() && !lines[i].trim().is_empty() {
            body.push(lines[i]);
            i += 1;
        }
        if body.is_empty() {
            return Err(SrtError::MissingText { index });
        }

        cues.push(SubtitleCue {
            index,
            start_ms,
            end_ms,
            text: body.join("\n"),
        });
    }

    if cues.is_empty() {
        return Err(SrtError::Empty);
    }
    Ok(cues)
}

/// Render cues as SubRip text with LF line endings.
pub fn format_srt(cues: &[SubtitleCue]) -> String {
    let mut out = String::new();
    for cue in cues {
        let _ = write!(
            out,
            "{}\n{} --> {}\n{}\n\n",
            cue.index,
            format_timestamp(cue.start_ms),
            format_timestamp(cue.end_ms),
            cue.text
        );
    }
    out
}

/// Split narration text into caption chunks.
///
/// Chunks take [`MAX_CAPTION_WORDS`] words while enough remain; the tail
/// becomes the last chunk.
pub fn chunk_words(text: &str) -> Vec<String> {
    let words: Vec<&str> = text.split_whitespace().collect();
    let mut chunks = Vec::new();
    let mut i = 0;
    while i < words.len() {
        let remaining = words.len() - i;
        let size = remaining.max(MIN_CAPTION_WORDS).min(MAX_CAPTION_WORDS);
        let end = (i + size).min(words.len());
        chunks.push(words[i..end].join(" "));
        i = end;
    }
    chunks
}

/// Time narration text as evenly spaced captions over `total_duration` seconds.
///
/// The last cue always ends exactly at `total_duration`.
pub fn cues_from_text(text: &str, total_duration: f64) -> Vec<SubtitleCue> {
    let chunks = chunk_words(text);
    let total_ms = (total_duration.max(0.0) * 1000.0) as u64;
    let count = chunks.len() as u64;

    chunks
        .into_iter()
        .enumerate()
        .map(|(idx, text)| {
            let idx = idx as u64;
            let start_ms = total_ms * idx / count;
            let end_ms = if idx + 1 == count {
                total_ms
            } else {
                total_ms * (idx + 1) / count
            };
            SubtitleCue {
                index: idx as usize + 1,
                start_ms,
                end_ms,
                text,
            }
        })
        .collect()
}
