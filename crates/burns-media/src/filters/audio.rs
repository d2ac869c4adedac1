//! Audio mixing filter graph.

use super::FilterSpec;

/// Output label of the mixed audio stream.
pub const MIX_OUTPUT_LABEL: &str = "aout";

/// Which input decides the length of an `amix` output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MixDuration {
    First,
    Longest,
    Shortest,
}

impl MixDuration {
    fn as_str(&self) -> &'static str {
        match self {
            MixDuration::First => "first",
            MixDuration::Longest => "longest",
            MixDuration::Shortest => "shortest",
        }
    }
}

/// Two-input additive mix of the narration (input 0) and music (input 1).
#[derive(Debug, Clone, PartialEq)]
pub struct AudioMix {
    pub duration: MixDuration,
    /// Seconds over which volume is renormalized when an input ends
    pub dropout_transition: f64,
}

impl AudioMix {
    /// Narration-led mix: lasts as long as the narration, 2 s dropout.
    pub fn narration_led() -> Self {
        Self {
            duration: MixDuration::First,
            dropout_transition: 2.0,
        }
    }

    /// `-map` target for the mixed stream.
    pub fn output_map(&self) -> String {
        format!("[{}]", MIX_OUTPUT_LABEL)
    }
}

impl Default for AudioMix {
    fn default() -> Self {
        Self::narration_led()
    }
}

impl FilterSpec for AudioMix {
    fn to_filter(&self) -> String {
        format!(
            "[0:a][1:a]amix=inputs=2:duration={}:dropout_transition={}[{}]",
            self.duration.as_str(),
            self.dropout_transition,
            MIX_OUTPUT_LABEL
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_narration_led_mix() {
        let mix = AudioMix::narration_led();
        assert_eq!(
            mix.to_filter(),
            "[0:a][1:a]amix=inputs=2:duration=first:dropout_transition=2[aout]"
        );
        assert_eq!(mix.output_map(), "[aout]");
    }
}
