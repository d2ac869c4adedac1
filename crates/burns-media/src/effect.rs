//! Randomized Ken Burns effect synthesis.

use rand::seq::IndexedRandom;
use rand::Rng;
use tracing::trace;

use burns_models::effect::{PanPoint, MIN_PAN_TRAVEL, PAN_MAX, PAN_MIN};
use burns_models::{Easing, EffectParams};

/// Range of the first zoom draw.
const ZOOM_START_RANGE: (f64, f64) = (1.0, 1.4);
/// Range of the second zoom draw.
const ZOOM_END_RANGE: (f64, f64) = (1.2, 1.5);
/// Offset applied to a pan end point that travels too little.
const PAN_NUDGE: f64 = 0.2;

/// Draw one [`EffectParams`] for a clip of `frames` frames.
///
/// Zoom start/end are swapped half of the time so clips zoom out as well as
/// in. Pan axes that travel less than [`MIN_PAN_TRAVEL`] are nudged by
/// [`PAN_NUDGE`] in a random direction and clamped; if clamping eats the
/// travel the nudge goes the other way.
pub fn synthesize_effect<R: Rng + ?Sized>(rng: &mut R, frames: u32) -> EffectParams {
    let mut zoom_start = rng.random_range(ZOOM_START_RANGE.0..=ZOOM_START_RANGE.1);
    let mut zoom_end = rng.random_range(ZOOM_END_RANGE.0..=ZOOM_END_RANGE.1);
    if rng.random_bool(0.5) {
        std::mem::swap(&mut zoom_start, &mut zoom_end);
    }

    let (start_x, end_x) = pan_axis(rng);
    let (start_y, end_y) = pan_axis(rng);

    let easing = Easing::ALL.choose(rng).copied().unwrap_or_default();

    let effect = EffectParams {
        zoom_start,
        zoom_end,
        pan_start: PanPoint::new(start_x, start_y),
        pan_end: PanPoint::new(end_x, end_y),
        easing,
    };
    trace!(frames, effect = %effect.summary(), "Synthesized effect");
    effect
}

/// Draw an effect from the thread-local generator.
pub fn random_effect(frames: u32) -> EffectParams {
    synthesize_effect(&mut rand::rng(), frames)
}

fn pan_axis<R: Rng + ?Sized>(rng: &mut R) -> (f64, f64) {
    let start = rng.random_range(PAN_MIN..=PAN_MAX);
    let end = rng.random_range(PAN_MIN..=PAN_MAX);

    if (end - start).abs() >= MIN_PAN_TRAVEL {
        return (start, end);
    }

    let direction = if rng.random_bool(0.5) { 1.0 } else { -1.0 };
    let nudged = (start + direction * PAN_NUDGE).clamp(PAN_MIN, PAN_MAX);
    if (nudged - start).abs() >= MIN_PAN_TRAVEL {
        (start, nudged)
    } else {
        (start, (start - direction * PAN_NUDGE).clamp(PAN_MIN, PAN_MAX))
    }
}
