//! Spawn-wave rules.
//!
//! Pure functions over the config and an injected RNG; the session controller
//! decides when a wave runs and owns the entities these rules describe.

use rand::Rng;

use crate::config::SpawnConfig;
use crate::entities::{Field, PowerUpKind};

/// `gen_bool` panics outside `[0, 1]`, NaN included.
fn chance(p: f64) -> f64 {
    if p.is_nan() {
        0.0
    } else {
        p.clamp(0.0, 1.0)
    }
}

/// Number of bugs in the next wave.
///
/// Waves grow as the delay shrinks (one extra bug below each boost threshold)
/// and roll for one more on top. Freeze halves the result, keeping at least one.
pub fn wave_size(cfg: &SpawnConfig, delay_ms: f64, freeze: bool, rng: &mut impl Rng) -> u32 {
    let mid_boost = u32::from(delay_ms < cfg.mid_boost_below_ms);
    let late_boost = u32::from(delay_ms < cfg.late_boost_below_ms);
    let lucky = u32::from(rng.gen_bool(chance(cfg.extra_bug_chance)));
    let count = cfg.base_bugs + mid_boost + late_boost + lucky;
    if freeze {
        (count / 2).max(1)
    } else {
        count
    }
}

/// Delay before the wave after this one.
///
/// Without freeze the delay decays towards the floor. Freeze swaps the decay for
/// a slight growth, so the cadence cannot speed up while it lasts.
pub fn next_spawn_delay(cfg: &SpawnConfig, delay_ms: f64, freeze: bool) -> f64 {
    let factor = if freeze {
        cfg.freeze_factor
    } else {
        cfg.acceleration
    };
    (delay_ms * factor).max(cfg.min_delay_ms)
}

pub fn rolls_power_up(cfg: &SpawnConfig, rng: &mut impl Rng) -> bool {
    rng.gen_bool(chance(cfg.power_up_chance))
}

/// Uniform top-left position inside the field inset by `margin` on every side.
///
/// A field too small for the margin collapses the range onto the margin line.
pub fn random_position(field: Field, margin: f64, rng: &mut impl Rng) -> (f64, f64) {
    let span_x = (field.width - margin * 2.0).max(0.0);
    let span_y = (field.height - margin * 2.0).max(0.0);
    let x = rng.gen::<f64>() * span_x + margin;
    let y = rng.gen::<f64>() * span_y + margin;
    (x, y)
}

pub fn random_kind(rng: &mut impl Rng) -> PowerUpKind {
    PowerUpKind::ALL[rng.gen_range(0..PowerUpKind::ALL.len())]
}

pub fn random_variant(rng: &mut impl Rng) -> u8 {
    rng.gen_range(1..=4)
}
