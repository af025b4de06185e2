//! Tunable game constants.
//!
//! Defaults reproduce the classic 30-second Bug Blaster round. Any subset can be
//! overridden from a TOML file; missing keys keep their defaults.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;

/// Longest spawn delay a config may ask for: one hour.
const MAX_DELAY_MS: f64 = 3_600_000.0;
const MAX_FREEZE_FACTOR: f64 = 10.0;

fn ms(value: u64) -> Duration {
    Duration::from_millis(value)
}

fn invalid(field: &'static str, reason: &'static str) -> ConfigError {
    ConfigError::Invalid { field, reason }
}

fn finite(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(invalid(field, "must be finite"))
    }
}

fn non_negative(field: &'static str, value: f64) -> Result<(), ConfigError> {
    finite(field, value)?;
    if value < 0.0 {
        return Err(invalid(field, "must not be negative"));
    }
    Ok(())
}

fn positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    finite(field, value)?;
    if value <= 0.0 {
        return Err(invalid(field, "must be positive"));
    }
    Ok(())
}

fn probability(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(invalid(field, "must be a probability in [0, 1]"))
    }
}

fn delay(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value > 0.0 && value <= MAX_DELAY_MS {
        Ok(())
    } else {
        Err(invalid(field, "must be in (0, 3600000] ms"))
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Length of one round.
    pub session_seconds: u32,
    pub spawn: SpawnConfig,
    pub shots: ShotConfig,
    pub scoring: ScoringConfig,
    pub effects: EffectConfig,
    pub blaster: BlasterConfig,
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            session_seconds: 30,
            spawn: SpawnConfig::default(),
            shots: ShotConfig::default(),
            scoring: ScoringConfig::default(),
            effects: EffectConfig::default(),
            blaster: BlasterConfig::default(),
        }
    }
}

impl GameConfig {
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: GameConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects values that would stall or crash a round: non-finite numbers,
    /// probabilities outside `[0, 1]`, delays a timer cannot hold, inverted
    /// speed ranges and point values that overflow once doubled.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let spawn = &self.spawn;
        delay("spawn.initial_delay_ms", spawn.initial_delay_ms)?;
        delay("spawn.min_delay_ms", spawn.min_delay_ms)?;
        if spawn.min_delay_ms > spawn.initial_delay_ms {
            return Err(invalid("spawn.min_delay_ms", "must not exceed initial_delay_ms"));
        }
        if !(spawn.acceleration > 0.0 && spawn.acceleration <= 1.0) {
            return Err(invalid("spawn.acceleration", "must be in (0, 1]"));
        }
        if !(1.0..=MAX_FREEZE_FACTOR).contains(&spawn.freeze_factor) {
            return Err(invalid("spawn.freeze_factor", "must be in [1, 10]"));
        }
        finite("spawn.mid_boost_below_ms", spawn.mid_boost_below_ms)?;
        finite("spawn.late_boost_below_ms", spawn.late_boost_below_ms)?;
        probability("spawn.extra_bug_chance", spawn.extra_bug_chance)?;
        probability("spawn.power_up_chance", spawn.power_up_chance)?;
        non_negative("spawn.bug_margin", spawn.bug_margin)?;
        non_negative("spawn.power_up_margin", spawn.power_up_margin)?;
        positive("spawn.bug_size", spawn.bug_size)?;
        positive("spawn.power_up_width", spawn.power_up_width)?;
        positive("spawn.power_up_height", spawn.power_up_height)?;

        let shots = &self.shots;
        if shots.burst_offsets.iter().any(|offset| !offset.is_finite()) {
            return Err(invalid("shots.burst_offsets", "must be finite"));
        }
        positive("shots.min_speed", shots.min_speed)?;
        positive("shots.max_speed", shots.max_speed)?;
        if shots.min_speed > shots.max_speed {
            return Err(invalid("shots.min_speed", "must not exceed max_speed"));
        }
        finite("shots.drift_per_offset", shots.drift_per_offset)?;
        non_negative("shots.drift_jitter", shots.drift_jitter)?;
        finite("shots.origin_from_bottom", shots.origin_from_bottom)?;
        non_negative("shots.out_of_bounds_margin", shots.out_of_bounds_margin)?;
        positive("shots.width", shots.width)?;
        positive("shots.height", shots.height)?;

        let scoring = &self.scoring;
        for (field, points) in [
            ("scoring.direct_hit", scoring.direct_hit),
            ("scoring.chain_hit", scoring.chain_hit),
            ("scoring.mega_per_bug", scoring.mega_per_bug),
        ] {
            if points.checked_mul(scoring.double_multiplier).is_none() {
                return Err(invalid(field, "overflows once doubled"));
            }
        }
        non_negative("scoring.chain_radius", scoring.chain_radius)?;

        positive("blaster.width", self.blaster.width)?;
        non_negative("blaster.step", self.blaster.step)?;
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }
}

// ── Spawning ─────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct SpawnConfig {
    pub initial_delay_ms: f64,
    pub min_delay_ms: f64,
    /// Multiplier applied to the delay after every wave.
    pub acceleration: f64,
    /// Multiplier used instead of `acceleration` while freeze is active.
    pub freeze_factor: f64,
    pub base_bugs: u32,
    /// One extra bug per wave once the delay drops below this.
    pub mid_boost_below_ms: f64,
    /// And another below this.
    pub late_boost_below_ms: f64,
    pub extra_bug_chance: f64,
    pub power_up_chance: f64,
    pub max_live_power_ups: usize,
    pub bug_margin: f64,
    pub power_up_margin: f64,
    pub bug_lifetime_ms: u64,
    pub power_up_lifetime_ms: u64,
    pub bug_size: f64,
    pub power_up_width: f64,
    pub power_up_height: f64,
}

impl Default for SpawnConfig {
    fn default() -> Self {
        SpawnConfig {
            initial_delay_ms: 650.0,
            min_delay_ms: 180.0,
            acceleration: 0.9,
            freeze_factor: 1.02,
            base_bugs: 2,
            mid_boost_below_ms: 600.0,
            late_boost_below_ms: 420.0,
            extra_bug_chance: 0.55,
            power_up_chance: 0.18,
            max_live_power_ups: 2,
            bug_margin: 60.0,
            power_up_margin: 70.0,
            bug_lifetime_ms: 4000,
            power_up_lifetime_ms: 5000,
            bug_size: 44.0,
            power_up_width: 72.0,
            power_up_height: 32.0,
        }
    }
}

impl SpawnConfig {
    pub fn bug_lifetime(&self) -> Duration {
        ms(self.bug_lifetime_ms)
    }

    pub fn power_up_lifetime(&self) -> Duration {
        ms(self.power_up_lifetime_ms)
    }
}

// ── Projectiles ──────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct ShotConfig {
    /// Horizontal offsets of the shots in one burst, relative to the blaster centre.
    pub burst_offsets: Vec<f64>,
    /// Minimum time between two bursts.
    pub cooldown_ms: u64,
    /// Cadence of the automatic spray while a session runs.
    pub auto_fire_interval_ms: u64,
    /// Length of one animation frame.
    pub frame_ms: u64,
    pub min_speed: f64,
    pub max_speed: f64,
    /// Drift contributed by each pixel of burst offset.
    pub drift_per_offset: f64,
    /// Width of the uniform random drift added on top.
    pub drift_jitter: f64,
    /// Shots start this far above the bottom of the field.
    pub origin_from_bottom: f64,
    /// How far past the field edges a shot may travel before it is dropped.
    pub out_of_bounds_margin: f64,
    pub width: f64,
    pub height: f64,
}

impl Default for ShotConfig {
    fn default() -> Self {
        ShotConfig {
            burst_offsets: vec![-14.0, 0.0, 14.0],
            cooldown_ms: 120,
            auto_fire_interval_ms: 160,
            frame_ms: 16,
            min_speed: 11.0,
            max_speed: 13.0,
            drift_per_offset: 0.02,
            drift_jitter: 0.6,
            origin_from_bottom: 80.0,
            out_of_bounds_margin: 40.0,
            width: 6.0,
            height: 14.0,
        }
    }
}

impl ShotConfig {
    pub fn cooldown(&self) -> Duration {
        ms(self.cooldown_ms)
    }

    pub fn auto_fire_interval(&self) -> Duration {
        ms(self.auto_fire_interval_ms)
    }

    pub fn frame(&self) -> Duration {
        ms(self.frame_ms)
    }
}

// ── Scoring ──────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub direct_hit: u32,
    pub chain_hit: u32,
    pub mega_per_bug: u32,
    pub double_multiplier: u32,
    pub chain_radius: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        ScoringConfig {
            direct_hit: 10,
            chain_hit: 5,
            mega_per_bug: 3,
            double_multiplier: 2,
            chain_radius: 70.0,
        }
    }
}

// ── Effects ──────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct EffectConfig {
    pub freeze_ms: u64,
    pub double_ms: u64,
    pub blast_ring_ms: u64,
    pub flash_ms: u64,
}

impl Default for EffectConfig {
    fn default() -> Self {
        EffectConfig {
            freeze_ms: 3500,
            double_ms: 6000,
            blast_ring_ms: 350,
            flash_ms: 400,
        }
    }
}

impl EffectConfig {
    pub fn freeze(&self) -> Duration {
        ms(self.freeze_ms)
    }

    pub fn double(&self) -> Duration {
        ms(self.double_ms)
    }

    pub fn blast_ring(&self) -> Duration {
        ms(self.blast_ring_ms)
    }

    pub fn flash(&self) -> Duration {
        ms(self.flash_ms)
    }
}

// ── Blaster ──────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct BlasterConfig {
    pub width: f64,
    /// Distance covered by one key press.
    pub step: f64,
}

impl Default for BlasterConfig {
    fn default() -> Self {
        BlasterConfig {
            width: 160.0,
            step: 30.0,
        }
    }
}
