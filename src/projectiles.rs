//! Projectile rules: burst creation, per-frame movement and hit testing.

use rand::Rng;

use crate::config::ShotConfig;
use crate::entities::{Bug, Field, PowerUp, Rect, Shot};

/// What a shot ran into this frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Hit {
    /// Index into the live bug list.
    Bug(usize),
    /// Index into the live power-up list.
    PowerUp(usize),
}

/// One shot per configured offset, fired from `origin_x` at `origin_y`.
pub fn burst(cfg: &ShotConfig, origin_x: f64, origin_y: f64, rng: &mut impl Rng) -> Vec<Shot> {
    cfg.burst_offsets
        .iter()
        .map(|&offset| {
            let jitter = (rng.gen::<f64>() - 0.5) * cfg.drift_jitter;
            let speed = cfg.min_speed + rng.gen::<f64>() * (cfg.max_speed - cfg.min_speed);
            Shot {
                x: origin_x + offset,
                y: origin_y,
                drift: offset * cfg.drift_per_offset + jitter,
                speed,
                variant: rng.gen_range(1..=3),
            }
        })
        .collect()
}

/// Move a shot by one frame.
pub fn advance_shot(shot: &mut Shot) {
    shot.y -= shot.speed;
    shot.x += shot.drift;
}

pub fn is_out_of_bounds(cfg: &ShotConfig, shot: &Shot, field: Field) -> bool {
    let m = cfg.out_of_bounds_margin;
    shot.y < -m || shot.x < -m || shot.x > field.width + m
}

pub fn shot_rect(cfg: &ShotConfig, shot: &Shot) -> Rect {
    Rect::new(shot.x, shot.y, cfg.width, cfg.height)
}

/// First overlapping target, bugs before power-ups, each in insertion order.
pub fn first_hit(cfg: &ShotConfig, shot: &Shot, bugs: &[Bug], power_ups: &[PowerUp]) -> Option<Hit> {
    let rect = shot_rect(cfg, shot);
    if let Some(index) = bugs.iter().position(|bug| rect.overlaps(&bug.rect)) {
        return Some(Hit::Bug(index));
    }
    power_ups
        .iter()
        .position(|power_up| rect.overlaps(&power_up.rect))
        .map(Hit::PowerUp)
}
