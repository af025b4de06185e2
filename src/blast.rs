//! Blast scoring rules.

use crate::config::ScoringConfig;
use crate::entities::Bug;

fn multiplier(cfg: &ScoringConfig, double: bool) -> u32 {
    if double {
        cfg.double_multiplier
    } else {
        1
    }
}

pub fn direct_hit_points(cfg: &ScoringConfig, double: bool) -> u32 {
    cfg.direct_hit.saturating_mul(multiplier(cfg, double))
}

pub fn chain_points(cfg: &ScoringConfig, double: bool) -> u32 {
    cfg.chain_hit.saturating_mul(multiplier(cfg, double))
}

pub fn mega_points(cfg: &ScoringConfig, bugs: usize, double: bool) -> u32 {
    let bugs = u32::try_from(bugs).unwrap_or(u32::MAX);
    bugs.saturating_mul(cfg.mega_per_bug.saturating_mul(multiplier(cfg, double)))
}

/// Indices of the bugs whose centres lie strictly within the chain radius of
/// `(x, y)`. Only one level deep: victims do not blast their own neighbours.
pub fn chain_victims(cfg: &ScoringConfig, bugs: &[Bug], x: f64, y: f64) -> Vec<usize> {
    bugs.iter()
        .enumerate()
        .filter(|(_, bug)| {
            let (cx, cy) = bug.rect.center();
            (cx - x).hypot(cy - y) < cfg.chain_radius
        })
        .map(|(index, _)| index)
        .collect()
}
