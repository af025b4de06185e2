use bug_blaster::blast::*;
use bug_blaster::config::{ScoringConfig, ShotConfig};
use bug_blaster::entities::*;
use bug_blaster::projectiles::*;
use bug_blaster::scheduler::Scheduler;

use rand::rngs::StdRng;
use rand::SeedableRng;

fn bug(id: EntityId, x: f64, y: f64) -> Bug {
    let mut scheduler = Scheduler::new();
    Bug {
        id,
        rect: Rect::new(x, y, 44.0, 44.0),
        variant: 1,
        created_at: scheduler.now(),
        despawn: scheduler.schedule_in(std::time::Duration::from_secs(4), ()),
    }
}

fn power_up(id: EntityId, x: f64, y: f64) -> PowerUp {
    let mut scheduler = Scheduler::new();
    PowerUp {
        id,
        rect: Rect::new(x, y, 72.0, 32.0),
        kind: PowerUpKind::Freeze,
        created_at: scheduler.now(),
        despawn: scheduler.schedule_in(std::time::Duration::from_secs(5), ()),
    }
}

fn shot_at(x: f64, y: f64) -> Shot {
    Shot {
        x,
        y,
        drift: 0.0,
        speed: 12.0,
        variant: 1,
    }
}

// ── Bursts & movement ─────────────────────────────────────────────────────────

#[test]
fn burst_fans_three_shots_around_origin() {
    let cfg = ShotConfig::default();
    let mut rng = StdRng::seed_from_u64(7);
    let shots = burst(&cfg, 400.0, 520.0, &mut rng);

    assert_eq!(shots.len(), 3);
    for (shot, offset) in shots.iter().zip([-14.0, 0.0, 14.0]) {
        assert_eq!(shot.x, 400.0 + offset);
        assert_eq!(shot.y, 520.0);
        assert!((11.0..13.0).contains(&shot.speed), "speed {}", shot.speed);
        let base = offset * 0.02;
        assert!((shot.drift - base).abs() <= 0.3, "drift {}", shot.drift);
        assert!((1..=3).contains(&shot.variant));
    }
}

#[test]
fn shots_move_up_and_drift() {
    let mut shot = Shot {
        drift: 0.5,
        ..shot_at(100.0, 200.0)
    };
    advance_shot(&mut shot);
    assert_eq!(shot.y, 188.0);
    assert_eq!(shot.x, 100.5);
}

#[test]
fn out_of_bounds_uses_margin() {
    let cfg = ShotConfig::default();
    let field = Field { width: 800.0, height: 600.0 };
    assert!(!is_out_of_bounds(&cfg, &shot_at(400.0, -40.0), field));
    assert!(is_out_of_bounds(&cfg, &shot_at(400.0, -40.5), field));
    assert!(!is_out_of_bounds(&cfg, &shot_at(-40.0, 100.0), field));
    assert!(is_out_of_bounds(&cfg, &shot_at(-41.0, 100.0), field));
    assert!(!is_out_of_bounds(&cfg, &shot_at(840.0, 100.0), field));
    assert!(is_out_of_bounds(&cfg, &shot_at(841.0, 100.0), field));
}

// ── Hit testing ───────────────────────────────────────────────────────────────

#[test]
fn first_hit_prefers_bugs_over_power_ups() {
    let cfg = ShotConfig::default();
    let shot = shot_at(110.0, 110.0);
    let bugs = vec![bug(1, 100.0, 100.0)];
    let power_ups = vec![power_up(2, 90.0, 100.0)];

    assert_eq!(first_hit(&cfg, &shot, &bugs, &power_ups), Some(Hit::Bug(0)));
    assert_eq!(first_hit(&cfg, &shot, &[], &power_ups), Some(Hit::PowerUp(0)));
}

#[test]
fn first_hit_takes_earliest_bug() {
    let cfg = ShotConfig::default();
    let shot = shot_at(120.0, 120.0);
    let bugs = vec![bug(1, 0.0, 0.0), bug(2, 110.0, 110.0), bug(3, 100.0, 100.0)];
    assert_eq!(first_hit(&cfg, &shot, &bugs, &[]), Some(Hit::Bug(1)));
}

#[test]
fn first_hit_counts_touching_edges() {
    let cfg = ShotConfig::default();
    // Shot is 6 wide: right edge lands exactly on the bug's left edge
    let shot = shot_at(94.0, 100.0);
    let bugs = vec![bug(1, 100.0, 100.0)];
    assert_eq!(first_hit(&cfg, &shot, &bugs, &[]), Some(Hit::Bug(0)));

    let miss = shot_at(93.0, 100.0);
    assert_eq!(first_hit(&cfg, &miss, &bugs, &[]), None);
}

// ── Blast scoring ─────────────────────────────────────────────────────────────

#[test]
fn points_follow_double_multiplier() {
    let cfg = ScoringConfig::default();
    assert_eq!(direct_hit_points(&cfg, false), 10);
    assert_eq!(direct_hit_points(&cfg, true), 20);
    assert_eq!(chain_points(&cfg, false), 5);
    assert_eq!(chain_points(&cfg, true), 10);
}

#[test]
fn mega_points_scale_with_bug_count() {
    let cfg = ScoringConfig::default();
    assert_eq!(mega_points(&cfg, 0, false), 0);
    assert_eq!(mega_points(&cfg, 4, false), 12);
    assert_eq!(mega_points(&cfg, 4, true), 24);
}

#[test]
fn chain_radius_is_strict() {
    let cfg = ScoringConfig::default();
    // Centres sit 50, exactly 70 and 128 px to the right of the blast
    let bugs = vec![bug(1, 150.0, 78.0), bug(2, 170.0, 78.0), bug(3, 228.0, 78.0)];
    let victims = chain_victims(&cfg, &bugs, 122.0, 100.0);
    assert_eq!(victims, vec![0]);
}

#[test]
fn chain_victims_keep_list_order() {
    let cfg = ScoringConfig::default();
    let bugs = vec![
        bug(1, 100.0, 100.0),
        bug(2, 600.0, 600.0),
        bug(3, 120.0, 80.0),
    ];
    assert_eq!(chain_victims(&cfg, &bugs, 130.0, 120.0), vec![0, 2]);
}

#[test]
fn huge_point_values_saturate() {
    let cfg = ScoringConfig {
        direct_hit: u32::MAX,
        mega_per_bug: u32::MAX / 2 + 1,
        ..ScoringConfig::default()
    };
    assert_eq!(direct_hit_points(&cfg, true), u32::MAX);
    assert_eq!(mega_points(&cfg, 1, true), u32::MAX);
}
