use bug_blaster::config::SpawnConfig;
use bug_blaster::entities::{Field, PowerUpKind};
use bug_blaster::spawner::*;

use rand::rngs::StdRng;
use rand::SeedableRng;

fn seeded_rng() -> StdRng {
    StdRng::seed_from_u64(42)
}

fn never_lucky() -> SpawnConfig {
    SpawnConfig {
        extra_bug_chance: 0.0,
        ..SpawnConfig::default()
    }
}

fn always_lucky() -> SpawnConfig {
    SpawnConfig {
        extra_bug_chance: 1.0,
        ..SpawnConfig::default()
    }
}

// ── wave_size ─────────────────────────────────────────────────────────────────

#[test]
fn wave_size_grows_as_delay_shrinks() {
    let cfg = never_lucky();
    let mut rng = seeded_rng();
    assert_eq!(wave_size(&cfg, 650.0, false, &mut rng), 2);
    assert_eq!(wave_size(&cfg, 599.0, false, &mut rng), 3);
    assert_eq!(wave_size(&cfg, 419.0, false, &mut rng), 4);
}

#[test]
fn wave_size_lucky_roll_adds_one() {
    let cfg = always_lucky();
    let mut rng = seeded_rng();
    assert_eq!(wave_size(&cfg, 650.0, false, &mut rng), 3);
    assert_eq!(wave_size(&cfg, 180.0, false, &mut rng), 5);
}

#[test]
fn wave_size_stays_within_two_and_five() {
    let cfg = SpawnConfig::default();
    let mut rng = seeded_rng();
    for delay in [650.0, 500.0, 300.0, 180.0] {
        for _ in 0..50 {
            let n = wave_size(&cfg, delay, false, &mut rng);
            assert!((2..=5).contains(&n), "delay {delay} gave {n}");
        }
    }
}

#[test]
fn freeze_halves_wave_with_floor_of_one() {
    let mut rng = seeded_rng();
    // 2 → 1, 3 → 1
    assert_eq!(wave_size(&never_lucky(), 650.0, true, &mut rng), 1);
    assert_eq!(wave_size(&always_lucky(), 650.0, true, &mut rng), 1);
    // 4 → 2, 5 → 2
    assert_eq!(wave_size(&never_lucky(), 400.0, true, &mut rng), 2);
    assert_eq!(wave_size(&always_lucky(), 400.0, true, &mut rng), 2);
}

#[test]
fn freeze_never_yields_an_empty_wave() {
    let cfg = SpawnConfig {
        base_bugs: 0,
        ..never_lucky()
    };
    assert_eq!(wave_size(&cfg, 650.0, true, &mut seeded_rng()), 1);
}

// ── next_spawn_delay ─────────────────────────────────────────────────────────

#[test]
fn delay_decays_towards_floor() {
    let cfg = SpawnConfig::default();
    assert!((next_spawn_delay(&cfg, 650.0, false) - 585.0).abs() < 1e-9);
    assert_eq!(next_spawn_delay(&cfg, 190.0, false), 180.0);
    assert_eq!(next_spawn_delay(&cfg, 180.0, false), 180.0);
}

#[test]
fn delay_sequence_is_monotone_and_bounded() {
    let cfg = SpawnConfig::default();
    let mut delay = cfg.initial_delay_ms;
    assert_eq!(delay, 650.0);
    for _ in 0..40 {
        let next = next_spawn_delay(&cfg, delay, false);
        assert!(next <= delay);
        assert!(next >= 180.0);
        delay = next;
    }
    assert_eq!(delay, 180.0);
}

#[test]
fn freeze_does_not_let_delay_shrink() {
    let cfg = SpawnConfig::default();
    let next = next_spawn_delay(&cfg, 400.0, true);
    assert!(next >= 400.0);
    assert!((next - 408.0).abs() < 1e-9);
    assert!(next_spawn_delay(&cfg, 180.0, true) >= 180.0);
}

// ── positions & kinds ────────────────────────────────────────────────────────

#[test]
fn positions_stay_inside_margin() {
    let field = Field { width: 800.0, height: 600.0 };
    let mut rng = seeded_rng();
    for _ in 0..500 {
        let (x, y) = random_position(field, 60.0, &mut rng);
        assert!((60.0..=740.0).contains(&x), "x = {x}");
        assert!((60.0..=540.0).contains(&y), "y = {y}");
    }
}

#[test]
fn tiny_field_collapses_onto_margin() {
    let field = Field { width: 100.0, height: 50.0 };
    let (x, y) = random_position(field, 70.0, &mut seeded_rng());
    assert_eq!((x, y), (70.0, 70.0));
}

#[test]
fn kinds_and_variants_cover_their_ranges() {
    let mut rng = seeded_rng();
    let mut seen = Vec::new();
    for _ in 0..200 {
        let kind = random_kind(&mut rng);
        if !seen.contains(&kind) {
            seen.push(kind);
        }
        let variant = random_variant(&mut rng);
        assert!((1..=4).contains(&variant));
    }
    assert_eq!(seen.len(), PowerUpKind::ALL.len());
}

#[test]
fn power_up_roll_respects_extremes() {
    let mut rng = seeded_rng();
    let never = SpawnConfig {
        power_up_chance: 0.0,
        ..SpawnConfig::default()
    };
    let always = SpawnConfig {
        power_up_chance: 1.0,
        ..SpawnConfig::default()
    };
    assert!(!rolls_power_up(&never, &mut rng));
    assert!(rolls_power_up(&always, &mut rng));
}

#[test]
fn nan_chances_never_roll() {
    let cfg = SpawnConfig {
        extra_bug_chance: f64::NAN,
        power_up_chance: f64::NAN,
        ..SpawnConfig::default()
    };
    let mut rng = seeded_rng();
    assert_eq!(wave_size(&cfg, 650.0, false, &mut rng), 2);
    assert!(!rolls_power_up(&cfg, &mut rng));
}
