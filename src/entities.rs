//! All game entity types — pure data, no logic.

use std::time::Duration;

use crate::scheduler::TaskHandle;

/// Identifier handed out for every bug, power-up and blast ring.
pub type EntityId = u64;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameStatus {
    Idle,
    Running,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PowerUpKind {
    /// Halves and slows the spawn waves for a while.
    Freeze,
    /// Doubles every scoring event for a while.
    Double,
    /// Instantly clears every live bug.
    Mega,
}

impl PowerUpKind {
    pub const ALL: [PowerUpKind; 3] = [PowerUpKind::Freeze, PowerUpKind::Double, PowerUpKind::Mega];

    pub fn label(self) -> &'static str {
        match self {
            PowerUpKind::Freeze => "Freeze",
            PowerUpKind::Double => "2x",
            PowerUpKind::Mega => "Mega",
        }
    }
}

// ── Geometry ─────────────────────────────────────────────────────────────────

/// Axis-aligned rectangle in field pixels, `(x, y)` is the top-left corner.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }

    pub fn right(&self) -> f64 {
        self.x + self.w
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.h
    }

    pub fn center(&self) -> (f64, f64) {
        (self.x + self.w / 2.0, self.y + self.h / 2.0)
    }

    /// Touching edges count as an overlap.
    pub fn overlaps(&self, other: &Rect) -> bool {
        !(self.right() < other.x
            || self.x > other.right()
            || self.bottom() < other.y
            || self.y > other.bottom())
    }

    pub fn contains(&self, px: f64, py: f64) -> bool {
        px >= self.x && px <= self.right() && py >= self.y && py <= self.bottom()
    }
}

/// Size of the play field in pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Field {
    pub width: f64,
    pub height: f64,
}

// ── Targets ──────────────────────────────────────────────────────────────────

#[derive(Clone, Debug)]
pub struct Bug {
    pub id: EntityId,
    pub rect: Rect,
    /// Cosmetic only, 1..=4.
    pub variant: u8,
    pub created_at: Duration,
    pub despawn: TaskHandle,
}

#[derive(Clone, Debug)]
pub struct PowerUp {
    pub id: EntityId,
    pub rect: Rect,
    pub kind: PowerUpKind,
    pub created_at: Duration,
    pub despawn: TaskHandle,
}

// ── Projectiles ──────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
pub struct Shot {
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    /// Horizontal movement per frame.
    pub drift: f64,
    /// Upward movement per frame.
    pub speed: f64,
    /// Cosmetic only, 1..=3.
    pub variant: u8,
}

/// Short-lived ring drawn where a direct hit landed.
#[derive(Clone, Debug, PartialEq)]
pub struct BlastRing {
    pub id: EntityId,
    pub x: f64,
    pub y: f64,
}

// ── Player & session ─────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
pub struct Blaster {
    /// Left edge in field pixels.
    pub x: f64,
    pub width: f64,
}

impl Blaster {
    pub fn center(&self) -> f64 {
        self.x + self.width / 2.0
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Session {
    pub player: String,
    pub score: u32,
    pub time_left: u32,
    pub status: GameStatus,
}

impl Session {
    pub fn idle(time_left: u32) -> Self {
        Session {
            player: String::new(),
            score: 0,
            time_left,
            status: GameStatus::Idle,
        }
    }

    pub fn is_running(&self) -> bool {
        self.status == GameStatus::Running
    }
}
