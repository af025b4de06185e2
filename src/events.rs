//! Notifications for the presentation layer.
//!
//! The game never draws or plays anything itself. It appends events here and
//! whatever front end is attached drains them once per frame.

use crate::entities::{EntityId, PowerUpKind};
use crate::powerups::TimedEffect;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Sound {
    Laser,
    PowerUp,
    Mega,
    GameOver,
}

/// Why an entity left the field.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Removal {
    /// Lifetime ran out.
    Expired,
    /// Hit directly by a shot.
    Hit,
    /// Caught in the blast around a direct hit.
    Chain,
    /// Cleared by a mega-blast.
    Mega,
    /// Power-up collected by a shot or a click.
    Claimed,
    /// Swept away when a new session starts.
    Reset,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScoreCause {
    DirectHit,
    Chain,
    Mega,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Message {
    pub title: String,
    pub body: String,
    pub footer: String,
}

impl Message {
    pub fn pilot_needed() -> Self {
        Message {
            title: "Pilot Needed".to_string(),
            body: "Enter your call sign to log your scores on the leaderboard.".to_string(),
            footer: "Type a name and press Enter to start the mission!".to_string(),
        }
    }

    pub fn mission_complete(score: u32) -> Self {
        Message {
            title: "Mission Complete!".to_string(),
            body: format!("You blasted {score} space bugs!"),
            footer: "Press R to play again.".to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum GameEvent {
    SessionStarted { player: String },
    SessionEnded { player: String, score: u32, new_best: bool },
    Countdown { time_left: u32 },
    Scored { points: u32, cause: ScoreCause },
    BugSpawned { id: EntityId },
    BugRemoved { id: EntityId, reason: Removal },
    PowerUpSpawned { id: EntityId, kind: PowerUpKind },
    PowerUpRemoved { id: EntityId, reason: Removal },
    EffectStarted(TimedEffect),
    EffectEnded(TimedEffect),
    BlastRing { x: f64, y: f64 },
    ScreenFlash,
    Sound(Sound),
    Message(Message),
    MessageHidden,
}
