//! Bug Blaster: a timed arcade shooter.
//!
//! The library holds the whole game as plain data plus a simulated-time task
//! queue, so it runs identically under a terminal front end or a test. See
//! [`session::Game`] for the entry point.

pub mod blast;
pub mod config;
pub mod entities;
pub mod error;
pub mod events;
pub mod leaderboard;
pub mod powerups;
pub mod projectiles;
pub mod scheduler;
pub mod session;
pub mod spawner;
pub mod store;

pub use config::GameConfig;
pub use error::{ConfigError, GameError, StoreError};
pub use session::{Game, PointerTarget};
