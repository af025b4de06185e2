//! Timed power-up effects.
//!
//! Freeze and double-points each run on their own expiry task. Activating one
//! restarts only its own countdown; the other keeps whatever time it had left.

use std::collections::HashMap;
use std::time::Duration;

use crate::entities::PowerUpKind;
use crate::scheduler::{Scheduler, TaskHandle};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TimedEffect {
    Freeze,
    Double,
}

impl PowerUpKind {
    /// `None` for instant power-ups.
    pub fn timed(self) -> Option<TimedEffect> {
        match self {
            PowerUpKind::Freeze => Some(TimedEffect::Freeze),
            PowerUpKind::Double => Some(TimedEffect::Double),
            PowerUpKind::Mega => None,
        }
    }
}

#[derive(Clone, Copy, Debug)]
struct ActiveEffect {
    expiry: TaskHandle,
}

#[derive(Debug, Default)]
pub struct PowerUpEffects {
    active: HashMap<TimedEffect, ActiveEffect>,
}

impl PowerUpEffects {
    pub fn new() -> Self {
        Self::default()
    }

    /// Turn `effect` on for `duration`, scheduling `on_expiry` when it runs out.
    ///
    /// Returns true when the effect was already active and got its countdown
    /// restarted.
    pub fn activate<T>(
        &mut self,
        effect: TimedEffect,
        duration: Duration,
        scheduler: &mut Scheduler<T>,
        on_expiry: T,
    ) -> bool {
        let restarted = match self.active.remove(&effect) {
            Some(previous) => {
                let _ = scheduler.cancel(previous.expiry);
                true
            }
            None => false,
        };
        let expiry = scheduler.schedule_in(duration, on_expiry);
        let _ = self.active.insert(effect, ActiveEffect { expiry });
        restarted
    }

    /// Called when an expiry task fires. Returns false if the effect was not on.
    pub fn expire(&mut self, effect: TimedEffect) -> bool {
        self.active.remove(&effect).is_some()
    }

    pub fn is_active(&self, effect: TimedEffect) -> bool {
        self.active.contains_key(&effect)
    }

    /// Time left on `effect`, measured from `now`.
    pub fn remaining(&self, effect: TimedEffect, now: Duration) -> Option<Duration> {
        self.active
            .get(&effect)
            .map(|active| active.expiry.due().saturating_sub(now))
    }

    /// Switch everything off and cancel the pending expiries.
    pub fn clear<T>(&mut self, scheduler: &mut Scheduler<T>) {
        for (_, active) in self.active.drain() {
            let _ = scheduler.cancel(active.expiry);
        }
    }
}
