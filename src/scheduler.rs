//! Simulated-time task queue.
//!
//! Every timer the game needs (spawn waves, the firing cadence, the countdown,
//! the per-frame shot loop, despawns, effect expiries) is a task in this queue.
//! Time only moves when the owner pops due tasks, so a session can be replayed
//! against a seeded RNG one millisecond at a time.

use std::collections::BTreeMap;
use std::time::Duration;

/// Cancellable reference to a scheduled task.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskHandle {
    due: Duration,
    seq: u64,
}

impl TaskHandle {
    pub fn due(&self) -> Duration {
        self.due
    }
}

#[derive(Debug)]
pub struct Scheduler<T> {
    now: Duration,
    next_seq: u64,
    queue: BTreeMap<TaskHandle, T>,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Scheduler<T> {
    pub fn new() -> Self {
        Scheduler {
            now: Duration::ZERO,
            next_seq: 0,
            queue: BTreeMap::new(),
        }
    }

    /// Current simulated time.
    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Queue `task` to run `delay` after the current time.
    pub fn schedule_in(&mut self, delay: Duration, task: T) -> TaskHandle {
        let handle = TaskHandle {
            due: self.now.saturating_add(delay),
            seq: self.next_seq,
        };
        self.next_seq += 1;
        let _ = self.queue.insert(handle, task);
        handle
    }

    /// Returns the task if it had not fired or been cancelled yet.
    pub fn cancel(&mut self, handle: TaskHandle) -> Option<T> {
        self.queue.remove(&handle)
    }

    pub fn is_pending(&self, handle: TaskHandle) -> bool {
        self.queue.contains_key(&handle)
    }

    /// Pops the earliest task due at or before `until` and moves the clock to
    /// its due time. Tasks due at the same instant come out in scheduling order.
    pub fn pop_due(&mut self, until: Duration) -> Option<(TaskHandle, T)> {
        let (&handle, _) = self.queue.first_key_value()?;
        if handle.due > until {
            return None;
        }
        let (handle, task) = self.queue.pop_first()?;
        self.now = self.now.max(handle.due);
        Some((handle, task))
    }

    /// Moves the clock forward once every due task has been popped.
    pub fn settle(&mut self, until: Duration) {
        self.now = self.now.max(until);
    }

    pub fn clear(&mut self) {
        self.queue.clear();
    }
}
