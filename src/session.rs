//! Session controller.
//!
//! `Game` owns one play field and everything that happens on it: the session
//! counters, live entities, the task queue that stands in for timers and
//! animation frames, the timed effects and the persisted records. All
//! randomness comes through the `rng` argument of `start`, `advance` and
//! `fire`, so a seeded RNG replays a whole round exactly.

use std::time::Duration;

use rand::Rng;

use crate::blast;
use crate::config::GameConfig;
use crate::entities::{
    BlastRing, Blaster, Bug, EntityId, Field, GameStatus, PowerUp, PowerUpKind, Rect, Session,
    Shot,
};
use crate::error::GameError;
use crate::events::{GameEvent, Message, Removal, ScoreCause, Sound};
use crate::leaderboard::sanitize_name;
use crate::powerups::{PowerUpEffects, TimedEffect};
use crate::projectiles::{self, Hit};
use crate::scheduler::{Scheduler, TaskHandle};
use crate::spawner;
use crate::store::{unix_millis, Records, Store};

const COUNTDOWN_STEP: Duration = Duration::from_secs(1);
const MIN_STEP: Duration = Duration::from_millis(1);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Task {
    SpawnWave,
    AutoFire,
    Countdown,
    Frame,
    DespawnBug(EntityId),
    DespawnPowerUp(EntityId),
    EffectExpired(TimedEffect),
    ClearRing(EntityId),
    ClearFlash,
}

/// What sits under a pointer press.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerTarget {
    Bug(EntityId),
    PowerUp(EntityId),
    StartControl,
    Message,
    Background,
}

#[derive(Debug)]
pub struct Game<S: Store> {
    config: GameConfig,
    field: Field,
    session: Session,
    blaster: Blaster,
    bugs: Vec<Bug>,
    power_ups: Vec<PowerUp>,
    shots: Vec<Shot>,
    rings: Vec<BlastRing>,
    flash: Option<TaskHandle>,
    effects: PowerUpEffects,
    scheduler: Scheduler<Task>,
    spawn_delay: f64,
    last_burst: Option<Duration>,
    spawn_task: Option<TaskHandle>,
    fire_task: Option<TaskHandle>,
    countdown_task: Option<TaskHandle>,
    frame_task: Option<TaskHandle>,
    dragging: bool,
    message: Option<Message>,
    next_id: EntityId,
    records: Records<S>,
    events: Vec<GameEvent>,
}

impl<S: Store> Game<S> {
    pub fn new(config: GameConfig, field: Field, records: Records<S>) -> Self {
        let blaster = Blaster {
            x: centered(field.width, config.blaster.width),
            width: config.blaster.width,
        };
        Game {
            session: Session::idle(config.session_seconds),
            spawn_delay: config.spawn.initial_delay_ms,
            config,
            field,
            blaster,
            bugs: Vec::new(),
            power_ups: Vec::new(),
            shots: Vec::new(),
            rings: Vec::new(),
            flash: None,
            effects: PowerUpEffects::new(),
            scheduler: Scheduler::new(),
            last_burst: None,
            spawn_task: None,
            fire_task: None,
            countdown_task: None,
            frame_task: None,
            dragging: false,
            message: None,
            next_id: 1,
            records,
            events: Vec::new(),
        }
    }

    // ── Read access ──────────────────────────────────────────────────────────

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn field(&self) -> Field {
        self.field
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn score(&self) -> u32 {
        self.session.score
    }

    pub fn time_left(&self) -> u32 {
        self.session.time_left
    }

    pub fn is_running(&self) -> bool {
        self.session.is_running()
    }

    pub fn blaster(&self) -> &Blaster {
        &self.blaster
    }

    pub fn bugs(&self) -> &[Bug] {
        &self.bugs
    }

    pub fn power_ups(&self) -> &[PowerUp] {
        &self.power_ups
    }

    pub fn shots(&self) -> &[Shot] {
        &self.shots
    }

    pub fn rings(&self) -> &[BlastRing] {
        &self.rings
    }

    pub fn flash_active(&self) -> bool {
        self.flash
            .is_some_and(|handle| self.scheduler.is_pending(handle))
    }

    /// Delay in milliseconds before the next spawn wave.
    pub fn spawn_delay(&self) -> f64 {
        self.spawn_delay
    }

    /// Simulated time since the game was created.
    pub fn now(&self) -> Duration {
        self.scheduler.now()
    }

    pub fn effect_active(&self, effect: TimedEffect) -> bool {
        self.effects.is_active(effect)
    }

    pub fn effect_remaining(&self, effect: TimedEffect) -> Option<Duration> {
        self.effects.remaining(effect, self.scheduler.now())
    }

    pub fn message(&self) -> Option<&Message> {
        self.message.as_ref()
    }

    pub fn records(&self) -> &Records<S> {
        &self.records
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    // ── Session lifecycle ────────────────────────────────────────────────────

    /// Sanitize and persist a name typed by the player.
    pub fn set_player_name(&mut self, raw: &str) -> String {
        let name = sanitize_name(raw);
        self.records.save_player_name(&name);
        name
    }

    /// Begin a round for `player`. Does nothing while a round is running.
    pub fn start(&mut self, player: &str, rng: &mut impl Rng) -> Result<(), GameError> {
        if self.is_running() {
            tracing::debug!("start ignored, session already running");
            return Ok(());
        }

        let name = sanitize_name(player).trim().to_string();
        if name.is_empty() {
            self.show_message(Message::pilot_needed());
            return Err(GameError::NameRequired);
        }
        self.records.save_player_name(&name);

        self.reset_field();
        self.session = Session {
            player: name.clone(),
            score: 0,
            time_left: self.config.session_seconds,
            status: GameStatus::Running,
        };
        self.hide_message();
        tracing::info!(player = %name, "session started");
        self.events.push(GameEvent::SessionStarted { player: name });

        let _ = self.fire(rng);
        self.fire_task = Some(
            self.scheduler
                .schedule_in(self.config.shots.auto_fire_interval().max(MIN_STEP), Task::AutoFire),
        );
        self.schedule_spawn_wave();
        self.countdown_task = Some(self.scheduler.schedule_in(COUNTDOWN_STEP, Task::Countdown));
        Ok(())
    }

    /// One second of the round clock. Ends the round when it reaches zero.
    pub fn tick(&mut self) {
        if !self.is_running() {
            return;
        }
        self.session.time_left = self.session.time_left.saturating_sub(1);
        self.events.push(GameEvent::Countdown {
            time_left: self.session.time_left,
        });
        if self.session.time_left == 0 {
            self.end();
        }
    }

    /// Stop the round and hand the result to the records.
    pub fn end(&mut self) {
        if !self.is_running() {
            return;
        }
        self.session.status = GameStatus::Idle;
        self.dragging = false;

        for handle in [
            self.spawn_task.take(),
            self.fire_task.take(),
            self.countdown_task.take(),
            self.frame_task.take(),
        ]
        .into_iter()
        .flatten()
        {
            let _ = self.scheduler.cancel(handle);
        }
        self.effects.clear(&mut self.scheduler);
        self.shots.clear();

        self.events.push(GameEvent::Sound(Sound::GameOver));

        let player = self.session.player.clone();
        let score = self.session.score;
        let new_best = self.records.submit(&player, score, unix_millis());
        tracing::info!(player = %player, score, new_best, "session ended");
        self.events.push(GameEvent::SessionEnded {
            player,
            score,
            new_best,
        });
        self.show_message(Message::mission_complete(score));
    }

    /// Run every task due within the next `dt` of simulated time.
    pub fn advance(&mut self, dt: Duration, rng: &mut impl Rng) {
        let until = self.scheduler.now().saturating_add(dt);
        while let Some((_, task)) = self.scheduler.pop_due(until) {
            self.dispatch(task, rng);
        }
        self.scheduler.settle(until);
    }

    fn dispatch(&mut self, task: Task, rng: &mut impl Rng) {
        match task {
            Task::SpawnWave => {
                self.spawn_task = None;
                self.run_spawn_wave(rng);
            }
            Task::AutoFire => {
                self.fire_task = None;
                if self.is_running() {
                    let _ = self.fire(rng);
                    self.fire_task = Some(self.scheduler.schedule_in(
                        self.config.shots.auto_fire_interval().max(MIN_STEP),
                        Task::AutoFire,
                    ));
                }
            }
            Task::Countdown => {
                self.countdown_task = None;
                self.tick();
                if self.is_running() {
                    self.countdown_task =
                        Some(self.scheduler.schedule_in(COUNTDOWN_STEP, Task::Countdown));
                }
            }
            Task::Frame => {
                self.frame_task = None;
                self.update_shots();
                if self.is_running() || !self.shots.is_empty() {
                    self.start_frame_loop();
                }
            }
            Task::DespawnBug(id) => {
                if let Some(index) = self.bugs.iter().position(|bug| bug.id == id) {
                    let _ = self.bugs.remove(index);
                    self.events.push(GameEvent::BugRemoved {
                        id,
                        reason: Removal::Expired,
                    });
                }
            }
            Task::DespawnPowerUp(id) => {
                if let Some(index) = self.power_ups.iter().position(|p| p.id == id) {
                    let _ = self.power_ups.remove(index);
                    self.events.push(GameEvent::PowerUpRemoved {
                        id,
                        reason: Removal::Expired,
                    });
                }
            }
            Task::EffectExpired(effect) => {
                if self.effects.expire(effect) {
                    tracing::debug!(?effect, "effect expired");
                    self.events.push(GameEvent::EffectEnded(effect));
                }
            }
            Task::ClearRing(id) => self.rings.retain(|ring| ring.id != id),
            Task::ClearFlash => self.flash = None,
        }
    }

    /// Clear everything left over from the previous round.
    fn reset_field(&mut self) {
        for bug in self.bugs.drain(..) {
            self.events.push(GameEvent::BugRemoved {
                id: bug.id,
                reason: Removal::Reset,
            });
        }
        for power_up in self.power_ups.drain(..) {
            self.events.push(GameEvent::PowerUpRemoved {
                id: power_up.id,
                reason: Removal::Reset,
            });
        }
        self.shots.clear();
        self.rings.clear();
        self.flash = None;
        self.effects.clear(&mut self.scheduler);
        self.scheduler.clear();
        self.spawn_task = None;
        self.fire_task = None;
        self.countdown_task = None;
        self.frame_task = None;
        self.spawn_delay = self.config.spawn.initial_delay_ms;
        self.last_burst = None;
        self.blaster.x = centered(self.field.width, self.blaster.width);
    }

    fn show_message(&mut self, message: Message) {
        self.message = Some(message.clone());
        self.events.push(GameEvent::Message(message));
    }

    fn hide_message(&mut self) {
        if self.message.take().is_some() {
            self.events.push(GameEvent::MessageHidden);
        }
    }

    fn next_id(&mut self) -> EntityId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn award(&mut self, points: u32, cause: ScoreCause) {
        if points == 0 {
            return;
        }
        self.session.score = self.session.score.saturating_add(points);
        self.events.push(GameEvent::Scored { points, cause });
    }

    // ── Spawning ─────────────────────────────────────────────────────────────

    fn schedule_spawn_wave(&mut self) {
        if !self.is_running() {
            return;
        }
        if let Some(handle) = self.spawn_task.take() {
            let _ = self.scheduler.cancel(handle);
        }
        let delay = Duration::try_from_secs_f64(self.spawn_delay.max(1.0) / 1000.0)
            .unwrap_or(Duration::MAX);
        self.spawn_task = Some(self.scheduler.schedule_in(delay, Task::SpawnWave));
    }

    fn run_spawn_wave(&mut self, rng: &mut impl Rng) {
        if !self.is_running() {
            return;
        }
        let freeze = self.effects.is_active(TimedEffect::Freeze);
        let count = spawner::wave_size(&self.config.spawn, self.spawn_delay, freeze, rng);
        for _ in 0..count {
            let (x, y) = spawner::random_position(self.field, self.config.spawn.bug_margin, rng);
            let variant = spawner::random_variant(rng);
            let _ = self.spawn_bug_at(x, y, variant);
        }

        if spawner::rolls_power_up(&self.config.spawn, rng) {
            if self.power_ups.len() < self.config.spawn.max_live_power_ups {
                let (x, y) =
                    spawner::random_position(self.field, self.config.spawn.power_up_margin, rng);
                let kind = spawner::random_kind(rng);
                let _ = self.spawn_power_up_at(kind, x, y);
            }
        }

        let delay = self.spawn_delay;
        self.spawn_delay = spawner::next_spawn_delay(&self.config.spawn, delay, freeze);
        tracing::debug!(count, freeze, delay, next = self.spawn_delay, "spawn wave");
        self.schedule_spawn_wave();
    }

    /// Place a bug with its top-left corner at `(x, y)`. Only while running.
    pub fn spawn_bug_at(&mut self, x: f64, y: f64, variant: u8) -> Option<EntityId> {
        if !self.is_running() {
            return None;
        }
        let id = self.next_id();
        let size = self.config.spawn.bug_size;
        let despawn = self
            .scheduler
            .schedule_in(self.config.spawn.bug_lifetime(), Task::DespawnBug(id));
        self.bugs.push(Bug {
            id,
            rect: Rect::new(x, y, size, size),
            variant,
            created_at: self.scheduler.now(),
            despawn,
        });
        self.events.push(GameEvent::BugSpawned { id });
        Some(id)
    }

    /// Place a power-up unless the field already holds the maximum.
    pub fn spawn_power_up_at(&mut self, kind: PowerUpKind, x: f64, y: f64) -> Option<EntityId> {
        if !self.is_running() || self.power_ups.len() >= self.config.spawn.max_live_power_ups {
            return None;
        }
        let id = self.next_id();
        let spawn = &self.config.spawn;
        let rect = Rect::new(x, y, spawn.power_up_width, spawn.power_up_height);
        let despawn = self
            .scheduler
            .schedule_in(spawn.power_up_lifetime(), Task::DespawnPowerUp(id));
        self.power_ups.push(PowerUp {
            id,
            rect,
            kind,
            created_at: self.scheduler.now(),
            despawn,
        });
        self.events.push(GameEvent::PowerUpSpawned { id, kind });
        Some(id)
    }

    // ── Shots ────────────────────────────────────────────────────────────────

    /// Fire one burst from the blaster. Returns false while idle or when the
    /// previous burst was too recent.
    pub fn fire(&mut self, rng: &mut impl Rng) -> bool {
        if !self.is_running() {
            return false;
        }
        let now = self.scheduler.now();
        if let Some(last) = self.last_burst {
            if now.saturating_sub(last) < self.config.shots.cooldown() {
                return false;
            }
        }
        self.last_burst = Some(now);

        let origin_x = self.blaster.center();
        let origin_y = self.field.height - self.config.shots.origin_from_bottom;
        let burst = projectiles::burst(&self.config.shots, origin_x, origin_y, rng);
        self.shots.extend(burst);
        self.start_frame_loop();
        true
    }

    fn start_frame_loop(&mut self) {
        if self.frame_task.is_none() {
            let frame = self.config.shots.frame().max(MIN_STEP);
            self.frame_task = Some(self.scheduler.schedule_in(frame, Task::Frame));
        }
    }

    /// Move every shot one frame and resolve what it hits. Walks the list
    /// from the back so removals never skip an unvisited shot.
    fn update_shots(&mut self) {
        let mut index = self.shots.len();
        while index > 0 {
            index -= 1;
            projectiles::advance_shot(&mut self.shots[index]);

            if projectiles::is_out_of_bounds(&self.config.shots, &self.shots[index], self.field) {
                let _ = self.shots.remove(index);
                continue;
            }

            let hit = projectiles::first_hit(
                &self.config.shots,
                &self.shots[index],
                &self.bugs,
                &self.power_ups,
            );
            match hit {
                Some(Hit::Bug(target)) => {
                    let _ = self.shots.remove(index);
                    let id = self.bugs[target].id;
                    tracing::trace!(id, "shot hit bug");
                    let _ = self.blast_bug(id);
                }
                Some(Hit::PowerUp(target)) => {
                    let _ = self.shots.remove(index);
                    let id = self.power_ups[target].id;
                    tracing::trace!(id, "shot hit power-up");
                    let _ = self.claim_power_up(id);
                }
                None => {}
            }
        }
    }

    // ── Blasts & power-ups ───────────────────────────────────────────────────

    /// Resolve a direct hit on bug `id`, chaining into its neighbours.
    /// Returns the points gained.
    pub fn blast_bug(&mut self, id: EntityId) -> Option<u32> {
        if !self.is_running() {
            return None;
        }
        let index = self.bugs.iter().position(|bug| bug.id == id)?;
        let bug = self.bugs.remove(index);
        let _ = self.scheduler.cancel(bug.despawn);
        self.events.push(GameEvent::BugRemoved {
            id,
            reason: Removal::Hit,
        });

        let (x, y) = bug.rect.center();
        self.add_ring(x, y);

        let double = self.effects.is_active(TimedEffect::Double);
        let direct = blast::direct_hit_points(&self.config.scoring, double);
        self.award(direct, ScoreCause::DirectHit);
        self.events.push(GameEvent::Sound(Sound::Laser));

        let mut gained = direct;
        let chain = blast::chain_points(&self.config.scoring, double);
        let victims = blast::chain_victims(&self.config.scoring, &self.bugs, x, y);
        for index in victims.into_iter().rev() {
            let victim = self.bugs.remove(index);
            let _ = self.scheduler.cancel(victim.despawn);
            self.events.push(GameEvent::BugRemoved {
                id: victim.id,
                reason: Removal::Chain,
            });
            self.award(chain, ScoreCause::Chain);
            gained += chain;
        }
        Some(gained)
    }

    /// Collect power-up `id` and apply it.
    pub fn claim_power_up(&mut self, id: EntityId) -> Option<PowerUpKind> {
        if !self.is_running() {
            return None;
        }
        let index = self.power_ups.iter().position(|p| p.id == id)?;
        let power_up = self.power_ups.remove(index);
        let _ = self.scheduler.cancel(power_up.despawn);
        self.events.push(GameEvent::PowerUpRemoved {
            id,
            reason: Removal::Claimed,
        });
        self.activate_power_up(power_up.kind);
        Some(power_up.kind)
    }

    pub fn activate_power_up(&mut self, kind: PowerUpKind) {
        if !self.is_running() {
            return;
        }
        match kind.timed() {
            Some(effect) => {
                let duration = match effect {
                    TimedEffect::Freeze => self.config.effects.freeze(),
                    TimedEffect::Double => self.config.effects.double(),
                };
                let restarted = self.effects.activate(
                    effect,
                    duration,
                    &mut self.scheduler,
                    Task::EffectExpired(effect),
                );
                tracing::debug!(?effect, restarted, "effect activated");
                self.events.push(GameEvent::EffectStarted(effect));
                self.events.push(GameEvent::Sound(Sound::PowerUp));
            }
            None => self.mega_blast(),
        }
    }

    fn mega_blast(&mut self) {
        self.events.push(GameEvent::Sound(Sound::Mega));
        if let Some(handle) = self.flash.take() {
            let _ = self.scheduler.cancel(handle);
        }
        self.flash = Some(
            self.scheduler
                .schedule_in(self.config.effects.flash(), Task::ClearFlash),
        );
        self.events.push(GameEvent::ScreenFlash);

        let cleared = std::mem::take(&mut self.bugs);
        for bug in &cleared {
            let _ = self.scheduler.cancel(bug.despawn);
            self.events.push(GameEvent::BugRemoved {
                id: bug.id,
                reason: Removal::Mega,
            });
        }
        let double = self.effects.is_active(TimedEffect::Double);
        let points = blast::mega_points(&self.config.scoring, cleared.len(), double);
        self.award(points, ScoreCause::Mega);
    }

    fn add_ring(&mut self, x: f64, y: f64) {
        let id = self.next_id();
        self.rings.push(BlastRing { id, x, y });
        let _ = self
            .scheduler
            .schedule_in(self.config.effects.blast_ring(), Task::ClearRing(id));
        self.events.push(GameEvent::BlastRing { x, y });
    }

    // ── Blaster & pointer ────────────────────────────────────────────────────

    /// Adopt a new field size and re-centre the blaster.
    pub fn resize(&mut self, field: Field) {
        self.field = field;
        self.blaster.x = centered(field.width, self.blaster.width);
    }

    pub fn move_blaster(&mut self, delta: f64) {
        self.move_blaster_to(self.blaster.x + delta);
    }

    /// Move the blaster's left edge to `x`, kept inside the field.
    pub fn move_blaster_to(&mut self, x: f64) {
        let max = self.field.width - self.blaster.width;
        self.blaster.x = x.min(max).max(0.0);
    }

    /// Topmost power-up or bug under `(x, y)`, else background.
    pub fn target_at(&self, x: f64, y: f64) -> PointerTarget {
        if let Some(power_up) = self.power_ups.iter().rev().find(|p| p.rect.contains(x, y)) {
            return PointerTarget::PowerUp(power_up.id);
        }
        if let Some(bug) = self.bugs.iter().rev().find(|b| b.rect.contains(x, y)) {
            return PointerTarget::Bug(bug.id);
        }
        PointerTarget::Background
    }

    pub fn pointer_down(&mut self, target: PointerTarget, x: f64) {
        match target {
            PointerTarget::PowerUp(id) => {
                let _ = self.claim_power_up(id);
            }
            PointerTarget::Bug(_) | PointerTarget::StartControl | PointerTarget::Message => {}
            PointerTarget::Background => {
                self.dragging = true;
                self.move_blaster_to(x - self.blaster.width / 2.0);
            }
        }
    }

    pub fn pointer_move(&mut self, x: f64) {
        if self.dragging {
            self.move_blaster_to(x - self.blaster.width / 2.0);
        }
    }

    pub fn pointer_up(&mut self) {
        self.dragging = false;
    }
}

fn centered(field_width: f64, width: f64) -> f64 {
    (field_width - width) / 2.0
}
