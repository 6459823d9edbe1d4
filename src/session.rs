/// Mode controller — owns one survival session and drives it from the
/// host's clock.
///
/// `Idle → Running → {Paused ⇄ Running} → Ended(Win|Lose)`
///
/// The host calls `pump` once per display refresh with its wall time in
/// milliseconds.  Spawns and frames are scheduled through a `Scheduler`;
/// pausing cancels all three sources at once and resuming creates fresh ones.

use rand::Rng;
use tracing::{debug, info, trace};

use crate::audio::{self, AudioSink, Cue};
use crate::compute::{
    frame_outcome, init_world, spawn_enemy, spawn_power_up, step_frame, wave_at,
    ENEMY_SPAWN_INTERVAL_MS, POWER_UP_SPAWN_INTERVAL_MS,
};
use crate::config::{self, Config};
use crate::entities::{Canvas, GameEvent, Mode, Outcome, Rules, World};
use crate::input::{Controls, KeyBindings, KeyState};
use crate::render::{self, Overlay, Surface};
use crate::scheduler::{Scheduler, Task, TimerHandle};

// ── Settings ─────────────────────────────────────────────────────────────────

/// Everything fixed for the lifetime of a `Session`.
#[derive(Clone, Debug)]
pub struct SessionSettings {
    pub canvas: Canvas,
    pub rules: Rules,
    pub bindings: KeyBindings,
    pub player_name: String,
    pub volume: f32,
}

impl SessionSettings {
    pub fn from_config(config: &Config) -> Self {
        SessionSettings {
            canvas: config.canvas.canvas(),
            rules: config.rules.rules(),
            bindings: config.keys.clone(),
            player_name: config::player_name(&config.player.name),
            volume: config.audio.volume.clamp(0.0, 1.0),
        }
    }
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

// ── Session clock ────────────────────────────────────────────────────────────

/// Converts host wall time into session time, which stands still while paused.
#[derive(Clone, Copy, Debug, Default)]
struct SessionClock {
    started_at: u64,
    paused_at: Option<u64>,
    paused_total: u64,
}

impl SessionClock {
    fn started(now: u64) -> Self {
        SessionClock { started_at: now, paused_at: None, paused_total: 0 }
    }

    fn pause(&mut self, now: u64) {
        self.paused_at.get_or_insert(now);
    }

    fn resume(&mut self, now: u64) {
        if let Some(at) = self.paused_at.take() {
            self.paused_total += now.saturating_sub(at);
        }
    }

    fn elapsed(&self, now: u64) -> u64 {
        let end = self.paused_at.unwrap_or(now);
        end.saturating_sub(self.started_at).saturating_sub(self.paused_total)
    }
}

// ── Session ──────────────────────────────────────────────────────────────────

pub struct Session<R: Rng> {
    settings: SessionSettings,
    world: World,
    mode: Mode,
    clock: SessionClock,
    scheduler: Scheduler,
    enemy_timer: Option<TimerHandle>,
    power_up_timer: Option<TimerHandle>,
    frame_request: Option<TimerHandle>,
    overlay: Option<Overlay>,
    rng: R,
    audio: Option<Box<dyn AudioSink>>,
}

impl<R: Rng> Session<R> {
    /// An idle session; nothing runs until `start`.
    pub fn new(settings: SessionSettings, rng: R) -> Self {
        let world = init_world(settings.canvas, settings.rules.clone());
        Session {
            settings,
            world,
            mode: Mode::Idle,
            clock: SessionClock::default(),
            scheduler: Scheduler::new(),
            enemy_timer: None,
            power_up_timer: None,
            frame_request: None,
            overlay: None,
            rng,
            audio: None,
        }
    }

    pub fn with_audio(mut self, audio: Box<dyn AudioSink>) -> Self {
        self.audio = Some(audio);
        self
    }

    // ── Accessors ────────────────────────────────────────────────────────────

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    pub fn overlay(&self) -> Option<&Overlay> {
        self.overlay.as_ref()
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    /// Session time at host time `now`: time since `start`, minus pauses.
    pub fn elapsed(&self, now: u64) -> u64 {
        self.clock.elapsed(now)
    }

    pub fn wave(&self, now: u64) -> u32 {
        wave_at(self.elapsed(now))
    }

    // ── Entry points ─────────────────────────────────────────────────────────

    /// Reset everything and begin a fresh run.
    pub fn start(&mut self, now: u64) {
        self.scheduler.cancel_all();
        self.enemy_timer = None;
        self.power_up_timer = None;
        self.frame_request = None;

        self.world = init_world(self.settings.canvas, self.settings.rules.clone());
        self.clock = SessionClock::started(now);
        self.mode = Mode::Running;
        self.overlay = None;
        self.schedule(now);

        let volume = self.settings.volume;
        if let Some(sink) = self.audio.as_deref_mut() {
            sink.reset(Cue::Music);
            sink.set_looping(Cue::Music, true);
            for cue in Cue::ALL {
                sink.set_volume(cue, volume);
            }
            sink.play(Cue::Music);
        }
        info!(player = %self.settings.player_name, "survival session started");
    }

    /// Running ⇄ Paused.  Ignored while idle or after the game has ended.
    pub fn toggle_pause(&mut self, now: u64) {
        match self.mode {
            Mode::Running => {
                self.unschedule();
                self.clock.pause(now);
                self.mode = Mode::Paused;
                self.overlay = Some(Overlay::Paused);
                if let Some(sink) = self.audio.as_deref_mut() {
                    sink.pause(Cue::Music);
                }
                info!(elapsed = self.clock.elapsed(now), "paused");
            }
            Mode::Paused => {
                self.clock.resume(now);
                self.schedule(now);
                self.mode = Mode::Running;
                self.overlay = None;
                if let Some(sink) = self.audio.as_deref_mut() {
                    sink.play(Cue::Music);
                }
                info!(elapsed = self.clock.elapsed(now), "resumed");
            }
            mode => debug!(?mode, "pause toggle ignored"),
        }
    }

    /// Stop the run and surface `outcome`.
    pub fn end(&mut self, outcome: Outcome, now: u64) {
        if !matches!(self.mode, Mode::Running | Mode::Paused) {
            debug!(mode = ?self.mode, "end ignored");
            return;
        }
        self.unschedule();
        self.clock.pause(now);
        self.mode = Mode::Ended(outcome);
        self.overlay = Some(Overlay::game_over(outcome, &self.settings.player_name));
        if let Some(sink) = self.audio.as_deref_mut() {
            sink.pause(Cue::Music);
        }
        info!(
            ?outcome,
            score = self.world.player.score,
            wave = self.wave(now),
            elapsed = self.elapsed(now),
            "session ended"
        );
    }

    /// Clear the terminal overlay and start over.
    pub fn restart(&mut self, now: u64) {
        self.overlay = None;
        self.start(now);
    }

    pub fn play_again(&mut self, now: u64) {
        self.restart(now);
    }

    /// Apply one volume to every cue.
    pub fn set_volume(&mut self, volume: f32) {
        let volume = volume.clamp(0.0, 1.0);
        self.settings.volume = volume;
        if let Some(sink) = self.audio.as_deref_mut() {
            for cue in Cue::ALL {
                sink.set_volume(cue, volume);
            }
        }
    }

    /// Run every task due at host time `now`, in due order.
    pub fn pump(&mut self, now: u64, keys: &KeyState) {
        for (at, handle, task) in self.scheduler.due(now) {
            // A task earlier in this batch may have stopped the session.
            if !self.scheduler.is_live(handle) {
                trace!(?task, at, "skipping cancelled task");
                continue;
            }
            match task {
                Task::SpawnEnemy => {
                    let t = self.clock.elapsed(at);
                    self.world = spawn_enemy(&self.world, &mut self.rng, t);
                }
                Task::SpawnPowerUp => {
                    let t = self.clock.elapsed(at);
                    self.world = spawn_power_up(&self.world, &mut self.rng, t);
                }
                Task::Frame => {
                    self.scheduler.cancel(handle);
                    self.frame_request = None;
                    self.run_frame(now, keys);
                }
            }
        }
        self.scheduler.retire_fired();
        self.play_events();
    }

    /// Draw the current frame and any overlay.
    pub fn render<S: Surface>(&self, surface: &mut S, now: u64) -> std::io::Result<()> {
        render::render(surface, &self.world, self.elapsed(now))?;
        if let Some(overlay) = &self.overlay {
            render::render_overlay(surface, overlay, self.settings.canvas)?;
        }
        Ok(())
    }

    // ── Internals ────────────────────────────────────────────────────────────

    fn run_frame(&mut self, now: u64, keys: &KeyState) {
        let t = self.clock.elapsed(now);
        let controls = Controls::capture(keys, &self.settings.bindings);
        self.world = step_frame(&self.world, &controls, t);

        match frame_outcome(&self.world, t) {
            Some(outcome) => self.end(outcome, now),
            None => self.frame_request = Some(self.scheduler.request_once(Task::Frame, now)),
        }
    }

    fn schedule(&mut self, now: u64) {
        self.unschedule();
        self.enemy_timer =
            Some(self.scheduler.set_interval(Task::SpawnEnemy, ENEMY_SPAWN_INTERVAL_MS, now));
        self.power_up_timer = Some(self.scheduler.set_interval(
            Task::SpawnPowerUp,
            POWER_UP_SPAWN_INTERVAL_MS,
            now,
        ));
        self.frame_request = Some(self.scheduler.request_once(Task::Frame, now));
    }

    fn unschedule(&mut self) {
        for handle in [
            self.enemy_timer.take(),
            self.power_up_timer.take(),
            self.frame_request.take(),
        ]
        .into_iter()
        .flatten()
        {
            self.scheduler.cancel(handle);
        }
    }

    fn play_events(&mut self) {
        let events = std::mem::take(&mut self.world.events);
        for event in events {
            let cue = match event {
                GameEvent::ShotFired => Cue::Shoot,
                GameEvent::PlayerHit | GameEvent::EnemyDestroyed => Cue::Hit,
                GameEvent::ShieldBlocked => Cue::ShieldBreak,
                GameEvent::PowerUpExpired(kind) => {
                    debug!(?kind, "power-up expired");
                    continue;
                }
                // Spawns and pickups are logged with their details where they happen.
                other => {
                    trace!(event = ?other, "frame event");
                    continue;
                }
            };
            if let Some(sink) = self.audio.as_deref_mut() {
                audio::restart(sink, cue);
            }
        }
    }
}
