/// All game entity types — plain data plus the AABB test they share.
///
/// Positions and sizes are canvas pixels (origin top-left, y grows down).
/// Timestamps are milliseconds of session time.

// ── Fixed sizes & tunables ────────────────────────────────────────────────────

pub const PLAYER_SIZE: f32 = 50.0;
pub const PLAYER_BASE_SPEED: f32 = 5.0;
pub const MAX_HEALTH: u32 = 100;

pub const ENEMY_SIZE: f32 = 50.0;
pub const POWER_UP_SIZE: f32 = 30.0;
pub const BULLET_SIZE: f32 = 10.0;

/// Player bullets travel straight up by this many pixels per frame.
pub const PLAYER_BULLET_SPEED: f32 = 6.0;
/// Magnitude of an enemy bullet's velocity vector.
pub const ENEMY_BULLET_SPEED: f32 = 4.0;

// ── Geometry ──────────────────────────────────────────────────────────────────

/// An axis-aligned bounding box.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Aabb {
    pub fn center(&self) -> (f32, f32) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

/// Anything that occupies a box on the canvas.
pub trait Bounds {
    fn bounds(&self) -> Aabb;
}

impl Bounds for Aabb {
    fn bounds(&self) -> Aabb {
        *self
    }
}

/// Strict-overlap AABB test; boxes that only touch along an edge do not collide.
pub fn is_colliding(a: &impl Bounds, b: &impl Bounds) -> bool {
    let a = a.bounds();
    let b = b.bounds();
    a.x < b.x + b.width && a.x + a.width > b.x && a.y < b.y + b.height && a.y + a.height > b.y
}

/// Canvas dimensions in pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Canvas {
    pub width: f32,
    pub height: f32,
}

// ── Player ────────────────────────────────────────────────────────────────────

#[derive(Clone, Debug)]
pub struct Player {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    /// Current speed; raised by dashes and speed pickups.
    pub speed: f32,
    pub base_speed: f32,
    /// Always within `0..=MAX_HEALTH`.
    pub health: u32,
    pub score: u32,
    pub bullets: Vec<PlayerBullet>,
    pub shield_active: bool,
    /// Session time at which a shield pickup stops protecting the player.
    pub shield_granted_until: Option<u64>,
    /// Session time at which the current dash boost ends.
    pub dash_ends_at: Option<u64>,
    /// Session time from which another dash may be triggered.
    pub dash_ready_at: u64,
    pub last_shot: Option<u64>,
}

impl Player {
    /// A fresh player placed bottom-centre of `canvas`.
    pub fn spawn(canvas: Canvas) -> Self {
        Player {
            x: canvas.width / 2.0 - PLAYER_SIZE / 2.0,
            y: canvas.height - 100.0,
            width: PLAYER_SIZE,
            height: PLAYER_SIZE,
            speed: PLAYER_BASE_SPEED,
            base_speed: PLAYER_BASE_SPEED,
            health: MAX_HEALTH,
            score: 0,
            bullets: Vec::new(),
            shield_active: false,
            shield_granted_until: None,
            dash_ends_at: None,
            dash_ready_at: 0,
            last_shot: None,
        }
    }

    /// Remaining dash cooldown in milliseconds at session time `now`.
    pub fn dash_cooldown(&self, now: u64) -> u64 {
        self.dash_ready_at.saturating_sub(now)
    }

    pub fn take_damage(&mut self, amount: u32) {
        self.health = self.health.saturating_sub(amount);
    }

    pub fn heal(&mut self, amount: u32) {
        self.health = (self.health + amount).min(MAX_HEALTH);
    }
}

impl Bounds for Player {
    fn bounds(&self) -> Aabb {
        Aabb { x: self.x, y: self.y, width: self.width, height: self.height }
    }
}

// ── Projectiles ───────────────────────────────────────────────────────────────

#[derive(Clone, Debug)]
pub struct PlayerBullet {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    /// Upward travel per frame.
    pub speed: f32,
    /// Directional velocity, when the bullet has one. Bullets fired by the
    /// player start without it and travel straight up at `speed`.
    pub velocity: Option<(f32, f32)>,
}

impl Bounds for PlayerBullet {
    fn bounds(&self) -> Aabb {
        Aabb { x: self.x, y: self.y, width: self.width, height: self.height }
    }
}

#[derive(Clone, Debug)]
pub struct EnemyBullet {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub vx: f32,
    pub vy: f32,
}

impl Bounds for EnemyBullet {
    fn bounds(&self) -> Aabb {
        Aabb { x: self.x, y: self.y, width: self.width, height: self.height }
    }
}

// ── Enemies ───────────────────────────────────────────────────────────────────

#[derive(Clone, Debug)]
pub struct Enemy {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub speed: f32,
    pub health: i32,
    pub last_shot: u64,
}

impl Bounds for Enemy {
    fn bounds(&self) -> Aabb {
        Aabb { x: self.x, y: self.y, width: self.width, height: self.height }
    }
}

// ── Power-ups ─────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PowerUpKind {
    /// Heals 20, capped at full health.
    Health,
    /// Forces the shield on.
    Shield,
    /// Permanent +2 to current speed.
    Speed,
    /// Scales directional player bullets by 1.5.
    Bullet,
}

impl PowerUpKind {
    pub const ALL: [PowerUpKind; 4] =
        [PowerUpKind::Health, PowerUpKind::Shield, PowerUpKind::Speed, PowerUpKind::Bullet];
}

#[derive(Clone, Debug)]
pub struct PowerUp {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub kind: PowerUpKind,
    pub spawn_time: u64,
}

impl Bounds for PowerUp {
    fn bounds(&self) -> Aabb {
        Aabb { x: self.x, y: self.y, width: self.width, height: self.height }
    }
}

// ── Rules ─────────────────────────────────────────────────────────────────────

/// Gameplay switches that are product decisions rather than fixed mechanics.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Rules {
    /// How long a shield pickup protects the player regardless of key state.
    /// Zero keeps the shield purely key-driven.
    pub shield_pickup_ms: u64,
    /// Draw power-up pickups during rendering.
    pub draw_power_ups: bool,
    /// Reaching this wave wins the session.
    pub win_wave: Option<u32>,
}

// ── Frame events ──────────────────────────────────────────────────────────────

/// Something that happened during a frame or spawn; drained by the session
/// to drive audio and logging.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum GameEvent {
    ShotFired,
    PlayerHit,
    ShieldBlocked,
    EnemyDestroyed,
    EnemySpawned,
    PowerUpSpawned(PowerUpKind),
    PowerUpCollected(PowerUpKind),
    PowerUpExpired(PowerUpKind),
}

// ── Mode & outcome ────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    Win,
    Lose,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    Idle,
    Running,
    Paused,
    Ended(Outcome),
}

// ── Master world state ────────────────────────────────────────────────────────

/// Everything the per-frame simulation reads and writes.  Cloneable so the
/// pure update functions in `compute` can return a new copy.
#[derive(Clone, Debug)]
pub struct World {
    pub player: Player,
    pub enemies: Vec<Enemy>,
    pub enemy_bullets: Vec<EnemyBullet>,
    pub power_ups: Vec<PowerUp>,
    pub canvas: Canvas,
    pub rules: Rules,
    /// Events produced since the session last drained them.
    pub events: Vec<GameEvent>,
}
