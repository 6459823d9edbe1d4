/// Pure game-logic functions.
///
/// Every public function takes an immutable reference to the current
/// `World` (plus the session time `now`, and an RNG handle for spawns) and
/// returns a brand-new `World`.  Side effects are limited to the injected RNG.

use rand::Rng;
use tracing::debug;

use crate::entities::{
    is_colliding, Bounds, Canvas, Enemy, EnemyBullet, GameEvent, Outcome, Player, PlayerBullet,
    PowerUp, PowerUpKind, Rules, World, BULLET_SIZE, ENEMY_BULLET_SPEED, ENEMY_SIZE,
    PLAYER_BULLET_SPEED, POWER_UP_SIZE,
};
use crate::input::Controls;

// ── Timing & balance ─────────────────────────────────────────────────────────

pub const ENEMY_SPAWN_INTERVAL_MS: u64 = 2_000;
pub const POWER_UP_SPAWN_INTERVAL_MS: u64 = 10_000;
pub const WAVE_DURATION_MS: u64 = 30_000;

pub const FIRE_INTERVAL_MS: u64 = 300;
pub const ENEMY_FIRE_INTERVAL_MS: u64 = 2_000;
pub const DASH_DURATION_MS: u64 = 300;
pub const DASH_COOLDOWN_MS: u64 = 2_000;
pub const DASH_MULTIPLIER: f32 = 3.0;
pub const POWER_UP_LIFETIME_MS: u64 = 5_000;

pub const CONTACT_DAMAGE: u32 = 10;
pub const BULLET_DAMAGE: i32 = 20;
pub const KILL_SCORE: u32 = 10;

pub const HEALTH_PICKUP: u32 = 20;
pub const SPEED_PICKUP: f32 = 2.0;
pub const BULLET_PICKUP_SCALE: f32 = 1.5;

/// Difficulty tier at session time `elapsed_ms`; starts at 1.
pub fn wave_at(elapsed_ms: u64) -> u32 {
    (elapsed_ms / WAVE_DURATION_MS) as u32 + 1
}

fn enemy_health_for(wave: u32) -> i32 {
    30 + wave as i32 * 5
}

fn enemy_speed_bonus_for(wave: u32) -> f32 {
    wave as f32 * 0.2
}

// ── Constructors ─────────────────────────────────────────────────────────────

/// Build the world at session start: a fresh player and empty stores.
pub fn init_world(canvas: Canvas, rules: Rules) -> World {
    World {
        player: Player::spawn(canvas),
        enemies: Vec::new(),
        enemy_bullets: Vec::new(),
        power_ups: Vec::new(),
        canvas,
        rules,
        events: Vec::new(),
    }
}

// ── Spawner ──────────────────────────────────────────────────────────────────

fn uniform_below(rng: &mut impl Rng, upper: f32) -> f32 {
    if upper > 0.0 {
        rng.gen_range(0.0..upper)
    } else {
        0.0
    }
}

/// Add one chasing enemy just above the visible area.
pub fn spawn_enemy(state: &World, rng: &mut impl Rng, now: u64) -> World {
    let wave = wave_at(now);
    let enemy = Enemy {
        x: uniform_below(rng, state.canvas.width - ENEMY_SIZE),
        y: -ENEMY_SIZE,
        width: ENEMY_SIZE,
        height: ENEMY_SIZE,
        speed: rng.gen_range(1.0..3.0) + enemy_speed_bonus_for(wave),
        health: enemy_health_for(wave),
        last_shot: now,
    };
    debug!(wave, x = enemy.x, speed = enemy.speed, health = enemy.health, "enemy spawned");

    let mut next = state.clone();
    next.enemies.push(enemy);
    next.events.push(GameEvent::EnemySpawned);
    next
}

/// Drop a random power-up somewhere inside the canvas.
pub fn spawn_power_up(state: &World, rng: &mut impl Rng, now: u64) -> World {
    let kind = PowerUpKind::ALL[rng.gen_range(0..PowerUpKind::ALL.len())];
    let power_up = PowerUp {
        x: uniform_below(rng, state.canvas.width - POWER_UP_SIZE),
        y: uniform_below(rng, state.canvas.height - POWER_UP_SIZE),
        width: POWER_UP_SIZE,
        height: POWER_UP_SIZE,
        kind,
        spawn_time: now,
    };
    debug!(?kind, x = power_up.x, y = power_up.y, "power-up spawned");

    let mut next = state.clone();
    next.power_ups.push(power_up);
    next.events.push(GameEvent::PowerUpSpawned(kind));
    next
}

// ── Per-frame step ───────────────────────────────────────────────────────────

/// Advance the simulation by one frame at session time `now`.
///
/// The sub-steps run in a fixed order: movement, firing, shield, dash,
/// player bullets, enemies, enemy bullets, power-ups.  Removal during each
/// pass is mark-and-compact so no element is skipped.
pub fn step_frame(state: &World, controls: &Controls, now: u64) -> World {
    let mut next = state.clone();

    move_player(&mut next.player, controls, next.canvas);
    fire(&mut next, controls, now);
    update_shield(&mut next.player, controls, now);
    update_dash(&mut next.player, controls, now);
    advance_player_bullets(&mut next.player);
    update_enemies(&mut next, now);
    update_enemy_bullets(&mut next);
    update_power_ups(&mut next, now);

    next
}

/// How the session ends after this frame, if it does.
pub fn frame_outcome(state: &World, now: u64) -> Option<Outcome> {
    if state.player.health == 0 {
        return Some(Outcome::Lose);
    }
    match state.rules.win_wave {
        Some(target) if wave_at(now) >= target => Some(Outcome::Win),
        _ => None,
    }
}

/// Drop every element whose flag is set, keeping the rest in order.
fn compact<T>(items: &mut Vec<T>, removed: &[bool]) {
    let mut flags = removed.iter();
    items.retain(|_| !flags.next().copied().unwrap_or(false));
}

// 1. movement, clamped to the canvas
fn move_player(player: &mut Player, controls: &Controls, canvas: Canvas) {
    let max_x = (canvas.width - player.width).max(0.0);
    let max_y = (canvas.height - player.height).max(0.0);

    if controls.left && player.x > 0.0 {
        player.x = (player.x - player.speed).max(0.0);
    }
    if controls.right && player.x < max_x {
        player.x = (player.x + player.speed).min(max_x);
    }
    if controls.up && player.y > 0.0 {
        player.y = (player.y - player.speed).max(0.0);
    }
    if controls.down && player.y < max_y {
        player.y = (player.y + player.speed).min(max_y);
    }
}

// 2. fire-rate gate
fn fire(world: &mut World, controls: &Controls, now: u64) {
    let player = &mut world.player;
    let ready = player
        .last_shot
        .map_or(true, |last| now.saturating_sub(last) >= FIRE_INTERVAL_MS);
    if !controls.shoot || !ready {
        return;
    }

    player.bullets.push(PlayerBullet {
        x: player.x + player.width / 2.0 - BULLET_SIZE / 2.0,
        y: player.y,
        width: BULLET_SIZE,
        height: BULLET_SIZE,
        speed: PLAYER_BULLET_SPEED,
        velocity: None,
    });
    player.last_shot = Some(now);
    world.events.push(GameEvent::ShotFired);
}

// 3. shield follows the key, plus any unexpired pickup grant
fn update_shield(player: &mut Player, controls: &Controls, now: u64) {
    if player.shield_granted_until.is_some_and(|until| now >= until) {
        player.shield_granted_until = None;
    }
    player.shield_active = controls.shield || player.shield_granted_until.is_some();
}

// 4. dash
fn update_dash(player: &mut Player, controls: &Controls, now: u64) {
    if player.dash_ends_at.is_some_and(|end| now >= end) {
        player.speed = player.base_speed;
        player.dash_ends_at = None;
    }
    if controls.dash && player.dash_cooldown(now) == 0 {
        player.speed = player.base_speed * DASH_MULTIPLIER;
        player.dash_ends_at = Some(now + DASH_DURATION_MS);
        player.dash_ready_at = now + DASH_COOLDOWN_MS;
        debug!(now, "dash");
    }
}

// 5. player bullets
fn advance_player_bullets(player: &mut Player) {
    for bullet in &mut player.bullets {
        match bullet.velocity {
            Some((vx, vy)) => {
                bullet.x += vx;
                bullet.y += vy;
            }
            None => bullet.y -= bullet.speed,
        }
    }
    player.bullets.retain(|b| b.y >= 0.0);
}

// 6. enemies: pursue, leave, shoot, collide
fn update_enemies(world: &mut World, now: u64) {
    let World { player, enemies, enemy_bullets, canvas, events, .. } = world;
    let (target_x, target_y) = player.bounds().center();

    let mut removed = vec![false; enemies.len()];
    let mut spent = vec![false; player.bullets.len()];

    for (ei, enemy) in enemies.iter_mut().enumerate() {
        let (ex, ey) = enemy.bounds().center();
        let (dx, dy) = (target_x - ex, target_y - ey);
        let dist = match dx.hypot(dy) {
            d if d == 0.0 => 1.0,
            d => d,
        };
        enemy.x += dx / dist * enemy.speed;
        enemy.y += dy / dist * enemy.speed;

        if enemy.y > canvas.height {
            removed[ei] = true;
            continue;
        }

        if now.saturating_sub(enemy.last_shot) >= ENEMY_FIRE_INTERVAL_MS {
            enemy.last_shot = now;
            let (sx, sy) = enemy.bounds().center();
            let angle = (target_y - sy).atan2(target_x - sx);
            enemy_bullets.push(EnemyBullet {
                x: sx,
                y: sy,
                width: BULLET_SIZE,
                height: BULLET_SIZE,
                vx: angle.cos() * ENEMY_BULLET_SPEED,
                vy: angle.sin() * ENEMY_BULLET_SPEED,
            });
        }

        if is_colliding(&*player, &*enemy) {
            if player.shield_active {
                events.push(GameEvent::ShieldBlocked);
            } else {
                player.take_damage(CONTACT_DAMAGE);
                events.push(GameEvent::PlayerHit);
            }
            removed[ei] = true;
            continue;
        }

        for (bi, bullet) in player.bullets.iter().enumerate() {
            if spent[bi] || !is_colliding(bullet, &*enemy) {
                continue;
            }
            enemy.health -= BULLET_DAMAGE;
            spent[bi] = true;
            if enemy.health <= 0 {
                removed[ei] = true;
                break;
            }
        }
        if removed[ei] {
            player.score += KILL_SCORE;
            events.push(GameEvent::EnemyDestroyed);
        }
    }

    compact(enemies, &removed);
    compact(&mut player.bullets, &spent);
}

// 7. enemy bullets
fn update_enemy_bullets(world: &mut World) {
    let World { player, enemy_bullets, canvas, events, .. } = world;
    let mut consumed = vec![false; enemy_bullets.len()];

    for (i, bullet) in enemy_bullets.iter_mut().enumerate() {
        bullet.x += bullet.vx;
        bullet.y += bullet.vy;

        let off_bounds = bullet.y > canvas.height
            || bullet.y + bullet.height < 0.0
            || bullet.x < 0.0
            || bullet.x > canvas.width;
        if off_bounds {
            consumed[i] = true;
            continue;
        }

        if is_colliding(&*bullet, &*player) {
            if player.shield_active {
                events.push(GameEvent::ShieldBlocked);
            } else {
                player.take_damage(CONTACT_DAMAGE);
                events.push(GameEvent::PlayerHit);
            }
            consumed[i] = true;
        }
    }

    compact(enemy_bullets, &consumed);
}

// 8. power-ups: expiry and pickup
fn update_power_ups(world: &mut World, now: u64) {
    let World { player, power_ups, rules, events, .. } = world;
    let mut gone = vec![false; power_ups.len()];

    for (i, power_up) in power_ups.iter().enumerate() {
        if now.saturating_sub(power_up.spawn_time) >= POWER_UP_LIFETIME_MS {
            gone[i] = true;
            events.push(GameEvent::PowerUpExpired(power_up.kind));
            continue;
        }
        if !is_colliding(&*player, power_up) {
            continue;
        }

        apply_power_up(player, power_up.kind, rules, now);
        gone[i] = true;
        events.push(GameEvent::PowerUpCollected(power_up.kind));
        debug!(kind = ?power_up.kind, health = player.health, speed = player.speed, "power-up collected");
    }

    compact(power_ups, &gone);
}

fn apply_power_up(player: &mut Player, kind: PowerUpKind, rules: &Rules, now: u64) {
    match kind {
        PowerUpKind::Health => player.heal(HEALTH_PICKUP),
        PowerUpKind::Shield => {
            // Without a grant the next frame's key state decides again.
            player.shield_active = true;
            if rules.shield_pickup_ms > 0 {
                player.shield_granted_until = Some(now + rules.shield_pickup_ms);
            }
        }
        PowerUpKind::Speed => player.speed += SPEED_PICKUP,
        PowerUpKind::Bullet => {
            for bullet in &mut player.bullets {
                if let Some((vx, vy)) = bullet.velocity.as_mut() {
                    *vx *= BULLET_PICKUP_SCALE;
                    *vy *= BULLET_PICKUP_SCALE;
                }
            }
        }
    }
}
