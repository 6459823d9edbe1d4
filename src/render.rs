/// Render step — translates the post-frame `World` into drawing calls.
///
/// Nothing here mutates game state.  The concrete surface (terminal, test
/// recorder, ...) lives behind the `Surface` trait.

use crossterm::style::Color;

use crate::compute::wave_at;
use crate::entities::{Aabb, Bounds, Canvas, Outcome, PowerUpKind, World};

// ── Colour palette ────────────────────────────────────────────────────────────

pub const C_PLAYER: Color = Color::Blue;
pub const C_SHIELD: Color = Color::Cyan;
pub const C_PLAYER_BULLET: Color = Color::Red;
pub const C_ENEMY: Color = Color::Green;
pub const C_ENEMY_BULLET: Color = Color::Rgb { r: 255, g: 165, b: 0 };
pub const C_TEXT: Color = Color::White;
pub const C_PANEL: Color = Color::DarkGrey;
pub const C_WIN: Color = Color::Green;
pub const C_LOSE: Color = Color::Red;

const SHIELD_LINE_WIDTH: f32 = 5.0;

fn power_up_color(kind: PowerUpKind) -> Color {
    match kind {
        PowerUpKind::Health => Color::Magenta,
        PowerUpKind::Shield => Color::Cyan,
        PowerUpKind::Speed => Color::Yellow,
        PowerUpKind::Bullet => Color::Red,
    }
}

// ── Drawing surface ───────────────────────────────────────────────────────────

/// The drawing primitives the render step needs, in canvas pixels.
pub trait Surface {
    fn clear(&mut self) -> std::io::Result<()>;
    fn fill_rect(&mut self, rect: Aabb, color: Color) -> std::io::Result<()>;
    fn stroke_circle(
        &mut self,
        cx: f32,
        cy: f32,
        radius: f32,
        line_width: f32,
        color: Color,
    ) -> std::io::Result<()>;
    /// Left-aligned text with its baseline at `y`.
    fn fill_text(&mut self, text: &str, x: f32, y: f32, color: Color) -> std::io::Result<()>;
    /// Text horizontally centred on `cx`.
    fn fill_text_centered(&mut self, text: &str, cx: f32, y: f32, color: Color)
        -> std::io::Result<()>;
}

// ── Frame ─────────────────────────────────────────────────────────────────────

/// The four HUD lines: health, score, wave, elapsed seconds.
pub fn hud_lines(world: &World, now: u64) -> [String; 4] {
    [
        format!("Health: {}", world.player.health),
        format!("Score: {}", world.player.score),
        format!("Wave: {}", wave_at(now)),
        format!("Time: {}s", now / 1000),
    ]
}

/// Draw one complete frame at session time `now`.
pub fn render<S: Surface>(surface: &mut S, world: &World, now: u64) -> std::io::Result<()> {
    surface.clear()?;

    let player = &world.player;
    surface.fill_rect(player.bounds(), C_PLAYER)?;
    if player.shield_active {
        let (cx, cy) = player.bounds().center();
        surface.stroke_circle(cx, cy, player.width, SHIELD_LINE_WIDTH, C_SHIELD)?;
    }

    for bullet in &player.bullets {
        surface.fill_rect(bullet.bounds(), C_PLAYER_BULLET)?;
    }
    for enemy in &world.enemies {
        surface.fill_rect(enemy.bounds(), C_ENEMY)?;
    }
    for bullet in &world.enemy_bullets {
        surface.fill_rect(bullet.bounds(), C_ENEMY_BULLET)?;
    }
    if world.rules.draw_power_ups {
        for power_up in &world.power_ups {
            surface.fill_rect(power_up.bounds(), power_up_color(power_up.kind))?;
        }
    }

    for (i, line) in hud_lines(world, now).iter().enumerate() {
        surface.fill_text(line, 10.0, 30.0 * (i as f32 + 1.0), C_TEXT)?;
    }
    Ok(())
}

// ── Overlays ──────────────────────────────────────────────────────────────────

/// A panel drawn over the playfield.
#[derive(Clone, Debug, PartialEq)]
pub enum Overlay {
    Paused,
    GameOver { outcome: Outcome, title: String, color: Color },
}

impl Overlay {
    /// The game-over panel for `outcome`; the same inputs always give the
    /// same title and colour.
    pub fn game_over(outcome: Outcome, player_name: &str) -> Self {
        let (title, color) = match outcome {
            Outcome::Win => (format!("{} 🏆!", player_name), C_WIN),
            Outcome::Lose => (format!("{} 👎🏻!", player_name), C_LOSE),
        };
        Overlay::GameOver { outcome, title, color }
    }
}

pub fn render_overlay<S: Surface>(
    surface: &mut S,
    overlay: &Overlay,
    canvas: Canvas,
) -> std::io::Result<()> {
    let panel = Aabb {
        x: canvas.width / 4.0,
        y: canvas.height / 3.0,
        width: canvas.width / 2.0,
        height: canvas.height / 3.0,
    };
    let cx = canvas.width / 2.0;
    surface.fill_rect(panel, C_PANEL)?;

    match overlay {
        Overlay::Paused => {
            surface.fill_text_centered("PAUSED", cx, panel.y + panel.height * 0.4, C_TEXT)?;
            surface.fill_text_centered("P - Resume", cx, panel.y + panel.height * 0.7, C_TEXT)?;
        }
        Overlay::GameOver { title, color, .. } => {
            surface.fill_text_centered(title, cx, panel.y + panel.height * 0.4, *color)?;
            surface.fill_text_centered(
                "R - Play Again  Esc - Quit",
                cx,
                panel.y + panel.height * 0.7,
                C_TEXT,
            )?;
        }
    }
    Ok(())
}
