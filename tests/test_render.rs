use crossterm::style::Color;
use rand::rngs::StdRng;
use rand::SeedableRng;

use survival_shooter::compute::init_world;
use survival_shooter::entities::*;
use survival_shooter::render::*;
use survival_shooter::session::{Session, SessionSettings};

#[derive(Debug, Clone, PartialEq)]
enum Draw {
    Clear,
    Rect(Aabb, Color),
    Circle { cx: f32, cy: f32, radius: f32, color: Color },
    Text(String, f32, f32, Color),
    Centered(String, Color),
}

#[derive(Default)]
struct Recorder {
    calls: Vec<Draw>,
}

impl Surface for Recorder {
    fn clear(&mut self) -> std::io::Result<()> {
        self.calls.push(Draw::Clear);
        Ok(())
    }

    fn fill_rect(&mut self, rect: Aabb, color: Color) -> std::io::Result<()> {
        self.calls.push(Draw::Rect(rect, color));
        Ok(())
    }

    fn stroke_circle(
        &mut self,
        cx: f32,
        cy: f32,
        radius: f32,
        _line_width: f32,
        color: Color,
    ) -> std::io::Result<()> {
        self.calls.push(Draw::Circle { cx, cy, radius, color });
        Ok(())
    }

    fn fill_text(&mut self, text: &str, x: f32, y: f32, color: Color) -> std::io::Result<()> {
        self.calls.push(Draw::Text(text.to_string(), x, y, color));
        Ok(())
    }

    fn fill_text_centered(
        &mut self,
        text: &str,
        _cx: f32,
        _y: f32,
        color: Color,
    ) -> std::io::Result<()> {
        self.calls.push(Draw::Centered(text.to_string(), color));
        Ok(())
    }
}

const CANVAS: Canvas = Canvas { width: 800.0, height: 600.0 };

fn draw(world: &World, now: u64) -> Vec<Draw> {
    let mut r = Recorder::default();
    render(&mut r, world, now).unwrap();
    r.calls
}

fn rects_of(calls: &[Draw], color: Color) -> usize {
    calls.iter().filter(|c| matches!(c, Draw::Rect(_, col) if *col == color)).count()
}

#[test]
fn frame_starts_with_clear_then_player() {
    let w = init_world(CANVAS, Rules::default());
    let calls = draw(&w, 0);
    assert_eq!(calls[0], Draw::Clear);
    assert_eq!(calls[1], Draw::Rect(w.player.bounds(), C_PLAYER));
}

#[test]
fn shield_ring_only_when_active() {
    let mut w = init_world(CANVAS, Rules::default());
    assert!(!draw(&w, 0).iter().any(|c| matches!(c, Draw::Circle { .. })));

    w.player.shield_active = true;
    let calls = draw(&w, 0);
    assert!(calls.contains(&Draw::Circle { cx: 400.0, cy: 525.0, radius: 50.0, color: C_SHIELD }));
}

#[test]
fn entities_drawn_in_their_colours() {
    let mut w = init_world(CANVAS, Rules::default());
    w.player.bullets.push(PlayerBullet {
        x: 10.0,
        y: 10.0,
        width: BULLET_SIZE,
        height: BULLET_SIZE,
        speed: PLAYER_BULLET_SPEED,
        velocity: None,
    });
    for x in [100.0, 200.0] {
        w.enemies.push(Enemy {
            x,
            y: 50.0,
            width: ENEMY_SIZE,
            height: ENEMY_SIZE,
            speed: 1.0,
            health: 35,
            last_shot: 0,
        });
    }
    w.enemy_bullets.push(EnemyBullet {
        x: 300.0,
        y: 300.0,
        width: BULLET_SIZE,
        height: BULLET_SIZE,
        vx: 0.0,
        vy: 4.0,
    });

    let calls = draw(&w, 0);
    assert_eq!(rects_of(&calls, C_PLAYER_BULLET), 1);
    assert_eq!(rects_of(&calls, C_ENEMY), 2);
    assert_eq!(rects_of(&calls, C_ENEMY_BULLET), 1);
}

fn with_power_up(rules: Rules) -> World {
    let mut w = init_world(CANVAS, rules);
    w.power_ups.push(PowerUp {
        x: 0.0,
        y: 0.0,
        width: POWER_UP_SIZE,
        height: POWER_UP_SIZE,
        kind: PowerUpKind::Speed,
        spawn_time: 0,
    });
    w
}

#[test]
fn power_ups_hidden_by_default() {
    let calls = draw(&with_power_up(Rules::default()), 0);
    // clear + player only
    assert_eq!(calls.iter().filter(|c| matches!(c, Draw::Rect(..))).count(), 1);
}

#[test]
fn power_ups_drawn_when_enabled() {
    let rules = Rules { draw_power_ups: true, ..Rules::default() };
    let calls = draw(&with_power_up(rules), 0);
    assert_eq!(calls.iter().filter(|c| matches!(c, Draw::Rect(..))).count(), 2);
}

#[test]
fn hud_text_positions_and_values() {
    let mut w = init_world(CANVAS, Rules::default());
    w.player.health = 70;
    w.player.score = 40;
    let texts: Vec<Draw> = draw(&w, 61_500)
        .into_iter()
        .filter(|c| matches!(c, Draw::Text(..)))
        .collect();
    assert_eq!(
        texts,
        vec![
            Draw::Text("Health: 70".into(), 10.0, 30.0, C_TEXT),
            Draw::Text("Score: 40".into(), 10.0, 60.0, C_TEXT),
            Draw::Text("Wave: 3".into(), 10.0, 90.0, C_TEXT),
            Draw::Text("Time: 61s".into(), 10.0, 120.0, C_TEXT),
        ]
    );
}

#[test]
fn game_over_overlay_is_deterministic() {
    let lose = Overlay::game_over(Outcome::Lose, "Kim");
    assert_eq!(lose, Overlay::game_over(Outcome::Lose, "Kim"));
    let win = Overlay::game_over(Outcome::Win, "Kim");
    match (&lose, &win) {
        (
            Overlay::GameOver { title: lt, color: lc, .. },
            Overlay::GameOver { title: wt, color: wc, .. },
        ) => {
            assert_eq!(lt, "Kim 👎🏻!");
            assert_eq!(wt, "Kim 🏆!");
            assert_eq!(*lc, C_LOSE);
            assert_eq!(*wc, C_WIN);
            assert_ne!(lc, wc);
        }
        _ => panic!("expected game-over overlays"),
    }
}

#[test]
fn overlay_title_uses_outcome_colour() {
    let mut r = Recorder::default();
    render_overlay(&mut r, &Overlay::game_over(Outcome::Win, "Kim"), CANVAS).unwrap();
    assert!(r.calls.contains(&Draw::Centered("Kim 🏆!".into(), C_WIN)));
}

#[test]
fn paused_session_renders_pause_panel() {
    let mut s = Session::new(SessionSettings::default(), StdRng::seed_from_u64(1));
    s.start(0);
    s.toggle_pause(1_000);
    let mut r = Recorder::default();
    s.render(&mut r, 5_000).unwrap();
    assert!(r.calls.contains(&Draw::Centered("PAUSED".into(), C_TEXT)));
    // Session time froze at the pause.
    assert!(r.calls.contains(&Draw::Text("Time: 1s".into(), 10.0, 120.0, C_TEXT)));
}
