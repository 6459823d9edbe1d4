mod display;

use std::collections::HashMap;
use std::io::{stdout, BufWriter, Write};
use std::path::PathBuf;
use std::sync::{mpsc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    cursor,
    event::{
        self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, KeyboardEnhancementFlags,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    terminal, ExecutableCommand,
};
use rand::rngs::StdRng;
use rand::SeedableRng;

use survival_shooter::audio::SilentAudio;
use survival_shooter::config::{self, Config};
use survival_shooter::entities::Mode;
use survival_shooter::input::KeyState;
use survival_shooter::session::{Session, SessionSettings};

use display::TerminalSurface;

/// A key is considered "held" if its last press/repeat event arrived within
/// this many frames.  Covers terminals that don't emit key-release events:
/// the OS key-repeat rate is ≥ 15 Hz, so a window of 8 frames (≈133 ms at
/// 60 FPS) is always refreshed before expiry.
const HOLD_WINDOW: u64 = 8;

const VOLUME_STEP: f32 = 0.1;

const HINT: &str = "WASD : Move   SPACE : Shoot   Q : Shield   E : Dash   P : Pause   ESC : Quit";

#[derive(Parser, Debug)]
#[command(name = "survival_shooter", about = "Survival-mode arcade shooter for the terminal")]
struct Args {
    /// Config file (defaults to the user config dir)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Player name shown on the game-over screen
    #[arg(long)]
    name: Option<String>,

    /// Seed for deterministic spawns
    #[arg(long)]
    seed: Option<u64>,

    /// Log file (defaults to survival.log in the user data dir)
    #[arg(long)]
    log_file: Option<PathBuf>,
}

// ── Key handling ──────────────────────────────────────────────────────────────

/// Lowercase key identifier, matching what bindings name.
fn key_name(code: &KeyCode) -> Option<String> {
    match code {
        KeyCode::Char(c) => Some(c.to_lowercase().collect()),
        KeyCode::Left => Some("arrowleft".into()),
        KeyCode::Right => Some("arrowright".into()),
        KeyCode::Up => Some("arrowup".into()),
        KeyCode::Down => Some("arrowdown".into()),
        KeyCode::Enter => Some("enter".into()),
        _ => None,
    }
}

/// Keys seen within the last `HOLD_WINDOW` frames.
fn held_keys(key_frame: &HashMap<String, u64>, frame: u64) -> KeyState {
    key_frame
        .iter()
        .filter(|&(_, &last)| frame.saturating_sub(last) <= HOLD_WINDOW)
        .map(|(key, _)| key.as_str())
        .collect()
}

// ── Game loop ─────────────────────────────────────────────────────────────────

/// Input model: instead of acting on each key event individually, we maintain
/// a `key_frame` map that records the frame number of the last press/repeat
/// event for every key.  Each frame the keys that are still "fresh" form the
/// `KeyState` handed to the session, so Space + A/D can be held together.
///
/// Works on two classes of terminal:
/// * **Keyboard-enhancement capable** (Ghostty, kitty, etc.): proper
///   `Press` / `Repeat` / `Release` events → keys are removed on release.
/// * **Classic terminals**: only `Press` events (OS key-repeat shows as
///   repeated `Press`).  Keys expire naturally after `HOLD_WINDOW` frames of
///   silence.
fn game_loop<W: Write>(
    out: &mut W,
    session: &mut Session<StdRng>,
    rx: &mpsc::Receiver<Event>,
    frame_time: Duration,
) -> std::io::Result<()> {
    let clock = Instant::now();
    let mut key_frame: HashMap<String, u64> = HashMap::new();
    let mut frame: u64 = 0;
    let pause_key = session.settings().bindings.pause.clone();

    loop {
        let frame_start = Instant::now();
        let now = clock.elapsed().as_millis() as u64;
        frame += 1;

        // ── Drain all pending input events (non-blocking) ─────────────────────
        while let Ok(ev) = rx.try_recv() {
            let Event::Key(KeyEvent { code, kind, modifiers, .. }) = ev else {
                continue;
            };
            let name = key_name(&code);
            match kind {
                KeyEventKind::Press => {
                    if let Some(name) = &name {
                        key_frame.insert(name.clone(), frame);
                    }
                    match code {
                        KeyCode::Esc => return Ok(()),
                        KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                            return Ok(());
                        }
                        KeyCode::Enter if session.mode() == Mode::Idle => session.start(now),
                        KeyCode::Char('r') | KeyCode::Char('R')
                            if matches!(session.mode(), Mode::Ended(_)) =>
                        {
                            session.play_again(now);
                        }
                        KeyCode::Char('+') | KeyCode::Char('=') => {
                            let volume = session.settings().volume + VOLUME_STEP;
                            session.set_volume(volume);
                        }
                        KeyCode::Char('-') => {
                            let volume = session.settings().volume - VOLUME_STEP;
                            session.set_volume(volume);
                        }
                        _ if name.as_deref() == Some(pause_key.as_str()) => {
                            session.toggle_pause(now);
                        }
                        _ => {}
                    }
                }
                KeyEventKind::Repeat => {
                    if let Some(name) = name {
                        key_frame.insert(name, frame);
                    }
                }
                KeyEventKind::Release => {
                    if let Some(name) = name {
                        key_frame.remove(&name);
                    }
                }
            }
        }

        let size = terminal::size()?;
        if session.mode() == Mode::Idle {
            display::render_title(out, size, &session.settings().player_name)?;
        } else {
            session.pump(now, &held_keys(&key_frame, frame));
            let mut surface = TerminalSurface::new(out, session.settings().canvas, size);
            session.render(&mut surface, now)?;
            surface.present(HINT)?;
        }

        let elapsed = frame_start.elapsed();
        if elapsed < frame_time {
            thread::sleep(frame_time - elapsed);
        }
    }
}

// ── Terminal ──────────────────────────────────────────────────────────────────

/// Leaves raw mode and the alternate screen when dropped.
struct TerminalGuard {
    keyboard_enhanced: bool,
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let mut out = stdout();
        if self.keyboard_enhanced {
            let _ = out.execute(PopKeyboardEnhancementFlags);
        }
        let _ = out.execute(cursor::Show);
        let _ = out.execute(terminal::LeaveAlternateScreen);
        let _ = terminal::disable_raw_mode();
    }
}

// ── Setup ─────────────────────────────────────────────────────────────────────

fn init_logging(path: Option<PathBuf>) -> Result<()> {
    let path = match path {
        Some(path) => path,
        None => {
            let dir = config::data_dir().unwrap_or_else(|| PathBuf::from("."));
            std::fs::create_dir_all(&dir)
                .with_context(|| format!("creating {}", dir.display()))?;
            dir.join("survival.log")
        }
    };
    let file = std::fs::File::create(&path)
        .with_context(|| format!("opening log file {}", path.display()))?;

    // The terminal is in raw mode for the whole run, so logs go to a file.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn load_config(args: &Args) -> Result<Config> {
    let mut config = match &args.config {
        Some(path) => config::load_from(path)?,
        None => config::load(),
    };
    if let Some(name) = &args.name {
        config.player.name = name.clone();
    }
    Ok(config)
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.log_file.clone())?;
    let config = load_config(&args)?;

    let rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let frame_time = Duration::from_secs_f64(1.0 / config.display.fps.max(1) as f64);
    let mut session = Session::new(SessionSettings::from_config(&config), rng)
        .with_audio(Box::new(SilentAudio));
    tracing::info!(?args, "launching");

    terminal::enable_raw_mode().context("enabling raw mode")?;
    // From here on the terminal is restored on every exit path, panics included.
    // Declared before `out` so the buffer is flushed first.
    let mut guard = TerminalGuard { keyboard_enhanced: false };
    let mut out = BufWriter::new(stdout());
    out.execute(terminal::EnterAlternateScreen)?;
    out.execute(cursor::Hide)?;

    // Request key-release (and key-repeat) events from the terminal.
    // Ghostty / kitty-protocol terminals support this; others fall back gracefully.
    guard.keyboard_enhanced = out
        .execute(PushKeyboardEnhancementFlags(
            KeyboardEnhancementFlags::REPORT_EVENT_TYPES,
        ))
        .is_ok();

    // Dedicate a thread exclusively to blocking event reads, sending them
    // through a channel so the game loop never has to block on I/O.
    let (tx, rx) = mpsc::channel::<Event>();
    thread::spawn(move || {
        while let Ok(ev) = event::read() {
            if tx.send(ev).is_err() {
                break; // receiver dropped → program exiting
            }
        }
    });

    let result = game_loop(&mut out, &mut session, &rx, frame_time);
    drop(out);
    drop(guard);

    if let Err(e) = &result {
        tracing::error!("game loop failed: {}", e);
    }
    result.context("running game loop")
}
