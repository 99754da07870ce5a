use std::collections::HashMap;
use std::fs::File;
use std::io::{stdout, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{mpsc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    cursor,
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        KeyModifiers, KeyboardEnhancementFlags, MouseButton, MouseEvent, MouseEventKind,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    terminal, ExecutableCommand,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::info;

use rab_hunt::compute::{
    attack, init_state, move_backward, move_forward, restart, tick, toggle_view, turn_left,
    turn_right,
};
use rab_hunt::config::GameConfig;
use rab_hunt::display;
use rab_hunt::entities::{GameState, GameStatus};

const FRAME: Duration = Duration::from_millis(33); // ≈30 FPS

/// Longest step the simulation takes in one frame, so a stalled terminal
/// doesn't teleport everything.
const MAX_DT: f64 = 0.1;

/// A key is considered "held" if its last press/repeat event arrived within
/// this many frames.  Covers terminals that don't emit key-release events:
/// the OS key-repeat rate is ≥ 15 Hz, so a window of 4 frames (≈133 ms) is
/// always refreshed before expiry.
const HOLD_WINDOW: u64 = 4;

#[derive(Parser, Debug)]
#[command(name = "rab_hunt", about = "Hunt the fugitive across the map, sword first, gun later")]
struct Args {
    /// TOML file overriding gameplay tunables
    #[arg(long)]
    config: Option<PathBuf>,

    /// Seed the RNG for a repeatable game
    #[arg(long)]
    seed: Option<u64>,

    /// Write log output to this file (RUST_LOG filters it)
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Print the effective configuration as TOML and exit
    #[arg(long)]
    print_config: bool,
}

/// Returns true if `key` was seen within the last `HOLD_WINDOW` frames.
fn is_held(key_frame: &HashMap<KeyCode, u64>, key: &KeyCode, frame: u64) -> bool {
    key_frame
        .get(key)
        .map(|&last| frame.saturating_sub(last) <= HOLD_WINDOW)
        .unwrap_or(false)
}

fn held_any(key_frame: &HashMap<KeyCode, u64>, keys: &[KeyCode], frame: u64) -> bool {
    keys.iter().any(|k| is_held(key_frame, k, frame))
}

fn init_logging(path: &Path) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("cannot create log file {}", path.display()))?;
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

// ── Terminal lifecycle ────────────────────────────────────────────────────────

/// Puts the terminal into game mode and restores it when dropped, including
/// when a later setup step fails.
struct TerminalGuard {
    keyboard_enhanced: bool,
}

impl TerminalGuard {
    fn enter<W: Write>(out: &mut W) -> Result<Self> {
        terminal::enable_raw_mode().context("enabling raw mode")?;
        let mut guard = TerminalGuard { keyboard_enhanced: false };

        out.execute(terminal::EnterAlternateScreen)
            .context("entering alternate screen")?;
        out.execute(cursor::Hide).context("hiding cursor")?;
        out.execute(EnableMouseCapture).context("enabling mouse capture")?;

        // Request key-release (and key-repeat) events from the terminal.
        // Kitty-protocol terminals support this; others fall back gracefully.
        guard.keyboard_enhanced = out
            .execute(PushKeyboardEnhancementFlags(
                KeyboardEnhancementFlags::REPORT_EVENT_TYPES,
            ))
            .is_ok();
        Ok(guard)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let mut out = stdout();
        if self.keyboard_enhanced {
            let _ = out.execute(PopKeyboardEnhancementFlags);
        }
        let _ = out.execute(DisableMouseCapture);
        let _ = out.execute(cursor::Show);
        let _ = out.execute(terminal::LeaveAlternateScreen);
        let _ = terminal::disable_raw_mode();
    }
}

// ── Game loop ─────────────────────────────────────────────────────────────────

/// Runs until the player quits.
///
/// Input model: instead of acting on each key event individually, we maintain
/// a `key_frame` map that records the frame number of the last press/repeat
/// event for every key.  Each frame we check which movement keys are still
/// "fresh" (within `HOLD_WINDOW` frames) and apply them together, so walking
/// and turning combine.  One-shot actions (attack, view, restart) fire on
/// the press itself.
fn game_loop<W: Write>(
    out: &mut W,
    state: &mut GameState,
    rx: &mpsc::Receiver<Event>,
    rng: &mut StdRng,
) -> std::io::Result<()> {
    let (mut width, mut height) = terminal::size()?;
    let mut key_frame: HashMap<KeyCode, u64> = HashMap::new();
    let mut frame: u64 = 0;
    let mut last_tick = Instant::now();

    loop {
        let frame_start = Instant::now();
        frame += 1;

        // ── Drain all pending input events (non-blocking) ─────────────────────
        while let Ok(ev) = rx.try_recv() {
            match ev {
                Event::Key(KeyEvent { code, kind, modifiers, .. }) => match kind {
                    KeyEventKind::Press | KeyEventKind::Repeat => {
                        key_frame.insert(code, frame);
                        match code {
                            KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('Q') => {
                                return Ok(());
                            }
                            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                                return Ok(());
                            }
                            KeyCode::Char('r') | KeyCode::Char('R')
                                if kind == KeyEventKind::Press =>
                            {
                                info!("restart requested");
                                *state = restart(state, rng);
                            }
                            KeyCode::Char(' ') if kind == KeyEventKind::Press => {
                                *state = attack(state, rng);
                            }
                            KeyCode::Char('v') | KeyCode::Char('V')
                                if kind == KeyEventKind::Press =>
                            {
                                *state = toggle_view(state);
                            }
                            KeyCode::Left => state.camera = state.camera.orbit_left(),
                            KeyCode::Right => state.camera = state.camera.orbit_right(),
                            KeyCode::Up => state.camera = state.camera.raise(),
                            KeyCode::Down => state.camera = state.camera.lower(),
                            _ => {}
                        }
                    }
                    // Release: remove key immediately (keyboard-enhancement path)
                    KeyEventKind::Release => {
                        key_frame.remove(&code);
                    }
                },
                Event::Mouse(MouseEvent {
                    kind: MouseEventKind::Down(button),
                    ..
                }) => match button {
                    MouseButton::Left => *state = attack(state, rng),
                    MouseButton::Right => *state = toggle_view(state),
                    MouseButton::Middle => {}
                },
                Event::Resize(w, h) => {
                    width = w;
                    height = h;
                }
                _ => {}
            }
        }

        // ── Apply held-key actions every frame ────────────────────────────────
        if state.status == GameStatus::Playing {
            if held_any(&key_frame, &[KeyCode::Char('w'), KeyCode::Char('W')], frame) {
                *state = move_forward(state);
            } else if held_any(&key_frame, &[KeyCode::Char('s'), KeyCode::Char('S')], frame) {
                *state = move_backward(state);
            }
            if held_any(&key_frame, &[KeyCode::Char('a'), KeyCode::Char('A')], frame) {
                *state = turn_left(state);
            } else if held_any(&key_frame, &[KeyCode::Char('d'), KeyCode::Char('D')], frame) {
                *state = turn_right(state);
            }
        }

        let now = Instant::now();
        let dt = now.duration_since(last_tick).as_secs_f64().min(MAX_DT);
        last_tick = now;
        *state = tick(state, dt, rng);

        display::render(out, state, width, height)?;

        let elapsed = frame_start.elapsed();
        if elapsed < FRAME {
            thread::sleep(FRAME - elapsed);
        }
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => GameConfig::load(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => GameConfig::default(),
    };

    if args.print_config {
        print!("{}", config.to_toml()?);
        return Ok(());
    }

    if let Some(path) = &args.log_file {
        init_logging(path)?;
    }

    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    info!(seed = ?args.seed, "starting");

    let raw_out = stdout();
    let mut out = BufWriter::new(raw_out);

    let guard = TerminalGuard::enter(&mut out)?;

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

    let mut state = init_state(config, &mut rng);
    let result = game_loop(&mut out, &mut state, &rx, &mut rng);

    let _ = out.flush();
    drop(guard);

    info!(kills = state.kills, status = ?state.status, "exiting");
    result.context("game loop failed")
}
