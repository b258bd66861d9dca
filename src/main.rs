mod display;

use std::collections::HashMap;
use std::fs::File;
use std::io::{stdout, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{mpsc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
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
use rand::{Rng, SeedableRng};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use neon_sentinel::collision::CollisionReport;
use neon_sentinel::entities::Point;
use neon_sentinel::{
    AudioError, Command, FrameInput, GameConfig, GameHooks, GameSession, GameStatus, SoundCue,
    SpawnPolicy,
};

use display::TerminalCanvas;

const FRAME: Duration = Duration::from_millis(16); // ≈60 FPS

/// A key is considered "held" if its last press/repeat event arrived within
/// this many frames.  Covers terminals that don't emit key-release events:
/// the OS key-repeat rate is ≥ 15 Hz, so a window of 8 frames (≈128 ms) is
/// always refreshed before expiry.
const HOLD_WINDOW: u64 = 8;

/// Returns true if `key` was seen within the last `HOLD_WINDOW` frames.
fn is_held(key_frame: &HashMap<KeyCode, u64>, key: &KeyCode, frame: u64) -> bool {
    key_frame
        .get(key)
        .map(|&last| frame.saturating_sub(last) <= HOLD_WINDOW)
        .unwrap_or(false)
}

// ── Command line ──────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, Default, ValueEnum)]
enum SpawnMode {
    /// Random trial every frame, growing with play time.
    #[default]
    Probability,
    /// Fixed cooldown that shortens after every spawn.
    Interval,
}

#[derive(Debug, Parser)]
#[command(name = "neon_sentinel", about = "Neon vertical shooter for the terminal")]
struct Cli {
    /// easy, normal or hard
    #[arg(short, long, default_value = "normal")]
    difficulty: String,

    /// Enemy spawn schedule
    #[arg(long, value_enum, default_value_t)]
    spawn: SpawnMode,

    /// Enemies that slip past the bottom edge do not cost a life
    #[arg(long)]
    no_escape_damage: bool,

    /// Start with the terminal bell disabled
    #[arg(long)]
    mute: bool,

    /// Seed for a reproducible run
    #[arg(long)]
    seed: Option<u64>,

    /// Log file (stdout is the game screen)
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn init_logging(path: &Path) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("cannot create log file {}", path.display()))?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

// ── Host hooks ────────────────────────────────────────────────────────────────

/// The terminal bell stands in for audio.
struct TerminalHooks {
    sound_on: bool,
}

impl GameHooks for TerminalHooks {
    fn play_sound(&mut self, cue: SoundCue) -> Result<(), AudioError> {
        if !self.sound_on {
            return Ok(());
        }
        match cue {
            SoundCue::Hit | SoundCue::UfoKill => {
                let mut err = std::io::stderr();
                err.write_all(b"\x07")?;
                err.flush()?;
                Ok(())
            }
            SoundCue::Shoot | SoundCue::Explosion => Ok(()),
        }
    }

    fn hud_changed(&mut self, score: u32, lives: u32) {
        debug!(score, lives, "hud");
    }

    fn game_over(&mut self, final_score: u32) {
        info!(final_score, "final score");
    }
}

/// Forward a start/restart key. When it changes the session, the key is
/// consumed so it does not count as held input on the first frame, and any
/// pointer left over from the previous screen is dropped.
fn command_key<H: GameHooks>(
    session: &mut GameSession,
    command: Command,
    code: KeyCode,
    now_ms: f64,
    hooks: &mut H,
    key_frame: &mut HashMap<KeyCode, u64>,
    pointer: &mut Option<f32>,
) -> bool {
    if !session.handle_command(command, now_ms, hooks) {
        return false;
    }
    key_frame.remove(&code);
    *pointer = None;
    true
}

// ── Game loop ─────────────────────────────────────────────────────────────────

/// Runs until the player quits.
///
/// Input model: instead of acting on each key event individually, we maintain
/// a `key_frame` map that records the frame number of the last press/repeat
/// event for every key.  Each frame we check which keys are still "fresh"
/// (within `HOLD_WINDOW` frames) and apply all their effects simultaneously.
/// This allows Space + A/D to be held at the same time with no interference.
/// A held left mouse button steers the ship towards the pointer and fires.
fn game_loop<W: Write>(
    out: &mut W,
    session: &mut GameSession,
    hooks: &mut TerminalHooks,
    rng: &mut StdRng,
    rx: &mpsc::Receiver<Event>,
) -> Result<()> {
    let (cols, rows) = terminal::size()?;
    let mut canvas = TerminalCanvas::new(cols, rows);
    let clock = Instant::now();

    // Maps each held key → the frame it was last seen (press or repeat).
    let mut key_frame: HashMap<KeyCode, u64> = HashMap::new();
    let mut pointer: Option<f32> = None;
    let mut frame: u64 = 0;

    loop {
        let frame_start = Instant::now();
        let now_ms = clock.elapsed().as_secs_f64() * 1000.0;
        frame += 1;

        // ── Drain all pending input events (non-blocking) ─────────────────────
        while let Ok(ev) = rx.try_recv() {
            match ev {
                Event::Key(KeyEvent { code, kind, modifiers, .. }) => match kind {
                    // Press: record key + handle one-shot actions
                    KeyEventKind::Press => {
                        key_frame.insert(code, frame);
                        match code {
                            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                                return Ok(());
                            }
                            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                                return Ok(());
                            }
                            KeyCode::Char('m') | KeyCode::Char('M') => {
                                hooks.sound_on = !hooks.sound_on;
                            }
                            KeyCode::Char(digit @ '1'..='3') => {
                                let key = match digit {
                                    '1' => "easy",
                                    '2' => "normal",
                                    _ => "hard",
                                };
                                session.select_difficulty(key)?;
                            }
                            KeyCode::Enter | KeyCode::Char(' ') => {
                                command_key(
                                    session,
                                    Command::Start,
                                    code,
                                    now_ms,
                                    hooks,
                                    &mut key_frame,
                                    &mut pointer,
                                );
                            }
                            KeyCode::Char('r') | KeyCode::Char('R') => {
                                command_key(
                                    session,
                                    Command::Restart,
                                    code,
                                    now_ms,
                                    hooks,
                                    &mut key_frame,
                                    &mut pointer,
                                );
                            }
                            _ => {}
                        }
                    }
                    // Repeat: refresh timestamp so key stays "held"
                    KeyEventKind::Repeat => {
                        key_frame.insert(code, frame);
                    }
                    // Release: remove key immediately (keyboard-enhancement path)
                    KeyEventKind::Release => {
                        key_frame.remove(&code);
                    }
                },
                Event::Mouse(MouseEvent { kind, column, .. }) => match kind {
                    MouseEventKind::Down(MouseButton::Left)
                    | MouseEventKind::Drag(MouseButton::Left) => {
                        pointer = Some(display::column_to_world(column));
                    }
                    MouseEventKind::Up(MouseButton::Left) => pointer = None,
                    _ => {}
                },
                _ => {}
            }
        }

        let input = if session.status == GameStatus::Playing {
            FrameInput {
                left: is_held(&key_frame, &KeyCode::Left, frame)
                    || is_held(&key_frame, &KeyCode::Char('a'), frame)
                    || is_held(&key_frame, &KeyCode::Char('A'), frame),
                right: is_held(&key_frame, &KeyCode::Right, frame)
                    || is_held(&key_frame, &KeyCode::Char('d'), frame)
                    || is_held(&key_frame, &KeyCode::Char('D'), frame),
                fire: is_held(&key_frame, &KeyCode::Char(' '), frame),
                pointer,
            }
        } else {
            FrameInput::default()
        };

        let report = session.tick(&input, now_ms, rng, hooks);
        if report != CollisionReport::default() {
            debug!(?report, frame = session.frame, "collisions");
        }

        let shake = session.effects.shake;
        let offset = if shake > 0.0 {
            Point::new(rng.gen_range(-shake..shake), rng.gen_range(-shake..shake))
        } else {
            Point::default()
        };
        display::render(out, &mut canvas, session, offset, hooks.sound_on)?;

        let elapsed = frame_start.elapsed();
        if elapsed < FRAME {
            thread::sleep(FRAME - elapsed);
        }
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_path = cli
        .log_file
        .clone()
        .unwrap_or_else(|| std::env::temp_dir().join("neon_sentinel.log"));
    init_logging(&log_path)?;

    // Reject bad settings before the terminal is touched.
    let (cols, rows) = terminal::size().context("cannot query terminal size")?;
    let mut config = GameConfig::default().with_difficulty_key(&cli.difficulty)?;
    config.arena = display::arena_for(cols, rows);
    config.escape_counts_as_damage = !cli.no_escape_damage;
    if let SpawnMode::Interval = cli.spawn {
        config.spawn_policy = SpawnPolicy::DEFAULT_INTERVAL;
    }

    let mut rng = match cli.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let mut session = GameSession::new(config, &mut rng).context("invalid game configuration")?;
    let mut hooks = TerminalHooks { sound_on: !cli.mute };
    info!(cols, rows, difficulty = %session.config.difficulty, "neon sentinel starting");

    let mut out = BufWriter::new(stdout());
    terminal::enable_raw_mode()?;
    out.execute(terminal::EnterAlternateScreen)?;
    out.execute(cursor::Hide)?;
    out.execute(EnableMouseCapture)?;

    // Request key-release (and key-repeat) events from the terminal.
    // Ghostty / kitty-protocol terminals support this; others fall back gracefully.
    let keyboard_enhanced = out
        .execute(PushKeyboardEnhancementFlags(
            KeyboardEnhancementFlags::REPORT_EVENT_TYPES,
        ))
        .is_ok();

    // Dedicate a thread exclusively to blocking event reads, sending them
    // through a channel so the game loop never has to block on I/O.
    let (tx, rx) = mpsc::channel::<Event>();
    thread::spawn(move || loop {
        match event::read() {
            Ok(ev) => {
                if tx.send(ev).is_err() {
                    break; // receiver dropped → program exiting
                }
            }
            Err(err) => {
                warn!(error = %err, "terminal event read failed");
                break;
            }
        }
    });

    let result = game_loop(&mut out, &mut session, &mut hooks, &mut rng, &rx);

    // Always restore the terminal
    if keyboard_enhanced {
        let _ = out.execute(PopKeyboardEnhancementFlags);
    }
    let _ = out.execute(DisableMouseCapture);
    let _ = out.execute(cursor::Show);
    let _ = out.execute(terminal::LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();

    if let Err(err) = &result {
        warn!(error = %err, "exiting with error");
    }
    info!(best = session.best_score, "bye");
    result
}
