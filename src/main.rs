mod display;

use std::collections::{HashMap, HashSet};
use std::fs::OpenOptions;
use std::io::{stdout, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{mpsc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::Context;
use crossterm::{
    cursor,
    event::{
        self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers,
        KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    terminal,
    ExecutableCommand, QueueableCommand,
};
use rand::thread_rng;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use haunted_run::audio::{Cue, CuePlayer};
use haunted_run::config::{settings_path, Difficulty, Settings};
use haunted_run::engine::{Engine, EngineEvent, Hooks};
use haunted_run::entities::{GamePhase, Level};
use haunted_run::input::Key;
use haunted_run::levels::{level_by_id, level_count, load_level_file};
use haunted_run::storage::{self, default_store_path, load_high_score, FileStore, SharedStore};
use haunted_run::surface::Canvas;

use display::{canvas_size, HudView};

const FRAME: Duration = Duration::from_millis(16); // ≈60 FPS

/// How often the HUD re-reads the engine's stats.
const STATS_POLL: Duration = Duration::from_millis(100);

// ── Held-key emulation ────────────────────────────────────────────────────────

/// A key is considered "held" if its last press/repeat event arrived within
/// this many frames. Terminals without key-release events only ever send
/// `Press` (OS key-repeat included), so keys expire after this much silence.
const HOLD_WINDOW: u64 = 8;

/// Without release events a held jump key goes silent for the OS repeat
/// delay (up to ~500 ms) after its first press. Jump keys must outlast that
/// gap, or the engine sees a release and a fresh press mid-air.
const JUMP_HOLD_WINDOW: u64 = 40;

fn hold_window(key: Key, release_events: bool) -> u64 {
    match key {
        Key::Space | Key::ArrowUp if !release_events => JUMP_HOLD_WINDOW,
        _ => HOLD_WINDOW,
    }
}

fn is_fresh(key: Key, last: u64, frame: u64, release_events: bool) -> bool {
    frame.saturating_sub(last) <= hold_window(key, release_events)
}

fn map_key(code: KeyCode) -> Option<Key> {
    match code {
        KeyCode::Left | KeyCode::Char('a') | KeyCode::Char('A') => Some(Key::ArrowLeft),
        KeyCode::Right | KeyCode::Char('d') | KeyCode::Char('D') => Some(Key::ArrowRight),
        KeyCode::Up | KeyCode::Char('w') | KeyCode::Char('W') => Some(Key::ArrowUp),
        KeyCode::Char(' ') => Some(Key::Space),
        KeyCode::Char('x') | KeyCode::Char('X') => Some(Key::KeyX),
        KeyCode::Esc => Some(Key::Escape),
        _ => None,
    }
}

// ── Sound ─────────────────────────────────────────────────────────────────────

/// Rings the terminal bell for the cues worth interrupting the player for.
struct BellCues;

impl CuePlayer for BellCues {
    fn play(&mut self, cue: Cue) {
        if matches!(cue, Cue::Damage | Cue::GameOver | Cue::LevelComplete) {
            let mut out = stdout();
            let _ = out.write_all(b"\x07").and_then(|_| out.flush());
        }
    }
}

// ── Logging ───────────────────────────────────────────────────────────────────

fn log_path() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home).join(".haunted_run.log")
}

/// The terminal is in raw mode for the whole run, so logs go to a file.
fn init_logging() -> anyhow::Result<()> {
    let path = log_path();
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("opening log file {}", path.display()))?;

    let filter = EnvFilter::try_from_env("HAUNTED_RUN_LOG")
        .unwrap_or_else(|_| EnvFilter::new("haunted_run=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(Mutex::new(file)).with_ansi(false))
        .init();
    Ok(())
}

// ── Menu ──────────────────────────────────────────────────────────────────────

enum MenuResult {
    Start,
    Quit,
}

fn show_menu<W: Write>(
    out: &mut W,
    rx: &mpsc::Receiver<Event>,
    settings: &mut Settings,
    custom_level: Option<&Level>,
    storage: &SharedStore,
) -> std::io::Result<MenuResult> {
    loop {
        let level_name = match custom_level {
            Some(level) => level.name.clone(),
            None => level_by_id(settings.level_id).name,
        };
        let high_score = load_high_score(&*storage.borrow());
        display::draw_menu(out, settings, &level_name, high_score)?;

        // Block until the user does something
        match rx.recv() {
            Ok(Event::Key(KeyEvent { code, kind: KeyEventKind::Press, modifiers, .. })) => match code {
                KeyCode::Char('1') => settings.game.difficulty = Difficulty::Easy,
                KeyCode::Char('2') => settings.game.difficulty = Difficulty::Normal,
                KeyCode::Char('3') => settings.game.difficulty = Difficulty::Hard,
                KeyCode::Tab => settings.game.difficulty = settings.game.difficulty.next(),
                KeyCode::Char('l') | KeyCode::Char('L') if custom_level.is_none() => {
                    settings.level_id = settings.level_id % level_count() + 1;
                }
                KeyCode::Char('s') | KeyCode::Char('S') => {
                    settings.game.sound_enabled = !settings.game.sound_enabled;
                }
                KeyCode::Enter | KeyCode::Char(' ') => return Ok(MenuResult::Start),
                KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                    return Ok(MenuResult::Quit);
                }
                KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                    return Ok(MenuResult::Quit);
                }
                _ => {}
            },
            Ok(_) => {}
            Err(_) => return Ok(MenuResult::Quit),
        }
    }
}

// ── Game loop ─────────────────────────────────────────────────────────────────

enum Outcome {
    Quit,
    Menu,
    Restart,
}

/// Drive one engine until the player quits, restarts or returns to the menu.
///
/// Input model: a `key_frame` map records the frame of the last press/repeat
/// event per key. Each frame the set of fresh keys is diffed against the
/// previous one and the engine sees a clean `key_down` / `key_up` stream, so
/// jump and move can be held together. Terminals with keyboard enhancement
/// (kitty protocol) send `Release` and keys drop out immediately.
fn game_loop<W: Write>(
    out: &mut W,
    rx: &mpsc::Receiver<Event>,
    engine: &mut Engine,
    events: &mpsc::Receiver<EngineEvent>,
    canvas: &mut Canvas,
    release_events: bool,
) -> std::io::Result<Outcome> {
    let mut rng = thread_rng();

    let mut key_frame: HashMap<Key, u64> = HashMap::new();
    let mut held: HashSet<Key> = HashSet::new();
    let mut frame: u64 = 0;

    let mut phase = engine.phase();
    let mut stats = engine.stats();
    let mut last_poll = Instant::now();

    engine.start();

    loop {
        let frame_start = Instant::now();
        frame += 1;

        // ── Drain all pending input events (non-blocking) ─────────────────────
        while let Ok(ev) = rx.try_recv() {
            match ev {
                Event::Key(KeyEvent { code, kind, modifiers, .. }) => match kind {
                    KeyEventKind::Press => {
                        match code {
                            KeyCode::Char('q') | KeyCode::Char('Q') => return Ok(Outcome::Quit),
                            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                                return Ok(Outcome::Quit);
                            }
                            KeyCode::Char('r') | KeyCode::Char('R') if phase.is_terminal() => {
                                return Ok(Outcome::Restart);
                            }
                            KeyCode::Char('m') | KeyCode::Char('M') if phase.is_terminal() => {
                                return Ok(Outcome::Menu);
                            }
                            _ => {}
                        }
                        if let Some(key) = map_key(code) {
                            key_frame.insert(key, frame);
                        }
                    }
                    KeyEventKind::Repeat => {
                        if let Some(key) = map_key(code) {
                            key_frame.insert(key, frame);
                        }
                    }
                    KeyEventKind::Release => {
                        if let Some(key) = map_key(code) {
                            key_frame.remove(&key);
                        }
                    }
                },
                Event::Resize(cols, rows) => {
                    let (cols, rows) = canvas_size(cols, rows);
                    canvas.resize(cols, rows);
                    engine.resize(canvas);
                    out.queue(terminal::Clear(terminal::ClearType::All))?;
                }
                _ => {}
            }
        }

        // ── Turn fresh keys into down/up edges ────────────────────────────────
        key_frame.retain(|key, last| is_fresh(*key, *last, frame, release_events));
        let now_held: HashSet<Key> = key_frame.keys().copied().collect();
        for key in now_held.difference(&held) {
            engine.key_down(*key);
        }
        for key in held.difference(&now_held) {
            engine.key_up(*key);
        }
        held = now_held;

        let now = Instant::now();
        engine.run_timers(now);
        if engine.phase() == GamePhase::Playing {
            engine.frame(now, &mut rng);
        }

        while let Ok(event) = events.try_recv() {
            match event {
                EngineEvent::Phase(next) => phase = next,
                EngineEvent::Stats(next) => stats = next,
            }
        }
        if last_poll.elapsed() >= STATS_POLL {
            stats = engine.stats();
            last_poll = now;
        }

        if canvas.is_drawable() {
            engine.render(canvas, now);
            let hud = HudView {
                stats,
                level_name: &engine.level().name,
                difficulty: engine.config().difficulty,
                power_up: engine.power_up(),
                phase,
            };
            display::render(out, canvas, &hud)?;
        }

        let elapsed = frame_start.elapsed();
        if elapsed < FRAME {
            thread::sleep(FRAME - elapsed);
        }
    }
}

/// Build a fresh engine for the current settings and play it.
fn play<W: Write>(
    out: &mut W,
    rx: &mpsc::Receiver<Event>,
    settings: &Settings,
    custom_level: Option<&Level>,
    storage: &SharedStore,
    release_events: bool,
) -> anyhow::Result<Outcome> {
    let (cols, rows) = terminal::size()?;
    let (cols, rows) = canvas_size(cols, rows);
    let mut canvas = Canvas::new(cols, rows);

    let level = match custom_level {
        Some(level) => level.clone(),
        None => level_by_id(settings.level_id),
    };
    let (tx, events) = mpsc::channel();
    let hooks = Hooks {
        events: tx,
        storage: storage.clone(),
        audio: Some(Box::new(BellCues)),
    };
    let mut engine = Engine::new(&canvas, level, settings.game.clone(), hooks)?;

    out.queue(terminal::Clear(terminal::ClearType::All))?;
    let outcome = game_loop(out, rx, &mut engine, &events, &mut canvas, release_events);
    engine.stop();
    Ok(outcome?)
}

fn run<W: Write>(
    out: &mut W,
    rx: &mpsc::Receiver<Event>,
    custom_level: Option<&Level>,
    release_events: bool,
) -> anyhow::Result<()> {
    let settings_file = settings_path();
    let mut settings = Settings::load_or_default(&settings_file);
    let storage = storage::shared(FileStore::open(default_store_path()));

    loop {
        match show_menu(out, rx, &mut settings, custom_level, &storage)? {
            MenuResult::Quit => break,
            MenuResult::Start => {
                if let Err(e) = settings.save(&settings_file) {
                    warn!(error = %e, "could not save settings");
                }
                loop {
                    match play(out, rx, &settings, custom_level, &storage, release_events)? {
                        Outcome::Quit => return Ok(()),
                        Outcome::Menu => break,
                        Outcome::Restart => continue,
                    }
                }
            }
        }
    }
    Ok(())
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> anyhow::Result<()> {
    init_logging()?;

    // An optional level file path replaces the built-in catalogue.
    let custom_level = match std::env::args_os().nth(1) {
        Some(arg) => {
            let path = Path::new(&arg);
            let level = load_level_file(path)
                .with_context(|| format!("loading level {}", path.display()))?;
            info!(path = %path.display(), name = %level.name, "custom level loaded");
            Some(level)
        }
        None => None,
    };

    let raw_out = stdout();
    let mut out = BufWriter::new(raw_out);

    terminal::enable_raw_mode()?;
    out.execute(terminal::EnterAlternateScreen)?;
    out.execute(cursor::Hide)?;

    // Request key-release (and key-repeat) events from the terminal.
    // Kitty-protocol terminals support this; others fall back gracefully.
    let keyboard_enhanced = out
        .execute(PushKeyboardEnhancementFlags(
            KeyboardEnhancementFlags::REPORT_EVENT_TYPES,
        ))
        .is_ok();

    // Dedicate a thread exclusively to blocking event reads, sending them
    // through a channel so the game loop never has to block on I/O.
    let (tx, rx) = mpsc::channel::<Event>();
    thread::spawn(move || {
        loop {
            match event::read() {
                Ok(ev) => {
                    if tx.send(ev).is_err() {
                        break; // receiver dropped → program exiting
                    }
                }
                Err(_) => break,
            }
        }
    });

    info!(keyboard_enhanced, "terminal ready");
    let result = run(&mut out, &rx, custom_level.as_ref(), keyboard_enhanced);

    // Always restore the terminal
    if keyboard_enhanced {
        let _ = out.execute(PopKeyboardEnhancementFlags);
    }
    let _ = out.execute(cursor::Show);
    let _ = out.execute(terminal::LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();

    if let Err(e) = &result {
        warn!(error = %e, "exiting with error");
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn held_jump_outlasts_key_repeat_delay() {
        // First OS repeat arrives ~500 ms (≈31 frames) after the press.
        assert!(is_fresh(Key::Space, 0, 31, false));
        assert!(is_fresh(Key::ArrowUp, 0, 31, false));
        assert!(!is_fresh(Key::ArrowRight, 0, 31, false));
    }

    #[test]
    fn release_events_keep_short_window() {
        assert!(!is_fresh(Key::Space, 0, 31, true));
        assert!(is_fresh(Key::Space, 0, HOLD_WINDOW, true));
    }

    #[test]
    fn both_jump_aliases_map() {
        assert_eq!(map_key(KeyCode::Char(' ')), Some(Key::Space));
        assert_eq!(map_key(KeyCode::Up), Some(Key::ArrowUp));
        assert_eq!(map_key(KeyCode::Char('w')), Some(Key::ArrowUp));
    }
}
