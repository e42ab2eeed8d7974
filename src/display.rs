//! Terminal presentation: everything that writes escape sequences lives here.
//!
//! The engine paints into a `Canvas`; this module copies that canvas to the
//! screen between a HUD row and a controls row, and draws the menu and the
//! pause / end-of-session overlays. No game logic runs here.

use std::io::Write;

use crossterm::{
    cursor,
    style::{self, Color, Print},
    terminal,
    QueueableCommand,
};
use haunted_run::config::{Difficulty, Settings};
use haunted_run::entities::{GamePhase, GameStats, PowerUpKind, Rgb};
use haunted_run::renderer::{power_up_color, power_up_icon};
use haunted_run::surface::Canvas;

// ── Colour palette ────────────────────────────────────────────────────────────

const C_HUD_BG: Color = Color::Rgb { r: 0x10, g: 0x00, b: 0x20 };
const C_HUD_SCORE: Color = Color::Yellow;
const C_HUD_LIVES: Color = Color::Red;
const C_HUD_COINS: Color = Color::Rgb { r: 0xff, g: 0xcc, b: 0x00 };
const C_HUD_TIME: Color = Color::White;
const C_TITLE: Color = Color::Rgb { r: 0xff, g: 0x8c, b: 0x00 };
const C_HINT: Color = Color::DarkGrey;

/// Rows taken by the HUD (top) and the controls hint (bottom).
pub const CHROME_ROWS: u16 = 2;

/// Canvas size that fits a terminal of `cols × rows`.
pub fn canvas_size(cols: u16, rows: u16) -> (u16, u16) {
    (cols, rows.saturating_sub(CHROME_ROWS))
}

fn color(rgb: Rgb) -> Color {
    Color::Rgb { r: rgb.r, g: rgb.g, b: rgb.b }
}

/// What the HUD row shows.
pub struct HudView<'a> {
    pub stats: GameStats,
    pub level_name: &'a str,
    pub difficulty: Difficulty,
    pub power_up: Option<(PowerUpKind, u32)>,
    pub phase: GamePhase,
}

// ── Public entry point ────────────────────────────────────────────────────────

/// Render one complete frame.
pub fn render<W: Write>(out: &mut W, canvas: &Canvas, hud: &HudView) -> std::io::Result<()> {
    draw_canvas(out, canvas)?;
    draw_hud(out, canvas.cols(), hud)?;
    draw_controls_hint(out, canvas.rows() + 1)?;

    match hud.phase {
        GamePhase::Paused => draw_paused(out, canvas)?,
        GamePhase::GameOver | GamePhase::LevelComplete => draw_session_end(out, canvas, hud)?,
        _ => {}
    }

    out.queue(style::ResetColor)?;
    out.queue(cursor::MoveTo(0, canvas.rows() + 1))?;
    out.flush()?;
    Ok(())
}

// ── Canvas ────────────────────────────────────────────────────────────────────

/// Copy the canvas below the HUD row, only switching colours when they change.
fn draw_canvas<W: Write>(out: &mut W, canvas: &Canvas) -> std::io::Result<()> {
    let mut fg: Option<Rgb> = None;
    let mut bg: Option<Rgb> = None;

    for row in 0..canvas.rows() {
        out.queue(cursor::MoveTo(0, row + 1))?;
        for cell in canvas.row(row) {
            if bg != Some(cell.bg) {
                out.queue(style::SetBackgroundColor(color(cell.bg)))?;
                bg = Some(cell.bg);
            }
            if cell.glyph != ' ' && fg != Some(cell.fg) {
                out.queue(style::SetForegroundColor(color(cell.fg)))?;
                fg = Some(cell.fg);
            }
            out.queue(Print(cell.glyph))?;
        }
    }
    out.queue(style::ResetColor)?;
    Ok(())
}

// ── HUD (row 0) ───────────────────────────────────────────────────────────────

fn draw_hud<W: Write>(out: &mut W, width: u16, hud: &HudView) -> std::io::Result<()> {
    let stats = &hud.stats;

    out.queue(cursor::MoveTo(0, 0))?;
    out.queue(style::SetBackgroundColor(C_HUD_BG))?;
    out.queue(terminal::Clear(terminal::ClearType::CurrentLine))?;

    // Score and high score, left
    out.queue(cursor::MoveTo(1, 0))?;
    out.queue(style::SetForegroundColor(C_HUD_SCORE))?;
    if stats.high_score > 0 {
        out.queue(Print(format!("Score:{:>6}  Hi:{:>6}", stats.score, stats.high_score)))?;
    } else {
        out.queue(Print(format!("Score:{:>6}", stats.score)))?;
    }

    // Level and time, centre
    let level_str = format!("[ {} {} ]  {}:{:02}", hud.level_name, hud.difficulty.label(), stats.time / 60, stats.time % 60);
    let lx = (width / 2).saturating_sub(level_str.chars().count() as u16 / 2);
    out.queue(cursor::MoveTo(lx, 0))?;
    out.queue(style::SetForegroundColor(C_HUD_TIME))?;
    out.queue(Print(&level_str))?;

    // Power-up, coins and lives, right
    let power_tag = match hud.power_up {
        Some((kind, frames)) => format!("[{} {} {:>2}s] ", power_up_icon(kind), kind.label(), frames / 60 + 1),
        None => String::new(),
    };
    let coins_str = format!("● {}  ", stats.coins);
    let lives_str = format!("Lives:{}", "♥".repeat(stats.lives as usize));
    let right_len = power_tag.chars().count() + coins_str.chars().count() + lives_str.chars().count();

    out.queue(cursor::MoveTo(width.saturating_sub(right_len as u16 + 1), 0))?;
    if let Some((kind, _)) = hud.power_up {
        out.queue(style::SetForegroundColor(color(power_up_color(kind))))?;
        out.queue(Print(&power_tag))?;
    }
    out.queue(style::SetForegroundColor(C_HUD_COINS))?;
    out.queue(Print(&coins_str))?;
    out.queue(style::SetForegroundColor(C_HUD_LIVES))?;
    out.queue(Print(&lives_str))?;

    out.queue(style::ResetColor)?;
    Ok(())
}

// ── Controls hint (last row) ──────────────────────────────────────────────────

fn draw_controls_hint<W: Write>(out: &mut W, row: u16) -> std::io::Result<()> {
    out.queue(cursor::MoveTo(1, row))?;
    out.queue(terminal::Clear(terminal::ClearType::CurrentLine))?;
    out.queue(style::SetForegroundColor(C_HINT))?;
    out.queue(Print("← → / A D : Move   SPACE / ↑ : Jump   X : Fireball   ESC : Pause   Q : Quit"))?;
    Ok(())
}

// ── Overlays ──────────────────────────────────────────────────────────────────

/// Centre the lines over the canvas area.
fn draw_box<W: Write>(out: &mut W, canvas: &Canvas, lines: &[(String, Color)]) -> std::io::Result<()> {
    let cx = canvas.cols() / 2;
    let start_row = (canvas.rows() / 2 + 1).saturating_sub(lines.len() as u16 / 2);

    out.queue(style::SetBackgroundColor(Color::Black))?;
    for (i, (msg, fg)) in lines.iter().enumerate() {
        let col = cx.saturating_sub(msg.chars().count() as u16 / 2);
        out.queue(cursor::MoveTo(col, start_row + i as u16))?;
        out.queue(style::SetForegroundColor(*fg))?;
        out.queue(Print(msg))?;
    }
    out.queue(style::ResetColor)?;
    Ok(())
}

fn draw_paused<W: Write>(out: &mut W, canvas: &Canvas) -> std::io::Result<()> {
    let lines = [
        ("╔════════════════════╗".to_string(), Color::Cyan),
        ("║       PAUSED       ║".to_string(), Color::Cyan),
        ("╚════════════════════╝".to_string(), Color::Cyan),
        ("ESC - Resume  Q - Quit".to_string(), Color::White),
    ];
    draw_box(out, canvas, &lines)
}

fn draw_session_end<W: Write>(out: &mut W, canvas: &Canvas, hud: &HudView) -> std::io::Result<()> {
    let stats = &hud.stats;
    let won = hud.phase == GamePhase::LevelComplete;
    let (title, title_color) = if won {
        ("║  LEVEL  COMPLETE!  ║", Color::Green)
    } else {
        ("║    GAME  OVER      ║", Color::Red)
    };

    let new_best = stats.score >= stats.high_score && stats.score > 0;
    let best_line = if new_best {
        format!("★ NEW BEST: {:>6} ★", stats.high_score)
    } else {
        format!("Best Score:  {:>6}", stats.high_score)
    };

    let lines = [
        ("╔════════════════════╗".to_string(), title_color),
        (title.to_string(), title_color),
        ("╚════════════════════╝".to_string(), title_color),
        (format!("Final Score: {:>6}", stats.score), Color::Yellow),
        (format!("Coins: {}   Time: {}s", stats.coins, stats.time), Color::White),
        (best_line, if new_best { Color::Yellow } else { Color::DarkGrey }),
        ("R - Play Again  M - Menu  Q - Quit".to_string(), Color::White),
    ];
    draw_box(out, canvas, &lines)
}

// ── Menu ──────────────────────────────────────────────────────────────────────

pub fn draw_menu<W: Write>(
    out: &mut W,
    settings: &Settings,
    level_name: &str,
    high_score: u32,
) -> std::io::Result<()> {
    out.queue(style::ResetColor)?;
    out.queue(terminal::Clear(terminal::ClearType::All))?;

    let (width, height) = terminal::size()?;
    let cx = width / 2;
    let cy = height / 2;

    let title = "🎃  HAUNTED  RUN  🎃";
    out.queue(cursor::MoveTo(cx.saturating_sub(title.chars().count() as u16 / 2), cy.saturating_sub(7)))?;
    out.queue(style::SetForegroundColor(C_TITLE))?;
    out.queue(Print(title))?;

    if high_score > 0 {
        let hs_str = format!("Best Score: {}", high_score);
        out.queue(cursor::MoveTo(cx.saturating_sub(hs_str.chars().count() as u16 / 2), cy.saturating_sub(6)))?;
        out.queue(style::SetForegroundColor(Color::Yellow))?;
        out.queue(Print(&hs_str))?;
    }

    out.queue(cursor::MoveTo(cx.saturating_sub(14), cy.saturating_sub(4)))?;
    out.queue(style::SetForegroundColor(Color::White))?;
    out.queue(Print("Difficulty:"))?;

    let options: &[(&str, Difficulty, Color, &str)] = &[
        ("1", Difficulty::Easy, Color::Green, "5 lives, slow and sparse enemies"),
        ("2", Difficulty::Normal, Color::Yellow, "3 lives, ×1.5 score"),
        ("3", Difficulty::Hard, Color::Red, "1 life, fast crowds, ×2 score"),
    ];
    for (i, (key, difficulty, fg, desc)) in options.iter().enumerate() {
        let row = cy.saturating_sub(3) + i as u16;
        let marker = if settings.game.difficulty == *difficulty { "▶" } else { " " };
        out.queue(cursor::MoveTo(cx.saturating_sub(14), row))?;
        out.queue(style::SetForegroundColor(Color::White))?;
        out.queue(Print(marker))?;
        out.queue(style::SetForegroundColor(C_HINT))?;
        out.queue(Print(format!("[{}] ", key)))?;
        out.queue(style::SetForegroundColor(*fg))?;
        out.queue(Print(format!("{:<8}", difficulty.label())))?;
        out.queue(style::SetForegroundColor(C_HINT))?;
        out.queue(Print(format!(" {}", desc)))?;
    }

    let extras = [
        format!("[L] Level: {} {}", settings.level_id, level_name),
        format!("[S] Sound: {}", if settings.game.sound_enabled { "on" } else { "off" }),
    ];
    for (i, line) in extras.iter().enumerate() {
        out.queue(cursor::MoveTo(cx.saturating_sub(14), cy + 1 + i as u16))?;
        out.queue(style::SetForegroundColor(Color::White))?;
        out.queue(Print(line))?;
    }

    // Power-up legend
    out.queue(cursor::MoveTo(cx.saturating_sub(14), cy + 4))?;
    out.queue(style::SetForegroundColor(C_HINT))?;
    out.queue(Print("Power-ups (10 seconds each):"))?;
    for (i, kind) in PowerUpKind::ALL.iter().enumerate() {
        out.queue(cursor::MoveTo(cx.saturating_sub(14), cy + 5 + i as u16))?;
        out.queue(style::SetForegroundColor(color(power_up_color(*kind))))?;
        out.queue(Print(power_up_icon(*kind)))?;
        out.queue(style::SetForegroundColor(C_HINT))?;
        out.queue(Print(format!(" {}", kind.label())))?;
    }

    out.queue(cursor::MoveTo(cx.saturating_sub(14), cy + 10))?;
    out.queue(style::SetForegroundColor(Color::White))?;
    out.queue(Print("ENTER : Start   Q : Quit"))?;

    out.queue(style::ResetColor)?;
    out.flush()?;
    Ok(())
}
