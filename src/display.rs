//! Rendering layer — all terminal I/O lives here.
//!
//! Each function receives a mutable writer and an immutable view of the
//! game. No game logic is performed; this module only translates state into
//! terminal commands. The pixel field is drawn at `CELL_W` × `CELL_H` pixels
//! per terminal cell inside the border.

use std::io::Write;

use bug_blaster::entities::{Field, PowerUpKind};
use bug_blaster::events::Message;
use bug_blaster::leaderboard::Leaderboard;
use bug_blaster::powerups::TimedEffect;
use bug_blaster::store::Store;
use bug_blaster::Game;
use crossterm::{
    cursor,
    style::{self, Color, Print},
    terminal, QueueableCommand,
};

pub const CELL_W: f64 = 8.0;
pub const CELL_H: f64 = 16.0;

/// First terminal row of the play area (row 0 is the HUD, row 1 the border).
const TOP: u16 = 2;
const LEFT: u16 = 1;

// ── Colour palette ────────────────────────────────────────────────────────────

const C_BORDER: Color = Color::DarkBlue;
const C_FLASH: Color = Color::White;
const C_HUD_SCORE: Color = Color::Yellow;
const C_HUD_TIME: Color = Color::Cyan;
const C_BLASTER: Color = Color::White;
const C_SHOT: Color = Color::Cyan;
const C_RING: Color = Color::Yellow;
const C_HINT: Color = Color::DarkGrey;
const C_BUGS: [Color; 4] = [Color::Green, Color::Red, Color::Magenta, Color::Yellow];
const BUG_SPRITES: [&str; 4] = ["(ö)", "{¤}", "<©>", "[ж]"];
const SHOT_SPRITES: [&str; 3] = ["║", "|", "¦"];

// ── Geometry ──────────────────────────────────────────────────────────────────

/// Pixel field that fits inside a terminal of the given size.
pub fn field_for(width: u16, height: u16) -> Field {
    Field {
        width: f64::from(width.saturating_sub(2)) * CELL_W,
        height: f64::from(height.saturating_sub(4)) * CELL_H,
    }
}

/// Centre of a terminal cell in field pixels, `None` outside the play area.
pub fn cell_to_field(field: Field, col: u16, row: u16) -> Option<(f64, f64)> {
    if col < LEFT || row < TOP {
        return None;
    }
    let x = (f64::from(col - LEFT) + 0.5) * CELL_W;
    let y = (f64::from(row - TOP) + 0.5) * CELL_H;
    (x < field.width && y < field.height).then_some((x, y))
}

fn field_to_cell(field: Field, x: f64, y: f64) -> Option<(u16, u16)> {
    if x < 0.0 || y < 0.0 || x >= field.width || y >= field.height {
        return None;
    }
    Some((LEFT + (x / CELL_W) as u16, TOP + (y / CELL_H) as u16))
}

/// Column where a `len`-wide string centred on `x` starts, kept inside the border.
fn centred_col(field: Field, x: f64, len: usize) -> u16 {
    let cols = (field.width / CELL_W) as i32;
    let centre = (x / CELL_W) as i32;
    let start = (centre - len as i32 / 2).clamp(0, (cols - len as i32).max(0));
    LEFT + start as u16
}

// ── Public entry points ───────────────────────────────────────────────────────

/// Render one complete frame of a round in progress or just finished.
pub fn render<W: Write, S: Store>(
    out: &mut W,
    game: &Game<S>,
    width: u16,
    height: u16,
) -> std::io::Result<()> {
    out.queue(terminal::Clear(terminal::ClearType::All))?;

    draw_border(out, width, height, game.flash_active())?;
    draw_hud(out, game, width)?;

    let field = game.field();
    for bug in game.bugs() {
        let (cx, cy) = bug.rect.center();
        let index = usize::from(bug.variant.saturating_sub(1)) % BUG_SPRITES.len();
        let sprite = BUG_SPRITES[index];
        draw_text_at(out, field, cx, cy, sprite, C_BUGS[index])?;
    }
    for power_up in game.power_ups() {
        let (cx, cy) = power_up.rect.center();
        let label = format!("[{}]", power_up.kind.label());
        draw_text_at(out, field, cx, cy, &label, power_up_color(power_up.kind))?;
    }
    for shot in game.shots() {
        let index = usize::from(shot.variant.saturating_sub(1)) % SHOT_SPRITES.len();
        draw_text_at(out, field, shot.x, shot.y, SHOT_SPRITES[index], C_SHOT)?;
    }
    for ring in game.rings() {
        draw_text_at(out, field, ring.x, ring.y, "✱", C_RING)?;
    }

    draw_blaster(out, game)?;
    draw_controls_hint(out, height)?;

    if let Some(message) = game.message() {
        draw_message(out, message, game.records().leaderboard(), width, height)?;
    }

    // Park cursor in a harmless spot and flush
    out.queue(style::ResetColor)?;
    out.queue(cursor::MoveTo(0, height.saturating_sub(1)))?;
    out.flush()?;
    Ok(())
}

/// Render the name-entry screen shown between rounds.
pub fn render_menu<W: Write>(
    out: &mut W,
    name: &str,
    best: u32,
    leaderboard: &Leaderboard,
    notice: Option<&Message>,
    width: u16,
    height: u16,
) -> std::io::Result<()> {
    out.queue(terminal::Clear(terminal::ClearType::All))?;

    let cx = width / 2;
    let cy = height / 2;

    let title = "★  BUG  BLASTER  ★";
    centred_line(out, cx, cy.saturating_sub(8), title, Color::Cyan)?;

    if best > 0 {
        let hs_str = format!("Best Score: {}", best);
        centred_line(out, cx, cy.saturating_sub(7), &hs_str, Color::Yellow)?;
    }

    let mut row = cy.saturating_sub(5);
    centred_line(out, cx, row, "Top pilots", Color::White)?;
    row += 1;
    if leaderboard.is_empty() {
        centred_line(out, cx, row, "No scores yet — be the first pilot!", C_HINT)?;
        row += 1;
    } else {
        for (rank, entry) in leaderboard.top().iter().enumerate() {
            let line = format!("{}. {:<16} {:>6}", rank + 1, entry.name, entry.score);
            centred_line(out, cx, row, &line, Color::Green)?;
            row += 1;
        }
    }

    row += 1;
    let prompt = format!("Call sign: {}_", name);
    centred_line(out, cx, row, &prompt, Color::White)?;
    row += 1;
    centred_line(out, cx, row, "ENTER : Start Mission   ESC : Quit", C_HINT)?;

    if let Some(message) = notice {
        row += 2;
        centred_line(out, cx, row, &message.title, Color::Red)?;
        centred_line(out, cx, row + 1, &message.body, Color::White)?;
        centred_line(out, cx, row + 2, &message.footer, C_HINT)?;
    }

    out.queue(style::ResetColor)?;
    out.flush()?;
    Ok(())
}

// ── Border & HUD ──────────────────────────────────────────────────────────────

fn draw_border<W: Write>(out: &mut W, width: u16, height: u16, flash: bool) -> std::io::Result<()> {
    let w = width as usize;
    let h = height;

    out.queue(style::SetForegroundColor(if flash { C_FLASH } else { C_BORDER }))?;

    // Row 1 — top bar
    out.queue(cursor::MoveTo(0, 1))?;
    out.queue(Print(format!("┌{}┐", "─".repeat(w.saturating_sub(2)))))?;

    // Row h-2 — bottom bar
    out.queue(cursor::MoveTo(0, h.saturating_sub(2)))?;
    out.queue(Print(format!("└{}┘", "─".repeat(w.saturating_sub(2)))))?;

    // Side walls
    for row in TOP..h.saturating_sub(2) {
        out.queue(cursor::MoveTo(0, row))?;
        out.queue(Print("│"))?;
        out.queue(cursor::MoveTo(width.saturating_sub(1), row))?;
        out.queue(Print("│"))?;
    }

    Ok(())
}

fn draw_hud<W: Write, S: Store>(out: &mut W, game: &Game<S>, width: u16) -> std::io::Result<()> {
    // Score and best — left
    out.queue(cursor::MoveTo(1, 0))?;
    out.queue(style::SetForegroundColor(C_HUD_SCORE))?;
    out.queue(Print(format!(
        "Score:{:>6}  Best:{:>6}",
        game.score(),
        game.records().best_score()
    )))?;

    // Time — centre
    let time_str = format!("[ {:>2}s ]", game.time_left());
    let tx = (width / 2).saturating_sub(time_str.len() as u16 / 2);
    out.queue(cursor::MoveTo(tx, 0))?;
    out.queue(style::SetForegroundColor(C_HUD_TIME))?;
    out.queue(Print(&time_str))?;

    // Active effects + pilot — right side
    let mut tags = String::new();
    for (effect, label) in [(TimedEffect::Freeze, "FREEZE"), (TimedEffect::Double, "2x")] {
        if let Some(left) = game.effect_remaining(effect) {
            tags.push_str(&format!("[{} {}s] ", label, left.as_secs() + 1));
        }
    }
    let pilot = format!("Pilot:{}", game.session().player);
    let right_str = format!("{}{}", tags, pilot);
    let rx = width.saturating_sub(right_str.chars().count() as u16 + 1);
    out.queue(cursor::MoveTo(rx, 0))?;

    if !tags.is_empty() {
        out.queue(style::SetForegroundColor(Color::Yellow))?;
        out.queue(Print(&tags))?;
    }
    out.queue(style::SetForegroundColor(Color::White))?;
    out.queue(Print(&pilot))?;

    Ok(())
}

// ── Entities ──────────────────────────────────────────────────────────────────

fn power_up_color(kind: PowerUpKind) -> Color {
    match kind {
        PowerUpKind::Freeze => Color::Cyan,
        PowerUpKind::Double => Color::Yellow,
        PowerUpKind::Mega => Color::Magenta,
    }
}

fn draw_text_at<W: Write>(
    out: &mut W,
    field: Field,
    x: f64,
    y: f64,
    text: &str,
    color: Color,
) -> std::io::Result<()> {
    if field.width < CELL_W {
        return Ok(());
    }
    let Some((_, row)) = field_to_cell(field, x.clamp(0.0, field.width - 1.0), y) else {
        return Ok(());
    };
    let col = centred_col(field, x, text.chars().count());
    out.queue(cursor::MoveTo(col, row))?;
    out.queue(style::SetForegroundColor(color))?;
    out.queue(Print(text))?;
    Ok(())
}

fn draw_blaster<W: Write, S: Store>(out: &mut W, game: &Game<S>) -> std::io::Result<()> {
    // Sprite (2 rows):
    //     ▲         ← muzzle
    //  ▄▄███▄▄      ← hull, as wide as the blaster
    let field = game.field();
    let blaster = game.blaster();
    let cols = ((blaster.width / CELL_W) as usize).max(3);
    let hull_y = field.height - CELL_H / 2.0;
    let muzzle_y = hull_y - CELL_H;

    let core = (cols / 3).max(1);
    let side = (cols - core) / 2;
    let hull = format!("{}{}{}", "▄".repeat(side), "█".repeat(core), "▄".repeat(cols - core - side));

    draw_text_at(out, field, blaster.center(), muzzle_y, "▲", C_BLASTER)?;
    draw_text_at(out, field, blaster.center(), hull_y, &hull, C_BLASTER)?;
    Ok(())
}

// ── Controls hint (last row) ──────────────────────────────────────────────────

fn draw_controls_hint<W: Write>(out: &mut W, height: u16) -> std::io::Result<()> {
    out.queue(cursor::MoveTo(1, height.saturating_sub(1)))?;
    out.queue(style::SetForegroundColor(C_HINT))?;
    out.queue(Print(
        "← → / A D / drag : Move   SPACE : Shoot   click power-ups   Q : Quit",
    ))?;
    Ok(())
}

// ── Message overlay ───────────────────────────────────────────────────────────

fn draw_message<W: Write>(
    out: &mut W,
    message: &Message,
    leaderboard: &Leaderboard,
    width: u16,
    height: u16,
) -> std::io::Result<()> {
    let cx = width / 2;
    let board_rows = leaderboard.top().len().max(1) as u16;
    let total_rows = 5 + board_rows;
    let start_row = (height / 2).saturating_sub(total_rows / 2);

    let bar = format!("╔{}╗", "═".repeat(24));
    let title = format!("║{:^24}║", message.title);
    let bottom = format!("╚{}╝", "═".repeat(24));
    centred_line(out, cx, start_row, &bar, Color::Red)?;
    centred_line(out, cx, start_row + 1, &title, Color::Red)?;
    centred_line(out, cx, start_row + 2, &bottom, Color::Red)?;
    centred_line(out, cx, start_row + 3, &message.body, Color::Yellow)?;

    let mut row = start_row + 4;
    if leaderboard.is_empty() {
        centred_line(out, cx, row, "No scores yet — be the first pilot!", C_HINT)?;
        row += 1;
    }
    for (rank, entry) in leaderboard.top().iter().enumerate() {
        let line = format!("{}. {:<16} {:>6}", rank + 1, entry.name, entry.score);
        centred_line(out, cx, row, &line, Color::Green)?;
        row += 1;
    }
    centred_line(out, cx, row, &message.footer, Color::White)?;
    Ok(())
}

fn centred_line<W: Write>(
    out: &mut W,
    cx: u16,
    row: u16,
    text: &str,
    color: Color,
) -> std::io::Result<()> {
    let col = cx.saturating_sub(text.chars().count() as u16 / 2);
    out.queue(cursor::MoveTo(col, row))?;
    out.queue(style::SetForegroundColor(color))?;
    out.queue(Print(text))?;
    Ok(())
}
