/// Rendering layer — all terminal I/O lives here.
///
/// The game core draws through [`Canvas`]; [`TerminalCanvas`] rasterises
/// those calls onto a grid of character cells, one cell covering
/// `CELL_W × CELL_H` world units. HUD, title and game-over screens are
/// printed on top of the grid directly.

use std::io::Write;

use crossterm::{
    cursor,
    style::{self, Color, Print},
    terminal, QueueableCommand,
};
use neon_sentinel::config::Arena;
use neon_sentinel::draw::{draw_frame, Canvas};
use neon_sentinel::entities::{Point, Rgb};
use neon_sentinel::{Difficulty, GameSession, GameStatus};

/// World units per terminal column.
pub const CELL_W: f32 = 8.0;
/// World units per terminal row.
pub const CELL_H: f32 = 16.0;
/// Row 0 is the HUD, the last row is the controls hint.
const PLAY_TOP: u16 = 1;
const RESERVED_ROWS: u16 = 2;

// ── Colour palette ────────────────────────────────────────────────────────────

const C_HUD_SCORE: Color = Color::Yellow;
const C_HUD_LIVES: Color = Color::Red;
const C_HINT: Color = Color::DarkGrey;
const C_TITLE: Color = Color::Cyan;

/// Arena matching a terminal of `cols × rows` cells.
pub fn arena_for(cols: u16, rows: u16) -> Arena {
    Arena {
        width: f32::from(cols) * CELL_W,
        height: f32::from(rows.saturating_sub(RESERVED_ROWS)) * CELL_H,
    }
}

/// World x of the centre of a terminal column.
pub fn column_to_world(column: u16) -> f32 {
    (f32::from(column) + 0.5) * CELL_W
}

fn difficulty_color(difficulty: Difficulty) -> Color {
    match difficulty {
        Difficulty::Easy => Color::Green,
        Difficulty::Normal => Color::Yellow,
        Difficulty::Hard => Color::Red,
    }
}

fn to_color(rgb: Rgb) -> Color {
    Color::Rgb {
        r: rgb.r,
        g: rgb.g,
        b: rgb.b,
    }
}

// ── Cell canvas ───────────────────────────────────────────────────────────────

#[derive(Clone, Copy, PartialEq)]
struct Cell {
    glyph: char,
    color: Color,
}

const EMPTY: Cell = Cell {
    glyph: ' ',
    color: Color::Reset,
};

pub struct TerminalCanvas {
    cols: u16,
    rows: u16,
    cells: Vec<Cell>,
    flash: f32,
}

impl TerminalCanvas {
    pub fn new(cols: u16, rows: u16) -> Self {
        let rows = rows.saturating_sub(RESERVED_ROWS);
        TerminalCanvas {
            cols,
            rows,
            cells: vec![EMPTY; usize::from(cols) * usize::from(rows)],
            flash: 0.0,
        }
    }

    pub fn clear(&mut self) {
        self.cells.fill(EMPTY);
        self.flash = 0.0;
    }

    fn cell_of(&self, p: Point) -> Option<usize> {
        let col = (p.x / CELL_W).floor();
        let row = (p.y / CELL_H).floor();
        if col < 0.0 || row < 0.0 || col >= f32::from(self.cols) || row >= f32::from(self.rows) {
            return None;
        }
        Some(row as usize * usize::from(self.cols) + col as usize)
    }

    fn plot(&mut self, p: Point, glyph: char, color: Rgb) {
        if let Some(i) = self.cell_of(p) {
            self.cells[i] = Cell {
                glyph,
                color: to_color(color),
            };
        }
    }

    /// Walk from `a` to `b` one cell at a time.
    fn stroke(&mut self, a: Point, b: Point, glyph: char, color: Rgb) {
        let dx = (b.x - a.x) / CELL_W;
        let dy = (b.y - a.y) / CELL_H;
        let steps = dx.abs().max(dy.abs()).ceil().max(1.0) as usize;
        for i in 0..=steps {
            let t = i as f32 / steps as f32;
            let p = Point::new(a.x + (b.x - a.x) * t, a.y + (b.y - a.y) * t);
            self.plot(p, glyph, color);
        }
    }

    fn background(&self) -> Color {
        if self.flash <= 0.0 {
            return Color::Reset;
        }
        let v = (self.flash * 255.0).round().clamp(0.0, 255.0) as u8;
        Color::Rgb { r: v, g: v, b: v }
    }

    pub fn flush<W: Write>(&self, out: &mut W) -> std::io::Result<()> {
        let background = self.background();
        out.queue(style::SetBackgroundColor(background))?;
        for row in 0..self.rows {
            out.queue(cursor::MoveTo(0, PLAY_TOP + row))?;
            let start = usize::from(row) * usize::from(self.cols);
            let mut current = None;
            for cell in &self.cells[start..start + usize::from(self.cols)] {
                if current != Some(cell.color) {
                    out.queue(style::SetForegroundColor(cell.color))?;
                    current = Some(cell.color);
                }
                out.queue(Print(cell.glyph))?;
            }
        }
        out.queue(style::SetBackgroundColor(Color::Reset))?;
        Ok(())
    }
}

impl Canvas for TerminalCanvas {
    fn line(&mut self, from: Point, to: Point, color: Rgb) {
        self.stroke(from, to, '·', color);
    }

    fn polygon(&mut self, points: &[Point], color: Rgb) {
        for (i, &a) in points.iter().enumerate() {
            let b = points[(i + 1) % points.len()];
            self.stroke(a, b, '*', color);
        }
    }

    fn ellipse(&mut self, center: Point, rx: f32, ry: f32, color: Rgb, filled: bool) {
        if rx < CELL_W && ry < CELL_H {
            let glyph = match (filled, ry >= rx * 2.0) {
                (true, true) => '│',
                (true, false) if rx < 1.5 => '·',
                (true, false) => '•',
                (false, _) => 'o',
            };
            self.plot(center, glyph, color);
            return;
        }
        // Ring of points, dense enough to close at cell resolution.
        let steps = ((rx / CELL_W + ry / CELL_H) * 4.0).ceil().max(8.0) as usize;
        for i in 0..steps {
            let a = i as f32 / steps as f32 * std::f32::consts::TAU;
            let p = Point::new(center.x + a.cos() * rx, center.y + a.sin() * ry);
            self.plot(p, if filled { '●' } else { 'o' }, color);
        }
    }

    fn flash(&mut self, alpha: f32) {
        self.flash = alpha;
    }
}

// ── Public entry point ────────────────────────────────────────────────────────

/// Render one complete frame.
pub fn render<W: Write>(
    out: &mut W,
    canvas: &mut TerminalCanvas,
    session: &GameSession,
    shake: Point,
    sound_on: bool,
) -> std::io::Result<()> {
    let (width, height) = terminal::size()?;
    out.queue(terminal::BeginSynchronizedUpdate)?;
    out.queue(terminal::Clear(terminal::ClearType::All))?;

    canvas.clear();
    draw_frame(session, canvas, shake);
    canvas.flush(out)?;

    draw_hud(out, session, width)?;
    draw_controls_hint(out, height, sound_on)?;

    match session.status {
        GameStatus::Title => draw_title(out, session, width, height)?,
        GameStatus::GameOver => draw_game_over(out, session, width, height)?,
        GameStatus::Playing => {}
    }

    // Park cursor in a harmless spot and flush
    out.queue(style::ResetColor)?;
    out.queue(cursor::MoveTo(0, height.saturating_sub(1)))?;
    out.queue(terminal::EndSynchronizedUpdate)?;
    out.flush()?;
    Ok(())
}

// ── HUD (row 0) ───────────────────────────────────────────────────────────────

fn draw_hud<W: Write>(out: &mut W, session: &GameSession, width: u16) -> std::io::Result<()> {
    // Score and best score — left
    out.queue(cursor::MoveTo(1, 0))?;
    out.queue(style::SetForegroundColor(C_HUD_SCORE))?;
    if session.best_score > 0 {
        out.queue(Print(format!(
            "Score:{:>6}  Hi:{:>6}",
            session.score, session.best_score
        )))?;
    } else {
        out.queue(Print(format!("Score:{:>6}", session.score)))?;
    }

    // Difficulty — centre
    let difficulty = session.config.difficulty;
    let label = format!("[ {} ]", difficulty.key().to_uppercase());
    let lx = (width / 2).saturating_sub(label.len() as u16 / 2);
    out.queue(cursor::MoveTo(lx, 0))?;
    out.queue(style::SetForegroundColor(difficulty_color(difficulty)))?;
    out.queue(Print(&label))?;

    // Lives — right
    let lives_str = format!("Lives:{}", "♥".repeat(session.lives as usize));
    let rx = width.saturating_sub(lives_str.chars().count() as u16 + 1);
    out.queue(cursor::MoveTo(rx, 0))?;
    out.queue(style::SetForegroundColor(C_HUD_LIVES))?;
    out.queue(Print(&lives_str))?;

    Ok(())
}

// ── Controls hint (last row) ──────────────────────────────────────────────────

fn draw_controls_hint<W: Write>(out: &mut W, height: u16, sound_on: bool) -> std::io::Result<()> {
    out.queue(cursor::MoveTo(1, height.saturating_sub(1)))?;
    out.queue(style::SetForegroundColor(C_HINT))?;
    out.queue(Print(format!(
        "← → / A D : Move   SPACE / mouse : Shoot   M : Sound {}   Q : Quit",
        if sound_on { "ON " } else { "OFF" }
    )))?;
    Ok(())
}

/// Print `lines` centred around the middle of the screen.
fn draw_centered<W: Write>(
    out: &mut W,
    lines: &[(String, Color)],
    width: u16,
    height: u16,
) -> std::io::Result<()> {
    let cx = width / 2;
    let start_row = (height / 2).saturating_sub(lines.len() as u16 / 2);
    for (i, (msg, color)) in lines.iter().enumerate() {
        let col = cx.saturating_sub(msg.chars().count() as u16 / 2);
        out.queue(cursor::MoveTo(col, start_row + i as u16))?;
        out.queue(style::SetForegroundColor(*color))?;
        out.queue(Print(msg))?;
    }
    Ok(())
}

// ── Title screen ──────────────────────────────────────────────────────────────

fn draw_title<W: Write>(
    out: &mut W,
    session: &GameSession,
    width: u16,
    height: u16,
) -> std::io::Result<()> {
    let mut lines = vec![
        ("★  NEON  SENTINEL  ★".to_string(), C_TITLE),
        (String::new(), C_HINT),
        ("Select difficulty:".to_string(), Color::White),
    ];
    for (i, difficulty) in Difficulty::ALL.iter().enumerate() {
        let params = difficulty.params();
        let marker = if *difficulty == session.config.difficulty { '▶' } else { ' ' };
        lines.push((
            format!(
                "{} [{}] {:<6} lives {}  score x{:.1}",
                marker,
                i + 1,
                difficulty.key(),
                params.starting_lives,
                params.score_mult
            ),
            difficulty_color(*difficulty),
        ));
    }
    lines.push((String::new(), C_HINT));
    lines.push(("ENTER / SPACE : Start".to_string(), Color::White));
    draw_centered(out, &lines, width, height)
}

// ── Game-over overlay ─────────────────────────────────────────────────────────

fn draw_game_over<W: Write>(
    out: &mut W,
    session: &GameSession,
    width: u16,
    height: u16,
) -> std::io::Result<()> {
    let new_best = session.score >= session.best_score && session.score > 0;
    let best_line = if new_best {
        format!("★ NEW BEST: {:>6} ★", session.best_score)
    } else {
        format!("Best Score:  {:>6}", session.best_score)
    };

    let lines = vec![
        ("╔════════════════════╗".to_string(), Color::Red),
        ("║    GAME  OVER      ║".to_string(), Color::Red),
        ("╚════════════════════╝".to_string(), Color::Red),
        (format!("Final Score: {:>6}", session.score), Color::Yellow),
        (best_line, if new_best { Color::Yellow } else { Color::DarkGrey }),
        ("R - Play Again  1/2/3 - Difficulty  Q - Quit".to_string(), Color::White),
    ];
    draw_centered(out, &lines, width, height)
}
