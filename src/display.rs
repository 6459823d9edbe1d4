/// Rendering layer — all terminal I/O lives here.
///
/// `TerminalSurface` maps canvas pixels onto the terminal grid so the
/// library's render step can draw without knowing about cells.  No game
/// logic is performed; this module only translates drawing calls into
/// terminal commands.

use std::io::Write;

use crossterm::{
    cursor,
    style::{self, Color, Print},
    terminal,
    QueueableCommand,
};

use survival_shooter::entities::{Aabb, Canvas};
use survival_shooter::render::Surface;

const C_HINT: Color = Color::DarkGrey;
const C_TITLE: Color = Color::Cyan;

const BLOCK: &str = "█";
const RING: &str = "·";

/// Samples taken around a shield ring.
const RING_STEPS: usize = 48;

/// Pixel coordinate to cell index, clamped to `[-1, cells]` so anything off
/// the grid stays just outside it.
fn to_cell(v: f32, extent: f32, cells: u16) -> i32 {
    let cell = (v / extent * cells as f32).floor();
    if cell.is_nan() {
        return -1;
    }
    cell.clamp(-1.0, cells as f32) as i32
}

pub struct TerminalSurface<'a, W: Write> {
    out: &'a mut W,
    canvas: Canvas,
    cols: u16,
    /// Rows given to the playfield; the last terminal row holds the hint.
    rows: u16,
}

impl<'a, W: Write> TerminalSurface<'a, W> {
    pub fn new(out: &'a mut W, canvas: Canvas, (cols, rows): (u16, u16)) -> Self {
        TerminalSurface {
            out,
            canvas,
            cols: cols.max(1),
            rows: rows.saturating_sub(1).max(1),
        }
    }

    fn col(&self, x: f32) -> i32 {
        to_cell(x, self.canvas.width, self.cols)
    }

    fn row(&self, y: f32) -> i32 {
        to_cell(y, self.canvas.height, self.rows)
    }

    fn in_bounds(&self, col: i32, row: i32) -> bool {
        col >= 0 && row >= 0 && col < self.cols as i32 && row < self.rows as i32
    }

    /// Print `text` starting at a cell, clipped to the playfield width.
    fn put(&mut self, col: i32, row: i32, text: &str, color: Color) -> std::io::Result<()> {
        if row < 0 || row >= self.rows as i32 || col >= self.cols as i32 {
            return Ok(());
        }
        let skip = (-col).max(0) as usize;
        let room = (self.cols as i32 - col.max(0)) as usize;
        let visible: String = text.chars().skip(skip).take(room).collect();
        if visible.is_empty() {
            return Ok(());
        }
        self.out.queue(cursor::MoveTo(col.max(0) as u16, row as u16))?;
        self.out.queue(style::SetForegroundColor(color))?;
        self.out.queue(Print(visible))?;
        Ok(())
    }

    /// Controls hint on the last row, then park the cursor and flush.
    pub fn present(&mut self, hint: &str) -> std::io::Result<()> {
        self.out.queue(cursor::MoveTo(1, self.rows))?;
        self.out.queue(style::SetForegroundColor(C_HINT))?;
        self.out.queue(Print(hint))?;
        self.out.queue(style::ResetColor)?;
        self.out.queue(cursor::MoveTo(0, self.rows))?;
        self.out.flush()
    }
}

impl<W: Write> Surface for TerminalSurface<'_, W> {
    fn clear(&mut self) -> std::io::Result<()> {
        self.out.queue(terminal::Clear(terminal::ClearType::All))?;
        Ok(())
    }

    fn fill_rect(&mut self, rect: Aabb, color: Color) -> std::io::Result<()> {
        // Every visible rect covers at least one cell, however small.
        let left = self.col(rect.x);
        let top = self.row(rect.y);
        let right = self.col(rect.x + rect.width).max(left.saturating_add(1));
        let bottom = self.row(rect.y + rect.height).max(top.saturating_add(1));

        let width = right.saturating_sub(left).max(0) as usize;
        let line = BLOCK.repeat(width);
        for row in top..bottom {
            self.put(left, row, &line, color)?;
        }
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
        let mut last = None;
        for step in 0..RING_STEPS {
            let angle = step as f32 / RING_STEPS as f32 * std::f32::consts::TAU;
            let cell = (self.col(cx + radius * angle.cos()), self.row(cy + radius * angle.sin()));
            if last == Some(cell) || !self.in_bounds(cell.0, cell.1) {
                continue;
            }
            last = Some(cell);
            self.put(cell.0, cell.1, RING, color)?;
        }
        Ok(())
    }

    fn fill_text(&mut self, text: &str, x: f32, y: f32, color: Color) -> std::io::Result<()> {
        // `y` is a baseline; the glyphs sit on the row just above it.
        let row = (self.row(y) - 1).max(0);
        let col = self.col(x);
        self.put(col, row, text, color)
    }

    fn fill_text_centered(
        &mut self,
        text: &str,
        cx: f32,
        y: f32,
        color: Color,
    ) -> std::io::Result<()> {
        let row = self.row(y);
        let col = self.col(cx) - text.chars().count() as i32 / 2;
        self.put(col, row, text, color)
    }
}

// ── Title screen ──────────────────────────────────────────────────────────────

pub fn render_title<W: Write>(
    out: &mut W,
    (width, height): (u16, u16),
    player_name: &str,
) -> std::io::Result<()> {
    out.queue(terminal::Clear(terminal::ClearType::All))?;

    let cx = width / 2;
    let cy = height / 2;
    let greeting = format!("Ready, {}?", player_name);
    let lines: &[(&str, Color)] = &[
        ("★  SURVIVAL  MODE  ★", C_TITLE),
        ("", C_HINT),
        (&greeting, Color::White),
        ("", C_HINT),
        ("W A S D : Move    SPACE : Shoot", C_HINT),
        ("Q : Shield (hold)    E : Dash    P : Pause", C_HINT),
        ("+ / - : Volume", C_HINT),
        ("", C_HINT),
        ("ENTER - Start    ESC - Quit", Color::Yellow),
    ];

    let start_row = cy.saturating_sub(lines.len() as u16 / 2);
    for (i, (msg, color)) in lines.iter().enumerate() {
        let col = cx.saturating_sub(msg.chars().count() as u16 / 2);
        out.queue(cursor::MoveTo(col, start_row + i as u16))?;
        out.queue(style::SetForegroundColor(*color))?;
        out.queue(Print(*msg))?;
    }

    out.queue(style::ResetColor)?;
    out.flush()?;
    Ok(())
}
