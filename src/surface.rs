//! Raster surface: a grid of terminal cells addressed in world pixels.
//!
//! Horizontally a cell always spans `CELL_WIDTH` pixels, so a wider terminal
//! shows more of the level. Vertically the whole `VIEW_HEIGHT` is fitted to
//! however many rows are available.

use crate::entities::Rgb;
use crate::geometry::{Rect, Vec2};

pub const CELL_WIDTH: f32 = 8.0;
pub const VIEW_HEIGHT: f32 = 600.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Cell {
    pub glyph: char,
    pub fg: Rgb,
    pub bg: Rgb,
}

impl Cell {
    pub const BLANK: Cell = Cell { glyph: ' ', fg: Rgb::WHITE, bg: Rgb::BLACK };
}

#[derive(Clone, Debug)]
pub struct Canvas {
    cols: u16,
    rows: u16,
    cells: Vec<Cell>,
}

impl Canvas {
    pub fn new(cols: u16, rows: u16) -> Self {
        Canvas {
            cols,
            rows,
            cells: vec![Cell::BLANK; cols as usize * rows as usize],
        }
    }

    pub fn resize(&mut self, cols: u16, rows: u16) {
        if self.cols != cols || self.rows != rows {
            *self = Canvas::new(cols, rows);
        }
    }

    pub fn cols(&self) -> u16 {
        self.cols
    }

    pub fn rows(&self) -> u16 {
        self.rows
    }

    pub fn is_drawable(&self) -> bool {
        self.cols > 0 && self.rows > 0
    }

    /// Width in world pixels.
    pub fn width(&self) -> f32 {
        self.cols as f32 * CELL_WIDTH
    }

    /// Height in world pixels.
    pub fn height(&self) -> f32 {
        VIEW_HEIGHT
    }

    pub fn cell_height(&self) -> f32 {
        if self.rows == 0 {
            VIEW_HEIGHT
        } else {
            VIEW_HEIGHT / self.rows as f32
        }
    }

    pub fn cell(&self, col: u16, row: u16) -> Option<&Cell> {
        if col >= self.cols || row >= self.rows {
            return None;
        }
        self.cells.get(row as usize * self.cols as usize + col as usize)
    }

    fn cell_mut(&mut self, col: u16, row: u16) -> Option<&mut Cell> {
        if col >= self.cols || row >= self.rows {
            return None;
        }
        self.cells.get_mut(row as usize * self.cols as usize + col as usize)
    }

    pub fn row(&self, row: u16) -> &[Cell] {
        let start = row as usize * self.cols as usize;
        self.cells.get(start..start + self.cols as usize).unwrap_or(&[])
    }

    /// Cell containing the pixel, if it is on the surface.
    pub fn to_cell(&self, x: f32, y: f32) -> Option<(u16, u16)> {
        if x < 0.0 || y < 0.0 {
            return None;
        }
        let col = (x / CELL_WIDTH) as u32;
        let row = (y / self.cell_height()) as u32;
        if col >= self.cols as u32 || row >= self.rows as u32 {
            return None;
        }
        Some((col as u16, row as u16))
    }

    /// Cells touched by a pixel rectangle, clipped to the surface.
    fn span(&self, rect: &Rect) -> (std::ops::Range<u16>, std::ops::Range<u16>) {
        let ch = self.cell_height();
        let clip = |v: f32, max: u16| v.clamp(0.0, max as f32) as u16;
        let cols = clip((rect.x / CELL_WIDTH).floor(), self.cols)..clip((rect.right() / CELL_WIDTH).ceil(), self.cols);
        let rows = clip((rect.y / ch).floor(), self.rows)..clip((rect.bottom() / ch).ceil(), self.rows);
        (cols, rows)
    }

    fn cell_center(&self, col: u16, row: u16) -> Vec2 {
        Vec2::new(
            (col as f32 + 0.5) * CELL_WIDTH,
            (row as f32 + 0.5) * self.cell_height(),
        )
    }

    // ── Drawing primitives ────────────────────────────────────────────────────

    pub fn clear(&mut self, bg: Rgb) {
        self.cells.fill(Cell { glyph: ' ', fg: Rgb::WHITE, bg });
    }

    /// Paint a whole row's background.
    pub fn fill_row(&mut self, row: u16, bg: Rgb) {
        for col in 0..self.cols {
            if let Some(cell) = self.cell_mut(col, row) {
                *cell = Cell { glyph: ' ', fg: Rgb::WHITE, bg };
            }
        }
    }

    pub fn fill_rect(&mut self, rect: Rect, color: Rgb) {
        let (cols, rows) = self.span(&rect);
        for row in rows {
            for col in cols.clone() {
                if let Some(cell) = self.cell_mut(col, row) {
                    *cell = Cell { glyph: ' ', fg: color, bg: color };
                }
            }
        }
    }

    /// Tint everything under the rectangle towards `color`.
    pub fn blend_rect(&mut self, rect: Rect, color: Rgb, alpha: f32) {
        let (cols, rows) = self.span(&rect);
        for row in rows {
            for col in cols.clone() {
                self.shade(col, row, color, alpha);
            }
        }
    }

    pub fn fill_ellipse(&mut self, center: Vec2, rx: f32, ry: f32, color: Rgb) {
        self.for_ellipse(center, rx, ry, |cell| *cell = Cell { glyph: ' ', fg: color, bg: color });
    }

    pub fn blend_ellipse(&mut self, center: Vec2, rx: f32, ry: f32, color: Rgb, alpha: f32) {
        self.for_ellipse(center, rx, ry, |cell| {
            cell.bg = cell.bg.lerp(color, alpha);
            cell.fg = cell.fg.lerp(color, alpha);
        });
    }

    fn for_ellipse(&mut self, center: Vec2, rx: f32, ry: f32, mut apply: impl FnMut(&mut Cell)) {
        if rx <= 0.0 || ry <= 0.0 {
            return;
        }
        let bounds = Rect::new(center.x - rx, center.y - ry, rx * 2.0, ry * 2.0);
        let (cols, rows) = self.span(&bounds);
        for row in rows {
            for col in cols.clone() {
                let c = self.cell_center(col, row);
                let dx = (c.x - center.x) / rx;
                let dy = (c.y - center.y) / ry;
                if dx * dx + dy * dy <= 1.0 {
                    if let Some(cell) = self.cell_mut(col, row) {
                        apply(cell);
                    }
                }
            }
        }
    }

    pub fn shade(&mut self, col: u16, row: u16, color: Rgb, alpha: f32) {
        if let Some(cell) = self.cell_mut(col, row) {
            cell.bg = cell.bg.lerp(color, alpha);
            cell.fg = cell.fg.lerp(color, alpha);
        }
    }

    /// Draw a glyph over whatever background is already there.
    pub fn put_char(&mut self, x: f32, y: f32, glyph: char, fg: Rgb) {
        if let Some((col, row)) = self.to_cell(x, y) {
            if let Some(cell) = self.cell_mut(col, row) {
                cell.glyph = glyph;
                cell.fg = fg;
            }
        }
    }

    pub fn put_cell(&mut self, x: f32, y: f32, glyph: char, fg: Rgb, bg: Rgb) {
        if let Some((col, row)) = self.to_cell(x, y) {
            if let Some(cell) = self.cell_mut(col, row) {
                *cell = Cell { glyph, fg, bg };
            }
        }
    }

    /// Background colour under a pixel, black when off-surface.
    pub fn bg_at(&self, x: f32, y: f32) -> Rgb {
        self.to_cell(x, y)
            .and_then(|(col, row)| self.cell(col, row))
            .map(|cell| cell.bg)
            .unwrap_or(Rgb::BLACK)
    }

    pub fn put_str(&mut self, x: f32, y: f32, text: &str, fg: Rgb) {
        for (i, glyph) in text.chars().enumerate() {
            if glyph != ' ' {
                self.put_char(x + i as f32 * CELL_WIDTH, y, glyph, fg);
            }
        }
    }
}
