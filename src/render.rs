use std::io::{self, Stdout, Write};
use std::ops::Range;

use crossterm::cursor::MoveTo;
use crossterm::style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor};
use crossterm::terminal::{self, Clear, ClearType};
use crossterm::QueueableCommand;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::assets::Sprite;
use crate::components::{Point, Rect};
use crate::config::{WORLD_HEIGHT, WORLD_WIDTH};

pub const MIN_COLS: u16 = 64;
pub const MIN_ROWS: u16 = 22;

pub mod palette {
    use crossterm::style::Color;

    const fn rgb(r: u8, g: u8, b: u8) -> Color {
        Color::Rgb { r, g, b }
    }

    pub const WHITE: Color = rgb(255, 255, 255);
    pub const BLACK: Color = rgb(0, 0, 0);
    pub const RED: Color = rgb(220, 50, 50);
    pub const GREEN: Color = rgb(50, 200, 50);
    pub const GOLD: Color = rgb(255, 215, 0);
    pub const BLUE: Color = rgb(100, 149, 237);
    pub const SKY: Color = rgb(135, 206, 235);
    pub const ROAD: Color = rgb(40, 40, 45);
    pub const GRASS: Color = rgb(34, 139, 34);
    pub const UI_BG: Color = rgb(40, 40, 50);
    pub const BUTTON: Color = rgb(80, 80, 100);
    pub const BUTTON_HOVER: Color = rgb(110, 110, 130);
    pub const BUTTON_DISABLED: Color = rgb(60, 60, 60);
    pub const PAUSE_OVERLAY: Color = rgb(15, 15, 20);
    pub const MAZE_WALL: Color = rgb(50, 50, 60);
    pub const MAZE_PATH: Color = rgb(120, 120, 130);
}

/// Marks the right half of a double-width glyph.
const CONTINUATION: char = '\0';

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cell {
    pub ch: char,
    pub fg: Color,
    pub bg: Color,
}

impl Cell {
    const BLANK: Cell = Cell {
        ch: ' ',
        fg: Color::Reset,
        bg: Color::Reset,
    };
}

/// A character grid that accepts drawing primitives in world coordinates.
/// A cell is painted when its centre falls inside the shape.
#[derive(Debug, Clone)]
pub struct Canvas {
    cols: usize,
    rows: usize,
    cells: Vec<Cell>,
}

impl Canvas {
    pub fn new(cols: usize, rows: usize) -> Self {
        Self {
            cols,
            rows,
            cells: vec![Cell::BLANK; cols * rows],
        }
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    #[cfg(test)]
    pub fn cell(&self, col: usize, row: usize) -> Option<&Cell> {
        if col >= self.cols || row >= self.rows {
            return None;
        }
        self.cells.get(row * self.cols + col)
    }

    pub fn to_world(&self, col: u16, row: u16) -> Point {
        Point::new(
            (col as f32 + 0.5) * WORLD_WIDTH / self.cols as f32,
            (row as f32 + 0.5) * WORLD_HEIGHT / self.rows as f32,
        )
    }

    fn col_of(&self, x: f32) -> isize {
        (x / WORLD_WIDTH * self.cols as f32).floor() as isize
    }

    fn row_of(&self, y: f32) -> isize {
        (y / WORLD_HEIGHT * self.rows as f32).floor() as isize
    }

    fn center(&self, col: usize, row: usize) -> Point {
        self.to_world(col as u16, row as u16)
    }

    fn cell_mut(&mut self, col: isize, row: isize) -> Option<&mut Cell> {
        if col < 0 || row < 0 || col as usize >= self.cols || row as usize >= self.rows {
            return None;
        }
        self.cells.get_mut(row as usize * self.cols + col as usize)
    }

    pub fn clear(&mut self, bg: Color) {
        self.cells.fill(Cell { bg, ..Cell::BLANK });
    }

    pub fn fill_rect(&mut self, rect: Rect, color: Color) {
        for (col, row) in self.cells_in(rect) {
            if let Some(cell) = self.cell_mut(col as isize, row as isize) {
                *cell = Cell { bg: color, ..Cell::BLANK };
            }
        }
    }

    pub fn fill_ellipse(&mut self, rect: Rect, color: Color) {
        let (cx, cy) = (rect.center_x(), rect.center_y());
        let (rx, ry) = ((rect.w / 2.0).max(f32::EPSILON), (rect.h / 2.0).max(f32::EPSILON));
        let cells: Vec<_> = self.cells_in(rect).collect();
        let mut painted = false;
        for &(col, row) in &cells {
            let p = self.center(col, row);
            let (dx, dy) = ((p.x - cx) / rx, (p.y - cy) / ry);
            if dx * dx + dy * dy <= 1.0 {
                self.paint_bg(col, row, color);
                painted = true;
            }
        }
        if !painted {
            let (col, row) = (self.col_of(cx), self.row_of(cy));
            if let Some(cell) = self.cell_mut(col, row) {
                cell.bg = color;
            }
        }
    }

    /// Even-odd scanline fill of an arbitrary polygon.
    pub fn fill_polygon(&mut self, points: &[Point], color: Color) {
        if points.len() < 3 {
            return;
        }
        let (mut min_x, mut min_y) = (f32::MAX, f32::MAX);
        let (mut max_x, mut max_y) = (f32::MIN, f32::MIN);
        for p in points {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }
        let bounds = Rect::new(min_x, min_y, max_x - min_x, max_y - min_y);
        let cells: Vec<_> = self.cells_in(bounds).collect();
        for (col, row) in cells {
            if point_in_polygon(self.center(col, row), points) {
                self.paint_bg(col, row, color);
            }
        }
    }

    pub fn line(&mut self, from: Point, to: Point, ch: char, color: Color) {
        let (c0, r0) = (self.col_of(from.x), self.row_of(from.y));
        let (c1, r1) = (self.col_of(to.x), self.row_of(to.y));
        let steps = (c1 - c0).abs().max((r1 - r0).abs()).max(1);
        for i in 0..=steps {
            let t = i as f32 / steps as f32;
            let col = (c0 as f32 + (c1 - c0) as f32 * t).round() as isize;
            let row = (r0 as f32 + (r1 - r0) as f32 * t).round() as isize;
            if let Some(cell) = self.cell_mut(col, row) {
                cell.ch = ch;
                cell.fg = color;
            }
        }
    }

    pub fn text(&mut self, x: f32, y: f32, text: &str, fg: Color) {
        let row = self.row_of(y);
        let mut col = self.col_of(x);
        for ch in text.chars() {
            let width = UnicodeWidthChar::width(ch).unwrap_or(0);
            if width == 0 {
                continue;
            }
            if let Some(cell) = self.cell_mut(col, row) {
                cell.ch = ch;
                cell.fg = fg;
            }
            for extra in 1..width {
                if let Some(cell) = self.cell_mut(col + extra as isize, row) {
                    cell.ch = CONTINUATION;
                }
            }
            col += width as isize;
        }
    }

    pub fn text_centered(&mut self, center_x: f32, y: f32, text: &str, fg: Color) {
        let width = UnicodeWidthStr::width(text) as isize;
        let start_col = self.col_of(center_x) - width / 2;
        let x = (start_col as f32 + 0.5) * WORLD_WIDTH / self.cols as f32;
        self.text(x, y, text, fg);
    }

    /// Scales `sprite` into `rect`; spaces in the art are transparent.
    pub fn blit(&mut self, sprite: &Sprite, rect: Rect, fg: Color) {
        let (art_w, art_h) = (sprite.width(), sprite.height());
        if art_w == 0 || art_h == 0 || rect.w <= 0.0 || rect.h <= 0.0 {
            return;
        }
        let fg = if sprite.is_placeholder() { Color::Red } else { fg };
        let cells: Vec<_> = self.cells_in(rect).collect();
        for (col, row) in cells {
            let p = self.center(col, row);
            let ax = (((p.x - rect.x) / rect.w) * art_w as f32).floor() as usize;
            let ay = (((p.y - rect.y) / rect.h) * art_h as f32).floor() as usize;
            let ch = sprite.glyph(ax.min(art_w - 1), ay.min(art_h - 1));
            if ch == ' ' {
                continue;
            }
            if let Some(cell) = self.cell_mut(col as isize, row as isize) {
                cell.ch = ch;
                cell.fg = fg;
            }
        }
    }

    fn paint_bg(&mut self, col: usize, row: usize, color: Color) {
        if let Some(cell) = self.cell_mut(col as isize, row as isize) {
            *cell = Cell { bg: color, ..Cell::BLANK };
        }
    }

    /// Cells whose centres fall inside `rect`; at least the cell under the
    /// rect's centre when the rect is smaller than a cell.
    fn cells_in(&self, rect: Rect) -> impl Iterator<Item = (usize, usize)> {
        let mut cols = span(rect.x, rect.right(), self.cols, WORLD_WIDTH);
        let mut rows = span(rect.y, rect.bottom(), self.rows, WORLD_HEIGHT);
        if cols.is_empty() {
            cols = single(self.col_of(rect.center_x()), self.cols);
        }
        if rows.is_empty() {
            rows = single(self.row_of(rect.center_y()), self.rows);
        }
        rows.flat_map(move |row| cols.clone().map(move |col| (col, row)))
    }
}

fn span(lo: f32, hi: f32, cells: usize, world: f32) -> Range<usize> {
    let scale = cells as f32 / world;
    let start = (lo * scale - 0.5).ceil().max(0.0) as usize;
    let end = ((hi * scale - 0.5).ceil().max(0.0) as usize).min(cells);
    start..end.max(start)
}

fn single(index: isize, cells: usize) -> Range<usize> {
    if index < 0 || index as usize >= cells {
        0..0
    } else {
        index as usize..index as usize + 1
    }
}

fn point_in_polygon(p: Point, points: &[Point]) -> bool {
    let mut inside = false;
    let mut j = points.len() - 1;
    for i in 0..points.len() {
        let (a, b) = (points[i], points[j]);
        if (a.y > p.y) != (b.y > p.y) && p.x < (b.x - a.x) * (p.y - a.y) / (b.y - a.y) + a.x {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// Flushes canvases to the terminal, rewriting only cells that changed.
pub struct TerminalRenderer {
    last: Vec<Cell>,
    cols: usize,
    rows: usize,
    needs_full: bool,
}

impl Default for TerminalRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl TerminalRenderer {
    pub fn new() -> Self {
        Self {
            last: Vec::new(),
            cols: 0,
            rows: 0,
            needs_full: true,
        }
    }

    pub fn canvas(&mut self) -> io::Result<Option<Canvas>> {
        let (term_w, term_h) = terminal::size()?;
        if term_w < MIN_COLS || term_h < MIN_ROWS {
            self.needs_full = true;
            return Ok(None);
        }
        let (cols, rows) = (term_w as usize, term_h as usize);
        if cols != self.cols || rows != self.rows {
            self.cols = cols;
            self.rows = rows;
            self.last = vec![Cell::BLANK; cols * rows];
            self.needs_full = true;
        }
        Ok(Some(Canvas::new(cols, rows)))
    }

    pub fn present(&mut self, stdout: &mut Stdout, canvas: &Canvas, bell: bool) -> io::Result<()> {
        if self.needs_full {
            stdout.queue(ResetColor)?;
            stdout.queue(Clear(ClearType::All))?;
        }
        for row in 0..canvas.rows() {
            for col in 0..canvas.cols() {
                let idx = row * canvas.cols() + col;
                let cell = canvas.cells[idx];
                if !self.needs_full && self.last.get(idx) == Some(&cell) {
                    continue;
                }
                if let Some(slot) = self.last.get_mut(idx) {
                    *slot = cell;
                }
                if cell.ch == CONTINUATION {
                    continue;
                }
                draw_cell(stdout, col as u16, row as u16, cell)?;
            }
        }
        stdout.queue(ResetColor)?;
        if bell {
            stdout.queue(Print('\u{7}'))?;
        }
        self.needs_full = false;
        stdout.flush()
    }

    pub fn render_too_small(&mut self, stdout: &mut Stdout) -> io::Result<()> {
        let (term_w, term_h) = terminal::size()?;
        stdout.queue(ResetColor)?;
        stdout.queue(Clear(ClearType::All))?;
        stdout.queue(MoveTo(0, 0))?;
        stdout.queue(Print(format!(
            "Terminal too small. Need at least {}x{} (cols x rows). Current: {}x{}.",
            MIN_COLS, MIN_ROWS, term_w, term_h
        )))?;
        stdout.flush()
    }
}

fn draw_cell(stdout: &mut Stdout, col: u16, row: u16, cell: Cell) -> io::Result<()> {
    stdout.queue(MoveTo(col, row))?;
    stdout.queue(SetForegroundColor(cell.fg))?;
    stdout.queue(SetBackgroundColor(cell.bg))?;
    stdout.queue(Print(cell.ch))?;
    Ok(())
}
