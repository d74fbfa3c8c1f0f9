//! Character-cell canvas the skeleton is rasterized onto.

use crate::landmarks::Landmark;

use super::{DrawStyle, Surface};

/// RGB color for a character cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CellColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

/// Terminal cells are roughly twice as tall as they are wide.
const CELL_ASPECT: f32 = 2.0;

/// A fixed-budget character grid sized to the source frame's aspect ratio.
///
/// Landmarks are normalized `[0, 1]` coordinates and map onto the grid
/// directly; points outside the frame are clipped.
#[derive(Debug, Clone)]
pub struct AsciiCanvas {
    max_cols: u16,
    max_rows: u16,
    /// Source frame dimensions from the last resize
    source: Option<(u32, u32)>,
    width: u16,
    height: u16,
    /// Row-major characters
    chars: Vec<char>,
    colors: Vec<Option<CellColor>>,
}

impl AsciiCanvas {
    /// Create an empty canvas that may grow up to `max_cols` × `max_rows` cells.
    pub fn new(max_cols: u16, max_rows: u16) -> Self {
        Self {
            max_cols: max_cols.max(1),
            max_rows: max_rows.max(1),
            source: None,
            width: 0,
            height: 0,
            chars: Vec::new(),
            colors: Vec::new(),
        }
    }

    /// Largest grid this canvas may use, as `(cols, rows)`.
    pub fn budget(&self) -> (u16, u16) {
        (self.max_cols, self.max_rows)
    }

    /// Change the cell budget, refitting to the current source frame.
    ///
    /// Returns true when the grid was reallocated; its contents are then blank.
    pub fn set_budget(&mut self, max_cols: u16, max_rows: u16) -> bool {
        let (max_cols, max_rows) = (max_cols.max(1), max_rows.max(1));
        if (max_cols, max_rows) == (self.max_cols, self.max_rows) {
            return false;
        }
        self.max_cols = max_cols;
        self.max_rows = max_rows;
        match self.source.take() {
            Some((width, height)) => {
                self.resize(width, height);
                true
            }
            None => false,
        }
    }

    /// Width in cells
    pub fn width(&self) -> u16 {
        self.width
    }

    /// Height in cells
    pub fn height(&self) -> u16 {
        self.height
    }

    pub fn source_dimensions(&self) -> Option<(u32, u32)> {
        self.source
    }

    pub fn cell(&self, col: u16, row: u16) -> Option<(char, Option<CellColor>)> {
        if col >= self.width || row >= self.height {
            return None;
        }
        let idx = row as usize * self.width as usize + col as usize;
        Some((self.chars[idx], self.colors[idx]))
    }

    /// Iterate rows as `(chars, colors)` slices.
    pub fn rows(&self) -> impl Iterator<Item = (&[char], &[Option<CellColor>])> + '_ {
        let width = self.width.max(1) as usize;
        self.chars.chunks(width).zip(self.colors.chunks(width))
    }

    /// Render the grid as plain text, one line per row.
    pub fn to_string_display(&self) -> String {
        if self.width == 0 || self.height == 0 {
            return String::new();
        }

        self.chars
            .chunks(self.width as usize)
            .map(|row| row.iter().collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Grid size that fits the budget while keeping the frame's aspect ratio.
    fn fit(&self, width: u32, height: u32) -> (u16, u16) {
        if width == 0 || height == 0 {
            return (0, 0);
        }
        let aspect = height as f32 / width as f32 / CELL_ASPECT;
        let mut cols = self.max_cols as f32;
        let mut rows = (cols * aspect).round();
        if rows > self.max_rows as f32 {
            rows = self.max_rows as f32;
            cols = (rows / aspect).round().min(self.max_cols as f32);
        }
        (cols.max(1.0) as u16, rows.max(1.0) as u16)
    }

    /// Continuous grid position of a normalized point.
    fn to_grid(&self, point: Landmark) -> (f64, f64) {
        (
            f64::from(point.x) * f64::from(self.width.saturating_sub(1)),
            f64::from(point.y) * f64::from(self.height.saturating_sub(1)),
        )
    }

    fn to_cell(&self, point: Landmark) -> (i32, i32) {
        let (x, y) = self.to_grid(point);
        // `as` saturates; `plot` drops anything off-grid.
        (x.round() as i32, y.round() as i32)
    }

    /// Liang-Barsky clip of a segment to the grid rectangle.
    ///
    /// `None` when the segment misses the grid or has a non-finite end.
    fn clip(&self, a: (f64, f64), b: (f64, f64)) -> Option<((f64, f64), (f64, f64))> {
        if self.width == 0 || self.height == 0 {
            return None;
        }
        if ![a.0, a.1, b.0, b.1].iter().all(|v| v.is_finite()) {
            return None;
        }
        let max_x = f64::from(self.width - 1);
        let max_y = f64::from(self.height - 1);
        let (dx, dy) = (b.0 - a.0, b.1 - a.1);
        let mut t0 = 0.0_f64;
        let mut t1 = 1.0_f64;

        for (p, q) in [(-dx, a.0), (dx, max_x - a.0), (-dy, a.1), (dy, max_y - a.1)] {
            if p == 0.0 {
                if q < 0.0 {
                    return None;
                }
                continue;
            }
            let r = q / p;
            if p < 0.0 {
                t0 = t0.max(r);
            } else {
                t1 = t1.min(r);
            }
            if t0 > t1 {
                return None;
            }
        }

        Some((
            (a.0 + t0 * dx, a.1 + t0 * dy),
            (a.0 + t1 * dx, a.1 + t1 * dy),
        ))
    }

    fn plot(&mut self, x: i32, y: i32, style: &DrawStyle) {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return;
        }
        let idx = y as usize * self.width as usize + x as usize;
        self.chars[idx] = style.glyph;
        self.colors[idx] = Some(style.color);
    }
}

impl Surface for AsciiCanvas {
    fn resize(&mut self, width: u32, height: u32) {
        if self.source == Some((width, height)) {
            return;
        }
        let (cols, rows) = self.fit(width, height);
        self.source = Some((width, height));
        self.width = cols;
        self.height = rows;
        let size = cols as usize * rows as usize;
        self.chars = vec![' '; size];
        self.colors = vec![None; size];
    }

    fn clear(&mut self) {
        self.chars.fill(' ');
        self.colors.fill(None);
    }

    fn draw_connector(&mut self, from: Landmark, to: Landmark, style: &DrawStyle) {
        let Some(((x0, y0), (x1, y1))) = self.clip(self.to_grid(from), self.to_grid(to)) else {
            return;
        };

        // Bresenham over the clipped segment; both ends are inside the grid.
        let (mut x0, mut y0) = (x0.round() as i32, y0.round() as i32);
        let (x1, y1) = (x1.round() as i32, y1.round() as i32);
        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let mut err = dx + dy;

        loop {
            self.plot(x0, y0, style);
            if x0 == x1 && y0 == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x0 += sx;
            }
            if e2 <= dx {
                err += dx;
                y0 += sy;
            }
        }
    }

    fn draw_landmark(&mut self, point: Landmark, style: &DrawStyle) {
        let (x, y) = self.to_cell(point);
        self.plot(x, y, style);
    }
}
