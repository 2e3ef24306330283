//! ASCII line canvas for terminal rendering

use crossterm::{
    style::{Color, Print, ResetColor, SetForegroundColor},
    QueueableCommand,
};
use std::io::Write;
use wf3d_core::{LineStyle, LineSurface, ScreenPoint};

const EMPTY: char = ' ';

/// Character grid that wireframes are rasterized into, one cell per pixel
pub struct AsciiCanvas {
    width: usize,
    height: usize,
    cells: Vec<(char, LineStyle)>,
}

impl AsciiCanvas {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![(EMPTY, LineStyle::Normal); width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn resize(&mut self, width: usize, height: usize) {
        self.width = width;
        self.height = height;
        self.cells = vec![(EMPTY, LineStyle::Normal); width * height];
    }

    pub fn clear(&mut self) {
        self.cells.fill((EMPTY, LineStyle::Normal));
    }

    pub fn cell(&self, x: usize, y: usize) -> Option<char> {
        (x < self.width && y < self.height).then(|| self.cells[y * self.width + x].0)
    }

    /// Writes a cell unless a higher-priority style already owns it
    fn plot(&mut self, x: i64, y: i64, character: char, style: LineStyle) {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return;
        }
        let idx = y as usize * self.width + x as usize;
        let current = self.cells[idx];
        if current.0 == EMPTY || priority(style) >= priority(current.1) {
            self.cells[idx] = (character, style);
        }
    }

    pub fn draw<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        for row in self.cells.chunks(self.width.max(1)) {
            for &(c, style) in row {
                writer.queue(SetForegroundColor(color(style)))?;
                writer.queue(Print(c))?;
            }
            writer.queue(Print("\r\n"))?;
        }
        writer.queue(ResetColor)?;
        Ok(())
    }
}

impl LineSurface for AsciiCanvas {
    /// Bresenham line between the rounded endpoints
    fn draw_line(&mut self, from: ScreenPoint, to: ScreenPoint, style: LineStyle) {
        let (Some((mut x0, mut y0)), Some((x1, y1))) = (to_cell(from), to_cell(to)) else {
            return;
        };
        // Endpoints far outside the grid would make the walk arbitrarily long.
        let limit = 4 * (self.width + self.height) as i64;
        if [x0, y0, x1, y1].iter().any(|c| c.abs() > limit) {
            return;
        }

        let character = glyph(style);
        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let mut err = dx + dy;

        loop {
            self.plot(x0, y0, character, style);
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

    fn draw_marker(&mut self, at: ScreenPoint, style: LineStyle) {
        if let Some((x, y)) = to_cell(at) {
            self.plot(x, y, glyph(style), style);
        }
    }
}

fn to_cell(point: ScreenPoint) -> Option<(i64, i64)> {
    (point.x.is_finite() && point.y.is_finite())
        .then(|| (point.x.floor() as i64, point.y.floor() as i64))
}

fn glyph(style: LineStyle) -> char {
    match style {
        LineStyle::Normal => '.',
        LineStyle::SelectedObject => '*',
        LineStyle::SelectedPolygon => '#',
        LineStyle::SelectedVertex => '@',
    }
}

fn priority(style: LineStyle) -> u8 {
    match style {
        LineStyle::Normal => 0,
        LineStyle::SelectedObject => 1,
        LineStyle::SelectedPolygon => 2,
        LineStyle::SelectedVertex => 3,
    }
}

fn color(style: LineStyle) -> Color {
    match style {
        LineStyle::Normal => Color::Grey,
        LineStyle::SelectedObject => Color::Cyan,
        LineStyle::SelectedPolygon => Color::Yellow,
        LineStyle::SelectedVertex => Color::Red,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(canvas: &AsciiCanvas, y: usize) -> String {
        (0..canvas.width()).filter_map(|x| canvas.cell(x, y)).collect()
    }

    #[test]
    fn test_horizontal_and_diagonal_lines() {
        let mut canvas = AsciiCanvas::new(6, 4);
        canvas.draw_line(ScreenPoint::new(0.5, 0.5), ScreenPoint::new(4.5, 0.5), LineStyle::Normal);
        assert_eq!(row(&canvas, 0), "..... ");

        canvas.draw_line(ScreenPoint::new(0.0, 0.0), ScreenPoint::new(3.0, 3.0), LineStyle::SelectedObject);
        for i in 0..4 {
            assert_eq!(canvas.cell(i, i), Some('*'));
        }
    }

    #[test]
    fn test_selected_style_wins_overlap() {
        let mut canvas = AsciiCanvas::new(4, 1);
        canvas.draw_line(ScreenPoint::new(0.0, 0.0), ScreenPoint::new(3.0, 0.0), LineStyle::SelectedPolygon);
        canvas.draw_line(ScreenPoint::new(0.0, 0.0), ScreenPoint::new(3.0, 0.0), LineStyle::Normal);
        assert_eq!(row(&canvas, 0), "####");

        canvas.draw_marker(ScreenPoint::new(1.2, 0.9), LineStyle::SelectedVertex);
        assert_eq!(row(&canvas, 0), "#@##");
    }

    #[test]
    fn test_clips_and_ignores_non_finite() {
        let mut canvas = AsciiCanvas::new(3, 3);
        canvas.draw_line(ScreenPoint::new(-2.0, 1.0), ScreenPoint::new(5.0, 1.0), LineStyle::Normal);
        assert_eq!(row(&canvas, 1), "...");

        canvas.clear();
        canvas.draw_line(ScreenPoint::new(f32::NAN, 0.0), ScreenPoint::new(1.0, 1.0), LineStyle::Normal);
        canvas.draw_line(ScreenPoint::new(-1e9, 0.0), ScreenPoint::new(1.0, 1.0), LineStyle::Normal);
        assert!((0..3).all(|y| row(&canvas, y) == "   "));
    }

    #[test]
    fn test_draw_emits_rows() {
        let mut canvas = AsciiCanvas::new(2, 2);
        canvas.draw_marker(ScreenPoint::new(0.0, 0.0), LineStyle::SelectedVertex);
        let mut out = Vec::new();
        canvas.draw(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains('@'));
        assert_eq!(text.matches("\r\n").count(), 2);
    }
}
