//! Character-grid surface for terminal rendering

use crossterm::{
    style::{Color as TermColor, Print, ResetColor, SetForegroundColor},
    QueueableCommand,
};
use nalgebra::Point2;
use std::io::Write;
use svg3d_core::{Color, ScreenTriangle, Surface};

/// Character luminosity ramp for shading (darkest to lightest)
const LUMINOSITY_RAMP: &[char] = &[' ', '.', ':', '-', '=', '+', '*', '#', '%', '@'];

/// Surface that rasterizes triangles into terminal cells, one cell per pixel.
///
/// There is no depth buffer: the renderer already sorts back to front, so
/// later triangles simply overwrite earlier ones.
pub struct AsciiSurface {
    width: usize,
    height: usize,
    background: Color,
    char_buffer: Vec<char>,
    color_buffer: Vec<Color>,
}

impl AsciiSurface {
    pub fn new(width: usize, height: usize) -> Self {
        let size = width * height;
        Self {
            width,
            height,
            background: Color::BLACK,
            char_buffer: vec![' '; size],
            color_buffer: vec![Color::BLACK; size],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Colour of the last clear
    pub fn background(&self) -> Color {
        self.background
    }

    /// Character and colour at a cell, if in bounds
    pub fn cell(&self, x: usize, y: usize) -> Option<(char, Color)> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = y * self.width + x;
        Some((self.char_buffer[idx], self.color_buffer[idx]))
    }

    /// One row of characters, without colour
    pub fn row(&self, y: usize) -> String {
        if y >= self.height {
            return String::new();
        }
        self.char_buffer[y * self.width..(y + 1) * self.width].iter().collect()
    }

    fn plot(&mut self, x: i32, y: i32, character: char, color: Color) {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return;
        }
        let idx = y as usize * self.width + x as usize;
        self.char_buffer[idx] = character;
        self.color_buffer[idx] = color;
    }

    fn line(&mut self, a: &Point2<f32>, b: &Point2<f32>, character: char, color: Color) {
        let steps = (b.x - a.x).abs().max((b.y - a.y).abs()).ceil();
        if !steps.is_finite() {
            return;
        }
        // one cell per step, capped so off-screen lines stay cheap
        let steps = (steps as usize).clamp(1, 4 * (self.width + self.height).max(1));
        for i in 0..=steps {
            let t = i as f32 / steps as f32;
            let x = a.x + (b.x - a.x) * t;
            let y = a.y + (b.y - a.y) * t;
            self.plot(x.floor() as i32, y.floor() as i32, character, color);
        }
    }

    pub fn draw<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        for y in 0..self.height {
            for x in 0..self.width {
                let idx = y * self.width + x;
                let Color { r, g, b } = self.color_buffer[idx];
                writer.queue(SetForegroundColor(TermColor::Rgb { r, g, b }))?;
                writer.queue(Print(self.char_buffer[idx]))?;
            }
            if y + 1 < self.height {
                writer.queue(Print("\r\n"))?;
            }
        }
        writer.queue(ResetColor)?;
        Ok(())
    }
}

/// Map a colour's luminance onto the ramp, never picking the blank cell.
fn shade_char(color: Color) -> char {
    let last = LUMINOSITY_RAMP.len() - 1;
    let index = (color.luminance() * last as f32).round() as usize;
    LUMINOSITY_RAMP[index.clamp(1, last)]
}

impl Surface for AsciiSurface {
    fn set_size(&mut self, width: u32, height: u32) {
        let (width, height) = (width as usize, height as usize);
        if width == self.width && height == self.height {
            return;
        }
        *self = Self {
            background: self.background,
            ..Self::new(width, height)
        };
    }

    fn clear(&mut self, color: Color) {
        self.background = color;
        self.char_buffer.fill(' ');
        self.color_buffer.fill(color);
    }

    fn fill_triangle(&mut self, points: &ScreenTriangle, color: Color) {
        if self.width == 0 || self.height == 0 {
            return;
        }
        let [v0, v1, v2] = *points;
        let character = shade_char(color);

        // Bounding box, clipped to the grid
        let min_x = (v0.x.min(v1.x).min(v2.x).floor() as i32).max(0);
        let max_x = (v0.x.max(v1.x).max(v2.x).ceil() as i32).min(self.width as i32 - 1);
        let min_y = (v0.y.min(v1.y).min(v2.y).floor() as i32).max(0);
        let max_y = (v0.y.max(v1.y).max(v2.y).ceil() as i32).min(self.height as i32 - 1);

        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let p = Point2::new(x as f32 + 0.5, y as f32 + 0.5);
                if let Some((w0, w1, w2)) = barycentric(&v0, &v1, &v2, &p) {
                    if w0 >= 0.0 && w1 >= 0.0 && w2 >= 0.0 {
                        self.plot(x, y, character, color);
                    }
                }
            }
        }
    }

    fn stroke_triangle(&mut self, points: &ScreenTriangle, color: Color) {
        let character = shade_char(color);
        for i in 0..3 {
            let (a, b) = (points[i], points[(i + 1) % 3]);
            self.line(&a, &b, character, color);
        }
    }
}

/// Calculate barycentric coordinates for a point in a triangle
fn barycentric(
    v0: &Point2<f32>,
    v1: &Point2<f32>,
    v2: &Point2<f32>,
    p: &Point2<f32>,
) -> Option<(f32, f32, f32)> {
    let denom = (v1.y - v2.y) * (v0.x - v2.x) + (v2.x - v1.x) * (v0.y - v2.y);

    if denom.abs() < 1e-6 {
        return None;
    }

    let w0 = ((v1.y - v2.y) * (p.x - v2.x) + (v2.x - v1.x) * (p.y - v2.y)) / denom;
    let w1 = ((v2.y - v0.y) * (p.x - v2.x) + (v0.x - v2.x) * (p.y - v2.y)) / denom;
    let w2 = 1.0 - w0 - w1;

    Some((w0, w1, w2))
}
