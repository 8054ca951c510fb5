//! SVG document output.
use std::fmt::{self, Write as _};
use std::io;
use std::path::Path;

use crate::color::Color;
use crate::error::Result;
use crate::surface::{ScreenTriangle, Surface};

/// Surface that builds a standalone SVG document.
///
/// Filled triangles become `<polygon>` elements and outlines become closed
/// `<path>` elements, in draw order inside a single group over a background
/// rectangle.
#[derive(Debug, Clone)]
pub struct SvgSurface {
    width: u32,
    height: u32,
    background: Color,
    body: String,
}

impl SvgSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            background: Color::BLACK,
            body: String::new(),
        }
    }

    /// Number of primitives drawn since the last clear
    pub fn primitive_count(&self) -> usize {
        self.body.lines().count()
    }

    pub fn to_svg_string(&self) -> String {
        self.to_string()
    }

    pub fn write_to<W: io::Write>(&self, mut writer: W) -> Result<()> {
        writer.write_all(self.to_string().as_bytes())?;
        Ok(())
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path, self.to_string())?;
        Ok(())
    }
}

impl Default for SvgSurface {
    fn default() -> Self {
        Self::new(640, 480)
    }
}

fn points_attr(points: &ScreenTriangle) -> String {
    points
        .iter()
        .map(|p| format!("{:.2},{:.2}", p.x, p.y))
        .collect::<Vec<_>>()
        .join(" ")
}

impl Surface for SvgSurface {
    fn set_size(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
    }

    fn clear(&mut self, color: Color) {
        self.background = color;
        self.body.clear();
    }

    fn fill_triangle(&mut self, points: &ScreenTriangle, color: Color) {
        // writing into a String cannot fail
        let _ = writeln!(
            self.body,
            r#"<polygon points="{}" fill="{}"/>"#,
            points_attr(points),
            color
        );
    }

    fn stroke_triangle(&mut self, points: &ScreenTriangle, color: Color) {
        let [a, b, c] = points;
        let _ = writeln!(
            self.body,
            r#"<path d="M {:.2} {:.2} L {:.2} {:.2} L {:.2} {:.2} Z" fill="none" stroke="{}" stroke-width="1"/>"#,
            a.x, a.y, b.x, b.y, c.x, c.y, color
        );
    }
}

impl fmt::Display for SvgSurface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
            w = self.width,
            h = self.height
        )?;
        writeln!(f, r#"<rect width="100%" height="100%" fill="{}"/>"#, self.background)?;
        writeln!(f, "<g>")?;
        f.write_str(&self.body)?;
        writeln!(f, "</g>")?;
        write!(f, "</svg>")
    }
}
