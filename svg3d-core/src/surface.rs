//! Output sinks the renderer draws into.
//!
//! Coordinates are pixels with the origin at the top-left and y growing
//! downward. Primitives composite in call order: later calls land on top.

use nalgebra::Point2;

use crate::color::Color;

/// Three triangle corners in pixel space.
pub type ScreenTriangle = [Point2<f32>; 3];

/// A 2D vector drawing target.
pub trait Surface {
    /// Set the canvas size in pixels.
    fn set_size(&mut self, width: u32, height: u32);

    /// Drop everything drawn so far and fill with `color`.
    fn clear(&mut self, color: Color);

    fn fill_triangle(&mut self, points: &ScreenTriangle, color: Color);

    /// Closed three-segment outline, no fill.
    fn stroke_triangle(&mut self, points: &ScreenTriangle, color: Color);
}

/// One recorded surface call.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Clear(Color),
    Fill { points: ScreenTriangle, color: Color },
    Stroke { points: ScreenTriangle, color: Color },
}

/// Surface that records calls so they can be inspected or replayed.
#[derive(Debug, Clone, Default)]
pub struct DrawList {
    width: u32,
    height: u32,
    commands: Vec<DrawCommand>,
}

impl DrawList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Calls since the last clear, the clear itself included
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn fill_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::Fill { .. }))
            .count()
    }

    pub fn stroke_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::Stroke { .. }))
            .count()
    }

    /// Issue the recorded calls, in order, against another surface.
    pub fn replay<S: Surface + ?Sized>(&self, target: &mut S) {
        target.set_size(self.width, self.height);
        for command in &self.commands {
            match command {
                DrawCommand::Clear(color) => target.clear(*color),
                DrawCommand::Fill { points, color } => target.fill_triangle(points, *color),
                DrawCommand::Stroke { points, color } => target.stroke_triangle(points, *color),
            }
        }
    }
}

impl Surface for DrawList {
    fn set_size(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
    }

    fn clear(&mut self, color: Color) {
        self.commands.clear();
        self.commands.push(DrawCommand::Clear(color));
    }

    fn fill_triangle(&mut self, points: &ScreenTriangle, color: Color) {
        self.commands.push(DrawCommand::Fill {
            points: *points,
            color,
        });
    }

    fn stroke_triangle(&mut self, points: &ScreenTriangle, color: Color) {
        self.commands.push(DrawCommand::Stroke {
            points: *points,
            color,
        });
    }
}
