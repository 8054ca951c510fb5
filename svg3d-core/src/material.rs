//! Surface appearance for meshes.
use std::fmt;

use crate::color::Color;
use crate::shading::{Shader, ShadingRecord};

/// Which faces survive culling when the renderer culls by winding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Side {
    #[default]
    Front,
    Back,
    Both,
}

/// Flat colour, draw style and optional shading function.
#[derive(Clone)]
pub struct Material {
    /// Fill or stroke colour when there is no shader
    pub color: Color,
    /// Draw a triangle outline instead of a filled triangle
    pub wireframe: bool,
    pub side: Side,
    pub shader: Option<Shader>,
}

impl Material {
    pub const DEFAULT_COLOR: Color = Color::from_hex(0x6699cc);

    pub fn new(color: Color) -> Self {
        Self {
            color,
            ..Self::default()
        }
    }

    pub fn with_wireframe(mut self, wireframe: bool) -> Self {
        self.wireframe = wireframe;
        self
    }

    pub fn with_side(mut self, side: Side) -> Self {
        self.side = side;
        self
    }

    pub fn with_shader(mut self, shader: Shader) -> Self {
        self.shader = Some(shader);
        self
    }

    /// Colour for one vertex: the shader's output, or the flat colour.
    pub fn shade(&self, record: &ShadingRecord) -> Color {
        match &self.shader {
            Some(shader) => shader(record),
            None => self.color,
        }
    }
}

impl Default for Material {
    fn default() -> Self {
        Self {
            color: Self::DEFAULT_COLOR,
            wireframe: false,
            side: Side::Front,
            shader: None,
        }
    }
}

impl fmt::Debug for Material {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Material")
            .field("color", &self.color)
            .field("wireframe", &self.wireframe)
            .field("side", &self.side)
            .field("shader", &self.shader.as_ref().map(|_| "<fn>"))
            .finish()
    }
}
