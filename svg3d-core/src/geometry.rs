//! Attribute buffers consumed by the renderer.
//!
//! Producers (the primitive factories, the STL loader, or callers) fill these;
//! the renderer only reads them.

use std::collections::HashMap;

use crate::error::{Error, Result};

pub const POSITION: &str = "position";
pub const NORMAL: &str = "normal";
pub const UV: &str = "uv";
pub const COLOR: &str = "color";

/// Flat numeric buffer with a fixed number of components per vertex.
#[derive(Debug, Clone, PartialEq)]
pub struct BufferAttribute {
    array: Vec<f32>,
    item_size: usize,
}

impl BufferAttribute {
    pub fn new(array: Vec<f32>, item_size: usize) -> Result<Self> {
        if item_size == 0 {
            return Err(Error::InvalidAttribute("item size must be at least 1".to_string()));
        }
        if array.len() % item_size != 0 {
            return Err(Error::InvalidAttribute(format!(
                "length {} is not a multiple of item size {}",
                array.len(),
                item_size
            )));
        }
        Ok(Self { array, item_size })
    }

    /// For producers whose buffers are sized by construction.
    pub(crate) fn packed(array: Vec<f32>, item_size: usize) -> Self {
        debug_assert!(item_size > 0 && array.len() % item_size == 0);
        Self { array, item_size }
    }

    pub fn array(&self) -> &[f32] {
        &self.array
    }

    pub fn item_size(&self) -> usize {
        self.item_size
    }

    /// Number of vertices stored
    pub fn count(&self) -> usize {
        self.array.len() / self.item_size
    }

    /// Components of vertex `index`, or `None` past the end
    pub fn get(&self, index: usize) -> Option<&[f32]> {
        let start = index.checked_mul(self.item_size)?;
        let end = start.checked_add(self.item_size)?;
        self.array.get(start..end)
    }
}

/// Span of the index (or vertex) list to draw. `count: None` means "to the end".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DrawRange {
    pub start: usize,
    pub count: Option<usize>,
}

/// Named attributes plus an optional index buffer.
#[derive(Debug, Clone, Default)]
pub struct BufferGeometry {
    attributes: HashMap<String, BufferAttribute>,
    index: Option<Vec<u32>>,
    draw_range: DrawRange,
}

impl BufferGeometry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_attribute(&mut self, name: impl Into<String>, attribute: BufferAttribute) -> &mut Self {
        self.attributes.insert(name.into(), attribute);
        self
    }

    /// Builder form of [`set_attribute`](Self::set_attribute)
    pub fn with_attribute(mut self, name: impl Into<String>, attribute: BufferAttribute) -> Self {
        self.set_attribute(name, attribute);
        self
    }

    pub fn attribute(&self, name: &str) -> Option<&BufferAttribute> {
        self.attributes.get(name)
    }

    pub fn set_index(&mut self, index: Vec<u32>) -> &mut Self {
        self.index = Some(index);
        self
    }

    pub fn with_index(mut self, index: Vec<u32>) -> Self {
        self.set_index(index);
        self
    }

    pub fn index(&self) -> Option<&[u32]> {
        self.index.as_deref()
    }

    pub fn set_draw_range(&mut self, start: usize, count: Option<usize>) -> &mut Self {
        self.draw_range = DrawRange { start, count };
        self
    }

    pub fn draw_range(&self) -> DrawRange {
        self.draw_range
    }

    pub fn position(&self) -> Option<&BufferAttribute> {
        self.attribute(POSITION)
    }

    pub fn normal(&self) -> Option<&BufferAttribute> {
        self.attribute(NORMAL)
    }

    pub fn uv(&self) -> Option<&BufferAttribute> {
        self.attribute(UV)
    }

    pub fn color(&self) -> Option<&BufferAttribute> {
        self.attribute(COLOR)
    }

    /// Vertex-index triples to draw.
    ///
    /// Every three consecutive entries of the index buffer form a triangle; without
    /// an index buffer, consecutive vertex triples do. The draw range is clamped
    /// to the available data and a trailing partial triple is dropped. Indices are
    /// not checked against the vertex count here.
    pub fn triangles(&self) -> impl Iterator<Item = [usize; 3]> + '_ {
        let index = self.index.as_deref();
        let total = match index {
            Some(idx) => idx.len(),
            None => self.position().map_or(0, BufferAttribute::count),
        };
        let start = self.draw_range.start.min(total);
        let end = match self.draw_range.count {
            Some(count) => start.saturating_add(count).min(total),
            None => total,
        };

        (start..end.saturating_sub(2)).step_by(3).map(move |i| match index {
            Some(idx) => [idx[i] as usize, idx[i + 1] as usize, idx[i + 2] as usize],
            None => [i, i + 1, i + 2],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quad_positions() -> BufferAttribute {
        BufferAttribute::new(
            vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 1.0, 0.0, 0.0, 1.0, 0.0],
            3,
        )
        .unwrap()
    }

    #[test]
    fn test_attribute_validation() {
        assert!(BufferAttribute::new(vec![0.0; 4], 0).is_err());
        assert!(BufferAttribute::new(vec![0.0; 4], 3).is_err());

        let attr = quad_positions();
        assert_eq!(attr.count(), 4);
        assert_eq!(attr.get(2), Some(&[1.0, 1.0, 0.0][..]));
        assert_eq!(attr.get(4), None);
    }

    #[test]
    fn test_sequential_triangles() {
        let geometry = BufferGeometry::new().with_attribute(POSITION, quad_positions());
        // four vertices: one full triple, one dangling vertex
        let tris: Vec<_> = geometry.triangles().collect();
        assert_eq!(tris, vec![[0, 1, 2]]);
    }

    #[test]
    fn test_indexed_triangles() {
        let geometry = BufferGeometry::new()
            .with_attribute(POSITION, quad_positions())
            .with_index(vec![0, 1, 2, 0, 2, 3]);
        let tris: Vec<_> = geometry.triangles().collect();
        assert_eq!(tris, vec![[0, 1, 2], [0, 2, 3]]);
    }

    #[test]
    fn test_draw_range() {
        let mut geometry = BufferGeometry::new()
            .with_attribute(POSITION, quad_positions())
            .with_index(vec![0, 1, 2, 0, 2, 3]);

        geometry.set_draw_range(3, None);
        assert_eq!(geometry.triangles().collect::<Vec<_>>(), vec![[0, 2, 3]]);

        geometry.set_draw_range(0, Some(3));
        assert_eq!(geometry.triangles().collect::<Vec<_>>(), vec![[0, 1, 2]]);

        geometry.set_draw_range(0, Some(100));
        assert_eq!(geometry.triangles().count(), 2);

        geometry.set_draw_range(10, None);
        assert_eq!(geometry.triangles().count(), 0);
    }

    #[test]
    fn test_no_position_means_no_triangles() {
        let geometry = BufferGeometry::new();
        assert_eq!(geometry.triangles().count(), 0);
        assert!(geometry.normal().is_none());
    }
}
