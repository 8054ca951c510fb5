//! Built-in geometry producers.
//!
//! All faces wind counter-clockwise when seen from outside.

use std::f32::consts::{PI, TAU};

use crate::geometry::{BufferAttribute, BufferGeometry, NORMAL, POSITION, UV};

/// Axis-aligned box centred on the origin: 24 vertices (4 per face, so each
/// face has its own normal) and 12 indexed triangles.
pub fn box_geometry(width: f32, height: f32, depth: f32) -> BufferGeometry {
    let (w, h, d) = (width / 2.0, height / 2.0, depth / 2.0);

    #[rustfmt::skip]
    let positions = vec![
        // front (+z)
        -w, -h, d,   w, -h, d,   w, h, d,   -w, h, d,
        // back (-z)
        -w, -h, -d,  -w, h, -d,  w, h, -d,  w, -h, -d,
        // top (+y)
        -w, h, -d,   -w, h, d,   w, h, d,   w, h, -d,
        // bottom (-y)
        -w, -h, -d,  w, -h, -d,  w, -h, d,  -w, -h, d,
        // right (+x)
        w, -h, -d,   w, h, -d,   w, h, d,   w, -h, d,
        // left (-x)
        -w, -h, d,   -w, h, d,   -w, h, -d, -w, -h, -d,
    ];

    let face_normals: [[f32; 3]; 6] = [
        [0.0, 0.0, 1.0],
        [0.0, 0.0, -1.0],
        [0.0, 1.0, 0.0],
        [0.0, -1.0, 0.0],
        [1.0, 0.0, 0.0],
        [-1.0, 0.0, 0.0],
    ];
    let normals: Vec<f32> = face_normals
        .iter()
        .flat_map(|n| std::iter::repeat(n).take(4).flatten().copied())
        .collect();

    let index: Vec<u32> = (0..6u32)
        .flat_map(|face| {
            let base = face * 4;
            [base, base + 1, base + 2, base, base + 2, base + 3]
        })
        .collect();

    BufferGeometry::new()
        .with_attribute(POSITION, BufferAttribute::packed(positions, 3))
        .with_attribute(NORMAL, BufferAttribute::packed(normals, 3))
        .with_index(index)
}

/// Unit-normal plane in the XY plane facing +Z, with UVs from 0 to 1.
pub fn plane_geometry(width: f32, height: f32) -> BufferGeometry {
    let (w, h) = (width / 2.0, height / 2.0);
    let positions = vec![-w, -h, 0.0, w, -h, 0.0, w, h, 0.0, -w, h, 0.0];
    let normals = [0.0, 0.0, 1.0].repeat(4);
    let uvs = vec![0.0, 0.0, 1.0, 0.0, 1.0, 1.0, 0.0, 1.0];

    BufferGeometry::new()
        .with_attribute(POSITION, BufferAttribute::packed(positions, 3))
        .with_attribute(NORMAL, BufferAttribute::packed(normals, 3))
        .with_attribute(UV, BufferAttribute::packed(uvs, 2))
        .with_index(vec![0, 1, 2, 0, 2, 3])
}

/// UV sphere. Segment counts below 3 (around) or 2 (top to bottom) are raised
/// to those minimums.
pub fn sphere_geometry(radius: f32, width_segments: u32, height_segments: u32) -> BufferGeometry {
    let width_segments = width_segments.max(3);
    let height_segments = height_segments.max(2);
    let vertex_count = ((width_segments + 1) * (height_segments + 1)) as usize;

    let mut positions = Vec::with_capacity(vertex_count * 3);
    let mut normals = Vec::with_capacity(vertex_count * 3);
    let mut uvs = Vec::with_capacity(vertex_count * 2);

    for y in 0..=height_segments {
        let v = y as f32 / height_segments as f32;
        let phi = v * PI;
        for x in 0..=width_segments {
            let u = x as f32 / width_segments as f32;
            let theta = u * TAU;
            let nx = -phi.sin() * theta.cos();
            let ny = phi.cos();
            let nz = phi.sin() * theta.sin();
            positions.extend_from_slice(&[nx * radius, ny * radius, nz * radius]);
            normals.extend_from_slice(&[nx, ny, nz]);
            uvs.extend_from_slice(&[u, 1.0 - v]);
        }
    }

    let mut index = Vec::with_capacity((width_segments * height_segments * 6) as usize);
    for y in 0..height_segments {
        for x in 0..width_segments {
            let a = y * (width_segments + 1) + x;
            let b = a + width_segments + 1;
            let c = a + 1;
            let d = b + 1;
            index.extend_from_slice(&[a, b, c, c, b, d]);
        }
    }

    BufferGeometry::new()
        .with_attribute(POSITION, BufferAttribute::packed(positions, 3))
        .with_attribute(NORMAL, BufferAttribute::packed(normals, 3))
        .with_attribute(UV, BufferAttribute::packed(uvs, 2))
        .with_index(index)
}

/// Regular tetrahedron inscribed in the cube of half-size `radius`.
/// Non-indexed: 4 faces of 3 vertices each, with flat face normals.
pub fn tetrahedron_geometry(radius: f32) -> BufferGeometry {
    let t = radius;
    #[rustfmt::skip]
    let positions = vec![
        t, t, t,    -t, -t, t,  t, -t, -t,
        t, t, t,    t, -t, -t,  -t, t, -t,
        t, t, t,    -t, t, -t,  -t, -t, t,
        -t, -t, t,  -t, t, -t,  t, -t, -t,
    ];

    let normals: Vec<f32> = positions
        .chunks_exact(9)
        .flat_map(|face| {
            let (a, b, c) = (&face[0..3], &face[3..6], &face[6..9]);
            let e1 = [b[0] - a[0], b[1] - a[1], b[2] - a[2]];
            let e2 = [c[0] - a[0], c[1] - a[1], c[2] - a[2]];
            let n = [
                e1[1] * e2[2] - e1[2] * e2[1],
                e1[2] * e2[0] - e1[0] * e2[2],
                e1[0] * e2[1] - e1[1] * e2[0],
            ];
            let len = (n[0] * n[0] + n[1] * n[1] + n[2] * n[2]).sqrt();
            let len = if len > 0.0 { len } else { 1.0 };
            let n = [n[0] / len, n[1] / len, n[2] / len];
            n.repeat(3)
        })
        .collect();

    BufferGeometry::new()
        .with_attribute(POSITION, BufferAttribute::packed(positions, 3))
        .with_attribute(NORMAL, BufferAttribute::packed(normals, 3))
}
