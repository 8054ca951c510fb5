//! Stateless lattice noise for procedural shading.
//!
//! Cheap, deterministic and allocation-free, so it is safe to call per vertex.
//! Not suitable for anything that needs real randomness.

/// Pseudo-random value in `[0, 1]` for a lattice coordinate.
pub fn hash3(x: f32, y: f32, z: f32) -> f32 {
    // f64 keeps enough fractional bits after the large multiply; floor keeps the result non-negative
    let p = x as f64 * 12.9898 + y as f64 * 78.233 + z as f64 * 45.164;
    let h = p.sin() * 43758.5453;
    (h - h.floor()) as f32
}

/// 2D hash for UV-space effects
pub fn noise2(u: f32, v: f32) -> f32 {
    hash3(u * 100.0, v * 100.0, 0.0)
}

/// Smooth 3D noise: trilinear blend of the 8 surrounding lattice hashes with
/// smoothstep weights.
pub fn smooth_noise3(x: f32, y: f32, z: f32) -> f32 {
    let (ix, iy, iz) = (x.floor(), y.floor(), z.floor());
    let (fx, fy, fz) = (x - ix, y - iy, z - iz);
    let (ux, uy, uz) = (smoothstep(fx), smoothstep(fy), smoothstep(fz));

    let n000 = hash3(ix, iy, iz);
    let n001 = hash3(ix, iy, iz + 1.0);
    let n010 = hash3(ix, iy + 1.0, iz);
    let n011 = hash3(ix, iy + 1.0, iz + 1.0);
    let n100 = hash3(ix + 1.0, iy, iz);
    let n101 = hash3(ix + 1.0, iy, iz + 1.0);
    let n110 = hash3(ix + 1.0, iy + 1.0, iz);
    let n111 = hash3(ix + 1.0, iy + 1.0, iz + 1.0);

    let nx00 = lerp(n000, n100, ux);
    let nx01 = lerp(n001, n101, ux);
    let nx10 = lerp(n010, n110, ux);
    let nx11 = lerp(n011, n111, ux);
    let nxy0 = lerp(nx00, nx10, uy);
    let nxy1 = lerp(nx01, nx11, uy);
    lerp(nxy0, nxy1, uz)
}

fn smoothstep(t: f32) -> f32 {
    t * t * (3.0 - 2.0 * t)
}

fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a * (1.0 - t) + b * t
}
