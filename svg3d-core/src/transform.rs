//! Vector, matrix and rotation math.
//!
//! Storage types come from nalgebra. The helpers here pin down the conventions
//! the renderer relies on: column vectors, right-handed space, OpenGL clip
//! space with NDC z in `[-1, 1]`, and the degenerate-input policies.

use nalgebra::{Matrix4, Quaternion, Vector3};

/// Euler angles in radians.
///
/// Applied as yaw (around Y), then pitch (around X), then roll (around Z),
/// which is the order a look-at camera needs.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Euler {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Euler {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn zero() -> Self {
        Self::default()
    }

    /// Rotate by delta amounts (in radians)
    pub fn rotate(&mut self, dx: f32, dy: f32, dz: f32) {
        self.x += dx;
        self.y += dy;
        self.z += dz;
    }
}

/// Build a quaternion from Euler angles using half-angle composition.
///
/// The result is always unit length.
pub fn quaternion_from_euler(euler: &Euler) -> Quaternion<f32> {
    let (s1, c1) = (euler.x * 0.5).sin_cos();
    let (s2, c2) = (euler.y * 0.5).sin_cos();
    let (s3, c3) = (euler.z * 0.5).sin_cos();

    Quaternion::new(
        c1 * c2 * c3 + s1 * s2 * s3,
        s1 * c2 * c3 + c1 * s2 * s3,
        c1 * s2 * c3 - s1 * c2 * s3,
        c1 * c2 * s3 - s1 * s2 * c3,
    )
}

/// `a = a * b`, in place. Copy `a` first if it must survive.
pub fn multiply(a: &mut Matrix4<f32>, b: &Matrix4<f32>) {
    *a = *a * b;
}

/// Invert `m` in place.
///
/// A matrix whose determinant is exactly zero is left untouched and `false`
/// is returned; callers that ignore the flag get the input back unchanged.
pub fn invert(m: &mut Matrix4<f32>) -> bool {
    match m.try_inverse() {
        Some(inverse) => {
            *m = inverse;
            true
        }
        None => false,
    }
}

/// Right-handed perspective projection looking down -Z.
///
/// `fov_y_degrees` is the full vertical field of view. A zero `aspect` or
/// `near == far` yields non-finite entries rather than a panic.
pub fn make_perspective(fov_y_degrees: f32, aspect: f32, near: f32, far: f32) -> Matrix4<f32> {
    let f = 1.0 / (fov_y_degrees.to_radians() * 0.5).tan();
    let nf = 1.0 / (near - far);

    #[rustfmt::skip]
    let m = Matrix4::new(
        f / aspect, 0.0, 0.0,               0.0,
        0.0,        f,   0.0,               0.0,
        0.0,        0.0, (far + near) * nf, 2.0 * far * near * nf,
        0.0,        0.0, -1.0,              0.0,
    );
    m
}

/// Translation, rotation and non-uniform scale in one matrix.
///
/// Points are scaled first, then rotated, then translated. The rotation terms
/// are expanded from the raw quaternion components, so a non-unit quaternion
/// also scales.
pub fn compose(
    position: &Vector3<f32>,
    quaternion: &Quaternion<f32>,
    scale: &Vector3<f32>,
) -> Matrix4<f32> {
    let (x, y, z, w) = (quaternion.i, quaternion.j, quaternion.k, quaternion.w);
    let (x2, y2, z2) = (x + x, y + y, z + z);
    let (xx, xy, xz) = (x * x2, x * y2, x * z2);
    let (yy, yz, zz) = (y * y2, y * z2, z * z2);
    let (wx, wy, wz) = (w * x2, w * y2, w * z2);
    let (sx, sy, sz) = (scale.x, scale.y, scale.z);

    #[rustfmt::skip]
    let m = Matrix4::new(
        (1.0 - (yy + zz)) * sx, (xy - wz) * sy,         (xz + wy) * sz,         position.x,
        (xy + wz) * sx,         (1.0 - (xx + zz)) * sy, (yz - wx) * sz,         position.y,
        (xz - wy) * sx,         (yz + wx) * sy,         (1.0 - (xx + yy)) * sz, position.z,
        0.0,                    0.0,                    0.0,                    1.0,
    );
    m
}

pub fn make_translation(x: f32, y: f32, z: f32) -> Matrix4<f32> {
    Matrix4::new_translation(&Vector3::new(x, y, z))
}

pub fn make_scale(x: f32, y: f32, z: f32) -> Matrix4<f32> {
    Matrix4::new_nonuniform_scaling(&Vector3::new(x, y, z))
}

/// Rotation around X axis
pub fn make_rotation_x(angle: f32) -> Matrix4<f32> {
    let (s, c) = angle.sin_cos();
    #[rustfmt::skip]
    let m = Matrix4::new(
        1.0, 0.0, 0.0, 0.0,
        0.0, c,   -s,  0.0,
        0.0, s,   c,   0.0,
        0.0, 0.0, 0.0, 1.0,
    );
    m
}

/// Rotation around Y axis
pub fn make_rotation_y(angle: f32) -> Matrix4<f32> {
    let (s, c) = angle.sin_cos();
    #[rustfmt::skip]
    let m = Matrix4::new(
        c,   0.0, s,   0.0,
        0.0, 1.0, 0.0, 0.0,
        -s,  0.0, c,   0.0,
        0.0, 0.0, 0.0, 1.0,
    );
    m
}

/// Rotation around Z axis
pub fn make_rotation_z(angle: f32) -> Matrix4<f32> {
    let (s, c) = angle.sin_cos();
    #[rustfmt::skip]
    let m = Matrix4::new(
        c,   -s,  0.0, 0.0,
        s,   c,   0.0, 0.0,
        0.0, 0.0, 1.0, 0.0,
        0.0, 0.0, 0.0, 1.0,
    );
    m
}

/// Transform a point by `m`, dividing by the resulting `w`.
///
/// A zero `w` is not guarded and yields infinite or NaN components; that only
/// happens with degenerate projection matrices.
pub fn apply_matrix4(point: &Vector3<f32>, m: &Matrix4<f32>) -> Vector3<f32> {
    let clip = m * point.push(1.0);
    clip.xyz() / clip.w
}

/// Transform a direction by the linear part of `m` (no translation, no divide).
pub fn transform_direction(direction: &Vector3<f32>, m: &Matrix4<f32>) -> Vector3<f32> {
    m.fixed_view::<3, 3>(0, 0) * direction
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::UnitQuaternion;

    const EPS: f32 = 1e-4;

    /// Small deterministic generator so the "random" cases are reproducible.
    struct Lcg(u32);

    impl Lcg {
        fn next(&mut self) -> f32 {
            self.0 = self.0.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
            (self.0 >> 8) as f32 / (1u32 << 24) as f32
        }

        fn range(&mut self, lo: f32, hi: f32) -> f32 {
            lo + (hi - lo) * self.next()
        }
    }

    #[test]
    fn test_euler_rotate() {
        let mut euler = Euler::zero();
        euler.rotate(0.1, 0.2, 0.3);
        assert!((euler.x - 0.1).abs() < 1e-6);
        assert!((euler.y - 0.2).abs() < 1e-6);
        assert!((euler.z - 0.3).abs() < 1e-6);
    }

    #[test]
    fn test_identity_compose() {
        let m = compose(&Vector3::zeros(), &Quaternion::identity(), &Vector3::repeat(1.0));
        assert!((m - Matrix4::identity()).norm() < 1e-6);
    }

    #[test]
    fn test_euler_quaternion_is_unit() {
        let mut rng = Lcg(7);
        for _ in 0..32 {
            let e = Euler::new(rng.range(-3.0, 3.0), rng.range(-3.0, 3.0), rng.range(-3.0, 3.0));
            let q = quaternion_from_euler(&e);
            assert!((q.norm() - 1.0).abs() < EPS);
        }
    }

    #[test]
    fn test_yaw_turns_forward_to_minus_x() {
        let q = quaternion_from_euler(&Euler::new(0.0, std::f32::consts::FRAC_PI_2, 0.0));
        let m = compose(&Vector3::zeros(), &q, &Vector3::repeat(1.0));
        let forward = apply_matrix4(&Vector3::new(0.0, 0.0, -1.0), &m);
        assert!((forward - Vector3::new(-1.0, 0.0, 0.0)).norm() < EPS);
    }

    #[test]
    fn test_compose_matches_trs() {
        let mut rng = Lcg(42);
        for _ in 0..32 {
            let t = Vector3::new(rng.range(-5.0, 5.0), rng.range(-5.0, 5.0), rng.range(-5.0, 5.0));
            let q = quaternion_from_euler(&Euler::new(
                rng.range(-3.0, 3.0),
                rng.range(-3.0, 3.0),
                rng.range(-3.0, 3.0),
            ));
            let s = Vector3::new(rng.range(0.1, 3.0), rng.range(0.1, 3.0), rng.range(0.1, 3.0));
            let m = compose(&t, &q, &s);

            let origin = apply_matrix4(&Vector3::zeros(), &m);
            assert!((origin - t).norm() < EPS);

            let rotation = UnitQuaternion::from_quaternion(q);
            for (axis, factor) in [
                (Vector3::x(), s.x),
                (Vector3::y(), s.y),
                (Vector3::z(), s.z),
            ] {
                let expected = t + rotation * (axis * factor);
                let actual = apply_matrix4(&axis, &m);
                assert!((actual - expected).norm() < EPS);
            }
        }
    }

    #[test]
    fn test_invert_round_trip() {
        let mut rng = Lcg(1234);
        for _ in 0..32 {
            let mut m = Matrix4::from_fn(|_, _| rng.range(-1.0, 1.0));
            m += Matrix4::identity() * 5.0;
            let original = m;
            assert!(invert(&mut m));
            assert!((m * original - Matrix4::identity()).norm() < EPS);
        }
    }

    #[test]
    fn test_invert_singular_is_noop() {
        #[rustfmt::skip]
        let mut m = Matrix4::new(
            1.0, 2.0, 3.0, 4.0,
            2.0, 4.0, 6.0, 8.0,
            0.0, 1.0, 0.0, 1.0,
            1.0, 0.0, 1.0, 0.0,
        );
        let original = m;
        assert!(!invert(&mut m));
        assert_eq!(m, original);
    }

    #[test]
    fn test_multiply_in_place() {
        let mut a = make_translation(1.0, 0.0, 0.0);
        let b = make_scale(2.0, 2.0, 2.0);
        multiply(&mut a, &b);
        let p = apply_matrix4(&Vector3::new(1.0, 1.0, 1.0), &a);
        assert!((p - Vector3::new(3.0, 2.0, 2.0)).norm() < EPS);
    }

    #[test]
    fn test_axis_rotations_match_euler() {
        let angle = 0.7;
        for (m, euler) in [
            (make_rotation_x(angle), Euler::new(angle, 0.0, 0.0)),
            (make_rotation_y(angle), Euler::new(0.0, angle, 0.0)),
            (make_rotation_z(angle), Euler::new(0.0, 0.0, angle)),
        ] {
            let q = quaternion_from_euler(&euler);
            let expected = compose(&Vector3::zeros(), &q, &Vector3::repeat(1.0));
            assert!((m - expected).norm() < EPS);
        }
    }

    #[test]
    fn test_perspective_depth_is_monotonic() {
        let proj = make_perspective(50.0, 1.0, 0.1, 100.0);
        let near = apply_matrix4(&Vector3::new(0.0, 0.0, -1.0), &proj);
        let far = apply_matrix4(&Vector3::new(0.0, 0.0, -10.0), &proj);
        assert!(near.z < far.z);
        assert!(near.z > -1.0 && far.z < 1.0);

        let behind = apply_matrix4(&Vector3::new(0.0, 0.0, 1.0), &proj);
        assert!(behind.z > 1.0);
    }

    #[test]
    fn test_perspective_degenerate_does_not_panic() {
        let proj = make_perspective(50.0, 0.0, 1.0, 1.0);
        assert!(!proj[(0, 0)].is_finite());
        assert!(!proj[(2, 2)].is_finite());
    }

    #[test]
    fn test_zero_w_is_not_finite() {
        let m = Matrix4::zeros();
        let p = apply_matrix4(&Vector3::new(1.0, 1.0, 1.0), &m);
        assert!(!p.x.is_finite());
    }

    #[test]
    fn test_direction_ignores_translation() {
        let m = Matrix4::new_translation(&Vector3::new(5.0, 5.0, 5.0));
        let d = transform_direction(&Vector3::z(), &m);
        assert!((d - Vector3::z()).norm() < 1e-6);
    }
}
