//! Procedural modifiers that wrap a shader.
//!
//! Each function takes a base [`Shader`] and returns a new one; stacking is
//! plain function wrapping. [`Modifier`] describes the same effects as data so
//! a stack can be built from a list with [`compose`].

use std::f32::consts::TAU;
use std::sync::Arc;

use super::noise::{noise2, smooth_noise3};
use super::{Shader, ShadingRecord};
use crate::color::Color;

/// Add film grain: a per-sample offset in `±amount * 127.5`, hashed from UV
/// (or position x/y without UV) scaled by `scale`.
pub fn grain(base: Shader, amount: f32, scale: f32) -> Shader {
    Arc::new(move |v: &ShadingRecord| {
        let color = base(v);
        let [u, w] = v.uv.unwrap_or([v.position.x, v.position.y]);
        let n = noise2(u * scale, w * scale);
        color.offset((n - 0.5) * amount * 255.0)
    })
}

/// Add smooth 3D noise sampled at the world position times `scale`.
pub fn noise(base: Shader, amount: f32, scale: f32) -> Shader {
    Arc::new(move |v: &ShadingRecord| {
        let color = base(v);
        let p = v.position * scale;
        let n = smooth_noise3(p.x, p.y, p.z);
        color.offset((n - 0.5) * amount * 255.0)
    })
}

/// Hard stripes along U: half of each of `count` periods takes `stripe_color`.
pub fn stripes(base: Shader, stripe_color: Color, count: f32) -> Shader {
    Arc::new(move |v: &ShadingRecord| {
        let u = v.uv.map_or((v.position.x + 1.0) / 2.0, |[u, _]| u);
        let t = if (u * count * TAU).sin() > 0.0 { 1.0 } else { 0.0 };
        base(v).mix(stripe_color, t)
    })
}

/// Checkerboard: `check_color` where `floor(u * size) + floor(v * size)` is odd.
pub fn checker(base: Shader, check_color: Color, size: f32) -> Shader {
    Arc::new(move |v: &ShadingRecord| {
        let [u, w] = v.uv.unwrap_or([
            (v.position.x + 1.0) / 2.0,
            (v.position.y + 1.0) / 2.0,
        ]);
        let parity = ((u * size).floor() + (w * size).floor()).rem_euclid(2.0);
        base(v).mix(check_color, parity)
    })
}

/// Marble veins: blend toward `vein_color` by
/// `(sin((x + y + z) * 2 + noise * 4) + 1) / 2`.
pub fn marble(base: Shader, vein_color: Color, scale: f32) -> Shader {
    Arc::new(move |v: &ShadingRecord| {
        let p = v.position;
        let n = smooth_noise3(p.x * scale, p.y * scale, p.z * scale);
        let t = (((p.x + p.y + p.z) * 2.0 + n * 4.0).sin() + 1.0) / 2.0;
        base(v).mix(vein_color, t)
    })
}

/// A modifier described as data.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Modifier {
    Grain { amount: f32, scale: f32 },
    Noise { amount: f32, scale: f32 },
    Stripes { color: Color, count: f32 },
    Checker { color: Color, size: f32 },
    Marble { color: Color, scale: f32 },
}

impl Modifier {
    pub const GRAIN: Modifier = Modifier::Grain {
        amount: 0.15,
        scale: 80.0,
    };
    pub const NOISE: Modifier = Modifier::Noise {
        amount: 0.2,
        scale: 3.0,
    };
    pub const STRIPES: Modifier = Modifier::Stripes {
        color: Color::from_hex(0x333333),
        count: 8.0,
    };
    pub const CHECKER: Modifier = Modifier::Checker {
        color: Color::from_hex(0x222222),
        size: 4.0,
    };
    pub const MARBLE: Modifier = Modifier::Marble {
        color: Color::WHITE,
        scale: 4.0,
    };

    /// Wrap `base` with this effect.
    pub fn apply(self, base: Shader) -> Shader {
        match self {
            Modifier::Grain { amount, scale } => grain(base, amount, scale),
            Modifier::Noise { amount, scale } => noise(base, amount, scale),
            Modifier::Stripes { color, count } => stripes(base, color, count),
            Modifier::Checker { color, size } => checker(base, color, size),
            Modifier::Marble { color, scale } => marble(base, color, scale),
        }
    }
}

/// Apply modifiers left to right: `[m1, m2]` yields `m2(m1(base))`.
pub fn compose<I>(base: Shader, modifiers: I) -> Shader
where
    I: IntoIterator<Item = Modifier>,
{
    modifiers.into_iter().fold(base, |shader, modifier| modifier.apply(shader))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shading::{diffuse, flat, vertex_color};
    use nalgebra::Vector3;

    fn samples() -> Vec<ShadingRecord> {
        (0..50)
            .map(|i| {
                let f = i as f32;
                let record = ShadingRecord::at(Vector3::new(f * 0.13 - 3.0, f * 0.07, -f * 0.21))
                    .with_normal(Vector3::new(0.0, (f * 0.3).sin(), (f * 0.3).cos()))
                    .with_color(0.1 * (i % 10) as f32, 0.5, 0.9);
                if i % 2 == 0 {
                    record.with_uv(f * 0.019, 1.0 - f * 0.017)
                } else {
                    record
                }
            })
            .collect()
    }

    #[test]
    fn test_zero_strength_is_noop() {
        for base in [diffuse(Color::from_hex(0x88aacc)), vertex_color()] {
            let grained = compose(base.clone(), [Modifier::Grain { amount: 0.0, scale: 80.0 }]);
            let noised = compose(base.clone(), [Modifier::Noise { amount: 0.0, scale: 3.0 }]);
            for v in samples() {
                assert_eq!(grained(&v), base(&v));
                assert_eq!(noised(&v), base(&v));
            }
        }
    }

    #[test]
    fn test_grain_stays_within_amount() {
        let base = flat(Color::new(128, 128, 128));
        let grained = grain(base, 0.2, 80.0);
        for v in samples() {
            let c = grained(&v);
            assert!((c.r as i32 - 128).abs() <= 26, "{c:?}");
            assert_eq!(c.r, c.g);
            assert_eq!(c.g, c.b);
        }
    }

    #[test]
    fn test_checker_parity() {
        let base = Color::new(200, 200, 200);
        let check = Color::new(10, 20, 30);
        let s = checker(flat(base), check, 2.0);
        let at = |u, v| s(&ShadingRecord::at(Vector3::zeros()).with_uv(u, v));

        assert_eq!(at(0.1, 0.1), base);
        assert_eq!(at(0.6, 0.1), check);
        assert_eq!(at(0.1, 0.6), check);
        assert_eq!(at(0.6, 0.6), base);
    }

    #[test]
    fn test_checker_negative_coordinates() {
        let check = Color::new(10, 20, 30);
        let s = checker(flat(Color::WHITE), check, 1.0);
        let c = s(&ShadingRecord::at(Vector3::zeros()).with_uv(-0.5, 0.5));
        assert_eq!(c, check);
    }

    #[test]
    fn test_stripes_split() {
        let stripe = Color::new(1, 1, 1);
        let s = stripes(flat(Color::WHITE), stripe, 1.0);
        let at = |u| s(&ShadingRecord::at(Vector3::zeros()).with_uv(u, 0.0));
        assert_eq!(at(0.25), stripe);
        assert_eq!(at(0.75), Color::WHITE);
    }

    #[test]
    fn test_stripes_fall_back_to_position() {
        let stripe = Color::new(1, 1, 1);
        let s = stripes(flat(Color::WHITE), stripe, 1.0);
        // u = (x + 1) / 2 = 0.25
        let c = s(&ShadingRecord::at(Vector3::new(-0.5, 0.0, 0.0)));
        assert_eq!(c, stripe);
    }

    #[test]
    fn test_marble_blends_between_colors() {
        let s = marble(flat(Color::BLACK), Color::new(200, 100, 50), 4.0);
        for v in samples() {
            let c = s(&v);
            assert!(c.r <= 200 && c.g <= 100 && c.b <= 50);
            assert!(c.g <= c.r);
        }
    }

    #[test]
    fn test_compose_order() {
        let base = flat(Color::new(50, 60, 70));
        let stack = [Modifier::CHECKER, Modifier::GRAIN, Modifier::STRIPES];
        let composed = compose(base.clone(), stack);
        let manual = stripes(
            grain(checker(base, Color::from_hex(0x222222), 4.0), 0.15, 80.0),
            Color::from_hex(0x333333),
            8.0,
        );
        for v in samples() {
            assert_eq!(composed(&v), manual(&v));
        }
    }

    #[test]
    fn test_compose_empty_is_base() {
        let base = vertex_color();
        let composed = compose(base.clone(), std::iter::empty());
        for v in samples() {
            assert_eq!(composed(&v), base(&v));
        }
    }
}
