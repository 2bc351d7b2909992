//! Box and radial falloff masks

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use glam::Vec2;

use super::NoiseField;

/// Distance metric used by a falloff mask
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FalloffShape {
    /// Chebyshev distance; square contours
    Box,
    /// Euclidean distance; circular contours
    Radial,
}

/// Parameters for [`falloff_field`]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FalloffParams {
    /// Mask centre in normalized field coordinates
    pub center: Vec2,
    /// Distance metric
    pub shape: FalloffShape,
    /// Distance at which the mask starts rising from 0
    pub start: f32,
    /// Distance at which the mask reaches 1
    pub end: f32,
    /// Flip the mask so the centre is 1 and the rim 0
    pub invert: bool,
}

impl Default for FalloffParams {
    fn default() -> Self {
        Self {
            center: Vec2::splat(0.5),
            shape: FalloffShape::Box,
            start: 0.6,
            end: 1.0,
            invert: false,
        }
    }
}

/// Hermite smoothstep of `t` between `start` and `end`
///
/// A degenerate interval behaves as a hard step at `start`.
pub fn smooth_step(start: f32, end: f32, t: f32) -> f32 {
    if end <= start {
        return if t < start { 0.0 } else { 1.0 };
    }
    let s = ((t - start) / (end - start)).clamp(0.0, 1.0);
    s * s * (3.0 - 2.0 * s)
}

/// Build a falloff mask
///
/// Per cell, `t` is the distance of the cell centre from `center`, with both
/// axes scaled so the field edge sits at distance 1 from the middle of the
/// field. The value is `smooth_step(start, end, t)`, optionally inverted.
pub fn falloff_field(width: usize, height: usize, params: &FalloffParams) -> NoiseField {
    let mut field = NoiseField::filled(width, height, 0.0);

    for y in 0..height {
        let ny = (y as f32 + 0.5) / height as f32;
        let dy = (ny - params.center.y) * 2.0;
        for x in 0..width {
            let nx = (x as f32 + 0.5) / width as f32;
            let dx = (nx - params.center.x) * 2.0;

            let t = match params.shape {
                FalloffShape::Box => dx.abs().max(dy.abs()),
                FalloffShape::Radial => (dx * dx + dy * dy).sqrt(),
            };

            let value = smooth_step(params.start, params.end, t);
            field.set(x, y, if params.invert { 1.0 - value } else { value });
        }
    }

    field
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_smooth_step_edges() {
        assert_eq!(smooth_step(0.2, 0.8, 0.0), 0.0);
        assert_eq!(smooth_step(0.2, 0.8, 1.0), 1.0);
        assert!((smooth_step(0.2, 0.8, 0.5) - 0.5).abs() < 1e-6);
        assert_eq!(smooth_step(0.5, 0.5, 0.4), 0.0);
        assert_eq!(smooth_step(0.5, 0.5, 0.5), 1.0);
    }

    #[test]
    fn test_box_falloff_center_and_corner() {
        let params = FalloffParams {
            start: 0.2,
            end: 0.9,
            ..Default::default()
        };
        let field = falloff_field(64, 64, &params);

        assert_eq!(field.get(32, 32), 0.0);
        assert_eq!(field.get(0, 0), 1.0);
        assert_eq!(field.get(63, 0), 1.0);
    }

    #[test]
    fn test_box_has_square_contours() {
        let params = FalloffParams {
            start: 0.0,
            end: 1.0,
            ..Default::default()
        };
        let field = falloff_field(101, 101, &params);
        // Same Chebyshev distance along an edge row and at the corner
        assert_eq!(field.get(10, 50), field.get(50, 10));
        assert_eq!(field.get(10, 50), field.get(10, 10));
    }

    #[test]
    fn test_radial_differs_from_box_on_diagonal() {
        let base = FalloffParams {
            start: 0.0,
            end: 1.5,
            ..Default::default()
        };
        let radial = falloff_field(
            100,
            100,
            &FalloffParams {
                shape: FalloffShape::Radial,
                ..base
            },
        );
        let boxed = falloff_field(100, 100, &base);
        assert!(radial.get(10, 10) > boxed.get(10, 10));
    }

    #[test]
    fn test_invert() {
        let params = FalloffParams::default();
        let normal = falloff_field(16, 16, &params);
        let inverted = falloff_field(
            16,
            16,
            &FalloffParams {
                invert: true,
                ..params
            },
        );
        for (a, b) in normal.values().iter().zip(inverted.values()) {
            assert!((a + b - 1.0).abs() < 1e-6);
        }
    }
}
