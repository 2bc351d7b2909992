//! Seeded 2D scalar fields
//!
//! Fields are produced by a closed set of sources ([`NoiseSource`]) and layered
//! with explicit [`Combinator`]s. Every function here is pure: the output
//! depends only on the dimensions, the parameters and the generator state.

mod falloff;
mod perlin;

pub use falloff::{falloff_field, smooth_step, FalloffParams, FalloffShape};
pub use perlin::sample_perlin_2d;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use glam::Vec2;
use rand::Rng;

use crate::error::{GenerationError, Result};

/// Smallest accepted fractal scale; lower requests are clamped to it
pub const MIN_SCALE: f32 = 1e-4;

/// Divisor substituted for zero by [`Combinator::Divide`]
pub const DIVIDE_EPSILON: f32 = 1e-5;

/// Random per-octave offsets are drawn from `-OCTAVE_OFFSET_RANGE..OCTAVE_OFFSET_RANGE`
const OCTAVE_OFFSET_RANGE: f32 = 10_000.0;

/// Dense row-major grid of `f32` samples
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct NoiseField {
    width: usize,
    height: usize,
    values: Vec<f32>,
}

impl NoiseField {
    /// A `width` x `height` field with every cell set to `value`
    pub fn filled(width: usize, height: usize, value: f32) -> Self {
        Self {
            width,
            height,
            values: vec![value; width * height],
        }
    }

    /// Wrap existing row-major samples
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if `values.len() != width * height`
    pub fn from_values(width: usize, height: usize, values: Vec<f32>) -> Result<Self> {
        if values.len() != width * height {
            return Err(GenerationError::InvalidConfig(format!(
                "field of {} x {} needs {} values (got {})",
                width,
                height,
                width * height,
                values.len()
            )));
        }
        Ok(Self {
            width,
            height,
            values,
        })
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn values(&self) -> &[f32] {
        &self.values
    }

    /// Value at cell `(x, y)`
    ///
    /// # Panics
    ///
    /// Panics if the cell is outside the field.
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> f32 {
        self.values[y * self.width + x]
    }

    /// Overwrite cell `(x, y)`
    #[inline]
    pub fn set(&mut self, x: usize, y: usize, value: f32) {
        self.values[y * self.width + x] = value;
    }

    /// Smallest and largest sample, `None` for an empty field
    pub fn min_max(&self) -> Option<(f32, f32)> {
        self.values.iter().fold(None, |acc, &v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
    }

    /// Rescale to `[0, 1]` by this field's own min and max
    ///
    /// A constant field maps to all zeros.
    pub fn normalized(&self) -> Self {
        let mut out = self.clone();
        if let Some((lo, hi)) = self.min_max() {
            let span = hi - lo;
            for v in &mut out.values {
                *v = if span > 0.0 { (*v - lo) / span } else { 0.0 };
            }
        }
        out
    }

    /// Bilinear sample at normalized coordinates, clamped to the field
    ///
    /// `(0, 0)` is the first cell and `(1, 1)` the last.
    pub fn sample_bilinear(&self, u: f32, v: f32) -> f32 {
        if self.values.is_empty() {
            return 0.0;
        }
        let fx = u.clamp(0.0, 1.0) * (self.width - 1) as f32;
        let fy = v.clamp(0.0, 1.0) * (self.height - 1) as f32;
        let x0 = fx.floor() as usize;
        let y0 = fy.floor() as usize;
        let x1 = (x0 + 1).min(self.width - 1);
        let y1 = (y0 + 1).min(self.height - 1);
        let tx = fx - x0 as f32;
        let ty = fy - y0 as f32;

        let bottom = perlin::lerp(self.get(x0, y0), self.get(x1, y0), tx);
        let top = perlin::lerp(self.get(x0, y1), self.get(x1, y1), tx);
        perlin::lerp(bottom, top, ty)
    }
}

/// How fractal noise is brought into a usable range
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NormalizeMode {
    /// Rescale by the min and max of this field; always spans exactly `[0, 1]`
    #[default]
    Local,
    /// Fixed rescale against the largest possible octave sum
    ///
    /// Independent of the field contents, so adjacent fields generated with
    /// the same parameters line up. Values are non-negative and usually below 1.
    Global,
}

/// Parameters for [`fractal_field`]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FractalParams {
    /// Feature size in cells; lower = busier
    pub scale: f32,
    /// Number of noise layers
    pub octaves: usize,
    /// Amplitude multiplier per octave
    pub persistence: f32,
    /// Frequency multiplier per octave
    pub lacunarity: f32,
    /// Offset added to every octave's sampling position
    pub offset: Vec2,
    /// Output rescaling
    pub normalize: NormalizeMode,
}

impl Default for FractalParams {
    fn default() -> Self {
        Self {
            scale: 50.0,
            octaves: 4,
            persistence: 0.5,
            lacunarity: 2.0,
            offset: Vec2::ZERO,
            normalize: NormalizeMode::Local,
        }
    }
}

/// Binary operation applied cell by cell
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combinator {
    Add,
    Subtract,
    Multiply,
    /// Zero divisors are replaced by [`DIVIDE_EPSILON`]
    Divide,
    /// Take the right-hand value
    Set,
}

impl Combinator {
    #[inline]
    pub fn apply(self, lhs: f32, rhs: f32) -> f32 {
        match self {
            Combinator::Add => lhs + rhs,
            Combinator::Subtract => lhs - rhs,
            Combinator::Multiply => lhs * rhs,
            Combinator::Divide => {
                let divisor = if rhs == 0.0 { DIVIDE_EPSILON } else { rhs };
                lhs / divisor
            }
            Combinator::Set => rhs,
        }
    }
}

/// Combine two equally sized fields cell by cell
///
/// # Errors
///
/// Returns `InvalidConfig` if the dimensions differ
pub fn combine(lhs: &NoiseField, op: Combinator, rhs: &NoiseField) -> Result<NoiseField> {
    if lhs.width != rhs.width || lhs.height != rhs.height {
        return Err(GenerationError::InvalidConfig(format!(
            "cannot combine {} x {} field with {} x {} field",
            lhs.width, lhs.height, rhs.width, rhs.height
        )));
    }
    let values = lhs
        .values
        .iter()
        .zip(&rhs.values)
        .map(|(&a, &b)| op.apply(a, b))
        .collect();
    Ok(NoiseField {
        width: lhs.width,
        height: lhs.height,
        values,
    })
}

/// Uniform white noise in `[0, 1)`, drawn row by row
pub fn uniform_field<R: Rng + ?Sized>(width: usize, height: usize, rng: &mut R) -> NoiseField {
    let values = (0..width * height).map(|_| rng.gen::<f32>()).collect();
    NoiseField {
        width,
        height,
        values,
    }
}

/// Multi-octave Perlin noise
///
/// Octave `i` samples at frequency `lacunarity^i` with amplitude
/// `persistence^i`, shifted by a random vector drawn from `rng` (drawn in
/// octave order before any sampling). The field is centred so that zooming
/// via `scale` keeps the middle fixed.
///
/// A `scale <= 0` is clamped to [`MIN_SCALE`] and zero octaves to one.
pub fn fractal_field<R: Rng + ?Sized>(
    width: usize,
    height: usize,
    params: &FractalParams,
    rng: &mut R,
) -> NoiseField {
    let scale = if params.scale > 0.0 {
        params.scale
    } else {
        MIN_SCALE
    };
    let octaves = params.octaves.max(1);

    let mut max_possible = 0.0f32;
    let mut amplitude = 1.0f32;
    let octave_offsets: Vec<Vec2> = (0..octaves)
        .map(|_| {
            let ox = rng.gen_range(-OCTAVE_OFFSET_RANGE..OCTAVE_OFFSET_RANGE) + params.offset.x;
            let oy = rng.gen_range(-OCTAVE_OFFSET_RANGE..OCTAVE_OFFSET_RANGE) - params.offset.y;
            max_possible += amplitude;
            amplitude *= params.persistence;
            Vec2::new(ox, oy)
        })
        .collect();

    let half_width = width as f32 / 2.0;
    let half_height = height as f32 / 2.0;

    let mut field = NoiseField::filled(width, height, 0.0);
    for y in 0..height {
        for x in 0..width {
            let mut amplitude = 1.0f32;
            let mut frequency = 1.0f32;
            let mut value = 0.0f32;

            for offset in &octave_offsets {
                let sx = (x as f32 - half_width + offset.x) / scale * frequency;
                let sy = (y as f32 - half_height + offset.y) / scale * frequency;
                value += (sample_perlin_2d(sx, sy, 0) * 2.0 - 1.0) * amplitude;

                amplitude *= params.persistence;
                frequency *= params.lacunarity;
            }

            field.set(x, y, value);
        }
    }

    match params.normalize {
        NormalizeMode::Local => field.normalized(),
        NormalizeMode::Global => {
            let divisor = max_possible / 0.9;
            for v in &mut field.values {
                *v = ((*v + 1.0) / divisor).max(0.0);
            }
            field
        }
    }
}

/// Closed set of field generators
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub enum NoiseSource {
    Constant(f32),
    Uniform,
    Fractal(FractalParams),
    Falloff(FalloffParams),
    /// `lhs op rhs`; `lhs` consumes the generator before `rhs`
    Combined {
        lhs: Box<NoiseSource>,
        op: Combinator,
        rhs: Box<NoiseSource>,
    },
}

impl NoiseSource {
    /// Layer `self` with `rhs`
    pub fn combine(self, op: Combinator, rhs: NoiseSource) -> Self {
        NoiseSource::Combined {
            lhs: Box::new(self),
            op,
            rhs: Box::new(rhs),
        }
    }

    /// Produce a field
    pub fn generate<R: Rng + ?Sized>(
        &self,
        width: usize,
        height: usize,
        rng: &mut R,
    ) -> NoiseField {
        match self {
            NoiseSource::Constant(value) => NoiseField::filled(width, height, *value),
            NoiseSource::Uniform => uniform_field(width, height, rng),
            NoiseSource::Fractal(params) => fractal_field(width, height, params, rng),
            NoiseSource::Falloff(params) => falloff_field(width, height, params),
            NoiseSource::Combined { lhs, op, rhs } => {
                let lhs = lhs.generate(width, height, rng);
                let rhs = rhs.generate(width, height, rng);
                combine(&lhs, *op, &rhs)
                    .unwrap_or_else(|_| unreachable!("both sides share the requested size"))
            }
        }
    }
}
