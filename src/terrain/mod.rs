//! Terrain oracle seam
//!
//! The generator never owns terrain. It asks a [`TerrainOracle`] for the
//! surface under a world-space column and treats a miss as a sentinel.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use glam::Vec3;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::noise::{NoiseField, NoiseSource};

/// A point on the terrain surface
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceHit {
    /// Surface position in world space (y up)
    pub point: Vec3,
    /// Unit surface normal
    pub normal: Vec3,
    /// Angle between the normal and straight up, in degrees
    pub steepness_degrees: f32,
}

impl SurfaceHit {
    /// Stand-in for a column with no surface: the column itself at `y = 0`,
    /// facing straight up, perfectly flat
    pub fn sentinel(x: f32, z: f32) -> Self {
        Self {
            point: Vec3::new(x, 0.0, z),
            normal: Vec3::Y,
            steepness_degrees: 0.0,
        }
    }
}

/// The oracle found no surface under the requested column
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("no terrain surface under column")]
pub struct TerrainMiss;

/// Source of surface positions and slopes
///
/// Implementations must be deterministic for a given terrain state; the
/// generator calls them sequentially and never caches results across runs.
pub trait TerrainOracle {
    /// Surface under the world-space column `(x, z)`
    fn try_get_surface_point(&self, x: f32, z: f32) -> Result<SurfaceHit, TerrainMiss>;
}

impl<T: TerrainOracle + ?Sized> TerrainOracle for &T {
    fn try_get_surface_point(&self, x: f32, z: f32) -> Result<SurfaceHit, TerrainMiss> {
        (**self).try_get_surface_point(x, z)
    }
}

/// Query an oracle, substituting [`SurfaceHit::sentinel`] on a miss
///
/// The second value is `false` when the sentinel was used.
pub fn surface_or_sentinel<O: TerrainOracle + ?Sized>(
    oracle: &O,
    x: f32,
    z: f32,
) -> (SurfaceHit, bool) {
    match oracle.try_get_surface_point(x, z) {
        Ok(hit) => (hit, true),
        Err(TerrainMiss) => (SurfaceHit::sentinel(x, z), false),
    }
}

/// Infinite flat ground at a fixed height
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FlatTerrain {
    pub height: f32,
}

impl TerrainOracle for FlatTerrain {
    fn try_get_surface_point(&self, x: f32, z: f32) -> Result<SurfaceHit, TerrainMiss> {
        Ok(SurfaceHit {
            point: Vec3::new(x, self.height, z),
            normal: Vec3::Y,
            steepness_degrees: 0.0,
        })
    }
}

/// Terrain backed by a height field stretched over `[0, width] x [0, depth]`
///
/// Columns outside the rectangle miss.
#[derive(Debug, Clone)]
pub struct HeightfieldTerrain {
    field: NoiseField,
    width: f32,
    depth: f32,
    height_scale: f32,
}

impl HeightfieldTerrain {
    /// Wrap an existing field; samples are multiplied by `height_scale`
    pub fn new(field: NoiseField, width: f32, depth: f32, height_scale: f32) -> Self {
        Self {
            field,
            width,
            depth,
            height_scale,
        }
    }

    /// Generate the field from a noise source at `resolution` x `resolution`
    pub fn from_source(
        source: &NoiseSource,
        resolution: usize,
        seed: u32,
        width: f32,
        depth: f32,
        height_scale: f32,
    ) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed as u64);
        let field = source.generate(resolution, resolution, &mut rng);
        Self::new(field, width, depth, height_scale)
    }

    #[inline]
    pub fn field(&self) -> &NoiseField {
        &self.field
    }

    fn height_at(&self, x: f32, z: f32) -> f32 {
        self.field.sample_bilinear(x / self.width, z / self.depth) * self.height_scale
    }
}

impl TerrainOracle for HeightfieldTerrain {
    fn try_get_surface_point(&self, x: f32, z: f32) -> Result<SurfaceHit, TerrainMiss> {
        if !(0.0..=self.width).contains(&x) || !(0.0..=self.depth).contains(&z) {
            return Err(TerrainMiss);
        }
        if self.field.width() < 2 || self.field.height() < 2 {
            return Err(TerrainMiss);
        }

        let step_x = self.width / (self.field.width() - 1) as f32;
        let step_z = self.depth / (self.field.height() - 1) as f32;

        let y = self.height_at(x, z);
        let left = self.height_at(x - step_x, z);
        let right = self.height_at(x + step_x, z);
        let down = self.height_at(x, z - step_z);
        let up = self.height_at(x, z + step_z);

        let normal = Vec3::new(
            (left - right) / (2.0 * step_x),
            1.0,
            (down - up) / (2.0 * step_z),
        )
        .normalize();
        let steepness_degrees = normal.dot(Vec3::Y).clamp(-1.0, 1.0).acos().to_degrees();

        Ok(SurfaceHit {
            point: Vec3::new(x, y, z),
            normal,
            steepness_degrees,
        })
    }
}
