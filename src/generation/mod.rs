//! Tessellation of the world plane
//!
//! Scatters seed points in the unit square, relaxes them with Lloyd's
//! algorithm and lifts them onto the terrain as [`Centroid`]s.

mod lloyd;
mod points;

pub use lloyd::{
    lloyd_relaxation, lloyd_relaxation_with_options, LloydOptions, LloydRelaxation, LloydStep,
};
pub use points::generate_centroids;

use std::time::Instant;

use glam::Vec2;

use crate::centroid::Centroid;
use crate::config::WorldConfig;
use crate::error::{GenerationError, Result};
use crate::spatial::SpatialIndex;
use crate::terrain::{surface_or_sentinel, TerrainOracle};

/// Finalized centroids and the index over their world positions
#[derive(Debug, Clone)]
pub struct Tessellation {
    /// All centroids; `centroids[i].index == i`
    pub centroids: Vec<Centroid>,
    /// Index over `centroids` world positions
    pub index: SpatialIndex,
}

impl Tessellation {
    #[inline]
    pub fn len(&self) -> usize {
        self.centroids.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.centroids.is_empty()
    }
}

/// Map relaxed points into world space and build the centroid index
///
/// Each point is scaled by `(width, height)` onto the `x`/`z` plane and the
/// oracle is asked for the surface in index order. Misses keep the sentinel
/// position and are flagged on the centroid.
pub fn finalize_centroids<O: TerrainOracle + ?Sized>(
    points: &[Vec2],
    width: f32,
    height: f32,
    oracle: &O,
) -> Tessellation {
    let mut misses = 0usize;
    let centroids: Vec<Centroid> = points
        .iter()
        .enumerate()
        .map(|(index, &normalized)| {
            let (hit, found) =
                surface_or_sentinel(oracle, normalized.x * width, normalized.y * height);
            if !found {
                misses += 1;
            }
            Centroid::new(index, normalized, hit.point, found)
        })
        .collect();

    if misses > 0 {
        tracing::warn!(misses, total = centroids.len(), "terrain oracle missed centroid columns");
    }

    let positions: Vec<_> = centroids.iter().map(|c| c.world_position).collect();
    let index = SpatialIndex::from_world(&positions);

    Tessellation { centroids, index }
}

/// Run the whole tessellation stage for a configuration
///
/// # Errors
///
/// Returns `InvalidConfig` if the centroid count is zero
pub fn tessellate<O: TerrainOracle + ?Sized>(
    config: &WorldConfig,
    oracle: &O,
) -> Result<Tessellation> {
    if config.centroid_count == 0 {
        return Err(GenerationError::InvalidConfig(
            "centroid count must be at least 1".into(),
        ));
    }

    let start = Instant::now();
    let points = generate_centroids(
        config.centroid_count,
        config.seed,
        config.horizontal_buffer,
        config.vertical_buffer,
    );

    let points = if config.lloyd_iterations > 0 {
        let options = LloydOptions {
            iterations: config.lloyd_iterations,
            fidelity: config.lloyd_fidelity,
            convergence_threshold: 0.0,
        };
        lloyd_relaxation_with_options(points, options)
    } else {
        points
    };

    let tessellation = finalize_centroids(&points, config.width, config.height, oracle);

    tracing::info!(
        centroids = tessellation.len(),
        elapsed = ?start.elapsed(),
        "tessellation complete"
    );

    Ok(tessellation)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WorldConfigBuilder;
    use crate::terrain::{FlatTerrain, HeightfieldTerrain};
    use crate::noise::NoiseField;
    use glam::Vec3;

    fn config(count: usize) -> WorldConfig {
        WorldConfigBuilder::new()
            .seed(42)
            .dimensions(200.0, 100.0)
            .unwrap()
            .centroid_count(count)
            .unwrap()
            .lloyd_fidelity(40)
            .unwrap()
            .build()
            .unwrap()
    }

    #[test]
    fn test_tessellate_count_and_indices() {
        let tessellation = tessellate(&config(80), &FlatTerrain { height: 2.0 }).unwrap();
        assert_eq!(tessellation.len(), 80);
        assert_eq!(tessellation.index.len(), 80);
        for (i, centroid) in tessellation.centroids.iter().enumerate() {
            assert_eq!(centroid.index, i);
            assert!(centroid.on_surface);
            assert_eq!(centroid.world_position.y, 2.0);
        }
    }

    #[test]
    fn test_world_scaling() {
        let points = vec![Vec2::new(0.5, 0.25)];
        let tessellation = finalize_centroids(&points, 200.0, 100.0, &FlatTerrain::default());
        assert_eq!(tessellation.centroids[0].world_position, Vec3::new(100.0, 0.0, 25.0));
    }

    #[test]
    fn test_oracle_miss_uses_sentinel() {
        // Terrain only covers half the world along x
        let terrain = HeightfieldTerrain::new(NoiseField::filled(4, 4, 1.0), 100.0, 100.0, 5.0);
        let points = vec![Vec2::new(0.25, 0.5), Vec2::new(0.75, 0.5)];
        let tessellation = finalize_centroids(&points, 200.0, 100.0, &terrain);

        assert!(tessellation.centroids[0].on_surface);
        assert!((tessellation.centroids[0].world_position.y - 5.0).abs() < 1e-5);
        assert!(!tessellation.centroids[1].on_surface);
        assert_eq!(tessellation.centroids[1].world_position, Vec3::new(150.0, 0.0, 50.0));
    }

    #[test]
    fn test_tessellation_is_deterministic() {
        let a = tessellate(&config(60), &FlatTerrain::default()).unwrap();
        let b = tessellate(&config(60), &FlatTerrain::default()).unwrap();
        assert_eq!(a.centroids, b.centroids);
    }
}
