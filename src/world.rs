//! World main structure

use std::time::Instant;

use glam::Vec3;

use crate::centroid::{Centroid, NOISE_CLUSTER};
use crate::cluster::{classify, Cluster, DbscanParams};
use crate::config::WorldConfig;
use crate::error::{GenerationError, Result};
use crate::events::{GenerationEvent, GenerationObserver, NoopObserver};
use crate::generation::tessellate;
use crate::placement::{place_region_content, Placement};
use crate::region::{build_regions, Region, RegionAttributes, RegionParams};
use crate::spatial::SpatialIndex;
use crate::terrain::TerrainOracle;

/// A fully generated world
///
/// Everything is produced by one call to [`World::generate`] and is
/// read-only afterwards. Regenerating means generating a new `World`.
///
/// # Examples
///
/// ```
/// use seeded_regions::*;
///
/// let config = WorldConfigBuilder::new()
///     .seed(7)
///     .centroid_count(400).unwrap()
///     .lloyd_iterations(0).unwrap()
///     .eps_ratio(0.04).unwrap()
///     .min_points(5)
///     .build()
///     .unwrap();
///
/// let attributes: Vec<RegionAttributes> = ["north", "east", "south", "west"]
///     .iter()
///     .map(|name| RegionAttributes::named(*name, [1.0; 4]))
///     .collect();
///
/// let world = World::generate(config, &FlatTerrain::default(), &attributes).unwrap();
/// assert_eq!(world.regions().len(), 4);
/// ```
#[derive(Debug, Clone)]
pub struct World {
    config: WorldConfig,
    centroids: Vec<Centroid>,
    centroid_index: SpatialIndex,
    clusters: Vec<Cluster>,
    regions: Vec<Region>,
    region_index: SpatialIndex,
    placements: Vec<Placement>,
}

impl World {
    /// Run the whole pipeline
    ///
    /// # Errors
    ///
    /// - `InvalidConfig` for a zero centroid count
    /// - `InsufficientClusters` when clustering finds fewer than K clusters
    /// - `MissingAttributes` when fewer than K attribute sets are given
    pub fn generate<O>(
        config: WorldConfig,
        oracle: &O,
        attributes: &[RegionAttributes],
    ) -> Result<Self>
    where
        O: TerrainOracle + ?Sized,
    {
        Self::generate_with_observer(config, oracle, attributes, &mut NoopObserver)
    }

    /// Run the whole pipeline, reporting each finished stage to `observer`
    pub fn generate_with_observer<O, V>(
        config: WorldConfig,
        oracle: &O,
        attributes: &[RegionAttributes],
        observer: &mut V,
    ) -> Result<Self>
    where
        O: TerrainOracle + ?Sized,
        V: GenerationObserver + ?Sized,
    {
        let start = Instant::now();
        tracing::info!(
            seed = config.seed,
            centroids = config.centroid_count,
            regions = config.region_count,
            "generating world"
        );

        let tessellation = tessellate(&config, oracle)?;
        let mut centroids = tessellation.centroids;
        let centroid_index = tessellation.index;
        observer.on_event(&GenerationEvent::TessellationComplete { centroids: &centroids });

        let params = DbscanParams {
            eps: config.eps(),
            min_points: config.min_points,
        };
        let mut clusters = classify(&mut centroids, &centroid_index, params);

        let region_params = RegionParams {
            region_count: config.region_count,
            width: config.width,
            height: config.height,
            requested_centroids: config.centroid_count,
        };
        let regions = build_regions(&mut clusters, &centroids, attributes, &region_params)?;
        let centers: Vec<Vec3> = regions.iter().map(|r| r.center).collect();
        let region_index = SpatialIndex::from_world(&centers);
        observer.on_event(&GenerationEvent::RegionsComplete {
            clusters: &clusters,
            regions: &regions,
        });

        let placements: Vec<Placement> = regions
            .iter()
            .flat_map(|region| {
                place_region_content(region, &centroids, oracle, config.width, config.height)
            })
            .collect();
        if placements.is_empty() {
            tracing::info!("no content was placed");
        }
        observer.on_event(&GenerationEvent::PlacementComplete { placements: &placements });

        tracing::info!(
            clusters = clusters.len() - 1,
            regions = regions.len(),
            placements = placements.len(),
            elapsed = ?start.elapsed(),
            "world generated"
        );

        Ok(Self {
            config,
            centroids,
            centroid_index,
            clusters,
            regions,
            region_index,
            placements,
        })
    }

    #[inline]
    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    /// All centroids, indexed by `Centroid::index`
    #[inline]
    pub fn centroids(&self) -> &[Centroid] {
        &self.centroids
    }

    #[inline]
    pub fn centroid_index(&self) -> &SpatialIndex {
        &self.centroid_index
    }

    /// Clusters with noise at position 0, then by descending size
    #[inline]
    pub fn clusters(&self) -> &[Cluster] {
        &self.clusters
    }

    #[inline]
    pub fn noise(&self) -> &Cluster {
        &self.clusters[NOISE_CLUSTER]
    }

    /// Regions in rank order
    #[inline]
    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    /// # Errors
    ///
    /// Returns `RegionNotFound` if `id` is not a region
    pub fn get_region(&self, id: usize) -> Result<&Region> {
        self.regions.get(id).ok_or(GenerationError::RegionNotFound(id))
    }

    /// Every placement, grouped by region in rank order
    #[inline]
    pub fn placements(&self) -> &[Placement] {
        &self.placements
    }

    pub fn placements_in(&self, region_id: usize) -> impl Iterator<Item = &Placement> + '_ {
        self.placements.iter().filter(move |p| p.region_id == region_id)
    }

    /// Region covering `position`
    ///
    /// Uses the region of the nearest clustered centroid; positions nearest a
    /// noise centroid fall back to the nearest region centre.
    pub fn region_at(&self, position: Vec3) -> Option<&Region> {
        let owner = self
            .centroid_index
            .nearest_world(position)
            .map(|c| self.centroids[c].cluster_index)
            .and_then(|cluster| self.clusters[cluster].region_index);

        owner
            .or_else(|| self.region_index.nearest_world(position))
            .and_then(|id| self.regions.get(id))
    }
}
