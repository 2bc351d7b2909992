//! Major regions built from ranked clusters
//!
//! Clusters are weighted by how central and how large they are. The top K
//! become region cores, bound in rank order to externally authored
//! [`RegionAttributes`]; every other cluster joins the region whose core is
//! nearest.

use std::cmp::Ordering;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use glam::{Vec2, Vec3};

use crate::centroid::{Centroid, NOISE_CLUSTER};
use crate::cluster::Cluster;
use crate::error::{GenerationError, Result};
use crate::placement::{PlacementParams, TerrainRules};
use crate::spatial::{ground, SpatialIndex};

/// How densely one kind of vegetation is scattered inside a region
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct VegetationRule {
    pub name: String,
    /// Upper bound on placements of this kind per region
    pub max_count: usize,
    /// Steepest accepted slope
    pub max_steepness_degrees: f32,
    /// Distance kept from the world edge
    pub edge_buffer: f32,
    /// Minimum distance between two placements of this kind
    pub min_spacing: f32,
}

impl VegetationRule {
    pub fn terrain_rules(&self) -> TerrainRules {
        TerrainRules {
            edge_buffer: self.edge_buffer,
            max_steepness_degrees: self.max_steepness_degrees,
            ..Default::default()
        }
    }

    pub fn params(&self) -> PlacementParams {
        PlacementParams::new(self.max_count).with_min_spacing(self.min_spacing)
    }
}

/// Number of landmarks of one kind per region
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct LandmarkRule {
    pub name: String,
    pub count: usize,
    pub max_steepness_degrees: f32,
    pub min_spacing: f32,
}

impl LandmarkRule {
    pub fn terrain_rules(&self) -> TerrainRules {
        TerrainRules {
            max_steepness_degrees: self.max_steepness_degrees,
            ..Default::default()
        }
    }

    pub fn params(&self) -> PlacementParams {
        PlacementParams::new(self.count).with_min_spacing(self.min_spacing)
    }
}

/// Externally authored data bound to one major region
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct RegionAttributes {
    /// Display name
    pub name: String,
    /// RGBA display color
    pub color: [f32; 4],
    pub vegetation: Vec<VegetationRule>,
    pub landmarks: Vec<LandmarkRule>,
}

impl RegionAttributes {
    /// Attributes with a name and color and no content rules
    pub fn named(name: impl Into<String>, color: [f32; 4]) -> Self {
        Self {
            name: name.into(),
            color,
            vegetation: Vec::new(),
            landmarks: Vec::new(),
        }
    }
}

/// A ranked, attribute-bound group of clusters
#[derive(Debug, Clone)]
pub struct Region {
    /// Rank of the core cluster (0 = heaviest)
    pub id: usize,
    pub attributes: RegionAttributes,
    /// Cluster that seeded this region
    pub core_cluster: usize,
    /// Clusters attached because this region's core was nearest, in rank order
    pub sub_clusters: Vec<usize>,
    /// Core members first, then each sub-cluster's members
    pub centroids: Vec<usize>,
    /// Centre of mass of the core cluster
    pub center: Vec3,
    /// Index over `centroids` world positions; results index into `centroids`
    pub index: SpatialIndex,
}

impl Region {
    /// World positions of the region's centroids, in index order
    pub fn positions(&self, centroids: &[Centroid]) -> Vec<Vec3> {
        self.centroids.iter().map(|&c| centroids[c].world_position).collect()
    }

    /// All clusters belonging to this region, core first
    pub fn clusters(&self) -> impl Iterator<Item = usize> + '_ {
        std::iter::once(self.core_cluster).chain(self.sub_clusters.iter().copied())
    }
}

/// Inputs to region ranking
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegionParams {
    /// Number of major regions (K)
    pub region_count: usize,
    /// World extent along x
    pub width: f32,
    /// World extent along z
    pub height: f32,
    /// Tessellation size the clusters are measured against
    pub requested_centroids: usize,
}

/// `1` at the map centre, falling linearly to `0` at a corner
pub fn centrality_score(position: Vec3, width: f32, height: f32) -> f32 {
    let center = Vec2::new(width * 0.5, height * 0.5);
    let max_distance = center.length();
    if max_distance <= 0.0 {
        return 1.0;
    }
    let t = (ground(position).distance(center) / max_distance).clamp(0.0, 1.0);
    1.0 - t
}

/// `round(centrality * 10) * round(relative size * 10)`
pub fn cluster_weight(cluster: &Cluster, params: &RegionParams) -> i64 {
    let centrality = centrality_score(cluster.center_of_mass, params.width, params.height);
    let size = cluster.relative_size(params.requested_centroids);
    (centrality * 10.0).round() as i64 * (size * 10.0).round() as i64
}

/// Heavier first; ties keep the incoming (size) order under a stable sort
fn by_weight_desc(a: &(usize, i64), b: &(usize, i64)) -> Ordering {
    b.1.cmp(&a.1)
}

/// Rank non-noise clusters by weight, heaviest first
///
/// Returns `(cluster id, weight)` pairs. Empty clusters are skipped.
pub fn rank_clusters(clusters: &[Cluster], params: &RegionParams) -> Vec<(usize, i64)> {
    let mut ranked: Vec<(usize, i64)> = clusters
        .iter()
        .filter(|c| c.id != NOISE_CLUSTER && !c.is_empty())
        .map(|c| (c.id, cluster_weight(c, params)))
        .collect();
    ranked.sort_by(by_weight_desc);
    ranked
}

/// Promote the K heaviest clusters to regions and attach the rest
///
/// Sets `region_index` on every non-noise cluster.
///
/// # Errors
///
/// - `MissingAttributes` if fewer than K attribute sets are supplied
/// - `InsufficientClusters` if fewer than K non-empty clusters exist
pub fn build_regions(
    clusters: &mut [Cluster],
    centroids: &[Centroid],
    attributes: &[RegionAttributes],
    params: &RegionParams,
) -> Result<Vec<Region>> {
    let k = params.region_count;
    if attributes.len() < k {
        return Err(GenerationError::MissingAttributes {
            found: attributes.len(),
            required: k,
        });
    }

    let ranked = rank_clusters(clusters, params);
    if ranked.len() < k {
        return Err(GenerationError::InsufficientClusters {
            found: ranked.len(),
            required: k,
        });
    }

    let mut regions: Vec<Region> = ranked[..k]
        .iter()
        .zip(attributes)
        .enumerate()
        .map(|(id, (&(cluster_id, weight), attrs))| {
            let core = &mut clusters[cluster_id];
            core.region_index = Some(id);
            tracing::debug!(
                region = id,
                name = %attrs.name,
                cluster = cluster_id,
                weight,
                "region core"
            );
            Region {
                id,
                attributes: attrs.clone(),
                core_cluster: cluster_id,
                sub_clusters: Vec::new(),
                centroids: core.members.clone(),
                center: core.center_of_mass,
                index: SpatialIndex::new(&[]),
            }
        })
        .collect();

    let centers: Vec<Vec3> = regions.iter().map(|r| r.center).collect();
    let center_index = SpatialIndex::from_world(&centers);

    for &(cluster_id, _) in &ranked[k..] {
        let cluster = &mut clusters[cluster_id];
        let Some(nearest) = center_index.nearest_world(cluster.center_of_mass) else {
            continue;
        };
        cluster.region_index = Some(nearest);
        regions[nearest].sub_clusters.push(cluster_id);
        regions[nearest].centroids.extend_from_slice(&cluster.members);
    }

    for region in &mut regions {
        region.index = SpatialIndex::from_world(&region.positions(centroids));
        tracing::debug!(
            region = region.id,
            centroids = region.centroids.len(),
            sub_clusters = region.sub_clusters.len(),
            "region built"
        );
    }

    tracing::info!(regions = regions.len(), clusters = ranked.len(), "region assignment complete");

    Ok(regions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn params(region_count: usize, requested: usize) -> RegionParams {
        RegionParams {
            region_count,
            width: 100.0,
            height: 100.0,
            requested_centroids: requested,
        }
    }

    /// One cluster per entry: `(center x, center z, member count)`
    fn clusters_from(layout: &[(f32, f32, usize)]) -> (Vec<Cluster>, Vec<Centroid>) {
        let mut centroids = Vec::new();
        let mut clusters = vec![Cluster::new(NOISE_CLUSTER, Vec::new(), &[])];
        for (id, &(x, z, count)) in layout.iter().enumerate() {
            let members: Vec<usize> = (0..count)
                .map(|i| {
                    let index = centroids.len();
                    let offset = (i as f32 - (count as f32 - 1.0) / 2.0) * 0.01;
                    let position = Vec3::new(x + offset, 0.0, z - offset);
                    centroids.push(Centroid::new(index, Vec2::ZERO, position, true));
                    index
                })
                .collect();
            clusters.push(Cluster::new(id + 1, members, &centroids));
        }
        (clusters, centroids)
    }

    fn attributes(count: usize) -> Vec<RegionAttributes> {
        (0..count)
            .map(|i| {
                RegionAttributes::named(format!("region {}", i), [i as f32 / 4.0, 0.5, 0.5, 1.0])
            })
            .collect()
    }

    #[test]
    fn test_centrality_score() {
        assert_relative_eq!(centrality_score(Vec3::new(50.0, 9.0, 50.0), 100.0, 100.0), 1.0);
        assert_relative_eq!(centrality_score(Vec3::new(0.0, 0.0, 0.0), 100.0, 100.0), 0.0);
        assert_relative_eq!(centrality_score(Vec3::new(100.0, 0.0, 0.0), 100.0, 100.0), 0.0);
        assert_relative_eq!(
            centrality_score(Vec3::new(75.0, 0.0, 75.0), 100.0, 100.0),
            0.5,
            epsilon = 1e-6
        );
    }

    #[test]
    fn test_cluster_weight() {
        let (clusters, _) = clusters_from(&[(50.0, 50.0, 20)]);
        // centrality 1.0 -> 10, relative size 20/50 -> 4
        assert_eq!(cluster_weight(&clusters[1], &params(1, 50)), 40);
    }

    #[test]
    fn test_rank_prefers_central_clusters() {
        // Same size; the central one must outrank the corner one
        let (clusters, _) = clusters_from(&[(5.0, 5.0, 10), (50.0, 55.0, 10)]);
        let ranked = rank_clusters(&clusters, &params(1, 50));
        assert_eq!(ranked[0].0, 2);
        assert_eq!(ranked[1].0, 1);
    }

    #[test]
    fn test_rank_ties_keep_order() {
        let (clusters, _) = clusters_from(&[(50.0, 50.0, 10), (50.0, 50.0, 10), (50.0, 50.0, 10)]);
        let ranked = rank_clusters(&clusters, &params(1, 50));
        let ids: Vec<usize> = ranked.iter().map(|r| r.0).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn test_build_regions_partitions_clusters() {
        let layout = [
            (30.0, 30.0, 12),
            (70.0, 30.0, 11),
            (30.0, 70.0, 10),
            (70.0, 70.0, 9),
            (20.0, 20.0, 3),
            (80.0, 85.0, 2),
            (25.0, 78.0, 2),
        ];
        let (mut clusters, centroids) = clusters_from(&layout);
        let regions =
            build_regions(&mut clusters, &centroids, &attributes(4), &params(4, 60)).unwrap();

        assert_eq!(regions.len(), 4);
        for (i, region) in regions.iter().enumerate() {
            assert_eq!(region.id, i);
            assert_eq!(region.attributes.name, format!("region {}", i));
            assert_eq!(region.index.len(), region.centroids.len());
        }

        // Every non-noise cluster belongs to exactly one region
        let mut owners = vec![0usize; clusters.len()];
        for region in &regions {
            for cluster in region.clusters() {
                owners[cluster] += 1;
                assert_eq!(clusters[cluster].region_index, Some(region.id));
            }
        }
        assert_eq!(owners[0], 0);
        assert!(owners[1..].iter().all(|&o| o == 1));

        let total: usize = regions.iter().map(|r| r.centroids.len()).sum();
        assert_eq!(total, centroids.len());
    }

    #[test]
    fn test_sub_clusters_join_nearest_core() {
        let layout = [
            (30.0, 30.0, 12),
            (70.0, 30.0, 11),
            (30.0, 70.0, 10),
            (70.0, 70.0, 9),
            (20.0, 20.0, 3),
            (80.0, 85.0, 2),
        ];
        let (mut clusters, centroids) = clusters_from(&layout);
        let regions =
            build_regions(&mut clusters, &centroids, &attributes(4), &params(4, 60)).unwrap();

        let region_of = |cluster: usize| clusters[cluster].region_index.unwrap();
        assert_eq!(region_of(5), region_of(1));
        assert_eq!(region_of(6), region_of(4));
        let core_region = &regions[region_of(1)];
        assert_eq!(&core_region.centroids[..12], clusters[1].members.as_slice());
    }

    #[test]
    fn test_insufficient_clusters_is_an_error() {
        let (mut clusters, centroids) = clusters_from(&[(30.0, 30.0, 10), (70.0, 70.0, 10)]);
        let result = build_regions(&mut clusters, &centroids, &attributes(4), &params(4, 50));
        assert_eq!(
            result.unwrap_err(),
            GenerationError::InsufficientClusters { found: 2, required: 4 }
        );
    }

    #[test]
    fn test_missing_attributes_is_an_error() {
        let (mut clusters, centroids) = clusters_from(&[(30.0, 30.0, 10), (70.0, 70.0, 10)]);
        let result = build_regions(&mut clusters, &centroids, &attributes(1), &params(2, 50));
        assert!(matches!(
            result,
            Err(GenerationError::MissingAttributes { found: 1, required: 2 })
        ));
    }
}
