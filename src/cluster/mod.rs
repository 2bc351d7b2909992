//! Density clusters over tessellation centroids

mod dbscan;

pub use dbscan::{classify, DbscanParams};

use glam::Vec3;

use crate::centroid::Centroid;
use crate::spatial::SpatialIndex;

/// A density-connected group of centroids
///
/// Cluster [`NOISE_CLUSTER`](crate::centroid::NOISE_CLUSTER) always exists and
/// holds the noise centroids; it never becomes part of a region.
#[derive(Debug, Clone)]
pub struct Cluster {
    /// Position in the clustering result; real clusters are numbered by size
    pub id: usize,

    /// Member centroid indices in the order they joined
    pub members: Vec<usize>,

    /// Mean world position of the members
    pub center_of_mass: Vec3,

    /// Region this cluster was assigned to
    pub region_index: Option<usize>,

    /// Index over member world positions; results index into `members`
    pub index: SpatialIndex,
}

impl Cluster {
    /// Build a cluster, computing its centre of mass and local index
    pub fn new(id: usize, members: Vec<usize>, centroids: &[Centroid]) -> Self {
        let positions: Vec<Vec3> = members.iter().map(|&m| centroids[m].world_position).collect();
        let center_of_mass = if positions.is_empty() {
            Vec3::ZERO
        } else {
            positions.iter().copied().sum::<Vec3>() / positions.len() as f32
        };

        Self {
            id,
            members,
            center_of_mass,
            region_index: None,
            index: SpatialIndex::from_world(&positions),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Member count relative to the requested tessellation size
    #[inline]
    pub fn relative_size(&self, requested_centroids: usize) -> f32 {
        if requested_centroids == 0 {
            return 0.0;
        }
        self.members.len() as f32 / requested_centroids as f32
    }

    /// Member centroid closest to `position` on the ground plane
    pub fn nearest_member(&self, position: Vec3) -> Option<usize> {
        self.index.nearest_world(position).map(|local| self.members[local])
    }
}
