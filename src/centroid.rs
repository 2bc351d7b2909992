//! Tessellation centroid record
//!
//! Centroids are created once when the tessellation is finalized. Clustering
//! later fills in classification, neighbours and cluster membership; nothing
//! ever adds or removes a centroid.

use std::collections::BTreeSet;

use glam::{Vec2, Vec3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Cluster index reserved for noise centroids
pub const NOISE_CLUSTER: usize = 0;

/// DBScan state of a centroid
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Classification {
    /// Not yet visited by the classifier
    #[default]
    Unclassified,
    /// Dense neighbourhood: at least `min_points` neighbours within `eps`
    Core,
    /// Within `eps` of a core centroid but not dense itself
    Border,
    /// Neither core nor adjacent to a core centroid
    Noise,
}

impl Classification {
    /// Core and border centroids belong to a real cluster
    #[inline]
    pub fn is_clustered(self) -> bool {
        matches!(self, Classification::Core | Classification::Border)
    }
}

/// A single relaxed tessellation point
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Centroid {
    /// Stable identifier; equals the centroid's position in the world's list
    pub index: usize,

    /// Position in the unit square after relaxation
    pub normalized_position: Vec2,

    /// Surface position reported by the terrain oracle
    ///
    /// When the oracle missed, this is the sentinel column at `y = 0`.
    pub world_position: Vec3,

    /// Whether the terrain oracle found a surface for this centroid
    pub on_surface: bool,

    /// DBScan classification
    pub classification: Classification,

    /// Owning cluster; [`NOISE_CLUSTER`] until clustered or for noise
    pub cluster_index: usize,

    /// Other centroids within `eps`, ascending
    pub neighbors: BTreeSet<usize>,
}

impl Centroid {
    /// Create an unclassified centroid
    pub fn new(
        index: usize,
        normalized_position: Vec2,
        world_position: Vec3,
        on_surface: bool,
    ) -> Self {
        Self {
            index,
            normalized_position,
            world_position,
            on_surface,
            classification: Classification::Unclassified,
            cluster_index: NOISE_CLUSTER,
            neighbors: BTreeSet::new(),
        }
    }

    #[inline]
    pub fn neighbor_count(&self) -> usize {
        self.neighbors.len()
    }

    #[inline]
    pub fn is_neighbor_of(&self, other: usize) -> bool {
        self.neighbors.contains(&other)
    }

    /// Euclidean distance between world positions
    #[inline]
    pub fn distance_to(&self, other: &Centroid) -> f32 {
        self.world_position.distance(other.world_position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_centroid_creation() {
        let mut centroid = Centroid::new(3, Vec2::new(0.25, 0.5), Vec3::new(25.0, 1.0, 50.0), true);
        assert_eq!(centroid.classification, Classification::Unclassified);
        assert_eq!(centroid.cluster_index, NOISE_CLUSTER);

        centroid.neighbors.extend([9, 1, 4]);
        assert_eq!(centroid.neighbor_count(), 3);
        assert!(centroid.is_neighbor_of(4));
        assert!(!centroid.is_neighbor_of(99));
        assert_eq!(centroid.neighbors.iter().copied().collect::<Vec<_>>(), vec![1, 4, 9]);
    }

    #[test]
    fn test_is_clustered() {
        assert!(Classification::Core.is_clustered());
        assert!(Classification::Border.is_clustered());
        assert!(!Classification::Noise.is_clustered());
        assert!(!Classification::Unclassified.is_clustered());
    }

    #[test]
    fn test_distance_to() {
        let a = Centroid::new(0, Vec2::ZERO, Vec3::new(0.0, 0.0, 0.0), true);
        let b = Centroid::new(1, Vec2::ONE, Vec3::new(3.0, 0.0, 4.0), true);
        assert_eq!(a.distance_to(&b), 5.0);
    }
}
