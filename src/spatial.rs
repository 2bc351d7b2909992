//! Static k-d tree over plane positions
//!
//! Every stage that needs proximity queries owns one of these: the relaxation
//! pass, the centroid set, each cluster, the region centres and each region.
//! Trees are immutable; a changed point set means a new index.

use std::num::NonZero;

use glam::{Vec2, Vec3};
use kiddo::immutable::float::kdtree::ImmutableKdTree;
use kiddo::SquaredEuclidean;

/// Wrapper around an immutable KD-tree for nearest, k-nearest and radius queries
///
/// Results are indices into the slice the index was built from. World
/// positions are indexed on the ground plane (`x`, `z`).
///
/// # Performance
///
/// - Construction: O(n log n)
/// - Nearest / k-nearest: O(log n + k)
#[derive(Clone)]
pub struct SpatialIndex {
    tree: Option<ImmutableKdTree<f32, usize, 2, 32>>,
    len: usize,
}

impl SpatialIndex {
    /// Build an index over plane positions
    ///
    /// # Example
    ///
    /// ```
    /// use seeded_regions::SpatialIndex;
    /// use glam::Vec2;
    ///
    /// let points = vec![Vec2::new(0.0, 0.0), Vec2::new(10.0, 0.0), Vec2::new(0.0, 10.0)];
    /// let index = SpatialIndex::new(&points);
    /// assert_eq!(index.nearest(Vec2::new(9.0, 1.0)), Some(1));
    /// ```
    pub fn new(points: &[Vec2]) -> Self {
        if points.is_empty() {
            return Self { tree: None, len: 0 };
        }
        let entries: Vec<[f32; 2]> = points.iter().map(|p| [p.x, p.y]).collect();
        Self {
            tree: Some(ImmutableKdTree::new_from_slice(&entries)),
            len: points.len(),
        }
    }

    /// Build an index over world positions projected onto the ground plane
    pub fn from_world(points: &[Vec3]) -> Self {
        let projected: Vec<Vec2> = points.iter().map(|p| ground(*p)).collect();
        Self::new(&projected)
    }

    /// Number of indexed points
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Index of the closest point, `None` for an empty index
    pub fn nearest(&self, point: Vec2) -> Option<usize> {
        let tree = self.tree.as_ref()?;
        Some(tree.nearest_one::<SquaredEuclidean>(&[point.x, point.y]).item)
    }

    /// Up to `k` closest indices, nearest first
    pub fn k_nearest(&self, point: Vec2, k: usize) -> Vec<usize> {
        let (Some(tree), Some(k)) = (self.tree.as_ref(), NonZero::new(k)) else {
            return Vec::new();
        };
        tree.nearest_n::<SquaredEuclidean>(&[point.x, point.y], k)
            .into_iter()
            .map(|neighbour| neighbour.item)
            .collect()
    }

    /// All indices within distance `radius` (inclusive), in no promised order
    pub fn within_radius(&self, point: Vec2, radius: f32) -> Vec<usize> {
        let Some(tree) = self.tree.as_ref() else {
            return Vec::new();
        };
        tree.within::<SquaredEuclidean>(&[point.x, point.y], radius * radius)
            .into_iter()
            .map(|neighbour| neighbour.item)
            .collect()
    }

    /// [`nearest`](Self::nearest) for a world position
    #[inline]
    pub fn nearest_world(&self, point: Vec3) -> Option<usize> {
        self.nearest(ground(point))
    }

    /// [`k_nearest`](Self::k_nearest) for a world position
    #[inline]
    pub fn k_nearest_world(&self, point: Vec3, k: usize) -> Vec<usize> {
        self.k_nearest(ground(point), k)
    }

    /// [`within_radius`](Self::within_radius) for a world position
    #[inline]
    pub fn within_radius_world(&self, point: Vec3, radius: f32) -> Vec<usize> {
        self.within_radius(ground(point), radius)
    }
}

impl std::fmt::Debug for SpatialIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpatialIndex").field("len", &self.len).finish()
    }
}

/// Ground-plane projection of a world position
#[inline]
pub fn ground(point: Vec3) -> Vec2 {
    Vec2::new(point.x, point.z)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;

    fn random_points(count: usize, seed: u64) -> Vec<Vec2> {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        (0..count)
            .map(|_| Vec2::new(rng.gen_range(0.0..100.0), rng.gen_range(0.0..100.0)))
            .collect()
    }

    fn brute_force_k_nearest(points: &[Vec2], query: Vec2, k: usize) -> Vec<usize> {
        let mut order: Vec<usize> = (0..points.len()).collect();
        order.sort_by(|&a, &b| {
            points[a]
                .distance_squared(query)
                .total_cmp(&points[b].distance_squared(query))
        });
        order.truncate(k);
        order
    }

    #[test]
    fn test_spatial_index_basic() {
        let points = vec![
            Vec2::new(1.0, 0.0),
            Vec2::new(0.0, 1.0),
            Vec2::new(-1.0, 0.0),
            Vec2::new(0.0, -1.0),
        ];
        let index = SpatialIndex::new(&points);

        assert_eq!(index.nearest(Vec2::new(0.9, 0.1)), Some(0));
        assert_eq!(index.nearest(Vec2::new(0.0, 0.95)), Some(1));
        assert_eq!(index.nearest(Vec2::new(-0.8, 0.0)), Some(2));
        assert_eq!(index.nearest(Vec2::new(0.1, -0.9)), Some(3));
    }

    #[test]
    fn test_spatial_index_exact_match() {
        let points = vec![Vec2::new(10.0, 0.0), Vec2::new(0.0, 10.0)];
        let index = SpatialIndex::new(&points);
        assert_eq!(index.nearest(points[0]), Some(0));
        assert_eq!(index.nearest(points[1]), Some(1));
    }

    #[test]
    fn test_empty_index() {
        let index = SpatialIndex::new(&[]);
        assert!(index.is_empty());
        assert_eq!(index.nearest(Vec2::ZERO), None);
        assert!(index.k_nearest(Vec2::ZERO, 3).is_empty());
        assert!(index.within_radius(Vec2::ZERO, 10.0).is_empty());
    }

    #[test]
    fn test_k_nearest_matches_brute_force() {
        let mut queries = ChaCha8Rng::seed_from_u64(99);
        for (trial, count) in [1usize, 7, 64, 333, 1000].into_iter().enumerate() {
            let points = random_points(count, trial as u64);
            let index = SpatialIndex::new(&points);
            for _ in 0..25 {
                let query = Vec2::new(
                    queries.gen_range(-10.0..110.0),
                    queries.gen_range(-10.0..110.0),
                );
                for k in [1, 5, 10] {
                    let expected = brute_force_k_nearest(&points, query, k);
                    let actual = index.k_nearest(query, k);
                    assert_eq!(actual, expected, "count={} k={} query={:?}", count, k, query);
                }
            }
        }
    }

    #[test]
    fn test_k_larger_than_point_count() {
        let points = random_points(4, 1);
        let index = SpatialIndex::new(&points);
        assert_eq!(index.k_nearest(Vec2::new(50.0, 50.0), 10).len(), 4);
        assert!(index.k_nearest(Vec2::new(50.0, 50.0), 0).is_empty());
    }

    #[test]
    fn test_within_radius_matches_brute_force() {
        let points = random_points(500, 17);
        let index = SpatialIndex::new(&points);
        let query = Vec2::new(40.0, 60.0);

        let mut actual = index.within_radius(query, 12.5);
        actual.sort_unstable();
        let expected: Vec<usize> = (0..points.len())
            .filter(|&i| points[i].distance(query) <= 12.5)
            .collect();
        assert_eq!(actual, expected);
    }

    #[test]
    fn test_queries_are_idempotent() {
        let points = random_points(200, 5);
        let index = SpatialIndex::new(&points);
        let query = Vec2::new(33.0, 71.0);

        assert_eq!(index.nearest(query), index.nearest(query));
        assert_eq!(index.k_nearest(query, 10), index.k_nearest(query, 10));
        assert_eq!(index.within_radius(query, 20.0), index.within_radius(query, 20.0));
    }

    #[test]
    fn test_world_projection_ignores_height() {
        let points = vec![Vec3::new(0.0, 500.0, 0.0), Vec3::new(10.0, 0.0, 10.0)];
        let index = SpatialIndex::from_world(&points);
        assert_eq!(index.nearest_world(Vec3::new(1.0, 0.0, 1.0)), Some(0));
    }
}
