//! Seeded scatter of tessellation points
//!
//! Points are drawn uniformly from the unit square minus a border on each
//! axis, so that relaxed cells stay clear of the world edge.

use std::collections::HashSet;

use glam::Vec2;
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Generate `count` distinct points in `[h, 1-h] x [v, 1-v]`
///
/// Exact duplicates are rejected and redrawn, so the result always holds
/// `count` points. Buffers must lie in `[0, 0.5)`; the config builder
/// enforces this.
///
/// # Example
///
/// ```rust
/// use seeded_regions::generation::generate_centroids;
///
/// let points = generate_centroids(100, 42, 0.1, 0.2);
/// assert_eq!(points.len(), 100);
/// assert!(points.iter().all(|p| p.x >= 0.1 && p.y >= 0.2));
/// ```
pub fn generate_centroids(
    count: usize,
    seed: u32,
    horizontal_buffer: f32,
    vertical_buffer: f32,
) -> Vec<Vec2> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed as u64);
    let x_range = horizontal_buffer..=(1.0 - horizontal_buffer);
    let y_range = vertical_buffer..=(1.0 - vertical_buffer);

    let mut seen: HashSet<(u32, u32)> = HashSet::with_capacity(count);
    let mut points = Vec::with_capacity(count);
    let mut rejected = 0usize;

    while points.len() < count {
        let x: f32 = rng.gen_range(x_range.clone());
        let y: f32 = rng.gen_range(y_range.clone());
        if seen.insert((x.to_bits(), y.to_bits())) {
            points.push(Vec2::new(x, y));
        } else {
            rejected += 1;
        }
    }

    if rejected > 0 {
        tracing::debug!(rejected, "redrew duplicate tessellation points");
    }

    points
}
