//! Greedy fan-out placement search
//!
//! Starting from a seed position, the search looks at the `k` nearest
//! unvisited points of a region, keeps those the acceptance predicate allows,
//! chooses the one farthest (in summed distance) from everything chosen so far
//! and then continues from the chosen point followed by every other survivor.
//!
//! Every evaluated point is marked visited whether it was chosen or not, so a
//! point is scored at most once per search and the search always terminates.

use std::collections::HashSet;
use std::num::NonZeroUsize;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use glam::Vec3;

use crate::centroid::Centroid;
use crate::region::Region;
use crate::spatial::SpatialIndex;
use crate::terrain::TerrainOracle;

/// Candidates examined around each frontier point
pub const DEFAULT_NEIGHBOR_COUNT: usize = 10;

/// Fixed-point scale applied to summed distances before comparison
pub const FITNESS_SCALE: f32 = 1000.0;

/// Search limits
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacementParams {
    /// Nearest points examined per frontier (k)
    pub neighbor_count: NonZeroUsize,
    /// Stop once this many points are chosen
    pub max_count: usize,
    /// Candidates closer than this to a chosen point are rejected
    pub min_spacing: f32,
}

impl PlacementParams {
    pub fn new(max_count: usize) -> Self {
        Self {
            max_count,
            ..Default::default()
        }
    }

    pub fn with_min_spacing(mut self, min_spacing: f32) -> Self {
        self.min_spacing = min_spacing;
        self
    }

    pub fn with_neighbor_count(mut self, neighbor_count: NonZeroUsize) -> Self {
        self.neighbor_count = neighbor_count;
        self
    }
}

impl Default for PlacementParams {
    fn default() -> Self {
        Self {
            neighbor_count: NonZeroUsize::new(DEFAULT_NEIGHBOR_COUNT).unwrap_or(NonZeroUsize::MIN),
            max_count: 1,
            min_spacing: 0.0,
        }
    }
}

/// An accepted point and its spread score
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacementCandidate {
    pub position: Vec3,
    pub fitness: i64,
}

/// Summed distance from `position` to every chosen point, or to `seed` when
/// nothing has been chosen yet
pub fn fitness(position: Vec3, chosen: &[Vec3], seed: Vec3) -> i64 {
    let total: f32 = if chosen.is_empty() {
        position.distance(seed)
    } else {
        chosen.iter().map(|c| position.distance(*c)).sum()
    };
    (total * FITNESS_SCALE).round() as i64
}

/// Highest fitness wins; the first of equal candidates is kept
fn best_candidate(candidates: &[PlacementCandidate]) -> Option<usize> {
    let mut best: Option<usize> = None;
    for (i, candidate) in candidates.iter().enumerate() {
        match best {
            Some(b) if candidates[b].fitness >= candidate.fitness => {}
            _ => best = Some(i),
        }
    }
    best
}

/// Run a placement search over `points`
///
/// `index` must be built over `points` (ground-plane positions). `accept`
/// maps a raw point to the position to place, or rejects it with `None`.
/// Returns chosen positions in the order they were chosen.
pub fn place<F>(
    points: &[Vec3],
    index: &SpatialIndex,
    start: Vec3,
    params: &PlacementParams,
    mut accept: F,
) -> Vec<Vec3>
where
    F: FnMut(Vec3) -> Option<Vec3>,
{
    let mut chosen: Vec<Vec3> = Vec::new();
    if points.is_empty() {
        tracing::info!("placement region has no centroids");
        return chosen;
    }
    if params.max_count == 0 {
        return chosen;
    }

    let mut visited: HashSet<usize> = HashSet::new();
    let mut frontier: Vec<Vec3> = vec![start];

    while let Some(current) = frontier.pop() {
        if chosen.len() >= params.max_count {
            break;
        }

        let mut survivors: Vec<PlacementCandidate> = Vec::new();
        for neighbor in index.k_nearest_world(current, params.neighbor_count.get()) {
            if !visited.insert(neighbor) {
                continue;
            }
            let Some(position) = accept(points[neighbor]) else {
                continue;
            };
            if chosen.iter().any(|c| c.distance(position) < params.min_spacing) {
                continue;
            }
            survivors.push(PlacementCandidate {
                position,
                fitness: fitness(position, &chosen, start),
            });
        }

        let Some(best) = best_candidate(&survivors) else {
            continue;
        };
        chosen.push(survivors[best].position);
        tracing::trace!(
            chosen = chosen.len(),
            fitness = survivors[best].fitness,
            "placement chosen"
        );

        // Chosen point is explored first, then the remaining survivors in query order
        for (i, survivor) in survivors.iter().enumerate().rev() {
            if i != best {
                frontier.push(survivor.position);
            }
        }
        frontier.push(survivors[best].position);
    }

    tracing::debug!(
        chosen = chosen.len(),
        visited = visited.len(),
        max_count = params.max_count,
        "placement search finished"
    );

    chosen
}

/// Acceptance predicate over a terrain oracle and the world bounds
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TerrainRules {
    /// Distance kept from every world edge
    pub edge_buffer: f32,
    pub max_steepness_degrees: f32,
    pub min_height: Option<f32>,
    pub max_height: Option<f32>,
}

impl Default for TerrainRules {
    fn default() -> Self {
        Self {
            edge_buffer: 0.0,
            max_steepness_degrees: 90.0,
            min_height: None,
            max_height: None,
        }
    }
}

impl TerrainRules {
    /// Surface point under `candidate`, or `None` if any rule rejects it
    ///
    /// Oracle misses are always rejected.
    pub fn accept<O: TerrainOracle + ?Sized>(
        &self,
        oracle: &O,
        width: f32,
        height: f32,
        candidate: Vec3,
    ) -> Option<Vec3> {
        let (x, z) = (candidate.x, candidate.z);
        let b = self.edge_buffer;
        if x < b || x > width - b || z < b || z > height - b {
            return None;
        }

        let hit = oracle.try_get_surface_point(x, z).ok()?;
        if hit.steepness_degrees > self.max_steepness_degrees {
            return None;
        }
        if self.min_height.is_some_and(|min| hit.point.y < min) {
            return None;
        }
        if self.max_height.is_some_and(|max| hit.point.y > max) {
            return None;
        }
        Some(hit.point)
    }
}

/// What a placement represents
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PlacementKind {
    Vegetation(String),
    Landmark(String),
}

/// One record handed to spawning code
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Placement {
    pub position: Vec3,
    pub region_id: usize,
    pub kind: PlacementKind,
}

/// Vegetation then landmark placements for one region, in rule order
///
/// Each rule runs its own search from the region's core-cluster centre.
pub fn place_region_content<O: TerrainOracle + ?Sized>(
    region: &Region,
    centroids: &[Centroid],
    oracle: &O,
    width: f32,
    height: f32,
) -> Vec<Placement> {
    let points = region.positions(centroids);
    let mut placements = Vec::new();

    let mut run = |rules: TerrainRules, params: PlacementParams, kind: PlacementKind| {
        let positions = place(&points, &region.index, region.center, &params, |candidate| {
            rules.accept(oracle, width, height, candidate)
        });
        tracing::debug!(
            region = region.id,
            kind = ?kind,
            placed = positions.len(),
            "content placed"
        );
        placements.extend(positions.into_iter().map(|position| Placement {
            position,
            region_id: region.id,
            kind: kind.clone(),
        }));
    };

    for rule in &region.attributes.vegetation {
        run(rule.terrain_rules(), rule.params(), PlacementKind::Vegetation(rule.name.clone()));
    }
    for rule in &region.attributes.landmarks {
        run(rule.terrain_rules(), rule.params(), PlacementKind::Landmark(rule.name.clone()));
    }

    placements
}
