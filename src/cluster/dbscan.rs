//! DBScan adapted to a fixed, bounded centroid set
//!
//! # Algorithm
//!
//! 1. Classify: radius-query every centroid at `eps`. Dense centroids
//!    become core and promote unclassified neighbours to border; sparse ones
//!    become border when a neighbour is already core.
//! 2. Merge: walk core centroids in index order. Each unclustered core point
//!    opens a cluster, then one scan over the later core points adds every
//!    unclustered one that is density-connected to the seed: a core neighbour
//!    of the seed, or a point sharing a core neighbour with it. Connection is
//!    judged against the seed only, so a long dense strip splits into several
//!    local clusters.
//! 3. Attach: every border centroid joins the cluster of its nearest core
//!    centroid on the ground plane (brute force, not limited to `eps`).
//! 4. Rank: clusters are renumbered by descending size, ties in discovery
//!    order. Everything left over is noise and goes to cluster 0.

use std::cmp::Ordering;
use std::time::Instant;

use crate::centroid::{Centroid, Classification, NOISE_CLUSTER};
use crate::spatial::{ground, SpatialIndex};

use super::Cluster;

/// Neighbourhood parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DbscanParams {
    /// Absolute neighbourhood radius in world units
    pub eps: f32,
    /// Neighbours (excluding the centroid itself) needed for a core point
    pub min_points: usize,
}

/// Cluster `centroids` in place
///
/// `index` must be built over the same centroids' world positions. Returns
/// the clusters with the noise cluster at position 0 and real clusters
/// ordered by descending size; `clusters[i].id == i` and every centroid's
/// `cluster_index` points at its cluster.
pub fn classify(
    centroids: &mut [Centroid],
    index: &SpatialIndex,
    params: DbscanParams,
) -> Vec<Cluster> {
    let start = Instant::now();

    classify_points(centroids, index, params);
    let mut assignment = merge_core_points(centroids);
    attach_border_points(centroids, &mut assignment);

    let clusters = rank_clusters(centroids, assignment);

    let core = count(centroids, Classification::Core);
    let border = count(centroids, Classification::Border);
    let noise = count(centroids, Classification::Noise);
    tracing::info!(
        clusters = clusters.len() - 1,
        core,
        border,
        noise,
        eps = params.eps,
        min_points = params.min_points,
        elapsed = ?start.elapsed(),
        "density clustering complete"
    );
    if core == 0 {
        tracing::info!("no core centroids; only the noise cluster exists");
    }

    clusters
}

fn count(centroids: &[Centroid], classification: Classification) -> usize {
    centroids
        .iter()
        .filter(|c| c.classification == classification)
        .count()
}

/// Pass 1: neighbour sets and core/border classification
fn classify_points(centroids: &mut [Centroid], index: &SpatialIndex, params: DbscanParams) {
    for i in 0..centroids.len() {
        let neighbors: Vec<usize> = index
            .within_radius_world(centroids[i].world_position, params.eps)
            .into_iter()
            .filter(|&n| n != i)
            .collect();

        if neighbors.len() >= params.min_points {
            centroids[i].classification = Classification::Core;
            for &n in &neighbors {
                if centroids[n].classification == Classification::Unclassified {
                    centroids[n].classification = Classification::Border;
                }
            }
        } else if centroids[i].classification == Classification::Unclassified
            && neighbors
                .iter()
                .any(|&n| centroids[n].classification == Classification::Core)
        {
            centroids[i].classification = Classification::Border;
        }

        centroids[i].neighbors = neighbors.into_iter().collect();
    }
}

/// Pass 2: group core points; returns per-centroid cluster number and the
/// member lists in discovery order
fn merge_core_points(centroids: &[Centroid]) -> Assignment {
    let cores: Vec<usize> = centroids
        .iter()
        .filter(|c| c.classification == Classification::Core)
        .map(|c| c.index)
        .collect();

    let mut assignment = Assignment {
        owner: vec![None; centroids.len()],
        groups: Vec::new(),
    };

    for (position, &seed) in cores.iter().enumerate() {
        if assignment.owner[seed].is_some() {
            continue;
        }

        let group = assignment.groups.len();
        assignment.owner[seed] = Some(group);
        let mut members = vec![seed];

        let reach: Vec<usize> = centroids[seed]
            .neighbors
            .iter()
            .copied()
            .filter(|&n| centroids[n].classification == Classification::Core)
            .collect();

        for &candidate in &cores[position + 1..] {
            if assignment.owner[candidate].is_some() {
                continue;
            }
            if density_connected(&reach, &centroids[candidate]) {
                assignment.owner[candidate] = Some(group);
                members.push(candidate);
            }
        }

        assignment.groups.push(members);
    }

    assignment
}

/// `candidate` is one of the seed's core neighbours or shares one with it
fn density_connected(seed_core_neighbors: &[usize], candidate: &Centroid) -> bool {
    seed_core_neighbors
        .iter()
        .any(|&n| n == candidate.index || candidate.neighbors.contains(&n))
}

/// Pass 3: border points join the cluster of their nearest core point
fn attach_border_points(centroids: &[Centroid], assignment: &mut Assignment) {
    let cores: Vec<usize> = centroids
        .iter()
        .filter(|c| c.classification == Classification::Core)
        .map(|c| c.index)
        .collect();

    for border in centroids
        .iter()
        .filter(|c| c.classification == Classification::Border)
    {
        if assignment.owner[border.index].is_some() {
            continue;
        }

        let position = ground(border.world_position);
        let nearest = cores.iter().copied().min_by(|&a, &b| {
            let da = position.distance_squared(ground(centroids[a].world_position));
            let db = position.distance_squared(ground(centroids[b].world_position));
            da.total_cmp(&db)
        });

        if let Some(group) = nearest.and_then(|core| assignment.owner[core]) {
            assignment.owner[border.index] = Some(group);
            assignment.groups[group].push(border.index);
        }
    }
}

/// Pass 4: rank by size, renumber and build cluster records
fn rank_clusters(centroids: &mut [Centroid], assignment: Assignment) -> Vec<Cluster> {
    let mut groups = assignment.groups;
    groups.sort_by(by_member_count_desc);

    let mut noise = Vec::new();
    for centroid in centroids.iter_mut() {
        if assignment.owner[centroid.index].is_none() {
            centroid.classification = Classification::Noise;
            centroid.cluster_index = NOISE_CLUSTER;
            noise.push(centroid.index);
        }
    }

    for (rank, members) in groups.iter().enumerate() {
        for &m in members {
            centroids[m].cluster_index = rank + 1;
        }
    }

    let mut clusters = Vec::with_capacity(groups.len() + 1);
    clusters.push(Cluster::new(NOISE_CLUSTER, noise, centroids));
    for (rank, members) in groups.into_iter().enumerate() {
        clusters.push(Cluster::new(rank + 1, members, centroids));
    }
    clusters
}

/// Larger groups first; `sort_by` is stable so equal sizes keep discovery order
fn by_member_count_desc(a: &Vec<usize>, b: &Vec<usize>) -> Ordering {
    b.len().cmp(&a.len())
}

struct Assignment {
    owner: Vec<Option<usize>>,
    groups: Vec<Vec<usize>>,
}
