//! Lloyd's Relaxation on the unit square
//!
//! Each pass assigns a regular grid of `fidelity x fidelity` samples to their
//! nearest point and moves every point to the mean of its samples. Repeating
//! the pass drives the layout toward a centroidal Voronoi tessellation.
//!
//! [`LloydRelaxation`] runs one pass per [`step`](LloydRelaxation::step) so a
//! host can yield between passes. Stepping to completion and calling
//! [`lloyd_relaxation`] give identical output.

use std::time::Instant;

use glam::Vec2;

use crate::config::DEFAULT_LLOYD_FIDELITY;
use crate::spatial::SpatialIndex;

/// Divisor floor for points that received no samples
const EMPTY_CELL_EPSILON: f32 = 1e-6;

/// Options for Lloyd's relaxation algorithm
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LloydOptions {
    /// Number of passes to run
    pub iterations: usize,
    /// Samples per axis of the assignment grid
    pub fidelity: usize,
    /// Stop early once the largest move in a pass falls below this value
    ///
    /// Set to 0.0 to always run every pass.
    pub convergence_threshold: f32,
}

impl Default for LloydOptions {
    fn default() -> Self {
        Self {
            iterations: 3,
            fidelity: DEFAULT_LLOYD_FIDELITY,
            convergence_threshold: 0.0,
        }
    }
}

/// Outcome of one relaxation pass
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LloydStep {
    /// 1-based pass number
    pub iteration: usize,
    /// Largest distance any point moved during the pass
    pub max_displacement: f32,
}

/// Resumable relaxation state
#[derive(Debug, Clone)]
pub struct LloydRelaxation {
    points: Vec<Vec2>,
    options: LloydOptions,
    completed: usize,
    converged: bool,
}

impl LloydRelaxation {
    pub fn new(points: Vec<Vec2>, options: LloydOptions) -> Self {
        Self {
            points,
            options,
            completed: 0,
            converged: false,
        }
    }

    /// Passes run so far
    #[inline]
    pub fn completed(&self) -> usize {
        self.completed
    }

    /// `true` once every pass ran or the displacement fell below the threshold
    #[inline]
    pub fn is_finished(&self) -> bool {
        self.converged || self.completed >= self.options.iterations || self.points.is_empty()
    }

    #[inline]
    pub fn points(&self) -> &[Vec2] {
        &self.points
    }

    pub fn into_points(self) -> Vec<Vec2> {
        self.points
    }

    /// Run one pass, `None` once finished
    pub fn step(&mut self) -> Option<LloydStep> {
        if self.is_finished() {
            return None;
        }

        let pass_start = Instant::now();
        let (points, max_displacement) = relax_once(&self.points, self.options.fidelity);
        self.points = points;
        self.completed += 1;

        let threshold = self.options.convergence_threshold;
        if threshold > 0.0 && max_displacement < threshold {
            self.converged = true;
            tracing::debug!(
                iteration = self.completed,
                max_displacement,
                threshold,
                "Lloyd relaxation converged"
            );
        }

        tracing::debug!(
            iteration = self.completed,
            max_displacement,
            elapsed = ?pass_start.elapsed(),
            "Lloyd pass finished"
        );

        Some(LloydStep {
            iteration: self.completed,
            max_displacement,
        })
    }
}

impl Iterator for LloydRelaxation {
    type Item = LloydStep;

    fn next(&mut self) -> Option<LloydStep> {
        self.step()
    }
}

/// Apply Lloyd's Relaxation
///
/// # Arguments
///
/// * `points` - Initial points in the unit square
/// * `iterations` - Number of passes
/// * `fidelity` - Samples per axis of the assignment grid (default 100)
///
/// # Returns
///
/// Relaxed points, one per input point, in input order
pub fn lloyd_relaxation(points: Vec<Vec2>, iterations: usize, fidelity: usize) -> Vec<Vec2> {
    let options = LloydOptions {
        iterations,
        fidelity,
        ..Default::default()
    };
    lloyd_relaxation_with_options(points, options)
}

/// Apply Lloyd's Relaxation with custom options
pub fn lloyd_relaxation_with_options(points: Vec<Vec2>, options: LloydOptions) -> Vec<Vec2> {
    let total_start = Instant::now();
    let count = points.len();
    let mut relaxation = LloydRelaxation::new(points, options);
    while relaxation.step().is_some() {}
    let passes = relaxation.completed();

    tracing::debug!(
        points = count,
        passes,
        max_passes = options.iterations,
        elapsed = ?total_start.elapsed(),
        "Lloyd relaxation finished"
    );

    relaxation.into_points()
}

/// One relaxation pass; returns the new points and the largest move
///
/// Samples are visited row by row (`y` outer, `x` inner) at cell centres
/// `((i + 0.5) / fidelity)`.
fn relax_once(points: &[Vec2], fidelity: usize) -> (Vec<Vec2>, f32) {
    let index = SpatialIndex::new(points);
    let mut sums = vec![Vec2::ZERO; points.len()];
    let mut counts = vec![0u32; points.len()];

    let step = 1.0 / fidelity as f32;
    for sy in 0..fidelity {
        let y = (sy as f32 + 0.5) * step;
        for sx in 0..fidelity {
            let sample = Vec2::new((sx as f32 + 0.5) * step, y);
            if let Some(owner) = index.nearest(sample) {
                sums[owner] += sample;
                counts[owner] += 1;
            }
        }
    }

    let mut max_displacement = 0.0f32;
    let relaxed = points
        .iter()
        .zip(sums.iter().zip(&counts))
        .map(|(&old, (&sum, &count))| {
            if count == 0 {
                return old;
            }
            let new = sum / (count as f32).max(EMPTY_CELL_EPSILON);
            max_displacement = max_displacement.max(new.distance(old));
            new
        })
        .collect();

    (relaxed, max_displacement)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::points::generate_centroids;

    /// Mean distance from each grid sample to its nearest point
    fn quantization_error(points: &[Vec2]) -> f32 {
        let index = SpatialIndex::new(points);
        let mut total = 0.0;
        let n = 50;
        for y in 0..n {
            for x in 0..n {
                let sample = Vec2::new((x as f32 + 0.5) / n as f32, (y as f32 + 0.5) / n as f32);
                let owner = index.nearest(sample).unwrap();
                total += sample.distance(points[owner]);
            }
        }
        total / (n * n) as f32
    }

    #[test]
    fn test_lloyd_relaxation() {
        let points = generate_centroids(100, 42, 0.1, 0.1);
        let relaxed = lloyd_relaxation(points, 3, 50);

        assert_eq!(relaxed.len(), 100);
        for p in &relaxed {
            assert!((0.0..=1.0).contains(&p.x) && (0.0..=1.0).contains(&p.y));
        }
    }

    #[test]
    fn test_lloyd_relaxation_determinism() {
        let relaxed1 = lloyd_relaxation(generate_centroids(50, 12345, 0.1, 0.1), 2, 100);
        let relaxed2 = lloyd_relaxation(generate_centroids(50, 12345, 0.1, 0.1), 2, 100);
        assert_eq!(relaxed1, relaxed2);
    }

    #[test]
    fn test_relaxation_spreads_points() {
        // Points start crowded into the middle; relaxation should spread them
        let points = generate_centroids(40, 9, 0.4, 0.4);
        let before = quantization_error(&points);
        let after = quantization_error(&lloyd_relaxation(points, 5, 60));
        assert!(after < before, "error before {} after {}", before, after);
    }

    #[test]
    fn test_zero_iterations_is_identity() {
        let points = generate_centroids(30, 1, 0.1, 0.1);
        assert_eq!(lloyd_relaxation(points.clone(), 0, 100), points);
    }

    #[test]
    fn test_point_without_samples_keeps_position() {
        // With a 1x1 grid only the point nearest (0.5, 0.5) receives a sample
        let points = vec![Vec2::new(0.45, 0.5), Vec2::new(0.9, 0.9)];
        let relaxed = lloyd_relaxation(points.clone(), 1, 1);
        assert_eq!(relaxed[0], Vec2::new(0.5, 0.5));
        assert_eq!(relaxed[1], points[1]);
    }

    #[test]
    fn test_stepping_matches_batch() {
        let points = generate_centroids(60, 77, 0.1, 0.1);
        let options = LloydOptions {
            iterations: 4,
            fidelity: 40,
            convergence_threshold: 0.0,
        };

        let mut stepper = LloydRelaxation::new(points.clone(), options);
        let steps: Vec<LloydStep> = stepper.by_ref().collect();
        assert_eq!(steps.len(), 4);
        assert_eq!(steps[3].iteration, 4);
        assert!(stepper.is_finished());

        assert_eq!(stepper.into_points(), lloyd_relaxation_with_options(points, options));
    }

    #[test]
    fn test_convergence_stops_early() {
        let points = generate_centroids(20, 5, 0.1, 0.1);
        let options = LloydOptions {
            iterations: 50,
            fidelity: 20,
            convergence_threshold: 0.5,
        };
        let mut stepper = LloydRelaxation::new(points, options);
        while stepper.step().is_some() {}
        assert_eq!(stepper.completed(), 1);
    }

    #[test]
    fn test_lloyd_options_default() {
        let options = LloydOptions::default();
        assert_eq!(options.fidelity, 100);
        assert_eq!(options.convergence_threshold, 0.0);
    }
}
