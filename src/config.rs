//! World generation configuration and builder
//!
//! The configuration is the entire input surface of the generator: the same
//! configuration, terrain and attribute assets always reproduce the same world.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{GenerationError, Result};

/// Default number of samples per axis used by Lloyd relaxation
pub const DEFAULT_LLOYD_FIDELITY: usize = 100;

/// Default DBScan radius as a fraction of `max(width, height)`
pub const DEFAULT_EPS_RATIO: f32 = 0.15;

/// Default number of major regions
pub const DEFAULT_REGION_COUNT: usize = 4;

/// A 32-bit generation seed
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Seed(pub u32);

impl Seed {
    /// Parse a user supplied seed string
    ///
    /// Anything that is not a decimal `i32`/`u32` is replaced by a freshly
    /// drawn random seed. Negative values keep their two's complement bits.
    pub fn parse_or_random(text: &str) -> Self {
        let trimmed = text.trim();
        if let Ok(value) = trimmed.parse::<u32>() {
            return Seed(value);
        }
        if let Ok(value) = trimmed.parse::<i32>() {
            return Seed(value as u32);
        }

        let seed = rand::random::<u32>();
        tracing::warn!(input = %text, seed, "seed is not numeric, using a random seed");
        Seed(seed)
    }

    /// Derive a per-component seed
    #[inline]
    pub fn derive(self, salt: u32) -> u32 {
        self.0.wrapping_add(salt)
    }
}

impl From<u32> for Seed {
    fn from(value: u32) -> Self {
        Seed(value)
    }
}

/// Configuration for one deterministic generation run
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorldConfig {
    /// Seed every component derives its generator from
    pub seed: u32,

    /// World extent along x
    pub width: f32,

    /// World extent along z
    pub height: f32,

    /// Number of tessellation centroids; fixed for the lifetime of a world
    pub centroid_count: usize,

    /// Fraction of the unit square kept free of centroids on the left/right
    pub horizontal_buffer: f32,

    /// Fraction of the unit square kept free of centroids on the top/bottom
    pub vertical_buffer: f32,

    /// Number of Lloyd relaxation passes
    ///
    /// - 0: raw random scatter
    /// - 2-3: visibly more regular cells
    /// - 5+: close to a centroidal tessellation
    pub lloyd_iterations: usize,

    /// Samples per axis of the relaxation grid (`fidelity²` samples per pass)
    pub lloyd_fidelity: usize,

    /// DBScan neighbourhood radius as a fraction of `max(width, height)`
    pub eps_ratio: f32,

    /// Neighbour count at which a centroid becomes a core point
    pub min_points: usize,

    /// Number of major regions (K)
    pub region_count: usize,
}

impl WorldConfig {
    /// Absolute DBScan radius in world units
    #[inline]
    pub fn eps(&self) -> f32 {
        self.eps_ratio * self.width.max(self.height)
    }

    /// The world seed
    #[inline]
    pub fn seed(&self) -> Seed {
        Seed(self.seed)
    }
}

impl Default for WorldConfig {
    fn default() -> Self {
        WorldConfigBuilder::new()
            .seed(0)
            .build()
            .unwrap_or_else(|_| unreachable!("default configuration is valid"))
    }
}

/// Builder for [`WorldConfig`] with validation
///
/// # Example
///
/// ```rust
/// use seeded_regions::*;
///
/// let config = WorldConfigBuilder::new()
///     .seed(42)
///     .dimensions(512.0, 512.0).unwrap()
///     .centroid_count(50).unwrap()
///     .min_points(10)
///     .build()
///     .unwrap();
///
/// assert_eq!(config.eps(), 0.15 * 512.0);
/// ```
#[derive(Debug, Clone)]
pub struct WorldConfigBuilder {
    seed: Option<u32>,
    width: f32,
    height: f32,
    centroid_count: usize,
    horizontal_buffer: f32,
    vertical_buffer: f32,
    lloyd_iterations: usize,
    lloyd_fidelity: usize,
    eps_ratio: f32,
    min_points: usize,
    region_count: usize,
}

impl WorldConfigBuilder {
    /// Create a new builder with default values
    ///
    /// Defaults:
    /// - seed: random
    /// - dimensions: 1000 x 1000
    /// - centroid_count: 200
    /// - buffers: 0.1 on both axes
    /// - lloyd_iterations: 3, lloyd_fidelity: 100
    /// - eps_ratio: 0.15, min_points: 10
    /// - region_count: 4
    pub fn new() -> Self {
        Self {
            seed: None,
            width: 1000.0,
            height: 1000.0,
            centroid_count: 200,
            horizontal_buffer: 0.1,
            vertical_buffer: 0.1,
            lloyd_iterations: 3,
            lloyd_fidelity: DEFAULT_LLOYD_FIDELITY,
            eps_ratio: DEFAULT_EPS_RATIO,
            min_points: 10,
            region_count: DEFAULT_REGION_COUNT,
        }
    }

    /// Set the generation seed
    pub fn seed(mut self, seed: u32) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set the world extent
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` unless both extents are finite and positive
    pub fn dimensions(mut self, width: f32, height: f32) -> Result<Self> {
        if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
            return Err(GenerationError::InvalidConfig(format!(
                "world dimensions must be positive (got {} x {})",
                width, height
            )));
        }
        self.width = width;
        self.height = height;
        Ok(self)
    }

    /// Set the number of tessellation centroids
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if `count` is zero
    pub fn centroid_count(mut self, count: usize) -> Result<Self> {
        if count == 0 {
            return Err(GenerationError::InvalidConfig(
                "centroid count must be at least 1".into(),
            ));
        }
        self.centroid_count = count;
        Ok(self)
    }

    /// Set the border fractions kept free of centroids
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` unless both ratios lie in `[0, 0.5)`
    pub fn buffers(mut self, horizontal: f32, vertical: f32) -> Result<Self> {
        for ratio in [horizontal, vertical] {
            if !(0.0..0.5).contains(&ratio) {
                return Err(GenerationError::InvalidConfig(format!(
                    "buffer ratio must be in [0, 0.5) (got {})",
                    ratio
                )));
            }
        }
        self.horizontal_buffer = horizontal;
        self.vertical_buffer = vertical;
        Ok(self)
    }

    /// Set the number of Lloyd relaxation passes
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if iterations > 50
    pub fn lloyd_iterations(mut self, iterations: usize) -> Result<Self> {
        if iterations > 50 {
            return Err(GenerationError::InvalidConfig(format!(
                "Lloyd iterations must be <= 50 (got {})",
                iterations
            )));
        }
        self.lloyd_iterations = iterations;
        Ok(self)
    }

    /// Set the relaxation sampling grid resolution
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if fidelity is zero
    pub fn lloyd_fidelity(mut self, fidelity: usize) -> Result<Self> {
        if fidelity == 0 {
            return Err(GenerationError::InvalidConfig(
                "Lloyd fidelity must be at least 1".into(),
            ));
        }
        self.lloyd_fidelity = fidelity;
        Ok(self)
    }

    /// Set the DBScan radius as a fraction of the larger world extent
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if the ratio is not positive
    pub fn eps_ratio(mut self, ratio: f32) -> Result<Self> {
        if !(ratio.is_finite() && ratio > 0.0) {
            return Err(GenerationError::InvalidConfig(format!(
                "eps ratio must be positive (got {})",
                ratio
            )));
        }
        self.eps_ratio = ratio;
        Ok(self)
    }

    /// Set the neighbour count required for a core point
    pub fn min_points(mut self, min_points: usize) -> Self {
        self.min_points = min_points;
        self
    }

    /// Set the number of major regions
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if `count` is zero
    pub fn region_count(mut self, count: usize) -> Result<Self> {
        if count == 0 {
            return Err(GenerationError::InvalidConfig(
                "region count must be at least 1".into(),
            ));
        }
        self.region_count = count;
        Ok(self)
    }

    /// Build the configuration
    ///
    /// If no seed was provided, a random one is drawn.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if the centroid count does not exceed the
    /// region count; clustering always needs several centroids per region.
    pub fn build(self) -> Result<WorldConfig> {
        if self.centroid_count <= self.region_count {
            return Err(GenerationError::InvalidConfig(format!(
                "centroid count ({}) must exceed region count ({})",
                self.centroid_count, self.region_count
            )));
        }

        Ok(WorldConfig {
            seed: self.seed.unwrap_or_else(rand::random),
            width: self.width,
            height: self.height,
            centroid_count: self.centroid_count,
            horizontal_buffer: self.horizontal_buffer,
            vertical_buffer: self.vertical_buffer,
            lloyd_iterations: self.lloyd_iterations,
            lloyd_fidelity: self.lloyd_fidelity,
            eps_ratio: self.eps_ratio,
            min_points: self.min_points,
            region_count: self.region_count,
        })
    }
}

impl Default for WorldConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let config = WorldConfigBuilder::new().seed(7).build().unwrap();
        assert_eq!(config.seed, 7);
        assert_eq!(config.lloyd_fidelity, 100);
        assert_eq!(config.region_count, 4);
        assert_eq!(config.eps(), 150.0);
    }

    #[test]
    fn test_eps_uses_larger_extent() {
        let config = WorldConfigBuilder::new()
            .seed(1)
            .dimensions(200.0, 800.0)
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(config.eps(), 0.15 * 800.0);
    }

    #[test]
    fn test_builder_rejects_invalid_values() {
        assert!(WorldConfigBuilder::new().centroid_count(0).is_err());
        assert!(WorldConfigBuilder::new().dimensions(0.0, 10.0).is_err());
        assert!(WorldConfigBuilder::new().dimensions(10.0, f32::NAN).is_err());
        assert!(WorldConfigBuilder::new().buffers(0.5, 0.1).is_err());
        assert!(WorldConfigBuilder::new().buffers(0.1, -0.1).is_err());
        assert!(WorldConfigBuilder::new().lloyd_iterations(51).is_err());
        assert!(WorldConfigBuilder::new().lloyd_fidelity(0).is_err());
        assert!(WorldConfigBuilder::new().eps_ratio(0.0).is_err());
        assert!(WorldConfigBuilder::new().region_count(0).is_err());
    }

    #[test]
    fn test_centroid_count_must_exceed_region_count() {
        let result = WorldConfigBuilder::new()
            .centroid_count(4)
            .unwrap()
            .region_count(4)
            .unwrap()
            .build();
        assert!(matches!(result, Err(GenerationError::InvalidConfig(_))));
    }

    #[test]
    fn test_seed_parse() {
        assert_eq!(Seed::parse_or_random("42"), Seed(42));
        assert_eq!(Seed::parse_or_random(" 42 "), Seed(42));
        assert_eq!(Seed::parse_or_random("-1"), Seed(u32::MAX));
    }

    #[test]
    fn test_seed_parse_fallback_does_not_panic() {
        let _ = Seed::parse_or_random("not a seed");
        let _ = Seed::parse_or_random("");
    }

    #[test]
    fn test_seed_derive_wraps() {
        assert_eq!(Seed(u32::MAX).derive(1), 0);
        assert_eq!(Seed(10).derive(5), 15);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_config_serialization() {
        let config = WorldConfigBuilder::new().seed(12345).build().unwrap();
        let json = serde_json::to_string(&config).unwrap();
        let restored: WorldConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config, restored);
    }
}
