//! Seed-driven plane tessellation, density-clustered regions and spaced
//! content placement
//!
//! A standalone library that turns a 32-bit seed into a relaxed tessellation
//! of a rectangular world, groups its cells into a few ranked regions and
//! picks well-spread content positions inside each region. Terrain is
//! supplied by the host through [`TerrainOracle`].
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use seeded_regions::*;
//!
//! let config = WorldConfigBuilder::new()
//!     .seed(42)
//!     .dimensions(1000.0, 1000.0).unwrap()
//!     .centroid_count(400).unwrap()
//!     .lloyd_iterations(0).unwrap()
//!     .eps_ratio(0.04).unwrap()
//!     .min_points(5)
//!     .region_count(4).unwrap()
//!     .build().unwrap();
//!
//! let terrain = HeightfieldTerrain::from_source(
//!     &NoiseSource::Fractal(FractalParams::default()),
//!     128,
//!     config.seed().derive(1),
//!     config.width,
//!     config.height,
//!     60.0,
//! );
//!
//! let attributes = vec![RegionAttributes::named("plains", [0.4, 0.8, 0.3, 1.0]); 4];
//! let world = World::generate(config, &terrain, &attributes).unwrap();
//! println!("{} regions, {} placements", world.regions().len(), world.placements().len());
//! ```
//!
//! # Features
//!
//! - `serde`: Enables serialization support for configuration, centroids,
//!   region attributes and placements

// Modules
pub mod error;
pub mod config;
pub mod noise;
pub mod terrain;
pub mod spatial;
pub mod generation;
pub mod centroid;
pub mod cluster;
pub mod region;
pub mod placement;
pub mod events;
pub mod world;

// Re-export core types for convenience
pub use error::{GenerationError, Result};
pub use config::{Seed, WorldConfig, WorldConfigBuilder};
pub use noise::{
    Combinator, FalloffParams, FalloffShape, FractalParams, NoiseField, NoiseSource, NormalizeMode,
};
pub use terrain::{FlatTerrain, HeightfieldTerrain, SurfaceHit, TerrainMiss, TerrainOracle};
pub use spatial::SpatialIndex;
pub use generation::{LloydOptions, LloydRelaxation, Tessellation};
pub use centroid::{Centroid, Classification, NOISE_CLUSTER};
pub use cluster::{Cluster, DbscanParams};
pub use region::{LandmarkRule, Region, RegionAttributes, VegetationRule};
pub use placement::{place, Placement, PlacementKind, PlacementParams, TerrainRules};
pub use events::{GenerationEvent, GenerationObserver, NoopObserver};
pub use world::World;

// Re-export glam vectors for convenience
pub use glam::{Vec2, Vec3};
