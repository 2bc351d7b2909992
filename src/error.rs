//! Error types for region generation

/// Errors that abort a generation run
///
/// Degenerate but valid outcomes (no core points, an empty placement
/// frontier, a terrain miss) are not errors and never surface here.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GenerationError {
    /// Configuration validation failed
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Clustering produced fewer non-noise clusters than regions requested
    #[error("found {found} clusters but {required} regions were requested")]
    InsufficientClusters {
        /// Non-noise clusters available
        found: usize,
        /// Configured region count
        required: usize,
    },

    /// Fewer attribute sets were supplied than regions requested
    #[error("found {found} region attribute sets but {required} are required")]
    MissingAttributes {
        /// Attribute sets supplied
        found: usize,
        /// Configured region count
        required: usize,
    },

    /// Requested region ID does not exist
    #[error("region not found: {0}")]
    RegionNotFound(usize),
}

/// Result type alias for generation operations
pub type Result<T> = std::result::Result<T, GenerationError>;
