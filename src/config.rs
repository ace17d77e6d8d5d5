//! Diagram configuration and builder
//!
//! Every tolerance used by the kernel lives here so that two runs with the
//! same sites and the same configuration produce the same diagram.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Result, VoronoiError};

/// Default circumcenter merge tolerance (epsilon0)
pub const DEFAULT_VERTEX_EPSILON: f64 = 1e-8;
/// Default boundary intersection tolerance (epsilon1)
pub const DEFAULT_BOUNDARY_EPSILON: f64 = 1e-6;
/// Default relative tolerance of the orientation and in-circle predicates
pub const DEFAULT_PREDICATE_EPSILON: f64 = 1e-12;
/// Default padding used when the clip rectangle is derived from the sites
pub const DEFAULT_MARGIN: f64 = 1.0;
/// Default seed for the insertion-order shuffle
pub const DEFAULT_SEED: u64 = 0x5EED_D1A6_0A11;

/// Configuration for Delaunay / Voronoi construction
///
/// # Example
///
/// ```rust
/// use planar_voronoi::*;
///
/// let config = DiagramConfigBuilder::new()
///     .vertex_epsilon(1e-9)
///     .unwrap()
///     .margin(2.0)
///     .unwrap()
///     .build()
///     .unwrap();
///
/// assert_eq!(config.margin, 2.0);
/// ```
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiagramConfig {
    /// Circumcenters closer than this collapse into one Voronoi vertex (epsilon0)
    ///
    /// Sites closer than this to an already inserted site are dropped as
    /// duplicates and get an empty polygon.
    pub vertex_epsilon: f64,

    /// Clip tolerance (epsilon1)
    ///
    /// A rectangle vertex within this distance of a cell boundary counts as
    /// lying on it, and consecutive output vertices closer than this merge.
    pub boundary_epsilon: f64,

    /// Relative tolerance of the orientation and in-circle tests
    ///
    /// Determinants smaller than `predicate_epsilon` times the sum of the
    /// absolute values of their terms are treated as zero.
    pub predicate_epsilon: f64,

    /// Padding added on every side when the rectangle is computed from the sites
    pub margin: f64,

    /// Seed for shuffling the insertion order
    ///
    /// - `Some(seed)`: randomized incremental insertion (expected O(n log n))
    /// - `None`: sites are inserted in input order after the lexicographic swap
    pub seed: Option<u64>,
}

impl Default for DiagramConfig {
    fn default() -> Self {
        Self {
            vertex_epsilon: DEFAULT_VERTEX_EPSILON,
            boundary_epsilon: DEFAULT_BOUNDARY_EPSILON,
            predicate_epsilon: DEFAULT_PREDICATE_EPSILON,
            margin: DEFAULT_MARGIN,
            seed: Some(DEFAULT_SEED),
        }
    }
}

impl DiagramConfig {
    /// Check every tolerance, for configs assembled without the builder
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` naming the first offending field
    pub fn validate(&self) -> Result<()> {
        check_tolerance("vertex_epsilon", self.vertex_epsilon)?;
        check_tolerance("boundary_epsilon", self.boundary_epsilon)?;
        check_tolerance("margin", self.margin)?;
        if check_tolerance("predicate_epsilon", self.predicate_epsilon)? >= 1.0 {
            return Err(VoronoiError::InvalidConfig(format!(
                "predicate_epsilon must be < 1 (got {})",
                self.predicate_epsilon
            )));
        }
        Ok(())
    }
}

/// Builder for creating DiagramConfig with validation
#[derive(Debug, Clone)]
pub struct DiagramConfigBuilder {
    config: DiagramConfig,
}

impl DiagramConfigBuilder {
    /// Create a new builder with default values
    ///
    /// Defaults:
    /// - vertex_epsilon: 1e-8
    /// - boundary_epsilon: 1e-6
    /// - predicate_epsilon: 1e-12
    /// - margin: 1.0
    /// - seed: fixed default seed
    pub fn new() -> Self {
        Self {
            config: DiagramConfig::default(),
        }
    }

    /// Set the circumcenter merge tolerance (epsilon0)
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if the value is negative or not finite
    pub fn vertex_epsilon(mut self, epsilon: f64) -> Result<Self> {
        self.config.vertex_epsilon = check_tolerance("vertex_epsilon", epsilon)?;
        Ok(self)
    }

    /// Set the boundary intersection tolerance (epsilon1)
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if the value is negative or not finite
    pub fn boundary_epsilon(mut self, epsilon: f64) -> Result<Self> {
        self.config.boundary_epsilon = check_tolerance("boundary_epsilon", epsilon)?;
        Ok(self)
    }

    /// Set the relative predicate tolerance
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if the value is negative, not finite, or >= 1
    pub fn predicate_epsilon(mut self, epsilon: f64) -> Result<Self> {
        let epsilon = check_tolerance("predicate_epsilon", epsilon)?;
        if epsilon >= 1.0 {
            return Err(VoronoiError::InvalidConfig(format!(
                "predicate_epsilon must be < 1 (got {})",
                epsilon
            )));
        }
        self.config.predicate_epsilon = epsilon;
        Ok(self)
    }

    /// Set the padding used for auto-computed bounds
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if the margin is negative or not finite
    pub fn margin(mut self, margin: f64) -> Result<Self> {
        self.config.margin = check_tolerance("margin", margin)?;
        Ok(self)
    }

    /// Shuffle the insertion order with the given seed
    pub fn seed(mut self, seed: u64) -> Self {
        self.config.seed = Some(seed);
        self
    }

    /// Insert sites in input order (only the lexicographic swap is applied)
    pub fn sequential(mut self) -> Self {
        self.config.seed = None;
        self
    }

    pub fn build(self) -> Result<DiagramConfig> {
        Ok(self.config)
    }
}

impl Default for DiagramConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn check_tolerance(name: &str, value: f64) -> Result<f64> {
    if !value.is_finite() || value < 0.0 {
        return Err(VoronoiError::InvalidConfig(format!(
            "{} must be finite and >= 0 (got {})",
            name, value
        )));
    }
    Ok(value)
}
