//! Error types for diagram construction

use std::fmt;

/// Usage errors reported at the public boundary
///
/// Geometric degeneracies (collinear sites, coincident circumcenters,
/// boundary-tangent clips) are resolved internally and never show up here.
#[derive(Debug, Clone, PartialEq)]
pub enum VoronoiError {
    /// Fewer than two sites were supplied
    InsufficientSites(usize),
    /// An output buffer does not have one slot per site
    LengthMismatch {
        /// Number of sites
        expected: usize,
        /// Length of the caller-supplied buffer
        actual: usize,
    },
    /// The clip rectangle is empty or not finite
    InvalidBounds(String),
    /// Configuration validation failed
    InvalidConfig(String),
}

impl fmt::Display for VoronoiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VoronoiError::InsufficientSites(n) => {
                write!(f, "insufficient sites: need at least 2, got {}", n)
            }
            VoronoiError::LengthMismatch { expected, actual } => {
                write!(
                    f,
                    "length mismatch: expected one output slot per site ({}), got {}",
                    expected, actual
                )
            }
            VoronoiError::InvalidBounds(msg) => write!(f, "invalid bounds: {}", msg),
            VoronoiError::InvalidConfig(msg) => write!(f, "invalid configuration: {}", msg),
        }
    }
}

impl std::error::Error for VoronoiError {}

/// Result type alias for diagram operations
pub type Result<T> = std::result::Result<T, VoronoiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        assert_eq!(
            VoronoiError::InsufficientSites(1).to_string(),
            "insufficient sites: need at least 2, got 1"
        );
        let err = VoronoiError::LengthMismatch { expected: 9, actual: 8 };
        assert!(err.to_string().contains("(9), got 8"));
        assert!(VoronoiError::InvalidBounds("zero width".into())
            .to_string()
            .starts_with("invalid bounds"));
    }
}
