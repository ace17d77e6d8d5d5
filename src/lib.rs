//! Planar Delaunay triangulation and rectangle-clipped Voronoi diagrams
//!
//! Sites are triangulated by randomized incremental insertion with a
//! history DAG for point location, the Voronoi diagram is derived as the
//! dual, and every cell is clipped to an axis-aligned rectangle. A separate
//! entry point rasterizes nearest-site lookups into a grid (VoLT) without
//! building the diagram at all.
//!
//! # Quick Start
//!
//! ```rust
//! use planar_voronoi::*;
//! use glam::UVec2;
//!
//! let rect = Rect::new(-5.0, -5.0, 10.0, 10.0);
//! let sites = generation::random_sites(100, rect, 42);
//!
//! let config = DiagramConfigBuilder::new()
//!     .boundary_epsilon(1e-7).unwrap()
//!     .build().unwrap();
//!
//! let diagram = VoronoiDiagram::compute_with_bounds(&sites, rect, config).unwrap();
//! assert_eq!(diagram.polygons().len(), 100);
//!
//! let table = lookup_table(&sites, Some(rect), UVec2::new(64, 64), &config).unwrap();
//! assert_eq!(table.len(), 64 * 64);
//! ```
//!
//! # Features
//!
//! - `spatial-index` (default): KD-tree backed nearest-site queries
//! - `serde`: Serialization support for configuration, rectangles and polygons

// Modules
pub mod error;
pub mod config;
pub mod bounds;
pub mod polygon;
pub mod generation;
pub mod pipeline;
pub mod diagram;
pub mod spatial;
pub mod validation;

// Re-export core types for convenience
pub use error::{VoronoiError, Result};
pub use config::{DiagramConfig, DiagramConfigBuilder};
pub use bounds::Rect;
pub use polygon::Polygon;
pub use diagram::{compute_into, lookup_table, VoronoiDiagram};
pub use pipeline::{DiagramJob, DiagramOutput};
pub use spatial::SiteIndex;
pub use generation::{lloyd_relaxation, LloydOptions, Triangulation};
pub use validation::{validate_polygons, validate_triangulation, PolygonReport, TriangulationReport};

// Re-export glam vector types for convenience
pub use glam::{DVec2, UVec2};
