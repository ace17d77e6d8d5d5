//! Core Delaunay / Voronoi construction
//!
//! Builds a planar Delaunay triangulation by randomized incremental
//! insertion, derives the Voronoi diagram as its dual, and clips each cell
//! to a rectangle.

pub mod predicates;
pub mod half_edge;
pub mod history;
pub mod delaunay;
mod union_find;
pub mod dual;
pub mod clip;
pub mod sites;
mod lloyd;

pub use clip::{BoundaryClipper, ClipScratch};
pub use delaunay::{insertion_order, triangulate, DelaunayBuilder, Triangulation};
pub use dual::{CellKind, VoronoiCell, VoronoiDual, VoronoiHalfEdge};
pub use half_edge::{HalfEdge, HalfEdgeMesh, Triangle};
pub use history::HistoryDag;
pub use lloyd::{lloyd_relaxation, LloydOptions};
pub use predicates::{CirclePosition, Orientation};
pub use sites::{jittered_grid_sites, random_sites};
