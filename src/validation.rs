//! Structural checks for triangulations and clipped polygons
//!
//! These are the properties every diagram this crate produces should have.
//! They are exposed so callers can verify output built from their own data,
//! and the integration tests lean on them.

use glam::DVec2;
use rustc_hash::FxHashMap;

use crate::bounds::Rect;
use crate::generation::predicates::{self, CirclePosition, Orientation};
use crate::polygon::Polygon;

/// Findings of [`validate_triangulation`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TriangulationReport {
    pub triangles: usize,
    /// Undirected edges with more than two incident triangles
    pub overshared_edges: usize,
    /// (triangle, site) pairs with the site strictly inside the circumcircle
    pub circumcircle_violations: usize,
    /// Triangles that are not counter-clockwise
    pub inverted_triangles: usize,
}

impl TriangulationReport {
    pub fn is_valid(&self) -> bool {
        self.overshared_edges == 0 && self.circumcircle_violations == 0 && self.inverted_triangles == 0
    }
}

/// Findings of [`validate_polygons`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PolygonReport {
    pub polygons: usize,
    pub empty: usize,
    /// Ring vertices farther than the tolerance outside the rectangle
    pub out_of_bounds_vertices: usize,
    pub non_simple: usize,
    /// Non-empty rings with negative signed area
    pub clockwise: usize,
}

impl PolygonReport {
    pub fn is_valid(&self) -> bool {
        self.out_of_bounds_vertices == 0 && self.non_simple == 0 && self.clockwise == 0
    }
}

/// Checks edge sharing, triangle winding and the empty-circumcircle property
///
/// The circumcircle test is brute force over all sites, so it is meant for
/// tests and diagnostics rather than large inputs.
pub fn validate_triangulation(sites: &[DVec2], triangles: &[[usize; 3]], epsilon: f64) -> TriangulationReport {
    let mut report = TriangulationReport {
        triangles: triangles.len(),
        ..Default::default()
    };

    let mut edge_counts: FxHashMap<(usize, usize), usize> = FxHashMap::default();
    for &[a, b, c] in triangles {
        for (x, y) in [(a, b), (b, c), (c, a)] {
            *edge_counts.entry((x.min(y), x.max(y))).or_insert(0) += 1;
        }

        if predicates::orientation(sites[a], sites[b], sites[c], epsilon) != Orientation::CounterClockwise {
            report.inverted_triangles += 1;
        }

        for (s, &p) in sites.iter().enumerate() {
            if s == a || s == b || s == c || p == sites[a] || p == sites[b] || p == sites[c] {
                continue;
            }
            if predicates::in_circle(sites[a], sites[b], sites[c], p, epsilon) == CirclePosition::Inside {
                report.circumcircle_violations += 1;
            }
        }
    }
    report.overshared_edges = edge_counts.values().filter(|&&count| count > 2).count();

    if !report.is_valid() {
        tracing::warn!(?report, "triangulation failed validation");
    }
    report
}

/// Checks containment in `rect`, simplicity and winding of every ring
pub fn validate_polygons(polygons: &[Polygon], rect: &Rect, epsilon: f64) -> PolygonReport {
    let mut report = PolygonReport {
        polygons: polygons.len(),
        ..Default::default()
    };

    for polygon in polygons {
        if polygon.is_empty() {
            report.empty += 1;
            continue;
        }
        report.out_of_bounds_vertices += polygon
            .points
            .iter()
            .filter(|&&p| !rect.contains(p, epsilon))
            .count();
        if !polygon.is_simple() {
            report.non_simple += 1;
        }
        if polygon.area() < 0.0 {
            report.clockwise += 1;
        }
    }

    if !report.is_valid() {
        tracing::warn!(?report, "polygons failed validation");
    }
    report
}
