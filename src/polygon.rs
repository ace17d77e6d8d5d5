//! Clipped Voronoi cell polygon
//!
//! Output type of the full diagram pipeline: one ring per input site.

use glam::DVec2;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::generation::predicates;

/// A clipped Voronoi cell
///
/// The ring is implicitly closed (the last point connects back to the first),
/// counter-clockwise, simple, and contained in the clip rectangle. An empty
/// ring means the site has no region inside the rectangle: it lies outside
/// it, or it coincides with another site.
///
/// # Memory Usage
///
/// Approximate size per polygon: 8 bytes for the site id plus 16 bytes per
/// vertex (~6 vertices on average for random sites).
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Polygon {
    /// Index of the owning site in the input array
    pub site: usize,

    /// Ring vertices, counter-clockwise, without a repeated closing point
    pub points: Vec<DVec2>,
}

impl Polygon {
    pub fn new(site: usize, points: Vec<DVec2>) -> Self {
        Self { site, points }
    }

    /// Polygon with no region
    pub fn empty(site: usize) -> Self {
        Self {
            site,
            points: Vec::new(),
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Number of ring vertices
    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Signed area (shoelace); positive for counter-clockwise rings
    pub fn area(&self) -> f64 {
        signed_area(&self.points)
    }

    /// Area centroid, or `None` for an empty or degenerate ring
    pub fn centroid(&self) -> Option<DVec2> {
        if self.points.len() < 3 {
            return None;
        }

        // Relative to the first vertex so far-off rings keep their precision
        let origin = self.points[0];
        let mut area2 = 0.0;
        let mut weighted = DVec2::ZERO;
        for (a, b) in self.edges() {
            let (a, b) = (a - origin, b - origin);
            let cross = a.perp_dot(b);
            area2 += cross;
            weighted += (a + b) * cross;
        }

        if area2.abs() <= f64::EPSILON {
            return None;
        }
        Some(origin + weighted / (3.0 * area2))
    }

    /// Whether `point` lies inside the ring or on its boundary (even-odd rule)
    pub fn contains(&self, point: DVec2) -> bool {
        if self.points.len() < 3 {
            return false;
        }

        let mut inside = false;
        for (a, b) in self.edges() {
            if predicates::orientation(a, b, point, 0.0) == predicates::Orientation::Collinear
                && point.x >= a.x.min(b.x)
                && point.x <= a.x.max(b.x)
                && point.y >= a.y.min(b.y)
                && point.y <= a.y.max(b.y)
            {
                return true;
            }
            if (a.y > point.y) != (b.y > point.y) {
                let x = a.x + (point.y - a.y) * (b.x - a.x) / (b.y - a.y);
                if point.x < x {
                    inside = !inside;
                }
            }
        }
        inside
    }

    /// Ring edges as point pairs, including the closing edge
    pub fn edges(&self) -> impl Iterator<Item = (DVec2, DVec2)> + '_ {
        let n = self.points.len();
        (0..n).map(move |i| (self.points[i], self.points[(i + 1) % n]))
    }

    /// Whether no two non-adjacent edges intersect and no vertex repeats
    ///
    /// Quadratic in the vertex count; cells are small.
    pub fn is_simple(&self) -> bool {
        let n = self.points.len();
        if n < 3 {
            return n == 0;
        }

        for i in 0..n {
            for j in i + 1..n {
                if self.points[i] == self.points[j] {
                    return false;
                }
            }
        }

        let edges: Vec<(DVec2, DVec2)> = self.edges().collect();
        for i in 0..n {
            for j in i + 1..n {
                let adjacent = j == i + 1 || (i == 0 && j == n - 1);
                if adjacent {
                    continue;
                }
                if segments_intersect(edges[i], edges[j]) {
                    return false;
                }
            }
        }
        true
    }
}

/// Shoelace area of an implicitly closed ring
pub(crate) fn signed_area(points: &[DVec2]) -> f64 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }
    // Fan from the first vertex: the shoelace terms stay small away from the origin
    let origin = points[0];
    let mut area2 = 0.0;
    for i in 1..n - 1 {
        area2 += (points[i] - origin).perp_dot(points[i + 1] - origin);
    }
    area2 * 0.5
}

/// Whether every turn of the ring is strictly counter-clockwise
pub(crate) fn is_convex_ccw(points: &[DVec2]) -> bool {
    let n = points.len();
    n >= 3
        && (0..n).all(|i| {
            predicates::signed_area2(points[i], points[(i + 1) % n], points[(i + 2) % n]) > 0.0
        })
}

fn segments_intersect((a, b): (DVec2, DVec2), (c, d): (DVec2, DVec2)) -> bool {
    let d1 = predicates::signed_area2(c, d, a);
    let d2 = predicates::signed_area2(c, d, b);
    let d3 = predicates::signed_area2(a, b, c);
    let d4 = predicates::signed_area2(a, b, d);

    if ((d1 > 0.0 && d2 < 0.0) || (d1 < 0.0 && d2 > 0.0)) && ((d3 > 0.0 && d4 < 0.0) || (d3 < 0.0 && d4 > 0.0)) {
        return true;
    }

    let on_segment = |p: DVec2, q: DVec2, r: DVec2| {
        r.x >= p.x.min(q.x) && r.x <= p.x.max(q.x) && r.y >= p.y.min(q.y) && r.y <= p.y.max(q.y)
    };
    (d1 == 0.0 && on_segment(c, d, a))
        || (d2 == 0.0 && on_segment(c, d, b))
        || (d3 == 0.0 && on_segment(a, b, c))
        || (d4 == 0.0 && on_segment(a, b, d))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_square() -> Polygon {
        Polygon::new(
            3,
            vec![
                DVec2::new(0.0, 0.0),
                DVec2::new(1.0, 0.0),
                DVec2::new(1.0, 1.0),
                DVec2::new(0.0, 1.0),
            ],
        )
    }

    #[test]
    fn test_polygon_creation() {
        let poly = unit_square();
        assert_eq!(poly.site, 3);
        assert_eq!(poly.len(), 4);
        assert!(!poly.is_empty());
        assert!(Polygon::empty(1).is_empty());
        assert_eq!(poly.edges().count(), 4);
    }

    #[test]
    fn test_area_and_centroid() {
        let poly = unit_square();
        assert!((poly.area() - 1.0).abs() < 1e-12);
        let c = poly.centroid().unwrap();
        assert!((c - DVec2::splat(0.5)).length() < 1e-12);

        let mut reversed = poly.clone();
        reversed.points.reverse();
        assert!((reversed.area() + 1.0).abs() < 1e-12);
        assert!(Polygon::empty(0).centroid().is_none());
    }

    #[test]
    fn test_area_far_from_origin() {
        let base = DVec2::new(1.0e6 + 0.3, 1.0e6 + 0.7);
        let poly = Polygon::new(
            0,
            vec![
                base,
                base + DVec2::new(0.1, 0.0),
                base + DVec2::new(0.1, 0.1),
                base + DVec2::new(0.0, 0.1),
            ],
        );
        assert!((poly.area() - 0.01).abs() < 1e-9, "area {}", poly.area());
        let c = poly.centroid().unwrap();
        assert!(c.distance(base + DVec2::splat(0.05)) < 1e-9);
    }

    #[test]
    fn test_convexity() {
        assert!(is_convex_ccw(&unit_square().points));

        let mut reversed = unit_square().points;
        reversed.reverse();
        assert!(!is_convex_ccw(&reversed));

        let dented = [
            DVec2::new(0.0, 0.0),
            DVec2::new(2.0, 0.0),
            DVec2::new(1.0, 0.5),
            DVec2::new(2.0, 2.0),
            DVec2::new(0.0, 2.0),
        ];
        assert!(!is_convex_ccw(&dented));
        assert!(!is_convex_ccw(&dented[..2]));
    }

    #[test]
    fn test_contains() {
        let poly = unit_square();
        assert!(poly.contains(DVec2::new(0.5, 0.5)));
        assert!(poly.contains(DVec2::new(1.0, 0.5)));
        assert!(!poly.contains(DVec2::new(1.5, 0.5)));
        assert!(!Polygon::empty(0).contains(DVec2::ZERO));
    }

    #[test]
    fn test_is_simple() {
        assert!(unit_square().is_simple());
        assert!(Polygon::empty(0).is_simple());

        // Bow tie
        let bow = Polygon::new(
            0,
            vec![
                DVec2::new(0.0, 0.0),
                DVec2::new(1.0, 1.0),
                DVec2::new(1.0, 0.0),
                DVec2::new(0.0, 1.0),
            ],
        );
        assert!(!bow.is_simple());
    }
}
