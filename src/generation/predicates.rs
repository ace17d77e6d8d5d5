//! Orientation and in-circle predicates with relative tolerances
//!
//! Each determinant is compared against `epsilon` times the sum of the
//! absolute values of the products it is built from, so the tolerance does
//! not depend on the magnitude of the coordinates. Results inside the band
//! collapse to the degenerate case (`Collinear` / `OnCircle`).

use glam::DVec2;
use std::cmp::Ordering;

/// Which side of a directed line a point lies on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    /// Left of the directed line (positive signed area)
    CounterClockwise,
    /// Right of the directed line
    Clockwise,
    /// On the line, within tolerance
    Collinear,
}

impl Orientation {
    #[inline]
    pub fn is_ccw(self) -> bool {
        self == Orientation::CounterClockwise
    }

    #[inline]
    pub fn is_cw(self) -> bool {
        self == Orientation::Clockwise
    }

    #[inline]
    pub fn reversed(self) -> Self {
        match self {
            Orientation::CounterClockwise => Orientation::Clockwise,
            Orientation::Clockwise => Orientation::CounterClockwise,
            Orientation::Collinear => Orientation::Collinear,
        }
    }
}

/// Position of a point relative to a circumcircle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CirclePosition {
    Inside,
    Outside,
    OnCircle,
}

/// Twice the signed area of triangle `abc`
#[inline]
pub fn signed_area2(a: DVec2, b: DVec2, c: DVec2) -> f64 {
    (b - a).perp_dot(c - a)
}

/// Orientation of `c` relative to the directed line `a -> b`
pub fn orientation(a: DVec2, b: DVec2, c: DVec2, epsilon: f64) -> Orientation {
    let ab = b - a;
    let ac = c - a;
    let left = ab.x * ac.y;
    let right = ab.y * ac.x;
    let det = left - right;
    let bound = epsilon * (left.abs() + right.abs());

    if det > bound {
        Orientation::CounterClockwise
    } else if det < -bound {
        Orientation::Clockwise
    } else {
        Orientation::Collinear
    }
}

/// Whether `d` lies inside the circle through `a`, `b`, `c`
///
/// The triangle may have either winding; a clockwise triangle is handled by
/// flipping the sign of the determinant. A degenerate (collinear) triangle
/// has no circle and reports `Outside`.
pub fn in_circle(a: DVec2, b: DVec2, c: DVec2, d: DVec2, epsilon: f64) -> CirclePosition {
    let winding = orientation(a, b, c, epsilon);
    if winding == Orientation::Collinear {
        return CirclePosition::Outside;
    }

    let ad = a - d;
    let bd = b - d;
    let cd = c - d;

    let a_lift = ad.length_squared();
    let b_lift = bd.length_squared();
    let c_lift = cd.length_squared();

    let bc = bd.x * cd.y - cd.x * bd.y;
    let ca = cd.x * ad.y - ad.x * cd.y;
    let ab = ad.x * bd.y - bd.x * ad.y;

    let mut det = a_lift * bc + b_lift * ca + c_lift * ab;
    let permanent = a_lift * ((bd.x * cd.y).abs() + (cd.x * bd.y).abs())
        + b_lift * ((cd.x * ad.y).abs() + (ad.x * cd.y).abs())
        + c_lift * ((ad.x * bd.y).abs() + (bd.x * ad.y).abs());

    if winding == Orientation::Clockwise {
        det = -det;
    }

    let bound = epsilon * permanent;
    if det > bound {
        CirclePosition::Inside
    } else if det < -bound {
        CirclePosition::Outside
    } else {
        CirclePosition::OnCircle
    }
}

/// Center of the circle through `a`, `b`, `c`
///
/// Returns `None` when the points are collinear (the center is at infinity).
pub fn circumcenter(a: DVec2, b: DVec2, c: DVec2) -> Option<DVec2> {
    let ab = b - a;
    let ac = c - a;
    let d = 2.0 * ab.perp_dot(ac);
    if d == 0.0 {
        return None;
    }

    let ab2 = ab.length_squared();
    let ac2 = ac.length_squared();
    let offset = DVec2::new(ac.y * ab2 - ab.y * ac2, ab.x * ac2 - ac.x * ab2) / d;
    let center = a + offset;
    center.is_finite().then_some(center)
}

/// Total lexicographic order on points: by x, then by y
#[inline]
pub fn lexicographic_cmp(a: DVec2, b: DVec2) -> Ordering {
    a.x.total_cmp(&b.x).then_with(|| a.y.total_cmp(&b.y))
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-12;

    #[test]
    fn test_orientation_signs() {
        let a = DVec2::new(0.0, 0.0);
        let b = DVec2::new(1.0, 0.0);
        assert_eq!(orientation(a, b, DVec2::new(0.5, 1.0), EPS), Orientation::CounterClockwise);
        assert_eq!(orientation(a, b, DVec2::new(0.5, -1.0), EPS), Orientation::Clockwise);
        assert_eq!(orientation(a, b, DVec2::new(3.0, 0.0), EPS), Orientation::Collinear);
    }

    #[test]
    fn test_orientation_tolerance_is_relative() {
        let a = DVec2::new(1e6, 1e6);
        let b = DVec2::new(2e6, 2e6);
        let c = DVec2::new(3e6, 3e6 + 1e-6);
        assert_eq!(orientation(a, b, c, 1e-9), Orientation::Collinear);
        assert_eq!(orientation(a, b, c, 0.0), Orientation::CounterClockwise);
    }

    #[test]
    fn test_coincident_points_are_collinear() {
        let p = DVec2::new(2.0, 3.0);
        assert_eq!(orientation(p, p, p, EPS), Orientation::Collinear);
    }

    #[test]
    fn test_in_circle() {
        let a = DVec2::new(1.0, 0.0);
        let b = DVec2::new(0.0, 1.0);
        let c = DVec2::new(-1.0, 0.0);
        assert_eq!(in_circle(a, b, c, DVec2::ZERO, EPS), CirclePosition::Inside);
        assert_eq!(in_circle(a, b, c, DVec2::new(2.0, 2.0), EPS), CirclePosition::Outside);
        assert_eq!(in_circle(a, b, c, DVec2::new(0.0, -1.0), EPS), CirclePosition::OnCircle);
        // Clockwise winding gives the same answer
        assert_eq!(in_circle(c, b, a, DVec2::ZERO, EPS), CirclePosition::Inside);
    }

    #[test]
    fn test_in_circle_degenerate_triangle() {
        let a = DVec2::new(0.0, 0.0);
        let b = DVec2::new(1.0, 0.0);
        let c = DVec2::new(2.0, 0.0);
        assert_eq!(in_circle(a, b, c, DVec2::new(1.0, 0.1), EPS), CirclePosition::Outside);
    }

    #[test]
    fn test_circumcenter() {
        let center = circumcenter(
            DVec2::new(1.0, 0.0),
            DVec2::new(0.0, 1.0),
            DVec2::new(-1.0, 0.0),
        )
        .unwrap();
        assert!(center.length() < 1e-12);

        let center = circumcenter(
            DVec2::new(0.0, 0.0),
            DVec2::new(4.0, 0.0),
            DVec2::new(0.0, 2.0),
        )
        .unwrap();
        assert!((center - DVec2::new(2.0, 1.0)).length() < 1e-12);

        assert!(circumcenter(DVec2::ZERO, DVec2::X, DVec2::new(2.0, 0.0)).is_none());
    }

    #[test]
    fn test_lexicographic_cmp() {
        assert_eq!(lexicographic_cmp(DVec2::new(1.0, 5.0), DVec2::new(2.0, 0.0)), Ordering::Less);
        assert_eq!(lexicographic_cmp(DVec2::new(1.0, 5.0), DVec2::new(1.0, 0.0)), Ordering::Greater);
        assert_eq!(lexicographic_cmp(DVec2::ONE, DVec2::ONE), Ordering::Equal);
    }
}
