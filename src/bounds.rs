//! Axis-aligned clip rectangle

use glam::DVec2;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Result, VoronoiError};

/// Axis-aligned rectangle used to clip Voronoi cells and to lay out lookup grids
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub min: DVec2,
    pub max: DVec2,
}

impl Rect {
    /// Rectangle from its lower-left corner and size, e.g. `Rect::new(-5.0, -5.0, 10.0, 10.0)`
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            min: DVec2::new(x, y),
            max: DVec2::new(x + width, y + height),
        }
    }

    pub fn from_min_max(min: DVec2, max: DVec2) -> Self {
        Self { min, max }
    }

    /// Bounding rectangle of `points` grown by `margin` on every side
    ///
    /// Returns `None` for an empty slice.
    pub fn from_points(points: &[DVec2], margin: f64) -> Option<Self> {
        let first = *points.first()?;
        let (min, max) = points
            .iter()
            .fold((first, first), |(lo, hi), p| (lo.min(*p), hi.max(*p)));
        let pad = DVec2::splat(margin);
        Some(Self {
            min: min - pad,
            max: max + pad,
        })
    }

    #[inline]
    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    #[inline]
    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    #[inline]
    pub fn size(&self) -> DVec2 {
        self.max - self.min
    }

    #[inline]
    pub fn center(&self) -> DVec2 {
        (self.min + self.max) * 0.5
    }

    #[inline]
    pub fn diagonal(&self) -> f64 {
        self.size().length()
    }

    /// Corners in counter-clockwise order starting at `min`
    pub fn corners(&self) -> [DVec2; 4] {
        [
            self.min,
            DVec2::new(self.max.x, self.min.y),
            self.max,
            DVec2::new(self.min.x, self.max.y),
        ]
    }

    /// Containment test with `epsilon` slack on every side
    pub fn contains(&self, point: DVec2, epsilon: f64) -> bool {
        point.x >= self.min.x - epsilon
            && point.x <= self.max.x + epsilon
            && point.y >= self.min.y - epsilon
            && point.y <= self.max.y + epsilon
    }

    /// Rejects rectangles with non-finite coordinates or no area
    pub fn validate(&self) -> Result<()> {
        if !(self.min.is_finite() && self.max.is_finite()) {
            return Err(VoronoiError::InvalidBounds(format!(
                "coordinates must be finite (got {:?} .. {:?})",
                self.min, self.max
            )));
        }
        if self.width() <= 0.0 || self.height() <= 0.0 {
            return Err(VoronoiError::InvalidBounds(format!(
                "width and height must be positive (got {} x {})",
                self.width(),
                self.height()
            )));
        }
        Ok(())
    }
}
