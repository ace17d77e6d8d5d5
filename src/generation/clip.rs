//! Clipping Voronoi cells to the bounding rectangle
//!
//! Each cell is the intersection of the half-planes `{p : |p - s| <= |p - n|}`
//! over its neighbors `n`, so clipping starts from the rectangle and cuts it
//! once per cell edge (Sutherland-Hodgman, one plane at a time). Rays and
//! lines need no special casing: an unbounded chain is closed by whatever
//! part of the rectangle boundary survives the cuts. Bounded cells that lie
//! entirely inside the rectangle skip the cuts and use their vertex ring.

use glam::DVec2;
use rayon::prelude::*;

use super::dual::{CellKind, VoronoiDual};
use super::predicates;
use crate::bounds::Rect;
use crate::polygon::{self, Polygon};

/// Reusable buffers for one clipping thread
#[derive(Debug, Default)]
pub struct ClipScratch {
    ring: Vec<DVec2>,
    next: Vec<DVec2>,
}

/// Clips dual cells against a rectangle with tolerance `epsilon` (epsilon1)
#[derive(Debug, Clone, Copy)]
pub struct BoundaryClipper {
    rect: Rect,
    epsilon: f64,
}

impl BoundaryClipper {
    pub fn new(rect: Rect, epsilon: f64) -> Self {
        Self { rect, epsilon }
    }

    #[inline]
    pub fn rect(&self) -> &Rect {
        &self.rect
    }

    /// Clips every cell, one polygon per site in site order
    pub fn clip_all(&self, sites: &[DVec2], dual: &VoronoiDual) -> Vec<Polygon> {
        let polygons: Vec<Polygon> = (0..sites.len())
            .into_par_iter()
            .map_init(ClipScratch::default, |scratch, site| self.clip_cell(sites, dual, site, scratch))
            .collect();

        tracing::debug!(
            polygons = polygons.len(),
            empty = polygons.iter().filter(|p| p.is_empty()).count(),
            "cells clipped"
        );
        polygons
    }

    /// Clipped polygon of `site`, empty if nothing of it lies in the rectangle
    pub fn clip_cell(&self, sites: &[DVec2], dual: &VoronoiDual, site: usize, scratch: &mut ClipScratch) -> Polygon {
        let cell = dual.cell(site);
        if cell.kind == CellKind::Empty || !self.rect.contains(sites[site], self.epsilon) {
            return Polygon::empty(site);
        }

        // A ring built from badly conditioned circumcenters can fold over;
        // only a convex ring around its own site skips the cuts
        if let Some(ring) = dual.ring(site) {
            if ring.iter().all(|&v| self.rect.contains(v, 0.0))
                && polygon::is_convex_ccw(&ring)
                && surrounds(&ring, sites[site])
            {
                return self.finish(site, ring);
            }
        }

        scratch.ring.clear();
        scratch.ring.extend_from_slice(&self.rect.corners());
        let origin = sites[site];
        for &e in &cell.edges {
            let other = sites[dual.half_edge(e).neighbor];
            self.clip_half_plane(origin, other, scratch);
            if scratch.ring.is_empty() {
                break;
            }
        }

        self.finish(site, std::mem::take(&mut scratch.ring))
    }

    /// Keeps the part of the ring on `origin`'s side of the bisector with `other`
    fn clip_half_plane(&self, origin: DVec2, other: DVec2, scratch: &mut ClipScratch) {
        let axis = other - origin;
        let length = axis.length();
        if length == 0.0 {
            return;
        }
        let normal = axis / length;
        let midpoint = (origin + other) * 0.5;
        let distance = |p: DVec2| (p - midpoint).dot(normal);

        let ring = &scratch.ring;
        let next = &mut scratch.next;
        next.clear();

        let mut all_inside = true;
        for (i, &current) in ring.iter().enumerate() {
            let following = ring[(i + 1) % ring.len()];
            let dc = distance(current);
            let df = distance(following);
            let current_inside = dc <= self.epsilon;
            let following_inside = df <= self.epsilon;

            if current_inside {
                next.push(current);
            } else {
                all_inside = false;
            }
            if current_inside != following_inside && (dc - df).abs() > 0.0 {
                let t = dc / (dc - df);
                if (0.0..=1.0).contains(&t) {
                    next.push(current + (following - current) * t);
                }
            }
        }

        if !all_inside {
            std::mem::swap(&mut scratch.ring, &mut scratch.next);
        }
    }

    /// Drops near-duplicate vertices and degenerate rings
    fn finish(&self, site: usize, mut ring: Vec<DVec2>) -> Polygon {
        ring.dedup_by(|b, a| a.distance(*b) <= self.epsilon);
        while ring.len() > 1 && ring[0].distance(ring[ring.len() - 1]) <= self.epsilon {
            ring.pop();
        }

        if ring.len() < 3 || polygon::signed_area(&ring) <= self.epsilon * self.epsilon {
            return Polygon::empty(site);
        }
        Polygon::new(site, ring)
    }
}

/// Whether `point` lies strictly left of every edge of the ring
fn surrounds(ring: &[DVec2], point: DVec2) -> bool {
    let n = ring.len();
    (0..n).all(|i| predicates::signed_area2(ring[i], ring[(i + 1) % n], point) > 0.0)
}
