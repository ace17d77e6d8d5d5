//! Nearest-site queries and the rasterized lookup table (VoLT)
//!
//! With the `spatial-index` feature, queries go through a KD-tree. Without
//! it, they fall back to a linear scan, which is fine for a few hundred sites.

use glam::{DVec2, UVec2};
use rayon::prelude::*;

#[cfg(feature = "spatial-index")]
use kiddo::immutable::float::kdtree::ImmutableKdTree;
#[cfg(feature = "spatial-index")]
use kiddo::SquaredEuclidean;

use crate::bounds::Rect;

/// Nearest-site index over a fixed set of sites
///
/// # Performance
///
/// - Construction: O(n log n) with the KD-tree
/// - Query: O(log n) with the KD-tree, O(n) without
#[derive(Clone)]
pub struct SiteIndex {
    #[cfg(feature = "spatial-index")]
    tree: ImmutableKdTree<f64, usize, 2, 32>,
    #[cfg(not(feature = "spatial-index"))]
    sites: Vec<DVec2>,
}

impl SiteIndex {
    /// Build the index from site positions
    ///
    /// # Example
    ///
    /// ```
    /// use planar_voronoi::SiteIndex;
    /// use glam::DVec2;
    ///
    /// let sites = vec![DVec2::new(0.0, 0.0), DVec2::new(4.0, 0.0), DVec2::new(0.0, 4.0)];
    /// let index = SiteIndex::new(&sites);
    /// assert_eq!(index.find_nearest(DVec2::new(3.5, 0.5)), 1);
    /// ```
    pub fn new(sites: &[DVec2]) -> Self {
        #[cfg(feature = "spatial-index")]
        {
            let points: Vec<[f64; 2]> = sites.iter().map(|p| [p.x, p.y]).collect();
            Self {
                tree: ImmutableKdTree::new_from_slice(&points),
            }
        }
        #[cfg(not(feature = "spatial-index"))]
        {
            Self { sites: sites.to_vec() }
        }
    }

    /// Index of the site closest to `position`
    ///
    /// Ties between equidistant sites are broken arbitrarily but
    /// deterministically for a given index.
    pub fn find_nearest(&self, position: DVec2) -> usize {
        #[cfg(feature = "spatial-index")]
        {
            let result = self.tree.nearest_one::<SquaredEuclidean>(&[position.x, position.y]);
            result.item as usize
        }
        #[cfg(not(feature = "spatial-index"))]
        {
            let mut best = 0;
            let mut best_distance = f64::INFINITY;
            for (i, site) in self.sites.iter().enumerate() {
                let distance = site.distance_squared(position);
                if distance < best_distance {
                    best = i;
                    best_distance = distance;
                }
            }
            best
        }
    }
}

/// Nearest site for every cell of a `dimension.x` by `dimension.y` grid over `rect`
///
/// The table is row-major (`index = y * dimension.x + x`, rows running from
/// `rect.min.y` upward), and each cell is sampled at its center. Rows are
/// filled in parallel; each row only reads the shared index.
pub fn lookup_table(sites: &[DVec2], rect: &Rect, dimension: UVec2) -> Vec<usize> {
    let (width, height) = (dimension.x as usize, dimension.y as usize);
    let mut table = vec![0usize; width * height];
    if table.is_empty() || sites.is_empty() {
        return table;
    }

    let index = SiteIndex::new(sites);
    let step = rect.size() / dimension.as_dvec2();

    table.par_chunks_mut(width).enumerate().for_each(|(y, row)| {
        let cy = rect.min.y + (y as f64 + 0.5) * step.y;
        for (x, slot) in row.iter_mut().enumerate() {
            let cx = rect.min.x + (x as f64 + 0.5) * step.x;
            *slot = index.find_nearest(DVec2::new(cx, cy));
        }
    });

    tracing::debug!(cells = table.len(), sites = sites.len(), "lookup table filled");
    table
}
