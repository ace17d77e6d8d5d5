//! Seeded site distributions inside a rectangle
//!
//! Both generators use ChaCha8 so the same seed gives the same sites on every
//! platform.

use glam::DVec2;
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::bounds::Rect;

/// Uniformly distributed random sites
///
/// # Arguments
///
/// * `count` - Number of sites to generate
/// * `rect` - Region the sites are drawn from
/// * `seed` - Random seed
///
/// # Example
///
/// ```rust
/// use planar_voronoi::{generation::random_sites, Rect};
///
/// let sites = random_sites(100, Rect::new(0.0, 0.0, 10.0, 10.0), 42);
/// assert_eq!(sites.len(), 100);
/// ```
pub fn random_sites(count: usize, rect: Rect, seed: u64) -> Vec<DVec2> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..count)
        .map(|_| {
            DVec2::new(
                rect.min.x + rng.gen::<f64>() * rect.width(),
                rect.min.y + rng.gen::<f64>() * rect.height(),
            )
        })
        .collect()
}

/// Sites on a regular grid, each displaced by a bounded random offset
///
/// Produces `columns * rows` sites, one per grid cell, in row-major order.
/// `jitter` is the maximum offset as a fraction of half the cell size: 0.0
/// gives the exact cell centers (many cocircular quadruples), 1.0 lets a site
/// move anywhere inside its cell.
pub fn jittered_grid_sites(columns: usize, rows: usize, rect: Rect, jitter: f64, seed: u64) -> Vec<DVec2> {
    if columns == 0 || rows == 0 {
        return Vec::new();
    }

    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let cell = DVec2::new(rect.width() / columns as f64, rect.height() / rows as f64);
    let jitter = jitter.clamp(0.0, 1.0);

    let mut sites = Vec::with_capacity(columns * rows);
    for row in 0..rows {
        for column in 0..columns {
            let center = rect.min + cell * DVec2::new(column as f64 + 0.5, row as f64 + 0.5);
            let offset = if jitter > 0.0 {
                DVec2::new(rng.gen_range(-1.0..=1.0), rng.gen_range(-1.0..=1.0)) * cell * 0.5 * jitter
            } else {
                DVec2::ZERO
            };
            sites.push(center + offset);
        }
    }
    sites
}
