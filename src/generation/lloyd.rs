//! Lloyd's Relaxation for uniform site distribution
//!
//! Lloyd's Relaxation iteratively improves the uniformity of a site set
//! inside a rectangle by moving each site to the centroid of its clipped
//! Voronoi cell.

use glam::DVec2;
use std::time::Instant;

use crate::bounds::Rect;
use crate::config::DiagramConfig;
use crate::error::{Result, VoronoiError};
use crate::pipeline;

/// Options for Lloyd's relaxation algorithm
#[derive(Debug, Clone, Copy)]
pub struct LloydOptions {
    /// Maximum number of iterations to run
    pub max_iterations: usize,
    /// Convergence threshold - stop when max displacement < this value
    /// Set to 0.0 to disable early termination
    pub convergence_threshold: f64,
}

impl Default for LloydOptions {
    fn default() -> Self {
        Self {
            max_iterations: 5,
            // Relative to the rectangle diagonal. For a 10x10 rectangle, 0.001
            // stops once no site moves more than ~0.014 units.
            convergence_threshold: 0.001,
        }
    }
}

/// Apply Lloyd's Relaxation to improve site distribution uniformity
///
/// # Algorithm
///
/// For each iteration:
/// 1. Compute the clipped Voronoi diagram of the current sites
/// 2. Move every site to the centroid of its polygon
/// 3. Stop early once the largest move is below the threshold
///
/// Sites with an empty polygon (outside the rectangle, or duplicates) stay
/// where they are.
///
/// # Arguments
///
/// * `sites` - Initial site distribution
/// * `rect` - Rectangle the cells are clipped to
/// * `config` - Diagram configuration used for every iteration
/// * `options` - Relaxation options (max iterations, convergence threshold)
///
/// # Returns
///
/// Relaxed sites, in the same order as the input. Fewer than two sites
/// are returned unchanged.
///
/// # Errors
///
/// - `InvalidBounds` if `rect` is empty or not finite
/// - `InvalidConfig` if a tolerance in `config` is out of range, or the
///   convergence threshold is negative or not finite
pub fn lloyd_relaxation(
    sites: &[DVec2],
    rect: Rect,
    config: &DiagramConfig,
    options: LloydOptions,
) -> Result<Vec<DVec2>> {
    rect.validate()?;
    config.validate()?;
    if !options.convergence_threshold.is_finite() || options.convergence_threshold < 0.0 {
        return Err(VoronoiError::InvalidConfig(format!(
            "convergence_threshold must be finite and >= 0 (got {})",
            options.convergence_threshold
        )));
    }

    let mut sites = sites.to_vec();
    if sites.len() < 2 {
        return Ok(sites);
    }

    let convergence_threshold = options.convergence_threshold * rect.diagonal();
    let total_start = Instant::now();

    tracing::debug!(
        sites = sites.len(),
        max_iterations = options.max_iterations,
        threshold = convergence_threshold,
        "lloyd relaxation starting"
    );

    let mut iterations_run = 0;
    let mut converged = false;

    for iteration in 0..options.max_iterations {
        let iter_start = Instant::now();
        let output = pipeline::run(&sites, rect, *config);

        let mut max_displacement: f64 = 0.0;
        for (site, polygon) in sites.iter_mut().zip(&output.polygons) {
            if let Some(centroid) = polygon.centroid() {
                max_displacement = max_displacement.max(site.distance(centroid));
                *site = centroid;
            }
        }
        iterations_run = iteration + 1;

        tracing::trace!(
            iteration = iterations_run,
            elapsed = ?iter_start.elapsed(),
            max_displacement,
            "lloyd iteration"
        );

        if convergence_threshold > 0.0 && max_displacement < convergence_threshold {
            converged = true;
            break;
        }
    }

    tracing::debug!(
        iterations = iterations_run,
        converged,
        elapsed = ?total_start.elapsed(),
        "lloyd relaxation finished"
    );

    Ok(sites)
}
