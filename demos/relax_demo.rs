//! Example: Lloyd relaxation
//!
//! Shows how relaxation evens out cell areas of a random site set.

use planar_voronoi::generation::random_sites;
use planar_voronoi::*;

fn area_spread(diagram: &VoronoiDiagram) -> (f64, f64) {
    let areas: Vec<f64> = diagram.polygons().iter().map(|p| p.area()).collect();
    let mean = areas.iter().sum::<f64>() / areas.len() as f64;
    let variance = areas.iter().map(|a| (a - mean).powi(2)).sum::<f64>() / areas.len() as f64;
    (mean, variance.sqrt())
}

fn main() {
    println!("Lloyd Relaxation Example");
    println!("========================\n");

    let rect = Rect::new(0.0, 0.0, 100.0, 100.0);
    let config = DiagramConfig::default();
    let options = LloydOptions {
        max_iterations: 10,
        convergence_threshold: 0.0005,
    };

    println!("Configuration:");
    println!("  Sites: 500");
    println!("  Max Iterations: {}", options.max_iterations);
    println!("  Convergence Threshold: {}", options.convergence_threshold);
    println!();

    let sites = random_sites(500, rect, 42);
    let before = VoronoiDiagram::compute_with_bounds(&sites, rect, config).expect("Failed to compute diagram");

    println!("Relaxing...");
    let relaxed = lloyd_relaxation(&sites, rect, &config, options).expect("Failed to relax sites");
    let after = VoronoiDiagram::compute_with_bounds(&relaxed, rect, config).expect("Failed to compute diagram");

    let (mean_before, spread_before) = area_spread(&before);
    let (mean_after, spread_after) = area_spread(&after);

    println!("\nStatistics:");
    println!("  Mean cell area: {:.2} -> {:.2}", mean_before, mean_after);
    println!("  Area std deviation: {:.2} -> {:.2}", spread_before, spread_after);
    println!();

    println!("Sample sites:");
    for (i, (old, new)) in sites.iter().zip(&relaxed).take(5).enumerate() {
        println!(
            "  Site {}: ({:.2}, {:.2}) -> ({:.2}, {:.2})",
            i, old.x, old.y, new.x, new.y
        );
    }

    println!("\nRelaxation complete!");
}
