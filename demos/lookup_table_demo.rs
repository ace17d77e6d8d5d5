//! Example: Rasterize nearest-site lookups
//!
//! Builds a lookup table (VoLT) and prints it as a coarse character map.

use planar_voronoi::generation::jittered_grid_sites;
use planar_voronoi::*;
use std::time::Instant;

fn main() {
    println!("Voronoi Lookup Table Example");
    println!("============================\n");

    let rect = Rect::new(0.0, 0.0, 64.0, 32.0);
    let dimension = UVec2::new(64, 32);
    let config = DiagramConfig::default();
    let sites = jittered_grid_sites(6, 3, rect, 0.8, 3);

    println!("Configuration:");
    println!("  Sites: {}", sites.len());
    println!("  Grid: {}x{}", dimension.x, dimension.y);
    println!();

    let start = Instant::now();
    let table = lookup_table(&sites, Some(rect), dimension, &config).expect("Failed to build lookup table");
    println!("Built {} entries in {:?}\n", table.len(), start.elapsed());

    let mut counts = vec![0usize; sites.len()];
    for &site in &table {
        counts[site] += 1;
    }
    let largest = counts.iter().copied().max().unwrap_or(0);
    let smallest = counts.iter().copied().min().unwrap_or(0);

    println!("Statistics:");
    println!("  Largest cell: {} samples", largest);
    println!("  Smallest cell: {} samples", smallest);
    println!();

    // Row 0 is the bottom of the rectangle, so print from the top down
    const SYMBOLS: &[u8] = b"abcdefghijklmnopqrstuvwxyz";
    for row in table.chunks(dimension.x as usize).rev() {
        let line: String = row.iter().map(|&site| SYMBOLS[site % SYMBOLS.len()] as char).collect();
        println!("  {}", line);
    }

    println!("\nLookup table complete!");
}
