//! Example: Compute a clipped Voronoi diagram
//!
//! Demonstrates the basic usage of the diagram pipeline and its queries.

use planar_voronoi::generation::random_sites;
use planar_voronoi::*;

fn main() {
    println!("Planar Voronoi Diagram Example");
    println!("==============================\n");

    let rect = Rect::new(-5.0, -5.0, 10.0, 10.0);
    let site_count = 200;
    let config = DiagramConfigBuilder::new()
        .seed(42)
        .boundary_epsilon(1e-7)
        .unwrap()
        .build()
        .unwrap();

    println!("Configuration:");
    println!("  Sites: {}", site_count);
    println!(
        "  Rectangle: ({:.1}, {:.1}) to ({:.1}, {:.1})",
        rect.min.x, rect.min.y, rect.max.x, rect.max.y
    );
    println!("  Vertex Epsilon: {:e}", config.vertex_epsilon);
    println!("  Boundary Epsilon: {:e}", config.boundary_epsilon);
    println!("  Insertion Seed: {:?}", config.seed);
    println!();

    println!("Computing diagram...");
    let sites = random_sites(site_count, rect, 7);
    let diagram = VoronoiDiagram::compute_with_bounds(&sites, rect, config).expect("Failed to compute diagram");
    println!(
        "Computed {} polygons from {} triangles\n",
        diagram.polygons().len(),
        diagram.triangles().len()
    );

    let total_neighbors: usize = diagram.site_ids().iter().map(|&s| diagram.neighbors(s).len()).sum();
    let avg_neighbors = total_neighbors as f64 / diagram.site_count() as f64;
    let total_vertices: usize = diagram.polygons().iter().map(|p| p.len()).sum();
    let avg_vertices = total_vertices as f64 / diagram.site_count() as f64;
    let total_area: f64 = diagram.polygons().iter().map(|p| p.area()).sum();

    println!("Statistics:");
    println!("  Average neighbors per site: {:.2}", avg_neighbors);
    println!("  Average vertices per polygon: {:.2}", avg_vertices);
    println!("  Total polygon area: {:.4} (rectangle: {:.4})", total_area, rect.width() * rect.height());
    println!("  Edge flips: {}", diagram.triangulation().flips());
    println!();

    let report = validate_polygons(diagram.polygons(), diagram.rect(), config.boundary_epsilon);
    println!("Validation: {:?}\n", report);

    println!("Sample polygons:");
    for polygon in diagram.polygons().iter().take(5) {
        let site = diagram.sites()[polygon.site];
        println!(
            "  Site {}: position=({:.2}, {:.2}), vertices={}, area={:.3}, neighbors={}",
            polygon.site,
            site.x,
            site.y,
            polygon.len(),
            polygon.area(),
            diagram.neighbors(polygon.site).len()
        );
    }

    let probe = DVec2::new(1.0, -2.0);
    let nearest = diagram.find_site_at(probe);
    println!("\nSite owning ({:.1}, {:.1}): {}", probe.x, probe.y, nearest);
    println!(
        "Sites within 2 hops of {}: {}",
        nearest,
        diagram.find_sites_within_hops(nearest, 2).len()
    );

    println!("\nDiagram complete!");
}
