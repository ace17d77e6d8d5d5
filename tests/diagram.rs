//! End-to-end checks of the diagram pipeline

use planar_voronoi::generation::{jittered_grid_sites, random_sites};
use planar_voronoi::*;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

const BOUNDARY_EPSILON: f64 = 1e-6;

fn nine_points() -> Vec<DVec2> {
    vec![
        DVec2::new(-3.0, -3.0),
        DVec2::new(0.0, -3.5),
        DVec2::new(3.2, -2.8),
        DVec2::new(-3.5, 0.2),
        DVec2::new(0.1, 0.0),
        DVec2::new(3.0, 0.4),
        DVec2::new(-2.9, 3.1),
        DVec2::new(0.3, 3.4),
        DVec2::new(3.3, 3.0),
    ]
}

fn assert_well_formed(diagram: &VoronoiDiagram) {
    let report = validate_polygons(diagram.polygons(), diagram.rect(), BOUNDARY_EPSILON);
    assert!(report.is_valid(), "{:?}", report);
    for polygon in diagram.polygons() {
        if !polygon.is_empty() {
            assert!(polygon.len() >= 3);
            assert!(polygon.contains(diagram.sites()[polygon.site]));
        }
    }
}

#[test]
fn nine_points_in_square() {
    let rect = Rect::new(-5.0, -5.0, 10.0, 10.0);
    let diagram = VoronoiDiagram::compute_with_bounds(&nine_points(), rect, DiagramConfig::default()).unwrap();

    assert_eq!(diagram.polygons().len(), 9);
    assert!(diagram.polygons().iter().all(|p| !p.is_empty()));
    assert_well_formed(&diagram);

    let total: f64 = diagram.polygons().iter().map(|p| p.area()).sum();
    assert!((total - 100.0).abs() < 1e-6);
    // The middle site is surrounded, so its cell touches no border
    assert!(diagram.neighbors(4).len() >= 4);
    let middle = diagram.polygon(4).unwrap();
    assert!(middle.points.iter().all(|p| p.x.abs() < 5.0 - 1e-9 && p.y.abs() < 5.0 - 1e-9));
}

#[test]
fn nine_points_on_exact_grid() {
    // Every inner quadruple is cocircular
    let rect = Rect::new(-5.0, -5.0, 10.0, 10.0);
    let sites: Vec<DVec2> = (0..9)
        .map(|i| DVec2::new(((i % 3) as f64 - 1.0) * 3.0, ((i / 3) as f64 - 1.0) * 3.0))
        .collect();
    let diagram = VoronoiDiagram::compute_with_bounds(&sites, rect, DiagramConfig::default()).unwrap();

    assert_eq!(diagram.polygons().len(), 9);
    assert_well_formed(&diagram);
    let center = diagram.polygon(4).unwrap();
    assert_eq!(center.len(), 4);
    assert!((center.area() - 9.0).abs() < 1e-9);
}

#[test]
fn two_points_split_by_bisector() {
    let sites = vec![DVec2::new(-1.0, 0.0), DVec2::new(1.0, 0.0)];
    let rect = Rect::new(-5.0, -5.0, 10.0, 10.0);
    let diagram = VoronoiDiagram::compute_with_bounds(&sites, rect, DiagramConfig::default()).unwrap();

    assert!(diagram.triangles().is_empty());
    assert_eq!(diagram.triangulation().mesh().half_edge_count(), 2);

    let left = diagram.polygon(0).unwrap();
    let right = diagram.polygon(1).unwrap();
    assert!(left.points.iter().all(|p| p.x <= BOUNDARY_EPSILON));
    assert!(right.points.iter().all(|p| p.x >= -BOUNDARY_EPSILON));
    assert!((left.area() - 50.0).abs() < 1e-9);
    assert!((right.area() - 50.0).abs() < 1e-9);
}

#[test]
fn random_sites_are_valid() {
    let rect = Rect::new(0.0, 0.0, 100.0, 60.0);
    for seed in [1u64, 2, 3] {
        let sites = random_sites(300, rect, seed);
        let diagram = VoronoiDiagram::compute_with_bounds(&sites, rect, DiagramConfig::default()).unwrap();

        let report = validate_triangulation(&sites, diagram.triangles(), 1e-9);
        assert!(report.is_valid(), "{:?}", report);
        assert_well_formed(&diagram);

        let total: f64 = diagram.polygons().iter().map(|p| p.area()).sum();
        assert!((total - 6000.0).abs() < 1e-6 * 6000.0);
    }
}

#[test]
fn reordering_relabels_cells() {
    let rect = Rect::new(-10.0, -10.0, 20.0, 20.0);
    let sites = random_sites(80, rect, 17);

    let mut permutation: Vec<usize> = (0..sites.len()).collect();
    permutation.shuffle(&mut ChaCha8Rng::seed_from_u64(99));
    let permuted: Vec<DVec2> = permutation.iter().map(|&i| sites[i]).collect();

    let config = DiagramConfig::default();
    let original = VoronoiDiagram::compute_with_bounds(&sites, rect, config).unwrap();
    let reordered = VoronoiDiagram::compute_with_bounds(&permuted, rect, config).unwrap();

    for (new_id, &old_id) in permutation.iter().enumerate() {
        let a = original.polygon(old_id).unwrap();
        let b = reordered.polygon(new_id).unwrap();
        assert_eq!(b.site, new_id);
        assert_eq!(a.len(), b.len());
        assert!((a.area() - b.area()).abs() < 1e-9);
        let (ca, cb) = (a.centroid().unwrap(), b.centroid().unwrap());
        assert!(ca.distance(cb) < 1e-9);
    }
}

#[test]
fn collinear_sites_give_strips() {
    let sites: Vec<DVec2> = (0..5).map(|i| DVec2::new(i as f64, i as f64)).collect();
    let rect = Rect::new(-2.0, -2.0, 8.0, 8.0);
    let diagram = VoronoiDiagram::compute_with_bounds(&sites, rect, DiagramConfig::default()).unwrap();

    assert!(diagram.triangles().is_empty());
    assert_well_formed(&diagram);
    let total: f64 = diagram.polygons().iter().map(|p| p.area()).sum();
    assert!((total - 64.0).abs() < 1e-9);
    let mut neighbors = diagram.neighbors(2).to_vec();
    neighbors.sort_unstable();
    assert_eq!(neighbors, vec![1, 3]);
}

#[test]
fn duplicate_sites_get_empty_polygons() {
    let mut sites = jittered_grid_sites(5, 5, Rect::new(0.0, 0.0, 5.0, 5.0), 0.5, 8);
    sites.push(sites[12]);
    let diagram = VoronoiDiagram::compute(&sites, DiagramConfig::default()).unwrap();

    assert_eq!(diagram.polygons().len(), 26);
    let empty: Vec<usize> = diagram
        .polygons()
        .iter()
        .filter(|p| p.is_empty())
        .map(|p| p.site)
        .collect();
    assert_eq!(empty.len(), 1);
    assert!(empty[0] == 12 || empty[0] == 25);
    assert_well_formed(&diagram);
}

/// Every sample point lies in some polygon, and every polygon containing it
/// belongs to a site no farther than the nearest one (up to `slack`)
fn assert_nearest_ownership(diagram: &VoronoiDiagram, samples: usize, slack: f64) {
    let rect = diagram.rect();
    let step = rect.size() / samples as f64;
    for row in 0..samples {
        for column in 0..samples {
            let point = rect.min + step * DVec2::new(column as f64 + 0.5, row as f64 + 0.5);
            let nearest = diagram
                .sites()
                .iter()
                .map(|s| s.distance(point))
                .fold(f64::INFINITY, f64::min);

            let owners: Vec<usize> = diagram
                .polygons()
                .iter()
                .filter(|p| p.contains(point))
                .map(|p| p.site)
                .collect();
            assert!(!owners.is_empty(), "{:?} is not covered", point);
            for owner in owners {
                let distance = diagram.sites()[owner].distance(point);
                assert!(
                    distance <= nearest + slack,
                    "{:?} owned by site {} at {} but nearest is {}",
                    point,
                    owner,
                    distance,
                    nearest
                );
            }
        }
    }
}

#[test]
fn near_coincident_sites_collapse() {
    let sites = vec![
        DVec2::new(0.0, 0.0),
        DVec2::new(4.0, 0.0),
        DVec2::new(0.0, 4.0),
        DVec2::new(1.0, 1.0),
        DVec2::new(1.0 + 1e-12, 1.0),
    ];
    let rect = Rect::new(-5.0, -5.0, 20.0, 20.0);
    let diagram = VoronoiDiagram::compute_with_bounds(&sites, rect, DiagramConfig::default()).unwrap();

    assert_well_formed(&diagram);
    assert_eq!(diagram.polygons().iter().filter(|p| p.is_empty()).count(), 1);
    assert!(diagram.polygon(3).unwrap().is_empty() || diagram.polygon(4).unwrap().is_empty());
    let total: f64 = diagram.polygons().iter().map(|p| p.area()).sum();
    assert!((total - 400.0).abs() < 1e-6);
    assert_nearest_ownership(&diagram, 40, 1e-6);
}

#[test]
fn near_copies_in_random_sets_stay_valid() {
    let rect = Rect::new(-5.0, -5.0, 20.0, 20.0);
    let inner = Rect::new(0.0, 0.0, 10.0, 10.0);
    let config = DiagramConfig::default();

    for (round, gap) in [1e-9, 1e-10, 1e-11, 1e-12, 1e-13].into_iter().enumerate() {
        for seed in 0..10u64 {
            let mut sites = random_sites(30, inner, 1000 + seed);
            for i in 0..5 {
                let angle = (i as f64 + 0.25 * round as f64) * 1.3;
                sites.push(sites[i] + DVec2::new(angle.cos(), angle.sin()) * gap);
            }

            let diagram = VoronoiDiagram::compute_with_bounds(&sites, rect, config).unwrap();
            assert_well_formed(&diagram);
            assert_eq!(
                diagram.polygons().iter().filter(|p| p.is_empty()).count(),
                5,
                "gap {} seed {}",
                gap,
                seed
            );
            let total: f64 = diagram.polygons().iter().map(|p| p.area()).sum();
            assert!((total - 400.0).abs() < 1e-6, "gap {} seed {}: area {}", gap, seed, total);
            assert_nearest_ownership(&diagram, 30, 1e-6);
        }
    }
}

#[test]
fn lookup_table_agrees_with_polygons() {
    let rect = Rect::new(0.0, 0.0, 10.0, 10.0);
    let sites = random_sites(40, rect, 5);
    let config = DiagramConfig::default();
    let diagram = VoronoiDiagram::compute_with_bounds(&sites, rect, config).unwrap();
    let dimension = UVec2::new(50, 50);
    let table = lookup_table(&sites, Some(rect), dimension, &config).unwrap();

    assert_eq!(table.len(), 2500);
    let step = rect.size() / dimension.as_dvec2();
    let mut agree = 0;
    for (i, &site) in table.iter().enumerate() {
        let (x, y) = ((i % 50) as f64, (i / 50) as f64);
        let center = rect.min + step * DVec2::new(x + 0.5, y + 0.5);
        if diagram.polygon(site).unwrap().contains(center) {
            agree += 1;
        }
    }
    // Only samples right on a cell boundary could disagree
    assert!(agree >= 2495, "{} of 2500 samples agree", agree);
}

#[test]
fn usage_errors_are_reported() {
    let config = DiagramConfig::default();
    let one = [DVec2::ZERO];

    assert_eq!(
        VoronoiDiagram::compute(&one, config).err(),
        Some(VoronoiError::InsufficientSites(1))
    );
    assert_eq!(
        lookup_table(&one, None, UVec2::new(4, 4), &config),
        Err(VoronoiError::InsufficientSites(1))
    );

    let sites = nine_points();
    let mut polygons = vec![Polygon::default(); 8];
    assert_eq!(
        compute_into(&sites, None, config, &mut polygons),
        Err(VoronoiError::LengthMismatch { expected: 9, actual: 8 })
    );

    polygons.push(Polygon::default());
    assert!(compute_into(&sites, None, config, &mut polygons).is_ok());
    assert!(polygons.iter().all(|p| !p.is_empty()));
}

#[test]
fn scheduled_diagram_completes() {
    let rect = Rect::new(0.0, 0.0, 1.0, 1.0);
    let sites = random_sites(500, rect, 11);
    let job = VoronoiDiagram::schedule(sites.clone(), Some(rect), DiagramConfig::default()).unwrap();
    let scheduled = job.complete();
    let direct = VoronoiDiagram::compute_with_bounds(&sites, rect, DiagramConfig::default()).unwrap();
    assert_eq!(scheduled.polygons(), direct.polygons());
}

#[test]
fn sequential_insertion_gives_same_triangles() {
    let rect = Rect::new(0.0, 0.0, 10.0, 10.0);
    let sites = random_sites(120, rect, 23);
    let shuffled = VoronoiDiagram::compute_with_bounds(&sites, rect, DiagramConfig::default()).unwrap();
    let sequential = VoronoiDiagram::compute_with_bounds(
        &sites,
        rect,
        DiagramConfigBuilder::new().sequential().build().unwrap(),
    )
    .unwrap();

    let normalize = |triangles: &[[usize; 3]]| {
        let mut out: Vec<[usize; 3]> = triangles
            .iter()
            .map(|t| {
                let mut t = *t;
                t.sort_unstable();
                t
            })
            .collect();
        out.sort_unstable();
        out
    };
    assert_eq!(normalize(shuffled.triangles()), normalize(sequential.triangles()));
}
