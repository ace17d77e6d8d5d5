//! Voronoi diagram as the dual of a Delaunay triangulation
//!
//! Every Delaunay triangle contributes its circumcenter as a Voronoi vertex,
//! and every Delaunay edge `s -> n` contributes a Voronoi half-edge on the
//! bisector of `s` and `n`, owned by the cell of `s`. Cells of hull sites are
//! open chains: their first half-edge comes in from infinity and their last
//! one leaves to infinity. Nothing is closed here; the clipper does that.

use glam::DVec2;
use rustc_hash::FxHashMap;

use super::delaunay::Triangulation;
use super::half_edge::HalfEdgeMesh;
use super::predicates;
use super::union_find::UnionFind;

/// One directed edge of a Voronoi cell boundary
///
/// The cell of `site` lies on the left. Missing endpoints are at infinity:
/// `origin == None` is an incoming ray, `target == None` an outgoing ray, and
/// both `None` is a full line (collinear input).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VoronoiHalfEdge {
    pub site: usize,
    /// Site across this edge
    pub neighbor: usize,
    pub origin: Option<usize>,
    pub target: Option<usize>,
    /// Same bisector seen from the neighbor's cell
    pub twin: Option<usize>,
    pub fwd: Option<usize>,
    pub back: Option<usize>,
}

/// Shape of a cell before clipping
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellKind {
    /// Closed cycle of finite edges
    Bounded,
    /// Open chain starting and ending with a ray (hull site or collinear input)
    Unbounded,
    /// No region: the site was skipped as a duplicate, or it is the only site
    Empty,
}

/// Boundary of one site's cell, counter-clockwise
#[derive(Debug, Clone)]
pub struct VoronoiCell {
    pub site: usize,
    pub kind: CellKind,
    /// Half-edge ids in boundary order
    pub edges: Vec<usize>,
}

/// Dual DCEL: merged circumcenters, half-edges and one cell per site
#[derive(Debug, Clone, Default)]
pub struct VoronoiDual {
    vertices: Vec<DVec2>,
    half_edges: Vec<VoronoiHalfEdge>,
    cells: Vec<VoronoiCell>,
}

impl VoronoiDual {
    /// Builds the dual of `triangulation`
    ///
    /// # Arguments
    ///
    /// * `sites` - The sites the triangulation was built from
    /// * `triangulation` - Output of the Delaunay stage
    /// * `vertex_epsilon` - Circumcenters closer than this become one vertex
    pub fn from_triangulation(sites: &[DVec2], triangulation: &Triangulation, vertex_epsilon: f64) -> Self {
        let mesh = triangulation.mesh();

        // Step 1: Circumcenters, merged within tolerance
        let (vertices, vertex_of_triangle) = merge_circumcenters(sites, triangulation.triangles(), vertex_epsilon);

        // Step 2: One outgoing half-edge per site
        let mut outgoing_edge: Vec<Option<usize>> = vec![None; sites.len()];
        for (e, he) in mesh.half_edges().iter().enumerate() {
            if outgoing_edge[he.from].is_none() {
                outgoing_edge[he.from] = Some(e);
            }
        }

        let mut dual = Self {
            vertices,
            half_edges: Vec::with_capacity(mesh.half_edge_count() + 2 * sites.len()),
            cells: Vec::with_capacity(sites.len()),
        };

        // Step 3: Walk each site's fan
        for site in 0..sites.len() {
            let cell = match outgoing_edge[site] {
                None => VoronoiCell {
                    site,
                    kind: CellKind::Empty,
                    edges: Vec::new(),
                },
                Some(start) if mesh.triangle_count() == 0 => dual.line_cell(site, start, mesh),
                Some(start) => dual.fan_cell(site, start, mesh, &vertex_of_triangle),
            };
            dual.cells.push(cell);
        }

        // Step 4: Twins by (site, neighbor)
        let index: FxHashMap<(usize, usize), usize> = dual
            .half_edges
            .iter()
            .enumerate()
            .map(|(e, he)| ((he.site, he.neighbor), e))
            .collect();
        for he in dual.half_edges.iter_mut() {
            he.twin = index.get(&(he.neighbor, he.site)).copied();
        }

        tracing::debug!(
            vertices = dual.vertices.len(),
            half_edges = dual.half_edges.len(),
            unbounded = dual.cells.iter().filter(|c| c.kind == CellKind::Unbounded).count(),
            "voronoi dual built"
        );

        dual
    }

    /// Cell of a site on a triangulated mesh
    fn fan_cell(
        &mut self,
        site: usize,
        start: usize,
        mesh: &HalfEdgeMesh,
        vertex_of_triangle: &[usize],
    ) -> VoronoiCell {
        let fan = mesh.outgoing(start);
        let first = fan[0];
        let bounded = mesh.half_edge(first).twin.is_some();

        // (neighbor, origin, target) in counter-clockwise order
        let mut pieces: Vec<(usize, Option<usize>, Option<usize>)> = Vec::with_capacity(fan.len() + 1);
        for (i, &e) in fan.iter().enumerate() {
            let here = vertex_of_triangle[e / 3];
            let before = if i > 0 {
                Some(vertex_of_triangle[fan[i - 1] / 3])
            } else if bounded {
                fan.last().map(|&last| vertex_of_triangle[last / 3])
            } else {
                None
            };
            pieces.push((mesh.half_edge(e).to, before, Some(here)));
        }
        if !bounded {
            // Incoming hull edge closes the fan on the counter-clockwise side
            let last = fan[fan.len() - 1];
            let neighbor = mesh.half_edge(mesh.half_edge(last).back).from;
            pieces.push((neighbor, Some(vertex_of_triangle[last / 3]), None));
        }

        let kind = if bounded { CellKind::Bounded } else { CellKind::Unbounded };
        self.push_cell(site, kind, pieces)
    }

    /// Cell of a site on a collinear chain: one bisector line per neighbor
    fn line_cell(&mut self, site: usize, start: usize, mesh: &HalfEdgeMesh) -> VoronoiCell {
        let mut neighbors = vec![mesh.half_edge(start).to];
        for he in mesh.half_edges() {
            if he.from == site && !neighbors.contains(&he.to) {
                neighbors.push(he.to);
            }
        }
        let pieces = neighbors.into_iter().map(|n| (n, None, None)).collect();
        self.push_cell(site, CellKind::Unbounded, pieces)
    }

    fn push_cell(
        &mut self,
        site: usize,
        kind: CellKind,
        pieces: Vec<(usize, Option<usize>, Option<usize>)>,
    ) -> VoronoiCell {
        let mut edges = Vec::with_capacity(pieces.len());
        for (neighbor, origin, target) in pieces {
            // Both ends on the same merged vertex: the edge has no length
            if origin.is_some() && origin == target {
                continue;
            }
            edges.push(self.half_edges.len());
            self.half_edges.push(VoronoiHalfEdge {
                site,
                neighbor,
                origin,
                target,
                twin: None,
                fwd: None,
                back: None,
            });
        }

        let chained = kind != CellKind::Unbounded || edges.iter().any(|&e| {
            let he = &self.half_edges[e];
            he.origin.is_some() || he.target.is_some()
        });
        if chained {
            let count = edges.len();
            for i in 0..count {
                let e = edges[i];
                let next = if i + 1 < count {
                    Some(edges[i + 1])
                } else if kind == CellKind::Bounded {
                    Some(edges[0])
                } else {
                    None
                };
                self.half_edges[e].fwd = next;
                if let Some(next) = next {
                    self.half_edges[next].back = Some(e);
                }
            }
        }

        VoronoiCell { site, kind, edges }
    }

    #[inline]
    pub fn vertices(&self) -> &[DVec2] {
        &self.vertices
    }

    #[inline]
    pub fn half_edges(&self) -> &[VoronoiHalfEdge] {
        &self.half_edges
    }

    #[inline]
    pub fn half_edge(&self, e: usize) -> &VoronoiHalfEdge {
        &self.half_edges[e]
    }

    #[inline]
    pub fn cells(&self) -> &[VoronoiCell] {
        &self.cells
    }

    #[inline]
    pub fn cell(&self, site: usize) -> &VoronoiCell {
        &self.cells[site]
    }

    /// Sites sharing a Voronoi edge with `site`, in boundary order
    pub fn neighbors(&self, site: usize) -> Vec<usize> {
        self.cells
            .get(site)
            .map(|cell| cell.edges.iter().map(|&e| self.half_edges[e].neighbor).collect())
            .unwrap_or_default()
    }

    /// Direction of travel along half-edge `e` (not normalized)
    ///
    /// The bisector of `site` and `neighbor`, oriented so `site` is on the left.
    pub fn direction(&self, sites: &[DVec2], e: usize) -> DVec2 {
        let he = &self.half_edges[e];
        (sites[he.neighbor] - sites[he.site]).perp()
    }

    /// Finite vertex ring of a bounded cell, `None` otherwise
    pub fn ring(&self, site: usize) -> Option<Vec<DVec2>> {
        let cell = self.cells.get(site)?;
        if cell.kind != CellKind::Bounded {
            return None;
        }
        cell.edges
            .iter()
            .map(|&e| self.half_edges[e].origin.map(|v| self.vertices[v]))
            .collect()
    }
}

/// Circumcenters of all triangles with near-coincident ones merged
///
/// Returns the merged vertex positions and, per triangle, its vertex id.
/// The representative of a merged group is its lowest triangle index, so
/// the result does not depend on hashing or thread scheduling.
fn merge_circumcenters(sites: &[DVec2], triangles: &[[usize; 3]], epsilon: f64) -> (Vec<DVec2>, Vec<usize>) {
    let centers: Vec<DVec2> = triangles
        .iter()
        .map(|&[a, b, c]| {
            predicates::circumcenter(sites[a], sites[b], sites[c])
                .unwrap_or_else(|| (sites[a] + sites[b] + sites[c]) / 3.0)
        })
        .collect();

    let mut by_x: Vec<usize> = (0..centers.len()).collect();
    by_x.sort_by(|&a, &b| centers[a].x.total_cmp(&centers[b].x).then(a.cmp(&b)));

    let mut groups = UnionFind::new(centers.len());
    let mut merged = 0usize;
    for (i, &a) in by_x.iter().enumerate() {
        for &b in &by_x[i + 1..] {
            if centers[b].x - centers[a].x > epsilon {
                break;
            }
            if centers[a].distance(centers[b]) <= epsilon && groups.union_keep_min(a, b) {
                merged += 1;
            }
        }
    }
    if merged > 0 {
        tracing::trace!(merged, "merged coincident circumcenters");
    }

    let mut id_of_root: Vec<Option<usize>> = vec![None; centers.len()];
    let mut vertices = Vec::with_capacity(centers.len() - merged);
    let mut vertex_of_triangle = Vec::with_capacity(centers.len());
    for t in 0..centers.len() {
        let root = groups.find(t);
        let id = *id_of_root[root].get_or_insert_with(|| {
            vertices.push(centers[root]);
            vertices.len() - 1
        });
        vertex_of_triangle.push(id);
    }

    (vertices, vertex_of_triangle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::delaunay::triangulate;

    const EPS: f64 = 1e-12;

    fn dual_of(sites: &[DVec2]) -> VoronoiDual {
        let tri = triangulate(sites, EPS, Some(1));
        VoronoiDual::from_triangulation(sites, &tri, 1e-8)
    }

    #[test]
    fn test_square_with_center_has_one_bounded_cell() {
        let sites = vec![
            DVec2::new(-1.0, -1.0),
            DVec2::new(1.0, -1.0),
            DVec2::new(1.0, 1.0),
            DVec2::new(-1.0, 1.0),
            DVec2::new(0.0, 0.0),
        ];
        let dual = dual_of(&sites);

        assert_eq!(dual.cells().len(), 5);
        assert_eq!(dual.cell(4).kind, CellKind::Bounded);
        for s in 0..4 {
            assert_eq!(dual.cell(s).kind, CellKind::Unbounded);
        }

        // The center cell is the diamond through (+-1, 0), (0, +-1)
        let ring = dual.ring(4).unwrap();
        assert_eq!(ring.len(), 4);
        for v in &ring {
            assert!((v.x.abs() + v.y.abs() - 1.0).abs() < 1e-12);
        }
        let mut neighbors = dual.neighbors(4);
        neighbors.sort_unstable();
        assert_eq!(neighbors, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_hull_cell_is_ray_chain() {
        let sites = vec![
            DVec2::new(-1.0, -1.0),
            DVec2::new(1.0, -1.0),
            DVec2::new(1.0, 1.0),
            DVec2::new(-1.0, 1.0),
            DVec2::new(0.0, 0.0),
        ];
        let dual = dual_of(&sites);
        let cell = dual.cell(0);
        let first = dual.half_edge(cell.edges[0]);
        let last = dual.half_edge(*cell.edges.last().unwrap());
        assert!(first.origin.is_none() && first.target.is_some());
        assert!(last.origin.is_some() && last.target.is_none());
        assert_eq!(first.back, None);
        assert_eq!(last.fwd, None);
    }

    #[test]
    fn test_twins_are_symmetric() {
        let sites: Vec<DVec2> = (0..30)
            .map(|i| {
                let a = i as f64 * 2.399963;
                DVec2::new(a.cos(), a.sin()) * (i as f64).sqrt()
            })
            .collect();
        let dual = dual_of(&sites);
        for (e, he) in dual.half_edges().iter().enumerate() {
            let twin = he.twin.expect("every bisector is shared by two cells");
            let other = dual.half_edge(twin);
            assert_eq!(other.twin, Some(e));
            assert_eq!((other.site, other.neighbor), (he.neighbor, he.site));
            assert_eq!((other.origin, other.target), (he.target, he.origin));
        }
    }

    #[test]
    fn test_cocircular_centers_merge() {
        // Four cocircular sites: both triangles share one circumcenter
        let sites = vec![
            DVec2::new(-1.0, -1.0),
            DVec2::new(1.0, -1.0),
            DVec2::new(1.0, 1.0),
            DVec2::new(-1.0, 1.0),
        ];
        let dual = dual_of(&sites);
        assert_eq!(dual.vertices().len(), 1);
        assert!(dual.vertices()[0].length() < 1e-12);
        // The diagonal's dual edge collapsed; each cell keeps its two rays
        for cell in dual.cells() {
            assert_eq!(cell.edges.len(), 2);
        }
    }

    #[test]
    fn test_two_sites_give_one_line_each() {
        let sites = vec![DVec2::new(-1.0, 0.0), DVec2::new(1.0, 0.0)];
        let dual = dual_of(&sites);
        assert!(dual.vertices().is_empty());
        for cell in dual.cells() {
            assert_eq!(cell.kind, CellKind::Unbounded);
            assert_eq!(cell.edges.len(), 1);
            let he = dual.half_edge(cell.edges[0]);
            assert!(he.origin.is_none() && he.target.is_none());
            assert!(he.twin.is_some());
        }
        // Site 0 is on the left of its bisector going up
        assert_eq!(dual.direction(&sites, dual.cell(0).edges[0]), DVec2::new(0.0, 2.0));
    }

    #[test]
    fn test_duplicate_site_has_empty_cell() {
        let sites = vec![
            DVec2::new(0.0, 0.0),
            DVec2::new(0.0, 4.0),
            DVec2::new(1.0, 1.0),
            DVec2::new(1.0, 1.0),
            DVec2::new(4.0, 0.0),
        ];
        let tri = triangulate(&sites, EPS, None);
        let dual = VoronoiDual::from_triangulation(&sites, &tri, 1e-8);
        assert_eq!(dual.cell(3).kind, CellKind::Empty);
        assert!(dual.neighbors(3).is_empty());
        assert_eq!(dual.cell(2).kind, CellKind::Bounded);
    }
}
