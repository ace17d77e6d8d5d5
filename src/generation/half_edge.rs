//! Half-edge mesh (DCEL) over triangles
//!
//! Half-edges live in a flat arena. Triangle `t` owns the three contiguous
//! half-edges `3t`, `3t + 1`, `3t + 2`, wound counter-clockwise, so the
//! triangle on the left of half-edge `e` is always `e / 3`. A mesh without
//! triangles may instead hold a chain of twin segments (two or more
//! collinear sites); those half-edges belong to no triangle.

use rustc_hash::FxHashMap;

/// One directed edge of the mesh
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HalfEdge {
    /// Opposite half-edge, `None` on the mesh boundary
    pub twin: Option<usize>,
    /// Next half-edge around the same face
    pub fwd: usize,
    /// Previous half-edge around the same face
    pub back: usize,
    pub from: usize,
    pub to: usize,
}

/// Triangle record: counter-clockwise vertex triple plus its first half-edge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Triangle {
    pub vertices: [usize; 3],
    pub edge: usize,
}

/// Arena-backed half-edge mesh
#[derive(Debug, Clone, Default)]
pub struct HalfEdgeMesh {
    half_edges: Vec<HalfEdge>,
    triangles: Vec<Triangle>,
}

impl HalfEdgeMesh {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mesh with room for `triangles` triangles before reallocating
    pub fn with_capacity(triangles: usize) -> Self {
        Self {
            half_edges: Vec::with_capacity(triangles * 3),
            triangles: Vec::with_capacity(triangles),
        }
    }

    /// Builds a mesh from counter-clockwise index triples and links shared edges
    pub fn from_triangles(triangles: &[[usize; 3]]) -> Self {
        let mut mesh = Self::with_capacity(triangles.len());
        let mut open: FxHashMap<(usize, usize), usize> = FxHashMap::default();

        for &[v0, v1, v2] in triangles {
            let t = mesh.add_triangle(v0, v1, v2);
            for e in 3 * t..3 * t + 3 {
                let HalfEdge { from, to, .. } = mesh.half_edges[e];
                match open.remove(&(to, from)) {
                    Some(other) => mesh.link_twins(e, other),
                    None => {
                        open.insert((from, to), e);
                    }
                }
            }
        }

        mesh
    }

    /// Builds the twin-segment chain through `vertices` (consecutive pairs)
    ///
    /// The chain is the boundary walk of a single outer face: forward along
    /// the path, around the far end, back again.
    pub fn from_path(vertices: &[usize]) -> Self {
        let mut mesh = Self::new();
        if vertices.len() < 2 {
            return mesh;
        }

        let segments = vertices.len() - 1;
        for pair in vertices.windows(2) {
            mesh.add_segment(pair[0], pair[1]);
        }

        // Outer walk: 0, 2, .., 2(k-1) forward, then 2(k-1)+1, .., 1 backward
        let forward = |i: usize| 2 * i;
        let backward = |i: usize| 2 * i + 1;
        let mut walk = Vec::with_capacity(2 * segments);
        walk.extend((0..segments).map(forward));
        walk.extend((0..segments).rev().map(backward));

        for (i, &e) in walk.iter().enumerate() {
            let next = walk[(i + 1) % walk.len()];
            mesh.half_edges[e].fwd = next;
            mesh.half_edges[next].back = e;
        }

        mesh
    }

    #[inline]
    pub fn half_edges(&self) -> &[HalfEdge] {
        &self.half_edges
    }

    #[inline]
    pub fn half_edge(&self, e: usize) -> &HalfEdge {
        &self.half_edges[e]
    }

    #[inline]
    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    #[inline]
    pub fn triangle(&self, t: usize) -> &Triangle {
        &self.triangles[t]
    }

    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    #[inline]
    pub fn half_edge_count(&self) -> usize {
        self.half_edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.half_edges.is_empty()
    }

    /// Triangle on the left of `e`, `None` for segment half-edges
    #[inline]
    pub fn triangle_of(&self, e: usize) -> Option<usize> {
        let t = e / 3;
        (t < self.triangles.len()).then_some(t)
    }

    /// Appends a triangle with unlinked (boundary) edges and returns its id
    pub fn add_triangle(&mut self, v0: usize, v1: usize, v2: usize) -> usize {
        debug_assert_eq!(
            self.half_edges.len(),
            self.triangles.len() * 3,
            "triangles cannot follow segment half-edges"
        );
        let t = self.triangles.len();
        self.triangles.push(Triangle {
            vertices: [v0, v1, v2],
            edge: 3 * t,
        });
        self.half_edges.extend((0..3).map(|_| HalfEdge {
            twin: None,
            fwd: 0,
            back: 0,
            from: 0,
            to: 0,
        }));
        self.write_triangle(t, [v0, v1, v2], [None, None, None]);
        t
    }

    /// Appends a twin pair `a -> b`, `b -> a` that belongs to no triangle
    ///
    /// Returns the id of the `a -> b` half-edge; its twin is the next id.
    pub fn add_segment(&mut self, a: usize, b: usize) -> usize {
        assert!(
            self.triangles.is_empty(),
            "segment half-edges are only valid in a mesh without triangles"
        );
        let e = self.half_edges.len();
        self.half_edges.push(HalfEdge {
            twin: Some(e + 1),
            fwd: e + 1,
            back: e + 1,
            from: a,
            to: b,
        });
        self.half_edges.push(HalfEdge {
            twin: Some(e),
            fwd: e,
            back: e,
            from: b,
            to: a,
        });
        e
    }

    /// Links `a` and `b` as twins of each other
    pub fn link_twins(&mut self, a: usize, b: usize) {
        debug_assert_eq!(self.half_edges[a].from, self.half_edges[b].to);
        debug_assert_eq!(self.half_edges[a].to, self.half_edges[b].from);
        self.half_edges[a].twin = Some(b);
        self.half_edges[b].twin = Some(a);
    }

    /// Rewrites triangle slot `t` in place
    ///
    /// Half-edge `3t + i` runs from `vertices[i]` to `vertices[(i + 1) % 3]`
    /// and is linked to `twins[i]` in both directions.
    pub(crate) fn write_triangle(&mut self, t: usize, vertices: [usize; 3], twins: [Option<usize>; 3]) {
        let base = 3 * t;
        self.triangles[t] = Triangle { vertices, edge: base };
        for i in 0..3 {
            let e = base + i;
            self.half_edges[e] = HalfEdge {
                twin: twins[i],
                fwd: base + (i + 1) % 3,
                back: base + (i + 2) % 3,
                from: vertices[i],
                to: vertices[(i + 1) % 3],
            };
            if let Some(twin) = twins[i] {
                self.half_edges[twin].twin = Some(e);
            }
        }
    }

    /// Triangle across `e`, `None` on the boundary
    #[inline]
    pub fn neighbor_across(&self, e: usize) -> Option<usize> {
        self.half_edges[e]
            .twin
            .and_then(|twin| self.triangle_of(twin))
    }

    /// Vertex of `e`'s triangle that is not on `e`
    #[inline]
    pub fn apex(&self, e: usize) -> usize {
        self.half_edges[self.half_edges[e].fwd].to
    }

    /// Replaces the two triangles sharing `e` by the two on the other diagonal
    ///
    /// With `e = a -> b` in triangle `(a, b, c)` and its twin in `(b, a, d)`,
    /// the slot of `e` becomes `(c, a, d)` and the twin's slot becomes
    /// `(d, b, c)`. Returns the two half-edges that were opposite `c`
    /// before the flip and are now the outer edges `a -> d` and `d -> b`.
    ///
    /// # Panics
    ///
    /// Panics if `e` is a boundary edge.
    pub fn flip(&mut self, e: usize) -> (usize, usize) {
        let twin = match self.half_edges[e].twin {
            Some(twin) => twin,
            None => panic!("flip requested on boundary half-edge {}", e),
        };
        let t1 = e / 3;
        let t2 = twin / 3;
        assert!(
            t1 < self.triangles.len() && t2 < self.triangles.len() && t1 != t2,
            "flip requires two distinct triangles across half-edge {}",
            e
        );

        let HalfEdge { from: a, to: b, fwd: e_fwd, back: e_back, .. } = self.half_edges[e];
        let HalfEdge { fwd: t_fwd, back: t_back, .. } = self.half_edges[twin];
        let c = self.half_edges[e_fwd].to;
        let d = self.half_edges[t_fwd].to;

        let ca = self.half_edges[e_back].twin;
        let bc = self.half_edges[e_fwd].twin;
        let ad = self.half_edges[t_fwd].twin;
        let db = self.half_edges[t_back].twin;

        // Diagonal halves: (d -> c) is the third edge of t1, (c -> d) of t2
        self.write_triangle(t1, [c, a, d], [ca, ad, Some(3 * t2 + 2)]);
        self.write_triangle(t2, [d, b, c], [db, bc, Some(3 * t1 + 2)]);

        (3 * t1 + 1, 3 * t2)
    }

    /// Outgoing half-edges of `vertex`, rotating counter-clockwise
    ///
    /// Starts from the most clockwise outgoing edge when the vertex is on the
    /// boundary, so a boundary fan is reported in one pass.
    pub fn outgoing(&self, start: usize) -> Vec<usize> {
        let vertex = self.half_edges[start].from;

        // Rotate clockwise until the boundary (or back to `start`)
        let mut first = start;
        loop {
            let Some(twin) = self.half_edges[first].twin else { break };
            let prev = self.half_edges[twin].fwd;
            if prev == start {
                break;
            }
            first = prev;
        }

        let mut fan = vec![first];
        let mut current = first;
        loop {
            let back = self.half_edges[current].back;
            let Some(next) = self.half_edges[back].twin else { break };
            if next == first {
                break;
            }
            debug_assert_eq!(self.half_edges[next].from, vertex);
            fan.push(next);
            current = next;
        }
        fan
    }

    /// Checks every structural invariant; returns a description of the first violation
    pub fn check(&self) -> std::result::Result<(), String> {
        for (e, he) in self.half_edges.iter().enumerate() {
            if let Some(twin) = he.twin {
                let other = self.half_edges.get(twin).ok_or_else(|| format!("edge {} twin out of range", e))?;
                if other.twin != Some(e) {
                    return Err(format!("edge {}: twin.twin != self", e));
                }
                if other.from != he.to || other.to != he.from {
                    return Err(format!("edge {}: twin endpoints mismatch", e));
                }
            }
            if self.half_edges[he.fwd].back != e {
                return Err(format!("edge {}: fwd.back != self", e));
            }
            if self.half_edges[he.fwd].from != he.to {
                return Err(format!("edge {}: fwd does not start at edge end", e));
            }
        }
        for (t, tri) in self.triangles.iter().enumerate() {
            for i in 0..3 {
                let he = &self.half_edges[3 * t + i];
                if he.from != tri.vertices[i] || he.to != tri.vertices[(i + 1) % 3] {
                    return Err(format!("triangle {}: half-edge {} disagrees with record", t, i));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> HalfEdgeMesh {
        // 3---2
        // | / |
        // 0---1
        HalfEdgeMesh::from_triangles(&[[0, 1, 2], [0, 2, 3]])
    }

    #[test]
    fn test_add_triangle_links_cycle() {
        let mut mesh = HalfEdgeMesh::new();
        let t = mesh.add_triangle(4, 5, 6);
        assert_eq!(t, 0);
        let he = mesh.half_edge(0);
        assert_eq!((he.from, he.to, he.fwd, he.back, he.twin), (4, 5, 1, 2, None));
        assert_eq!(mesh.apex(0), 6);
        assert!(mesh.check().is_ok());
    }

    #[test]
    fn test_from_triangles_links_shared_edge() {
        let mesh = square();
        // 2 -> 0 is edge 2 of triangle 0, 0 -> 2 is edge 3 of triangle 1
        assert_eq!(mesh.half_edge(2).twin, Some(3));
        assert_eq!(mesh.neighbor_across(2), Some(1));
        assert_eq!(mesh.neighbor_across(0), None);
        assert!(mesh.check().is_ok());
    }

    #[test]
    fn test_flip_swaps_diagonal() {
        let mut mesh = square();
        let (left, right) = mesh.flip(2);
        assert!(mesh.check().is_ok());

        // Diagonal now connects 1 and 3
        let diagonal: Vec<_> = mesh
            .half_edges()
            .iter()
            .filter(|he| he.twin.is_some())
            .map(|he| (he.from, he.to))
            .collect();
        assert_eq!(diagonal.len(), 2);
        assert!(diagonal.contains(&(1, 3)) && diagonal.contains(&(3, 1)));

        // Returned edges are the outer edges that were opposite the apex
        assert_eq!(mesh.half_edge(left).twin, None);
        assert_eq!(mesh.half_edge(right).twin, None);
        assert_eq!(mesh.apex(left), 1);
        assert_eq!(mesh.apex(right), 1);
    }

    #[test]
    fn test_flip_twice_restores_topology() {
        let mut mesh = square();
        mesh.flip(2);
        let diagonal = (0..mesh.half_edge_count())
            .find(|&e| mesh.half_edge(e).twin.is_some())
            .unwrap();
        mesh.flip(diagonal);
        assert!(mesh.check().is_ok());
        let shared: Vec<_> = mesh
            .half_edges()
            .iter()
            .filter(|he| he.twin.is_some())
            .map(|he| (he.from.min(he.to), he.from.max(he.to)))
            .collect();
        assert_eq!(shared, vec![(0, 2), (0, 2)]);
    }

    #[test]
    #[should_panic(expected = "boundary")]
    fn test_flip_boundary_edge_panics() {
        let mut mesh = square();
        mesh.flip(0);
    }

    #[test]
    fn test_outgoing_fan_order() {
        let mesh = square();
        // Vertex 0 is on the boundary: 0 -> 1 is the most clockwise outgoing edge
        let fan = mesh.outgoing(3);
        let targets: Vec<_> = fan.iter().map(|&e| mesh.half_edge(e).to).collect();
        assert_eq!(targets, vec![1, 2]);
    }

    #[test]
    fn test_segment_pair() {
        let mut mesh = HalfEdgeMesh::new();
        let e = mesh.add_segment(0, 1);
        assert_eq!(mesh.half_edge(e).twin, Some(e + 1));
        assert_eq!(mesh.half_edge(e + 1).twin, Some(e));
        assert_eq!(mesh.triangle_of(e), None);
        assert!(mesh.check().is_ok());
    }

    #[test]
    fn test_from_path_walk() {
        let mesh = HalfEdgeMesh::from_path(&[3, 1, 2]);
        assert_eq!(mesh.half_edge_count(), 4);
        assert!(mesh.check().is_ok());
        // 3 -> 1 continues to 1 -> 2, which turns around into 2 -> 1
        assert_eq!(mesh.half_edge(0).fwd, 2);
        assert_eq!(mesh.half_edge(2).fwd, 3);
        assert_eq!(mesh.half_edge(3).fwd, 1);
        assert_eq!(mesh.half_edge(1).fwd, 0);
    }
}
