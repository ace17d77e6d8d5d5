//! Randomized incremental Delaunay triangulation
//!
//! Sites are inserted one at a time into a seed triangle made of the
//! lexicographically largest site and two symbolic points, `LOW` and
//! `HIGH`, that sit infinitely far away. The located triangle is split and
//! the Delaunay property is restored by edge flips. Symbolic points never
//! get coordinates: every predicate that touches one is answered
//! combinatorially, so the seed triangle cannot destroy hull edges the way
//! a finite super-triangle can.
//!
//! Placement of the symbolic points (x is the major lexicographic key):
//! - `LOW` is above every site, beyond the smallest x. A site `q` is left of
//!   `p -> LOW` iff `q` is lexicographically smaller than `p`.
//! - `HIGH` is below every site, beyond the largest x, and much farther out
//!   than `LOW`. A site `q` is left of `p -> HIGH` iff `q` is
//!   lexicographically larger than `p`.
//! - Every site is left of `LOW -> HIGH`.

use glam::DVec2;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::cmp::Ordering;

use super::half_edge::{HalfEdge, HalfEdgeMesh};
use super::history::HistoryDag;
use super::predicates::{self, CirclePosition, Orientation};

/// Result of the Delaunay stage
#[derive(Debug, Clone, Default)]
pub struct Triangulation {
    triangles: Vec<[usize; 3]>,
    mesh: HalfEdgeMesh,
    duplicates: Vec<usize>,
    site_count: usize,
    flips: usize,
    history_nodes: usize,
}

impl Triangulation {
    /// Counter-clockwise site index triples
    #[inline]
    pub fn triangles(&self) -> &[[usize; 3]] {
        &self.triangles
    }

    /// Half-edge mesh over site indices; hull edges have no twin
    ///
    /// For collinear input (including exactly two sites) the mesh holds the
    /// chain of twin segments between consecutive sites instead of triangles.
    #[inline]
    pub fn mesh(&self) -> &HalfEdgeMesh {
        &self.mesh
    }

    /// Sites that coincide with an earlier site and were not inserted
    #[inline]
    pub fn duplicates(&self) -> &[usize] {
        &self.duplicates
    }

    #[inline]
    pub fn site_count(&self) -> usize {
        self.site_count
    }

    /// Number of edge flips performed while legalizing
    #[inline]
    pub fn flips(&self) -> usize {
        self.flips
    }

    /// Size of the history DAG when construction finished
    #[inline]
    pub fn history_nodes(&self) -> usize {
        self.history_nodes
    }

    /// Undirected Delaunay edges as `(min, max)` site pairs
    pub fn edges(&self) -> Vec<(usize, usize)> {
        self.mesh
            .half_edges()
            .iter()
            .filter(|he| he.twin.is_none() || he.from < he.to)
            .map(|he| (he.from.min(he.to), he.from.max(he.to)))
            .collect()
    }
}

/// Insertion order: the lexicographically largest site is moved to the end
///
/// With a seed, the remaining sites are shuffled with ChaCha8 so the
/// expected history depth is logarithmic regardless of input order. The
/// site slice itself is never reordered.
pub fn insertion_order(sites: &[DVec2], seed: Option<u64>) -> Vec<usize> {
    let mut order: Vec<usize> = (0..sites.len()).collect();
    let Some(largest) = (0..sites.len())
        .max_by(|&a, &b| predicates::lexicographic_cmp(sites[a], sites[b]).then(b.cmp(&a)))
    else {
        return order;
    };

    let last = order.len() - 1;
    order.swap(largest, last);

    if let Some(seed) = seed {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        order[..last].shuffle(&mut rng);
    }
    order
}

/// Below this many predicate tolerances (relative to the coordinate
/// magnitude) two sites can no longer be told apart reliably
const COINCIDENCE_FACTOR: f64 = 1e3;

/// Builds a triangulation from sites and an insertion order
pub struct DelaunayBuilder<'a> {
    sites: &'a [DVec2],
    epsilon: f64,
    merge_distance: f64,
}

impl<'a> DelaunayBuilder<'a> {
    /// `epsilon` is the relative tolerance of the orientation / in-circle tests
    pub fn new(sites: &'a [DVec2], epsilon: f64) -> Self {
        Self {
            sites,
            epsilon,
            merge_distance: 0.0,
        }
    }

    /// Sites within `distance` of an already inserted site are not inserted
    ///
    /// They are reported in [`Triangulation::duplicates`]. The effective
    /// distance never drops below the scale-relative floor where the
    /// predicates stop separating points.
    pub fn merge_distance(mut self, distance: f64) -> Self {
        self.merge_distance = distance;
        self
    }

    fn effective_merge_distance(&self) -> f64 {
        let scale = self
            .sites
            .iter()
            .fold(0.0_f64, |m, p| m.max(p.abs().max_element()));
        self.merge_distance.max(COINCIDENCE_FACTOR * self.epsilon * scale)
    }

    /// Triangulates the sites, inserting them in `order`
    ///
    /// `order` must be a permutation of the site indices whose last entry is
    /// the lexicographically largest site (see [`insertion_order`]).
    pub fn build(&self, order: &[usize]) -> Triangulation {
        let n = self.sites.len();
        debug_assert_eq!(order.len(), n);

        if n < 2 {
            return Triangulation {
                site_count: n,
                ..Default::default()
            };
        }

        let kernel = Kernel {
            sites: self.sites,
            low: n,
            high: n + 1,
            epsilon: self.epsilon,
        };
        let merge_distance = self.effective_merge_distance();
        let mut state = Construction::new(kernel, order[n - 1], n, merge_distance);

        if n > 2 {
            for &site in &order[..n - 1] {
                state.insert(site);
            }
        } else {
            // Two sites never need the DAG: only the duplicate check applies
            let other = order[0];
            if self.sites[other].distance(self.sites[order[1]]) <= merge_distance {
                tracing::warn!(site = other, "skipping coincident site");
                state.duplicates.push(other);
            }
        }

        state.finish(order)
    }
}

/// Predicates over real sites and the two symbolic points
struct Kernel<'a> {
    sites: &'a [DVec2],
    low: usize,
    high: usize,
    epsilon: f64,
}

impl Kernel<'_> {
    #[inline]
    fn is_symbolic(&self, v: usize) -> bool {
        v >= self.low
    }

    #[inline]
    fn lex_cmp(&self, a: usize, b: usize) -> Ordering {
        predicates::lexicographic_cmp(self.sites[a], self.sites[b])
    }

    /// Orientation of `c` relative to `a -> b`
    fn orient(&self, a: usize, b: usize, c: usize) -> Orientation {
        let symbolic = [a, b, c].iter().filter(|&&v| self.is_symbolic(v)).count();
        match symbolic {
            0 => predicates::orientation(self.sites[a], self.sites[b], self.sites[c], self.epsilon),
            1 => {
                // Rotate so the symbolic point is in the middle: (p, s, q)
                let (p, s, q) = if self.is_symbolic(a) {
                    (c, a, b)
                } else if self.is_symbolic(b) {
                    (a, b, c)
                } else {
                    (b, c, a)
                };
                let wanted = if s == self.low { Ordering::Less } else { Ordering::Greater };
                match self.lex_cmp(q, p) {
                    Ordering::Equal => Orientation::Collinear,
                    ord if ord == wanted => Orientation::CounterClockwise,
                    _ => Orientation::Clockwise,
                }
            }
            _ => {
                let (low, high) = (self.low, self.high);
                if (a, b) == (low, high) || (b, c) == (low, high) || (c, a) == (low, high) {
                    Orientation::CounterClockwise
                } else {
                    Orientation::Clockwise
                }
            }
        }
    }

    /// Whether `d` lies strictly inside the circumcircle of the CCW triangle `abc`
    ///
    /// A circle through a symbolic point degenerates into the half-plane left
    /// of the two vertices that follow it; `HIGH` dominates `LOW`.
    fn in_circle(&self, a: usize, b: usize, c: usize, d: usize) -> bool {
        let tri = [a, b, c];
        if d == self.high {
            return false;
        }

        let dominant = if tri.contains(&self.high) {
            Some(self.high)
        } else if tri.contains(&self.low) {
            Some(self.low)
        } else {
            None
        };

        match dominant {
            None if d == self.low => false,
            None => {
                predicates::in_circle(
                    self.sites[a],
                    self.sites[b],
                    self.sites[c],
                    self.sites[d],
                    self.epsilon,
                ) == CirclePosition::Inside
            }
            Some(s) => {
                if d == self.low && s == self.low {
                    return false;
                }
                let at = tri.iter().position(|&v| v == s).unwrap_or(0);
                let u = tri[(at + 1) % 3];
                let v = tri[(at + 2) % 3];
                self.orient(u, v, d).is_ccw()
            }
        }
    }
}

/// Where a new site falls inside its located triangle
#[derive(Debug, Clone, Copy)]
enum Location {
    Inside(usize),
    OnEdge(usize),
    Vertex,
}

/// Mutable state of one construction: mesh, DAG and bookkeeping
struct Construction<'a> {
    kernel: Kernel<'a>,
    mesh: HalfEdgeMesh,
    dag: HistoryDag,
    duplicates: Vec<usize>,
    merge_distance: f64,
    flips: usize,
    flip_budget: usize,
    stack: Vec<usize>,
}

impl<'a> Construction<'a> {
    fn new(kernel: Kernel<'a>, top: usize, n: usize, merge_distance: f64) -> Self {
        let mut mesh = HalfEdgeMesh::with_capacity(2 * n + 1);
        let seed = [top, kernel.low, kernel.high];
        let root = mesh.add_triangle(seed[0], seed[1], seed[2]);
        let dag = HistoryDag::with_capacity(root, seed, n);
        Self {
            kernel,
            mesh,
            dag,
            duplicates: Vec::new(),
            merge_distance,
            flips: 0,
            flip_budget: 3 * (n + 3),
            stack: Vec::with_capacity(32),
        }
    }

    fn edge_orientations(&self, vertices: &[usize; 3], q: usize) -> [Orientation; 3] {
        let [a, b, c] = *vertices;
        [
            self.kernel.orient(a, b, q),
            self.kernel.orient(b, c, q),
            self.kernel.orient(c, a, q),
        ]
    }

    fn locate(&self, q: usize) -> Location {
        let mut t = self.dag.locate(|vertices| {
            self.edge_orientations(vertices, q)
                .iter()
                .filter(|o| o.is_cw())
                .count()
        });

        // Rounding can leave the query just outside the leaf; walk across
        for _ in 0..self.mesh.triangle_count() {
            let orientations = self.edge_orientations(&self.mesh.triangle(t).vertices, q);
            let across = orientations
                .iter()
                .position(|o| o.is_cw())
                .and_then(|m| self.mesh.neighbor_across(3 * t + m));
            match across {
                Some(next) => t = next,
                None => break,
            }
        }

        let orientations = self.edge_orientations(&self.mesh.triangle(t).vertices, q);
        let mut off = orientations.iter().enumerate().filter(|(_, o)| !o.is_ccw());
        match (off.next(), off.next()) {
            (None, _) => Location::Inside(t),
            (Some((m, _)), None) => Location::OnEdge(3 * t + m),
            _ => Location::Vertex,
        }
    }

    /// Whether `q` is within the merge distance of a real vertex of
    /// triangle `t` or of the apexes across its edges
    fn near_existing(&self, t: usize, q: usize) -> bool {
        let p = self.kernel.sites[q];
        (0..3).any(|i| {
            let he = self.mesh.half_edge(3 * t + i);
            let across = he.twin.map(|twin| self.mesh.apex(twin));
            [Some(he.from), across]
                .into_iter()
                .flatten()
                .filter(|&v| !self.kernel.is_symbolic(v))
                .any(|v| self.kernel.sites[v].distance(p) <= self.merge_distance)
        })
    }

    fn insert(&mut self, q: usize) {
        let location = self.locate(q);
        let coincident = match location {
            Location::Vertex => true,
            Location::Inside(t) => self.near_existing(t, q),
            Location::OnEdge(e) => {
                self.near_existing(e / 3, q)
                    || self
                        .mesh
                        .half_edge(e)
                        .twin
                        .is_some_and(|twin| self.near_existing(twin / 3, q))
            }
        };

        match location {
            Location::Inside(t) if !coincident => self.split_triangle(t, q),
            Location::OnEdge(e) if !coincident => self.split_edge(e, q),
            _ => {
                tracing::warn!(site = q, merge_distance = self.merge_distance, "skipping coincident site");
                self.duplicates.push(q);
                return;
            }
        }
        self.legalize();
    }

    /// 1 -> 3 split of triangle `t` around `q`
    fn split_triangle(&mut self, t: usize, q: usize) {
        let [a, b, c] = self.mesh.triangle(t).vertices;
        let twins = [0, 1, 2].map(|i| self.mesh.half_edge(3 * t + i).twin);

        let t1 = self.mesh.add_triangle(b, c, q);
        let t2 = self.mesh.add_triangle(c, a, q);

        self.mesh.write_triangle(t, [a, b, q], [twins[0], Some(3 * t1 + 2), Some(3 * t2 + 1)]);
        self.mesh.write_triangle(t1, [b, c, q], [twins[1], Some(3 * t2 + 2), Some(3 * t + 1)]);
        self.mesh.write_triangle(t2, [c, a, q], [twins[2], Some(3 * t + 2), Some(3 * t1 + 1)]);

        self.dag.replace(&[t], &[(t, [a, b, q]), (t1, [b, c, q]), (t2, [c, a, q])]);
        self.stack.extend([3 * t, 3 * t1, 3 * t2]);
    }

    /// 2 -> 4 split of the two triangles sharing half-edge `e` at `q`
    fn split_edge(&mut self, e: usize, q: usize) {
        let HalfEdge { from: a, to: b, fwd, back, twin, .. } = *self.mesh.half_edge(e);
        let twin = match twin {
            Some(twin) => twin,
            None => panic!("site {} located on boundary half-edge {}", q, e),
        };
        let t = e / 3;
        let u = twin / 3;
        let c = self.mesh.apex(e);
        let d = self.mesh.apex(twin);

        let ca = self.mesh.half_edge(back).twin;
        let bc = self.mesh.half_edge(fwd).twin;
        let ad = self.mesh.half_edge(self.mesh.half_edge(twin).fwd).twin;
        let db = self.mesh.half_edge(self.mesh.half_edge(twin).back).twin;

        let n1 = self.mesh.add_triangle(b, c, q);
        let n2 = self.mesh.add_triangle(d, b, q);

        self.mesh.write_triangle(t, [c, a, q], [ca, Some(3 * u + 2), Some(3 * n1 + 1)]);
        self.mesh.write_triangle(n1, [b, c, q], [bc, Some(3 * t + 2), Some(3 * n2 + 1)]);
        self.mesh.write_triangle(u, [a, d, q], [ad, Some(3 * n2 + 2), Some(3 * t + 1)]);
        self.mesh.write_triangle(n2, [d, b, q], [db, Some(3 * n1 + 2), Some(3 * u + 1)]);

        self.dag.replace(&[t], &[(t, [c, a, q]), (n1, [b, c, q])]);
        self.dag.replace(&[u], &[(u, [a, d, q]), (n2, [d, b, q])]);
        self.stack.extend([3 * t, 3 * n1, 3 * u, 3 * n2]);
    }

    /// Flips queued edges (each opposite the new site) until all are legal
    fn legalize(&mut self) {
        let mut flips = 0;
        while let Some(e) = self.stack.pop() {
            let HalfEdge { from: i, to: j, twin, .. } = *self.mesh.half_edge(e);
            let Some(twin) = twin else { continue };
            let k = self.mesh.apex(e);
            let l = self.mesh.apex(twin);

            if !self.kernel.in_circle(i, j, k, l) {
                continue;
            }
            // The flipped pair must stay counter-clockwise
            if !(self.kernel.orient(k, i, l).is_ccw() && self.kernel.orient(l, j, k).is_ccw()) {
                continue;
            }

            flips += 1;
            if flips > self.flip_budget {
                tracing::warn!(budget = self.flip_budget, "flip budget exhausted during legalization");
                self.stack.clear();
                break;
            }

            let (t1, t2) = (e / 3, twin / 3);
            let (left, right) = self.mesh.flip(e);
            let created = [
                (t1, self.mesh.triangle(t1).vertices),
                (t2, self.mesh.triangle(t2).vertices),
            ];
            self.dag.replace(&[t1, t2], &created);
            self.stack.extend([left, right]);
        }
        self.flips += flips;
    }

    fn finish(self, order: &[usize]) -> Triangulation {
        let kernel = &self.kernel;
        let triangles: Vec<[usize; 3]> = self
            .mesh
            .triangles()
            .iter()
            .map(|t| t.vertices)
            .filter(|v| v.iter().all(|&x| !kernel.is_symbolic(x)))
            .collect();

        let mesh = if triangles.is_empty() {
            // Collinear (or two-site) input: chain consecutive distinct sites
            let mut chain: Vec<usize> = order
                .iter()
                .copied()
                .filter(|s| !self.duplicates.contains(s))
                .collect();
            chain.sort_by(|&a, &b| kernel.lex_cmp(a, b).then(a.cmp(&b)));
            HalfEdgeMesh::from_path(&chain)
        } else {
            HalfEdgeMesh::from_triangles(&triangles)
        };

        let mut duplicates = self.duplicates;
        duplicates.sort_unstable();

        tracing::debug!(
            sites = kernel.sites.len(),
            triangles = triangles.len(),
            duplicates = duplicates.len(),
            flips = self.flips,
            history_nodes = self.dag.node_count(),
            "delaunay construction finished"
        );

        Triangulation {
            triangles,
            mesh,
            duplicates,
            site_count: kernel.sites.len(),
            flips: self.flips,
            history_nodes: self.dag.node_count(),
        }
    }
}

/// Convenience: order + build in one call
pub fn triangulate(sites: &[DVec2], epsilon: f64, seed: Option<u64>) -> Triangulation {
    let order = insertion_order(sites, seed);
    DelaunayBuilder::new(sites, epsilon).build(&order)
}
