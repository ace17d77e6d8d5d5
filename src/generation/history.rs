//! History DAG for point location
//!
//! Every triangle that ever existed during construction gets a node. Live
//! nodes (leaves) mirror the current triangles of the mesh; retired nodes
//! keep their vertex triple so a query can still descend through them.
//! Nodes are addressed by index and never freed individually: a flip makes
//! two new nodes children of both retired ones, so a node can have several
//! parents.

/// Maximum number of children a retired node can have (1 -> 3 split)
const MAX_CHILDREN: usize = 3;

#[derive(Debug, Clone)]
struct Node {
    vertices: [usize; 3],
    /// Mesh slot this node described while it was live
    triangle: usize,
    live: bool,
    children: [usize; MAX_CHILDREN],
    child_count: u8,
}

impl Node {
    fn children(&self) -> &[usize] {
        &self.children[..self.child_count as usize]
    }
}

/// Append-only point-location DAG
#[derive(Debug, Clone)]
pub struct HistoryDag {
    nodes: Vec<Node>,
    /// Live node for each mesh triangle slot
    leaf_of: Vec<usize>,
}

impl HistoryDag {
    /// DAG with a single live root describing mesh triangle `triangle`
    pub fn new(triangle: usize, vertices: [usize; 3]) -> Self {
        let mut dag = Self {
            nodes: Vec::new(),
            leaf_of: Vec::new(),
        };
        dag.push_leaf(triangle, vertices);
        dag
    }

    /// DAG sized for `sites` insertions (roughly 9 nodes per site)
    pub fn with_capacity(triangle: usize, vertices: [usize; 3], sites: usize) -> Self {
        let mut dag = Self {
            nodes: Vec::with_capacity(9 * sites + 1),
            leaf_of: Vec::with_capacity(2 * sites + 1),
        };
        dag.push_leaf(triangle, vertices);
        dag
    }

    #[inline]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn live_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.live).count()
    }

    /// Live node currently describing mesh triangle `triangle`
    #[inline]
    pub fn leaf_of(&self, triangle: usize) -> usize {
        self.leaf_of[triangle]
    }

    #[inline]
    pub fn is_live(&self, node: usize) -> bool {
        self.nodes[node].live
    }

    #[inline]
    pub fn vertices(&self, node: usize) -> [usize; 3] {
        self.nodes[node].vertices
    }

    pub fn children(&self, node: usize) -> &[usize] {
        self.nodes[node].children()
    }

    fn push_leaf(&mut self, triangle: usize, vertices: [usize; 3]) -> usize {
        let id = self.nodes.len();
        self.nodes.push(Node {
            vertices,
            triangle,
            live: true,
            children: [0; MAX_CHILDREN],
            child_count: 0,
        });
        if triangle >= self.leaf_of.len() {
            self.leaf_of.resize(triangle + 1, usize::MAX);
        }
        self.leaf_of[triangle] = id;
        id
    }

    /// Retires the live nodes of `retired` slots and records `created` triangles
    ///
    /// Every created node becomes a child of every retired node. Slots may be
    /// reused: a created triangle can live in a slot that was just retired.
    ///
    /// # Panics
    ///
    /// Panics if a retired slot has no live node or a parent would exceed
    /// three children.
    pub fn replace(&mut self, retired: &[usize], created: &[(usize, [usize; 3])]) {
        let mut parents = [0usize; 2];
        assert!(retired.len() <= parents.len(), "at most two triangles retire at once");
        for (slot, &triangle) in parents.iter_mut().zip(retired) {
            let node = self.leaf_of[triangle];
            assert!(
                self.nodes[node].live,
                "triangle {} has no live history node",
                triangle
            );
            self.nodes[node].live = false;
            *slot = node;
        }

        for &(triangle, vertices) in created {
            let child = self.push_leaf(triangle, vertices);
            for &parent in &parents[..retired.len()] {
                let node = &mut self.nodes[parent];
                let count = node.child_count as usize;
                assert!(count < MAX_CHILDREN, "history node {} is full", parent);
                node.children[count] = child;
                node.child_count += 1;
            }
        }
    }

    /// Descends from the root to the live triangle containing a query
    ///
    /// `outside` reports for a vertex triple how many of its three edges the
    /// query lies strictly outside of (0 means inside or on the boundary).
    /// The first child scoring 0 is taken; if rounding leaves no child at 0,
    /// the child with the lowest score wins, earliest first. Returns the mesh
    /// triangle slot of the reached leaf.
    pub fn locate<F>(&self, mut outside: F) -> usize
    where
        F: FnMut(&[usize; 3]) -> usize,
    {
        let mut node = 0;
        loop {
            let current = &self.nodes[node];
            if current.live {
                return current.triangle;
            }

            let children = current.children();
            assert!(!children.is_empty(), "retired history node {} has no children", node);

            let mut best = children[0];
            let mut best_score = usize::MAX;
            for &child in children {
                let score = outside(&self.nodes[child].vertices);
                if score < best_score {
                    best = child;
                    best_score = score;
                    if score == 0 {
                        break;
                    }
                }
            }
            node = best;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_is_leaf() {
        let dag = HistoryDag::new(0, [0, 1, 2]);
        assert_eq!(dag.node_count(), 1);
        assert_eq!(dag.locate(|_| 0), 0);
        assert!(dag.is_live(dag.leaf_of(0)));
    }

    #[test]
    fn test_split_then_locate() {
        let mut dag = HistoryDag::new(0, [0, 1, 2]);
        dag.replace(&[0], &[(0, [0, 1, 3]), (1, [1, 2, 3]), (2, [2, 0, 3])]);

        assert_eq!(dag.node_count(), 4);
        assert_eq!(dag.live_count(), 3);
        assert_eq!(dag.children(0).len(), 3);

        // Query inside the triangle containing vertex 2 and 0
        let found = dag.locate(|v| if v.contains(&2) && v.contains(&0) { 0 } else { 1 });
        assert_eq!(found, 2);
    }

    #[test]
    fn test_flip_gives_two_parents() {
        let mut dag = HistoryDag::new(0, [0, 1, 2]);
        dag.replace(&[0], &[(0, [0, 1, 3]), (1, [1, 2, 3]), (2, [2, 0, 3])]);
        let before = (dag.leaf_of(0), dag.leaf_of(1));
        dag.replace(&[0, 1], &[(0, [3, 0, 2]), (1, [2, 1, 3])]);

        assert!(!dag.is_live(before.0) && !dag.is_live(before.1));
        assert_eq!(dag.children(before.0), dag.children(before.1));
        assert_eq!(dag.live_count(), 3);
    }

    #[test]
    fn test_locate_falls_back_to_lowest_score() {
        let mut dag = HistoryDag::new(0, [0, 1, 2]);
        dag.replace(&[0], &[(0, [0, 1, 3]), (1, [1, 2, 3])]);
        let found = dag.locate(|v| if v[0] == 1 { 1 } else { 2 });
        assert_eq!(found, 1);
    }

    #[test]
    #[should_panic(expected = "no live history node")]
    fn test_retiring_twice_panics() {
        let mut dag = HistoryDag::new(0, [0, 1, 2]);
        dag.replace(&[0], &[(1, [0, 1, 3])]);
        dag.replace(&[0], &[(2, [0, 1, 3])]);
    }
}
