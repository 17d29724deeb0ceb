//! Minimum spanning tree over triangulation edges, with a controlled number
//! of discarded edges re-added so dungeons are not pure trees.

use crate::geometry::Vec3;
use crate::random::Random;

/// Fraction of non-tree edges put back to create loops.
pub const EXTRA_EDGE_PROBABILITY: f64 = 0.04;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Edge {
    pub a: usize,
    pub b: usize,
    pub length: f64,
    /// True for spanning-tree edges, false for re-added loop edges.
    pub spanning: bool,
}

/// Kruskal over `edges` weighted by the distance between `points`. The result
/// keeps ascending-length order, which downstream corridor carving relies on
/// to bias reuse toward short corridors. Each discarded edge is re-added with
/// `extra_edge_probability`; the random draw happens for every discarded edge
/// so the sequence stays seed-stable regardless of outcomes.
pub fn minimum_spanning_tree(
    points: &[Vec3],
    edges: &[(usize, usize)],
    random: &mut Random,
    extra_edge_probability: f64,
) -> Vec<Edge> {
    let mut candidates: Vec<Edge> = edges
        .iter()
        .map(|&(a, b)| Edge { a, b, length: points[a].distance(points[b]), spanning: false })
        .collect();
    candidates.sort_by(|left, right| {
        left.length
            .total_cmp(&right.length)
            .then(left.a.cmp(&right.a))
            .then(left.b.cmp(&right.b))
    });

    let mut forest = UnionFind::new(points.len());
    let mut result = Vec::with_capacity(candidates.len());
    for mut edge in candidates {
        if forest.union(edge.a, edge.b) {
            edge.spanning = true;
            result.push(edge);
        } else if random.real_in(0.0, 1.0) < extra_edge_probability {
            result.push(edge);
        }
    }
    result
}

struct UnionFind {
    parent: Vec<usize>,
}

impl UnionFind {
    fn new(size: usize) -> Self {
        Self { parent: (0..size).collect() }
    }

    fn find(&mut self, mut node: usize) -> usize {
        while self.parent[node] != node {
            self.parent[node] = self.parent[self.parent[node]];
            node = self.parent[node];
        }
        node
    }

    fn union(&mut self, a: usize, b: usize) -> bool {
        let root_a = self.find(a);
        let root_b = self.find(b);
        if root_a == root_b {
            return false;
        }
        self.parent[root_a] = root_b;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat(x: f64, y: f64) -> Vec3 {
        Vec3::new(x, y, 0.0)
    }

    #[test]
    fn tree_without_extras_has_point_count_minus_one_edges() {
        let points =
            [flat(0.0, 0.0), flat(4.0, 0.0), flat(4.0, 3.0), flat(0.0, 3.0)];
        let edges = [(0, 1), (1, 2), (2, 3), (0, 3), (0, 2), (1, 3)];
        let mut random = Random::new(5);

        let tree = minimum_spanning_tree(&points, &edges, &mut random, 0.0);

        assert_eq!(tree.len(), 3);
        assert!(tree.iter().all(|edge| edge.spanning));
        // Weights ascend.
        for pair in tree.windows(2) {
            assert!(pair[0].length <= pair[1].length);
        }
        // The two long diagonals lose to the sides.
        assert!(tree.iter().all(|edge| edge.length < 5.0));
    }

    #[test]
    fn forced_extras_bring_every_edge_back() {
        let points = [flat(0.0, 0.0), flat(1.0, 0.0), flat(0.0, 1.0)];
        let edges = [(0, 1), (0, 2), (1, 2)];
        let mut random = Random::new(5);

        let all = minimum_spanning_tree(&points, &edges, &mut random, 1.0);
        assert_eq!(all.len(), 3);
        assert_eq!(all.iter().filter(|edge| edge.spanning).count(), 2);
        assert_eq!(all.iter().filter(|edge| !edge.spanning).count(), 1);
    }

    #[test]
    fn same_seed_same_tree() {
        let points: Vec<Vec3> =
            (0..12).map(|i| flat((i * 7 % 13) as f64, (i * 5 % 11) as f64)).collect();
        let edges: Vec<(usize, usize)> =
            (0..12).flat_map(|a| ((a + 1)..12).map(move |b| (a, b))).collect();

        let first =
            minimum_spanning_tree(&points, &edges, &mut Random::new(9), EXTRA_EDGE_PROBABILITY);
        let second =
            minimum_spanning_tree(&points, &edges, &mut Random::new(9), EXTRA_EDGE_PROBABILITY);
        assert_eq!(first, second);
    }
}
