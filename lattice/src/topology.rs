//! Graph adjacency builder helpers (SPEC_FULL.md "Supplemented features").
//! `kuramoto_field::Graph` only owns the raw CSR-like triple; the handful of
//! constructors here build common topologies on top of it so tests and
//! example callers don't hand-roll index arithmetic for every scenario.
//! These are test/example-grade conveniences, not a general graph library.

use kuramoto_field::Graph;
use rand::Rng;

/// Each cell `i` connects only to its left neighbor `(i - 1) mod n`, with a
/// single edge of the given weight (spec §8 scenario 6 "Graph ring").
pub fn left_neighbor_ring(n: usize, weight: f32) -> Graph {
    let mut graph = Graph::empty(n);
    for i in 0..n {
        let left = (i + n - 1) % n;
        graph.set_edges(i, &[(left as u32, weight)]);
    }
    graph
}

/// Each cell on an `rows x cols` torus connects to its four von Neumann
/// neighbors (up/down/left/right), each with the given weight.
pub fn grid_four_neighbor(rows: usize, cols: usize, weight: f32) -> Graph {
    let n = rows * cols;
    let mut graph = Graph::empty(n);
    for r in 0..rows {
        for c in 0..cols {
            let i = r * cols + c;
            let up = ((r + rows - 1) % rows) * cols + c;
            let down = ((r + 1) % rows) * cols + c;
            let left = r * cols + (c + cols - 1) % cols;
            let right = r * cols + (c + 1) % cols;
            graph.set_edges(i, &[(up as u32, weight), (down as u32, weight), (left as u32, weight), (right as u32, weight)]);
        }
    }
    graph
}

/// A k-regular random graph: each cell picks `k` distinct neighbors uniformly
/// at random (excluding itself), all with unit weight. Not guaranteed
/// symmetric — the spec explicitly does not require undirected semantics.
pub fn k_regular_random<R: Rng + ?Sized>(n: usize, k: usize, rng: &mut R) -> Graph {
    let k = k.min(kuramoto_field::MAX_GRAPH_DEGREE).min(n.saturating_sub(1));
    let mut graph = Graph::empty(n);
    for i in 0..n {
        let mut picked = Vec::with_capacity(k);
        while picked.len() < k {
            let candidate = rng.gen_range(0..n);
            if candidate != i && !picked.iter().any(|&(j, _)| j == candidate as u32) {
                picked.push((candidate as u32, 1.0));
            }
        }
        graph.set_edges(i, &picked);
    }
    graph
}

/// Build a graph from an explicit, already-computed edge list per cell.
/// A thin pass-through over [`Graph::set_edges`] so callers building a
/// topology from outside data don't need to touch `Graph` directly.
pub fn from_edge_lists(n: usize, edges: &[Vec<(u32, f32)>]) -> Graph {
    assert_eq!(edges.len(), n, "edge list count must match cell count");
    let mut graph = Graph::empty(n);
    for (i, list) in edges.iter().enumerate() {
        graph.set_edges(i, list);
    }
    graph
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn left_neighbor_ring_wraps_at_zero() {
        let g = left_neighbor_ring(5, 1.0);
        assert_eq!(g.edges(0).collect::<Vec<_>>(), vec![(4, 1.0)]);
        assert_eq!(g.edges(3).collect::<Vec<_>>(), vec![(2, 1.0)]);
    }

    #[test]
    fn grid_four_neighbor_wraps_toroidally() {
        let g = grid_four_neighbor(3, 3, 1.0);
        // cell (0,0) = index 0; up wraps to row 2, down to row 1, left wraps to col 2, right to col 1.
        let edges: Vec<u32> = g.edges(0).map(|(j, _)| j).collect();
        assert_eq!(edges, vec![6, 3, 2, 1]);
    }

    #[test]
    fn k_regular_random_is_deterministic_for_a_seeded_rng() {
        let mut rng_a = ChaCha8Rng::seed_from_u64(7);
        let mut rng_b = ChaCha8Rng::seed_from_u64(7);
        let ga = k_regular_random(20, 3, &mut rng_a);
        let gb = k_regular_random(20, 3, &mut rng_b);
        for i in 0..20 {
            assert_eq!(ga.edges(i).collect::<Vec<_>>(), gb.edges(i).collect::<Vec<_>>());
            assert_eq!(ga.degree(i), 3);
        }
    }

    #[test]
    fn from_edge_lists_round_trips() {
        let g = from_edge_lists(2, &[vec![(1, 0.5)], vec![]]);
        assert_eq!(g.edges(0).collect::<Vec<_>>(), vec![(1, 0.5)]);
        assert_eq!(g.degree(1), 0);
    }
}
