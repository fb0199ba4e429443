//! Sparse adjacency for `topology_mode` (spec §3 "Graph adjacency"): three
//! parallel, fixed-degree arrays in place of the spatial neighborhood.

use crate::types::MAX_GRAPH_DEGREE;

/// Row-major `[i, j]` triple with stride [`MAX_GRAPH_DEGREE`], matching the
/// external layout contract in spec §6. `neighbors[i*D+j]` and
/// `weights[i*D+j]` are only meaningful for `j < counts[i]`.
#[derive(Clone, Debug)]
pub struct Graph {
    size: usize,
    neighbors: Vec<u32>,
    weights: Vec<f32>,
    counts: Vec<u8>,
}

impl Graph {
    /// An empty adjacency table over `size` cells (every `counts[i] == 0`).
    pub fn empty(size: usize) -> Self {
        Self {
            size,
            neighbors: vec![0; size * MAX_GRAPH_DEGREE],
            weights: vec![0.0; size * MAX_GRAPH_DEGREE],
            counts: vec![0; size],
        }
    }

    pub const fn size(&self) -> usize {
        self.size
    }

    /// Replace cell `i`'s edge list. `edges` is truncated to
    /// [`MAX_GRAPH_DEGREE`] entries, clamping `counts[i]` as the spec
    /// requires ("clamped ≤ D_max").
    pub fn set_edges(&mut self, i: usize, edges: &[(u32, f32)]) {
        let n = edges.len().min(MAX_GRAPH_DEGREE);
        let base = i * MAX_GRAPH_DEGREE;
        for (j, &(neighbor, weight)) in edges.iter().take(n).enumerate() {
            self.neighbors[base + j] = neighbor;
            self.weights[base + j] = weight;
        }
        self.counts[i] = n as u8;
    }

    #[inline]
    pub fn edges(&self, i: usize) -> impl Iterator<Item = (u32, f32)> + '_ {
        let base = i * MAX_GRAPH_DEGREE;
        let count = self.counts[i] as usize;
        (0..count).map(move |j| (self.neighbors[base + j], self.weights[base + j]))
    }

    #[inline]
    pub fn degree(&self, i: usize) -> usize {
        self.counts[i] as usize
    }

    /// The three parallel arrays, for a caller that wants to persist or
    /// reconstruct this table directly (spec §3 "Graph adjacency").
    pub fn raw_parts(&self) -> (&[u32], &[f32], &[u8]) {
        (&self.neighbors, &self.weights, &self.counts)
    }

    /// Rebuild a `Graph` from the three parallel arrays produced by
    /// [`Graph::raw_parts`].
    pub fn from_raw_parts(size: usize, neighbors: Vec<u32>, weights: Vec<f32>, counts: Vec<u8>) -> Self {
        Self { size, neighbors, weights, counts }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edges_round_trip() {
        let mut g = Graph::empty(3);
        g.set_edges(0, &[(1, 0.5), (2, -0.25)]);
        let edges: Vec<_> = g.edges(0).collect();
        assert_eq!(edges, vec![(1, 0.5), (2, -0.25)]);
        assert_eq!(g.degree(1), 0);
    }

    #[test]
    fn set_edges_clamps_to_max_degree() {
        let mut g = Graph::empty(1);
        let many: Vec<(u32, f32)> = (0..32).map(|i| (i, 1.0)).collect();
        g.set_edges(0, &many);
        assert_eq!(g.degree(0), MAX_GRAPH_DEGREE);
    }
}
