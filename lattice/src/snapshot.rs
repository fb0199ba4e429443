//! The persisted-state value type (spec §3 "Snapshot", §6 "Persisted state
//! layout"). This crate performs no file I/O; it only gives the bundle a
//! concrete, serializable shape for a collaborator to write and read back.

use kuramoto_field::{DelayRing, Graph, LayerParams, MAX_LAYERS};
use serde::{Deserialize, Serialize};

use crate::config::Params;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LatticeSnapshot {
    pub params: Params,
    pub layers: Box<[LayerParams; MAX_LAYERS]>,
    pub rows: usize,
    pub cols: usize,
    /// Flat `(layer, row, col)` phase field, length `layer_count * rows * cols`.
    pub theta: Vec<f32>,
    pub omega: Vec<f32>,
    pub delay_snapshots: Vec<Vec<f32>>,
    pub delay_cursor: usize,
    pub graph_size: usize,
    pub graph_neighbors: Vec<u32>,
    pub graph_weights: Vec<f32>,
    pub graph_counts: Vec<u8>,
}

impl LatticeSnapshot {
    pub fn delay_ring(&self) -> DelayRing {
        DelayRing::from_parts(self.delay_snapshots.clone(), self.delay_cursor)
    }

    pub fn graph(&self) -> Graph {
        Graph::from_raw_parts(
            self.graph_size,
            self.graph_neighbors.clone(),
            self.graph_weights.clone(),
            self.graph_counts.clone(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_json() {
        let graph = Graph::empty(4);
        let (neighbors, weights, counts) = graph.raw_parts();
        let snap = LatticeSnapshot {
            params: Params::default(),
            layers: Box::new(std::array::from_fn(|_| LayerParams::default())),
            rows: 2,
            cols: 2,
            theta: vec![0.0; 4],
            omega: vec![0.0; 4],
            delay_snapshots: vec![vec![0.0; 4]; kuramoto_field::delay::RING_SIZE],
            delay_cursor: 0,
            graph_size: 4,
            graph_neighbors: neighbors.to_vec(),
            graph_weights: weights.to_vec(),
            graph_counts: counts.to_vec(),
        };
        let json = serde_json::to_string(&snap).expect("serialize");
        let restored: LatticeSnapshot = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(restored.theta, snap.theta);
        assert_eq!(restored.rows, snap.rows);
    }
}
