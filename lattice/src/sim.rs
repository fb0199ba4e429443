//! The facade (spec §6 "External interfaces"): the single type a caller
//! constructs, seeds, steps, and reads back. Owns the parameter store, the
//! field state, the delay ring, and the optional graph; ties them to the
//! reducer/rules/integrator pipeline each tick.

use log::debug;

use kuramoto_field::{batch, DelayRing, FieldState, Graph, LayerParams, MAX_LAYERS};

use crate::config::{ParamStore, Params};
use crate::error::LatticeError;
use crate::integrator::{self, StepContext};
use crate::snapshot::LatticeSnapshot;
use crate::timing::TimingTree;
use crate::{timed, uniform};

#[derive(Debug)]
pub struct LatticeSim {
    store: ParamStore,
    field: FieldState,
    delay: DelayRing,
    graph: Option<Graph>,
    step_count: u64,
    timing: TimingTree,
}

impl LatticeSim {
    pub fn new(params: Params, layers: [LayerParams; MAX_LAYERS]) -> Result<Self, LatticeError> {
        let store = ParamStore::new(params, layers)?;
        let p = store.params();
        let field = FieldState::new(p.layer_count, p.rows, p.cols);
        let delay = DelayRing::new(field.theta_front());
        Ok(Self {
            store,
            field,
            delay,
            graph: None,
            step_count: 0,
            timing: TimingTree::default(),
        })
    }

    pub fn params(&self) -> &Params {
        self.store.params()
    }

    pub fn layers(&self) -> &[LayerParams; MAX_LAYERS] {
        self.store.layers()
    }

    pub fn rows(&self) -> usize {
        self.field.rows()
    }

    pub fn cols(&self) -> usize {
        self.field.cols()
    }

    pub fn layer_count(&self) -> usize {
        self.field.layers()
    }

    /// Read-only view of θ_front, flat `(layer, row, col)` (spec §6 "Exposed").
    pub fn theta(&self) -> &[f32] {
        self.field.theta_front()
    }

    /// Read-only view of the local order buffer (spec §6 "Exposed").
    pub fn order(&self) -> &[f32] {
        self.field.order()
    }

    pub fn update_full(&mut self, params: Params, layers: [LayerParams; MAX_LAYERS]) -> Result<(), LatticeError> {
        self.store.update_full(params, layers)
    }

    pub fn update_tick(&mut self, dt_effective: f32, time: f32) {
        self.store.update_tick(dt_effective, time);
    }

    /// Seed θ_front (and θ_back) and reset the delay ring to copies of it
    /// (spec §6 "write_theta... also resets the delay ring").
    pub fn write_theta(&mut self, values: &[f32]) -> Result<(), LatticeError> {
        if values.len() != self.field.size() {
            return Err(LatticeError::Configuration(format!(
                "write_theta: expected {} values, got {}",
                self.field.size(),
                values.len()
            )));
        }
        self.field.seed_theta(values);
        self.delay.reset(self.field.theta_front());
        Ok(())
    }

    pub fn write_omega(&mut self, values: &[f32]) -> Result<(), LatticeError> {
        if values.len() != self.field.size() {
            return Err(LatticeError::Configuration(format!(
                "write_omega: expected {} values, got {}",
                self.field.size(),
                values.len()
            )));
        }
        self.field.seed_omega(values);
        Ok(())
    }

    pub fn write_input_mask(&mut self, values: &[f32]) -> Result<(), LatticeError> {
        if values.len() != self.field.size() {
            return Err(LatticeError::Configuration(format!(
                "write_input_mask: expected {} values, got {}",
                self.field.size(),
                values.len()
            )));
        }
        self.field.seed_input_mask(values);
        Ok(())
    }

    pub fn set_input_signal(&mut self, signal: f32) {
        self.store.set_input_signal(signal);
    }

    /// Install (or clear, with `None`) the sparse adjacency used when
    /// `topology_mode` is on. Sized per layer (`rows * cols`), per the
    /// scoping decision recorded in DESIGN.md.
    pub fn set_graph(&mut self, graph: Option<Graph>) {
        self.graph = graph;
    }

    /// Reallocate every per-size buffer and reseed the delay ring (spec §6
    /// "resize... invalidates and recreates all per-size resources").
    pub fn resize(&mut self, layer_count: usize, rows: usize, cols: usize) -> Result<(), LatticeError> {
        if layer_count == 0 || layer_count > MAX_LAYERS {
            return Err(LatticeError::Configuration(format!("layer_count {layer_count} out of bounds")));
        }
        if rows == 0 || cols == 0 {
            return Err(LatticeError::Resource("resize to a zero-sized grid".into()));
        }
        self.field.resize(layer_count, rows, cols);
        self.delay.reset(self.field.theta_front());
        self.graph = None;
        let mut params = *self.store.params();
        params.layer_count = layer_count;
        params.rows = rows;
        params.cols = cols;
        if params.active_layer >= layer_count {
            params.active_layer = 0;
        }
        self.store.update_full(params, *self.store.layers())
    }

    /// Advance the field by one tick (spec §4.6, §5). Runs every active
    /// layer's integration independently (row-band parallel within a
    /// layer), pushes the pre-step θ_front into the delay ring, then swaps.
    pub fn step(&mut self) -> Result<(), LatticeError> {
        timed!(self.timing, "step", self.step_inner())
    }

    fn step_inner(&mut self) -> Result<(), LatticeError> {
        let params = *self.store.params();
        let layers = *self.store.layers();
        let rows = self.field.rows();
        let cols = self.field.cols();
        let layer_count = self.field.layers();
        let layer_size = rows * cols;

        self.delay.push(self.field.theta_front());

        let front_full = self.field.theta_front();
        let all_front: Vec<&[f32]> = (0..layer_count).map(|l| &front_full[l * layer_size..(l + 1) * layer_size]).collect();
        let delay_full = self.delay.read(params.delay_steps.max(1));

        let ctx = StepContext {
            dt: params.dt,
            time_seed: self.step_count as u32,
            global_coupling: params.global_coupling,
            topology_mode: params.topology_mode,
            injection_mode: params.injection_mode,
            input_signal: params.input_signal,
            delay_steps: params.delay_steps,
        };

        let omega = self.field.omega();
        let input_mask = self.field.input_mask();

        let mut new_theta = vec![0.0f32; layer_count * layer_size];
        let mut new_order = vec![0.0f32; layer_count * layer_size];
        for layer_index in 0..layer_count {
            let omega_layer = &omega[layer_index * layer_size..(layer_index + 1) * layer_size];
            let mask_layer = &input_mask[layer_index * layer_size..(layer_index + 1) * layer_size];
            let delay_layer = &delay_full[layer_index * layer_size..(layer_index + 1) * layer_size];
            let result = timed!(
                self.timing,
                "layer",
                integrator::step_layer(
                    layer_index,
                    layer_count,
                    rows,
                    cols,
                    &all_front,
                    &layers,
                    omega_layer,
                    delay_layer,
                    mask_layer,
                    self.graph.as_ref(),
                    &ctx,
                )
            );
            let base = layer_index * layer_size;
            new_theta[base..base + layer_size].copy_from_slice(&result.theta);
            new_order[base..base + layer_size].copy_from_slice(&result.order);
        }

        #[cfg(feature = "numerical-checks")]
        if let Some(cell_index) = batch::first_out_of_range(&new_theta) {
            return Err(LatticeError::NumericalAnomaly { cell_index });
        }

        self.field.theta_back_mut().copy_from_slice(&new_theta);
        self.field.order_mut().copy_from_slice(&new_order);
        self.field.swap();
        self.step_count += 1;
        debug!("step {} complete ({} cells/layer, {} layers)", self.step_count, layer_size, layer_count);
        Ok(())
    }

    pub fn snapshot(&self) -> LatticeSnapshot {
        let (neighbors, weights, counts) = self
            .graph
            .as_ref()
            .map(Graph::raw_parts)
            .unwrap_or((&[], &[], &[]));
        LatticeSnapshot {
            params: *self.store.params(),
            layers: Box::new(*self.store.layers()),
            rows: self.field.rows(),
            cols: self.field.cols(),
            theta: self.field.theta_front().to_vec(),
            omega: self.field.omega().to_vec(),
            delay_snapshots: self.delay.snapshots().to_vec(),
            delay_cursor: self.delay.cursor(),
            graph_size: self.graph.as_ref().map(Graph::size).unwrap_or(0),
            graph_neighbors: neighbors.to_vec(),
            graph_weights: weights.to_vec(),
            graph_counts: counts.to_vec(),
        }
    }

    pub fn restore(&mut self, snapshot: &LatticeSnapshot) -> Result<(), LatticeError> {
        self.store.update_full(snapshot.params, *snapshot.layers)?;
        self.field.resize(snapshot.params.layer_count, snapshot.rows, snapshot.cols);
        self.field.seed_theta(&snapshot.theta);
        self.field.seed_omega(&snapshot.omega);
        self.delay = snapshot.delay_ring();
        self.graph = if snapshot.graph_size > 0 { Some(snapshot.graph()) } else { None };
        Ok(())
    }

    /// A finished-and-parked uniform, for a collaborator whose render/compute
    /// backend expects the GPU-layout bytes (spec §6, §9).
    pub fn params_uniform_bytes(&self) -> [u8; uniform::PARAMS_UNIFORM_BYTES] {
        uniform::params_to_uniform_bytes(self.store.params())
    }

    pub fn layer_uniform_bytes(&self, layer_index: usize) -> [u8; uniform::LAYER_PARAMS_UNIFORM_BYTES] {
        uniform::layer_params_to_uniform_bytes(self.store.layer(layer_index))
    }

    pub fn timing(&self) -> &TimingTree {
        &self.timing
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kuramoto_field::RuleMode;
    use std::array;

    fn layers_with(rule: RuleMode, k0: f32, range: f32) -> [LayerParams; MAX_LAYERS] {
        array::from_fn(|_| LayerParams { rule_mode: rule, k0, range, ..Default::default() })
    }

    #[test]
    fn uniform_phase_is_a_fixed_point() {
        let mut p = Params::default();
        p.rows = 8;
        p.cols = 8;
        p.dt = 0.05;
        let mut sim = LatticeSim::new(p, layers_with(RuleMode::Classic, 1.0, 1.0)).unwrap();
        sim.write_theta(&vec![1.0f32; 64]).unwrap();
        sim.write_omega(&vec![0.0f32; 64]).unwrap();
        for _ in 0..100 {
            sim.step().unwrap();
        }
        for &t in sim.theta() {
            assert!((t - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn resize_reallocates_and_reseeds_delay_ring() {
        let mut sim = LatticeSim::new(Params::default(), layers_with(RuleMode::Classic, 1.0, 1.0)).unwrap();
        sim.resize(1, 4, 4).unwrap();
        assert_eq!(sim.rows(), 4);
        assert_eq!(sim.cols(), 4);
        assert_eq!(sim.theta().len(), 16);
    }

    #[test]
    fn snapshot_restore_round_trips_theta() {
        let mut sim = LatticeSim::new(Params::default(), layers_with(RuleMode::Classic, 1.0, 1.0)).unwrap();
        let mut theta = vec![0.0f32; sim.theta().len()];
        for (i, t) in theta.iter_mut().enumerate() {
            *t = (i as f32 * 0.37) % std::f32::consts::TAU;
        }
        sim.write_theta(&theta).unwrap();
        let snap = sim.snapshot();

        let mut restored = LatticeSim::new(Params::default(), layers_with(RuleMode::Classic, 1.0, 1.0)).unwrap();
        restored.restore(&snap).unwrap();
        for (a, b) in restored.theta().iter().zip(sim.theta()) {
            assert!((a - b).abs() < 1e-6);
        }
    }

    #[test]
    fn step_rejects_mismatched_theta_length() {
        let mut sim = LatticeSim::new(Params::default(), layers_with(RuleMode::Classic, 1.0, 1.0)).unwrap();
        assert!(sim.write_theta(&[0.0, 1.0]).is_err());
    }
}
