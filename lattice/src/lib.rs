//! A generalized Kuramoto phase-oscillator lattice (spec overview): a
//! double-buffered phase field stepped under one of six coupling rules and
//! seven spatial kernel shapes, with optional global mean-field coupling,
//! sparse graph topology, per-cell external injection, a 32-slot delay ring,
//! and up to eight independently parameterized, inter-coupled layers.
//!
//! [`LatticeSim`] is the crate's single entry point: construct it with a
//! [`Params`]/`LayerParams` pair, seed θ/ω, then call [`LatticeSim::step`]
//! once per tick. Everything else here — `reducer`, `rules`, `integrator` —
//! is the machinery `step` is built from; most callers never touch it
//! directly.

pub mod config;
pub mod error;
pub mod integrator;
pub mod reducer;
pub mod rules;
pub mod sim;
pub mod snapshot;
pub mod timing;
pub mod topology;
pub mod uniform;

pub use config::{ParamStore, Params};
pub use error::LatticeError;
pub use sim::LatticeSim;
pub use snapshot::LatticeSnapshot;
pub use timing::TimingTree;

pub use kuramoto_field::{Graph, InjectionMode, KernelShapeKind, LayerParams, RuleMode, MAX_GRAPH_DEGREE, MAX_LAYERS, MAX_RING_BANDS};
