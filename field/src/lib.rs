//! Field state machinery and kernel algebra for the Kuramoto lattice
//! (spec §4.2, §4.3). This crate owns the data: the double-buffered phase
//! field, the delay ring, the optional sparse graph, the mean field, and the
//! pure spatial-kernel weight function. It knows nothing about scheduling,
//! rule evaluation, or the parameter store — those live one layer up, in
//! `kuramoto_lattice`, which is the only crate that mutates this state.

#![deny(missing_debug_implementations)]

pub mod batch;
pub mod delay;
pub mod graph;
pub mod kernel;
pub mod mean_field;
pub mod phase;
pub mod state;
pub mod types;

pub use delay::DelayRing;
pub use graph::Graph;
pub use mean_field::{reduce_mean_field, MeanField, MeanFieldSource};
pub use state::FieldState;
pub use types::{InjectionMode, KernelShapeKind, LayerParams, RuleMode, MAX_GRAPH_DEGREE, MAX_LAYERS, MAX_RING_BANDS};
