//! Closed-set configuration values, expressed as tagged sums rather than the
//! source's float-encoded sentinels (see design note "string-sentinel mode
//! switches" — a finite mode belongs in an `enum`, not a magic number).

use serde::{Deserialize, Serialize};

/// Coupling rule: how the drive `dθ` is derived from neighboring phases.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum RuleMode {
    /// `K0 · Σ sin(θ_j - θ_i) / norm`, with mean-field and graph fallbacks.
    Classic,
    /// Classic, but `K_eff` is damped by this cell's local order `R_i`.
    Coherence,
    /// Saturating curvature-like field built from the local phase-sum mean.
    Curvature,
    /// Sum of first/second/third sine harmonics of the neighbor phase gap.
    Harmonics,
    /// Classic-shaped sum weighted by the kernel algebra instead of unit weights.
    KernelWeighted,
    /// Classic-shaped sum read from the delay ring instead of from θ_front.
    Delayed,
}

/// Spatial kernel shape; see `kernel::weight` for the formulas.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum KernelShapeKind {
    Isotropic,
    Anisotropic,
    MultiScale,
    Asymmetric,
    Step,
    MultiRing,
    Gabor,
}

/// How the external scalar input signal and per-cell mask enter the dynamics.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum InjectionMode {
    /// `ω_eff ← ω + 5 · mask · signal`.
    Frequency,
    /// `d_input ← 5 · mask · signal`, summed into the dynamics directly.
    Additive,
    /// `d ← d · (1 + 0.5 · mask · signal)`, modulating the rule drive.
    CouplingModulation,
}

pub const MAX_LAYERS: usize = 8;
pub const MAX_RING_BANDS: usize = 5;
pub const MAX_GRAPH_DEGREE: usize = 16;

/// Per-layer overrides: rule, kernel shape coefficients, per-cell interaction
/// modifiers, and inter-layer coupling gains. One of these exists per active
/// layer (spec §3 "LayerParams[L]").
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct LayerParams {
    pub rule_mode: RuleMode,
    pub k0: f32,
    pub range: f32,
    pub harmonic_a: f32,
    pub harmonic_b: f32,
    pub sigma1: f32,
    pub sigma2: f32,
    pub beta: f32,
    pub noise: f32,
    pub leak: f32,

    pub kernel_shape: KernelShapeKind,
    pub orientation: f32,
    pub aspect: f32,
    pub scale2_weight: f32,
    pub scale3_weight: f32,
    pub asymmetry: f32,
    pub asymmetry_orientation: f32,
    pub ring_widths: [f32; MAX_RING_BANDS],
    pub ring_weights: [f32; MAX_RING_BANDS],
    pub compose: bool,
    pub compose_shape: KernelShapeKind,
    pub compose_mix: f32,
    pub gabor_k: f32,
    pub gabor_theta: f32,
    pub gabor_phi: f32,

    pub scale_base: f32,
    pub scale_radial: f32,
    pub scale_random: f32,
    pub scale_ring: f32,

    pub flow_radial: f32,
    pub flow_rotate: f32,
    pub flow_swirl: f32,
    pub flow_bubble: f32,
    pub flow_ring: f32,
    pub flow_vortex: f32,
    pub flow_vertical: f32,

    pub orient_radial: f32,
    pub orient_circles: f32,
    pub orient_swirl: f32,
    pub orient_bubble: f32,
    pub orient_linear: f32,

    pub coupling_up: f32,
    pub coupling_down: f32,
    pub layer_kernel_enabled: bool,
}

impl Default for LayerParams {
    /// A quiescent layer: classic rule, unit kernel footprint, every
    /// modifier and inter-layer gain at zero. Mirrors the convention of a
    /// `standard_*_config()` constructor elsewhere in this workspace:
    /// `Default` gives a safe, inert starting point, not a tuned preset.
    fn default() -> Self {
        Self {
            rule_mode: RuleMode::Classic,
            k0: 1.0,
            range: 1.0,
            harmonic_a: 0.0,
            harmonic_b: 0.0,
            sigma1: 1.5,
            sigma2: 4.0,
            beta: 0.0,
            noise: 0.0,
            leak: 0.0,

            kernel_shape: KernelShapeKind::Isotropic,
            orientation: 0.0,
            aspect: 1.0,
            scale2_weight: 0.0,
            scale3_weight: 0.0,
            asymmetry: 0.0,
            asymmetry_orientation: 0.0,
            ring_widths: [0.2, 0.4, 0.6, 0.8, 1.0],
            ring_weights: [0.0; MAX_RING_BANDS],
            compose: false,
            compose_shape: KernelShapeKind::Isotropic,
            compose_mix: 0.0,
            gabor_k: 1.0,
            gabor_theta: 0.0,
            gabor_phi: 0.0,

            scale_base: 1.0,
            scale_radial: 0.0,
            scale_random: 0.0,
            scale_ring: 0.0,

            flow_radial: 0.0,
            flow_rotate: 0.0,
            flow_swirl: 0.0,
            flow_bubble: 0.0,
            flow_ring: 0.0,
            flow_vortex: 0.0,
            flow_vertical: 0.0,

            orient_radial: 0.0,
            orient_circles: 0.0,
            orient_swirl: 0.0,
            orient_bubble: 0.0,
            orient_linear: 0.0,

            coupling_up: 0.0,
            coupling_down: 0.0,
            layer_kernel_enabled: false,
        }
    }
}

impl LayerParams {
    /// `ceil(3 * σ₂)`, the neighborhood radius the kernel-weighted rule needs
    /// to cover (spec §4.5 "kernel-weighted").
    pub fn kernel_range(&self) -> usize {
        kuramoto_util::ceil_f32_usize(3.0 * self.sigma2)
    }
}
