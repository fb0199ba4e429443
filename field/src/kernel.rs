//! Pure spatial kernel weight function `w(Δc, Δr, layer_params) → f32`
//! (spec §4.3). Every shape is a closed-form function of the offset and a
//! handful of `LayerParams` coefficients; none of them touch the field
//! state, which is what keeps this module trivially unit-testable.

use itertools::Itertools;

use crate::types::{KernelShapeKind, LayerParams, MAX_RING_BANDS};

/// Weights below this magnitude are treated as zero by callers that
/// normalize by `Σ|w|` (spec §4.3 "Numerical policy").
pub const WEIGHT_EPSILON: f32 = 1e-4;

fn isotropic(r2: f32, sigma1: f32, sigma2: f32, beta: f32) -> f32 {
    let a = (-r2 / (2.0 * sigma1 * sigma1)).exp();
    let b = beta * (-r2 / (2.0 * sigma2 * sigma2)).exp();
    a - b
}

fn anisotropic(dc: f32, dr: f32, p: &LayerParams) -> f32 {
    let (s, c) = p.orientation.sin_cos();
    let rot_c = dc * c + dr * s;
    let rot_r = (-dc * s + dr * c) / p.aspect.max(1e-6);
    isotropic(rot_c * rot_c + rot_r * rot_r, p.sigma1, p.sigma2, p.beta)
}

fn multi_scale(r2: f32, p: &LayerParams) -> f32 {
    let base = isotropic(r2, p.sigma1, p.sigma2, p.beta);
    let w2 = p.scale2_weight * isotropic(r2, 2.0 * p.sigma1, 2.0 * p.sigma2, p.beta);
    let w3 = p.scale3_weight * isotropic(r2, 3.0 * p.sigma1, 3.0 * p.sigma2, p.beta);
    base + w2 + w3
}

fn asymmetric(dc: f32, dr: f32, r2: f32, p: &LayerParams) -> f32 {
    let base = isotropic(r2, p.sigma1, p.sigma2, p.beta);
    let phi = dr.atan2(-dc);
    base * (1.0 + p.asymmetry * (phi - p.asymmetry_orientation).cos())
}

fn step(r2: f32, sigma1: f32, sigma2: f32, beta: f32) -> f32 {
    let r = r2.sqrt();
    if r < sigma1 {
        1.0
    } else if r < sigma2 {
        -beta
    } else {
        0.0
    }
}

/// Ring widths as supplied may not be monotonically increasing; the spec
/// leaves that case undefined (§9 Open Questions). This implementation
/// sorts widths (carrying their matching weight along) before walking the
/// piecewise radial function, which keeps `multi_ring` well-defined for any
/// input and matches the choice recorded in DESIGN.md.
fn sorted_rings(p: &LayerParams) -> [(f32, f32); MAX_RING_BANDS] {
    let rings: [(f32, f32); MAX_RING_BANDS] = std::array::from_fn(|i| (p.ring_widths[i], p.ring_weights[i]));
    let sorted = rings
        .into_iter()
        .sorted_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));
    let mut out = [(0.0f32, 0.0f32); MAX_RING_BANDS];
    for (slot, ring) in out.iter_mut().zip(sorted) {
        *slot = ring;
    }
    out
}

fn multi_ring(r2: f32, p: &LayerParams) -> f32 {
    let r = r2.sqrt();
    let rings = sorted_rings(p);
    let mut prev_width = 0.0f32;
    let mut total = 0.0f32;
    for (width, weight) in rings {
        let inner = prev_width * p.sigma2;
        let outer = width * p.sigma2;
        if r > inner && r <= outer {
            let center = 0.5 * (inner + outer);
            total += weight * (-(r - center) * (r - center) / (2.0 * p.sigma1 * p.sigma1)).exp();
        }
        prev_width = width;
    }
    total
}

fn gabor(dc: f32, dr: f32, r2: f32, p: &LayerParams) -> f32 {
    let envelope = isotropic(r2, p.sigma1, p.sigma2, 0.0);
    let (ks, kc) = p.gabor_theta.sin_cos();
    let phase = p.gabor_k * (dc * kc + dr * ks) + p.gabor_phi;
    envelope * phase.cos()
}

/// Evaluate the configured shape (and, if `compose` is set, mix it with the
/// secondary shape) at offset `(Δc, Δr)`.
pub fn weight(dc: f32, dr: f32, p: &LayerParams) -> f32 {
    let primary = weight_shape(dc, dr, p.kernel_shape, p);
    if !p.compose {
        return primary;
    }
    let secondary = weight_shape(dc, dr, p.compose_shape, p);
    mix(secondary, primary, p.compose_mix.clamp(0.0, 1.0))
}

fn weight_shape(dc: f32, dr: f32, shape: KernelShapeKind, p: &LayerParams) -> f32 {
    let r2 = dc * dc + dr * dr;
    match shape {
        KernelShapeKind::Isotropic => isotropic(r2, p.sigma1, p.sigma2, p.beta),
        KernelShapeKind::Anisotropic => anisotropic(dc, dr, p),
        KernelShapeKind::MultiScale => multi_scale(r2, p),
        KernelShapeKind::Asymmetric => asymmetric(dc, dr, r2, p),
        KernelShapeKind::Step => step(r2, p.sigma1, p.sigma2, p.beta),
        KernelShapeKind::MultiRing => multi_ring(r2, p),
        KernelShapeKind::Gabor => gabor(dc, dr, r2, p),
    }
}

/// Linear blend `mix(s, p, r) = s + r * (p - s)` (spec §4.3 composition).
fn mix(s: f32, p: f32, r: f32) -> f32 {
    s + r * (p - s)
}
