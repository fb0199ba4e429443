//! Binary layout of the parameter uniform (spec §6, §9 "fat packed uniform
//! record"). `Params`/`LayerParams` stay typed, named-field records for
//! application code; these functions are the only place that knows the
//! float-only, 16-byte-aligned GPU layout, so no caller ever offsets into a
//! byte buffer by an integer constant.

use kuramoto_field::{KernelShapeKind, LayerParams, RuleMode};

use crate::config::Params;

/// `Params` occupies 128 bytes: 12 live float-encoded fields plus padding
/// out to eight 16-byte (vec4) lanes.
pub const PARAMS_UNIFORM_BYTES: usize = 128;
/// One `LayerParams` record occupies 224 bytes: 52 live fields plus padding
/// out to fourteen 16-byte lanes.
pub const LAYER_PARAMS_UNIFORM_BYTES: usize = 224;

fn push_f32(buf: &mut Vec<u8>, v: f32) {
    buf.extend_from_slice(&v.to_le_bytes());
}

fn rule_mode_code(mode: RuleMode) -> f32 {
    match mode {
        RuleMode::Classic => 0.0,
        RuleMode::Coherence => 1.0,
        RuleMode::Curvature => 2.0,
        RuleMode::Harmonics => 3.0,
        RuleMode::KernelWeighted => 4.0,
        RuleMode::Delayed => 5.0,
    }
}

fn kernel_shape_code(shape: KernelShapeKind) -> f32 {
    match shape {
        KernelShapeKind::Isotropic => 0.0,
        KernelShapeKind::Anisotropic => 1.0,
        KernelShapeKind::MultiScale => 2.0,
        KernelShapeKind::Asymmetric => 3.0,
        KernelShapeKind::Step => 4.0,
        KernelShapeKind::MultiRing => 5.0,
        KernelShapeKind::Gabor => 6.0,
    }
}

/// Serialize `Params` into its 128-byte, little-endian GPU layout.
pub fn params_to_uniform_bytes(p: &Params) -> [u8; PARAMS_UNIFORM_BYTES] {
    let mut buf = Vec::with_capacity(PARAMS_UNIFORM_BYTES);
    push_f32(&mut buf, p.dt);
    push_f32(&mut buf, p.cols as f32);
    push_f32(&mut buf, p.rows as f32);
    push_f32(&mut buf, p.layer_count as f32);
    push_f32(&mut buf, p.active_layer as f32);
    push_f32(&mut buf, if p.global_coupling { 1.0 } else { 0.0 });
    push_f32(&mut buf, if p.topology_mode { 1.0 } else { 0.0 });
    push_f32(&mut buf, p.delay_steps as f32);
    push_f32(&mut buf, p.time);
    push_f32(&mut buf, p.injection_mode as u8 as f32);
    push_f32(&mut buf, p.input_signal);
    push_f32(&mut buf, p.render_flags as f32);
    buf.resize(PARAMS_UNIFORM_BYTES, 0);
    buf.try_into().expect("buffer sized to PARAMS_UNIFORM_BYTES")
}

/// Serialize one `LayerParams` into its 224-byte, little-endian GPU layout.
pub fn layer_params_to_uniform_bytes(lp: &LayerParams) -> [u8; LAYER_PARAMS_UNIFORM_BYTES] {
    let mut buf = Vec::with_capacity(LAYER_PARAMS_UNIFORM_BYTES);
    push_f32(&mut buf, rule_mode_code(lp.rule_mode));
    push_f32(&mut buf, lp.k0);
    push_f32(&mut buf, lp.range);
    push_f32(&mut buf, lp.harmonic_a);
    push_f32(&mut buf, lp.harmonic_b);
    push_f32(&mut buf, lp.sigma1);
    push_f32(&mut buf, lp.sigma2);
    push_f32(&mut buf, lp.beta);
    push_f32(&mut buf, lp.noise);
    push_f32(&mut buf, lp.leak);

    push_f32(&mut buf, kernel_shape_code(lp.kernel_shape));
    push_f32(&mut buf, lp.orientation);
    push_f32(&mut buf, lp.aspect);
    push_f32(&mut buf, lp.scale2_weight);
    push_f32(&mut buf, lp.scale3_weight);
    push_f32(&mut buf, lp.asymmetry);
    push_f32(&mut buf, lp.asymmetry_orientation);

    for w in lp.ring_widths {
        push_f32(&mut buf, w);
    }
    for w in lp.ring_weights {
        push_f32(&mut buf, w);
    }

    push_f32(&mut buf, if lp.compose { 1.0 } else { 0.0 });
    push_f32(&mut buf, kernel_shape_code(lp.compose_shape));
    push_f32(&mut buf, lp.compose_mix);

    push_f32(&mut buf, lp.gabor_k);
    push_f32(&mut buf, lp.gabor_theta);
    push_f32(&mut buf, lp.gabor_phi);

    push_f32(&mut buf, lp.scale_base);
    push_f32(&mut buf, lp.scale_radial);
    push_f32(&mut buf, lp.scale_random);
    push_f32(&mut buf, lp.scale_ring);

    push_f32(&mut buf, lp.flow_radial);
    push_f32(&mut buf, lp.flow_rotate);
    push_f32(&mut buf, lp.flow_swirl);
    push_f32(&mut buf, lp.flow_bubble);
    push_f32(&mut buf, lp.flow_ring);
    push_f32(&mut buf, lp.flow_vortex);
    push_f32(&mut buf, lp.flow_vertical);

    push_f32(&mut buf, lp.orient_radial);
    push_f32(&mut buf, lp.orient_circles);
    push_f32(&mut buf, lp.orient_swirl);
    push_f32(&mut buf, lp.orient_bubble);
    push_f32(&mut buf, lp.orient_linear);

    push_f32(&mut buf, lp.coupling_up);
    push_f32(&mut buf, lp.coupling_down);
    push_f32(&mut buf, if lp.layer_kernel_enabled { 1.0 } else { 0.0 });

    buf.resize(LAYER_PARAMS_UNIFORM_BYTES, 0);
    buf.try_into().expect("buffer sized to LAYER_PARAMS_UNIFORM_BYTES")
}
