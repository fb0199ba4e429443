//! The per-cell integrator (spec §4.6): assembles the rule drive, noise,
//! input injection, flow/orientation/scale modulation, inter-layer
//! coupling and leak into one Euler step, then wraps θ into `[0, 2π)`.

use kuramoto_field::{reduce_mean_field, Graph, InjectionMode, LayerParams, MeanField, MAX_LAYERS};
use kuramoto_util::{hash21, hash_u32};

use crate::reducer::{parallel_for_each_cell, sample_wrapped};
use crate::rules::{self, RuleInputs};

/// The spatial terms every flow/orientation modulation is built from:
/// normalized, center-relative coordinates and a handful of derived scalars
/// (spec §4.6 step 4/5 name the inputs — "normalized cell coordinates" and
/// per-layer flow/orient weights — but leave the per-component formulas to
/// the implementation; the choices here are recorded in DESIGN.md).
struct SpatialTerms {
    nx: f32,
    ny: f32,
    radial: f32,
    rotate: f32,
    swirl: f32,
    bubble: f32,
    ring: f32,
    vortex: f32,
    vertical: f32,
    circles: f32,
}

fn spatial_terms(row: usize, col: usize, rows: usize, cols: usize) -> SpatialTerms {
    use std::f32::consts::TAU;
    let nx = col as f32 / cols as f32 - 0.5;
    let ny = row as f32 / rows as f32 - 0.5;
    let r2 = nx * nx + ny * ny;
    let radial = r2.sqrt();
    let rotate = ny.atan2(nx);
    SpatialTerms {
        nx,
        ny,
        radial,
        rotate,
        swirl: nx * ny,
        bubble: (1.0 - r2).max(0.0),
        ring: (radial * TAU).sin(),
        vortex: rotate * radial,
        vertical: ny,
        circles: (radial * TAU).cos(),
    }
}

fn flow_bias(layer: &LayerParams, t: &SpatialTerms) -> f32 {
    2.0 * (layer.flow_radial * t.radial
        + layer.flow_rotate * t.rotate
        + layer.flow_swirl * t.swirl
        + layer.flow_bubble * t.bubble
        + layer.flow_ring * t.ring
        + layer.flow_vortex * t.vortex
        + layer.flow_vertical * t.vertical)
}

fn orientation_gain(layer: &LayerParams, t: &SpatialTerms) -> f32 {
    let o = 1.0
        + layer.orient_radial * t.radial
        + layer.orient_circles * t.circles
        + layer.orient_swirl * t.swirl
        + layer.orient_bubble * t.bubble
        + layer.orient_linear * t.vertical;
    o.clamp(0.05, 8.0)
}

fn scale_gain(layer: &LayerParams, row: usize, col: usize, t: &SpatialTerms) -> f32 {
    let random = hash21(col as i64, row as i64) - 0.5;
    let k_scaled = layer.k0
        * (layer.scale_base
            + layer.scale_radial * (t.nx.abs() + t.ny.abs()) * 2.0
            + layer.scale_random * random * 2.0
            + layer.scale_ring * (t.nx * t.nx + t.ny * t.ny) * 4.0)
            .clamp(0.1, 5.0);
    if layer.k0.abs() > f32::EPSILON {
        k_scaled / layer.k0
    } else {
        1.0
    }
}

fn inter_layer_contribution(
    gain: f32,
    layer_kernel_enabled: bool,
    other_layer: &LayerParams,
    other_front: &[f32],
    row: usize,
    col: usize,
    rows: usize,
    cols: usize,
    theta_i: f32,
) -> f32 {
    if gain.abs() < f32::EPSILON {
        return 0.0;
    }
    let theta_other_here = other_front[row * cols + col];
    let result = if layer_kernel_enabled {
        let range = other_layer.kernel_range() as i64;
        let mut sum = 0.0f32;
        let mut norm = 0.0f32;
        for dr in -range..=range {
            for dc in -range..=range {
                let w = kuramoto_field::kernel::weight(dc as f32, dr as f32, other_layer);
                if w.abs() < kuramoto_field::kernel::WEIGHT_EPSILON {
                    continue;
                }
                let theta_j = sample_wrapped(other_front, rows, cols, row, col, dc, dr);
                sum += w * (theta_j - theta_i).sin();
                norm += w.abs();
            }
        }
        if norm > 1e-4 {
            sum / norm
        } else {
            0.0
        }
    } else {
        (theta_other_here - theta_i).sin()
    };
    gain * result
}

/// Per-step context shared by every layer (spec §4.6/§4.8).
pub struct StepContext<'a> {
    pub dt: f32,
    pub time_seed: u32,
    pub global_coupling: bool,
    pub topology_mode: bool,
    pub injection_mode: InjectionMode,
    pub input_signal: f32,
    pub delay_steps: usize,
}

/// The outcome of stepping one layer: the new θ values and the refreshed
/// local-order buffer, both row-major over that layer's `rows × cols`.
pub struct LayerStepResult {
    pub theta: Vec<f32>,
    pub order: Vec<f32>,
}

/// Step one layer. `all_front`/`all_layers` give access to every layer (for
/// inter-layer coupling); `layer_index` identifies which one is being
/// stepped. `delay_layer` is this layer's delayed snapshot (spec §4.7);
/// `input_mask`/`omega` are this layer's own buffers.
#[allow(clippy::too_many_arguments)]
pub fn step_layer(
    layer_index: usize,
    layer_count: usize,
    rows: usize,
    cols: usize,
    all_front: &[&[f32]],
    layers: &[LayerParams; MAX_LAYERS],
    omega: &[f32],
    delay_layer: &[f32],
    input_mask: &[f32],
    graph: Option<&Graph>,
    ctx: &StepContext,
) -> LayerStepResult {
    let front_layer: &[f32] = all_front[layer_index];
    let layer_params = &layers[layer_index];
    let mean_field: MeanField = if ctx.global_coupling {
        reduce_mean_field(front_layer)
    } else {
        MeanField::default()
    };
    let range = layer_params.range.max(1.0).round() as usize;

    let pairs = parallel_for_each_cell(front_layer, rows, cols, |row, col, view| {
        let cell_index = row * cols + col;
        let theta_i = front_layer[cell_index];

        let rule_inputs = RuleInputs {
            row,
            col,
            rows,
            cols,
            cell_index,
            theta_i,
            view,
            front_layer,
            delay_layer,
            layer: layer_params,
            range,
            global_coupling: ctx.global_coupling,
            topology_mode: ctx.topology_mode,
            mean_field,
            graph,
        };
        let rule_out = rules::evaluate(layer_params.rule_mode, &rule_inputs);

        let mut omega_eff = omega[cell_index];
        let mask = input_mask[cell_index];
        let mut drive = rule_out.drive;
        let mut d_input = 0.0f32;
        match ctx.injection_mode {
            InjectionMode::Frequency => omega_eff += 5.0 * mask * ctx.input_signal,
            InjectionMode::Additive => d_input = 5.0 * mask * ctx.input_signal,
            InjectionMode::CouplingModulation => drive *= 1.0 + 0.5 * mask * ctx.input_signal,
        }

        let terms = spatial_terms(row, col, rows, cols);
        let flow = flow_bias(layer_params, &terms);
        let orientation = orientation_gain(layer_params, &terms);
        let scale = scale_gain(layer_params, row, col, &terms);
        let scaled_drive = drive * scale;

        // coupling_up pulls from the layer below (index - 1), coupling_down
        // from the layer above (index + 1).
        let mut inter = 0.0f32;
        if layer_index > 0 && layer_params.coupling_up.abs() > f32::EPSILON {
            inter += inter_layer_contribution(
                layer_params.coupling_up,
                layer_params.layer_kernel_enabled,
                &layers[layer_index - 1],
                all_front[layer_index - 1],
                row,
                col,
                rows,
                cols,
                theta_i,
            );
        }
        if layer_index + 1 < layer_count && layer_params.coupling_down.abs() > f32::EPSILON {
            inter += inter_layer_contribution(
                layer_params.coupling_down,
                layer_params.layer_kernel_enabled,
                &layers[layer_index + 1],
                all_front[layer_index + 1],
                row,
                col,
                rows,
                cols,
                theta_i,
            );
        }

        let noise = if layer_params.noise > 1e-3 {
            (hash_u32(cell_index as u32, ctx.time_seed) - 0.5) * 2.0 * layer_params.noise
        } else {
            0.0
        };

        let mut dyn_ = omega_eff + scaled_drive * orientation + inter + d_input + flow + noise;
        dyn_ *= 1.0 - layer_params.leak;

        let mut theta_next = theta_i + dyn_ * ctx.dt;
        theta_next = kuramoto_field::phase::wrap(theta_next);

        (theta_next, rule_out.local_order)
    });

    let mut theta = Vec::with_capacity(rows * cols);
    let mut order = Vec::with_capacity(rows * cols);
    for (t, r) in pairs {
        theta.push(t);
        order.push(r);
    }
    LayerStepResult { theta, order }
}
