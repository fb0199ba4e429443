//! The six coupling rule bodies (spec §4.5). Every rule produces a `drive`
//! (the dθ contribution before noise/input/flow/scale/inter-layer terms are
//! folded in by the integrator) and a `local_order` R_i, computed once per
//! cell regardless of which rule is active.

use kuramoto_field::{Graph, LayerParams, MeanField, RuleMode};

use crate::reducer::{sample_wrapped, NeighborhoodView};

pub struct RuleOutput {
    pub drive: f32,
    pub local_order: f32,
}

/// Everything a rule body needs to evaluate one cell. Bundled into a struct
/// because every rule reads most of these fields.
pub struct RuleInputs<'a> {
    pub row: usize,
    pub col: usize,
    pub rows: usize,
    pub cols: usize,
    pub cell_index: usize,
    pub theta_i: f32,
    pub view: &'a NeighborhoodView<'a>,
    pub front_layer: &'a [f32],
    pub delay_layer: &'a [f32],
    pub layer: &'a LayerParams,
    pub range: usize,
    pub global_coupling: bool,
    pub topology_mode: bool,
    pub mean_field: MeanField,
    pub graph: Option<&'a Graph>,
}

/// Σ|w| below this is treated as "no edges": fall back to plain cell count
/// rather than dividing by a near-zero norm (spec §9 "Normalization
/// strategy for graph rules with all-zero weights falls through to
/// norm = count, not 1 — preserve").
const NORM_EPSILON: f32 = 1e-4;

/// The shared base quantity behind `classic` and `coherence`: `Σ sin(θ_j −
/// θ_i) / norm`, substituting the mean-field closed form under
/// `global_coupling` and the graph sum under `topology_mode` (spec §4.5).
fn classic_raw(inp: &RuleInputs) -> f32 {
    if inp.global_coupling {
        let z = inp.mean_field;
        return z.sin_avg * inp.theta_i.cos() - z.cos_avg * inp.theta_i.sin();
    }
    if inp.topology_mode {
        if let Some(graph) = inp.graph {
            let mut sum = 0.0f32;
            let mut norm = 0.0f32;
            let mut count = 0usize;
            for (neighbor, weight) in graph.edges(inp.cell_index) {
                let theta_j = inp.front_layer[neighbor as usize];
                sum += weight * (theta_j - inp.theta_i).sin();
                norm += weight.abs();
                count += 1;
            }
            let denom = if norm > NORM_EPSILON { norm } else { count.max(1) as f32 };
            return sum / denom;
        }
        return 0.0;
    }
    let (sum, count) = spatial_sine_sum(inp, 1);
    sum / (count.max(1) as f32)
}

/// `Σ sin(k·(θ_j − θ_i))` over the square neighborhood of half-width
/// `inp.range`, plus the neighbor count (unit weights).
fn spatial_sine_sum(inp: &RuleInputs, harmonic: i32) -> (f32, usize) {
    let range = inp.range as i64;
    let mut sum = 0.0f32;
    let mut count = 0usize;
    for dr in -range..=range {
        for dc in -range..=range {
            if dc == 0 && dr == 0 {
                continue;
            }
            let theta_j = inp.view.sample(inp.row, inp.col, dc, dr);
            sum += (harmonic as f32 * (theta_j - inp.theta_i)).sin();
            count += 1;
        }
    }
    (sum, count)
}

fn rule_classic(inp: &RuleInputs) -> f32 {
    inp.layer.k0 * classic_raw(inp)
}

fn rule_coherence(inp: &RuleInputs, local_order: f32) -> f32 {
    let k_eff = inp.layer.k0 * (1.0 - 0.8 * local_order);
    k_eff * classic_raw(inp)
}

fn rule_curvature(inp: &RuleInputs) -> f32 {
    let (sum, count) = spatial_sine_sum(inp, 1);
    let l = sum / (count.max(1) as f32);
    inp.layer.k0 * (2.0 * l.abs()).min(1.0) * l
}

fn rule_harmonics(inp: &RuleInputs) -> f32 {
    let a = inp.layer.harmonic_a;
    let b = inp.layer.harmonic_b;
    if inp.global_coupling {
        let s1 = classic_raw(inp);
        let z_mag = inp.mean_field.magnitude();
        let s2 = s1 * a * z_mag;
        let s3 = s1 * b * z_mag;
        return inp.layer.k0 * (s1 + a * s2 + b * s3);
    }
    let (s1, count) = spatial_sine_sum(inp, 1);
    let (s2, _) = spatial_sine_sum(inp, 2);
    let (s3, _) = spatial_sine_sum(inp, 3);
    let denom = count.max(1) as f32;
    inp.layer.k0 * (s1 + a * s2 + b * s3) / denom
}

fn rule_kernel_weighted(inp: &RuleInputs) -> f32 {
    let range = inp.layer.kernel_range() as i64;
    let mut sum = 0.0f32;
    let mut norm = 0.0f32;
    for dr in -range..=range {
        for dc in -range..=range {
            let w = kuramoto_field::kernel::weight(dc as f32, dr as f32, inp.layer);
            if w.abs() < kuramoto_field::kernel::WEIGHT_EPSILON {
                continue;
            }
            let theta_j = inp.view.sample(inp.row, inp.col, dc, dr);
            sum += w * (theta_j - inp.theta_i).sin();
            norm += w.abs();
        }
    }
    let denom = if norm > NORM_EPSILON { norm } else { 1.0 };
    inp.layer.k0 * sum / denom
}

fn rule_delayed(inp: &RuleInputs) -> f32 {
    if inp.topology_mode {
        if let Some(graph) = inp.graph {
            let mut sum = 0.0f32;
            let mut norm = 0.0f32;
            let mut count = 0usize;
            for (neighbor, weight) in graph.edges(inp.cell_index) {
                let theta_j = inp.delay_layer[neighbor as usize];
                sum += weight * (theta_j - inp.theta_i).sin();
                norm += weight.abs();
                count += 1;
            }
            let denom = if norm > NORM_EPSILON { norm } else { count.max(1) as f32 };
            return inp.layer.k0 * sum / denom;
        }
    }
    let range = inp.range as i64;
    let mut sum = 0.0f32;
    let mut count = 0usize;
    for dr in -range..=range {
        for dc in -range..=range {
            if dc == 0 && dr == 0 {
                continue;
            }
            let theta_j = sample_wrapped(inp.delay_layer, inp.rows, inp.cols, inp.row, inp.col, dc, dr);
            sum += (theta_j - inp.theta_i).sin();
            count += 1;
        }
    }
    inp.layer.k0 * sum / (count.max(1) as f32)
}

/// Local order R_i (spec §4.5): the spatial or graph-weighted mean
/// resultant length over the same neighborhood, unit weights in the
/// spatial case.
fn local_order(inp: &RuleInputs) -> f32 {
    if inp.topology_mode {
        if let Some(graph) = inp.graph {
            let mut cos_sum = 0.0f32;
            let mut sin_sum = 0.0f32;
            let mut norm = 0.0f32;
            for (neighbor, weight) in graph.edges(inp.cell_index) {
                let theta_j = inp.front_layer[neighbor as usize];
                let w = weight.abs();
                cos_sum += w * theta_j.cos();
                sin_sum += w * theta_j.sin();
                norm += w;
            }
            if norm < NORM_EPSILON {
                return 0.0;
            }
            return (cos_sum * cos_sum + sin_sum * sin_sum).sqrt() / norm;
        }
        return 0.0;
    }
    let range = inp.range as i64;
    let mut cos_sum = 0.0f32;
    let mut sin_sum = 0.0f32;
    let mut count = 0usize;
    for dr in -range..=range {
        for dc in -range..=range {
            if dc == 0 && dr == 0 {
                continue;
            }
            let theta_j = inp.view.sample(inp.row, inp.col, dc, dr);
            cos_sum += theta_j.cos();
            sin_sum += theta_j.sin();
            count += 1;
        }
    }
    if count == 0 {
        return 0.0;
    }
    (cos_sum * cos_sum + sin_sum * sin_sum).sqrt() / count as f32
}

pub fn evaluate(mode: RuleMode, inp: &RuleInputs) -> RuleOutput {
    let r = local_order(inp);
    let drive = match mode {
        RuleMode::Classic => rule_classic(inp),
        RuleMode::Coherence => rule_coherence(inp, r),
        RuleMode::Curvature => rule_curvature(inp),
        RuleMode::Harmonics => rule_harmonics(inp),
        RuleMode::KernelWeighted => rule_kernel_weighted(inp),
        RuleMode::Delayed => rule_delayed(inp),
    };
    RuleOutput { drive, local_order: r.clamp(0.0, 1.0) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reducer::parallel_for_each_cell;
    use kuramoto_field::LayerParams;

    fn layer() -> LayerParams {
        LayerParams { k0: 1.0, range: 1.0, ..Default::default() }
    }

    #[test]
    fn uniform_field_has_zero_drive_and_unit_order_under_every_rule() {
        let rows = 6;
        let cols = 6;
        let theta0 = 0.7f32;
        let front = vec![theta0; rows * cols];
        let delay = front.clone();
        let layer = layer();
        let mean_field = MeanField { cos_avg: theta0.cos(), sin_avg: theta0.sin() };

        for mode in [
            RuleMode::Classic,
            RuleMode::Coherence,
            RuleMode::Curvature,
            RuleMode::Harmonics,
            RuleMode::KernelWeighted,
            RuleMode::Delayed,
        ] {
            let outputs = parallel_for_each_cell(&front, rows, cols, |row, col, view| {
                let inp = RuleInputs {
                    row,
                    col,
                    rows,
                    cols,
                    cell_index: row * cols + col,
                    theta_i: theta0,
                    view,
                    front_layer: &front,
                    delay_layer: &delay,
                    layer: &layer,
                    range: 1,
                    global_coupling: false,
                    topology_mode: false,
                    mean_field,
                    graph: None,
                };
                evaluate(mode, &inp).drive
            });
            for drive in outputs {
                assert!(drive.abs() < 1e-5, "rule {mode:?} produced nonzero drive {drive} on a uniform field");
            }
        }
    }

    #[test]
    fn graph_ring_matches_closed_form_single_step() {
        // scenario 6: each cell coupled only to its left neighbor, weight 1.
        let rows = 1;
        let cols = 8;
        let front: Vec<f32> = (0..cols).map(|i| i as f32 * 0.1).collect();
        let mut graph = Graph::empty(cols);
        for i in 0..cols {
            let left = (i + cols - 1) % cols;
            graph.set_edges(i, &[(left as u32, 1.0)]);
        }
        let layer = layer();
        let mean_field = MeanField::default();
        let delay = front.clone();
        let outputs = parallel_for_each_cell(&front, rows, cols, |row, col, view| {
            let idx = row * cols + col;
            let inp = RuleInputs {
                row,
                col,
                rows,
                cols,
                cell_index: idx,
                theta_i: front[idx],
                view,
                front_layer: &front,
                delay_layer: &delay,
                layer: &layer,
                range: 1,
                global_coupling: false,
                topology_mode: true,
                mean_field,
                graph: Some(&graph),
            };
            evaluate(RuleMode::Classic, &inp).drive
        });
        for i in 0..cols {
            let left = (i + cols - 1) % cols;
            let expected = (front[left] - front[i]).sin();
            assert!((outputs[i] - expected).abs() < 1e-6);
        }
    }
}
