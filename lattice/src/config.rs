//! The parameter store (spec §3 "Params"/"LayerParams", §4.1). `Params` is
//! the uniform record shared by every layer; `LayerParams` (re-exported from
//! `kuramoto_field`) carries the per-layer overrides. [`ParamStore`] is the
//! single writer: `update_full` replaces everything and validates it,
//! `update_tick` is the cheap per-frame patch of `dt`/`time`.

use kuramoto_field::{InjectionMode, LayerParams, MAX_LAYERS};
use serde::{Deserialize, Serialize};

use crate::error::LatticeError;

/// Global, per-tick uniform. Duplicates a handful of the active layer's
/// fields for a render/compute backend that wants a single flat buffer
/// (spec §3 "per-layer modulation scalars duplicated for the active layer").
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct Params {
    pub dt: f32,
    pub rows: usize,
    pub cols: usize,
    pub layer_count: usize,
    pub active_layer: usize,
    pub global_coupling: bool,
    pub topology_mode: bool,
    pub delay_steps: usize,
    pub time: f32,
    pub injection_mode: InjectionMode,
    pub input_signal: f32,
    /// View/render toggles, passed through opaquely (spec §3); this crate
    /// never interprets these bits.
    pub render_flags: u32,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            dt: 0.05,
            rows: 64,
            cols: 64,
            layer_count: 1,
            active_layer: 0,
            global_coupling: false,
            topology_mode: false,
            delay_steps: 8,
            time: 0.0,
            injection_mode: InjectionMode::Frequency,
            input_signal: 0.0,
            render_flags: 0,
        }
    }
}

/// Mediates every write to `Params`/`LayerParams`. Holds a fixed
/// `[LayerParams; MAX_LAYERS]` table regardless of `layer_count`, so
/// inter-layer coupling can always address "the layer above/below" without
/// bounds juggling; only the first `layer_count` entries are live.
#[derive(Clone, Debug)]
pub struct ParamStore {
    params: Params,
    layers: [LayerParams; MAX_LAYERS],
}

impl ParamStore {
    pub fn new(params: Params, layers: [LayerParams; MAX_LAYERS]) -> Result<Self, LatticeError> {
        validate(&params, &layers)?;
        Ok(Self { params, layers })
    }

    /// Rewrite the entire uniform. Runs `validate()`; on failure the store
    /// is left untouched (spec §4.1 "no partial update is ever visible").
    pub fn update_full(&mut self, params: Params, layers: [LayerParams; MAX_LAYERS]) -> Result<(), LatticeError> {
        validate(&params, &layers)?;
        self.params = params;
        self.layers = layers;
        Ok(())
    }

    /// Patch the two fields that change every frame.
    pub fn update_tick(&mut self, dt_effective: f32, time: f32) {
        self.params.dt = dt_effective;
        self.params.time = time;
    }

    /// Patch the external input scalar read by `InjectionMode` each step.
    pub fn set_input_signal(&mut self, signal: f32) {
        self.params.input_signal = signal;
    }

    pub const fn params(&self) -> &Params {
        &self.params
    }

    pub fn layers(&self) -> &[LayerParams; MAX_LAYERS] {
        &self.layers
    }

    pub fn layer(&self, index: usize) -> &LayerParams {
        &self.layers[index]
    }

    pub fn active_layer_params(&self) -> &LayerParams {
        &self.layers[self.params.active_layer]
    }
}

/// Configuration-error checks (spec §7 "configuration errors"). A `range`
/// larger than the halo is not an error here — §4.4 gives every rule a
/// global fallback — so this only catches genuinely invalid settings.
fn validate(params: &Params, layers: &[LayerParams; MAX_LAYERS]) -> Result<(), LatticeError> {
    if params.layer_count == 0 || params.layer_count > MAX_LAYERS {
        return Err(LatticeError::Configuration(format!(
            "layer_count {} out of bounds [1, {MAX_LAYERS}]",
            params.layer_count
        )));
    }
    if params.active_layer >= params.layer_count {
        return Err(LatticeError::Configuration(format!(
            "active_layer {} out of bounds for layer_count {}",
            params.active_layer, params.layer_count
        )));
    }
    if params.rows == 0 || params.cols == 0 {
        return Err(LatticeError::Configuration("grid dimensions must be nonzero".into()));
    }
    if !(1..kuramoto_field::delay::RING_SIZE).contains(&params.delay_steps) {
        return Err(LatticeError::Configuration(format!(
            "delay_steps {} out of bounds [1, {})",
            params.delay_steps,
            kuramoto_field::delay::RING_SIZE
        )));
    }
    for (i, layer) in layers.iter().take(params.layer_count).enumerate() {
        if layer.sigma1 <= 0.0 || layer.sigma2 <= 0.0 {
            return Err(LatticeError::Configuration(format!("layer {i}: sigma1/sigma2 must be positive")));
        }
        if layer.sigma1 >= layer.sigma2 {
            return Err(LatticeError::Configuration(format!(
                "layer {i}: sigma1 must be < sigma2 (got {} >= {})",
                layer.sigma1, layer.sigma2
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layers() -> [LayerParams; MAX_LAYERS] {
        std::array::from_fn(|_| LayerParams::default())
    }

    #[test]
    fn default_params_validate() {
        assert!(ParamStore::new(Params::default(), layers()).is_ok());
    }

    #[test]
    fn rejects_active_layer_beyond_layer_count() {
        let mut p = Params::default();
        p.layer_count = 1;
        p.active_layer = 1;
        assert!(matches!(
            ParamStore::new(p, layers()),
            Err(LatticeError::Configuration(_))
        ));
    }

    #[test]
    fn rejects_delay_steps_out_of_range() {
        let mut p = Params::default();
        p.delay_steps = 0;
        assert!(ParamStore::new(p, layers()).is_err());

        let mut p2 = Params::default();
        p2.delay_steps = kuramoto_field::delay::RING_SIZE;
        assert!(ParamStore::new(p2, layers()).is_err());
    }

    #[test]
    fn update_full_leaves_store_untouched_on_invalid_input() {
        let mut store = ParamStore::new(Params::default(), layers()).unwrap();
        let original = store.params().dt;
        let mut bad = Params::default();
        bad.rows = 0;
        assert!(store.update_full(bad, layers()).is_err());
        assert_eq!(store.params().dt, original);
    }

    #[test]
    fn update_tick_patches_only_dt_and_time() {
        let mut store = ParamStore::new(Params::default(), layers()).unwrap();
        store.update_tick(0.01, 12.5);
        assert_eq!(store.params().dt, 0.01);
        assert_eq!(store.params().time, 12.5);
    }
}
