//! The global mean field Z (spec §4.8, §3): `(Σcos θ / LRC, Σsin θ / LRC)`.
//! The distilled spec treats the reducer that produces Z as an external
//! collaborator ("a plain tree-reduction and needs no further specification
//! here"); this module provides exactly that reference reducer so the crate
//! is self-sufficient standalone, behind a small trait so a caller with a
//! faster or incremental reducer can substitute their own.

use kuramoto_maybe_rayon::MaybeParIter;

/// `(cos_avg, sin_avg)`. `|Z|` is the global Kuramoto order parameter.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MeanField {
    pub cos_avg: f32,
    pub sin_avg: f32,
}

impl MeanField {
    pub fn magnitude(&self) -> f32 {
        (self.cos_avg * self.cos_avg + self.sin_avg * self.sin_avg).sqrt()
    }
}

/// Anything that can hand the integrator a mean field for this step. The
/// default impl below is the crate's own reference reducer; a rendering
/// front end that computes Z on its own (e.g. on the GPU, as the original
/// system does) can implement this trait instead of calling
/// [`reduce_mean_field`] directly.
pub trait MeanFieldSource {
    fn mean_field(&self) -> MeanField;
}

/// Reference reducer: a parallel sum of `(cos θ, sin θ)` over the active
/// cell range, normalized by count. `theta` may be the whole flat field or a
/// single layer's slice — the caller decides what "active set" means (spec
/// §4.8: "over the active set").
pub fn reduce_mean_field(theta: &[f32]) -> MeanField {
    if theta.is_empty() {
        return MeanField::default();
    }
    let cos_sum: f32 = theta.par_iter().map(|&t| t.cos()).sum();
    let sin_sum: f32 = theta.par_iter().map(|&t| t.sin()).sum();
    let n = theta.len() as f32;
    MeanField {
        cos_avg: cos_sum / n,
        sin_avg: sin_sum / n,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    #[test]
    fn in_phase_field_has_unit_magnitude() {
        let theta = vec![0.7_f32; 64];
        let z = reduce_mean_field(&theta);
        assert!((z.magnitude() - 1.0).abs() < 1e-5);
        assert!((z.cos_avg - 0.7_f32.cos()).abs() < 1e-5);
        assert!((z.sin_avg - 0.7_f32.sin()).abs() < 1e-5);
    }

    #[test]
    fn opposite_phases_cancel() {
        let theta = vec![0.0, PI, 0.0, PI];
        let z = reduce_mean_field(&theta);
        assert!(z.magnitude() < 1e-5);
    }
}
