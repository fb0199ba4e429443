//! Elementwise bulk operations over flat phase buffers, in the spirit of
//! `batch_util`'s chunked elementwise loops: small, allocation-free passes
//! used by the integrator's post-step checks and by test helpers.

use crate::phase::in_range;

/// Wrap every element of `buf` into `[0, 2π)` in place.
pub fn wrap_inplace(buf: &mut [f32]) {
    for t in buf.iter_mut() {
        *t = crate::phase::wrap(*t);
    }
}

/// The index of the first cell that is NaN/Inf or outside `[0, 2π)`, if any.
/// Used to turn a numerical fault into a concrete, reportable location
/// rather than a bare "something went wrong" (spec §7 "numerical anomaly").
pub fn first_out_of_range(buf: &[f32]) -> Option<usize> {
    buf.iter().position(|&t| !in_range(t))
}

/// `true` iff every element of `buf` lies in `[0, 1]`, the invariant local
/// order `R` must satisfy after a step (spec §8).
pub fn all_in_unit_interval(buf: &[f32]) -> bool {
    buf.iter().all(|&r| (0.0..=1.0).contains(&r))
}
