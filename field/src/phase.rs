//! Phase-wrap arithmetic. `θ` is always kept in `[0, 2π)`; this is the one
//! place that invariant is enforced, so every caller (integrator, tests,
//! seeding) goes through it rather than re-deriving the wrap.

use std::f32::consts::TAU;

/// Wrap `theta` into `[0, 2π)`. The spec's "single adjustment sufficient for
/// physical dt" note means one `+= TAU`/`-= TAU` suffices for any input a
/// correctly-configured integrator could produce; for arbitrary inputs (e.g.
/// a caller seeding θ with unwrapped data) this loops until the value lands
/// in range.
pub fn wrap(theta: f32) -> f32 {
    let mut t = theta;
    if !t.is_finite() {
        return t;
    }
    while t < 0.0 {
        t += TAU;
    }
    while t >= TAU {
        t -= TAU;
    }
    t
}

/// `true` iff `theta` lies in `[0, 2π)`, the invariant every θ cell must
/// satisfy after a completed step (spec §3, §8).
pub fn in_range(theta: f32) -> bool {
    theta.is_finite() && (0.0..TAU).contains(&theta)
}
