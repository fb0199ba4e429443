//! The delay ring (spec §4.7): `K = 32` flat snapshots of θ, used by the
//! `delayed` rule to read a cell's phase history instead of its current
//! value.

/// Number of ring slots. Fixed by the spec, not configurable: a delay
/// request outside `[1, K-1]` is a configuration error (see
/// `kuramoto_lattice::error`).
pub const RING_SIZE: usize = 32;

#[derive(Clone, Debug)]
pub struct DelayRing {
    snapshots: Vec<Vec<f32>>,
    cursor: usize,
}

impl DelayRing {
    /// `K` copies of `initial`, cursor at zero. Used both at construction
    /// and whenever [`DelayRing::reset`] re-seeds the ring after a resize or
    /// a fresh `write_theta` (spec §4.7 "reinitialized to copies of the new
    /// θ_front").
    pub fn new(initial: &[f32]) -> Self {
        Self {
            snapshots: vec![initial.to_vec(); RING_SIZE],
            cursor: 0,
        }
    }

    pub fn reset(&mut self, initial: &[f32]) {
        for snap in &mut self.snapshots {
            snap.clear();
            snap.extend_from_slice(initial);
        }
        self.cursor = 0;
    }

    pub const fn cursor(&self) -> usize {
        self.cursor
    }

    /// Copy `theta_front` into the current slot, then advance the cursor
    /// modulo `K`. Called once at the start of every step, before the
    /// cursor advances (spec §3 "Delay ring").
    pub fn push(&mut self, theta_front: &[f32]) {
        self.snapshots[self.cursor].copy_from_slice(theta_front);
        self.cursor = (self.cursor + 1) % RING_SIZE;
    }

    /// Read the snapshot from `d` steps ago, relative to the cursor *after*
    /// the current step's push (spec §8 "Delay correctness").
    pub fn read(&self, d: usize) -> &[f32] {
        debug_assert!((1..RING_SIZE).contains(&d), "delay must be in [1, K-1]");
        let idx = (self.cursor + RING_SIZE - d % RING_SIZE) % RING_SIZE;
        &self.snapshots[idx]
    }

    /// All `K` snapshots in ring order, for a caller that wants to persist
    /// this ring directly (spec §6 "Persisted state layout").
    pub fn snapshots(&self) -> &[Vec<f32>] {
        &self.snapshots
    }

    /// Rebuild a ring from its raw snapshots and cursor, as produced by
    /// [`DelayRing::snapshots`] and [`DelayRing::cursor`].
    pub fn from_parts(snapshots: Vec<Vec<f32>>, cursor: usize) -> Self {
        Self { snapshots, cursor }
    }
}
