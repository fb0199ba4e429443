//! The four-way error taxonomy: configuration, resource, numerical anomaly,
//! capability. Every fallible entry point on [`crate::sim::LatticeSim`]
//! returns `Result<T, LatticeError>`; callers who don't care about the
//! distinction can `?` it into an `anyhow::Error` via the `From` impl below.

use std::fmt;

#[derive(Clone, Debug, PartialEq)]
pub enum LatticeError {
    /// Layer count out of bounds, an unknown rule/shape id, a `range` that
    /// exceeds the halo without a fallback, or any other invalid setting
    /// caught by `validate()`. Fails fast, no partial state change.
    Configuration(String),
    /// Allocation failure (or a grid too large for the target) at resize.
    /// Prior state is left intact.
    Resource(String),
    /// NaN/Inf found in θ after a completed step. Reported, not recovered;
    /// the caller may choose to reseed.
    NumericalAnomaly { cell_index: usize },
    /// A capability the caller asked for isn't present in this build, e.g.
    /// `parallel`-only behavior requested without the `parallel` feature.
    Capability(String),
}

impl fmt::Display for LatticeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Configuration(msg) => write!(f, "configuration error: {msg}"),
            Self::Resource(msg) => write!(f, "resource error: {msg}"),
            Self::NumericalAnomaly { cell_index } => {
                write!(f, "numerical anomaly: cell {cell_index} left [0, 2\u{03c0}) or went non-finite")
            }
            Self::Capability(msg) => write!(f, "capability error: {msg}"),
        }
    }
}

impl std::error::Error for LatticeError {}
