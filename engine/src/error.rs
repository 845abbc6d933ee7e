//! Configuration errors surfaced at trial and survey construction

use thiserror::Error;

/// Errors reported to the caller constructing a tree, trial or survey.
///
/// Structural invariant violations inside a running tree are not represented
/// here; those panic.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimulationError {
    /// A slot growth probability outside [0, 1] (or NaN).
    #[error("growth probability for slot {slot} must be in [0, 1], got {value}")]
    InvalidProbability {
        /// Slot index (0 or 1) the probability belongs to.
        slot: usize,
        /// Rejected value.
        value: f64,
    },

    /// The absorbing height bound must be positive.
    #[error("height bound must be positive, got {0}")]
    InvalidHeightBound(u32),

    /// A survey needs at least one trial.
    #[error("trial count must be positive, got {0}")]
    InvalidTrialCount(u64),

    /// A step ceiling, when given, must allow at least one step.
    #[error("step ceiling must be positive, got {0}")]
    InvalidStepCeiling(u64),
}
