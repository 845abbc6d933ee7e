//! sapling Engine - Evolving binary tree birth-death process
//!
//! This crate contains the simulation core: the node arena, the tree with its
//! two-phase batch step, and the single-trial driver that classifies a run as
//! returned (root empty again) or absorbed (height bound reached).
//!
//! Randomness is always passed in by the caller, so seeded runs are exactly
//! reproducible.

pub mod error;
pub mod node;
pub mod test_tree;
pub mod tree;
pub mod trial;

pub use error::SimulationError;
pub use node::{Node, NodeArena, NodeId, Slot};
pub use tree::{SlotProbabilities, StepPlan, Tree};
pub use trial::{run_trial, Outcome, Trial, TrialResult, TrialState};
