//! Single-trial driver: run one tree until it returns or is absorbed

use std::fmt;

use rand::Rng;
use tracing::{debug, trace};

use crate::error::SimulationError;
use crate::tree::{SlotProbabilities, Tree};

/// Where a trial stands after its latest step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrialState {
    /// Neither absorbing condition has been reached
    Running,
    /// The root is empty again (height 0)
    Returned,
    /// Height reached the bound
    Absorbed,
}

impl TrialState {
    pub fn is_terminal(self) -> bool {
        !matches!(self, TrialState::Running)
    }
}

/// Terminal classification of a finished trial
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Outcome {
    Returned,
    Absorbed,
}

impl Outcome {
    /// Short tag used in reports: `"return"` or `"absorb"`
    pub fn tag(self) -> &'static str {
        match self {
            Outcome::Returned => "return",
            Outcome::Absorbed => "absorb",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Result record of one finished trial
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrialResult {
    pub outcome: Outcome,
    /// Number of `advance` calls made
    pub steps: u64,
    /// Largest frontier seen during the trial
    pub peak_frontier_size: usize,
}

/// A tree plus its step counter and absorbing bound.
///
/// Drive it with `step` when an outer loop needs control between steps (for
/// instance to impose a step ceiling), or with `run` to go to completion.
#[derive(Debug, Clone)]
pub struct Trial {
    tree: Tree,
    height_bound: u32,
    steps: u64,
    state: TrialState,
}

impl Trial {
    /// Start a trial from a single-root tree.
    ///
    /// A zero `height_bound` is rejected rather than looping forever.
    pub fn new(
        probabilities: SlotProbabilities,
        height_bound: u32,
    ) -> Result<Self, SimulationError> {
        if height_bound == 0 {
            return Err(SimulationError::InvalidHeightBound(height_bound));
        }
        Ok(Trial {
            tree: Tree::new(probabilities),
            height_bound,
            steps: 0,
            state: TrialState::Running,
        })
    }

    /// Advance once and reclassify. A finished trial is left untouched.
    pub fn step<R: Rng + ?Sized>(&mut self, rng: &mut R) -> TrialState {
        if self.state.is_terminal() {
            return self.state;
        }
        self.tree.advance(rng);
        self.steps += 1;

        let height = self.tree.height();
        self.state = if height == 0 {
            TrialState::Returned
        } else if height >= self.height_bound {
            TrialState::Absorbed
        } else {
            TrialState::Running
        };
        trace!(
            step = self.steps,
            height,
            frontier = self.tree.frontier_size(),
            "trial step"
        );
        if self.state.is_terminal() {
            debug!(
                state = ?self.state,
                steps = self.steps,
                peak = self.tree.peak_frontier_size(),
                "trial finished"
            );
        }
        self.state
    }

    /// Step until the trial returns or is absorbed.
    pub fn run<R: Rng + ?Sized>(mut self, rng: &mut R) -> TrialResult {
        loop {
            self.step(rng);
            if let Some(result) = self.result() {
                return result;
            }
        }
    }

    /// The result record, once the trial is finished
    pub fn result(&self) -> Option<TrialResult> {
        let outcome = match self.state {
            TrialState::Running => return None,
            TrialState::Returned => Outcome::Returned,
            TrialState::Absorbed => Outcome::Absorbed,
        };
        Some(TrialResult {
            outcome,
            steps: self.steps,
            peak_frontier_size: self.tree.peak_frontier_size(),
        })
    }

    pub fn state(&self) -> TrialState {
        self.state
    }

    pub fn steps(&self) -> u64 {
        self.steps
    }
}

/// Run one trial from a single root until it returns or reaches `height_bound`.
pub fn run_trial<R: Rng + ?Sized>(
    probabilities: SlotProbabilities,
    height_bound: u32,
    rng: &mut R,
) -> Result<TrialResult, SimulationError> {
    Ok(Trial::new(probabilities, height_bound)?.run(rng))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn probs(p0: f64, p1: f64) -> SlotProbabilities {
        SlotProbabilities::new(p0, p1).unwrap()
    }

    #[test]
    fn test_zero_height_bound_rejected() {
        let err = Trial::new(probs(0.5, 0.5), 0).unwrap_err();
        assert_eq!(err, SimulationError::InvalidHeightBound(0));
        let mut rng = SmallRng::seed_from_u64(0);
        assert!(run_trial(probs(0.5, 0.5), 0, &mut rng).is_err());
    }

    #[test]
    fn test_zero_probabilities_return_at_first_step() {
        let mut rng = SmallRng::seed_from_u64(7);
        let result = run_trial(probs(0.0, 0.0), 5, &mut rng).unwrap();
        assert_eq!(result.outcome, Outcome::Returned);
        assert_eq!(result.outcome.tag(), "return");
        assert_eq!(result.steps, 1);
        assert_eq!(result.peak_frontier_size, 1);
    }

    #[test]
    fn test_full_probabilities_absorb_at_bound() {
        let mut rng = SmallRng::seed_from_u64(8);
        for bound in 1..=8u32 {
            let result = run_trial(probs(1.0, 1.0), bound, &mut rng).unwrap();
            assert_eq!(result.outcome, Outcome::Absorbed);
            assert_eq!(result.outcome.to_string(), "absorb");
            assert_eq!(result.steps, u64::from(bound));
            assert_eq!(result.peak_frontier_size, 1usize << bound);
        }
    }

    #[test]
    fn test_single_slot_growth_is_a_spine() {
        let mut rng = SmallRng::seed_from_u64(9);
        let result = run_trial(probs(0.0, 1.0), 12, &mut rng).unwrap();
        assert_eq!(result.outcome, Outcome::Absorbed);
        assert_eq!(result.steps, 12);
        assert_eq!(result.peak_frontier_size, 1);
    }

    #[test]
    fn test_step_after_finish_is_noop() {
        let mut rng = SmallRng::seed_from_u64(10);
        let mut trial = Trial::new(probs(0.0, 0.0), 3).unwrap();
        assert!(trial.result().is_none());
        assert_eq!(trial.step(&mut rng), TrialState::Returned);
        assert_eq!(trial.step(&mut rng), TrialState::Returned);
        assert_eq!(trial.steps(), 1);
    }

    #[test]
    fn test_seeded_trial_replays_step_by_step() {
        let p = probs(0.3, 0.3);
        let bound = 10;
        let result = run_trial(p, bound, &mut SmallRng::seed_from_u64(2024)).unwrap();
        assert!(matches!(result.outcome, Outcome::Returned | Outcome::Absorbed));
        assert!(result.steps >= 1);
        assert!(result.peak_frontier_size >= 1);

        // Replay the same draws directly against the tree.
        let mut rng = SmallRng::seed_from_u64(2024);
        let mut tree = Tree::new(p);
        let mut steps = 0u64;
        loop {
            tree.advance(&mut rng);
            steps += 1;
            if tree.height() == 0 || tree.height() >= bound {
                break;
            }
        }
        assert_eq!(steps, result.steps);
        assert_eq!(tree.peak_frontier_size(), result.peak_frontier_size);
        let expected = if tree.is_at_root() {
            Outcome::Returned
        } else {
            Outcome::Absorbed
        };
        assert_eq!(expected, result.outcome);
    }

    proptest! {
        #[test]
        fn prop_trial_terminates_consistently(
            p0 in 0.0f64..=0.6,
            p1 in 0.0f64..=0.6,
            bound in 1u32..8,
            seed in any::<u64>(),
        ) {
            let result = run_trial(
                probs(p0, p1),
                bound,
                &mut SmallRng::seed_from_u64(seed),
            )
            .unwrap();
            prop_assert!(result.steps >= 1);
            prop_assert!(result.peak_frontier_size >= 1);
            if result.outcome == Outcome::Absorbed {
                // Height rises by at most one per step.
                prop_assert!(result.steps >= u64::from(bound));
            }
        }
    }
}
