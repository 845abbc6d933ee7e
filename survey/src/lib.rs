//! sapling Survey - Many-trial aggregation
//!
//! Runs independent trials of the birth-death process and tallies return
//! times, absorptions and peak frontier sizes into histograms.
//!
//! Trials run one after another. Trial `i` draws from its own
//! `SmallRng::seed_from_u64(seed + i)` stream, so any single trial in a survey
//! can be replayed on its own.

use std::collections::BTreeMap;

use rand::rngs::SmallRng;
use rand::SeedableRng;
use sapling_engine::{Outcome, SimulationError, SlotProbabilities, Trial, TrialState};
use tracing::{debug_span, info};

/// Parameters of a survey
#[derive(Debug, Clone, PartialEq)]
pub struct SurveyConfig {
    pub probabilities: SlotProbabilities,
    pub height_bound: u32,
    pub trials: u64,
    /// Base seed; trial `i` uses `seed + i`
    pub seed: u64,
    /// Hard cap on steps per trial. Trials still running at the cap are
    /// counted as truncated.
    pub step_ceiling: Option<u64>,
}

impl Default for SurveyConfig {
    fn default() -> Self {
        SurveyConfig {
            probabilities: SlotProbabilities::default(),
            height_bound: 10,
            trials: 1_000,
            seed: 0,
            step_ceiling: None,
        }
    }
}

impl SurveyConfig {
    pub fn with_probabilities(mut self, probabilities: SlotProbabilities) -> Self {
        self.probabilities = probabilities;
        self
    }

    pub fn with_height_bound(mut self, height_bound: u32) -> Self {
        self.height_bound = height_bound;
        self
    }

    pub fn with_trials(mut self, trials: u64) -> Self {
        self.trials = trials;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_step_ceiling(mut self, step_ceiling: Option<u64>) -> Self {
        self.step_ceiling = step_ceiling;
        self
    }

    /// Check every parameter before any trial runs.
    pub fn validate(&self) -> Result<(), SimulationError> {
        if self.height_bound == 0 {
            return Err(SimulationError::InvalidHeightBound(self.height_bound));
        }
        if self.trials == 0 {
            return Err(SimulationError::InvalidTrialCount(self.trials));
        }
        if self.step_ceiling == Some(0) {
            return Err(SimulationError::InvalidStepCeiling(0));
        }
        Ok(())
    }
}

/// Tallies over all trials of a survey
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SurveyReport {
    pub trials: u64,
    /// Return step -> number of trials that returned at that step
    pub return_times: BTreeMap<u64, u64>,
    pub absorbed: u64,
    pub truncated: u64,
    /// Peak frontier size -> number of finished trials with that peak
    pub peak_sizes: BTreeMap<usize, u64>,
}

impl SurveyReport {
    /// Number of trials that returned to the empty root
    pub fn returned(&self) -> u64 {
        self.return_times.values().sum()
    }

    /// Fraction of all trials that returned
    pub fn return_fraction(&self) -> f64 {
        if self.trials == 0 {
            return 0.0;
        }
        self.returned() as f64 / self.trials as f64
    }

    /// Mean return step over returned trials, `None` if none returned
    pub fn mean_return_time(&self) -> Option<f64> {
        let returned = self.returned();
        if returned == 0 {
            return None;
        }
        let total: u64 = self.return_times.iter().map(|(&t, &n)| t * n).sum();
        Some(total as f64 / returned as f64)
    }

    fn record(&mut self, outcome: Outcome, steps: u64, peak: usize) {
        match outcome {
            Outcome::Returned => *self.return_times.entry(steps).or_insert(0) += 1,
            Outcome::Absorbed => self.absorbed += 1,
        }
        *self.peak_sizes.entry(peak).or_insert(0) += 1;
    }
}

/// Run `config.trials` independent trials and tally their results.
pub fn run_survey(config: &SurveyConfig) -> Result<SurveyReport, SimulationError> {
    config.validate()?;
    let _span = debug_span!(
        "survey",
        trials = config.trials,
        bound = config.height_bound
    )
    .entered();
    info!(
        p = ?config.probabilities,
        height_bound = config.height_bound,
        trials = config.trials,
        seed = config.seed,
        "starting survey"
    );

    let mut report = SurveyReport {
        trials: config.trials,
        ..SurveyReport::default()
    };
    for i in 0..config.trials {
        let mut rng = SmallRng::seed_from_u64(config.seed.wrapping_add(i));
        let mut trial = Trial::new(config.probabilities, config.height_bound)?;
        loop {
            let state = trial.step(&mut rng);
            if state.is_terminal() {
                break;
            }
            if config.step_ceiling.is_some_and(|cap| trial.steps() >= cap) {
                break;
            }
        }
        match trial.result() {
            Some(result) => report.record(result.outcome, result.steps, result.peak_frontier_size),
            None => {
                debug_assert_eq!(trial.state(), TrialState::Running);
                report.truncated += 1;
            }
        }
    }

    info!(
        returned = report.returned(),
        absorbed = report.absorbed,
        truncated = report.truncated,
        "survey finished"
    );
    Ok(report)
}
