use crate::error::{require_positive, SimError};

// Baseline stopping-sum parameters
pub const BASELINE_TRIALS: usize = 10_000;
pub const BASELINE_MAX_DRAWS: usize = 1_000;
pub const BASELINE_CUTOFFS: [usize; 3] = [100, 1_000, 10_000];
pub const STOPPING_THRESHOLD: f64 = 1.0;
pub const BASELINE_SEED: u64 = 47_404;

// Baseline lottery parameters (59 balls, 5 per draw, weekly for a year)
pub const POPULATION_SIZE: usize = 59;
pub const DRAW_SIZE: usize = 5;
pub const DRAW_ROUNDS: usize = 52;
pub const BASELINE_SIMS: usize = 10_000;

// Runner defaults
pub const DEFAULT_BATCH_SIZE: usize = 1_000;
pub const MAX_DEFAULT_WORKERS: usize = 8;

#[derive(Debug, Clone)]
pub struct StoppingSumConfig {
    pub n_trials: usize,
    pub max_draws_per_trial: usize,
    /// Sample sizes at which the mean is reported, each `<= n_trials`.
    pub cutoffs: Vec<usize>,
    pub threshold: f64,
    pub seed: u64,
}

impl Default for StoppingSumConfig {
    fn default() -> Self {
        Self {
            n_trials: BASELINE_TRIALS,
            max_draws_per_trial: BASELINE_MAX_DRAWS,
            cutoffs: BASELINE_CUTOFFS.to_vec(),
            threshold: STOPPING_THRESHOLD,
            seed: BASELINE_SEED,
        }
    }
}

impl StoppingSumConfig {
    pub fn validate(&self) -> Result<(), SimError> {
        require_positive("n_trials", self.n_trials)?;
        require_positive("max_draws_per_trial", self.max_draws_per_trial)?;
        if !self.threshold.is_finite() || self.threshold <= 0.0 {
            return Err(SimError::invalid(
                "threshold",
                format!("must be finite and positive, got {}", self.threshold),
            ));
        }
        for &cutoff in &self.cutoffs {
            require_positive("cutoffs", cutoff)?;
            if cutoff > self.n_trials {
                return Err(SimError::invalid(
                    "cutoffs",
                    format!("cutoff {} exceeds n_trials {}", cutoff, self.n_trials),
                ));
            }
        }
        // Counts are stored as u32.
        if self.max_draws_per_trial > u32::MAX as usize {
            return Err(SimError::Overflow {
                what: "max_draws_per_trial",
                value: self.max_draws_per_trial as u128,
                max: u32::MAX as u128,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct LotteryConfig {
    pub population_size: usize,
    pub draw_size: usize,
    pub n_rounds: usize,
    pub n_simulations: usize,
    pub seed: u64,
}

impl Default for LotteryConfig {
    fn default() -> Self {
        Self {
            population_size: POPULATION_SIZE,
            draw_size: DRAW_SIZE,
            n_rounds: DRAW_ROUNDS,
            n_simulations: BASELINE_SIMS,
            seed: BASELINE_SEED,
        }
    }
}

impl LotteryConfig {
    pub fn validate(&self) -> Result<(), SimError> {
        require_positive("population_size", self.population_size)?;
        require_positive("draw_size", self.draw_size)?;
        require_positive("n_rounds", self.n_rounds)?;
        require_positive("n_simulations", self.n_simulations)?;
        if self.draw_size > self.population_size {
            return Err(SimError::invalid(
                "draw_size",
                format!(
                    "draw size {} exceeds population size {}",
                    self.draw_size, self.population_size
                ),
            ));
        }
        self.draws_per_simulation().map(|_| ())
    }

    /// Total draws in one simulation; this is the sum of every occurrence column.
    pub fn draws_per_simulation(&self) -> Result<u32, SimError> {
        self.n_rounds
            .checked_mul(self.draw_size)
            .and_then(|total| u32::try_from(total).ok())
            .ok_or(SimError::Overflow {
                what: "n_rounds * draw_size",
                value: self.n_rounds as u128 * self.draw_size as u128,
                max: u32::MAX as u128,
            })
    }
}

#[derive(Debug, Clone)]
pub struct BatchConfig {
    /// Trials (or simulations) materialized at once.
    pub batch_size: usize,
    /// `None` picks `min(available threads, 8)`.
    pub n_workers: Option<usize>,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            n_workers: None,
        }
    }
}

impl BatchConfig {
    pub fn validate(&self) -> Result<(), SimError> {
        require_positive("batch_size", self.batch_size)?;
        if let Some(workers) = self.n_workers {
            require_positive("n_workers", workers)?;
        }
        Ok(())
    }

    pub fn n_batches(&self, total: usize) -> usize {
        total.div_ceil(self.batch_size)
    }
}
