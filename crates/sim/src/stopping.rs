//! Expected number of uniform draws until a running sum exceeds a threshold.
//!
//! With threshold 1 the expectation is Euler's number.

use ndarray::{Array1, Array2, ArrayView1, Axis};
use tracing::debug;

use drawsim_shared::config::StoppingSumConfig;
use drawsim_shared::result::CutoffMean;
use drawsim_shared::SimError;

use crate::aggregate::{first_exceeding, mean, prefix_mean};
use crate::random::RandomSource;

/// `n_trials x max_draws` uniforms, one trial per row.
#[derive(Debug, Clone, PartialEq)]
pub struct TrialBatch {
    draws: Array2<f64>,
}

impl TrialBatch {
    pub fn draw<R: RandomSource + ?Sized>(n_trials: usize, max_draws: usize, rng: &mut R) -> Self {
        Self {
            draws: rng.uniform_grid(n_trials, max_draws),
        }
    }

    pub fn from_draws(draws: Array2<f64>) -> Self {
        Self { draws }
    }

    pub fn n_trials(&self) -> usize {
        self.draws.nrows()
    }

    pub fn max_draws(&self) -> usize {
        self.draws.ncols()
    }

    /// Prefix sums along each row.
    pub fn running_sums(&self) -> Array2<f64> {
        let mut sums = self.draws.clone();
        sums.accumulate_axis_inplace(Axis(1), |&prev, curr| *curr += prev);
        sums
    }

    /// Draws consumed per trial until the running sum first exceeds `threshold`.
    ///
    /// Any row that never crosses aborts the whole batch with
    /// [`SimError::Truncation`].
    pub fn stopping_counts(&self, threshold: f64) -> Result<Array1<u32>, SimError> {
        let sums = self.running_sums();
        let counts = sums
            .rows()
            .into_iter()
            .enumerate()
            .map(|(trial, row)| {
                first_exceeding(row, threshold)
                    .map(|index| (index + 1) as u32)
                    .ok_or(SimError::Truncation {
                        trial,
                        max_draws: self.max_draws(),
                        threshold,
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Array1::from(counts))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StoppingSumEstimate {
    stopping_counts: Array1<u32>,
    cutoff_means: Vec<CutoffMean>,
}

impl StoppingSumEstimate {
    /// Means over nested prefixes of the same counts; cutoffs are not resampled.
    pub fn from_counts(stopping_counts: Array1<u32>, cutoffs: &[usize]) -> Result<Self, SimError> {
        let cutoff_means = cutoffs
            .iter()
            .map(|&cutoff| {
                prefix_mean(stopping_counts.view(), cutoff)
                    .map(|mean| CutoffMean { cutoff, mean })
                    .ok_or_else(|| {
                        SimError::invalid(
                            "cutoffs",
                            format!(
                                "cutoff {} outside 1..={}",
                                cutoff,
                                stopping_counts.len()
                            ),
                        )
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            stopping_counts,
            cutoff_means,
        })
    }

    pub fn stopping_counts(&self) -> ArrayView1<'_, u32> {
        self.stopping_counts.view()
    }

    pub fn cutoff_means(&self) -> &[CutoffMean] {
        &self.cutoff_means
    }

    pub fn mean_at(&self, cutoff: usize) -> Option<f64> {
        self.cutoff_means
            .iter()
            .find(|m| m.cutoff == cutoff)
            .map(|m| m.mean)
    }

    pub fn overall_mean(&self) -> f64 {
        mean(self.stopping_counts.view()).unwrap_or(0.0)
    }
}

pub fn estimate<R: RandomSource + ?Sized>(
    config: &StoppingSumConfig,
    rng: &mut R,
) -> Result<StoppingSumEstimate, SimError> {
    config.validate()?;
    debug!(
        n_trials = config.n_trials,
        max_draws = config.max_draws_per_trial,
        threshold = config.threshold,
        "drawing stopping-sum trials"
    );

    let batch = TrialBatch::draw(config.n_trials, config.max_draws_per_trial, rng);
    let counts = batch.stopping_counts(config.threshold)?;
    let estimate = StoppingSumEstimate::from_counts(counts, &config.cutoffs)?;

    debug!(mean = estimate.overall_mean(), "stopping-sum estimate ready");
    Ok(estimate)
}

/// Smallest cap `m` with `n_trials / m! <= tolerance`.
///
/// `P(U_1 + ... + U_m <= 1) = 1/m!` for iid uniforms, so by the union bound the
/// chance that any trial is truncated at cap `m` is at most `n_trials / m!`.
/// Only valid for threshold 1.
pub fn recommended_max_draws(n_trials: usize, tolerance: f64) -> Result<usize, SimError> {
    if !(tolerance > 0.0 && tolerance < 1.0) {
        return Err(SimError::invalid(
            "tolerance",
            format!("must lie in (0, 1), got {}", tolerance),
        ));
    }
    let mut bound = n_trials as f64;
    let mut m = 1usize;
    while bound > tolerance {
        m += 1;
        bound /= m as f64;
    }
    Ok(m)
}
