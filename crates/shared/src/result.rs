use crate::error::SimError;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CutoffMean {
    pub cutoff: usize,
    pub mean: f64,
}

/// Stopping-count totals accumulated over sequential sub-batches.
///
/// Sums are integers, so merging partial summaries in any order gives the
/// same result.
#[derive(Debug, Clone, PartialEq)]
pub struct StoppingSumSummary {
    pub seed: u64,
    pub n_trials: usize,
    pub total_draws: u64,
    /// `(cutoff, sum of stopping counts over trials < cutoff)`, in config order.
    pub cutoff_sums: Vec<(usize, u64)>,
}

impl StoppingSumSummary {
    pub fn empty(seed: u64, cutoffs: &[usize]) -> Self {
        Self {
            seed,
            n_trials: 0,
            total_draws: 0,
            cutoff_sums: cutoffs.iter().map(|&c| (c, 0)).collect(),
        }
    }

    pub fn merge(mut self, other: StoppingSumSummary) -> Self {
        self.n_trials += other.n_trials;
        self.total_draws += other.total_draws;
        for (mine, theirs) in self.cutoff_sums.iter_mut().zip(other.cutoff_sums) {
            debug_assert_eq!(mine.0, theirs.0);
            mine.1 += theirs.1;
        }
        self
    }

    pub fn overall_mean(&self) -> f64 {
        if self.n_trials == 0 {
            0.0
        } else {
            self.total_draws as f64 / self.n_trials as f64
        }
    }

    pub fn cutoff_means(&self) -> Vec<CutoffMean> {
        self.cutoff_sums
            .iter()
            .map(|&(cutoff, sum)| CutoffMean {
                cutoff,
                mean: sum as f64 / cutoff as f64,
            })
            .collect()
    }

    pub fn mean_at(&self, cutoff: usize) -> Option<f64> {
        self.cutoff_means()
            .into_iter()
            .find(|m| m.cutoff == cutoff)
            .map(|m| m.mean)
    }
}

/// Per-category occurrence histograms accumulated over sequential sub-batches.
///
/// Row `c - 1` of `occurrence_histogram` counts, for category `c`, how many
/// simulations saw it exactly `k` times (`k` in `0..=n_rounds`).
#[derive(Debug, Clone, PartialEq)]
pub struct FrequencySummary {
    pub seed: u64,
    pub population_size: usize,
    pub n_rounds: usize,
    pub n_simulations: u64,
    occurrence_histogram: Vec<u64>,
    max_histogram: Vec<u64>,
}

impl FrequencySummary {
    pub fn empty(seed: u64, population_size: usize, n_rounds: usize) -> Self {
        Self {
            seed,
            population_size,
            n_rounds,
            n_simulations: 0,
            occurrence_histogram: vec![0; population_size * (n_rounds + 1)],
            max_histogram: vec![0; n_rounds + 1],
        }
    }

    /// Adds one simulation's occurrence column, one count per category.
    ///
    /// A category appears at most once per round, so a count above `n_rounds`
    /// is rejected, as is a column of the wrong length. Nothing is recorded
    /// on error.
    pub fn record(&mut self, column: impl IntoIterator<Item = u32>) -> Result<(), SimError> {
        let column: Vec<u32> = column.into_iter().collect();
        if column.len() != self.population_size {
            return Err(SimError::invalid(
                "column",
                format!(
                    "expected {} categories, got {}",
                    self.population_size,
                    column.len()
                ),
            ));
        }
        if let Some(&count) = column.iter().find(|&&c| c as usize > self.n_rounds) {
            return Err(SimError::Overflow {
                what: "occurrence count",
                value: count as u128,
                max: self.n_rounds as u128,
            });
        }

        let width = self.n_rounds + 1;
        let mut max = 0;
        for (row, count) in column.into_iter().enumerate() {
            let count = count as usize;
            self.occurrence_histogram[row * width + count] += 1;
            max = max.max(count);
        }
        self.max_histogram[max] += 1;
        self.n_simulations += 1;
        Ok(())
    }

    pub fn merge(mut self, other: FrequencySummary) -> Self {
        debug_assert_eq!(self.occurrence_histogram.len(), other.occurrence_histogram.len());
        self.n_simulations += other.n_simulations;
        for (a, b) in self
            .occurrence_histogram
            .iter_mut()
            .zip(other.occurrence_histogram)
        {
            *a += b;
        }
        for (a, b) in self.max_histogram.iter_mut().zip(other.max_histogram) {
            *a += b;
        }
        self
    }

    /// Histogram of occurrence counts for a 1-based category.
    pub fn histogram(&self, category: usize) -> Result<&[u64], SimError> {
        if category == 0 || category > self.population_size {
            return Err(SimError::UnknownCategory {
                category,
                population_size: self.population_size,
            });
        }
        let width = self.n_rounds + 1;
        let start = (category - 1) * width;
        Ok(&self.occurrence_histogram[start..start + width])
    }

    /// Simulations in which `category` occurred at least `threshold` times.
    pub fn count_at_least(&self, category: usize, threshold: u32) -> Result<u64, SimError> {
        Ok(tail_sum(self.histogram(category)?, threshold))
    }

    pub fn fraction_at_least(&self, category: usize, threshold: u32) -> Result<f64, SimError> {
        let count = self.count_at_least(category, threshold)?;
        Ok(self.fraction(count))
    }

    pub fn max_histogram(&self) -> &[u64] {
        &self.max_histogram
    }

    /// Fraction of simulations in which some category reached `threshold`.
    pub fn max_at_least_fraction(&self, threshold: u32) -> f64 {
        self.fraction(tail_sum(&self.max_histogram, threshold))
    }

    fn fraction(&self, count: u64) -> f64 {
        if self.n_simulations == 0 {
            0.0
        } else {
            count as f64 / self.n_simulations as f64
        }
    }
}

fn tail_sum(histogram: &[u64], threshold: u32) -> u64 {
    histogram.iter().skip(threshold as usize).sum()
}
