use std::ops::Range;

use rayon::prelude::*;
use tracing::{debug, info};

use drawsim_shared::config::{BatchConfig, LotteryConfig, StoppingSumConfig, MAX_DEFAULT_WORKERS};
use drawsim_shared::result::{FrequencySummary, StoppingSumSummary};
use drawsim_shared::SimError;

use crate::lottery::{CategoryCode, LotteryBatch};
use crate::random::batch_rng;
use crate::stopping::TrialBatch;

fn build_pool(batch: &BatchConfig) -> anyhow::Result<rayon::ThreadPool> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(
            batch
                .n_workers
                .unwrap_or_else(|| rayon::current_num_threads().min(MAX_DEFAULT_WORKERS)),
        )
        .build()?;
    Ok(pool)
}

/// Index ranges of the sub-batches covering `0..total`.
fn batch_ranges(total: usize, batch_size: usize) -> Vec<Range<usize>> {
    (0..total)
        .step_by(batch_size)
        .map(|start| start..(start + batch_size).min(total))
        .collect()
}

/// Stopping-sum estimate without materializing all trials at once.
///
/// Sub-batch `i` draws from `batch_rng(seed, i)`, so results depend on `batch_size` but not on the worker count.
pub fn run_stopping_batches(
    config: &StoppingSumConfig,
    batch: &BatchConfig,
) -> anyhow::Result<StoppingSumSummary> {
    config.validate()?;
    batch.validate()?;
    let ranges = batch_ranges(config.n_trials, batch.batch_size);
    info!(
        n_trials = config.n_trials,
        n_batches = ranges.len(),
        seed = config.seed,
        "running stopping-sum batches"
    );

    let pool = build_pool(batch)?;
    let partials: Result<Vec<StoppingSumSummary>, SimError> = pool.install(|| {
        ranges
            .par_iter()
            .enumerate()
            .map(|(index, range)| {
                let mut rng = batch_rng(config.seed, index);
                let trials = TrialBatch::draw(range.len(), config.max_draws_per_trial, &mut rng);
                let counts = trials
                    .stopping_counts(config.threshold)
                    .map_err(|err| offset_trial(err, range.start))?;

                let mut partial = StoppingSumSummary::empty(config.seed, &config.cutoffs);
                partial.n_trials = trials.n_trials();
                partial.total_draws = counts.iter().map(|&c| u64::from(c)).sum();
                for (cutoff, sum) in partial.cutoff_sums.iter_mut() {
                    let end = (*cutoff).clamp(range.start, range.end) - range.start;
                    *sum = counts.iter().take(end).map(|&c| u64::from(c)).sum();
                }
                debug!(batch = index, trials = range.len(), "stopping batch done");
                Ok(partial)
            })
            .collect()
    });

    let summary = partials?
        .into_iter()
        .fold(StoppingSumSummary::empty(config.seed, &config.cutoffs), StoppingSumSummary::merge);
    info!(mean = summary.overall_mean(), "stopping-sum batches complete");
    Ok(summary)
}

/// Reports a truncated trial by its index in the whole run.
fn offset_trial(err: SimError, offset: usize) -> SimError {
    match err {
        SimError::Truncation {
            trial,
            max_draws,
            threshold,
        } => SimError::Truncation {
            trial: trial + offset,
            max_draws,
            threshold,
        },
        other => other,
    }
}

/// Lottery frequency histograms accumulated over sub-batches of simulations.
pub fn run_lottery_batches<T: CategoryCode>(
    config: &LotteryConfig,
    batch: &BatchConfig,
) -> anyhow::Result<FrequencySummary> {
    config.validate()?;
    batch.validate()?;
    let ranges = batch_ranges(config.n_simulations, batch.batch_size);
    info!(
        n_simulations = config.n_simulations,
        n_batches = ranges.len(),
        seed = config.seed,
        "running lottery batches"
    );

    let pool = build_pool(batch)?;
    let partials: Result<Vec<FrequencySummary>, SimError> = pool.install(|| {
        ranges
            .par_iter()
            .enumerate()
            .map(|(index, range)| {
                let sub_config = LotteryConfig {
                    n_simulations: range.len(),
                    ..config.clone()
                };
                let mut rng = batch_rng(config.seed, index);
                let table = LotteryBatch::<T>::draw(&sub_config, &mut rng)?.occurrence_table();

                let mut partial =
                    FrequencySummary::empty(config.seed, config.population_size, config.n_rounds);
                for sim in 0..table.n_simulations() {
                    partial.record(table.column(sim).iter().copied())?;
                }
                debug!(batch = index, simulations = range.len(), "lottery batch done");
                Ok(partial)
            })
            .collect()
    });

    let summary = partials?.into_iter().fold(
        FrequencySummary::empty(config.seed, config.population_size, config.n_rounds),
        FrequencySummary::merge,
    );
    info!(simulations = summary.n_simulations, "lottery batches complete");
    Ok(summary)
}
