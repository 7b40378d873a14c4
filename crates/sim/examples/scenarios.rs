use drawsim_shared::config::{BatchConfig, LotteryConfig, StoppingSumConfig};
use drawsim_sim::random::seeded_rng;
use drawsim_sim::stopping::recommended_max_draws;
use drawsim_sim::{lottery, runner, stopping};
use std::time::Instant;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = StoppingSumConfig::default();
    println!(
        "Stopping sum: {} trials, cap {} (cap suggested for 1e-9 truncation risk: {})",
        config.n_trials,
        config.max_draws_per_trial,
        recommended_max_draws(config.n_trials, 1e-9)?,
    );
    let start = Instant::now();
    let estimate = stopping::estimate(&config, &mut seeded_rng(config.seed))?;
    for m in estimate.cutoff_means() {
        println!("  first {:>6} trials: mean {:.5}", m.cutoff, m.mean);
    }
    println!("  e = {:.5} ({:.2}s)", std::f64::consts::E, start.elapsed().as_secs_f64());

    let one_year = LotteryConfig {
        n_simulations: 1,
        ..LotteryConfig::default()
    };
    let estimate = lottery::estimate::<u8, _>(&one_year, &mut seeded_rng(one_year.seed))?;
    println!("\nOne year of 5-from-59 draws:");
    for category in 1..=one_year.population_size {
        print!("{:>3}", estimate.occurrences(category)?[0]);
        if category % 20 == 0 {
            println!();
        }
    }
    println!("\n  most frequent ball drawn {} times", estimate.max_occurrences()[0]);

    let config = LotteryConfig::default();
    let start = Instant::now();
    let summary = runner::run_lottery_batches::<u8>(&config, &BatchConfig::default())?;
    println!("\n{} simulated years:", summary.n_simulations);
    println!(
        "  ball 1 drawn 5+ times: {:.1}%",
        100.0 * summary.fraction_at_least(1, 5)?
    );
    println!(
        "  some ball drawn 10+ times: {:.1}%",
        100.0 * summary.max_at_least_fraction(10)
    );
    println!("  time: {:.2}s", start.elapsed().as_secs_f64());
    Ok(())
}
