//! Occurrence frequencies of categories drawn without replacement, round
//! after round.
//!
//! Category identifiers are 1-based everywhere in this module's public API.

use std::fmt::Debug;

use ndarray::{Array1, Array2, Array3, ArrayView1, ArrayView2, ArrayView3, Axis};
use tracing::debug;

use drawsim_shared::config::LotteryConfig;
use drawsim_shared::SimError;

use crate::aggregate;
use crate::random::RandomSource;

/// Integer type a batch stores its category identifiers in.
pub trait CategoryCode: Copy + Debug + Default + Send + Sync + 'static {
    const MAX: usize;
    const NAME: &'static str;

    /// Caller guarantees `value <= Self::MAX`.
    fn from_usize(value: usize) -> Self;
    fn to_usize(self) -> usize;
}

macro_rules! impl_category_code {
    ($($t:ty),*) => {
        $(
            impl CategoryCode for $t {
                const MAX: usize = <$t>::MAX as usize;
                const NAME: &'static str = stringify!($t);

                #[inline]
                fn from_usize(value: usize) -> Self {
                    value as $t
                }

                #[inline]
                fn to_usize(self) -> usize {
                    self as usize
                }
            }
        )*
    };
}

impl_category_code!(u8, u16, u32);

/// Rejects populations whose largest identifier does not fit in `T`.
pub fn check_capacity<T: CategoryCode>(population_size: usize) -> Result<(), SimError> {
    if population_size > T::MAX {
        return Err(SimError::Overflow {
            what: "population_size",
            value: population_size as u128,
            max: T::MAX as u128,
        });
    }
    Ok(())
}

/// `n_simulations x n_rounds x draw_size` category identifiers.
#[derive(Debug, Clone, PartialEq)]
pub struct LotteryBatch<T> {
    draws: Array3<T>,
    population_size: usize,
}

impl<T: CategoryCode> LotteryBatch<T> {
    pub fn draw<R: RandomSource + ?Sized>(
        config: &LotteryConfig,
        rng: &mut R,
    ) -> Result<Self, SimError> {
        config.validate()?;
        check_capacity::<T>(config.population_size)?;
        debug!(
            code = T::NAME,
            population = config.population_size,
            draw_size = config.draw_size,
            rounds = config.n_rounds,
            simulations = config.n_simulations,
            "drawing lottery batch"
        );

        let mut pool: Vec<T> = (1..=config.population_size).map(T::from_usize).collect();
        let mut draws = Array3::<T>::default((
            config.n_simulations,
            config.n_rounds,
            config.draw_size,
        ));
        // Lanes along the last axis come in (simulation, round) order. The
        // pool keeps its shuffled order between rounds; each partial shuffle
        // is uniform regardless of the starting order.
        for mut round in draws.lanes_mut(Axis(2)) {
            let chosen = rng.sample_without_replacement(&mut pool, config.draw_size);
            round.iter_mut().zip(chosen).for_each(|(slot, &v)| *slot = v);
        }

        Ok(Self {
            draws,
            population_size: config.population_size,
        })
    }

    pub fn from_draws(draws: Array3<T>, population_size: usize) -> Result<Self, SimError> {
        check_capacity::<T>(population_size)?;
        if let Some(&bad) = draws
            .iter()
            .find(|v| v.to_usize() == 0 || v.to_usize() > population_size)
        {
            return Err(SimError::UnknownCategory {
                category: bad.to_usize(),
                population_size,
            });
        }
        Ok(Self {
            draws,
            population_size,
        })
    }

    pub fn draws(&self) -> ArrayView3<'_, T> {
        self.draws.view()
    }

    pub fn n_simulations(&self) -> usize {
        self.draws.len_of(Axis(0))
    }

    /// `population_size x n_simulations`; row `c - 1` holds category `c`.
    pub fn occurrence_table(&self) -> OccurrenceTable {
        let mut counts = Array2::<u32>::zeros((self.population_size, self.n_simulations()));
        for (sim, rounds) in self.draws.outer_iter().enumerate() {
            for &v in rounds.iter() {
                counts[[v.to_usize() - 1, sim]] += 1;
            }
        }
        OccurrenceTable { counts }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OccurrenceTable {
    counts: Array2<u32>,
}

impl OccurrenceTable {
    pub fn counts(&self) -> ArrayView2<'_, u32> {
        self.counts.view()
    }

    pub fn population_size(&self) -> usize {
        self.counts.nrows()
    }

    pub fn n_simulations(&self) -> usize {
        self.counts.ncols()
    }

    /// Occurrences of `category` in each simulation.
    pub fn row(&self, category: usize) -> Result<ArrayView1<'_, u32>, SimError> {
        if category == 0 || category > self.population_size() {
            return Err(SimError::UnknownCategory {
                category,
                population_size: self.population_size(),
            });
        }
        Ok(self.counts.row(category - 1))
    }

    /// One column per simulation.
    pub fn column(&self, simulation: usize) -> ArrayView1<'_, u32> {
        self.counts.column(simulation)
    }

    pub fn max_occurrences(&self) -> Array1<u32> {
        aggregate::column_max(self.counts.view())
    }

    pub fn column_sums(&self) -> Array1<u32> {
        self.counts.sum_axis(Axis(0))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FrequencyEstimate {
    table: OccurrenceTable,
    max_occurrences: Array1<u32>,
}

impl FrequencyEstimate {
    pub fn from_table(table: OccurrenceTable) -> Self {
        let max_occurrences = table.max_occurrences();
        Self {
            table,
            max_occurrences,
        }
    }

    pub fn table(&self) -> &OccurrenceTable {
        &self.table
    }

    pub fn max_occurrences(&self) -> ArrayView1<'_, u32> {
        self.max_occurrences.view()
    }

    pub fn occurrences(&self, category: usize) -> Result<ArrayView1<'_, u32>, SimError> {
        self.table.row(category)
    }

    /// Simulations in which `category` occurred at least `threshold` times.
    pub fn count_at_least(&self, category: usize, threshold: u32) -> Result<usize, SimError> {
        Ok(aggregate::count_at_least(self.table.row(category)?, threshold))
    }

    pub fn fraction_at_least(&self, category: usize, threshold: u32) -> Result<f64, SimError> {
        Ok(aggregate::fraction_at_least(self.table.row(category)?, threshold))
    }

    /// Whether any category reached `threshold` in any simulation.
    pub fn any_at_least(&self, threshold: u32) -> bool {
        aggregate::any_at_least(self.max_occurrences.view(), threshold)
    }

    /// Fraction of simulations whose most frequent category reached `threshold`.
    pub fn max_at_least_fraction(&self, threshold: u32) -> f64 {
        aggregate::fraction_at_least(self.max_occurrences.view(), threshold)
    }
}

/// Draws a batch stored as `T`, then counts occurrences and their maxima.
pub fn estimate<T: CategoryCode, R: RandomSource + ?Sized>(
    config: &LotteryConfig,
    rng: &mut R,
) -> Result<FrequencyEstimate, SimError> {
    let batch = LotteryBatch::<T>::draw(config, rng)?;
    let estimate = FrequencyEstimate::from_table(batch.occurrence_table());
    debug!(
        simulations = config.n_simulations,
        max_count = estimate.max_occurrences().iter().copied().max().unwrap_or(0),
        "lottery estimate ready"
    );
    Ok(estimate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::seeded_rng;
    use ndarray::array;

    fn small_config() -> LotteryConfig {
        LotteryConfig {
            population_size: 10,
            draw_size: 3,
            n_rounds: 4,
            n_simulations: 6,
            seed: 5,
        }
    }

    #[test]
    fn test_batch_shape_and_range() {
        let config = small_config();
        let batch = LotteryBatch::<u8>::draw(&config, &mut seeded_rng(config.seed)).unwrap();
        assert_eq!(batch.draws().dim(), (6, 4, 3));
        assert!(batch.draws().iter().all(|&v| (1..=10).contains(&v)));
        for round in batch.draws().lanes(Axis(2)) {
            let mut values = round.to_vec();
            values.sort_unstable();
            values.dedup();
            assert_eq!(values.len(), 3, "repeat within a round");
        }
    }

    #[test]
    fn test_occurrence_table_from_known_draws() {
        // 2 simulations, 2 rounds, 2 draws, population 3
        let draws = array![[[1u8, 2], [2, 3]], [[3, 1], [1, 3]]];
        let batch = LotteryBatch::from_draws(draws, 3).unwrap();
        let table = batch.occurrence_table();
        assert_eq!(table.counts(), array![[1u32, 2], [2, 0], [1, 2]]);
        assert_eq!(table.max_occurrences(), array![2, 2]);
        assert_eq!(table.column_sums(), array![4, 4]);
        assert_eq!(table.row(2).unwrap(), array![2, 0]);
    }

    #[test]
    fn test_from_draws_rejects_out_of_range() {
        let draws = array![[[0u8, 1]]];
        assert!(matches!(
            LotteryBatch::from_draws(draws, 3),
            Err(SimError::UnknownCategory { category: 0, .. })
        ));
        let draws = array![[[4u8, 1]]];
        assert!(LotteryBatch::from_draws(draws, 3).is_err());
    }

    #[test]
    fn test_narrow_type_overflow() {
        let config = LotteryConfig {
            population_size: 300,
            ..small_config()
        };
        let mut rng = seeded_rng(1);
        assert_eq!(
            LotteryBatch::<u8>::draw(&config, &mut rng),
            Err(SimError::Overflow {
                what: "population_size",
                value: 300,
                max: 255,
            })
        );
        assert!(LotteryBatch::<u16>::draw(&config, &mut rng).is_ok());
    }

    #[test]
    fn test_exact_capacity_accepted() {
        assert!(check_capacity::<u8>(255).is_ok());
        assert!(check_capacity::<u8>(256).is_err());
    }

    #[test]
    fn test_queries_are_one_based() {
        let draws = array![[[1u8, 2]], [[1, 3]], [[2, 3]]];
        let batch = LotteryBatch::from_draws(draws, 3).unwrap();
        let estimate = FrequencyEstimate::from_table(batch.occurrence_table());

        assert_eq!(estimate.count_at_least(1, 1), Ok(2));
        assert_eq!(estimate.count_at_least(3, 1), Ok(2));
        assert_eq!(estimate.fraction_at_least(2, 1), Ok(2.0 / 3.0));
        assert!(estimate.any_at_least(1));
        assert!(!estimate.any_at_least(2));
        assert_eq!(estimate.max_at_least_fraction(1), 1.0);
        assert!(matches!(
            estimate.count_at_least(0, 1),
            Err(SimError::UnknownCategory { category: 0, population_size: 3 })
        ));
        assert!(estimate.occurrences(4).is_err());
    }

    #[test]
    fn test_estimate_conserves_draws() {
        let config = small_config();
        let estimate = estimate::<u32, _>(&config, &mut seeded_rng(config.seed)).unwrap();
        assert!(estimate.table().column_sums().iter().all(|&s| s == 12));
        assert_eq!(estimate.max_occurrences().len(), 6);
    }
}
