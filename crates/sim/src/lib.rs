pub mod aggregate;
pub mod lottery;
pub mod random;
pub mod runner;
pub mod stopping;

pub use lottery::{CategoryCode, FrequencyEstimate, LotteryBatch, OccurrenceTable};
pub use random::{seeded_rng, RandomSource};
pub use stopping::{StoppingSumEstimate, TrialBatch};
