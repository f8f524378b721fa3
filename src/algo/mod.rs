/// Numeric building blocks for the pattern analyzer

pub mod statistics;

pub use statistics::{FrequencyEntry, StatsError, TimePeriod};
