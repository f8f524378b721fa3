/// Cross-time analysis over a wallet's stored profiles

pub mod aggregator;

pub use aggregator::HistoricalAggregator;
