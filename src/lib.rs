/// Trader Lens: behavioral profiling of DEX wallets
///
/// Swap history goes through the pattern analyzer, the resulting profile is
/// persisted only when it changed materially, and stored profiles can be
/// aggregated over time.

pub mod algo;
pub mod config;
pub mod history;
pub mod intelligence;
pub mod storage;
pub mod util;

pub use config::{ConfigError, LensConfig};
pub use history::HistoricalAggregator;
pub use intelligence::{PatternAnalyzer, PipelineReport, ProfilePipeline, TokenClassifier};
pub use lens_core::*;
pub use storage::{AnalysisStore, FileStore, MemoryStore, SmartStore, StoreError, WalletIndex};
