/// Wallet trading intelligence
///
/// Key Components:
/// - `classifier`: pool/token lookups, amount normalization, categories
/// - `pattern_analyzer`: swap history to behavioral profile
/// - `insights`: personality label and narrative findings
///
/// `ProfilePipeline` ties the analyzer to change detection, the store and
/// the wallet index.

pub mod classifier;
pub mod insights;
pub mod pattern_analyzer;

pub use classifier::{PoolPair, StaticTokenTables, TokenClassifier, TokenMetadataProvider};
pub use pattern_analyzer::PatternAnalyzer;

use dashmap::DashMap;
use lens_core::{AnalysisCache, StoredAnalysis, SwapEvent, TradingPatterns};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, instrument, warn};

use crate::config::LensConfig;
use crate::history::HistoricalAggregator;
use crate::storage::{
    AnalysisStore, ChangeDetector, IndexEntry, SmartStore, SmartStoreOutcome, StoreError,
    WalletIndex,
};
use crate::util::clock::Clock;

/// What one analyze-and-store run produced
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineReport {
    /// The freshly computed profile, whatever the storage outcome
    pub patterns: TradingPatterns,
    pub outcome: SmartStoreOutcome,
}

/// Analyze, decide and persist, one in-flight decision per wallet
pub struct ProfilePipeline {
    analyzer: PatternAnalyzer,
    smart_store: SmartStore,
    index: Arc<WalletIndex>,
    aggregator: HistoricalAggregator,
    wallet_locks: DashMap<String, Arc<Mutex<()>>>,
}

impl ProfilePipeline {
    pub fn new(analyzer: PatternAnalyzer, smart_store: SmartStore, index: Arc<WalletIndex>) -> Self {
        Self {
            analyzer,
            smart_store,
            index,
            aggregator: HistoricalAggregator::new(),
            wallet_locks: DashMap::new(),
        }
    }

    /// Build every component from configuration around the given store and index
    pub fn from_config(
        config: &LensConfig,
        store: Arc<dyn AnalysisStore>,
        index: Arc<WalletIndex>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let classifier = Arc::new(TokenClassifier::from_settings(&config.classifier));
        let detector = ChangeDetector::new(
            config.storage.growth_threshold,
            config.storage.fingerprint_mode,
        );
        let smart_store = SmartStore::new(store, detector, config.storage.epochs);
        Self::new(PatternAnalyzer::new(classifier, clock), smart_store, index)
    }

    pub fn index(&self) -> &WalletIndex {
        &self.index
    }

    fn wallet_lock(&self, wallet: &str) -> Arc<Mutex<()>> {
        self.wallet_locks
            .entry(wallet.to_string())
            .or_default()
            .clone()
    }

    /// Drop the wallet's lock once no caller holds or waits on it
    fn release_wallet_lock(&self, wallet: &str) {
        self.wallet_locks
            .remove_if(wallet, |_, lock| Arc::strong_count(lock) == 1);
    }

    /// Latest stored analysis for the wallet; lookup failures count as "none"
    pub async fn latest_analysis(&self, wallet: &str) -> Option<StoredAnalysis> {
        let entry = self.index.latest(wallet)?;

        match self.smart_store.store().get(&entry.locator).await {
            Ok(Some(analysis)) => Some(analysis),
            Ok(None) => {
                warn!("⚠️ Indexed analysis {} for {} not found in store", entry.locator, wallet);
                None
            }
            Err(e) => {
                warn!("⚠️ Failed to load previous analysis for {}: {}", wallet, e);
                None
            }
        }
    }

    /// Profile the wallet and store the result if it changed materially
    ///
    /// Never fails: store and index failures surface in `outcome.error` and
    /// the fresh profile is always returned.
    #[instrument(skip(self, swaps), fields(swaps = swaps.len()))]
    pub async fn analyze_and_store(&self, wallet: &str, swaps: &[SwapEvent]) -> PipelineReport {
        let lock = self.wallet_lock(wallet);
        let report = {
            let _guard = lock.lock().await;
            self.decide_and_persist(wallet, swaps).await
        };
        drop(lock);
        self.release_wallet_lock(wallet);
        report
    }

    async fn decide_and_persist(&self, wallet: &str, swaps: &[SwapEvent]) -> PipelineReport {
        let patterns = self.analyzer.analyze(wallet, swaps);
        let previous = self.latest_analysis(wallet).await;
        let mut outcome = self.smart_store.store_if_changed(&patterns, previous).await;

        if outcome.stored {
            if let Some(entry) = IndexEntry::for_analysis(&outcome.analysis) {
                let locator = entry.locator.clone();
                if let Err(e) = self.index.record(wallet, entry).await {
                    warn!("❌ Stored {} but failed to index it for {}: {}", locator, wallet, e);
                    outcome.stored = false;
                    outcome.error = Some(format!(
                        "analysis written to {} but the wallet index update failed: {}",
                        locator, e
                    ));
                }
            }
        }

        info!(
            "🧠 {} profiled: {} (stored: {}, {})",
            wallet, patterns.trading_personality, outcome.stored, outcome.decision.reason
        );

        PipelineReport { patterns, outcome }
    }

    /// Every indexed analysis for the wallet, aggregated over time
    #[instrument(skip(self))]
    pub async fn history(&self, wallet: &str) -> Result<AnalysisCache, StoreError> {
        let mut analyses = Vec::new();

        for entry in self.index.entries(wallet) {
            match self.smart_store.store().get(&entry.locator).await? {
                Some(analysis) => analyses.push(analysis),
                None => warn!("⚠️ Indexed analysis {} missing from store", entry.locator),
            }
        }

        info!("📚 Loaded {} analyses for {}", analyses.len(), wallet);
        Ok(self.aggregator.build(wallet, analyses))
    }
}
