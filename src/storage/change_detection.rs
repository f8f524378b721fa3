/// Change detection and the smart-store decision
///
/// A fresh profile is written only when it is materially different from the
/// wallet's latest stored one. Everything up to `SmartStore` is pure.

use lens_core::{AnalysisMetadata, StoredAnalysis, TradingPatterns, ANALYSIS_SCHEMA_VERSION};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::hash_utils::hex_digest;
use super::AnalysisStore;

pub const DEFAULT_GROWTH_THRESHOLD: f64 = 0.10;

/// Which profile fields feed the fingerprint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FingerprintMode {
    /// swap count, top token, style and the analysis date
    #[default]
    WithAnalysisDate,
    /// same minus the analysis date, so re-running on unchanged data is a no-op
    ContentOnly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreReason {
    NoPreviousAnalysis,
    SwapCountGrowth,
    FingerprintChanged,
    Unchanged,
}

impl StoreReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            StoreReason::NoPreviousAnalysis => "no previous analysis",
            StoreReason::SwapCountGrowth => "swap count grew past threshold",
            StoreReason::FingerprintChanged => "fingerprint changed",
            StoreReason::Unchanged => "no significant change",
        }
    }
}

impl fmt::Display for StoreReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreDecision {
    pub should_store: bool,
    pub reason: StoreReason,
    pub fingerprint: String,
    pub previous_fingerprint: Option<String>,
    /// New swap count minus the previous one (0 without a previous analysis)
    pub swap_count_delta: i64,
}

#[derive(Debug, Clone, Copy)]
pub struct ChangeDetector {
    growth_threshold: f64,
    mode: FingerprintMode,
}

impl Default for ChangeDetector {
    fn default() -> Self {
        Self::new(DEFAULT_GROWTH_THRESHOLD, FingerprintMode::default())
    }
}

impl ChangeDetector {
    pub fn new(growth_threshold: f64, mode: FingerprintMode) -> Self {
        Self {
            growth_threshold,
            mode,
        }
    }

    /// Stable digest of the fields that define "the same profile"
    pub fn fingerprint(&self, patterns: &TradingPatterns) -> String {
        let mut material = format!(
            "{}|{}|{}",
            patterns.total_swaps(),
            patterns.top_token().unwrap_or(""),
            patterns.trading_rhythm.style.as_str()
        );
        if self.mode == FingerprintMode::WithAnalysisDate {
            material.push('|');
            material.push_str(&patterns.analysis_date.to_rfc3339());
        }
        hex_digest(material.as_bytes())
    }

    pub fn decide(
        &self,
        patterns: &TradingPatterns,
        previous: Option<&StoredAnalysis>,
    ) -> StoreDecision {
        let fingerprint = self.fingerprint(patterns);

        let previous = match previous {
            Some(previous) => previous,
            None => {
                return StoreDecision {
                    should_store: true,
                    reason: StoreReason::NoPreviousAnalysis,
                    fingerprint,
                    previous_fingerprint: None,
                    swap_count_delta: 0,
                }
            }
        };

        let new_count = patterns.total_swaps();
        let old_count = previous.metadata.swap_count;
        let swap_count_delta = new_count as i64 - old_count as i64;

        let grew = if old_count == 0 {
            new_count > 0
        } else {
            swap_count_delta as f64 / old_count as f64 > self.growth_threshold
        };

        let reason = if grew {
            StoreReason::SwapCountGrowth
        } else if fingerprint != previous.metadata.fingerprint {
            StoreReason::FingerprintChanged
        } else {
            StoreReason::Unchanged
        };

        StoreDecision {
            should_store: reason != StoreReason::Unchanged,
            reason,
            fingerprint,
            previous_fingerprint: Some(previous.metadata.fingerprint.clone()),
            swap_count_delta,
        }
    }

    /// Wrap a profile for persistence; the locator stays empty until the store assigns one
    pub fn prepare(&self, patterns: &TradingPatterns, fingerprint: &str) -> StoredAnalysis {
        let created_at = patterns.analysis_date;
        StoredAnalysis {
            id: StoredAnalysis::make_id(&patterns.wallet_address, created_at),
            wallet_address: patterns.wallet_address.clone(),
            timestamp: created_at,
            version: ANALYSIS_SCHEMA_VERSION.to_string(),
            patterns: patterns.clone(),
            metadata: AnalysisMetadata {
                fingerprint: fingerprint.to_string(),
                swap_count: patterns.total_swaps(),
                confidence: patterns.data_quality.confidence,
                blob_id: None,
            },
        }
    }
}

/// Result of one store-if-changed attempt
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SmartStoreOutcome {
    /// True only when the store accepted a new payload
    pub stored: bool,
    /// Freshly stored analysis, the unchanged previous one on skip, or the unsaved fresh one on failure
    pub analysis: StoredAnalysis,
    pub decision: StoreDecision,
    pub error: Option<String>,
}

impl SmartStoreOutcome {
    pub fn skipped(&self) -> bool {
        !self.decision.should_store
    }
}

pub struct SmartStore {
    store: Arc<dyn AnalysisStore>,
    detector: ChangeDetector,
    epochs: u32,
}

impl SmartStore {
    pub fn new(store: Arc<dyn AnalysisStore>, detector: ChangeDetector, epochs: u32) -> Self {
        Self {
            store,
            detector,
            epochs,
        }
    }

    pub fn store(&self) -> &Arc<dyn AnalysisStore> {
        &self.store
    }

    /// Persist `patterns` unless it matches `previous`; store failures are reported, never raised
    pub async fn store_if_changed(
        &self,
        patterns: &TradingPatterns,
        previous: Option<StoredAnalysis>,
    ) -> SmartStoreOutcome {
        let decision = self.detector.decide(patterns, previous.as_ref());

        if !decision.should_store {
            if let Some(previous) = previous {
                info!(
                    "⏭️ Skipping store for {}: {} (delta {} swaps)",
                    patterns.wallet_address, decision.reason, decision.swap_count_delta
                );
                return SmartStoreOutcome {
                    stored: false,
                    analysis: previous,
                    decision,
                    error: None,
                };
            }
        }

        let mut analysis = self.detector.prepare(patterns, &decision.fingerprint);
        debug!(
            "Storing analysis {} ({}), fingerprint {}",
            analysis.id, decision.reason, decision.fingerprint
        );

        match self.store.put(&analysis, self.epochs).await {
            Ok(locator) => {
                info!(
                    "💾 Stored analysis for {} at {} ({})",
                    patterns.wallet_address, locator, decision.reason
                );
                analysis.metadata.blob_id = Some(locator);
                SmartStoreOutcome {
                    stored: true,
                    analysis,
                    decision,
                    error: None,
                }
            }
            Err(e) => {
                warn!("❌ Failed to store analysis for {}: {}", patterns.wallet_address, e);
                SmartStoreOutcome {
                    stored: false,
                    analysis,
                    decision,
                    error: Some(e.to_string()),
                }
            }
        }
    }
}
