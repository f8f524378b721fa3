use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::patterns::{ConfidenceTier, TradingPatterns};

/// Schema tag written into every stored analysis
pub const ANALYSIS_SCHEMA_VERSION: &str = "1.0";

/// One executed swap as emitted by the DEX, amounts in the token's smallest unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapEvent {
    /// `<tx digest>:<event sequence>`
    pub id: String,
    /// Milliseconds since the Unix epoch
    pub timestamp_ms: u64,
    pub sender: String,
    pub pool_id: String,
    pub amount_in: String,
    pub amount_out: String,
    /// True when the pool's first token was sold
    pub a_to_b: bool,
    #[serde(default)]
    pub fee_amount: String,
    #[serde(default)]
    pub before_sqrt_price: String,
    #[serde(default)]
    pub after_sqrt_price: String,
    pub tx_digest: String,
}

impl SwapEvent {
    /// Build the composite event id from its parts
    pub fn compose_id(tx_digest: &str, event_seq: u64) -> String {
        format!("{}:{}", tx_digest, event_seq)
    }

    /// Event time as a UTC datetime; unrepresentable values fall back to the epoch
    pub fn timestamp(&self) -> DateTime<Utc> {
        i64::try_from(self.timestamp_ms)
            .ok()
            .and_then(|ms| Utc.timestamp_millis_opt(ms).single())
            .unwrap_or_default()
    }
}

/// Persistence bookkeeping attached to a stored profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisMetadata {
    pub fingerprint: String,
    pub swap_count: usize,
    pub confidence: ConfidenceTier,
    /// Opaque locator handed back by the store; never set by the pipeline itself
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blob_id: Option<String>,
}

/// A profile wrapped for persistence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredAnalysis {
    pub id: String,
    pub wallet_address: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
    pub patterns: TradingPatterns,
    pub metadata: AnalysisMetadata,
}

impl StoredAnalysis {
    /// Stable id derived from the wallet and the creation instant
    pub fn make_id(wallet_address: &str, created_at: DateTime<Utc>) -> String {
        format!("analysis_{}_{}", wallet_address, created_at.timestamp_millis())
    }

    pub fn locator(&self) -> Option<&str> {
        self.metadata.blob_id.as_deref()
    }

    /// Copy of this analysis as the store receives it (no locator)
    pub fn without_locator(&self) -> StoredAnalysis {
        let mut payload = self.clone();
        payload.metadata.blob_id = None;
        payload
    }
}

/// Cross-time findings over a wallet's stored profiles
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregatedInsights {
    pub trading_evolution: Vec<String>,
    pub consistency_score: f64,
    pub improvement_areas: Vec<String>,
    pub analysis_count: usize,
    pub first_analysis: DateTime<Utc>,
    pub latest_analysis: DateTime<Utc>,
}

/// Ordered analysis history for one wallet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisCache {
    pub wallet_address: String,
    pub analyses: Vec<StoredAnalysis>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aggregated_insights: Option<AggregatedInsights>,
}

impl AnalysisCache {
    pub fn latest(&self) -> Option<&StoredAnalysis> {
        self.analyses.last()
    }

    pub fn len(&self) -> usize {
        self.analyses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.analyses.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_swap_event_json_shape() {
        let raw = r#"{
            "id": "9xQe:0",
            "timestampMs": 1700000000000,
            "sender": "0xabc",
            "poolId": "0xpool",
            "amountIn": "1000000000",
            "amountOut": "2500000",
            "aToB": true,
            "txDigest": "9xQe"
        }"#;

        let swap: SwapEvent = serde_json::from_str(raw).unwrap();
        assert_eq!(swap.pool_id, "0xpool");
        assert!(swap.a_to_b);
        assert_eq!(swap.fee_amount, "");
        assert_eq!(swap.timestamp().timestamp(), 1_700_000_000);
        assert_eq!(SwapEvent::compose_id("9xQe", 0), swap.id);
    }

    #[test]
    fn test_out_of_range_timestamp_falls_back_to_epoch() {
        let mut swap: SwapEvent = serde_json::from_str(
            r#"{"id":"t:0","timestampMs":0,"sender":"0x1","poolId":"0xp",
                "amountIn":"1","amountOut":"1","aToB":false,"txDigest":"t"}"#,
        )
        .unwrap();

        for ms in [u64::MAX, i64::MAX as u64 + 1, i64::MAX as u64] {
            swap.timestamp_ms = ms;
            assert_eq!(swap.timestamp(), DateTime::<Utc>::default());
        }
    }
}
