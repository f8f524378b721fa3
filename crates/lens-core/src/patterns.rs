/// Behavioral profile produced by the pattern analyzer

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Personality label for a wallet with no swaps
pub const NO_ACTIVITY_PERSONALITY: &str = "No Trading Activity Detected";

/// Sole insight reported for a wallet with no swaps
pub const NO_ACTIVITY_INSIGHT: &str = "No swap activity found for this wallet";

/// Fixed 6-hour UTC windows used for the timing distribution
pub const TIME_BUCKETS: [&str; 4] = [
    "00:00-06:00 UTC",
    "06:00-12:00 UTC",
    "12:00-18:00 UTC",
    "18:00-24:00 UTC",
];

/// How much data underlies a profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceTier {
    Low,
    Medium,
    High,
}

impl ConfidenceTier {
    pub fn from_swap_count(count: usize) -> Self {
        if count >= 50 {
            ConfidenceTier::High
        } else if count >= 20 {
            ConfidenceTier::Medium
        } else {
            ConfidenceTier::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ConfidenceTier::Low => "low",
            ConfidenceTier::Medium => "medium",
            ConfidenceTier::High => "high",
        }
    }
}

/// Uniformity of trade sizes, derived from the coefficient of variation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsistencyTier {
    VeryConsistent,
    Consistent,
    Varied,
    HighlyVaried,
}

impl ConsistencyTier {
    pub fn from_coefficient_of_variation(cv: f64) -> Self {
        if cv < 0.3 {
            ConsistencyTier::VeryConsistent
        } else if cv < 0.6 {
            ConsistencyTier::Consistent
        } else if cv < 1.0 {
            ConsistencyTier::Varied
        } else {
            ConsistencyTier::HighlyVaried
        }
    }

    /// Numeric weight used when scoring consistency across analyses
    pub fn score(&self) -> f64 {
        match self {
            ConsistencyTier::VeryConsistent => 1.0,
            ConsistencyTier::Consistent => 0.75,
            ConsistencyTier::Varied => 0.5,
            ConsistencyTier::HighlyVaried => 0.25,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ConsistencyTier::VeryConsistent => "very_consistent",
            ConsistencyTier::Consistent => "consistent",
            ConsistencyTier::Varied => "varied",
            ConsistencyTier::HighlyVaried => "highly_varied",
        }
    }
}

/// Trading cadence classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TradingStyle {
    HighFrequency,
    Active,
    Moderate,
    Occasional,
}

impl TradingStyle {
    /// Classify from the mean gap between consecutive trades, in days
    pub fn from_average_gap_days(days: f64) -> Self {
        if days < 0.5 {
            TradingStyle::HighFrequency
        } else if days < 2.0 {
            TradingStyle::Active
        } else if days < 7.0 {
            TradingStyle::Moderate
        } else {
            TradingStyle::Occasional
        }
    }

    /// Prefix used in the personality label
    pub fn label(&self) -> &'static str {
        match self {
            TradingStyle::HighFrequency => "High-Frequency",
            TradingStyle::Active => "Active",
            TradingStyle::Moderate => "Moderate",
            TradingStyle::Occasional => "Occasional",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TradingStyle::HighFrequency => "high_frequency",
            TradingStyle::Active => "active",
            TradingStyle::Moderate => "moderate",
            TradingStyle::Occasional => "occasional",
        }
    }
}

impl fmt::Display for TradingStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for ConsistencyTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for ConfidenceTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Token class used for category shares
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenCategory {
    /// Stablecoins and the native gas token
    Major,
    /// Recognized DeFi governance/utility tokens
    Protocol,
    Other,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataQuality {
    pub total_swaps: usize,
    pub time_range: String,
    pub confidence: ConfidenceTier,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenShare {
    pub symbol: String,
    pub count: usize,
    pub percentage: u32,
}

/// Rounded percentages of distinct tokens per category
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryBreakdown {
    pub major: u32,
    pub protocol: u32,
    pub other: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPreferences {
    pub top_tokens: Vec<TokenShare>,
    pub diversification_score: f64,
    pub category_breakdown: CategoryBreakdown,
}

impl TokenPreferences {
    pub fn top_token(&self) -> Option<&str> {
        self.top_tokens.first().map(|t| t.symbol.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolShare {
    pub pool_id: String,
    pub pair: String,
    pub count: usize,
    pub percentage: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolPreferences {
    pub top_pools: Vec<PoolShare>,
    pub total_pools: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SizeRange {
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradingSizing {
    pub average_trade_size: f64,
    pub typical_range: SizeRange,
    pub consistency: ConsistencyTier,
    pub coefficient_of_variation: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradingRhythm {
    pub frequency: String,
    pub average_time_between_trades: String,
    pub style: TradingStyle,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeBucketShare {
    pub period: String,
    pub count: usize,
    pub percentage: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimingPatterns {
    pub most_active_hour: Option<u32>,
    pub most_active_day: Option<String>,
    pub time_distribution: Vec<TimeBucketShare>,
}

/// Complete behavioral profile for one wallet at one point in time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradingPatterns {
    pub wallet_address: String,
    pub analysis_date: DateTime<Utc>,
    pub data_quality: DataQuality,
    pub token_preferences: TokenPreferences,
    pub pool_preferences: PoolPreferences,
    pub trading_sizing: TradingSizing,
    pub trading_rhythm: TradingRhythm,
    pub timing_patterns: TimingPatterns,
    pub trading_personality: String,
    pub key_insights: Vec<String>,
}

impl TradingPatterns {
    /// Well-defined profile for a wallet with no swaps
    pub fn empty(wallet_address: &str, analysis_date: DateTime<Utc>) -> Self {
        Self {
            wallet_address: wallet_address.to_string(),
            analysis_date,
            data_quality: DataQuality {
                total_swaps: 0,
                time_range: "0 hours".to_string(),
                confidence: ConfidenceTier::Low,
            },
            token_preferences: TokenPreferences {
                top_tokens: Vec::new(),
                diversification_score: 0.0,
                category_breakdown: CategoryBreakdown::default(),
            },
            pool_preferences: PoolPreferences {
                top_pools: Vec::new(),
                total_pools: 0,
            },
            trading_sizing: TradingSizing {
                average_trade_size: 0.0,
                typical_range: SizeRange { min: 0.0, max: 0.0 },
                consistency: ConsistencyTier::VeryConsistent,
                coefficient_of_variation: 0.0,
            },
            trading_rhythm: TradingRhythm::insufficient_data(),
            timing_patterns: TimingPatterns {
                most_active_hour: None,
                most_active_day: None,
                time_distribution: TIME_BUCKETS
                    .iter()
                    .map(|period| TimeBucketShare {
                        period: period.to_string(),
                        count: 0,
                        percentage: 0,
                    })
                    .collect(),
            },
            trading_personality: NO_ACTIVITY_PERSONALITY.to_string(),
            key_insights: vec![NO_ACTIVITY_INSIGHT.to_string()],
        }
    }

    pub fn total_swaps(&self) -> usize {
        self.data_quality.total_swaps
    }

    pub fn top_token(&self) -> Option<&str> {
        self.token_preferences.top_token()
    }

    pub fn is_empty(&self) -> bool {
        self.data_quality.total_swaps == 0
    }
}

impl TradingRhythm {
    /// Degenerate rhythm for fewer than two swaps
    pub fn insufficient_data() -> Self {
        Self {
            frequency: "insufficient data".to_string(),
            average_time_between_trades: "N/A".to_string(),
            style: TradingStyle::Occasional,
        }
    }
}
