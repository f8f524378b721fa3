/// Historical aggregator: style evolution, sizing consistency trend and
/// improvement areas across a wallet's stored analyses

use lens_core::{
    AggregatedInsights, AnalysisCache, ConfidenceTier, ConsistencyTier, StoredAnalysis,
};

use crate::algo::statistics::{mean, round_to};

/// Minimum number of analyses before any cross-time insight is derived
pub const MIN_ANALYSES_FOR_INSIGHTS: usize = 2;
/// Major-token share below which liquid tokens are suggested
const LIQUID_FOCUS_SHARE: u32 = 50;

pub const MORE_VOLUME_SUGGESTION: &str =
    "Increase trading volume to build a more reliable behavioral profile";
pub const SIZING_SUGGESTION: &str =
    "Work toward more consistent position sizing; trade sizes vary widely";
pub const LIQUID_TOKENS_SUGGESTION: &str =
    "Consider focusing on liquid major tokens (SUI and stablecoins)";

#[derive(Debug, Clone, Copy, Default)]
pub struct HistoricalAggregator;

impl HistoricalAggregator {
    pub fn new() -> Self {
        Self
    }

    /// Order the analyses chronologically and summarize them
    pub fn build(&self, wallet_address: &str, mut analyses: Vec<StoredAnalysis>) -> AnalysisCache {
        analyses.sort_by_key(|a| a.timestamp);
        let aggregated_insights = self.aggregate(&analyses);
        AnalysisCache {
            wallet_address: wallet_address.to_string(),
            analyses,
            aggregated_insights,
        }
    }

    /// Extend a history with one more analysis; existing entries are left untouched
    pub fn append(&self, cache: AnalysisCache, analysis: StoredAnalysis) -> AnalysisCache {
        let AnalysisCache {
            wallet_address,
            mut analyses,
            ..
        } = cache;
        analyses.push(analysis);
        self.build(&wallet_address, analyses)
    }

    /// Insights over chronologically sorted analyses, `None` below two entries
    pub fn aggregate(&self, analyses: &[StoredAnalysis]) -> Option<AggregatedInsights> {
        if analyses.len() < MIN_ANALYSES_FOR_INSIGHTS {
            return None;
        }
        let first = analyses.first()?;
        let latest = analyses.last()?;

        Some(AggregatedInsights {
            trading_evolution: trading_evolution(analyses),
            consistency_score: consistency_score(analyses),
            improvement_areas: improvement_areas(latest),
            analysis_count: analyses.len(),
            first_analysis: first.timestamp,
            latest_analysis: latest.timestamp,
        })
    }
}

fn trading_evolution(analyses: &[StoredAnalysis]) -> Vec<String> {
    let mut notes = Vec::new();

    for pair in analyses.windows(2) {
        let (before, after) = (&pair[0].patterns, &pair[1].patterns);
        let when = pair[1].timestamp.format("%Y-%m-%d");

        let (old_style, new_style) = (before.trading_rhythm.style, after.trading_rhythm.style);
        if old_style != new_style {
            notes.push(format!(
                "{}: trading style shifted from {} to {}",
                when,
                old_style.label(),
                new_style.label()
            ));
        }

        let (old_top, new_top) = (before.top_token(), after.top_token());
        if old_top != new_top {
            notes.push(format!(
                "{}: primary token changed from {} to {}",
                when,
                old_top.unwrap_or("none"),
                new_top.unwrap_or("none")
            ));
        }
    }

    notes
}

/// Mean sizing-consistency score over every analysis after the first
fn consistency_score(analyses: &[StoredAnalysis]) -> f64 {
    let scores: Vec<f64> = analyses
        .iter()
        .skip(1)
        .map(|a| a.patterns.trading_sizing.consistency.score())
        .collect();
    round_to(mean(&scores), 2)
}

fn improvement_areas(latest: &StoredAnalysis) -> Vec<String> {
    let patterns = &latest.patterns;
    let mut areas = Vec::new();

    if patterns.data_quality.confidence == ConfidenceTier::Low {
        areas.push(MORE_VOLUME_SUGGESTION.to_string());
    }
    if patterns.trading_sizing.consistency == ConsistencyTier::HighlyVaried {
        areas.push(SIZING_SUGGESTION.to_string());
    }
    if patterns.token_preferences.category_breakdown.major < LIQUID_FOCUS_SHARE {
        areas.push(LIQUID_TOKENS_SUGGESTION.to_string());
    }

    areas
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::ChangeDetector;
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use lens_core::{TokenShare, TradingPatterns, TradingStyle};

    fn day(n: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 4, 1, 12, 0, 0).unwrap() + Duration::days(n)
    }

    fn analysis(
        at: DateTime<Utc>,
        style: TradingStyle,
        top: &str,
        consistency: ConsistencyTier,
        swaps: usize,
        major: u32,
    ) -> StoredAnalysis {
        let mut patterns = TradingPatterns::empty("0xhist", at);
        patterns.data_quality.total_swaps = swaps;
        patterns.data_quality.confidence = ConfidenceTier::from_swap_count(swaps);
        patterns.trading_rhythm.style = style;
        patterns.trading_sizing.consistency = consistency;
        patterns.token_preferences.top_tokens = vec![TokenShare {
            symbol: top.to_string(),
            count: swaps,
            percentage: 50,
        }];
        patterns.token_preferences.category_breakdown.major = major;

        let detector = ChangeDetector::default();
        detector.prepare(&patterns, &detector.fingerprint(&patterns))
    }

    #[test]
    fn test_single_analysis_has_no_insights() {
        let aggregator = HistoricalAggregator::new();
        let cache = aggregator.build(
            "0xhist",
            vec![analysis(day(0), TradingStyle::Active, "SUI", ConsistencyTier::Varied, 30, 100)],
        );
        assert_eq!(cache.len(), 1);
        assert!(cache.aggregated_insights.is_none());

        let empty = aggregator.build("0xhist", Vec::new());
        assert!(empty.is_empty());
        assert!(empty.aggregated_insights.is_none());
    }

    #[test]
    fn test_evolution_notes_follow_chronology() {
        let aggregator = HistoricalAggregator::new();
        // supplied out of order on purpose
        let cache = aggregator.build(
            "0xhist",
            vec![
                analysis(day(2), TradingStyle::HighFrequency, "CETUS", ConsistencyTier::Consistent, 80, 40),
                analysis(day(0), TradingStyle::Moderate, "SUI", ConsistencyTier::VeryConsistent, 25, 100),
                analysis(day(1), TradingStyle::Active, "SUI", ConsistencyTier::Varied, 50, 100),
            ],
        );

        assert_eq!(cache.latest().unwrap().timestamp, day(2));
        let insights = cache.aggregated_insights.unwrap();
        assert_eq!(insights.analysis_count, 3);
        assert_eq!(insights.first_analysis, day(0));
        assert_eq!(insights.latest_analysis, day(2));
        assert_eq!(
            insights.trading_evolution,
            vec![
                "2024-04-02: trading style shifted from Moderate to Active".to_string(),
                "2024-04-03: trading style shifted from Active to High-Frequency".to_string(),
                "2024-04-03: primary token changed from SUI to CETUS".to_string(),
            ]
        );
        // varied 0.5 and consistent 0.75, the first profile is excluded
        assert_eq!(insights.consistency_score, 0.63);
        assert_eq!(insights.improvement_areas, vec![LIQUID_TOKENS_SUGGESTION.to_string()]);
    }

    #[test]
    fn test_improvement_areas_from_latest_only() {
        let aggregator = HistoricalAggregator::new();
        let cache = aggregator.build(
            "0xhist",
            vec![
                analysis(day(0), TradingStyle::Active, "SUI", ConsistencyTier::VeryConsistent, 60, 100),
                analysis(day(1), TradingStyle::Active, "SUI", ConsistencyTier::HighlyVaried, 5, 20),
            ],
        );

        let insights = cache.aggregated_insights.unwrap();
        assert!(insights.trading_evolution.is_empty());
        assert_eq!(insights.consistency_score, 0.25);
        assert_eq!(
            insights.improvement_areas,
            vec![
                MORE_VOLUME_SUGGESTION.to_string(),
                SIZING_SUGGESTION.to_string(),
                LIQUID_TOKENS_SUGGESTION.to_string(),
            ]
        );
    }

    #[test]
    fn test_append_recomputes_without_touching_entries() {
        let aggregator = HistoricalAggregator::new();
        let first = analysis(day(0), TradingStyle::Active, "SUI", ConsistencyTier::Consistent, 60, 100);
        let cache = aggregator.build("0xhist", vec![first.clone()]);
        assert!(cache.aggregated_insights.is_none());

        let second = analysis(day(1), TradingStyle::Active, "SUI", ConsistencyTier::Consistent, 70, 100);
        let cache = aggregator.append(cache, second);
        assert_eq!(cache.analyses[0], first);
        let insights = cache.aggregated_insights.unwrap();
        assert_eq!(insights.consistency_score, 0.75);
        assert!(insights.improvement_areas.is_empty());
    }
}
