/// Pattern Analysis Engine
///
/// Turns a wallet's swap history into a `TradingPatterns` profile. Each
/// section of the profile is computed independently over the full swap set;
/// the only impure input is the injected clock used for `analysis_date`.

use chrono::{Datelike, Timelike, Weekday};
use lens_core::{
    CategoryBreakdown, ConfidenceTier, ConsistencyTier, DataQuality, PoolPreferences, PoolShare,
    SizeRange, SwapEvent, TimeBucketShare, TimingPatterns, TokenCategory, TokenPreferences,
    TokenShare, TradingPatterns, TradingRhythm, TradingSizing, TradingStyle, TIME_BUCKETS,
};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, instrument};

use super::classifier::{PoolPair, TokenClassifier};
use super::insights;
use crate::algo::statistics::{
    coefficient_of_variation, concentration_index, frequency_distribution, mean, round_to,
    rounded_percentage, time_period,
};
use crate::util::clock::{Clock, SystemClock};

const TOP_TOKENS: usize = 5;
const TOP_POOLS: usize = 3;
/// Half-width of the typical trade-size band around the average
const SIZE_BAND: f64 = 0.30;
const MS_PER_HOUR: f64 = 3_600_000.0;

pub struct PatternAnalyzer {
    classifier: Arc<TokenClassifier>,
    clock: Arc<dyn Clock>,
}

impl PatternAnalyzer {
    pub fn new(classifier: Arc<TokenClassifier>, clock: Arc<dyn Clock>) -> Self {
        Self { classifier, clock }
    }

    /// Build the behavioral profile for `wallet_address`
    ///
    /// Swaps may arrive in any order. Zero swaps yield the empty profile.
    #[instrument(skip(self, swaps), fields(swaps = swaps.len()))]
    pub fn analyze(&self, wallet_address: &str, swaps: &[SwapEvent]) -> TradingPatterns {
        let analysis_date = self.clock.now();

        if swaps.is_empty() {
            info!("📭 No swaps for {}, returning empty profile", wallet_address);
            return TradingPatterns::empty(wallet_address, analysis_date);
        }

        let pairs: Vec<PoolPair> = swaps
            .iter()
            .map(|swap| self.classifier.resolve_pool(&swap.pool_id))
            .collect();

        let data_quality = analyze_data_quality(swaps);
        let token_preferences = self.analyze_token_preferences(&pairs);
        let pool_preferences = analyze_pool_preferences(&pairs);
        let trading_sizing = self.analyze_sizing(swaps, &pairs);
        let trading_rhythm = analyze_rhythm(swaps);
        let timing_patterns = analyze_timing(swaps);

        let trading_personality =
            insights::synthesize_personality(trading_rhythm.style, &token_preferences);
        let key_insights = insights::key_insights(
            &data_quality,
            &token_preferences,
            &pool_preferences,
            &trading_sizing,
            &trading_rhythm,
            &timing_patterns,
        );

        debug!(
            "Profile for {}: {} swaps, style {}, personality '{}'",
            wallet_address, data_quality.total_swaps, trading_rhythm.style, trading_personality
        );

        TradingPatterns {
            wallet_address: wallet_address.to_string(),
            analysis_date,
            data_quality,
            token_preferences,
            pool_preferences,
            trading_sizing,
            trading_rhythm,
            timing_patterns,
            trading_personality,
            key_insights,
        }
    }

    fn analyze_token_preferences(&self, pairs: &[PoolPair]) -> TokenPreferences {
        let occurrences: Vec<&str> = pairs
            .iter()
            .flat_map(|pair| [pair.token_a.as_str(), pair.token_b.as_str()])
            .collect();
        let distribution = frequency_distribution(&occurrences);

        let top_tokens = distribution
            .iter()
            .take(TOP_TOKENS)
            .map(|entry| TokenShare {
                symbol: entry.value.to_string(),
                count: entry.count,
                percentage: rounded_percentage(entry.percentage),
            })
            .collect();

        // Two occurrences per swap caps any single token at half of all
        // occurrences, so the index tops out at 0.5 for a single-pair book.
        let concentration = concentration_index(&distribution);
        let diversification_score = round_to((1.0 - 2.0 * concentration).clamp(0.0, 1.0), 2);

        let distinct: Vec<&str> = distribution.iter().map(|entry| entry.value).collect();
        let category_breakdown = self.category_breakdown(&distinct);

        TokenPreferences {
            top_tokens,
            diversification_score,
            category_breakdown,
        }
    }

    /// Category shares over distinct tokens, not occurrences
    fn category_breakdown(&self, distinct_tokens: &[&str]) -> CategoryBreakdown {
        if distinct_tokens.is_empty() {
            return CategoryBreakdown::default();
        }

        let (mut major, mut protocol, mut other) = (0usize, 0usize, 0usize);
        for symbol in distinct_tokens {
            match self.classifier.categorize(symbol) {
                TokenCategory::Major => major += 1,
                TokenCategory::Protocol => protocol += 1,
                TokenCategory::Other => other += 1,
            }
        }

        let total = distinct_tokens.len() as f64;
        let share = |count: usize| rounded_percentage(count as f64 / total * 100.0);

        CategoryBreakdown {
            major: share(major),
            protocol: share(protocol),
            other: share(other),
        }
    }

    fn analyze_sizing(&self, swaps: &[SwapEvent], pairs: &[PoolPair]) -> TradingSizing {
        let sizes: Vec<f64> = swaps
            .iter()
            .zip(pairs)
            .map(|(swap, pair)| {
                self.classifier
                    .to_common_unit(&swap.amount_in, pair.input_token(swap.a_to_b))
            })
            .collect();

        let average = mean(&sizes);
        let cv = coefficient_of_variation(&sizes);

        TradingSizing {
            average_trade_size: round_to(average, 2),
            typical_range: SizeRange {
                min: round_to(average * (1.0 - SIZE_BAND), 2),
                max: round_to(average * (1.0 + SIZE_BAND), 2),
            },
            consistency: ConsistencyTier::from_coefficient_of_variation(cv),
            coefficient_of_variation: round_to(cv, 3),
        }
    }
}

impl Default for PatternAnalyzer {
    fn default() -> Self {
        Self::new(Arc::new(TokenClassifier::default()), Arc::new(SystemClock))
    }
}

fn analyze_data_quality(swaps: &[SwapEvent]) -> DataQuality {
    let timestamps: Vec<u64> = swaps.iter().map(|s| s.timestamp_ms).collect();
    let time_range = time_period(&timestamps)
        .map(|period| period.describe())
        .unwrap_or_else(|| "0 hours".to_string());

    DataQuality {
        total_swaps: swaps.len(),
        time_range,
        confidence: ConfidenceTier::from_swap_count(swaps.len()),
    }
}

fn analyze_pool_preferences(pairs: &[PoolPair]) -> PoolPreferences {
    let labels: HashMap<&str, String> = pairs
        .iter()
        .map(|pair| (pair.pool_id.as_str(), pair.label()))
        .collect();
    let pool_ids: Vec<&str> = pairs.iter().map(|pair| pair.pool_id.as_str()).collect();
    let distribution = frequency_distribution(&pool_ids);

    let top_pools = distribution
        .iter()
        .take(TOP_POOLS)
        .map(|entry| PoolShare {
            pool_id: entry.value.to_string(),
            pair: labels.get(entry.value).cloned().unwrap_or_default(),
            count: entry.count,
            percentage: rounded_percentage(entry.percentage),
        })
        .collect();

    PoolPreferences {
        top_pools,
        total_pools: distribution.len(),
    }
}

fn analyze_rhythm(swaps: &[SwapEvent]) -> TradingRhythm {
    if swaps.len() < 2 {
        return TradingRhythm::insufficient_data();
    }

    let mut timestamps: Vec<u64> = swaps.iter().map(|s| s.timestamp_ms).collect();
    timestamps.sort_unstable();

    let gaps_hours: Vec<f64> = timestamps
        .windows(2)
        .map(|w| (w[1] - w[0]) as f64 / MS_PER_HOUR)
        .collect();
    let average_hours = mean(&gaps_hours);
    let average_days = average_hours / 24.0;

    TradingRhythm {
        frequency: describe_frequency(average_hours),
        average_time_between_trades: describe_gap(average_hours),
        style: TradingStyle::from_average_gap_days(average_days),
    }
}

fn describe_frequency(average_hours: f64) -> String {
    let average_days = average_hours / 24.0;
    if average_hours <= 0.0 {
        "Multiple trades at the same instant".to_string()
    } else if average_days < 1.0 {
        format!("~{:.1} trades per day", 24.0 / average_hours)
    } else if average_days < 7.0 {
        format!("~{:.1} trades per week", 7.0 / average_days)
    } else {
        format!("~{:.1} trades per month", 30.0 / average_days)
    }
}

fn describe_gap(average_hours: f64) -> String {
    if average_hours < 24.0 {
        format!("{:.1} hours", average_hours)
    } else {
        format!("{:.1} days", average_hours / 24.0)
    }
}

fn analyze_timing(swaps: &[SwapEvent]) -> TimingPatterns {
    let moments: Vec<_> = swaps.iter().map(|s| s.timestamp()).collect();
    let hours: Vec<u32> = moments.iter().map(|t| t.hour()).collect();
    let days: Vec<&'static str> = moments.iter().map(|t| weekday_name(t.weekday())).collect();

    let most_active_hour = frequency_distribution(&hours).first().map(|e| e.value);
    let most_active_day = frequency_distribution(&days)
        .first()
        .map(|e| e.value.to_string());

    let mut bucket_counts = [0usize; 4];
    for hour in &hours {
        bucket_counts[(*hour as usize / 6).min(3)] += 1;
    }

    let total = swaps.len() as f64;
    let time_distribution = TIME_BUCKETS
        .iter()
        .zip(bucket_counts)
        .map(|(period, count)| TimeBucketShare {
            period: period.to_string(),
            count,
            percentage: if total > 0.0 {
                rounded_percentage(count as f64 / total * 100.0)
            } else {
                0
            },
        })
        .collect();

    TimingPatterns {
        most_active_hour,
        most_active_day,
        time_distribution,
    }
}

fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intelligence::classifier::StaticTokenTables;
    use crate::util::clock::FixedClock;
    use chrono::{TimeZone, Utc};
    use lens_core::{NO_ACTIVITY_INSIGHT, NO_ACTIVITY_PERSONALITY};

    const SUI_CETUS: &str = "0xpool_sui_cetus";
    const SUI_USDC: &str = "0xpool_sui_usdc";
    const NAVX_WETH: &str = "0xpool_navx_weth";
    // 2024-01-01 00:00:00 UTC, a Monday
    const BASE_MS: u64 = 1_704_067_200_000;
    const HOUR_MS: u64 = 3_600_000;

    fn analyzer() -> PatternAnalyzer {
        let tables = StaticTokenTables::builtin()
            .with_pool(SUI_CETUS, "SUI", "CETUS")
            .with_pool(SUI_USDC, "SUI", "USDC")
            .with_pool(NAVX_WETH, "NAVX", "WETH");
        let clock = FixedClock(Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap());
        PatternAnalyzer::new(
            Arc::new(TokenClassifier::new(Arc::new(tables))),
            Arc::new(clock),
        )
    }

    fn swap(seq: u64, pool: &str, timestamp_ms: u64, amount_in: &str, a_to_b: bool) -> SwapEvent {
        SwapEvent {
            id: SwapEvent::compose_id("digest", seq),
            timestamp_ms,
            sender: "0xwallet".to_string(),
            pool_id: pool.to_string(),
            amount_in: amount_in.to_string(),
            amount_out: "1".to_string(),
            a_to_b,
            fee_amount: "0".to_string(),
            before_sqrt_price: String::new(),
            after_sqrt_price: String::new(),
            tx_digest: "digest".to_string(),
        }
    }

    fn burst(pool: &str, count: u64) -> Vec<SwapEvent> {
        // one swap every two minutes, all within two hours
        (0..count)
            .map(|i| swap(i, pool, BASE_MS + i * 120_000, "1000000000", true))
            .collect()
    }

    #[test]
    fn test_empty_input_yields_empty_profile() {
        let profile = analyzer().analyze("0xwallet", &[]);

        assert_eq!(profile.data_quality.total_swaps, 0);
        assert_eq!(profile.data_quality.confidence, ConfidenceTier::Low);
        assert_eq!(profile.trading_personality, NO_ACTIVITY_PERSONALITY);
        assert_eq!(profile.key_insights, vec![NO_ACTIVITY_INSIGHT.to_string()]);
        assert_eq!(profile.pool_preferences.total_pools, 0);
    }

    #[test]
    fn test_high_frequency_protocol_pair() {
        let swaps = burst(SUI_CETUS, 60);
        let profile = analyzer().analyze("0xwallet", &swaps);

        assert_eq!(profile.data_quality.total_swaps, 60);
        assert_eq!(profile.data_quality.confidence, ConfidenceTier::High);
        assert_eq!(profile.trading_rhythm.style, TradingStyle::HighFrequency);
        assert_eq!(profile.token_preferences.diversification_score, 0.0);
        assert_eq!(profile.token_preferences.top_token(), Some("SUI"));
        assert_eq!(profile.token_preferences.category_breakdown.major, 50);
        assert_eq!(profile.token_preferences.category_breakdown.protocol, 50);
        assert_eq!(
            profile.trading_personality,
            "High-Frequency DeFi Trader (SUI + Protocol Tokens)"
        );
    }

    #[test]
    fn test_high_frequency_major_pair() {
        let swaps = burst(SUI_USDC, 60);
        let profile = analyzer().analyze("0xwallet", &swaps);

        assert!(profile.trading_personality.contains("High-Frequency"));
        assert_eq!(
            profile.trading_personality,
            "High-Frequency SUI Trader (Major Token Focus)"
        );
        assert_eq!(profile.pool_preferences.top_pools[0].pair, "SUI/USDC");
        assert_eq!(profile.pool_preferences.top_pools[0].percentage, 100);
    }

    #[test]
    fn test_total_swaps_matches_input_length() {
        let analyzer = analyzer();
        for n in [1u64, 2, 19, 20, 37] {
            let swaps = burst(SUI_USDC, n);
            assert_eq!(analyzer.analyze("0xw", &swaps).data_quality.total_swaps, n as usize);
        }
    }

    #[test]
    fn test_diversified_personality_and_top_lists() {
        let mut swaps = Vec::new();
        for i in 0..4 {
            swaps.push(swap(i, NAVX_WETH, BASE_MS + i * 24 * HOUR_MS, "1000000000", true));
        }
        swaps.push(swap(10, "0xmystery_pool_id", BASE_MS + 100 * HOUR_MS, "1000000000", true));

        let profile = analyzer().analyze("0xwallet", &swaps);
        let prefs = &profile.token_preferences;

        // NAVX(4) WETH(4) UNKNOWN(2) as distinct tokens: other 67%, protocol 33%
        assert_eq!(prefs.top_tokens.len(), 3);
        assert_eq!(prefs.top_tokens[0].symbol, "NAVX");
        assert_eq!(prefs.top_tokens[0].percentage, 40);
        assert_eq!(prefs.category_breakdown.protocol, 33);
        assert_eq!(prefs.category_breakdown.other, 67);
        assert_eq!(prefs.category_breakdown.major, 0);

        assert_eq!(profile.pool_preferences.total_pools, 2);
        assert_eq!(profile.pool_preferences.top_pools[1].pair, "UNKNOWN/UNKNOWN (0xmystery_...)");

        assert_eq!(profile.trading_rhythm.style, TradingStyle::Active);
        assert_eq!(profile.trading_personality, "Active DeFi Trader (NAVX + Protocol Tokens)");
    }

    #[test]
    fn test_single_swap_has_degenerate_rhythm_but_sizing() {
        let swaps = vec![swap(0, SUI_USDC, BASE_MS, "2000000000", true)];
        let profile = analyzer().analyze("0xwallet", &swaps);

        assert_eq!(profile.trading_rhythm.frequency, "insufficient data");
        assert_eq!(profile.trading_rhythm.style, TradingStyle::Occasional);
        assert_eq!(profile.trading_sizing.average_trade_size, 7.0);
        assert_eq!(profile.trading_sizing.typical_range.min, 4.9);
        assert_eq!(profile.trading_sizing.typical_range.max, 9.1);
        assert_eq!(profile.trading_sizing.consistency, ConsistencyTier::VeryConsistent);
        assert_eq!(profile.data_quality.time_range, "0.0 hours");
        assert!(profile
            .key_insights
            .contains(&"Trading rhythm: insufficient data".to_string()));
    }

    #[test]
    fn test_sizing_uses_direction_flag() {
        // b-to-a sells USDC (6 decimals, rate 1.0)
        let swaps = vec![
            swap(0, SUI_USDC, BASE_MS, "5000000", false),
            swap(1, SUI_USDC, BASE_MS + HOUR_MS, "5000000", false),
        ];
        let profile = analyzer().analyze("0xwallet", &swaps);
        assert_eq!(profile.trading_sizing.average_trade_size, 5.0);
        assert_eq!(profile.trading_sizing.coefficient_of_variation, 0.0);
    }

    #[test]
    fn test_highly_varied_sizing() {
        let swaps = vec![
            swap(0, SUI_USDC, BASE_MS, "1000000", false),
            swap(1, SUI_USDC, BASE_MS + HOUR_MS, "1000000", false),
            swap(2, SUI_USDC, BASE_MS + 2 * HOUR_MS, "1000000", false),
            swap(3, SUI_USDC, BASE_MS + 3 * HOUR_MS, "100000000", false),
        ];
        let profile = analyzer().analyze("0xwallet", &swaps);
        assert_eq!(profile.trading_sizing.consistency, ConsistencyTier::HighlyVaried);
    }

    #[test]
    fn test_rhythm_boundaries() {
        let at = |gap_ms: u64| {
            let swaps = vec![
                swap(0, SUI_USDC, BASE_MS, "1", true),
                swap(1, SUI_USDC, BASE_MS + gap_ms, "1", true),
            ];
            analyzer().analyze("0xw", &swaps).trading_rhythm
        };

        assert_eq!(at(11 * HOUR_MS + 54 * 60_000).style, TradingStyle::HighFrequency);
        let twelve = at(12 * HOUR_MS);
        assert_eq!(twelve.style, TradingStyle::Active);
        assert_eq!(twelve.average_time_between_trades, "12.0 hours");
        assert_eq!(twelve.frequency, "~2.0 trades per day");

        let weekly = at(72 * HOUR_MS);
        assert_eq!(weekly.style, TradingStyle::Moderate);
        assert_eq!(weekly.average_time_between_trades, "3.0 days");

        assert_eq!(at(8 * 24 * HOUR_MS).style, TradingStyle::Occasional);
    }

    #[test]
    fn test_rhythm_ignores_arrival_order() {
        let ordered = vec![
            swap(0, SUI_USDC, BASE_MS, "1", true),
            swap(1, SUI_USDC, BASE_MS + HOUR_MS, "1", true),
            swap(2, SUI_USDC, BASE_MS + 3 * HOUR_MS, "1", true),
        ];
        let mut shuffled = ordered.clone();
        shuffled.reverse();

        let a = analyzer().analyze("0xw", &ordered);
        let b = analyzer().analyze("0xw", &shuffled);
        assert_eq!(a.trading_rhythm, b.trading_rhythm);
        assert_eq!(a.trading_rhythm.average_time_between_trades, "1.5 hours");
    }

    #[test]
    fn test_timing_patterns() {
        let swaps = vec![
            swap(0, SUI_USDC, BASE_MS + 14 * HOUR_MS, "1", true),
            swap(1, SUI_USDC, BASE_MS + 3 * HOUR_MS, "1", true),
            swap(2, SUI_USDC, BASE_MS + 24 * HOUR_MS + 3 * HOUR_MS, "1", true),
            swap(3, SUI_USDC, BASE_MS + 24 * HOUR_MS + 20 * HOUR_MS, "1", true),
        ];
        let timing = analyzer().analyze("0xw", &swaps).timing_patterns;

        assert_eq!(timing.most_active_hour, Some(3));
        // Monday and Tuesday tie; Monday was sighted first
        assert_eq!(timing.most_active_day.as_deref(), Some("Monday"));

        let counts: Vec<usize> = timing.time_distribution.iter().map(|b| b.count).collect();
        assert_eq!(counts, vec![2, 0, 1, 1]);
        assert_eq!(timing.time_distribution[0].percentage, 50);
        assert_eq!(timing.time_distribution[3].period, "18:00-24:00 UTC");
    }

    #[test]
    fn test_key_insights_order_and_low_confidence_warning() {
        let swaps = burst(SUI_USDC, 5);
        let profile = analyzer().analyze("0xwallet", &swaps);
        let insights = &profile.key_insights;

        assert_eq!(insights.len(), 6);
        assert!(insights[0].starts_with("Most traded token: SUI"));
        assert!(insights[1].starts_with("Favorite pool: SUI/USDC"));
        assert!(insights[2].starts_with("Average trade size"));
        assert!(insights[3].starts_with("Trading rhythm"));
        assert!(insights[4].starts_with("Most active during 00:00-06:00 UTC"));
        assert!(insights[5].contains("5 swaps"));

        let confident = analyzer().analyze("0xwallet", &burst(SUI_USDC, 25));
        assert_eq!(confident.key_insights.len(), 5);
    }

    #[test]
    fn test_analysis_is_deterministic_with_fixed_clock() {
        let swaps = burst(SUI_CETUS, 12);
        let analyzer = analyzer();
        assert_eq!(analyzer.analyze("0xw", &swaps), analyzer.analyze("0xw", &swaps));
    }
}
