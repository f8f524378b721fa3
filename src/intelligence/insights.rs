/// Personality synthesis and narrative insights for a trading profile

use lens_core::{
    ConfidenceTier, DataQuality, PoolPreferences, TimeBucketShare, TimingPatterns,
    TokenPreferences, TradingRhythm, TradingSizing, TradingStyle, NO_ACTIVITY_PERSONALITY,
};

/// Major-token share (of distinct tokens) that marks a major-focused trader
const MAJOR_FOCUS_SHARE: u32 = 80;
/// Protocol-token share that marks a DeFi trader
const PROTOCOL_FOCUS_SHARE: u32 = 30;

/// Combine rhythm, dominant token and category concentration into one label
pub fn synthesize_personality(style: TradingStyle, preferences: &TokenPreferences) -> String {
    let top = match preferences.top_token() {
        Some(symbol) => symbol,
        None => return NO_ACTIVITY_PERSONALITY.to_string(),
    };
    let base = style.label();
    let categories = &preferences.category_breakdown;

    if categories.major >= MAJOR_FOCUS_SHARE {
        format!("{} {} Trader (Major Token Focus)", base, top)
    } else if categories.protocol >= PROTOCOL_FOCUS_SHARE {
        format!("{} DeFi Trader ({} + Protocol Tokens)", base, top)
    } else {
        format!("{} Diversified Trader ({} Primary)", base, top)
    }
}

/// Ordered findings: token, pool, sizing, rhythm, timing, then any data warning
pub fn key_insights(
    quality: &DataQuality,
    tokens: &TokenPreferences,
    pools: &PoolPreferences,
    sizing: &TradingSizing,
    rhythm: &TradingRhythm,
    timing: &TimingPatterns,
) -> Vec<String> {
    let mut insights = Vec::new();

    if let Some(top) = tokens.top_tokens.first() {
        insights.push(format!(
            "Most traded token: {} ({}% of token activity)",
            top.symbol, top.percentage
        ));
    }

    if let Some(pool) = pools.top_pools.first() {
        insights.push(format!(
            "Favorite pool: {} ({}% of trades across {} pool{})",
            pool.pair,
            pool.percentage,
            pools.total_pools,
            if pools.total_pools == 1 { "" } else { "s" }
        ));
    }

    insights.push(format!(
        "Average trade size ~{:.2} (approx. common units), {} sizing",
        sizing.average_trade_size,
        sizing.consistency.as_str().replace('_', " ")
    ));

    if *rhythm == TradingRhythm::insufficient_data() {
        insights.push(format!("Trading rhythm: {}", rhythm.frequency));
    } else {
        insights.push(format!(
            "Trading rhythm: {} (every {} on average)",
            rhythm.frequency, rhythm.average_time_between_trades
        ));
    }

    // first bucket wins ties
    let dominant = timing
        .time_distribution
        .iter()
        .fold(None, |best: Option<&TimeBucketShare>, bucket| match best {
            Some(current) if current.count >= bucket.count => Some(current),
            _ => Some(bucket),
        });
    if let Some(bucket) = dominant.filter(|b| b.count > 0) {
        insights.push(format!(
            "Most active during {} ({}% of trades)",
            bucket.period, bucket.percentage
        ));
    }

    if quality.confidence == ConfidenceTier::Low {
        insights.push(format!(
            "Low confidence: only {} swaps analyzed, patterns may change with more activity",
            quality.total_swaps
        ));
    }

    insights
}
