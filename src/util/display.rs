/// Display utilities for terminal output

use colored::{ColoredString, Colorize};
use lens_core::{AnalysisCache, ConfidenceTier, TradingPatterns};

use crate::intelligence::PipelineReport;

const RULE_WIDTH: usize = 70;

pub fn print_profile_report(report: &PipelineReport) {
    let patterns = &report.patterns;
    print_profile(patterns);

    let outcome = &report.outcome;
    println!("\n{}", "💾 STORAGE:".bold());
    if outcome.stored {
        println!(
            "   Stored ({}) at {}",
            outcome.decision.reason,
            outcome.analysis.locator().unwrap_or("-").cyan()
        );
    } else if let Some(error) = &outcome.error {
        println!("   {} {}", "Not stored:".red().bold(), error);
    } else {
        println!(
            "   Skipped ({}), previous analysis {} kept",
            outcome.decision.reason,
            outcome.analysis.locator().unwrap_or("-").cyan()
        );
    }
    println!("   Fingerprint: {}", outcome.decision.fingerprint);
    println!("{}", "=".repeat(RULE_WIDTH));
}

pub fn print_profile(patterns: &TradingPatterns) {
    println!(
        "\n{} {} {}",
        "🧠",
        "TRADING PROFILE".bold(),
        shorten_address(&patterns.wallet_address).dimmed()
    );
    println!("{}", "=".repeat(RULE_WIDTH));
    println!("   Personality: {}", patterns.trading_personality.bold());

    let quality = &patterns.data_quality;
    println!(
        "   Swaps: {} over {} (confidence {})",
        quality.total_swaps,
        quality.time_range,
        confidence_badge(quality.confidence)
    );

    if patterns.is_empty() {
        return;
    }

    println!("\n{}", "🪙 TOKENS:".bold());
    for token in &patterns.token_preferences.top_tokens {
        println!("   {:<10} {:>5} ({}%)", token.symbol, token.count, token.percentage);
    }
    let categories = &patterns.token_preferences.category_breakdown;
    println!(
        "   Diversification {:.2} | major {}% protocol {}% other {}%",
        patterns.token_preferences.diversification_score,
        categories.major,
        categories.protocol,
        categories.other
    );

    println!("\n{}", "🏊 POOLS:".bold());
    for pool in &patterns.pool_preferences.top_pools {
        println!("   {:<30} {:>5} ({}%)", pool.pair, pool.count, pool.percentage);
    }

    let sizing = &patterns.trading_sizing;
    println!("\n{}", "📏 SIZING:".bold());
    println!(
        "   Average ~{:.2} (typical {:.2} - {:.2}), {}",
        sizing.average_trade_size,
        sizing.typical_range.min,
        sizing.typical_range.max,
        sizing.consistency
    );

    let rhythm = &patterns.trading_rhythm;
    println!("\n{}", "⏱️  RHYTHM:".bold());
    println!(
        "   {} / every {} ({})",
        rhythm.frequency, rhythm.average_time_between_trades, rhythm.style
    );

    println!("\n{}", "🕒 TIMING (UTC):".bold());
    for bucket in &patterns.timing_patterns.time_distribution {
        println!("   {:<16} {:>5} ({}%)", bucket.period, bucket.count, bucket.percentage);
    }

    println!("\n{}", "💡 KEY INSIGHTS:".bold());
    for insight in &patterns.key_insights {
        println!("   • {}", insight);
    }
}

pub fn print_history(cache: &AnalysisCache) {
    println!(
        "\n{} {} {}",
        "📚",
        "ANALYSIS HISTORY".bold(),
        shorten_address(&cache.wallet_address).dimmed()
    );
    println!("{}", "=".repeat(RULE_WIDTH));

    if cache.is_empty() {
        println!("   No stored analyses for this wallet");
        return;
    }

    for analysis in &cache.analyses {
        println!(
            "   {}  {:>5} swaps  {}",
            analysis.timestamp.format("%Y-%m-%d %H:%M"),
            analysis.metadata.swap_count,
            analysis.patterns.trading_personality
        );
    }

    match &cache.aggregated_insights {
        Some(insights) => {
            println!("\n{}", "📈 EVOLUTION:".bold());
            if insights.trading_evolution.is_empty() {
                println!("   No style or token changes");
            }
            for note in &insights.trading_evolution {
                println!("   • {}", note);
            }
            println!("   Sizing consistency score: {:.2}", insights.consistency_score);

            if !insights.improvement_areas.is_empty() {
                println!("\n{}", "🎯 IMPROVEMENT AREAS:".bold());
                for area in &insights.improvement_areas {
                    println!("   • {}", area);
                }
            }
        }
        None => println!("\n   Need at least two analyses for trends"),
    }
    println!("{}", "=".repeat(RULE_WIDTH));
}

fn confidence_badge(tier: ConfidenceTier) -> ColoredString {
    match tier {
        ConfidenceTier::High => tier.as_str().green(),
        ConfidenceTier::Medium => tier.as_str().yellow(),
        ConfidenceTier::Low => tier.as_str().red(),
    }
}

/// `0x1234...cdef` for long addresses, unchanged otherwise
pub fn shorten_address(address: &str) -> String {
    let chars: Vec<char> = address.chars().collect();
    if chars.len() <= 14 {
        return address.to_string();
    }
    let head: String = chars[..6].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}...{}", head, tail)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shorten_address() {
        assert_eq!(shorten_address("0xabc"), "0xabc");
        assert_eq!(
            shorten_address("0x1234567890abcdef1234567890abcdef"),
            "0x1234...cdef"
        );
    }

    #[test]
    fn test_confidence_badge_text() {
        colored::control::set_override(false);
        assert_eq!(confidence_badge(ConfidenceTier::High).to_string(), "high");
        assert_eq!(confidence_badge(ConfidenceTier::Low).to_string(), "low");
    }
}
