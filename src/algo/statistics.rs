/// Statistical primitives for swap-pattern analysis
///
/// Every aggregate returns 0 on empty input instead of failing; callers
/// downstream rely on that and do not guard against empty sequences.

use std::collections::HashMap;
use std::hash::Hash;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum StatsError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

/// One row of a frequency distribution
#[derive(Debug, Clone, PartialEq)]
pub struct FrequencyEntry<T> {
    pub value: T,
    pub count: usize,
    /// Share of all items, 0-100 (unrounded)
    pub percentage: f64,
}

/// First/last instant and span of a set of millisecond timestamps
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimePeriod {
    pub start_ms: u64,
    pub end_ms: u64,
}

impl TimePeriod {
    pub fn span_ms(&self) -> u64 {
        self.end_ms - self.start_ms
    }

    pub fn span_hours(&self) -> f64 {
        self.span_ms() as f64 / 3_600_000.0
    }

    pub fn span_days(&self) -> f64 {
        self.span_hours() / 24.0
    }

    /// "N.N days" for spans of a day or more, otherwise "N.N hours"
    pub fn describe(&self) -> String {
        let hours = self.span_hours();
        if hours >= 24.0 {
            format!("{:.1} days", hours / 24.0)
        } else {
            format!("{:.1} hours", hours)
        }
    }
}

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

pub fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let sorted = sorted_copy(values);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

/// Population standard deviation
pub fn standard_deviation(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let avg = mean(values);
    let variance = values.iter().map(|v| (v - avg).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

pub fn min(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().copied().fold(f64::INFINITY, f64::min)
}

pub fn max(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().copied().fold(f64::NEG_INFINITY, f64::max)
}

/// std / mean, or 0 when the mean is 0
pub fn coefficient_of_variation(values: &[f64]) -> f64 {
    let avg = mean(values);
    if avg == 0.0 {
        return 0.0;
    }
    standard_deviation(values) / avg
}

/// Linear-interpolated percentile; `rank` must lie in [0, 100]
pub fn percentile(values: &[f64], rank: f64) -> Result<f64, StatsError> {
    if !(0.0..=100.0).contains(&rank) {
        return Err(StatsError::InvalidArgument(format!(
            "percentile rank must be within [0, 100], got {}",
            rank
        )));
    }
    if values.is_empty() {
        return Ok(0.0);
    }

    let sorted = sorted_copy(values);
    let position = rank / 100.0 * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let weight = position - lower as f64;

    Ok(sorted[lower] + (sorted[upper] - sorted[lower]) * weight)
}

/// Counts per distinct value, most frequent first; ties keep first-sighting order
pub fn frequency_distribution<T>(items: &[T]) -> Vec<FrequencyEntry<T>>
where
    T: Eq + Hash + Clone,
{
    if items.is_empty() {
        return Vec::new();
    }

    let mut positions: HashMap<&T, usize> = HashMap::new();
    let mut entries: Vec<FrequencyEntry<T>> = Vec::new();

    for item in items {
        match positions.get(item) {
            Some(&idx) => entries[idx].count += 1,
            None => {
                positions.insert(item, entries.len());
                entries.push(FrequencyEntry {
                    value: item.clone(),
                    count: 1,
                    percentage: 0.0,
                });
            }
        }
    }

    let total = items.len() as f64;
    for entry in entries.iter_mut() {
        entry.percentage = entry.count as f64 / total * 100.0;
    }

    // sort_by is stable, so equal counts stay in first-sighting order
    entries.sort_by(|a, b| b.count.cmp(&a.count));
    entries
}

/// Herfindahl-style index: sum of squared shares (as fractions)
pub fn concentration_index<T>(distribution: &[FrequencyEntry<T>]) -> f64 {
    distribution
        .iter()
        .map(|entry| (entry.percentage / 100.0).powi(2))
        .sum()
}

pub fn time_period(timestamps_ms: &[u64]) -> Option<TimePeriod> {
    let start_ms = *timestamps_ms.iter().min()?;
    let end_ms = *timestamps_ms.iter().max()?;
    Some(TimePeriod { start_ms, end_ms })
}

pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}

/// Percentage rounded to the nearest whole number
pub fn rounded_percentage(percentage: f64) -> u32 {
    percentage.round().max(0.0) as u32
}

fn sorted_copy(values: &[f64]) -> Vec<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    sorted
}
