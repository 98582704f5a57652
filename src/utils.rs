//! Small pure helpers shared across pipeline stages: date/month-bucket
//! arithmetic, rounding, and basic statistics. Grouped the way the
//! teacher's `utils.rs` groups date arithmetic -- short free functions,
//! each with its own focused test.

use crate::schema::YearMonth;

/// Every year-month from `start` to `end`, inclusive, in ascending order.
pub fn dense_month_range(start: YearMonth, end: YearMonth) -> Vec<YearMonth> {
    let mut months = Vec::new();
    let mut current = start;
    while current <= end {
        months.push(current);
        current = current.succ();
    }
    months
}

/// Half-up rounding from cents-valued floats to `i64` cents. Division
/// itself always happens in `f64`; only the final narration step rounds.
pub fn round_cents(value: f64) -> i64 {
    value.round() as i64
}

/// Round a percentage/ratio to `decimals` decimal places.
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation (divides by N, not N-1) -- the spec
/// speaks of "population stddev" explicitly in the anomaly-flagging
/// rule.
pub fn population_stddev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values);
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

/// Title-cases a lowercased grouping key: each whitespace-separated word
/// gets its first character capitalized.
pub fn title_case(key: &str) -> String {
    key.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Truncates a string to at most `n` characters without panicking on
/// multi-byte boundaries.
pub fn truncate_chars(s: &str, n: usize) -> String {
    s.chars().take(n).collect()
}
