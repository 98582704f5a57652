//! Projects annualized income from the dense monthly series using four
//! independent methods, then blends them based on how the data behaves.

use crate::schema::{AnnualizedProjection, ConfidenceLevel, MonthlyIncome, ProjectionMethod, StabilityMetrics};
use crate::utils::{mean, round_cents};

/// Conservative damping applied to the trend-extrapolation method: only
/// half of the observed year-over-year growth is carried forward.
const TREND_DAMPING_FACTOR: f64 = 0.5;

struct BlendWeights {
    w: [f64; 4],
    primary: ProjectionMethod,
}

/// `monthly` must be sorted descending by `year_month`, most recent
/// first, matching [`crate::aggregator::aggregate_monthly`]'s output.
pub fn project(monthly: &[MonthlyIncome], stability: &StabilityMetrics, now_month: u32) -> AnnualizedProjection {
    let recent12 = recent_twelve(monthly);

    let trailing = trailing_average(&recent12);
    let weighted = stability.weighted_monthly_mean_cents as f64 * 12.0;
    let seasonal = seasonal_adjusted(monthly, now_month, trailing);
    let trend = trend_adjusted(trailing, stability.yoy_growth_percent);

    let methods = [trailing, weighted, seasonal, trend];
    let blend = blend_weights(stability.cv, stability.yoy_growth_percent, stability.seasonality_index);

    let final_f64: f64 = methods.iter().zip(blend.w.iter()).map(|(m, w)| m * w).sum();
    let final_cents = round_cents(final_f64);

    let margin = final_cents as f64 * stability.cv * 0.5;
    let ci_low_cents = round_cents(final_cents as f64 - margin);
    let ci_high_cents = round_cents(final_cents as f64 + margin);

    let confidence = if stability.cv < 0.2 && monthly.len() >= 18 {
        ConfidenceLevel::High
    } else if stability.cv > 0.4 || monthly.len() < 6 {
        ConfidenceLevel::Low
    } else {
        ConfidenceLevel::Medium
    };

    AnnualizedProjection {
        method1_trailing_cents: round_cents(trailing),
        method2_weighted_cents: round_cents(weighted),
        method3_seasonal_cents: round_cents(seasonal),
        method4_trend_cents: round_cents(trend),
        final_cents,
        ci_low_cents,
        ci_high_cents,
        confidence,
        primary_method: blend.primary,
    }
}

/// The 12 most recent months, oldest first, zero-padded when the series
/// is shorter than 12 months.
fn recent_twelve(monthly: &[MonthlyIncome]) -> Vec<i64> {
    let mut recent: Vec<i64> = monthly.iter().take(12).map(|m| m.total_cents).collect();
    recent.reverse();
    while recent.len() < 12 {
        recent.insert(0, 0);
    }
    recent
}

fn trailing_average(recent12: &[i64]) -> f64 {
    let values: Vec<f64> = recent12.iter().map(|&c| c as f64).collect();
    mean(&values) * 12.0
}

fn seasonal_adjusted(monthly: &[MonthlyIncome], now_month: u32, trailing: f64) -> f64 {
    if monthly.len() < 12 {
        return trailing;
    }
    let mut by_calendar_month: Vec<Vec<f64>> = vec![Vec::new(); 12];
    for m in monthly {
        by_calendar_month[(m.year_month.month - 1) as usize].push(m.total_cents as f64);
    }
    (0..12)
        .map(|i| {
            let target_calendar_month = (now_month + i) % 12 + 1; // 1-based
            mean(&by_calendar_month[(target_calendar_month - 1) as usize])
        })
        .sum()
}

fn trend_adjusted(trailing: f64, yoy_growth_percent: f64) -> f64 {
    trailing * (1.0 + yoy_growth_percent / 100.0 * TREND_DAMPING_FACTOR)
}

fn blend_weights(cv: f64, yoy: f64, seasonality: f64) -> BlendWeights {
    if seasonality > 0.25 {
        BlendWeights { w: [0.15, 0.25, 0.40, 0.20], primary: ProjectionMethod::Seasonal }
    } else if yoy.abs() > 15.0 {
        BlendWeights { w: [0.20, 0.30, 0.10, 0.40], primary: ProjectionMethod::Trend }
    } else if cv < 0.15 {
        BlendWeights { w: [0.40, 0.30, 0.15, 0.15], primary: ProjectionMethod::Trailing }
    } else {
        BlendWeights { w: [0.25, 0.35, 0.20, 0.20], primary: ProjectionMethod::WeightedMovingAverage }
    }
}
