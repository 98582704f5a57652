//! Computes stability, trend, diversity, and seasonality metrics over
//! the dense monthly income series.

use crate::schema::{IncomeSource, MonthlyIncome, StabilityMetrics, Trajectory};
use crate::utils::{mean, population_stddev, round_cents, round_to};

/// `monthly` must be sorted descending by `year_month` (the
/// [`crate::aggregator::aggregate_monthly`] output shape).
pub fn analyze(monthly: &[MonthlyIncome], sources: &[IncomeSource]) -> StabilityMetrics {
    let cv = coefficient_of_variation(monthly);
    let weighted_monthly_mean_cents = weighted_monthly_mean(monthly);
    let yoy_growth_percent = yoy_growth(monthly);
    let diversity_score = diversity_score(sources);
    let seasonality_index = seasonality_index(monthly);

    let trajectory = if cv > 0.5 {
        Trajectory::Volatile
    } else if seasonality_index > 0.3 {
        Trajectory::Seasonal
    } else if yoy_growth_percent > 10.0 {
        Trajectory::Growing
    } else if yoy_growth_percent < -10.0 {
        Trajectory::Declining
    } else {
        Trajectory::Stable
    };

    let maintenance_probability = maintenance_probability(cv, trajectory, sources.len());

    StabilityMetrics {
        cv,
        weighted_monthly_mean_cents,
        yoy_growth_percent,
        diversity_score,
        seasonality_index,
        trajectory,
        maintenance_probability,
    }
}

fn coefficient_of_variation(monthly: &[MonthlyIncome]) -> f64 {
    let non_zero: Vec<f64> = monthly
        .iter()
        .map(|m| m.total_cents as f64)
        .filter(|&v| v != 0.0)
        .collect();
    let m = mean(&non_zero);
    let cv = if m == 0.0 {
        log::warn!("coefficient_of_variation: mean is zero over {} non-zero months, substituting cv=1.0", non_zero.len());
        1.0
    } else {
        population_stddev(&non_zero) / m
    };
    round_to(cv, 3)
}

fn weighted_monthly_mean(monthly: &[MonthlyIncome]) -> i64 {
    // Reverse to oldest..newest so "most recent 6" is the tail.
    let ascending: Vec<&MonthlyIncome> = monthly.iter().rev().collect();
    let n = ascending.len();
    if n == 0 {
        return 0;
    }
    let recent_start = n.saturating_sub(6);
    let mut sum_w = 0.0;
    let mut sum_wx = 0.0;
    for (i, m) in ascending.iter().enumerate() {
        let weight = if i >= recent_start { 2.0 } else { 1.0 };
        sum_w += weight;
        sum_wx += weight * m.total_cents as f64;
    }
    round_cents(sum_wx / sum_w)
}

fn yoy_growth(monthly: &[MonthlyIncome]) -> f64 {
    let n = monthly.len();
    if n < 12 {
        return 0.0;
    }
    let recent: f64 = monthly[0..12].iter().map(|m| m.total_cents as f64).sum();
    let prior_end = n.min(24);
    let prior_slice = &monthly[12..prior_end];
    if prior_slice.len() < 6 {
        return 0.0;
    }
    let prior: f64 = prior_slice.iter().map(|m| m.total_cents as f64).sum();
    if prior == 0.0 {
        return if recent > 0.0 { 100.0 } else { 0.0 };
    }
    round_to((recent - prior) / prior * 100.0, 1)
}

fn diversity_score(sources: &[IncomeSource]) -> f64 {
    if sources.is_empty() {
        return 0.0;
    }
    if sources.len() == 1 {
        return 20.0;
    }
    let total: f64 = sources.iter().map(|s| s.total_cents as f64).sum();
    if total == 0.0 {
        return 0.0;
    }
    let sum_sq: f64 = sources
        .iter()
        .map(|s| {
            let share = s.total_cents as f64 / total;
            share * share
        })
        .sum();
    let base = (1.0 - sum_sq) * 100.0;
    let bonus = (sources.len() - 1).min(3) as f64 * 5.0;
    (base + bonus).min(100.0)
}

fn seasonality_index(monthly: &[MonthlyIncome]) -> f64 {
    if monthly.len() < 12 {
        return 0.0;
    }
    let mut by_calendar_month: Vec<Vec<f64>> = vec![Vec::new(); 12];
    for m in monthly {
        by_calendar_month[(m.year_month.month - 1) as usize].push(m.total_cents as f64);
    }
    let averages: Vec<f64> = by_calendar_month.iter().map(|v| mean(v)).collect();
    let avg_of_averages = mean(&averages);
    if avg_of_averages == 0.0 {
        return 0.0;
    }
    (population_stddev(&averages) / avg_of_averages).clamp(0.0, 1.0)
}

fn maintenance_probability(cv: f64, trajectory: Trajectory, source_count: usize) -> f64 {
    let mut p: f64 = 0.5;
    if cv < 0.15 {
        p += 0.2;
    } else if cv < 0.30 {
        p += 0.1;
    } else if cv > 0.5 {
        p -= 0.15;
    }
    match trajectory {
        Trajectory::Growing => p += 0.1,
        Trajectory::Stable => p += 0.05,
        Trajectory::Declining => p -= 0.15,
        Trajectory::Volatile => p -= 0.10,
        Trajectory::Seasonal => {}
    }
    if source_count >= 4 {
        p += 0.1;
    } else if source_count >= 2 {
        p += 0.05;
    } else if source_count == 1 {
        p -= 0.05;
    }
    p.clamp(0.1, 0.95)
}
