//! Produces a narrative risk assessment from stability metrics, source
//! concentration, and debt-to-income.

use crate::schema::{IncomeSource, RiskAssessment, RiskLevel, StabilityMetrics, Trajectory};

pub fn assess(stability: &StabilityMetrics, sources: &[IncomeSource], dti_percent: f64) -> RiskAssessment {
    let mut score: i32 = 50;
    let mut positive_factors = Vec::new();
    let mut risk_factors = Vec::new();

    if stability.cv < 0.2 {
        score -= 10;
        positive_factors.push("income is consistent month to month".to_string());
    } else if stability.cv > 0.4 {
        score += 15;
        risk_factors.push("income fluctuates significantly month to month".to_string());
    }

    match stability.trajectory {
        Trajectory::Growing => {
            score -= 10;
            positive_factors.push("income shows a growing trend".to_string());
        }
        Trajectory::Declining => {
            score += 20;
            risk_factors.push("income shows a declining trend".to_string());
        }
        Trajectory::Volatile => {
            score += 10;
            risk_factors.push("income trend is volatile".to_string());
        }
        Trajectory::Seasonal | Trajectory::Stable => {}
    }

    if sources.len() >= 4 {
        score -= 10;
        positive_factors.push("income is diversified across four or more sources".to_string());
    } else if sources.len() == 1 {
        score += 15;
        risk_factors.push("income depends on a single source".to_string());
    }

    let total: i64 = sources.iter().map(|s| s.total_cents).sum();
    if total > 0 {
        if let Some(dominant) = sources.iter().max_by_key(|s| s.total_cents) {
            if dominant.total_cents as f64 / total as f64 > 0.70 {
                score += 10;
                risk_factors.push(format!("{} accounts for the majority of total income", dominant.display_name));
            }
        }
    }

    if dti_percent < 35.0 {
        score -= 5;
        positive_factors.push("debt-to-income ratio is manageable".to_string());
    } else if dti_percent > 50.0 {
        score += 15;
        risk_factors.push("debt-to-income ratio is elevated".to_string());
    }

    if stability.maintenance_probability > 0.75 {
        positive_factors.push("income is likely to be maintained going forward".to_string());
    } else if stability.maintenance_probability < 0.5 {
        risk_factors.push("income may not be maintained going forward".to_string());
    }

    let level = if score < 40 {
        RiskLevel::Low
    } else if score < 65 {
        RiskLevel::Moderate
    } else {
        RiskLevel::Elevated
    };

    RiskAssessment {
        level,
        score,
        positive_factors,
        risk_factors,
    }
}
