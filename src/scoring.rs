//! Computes the six-component Loan Readiness Score, qualifies the
//! borrower against the fixed loan-type thresholds, and generates a
//! ranked list of recommendations.

use chrono::{DateTime, Utc};

use crate::catalog::{LoanType, ScoringConfig};
use crate::schema::{
    DocumentationFlags, IncomeSource, LetterGrade, LoanReadinessScore, Priority, Recommendation,
    ScoreComponent, StabilityMetrics, Trajectory,
};

struct Component {
    name: &'static str,
    weight: f64,
    raw: u8,
    factors: Vec<String>,
    tips: Vec<String>,
    timeframe: &'static str,
}

#[allow(clippy::too_many_arguments)]
pub fn score(
    stability: &StabilityMetrics,
    sources: &[IncomeSource],
    flags: &DocumentationFlags,
    dti_percent: f64,
    annual_projection_cents: i64,
    months_analyzed: u32,
    target_loan_amount_cents: Option<i64>,
    config: &ScoringConfig,
    now: DateTime<Utc>,
) -> LoanReadinessScore {
    let components = vec![
        income_stability(stability, config.weights.income_stability),
        income_trend(stability, sources, config.weights.income_trend),
        income_diversity(sources, config.weights.income_diversity),
        documentation_completeness(flags, config.weights.documentation_completeness),
        income_level(annual_projection_cents, dti_percent, target_loan_amount_cents, config.weights.income_level),
        account_age(months_analyzed, config.weights.account_age),
    ];

    let overall = components.iter().map(|c| c.weight * c.raw as f64).sum::<f64>().round() as u8;
    let grade = grade_for(overall);

    let mut qualified = Vec::new();
    let mut potential = Vec::new();
    for (&loan_type, threshold) in &config.loan_thresholds {
        if overall >= threshold.recommended {
            qualified.push(loan_type);
        } else if overall >= threshold.minimum {
            potential.push(loan_type);
        }
    }

    let recommendations = build_recommendations(&components, flags, sources, config.recommendation_realization_factor);

    let breakdown: Vec<ScoreComponent> = components
        .into_iter()
        .map(|c| ScoreComponent {
            name: c.name.to_string(),
            weight: c.weight,
            raw: c.raw,
            weighted: c.weight * c.raw as f64,
            factors: c.factors,
            tips: c.tips,
        })
        .collect();

    LoanReadinessScore {
        overall,
        grade,
        breakdown,
        recommendations,
        qualified,
        potential,
        thresholds: config.loan_thresholds.clone(),
        calculated_at: now,
    }
}

fn grade_for(overall: u8) -> LetterGrade {
    if overall >= 95 {
        LetterGrade::APlus
    } else if overall >= 90 {
        LetterGrade::A
    } else if overall >= 85 {
        LetterGrade::BPlus
    } else if overall >= 80 {
        LetterGrade::B
    } else if overall >= 75 {
        LetterGrade::CPlus
    } else if overall >= 70 {
        LetterGrade::C
    } else if overall >= 60 {
        LetterGrade::D
    } else {
        LetterGrade::F
    }
}

fn income_stability(stability: &StabilityMetrics, weight: f64) -> Component {
    let cv = stability.cv;
    let mut raw: i32 = if cv < 0.10 {
        100
    } else if cv < 0.15 {
        95
    } else if cv < 0.20 {
        85
    } else if cv < 0.25 {
        75
    } else if cv < 0.30 {
        65
    } else if cv < 0.40 {
        50
    } else if cv < 0.50 {
        35
    } else {
        20
    };
    if stability.maintenance_probability > 0.8 {
        raw = (raw + 5).min(100);
    }

    let mut factors = vec![format!("income variability (CV) is {cv:.2}")];
    let mut tips = Vec::new();
    if raw < 85 {
        tips.push("Spread hours across more platforms or shifts to smooth month-to-month income".to_string());
    }
    if stability.maintenance_probability <= 0.5 {
        factors.push("income is unlikely to be maintained at current levels".to_string());
    }

    Component { name: "IncomeStability", weight, raw: raw as u8, factors, tips, timeframe: "3-6 months" }
}

fn income_trend(stability: &StabilityMetrics, sources: &[IncomeSource], weight: f64) -> Component {
    if sources.is_empty() {
        return Component {
            name: "IncomeTrend",
            weight,
            raw: 0,
            factors: vec!["no income history exists to evaluate a trend against".to_string()],
            tips: vec!["Link an income source to begin building a trend history".to_string()],
            timeframe: "6-12 months",
        };
    }

    let yoy = stability.yoy_growth_percent;
    let mut raw: i32 = if yoy >= 20.0 {
        100
    } else if yoy >= 10.0 {
        90
    } else if yoy >= 5.0 {
        80
    } else if yoy >= 0.0 {
        70
    } else if yoy >= -5.0 {
        55
    } else if yoy >= -15.0 {
        40
    } else {
        25
    };

    let mut factors = vec![format!("year-over-year income growth is {yoy:.1}%")];
    let mut tips = Vec::new();
    match stability.trajectory {
        Trajectory::Growing => raw = (raw + 5).min(100),
        Trajectory::Volatile => raw = (raw - 10).max(0),
        Trajectory::Seasonal => factors.push("income follows a seasonal pattern".to_string()),
        Trajectory::Declining | Trajectory::Stable => {}
    }
    if raw < 70 {
        tips.push("Take on additional shifts or clients to reverse a flat or declining trend".to_string());
    }

    Component { name: "IncomeTrend", weight, raw: raw as u8, factors, tips, timeframe: "6-12 months" }
}

fn income_diversity(sources: &[IncomeSource], weight: f64) -> Component {
    let active = sources.iter().filter(|s| s.months_active >= 3).count();
    let mut raw: i32 = match active {
        0 => 40,
        1 => 40,
        2 => 65,
        3 => 80,
        4 => 90,
        _ => 95,
    };

    let total: i64 = sources.iter().map(|s| s.total_cents).sum();
    let max_share = if total > 0 {
        sources.iter().map(|s| s.total_cents).max().unwrap_or(0) as f64 / total as f64
    } else {
        0.0
    };
    let mut factors = vec![format!("{active} active income source(s)")];
    if max_share > 0.70 {
        raw -= 20;
        factors.push("one source dominates total income".to_string());
    } else if max_share > 0.50 {
        raw -= 10;
    } else {
        raw += 5;
    }
    raw = raw.clamp(0, 100);

    let mut tips = Vec::new();
    if active < 3 {
        tips.push("Add a second or third income source to reduce reliance on any one platform".to_string());
    }

    Component { name: "IncomeDiversity", weight, raw: raw as u8, factors, tips, timeframe: "3-9 months" }
}

fn documentation_completeness(flags: &DocumentationFlags, weight: f64) -> Component {
    let mut raw: i32 = 0;
    let mut factors = Vec::new();
    if flags.tax_returns {
        raw += 30;
        factors.push("tax returns on file".to_string());
    }
    if flags.has_1099 {
        raw += 25;
        factors.push("1099 forms on file".to_string());
    }
    if flags.bank_statements || flags.linked_accounts >= 1 {
        raw += 25;
        factors.push("bank activity verified".to_string());
    }
    if flags.w2 {
        raw += 10;
    }
    if flags.other {
        raw += 10;
    }
    if flags.linked_accounts >= 2 {
        raw += 5;
    }
    raw = raw.min(100);

    let mut tips = Vec::new();
    if !flags.tax_returns {
        tips.push("Upload your most recent tax return".to_string());
    }
    if flags.linked_accounts == 0 {
        tips.push("Link a primary bank account for automatic verification".to_string());
    }

    Component { name: "DocumentationCompleteness", weight, raw: raw as u8, factors, tips, timeframe: "1-2 weeks" }
}

fn income_level(
    annual_projection_cents: i64,
    dti_percent: f64,
    target_loan_amount_cents: Option<i64>,
    weight: f64,
) -> Component {
    let annual_dollars = annual_projection_cents as f64 / 100.0;
    let mut raw: i32 = if annual_dollars >= 150_000.0 {
        95
    } else if annual_dollars >= 100_000.0 {
        85
    } else if annual_dollars >= 75_000.0 {
        75
    } else if annual_dollars >= 50_000.0 {
        65
    } else if annual_dollars >= 35_000.0 {
        50
    } else {
        35
    };

    if dti_percent < 30.0 {
        raw += 10;
    } else if dti_percent < 40.0 {
        raw += 5;
    } else if dti_percent < 50.0 {
        // no adjustment
    } else {
        raw -= 15;
    }
    raw = raw.clamp(0, 100);

    let mut factors = vec![format!("projected annual income is ${annual_dollars:.0}")];
    let mut tips = Vec::new();
    if annual_dollars < 50_000.0 {
        tips.push("Increase total volume across existing sources to lift annualized income".to_string());
    }

    if let Some(loan_amount_cents) = target_loan_amount_cents {
        // Large requests are narrated against a mortgage/HELOC-style 30-year
        // amortization; smaller requests against a shorter personal-loan term.
        let (rate, term_months) = if loan_amount_cents >= 50_000_00 { (0.07, 360) } else { (0.10, 60) };
        let payment = monthly_amortized_payment(loan_amount_cents as f64, rate, term_months);
        let monthly_income = annual_projection_cents as f64 / 12.0;
        if monthly_income > 0.0 {
            let loan_dti = payment / monthly_income * 100.0;
            factors.push(format!("requested loan would add an estimated {loan_dti:.1}% to monthly DTI"));
        }
    }

    Component { name: "IncomeLevel", weight, raw: raw as u8, factors, tips, timeframe: "6-18 months" }
}

fn monthly_amortized_payment(principal: f64, annual_rate: f64, term_months: u32) -> f64 {
    let r = annual_rate / 12.0;
    if r == 0.0 {
        return principal / term_months as f64;
    }
    let factor = (1.0 + r).powi(term_months as i32);
    principal * r * factor / (factor - 1.0)
}

fn account_age(months_analyzed: u32, weight: f64) -> Component {
    let raw: i32 = if months_analyzed >= 24 {
        100
    } else if months_analyzed >= 18 {
        85
    } else if months_analyzed >= 12 {
        70
    } else if months_analyzed >= 6 {
        50
    } else if months_analyzed >= 3 {
        30
    } else {
        15
    };

    let factors = vec![format!("{months_analyzed} months of history analyzed")];
    let mut tips = Vec::new();
    if months_analyzed < 12 {
        tips.push("Continue linking accounts to build a longer verified history".to_string());
    }

    Component { name: "AccountAge", weight, raw: raw as u8, factors, tips, timeframe: "12-24 months" }
}

fn build_recommendations(
    components: &[Component],
    flags: &DocumentationFlags,
    sources: &[IncomeSource],
    realization_factor: f64,
) -> Vec<Recommendation> {
    let mut recommendations = Vec::new();

    for component in components {
        let potential_gain = (100 - component.raw as i32) as f64 * component.weight;
        for tip in &component.tips {
            let potential_increase = (potential_gain * realization_factor).round() as u8;
            recommendations.push(Recommendation {
                category: component.name.to_string(),
                action: tip.clone(),
                potential_increase,
                priority: priority_for(potential_increase),
                timeframe: component.timeframe.to_string(),
            });
        }
    }

    if !flags.tax_returns {
        recommendations.push(Recommendation {
            category: "DocumentationCompleteness".to_string(),
            action: "Upload your most recent tax return".to_string(),
            potential_increase: 5,
            priority: Priority::High,
            timeframe: "1-2 weeks".to_string(),
        });
    }
    if flags.linked_accounts == 0 {
        recommendations.push(Recommendation {
            category: "DocumentationCompleteness".to_string(),
            action: "Link your primary bank account".to_string(),
            potential_increase: 8,
            priority: Priority::High,
            timeframe: "1-2 weeks".to_string(),
        });
    }
    if sources.len() == 1 {
        recommendations.push(Recommendation {
            category: "IncomeDiversity".to_string(),
            action: "Add a secondary income source".to_string(),
            potential_increase: 10,
            priority: Priority::Medium,
            timeframe: "3-9 months".to_string(),
        });
    }

    recommendations.sort_by(|a, b| b.potential_increase.cmp(&a.potential_increase));
    recommendations.truncate(5);
    recommendations
}

fn priority_for(potential_increase: u8) -> Priority {
    if potential_increase >= 10 {
        Priority::High
    } else if potential_increase >= 5 {
        Priority::Medium
    } else {
        Priority::Low
    }
}
