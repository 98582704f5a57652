//! Orchestrates the ten analytics stages into one pure, deterministic
//! invocation: `transactions -> classify+group -> aggregate monthly ->
//! metrics -> projection -> obligations/DTI -> risk -> score -> report`.

use chrono::{Datelike, NaiveDate};

use crate::catalog::{PlatformCatalog, ScoringConfig};
use crate::clock::Clock;
use crate::error::{AnalyticsError, Result};
use crate::schema::{LenderReport, PipelineInput, YearMonth};
use crate::{aggregator, obligations, projector, report, risk, scoring, stability};
use crate::grouper;

/// Bundles the two caller-constructed configuration objects a pipeline
/// invocation needs, matching the teacher's pattern of threading one
/// config value through a processor rather than reaching for a global.
#[derive(Debug, Clone)]
pub struct IncomeAnalyticsPipeline {
    pub catalog: PlatformCatalog,
    pub scoring_config: ScoringConfig,
}

impl Default for IncomeAnalyticsPipeline {
    fn default() -> Self {
        Self {
            catalog: PlatformCatalog::default(),
            scoring_config: ScoringConfig::default(),
        }
    }
}

impl IncomeAnalyticsPipeline {
    pub fn new(catalog: PlatformCatalog, scoring_config: ScoringConfig) -> Self {
        Self { catalog, scoring_config }
    }

    pub fn run<C: Clock>(&self, input: &PipelineInput, clock: &C) -> Result<LenderReport> {
        run_pipeline(self, input, clock)
    }
}

fn year_month_minus(ym: YearMonth, months_back: u32) -> YearMonth {
    let absolute = ym.year as i64 * 12 + (ym.month as i64 - 1) - months_back as i64;
    let year = absolute.div_euclid(12) as i32;
    let month = (absolute.rem_euclid(12) + 1) as u32;
    YearMonth::new(year, month)
}

fn first_of_month(ym: YearMonth) -> NaiveDate {
    NaiveDate::from_ymd_opt(ym.year, ym.month, 1).expect("YearMonth always carries a valid month")
}

fn validate_input(input: &PipelineInput) -> Result<()> {
    if input.period_months < 1 {
        return Err(AnalyticsError::InvalidPeriodMonths(input.period_months));
    }
    for tx in &input.transactions {
        tx.validate()?;
    }
    Ok(())
}

pub fn run_pipeline<C: Clock>(
    pipeline: &IncomeAnalyticsPipeline,
    input: &PipelineInput,
    clock: &C,
) -> Result<LenderReport> {
    validate_input(input)?;

    let end_month = YearMonth::from_date(input.as_of);
    let start_month = year_month_minus(end_month, input.period_months - 1);
    let period_start_date = first_of_month(start_month);

    if input.as_of < period_start_date {
        return Err(AnalyticsError::InvalidPeriod {
            start: period_start_date.to_string(),
            end: input.as_of.to_string(),
        });
    }

    let windowed: Vec<_> = input
        .transactions
        .iter()
        .filter(|tx| tx.date >= period_start_date && tx.date <= input.as_of)
        .cloned()
        .collect();

    log::info!(
        "running pipeline for borrower {}: {} transactions, period {}..={}",
        input.borrower.borrower_id,
        windowed.len(),
        start_month,
        end_month
    );

    let sources = grouper::group_sources(&pipeline.catalog, &windowed);
    log::debug!("grouped {} income sources", sources.len());

    let monthly_history = aggregator::aggregate_monthly(&sources, &windowed, start_month, end_month);
    log::debug!(
        "aggregated {} months, {} flagged anomalous",
        monthly_history.len(),
        monthly_history.iter().filter(|m| m.anomaly).count()
    );

    let stability_metrics = stability::analyze(&monthly_history, &sources);
    log::debug!(
        "stability: cv={:.3} trajectory={:?} diversity={:.1}",
        stability_metrics.cv,
        stability_metrics.trajectory,
        stability_metrics.diversity_score
    );

    let projection = projector::project(&monthly_history, &stability_metrics, input.as_of.month());
    log::debug!(
        "projected annual income {} cents, confidence {:?}",
        projection.final_cents,
        projection.confidence
    );

    let debt_to_income = obligations::analyze(&windowed, projection.final_cents);
    log::debug!(
        "detected {} recurring obligations, dti={:.1}%",
        debt_to_income.obligations.len(),
        debt_to_income.dti_percent
    );

    let risk_assessment = risk::assess(&stability_metrics, &sources, debt_to_income.dti_percent);
    log::debug!("risk level {:?}", risk_assessment.level);

    let now = clock.now();
    let loan_readiness_score = scoring::score(
        &stability_metrics,
        &sources,
        &input.documentation_flags,
        debt_to_income.dti_percent,
        projection.final_cents,
        input.period_months,
        input.target_loan_amount_cents,
        &pipeline.scoring_config,
        now,
    );
    log::debug!(
        "scored loan readiness {} ({:?})",
        loan_readiness_score.overall,
        loan_readiness_score.grade
    );

    let report = report::compose(
        &input.borrower,
        &sources,
        monthly_history,
        &stability_metrics,
        projection,
        loan_readiness_score,
        risk_assessment,
        debt_to_income,
        input.documents.clone(),
        input.documentation_flags.linked_accounts,
        now,
    );
    log::info!("report {} composed for borrower {}", report.metadata.report_id, input.borrower.borrower_id);

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::schema::{BorrowerProfile, DocumentationFlags, Transaction, TransactionKind};
    use chrono::{NaiveDate, TimeZone, Utc};

    fn income_tx(id: &str, cents: i64, date: (i32, u32, u32)) -> Transaction {
        Transaction {
            id: id.to_string(),
            account_id: "acc1".to_string(),
            amount_cents: cents,
            date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
            name: "Uber payout".to_string(),
            merchant_name: None,
            category: vec![],
            pending: false,
            kind: TransactionKind::Income,
            source_hint: None,
        }
    }

    fn borrower() -> BorrowerProfile {
        BorrowerProfile {
            borrower_id: "b1".into(),
            display_name: "Jordan Rivera".into(),
            city: "Austin".into(),
            state: "TX".into(),
            member_since: NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
        }
    }

    #[test]
    fn rejects_zero_period_months() {
        let pipeline = IncomeAnalyticsPipeline::default();
        let clock = FixedClock(Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap());
        let input = PipelineInput {
            transactions: vec![],
            period_months: 0,
            as_of: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
            borrower: borrower(),
            documents: vec![],
            documentation_flags: DocumentationFlags::default(),
            target_loan_amount_cents: None,
        };
        assert!(matches!(pipeline.run(&input, &clock), Err(AnalyticsError::InvalidPeriodMonths(0))));
    }

    #[test]
    fn rejects_malformed_transaction_names() {
        let pipeline = IncomeAnalyticsPipeline::default();
        let clock = FixedClock(Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap());
        let mut bad_tx = income_tx("1", 1000, (2025, 12, 1));
        bad_tx.name = "   ".to_string();
        let input = PipelineInput {
            transactions: vec![bad_tx],
            period_months: 12,
            as_of: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
            borrower: borrower(),
            documents: vec![],
            documentation_flags: DocumentationFlags::default(),
            target_loan_amount_cents: None,
        };
        assert!(matches!(pipeline.run(&input, &clock), Err(AnalyticsError::MalformedTransaction { .. })));
    }

    #[test]
    fn empty_history_still_produces_a_valid_report() {
        let pipeline = IncomeAnalyticsPipeline::default();
        let clock = FixedClock(Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap());
        let input = PipelineInput {
            transactions: vec![],
            period_months: 12,
            as_of: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
            borrower: borrower(),
            documents: vec![],
            documentation_flags: DocumentationFlags::default(),
            target_loan_amount_cents: None,
        };
        let report = pipeline.run(&input, &clock).unwrap();
        assert_eq!(report.monthly_history.len(), 12);
        assert_eq!(report.loan_readiness_score.qualified.len(), 0);
        assert_eq!(
            report.borrower.verification_status,
            crate::schema::VerificationStatus::Unverified
        );
    }

    #[test]
    fn month_history_length_matches_period_months() {
        let pipeline = IncomeAnalyticsPipeline::default();
        let clock = FixedClock(Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap());
        let txs: Vec<Transaction> = (1..=24)
            .map(|i| {
                let month = ((i - 1) % 12) + 1;
                let year = if i <= 12 { 2024 } else { 2025 };
                income_tx(&format!("tx-{i}"), 400_000, (year, month as u32, 5))
            })
            .collect();
        let input = PipelineInput {
            transactions: txs,
            period_months: 24,
            as_of: NaiveDate::from_ymd_opt(2025, 12, 31).unwrap(),
            borrower: borrower(),
            documents: vec![],
            documentation_flags: DocumentationFlags::default(),
            target_loan_amount_cents: None,
        };
        let report = pipeline.run(&input, &clock).unwrap();
        assert_eq!(report.monthly_history.len(), 24);
        let total: i64 = report.monthly_history.iter().map(|m| m.total_cents).sum();
        assert_eq!(total, 24 * 400_000);
    }
}
