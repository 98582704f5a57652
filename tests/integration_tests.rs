use chrono::{NaiveDate, TimeZone, Utc};
use income_readiness_core::*;

fn borrower(id: &str) -> BorrowerProfile {
    BorrowerProfile {
        borrower_id: id.to_string(),
        display_name: "Jordan Rivera".to_string(),
        city: "Austin".to_string(),
        state: "TX".to_string(),
        member_since: NaiveDate::from_ymd_opt(2022, 1, 1).unwrap(),
    }
}

fn income_tx(id: &str, name: &str, cents: i64, date: NaiveDate) -> Transaction {
    Transaction {
        id: id.to_string(),
        account_id: "acc-1".to_string(),
        amount_cents: cents,
        date,
        name: name.to_string(),
        merchant_name: None,
        category: vec![],
        pending: false,
        kind: TransactionKind::Income,
        source_hint: None,
    }
}

fn monthly_series(start: NaiveDate, months: u32, name: &str, cents_per_month: i64) -> Vec<Transaction> {
    (0..months)
        .map(|i| {
            let date = add_months(start, i);
            income_tx(&format!("{name}-{i}"), name, cents_per_month, date)
        })
        .collect()
}

fn add_months(start: NaiveDate, months: u32) -> NaiveDate {
    use chrono::Datelike;
    let total = start.year() as i64 * 12 + (start.month() as i64 - 1) + months as i64;
    let year = (total.div_euclid(12)) as i32;
    let month = (total.rem_euclid(12) + 1) as u32;
    NaiveDate::from_ymd_opt(year, month, start.day().min(28)).unwrap()
}

fn full_documentation() -> DocumentationFlags {
    DocumentationFlags {
        tax_returns: true,
        has_1099: true,
        bank_statements: true,
        w2: false,
        other: false,
        linked_accounts: 2,
    }
}

#[test]
fn stable_single_contractor_reads_as_low_variance() {
    let txs = monthly_series(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(), 24, "ACME Consulting", 400_000);
    let input = PipelineInput {
        transactions: txs,
        period_months: 24,
        as_of: NaiveDate::from_ymd_opt(2025, 12, 28).unwrap(),
        borrower: borrower("b-stable"),
        documents: vec![],
        documentation_flags: full_documentation(),
        target_loan_amount_cents: None,
    };
    let pipeline = IncomeAnalyticsPipeline::default();
    let clock = FixedClock(Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap());
    let report = pipeline.run(&input, &clock).unwrap();

    assert_eq!(report.income_sources.len(), 1);
    assert!(report.stability_metrics.cv < 0.05);
    assert_eq!(report.stability_metrics.trajectory, Trajectory::Stable);
    assert_eq!(report.income_overview.total_annual_projected_cents, 4_800_000);
    assert!(matches!(
        report.annualized_projection.confidence,
        ConfidenceLevel::High | ConfidenceLevel::Medium
    ));
    assert!(report.loan_readiness_score.qualified.contains(&LoanType::Auto));
}

#[test]
fn four_balanced_platforms_score_high_diversity() {
    let start = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
    let mut txs = Vec::new();
    for platform in ["UBER TRIP", "LYFT RIDE", "DOORDASH DELIVERY", "INSTACART SHOP"] {
        txs.extend(monthly_series(start, 12, platform, 250_000));
    }
    let input = PipelineInput {
        transactions: txs,
        period_months: 12,
        as_of: NaiveDate::from_ymd_opt(2025, 12, 28).unwrap(),
        borrower: borrower("b-diverse"),
        documents: vec![],
        documentation_flags: full_documentation(),
        target_loan_amount_cents: None,
    };
    let pipeline = IncomeAnalyticsPipeline::default();
    let clock = FixedClock(Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap());
    let report = pipeline.run(&input, &clock).unwrap();

    assert_eq!(report.income_sources.len(), 4);
    assert!(report.stability_metrics.diversity_score >= 80.0);
    assert!(report.loan_readiness_score.qualified.contains(&LoanType::Auto));
    assert!(report.loan_readiness_score.qualified.contains(&LoanType::Personal));
}

#[test]
fn declining_contractor_trends_downward() {
    let mut txs = monthly_series(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(), 12, "ACME Consulting", 400_000);
    txs.extend(monthly_series(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(), 12, "ACME Consulting", 300_000));
    let input = PipelineInput {
        transactions: txs,
        period_months: 24,
        as_of: NaiveDate::from_ymd_opt(2025, 12, 28).unwrap(),
        borrower: borrower("b-declining"),
        documents: vec![],
        documentation_flags: full_documentation(),
        target_loan_amount_cents: None,
    };
    let pipeline = IncomeAnalyticsPipeline::default();
    let clock = FixedClock(Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap());
    let report = pipeline.run(&input, &clock).unwrap();

    assert_eq!(report.stability_metrics.trajectory, Trajectory::Declining);
    assert!(report.stability_metrics.yoy_growth_percent < -10.0);
    assert_eq!(report.risk_assessment.level, RiskLevel::Elevated);
}

#[test]
fn pure_gig_growth_trends_upward() {
    let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    let txs: Vec<Transaction> = (0..24)
        .map(|i| {
            let date = add_months(start, i);
            let growth_factor = 1.0 + 0.08 * (i as f64 / 12.0);
            let noise = if i % 2 == 0 { 1.1 } else { 0.95 };
            let cents = (300_000.0 * growth_factor * noise).round() as i64;
            income_tx(&format!("uber-{i}"), "UBER TRIP", cents, date)
        })
        .collect();
    let input = PipelineInput {
        transactions: txs,
        period_months: 24,
        as_of: NaiveDate::from_ymd_opt(2025, 12, 28).unwrap(),
        borrower: borrower("b-growth"),
        documents: vec![],
        documentation_flags: full_documentation(),
        target_loan_amount_cents: None,
    };
    let pipeline = IncomeAnalyticsPipeline::default();
    let clock = FixedClock(Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap());
    let report = pipeline.run(&input, &clock).unwrap();

    assert_eq!(report.income_sources.len(), 1);
    assert!(report.stability_metrics.yoy_growth_percent > 0.0);
}

#[test]
fn share_token_lifecycle_issues_validates_and_revokes() {
    let store = InMemoryShareTokenStore::new();
    let now = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
    let manager = ShareTokenManager::new(store, FixedClock(now));

    let report_id = uuid::Uuid::new_v4();
    let token = manager.issue(report_id, "borrower-1").unwrap();

    assert!(manager.validate(&token.token, "1.2.3.4"));
    manager.revoke(&token.token).unwrap();
    assert!(!manager.validate(&token.token, "1.2.3.4"));
}

#[test]
fn empty_history_yields_a_low_but_valid_report() {
    let input = PipelineInput {
        transactions: vec![],
        period_months: 12,
        as_of: NaiveDate::from_ymd_opt(2025, 12, 28).unwrap(),
        borrower: borrower("b-empty"),
        documents: vec![],
        documentation_flags: DocumentationFlags::default(),
        target_loan_amount_cents: None,
    };
    let pipeline = IncomeAnalyticsPipeline::default();
    let clock = FixedClock(Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap());
    let report = pipeline.run(&input, &clock).unwrap();

    assert!(report.loan_readiness_score.overall <= 35);
    assert_eq!(report.loan_readiness_score.grade, LetterGrade::F);
    assert!(report.loan_readiness_score.qualified.is_empty());
    assert_eq!(report.borrower.verification_status, VerificationStatus::Unverified);
}

#[test]
fn cent_conservation_holds_across_the_pipeline() {
    let txs = monthly_series(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(), 6, "UBER TRIP", 250_000);
    let expected_total: i64 = txs.iter().map(|t| t.amount_cents).sum();
    let input = PipelineInput {
        transactions: txs,
        period_months: 6,
        as_of: NaiveDate::from_ymd_opt(2025, 6, 28).unwrap(),
        borrower: borrower("b-conservation"),
        documents: vec![],
        documentation_flags: full_documentation(),
        target_loan_amount_cents: None,
    };
    let pipeline = IncomeAnalyticsPipeline::default();
    let clock = FixedClock(Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap());
    let report = pipeline.run(&input, &clock).unwrap();

    let source_total: i64 = report.income_sources.iter().map(|s| s.total_cents).sum();
    assert_eq!(source_total, expected_total);
}
