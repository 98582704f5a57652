//! Assembles the borrower-facing `LenderReport`: PII masking,
//! verification-status derivation, contribution percentages, and a
//! minimal PDF rendering of the finished report.

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::schema::{
    AnnualizedProjection, BorrowerProfile, BorrowerSummary, DebtAnalysis, DocumentStatus, DocumentVerification,
    IncomeOverview, IncomeSource, IncomeSourceSummary, IncomeSourceVerification, LenderReport, LoanReadinessScore,
    MonthlyIncome, ReportMetadata, ReportStatus, RiskAssessment, StabilityMetrics, Trajectory, VerificationStatus,
};

const REPORT_VERSION: &str = "1.0.0";
const REPORT_VALIDITY_DAYS: i64 = 90;
const DISCLAIMER: &str = "This report summarizes income activity observed in linked accounts over the \
analysis period. It is an estimate of income stability and repayment capacity, not a guarantee of \
future earnings or creditworthiness. 1099Pass is not a lender and does not make credit decisions; \
lenders remain solely responsible for underwriting determinations made using this report.";

#[allow(clippy::too_many_arguments)]
pub fn compose(
    borrower: &BorrowerProfile,
    sources: &[IncomeSource],
    monthly_history: Vec<MonthlyIncome>,
    stability: &StabilityMetrics,
    projection: AnnualizedProjection,
    loan_readiness_score: LoanReadinessScore,
    risk_assessment: RiskAssessment,
    debt_to_income: DebtAnalysis,
    documents: Vec<DocumentVerification>,
    linked_accounts: u32,
    generated_at: DateTime<Utc>,
) -> LenderReport {
    let borrower_summary = summarize_borrower(borrower, &documents, sources, linked_accounts);
    let income_overview = summarize_income_overview(sources, &monthly_history, stability, projection.final_cents);
    let income_sources = summarize_sources(sources);

    LenderReport {
        metadata: ReportMetadata {
            report_id: Uuid::new_v4(),
            borrower_id: borrower.borrower_id.clone(),
            generated_at,
            expires_at: generated_at + Duration::days(REPORT_VALIDITY_DAYS),
            version: REPORT_VERSION.to_string(),
            status: ReportStatus::Final,
        },
        borrower: borrower_summary,
        income_overview,
        income_sources,
        monthly_history,
        loan_readiness_score,
        stability_metrics: *stability,
        annualized_projection: projection,
        risk_assessment,
        debt_to_income,
        documents,
        disclaimer: DISCLAIMER.to_string(),
    }
}

fn mask_name(display_name: &str) -> String {
    let mut parts = display_name.split_whitespace();
    let first = parts.next().unwrap_or("Borrower");
    match parts.next() {
        Some(last) => {
            let initial = last.chars().next().unwrap_or('.').to_ascii_uppercase();
            format!("{first} {initial}.")
        }
        None => first.to_string(),
    }
}

fn summarize_borrower(
    borrower: &BorrowerProfile,
    documents: &[DocumentVerification],
    sources: &[IncomeSource],
    linked_accounts: u32,
) -> BorrowerSummary {
    let all_documents_verified = !documents.is_empty() && documents.iter().all(|d| d.status == DocumentStatus::Verified);
    let all_sources_verified = !sources.is_empty()
        && sources.iter().all(|s| s.verification == IncomeSourceVerification::Verified);
    let verification_status = if all_documents_verified && all_sources_verified {
        VerificationStatus::Verified
    } else if documents.is_empty() && linked_accounts == 0 {
        VerificationStatus::Unverified
    } else {
        VerificationStatus::PartiallyVerified
    };

    BorrowerSummary {
        display_name_masked: mask_name(&borrower.display_name),
        city: borrower.city.clone(),
        state: borrower.state.clone(),
        member_since: borrower.member_since,
        verification_status,
    }
}

fn trajectory_description(trajectory: Trajectory) -> &'static str {
    match trajectory {
        Trajectory::Growing => "Income shows an upward trajectory over the analysis period.",
        Trajectory::Declining => "Income shows a downward trajectory over the analysis period.",
        Trajectory::Volatile => "Income fluctuates significantly month to month.",
        Trajectory::Seasonal => "Income follows a recurring seasonal pattern.",
        Trajectory::Stable => "Income has remained steady over the analysis period.",
    }
}

fn summarize_income_overview(
    sources: &[IncomeSource],
    monthly_history: &[MonthlyIncome],
    stability: &StabilityMetrics,
    annual_projected_cents: i64,
) -> IncomeOverview {
    let primary_source_name = sources.iter().max_by_key(|s| s.total_cents).map(|s| s.display_name.clone());
    let monthly_average_cents = if monthly_history.is_empty() {
        0
    } else {
        monthly_history.iter().map(|m| m.total_cents).sum::<i64>() / monthly_history.len() as i64
    };

    IncomeOverview {
        total_annual_projected_cents: annual_projected_cents,
        monthly_average_cents,
        primary_source_name,
        source_count: sources.len(),
        trajectory: stability.trajectory,
        trajectory_description: trajectory_description(stability.trajectory).to_string(),
    }
}

fn summarize_sources(sources: &[IncomeSource]) -> Vec<IncomeSourceSummary> {
    let total: i64 = sources.iter().map(|s| s.total_cents).sum();
    let mut percentages: Vec<u8> = sources
        .iter()
        .map(|s| if total == 0 { 0 } else { (s.total_cents as f64 / total as f64 * 100.0).round() as u8 })
        .collect();

    if total != 0 && !percentages.is_empty() {
        let sum: i32 = percentages.iter().map(|&p| p as i32).sum();
        let drift = 100 - sum;
        if drift != 0 {
            if let Some((largest_idx, _)) =
                sources.iter().enumerate().max_by_key(|(_, s)| s.total_cents)
            {
                let adjusted = percentages[largest_idx] as i32 + drift;
                percentages[largest_idx] = adjusted.clamp(0, 100) as u8;
            }
        }
    }

    sources
        .iter()
        .zip(percentages)
        .map(|(s, contribution_percentage)| IncomeSourceSummary {
            id: s.id.clone(),
            display_name: s.display_name.clone(),
            source_type: s.source_type,
            total_cents: s.total_cents,
            monthly_avg_cents: s.monthly_avg_cents,
            contribution_percentage,
            recurring: s.recurring,
            verification: s.verification,
        })
        .collect()
}

/// Renders a finished report to bytes. Implementations need not produce
/// a visually rich document -- only a well-formed file a lender's
/// document pipeline can ingest and archive.
pub trait PdfRenderer {
    fn render(&self, report: &LenderReport) -> Vec<u8>;
}

/// Minimal PDF producer: a single page of plain text summarizing the
/// report, wrapped in just enough PDF structure for a conforming reader
/// to open it, plus a document info dictionary carrying the report id.
/// No fonts, images, or layout engine.
#[derive(Debug, Default, Clone, Copy)]
pub struct SimplePdfRenderer;

impl PdfRenderer for SimplePdfRenderer {
    fn render(&self, report: &LenderReport) -> Vec<u8> {
        let body = format!(
            "Income Readiness Report\\nBorrower: {}\\nGenerated: {}\\nOverall Score: {} ({:?})\\nAnnual Projected Income: ${:.2}",
            report.borrower.display_name_masked,
            report.metadata.generated_at.to_rfc3339(),
            report.loan_readiness_score.overall,
            report.loan_readiness_score.grade,
            report.income_overview.total_annual_projected_cents as f64 / 100.0,
        );
        let content_stream = format!("BT /F1 12 Tf 72 720 Td ({body}) Tj ET");

        let mut pdf = Vec::new();
        pdf.extend_from_slice(b"%PDF-1.4\n");
        let objects = [
            "1 0 obj\n<< /Type /Catalog /Pages 2 0 R >>\nendobj\n".to_string(),
            "2 0 obj\n<< /Type /Pages /Kids [3 0 R] /Count 1 >>\nendobj\n".to_string(),
            "3 0 obj\n<< /Type /Page /Parent 2 0 R /Resources << /Font << /F1 4 0 R >> >> /MediaBox [0 0 612 792] /Contents 5 0 R >>\nendobj\n".to_string(),
            "4 0 obj\n<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica >>\nendobj\n".to_string(),
            format!("5 0 obj\n<< /Length {} >>\nstream\n{}\nendstream\nendobj\n", content_stream.len(), content_stream),
            format!(
                "6 0 obj\n<< /Title (Income Readiness Report {}) /Creator (1099Pass) >>\nendobj\n",
                report.metadata.report_id
            ),
        ];

        let mut offsets = Vec::with_capacity(objects.len());
        for object in &objects {
            offsets.push(pdf.len());
            pdf.extend_from_slice(object.as_bytes());
        }

        let xref_start = pdf.len();
        pdf.extend_from_slice(format!("xref\n0 {}\n", objects.len() + 1).as_bytes());
        pdf.extend_from_slice(b"0000000000 65535 f \n");
        for offset in &offsets {
            pdf.extend_from_slice(format!("{offset:010} 00000 n \n").as_bytes());
        }
        pdf.extend_from_slice(
            format!(
                "trailer\n<< /Size {} /Root 1 0 R /Info 6 0 R >>\nstartxref\n{xref_start}\n%%EOF",
                objects.len() + 1
            )
            .as_bytes(),
        );

        pdf
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{GigPlatform, LoanType, ScoringConfig};
    use crate::schema::{DocumentType, LetterGrade, ScoreComponent};
    use chrono::{NaiveDate, TimeZone};

    fn borrower() -> BorrowerProfile {
        BorrowerProfile {
            borrower_id: "b1".into(),
            display_name: "Jordan Rivera".into(),
            city: "Austin".into(),
            state: "TX".into(),
            member_since: NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
        }
    }

    fn source(total: i64, name: &str) -> IncomeSource {
        IncomeSource {
            id: "source-0".into(),
            display_name: name.into(),
            source_type: crate::schema::IncomeSourceType::GigPlatform,
            gig_platform: Some(GigPlatform::Uber),
            total_cents: total,
            monthly_avg_cents: total,
            months_active: 6,
            first_seen: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            last_seen: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            recurring: true,
            verification: IncomeSourceVerification::Unverified,
            transaction_ids: vec![],
        }
    }

    fn dummy_score() -> LoanReadinessScore {
        LoanReadinessScore {
            overall: 72,
            grade: LetterGrade::C,
            breakdown: vec![ScoreComponent {
                name: "IncomeStability".into(),
                weight: 0.25,
                raw: 80,
                weighted: 20.0,
                factors: vec![],
                tips: vec![],
            }],
            recommendations: vec![],
            qualified: vec![LoanType::Personal],
            potential: vec![],
            thresholds: ScoringConfig::default().loan_thresholds,
            calculated_at: Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    fn dummy_debt() -> DebtAnalysis {
        DebtAnalysis { total_monthly_obligation_cents: 0, dti_percent: 0.0, obligations: vec![], caveat: "x".into() }
    }

    fn dummy_projection(final_cents: i64) -> AnnualizedProjection {
        AnnualizedProjection {
            method1_trailing_cents: final_cents,
            method2_weighted_cents: final_cents,
            method3_seasonal_cents: final_cents,
            method4_trend_cents: final_cents,
            final_cents,
            ci_low_cents: final_cents,
            ci_high_cents: final_cents,
            confidence: crate::schema::ConfidenceLevel::Medium,
            primary_method: crate::schema::ProjectionMethod::WeightedMovingAverage,
        }
    }

    fn dummy_risk() -> crate::schema::RiskAssessment {
        crate::schema::RiskAssessment {
            level: crate::schema::RiskLevel::Low,
            score: 30,
            positive_factors: vec![],
            risk_factors: vec![],
        }
    }

    fn stability() -> StabilityMetrics {
        StabilityMetrics {
            cv: 0.1,
            weighted_monthly_mean_cents: 400_000,
            yoy_growth_percent: 5.0,
            diversity_score: 50.0,
            seasonality_index: 0.0,
            trajectory: Trajectory::Stable,
            maintenance_probability: 0.7,
        }
    }

    #[test]
    fn masks_display_name_to_first_and_last_initial() {
        assert_eq!(mask_name("Jordan Rivera"), "Jordan R.");
        assert_eq!(mask_name("Madonna"), "Madonna");
    }

    #[test]
    fn unverified_when_no_documents_and_no_linked_accounts() {
        let now = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let report = compose(&borrower(), &[source(100_000, "Uber")], vec![], &stability(), dummy_projection(1_200_000), dummy_score(), dummy_risk(), dummy_debt(), vec![], 0, now);
        assert_eq!(report.borrower.verification_status, VerificationStatus::Unverified);
    }

    #[test]
    fn verified_when_documents_and_sources_are_verified() {
        let now = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let mut verified_source = source(100_000, "Uber");
        verified_source.verification = IncomeSourceVerification::Verified;
        let docs = vec![DocumentVerification { document_type: DocumentType::TaxReturns, status: DocumentStatus::Verified, verified_at: Some(now) }];
        let report = compose(&borrower(), &[verified_source], vec![], &stability(), dummy_projection(1_200_000), dummy_score(), dummy_risk(), dummy_debt(), docs, 1, now);
        assert_eq!(report.borrower.verification_status, VerificationStatus::Verified);
    }

    #[test]
    fn expires_ninety_days_after_generation() {
        let now = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let report = compose(&borrower(), &[], vec![], &stability(), dummy_projection(0), dummy_score(), dummy_risk(), dummy_debt(), vec![], 0, now);
        assert_eq!(report.metadata.expires_at, now + Duration::days(90));
    }

    #[test]
    fn disclaimer_names_1099pass_as_not_a_lender() {
        let now = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let report = compose(&borrower(), &[], vec![], &stability(), dummy_projection(0), dummy_score(), dummy_risk(), dummy_debt(), vec![], 0, now);
        assert!(report.disclaimer.contains("1099Pass is not a lender"));
    }

    #[test]
    fn contribution_percentages_sum_to_one_hundred() {
        let now = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let sources = vec![source(3333, "Uber"), source(3333, "Lyft"), source(3334, "DoorDash")];
        let report = compose(&borrower(), &sources, vec![], &stability(), dummy_projection(0), dummy_score(), dummy_risk(), dummy_debt(), vec![], 0, now);
        let sum: i32 = report.income_sources.iter().map(|s| s.contribution_percentage as i32).sum();
        assert_eq!(sum, 100);
    }

    #[test]
    fn simple_pdf_renderer_produces_well_formed_header_and_trailer() {
        let now = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let report = compose(&borrower(), &[], vec![], &stability(), dummy_projection(0), dummy_score(), dummy_risk(), dummy_debt(), vec![], 0, now);
        let bytes = SimplePdfRenderer.render(&report);
        assert!(bytes.starts_with(b"%PDF-1.4"));
        assert!(bytes.ends_with(b"%%EOF"));
        let text = String::from_utf8_lossy(&bytes);
        assert!(text.contains(&report.metadata.report_id.to_string()));
        assert!(text.contains("/Info 6 0 R"));
    }
}
