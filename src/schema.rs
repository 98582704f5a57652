//! The income-verification data model. One file holding every
//! `Serialize`/`Deserialize` struct and enum, mirroring the teacher's
//! `schema.rs` convention of keeping the whole wire shape in one place.

use std::collections::BTreeMap;
use std::convert::TryFrom;
use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::catalog::{GigPlatform, LoanType};
use crate::error::{AnalyticsError, Result};

/// A calendar year-month bucket, e.g. 2026-03. Bucketing always uses the
/// UTC calendar month of `Transaction::date` verbatim -- see
/// `SPEC_FULL.md` §11.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Self {
        debug_assert!((1..=12).contains(&month));
        Self { year, month }
    }

    pub fn from_date(date: NaiveDate) -> Self {
        use chrono::Datelike;
        Self::new(date.year(), date.month())
    }

    /// The year-month that immediately follows this one.
    pub fn succ(&self) -> Self {
        if self.month == 12 {
            Self::new(self.year + 1, 1)
        } else {
            Self::new(self.year, self.month + 1)
        }
    }

    /// Number of whole months between `self` (inclusive) and `other`
    /// (exclusive), assuming `other >= self`.
    pub fn months_until(&self, other: &Self) -> i64 {
        (other.year as i64 - self.year as i64) * 12 + (other.month as i64 - self.month as i64)
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl From<YearMonth> for String {
    fn from(ym: YearMonth) -> Self {
        ym.to_string()
    }
}

impl TryFrom<String> for YearMonth {
    type Error = String;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        let (y, m) = value
            .split_once('-')
            .ok_or_else(|| format!("invalid year-month string: {value}"))?;
        let year: i32 = y.parse().map_err(|_| format!("invalid year in {value}"))?;
        let month: u32 = m.parse().map_err(|_| format!("invalid month in {value}"))?;
        if !(1..=12).contains(&month) {
            return Err(format!("month out of range in {value}"));
        }
        Ok(YearMonth { year, month })
    }
}

impl Serialize for YearMonth {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for YearMonth {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        YearMonth::try_from(s).map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Income,
    Expense,
    Transfer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IncomeSourceType {
    GigPlatform,
    Contractor1099,
    SelfEmployment,
    Investment,
    Rental,
    Other,
}

/// A single bank or platform transaction. Immutable, input-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    pub account_id: String,
    pub amount_cents: i64,
    pub date: NaiveDate,
    pub name: String,
    pub merchant_name: Option<String>,
    #[serde(default)]
    pub category: Vec<String>,
    pub pending: bool,
    pub kind: TransactionKind,
    #[serde(default)]
    pub source_hint: Option<IncomeSourceType>,
}

impl Transaction {
    pub fn classification_text(&self) -> String {
        match &self.merchant_name {
            Some(m) if !m.trim().is_empty() => format!("{} {}", self.name, m),
            _ => self.name.clone(),
        }
        .to_lowercase()
    }

    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(AnalyticsError::MalformedTransaction {
                id: self.id.clone(),
                reason: "name is empty".to_string(),
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IncomeSourceVerification {
    Verified,
    Unverified,
    Pending,
}

/// One clustered income-producing entity (a gig platform, a recurring
/// client, an investment account, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncomeSource {
    pub id: String,
    pub display_name: String,
    pub source_type: IncomeSourceType,
    pub gig_platform: Option<GigPlatform>,
    pub total_cents: i64,
    pub monthly_avg_cents: i64,
    pub months_active: u16,
    pub first_seen: NaiveDate,
    pub last_seen: NaiveDate,
    pub recurring: bool,
    pub verification: IncomeSourceVerification,
    pub transaction_ids: Vec<String>,
}

/// One month's aggregated income, decomposed by source. The full series
/// is dense: every month in the analysis period appears, even at zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyIncome {
    pub year_month: YearMonth,
    pub total_cents: i64,
    pub by_source: BTreeMap<String, i64>,
    pub anomaly: bool,
    pub anomaly_reason: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trajectory {
    Volatile,
    Seasonal,
    Growing,
    Declining,
    Stable,
}

/// Stability/diversity/seasonality metrics computed over the dense
/// monthly income series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StabilityMetrics {
    pub cv: f64,
    pub weighted_monthly_mean_cents: i64,
    pub yoy_growth_percent: f64,
    pub diversity_score: f64,
    pub seasonality_index: f64,
    pub trajectory: Trajectory,
    pub maintenance_probability: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceLevel {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectionMethod {
    Trailing,
    WeightedMovingAverage,
    Seasonal,
    Trend,
}

/// The four-method annualized income projection and its blend.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnnualizedProjection {
    pub method1_trailing_cents: i64,
    pub method2_weighted_cents: i64,
    pub method3_seasonal_cents: i64,
    pub method4_trend_cents: i64,
    pub final_cents: i64,
    pub ci_low_cents: i64,
    pub ci_high_cents: i64,
    pub confidence: ConfidenceLevel,
    pub primary_method: ProjectionMethod,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObligationFrequency {
    Weekly,
    Biweekly,
    Monthly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObligationCategory {
    Loan,
    CreditCard,
    Rent,
    Utility,
    Other,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Obligation {
    pub name: String,
    pub monthly_cents: i64,
    pub frequency: ObligationFrequency,
    pub category: ObligationCategory,
    pub estimated: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DebtAnalysis {
    pub total_monthly_obligation_cents: i64,
    pub dti_percent: f64,
    pub obligations: Vec<Obligation>,
    pub caveat: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Moderate,
    Elevated,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub level: RiskLevel,
    pub score: i32,
    pub positive_factors: Vec<String>,
    pub risk_factors: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreComponent {
    pub name: String,
    pub weight: f64,
    pub raw: u8,
    pub weighted: f64,
    pub factors: Vec<String>,
    pub tips: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub category: String,
    pub action: String,
    pub potential_increase: u8,
    pub priority: Priority,
    pub timeframe: String,
}

/// Letter grades ordered worst-to-best so the derived `Ord` satisfies
/// the grade-monotonicity invariant directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LetterGrade {
    F,
    D,
    C,
    CPlus,
    B,
    BPlus,
    A,
    APlus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanReadinessScore {
    pub overall: u8,
    pub grade: LetterGrade,
    pub breakdown: Vec<ScoreComponent>,
    pub recommendations: Vec<Recommendation>,
    pub qualified: Vec<LoanType>,
    pub potential: Vec<LoanType>,
    pub thresholds: BTreeMap<LoanType, crate::catalog::LoanThreshold>,
    pub calculated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentType {
    TaxReturns,
    Form1099,
    BankStatements,
    W2,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentStatus {
    Verified,
    Pending,
    NotProvided,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentVerification {
    pub document_type: DocumentType,
    pub status: DocumentStatus,
    pub verified_at: Option<DateTime<Utc>>,
}

/// Boolean documentation flags consumed by [`crate::scoring::LoanScorer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DocumentationFlags {
    pub tax_returns: bool,
    pub has_1099: bool,
    pub bank_statements: bool,
    pub w2: bool,
    pub other: bool,
    pub linked_accounts: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    Final,
    Expired,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationStatus {
    Verified,
    PartiallyVerified,
    Unverified,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportMetadata {
    pub report_id: Uuid,
    pub borrower_id: String,
    pub generated_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub version: String,
    pub status: ReportStatus,
}

/// Non-financial borrower profile supplied by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BorrowerProfile {
    pub borrower_id: String,
    pub display_name: String,
    pub city: String,
    pub state: String,
    pub member_since: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BorrowerSummary {
    pub display_name_masked: String,
    pub city: String,
    pub state: String,
    pub member_since: NaiveDate,
    pub verification_status: VerificationStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncomeOverview {
    pub total_annual_projected_cents: i64,
    pub monthly_average_cents: i64,
    pub primary_source_name: Option<String>,
    pub source_count: usize,
    pub trajectory: Trajectory,
    pub trajectory_description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncomeSourceSummary {
    pub id: String,
    pub display_name: String,
    pub source_type: IncomeSourceType,
    pub total_cents: i64,
    pub monthly_avg_cents: i64,
    pub contribution_percentage: u8,
    pub recurring: bool,
    pub verification: IncomeSourceVerification,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LenderReport {
    pub metadata: ReportMetadata,
    pub borrower: BorrowerSummary,
    pub income_overview: IncomeOverview,
    pub income_sources: Vec<IncomeSourceSummary>,
    pub monthly_history: Vec<MonthlyIncome>,
    pub loan_readiness_score: LoanReadinessScore,
    pub stability_metrics: StabilityMetrics,
    pub annualized_projection: AnnualizedProjection,
    pub risk_assessment: RiskAssessment,
    pub debt_to_income: DebtAnalysis,
    pub documents: Vec<DocumentVerification>,
    pub disclaimer: String,
}

/// Everything a single pipeline invocation needs, gathered in one place
/// the way the teacher gathers `SparseFinancialHistory` before calling
/// `process_financial_history`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineInput {
    pub transactions: Vec<Transaction>,
    pub period_months: u32,
    pub as_of: NaiveDate,
    pub borrower: BorrowerProfile,
    pub documents: Vec<DocumentVerification>,
    pub documentation_flags: DocumentationFlags,
    pub target_loan_amount_cents: Option<i64>,
}
