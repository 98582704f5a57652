//! # income-readiness-core
//!
//! A deterministic income-verification analytics pipeline for
//! gig-economy borrowers. Given raw bank/platform transaction history,
//! the pipeline classifies and groups income sources, builds a dense
//! monthly series with anomaly flags, computes stability/diversity/
//! seasonality metrics, projects annualized income with a confidence
//! interval, detects recurring obligations and debt-to-income, scores
//! loan readiness, and composes a lender-ready report.
//!
//! ## Core Concepts
//!
//! - **Pure pipeline**: every stage is a pure function over immutable
//!   inputs plus a caller-supplied [`catalog::PlatformCatalog`] and
//!   [`catalog::ScoringConfig`]; there is no global mutable state.
//! - **Cents everywhere**: money moves through the pipeline as signed
//!   `i64` cents; `f64` is confined to ratios, percentages, and weights.
//! - **Share tokens**: the one genuinely mutable entity, governed by
//!   [`share_token::ShareTokenManager`] behind a pluggable
//!   [`share_token::ShareTokenStore`].
//!
//! ## Example
//!
//! ```rust
//! use income_readiness_core::*;
//! use chrono::NaiveDate;
//!
//! let input = PipelineInput {
//!     transactions: vec![Transaction {
//!         id: "tx-1".to_string(),
//!         account_id: "acc-1".to_string(),
//!         amount_cents: 400_00,
//!         date: NaiveDate::from_ymd_opt(2025, 6, 15).unwrap(),
//!         name: "UBER TRIP".to_string(),
//!         merchant_name: None,
//!         category: vec![],
//!         pending: false,
//!         kind: TransactionKind::Income,
//!         source_hint: None,
//!     }],
//!     period_months: 6,
//!     as_of: NaiveDate::from_ymd_opt(2025, 6, 30).unwrap(),
//!     borrower: BorrowerProfile {
//!         borrower_id: "b-1".to_string(),
//!         display_name: "Jordan Rivera".to_string(),
//!         city: "Austin".to_string(),
//!         state: "TX".to_string(),
//!         member_since: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
//!     },
//!     documents: vec![],
//!     documentation_flags: DocumentationFlags::default(),
//!     target_loan_amount_cents: None,
//! };
//!
//! let pipeline = IncomeAnalyticsPipeline::default();
//! let report = pipeline.run(&input, &SystemClock).unwrap();
//! assert_eq!(report.income_sources.len(), 1);
//! ```

pub mod aggregator;
pub mod catalog;
pub mod classifier;
pub mod clock;
pub mod error;
pub mod grouper;
pub mod obligations;
pub mod pipeline;
pub mod projector;
pub mod report;
pub mod risk;
pub mod schema;
pub mod scoring;
pub mod share_token;
pub mod stability;
pub mod utils;

pub use catalog::{ComponentWeights, GigPlatform, LoanThreshold, LoanType, PlatformCatalog, PlatformEntry, ScoringConfig};
pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{AnalyticsError, Result, ShareTokenError, ShareTokenResult};
pub use pipeline::{run_pipeline, IncomeAnalyticsPipeline};
pub use report::{PdfRenderer, SimplePdfRenderer};
pub use schema::*;
pub use share_token::{InMemoryShareTokenStore, ShareToken, ShareTokenManager, ShareTokenStore};
