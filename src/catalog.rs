//! Process-wide, caller-constructed configuration: the gig-platform
//! pattern table and the loan-scoring weight/threshold tables.
//!
//! Both types are plain `Clone` values built once by the caller (or via
//! `::default()`) and borrowed by the pipeline for the duration of one
//! invocation -- there is no global/static catalog, matching the "no
//! legitimate global mutable state" design note.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Closed enum of supported gig platforms. Extending coverage means
/// adding a variant and a pattern list here, never adding a new type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GigPlatform {
    Uber,
    Lyft,
    DoorDash,
    Grubhub,
    Instacart,
    AmazonFlex,
    TaskRabbit,
    Fiverr,
    Upwork,
    Etsy,
    Shopify,
    Rover,
    Turo,
    Airbnb,
    Postmates,
    Shipt,
}

impl GigPlatform {
    /// Canonical brand name used for `IncomeSource::display_name`.
    pub fn display_name(&self) -> &'static str {
        match self {
            GigPlatform::Uber => "Uber",
            GigPlatform::Lyft => "Lyft",
            GigPlatform::DoorDash => "DoorDash",
            GigPlatform::Grubhub => "Grubhub",
            GigPlatform::Instacart => "Instacart",
            GigPlatform::AmazonFlex => "Amazon Flex",
            GigPlatform::TaskRabbit => "TaskRabbit",
            GigPlatform::Fiverr => "Fiverr",
            GigPlatform::Upwork => "Upwork",
            GigPlatform::Etsy => "Etsy",
            GigPlatform::Shopify => "Shopify",
            GigPlatform::Rover => "Rover",
            GigPlatform::Turo => "Turo",
            GigPlatform::Airbnb => "Airbnb",
            GigPlatform::Postmates => "Postmates",
            GigPlatform::Shipt => "Shipt",
        }
    }
}

/// One catalog row: a platform plus the lowercase substring patterns
/// matched against `concat(name, " ", merchant_name)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformEntry {
    pub platform: GigPlatform,
    pub patterns: Vec<String>,
}

/// The fixed catalog of gig platforms, in stable iteration order. Order
/// is the tie-break when transaction text matches more than one
/// platform's patterns, so entries must never be reordered without
/// considering that consequence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformCatalog {
    pub entries: Vec<PlatformEntry>,
}

impl Default for PlatformCatalog {
    fn default() -> Self {
        fn entry(platform: GigPlatform, patterns: &[&str]) -> PlatformEntry {
            PlatformEntry {
                platform,
                patterns: patterns.iter().map(|s| s.to_string()).collect(),
            }
        }

        Self {
            entries: vec![
                entry(GigPlatform::Uber, &["uber"]),
                entry(GigPlatform::Lyft, &["lyft"]),
                entry(GigPlatform::DoorDash, &["doordash", "door dash"]),
                entry(GigPlatform::Grubhub, &["grubhub", "grub hub"]),
                entry(GigPlatform::Instacart, &["instacart"]),
                entry(GigPlatform::AmazonFlex, &["amazon flex", "amzn flex"]),
                entry(GigPlatform::TaskRabbit, &["taskrabbit", "task rabbit"]),
                entry(GigPlatform::Fiverr, &["fiverr"]),
                entry(GigPlatform::Upwork, &["upwork"]),
                entry(GigPlatform::Etsy, &["etsy"]),
                entry(GigPlatform::Shopify, &["shopify"]),
                entry(GigPlatform::Rover, &["rover.com", "rover pet"]),
                entry(GigPlatform::Turo, &["turo"]),
                entry(GigPlatform::Airbnb, &["airbnb"]),
                entry(GigPlatform::Postmates, &["postmates"]),
                entry(GigPlatform::Shipt, &["shipt"]),
            ],
        }
    }
}

/// The five loan products the scorer qualifies a borrower for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoanType {
    Mortgage,
    Auto,
    Personal,
    Business,
    Heloc,
}

/// Recommended (qualified) and minimum (potential) overall-score
/// thresholds for one loan type.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LoanThreshold {
    pub recommended: u8,
    pub minimum: u8,
}

/// Weights for the six `LoanScorer` components. Must sum to 1.00.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ComponentWeights {
    pub income_stability: f64,
    pub income_trend: f64,
    pub income_diversity: f64,
    pub documentation_completeness: f64,
    pub income_level: f64,
    pub account_age: f64,
}

impl ComponentWeights {
    pub fn sum(&self) -> f64 {
        self.income_stability
            + self.income_trend
            + self.income_diversity
            + self.documentation_completeness
            + self.income_level
            + self.account_age
    }
}

impl Default for ComponentWeights {
    fn default() -> Self {
        Self {
            income_stability: 0.25,
            income_trend: 0.20,
            income_diversity: 0.15,
            documentation_completeness: 0.15,
            income_level: 0.15,
            account_age: 0.10,
        }
    }
}

/// Tunable constants and tables for [`crate::scoring::LoanScorer`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringConfig {
    pub weights: ComponentWeights,
    pub loan_thresholds: BTreeMap<LoanType, LoanThreshold>,
    /// Factor applied to a recommendation's raw potential-score gain to
    /// arrive at the narrated `potential_increase`. See `SPEC_FULL.md`
    /// §11 -- named rather than inlined so a tuning pass is one line.
    pub recommendation_realization_factor: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        let mut loan_thresholds = BTreeMap::new();
        loan_thresholds.insert(
            LoanType::Mortgage,
            LoanThreshold {
                recommended: 75,
                minimum: 60,
            },
        );
        loan_thresholds.insert(
            LoanType::Auto,
            LoanThreshold {
                recommended: 55,
                minimum: 40,
            },
        );
        loan_thresholds.insert(
            LoanType::Personal,
            LoanThreshold {
                recommended: 50,
                minimum: 35,
            },
        );
        loan_thresholds.insert(
            LoanType::Business,
            LoanThreshold {
                recommended: 65,
                minimum: 50,
            },
        );
        loan_thresholds.insert(
            LoanType::Heloc,
            LoanThreshold {
                recommended: 70,
                minimum: 55,
            },
        );

        Self {
            weights: ComponentWeights::default(),
            loan_thresholds,
            recommendation_realization_factor: 0.5,
        }
    }
}
