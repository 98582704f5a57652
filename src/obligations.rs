//! Detects recurring expense obligations and computes debt-to-income.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::schema::{DebtAnalysis, Obligation, ObligationCategory, ObligationFrequency, Transaction, TransactionKind};
use crate::utils::{mean, round_to, truncate_chars};

const CAVEAT: &str = "Obligations are inferred from transaction patterns and may be incomplete or \
include amounts that are not true debt payments; verify against borrower-provided statements \
before making a lending decision.";

struct Group<'a> {
    name: String,
    transactions: Vec<&'a Transaction>,
}

/// `annual_projection_cents` is the blended annualized projection from
/// the projector stage, used to compute `dti_percent`.
pub fn analyze(transactions: &[Transaction], annual_projection_cents: i64) -> DebtAnalysis {
    let mut groups: BTreeMap<String, Group> = BTreeMap::new();

    for tx in transactions {
        if tx.kind != TransactionKind::Expense || tx.pending {
            continue;
        }
        let key = truncate_chars(&tx.name.to_lowercase(), 25);
        groups
            .entry(key.clone())
            .or_insert_with(|| Group { name: key.clone(), transactions: Vec::new() })
            .transactions
            .push(tx);
    }

    let mut obligations: Vec<Obligation> = groups
        .into_values()
        .filter_map(|g| build_obligation(g))
        .collect();

    obligations.sort_by(|a, b| b.monthly_cents.cmp(&a.monthly_cents).then_with(|| a.name.cmp(&b.name)));

    let total_monthly_obligation_cents: i64 = obligations.iter().map(|o| o.monthly_cents).sum();
    let monthly_projection = annual_projection_cents as f64 / 12.0;
    let dti_percent = if monthly_projection == 0.0 {
        0.0
    } else {
        round_to(total_monthly_obligation_cents as f64 / monthly_projection * 100.0, 1)
    };

    DebtAnalysis {
        total_monthly_obligation_cents,
        dti_percent,
        obligations,
        caveat: CAVEAT.to_string(),
    }
}

fn build_obligation(group: Group) -> Option<Obligation> {
    if group.transactions.len() < 3 {
        return None;
    }
    // Amounts are negative for expenses; work in absolute value.
    let amounts: Vec<f64> = group.transactions.iter().map(|tx| tx.amount_cents.unsigned_abs() as f64).collect();
    let group_mean = mean(&amounts);
    if group_mean == 0.0 {
        return None;
    }
    let within_tolerance = amounts.iter().all(|&a| (a - group_mean).abs() <= group_mean * 0.10);
    if !within_tolerance {
        return None;
    }

    let category = categorize(&group.name);
    if category == ObligationCategory::Other && group_mean < 5000.0 {
        return None;
    }

    let mut dates: Vec<NaiveDate> = group.transactions.iter().map(|tx| tx.date).collect();
    dates.sort();
    let frequency = frequency_from_dates(&dates);
    let multiplier = match frequency {
        ObligationFrequency::Weekly => 4.33,
        ObligationFrequency::Biweekly => 2.17,
        ObligationFrequency::Monthly => 1.0,
    };
    let monthly_cents = (group_mean * multiplier).round() as i64;

    Some(Obligation {
        name: group.name,
        monthly_cents,
        frequency,
        category,
        estimated: true,
    })
}

fn categorize(name: &str) -> ObligationCategory {
    if contains_any(name, &["loan", "mortgage", "auto pay", "student"]) {
        ObligationCategory::Loan
    } else if contains_any(name, &["visa", "mastercard", "amex", "discover", "credit card"]) {
        ObligationCategory::CreditCard
    } else if contains_any(name, &["rent", "landlord", "property mgmt"]) {
        ObligationCategory::Rent
    } else if contains_any(name, &["electric", "gas", "water", "utility", "internet", "phone"]) {
        ObligationCategory::Utility
    } else {
        ObligationCategory::Other
    }
}

fn contains_any(text: &str, patterns: &[&str]) -> bool {
    patterns.iter().any(|p| text.contains(p))
}

fn frequency_from_dates(sorted_dates: &[NaiveDate]) -> ObligationFrequency {
    if sorted_dates.len() < 2 {
        return ObligationFrequency::Monthly;
    }
    let gaps: Vec<f64> = sorted_dates
        .windows(2)
        .map(|w| (w[1] - w[0]).num_days() as f64)
        .collect();
    let avg_gap = mean(&gaps);
    if avg_gap < 10.0 {
        ObligationFrequency::Weekly
    } else if avg_gap < 20.0 {
        ObligationFrequency::Biweekly
    } else {
        ObligationFrequency::Monthly
    }
}
