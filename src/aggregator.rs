//! Builds the dense month-by-month income series with per-source
//! decomposition and anomaly flags.

use std::collections::{BTreeMap, HashMap};

use crate::schema::{IncomeSource, MonthlyIncome, Transaction, TransactionKind, YearMonth};
use crate::utils::{dense_month_range, mean, population_stddev};

const ANOMALY_Z_THRESHOLD: f64 = 2.0;

/// Aggregates income transactions into a dense `[start, end]` month
/// series, attributing each dollar to the `IncomeSource` grouping that
/// owns its transaction id.
pub fn aggregate_monthly(
    sources: &[IncomeSource],
    transactions: &[Transaction],
    start: YearMonth,
    end: YearMonth,
) -> Vec<MonthlyIncome> {
    let tx_to_source: HashMap<&str, &str> = sources
        .iter()
        .flat_map(|s| s.transaction_ids.iter().map(move |id| (id.as_str(), s.id.as_str())))
        .collect();

    let months = dense_month_range(start, end);
    let mut by_month: BTreeMap<YearMonth, MonthlyIncome> = months
        .iter()
        .map(|&ym| {
            (
                ym,
                MonthlyIncome {
                    year_month: ym,
                    total_cents: 0,
                    by_source: BTreeMap::new(),
                    anomaly: false,
                    anomaly_reason: None,
                },
            )
        })
        .collect();

    for tx in transactions {
        if tx.kind != TransactionKind::Income || tx.pending {
            continue;
        }
        let ym = YearMonth::from_date(tx.date);
        let Some(entry) = by_month.get_mut(&ym) else {
            continue;
        };
        entry.total_cents += tx.amount_cents;
        if let Some(&source_id) = tx_to_source.get(tx.id.as_str()) {
            *entry.by_source.entry(source_id.to_string()).or_insert(0) += tx.amount_cents;
        }
    }

    flag_anomalies(&mut by_month);

    let mut result: Vec<MonthlyIncome> = by_month.into_values().collect();
    result.sort_by(|a, b| b.year_month.cmp(&a.year_month));
    result
}

fn flag_anomalies(by_month: &mut BTreeMap<YearMonth, MonthlyIncome>) {
    let totals: Vec<f64> = by_month.values().map(|m| m.total_cents as f64).collect();
    let mu = mean(&totals);
    let sigma = population_stddev(&totals);

    for month in by_month.values_mut() {
        let total = month.total_cents as f64;
        if sigma > 0.0 && (total - mu) / sigma > ANOMALY_Z_THRESHOLD {
            month.anomaly = true;
            month.anomaly_reason = Some("unusually high — possible one-time payment".to_string());
        } else if sigma > 0.0 && (total - mu) / sigma < -ANOMALY_Z_THRESHOLD && total > 0.0 {
            month.anomaly = true;
            month.anomaly_reason = Some("unusually low — possible seasonal dip".to_string());
        } else if month.total_cents == 0 {
            month.anomaly = true;
            month.anomaly_reason = Some("zero-income month".to_string());
        }
    }
}
