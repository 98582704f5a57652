//! Clusters income transactions into stable [`IncomeSource`] entities.

use std::collections::BTreeMap;

use chrono::Datelike;

use crate::catalog::{GigPlatform, PlatformCatalog};
use crate::classifier::classify;
use crate::schema::{IncomeSource, IncomeSourceType, IncomeSourceVerification, Transaction, TransactionKind};
use crate::utils::{round_cents, title_case, truncate_chars};

struct GroupAccumulator<'a> {
    key: String,
    source_type: IncomeSourceType,
    gig_platform: Option<GigPlatform>,
    transactions: Vec<&'a Transaction>,
}

/// Groups income transactions (`kind = Income`, non-pending) into
/// [`IncomeSource`] entities, sorted by `total_cents` descending with
/// stable tie-breaks, and assigns `source-N` ids post-sort.
pub fn group_sources(catalog: &PlatformCatalog, transactions: &[Transaction]) -> Vec<IncomeSource> {
    let mut groups: BTreeMap<String, GroupAccumulator> = BTreeMap::new();

    for tx in transactions {
        if tx.kind != TransactionKind::Income || tx.pending {
            continue;
        }

        let (source_type, platform) = classify(catalog, &tx.name, tx.merchant_name.as_deref());
        let key = grouping_key(tx, platform);

        groups
            .entry(key.clone())
            .or_insert_with(|| GroupAccumulator {
                key: key.clone(),
                source_type,
                gig_platform: platform,
                transactions: Vec::new(),
            })
            .transactions
            .push(tx);
    }

    let mut keyed: Vec<(String, IncomeSource)> = groups
        .into_values()
        .filter(|g| !g.transactions.is_empty())
        .map(|g| (g.key.clone(), build_source(g)))
        .collect();

    keyed.sort_by(|(key_a, a), (key_b, b)| {
        b.total_cents
            .cmp(&a.total_cents)
            .then_with(|| a.first_seen.cmp(&b.first_seen))
            .then_with(|| key_a.cmp(key_b))
    });

    let mut sources: Vec<IncomeSource> = keyed.into_iter().map(|(_, source)| source).collect();
    for (i, source) in sources.iter_mut().enumerate() {
        source.id = format!("source-{i}");
    }

    sources
}

fn grouping_key(tx: &Transaction, platform: Option<GigPlatform>) -> String {
    if let Some(p) = platform {
        return format!("platform:{p:?}").to_lowercase();
    }
    if let Some(merchant) = tx.merchant_name.as_deref() {
        let trimmed = merchant.trim();
        if !trimmed.is_empty() {
            return trimmed.to_lowercase();
        }
    }
    truncate_chars(tx.name.trim(), 20).to_lowercase()
}

fn build_source(group: GroupAccumulator) -> IncomeSource {
    let total_cents: i64 = group.transactions.iter().map(|tx| tx.amount_cents).sum();

    let mut distinct_months = std::collections::BTreeSet::new();
    for tx in &group.transactions {
        distinct_months.insert((tx.date.year(), tx.date.month()));
    }
    let months_active = distinct_months.len() as u16;

    let monthly_avg_cents = round_cents(total_cents as f64 / months_active.max(1) as f64);

    let first_seen = group.transactions.iter().map(|tx| tx.date).min().unwrap();
    let last_seen = group.transactions.iter().map(|tx| tx.date).max().unwrap();

    let recurring = group.transactions.len() >= months_active as usize;

    let display_name = match group.gig_platform {
        Some(p) => p.display_name().to_string(),
        None => title_case(&group.key),
    };

    IncomeSource {
        id: String::new(),
        display_name,
        source_type: group.source_type,
        gig_platform: group.gig_platform,
        total_cents,
        monthly_avg_cents,
        months_active,
        first_seen,
        last_seen,
        recurring,
        verification: IncomeSourceVerification::Unverified,
        transaction_ids: group.transactions.iter().map(|tx| tx.id.clone()).collect(),
    }
}
