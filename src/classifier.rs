//! Pure text classification of a transaction into an income-source type
//! and, when it matches, a specific gig platform.

use crate::catalog::{GigPlatform, PlatformCatalog};
use crate::schema::IncomeSourceType;

/// Classify `name`/`merchant_name` against the catalog. Never panics:
/// unrecognized text falls back to `(Contractor1099, None)`.
pub fn classify(
    catalog: &PlatformCatalog,
    name: &str,
    merchant_name: Option<&str>,
) -> (IncomeSourceType, Option<GigPlatform>) {
    let text = match merchant_name {
        Some(m) if !m.trim().is_empty() => format!("{name} {m}"),
        _ => name.to_string(),
    }
    .to_lowercase();

    for entry in &catalog.entries {
        if entry.patterns.iter().any(|p| text.contains(p.as_str())) {
            return (IncomeSourceType::GigPlatform, Some(entry.platform));
        }
    }

    if contains_any(&text, &["dividend", "interest", "investment"]) {
        return (IncomeSourceType::Investment, None);
    }
    if contains_any(&text, &["rent", "rental", "lease"]) {
        return (IncomeSourceType::Rental, None);
    }

    (IncomeSourceType::Contractor1099, None)
}

fn contains_any(text: &str, patterns: &[&str]) -> bool {
    patterns.iter().any(|p| text.contains(p))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_gig_platform_case_insensitively() {
        let catalog = PlatformCatalog::default();
        let (source_type, platform) = classify(&catalog, "UBER   TRIP 482", None);
        assert_eq!(source_type, IncomeSourceType::GigPlatform);
        assert_eq!(platform, Some(GigPlatform::Uber));
    }

    #[test]
    fn matches_using_merchant_name_too() {
        let catalog = PlatformCatalog::default();
        let (source_type, platform) = classify(&catalog, "Payout", Some("DoorDash Inc"));
        assert_eq!(source_type, IncomeSourceType::GigPlatform);
        assert_eq!(platform, Some(GigPlatform::DoorDash));
    }

    #[test]
    fn falls_back_to_investment_keyword() {
        let catalog = PlatformCatalog::default();
        let (source_type, platform) = classify(&catalog, "Dividend payment ACME", None);
        assert_eq!(source_type, IncomeSourceType::Investment);
        assert_eq!(platform, None);
    }

    #[test]
    fn falls_back_to_rental_keyword() {
        let catalog = PlatformCatalog::default();
        let (source_type, _) = classify(&catalog, "Monthly rent - 221B Baker St", None);
        assert_eq!(source_type, IncomeSourceType::Rental);
    }

    #[test]
    fn unknown_text_falls_back_to_contractor_1099() {
        let catalog = PlatformCatalog::default();
        let (source_type, platform) = classify(&catalog, "ACME Consulting LLC", None);
        assert_eq!(source_type, IncomeSourceType::Contractor1099);
        assert_eq!(platform, None);
    }

    #[test]
    fn earlier_catalog_entries_win_ties() {
        let catalog = PlatformCatalog::default();
        // "uber eats" matches Uber's pattern before any Postmates-style text would.
        let (_, platform) = classify(&catalog, "UBER EATS", None);
        assert_eq!(platform, Some(GigPlatform::Uber));
    }
}
