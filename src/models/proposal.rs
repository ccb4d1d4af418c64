// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Client proposal model and the money arithmetic behind it.
//!
//! The stored subtotal/tax/total fields are a cache of the computation in
//! this module. Amounts are rounded to cents at every step: the tax amount
//! is computed from the already-rounded subtotal, and the grand total from
//! the rounded subtotal plus rounded tax. Deferring rounding to the end
//! can diverge by a cent, so the order here is load-bearing.

use serde::{Deserialize, Serialize};

/// A client-facing quote, stored in the `proposals` collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Proposal {
    /// Document ID
    pub id: String,
    pub title: String,
    pub client_name: String,
    pub client_email: String,
    #[serde(default)]
    pub client_phone: String,
    #[serde(default)]
    pub client_address: String,
    #[serde(default)]
    pub project_address: String,
    #[serde(default)]
    pub project_description: String,
    /// Estimated start (RFC3339)
    pub estimated_start_date: String,
    /// Estimated duration in days
    pub estimated_duration: u32,
    pub sections: Vec<ProposalSection>,
    pub subtotal: f64,
    /// Tax rate in percent
    pub tax_rate: f64,
    pub tax_amount: f64,
    pub total_amount: f64,
    #[serde(default)]
    pub terms: String,
    #[serde(default)]
    pub notes: String,
    pub status: ProposalStatus,
    /// Proposal validity date (RFC3339)
    pub valid_until: String,
    /// Owning user id
    pub user_id: String,
    pub created_at: String,
    pub updated_at: String,
}

/// One titled group of line items within a proposal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProposalSection {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub items: Vec<ProposalItem>,
    /// Cached sum of the items' totals
    pub subtotal: f64,
}

/// A single line item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProposalItem {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub quantity: f64,
    /// Unit label ("sq ft", "hours", ...)
    pub unit: String,
    pub unit_price: f64,
    /// Cached `round2(quantity * unit_price)`
    pub total_price: f64,
    pub category: ItemCategory,
}

/// Line item category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemCategory {
    Materials,
    Labor,
    Equipment,
    Other,
}

/// Proposal lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProposalStatus {
    Draft,
    Sent,
    Accepted,
    Rejected,
    Expired,
}

impl ProposalStatus {
    /// The persisted string form (used in Firestore filters).
    pub fn as_str(self) -> &'static str {
        match self {
            ProposalStatus::Draft => "draft",
            ProposalStatus::Sent => "sent",
            ProposalStatus::Accepted => "accepted",
            ProposalStatus::Rejected => "rejected",
            ProposalStatus::Expired => "expired",
        }
    }
}

/// Derived totals for a set of sections.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ProposalTotals {
    pub subtotal: f64,
    pub tax_amount: f64,
    pub total_amount: f64,
}

/// Round to cents.
pub fn round_currency(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Total for one line item.
pub fn calculate_item_total(quantity: f64, unit_price: f64) -> f64 {
    round_currency(quantity * unit_price)
}

/// Cached subtotal for a section: sum of its items' totals.
pub fn calculate_section_total(items: &[ProposalItem]) -> f64 {
    round_currency(items.iter().map(|item| item.total_price).sum())
}

/// Derive subtotal, tax amount, and grand total from the sections.
///
/// `tax_rate` is a percentage (8.5 means 8.5%).
pub fn calculate_totals(sections: &[ProposalSection], tax_rate: f64) -> ProposalTotals {
    let subtotal = round_currency(sections.iter().map(|section| section.subtotal).sum());
    let tax_amount = round_currency(subtotal * (tax_rate / 100.0));
    let total_amount = round_currency(subtotal + tax_amount);

    ProposalTotals {
        subtotal,
        tax_amount,
        total_amount,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(total_price: f64) -> ProposalItem {
        ProposalItem {
            id: "item".to_string(),
            name: "Item".to_string(),
            description: String::new(),
            quantity: 1.0,
            unit: "each".to_string(),
            unit_price: total_price,
            total_price,
            category: ItemCategory::Materials,
        }
    }

    fn section(subtotal: f64) -> ProposalSection {
        ProposalSection {
            id: "section".to_string(),
            title: "Section".to_string(),
            description: None,
            items: vec![],
            subtotal,
        }
    }

    #[test]
    fn test_item_total() {
        assert_eq!(calculate_item_total(3.0, 200.0), 600.0);
        assert_eq!(calculate_item_total(4.0, 12.25), 49.0);
        // 0.1 * 0.7 = 0.07000000000000001 without rounding
        assert_eq!(calculate_item_total(0.1, 0.7), 0.07);
    }

    #[test]
    fn test_section_total() {
        let items = vec![item(1250.0), item(150.0), item(800.0)];
        assert_eq!(calculate_section_total(&items), 2200.0);
    }

    #[test]
    fn test_totals_with_tax() {
        let sections = vec![section(2200.0)];
        let totals = calculate_totals(&sections, 8.5);

        assert_eq!(totals.subtotal, 2200.0);
        assert_eq!(totals.tax_amount, 187.0);
        assert_eq!(totals.total_amount, 2387.0);
    }

    #[test]
    fn test_totals_zero_rate() {
        let sections = vec![section(99.99), section(0.01)];
        let totals = calculate_totals(&sections, 0.0);

        assert_eq!(totals.subtotal, 100.0);
        assert_eq!(totals.tax_amount, 0.0);
        assert_eq!(totals.total_amount, 100.0);
    }

    #[test]
    fn test_tax_computed_from_rounded_subtotal() {
        // Subtotal rounds 10.004 + 10.004 = 20.008 -> 20.01; tax is then
        // taken from 20.01, not from the unrounded 20.008.
        let sections = vec![section(10.004), section(10.004)];
        let totals = calculate_totals(&sections, 10.0);

        assert_eq!(totals.subtotal, 20.01);
        assert_eq!(totals.tax_amount, 2.0);
        assert_eq!(totals.total_amount, 22.01);
    }

    #[test]
    fn test_empty_sections() {
        let totals = calculate_totals(&[], 8.5);
        assert_eq!(totals.subtotal, 0.0);
        assert_eq!(totals.tax_amount, 0.0);
        assert_eq!(totals.total_amount, 0.0);
    }
}
