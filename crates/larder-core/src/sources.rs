//! # Read Paths
//!
//! Traits for the collaborators that feed records into the engine.
//!
//! ```text
//! ┌───────────────────┐     lots_for(location, item)    ┌───────────────┐
//! │ purchase records  │ ──────────────────────────────► │               │
//! ├───────────────────┤     rules_for(country)          │               │
//! │ tax reference data│ ──────────────────────────────► │  larder-core  │
//! ├───────────────────┤     recipe_for(menu item)       │   (engine)    │
//! │ recipe book       │ ──────────────────────────────► │               │
//! ├───────────────────┤     actual_usage(ingredient)    │               │
//! │ stock count       │ ──────────────────────────────► │               │
//! └───────────────────┘                                 └───────────────┘
//! ```
//!
//! The engine only borrows through these traits. Plain collections implement
//! them here so tests and small callers need no adapter; `larder-data`
//! implements them for its reference store.

use std::collections::HashMap;

use crate::tax::TaxRuleTable;
use crate::types::{PurchaseLot, Recipe, TaxRule};

/// Purchase lots scoped to one location and one stock item.
pub trait LotSource {
    /// Lots received for `stock_item_id` at `location_id`, in recorded order.
    fn lots_for<'a>(&'a self, location_id: &str, stock_item_id: &str) -> Vec<&'a PurchaseLot>;
}

/// The active tax rules of a jurisdiction.
pub trait TaxRuleSource {
    /// Rules for `country_code`, in any order.
    fn rules_for<'a>(&'a self, country_code: &str) -> Vec<&'a TaxRule>;
}

/// Recipes keyed by menu-item id.
pub trait RecipeSource {
    fn recipe_for(&self, menu_item_id: &str) -> Option<&Recipe>;
}

/// Physically counted usage keyed by ingredient id.
pub trait UsageSource {
    /// `None` when the ingredient was not counted.
    fn actual_usage(&self, ingredient_id: &str) -> Option<f64>;
}

// =============================================================================
// Collection Implementations
// =============================================================================

impl LotSource for [PurchaseLot] {
    fn lots_for<'a>(&'a self, location_id: &str, stock_item_id: &str) -> Vec<&'a PurchaseLot> {
        self.iter()
            .filter(|lot| lot.is_scoped_to(location_id, stock_item_id))
            .collect()
    }
}

impl LotSource for Vec<PurchaseLot> {
    fn lots_for<'a>(&'a self, location_id: &str, stock_item_id: &str) -> Vec<&'a PurchaseLot> {
        self.as_slice().lots_for(location_id, stock_item_id)
    }
}

impl TaxRuleSource for [TaxRule] {
    fn rules_for<'a>(&'a self, country_code: &str) -> Vec<&'a TaxRule> {
        self.iter().filter(|rule| rule.applies_to(country_code)).collect()
    }
}

impl TaxRuleSource for TaxRuleTable {
    fn rules_for<'a>(&'a self, country_code: &str) -> Vec<&'a TaxRule> {
        self.rules().rules_for(country_code)
    }
}

impl RecipeSource for HashMap<String, Recipe> {
    fn recipe_for(&self, menu_item_id: &str) -> Option<&Recipe> {
        self.get(menu_item_id)
    }
}

impl RecipeSource for [Recipe] {
    fn recipe_for(&self, menu_item_id: &str) -> Option<&Recipe> {
        self.iter().find(|recipe| recipe.menu_item_id == menu_item_id)
    }
}

impl UsageSource for HashMap<String, f64> {
    fn actual_usage(&self, ingredient_id: &str) -> Option<f64> {
        self.get(ingredient_id).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_slice_lot_source_scopes_by_location_and_item() {
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let lots = vec![
            PurchaseLot::new("flour", "kitchen", 10.0, 1.0, at),
            PurchaseLot::new("flour", "bar", 10.0, 2.0, at),
            PurchaseLot::new("sugar", "kitchen", 10.0, 3.0, at),
            PurchaseLot::new("flour", "kitchen", 5.0, 4.0, at),
        ];

        let scoped = lots.lots_for("kitchen", "flour");
        let costs: Vec<f64> = scoped.iter().map(|lot| lot.unit_cost).collect();
        assert_eq!(costs, vec![1.0, 4.0]);
        assert!(lots.lots_for("patio", "flour").is_empty());
    }

    #[test]
    fn test_tax_rule_slice_filters_country() {
        let rules = vec![
            TaxRule::simple("ZA", "VAT", 0.15, 1),
            TaxRule::simple("KE", "VAT", 0.16, 2),
        ];
        let selected = rules.as_slice().rules_for("za");
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].rate, 0.15);
    }

    #[test]
    fn test_recipe_sources() {
        let recipes = vec![Recipe::new("burger"), Recipe::new("fries")];
        assert!(recipes.as_slice().recipe_for("fries").is_some());
        assert!(recipes.as_slice().recipe_for("salad").is_none());

        let keyed: HashMap<String, Recipe> = recipes
            .into_iter()
            .map(|r| (r.menu_item_id.clone(), r))
            .collect();
        assert!(keyed.recipe_for("burger").is_some());
    }

    #[test]
    fn test_usage_source() {
        let counts = HashMap::from([("flour".to_string(), 12.5)]);
        assert_eq!(counts.actual_usage("flour"), Some(12.5));
        assert_eq!(counts.actual_usage("sugar"), None);
    }
}
