//! # Reference Store
//!
//! In-memory reference data for one reporting period: stock items, purchase
//! lots, recipes, ingredient costs, stock counts, sales and a tax table.
//!
//! ## Data Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  fixture.json ──► ReferenceStore::load ──► validate()                   │
//! │                                               │                         │
//! │                       ┌───────────────────────┼───────────────────┐     │
//! │                       ▼                       ▼                   ▼     │
//! │                  LotSource              RecipeSource         UsageSource│
//! │                       │                  TaxRuleSource            │     │
//! │                       ▼                       ▼                   ▼     │
//! │                simulate_sale      calculate_*_taxes     calculate_variance
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Fixture Format
//! ```json
//! {
//!   "stockItems":  [{ "id": "bun", "name": "Brioche bun", "unit": "count" }],
//!   "lots":        [{ "id": "l1", "stockItemId": "bun", "locationId": "kitchen",
//!                     "quantity": 100, "unitCost": 0.5,
//!                     "receivedAt": "2024-06-01T07:30:00Z" }],
//!   "recipes":     [{ "menuItemId": "burger",
//!                     "components": [{ "stockItemId": "bun", "quantity": 1 }] }],
//!   "menuPrices":  { "burger": 9.5 },
//!   "menuCategories": { "lager": "alcohol" },
//!   "sales":       [{ "menuItemId": "burger", "quantitySold": 40 }],
//!   "counts":      { "bun": 42 },
//!   "ingredients": [],
//!   "taxTable":    { "rules": [] }
//! }
//! ```
//! Every key is optional. With no `ingredients`, variance is costed from the
//! purchase history (see [`ReferenceStore::priced_ingredients`]).

use std::collections::HashMap;
use std::path::Path;

use larder_core::tax::TaxRuleTable;
use larder_core::validation::{
    validate_amount, validate_quantity, validate_recipe, validate_tax_rules,
};
use larder_core::{
    compute_cost_tiers, CostMode, Ingredient, InvoiceLine, LotSource, MenuItemSale, PurchaseLot,
    Recipe, RecipeSource, StockItem, TaxRule, TaxRuleSource, UsageSource,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{DataError, DataResult};

/// Reference data for one reporting period.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ReferenceStore {
    pub stock_items: Vec<StockItem>,
    pub lots: Vec<PurchaseLot>,
    pub recipes: Vec<Recipe>,
    /// Selling price per unit, keyed by menu-item id.
    pub menu_prices: HashMap<String, f64>,
    /// Invoice category (e.g. "alcohol"), keyed by menu-item id.
    pub menu_categories: HashMap<String, String>,
    pub sales: Vec<MenuItemSale>,
    /// Physically counted usage, keyed by ingredient id.
    pub counts: HashMap<String, f64>,
    /// Explicit ingredient costs. Empty means "derive from purchase history".
    pub ingredients: Vec<Ingredient>,
    pub tax_table: TaxRuleTable,
}

impl ReferenceStore {
    /// Parses a JSON fixture.
    pub fn from_json_str(json: &str) -> DataResult<Self> {
        let store: ReferenceStore = serde_json::from_str(json)?;
        debug!(
            stock_items = store.stock_items.len(),
            lots = store.lots.len(),
            recipes = store.recipes.len(),
            "Parsed reference data"
        );
        Ok(store)
    }

    /// Reads and validates a JSON fixture file.
    pub fn load(path: &Path) -> DataResult<Self> {
        let json = std::fs::read_to_string(path).map_err(|e| DataError::io(path, e))?;
        let store = Self::from_json_str(&json)?;
        store.validate()?;

        info!(?path, "Loaded reference data");
        Ok(store)
    }

    /// Runs every domain check over the data.
    ///
    /// Stops at the first problem.
    pub fn validate(&self) -> DataResult<()> {
        for recipe in &self.recipes {
            validate_recipe(recipe, &self.stock_items)?;
        }

        for lot in &self.lots {
            validate_quantity(&format!("lot {} quantity", lot.id), lot.quantity)?;
            validate_quantity(&format!("lot {} unit cost", lot.id), lot.unit_cost)?;
        }

        for (menu_item_id, price) in &self.menu_prices {
            validate_amount(&format!("price of {menu_item_id}"), *price)?;
        }

        for sale in &self.sales {
            validate_quantity(&format!("sales of {}", sale.menu_item_id), sale.quantity_sold)?;
        }

        for (ingredient_id, counted) in &self.counts {
            validate_quantity(&format!("count of {ingredient_id}"), *counted)?;
        }

        for ingredient in &self.ingredients {
            validate_quantity(&format!("cost of {}", ingredient.id), ingredient.cost_per_unit)?;
        }

        validate_tax_rules(self.tax_table.rules())?;

        Ok(())
    }

    // =========================================================================
    // Lookups
    // =========================================================================

    /// Finds a recipe by menu-item id.
    pub fn recipe(&self, menu_item_id: &str) -> DataResult<&Recipe> {
        self.recipe_for(menu_item_id)
            .ok_or_else(|| DataError::not_found("Recipe", menu_item_id))
    }

    /// Selling price of a menu item.
    pub fn menu_price(&self, menu_item_id: &str) -> DataResult<f64> {
        self.menu_prices
            .get(menu_item_id)
            .copied()
            .ok_or_else(|| DataError::not_found("Menu price", menu_item_id))
    }

    /// Finds a stock item by id.
    pub fn stock_item(&self, stock_item_id: &str) -> DataResult<&StockItem> {
        self.stock_items
            .iter()
            .find(|item| item.id == stock_item_id)
            .ok_or_else(|| DataError::not_found("Stock item", stock_item_id))
    }

    /// Ingredient costs for the variance report.
    ///
    /// Returns the explicit `ingredients` when present. Otherwise every stock
    /// item is priced from its purchase history at `location_id` using
    /// `cost_mode`, with the unit label as the ingredient unit.
    pub fn priced_ingredients(&self, location_id: &str, cost_mode: CostMode) -> Vec<Ingredient> {
        if !self.ingredients.is_empty() {
            return self.ingredients.clone();
        }

        self.stock_items
            .iter()
            .map(|item| Ingredient {
                id: item.id.clone(),
                name: item.name.clone(),
                unit: item.unit.label().to_string(),
                cost_per_unit: compute_cost_tiers(self.lots_for(location_id, &item.id))
                    .select(cost_mode),
            })
            .collect()
    }

    /// One invoice line per sale: `price × quantity`, tagged with the menu
    /// item's category. Sales of unpriced items are left out.
    pub fn invoice_lines(&self) -> Vec<InvoiceLine> {
        self.sales
            .iter()
            .filter_map(|sale| {
                let Some(price) = self.menu_prices.get(&sale.menu_item_id) else {
                    debug!(menu_item_id = %sale.menu_item_id, "No menu price, leaving off invoice");
                    return None;
                };
                let line = InvoiceLine::new(price * sale.quantity_sold);
                Some(match self.menu_categories.get(&sale.menu_item_id) {
                    Some(category) => line.in_category(category),
                    None => line,
                })
            })
            .collect()
    }
}

// =============================================================================
// Read-Path Sources
// =============================================================================

impl LotSource for ReferenceStore {
    fn lots_for<'a>(&'a self, location_id: &str, stock_item_id: &str) -> Vec<&'a PurchaseLot> {
        self.lots.lots_for(location_id, stock_item_id)
    }
}

impl RecipeSource for ReferenceStore {
    fn recipe_for(&self, menu_item_id: &str) -> Option<&Recipe> {
        self.recipes.as_slice().recipe_for(menu_item_id)
    }
}

impl UsageSource for ReferenceStore {
    fn actual_usage(&self, ingredient_id: &str) -> Option<f64> {
        self.counts.actual_usage(ingredient_id)
    }
}

impl TaxRuleSource for ReferenceStore {
    fn rules_for<'a>(&'a self, country_code: &str) -> Vec<&'a TaxRule> {
        self.tax_table.rules_for(country_code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use larder_core::{calculate_total_with_taxes, calculate_variance, simulate_sale};

    const FIXTURE: &str = r#"{
        "stockItems": [
            { "id": "bun", "name": "Brioche bun", "unit": "count" },
            { "id": "beef", "name": "Beef mince", "unit": "mass" }
        ],
        "lots": [
            { "id": "l1", "stockItemId": "bun", "locationId": "kitchen",
              "quantity": 100, "unitCost": 0.5, "receivedAt": "2024-06-01T07:30:00Z" },
            { "id": "l2", "stockItemId": "bun", "locationId": "kitchen",
              "quantity": 100, "unitCost": 0.7, "receivedAt": "2024-06-03T07:30:00Z" },
            { "id": "l3", "stockItemId": "beef", "locationId": "kitchen",
              "quantity": 5000, "unitCost": 0.01, "receivedAt": "2024-06-02T07:30:00Z",
              "supplier": "Farmers Co-op" }
        ],
        "recipes": [
            { "menuItemId": "burger",
              "components": [
                { "stockItemId": "bun", "quantity": 1 },
                { "stockItemId": "beef", "quantity": 150 }
              ] }
        ],
        "menuPrices": { "burger": 9.5 },
        "sales": [ { "menuItemId": "burger", "quantitySold": 40 } ],
        "counts": { "bun": 42, "beef": 6300 },
        "taxTable": { "rules": [
            { "countryCode": "ZA", "name": "VAT", "rate": 0.15, "applyOrder": 1 }
        ] }
    }"#;

    fn store() -> ReferenceStore {
        ReferenceStore::from_json_str(FIXTURE).unwrap()
    }

    #[test]
    fn test_fixture_parses_and_validates() {
        let store = store();
        assert_eq!(store.stock_items.len(), 2);
        assert_eq!(store.lots[2].supplier.as_deref(), Some("Farmers Co-op"));
        assert!(store.validate().is_ok());
    }

    #[test]
    fn test_empty_fixture() {
        let store = ReferenceStore::from_json_str("{}").unwrap();
        assert_eq!(store, ReferenceStore::default());
        assert!(store.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_unknown_component() {
        let mut store = store();
        store.recipes.push(Recipe::new("cheeseburger").with_component("cheese", 1.0));
        assert!(matches!(store.validate(), Err(DataError::Validation(_))));
    }

    #[test]
    fn test_validate_rejects_negative_count() {
        let mut store = store();
        store.counts.insert("bun".to_string(), -3.0);
        assert!(store.validate().is_err());
    }

    #[test]
    fn test_lookups() {
        let store = store();
        assert_eq!(store.recipe("burger").unwrap().components.len(), 2);
        assert_eq!(store.menu_price("burger").unwrap(), 9.5);
        assert_eq!(store.stock_item("beef").unwrap().name, "Beef mince");
        assert!(matches!(
            store.recipe("pizza"),
            Err(DataError::NotFound { .. })
        ));
    }

    #[test]
    fn test_store_drives_simulation() {
        let store = store();
        let recipe = store.recipe("burger").unwrap();
        let sim = simulate_sale(recipe, 2.0, 9.5, &store, "kitchen", CostMode::Latest);

        // bun 0.70 + 150 g beef × 0.01
        assert!((sim.cogs_each - 2.2).abs() < 1e-9);
        assert_eq!(sim.ingredient_costs[1].lot_count, 1);
    }

    #[test]
    fn test_store_drives_tax() {
        let result = calculate_total_with_taxes(100.0, "za", &store());
        assert_eq!(result.tax_breakdown.len(), 1);
        assert!((result.total - 115.0).abs() < 1e-9);
    }

    #[test]
    fn test_priced_ingredients_from_history() {
        let store = store();
        let ingredients = store.priced_ingredients("kitchen", CostMode::WeightedAvg);
        assert_eq!(ingredients.len(), 2);
        assert!((ingredients[0].cost_per_unit - 0.6).abs() < 1e-9);
        assert_eq!(ingredients[0].unit, "pc");
        assert_eq!(ingredients[1].unit, "g");

        let variance = calculate_variance(&store.sales, &store, &ingredients, &store);
        // bun: counted 42 vs 40 theoretical
        assert_eq!(variance[0].variance, 2.0);
        // beef: 6300 vs 6000
        assert_eq!(variance[1].variance, 300.0);
        assert!((variance[1].financial_loss - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_explicit_ingredients_win() {
        let mut store = store();
        store.ingredients = vec![Ingredient {
            id: "bun".to_string(),
            name: "Bun".to_string(),
            unit: "pc".to_string(),
            cost_per_unit: 0.55,
        }];
        let ingredients = store.priced_ingredients("kitchen", CostMode::Latest);
        assert_eq!(ingredients, store.ingredients);
    }

    #[test]
    fn test_invoice_lines() {
        let mut store = store();
        store.menu_prices.insert("lager".to_string(), 4.0);
        store.menu_categories.insert("lager".to_string(), "alcohol".to_string());
        store.sales.push(MenuItemSale::new("lager", 10.0));
        store.sales.push(MenuItemSale::new("unpriced-special", 1.0));

        let lines = store.invoice_lines();
        assert_eq!(
            lines,
            vec![
                InvoiceLine::new(380.0),
                InvoiceLine::new(40.0).in_category("alcohol"),
            ]
        );
    }

    #[test]
    fn test_sample_fixture_is_valid() {
        let store = ReferenceStore::from_json_str(include_str!("../fixtures/sample-period.json"))
            .unwrap();
        assert!(store.validate().is_ok());
        assert!(store.tax_table.is_empty());
        for sale in &store.sales {
            assert!(store.recipe(&sale.menu_item_id).is_ok());
            assert!(store.menu_price(&sale.menu_item_id).is_ok());
        }

        // lager was never counted
        let ingredients = store.priced_ingredients("kitchen", CostMode::Latest);
        let variance = calculate_variance(&store.sales, &store, &ingredients, &store);
        let lager = variance.iter().find(|v| v.ingredient_id == "lager-keg").unwrap();
        assert!(!lager.counted);
        assert_eq!(lager.variance, -70_000.0);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fixture.json");
        std::fs::write(&path, FIXTURE).unwrap();

        let store = ReferenceStore::load(&path).unwrap();
        assert_eq!(store.sales.len(), 1);

        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(ReferenceStore::load(&path), Err(DataError::Json(_))));
    }
}
