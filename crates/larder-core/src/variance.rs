//! # Variance / Loss Engine
//!
//! Compares what the recipes say the kitchen should have used against what
//! the stock count says it did use, and prices the difference.
//!
//! ```text
//! sales ──► explode_recipe per sale ──► theoretical usage per ingredient
//!                                                │
//! stock count (actual usage) ────────────────────┤
//!                                                ▼
//!                     variance = actual − theoretical
//!                     loss     = variance × cost_per_unit
//!
//!   loss > 0  overuse (waste, theft, over-portioning)
//!   loss < 0  apparent underuse (over-count, missed delivery)
//! ```
//!
//! An ingredient with no count is reported with `actual_usage = 0` and
//! `counted = false`, so a skipped count shows up as a large negative
//! variance instead of disappearing from the report.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;
use ts_rs::TS;

use crate::money::finite_or_zero;
use crate::recipe::explode_recipe;
use crate::sources::{RecipeSource, UsageSource};
use crate::types::{Ingredient, MenuItemSale, Variance};

/// Builds the variance report for a period.
///
/// One record per ingredient referenced by the recipe of any sold item, in
/// the order ingredients are first met walking `sales` then each recipe's
/// components. Sales of items without a recipe contribute nothing.
/// Ingredients missing from `ingredients` are costed at zero and named by id.
///
/// ## Example
/// ```rust
/// use std::collections::HashMap;
/// use larder_core::variance::calculate_variance;
/// use larder_core::types::{Ingredient, MenuItemSale, Recipe};
///
/// let recipes = vec![Recipe::new("latte").with_component("milk", 200.0)];
/// let milk = Ingredient {
///     id: "milk".into(),
///     name: "Whole milk".into(),
///     unit: "ml".into(),
///     cost_per_unit: 0.002,
/// };
/// let counts = HashMap::from([("milk".to_string(), 2_300.0)]);
///
/// let report = calculate_variance(
///     &[MenuItemSale::new("latte", 10.0)],
///     recipes.as_slice(),
///     &[milk],
///     &counts,
/// );
/// assert_eq!(report[0].theoretical_usage, 2_000.0);
/// assert_eq!(report[0].variance, 300.0);
/// assert!((report[0].financial_loss - 0.6).abs() < 1e-12);
/// ```
pub fn calculate_variance<R, U>(
    sales: &[MenuItemSale],
    recipes: &R,
    ingredients: &[Ingredient],
    actual_usage: &U,
) -> Vec<Variance>
where
    R: RecipeSource + ?Sized,
    U: UsageSource + ?Sized,
{
    // Vec keeps first-seen order; the map only indexes into it.
    let mut theoretical: Vec<(String, f64)> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for sale in sales {
        let Some(recipe) = recipes.recipe_for(&sale.menu_item_id) else {
            debug!(menu_item_id = %sale.menu_item_id, "No recipe for sold item, skipping");
            continue;
        };
        for deduction in explode_recipe(recipe, sale.quantity_sold) {
            match index.entry(deduction.stock_item_id) {
                Entry::Occupied(slot) => theoretical[*slot.get()].1 += deduction.quantity,
                Entry::Vacant(slot) => {
                    theoretical.push((slot.key().clone(), deduction.quantity));
                    slot.insert(theoretical.len() - 1);
                }
            }
        }
    }

    let catalogue: HashMap<&str, &Ingredient> =
        ingredients.iter().map(|i| (i.id.as_str(), i)).collect();

    let report: Vec<Variance> = theoretical
        .into_iter()
        .map(|(ingredient_id, theoretical_usage)| {
            let theoretical_usage = finite_or_zero(theoretical_usage);
            let counted = actual_usage.actual_usage(&ingredient_id);
            let actual = finite_or_zero(counted.unwrap_or(0.0));
            let variance = finite_or_zero(actual - theoretical_usage);

            let (name, unit, cost_per_unit) = match catalogue.get(ingredient_id.as_str()) {
                Some(ingredient) => (
                    ingredient.name.clone(),
                    ingredient.unit.clone(),
                    finite_or_zero(ingredient.cost_per_unit),
                ),
                None => (ingredient_id.clone(), String::new(), 0.0),
            };

            Variance {
                ingredient_id,
                ingredient_name: name,
                unit,
                theoretical_usage,
                actual_usage: actual,
                variance,
                financial_loss: finite_or_zero(variance * cost_per_unit),
                counted: counted.is_some(),
            }
        })
        .collect();

    debug!(
        sales = sales.len(),
        ingredients = report.len(),
        "Calculated usage variance"
    );
    report
}

// =============================================================================
// Summary
// =============================================================================

/// Headline figures for a variance report.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct VarianceSummary {
    /// Σ financial loss, signed.
    pub total_loss: f64,
    /// Σ of positive losses (overuse only).
    pub overuse_loss: f64,
    /// Σ of negative losses (apparent underuse), as a negative number.
    pub underuse_value: f64,
    /// Ingredients that had no physical count.
    pub uncounted: Vec<String>,
}

/// Totals a variance report.
pub fn summarize_variance(report: &[Variance]) -> VarianceSummary {
    report
        .iter()
        .fold(VarianceSummary::default(), |mut summary, row| {
            summary.total_loss += row.financial_loss;
            if row.financial_loss > 0.0 {
                summary.overuse_loss += row.financial_loss;
            } else {
                summary.underuse_value += row.financial_loss;
            }
            if !row.counted {
                summary.uncounted.push(row.ingredient_id.clone());
            }
            summary
        })
}

// =============================================================================
// Unit Tests
// =============================================================================
