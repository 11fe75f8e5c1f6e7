//! # Sale Simulator
//!
//! Prices a (hypothetical or actual) sale of a menu item against purchase
//! history: cost of goods sold, gross profit and gross-profit percentage.
//!
//! ## Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Recipe ──► explode_recipe(qty) ──► deductions                          │
//! │                                         │                               │
//! │                     for each deduction  ▼                               │
//! │  lots.lots_for(location, item) ──► compute_cost_tiers ──► select(mode)  │
//! │                                         │                               │
//! │                                         ▼                               │
//! │                        line_cost = unit_cost × deduction qty            │
//! │                        total_cogs = Σ line_cost                         │
//! │                                         │                               │
//! │  total_sales = price × qty              ▼                               │
//! │  total_gp    = total_sales − total_cogs                                 │
//! │  gp_percent  = total_gp / total_sales × 100   (0 when no sales)         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Failure Policy
//! There is none. Empty purchase history, zero quantity and zero price all
//! resolve to zeros so margin reports render with sparse data.

use tracing::debug;

use crate::costing::compute_cost_tiers;
use crate::money::{finite_or_zero, safe_div};
use crate::recipe::explode_recipe;
use crate::sources::LotSource;
use crate::types::{CostMode, IngredientCost, Recipe, SaleSimulation};

/// Simulates selling `quantity` units of `recipe` at `selling_price_each`.
///
/// `lots` may hold the full purchase history of every location; only lots
/// for `location_id` and each component's stock item are used.
///
/// ## Edge Cases
/// - `quantity == 0`: `cogs_each` is 0 and `gp_each` equals the price
/// - `total_sales <= 0`: `gp_percent` is 0
/// - loss-making sale: `gp_percent` is negative, never clamped
///
/// ## Example
/// ```rust
/// use chrono::{TimeZone, Utc};
/// use larder_core::simulation::simulate_sale;
/// use larder_core::types::{CostMode, PurchaseLot, Recipe};
///
/// let at = Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap();
/// let lots = vec![PurchaseLot::new("patty", "kitchen", 40.0, 1.5, at)];
/// let recipe = Recipe::new("burger").with_component("patty", 2.0);
///
/// let sim = simulate_sale(&recipe, 10.0, 8.0, &lots, "kitchen", CostMode::Latest);
/// assert_eq!(sim.total_cogs, 30.0);
/// assert_eq!(sim.total_gp, 50.0);
/// assert_eq!(sim.gp_percent, 62.5);
/// ```
pub fn simulate_sale<L>(
    recipe: &Recipe,
    quantity: f64,
    selling_price_each: f64,
    lots: &L,
    location_id: &str,
    cost_mode: CostMode,
) -> SaleSimulation
where
    L: LotSource + ?Sized,
{
    let deductions = explode_recipe(recipe, quantity);

    let mut total_cogs = 0.0;
    let mut ingredient_costs = Vec::with_capacity(deductions.len());
    for deduction in &deductions {
        let scoped = lots.lots_for(location_id, &deduction.stock_item_id);
        let tiers = compute_cost_tiers(scoped.iter().copied());
        let unit_cost = tiers.select(cost_mode);
        let line_cost = finite_or_zero(unit_cost * deduction.quantity);
        total_cogs += line_cost;

        ingredient_costs.push(IngredientCost {
            stock_item_id: deduction.stock_item_id.clone(),
            quantity: deduction.quantity,
            unit_cost,
            line_cost,
            lot_count: u32::try_from(scoped.len()).unwrap_or(u32::MAX),
        });
    }
    let total_cogs = finite_or_zero(total_cogs);

    let total_sales = finite_or_zero(selling_price_each * quantity);
    let total_gp = finite_or_zero(total_sales - total_cogs);
    let gp_percent = if total_sales > 0.0 {
        finite_or_zero(safe_div(total_gp, total_sales) * 100.0)
    } else {
        0.0
    };

    let cogs_each = safe_div(total_cogs, quantity);
    let gp_each = finite_or_zero(selling_price_each - cogs_each);

    debug!(
        menu_item_id = %recipe.menu_item_id,
        location_id = %location_id,
        %cost_mode,
        quantity,
        total_cogs,
        gp_percent,
        "Simulated sale"
    );

    SaleSimulation {
        menu_item_id: recipe.menu_item_id.clone(),
        quantity,
        selling_price_each,
        cost_mode,
        cogs_each,
        gp_each,
        gp_percent,
        total_sales,
        total_cogs,
        total_gp,
        deductions,
        ingredient_costs,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
