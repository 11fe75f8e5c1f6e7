//! # Recipe Explosion
//!
//! Expands a recipe by a sale quantity into stock deductions.
//!
//! ```text
//! Recipe "margherita"            × 3 sold            Deductions
//! ┌────────────┬────────┐                        ┌────────────┬────────┐
//! │ dough      │ 250 g  │                        │ dough      │ 750 g  │
//! │ tomato     │  80 g  │        ─────►          │ tomato     │ 240 g  │
//! │ mozzarella │ 125 g  │                        │ mozzarella │ 375 g  │
//! └────────────┴────────┘                        └────────────┴────────┘
//! ```
//!
//! No cost lookup and no stock-level check happens here.

use crate::money::finite_or_zero;
use crate::types::{Deduction, Recipe};

/// Multiplies every component of `recipe` by `quantity`.
///
/// The result has exactly one entry per component, in component order.
/// Fractional quantities (half portions) are fine.
///
/// ## Example
/// ```rust
/// use larder_core::recipe::explode_recipe;
/// use larder_core::types::Recipe;
///
/// let recipe = Recipe::new("margherita")
///     .with_component("dough", 250.0)
///     .with_component("tomato", 80.0);
///
/// let deductions = explode_recipe(&recipe, 3.0);
/// assert_eq!(deductions[0].quantity, 750.0);
/// assert_eq!(deductions[1].stock_item_id, "tomato");
/// ```
pub fn explode_recipe(recipe: &Recipe, quantity: f64) -> Vec<Deduction> {
    recipe
        .components
        .iter()
        .map(|component| Deduction {
            stock_item_id: component.stock_item_id.clone(),
            quantity: finite_or_zero(component.quantity * quantity),
        })
        .collect()
}
