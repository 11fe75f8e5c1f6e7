//! # Cost Tier Calculator
//!
//! Reduces the purchase history of one stock item at one location to four
//! unit-cost figures.
//!
//! ```text
//! lots (one item, one location)          CostTiers
//! ┌──────────┬──────┬────────────┐       ┌──────────────┬───────────────────────┐
//! │ received │ qty  │ unit_cost  │       │ lowest       │ min(unit_cost)        │
//! ├──────────┼──────┼────────────┤  ──►  │ highest      │ max(unit_cost)        │
//! │ 03-01    │ 10   │ 2.00       │       │ weighted_avg │ Σ(cost×qty) / Σ(qty)  │
//! │ 03-08    │ 30   │ 2.40       │       │ latest       │ cost of newest lot    │
//! └──────────┴──────┴────────────┘       └──────────────┴───────────────────────┘
//! ```
//!
//! Scoping lots to an item and location is the caller's job; see
//! [`crate::sources::LotSource`].

use tracing::debug;

use crate::money::{finite_or_zero, safe_div};
use crate::types::{CostTiers, PurchaseLot};

/// Computes cost tiers for lots already scoped to one stock item at one
/// location.
///
/// ## Rules
/// - No lots: all tiers are zero
/// - Zero total quantity: `weighted_avg` is zero
/// - `latest` comes from the lot with the newest `received_at`; on a tie the
///   lot that appears first in the input wins
/// - Non-finite unit costs count as zero
///
/// ## Example
/// ```rust
/// use chrono::{TimeZone, Utc};
/// use larder_core::costing::compute_cost_tiers;
/// use larder_core::types::PurchaseLot;
///
/// let lots = vec![
///     PurchaseLot::new("flour", "kitchen", 10.0, 2.0, Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap()),
///     PurchaseLot::new("flour", "kitchen", 30.0, 2.4, Utc.with_ymd_and_hms(2024, 3, 8, 0, 0, 0).unwrap()),
/// ];
///
/// let tiers = compute_cost_tiers(&lots);
/// assert_eq!(tiers.lowest, 2.0);
/// assert_eq!(tiers.highest, 2.4);
/// assert_eq!(tiers.latest, 2.4);
/// assert!((tiers.weighted_avg - 2.3).abs() < 1e-12);
/// ```
pub fn compute_cost_tiers<'a, I>(lots: I) -> CostTiers
where
    I: IntoIterator<Item = &'a PurchaseLot>,
{
    let mut lots = lots.into_iter();
    let Some(first) = lots.next() else {
        return CostTiers::default();
    };

    let first_cost = finite_or_zero(first.unit_cost);
    let mut lowest = first_cost;
    let mut highest = first_cost;
    let mut total_value = first_cost * first.quantity;
    let mut total_quantity = first.quantity;
    let mut no_negative_quantities = first.quantity >= 0.0;
    let mut latest = first;
    let mut count = 1usize;

    for lot in lots {
        let cost = finite_or_zero(lot.unit_cost);
        lowest = lowest.min(cost);
        highest = highest.max(cost);
        total_value += cost * lot.quantity;
        total_quantity += lot.quantity;
        no_negative_quantities &= lot.quantity >= 0.0;
        // Strictly newer only, so the first of equal timestamps is kept.
        if lot.received_at > latest.received_at {
            latest = lot;
        }
        count += 1;
    }

    let observed_range = no_negative_quantities.then_some((lowest, highest));
    let weighted_avg = weighted_average(total_value, total_quantity, observed_range);
    let tiers = CostTiers {
        lowest,
        highest,
        weighted_avg,
        latest: finite_or_zero(latest.unit_cost),
    };

    debug!(
        stock_item_id = %first.stock_item_id,
        location_id = %first.location_id,
        lots = count,
        latest = tiers.latest,
        weighted_avg = tiers.weighted_avg,
        "Computed cost tiers"
    );
    tiers
}

/// `Σ(cost×qty) / Σ(qty)`, zero when the quantity sum is zero or the quotient
/// is not finite.
///
/// Clamped to `observed_range` when one is given (all quantities
/// non-negative).
fn weighted_average(
    total_value: f64,
    total_quantity: f64,
    observed_range: Option<(f64, f64)>,
) -> f64 {
    let average = safe_div(total_value, total_quantity);
    match observed_range {
        Some((lowest, highest)) if average != 0.0 => average.clamp(lowest, highest),
        _ => average,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
