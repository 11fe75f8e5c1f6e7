//! # larder-core: Costing & Taxation Engine for Larder
//!
//! This crate is the **heart** of the Larder back-office. It turns raw
//! purchase, recipe and sale records into cost tiers, cost of goods sold,
//! gross profit, tax breakdowns and stock-loss reports. Every operation is a
//! pure function with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Larder Architecture                              │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Back-office UI (React)                       │   │
//! │  │   Purchases ──► Recipes ──► Sale Simulator ──► Loss Report     │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ records in / reports out               │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ larder-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌────────────┐  ┌──────────┐  │   │
//! │  │   │  costing  │  │  recipe   │  │ simulation │  │   tax    │  │   │
//! │  │   │ CostTiers │  │ Deduction │  │ COGS / GP  │  │ breakdown│  │   │
//! │  │   └───────────┘  └───────────┘  └────────────┘  └──────────┘  │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌────────────┐                 │   │
//! │  │   │ variance  │  │  sources  │  │ validation │                 │   │
//! │  │   │ loss rpt  │  │ read paths│  │   rules    │                 │   │
//! │  │   └───────────┘  └───────────┘  └────────────┘                 │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO GLOBALS • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             larder-data (Config + Reference Data)               │   │
//! │  │         TOML tax tables, JSON fixtures, env overrides           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (PurchaseLot, Recipe, TaxRule, Variance, etc.)
//! - [`money`] - Non-finite guards and the `Money` display type (0-4 decimals)
//! - [`costing`] - Cost tier calculator
//! - [`recipe`] - Recipe explosion
//! - [`simulation`] - Sale simulator (COGS, gross profit)
//! - [`tax`] - Ordered, compounding tax rule engine
//! - [`variance`] - Theoretical vs. actual usage loss report
//! - [`sources`] - Read-path traits implemented by collaborators
//! - [`validation`] - Input validation for callers that accept user input
//! - [`error`] - Validation error types
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: same input (including ordering) = bit-identical output
//! 2. **No I/O**: reference data is passed in at call time
//! 3. **Total Functions**: degenerate input maps to zero, never to an error
//! 4. **No Poison**: NaN and ±Infinity are coerced to 0 at every division site
//!
//! ## Example Usage
//!
//! ```rust
//! use larder_core::tax::{calculate_total_with_taxes, TaxRuleTable};
//! use larder_core::types::TaxRule;
//!
//! let table = TaxRuleTable::default()
//!     .with_rule(TaxRule::simple("KE", "Tourism Levy", 0.015, 1))
//!     .with_rule(TaxRule::simple("KE", "VAT", 0.16, 2).including("Tourism Levy"));
//!
//! let result = calculate_total_with_taxes(1000.0, "KE", &table);
//! assert_eq!(result.tax_breakdown[0].amount, 15.0);
//! assert_eq!(result.tax_breakdown[1].amount, 162.4);
//! assert_eq!(result.total, 1177.4);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod costing;
pub mod error;
pub mod money;
pub mod recipe;
pub mod simulation;
pub mod sources;
pub mod tax;
pub mod types;
pub mod validation;
pub mod variance;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use larder_core::Money` instead of
// `use larder_core::money::Money`

pub use costing::compute_cost_tiers;
pub use error::ValidationError;
pub use money::Money;
pub use recipe::explode_recipe;
pub use simulation::simulate_sale;
pub use sources::{LotSource, RecipeSource, TaxRuleSource, UsageSource};
pub use tax::{calculate_invoice_taxes, calculate_total_with_taxes, TaxRuleTable};
pub use types::*;
pub use variance::calculate_variance;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Highest tax rate accepted by [`validation::validate_tax_rules`].
///
/// Rates are fractions, so 1.0 is a 100% tax.
pub const MAX_TAX_RATE: f64 = 1.0;

/// Longest jurisdiction code accepted (e.g. `CA-QC`).
pub const MAX_COUNTRY_CODE_LEN: usize = 6;
