//! # Validation Module
//!
//! Input validation for callers that accept user input.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Back-office forms (TypeScript)                               │
//! │  ├── Basic format checks (empty, length)                               │
//! │  └── Immediate user feedback                                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Reference data load (larder-data)                            │
//! │  └── THIS MODULE: recipes, tax tables, quantities                      │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Engine (costing, tax, variance)                              │
//! │  └── NO validation: any numeric input maps to a defined output         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The engine never calls these. It stays total over its input domain and
//! leaves domain checks to whoever collects the data.
//!
//! ## Usage
//! ```rust
//! use larder_core::validation::{validate_country_code, validate_quantity};
//!
//! assert!(validate_country_code("KE").is_ok());
//! assert!(validate_quantity("quantity", -1.0).is_err());
//! ```

use std::collections::HashSet;

use crate::error::{ValidationError, ValidationResult};
use crate::types::{Recipe, StockItem, TaxRule};
use crate::{MAX_COUNTRY_CODE_LEN, MAX_TAX_RATE};

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a monetary amount: any finite number, negatives allowed.
pub fn validate_amount(field: &str, value: f64) -> ValidationResult<()> {
    if !value.is_finite() {
        return Err(ValidationError::MustBeFinite {
            field: field.to_string(),
        });
    }
    Ok(())
}

/// Validates a quantity: finite and not negative. Fractions are fine.
///
/// ## Example
/// ```rust
/// use larder_core::validation::validate_quantity;
///
/// assert!(validate_quantity("quantity", 0.5).is_ok());
/// assert!(validate_quantity("quantity", 0.0).is_ok());
/// assert!(validate_quantity("quantity", f64::NAN).is_err());
/// ```
pub fn validate_quantity(field: &str, value: f64) -> ValidationResult<()> {
    validate_amount(field, value)?;

    if value < 0.0 {
        return Err(ValidationError::MustNotBeNegative {
            field: field.to_string(),
            value,
        });
    }

    Ok(())
}

// =============================================================================
// String Validators
// =============================================================================

/// Validates a jurisdiction code.
///
/// ## Rules
/// - Two ASCII uppercase letters (ISO 3166-1 alpha-2)
/// - Optionally `-` and a 1-3 character uppercase/digit subdivision (`CA-QC`)
pub fn validate_country_code(code: &str) -> ValidationResult<()> {
    if code.trim().is_empty() {
        return Err(ValidationError::required("country_code"));
    }

    let invalid = |reason: &str| ValidationError::InvalidFormat {
        field: "country_code".to_string(),
        reason: reason.to_string(),
    };

    if code.len() > MAX_COUNTRY_CODE_LEN {
        return Err(invalid("too long"));
    }

    let (country, subdivision) = match code.split_once('-') {
        Some((country, subdivision)) => (country, Some(subdivision)),
        None => (code, None),
    };

    if country.len() != 2 || !country.chars().all(|c| c.is_ascii_uppercase()) {
        return Err(invalid("must start with two uppercase letters"));
    }

    if let Some(subdivision) = subdivision {
        let valid = (1..=3).contains(&subdivision.len())
            && subdivision
                .chars()
                .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit());
        if !valid {
            return Err(invalid("subdivision must be 1-3 uppercase letters or digits"));
        }
    }

    Ok(())
}

// =============================================================================
// Reference Data Validators
// =============================================================================

/// Validates a recipe against the known stock items.
///
/// ## Rules
/// - `menu_item_id` is not empty
/// - Every component references an existing stock item
/// - Every component quantity is finite and not negative
pub fn validate_recipe(recipe: &Recipe, stock_items: &[StockItem]) -> ValidationResult<()> {
    if recipe.menu_item_id.trim().is_empty() {
        return Err(ValidationError::required("menu_item_id"));
    }

    let known: HashSet<&str> = stock_items.iter().map(|item| item.id.as_str()).collect();

    for component in &recipe.components {
        if !known.contains(component.stock_item_id.as_str()) {
            return Err(ValidationError::UnknownStockItem {
                menu_item_id: recipe.menu_item_id.clone(),
                stock_item_id: component.stock_item_id.clone(),
            });
        }
        validate_quantity(
            &format!("{}.{}", recipe.menu_item_id, component.stock_item_id),
            component.quantity,
        )?;
    }

    Ok(())
}

/// Validates a set of tax rules (any number of jurisdictions).
///
/// ## Rules
/// - Country code is well formed
/// - Name is not empty and unique within its jurisdiction
/// - Rate is finite and within `0..=MAX_TAX_RATE`
/// - Every `base_includes` name is a rule of the same jurisdiction with a
///   strictly lower `apply_order`
pub fn validate_tax_rules(rules: &[TaxRule]) -> ValidationResult<()> {
    let mut seen: HashSet<(String, &str)> = HashSet::new();

    for rule in rules {
        validate_country_code(&rule.country_code)?;

        if rule.name.trim().is_empty() {
            return Err(ValidationError::required("name"));
        }

        validate_amount(&rule.name, rule.rate)?;
        if !(0.0..=MAX_TAX_RATE).contains(&rule.rate) {
            return Err(ValidationError::OutOfRange {
                field: rule.name.clone(),
                min: 0.0,
                max: MAX_TAX_RATE,
                value: rule.rate,
            });
        }

        if !seen.insert((rule.country_code.to_ascii_uppercase(), rule.name.as_str())) {
            return Err(ValidationError::DuplicateRuleName {
                country_code: rule.country_code.clone(),
                name: rule.name.clone(),
            });
        }
    }

    for rule in rules {
        for included in &rule.base_includes {
            let applied_earlier = rules.iter().any(|earlier| {
                earlier.applies_to(&rule.country_code)
                    && &earlier.name == included
                    && earlier.apply_order < rule.apply_order
            });
            if !applied_earlier {
                return Err(ValidationError::UnknownBaseComponent {
                    country_code: rule.country_code.clone(),
                    rule: rule.name.clone(),
                    missing: included.clone(),
                });
            }
        }
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
