//! # Error Types
//!
//! Domain-specific error types for larder-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  larder-core errors (this file)                                        │
//! │  └── ValidationError  - Reference data / input validation failures     │
//! │                                                                         │
//! │  larder-data errors (separate crate)                                   │
//! │  └── DataError        - Config, file and fixture failures              │
//! │                                                                         │
//! │  Flow: ValidationError → DataError → caller / report binary            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Why So Few?
//! The calculation functions never fail: empty collections, zero
//! denominators and non-finite values all resolve to `0`. Errors only exist
//! for callers that choose to validate user input before calling the engine.

use thiserror::Error;

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Produced by the helpers in [`crate::validation`]. The engine itself never
/// returns these.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Value is NaN or infinite.
    #[error("{field} must be a finite number")]
    MustBeFinite { field: String },

    /// Value is below zero.
    #[error("{field} must not be negative (got {value})")]
    MustNotBeNegative { field: String, value: f64 },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max} (got {value})")]
    OutOfRange {
        field: String,
        min: f64,
        max: f64,
        value: f64,
    },

    /// Invalid format (e.g. a malformed country code).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// A recipe component points at a stock item that does not exist.
    ///
    /// ## When This Occurs
    /// ```text
    /// Recipe "burger"
    ///      │
    ///      ▼
    /// component: stock item "bun-brioche" (qty 1)
    ///      │
    ///      ▼
    /// stock item list has no "bun-brioche"
    ///      │
    ///      ▼
    /// UnknownStockItem { menu_item_id: "burger", stock_item_id: "bun-brioche" }
    /// ```
    #[error("Recipe {menu_item_id} references unknown stock item {stock_item_id}")]
    UnknownStockItem {
        menu_item_id: String,
        stock_item_id: String,
    },

    /// Two rules for one jurisdiction share a name, so `base_includes`
    /// references would be ambiguous.
    #[error("Duplicate tax rule '{name}' for {country_code}")]
    DuplicateRuleName { country_code: String, name: String },

    /// A rule's `base_includes` names a tax that is not applied before it.
    #[error("Tax rule '{rule}' ({country_code}) includes '{missing}', which is not applied earlier")]
    UnknownBaseComponent {
        country_code: String,
        rule: String,
        missing: String,
    },
}

impl ValidationError {
    /// Creates a Required error for a field.
    pub fn required(field: impl Into<String>) -> Self {
        ValidationError::Required {
            field: field.into(),
        }
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = ValidationError::UnknownStockItem {
            menu_item_id: "burger".to_string(),
            stock_item_id: "bun-brioche".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Recipe burger references unknown stock item bun-brioche"
        );
    }

    #[test]
    fn test_validation_error_messages() {
        assert_eq!(
            ValidationError::required("menu_item_id").to_string(),
            "menu_item_id is required"
        );

        let err = ValidationError::UnknownBaseComponent {
            country_code: "KE".to_string(),
            rule: "VAT".to_string(),
            missing: "Tourism Levy".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Tax rule 'VAT' (KE) includes 'Tourism Levy', which is not applied earlier"
        );
    }
}
