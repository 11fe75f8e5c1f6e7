//! # Tax Rule Engine
//!
//! Applies an ordered, possibly compounding set of jurisdiction tax rules to
//! a subtotal or to the lines of an invoice.
//!
//! ## Rule Walk
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  rules_for(country) ──► stable sort by apply_order                      │
//! │                                                                         │
//! │  running = subtotal                                                     │
//! │  for rule in rules:                                                     │
//! │      base = subtotal                      (simple)                      │
//! │           | running                       (compound)                    │
//! │           | subtotal + Σ named earlier    (base_includes)               │
//! │      amount = base × rate                                               │
//! │      breakdown.push({ name, amount })                                   │
//! │      running += amount                                                  │
//! │  total = running                                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Worked Example (levy, then VAT on subtotal + levy)
//! ```text
//! subtotal              1000.00
//! Tourism Levy  1.5%  ×  1000.00            =   15.00
//! VAT          16%    × (1000.00 + 15.00)   =  162.40
//! total                                       1177.40
//! ```
//!
//! ## Category-Gated Rules
//! A rule with a `line_filter` is evaluated per invoice line: each included
//! line contributes `line.amount × rate` and the contributions are summed
//! into one breakdown entry. Restaurant invoices use this for an alcohol
//! surcharge on top of a flat tax on every line.
//!
//! No rounding happens here; `total` is exactly `subtotal` plus each amount
//! in apply order.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::money::finite_or_zero;
use crate::sources::TaxRuleSource;
use crate::types::{InvoiceLine, LineFilter, TaxCalculationResult, TaxLine, TaxRule};

// =============================================================================
// Tax Rule Table
// =============================================================================

/// The tax rules of every jurisdiction the business trades in.
///
/// Passed into the engine at call time; there is no global table.
///
/// ## TOML Shape
/// ```toml
/// [[rules]]
/// countryCode = "KE"
/// name = "Tourism Levy"
/// rate = 0.015
/// applyOrder = 1
///
/// [[rules]]
/// countryCode = "KE"
/// name = "VAT"
/// rate = 0.16
/// applyOrder = 2
/// baseIncludes = ["Tourism Levy"]
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaxRuleTable {
    #[serde(default)]
    rules: Vec<TaxRule>,
}

impl TaxRuleTable {
    pub fn new(rules: Vec<TaxRule>) -> Self {
        TaxRuleTable { rules }
    }

    /// Adds a rule.
    pub fn with_rule(mut self, rule: TaxRule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Adds several rules.
    pub fn extend(&mut self, rules: impl IntoIterator<Item = TaxRule>) {
        self.rules.extend(rules);
    }

    pub fn rules(&self) -> &[TaxRule] {
        &self.rules
    }

    /// Distinct jurisdiction codes, sorted.
    pub fn countries(&self) -> Vec<&str> {
        let mut codes: Vec<&str> = self.rules.iter().map(|r| r.country_code.as_str()).collect();
        codes.sort_unstable();
        codes.dedup();
        codes
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

// =============================================================================
// Invoice Preset
// =============================================================================

/// Flat tax on every invoice line plus a surcharge on one category.
///
/// Builds two independent non-compound rules; the surcharge is gated on the
/// line category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InvoiceTaxPreset {
    pub tax_name: String,
    pub tax_rate: f64,
    pub surcharge_name: String,
    pub surcharge_rate: f64,
    pub surcharge_category: String,
}

impl Default for InvoiceTaxPreset {
    fn default() -> Self {
        InvoiceTaxPreset {
            tax_name: "Sales Tax".to_string(),
            tax_rate: 0.08,
            surcharge_name: "Alcohol Surcharge".to_string(),
            surcharge_rate: 0.02,
            surcharge_category: "alcohol".to_string(),
        }
    }
}

impl InvoiceTaxPreset {
    /// The preset's rules for a jurisdiction.
    pub fn rules(&self, country_code: &str) -> Vec<TaxRule> {
        vec![
            TaxRule::simple(country_code, &self.tax_name, self.tax_rate, 1),
            TaxRule::simple(country_code, &self.surcharge_name, self.surcharge_rate, 2)
                .gated(LineFilter::category(&self.surcharge_category)),
        ]
    }
}

// =============================================================================
// Calculation
// =============================================================================

/// Applies a jurisdiction's tax rules to a subtotal.
///
/// With no rules for `country_code` the subtotal passes through untaxed.
/// The subtotal is treated as one uncategorised line, so category-gated
/// rules contribute zero.
///
/// ## Example
/// ```rust
/// use larder_core::tax::{calculate_total_with_taxes, TaxRuleTable};
/// use larder_core::types::TaxRule;
///
/// let table = TaxRuleTable::default().with_rule(TaxRule::simple("ZA", "VAT", 0.15, 1));
///
/// let taxed = calculate_total_with_taxes(200.0, "ZA", &table);
/// assert_eq!(taxed.tax_breakdown[0].amount, 30.0);
/// assert_eq!(taxed.total, 230.0);
///
/// let untaxed = calculate_total_with_taxes(100.0, "XX", &table);
/// assert!(untaxed.tax_breakdown.is_empty());
/// assert_eq!(untaxed.total, 100.0);
/// ```
pub fn calculate_total_with_taxes<S>(
    subtotal: f64,
    country_code: &str,
    rules: &S,
) -> TaxCalculationResult
where
    S: TaxRuleSource + ?Sized,
{
    let subtotal = finite_or_zero(subtotal);
    let lines = [InvoiceLine::new(subtotal)];
    apply_rules(subtotal, &lines, rules.rules_for(country_code), country_code)
}

/// Applies a jurisdiction's tax rules to the lines of an invoice.
///
/// The subtotal is the sum of line amounts. Ungated rules behave exactly as
/// in [`calculate_total_with_taxes`]; gated rules only see included lines.
pub fn calculate_invoice_taxes<S>(
    lines: &[InvoiceLine],
    country_code: &str,
    rules: &S,
) -> TaxCalculationResult
where
    S: TaxRuleSource + ?Sized,
{
    let subtotal = finite_or_zero(lines.iter().map(|line| finite_or_zero(line.amount)).sum());
    apply_rules(subtotal, lines, rules.rules_for(country_code), country_code)
}

fn apply_rules(
    subtotal: f64,
    lines: &[InvoiceLine],
    mut rules: Vec<&TaxRule>,
    country_code: &str,
) -> TaxCalculationResult {
    // sort_by_key is stable: equal apply_order keeps source order
    rules.sort_by_key(|rule| rule.apply_order);

    let mut running_total = subtotal;
    let mut tax_breakdown: Vec<TaxLine> = Vec::with_capacity(rules.len());

    for rule in rules {
        let amount = finite_or_zero(rule_amount(rule, subtotal, running_total, lines, &tax_breakdown));
        running_total += amount;
        tax_breakdown.push(TaxLine {
            name: rule.name.clone(),
            amount,
        });
    }

    debug!(
        country_code = %country_code,
        subtotal,
        taxes = tax_breakdown.len(),
        total = running_total,
        "Applied tax rules"
    );

    TaxCalculationResult {
        subtotal,
        tax_breakdown,
        total: running_total,
    }
}

fn rule_amount(
    rule: &TaxRule,
    subtotal: f64,
    running_total: f64,
    lines: &[InvoiceLine],
    applied: &[TaxLine],
) -> f64 {
    let included = included_amounts(&rule.base_includes, applied);

    match &rule.line_filter {
        Some(filter) => {
            let line_tax: f64 = lines
                .iter()
                .filter(|line| filter.matches(line))
                .map(|line| finite_or_zero(line.amount) * rule.rate)
                .sum();
            line_tax + included * rule.rate
        }
        None if !rule.base_includes.is_empty() => (subtotal + included) * rule.rate,
        None if rule.compound => running_total * rule.rate,
        None => subtotal * rule.rate,
    }
}

/// Σ amounts of earlier breakdown entries named in `names`. Names not yet
/// applied contribute nothing.
fn included_amounts(names: &[String], applied: &[TaxLine]) -> f64 {
    names
        .iter()
        .flat_map(|name| applied.iter().filter(move |line| &line.name == name))
        .map(|line| line.amount)
        .sum()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn kenya() -> TaxRuleTable {
        TaxRuleTable::default()
            .with_rule(TaxRule::simple("KE", "VAT", 0.16, 2).including("Tourism Levy"))
            .with_rule(TaxRule::simple("KE", "Tourism Levy", 0.015, 1))
    }

    fn names(result: &TaxCalculationResult) -> Vec<&str> {
        result.tax_breakdown.iter().map(|l| l.name.as_str()).collect()
    }

    #[test]
    fn test_no_rules_passthrough() {
        let result = calculate_total_with_taxes(100.0, "XX", &kenya());
        assert_eq!(
            result,
            TaxCalculationResult {
                subtotal: 100.0,
                tax_breakdown: vec![],
                total: 100.0
            }
        );
    }

    #[test]
    fn test_single_simple_rule() {
        let rules = vec![TaxRule::simple("ZA", "VAT", 0.15, 1)];
        let result = calculate_total_with_taxes(200.0, "ZA", rules.as_slice());
        assert_eq!(
            result.tax_breakdown,
            vec![TaxLine {
                name: "VAT".to_string(),
                amount: 30.0
            }]
        );
        assert_eq!(result.total, 230.0);
    }

    #[test]
    fn test_levy_then_vat_on_subtotal_plus_levy() {
        let result = calculate_total_with_taxes(1000.0, "KE", &kenya());
        assert_eq!(names(&result), vec!["Tourism Levy", "VAT"]);
        assert_eq!(result.tax_breakdown[0].amount, 15.0);
        assert_eq!(result.tax_breakdown[1].amount, 162.4);
        assert_eq!(result.total, 1177.4);
    }

    #[test]
    fn test_simple_rules_use_original_subtotal() {
        let table = TaxRuleTable::default()
            .with_rule(TaxRule::simple("CA", "GST", 0.05, 1))
            .with_rule(TaxRule::simple("CA", "PST", 0.07, 2));
        let result = calculate_total_with_taxes(100.0, "CA", &table);
        assert_eq!(result.tax_breakdown[1].amount, 100.0 * 0.07);
        assert_eq!(result.total, 100.0 + 100.0 * 0.05 + 100.0 * 0.07);
    }

    #[test]
    fn test_compound_rule_uses_running_total() {
        let table = TaxRuleTable::default()
            .with_rule(TaxRule::simple("QC", "GST", 0.05, 1))
            .with_rule(TaxRule::compound("QC", "QST", 0.10, 2));
        let result = calculate_total_with_taxes(100.0, "QC", &table);
        // 0.10 × (100 + 5)
        assert!((result.tax_breakdown[1].amount - 10.5).abs() < 1e-9);
    }

    #[test]
    fn test_breakdown_follows_apply_order_with_stable_ties() {
        let table = TaxRuleTable::default()
            .with_rule(TaxRule::simple("XY", "C", 0.01, 3))
            .with_rule(TaxRule::simple("XY", "A1", 0.01, 1))
            .with_rule(TaxRule::simple("XY", "B", 0.01, 2))
            .with_rule(TaxRule::simple("XY", "A2", 0.01, 1));
        let result = calculate_total_with_taxes(50.0, "XY", &table);
        assert_eq!(names(&result), vec!["A1", "A2", "B", "C"]);
    }

    #[test]
    fn test_total_equals_subtotal_plus_breakdown_exactly() {
        let table = TaxRuleTable::default()
            .with_rule(TaxRule::simple("ZZ", "One", 0.0725, 1))
            .with_rule(TaxRule::compound("ZZ", "Two", 0.013, 2))
            .with_rule(TaxRule::simple("ZZ", "Three", 0.031, 3).including("One"));
        let result = calculate_total_with_taxes(123.45, "ZZ", &table);

        let mut expected = result.subtotal;
        for line in &result.tax_breakdown {
            expected += line.amount;
        }
        assert_eq!(result.total.to_bits(), expected.to_bits());
    }

    #[test]
    fn test_base_include_of_unapplied_rule_contributes_nothing() {
        let table = TaxRuleTable::default()
            .with_rule(TaxRule::simple("KE", "VAT", 0.16, 1).including("Tourism Levy"));
        let result = calculate_total_with_taxes(100.0, "KE", &table);
        assert_eq!(result.tax_breakdown[0].amount, 16.0);
    }

    #[test]
    fn test_non_finite_subtotal_is_zero() {
        let result = calculate_total_with_taxes(f64::NAN, "KE", &kenya());
        assert_eq!(result.subtotal, 0.0);
        assert_eq!(result.total, 0.0);
    }

    #[test]
    fn test_gated_rule_only_taxes_matching_lines() {
        let rules = InvoiceTaxPreset {
            tax_name: "Sales Tax".to_string(),
            tax_rate: 0.10,
            surcharge_name: "Alcohol Surcharge".to_string(),
            surcharge_rate: 0.05,
            surcharge_category: "alcohol".to_string(),
        }
        .rules("US");

        let lines = vec![
            InvoiceLine::new(40.0).in_category("food"),
            InvoiceLine::new(20.0).in_category("alcohol"),
            InvoiceLine::new(40.0).in_category("Alcohol"),
        ];
        let result = calculate_invoice_taxes(&lines, "US", rules.as_slice());

        assert_eq!(result.subtotal, 100.0);
        assert_eq!(names(&result), vec!["Sales Tax", "Alcohol Surcharge"]);
        assert_eq!(result.tax_breakdown[0].amount, 10.0);
        assert_eq!(result.tax_breakdown[1].amount, 20.0 * 0.05 + 40.0 * 0.05);
        assert_eq!(result.total, 100.0 + 10.0 + (20.0 * 0.05 + 40.0 * 0.05));
    }

    #[test]
    fn test_gated_rule_adds_included_taxes_to_matching_lines() {
        let rules = vec![
            TaxRule::simple("US", "Levy", 0.10, 1),
            TaxRule::simple("US", "Surcharge", 0.05, 2)
                .including("Levy")
                .gated(LineFilter::category("alcohol")),
        ];
        let lines = vec![
            InvoiceLine::new(60.0),
            InvoiceLine::new(40.0).in_category("alcohol"),
        ];
        let result = calculate_invoice_taxes(&lines, "US", rules.as_slice());

        assert_eq!(names(&result), vec!["Levy", "Surcharge"]);
        assert!((result.tax_breakdown[0].amount - 10.0).abs() < 1e-9);
        // 0.05 × (40 + 10)
        assert!((result.tax_breakdown[1].amount - 2.5).abs() < 1e-9);
        assert!((result.total - 112.5).abs() < 1e-9);
    }

    #[test]
    fn test_gated_rule_ignores_compound_flag() {
        let simple = vec![
            TaxRule::simple("US", "Sales Tax", 0.10, 1),
            TaxRule::simple("US", "Surcharge", 0.05, 2).gated(LineFilter::category("alcohol")),
        ];
        let compound = vec![
            TaxRule::simple("US", "Sales Tax", 0.10, 1),
            TaxRule::compound("US", "Surcharge", 0.05, 2).gated(LineFilter::category("alcohol")),
        ];
        let lines = vec![
            InvoiceLine::new(60.0),
            InvoiceLine::new(40.0).in_category("alcohol"),
        ];

        let as_simple = calculate_invoice_taxes(&lines, "US", simple.as_slice());
        let as_compound = calculate_invoice_taxes(&lines, "US", compound.as_slice());

        assert_eq!(as_compound, as_simple);
        assert!((as_compound.tax_breakdown[1].amount - 2.0).abs() < 1e-9);
        assert!((as_compound.total - 112.0).abs() < 1e-9);
    }

    #[test]
    fn test_gated_rule_on_plain_subtotal_is_zero() {
        let rules = InvoiceTaxPreset::default().rules("US");
        let result = calculate_total_with_taxes(100.0, "US", rules.as_slice());
        assert_eq!(result.tax_breakdown.len(), 2);
        assert_eq!(result.tax_breakdown[1].amount, 0.0);
    }

    #[test]
    fn test_invoice_without_gated_rules_matches_subtotal_path() {
        let lines = vec![InvoiceLine::new(600.0), InvoiceLine::new(400.0).in_category("food")];
        let by_lines = calculate_invoice_taxes(&lines, "KE", &kenya());
        let by_subtotal = calculate_total_with_taxes(1000.0, "KE", &kenya());
        assert_eq!(by_lines, by_subtotal);
    }

    #[test]
    fn test_table_countries_and_toml() {
        let table = kenya().with_rule(TaxRule::simple("ZA", "VAT", 0.15, 1));
        assert_eq!(table.countries(), vec!["KE", "ZA"]);
        assert_eq!(table.len(), 3);

        let parsed: TaxRuleTable = toml_like_json();
        assert_eq!(parsed.rules()[1].base_includes, vec!["Tourism Levy".to_string()]);
    }

    /// Optional keys may be left out.
    fn toml_like_json() -> TaxRuleTable {
        serde_json::from_value(serde_json::json!({
            "rules": [
                { "countryCode": "KE", "name": "Tourism Levy", "rate": 0.015, "applyOrder": 1 },
                { "countryCode": "KE", "name": "VAT", "rate": 0.16, "applyOrder": 2,
                  "baseIncludes": ["Tourism Levy"] }
            ]
        }))
        .unwrap()
    }

    #[test]
    fn test_idempotent() {
        let table = kenya();
        assert_eq!(
            calculate_total_with_taxes(87.5, "KE", &table),
            calculate_total_with_taxes(87.5, "KE", &table)
        );
    }
}
