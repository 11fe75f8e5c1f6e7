//! # Sample Tax Table
//!
//! Built-in rules used when no tax table file is configured. Good enough for
//! demos and tests; production deployments point `tax.rules_path` at their
//! own table.
//!
//! | Code  | Rules                                                        |
//! |-------|--------------------------------------------------------------|
//! | KE    | Tourism Levy 1.5%, then VAT 16% on subtotal + levy           |
//! | ZA    | VAT 15%                                                      |
//! | CA-ON | HST 13%                                                      |
//! | CA-QC | GST 5% and QST 9.975%, both on the subtotal                  |
//! | CA-PE | GST 5%, then PST 10% compounding on GST                     |

use larder_core::tax::TaxRuleTable;
use larder_core::TaxRule;

/// Returns the sample tax table.
pub fn default_tax_table() -> TaxRuleTable {
    TaxRuleTable::default()
        .with_rule(TaxRule::simple("KE", "Tourism Levy", 0.015, 1))
        .with_rule(TaxRule::simple("KE", "VAT", 0.16, 2).including("Tourism Levy"))
        .with_rule(TaxRule::simple("ZA", "VAT", 0.15, 1))
        .with_rule(TaxRule::simple("CA-ON", "HST", 0.13, 1))
        .with_rule(TaxRule::simple("CA-QC", "GST", 0.05, 1))
        .with_rule(TaxRule::simple("CA-QC", "QST", 0.09975, 2))
        .with_rule(TaxRule::simple("CA-PE", "GST", 0.05, 1))
        .with_rule(TaxRule::compound("CA-PE", "PST", 0.10, 2))
}

#[cfg(test)]
mod tests {
    use super::*;
    use larder_core::tax::calculate_total_with_taxes;
    use larder_core::validation::validate_tax_rules;

    #[test]
    fn test_default_table_is_valid() {
        let table = default_tax_table();
        assert!(validate_tax_rules(table.rules()).is_ok());
        assert_eq!(table.countries(), vec!["CA-ON", "CA-PE", "CA-QC", "KE", "ZA"]);
    }

    #[test]
    fn test_kenya_levy_feeds_vat() {
        let result = calculate_total_with_taxes(1000.0, "KE", &default_tax_table());
        assert_eq!(result.tax_breakdown.len(), 2);
        assert!((result.tax_breakdown[1].amount - 162.4).abs() < 1e-9);
        assert!((result.total - 1177.4).abs() < 1e-9);
    }

    #[test]
    fn test_pei_pst_compounds() {
        // 100 + 5 GST, PST 10% of 105
        let result = calculate_total_with_taxes(100.0, "CA-PE", &default_tax_table());
        assert!((result.tax_breakdown[1].amount - 10.5).abs() < 1e-9);
        assert!((result.total - 115.5).abs() < 1e-9);
    }
}
