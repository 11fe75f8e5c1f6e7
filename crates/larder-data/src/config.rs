//! # Engine Configuration
//!
//! Back-office settings that choose how the engine is driven: which
//! jurisdiction's taxes apply, which cost figure to price at, which location
//! to cost against.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     LARDER_COUNTRY=KE                                                  │
//! │     LARDER_COST_MODE=weightedAvg                                       │
//! │     LARDER_LOCATION=kitchen                                            │
//! │     LARDER_TAX_RULES=/etc/larder/tax.toml                              │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/larder/engine.toml (Linux)                               │
//! │     ~/Library/Application Support/com.larder.larder/engine.toml (macOS)│
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! [company]
//! name = "Mama's Kitchen"
//! country_code = "KE"
//! currency_code = "KES"
//! currency_symbol = "KSh "
//! currency_decimals = 2
//!
//! [costing]
//! default_mode = "weightedAvg"
//! default_location = "kitchen"
//!
//! [tax]
//! rules_path = "/etc/larder/tax.toml"
//!
//! [tax.invoice]
//! tax_name = "Sales Tax"
//! tax_rate = 0.08
//! surcharge_name = "Alcohol Surcharge"
//! surcharge_rate = 0.02
//! surcharge_category = "alcohol"
//! ```

use std::path::{Path, PathBuf};

use larder_core::tax::{InvoiceTaxPreset, TaxRuleTable};
use larder_core::validation::{validate_country_code, validate_tax_rules};
use larder_core::{CostMode, Money, TaxRule};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::defaults::default_tax_table;
use crate::error::{DataError, DataResult};

// =============================================================================
// Company Settings
// =============================================================================

/// The business the engine reports for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompanySettings {
    /// Trading name (report headers).
    pub name: String,

    /// Jurisdiction whose tax rules apply.
    pub country_code: String,

    /// Currency code (ISO 4217).
    pub currency_code: String,

    /// Currency symbol, including any trailing space.
    pub currency_symbol: String,

    /// Number of decimal places for currency.
    pub currency_decimals: u8,
}

impl Default for CompanySettings {
    fn default() -> Self {
        CompanySettings {
            name: "Larder Demo Kitchen".to_string(),
            country_code: "KE".to_string(),
            currency_code: "KES".to_string(),
            currency_symbol: "KSh ".to_string(),
            currency_decimals: 2,
        }
    }
}

impl CompanySettings {
    /// Formats an amount in the company currency.
    ///
    /// Rounds half away from zero to `currency_decimals`; non-finite
    /// amounts format as zero.
    ///
    /// ## Example
    /// ```rust
    /// use larder_data::config::CompanySettings;
    ///
    /// let company = CompanySettings::default();
    /// assert_eq!(company.format_currency(1177.4), "KSh 1177.40");
    /// assert_eq!(company.format_currency(-0.5), "-KSh 0.50");
    /// ```
    pub fn format_currency(&self, amount: f64) -> String {
        Money::from_amount_in(amount, self.currency_decimals).with_symbol(&self.currency_symbol)
    }
}

// =============================================================================
// Costing Settings
// =============================================================================

/// Defaults for sale simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CostingSettings {
    /// Cost figure ingredients are priced at.
    pub default_mode: CostMode,

    /// Location whose purchase history is used.
    pub default_location: String,
}

impl Default for CostingSettings {
    fn default() -> Self {
        CostingSettings {
            default_mode: CostMode::default(),
            default_location: "kitchen".to_string(),
        }
    }
}

// =============================================================================
// Tax Settings
// =============================================================================

/// Where tax rules come from.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaxSettings {
    /// TOML tax table (`[[rules]]`). Built-in sample table when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rules_path: Option<PathBuf>,

    /// Flat tax plus category surcharge for itemised invoices.
    pub invoice: InvoiceTaxPreset,
}

// =============================================================================
// Main Engine Configuration
// =============================================================================

/// Complete engine configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub company: CompanySettings,

    #[serde(default)]
    pub costing: CostingSettings,

    #[serde(default)]
    pub tax: TaxSettings,
}

impl EngineConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (engine.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> DataResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading engine config from file");
                let contents =
                    std::fs::read_to_string(&path).map_err(|e| DataError::io(&path, e))?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides(|key| std::env::var(key).ok());
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load engine config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Saves configuration to file, creating parent directories.
    pub fn save(&self, config_path: Option<PathBuf>) -> DataResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| DataError::InvalidConfig("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| DataError::io(parent, e))?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents).map_err(|e| DataError::io(&path, e))?;

        info!(?path, "Engine config saved");
        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> DataResult<()> {
        validate_country_code(&self.company.country_code)?;

        if self.company.currency_decimals > Money::MAX_DECIMALS {
            return Err(DataError::InvalidConfig(format!(
                "currency_decimals must be at most {}, got {}",
                Money::MAX_DECIMALS, self.company.currency_decimals
            )));
        }

        if self.costing.default_location.trim().is_empty() {
            return Err(DataError::InvalidConfig(
                "default_location must not be empty".into(),
            ));
        }

        validate_tax_rules(&self.invoice_rules())?;

        Ok(())
    }

    /// Applies environment overrides read through `lookup`.
    fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(country) = lookup("LARDER_COUNTRY") {
            let country = country.trim().to_ascii_uppercase();
            debug!(country = %country, "Overriding country from environment");
            self.company.country_code = country;
        }

        if let Some(mode) = lookup("LARDER_COST_MODE") {
            match mode.parse::<CostMode>() {
                Ok(parsed) => {
                    debug!(mode = %parsed, "Overriding cost mode from environment");
                    self.costing.default_mode = parsed;
                }
                Err(_) => warn!(mode = %mode, "Unknown cost mode in environment"),
            }
        }

        if let Some(location) = lookup("LARDER_LOCATION") {
            self.costing.default_location = location;
        }

        if let Some(path) = lookup("LARDER_TAX_RULES") {
            debug!(path = %path, "Overriding tax rules path from environment");
            self.tax.rules_path = Some(PathBuf::from(path));
        }
    }

    /// Returns the default config file path.
    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "larder", "larder")
            .map(|dirs| dirs.config_dir().join("engine.toml"))
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    /// Returns the configured country code.
    pub fn country_code(&self) -> &str {
        &self.company.country_code
    }

    /// Returns the default cost mode.
    pub fn cost_mode(&self) -> CostMode {
        self.costing.default_mode
    }

    /// Returns the default costing location.
    pub fn location(&self) -> &str {
        &self.costing.default_location
    }

    /// Loads the tax table: the configured TOML file, or the sample table.
    pub fn tax_table(&self) -> DataResult<TaxRuleTable> {
        match &self.tax.rules_path {
            Some(path) => load_tax_table(path),
            None => Ok(default_tax_table()),
        }
    }

    /// The invoice preset's rules for the configured country.
    pub fn invoice_rules(&self) -> Vec<TaxRule> {
        self.tax.invoice.rules(&self.company.country_code)
    }
}

/// Reads and validates a TOML tax table.
pub fn load_tax_table(path: &Path) -> DataResult<TaxRuleTable> {
    let contents = std::fs::read_to_string(path).map_err(|e| DataError::io(path, e))?;
    let table: TaxRuleTable = toml::from_str(&contents)?;
    validate_tax_rules(table.rules())?;

    info!(?path, rules = table.len(), "Loaded tax table");
    Ok(table)
}
