//! # larder-data: Reference Data & Configuration
//!
//! Feeds the pure `larder-core` engine with what it reads: configuration,
//! tax tables and reference data for a reporting period.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         larder-data                                     │
//! │                                                                         │
//! │   engine.toml + LARDER_* env ──► EngineConfig ──► tax_table()           │
//! │                                       │                │                │
//! │                                       ▼                ▼                │
//! │   fixture.json ──────────────► ReferenceStore    TaxRuleTable           │
//! │                                       │                                 │
//! │                                       ▼                                 │
//! │                       larder-core read-path traits                      │
//! │               (LotSource, RecipeSource, UsageSource, TaxRuleSource)     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//! - [`config`]: TOML configuration with environment overrides
//! - [`defaults`]: Built-in sample tax table
//! - [`store`]: In-memory reference store loaded from JSON
//! - [`error`]: Error types

pub mod config;
pub mod defaults;
pub mod error;
pub mod store;

pub use config::{load_tax_table, EngineConfig};
pub use defaults::default_tax_table;
pub use error::{DataError, DataResult};
pub use store::ReferenceStore;
