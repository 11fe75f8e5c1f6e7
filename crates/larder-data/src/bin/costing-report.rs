//! # Costing Report
//!
//! Runs the whole engine over a reference-data fixture and prints the result
//! as JSON.
//!
//! ## Usage
//! ```bash
//! # Report over a fixture with the default config
//! cargo run -p larder-data --bin costing-report -- ./period.json
//!
//! # Specify a config file
//! cargo run -p larder-data --bin costing-report -- ./period.json --config ./engine.toml
//!
//! # Override settings from the environment
//! LARDER_COUNTRY=ZA LARDER_COST_MODE=weightedAvg cargo run -p larder-data --bin costing-report -- ./period.json
//! ```
//!
//! ## Output
//! - `simulations`: one sale simulation per recipe, at its menu price and
//!   the period's quantity sold
//! - `tax`: taxes on the period's sales subtotal for the configured country
//! - `invoiceTax`: the invoice preset applied to per-sale invoice lines
//! - `variance` / `varianceSummary`: theoretical vs. counted usage
//!
//! Logs go to stderr, so stdout stays valid JSON.

use std::env;
use std::path::PathBuf;

use larder_core::variance::{summarize_variance, VarianceSummary};
use larder_core::{
    calculate_invoice_taxes, calculate_total_with_taxes, calculate_variance, simulate_sale,
    CostMode, SaleSimulation, TaxCalculationResult, TaxRuleTable, Variance,
};
use larder_data::{EngineConfig, ReferenceStore};
use serde::Serialize;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Everything the report prints.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CostingReport {
    company: String,
    country_code: String,
    location: String,
    cost_mode: CostMode,
    simulations: Vec<SaleSimulation>,
    tax: TaxCalculationResult,
    invoice_tax: TaxCalculationResult,
    variance: Vec<Variance>,
    variance_summary: VarianceSummary,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let args: Vec<String> = env::args().collect();

    let mut fixture: Option<PathBuf> = None;
    let mut config_path: Option<PathBuf> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--config" | "-c" => {
                if i + 1 < args.len() {
                    config_path = Some(PathBuf::from(&args[i + 1]));
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Larder Costing Report");
                println!();
                println!("Usage: costing-report <FIXTURE.json> [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --config <PATH>  Engine config file (default: platform config dir)");
                println!("  -h, --help           Show this help message");
                return Ok(());
            }
            other => fixture = Some(PathBuf::from(other)),
        }
        i += 1;
    }

    let fixture = fixture.ok_or("missing fixture path (see --help)")?;

    let config = EngineConfig::load(config_path)?;
    let store = ReferenceStore::load(&fixture)?;

    let country = config.country_code();
    let location = config.location();
    let cost_mode = config.cost_mode();

    // Fixture rules win; otherwise the configured table.
    let tax_table: TaxRuleTable = if store.tax_table.is_empty() {
        config.tax_table()?
    } else {
        store.tax_table.clone()
    };

    let mut simulations = Vec::with_capacity(store.recipes.len());
    for recipe in &store.recipes {
        let price = match store.menu_price(&recipe.menu_item_id) {
            Ok(price) => price,
            Err(e) => {
                warn!(menu_item_id = %recipe.menu_item_id, "{}, costing at zero price", e);
                0.0
            }
        };
        let sold: f64 = store
            .sales
            .iter()
            .filter(|sale| sale.menu_item_id == recipe.menu_item_id)
            .map(|sale| sale.quantity_sold)
            .sum();

        let simulation = simulate_sale(recipe, sold, price, &store, location, cost_mode);
        info!(
            menu_item_id = %recipe.menu_item_id,
            gp_percent = simulation.gp_percent,
            total_gp = %config.company.format_currency(simulation.total_gp),
            "Costed menu item"
        );
        simulations.push(simulation);
    }

    let subtotal: f64 = simulations.iter().map(|s| s.total_sales).sum();
    let tax = calculate_total_with_taxes(subtotal, country, &tax_table);

    let invoice_rules = config.invoice_rules();
    let invoice_tax = calculate_invoice_taxes(&store.invoice_lines(), country, invoice_rules.as_slice());

    let ingredients = store.priced_ingredients(location, cost_mode);
    let variance = calculate_variance(&store.sales, &store, &ingredients, &store);
    let variance_summary = summarize_variance(&variance);

    info!(
        sales = %config.company.format_currency(subtotal),
        total = %config.company.format_currency(tax.total),
        loss = %config.company.format_currency(variance_summary.total_loss),
        uncounted = variance_summary.uncounted.len(),
        "Report complete"
    );

    let report = CostingReport {
        company: config.company.name.clone(),
        country_code: country.to_string(),
        location: location.to_string(),
        cost_mode,
        simulations,
        tax,
        invoice_tax,
        variance,
        variance_summary,
    };
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}

/// Initializes the tracing subscriber on stderr.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=larder_core=trace` - Show trace for the engine only
/// - Default: INFO, DEBUG for larder crates
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,larder=debug"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
