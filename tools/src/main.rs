//! forecast-runner: headless forecast runner for the volume planner.
//!
//! Usage:
//!   forecast-runner --db plan.db --scenario <id>
//!   forecast-runner --seed-demo            (in-memory demo run)

use anyhow::{bail, Result};
use volplan_core::{
    engine::ForecastEngine,
    fiscal::{month_label, FiscalMonth},
    model::{
        Channel, HistoricMonthly, Scenario, ScenarioCoefficient, ScenarioStatus, SkuProduct,
        SkuVariableAssignment, Variable, VariableCategory,
    },
    store::PlanStore,
};
use std::env;

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let db = arg_value(&args, "--db").unwrap_or(":memory:");
    let actor = arg_value(&args, "--actor").unwrap_or("forecast-runner");
    let seed_demo_flag = args.iter().any(|a| a == "--seed-demo");
    let json = args.iter().any(|a| a == "--json");

    let store = if db == ":memory:" {
        PlanStore::in_memory()?
    } else {
        PlanStore::open(db)?
    };
    store.migrate()?;

    let scenario_id = match (arg_value(&args, "--scenario"), seed_demo_flag) {
        (Some(id), _) => id.to_string(),
        (None, true) => seed_demo(&store)?,
        (None, false) => bail!("either --scenario <id> or --seed-demo is required"),
    };

    let mut engine = ForecastEngine::new(store, actor);
    let report = engine.run_forecast(&scenario_id)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("=== FORECAST RUN ===");
    println!("  scenario:   {scenario_id}");
    println!("  strategy:   {:?}", report.metadata.base_source);
    println!("  details:    {}", report.metadata.base_details);
    if let Some(stand_in) = &report.metadata.stand_in_scenario {
        println!("  stand-in:   {stand_in}");
    }
    println!("  forecast:   {:.1} c9l", report.stats.total_forecast_c9l);
    println!("  base:       {:.1} c9l", report.stats.total_base_c9l);
    println!("  growth:     {:+.1}%", report.stats.growth_percent);
    let mut monthly_totals = [0.0f64; 12];
    for row in &report.rows {
        if let Some(slot) = (row.month_index as usize)
            .checked_sub(1)
            .and_then(|i| monthly_totals.get_mut(i))
        {
            *slot += row.forecast_c9l;
        }
    }
    println!("  by month:");
    for (i, total) in monthly_totals.iter().enumerate() {
        println!("    {:<4}{total:>12.1}", month_label(i as u32 + 1));
    }
    if report.metadata.warnings.is_empty() {
        println!("  warnings:   none");
    } else {
        println!("  warnings:");
        for warning in &report.metadata.warnings {
            println!("    - {warning}");
        }
    }
    Ok(())
}

fn arg_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}

/// Load a small demo dataset: two channels, three SKUs, one full prior
/// fiscal year of history, and a DRAFT scenario with a seasonality table.
/// Returns the scenario id to run.
fn seed_demo(store: &PlanStore) -> Result<String> {
    let target_fy = 2025;
    let prior_fy = target_fy - 1;

    for (code, name) in [("TT", "Traditional Trade"), ("MT", "Modern Trade")] {
        store.upsert_channel(&Channel {
            code: code.into(),
            name: name.into(),
            active: true,
        })?;
    }

    let skus = [
        ("SKU_100", "Brand A", "Spirits", "Vodka"),
        ("SKU_200", "Brand B", "Wine", "Red"),
        ("SKU_300", "Brand C", "Spirits", "Gin"),
    ];
    for (sku, brand, macro_cat, cat) in skus {
        store.upsert_sku(&SkuProduct {
            sku: sku.into(),
            brand: brand.into(),
            category_macro: macro_cat.into(),
            category: cat.into(),
            active: true,
            description: String::new(),
        })?;
    }

    let mut keys = Vec::new();
    for (channel, sku, base) in [
        ("TT", "SKU_100", 120.0),
        ("MT", "SKU_100", 480.0),
        ("TT", "SKU_200", 80.0),
        ("MT", "SKU_300", 40.0),
    ] {
        let link = store.upsert_channel_sku(channel, sku, true)?;
        for month in 1..=12u32 {
            store.upsert_history(&HistoricMonthly {
                channel_sku_key: link.channel_sku_key.clone(),
                fy_start_year: prior_fy,
                month_index: month,
                c9l: base,
            })?;
        }
        keys.push(link.channel_sku_key);
    }

    // SKU_300 stops selling after October (month 7).
    store.set_discontinuation(
        "MT_SKU_300",
        Some(FiscalMonth {
            fy_start_year: target_fy,
            month_index: 7,
        }),
    )?;

    store.upsert_variable(&Variable {
        code: "SEASON".into(),
        name: "Seasonality".into(),
        active: true,
    })?;
    for (code, name) in [("HIGH", "High Season"), ("FLAT", "Flat")] {
        store.upsert_variable_category(&VariableCategory {
            variable_code: "SEASON".into(),
            code: code.into(),
            name: name.into(),
            active: true,
        })?;
    }
    for sku in ["SKU_100", "SKU_200"] {
        store.upsert_assignment(&SkuVariableAssignment {
            sku: sku.into(),
            variable_code: "SEASON".into(),
            category_code: "HIGH".into(),
        })?;
    }

    let scenario = Scenario {
        id: "demo-fy2025".into(),
        name: format!("Demo Plan FY{target_fy}"),
        fy_start_year: target_fy,
        status: ScenarioStatus::Draft,
        description: Some("Seeded demo scenario".into()),
        source_scenario_id: None,
        created_at: chrono::Utc::now().to_rfc3339(),
    };
    store.insert_scenario(&scenario)?;

    // December (month 9) peaks at 1.3x for high-season SKUs.
    store.upsert_coefficient(&ScenarioCoefficient {
        scenario_id: scenario.id.clone(),
        variable_code: "SEASON".into(),
        category_code: "HIGH".into(),
        month_index: 9,
        value: 1.3,
    })?;

    log::info!("demo data seeded: {} links, scenario '{}'", keys.len(), scenario.name);
    Ok(scenario.id)
}
