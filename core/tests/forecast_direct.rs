//! Direct strategy: base from FY target-1 history.

use volplan_core::engine::ForecastEngine;
use volplan_core::error::PlanError;
use volplan_core::model::{
    HistoricMonthly, OverrideBaseMonthly, Scenario, ScenarioStatus, SkuProduct,
};
use volplan_core::store::PlanStore;

fn seeded_store() -> PlanStore {
    let store = PlanStore::in_memory().unwrap();
    store.migrate().unwrap();
    store
        .upsert_sku(&SkuProduct {
            sku: "SKU1".into(),
            brand: "Brand A".into(),
            category_macro: "Spirits".into(),
            category: "Vodka".into(),
            active: true,
            description: String::new(),
        })
        .unwrap();
    store.upsert_channel_sku("TT", "SKU1", true).unwrap();
    store
}

fn add_scenario(store: &PlanStore, id: &str, name: &str, fy: i32) -> Scenario {
    let scenario = Scenario {
        id: id.into(),
        name: name.into(),
        fy_start_year: fy,
        status: ScenarioStatus::Draft,
        description: None,
        source_scenario_id: None,
        created_at: "2025-01-01T00:00:00Z".into(),
    };
    store.insert_scenario(&scenario).unwrap();
    scenario
}

fn fill_history(store: &PlanStore, key: &str, fy: i32, monthly: f64, months: u32) {
    for month in 1..=months {
        store
            .upsert_history(&HistoricMonthly {
                channel_sku_key: key.into(),
                fy_start_year: fy,
                month_index: month,
                c9l: monthly,
            })
            .unwrap();
    }
}

#[test]
fn full_prior_year_gives_flat_base_and_zero_growth() {
    let store = seeded_store();
    fill_history(&store, "TT_SKU1", 2024, 120.0, 12); // sums to 1440
    add_scenario(&store, "s1", "Plan FY2025", 2025);

    let mut engine = ForecastEngine::new(store, "test");
    let report = engine.run_forecast("s1").unwrap();

    assert_eq!(report.stats.total_forecast_c9l, 1440.0);
    assert_eq!(report.stats.total_base_c9l, 1440.0);
    assert_eq!(report.stats.growth_percent, 0.0);
    assert!(report.metadata.warnings.is_empty());
    assert!(report.metadata.stand_in_scenario.is_none());

    let rows = engine.store.forecasts_for_scenario("s1").unwrap();
    assert_eq!(rows.len(), 12);
    for row in &rows {
        assert_eq!(row.base_monthly_c9l, 120.0);
        assert_eq!(row.forecast_c9l, 120.0);
        assert_eq!(row.forecast_liters, 120.0 * 9.0);
        assert!(!row.is_discontinued);
    }
}

#[test]
fn incomplete_history_warns_but_still_computes() {
    let store = seeded_store();
    fill_history(&store, "TT_SKU1", 2024, 120.0, 7); // 7 of 12 months
    add_scenario(&store, "s1", "Plan FY2025", 2025);

    let mut engine = ForecastEngine::new(store, "test");
    let report = engine.run_forecast("s1").unwrap();

    let monthly_base = 120.0 * 7.0 / 12.0;
    let rows = engine.store.forecasts_for_scenario("s1").unwrap();
    assert!((rows[0].base_monthly_c9l - monthly_base).abs() < 1e-9);

    assert_eq!(report.metadata.warnings.len(), 1);
    let warning = &report.metadata.warnings[0];
    assert!(warning.contains("TT_SKU1"), "warning names the key: {warning}");
    assert!(warning.contains("7/12"), "warning names the count: {warning}");
}

#[test]
fn zero_history_key_forecasts_zero_silently() {
    let store = seeded_store();
    fill_history(&store, "TT_SKU1", 2024, 120.0, 12);
    store
        .upsert_sku(&SkuProduct {
            sku: "SKU2".into(),
            brand: "Brand B".into(),
            category_macro: "Wine".into(),
            category: "Red".into(),
            active: true,
            description: String::new(),
        })
        .unwrap();
    store.upsert_channel_sku("TT", "SKU2", true).unwrap();
    add_scenario(&store, "s1", "Plan FY2025", 2025);

    let mut engine = ForecastEngine::new(store, "test");
    let report = engine.run_forecast("s1").unwrap();

    // No warning for the data gap; indistinguishable from genuinely no sales.
    assert!(report.metadata.warnings.is_empty());

    let rows = engine.store.forecasts_for_scenario("s1").unwrap();
    assert_eq!(rows.len(), 24);
    for row in rows.iter().filter(|r| r.channel_sku_key == "TT_SKU2") {
        assert_eq!(row.forecast_c9l, 0.0);
    }
}

#[test]
fn inactive_sku_excluded_from_run() {
    let store = seeded_store();
    fill_history(&store, "TT_SKU1", 2024, 120.0, 12);
    store
        .upsert_sku(&SkuProduct {
            sku: "SKU1".into(),
            brand: "Brand A".into(),
            category_macro: "Spirits".into(),
            category: "Vodka".into(),
            active: false,
            description: String::new(),
        })
        .unwrap();
    add_scenario(&store, "s1", "Plan FY2025", 2025);

    let mut engine = ForecastEngine::new(store, "test");
    let report = engine.run_forecast("s1").unwrap();

    assert_eq!(report.stats.total_forecast_c9l, 0.0);
    assert!(engine.store.forecasts_for_scenario("s1").unwrap().is_empty());
}

#[test]
fn rerun_yields_identical_row_set() {
    let store = seeded_store();
    fill_history(&store, "TT_SKU1", 2024, 120.0, 12);
    add_scenario(&store, "s1", "Plan FY2025", 2025);

    let mut engine = ForecastEngine::new(store, "test");
    engine.run_forecast("s1").unwrap();
    let first = engine.store.forecasts_for_scenario("s1").unwrap();
    engine.run_forecast("s1").unwrap();
    let second = engine.store.forecasts_for_scenario("s1").unwrap();

    assert_eq!(first.len(), second.len());
    for (a, b) in first.iter().zip(second.iter()) {
        // Row ids are regenerated; everything else must be identical.
        assert_eq!(a.channel_sku_key, b.channel_sku_key);
        assert_eq!(a.month_index, b.month_index);
        assert_eq!(a.base_monthly_c9l, b.base_monthly_c9l);
        assert_eq!(a.forecast_c9l, b.forecast_c9l);
        assert_eq!(a.forecast_liters, b.forecast_liters);
        assert_eq!(a.is_discontinued, b.is_discontinued);
        assert_eq!(a.factors_applied.len(), b.factors_applied.len());
    }
}

#[test]
fn override_shields_month_from_history_changes() {
    let store = seeded_store();
    fill_history(&store, "TT_SKU1", 2024, 120.0, 12);
    add_scenario(&store, "s1", "Plan FY2025", 2025);
    store
        .upsert_override(&OverrideBaseMonthly {
            scenario_id: "s1".into(),
            channel_sku_key: "TT_SKU1".into(),
            fy_start_year: 2025,
            month_index: 3,
            base_monthly_c9l: 999.0,
        })
        .unwrap();

    let mut engine = ForecastEngine::new(store, "test");
    engine.run_forecast("s1").unwrap();

    // Mutate the underlying history and rerun.
    fill_history(&engine.store, "TT_SKU1", 2024, 480.0, 12);
    engine.run_forecast("s1").unwrap();

    let rows = engine.store.forecasts_for_scenario("s1").unwrap();
    let month3 = rows.iter().find(|r| r.month_index == 3).unwrap();
    assert_eq!(month3.base_monthly_c9l, 999.0);
    assert_eq!(month3.forecast_c9l, 999.0);

    let month4 = rows.iter().find(|r| r.month_index == 4).unwrap();
    assert_eq!(month4.base_monthly_c9l, 480.0);
}

#[test]
fn locked_scenario_rejects_edits_but_still_runs() {
    let store = seeded_store();
    fill_history(&store, "TT_SKU1", 2024, 120.0, 12);
    add_scenario(&store, "s1", "Plan FY2025", 2025);
    store
        .set_scenario_status("s1", ScenarioStatus::Locked)
        .unwrap();

    let err = store
        .upsert_override(&OverrideBaseMonthly {
            scenario_id: "s1".into(),
            channel_sku_key: "TT_SKU1".into(),
            fy_start_year: 2025,
            month_index: 1,
            base_monthly_c9l: 50.0,
        })
        .unwrap_err();
    assert!(matches!(err, PlanError::ScenarioLocked { .. }));

    // LOCKED never blocks the engine itself.
    let mut engine = ForecastEngine::new(store, "test");
    let report = engine.run_forecast("s1").unwrap();
    assert_eq!(report.stats.total_forecast_c9l, 1440.0);
}

#[test]
fn run_appends_one_audit_entry() {
    let store = seeded_store();
    fill_history(&store, "TT_SKU1", 2024, 120.0, 12);
    add_scenario(&store, "s1", "Plan FY2025", 2025);

    let mut engine = ForecastEngine::new(store, "planner");
    engine.run_forecast("s1").unwrap();

    let audit = engine.store.recent_audit(10).unwrap();
    assert_eq!(audit.len(), 1);
    assert_eq!(audit[0].action, "FORECAST_RUN");
    assert_eq!(audit[0].actor, "planner");
    assert_eq!(audit[0].entity_id.as_deref(), Some("s1"));
}

#[test]
fn unknown_scenario_fails_cleanly() {
    let store = seeded_store();
    let mut engine = ForecastEngine::new(store, "test");
    let err = engine.run_forecast("nope").unwrap_err();
    assert!(matches!(err, PlanError::ScenarioNotFound { .. }));
}
