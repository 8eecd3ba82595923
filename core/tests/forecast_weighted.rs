//! Weighted 75/25 fallback: FY-2 history blended with a stand-in
//! scenario's FY-1 forecast.

use volplan_core::engine::ForecastEngine;
use volplan_core::error::PlanError;
use volplan_core::model::{
    BaseSource, ForecastMonthly, HistoricMonthly, Scenario, ScenarioStatus, SkuProduct,
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

fn fill_history(store: &PlanStore, key: &str, fy: i32, monthly: f64) {
    for month in 1..=12u32 {
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

/// Write 12 forecast rows for a scenario directly, as if a prior run
/// produced them.
fn write_stand_in_forecast(store: &mut PlanStore, scenario_id: &str, fy: i32, monthly: f64) {
    let rows: Vec<ForecastMonthly> = (1..=12u32)
        .map(|month| ForecastMonthly {
            id: format!("{scenario_id}-{month}"),
            scenario_id: scenario_id.into(),
            channel_sku_key: "TT_SKU1".into(),
            fy_start_year: fy,
            month_index: month,
            base_monthly_c9l: monthly,
            forecast_c9l: monthly,
            forecast_liters: monthly * 9.0,
            is_discontinued: false,
            factors_applied: Vec::new(),
        })
        .collect();
    store.replace_forecasts(scenario_id, &rows).unwrap();
}

#[test]
fn blends_75_history_with_25_prior_forecast() {
    let mut store = seeded_store();
    fill_history(&store, "TT_SKU1", 2023, 100.0); // FY2023 sums to 1200
    add_scenario(&store, "prev", "Plan FY2024", 2024);
    write_stand_in_forecast(&mut store, "prev", 2024, 1600.0 / 12.0); // sums to 1600
    add_scenario(&store, "s1", "Plan FY2025", 2025);

    let mut engine = ForecastEngine::new(store, "test");
    let report = engine.run_forecast("s1").unwrap();

    assert_eq!(report.metadata.base_source, BaseSource::Weighted7525);
    assert_eq!(report.metadata.stand_in_scenario.as_deref(), Some("Plan FY2024"));

    // (0.75 * 1200 + 0.25 * 1600) / 12 = 108.333...
    let expected_monthly = (0.75 * 1200.0 + 0.25 * 1600.0) / 12.0;
    let rows = engine.store.forecasts_for_scenario("s1").unwrap();
    assert_eq!(rows.len(), 12);
    for row in &rows {
        assert!((row.base_monthly_c9l - expected_monthly).abs() < 1e-9);
    }
    assert!((report.stats.total_base_c9l - 1300.0).abs() < 1e-9);
}

#[test]
fn no_history_at_all_is_fatal_and_writes_nothing() {
    let store = seeded_store();
    add_scenario(&store, "s1", "Plan FY2025", 2025);

    let mut engine = ForecastEngine::new(store, "test");
    let err = engine.run_forecast("s1").unwrap_err();
    assert!(matches!(
        err,
        PlanError::InsufficientHistory {
            previous_fy: 2024,
            fallback_fy: 2023
        }
    ));

    // Fatal abort: no output rows, no audit entry.
    assert!(engine.store.forecasts_for_scenario("s1").unwrap().is_empty());
    assert!(engine.store.recent_audit(10).unwrap().is_empty());
}

#[test]
fn missing_equivalent_scenario_is_fatal() {
    let store = seeded_store();
    fill_history(&store, "TT_SKU1", 2023, 100.0);
    add_scenario(&store, "s1", "Plan FY2025", 2025);

    let mut engine = ForecastEngine::new(store, "test");
    let err = engine.run_forecast("s1").unwrap_err();
    assert!(matches!(
        err,
        PlanError::NoEquivalentScenario { fiscal_year: 2024 }
    ));
}

#[test]
fn stand_in_without_forecast_is_fatal_and_named() {
    let store = seeded_store();
    fill_history(&store, "TT_SKU1", 2023, 100.0);
    add_scenario(&store, "prev", "Plan FY2024", 2024);
    add_scenario(&store, "s1", "Plan FY2025", 2025);

    let mut engine = ForecastEngine::new(store, "test");
    let err = engine.run_forecast("s1").unwrap_err();
    match err {
        PlanError::MissingPriorForecast {
            scenario_name,
            fiscal_year,
        } => {
            assert_eq!(scenario_name, "Plan FY2024");
            assert_eq!(fiscal_year, 2024);
        }
        other => panic!("expected MissingPriorForecast, got {other:?}"),
    }
}

#[test]
fn clone_lineage_drives_stand_in_selection() {
    let mut store = seeded_store();
    fill_history(&store, "TT_SKU1", 2023, 100.0);
    add_scenario(&store, "prev", "Budget 2024", 2024);
    write_stand_in_forecast(&mut store, "prev", 2024, 100.0);

    // A decoy in FY2024 that any-candidate fallback might otherwise pick.
    let decoy = add_scenario(&store, "decoy", "Other Plan", 2024);
    store
        .set_scenario_status(&decoy.id, ScenarioStatus::Locked)
        .unwrap();

    let clone = store
        .clone_scenario("prev", "Budget 2025", 2025, "tester")
        .unwrap();
    assert_eq!(clone.source_scenario_id.as_deref(), Some("prev"));

    let mut engine = ForecastEngine::new(store, "test");
    let report = engine.run_forecast(&clone.id).unwrap();
    assert_eq!(report.metadata.stand_in_scenario.as_deref(), Some("Budget 2024"));
}

#[test]
fn incomplete_weighted_inputs_warn_not_fail() {
    let mut store = seeded_store();
    // Only 6 months of FY2023 history.
    for month in 1..=6u32 {
        store
            .upsert_history(&HistoricMonthly {
                channel_sku_key: "TT_SKU1".into(),
                fy_start_year: 2023,
                month_index: month,
                c9l: 100.0,
            })
            .unwrap();
    }
    add_scenario(&store, "prev", "Plan FY2024", 2024);
    write_stand_in_forecast(&mut store, "prev", 2024, 100.0);
    add_scenario(&store, "s1", "Plan FY2025", 2025);

    let mut engine = ForecastEngine::new(store, "test");
    let report = engine.run_forecast("s1").unwrap();

    assert!(report
        .metadata
        .warnings
        .iter()
        .any(|w| w.contains("FY2023") && w.contains("6/12")));

    // (0.75 * 600 + 0.25 * 1200) / 12
    let expected_monthly = (0.75 * 600.0 + 0.25 * 1200.0) / 12.0;
    let rows = engine.store.forecasts_for_scenario("s1").unwrap();
    assert!((rows[0].base_monthly_c9l - expected_monthly).abs() < 1e-9);
}
