//! The forecast engine — the heart of the volume planner.
//!
//! RUN SHAPE (fixed, documented, never reordered):
//!   1. Load the scenario and snapshot every input (masters, assignments,
//!      active variables, scenario coefficients and overrides).
//!   2. Resolve the base strategy once for the whole run (base_volume).
//!   3. Iterate active channel/SKU links x 12 months (calculator).
//!   4. Aggregate totals, growth, and deduplicated warnings.
//!   5. Replace the scenario's output rows in one transaction and append
//!      one audit entry.
//!
//! RULES:
//!   - Fatal errors abort before step 5: no output rows, no audit entry.
//!   - No row outside forecast_monthly and audit_event is ever written.
//!   - LOCKED blocks editing elsewhere; it never blocks a run.

use crate::{
    base_volume::BaseVolumeResolver,
    calculator::{self, CalcContext},
    error::{PlanError, PlanResult},
    model::{AuditEvent, ForecastMetadata, ForecastMonthly, ForecastReport, ForecastStats},
    store::PlanStore,
    types::{ChannelSkuKey, MonthIndex},
};
use std::collections::{BTreeSet, HashMap};

pub struct ForecastEngine {
    pub store: PlanStore,
    actor: String,
}

impl ForecastEngine {
    pub fn new(store: PlanStore, actor: impl Into<String>) -> Self {
        Self {
            store,
            actor: actor.into(),
        }
    }

    /// Run the forecast for one scenario, replacing its prior output.
    ///
    /// Takes `&mut self`: two concurrent runs for the same scenario would
    /// race on the replace-all write, so callers serialize per scenario.
    pub fn run_forecast(&mut self, scenario_id: &str) -> PlanResult<ForecastReport> {
        let scenario = self
            .store
            .scenario_by_id(scenario_id)?
            .ok_or_else(|| PlanError::ScenarioNotFound {
                scenario_id: scenario_id.to_string(),
            })?;
        let target_fy = scenario.fy_start_year;

        // Snapshot-at-start: nothing below re-reads mutable configuration.
        let all_scenarios = self.store.all_scenarios()?;
        let links = self.store.active_channel_skus()?;
        let variables = self.store.active_variables()?;
        let assignments = self.store.all_assignments()?;
        let coefficients = self.store.coefficients_for_scenario(&scenario.id)?;
        let overrides = self.store.overrides_for_scenario(&scenario.id)?;

        let resolver = BaseVolumeResolver::prepare(&self.store, &scenario, &all_scenarios)?;

        let assignment_of: HashMap<(String, String), String> = assignments
            .into_iter()
            .map(|a| ((a.sku, a.variable_code), a.category_code))
            .collect();
        let coefficient_at: HashMap<(String, String, MonthIndex), f64> = coefficients
            .into_iter()
            .map(|c| ((c.variable_code, c.category_code, c.month_index), c.value))
            .collect();
        let override_at: HashMap<(ChannelSkuKey, MonthIndex), f64> = overrides
            .into_iter()
            .filter(|o| o.fy_start_year == target_fy)
            .map(|o| ((o.channel_sku_key, o.month_index), o.base_monthly_c9l))
            .collect();

        let ctx = CalcContext {
            scenario_id: &scenario.id,
            target_fy,
            variables: &variables,
            assignment_of: &assignment_of,
            coefficient_at: &coefficient_at,
            override_at: &override_at,
        };

        let mut warnings: BTreeSet<String> = BTreeSet::new();
        let mut output: Vec<ForecastMonthly> = Vec::with_capacity(links.len() * 12);
        let mut total_forecast = 0.0;
        let mut total_base = 0.0;

        for link in &links {
            let base = resolver.key_base(&link.channel_sku_key, &mut warnings);
            total_base += base.base_total;

            let rows = calculator::link_forecast(&ctx, link, base.monthly_base);
            total_forecast += rows.iter().map(|r| r.forecast_c9l).sum::<f64>();
            output.extend(rows);
        }

        let growth_percent = if total_base > 0.0 {
            (total_forecast - total_base) / total_base * 100.0
        } else {
            0.0
        };

        // Atomic swap: the full set is built in memory before any write.
        self.store.replace_forecasts(&scenario.id, &output)?;
        self.store.append_audit(&AuditEvent {
            id: uuid::Uuid::new_v4().to_string(),
            occurred_at: chrono::Utc::now().to_rfc3339(),
            actor: self.actor.clone(),
            action: "FORECAST_RUN".to_string(),
            summary: format!(
                "Forecast generated for '{}' (FY{target_fy}): {} rows, {:.1} c9l total",
                scenario.name,
                output.len(),
                total_forecast
            ),
            entity_type: Some("Scenario".to_string()),
            entity_id: Some(scenario.id.clone()),
        })?;

        log::info!(
            "scenario '{}': {} links, {:.1} c9l forecast, {:.1} c9l base, {:+.1}% growth, {} warnings",
            scenario.name,
            links.len(),
            total_forecast,
            total_base,
            growth_percent,
            warnings.len()
        );

        Ok(ForecastReport {
            stats: ForecastStats {
                total_forecast_c9l: total_forecast,
                total_base_c9l: total_base,
                growth_percent,
            },
            metadata: ForecastMetadata {
                base_source: resolver.base_source(),
                base_details: resolver.details(),
                warnings: warnings.into_iter().collect(),
                stand_in_scenario: resolver.stand_in_name(),
            },
            rows: output,
        })
    }
}
