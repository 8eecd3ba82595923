use super::PlanStore;
use crate::{
    error::{PlanError, PlanResult},
    model::{
        AuditEvent, OverrideBaseMonthly, Scenario, ScenarioCoefficient, ScenarioStatus,
    },
    types::{FiscalYear, ScenarioId},
};
use rusqlite::params;

fn scenario_row_mapper(row: &rusqlite::Row<'_>) -> rusqlite::Result<Scenario> {
    Ok(Scenario {
        id: row.get(0)?,
        name: row.get(1)?,
        fy_start_year: row.get(2)?,
        status: ScenarioStatus::from_db(&row.get::<_, String>(3)?),
        description: row.get(4)?,
        source_scenario_id: row.get(5)?,
        created_at: row.get(6)?,
    })
}

const SCENARIO_COLUMNS: &str =
    "id, name, fy_start_year, status, description, source_scenario_id, created_at";

impl PlanStore {
    // ── Scenarios ──────────────────────────────────────────────

    pub fn insert_scenario(&self, scenario: &Scenario) -> PlanResult<()> {
        self.conn.execute(
            "INSERT INTO scenario (id, name, fy_start_year, status, description, source_scenario_id, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                scenario.id,
                scenario.name,
                scenario.fy_start_year,
                scenario.status.as_str(),
                scenario.description.as_deref(),
                scenario.source_scenario_id.as_deref(),
                scenario.created_at,
            ],
        )?;
        Ok(())
    }

    pub fn scenario_by_id(&self, scenario_id: &str) -> PlanResult<Option<Scenario>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {SCENARIO_COLUMNS} FROM scenario WHERE id = ?1"))?;
        let mut rows = stmt.query_map(params![scenario_id], scenario_row_mapper)?;
        rows.next().transpose().map_err(Into::into)
    }

    pub fn all_scenarios(&self) -> PlanResult<Vec<Scenario>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {SCENARIO_COLUMNS} FROM scenario ORDER BY created_at ASC"
        ))?;
        let rows = stmt.query_map([], scenario_row_mapper)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// Fiscal year is immutable once created; only name/status/description move.
    pub fn set_scenario_status(&self, scenario_id: &str, status: ScenarioStatus) -> PlanResult<()> {
        self.conn.execute(
            "UPDATE scenario SET status = ?1 WHERE id = ?2",
            params![status.as_str(), scenario_id],
        )?;
        Ok(())
    }

    /// Clone a scenario into a new fiscal year: copies coefficients and
    /// overrides (retargeted to the new year) and records lineage via
    /// `source_scenario_id`. The clone starts as DRAFT.
    pub fn clone_scenario(
        &self,
        source_id: &str,
        new_name: &str,
        fy_start_year: FiscalYear,
        actor: &str,
    ) -> PlanResult<Scenario> {
        let source = self
            .scenario_by_id(source_id)?
            .ok_or_else(|| PlanError::ScenarioNotFound {
                scenario_id: source_id.to_string(),
            })?;

        let clone = Scenario {
            id: uuid::Uuid::new_v4().to_string(),
            name: new_name.to_string(),
            fy_start_year,
            status: ScenarioStatus::Draft,
            description: source.description.clone(),
            source_scenario_id: Some(source.id.clone()),
            created_at: chrono::Utc::now().to_rfc3339(),
        };
        self.insert_scenario(&clone)?;

        self.conn.execute(
            "INSERT INTO scenario_coefficient (scenario_id, variable_code, category_code, month_index, value)
             SELECT ?1, variable_code, category_code, month_index, value
             FROM scenario_coefficient WHERE scenario_id = ?2",
            params![clone.id, source.id],
        )?;
        self.conn.execute(
            "INSERT INTO override_base_monthly (scenario_id, channel_sku_key, fy_start_year, month_index, base_monthly_c9l, updated_at)
             SELECT ?1, channel_sku_key, ?2, month_index, base_monthly_c9l, updated_at
             FROM override_base_monthly WHERE scenario_id = ?3",
            params![clone.id, fy_start_year, source.id],
        )?;

        self.append_audit(&AuditEvent {
            id: uuid::Uuid::new_v4().to_string(),
            occurred_at: chrono::Utc::now().to_rfc3339(),
            actor: actor.to_string(),
            action: "CLONE".to_string(),
            summary: format!("Scenario cloned from '{}'", source.name),
            entity_type: Some("Scenario".to_string()),
            entity_id: Some(clone.id.clone()),
        })?;

        log::info!(
            "scenario '{}' cloned from '{}' into FY{fy_start_year}",
            clone.name,
            source.name
        );
        Ok(clone)
    }

    fn require_editable(&self, scenario_id: &str) -> PlanResult<()> {
        let scenario = self
            .scenario_by_id(scenario_id)?
            .ok_or_else(|| PlanError::ScenarioNotFound {
                scenario_id: scenario_id.to_string(),
            })?;
        if scenario.status == ScenarioStatus::Locked {
            return Err(PlanError::ScenarioLocked {
                name: scenario.name,
            });
        }
        Ok(())
    }

    // ── Coefficients ───────────────────────────────────────────

    pub fn upsert_coefficient(&self, coefficient: &ScenarioCoefficient) -> PlanResult<()> {
        self.require_editable(&coefficient.scenario_id)?;
        self.conn.execute(
            "INSERT INTO scenario_coefficient (scenario_id, variable_code, category_code, month_index, value)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(scenario_id, variable_code, category_code, month_index)
             DO UPDATE SET value = ?5",
            params![
                coefficient.scenario_id,
                coefficient.variable_code,
                coefficient.category_code,
                coefficient.month_index,
                coefficient.value,
            ],
        )?;
        Ok(())
    }

    pub fn coefficients_for_scenario(
        &self,
        scenario_id: &ScenarioId,
    ) -> PlanResult<Vec<ScenarioCoefficient>> {
        let mut stmt = self.conn.prepare(
            "SELECT scenario_id, variable_code, category_code, month_index, value
             FROM scenario_coefficient WHERE scenario_id = ?1",
        )?;
        let rows = stmt.query_map(params![scenario_id], |row| {
            Ok(ScenarioCoefficient {
                scenario_id: row.get(0)?,
                variable_code: row.get(1)?,
                category_code: row.get(2)?,
                month_index: row.get(3)?,
                value: row.get(4)?,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    // ── Overrides ──────────────────────────────────────────────

    pub fn upsert_override(&self, value: &OverrideBaseMonthly) -> PlanResult<()> {
        self.require_editable(&value.scenario_id)?;
        self.conn.execute(
            "INSERT INTO override_base_monthly
                (scenario_id, channel_sku_key, fy_start_year, month_index, base_monthly_c9l, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             ON CONFLICT(scenario_id, channel_sku_key, fy_start_year, month_index)
             DO UPDATE SET base_monthly_c9l = ?5, updated_at = ?6",
            params![
                value.scenario_id,
                value.channel_sku_key,
                value.fy_start_year,
                value.month_index,
                value.base_monthly_c9l,
                chrono::Utc::now().to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    pub fn overrides_for_scenario(
        &self,
        scenario_id: &ScenarioId,
    ) -> PlanResult<Vec<OverrideBaseMonthly>> {
        let mut stmt = self.conn.prepare(
            "SELECT scenario_id, channel_sku_key, fy_start_year, month_index, base_monthly_c9l
             FROM override_base_monthly WHERE scenario_id = ?1",
        )?;
        let rows = stmt.query_map(params![scenario_id], |row| {
            Ok(OverrideBaseMonthly {
                scenario_id: row.get(0)?,
                channel_sku_key: row.get(1)?,
                fy_start_year: row.get(2)?,
                month_index: row.get(3)?,
                base_monthly_c9l: row.get(4)?,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }
}
