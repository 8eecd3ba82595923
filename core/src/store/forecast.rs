use super::{history::VolumeSum, PlanStore};
use crate::{
    error::PlanResult,
    model::ForecastMonthly,
    types::{ChannelSkuKey, FiscalYear},
};
use rusqlite::params;
use std::collections::HashMap;

fn forecast_row_mapper(row: &rusqlite::Row<'_>) -> rusqlite::Result<ForecastMonthly> {
    let factors_json: String = row.get(9)?;
    Ok(ForecastMonthly {
        id: row.get(0)?,
        scenario_id: row.get(1)?,
        channel_sku_key: row.get(2)?,
        fy_start_year: row.get(3)?,
        month_index: row.get(4)?,
        base_monthly_c9l: row.get(5)?,
        forecast_c9l: row.get(6)?,
        forecast_liters: row.get(7)?,
        is_discontinued: row.get::<_, i32>(8)? != 0,
        factors_applied: serde_json::from_str(&factors_json).unwrap_or_default(),
    })
}

impl PlanStore {
    // ── Forecast output ────────────────────────────────────────

    /// Replace every output row for a scenario in one transaction.
    /// Readers never observe a partially replaced set.
    pub fn replace_forecasts(
        &mut self,
        scenario_id: &str,
        rows: &[ForecastMonthly],
    ) -> PlanResult<()> {
        let tx = self.conn.transaction()?;
        tx.execute(
            "DELETE FROM forecast_monthly WHERE scenario_id = ?1",
            params![scenario_id],
        )?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO forecast_monthly
                    (id, scenario_id, channel_sku_key, fy_start_year, month_index,
                     base_monthly_c9l, forecast_c9l, forecast_liters, is_discontinued, factors_applied)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            )?;
            for row in rows {
                let factors_json = serde_json::to_string(&row.factors_applied)?;
                stmt.execute(params![
                    row.id,
                    row.scenario_id,
                    row.channel_sku_key,
                    row.fy_start_year,
                    row.month_index,
                    row.base_monthly_c9l,
                    row.forecast_c9l,
                    row.forecast_liters,
                    row.is_discontinued as i32,
                    factors_json,
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    pub fn forecasts_for_scenario(&self, scenario_id: &str) -> PlanResult<Vec<ForecastMonthly>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, scenario_id, channel_sku_key, fy_start_year, month_index,
                    base_monthly_c9l, forecast_c9l, forecast_liters, is_discontinued, factors_applied
             FROM forecast_monthly WHERE scenario_id = ?1
             ORDER BY channel_sku_key ASC, month_index ASC",
        )?;
        let rows = stmt.query_map(params![scenario_id], forecast_row_mapper)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    pub fn forecast_exists_for_scenario(&self, scenario_id: &str) -> PlanResult<bool> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM forecast_monthly WHERE scenario_id = ?1",
            params![scenario_id],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// Sum and month count per key over one scenario's output for one year.
    /// Feeds the 25% leg of the weighted base.
    pub fn forecast_sums_for_scenario(
        &self,
        scenario_id: &str,
        fy: FiscalYear,
    ) -> PlanResult<HashMap<ChannelSkuKey, VolumeSum>> {
        let mut stmt = self.conn.prepare(
            "SELECT channel_sku_key, SUM(forecast_c9l), COUNT(*)
             FROM forecast_monthly
             WHERE scenario_id = ?1 AND fy_start_year = ?2
             GROUP BY channel_sku_key",
        )?;
        let rows = stmt.query_map(params![scenario_id, fy], |row| {
            Ok((
                row.get::<_, String>(0)?,
                VolumeSum {
                    sum: row.get(1)?,
                    months: row.get::<_, i64>(2)? as u32,
                },
            ))
        })?;
        rows.collect::<Result<HashMap<_, _>, _>>().map_err(Into::into)
    }
}
