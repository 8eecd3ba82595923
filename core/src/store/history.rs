use super::PlanStore;
use crate::{
    error::PlanResult,
    model::HistoricMonthly,
    types::{ChannelSkuKey, FiscalYear},
};
use rusqlite::params;
use std::collections::HashMap;

/// Per-key volume sum and distinct-month count over one fiscal year.
#[derive(Debug, Clone, Copy, Default)]
pub struct VolumeSum {
    pub sum: f64,
    pub months: u32,
}

impl PlanStore {
    // ── Historic volumes ───────────────────────────────────────

    /// Append or update one observed month. History is never deleted here.
    pub fn upsert_history(&self, record: &HistoricMonthly) -> PlanResult<()> {
        self.conn.execute(
            "INSERT INTO historic_monthly (channel_sku_key, fy_start_year, month_index, c9l)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(channel_sku_key, fy_start_year, month_index) DO UPDATE SET c9l = ?4",
            params![
                record.channel_sku_key,
                record.fy_start_year,
                record.month_index,
                record.c9l,
            ],
        )?;
        Ok(())
    }

    /// All observed months for one fiscal year, ordered by key then month.
    pub fn history_for_fy(&self, fy: FiscalYear) -> PlanResult<Vec<HistoricMonthly>> {
        let mut stmt = self.conn.prepare(
            "SELECT channel_sku_key, fy_start_year, month_index, c9l
             FROM historic_monthly WHERE fy_start_year = ?1
             ORDER BY channel_sku_key ASC, month_index ASC",
        )?;
        let rows = stmt.query_map(params![fy], |row| {
            Ok(HistoricMonthly {
                channel_sku_key: row.get(0)?,
                fy_start_year: row.get(1)?,
                month_index: row.get(2)?,
                c9l: row.get(3)?,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    pub fn history_exists_for_fy(&self, fy: FiscalYear) -> PlanResult<bool> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM historic_monthly WHERE fy_start_year = ?1",
            params![fy],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// Sum and month count per key for one fiscal year.
    pub fn history_sums_for_fy(
        &self,
        fy: FiscalYear,
    ) -> PlanResult<HashMap<ChannelSkuKey, VolumeSum>> {
        let mut stmt = self.conn.prepare(
            "SELECT channel_sku_key, SUM(c9l), COUNT(*)
             FROM historic_monthly WHERE fy_start_year = ?1
             GROUP BY channel_sku_key",
        )?;
        let rows = stmt.query_map(params![fy], |row| {
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
