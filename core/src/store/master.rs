use super::PlanStore;
use crate::{
    error::PlanResult,
    fiscal::FiscalMonth,
    model::{channel_sku_key, Channel, ChannelSku, SkuProduct, SkuVariableAssignment, Variable, VariableCategory},
};
use rusqlite::params;

fn channel_sku_row_mapper(row: &rusqlite::Row<'_>) -> rusqlite::Result<ChannelSku> {
    let fy: Option<i32> = row.get(4)?;
    let month: Option<u32> = row.get(5)?;
    Ok(ChannelSku {
        channel_sku_key: row.get(0)?,
        channel_code: row.get(1)?,
        sku: row.get(2)?,
        active: row.get::<_, i32>(3)? != 0,
        discontinue_effective: match (fy, month) {
            (Some(fy_start_year), Some(month_index)) => Some(FiscalMonth {
                fy_start_year,
                month_index,
            }),
            _ => None,
        },
    })
}

impl PlanStore {
    // ── Channels and SKUs ──────────────────────────────────────

    pub fn upsert_channel(&self, channel: &Channel) -> PlanResult<()> {
        self.conn.execute(
            "INSERT INTO channel (code, name, active) VALUES (?1, ?2, ?3)
             ON CONFLICT(code) DO UPDATE SET name = ?2, active = ?3",
            params![channel.code, channel.name, channel.active as i32],
        )?;
        Ok(())
    }

    pub fn upsert_sku(&self, sku: &SkuProduct) -> PlanResult<()> {
        self.conn.execute(
            "INSERT INTO sku (sku, brand, category_macro, category, active, description)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             ON CONFLICT(sku) DO UPDATE SET
                brand = ?2, category_macro = ?3, category = ?4, active = ?5, description = ?6",
            params![
                sku.sku,
                sku.brand,
                sku.category_macro,
                sku.category,
                sku.active as i32,
                sku.description,
            ],
        )?;
        Ok(())
    }

    pub fn all_skus(&self) -> PlanResult<Vec<SkuProduct>> {
        let mut stmt = self.conn.prepare(
            "SELECT sku, brand, category_macro, category, active, description
             FROM sku ORDER BY sku ASC",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(SkuProduct {
                sku: row.get(0)?,
                brand: row.get(1)?,
                category_macro: row.get(2)?,
                category: row.get(3)?,
                active: row.get::<_, i32>(4)? != 0,
                description: row.get(5)?,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    // ── Channel/SKU links ──────────────────────────────────────

    /// Insert or update a link. The key is derived, never supplied.
    pub fn upsert_channel_sku(
        &self,
        channel_code: &str,
        sku: &str,
        active: bool,
    ) -> PlanResult<ChannelSku> {
        let key = channel_sku_key(channel_code, sku);
        self.conn.execute(
            "INSERT INTO channel_sku (channel_sku_key, channel_code, sku, active)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(channel_sku_key) DO UPDATE SET active = ?4",
            params![key, channel_code, sku, active as i32],
        )?;
        Ok(ChannelSku {
            channel_code: channel_code.to_string(),
            sku: sku.to_string(),
            channel_sku_key: key,
            active,
            discontinue_effective: None,
        })
    }

    pub fn set_discontinuation(
        &self,
        channel_sku_key: &str,
        marker: Option<FiscalMonth>,
    ) -> PlanResult<()> {
        self.conn.execute(
            "UPDATE channel_sku SET discontinue_fy = ?1, discontinue_month = ?2
             WHERE channel_sku_key = ?3",
            params![
                marker.map(|m| m.fy_start_year),
                marker.map(|m| m.month_index),
                channel_sku_key,
            ],
        )?;
        Ok(())
    }

    /// Active links whose parent SKU is itself active — the iteration set
    /// for a forecast run.
    pub fn active_channel_skus(&self) -> PlanResult<Vec<ChannelSku>> {
        let mut stmt = self.conn.prepare(
            "SELECT cs.channel_sku_key, cs.channel_code, cs.sku, cs.active,
                    cs.discontinue_fy, cs.discontinue_month
             FROM channel_sku cs
             JOIN sku s ON s.sku = cs.sku
             WHERE cs.active = 1 AND s.active = 1
             ORDER BY cs.channel_sku_key ASC",
        )?;
        let rows = stmt.query_map([], channel_sku_row_mapper)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    pub fn all_channel_skus(&self) -> PlanResult<Vec<ChannelSku>> {
        let mut stmt = self.conn.prepare(
            "SELECT channel_sku_key, channel_code, sku, active,
                    discontinue_fy, discontinue_month
             FROM channel_sku ORDER BY channel_sku_key ASC",
        )?;
        let rows = stmt.query_map([], channel_sku_row_mapper)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    // ── Variables, categories, assignments ─────────────────────

    pub fn upsert_variable(&self, variable: &Variable) -> PlanResult<()> {
        self.conn.execute(
            "INSERT INTO variable (code, name, active) VALUES (?1, ?2, ?3)
             ON CONFLICT(code) DO UPDATE SET name = ?2, active = ?3",
            params![variable.code, variable.name, variable.active as i32],
        )?;
        Ok(())
    }

    pub fn upsert_variable_category(&self, category: &VariableCategory) -> PlanResult<()> {
        self.conn.execute(
            "INSERT INTO variable_category (variable_code, code, name, active)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(variable_code, code) DO UPDATE SET name = ?3, active = ?4",
            params![
                category.variable_code,
                category.code,
                category.name,
                category.active as i32,
            ],
        )?;
        Ok(())
    }

    pub fn active_variables(&self) -> PlanResult<Vec<Variable>> {
        let mut stmt = self.conn.prepare(
            "SELECT code, name, active FROM variable WHERE active = 1 ORDER BY code ASC",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(Variable {
                code: row.get(0)?,
                name: row.get(1)?,
                active: row.get::<_, i32>(2)? != 0,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// One category per (sku, variable); re-assigning replaces.
    pub fn upsert_assignment(&self, assignment: &SkuVariableAssignment) -> PlanResult<()> {
        self.conn.execute(
            "INSERT INTO sku_variable_assignment (sku, variable_code, category_code)
             VALUES (?1, ?2, ?3)
             ON CONFLICT(sku, variable_code) DO UPDATE SET category_code = ?3",
            params![
                assignment.sku,
                assignment.variable_code,
                assignment.category_code,
            ],
        )?;
        Ok(())
    }

    pub fn all_assignments(&self) -> PlanResult<Vec<SkuVariableAssignment>> {
        let mut stmt = self.conn.prepare(
            "SELECT sku, variable_code, category_code FROM sku_variable_assignment",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(SkuVariableAssignment {
                sku: row.get(0)?,
                variable_code: row.get(1)?,
                category_code: row.get(2)?,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }
}
