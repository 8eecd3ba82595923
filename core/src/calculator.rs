//! Monthly forecast calculation — override precedence, coefficient
//! multiplication, and discontinuation zeroing for one channel/SKU link.

use crate::{
    fiscal,
    model::{AppliedFactor, ChannelSku, ForecastMonthly, Variable, LITERS_PER_CASE},
    types::{ChannelSkuKey, FiscalYear, MonthIndex},
};
use std::collections::HashMap;

/// Lookup tables snapshotted once per run and shared across all links.
pub struct CalcContext<'a> {
    pub scenario_id: &'a str,
    pub target_fy: FiscalYear,
    /// Active variables, in iteration order.
    pub variables: &'a [Variable],
    /// (sku, variable_code) -> category_code
    pub assignment_of: &'a HashMap<(String, String), String>,
    /// (variable_code, category_code, month) -> multiplier
    pub coefficient_at: &'a HashMap<(String, String, MonthIndex), f64>,
    /// (channel_sku_key, month) -> manual base volume
    pub override_at: &'a HashMap<(ChannelSkuKey, MonthIndex), f64>,
}

/// Produce the 12 output rows for one link.
///
/// Precedence per month: override replaces the computed base; every active
/// variable contributes a factor (1.0 and `is_missing` when the SKU has no
/// assignment); a discontinuation marker zeroes everything past it.
pub fn link_forecast(ctx: &CalcContext<'_>, link: &ChannelSku, monthly_base: f64) -> Vec<ForecastMonthly> {
    let mut rows = Vec::with_capacity(12);

    for month in 1..=12u32 {
        let effective_base = ctx
            .override_at
            .get(&(link.channel_sku_key.clone(), month))
            .copied()
            .unwrap_or(monthly_base);

        let (total_factor, factors_applied) = fold_factors(ctx, &link.sku, month);

        let mut forecast_c9l = effective_base * total_factor;
        let mut is_discontinued = false;
        if !fiscal::is_edit_allowed(link.discontinue_effective.as_ref(), ctx.target_fy, month) {
            forecast_c9l = 0.0;
            is_discontinued = true;
        }

        rows.push(ForecastMonthly {
            id: uuid::Uuid::new_v4().to_string(),
            scenario_id: ctx.scenario_id.to_string(),
            channel_sku_key: link.channel_sku_key.clone(),
            fy_start_year: ctx.target_fy,
            month_index: month,
            base_monthly_c9l: effective_base,
            forecast_c9l,
            forecast_liters: forecast_c9l * LITERS_PER_CASE,
            is_discontinued,
            factors_applied,
        });
    }

    rows
}

/// Fold over active variables carrying the running multiplier and the
/// applied-factor audit trail together.
fn fold_factors(ctx: &CalcContext<'_>, sku: &str, month: MonthIndex) -> (f64, Vec<AppliedFactor>) {
    ctx.variables.iter().fold(
        (1.0, Vec::with_capacity(ctx.variables.len())),
        |(factor, mut applied), variable| {
            match ctx
                .assignment_of
                .get(&(sku.to_string(), variable.code.clone()))
            {
                Some(category_code) => {
                    let value = ctx
                        .coefficient_at
                        .get(&(variable.code.clone(), category_code.clone(), month))
                        .copied()
                        .unwrap_or(1.0);
                    applied.push(AppliedFactor {
                        variable_code: variable.code.clone(),
                        category_code: Some(category_code.clone()),
                        value,
                        is_missing: false,
                    });
                    (factor * value, applied)
                }
                None => {
                    // No assignment: neutral factor, surfaced downstream.
                    applied.push(AppliedFactor {
                        variable_code: variable.code.clone(),
                        category_code: None,
                        value: 1.0,
                        is_missing: true,
                    });
                    (factor, applied)
                }
            }
        },
    )
}
