//! Scenario comparison — diff the persisted outputs of two scenarios,
//! grouped by channel, brand, macro category, or SKU.
//!
//! Reads forecast output only; the engine must have run for both sides.

use crate::{error::PlanResult, store::PlanStore, types::ChannelSkuKey};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupBy {
    Channel,
    Brand,
    CategoryMacro,
    Sku,
}

#[derive(Debug, Clone, Serialize)]
pub struct ComparisonDetailRow {
    pub channel_sku_key: ChannelSkuKey,
    pub sku: String,
    pub channel: String,
    pub vol_a: f64,
    pub vol_b: f64,
    pub delta_vol: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ComparisonRow {
    pub group_key: String,
    pub vol_a: f64,
    pub liters_a: f64,
    pub vol_b: f64,
    pub liters_b: f64,
    pub delta_vol: f64,
    /// None when side A has no volume (percent undefined).
    pub delta_vol_pct: Option<f64>,
    pub details: Vec<ComparisonDetailRow>,
}

#[derive(Debug, Clone, Copy, Default)]
struct Aggregate {
    vol: f64,
    liters: f64,
}

/// Whole-year aggregates per key for one scenario's output.
fn fy_aggregates(store: &PlanStore, scenario_id: &str) -> PlanResult<HashMap<ChannelSkuKey, Aggregate>> {
    let mut map: HashMap<ChannelSkuKey, Aggregate> = HashMap::new();
    for row in store.forecasts_for_scenario(scenario_id)? {
        let entry = map.entry(row.channel_sku_key).or_default();
        entry.vol += row.forecast_c9l;
        entry.liters += row.forecast_liters;
    }
    Ok(map)
}

pub fn compare_scenarios(
    store: &PlanStore,
    scenario_a_id: &str,
    scenario_b_id: &str,
    group_by: GroupBy,
) -> PlanResult<Vec<ComparisonRow>> {
    let agg_a = fy_aggregates(store, scenario_a_id)?;
    let agg_b = fy_aggregates(store, scenario_b_id)?;

    let links: HashMap<ChannelSkuKey, _> = store
        .all_channel_skus()?
        .into_iter()
        .map(|l| (l.channel_sku_key.clone(), l))
        .collect();
    let skus: HashMap<String, _> = store
        .all_skus()?
        .into_iter()
        .map(|s| (s.sku.clone(), s))
        .collect();

    let group_of = |key: &str| -> String {
        let link = links.get(key);
        let sku = link.and_then(|l| skus.get(&l.sku));
        match group_by {
            GroupBy::Channel => link.map(|l| l.channel_code.clone()),
            GroupBy::Brand => sku.map(|s| s.brand.clone()),
            GroupBy::CategoryMacro => sku.map(|s| s.category_macro.clone()),
            GroupBy::Sku => link.map(|l| l.sku.clone()),
        }
        .unwrap_or_else(|| key.to_string())
    };

    // Union of keys from both sides, grouped.
    let mut keys: Vec<&ChannelSkuKey> = agg_a.keys().chain(agg_b.keys()).collect();
    keys.sort();
    keys.dedup();

    let mut groups: BTreeMap<String, ComparisonRow> = BTreeMap::new();
    for key in keys {
        let a = agg_a.get(key).copied().unwrap_or_default();
        let b = agg_b.get(key).copied().unwrap_or_default();
        let group_key = group_of(key);

        let row = groups.entry(group_key.clone()).or_insert(ComparisonRow {
            group_key,
            vol_a: 0.0,
            liters_a: 0.0,
            vol_b: 0.0,
            liters_b: 0.0,
            delta_vol: 0.0,
            delta_vol_pct: None,
            details: Vec::new(),
        });
        row.vol_a += a.vol;
        row.liters_a += a.liters;
        row.vol_b += b.vol;
        row.liters_b += b.liters;
        row.details.push(ComparisonDetailRow {
            channel_sku_key: key.clone(),
            sku: links.get(key).map(|l| l.sku.clone()).unwrap_or_default(),
            channel: links
                .get(key)
                .map(|l| l.channel_code.clone())
                .unwrap_or_default(),
            vol_a: a.vol,
            vol_b: b.vol,
            delta_vol: b.vol - a.vol,
        });
    }

    let mut rows: Vec<ComparisonRow> = groups.into_values().collect();
    for row in &mut rows {
        row.delta_vol = row.vol_b - row.vol_a;
        row.delta_vol_pct = if row.vol_a > 0.0 {
            Some((row.vol_b - row.vol_a) / row.vol_a * 100.0)
        } else {
            None
        };
    }
    Ok(rows)
}
