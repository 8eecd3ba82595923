//! Entity model — master data, scenario configuration, and forecast output.
//!
//! All volumes are in c9l (nine-liter cases); the secondary unit is plain
//! liters at a fixed 9:1 ratio.

use crate::{
    fiscal::FiscalMonth,
    types::{ChannelSkuKey, FiscalYear, MonthIndex, ScenarioId},
};
use serde::{Deserialize, Serialize};

pub const LITERS_PER_CASE: f64 = 9.0;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Channel {
    pub code: String, // TT, MT
    pub name: String,
    pub active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkuProduct {
    pub sku: String,
    pub brand: String,
    pub category_macro: String, // Spirits, Wine
    pub category: String,       // Vodka, Gin
    pub active: bool,
    pub description: String,
}

/// A channel/product link. The derived key is unique and immutable once
/// history references it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelSku {
    pub channel_code: String,
    pub sku: String,
    pub channel_sku_key: ChannelSkuKey,
    pub active: bool,
    /// Forecast is forced to zero strictly after this fiscal month.
    pub discontinue_effective: Option<FiscalMonth>,
}

pub fn channel_sku_key(channel_code: &str, sku: &str) -> ChannelSkuKey {
    format!("{channel_code}_{sku}")
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoricMonthly {
    pub channel_sku_key: ChannelSkuKey,
    pub fy_start_year: FiscalYear,
    pub month_index: MonthIndex,
    pub c9l: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Variable {
    pub code: String,
    pub name: String, // Seasonality, Status, BrandGrowth
    pub active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VariableCategory {
    pub variable_code: String,
    pub code: String,
    pub name: String, // High Season, Launch, Mature
    pub active: bool,
}

/// Maps a SKU to exactly one category per variable. A SKU with no
/// assignment for an active variable is surfaced as a missing factor,
/// never defaulted silently.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkuVariableAssignment {
    pub sku: String,
    pub variable_code: String,
    pub category_code: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScenarioStatus {
    Draft,
    Locked,
}

impl ScenarioStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "DRAFT",
            Self::Locked => "LOCKED",
        }
    }

    pub fn from_db(s: &str) -> Self {
        match s {
            "LOCKED" => Self::Locked,
            _ => Self::Draft,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    pub id: ScenarioId,
    pub name: String,
    pub fy_start_year: FiscalYear,
    pub status: ScenarioStatus,
    pub description: Option<String>,
    /// Lineage from a clone operation; drives equivalent-scenario resolution.
    pub source_scenario_id: Option<ScenarioId>,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioCoefficient {
    pub scenario_id: ScenarioId,
    pub variable_code: String,
    pub category_code: String,
    pub month_index: MonthIndex,
    pub value: f64, // multiplier, 1.0 = no effect
}

/// A manually entered base volume replacing the computed base for one
/// exact (key, month).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverrideBaseMonthly {
    pub scenario_id: ScenarioId,
    pub channel_sku_key: ChannelSkuKey,
    pub fy_start_year: FiscalYear,
    pub month_index: MonthIndex,
    pub base_monthly_c9l: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppliedFactor {
    pub variable_code: String,
    pub category_code: Option<String>,
    pub value: f64,
    pub is_missing: bool,
}

/// One forecast output row. Entirely derived and disposable: every run
/// replaces all rows for its scenario.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastMonthly {
    pub id: String,
    pub scenario_id: ScenarioId,
    pub channel_sku_key: ChannelSkuKey,
    pub fy_start_year: FiscalYear,
    pub month_index: MonthIndex,
    pub base_monthly_c9l: f64,
    pub forecast_c9l: f64,
    pub forecast_liters: f64,
    pub is_discontinued: bool,
    pub factors_applied: Vec<AppliedFactor>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BaseSource {
    HistoricFyMinus1,
    Weighted7525,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastStats {
    pub total_forecast_c9l: f64,
    pub total_base_c9l: f64,
    pub growth_percent: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastMetadata {
    pub base_source: BaseSource,
    pub base_details: String,
    pub warnings: Vec<String>,
    /// Name of the scenario that stood in for FY target-1 (weighted only).
    pub stand_in_scenario: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastReport {
    pub stats: ForecastStats,
    pub metadata: ForecastMetadata,
    pub rows: Vec<ForecastMonthly>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEvent {
    pub id: String,
    pub occurred_at: String,
    pub actor: String,
    pub action: String, // FORECAST_RUN, CLONE, ...
    pub summary: String,
    pub entity_type: Option<String>,
    pub entity_id: Option<String>,
}
