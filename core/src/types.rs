//! Shared primitive types used across the planning core.

/// A fiscal year, named by its starting calendar year (FY2025 = Apr 2025 - Mar 2026).
pub type FiscalYear = i32;

/// A fiscal month index. 1 = April ... 12 = March.
pub type MonthIndex = u32;

/// The derived channel/product key, e.g. "TT_SKU100".
pub type ChannelSkuKey = String;

/// The canonical scenario identifier.
pub type ScenarioId = String;
