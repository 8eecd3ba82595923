//! volplan-core: unit-volume forecast engine for fiscal-year planning.
//!
//! The engine blends prior-year history (or a weighted two-year fallback),
//! per-category coefficients, manual overrides, and discontinuation rules
//! into a twelve-month projection per channel/SKU, persisted as a
//! replaceable materialized view.

pub mod base_volume;
pub mod calculator;
pub mod comparison;
pub mod engine;
pub mod error;
pub mod fiscal;
pub mod model;
pub mod scenario_resolver;
pub mod store;
pub mod types;
