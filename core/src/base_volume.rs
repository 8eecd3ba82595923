//! Base volume resolution — one strategy per run, applied per key.
//!
//! Direct: monthly base = sum(history FY-1) / 12.
//! Weighted 75/25: monthly base = (0.75 * sum(history FY-2)
//!   + 0.25 * sum(stand-in forecast FY-1)) / 12, used only when FY-1
//!   history is entirely absent.

use crate::{
    error::{PlanError, PlanResult},
    model::{BaseSource, Scenario},
    scenario_resolver,
    store::{PlanStore, VolumeSum},
    types::{ChannelSkuKey, FiscalYear},
};
use std::collections::{BTreeSet, HashMap};

pub const WEIGHT_HISTORY: f64 = 0.75;
pub const WEIGHT_FORECAST: f64 = 0.25;

#[derive(Debug, Clone)]
pub enum BaseStrategy {
    Direct {
        previous_fy: FiscalYear,
    },
    Weighted {
        history_fy: FiscalYear,
        forecast_fy: FiscalYear,
        stand_in: Scenario,
    },
}

/// Per-key result: the flat monthly base and this key's contribution to
/// the scenario-level base volume total.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeyBase {
    pub monthly_base: f64,
    pub base_total: f64,
}

pub struct BaseVolumeResolver {
    strategy: BaseStrategy,
    history_prev: HashMap<ChannelSkuKey, VolumeSum>,
    history_fallback: HashMap<ChannelSkuKey, VolumeSum>,
    prior_forecast: HashMap<ChannelSkuKey, VolumeSum>,
}

impl BaseVolumeResolver {
    /// Decide the strategy for the whole run and snapshot the volume sums
    /// it needs. Fails fatally when neither preceding year has history, or
    /// when the weighted rule has no usable stand-in forecast.
    pub fn prepare(
        store: &PlanStore,
        scenario: &Scenario,
        all_scenarios: &[Scenario],
    ) -> PlanResult<Self> {
        let target_fy = scenario.fy_start_year;
        let previous_fy = target_fy - 1;

        if store.history_exists_for_fy(previous_fy)? {
            log::info!(
                "scenario '{}': direct base from FY{previous_fy} history",
                scenario.name
            );
            return Ok(Self {
                strategy: BaseStrategy::Direct { previous_fy },
                history_prev: store.history_sums_for_fy(previous_fy)?,
                history_fallback: HashMap::new(),
                prior_forecast: HashMap::new(),
            });
        }

        let fallback_fy = target_fy - 2;
        if !store.history_exists_for_fy(fallback_fy)? {
            return Err(PlanError::InsufficientHistory {
                previous_fy,
                fallback_fy,
            });
        }

        let stand_in = scenario_resolver::find_equivalent(scenario, previous_fy, all_scenarios)
            .ok_or(PlanError::NoEquivalentScenario {
                fiscal_year: previous_fy,
            })?;
        if !store.forecast_exists_for_scenario(&stand_in.id)? {
            return Err(PlanError::MissingPriorForecast {
                scenario_name: stand_in.name,
                fiscal_year: previous_fy,
            });
        }

        log::info!(
            "scenario '{}': weighted 75/25 base, FY{fallback_fy} history + '{}' forecast",
            scenario.name,
            stand_in.name
        );
        Ok(Self {
            history_fallback: store.history_sums_for_fy(fallback_fy)?,
            prior_forecast: store.forecast_sums_for_scenario(&stand_in.id, previous_fy)?,
            strategy: BaseStrategy::Weighted {
                history_fy: fallback_fy,
                forecast_fy: previous_fy,
                stand_in,
            },
            history_prev: HashMap::new(),
        })
    }

    pub fn base_source(&self) -> BaseSource {
        match self.strategy {
            BaseStrategy::Direct { .. } => BaseSource::HistoricFyMinus1,
            BaseStrategy::Weighted { .. } => BaseSource::Weighted7525,
        }
    }

    pub fn details(&self) -> String {
        match &self.strategy {
            BaseStrategy::Direct { previous_fy } => {
                format!("Monthly base computed from actual FY{previous_fy} history.")
            }
            BaseStrategy::Weighted {
                history_fy,
                forecast_fy,
                stand_in,
            } => format!(
                "Base 75% FY{history_fy} history + 25% FY{forecast_fy} forecast (scenario: {}).",
                stand_in.name
            ),
        }
    }

    pub fn stand_in_name(&self) -> Option<String> {
        match &self.strategy {
            BaseStrategy::Direct { .. } => None,
            BaseStrategy::Weighted { stand_in, .. } => Some(stand_in.name.clone()),
        }
    }

    /// Compute one key's monthly base under the chosen strategy.
    ///
    /// A key with zero volume in every input simply yields a base of zero;
    /// incomplete month coverage on a non-zero input adds a warning.
    pub fn key_base(&self, key: &str, warnings: &mut BTreeSet<String>) -> KeyBase {
        match &self.strategy {
            BaseStrategy::Direct { previous_fy } => {
                let Some(h) = self.history_prev.get(key) else {
                    return KeyBase::default();
                };
                if h.sum <= 0.0 {
                    return KeyBase::default();
                }
                if h.months < 12 {
                    warnings.insert(format!(
                        "FY{previous_fy} history incomplete for {key} ({}/12 months)",
                        h.months
                    ));
                }
                KeyBase {
                    monthly_base: h.sum / 12.0,
                    base_total: h.sum,
                }
            }
            BaseStrategy::Weighted {
                history_fy,
                forecast_fy,
                ..
            } => {
                let h = self.history_fallback.get(key).copied().unwrap_or_default();
                let f = self.prior_forecast.get(key).copied().unwrap_or_default();
                if h.sum <= 0.0 && f.sum <= 0.0 {
                    return KeyBase::default();
                }
                if h.months < 12 && h.sum > 0.0 {
                    warnings.insert(format!(
                        "FY{history_fy} history incomplete for {key} ({}/12 months)",
                        h.months
                    ));
                }
                if f.months < 12 && f.sum > 0.0 {
                    warnings.insert(format!(
                        "FY{forecast_fy} forecast incomplete for {key} ({}/12 months)",
                        f.months
                    ));
                }
                let weighted = WEIGHT_HISTORY * h.sum + WEIGHT_FORECAST * f.sum;
                KeyBase {
                    monthly_base: weighted / 12.0,
                    base_total: weighted,
                }
            }
        }
    }
}
