use crate::types::FiscalYear;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PlanError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Scenario '{scenario_id}' not found")]
    ScenarioNotFound { scenario_id: String },

    #[error("Scenario '{name}' is LOCKED; overrides and coefficients are read-only")]
    ScenarioLocked { name: String },

    #[error(
        "No history exists for FY{previous_fy} or FY{fallback_fy}; \
         base volume cannot be computed"
    )]
    InsufficientHistory {
        previous_fy: FiscalYear,
        fallback_fy: FiscalYear,
    },

    #[error(
        "Weighted 75/25 base requires an equivalent scenario for FY{fiscal_year} \
         and none was found"
    )]
    NoEquivalentScenario { fiscal_year: FiscalYear },

    #[error(
        "Scenario '{scenario_name}' (FY{fiscal_year}) has no generated forecast; \
         generate it first to use it as a base"
    )]
    MissingPriorForecast {
        scenario_name: String,
        fiscal_year: FiscalYear,
    },

    #[error("Malformed date '{input}': expected a first-of-month date")]
    MalformedDate { input: String },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type PlanResult<T> = Result<T, PlanError>;
