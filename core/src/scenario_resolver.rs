//! Equivalent scenario resolution — which scenario stands in for the same
//! planning family in an earlier fiscal year.
//!
//! Ordered strategies, first match wins:
//!   1. lineage parent (source_scenario_id points into the target year)
//!   2. lineage siblings (same source, target year)
//!   3. normalized-name match (fiscal-year tokens stripped)
//!   4. any scenario in the target year, preferring LOCKED
//!
//! No match is not an error; the caller decides whether that is fatal.

use crate::{
    model::{Scenario, ScenarioStatus},
    types::FiscalYear,
};

type Strategy = fn(&Scenario, FiscalYear, &[Scenario]) -> Option<Scenario>;

const STRATEGIES: &[Strategy] = &[
    lineage_parent,
    lineage_sibling,
    normalized_name_match,
    any_in_year,
];

pub fn find_equivalent(
    current: &Scenario,
    target_fy: FiscalYear,
    all: &[Scenario],
) -> Option<Scenario> {
    STRATEGIES
        .iter()
        .find_map(|strategy| strategy(current, target_fy, all))
}

fn lineage_parent(current: &Scenario, target_fy: FiscalYear, all: &[Scenario]) -> Option<Scenario> {
    let source_id = current.source_scenario_id.as_deref()?;
    all.iter()
        .find(|s| s.id == source_id && s.fy_start_year == target_fy)
        .cloned()
}

fn lineage_sibling(current: &Scenario, target_fy: FiscalYear, all: &[Scenario]) -> Option<Scenario> {
    let source_id = current.source_scenario_id.as_deref()?;
    all.iter()
        .find(|s| {
            s.id != current.id
                && s.source_scenario_id.as_deref() == Some(source_id)
                && s.fy_start_year == target_fy
        })
        .cloned()
}

fn normalized_name_match(
    current: &Scenario,
    target_fy: FiscalYear,
    all: &[Scenario],
) -> Option<Scenario> {
    let base_name = normalize_name(&current.name);
    if base_name.is_empty() {
        return None;
    }
    let candidates: Vec<&Scenario> = all
        .iter()
        .filter(|s| {
            s.id != current.id
                && s.fy_start_year == target_fy
                && normalize_name(&s.name) == base_name
        })
        .collect();
    prefer_locked(&candidates)
}

fn any_in_year(current: &Scenario, target_fy: FiscalYear, all: &[Scenario]) -> Option<Scenario> {
    let candidates: Vec<&Scenario> = all
        .iter()
        .filter(|s| s.id != current.id && s.fy_start_year == target_fy)
        .collect();
    prefer_locked(&candidates)
}

/// LOCKED scenarios are finalized and more authoritative than drafts.
fn prefer_locked(candidates: &[&Scenario]) -> Option<Scenario> {
    candidates
        .iter()
        .find(|s| s.status == ScenarioStatus::Locked)
        .or_else(|| candidates.first())
        .map(|s| (*s).clone())
}

/// Strip fiscal-year tokens ("FY2025", "FY25", standalone 4-digit years),
/// 4-digit runs embedded inside tokens ("Plan2025"), and surrounding
/// separators, then lowercase. "Plan Base FY2025" and "Plan Base - 2026"
/// normalize to the same family name.
pub fn normalize_name(name: &str) -> String {
    let tokens = name
        .split(|c: char| c.is_whitespace() || c == '-' || c == '_')
        .filter(|t| !is_fy_token(t))
        .map(strip_year_runs)
        .filter(|t| !t.is_empty())
        .map(|t| t.to_lowercase())
        .collect::<Vec<_>>();
    tokens.join(" ")
}

/// Remove digit runs of exactly four digits; shorter and longer runs stay.
fn strip_year_runs(token: &str) -> String {
    let mut out = String::new();
    let mut run = String::new();
    for c in token.chars() {
        if c.is_ascii_digit() {
            run.push(c);
        } else {
            if run.len() != 4 {
                out.push_str(&run);
            }
            run.clear();
            out.push(c);
        }
    }
    if run.len() != 4 {
        out.push_str(&run);
    }
    out
}

fn is_fy_token(token: &str) -> bool {
    let lower = token.to_lowercase();
    if let Some(digits) = lower.strip_prefix("fy") {
        let digits = digits.trim();
        return (2..=4).contains(&digits.len()) && digits.chars().all(|c| c.is_ascii_digit());
    }
    lower.len() == 4 && lower.chars().all(|c| c.is_ascii_digit())
}
