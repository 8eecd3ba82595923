//! Fiscal calendar — April-to-March years and discontinuation cutoffs.
//!
//! Month index 1 = April ... 12 = March. Calendar January-March belong
//! to the previous fiscal year.

use crate::{
    error::{PlanError, PlanResult},
    types::{FiscalYear, MonthIndex},
};
use serde::{Deserialize, Serialize};

pub const MONTH_LABELS: [&str; 12] = [
    "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec", "Jan", "Feb", "Mar",
];

/// A (fiscal year, month index) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FiscalMonth {
    pub fy_start_year: FiscalYear,
    pub month_index: MonthIndex,
}

/// Convert a calendar (day, month, year) triple to a fiscal month.
///
/// Upstream data is always first-of-month; anything else is rejected,
/// never coerced.
pub fn fiscal_month_from_calendar(day: u32, month: u32, year: i32) -> PlanResult<FiscalMonth> {
    if day != 1 || !(1..=12).contains(&month) {
        return Err(PlanError::MalformedDate {
            input: format!("{day:02}-{month:02}-{year}"),
        });
    }

    // Calendar: 1  2  3  4  5  6  7  8  9 10 11 12
    // FY index: 10 11 12 1  2  3  4  5  6  7  8  9
    if month >= 4 {
        Ok(FiscalMonth {
            fy_start_year: year,
            month_index: month - 3,
        })
    } else {
        Ok(FiscalMonth {
            fy_start_year: year - 1,
            month_index: month + 9,
        })
    }
}

/// Whether a (target FY, target month) falls at or before a discontinuation
/// marker. With no marker everything is allowed; months after the marker in
/// the same year, and every month of later years, are blocked.
pub fn is_edit_allowed(
    marker: Option<&FiscalMonth>,
    target_fy: FiscalYear,
    target_month: MonthIndex,
) -> bool {
    let Some(marker) = marker else { return true };

    if target_fy < marker.fy_start_year {
        return true;
    }
    if target_fy > marker.fy_start_year {
        return false;
    }
    target_month <= marker.month_index
}

pub fn month_label(month_index: MonthIndex) -> &'static str {
    (month_index as usize)
        .checked_sub(1)
        .and_then(|i| MONTH_LABELS.get(i))
        .copied()
        .unwrap_or("?")
}
