//! Helpers for building monthly period facts.
//!
//! Period creation is owned by the calendar-management surface upstream;
//! these helpers only build facts for embedding and tests, they never
//! persist anything.

use chrono::{Datelike, NaiveDate};

use crate::period::types::{FiscalPeriod, PeriodError};

/// Builds one open period per calendar month covering `[start_date, end_date]`.
///
/// Codes are `YYYY-MM` tokens. The final period is truncated to `end_date`
/// when the range does not end on a month boundary.
///
/// # Errors
///
/// Returns [`PeriodError::InvalidDateRange`] if `start_date > end_date`.
pub fn monthly_periods(
    start_date: NaiveDate,
    end_date: NaiveDate,
    responsible_party: &str,
) -> Result<Vec<FiscalPeriod>, PeriodError> {
    if start_date > end_date {
        return Err(PeriodError::InvalidDateRange);
    }

    let mut periods = Vec::new();
    let mut current = start_date;

    while current <= end_date {
        let month_end = last_day_of_month(current.year(), current.month());
        let period_end = if month_end > end_date { end_date } else { month_end };
        let code = format!("{:04}-{:02}", current.year(), current.month());

        periods.push(FiscalPeriod::new(
            code,
            current,
            period_end,
            responsible_party,
        )?);

        current = if current.month() == 12 {
            NaiveDate::from_ymd_opt(current.year() + 1, 1, 1).unwrap()
        } else {
            NaiveDate::from_ymd_opt(current.year(), current.month() + 1, 1).unwrap()
        };
    }

    Ok(periods)
}

/// Returns the last day of a month.
fn last_day_of_month(year: i32, month: u32) -> NaiveDate {
    let next_month = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    };

    next_month
        .unwrap()
        .pred_opt()
        .unwrap_or_else(|| NaiveDate::from_ymd_opt(year, month, 28).unwrap())
}
