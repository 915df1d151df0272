// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Calendar expansion of weekdays into the dates of one month.
//!
//! Dates are computed on `time::Date`, which carries no offset, so the
//! same `(month, year, weekdays)` input always yields the same dates
//! regardless of the host timezone or locale.

use crate::error::DomainError;
use crate::types::Weekday;
use crate::validation::{validate_month, validate_year};
use time::{Date, Month};

/// Returns every date of `month`/`year` falling on one of `active_days`.
///
/// The result is strictly ascending with no duplicates. An empty
/// `active_days` yields an empty result.
///
/// # Errors
///
/// Returns an error if the month is outside 1-12 or the year is outside
/// the supported range.
pub fn expand_month(
    month: u8,
    year: i32,
    active_days: &[Weekday],
) -> Result<Vec<Date>, DomainError> {
    let month: Month = validate_month(month)?;
    validate_year(year)?;

    if active_days.is_empty() {
        return Ok(Vec::new());
    }

    let days_in_month: u8 = time::util::days_in_month(month, year);
    let mut dates: Vec<Date> = Vec::new();
    for day in 1..=days_in_month {
        let date: Date = Date::from_calendar_date(year, month, day).map_err(|e| {
            DomainError::DateParseError {
                date_string: format!("{year:04}-{:02}-{day:02}", u8::from(month)),
                error: e.to_string(),
            }
        })?;
        if active_days.contains(&Weekday::of(date)) {
            dates.push(date);
        }
    }

    Ok(dates)
}

/// Same as [`expand_month`] but takes weekday names, as configured by users.
///
/// # Errors
///
/// Returns an error if any name is not a weekday, or if the month or year
/// is invalid.
pub fn expand_month_by_names(
    month: u8,
    year: i32,
    active_day_names: &[&str],
) -> Result<Vec<Date>, DomainError> {
    let days: Vec<Weekday> = active_day_names
        .iter()
        .map(|name| name.parse::<Weekday>())
        .collect::<Result<_, _>>()?;
    expand_month(month, year, &days)
}
