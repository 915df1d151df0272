// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::CoreError;
use rota_domain::{RecurringEventId, Schedule, ScheduleDate, ScheduleId};
use serde::Serialize;
use std::collections::BTreeMap;

/// How many rows of one schedule reference an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScheduleImpact {
    /// The schedule.
    pub schedule_id: ScheduleId,
    /// Its month.
    pub month: u8,
    /// Its year.
    pub year: i32,
    /// Rows referencing the event.
    pub date_count: usize,
}

/// Rows referencing a recurring event, grouped by schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImpactReport {
    /// The event.
    pub recurring_event_id: RecurringEventId,
    /// Total rows referencing the event.
    pub count: usize,
    /// Per-schedule breakdown, ordered by year, month, then id.
    pub schedules: Vec<ScheduleImpact>,
}

/// Counts the rows of `dates` referencing `recurring_event_id`.
///
/// # Errors
///
/// Returns `CoreError::UnknownSchedule` if a referencing row belongs to a
/// schedule missing from `schedules`.
pub fn summarize_impact(
    recurring_event_id: RecurringEventId,
    schedules: &[Schedule],
    dates: &[ScheduleDate],
) -> Result<ImpactReport, CoreError> {
    let mut per_schedule: BTreeMap<ScheduleId, usize> = BTreeMap::new();
    for date in dates
        .iter()
        .filter(|d| d.recurring_event_id == Some(recurring_event_id))
    {
        *per_schedule.entry(date.schedule_id).or_insert(0) += 1;
    }

    let mut impacts: Vec<ScheduleImpact> = per_schedule
        .into_iter()
        .map(|(schedule_id, date_count)| {
            schedules
                .iter()
                .find(|s| s.schedule_id == schedule_id)
                .map(|s| ScheduleImpact {
                    schedule_id,
                    month: s.month,
                    year: s.year,
                    date_count,
                })
                .ok_or(CoreError::UnknownSchedule(schedule_id))
        })
        .collect::<Result<_, _>>()?;
    impacts.sort_by_key(|i| (i.year, i.month, i.schedule_id));

    Ok(ImpactReport {
        recurring_event_id,
        count: impacts.iter().map(|i| i.date_count).sum(),
        schedules: impacts,
    })
}
