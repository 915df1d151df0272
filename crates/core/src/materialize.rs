// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! The event materializer.
//!
//! Turns the active recurring events of a group into schedule date rows for
//! one schedule month. The computation is pure: it returns the rows to
//! insert and never the rows that already exist, so running it again over
//! its own output yields nothing.

use crate::error::CoreError;
use rota_domain::{
    NewScheduleDate, RecurringEvent, Schedule, ScheduleDate, expand_month,
};
use std::collections::BTreeSet;
use time::Date;

/// Computes the schedule dates missing from `schedule`.
///
/// Active events of the schedule's group are processed in ascending id
/// order. A date already present in `existing`, or produced by an earlier
/// event, is skipped, so the lowest-id event wins when two active events
/// share a weekday. Dates before `not_before`, when given, are skipped.
///
/// # Errors
///
/// Returns an error if the schedule's month or year is invalid.
pub fn materialize_dates(
    schedule: &Schedule,
    events: &[RecurringEvent],
    existing: &[ScheduleDate],
    not_before: Option<Date>,
) -> Result<Vec<NewScheduleDate>, CoreError> {
    let mut active: Vec<&RecurringEvent> = events
        .iter()
        .filter(|e| e.active && e.group_id == schedule.group_id)
        .collect();
    active.sort_by_key(|e| e.recurring_event_id);

    let mut taken: BTreeSet<Date> = existing
        .iter()
        .filter(|d| d.schedule_id == schedule.schedule_id)
        .map(|d| d.date)
        .collect();
    let mut created: Vec<NewScheduleDate> = Vec::new();

    for event in active {
        for date in expand_month(schedule.month, schedule.year, &[event.weekday])? {
            if not_before.is_some_and(|cutoff| date < cutoff) {
                continue;
            }
            if !taken.insert(date) {
                continue;
            }
            created.push(NewScheduleDate {
                schedule_id: schedule.schedule_id,
                date,
                recurring_event_id: Some(event.recurring_event_id),
                snapshot: event.snapshot(),
            });
        }
    }

    created.sort_by_key(|d| d.date);
    Ok(created)
}
