// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Planning of a recalculation after a recurring event changed.
//!
//! Only rows dated `today` or later are ever in scope. For one schedule the
//! plan says which of the event's rows keep their date with a refreshed
//! snapshot, which are retired because the event moved away from their
//! weekday or was deactivated, and which new dates the event now produces.

use crate::build::{BuildOutcome, build_schedule};
use crate::error::CoreError;
use crate::fairness::FairnessTally;
use crate::materialize::materialize_dates;
use crate::roster::Roster;
use rota_domain::{
    Assignment, NewScheduleDate, RecurringEvent, Schedule, ScheduleDate, ScheduleDateId, Weekday,
};
use std::collections::BTreeSet;
use time::Date;

/// What a recalculation does to one schedule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleRecalculation {
    /// The schedule.
    pub schedule: Schedule,
    /// In-scope rows that stay, carrying the event's current snapshot.
    pub refreshed: Vec<ScheduleDate>,
    /// In-scope rows to delete along with their assignments.
    pub retired: Vec<ScheduleDate>,
    /// Rows to insert for the event's current weekday.
    pub added: Vec<NewScheduleDate>,
}

impl ScheduleRecalculation {
    /// Ids of the existing rows whose assignments are discarded.
    #[must_use]
    pub fn in_scope_ids(&self) -> BTreeSet<ScheduleDateId> {
        self.refreshed
            .iter()
            .chain(&self.retired)
            .map(|d| d.schedule_date_id)
            .collect()
    }

    /// Returns whether the plan changes nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.refreshed.is_empty() && self.retired.is_empty() && self.added.is_empty()
    }

    /// Rebuilds assignments for the refreshed rows and the newly inserted
    /// rows.
    ///
    /// `existing_assignments` are all assignments of the schedule before the
    /// recalculation; those on out-of-scope rows are counted into the tally
    /// so the rebuilt rows rotate relative to the assignments that stay.
    ///
    /// # Errors
    ///
    /// Returns an error if the roster or a row does not match the schedule.
    pub fn rebuild(
        &self,
        roster: &Roster,
        inserted: &[ScheduleDate],
        existing_assignments: &[Assignment],
        base_tally: FairnessTally,
    ) -> Result<BuildOutcome, CoreError> {
        let in_scope: BTreeSet<ScheduleDateId> = self.in_scope_ids();
        let mut tally: FairnessTally = base_tally;
        tally.absorb(
            existing_assignments
                .iter()
                .filter(|a| !in_scope.contains(&a.schedule_date_id)),
        );

        let dates: Vec<ScheduleDate> = self
            .refreshed
            .iter()
            .chain(inserted)
            .cloned()
            .collect();
        build_schedule(roster, &self.schedule, &dates, tally)
    }
}

/// Plans the recalculation of one schedule for a changed `event`.
///
/// `dates` must hold every row of the schedule, not just the event's rows,
/// so new dates are de-duplicated against rows of other events.
///
/// # Errors
///
/// Returns an error if a row belongs to another schedule or the schedule's
/// month is invalid.
pub fn plan_recalculation(
    event: &RecurringEvent,
    today: Date,
    schedule: &Schedule,
    dates: &[ScheduleDate],
) -> Result<ScheduleRecalculation, CoreError> {
    if let Some(stray) = dates
        .iter()
        .find(|d| d.schedule_id != schedule.schedule_id)
    {
        return Err(CoreError::ScheduleMismatch {
            expected: schedule.schedule_id,
            found: stray.schedule_id,
            schedule_date_id: stray.schedule_date_id,
        });
    }

    let mut refreshed: Vec<ScheduleDate> = Vec::new();
    let mut retired: Vec<ScheduleDate> = Vec::new();
    let mut remaining: Vec<ScheduleDate> = Vec::new();

    for row in dates {
        let in_scope: bool =
            row.recurring_event_id == Some(event.recurring_event_id) && row.date >= today;
        if !in_scope {
            remaining.push(row.clone());
        } else if event.active && Weekday::of(row.date) == event.weekday {
            let row: ScheduleDate = row.clone().with_refreshed_snapshot(event);
            remaining.push(row.clone());
            refreshed.push(row);
        } else {
            retired.push(row.clone());
        }
    }

    let added: Vec<NewScheduleDate> = if event.active {
        materialize_dates(schedule, std::slice::from_ref(event), &remaining, Some(today))?
    } else {
        Vec::new()
    };

    Ok(ScheduleRecalculation {
        schedule: schedule.clone(),
        refreshed,
        retired,
        added,
    })
}
