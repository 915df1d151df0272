// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Schedule, schedule date and assignment queries.

use diesel::SqliteConnection;
use diesel::dsl::count_star;
use diesel::prelude::*;
use num_traits::ToPrimitive;
use rota_domain::{
    Assignment, EventSnapshot, GroupId, MemberId, RecurringEventId, RoleId, Schedule,
    ScheduleDate, ScheduleDateId, ScheduleId, ScheduleStatus, TimeWindow, parse_iso_date,
};
use tracing::debug;

use super::kind_from_column;
use crate::diesel_schema::{assignments, schedule_dates, schedules};
use crate::error::PersistenceError;

#[derive(Queryable, Selectable)]
#[diesel(table_name = schedules)]
struct ScheduleRow {
    schedule_id: i64,
    group_id: i64,
    month: i32,
    year: i32,
    status: String,
}

impl ScheduleRow {
    fn into_domain(self) -> Result<Schedule, PersistenceError> {
        let month: u8 = self.month.to_u8().ok_or_else(|| {
            PersistenceError::ReconstructionError(format!("Invalid stored month: {}", self.month))
        })?;
        Ok(Schedule {
            schedule_id: ScheduleId::new(self.schedule_id),
            group_id: GroupId::new(self.group_id),
            month,
            year: self.year,
            status: self.status.parse::<ScheduleStatus>()?,
        })
    }
}

#[derive(Queryable, Selectable)]
#[diesel(table_name = schedule_dates)]
pub(crate) struct ScheduleDateRow {
    schedule_date_id: i64,
    schedule_id: i64,
    date: String,
    kind: String,
    label: Option<String>,
    start_time: String,
    end_time: String,
    recurring_event_id: Option<i64>,
}

impl ScheduleDateRow {
    pub(crate) fn into_domain(self) -> Result<ScheduleDate, PersistenceError> {
        let snapshot: EventSnapshot = EventSnapshot::new(
            kind_from_column(&self.kind)?,
            self.label,
            TimeWindow::parse(&self.start_time, &self.end_time)?,
        );
        Ok(ScheduleDate::new(
            ScheduleDateId::new(self.schedule_date_id),
            ScheduleId::new(self.schedule_id),
            parse_iso_date(&self.date)?,
            self.recurring_event_id.map(RecurringEventId::new),
            snapshot,
        ))
    }
}

#[derive(Queryable, Selectable)]
#[diesel(table_name = assignments)]
struct AssignmentRow {
    schedule_date_id: i64,
    role_id: i64,
    member_id: i64,
}

impl From<AssignmentRow> for Assignment {
    fn from(row: AssignmentRow) -> Self {
        Self {
            schedule_date_id: ScheduleDateId::new(row.schedule_date_id),
            role_id: RoleId::new(row.role_id),
            member_id: MemberId::new(row.member_id),
        }
    }
}

/// Retrieves a schedule by id.
///
/// # Errors
///
/// Returns an error if the query fails or the stored row is invalid.
pub fn get_schedule(
    conn: &mut SqliteConnection,
    schedule_id: ScheduleId,
) -> Result<Option<Schedule>, PersistenceError> {
    schedules::table
        .filter(schedules::schedule_id.eq(schedule_id.value()))
        .select(ScheduleRow::as_select())
        .first(conn)
        .optional()?
        .map(ScheduleRow::into_domain)
        .transpose()
}

/// Finds the schedule of a group for a month.
///
/// # Errors
///
/// Returns an error if the query fails or the stored row is invalid.
pub fn find_schedule(
    conn: &mut SqliteConnection,
    group_id: GroupId,
    month: u8,
    year: i32,
) -> Result<Option<Schedule>, PersistenceError> {
    schedules::table
        .filter(schedules::group_id.eq(group_id.value()))
        .filter(schedules::month.eq(i32::from(month)))
        .filter(schedules::year.eq(year))
        .select(ScheduleRow::as_select())
        .first(conn)
        .optional()?
        .map(ScheduleRow::into_domain)
        .transpose()
}

/// Lists every schedule of a group in calendar order.
///
/// # Errors
///
/// Returns an error if the query fails or a stored row is invalid.
pub fn list_schedules(
    conn: &mut SqliteConnection,
    group_id: GroupId,
) -> Result<Vec<Schedule>, PersistenceError> {
    schedules::table
        .filter(schedules::group_id.eq(group_id.value()))
        .order((schedules::year.asc(), schedules::month.asc()))
        .select(ScheduleRow::as_select())
        .load(conn)?
        .into_iter()
        .map(ScheduleRow::into_domain)
        .collect()
}

/// Lists the schedules with the given ids.
///
/// # Errors
///
/// Returns an error if the query fails or a stored row is invalid.
pub fn list_schedules_by_ids(
    conn: &mut SqliteConnection,
    schedule_ids: &[ScheduleId],
) -> Result<Vec<Schedule>, PersistenceError> {
    schedules::table
        .filter(schedules::schedule_id.eq_any(schedule_ids.iter().map(|id| id.value())))
        .order(schedules::schedule_id.asc())
        .select(ScheduleRow::as_select())
        .load(conn)?
        .into_iter()
        .map(ScheduleRow::into_domain)
        .collect()
}

/// Lists the dates of a schedule in ascending date order.
///
/// # Errors
///
/// Returns an error if the query fails or a stored row is invalid.
pub fn list_schedule_dates(
    conn: &mut SqliteConnection,
    schedule_id: ScheduleId,
) -> Result<Vec<ScheduleDate>, PersistenceError> {
    schedule_dates::table
        .filter(schedule_dates::schedule_id.eq(schedule_id.value()))
        .order((schedule_dates::date.asc(), schedule_dates::schedule_date_id.asc()))
        .select(ScheduleDateRow::as_select())
        .load(conn)?
        .into_iter()
        .map(ScheduleDateRow::into_domain)
        .collect()
}

/// Lists every schedule date referencing a recurring event, across all
/// schedules.
///
/// # Errors
///
/// Returns an error if the query fails or a stored row is invalid.
pub fn list_schedule_dates_for_event(
    conn: &mut SqliteConnection,
    recurring_event_id: RecurringEventId,
) -> Result<Vec<ScheduleDate>, PersistenceError> {
    schedule_dates::table
        .filter(schedule_dates::recurring_event_id.eq(recurring_event_id.value()))
        .order((schedule_dates::date.asc(), schedule_dates::schedule_date_id.asc()))
        .select(ScheduleDateRow::as_select())
        .load(conn)?
        .into_iter()
        .map(ScheduleDateRow::into_domain)
        .collect()
}

/// Lists the assignments of a schedule in date order.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn list_assignments(
    conn: &mut SqliteConnection,
    schedule_id: ScheduleId,
) -> Result<Vec<Assignment>, PersistenceError> {
    let rows: Vec<AssignmentRow> = assignments::table
        .inner_join(schedule_dates::table)
        .filter(schedule_dates::schedule_id.eq(schedule_id.value()))
        .order((schedule_dates::date.asc(), assignments::assignment_id.asc()))
        .select(AssignmentRow::as_select())
        .load(conn)?;
    Ok(rows.into_iter().map(Assignment::from).collect())
}

/// Counts assignments per member across the given schedules.
///
/// Used to seed the fairness tally from committed history.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn count_assignments_by_member(
    conn: &mut SqliteConnection,
    schedule_ids: &[ScheduleId],
) -> Result<Vec<(MemberId, u32)>, PersistenceError> {
    if schedule_ids.is_empty() {
        return Ok(Vec::new());
    }

    let rows: Vec<(i64, i64)> = assignments::table
        .inner_join(schedule_dates::table)
        .filter(schedule_dates::schedule_id.eq_any(schedule_ids.iter().map(|id| id.value())))
        .group_by(assignments::member_id)
        .select((assignments::member_id, count_star()))
        .load(conn)?;

    debug!(
        schedules = schedule_ids.len(),
        members = rows.len(),
        "Counted historical assignments"
    );

    rows.into_iter()
        .map(|(member_id, count)| {
            count
                .to_u32()
                .map(|count| (MemberId::new(member_id), count))
                .ok_or_else(|| {
                    PersistenceError::ReconstructionError(format!(
                        "Assignment count out of range: {count}"
                    ))
                })
        })
        .collect()
}
