// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use diesel::SqliteConnection;
use diesel::prelude::*;
use rota_domain::{GroupId, RecurringEventId, Schedule, ScheduleId, ScheduleStatus};
use tracing::info;

use crate::data_models::DeletePolicy;
use crate::diesel_schema::{recurring_events, schedule_dates, schedules};
use crate::error::PersistenceError;
use crate::queries::schedules::find_schedule;

/// Returns the schedule of a group for a month, creating a draft if none
/// exists.
///
/// # Errors
///
/// Returns an error if the insert or the lookup fails.
pub fn get_or_create_schedule(
    conn: &mut SqliteConnection,
    group_id: GroupId,
    month: u8,
    year: i32,
) -> Result<Schedule, PersistenceError> {
    conn.immediate_transaction(|conn| {
        let inserted: usize = diesel::insert_or_ignore_into(schedules::table)
            .values((
                schedules::group_id.eq(group_id.value()),
                schedules::month.eq(i32::from(month)),
                schedules::year.eq(year),
                schedules::status.eq(ScheduleStatus::Draft.as_str()),
            ))
            .execute(conn)?;

        let schedule: Schedule = find_schedule(conn, group_id, month, year)?.ok_or_else(|| {
            PersistenceError::NotFound(format!("Schedule {month}/{year} of group {group_id}"))
        })?;
        if inserted > 0 {
            info!(schedule_id = %schedule.schedule_id, %group_id, month, year, "Created schedule");
        }
        Ok(schedule)
    })
}

/// Sets the publication status of a schedule.
///
/// # Errors
///
/// Returns an error if the update fails or the schedule does not exist.
pub fn set_schedule_status(
    conn: &mut SqliteConnection,
    schedule_id: ScheduleId,
    status: ScheduleStatus,
) -> Result<(), PersistenceError> {
    let updated: usize = diesel::update(schedules::table)
        .filter(schedules::schedule_id.eq(schedule_id.value()))
        .set(schedules::status.eq(status.as_str()))
        .execute(conn)?;
    if updated == 0 {
        return Err(PersistenceError::NotFound(format!("Schedule {schedule_id}")));
    }
    info!(%schedule_id, %status, "Set schedule status");
    Ok(())
}

/// Deletes a recurring event and applies `policy` to its schedule dates.
///
/// Returns the number of schedule dates that referenced the event.
///
/// # Errors
///
/// Returns an error if a statement fails or the event does not exist.
/// Nothing is deleted in that case.
pub fn delete_recurring_event(
    conn: &mut SqliteConnection,
    recurring_event_id: RecurringEventId,
    policy: DeletePolicy,
) -> Result<usize, PersistenceError> {
    conn.immediate_transaction(|conn| {
        let referencing = schedule_dates::table
            .filter(schedule_dates::recurring_event_id.eq(recurring_event_id.value()));

        let affected: usize = match policy {
            DeletePolicy::Cascade => diesel::delete(referencing).execute(conn)?,
            DeletePolicy::Nullify => diesel::update(referencing)
                .set(schedule_dates::recurring_event_id.eq(None::<i64>))
                .execute(conn)?,
        };

        let deleted: usize = diesel::delete(
            recurring_events::table
                .filter(recurring_events::recurring_event_id.eq(recurring_event_id.value())),
        )
        .execute(conn)?;
        if deleted == 0 {
            return Err(PersistenceError::NotFound(format!(
                "Recurring event {recurring_event_id}"
            )));
        }

        info!(%recurring_event_id, ?policy, affected, "Deleted recurring event");
        Ok(affected)
    })
}
