// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Configuration mutations.
//!
//! These writes store values as given. Business validation (time windows,
//! duplicate weekdays, dependency cycles) happens before they are called.

use diesel::SqliteConnection;
use diesel::prelude::*;
use num_traits::ToPrimitive;
use rota_domain::{
    Availability, ExclusiveGroupId, GroupId, Holiday, MemberId, RecurringEvent, RecurringEventId,
    RoleId, format_iso_date, format_time_of_day,
};
use tracing::{debug, info};

use crate::backend::sqlite::get_last_insert_rowid;
use crate::data_models::{NewRecurringEvent, NewRole};
use crate::diesel_schema::{
    availabilities, event_role_priorities, groups, holidays, member_roles, members,
    recurring_events, roles,
};
use crate::error::PersistenceError;

fn count_to_column(value: u32) -> Result<i32, PersistenceError> {
    value
        .to_i32()
        .ok_or_else(|| PersistenceError::QueryFailed(format!("Count out of range: {value}")))
}

/// Creates a group.
///
/// # Errors
///
/// Returns an error if the insert fails.
pub fn create_group(conn: &mut SqliteConnection, name: &str) -> Result<GroupId, PersistenceError> {
    diesel::insert_into(groups::table)
        .values(groups::name.eq(name))
        .execute(conn)?;
    let group_id: i64 = get_last_insert_rowid(conn)?;
    info!(group_id, name, "Created group");
    Ok(GroupId::new(group_id))
}

/// Creates a recurring event.
///
/// # Errors
///
/// Returns an error if the insert fails, e.g. because the group does not
/// exist.
pub fn create_recurring_event(
    conn: &mut SqliteConnection,
    event: &NewRecurringEvent,
) -> Result<RecurringEventId, PersistenceError> {
    diesel::insert_into(recurring_events::table)
        .values((
            recurring_events::group_id.eq(event.group_id.value()),
            recurring_events::weekday.eq(i32::from(event.weekday.index())),
            recurring_events::is_active.eq(i32::from(event.active)),
            recurring_events::kind.eq(event.kind.as_str()),
            recurring_events::label.eq(event.label.as_deref()),
            recurring_events::start_time.eq(format_time_of_day(event.window.start())),
            recurring_events::end_time.eq(format_time_of_day(event.window.end())),
        ))
        .execute(conn)?;
    let recurring_event_id: i64 = get_last_insert_rowid(conn)?;
    info!(
        recurring_event_id,
        group_id = %event.group_id,
        weekday = %event.weekday,
        "Created recurring event"
    );
    Ok(RecurringEventId::new(recurring_event_id))
}

/// Overwrites a recurring event's configuration.
///
/// Existing schedule dates keep their snapshot.
///
/// # Errors
///
/// Returns an error if the update fails or the event does not exist.
pub fn update_recurring_event(
    conn: &mut SqliteConnection,
    event: &RecurringEvent,
) -> Result<(), PersistenceError> {
    let updated: usize = diesel::update(recurring_events::table)
        .filter(recurring_events::recurring_event_id.eq(event.recurring_event_id.value()))
        .set((
            recurring_events::weekday.eq(i32::from(event.weekday.index())),
            recurring_events::is_active.eq(i32::from(event.active)),
            recurring_events::kind.eq(event.kind.as_str()),
            recurring_events::label.eq(event.label.as_deref()),
            recurring_events::start_time.eq(format_time_of_day(event.window.start())),
            recurring_events::end_time.eq(format_time_of_day(event.window.end())),
        ))
        .execute(conn)?;
    if updated == 0 {
        return Err(PersistenceError::NotFound(format!(
            "Recurring event {}",
            event.recurring_event_id
        )));
    }
    info!(recurring_event_id = %event.recurring_event_id, "Updated recurring event");
    Ok(())
}

/// Creates a role.
///
/// # Errors
///
/// Returns an error if the insert fails.
pub fn create_role(conn: &mut SqliteConnection, role: &NewRole) -> Result<RoleId, PersistenceError> {
    diesel::insert_into(roles::table)
        .values((
            roles::group_id.eq(role.group_id.value()),
            roles::name.eq(&role.name),
            roles::required_count.eq(count_to_column(role.required_count)?),
            roles::display_order.eq(role.display_order),
            roles::depends_on_role_id.eq(role.depends_on.map(RoleId::value)),
            roles::exclusive_group_id.eq(role.exclusive_group.map(ExclusiveGroupId::value)),
            roles::is_relevant.eq(i32::from(role.is_relevant)),
        ))
        .execute(conn)?;
    let role_id: i64 = get_last_insert_rowid(conn)?;
    info!(role_id, group_id = %role.group_id, name = %role.name, "Created role");
    Ok(RoleId::new(role_id))
}

/// Sets or clears the anchor of a dependent role.
///
/// # Errors
///
/// Returns an error if the update fails.
pub fn set_role_dependency(
    conn: &mut SqliteConnection,
    role_id: RoleId,
    depends_on: Option<RoleId>,
) -> Result<(), PersistenceError> {
    diesel::update(roles::table)
        .filter(roles::role_id.eq(role_id.value()))
        .set(roles::depends_on_role_id.eq(depends_on.map(RoleId::value)))
        .execute(conn)?;
    debug!(%role_id, ?depends_on, "Set role dependency");
    Ok(())
}

/// Sets or clears the exclusive group of a role.
///
/// # Errors
///
/// Returns an error if the update fails.
pub fn set_role_exclusive_group(
    conn: &mut SqliteConnection,
    role_id: RoleId,
    exclusive_group: Option<ExclusiveGroupId>,
) -> Result<(), PersistenceError> {
    diesel::update(roles::table)
        .filter(roles::role_id.eq(role_id.value()))
        .set(roles::exclusive_group_id.eq(exclusive_group.map(ExclusiveGroupId::value)))
        .execute(conn)?;
    debug!(%role_id, ?exclusive_group, "Set role exclusive group");
    Ok(())
}

/// Sets the fill priority of a role for a recurring event.
///
/// # Errors
///
/// Returns an error if the upsert fails.
pub fn set_event_role_priority(
    conn: &mut SqliteConnection,
    recurring_event_id: RecurringEventId,
    role_id: RoleId,
    priority: i32,
) -> Result<(), PersistenceError> {
    diesel::insert_into(event_role_priorities::table)
        .values((
            event_role_priorities::recurring_event_id.eq(recurring_event_id.value()),
            event_role_priorities::role_id.eq(role_id.value()),
            event_role_priorities::priority.eq(priority),
        ))
        .on_conflict((
            event_role_priorities::recurring_event_id,
            event_role_priorities::role_id,
        ))
        .do_update()
        .set(event_role_priorities::priority.eq(priority))
        .execute(conn)?;
    debug!(%recurring_event_id, %role_id, priority, "Set event role priority");
    Ok(())
}

/// Creates a member.
///
/// # Errors
///
/// Returns an error if the insert fails.
pub fn create_member(
    conn: &mut SqliteConnection,
    group_id: GroupId,
    name: &str,
) -> Result<MemberId, PersistenceError> {
    diesel::insert_into(members::table)
        .values((members::group_id.eq(group_id.value()), members::name.eq(name)))
        .execute(conn)?;
    let member_id: i64 = get_last_insert_rowid(conn)?;
    info!(member_id, %group_id, "Created member");
    Ok(MemberId::new(member_id))
}

/// Grants a role to a member. Granting a held role again is a no-op.
///
/// # Errors
///
/// Returns an error if the insert fails.
pub fn assign_member_role(
    conn: &mut SqliteConnection,
    member_id: MemberId,
    role_id: RoleId,
) -> Result<(), PersistenceError> {
    diesel::insert_or_ignore_into(member_roles::table)
        .values((
            member_roles::member_id.eq(member_id.value()),
            member_roles::role_id.eq(role_id.value()),
        ))
        .execute(conn)?;
    debug!(%member_id, %role_id, "Assigned member role");
    Ok(())
}

/// Adds a weekly availability window to a member.
///
/// # Errors
///
/// Returns an error if the insert fails.
pub fn add_availability(
    conn: &mut SqliteConnection,
    member_id: MemberId,
    availability: &Availability,
) -> Result<i64, PersistenceError> {
    diesel::insert_into(availabilities::table)
        .values((
            availabilities::member_id.eq(member_id.value()),
            availabilities::weekday.eq(i32::from(availability.weekday.index())),
            availabilities::start_time.eq(format_time_of_day(availability.window.start())),
            availabilities::end_time.eq(format_time_of_day(availability.window.end())),
        ))
        .execute(conn)?;
    let availability_id: i64 = get_last_insert_rowid(conn)?;
    debug!(availability_id, %member_id, "Added availability");
    Ok(availability_id)
}

/// Adds a holiday to a member.
///
/// # Errors
///
/// Returns an error if the insert fails.
pub fn add_holiday(
    conn: &mut SqliteConnection,
    member_id: MemberId,
    holiday: &Holiday,
) -> Result<i64, PersistenceError> {
    diesel::insert_into(holidays::table)
        .values((
            holidays::member_id.eq(member_id.value()),
            holidays::start_date.eq(format_iso_date(holiday.start())),
            holidays::end_date.eq(format_iso_date(holiday.end())),
        ))
        .execute(conn)?;
    let holiday_id: i64 = get_last_insert_rowid(conn)?;
    debug!(holiday_id, %member_id, "Added holiday");
    Ok(holiday_id)
}
