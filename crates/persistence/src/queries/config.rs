// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Configuration queries: groups, recurring events, roles, priorities and
//! members.

use diesel::SqliteConnection;
use diesel::dsl::exists;
use diesel::prelude::*;
use rota_domain::{
    Availability, EventRolePriority, ExclusiveGroupId, GroupId, Holiday, Member, MemberId,
    RecurringEvent, RecurringEventId, Role, RoleId, TimeWindow, parse_iso_date,
};
use std::collections::BTreeMap;
use tracing::debug;

use super::{count_from_column, flag_from_column, kind_from_column, weekday_from_column};
use crate::diesel_schema::{
    availabilities, event_role_priorities, groups, holidays, member_roles, members,
    recurring_events, roles,
};
use crate::error::PersistenceError;

#[derive(Queryable, Selectable)]
#[diesel(table_name = recurring_events)]
struct RecurringEventRow {
    recurring_event_id: i64,
    group_id: i64,
    weekday: i32,
    is_active: i32,
    kind: String,
    label: Option<String>,
    start_time: String,
    end_time: String,
}

impl RecurringEventRow {
    fn into_domain(self) -> Result<RecurringEvent, PersistenceError> {
        Ok(RecurringEvent {
            recurring_event_id: RecurringEventId::new(self.recurring_event_id),
            group_id: GroupId::new(self.group_id),
            weekday: weekday_from_column(self.weekday)?,
            active: flag_from_column(self.is_active),
            kind: kind_from_column(&self.kind)?,
            label: self.label,
            window: TimeWindow::parse(&self.start_time, &self.end_time)?,
        })
    }
}

#[derive(Queryable, Selectable)]
#[diesel(table_name = roles)]
struct RoleRow {
    role_id: i64,
    group_id: i64,
    name: String,
    required_count: i32,
    display_order: i32,
    depends_on_role_id: Option<i64>,
    exclusive_group_id: Option<i64>,
    is_relevant: i32,
}

impl RoleRow {
    fn into_domain(self) -> Result<Role, PersistenceError> {
        Ok(Role {
            role_id: RoleId::new(self.role_id),
            group_id: GroupId::new(self.group_id),
            name: self.name,
            required_count: count_from_column("required_count", self.required_count)?,
            display_order: self.display_order,
            depends_on: self.depends_on_role_id.map(RoleId::new),
            exclusive_group: self.exclusive_group_id.map(ExclusiveGroupId::new),
            is_relevant: flag_from_column(self.is_relevant),
        })
    }
}

#[derive(Queryable, Selectable)]
#[diesel(table_name = members)]
struct MemberRow {
    member_id: i64,
    group_id: i64,
    name: String,
}

#[derive(Queryable, Selectable)]
#[diesel(table_name = availabilities)]
struct AvailabilityRow {
    member_id: i64,
    weekday: i32,
    start_time: String,
    end_time: String,
}

#[derive(Queryable, Selectable)]
#[diesel(table_name = holidays)]
struct HolidayRow {
    member_id: i64,
    start_date: String,
    end_date: String,
}

/// Returns whether a group exists.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn group_exists(conn: &mut SqliteConnection, group_id: GroupId) -> Result<bool, PersistenceError> {
    Ok(
        diesel::select(exists(groups::table.filter(groups::group_id.eq(group_id.value()))))
            .get_result(conn)?,
    )
}

/// Retrieves a recurring event by id.
///
/// # Errors
///
/// Returns an error if the query fails or the stored row is invalid.
/// Returns `Ok(None)` if the event does not exist.
pub fn get_recurring_event(
    conn: &mut SqliteConnection,
    recurring_event_id: RecurringEventId,
) -> Result<Option<RecurringEvent>, PersistenceError> {
    recurring_events::table
        .filter(recurring_events::recurring_event_id.eq(recurring_event_id.value()))
        .select(RecurringEventRow::as_select())
        .first(conn)
        .optional()?
        .map(RecurringEventRow::into_domain)
        .transpose()
}

/// Lists the recurring events of a group in ascending id order.
///
/// # Errors
///
/// Returns an error if the query fails or a stored row is invalid.
pub fn list_recurring_events(
    conn: &mut SqliteConnection,
    group_id: GroupId,
) -> Result<Vec<RecurringEvent>, PersistenceError> {
    recurring_events::table
        .filter(recurring_events::group_id.eq(group_id.value()))
        .order(recurring_events::recurring_event_id.asc())
        .select(RecurringEventRow::as_select())
        .load(conn)?
        .into_iter()
        .map(RecurringEventRow::into_domain)
        .collect()
}

/// Retrieves a role by id.
///
/// # Errors
///
/// Returns an error if the query fails or the stored row is invalid.
pub fn get_role(conn: &mut SqliteConnection, role_id: RoleId) -> Result<Option<Role>, PersistenceError> {
    roles::table
        .filter(roles::role_id.eq(role_id.value()))
        .select(RoleRow::as_select())
        .first(conn)
        .optional()?
        .map(RoleRow::into_domain)
        .transpose()
}

/// Lists the roles of a group.
///
/// # Errors
///
/// Returns an error if the query fails or a stored row is invalid.
pub fn list_roles(conn: &mut SqliteConnection, group_id: GroupId) -> Result<Vec<Role>, PersistenceError> {
    roles::table
        .filter(roles::group_id.eq(group_id.value()))
        .order((roles::display_order.asc(), roles::role_id.asc()))
        .select(RoleRow::as_select())
        .load(conn)?
        .into_iter()
        .map(RoleRow::into_domain)
        .collect()
}

/// Lists the event-role priorities of every recurring event of a group.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn list_event_role_priorities(
    conn: &mut SqliteConnection,
    group_id: GroupId,
) -> Result<Vec<EventRolePriority>, PersistenceError> {
    let group_events = recurring_events::table
        .filter(recurring_events::group_id.eq(group_id.value()))
        .select(recurring_events::recurring_event_id);

    let rows: Vec<(i64, i64, i32)> = event_role_priorities::table
        .filter(event_role_priorities::recurring_event_id.eq_any(group_events))
        .select((
            event_role_priorities::recurring_event_id,
            event_role_priorities::role_id,
            event_role_priorities::priority,
        ))
        .load(conn)?;

    Ok(rows
        .into_iter()
        .map(|(event_id, role_id, priority)| EventRolePriority {
            recurring_event_id: RecurringEventId::new(event_id),
            role_id: RoleId::new(role_id),
            priority,
        })
        .collect())
}

/// Retrieves a member with roles, availability and holidays.
///
/// # Errors
///
/// Returns an error if a query fails or a stored row is invalid.
pub fn get_member(
    conn: &mut SqliteConnection,
    member_id: MemberId,
) -> Result<Option<Member>, PersistenceError> {
    let rows: Vec<MemberRow> = members::table
        .filter(members::member_id.eq(member_id.value()))
        .select(MemberRow::as_select())
        .load(conn)?;
    Ok(assemble_members(conn, rows)?.into_iter().next())
}

/// Lists the members of a group, each with roles, availability and
/// holidays, in ascending id order.
///
/// # Errors
///
/// Returns an error if a query fails or a stored row is invalid.
pub fn list_members(
    conn: &mut SqliteConnection,
    group_id: GroupId,
) -> Result<Vec<Member>, PersistenceError> {
    let rows: Vec<MemberRow> = members::table
        .filter(members::group_id.eq(group_id.value()))
        .order(members::member_id.asc())
        .select(MemberRow::as_select())
        .load(conn)?;
    assemble_members(conn, rows)
}

fn assemble_members(
    conn: &mut SqliteConnection,
    rows: Vec<MemberRow>,
) -> Result<Vec<Member>, PersistenceError> {
    let ids: Vec<i64> = rows.iter().map(|r| r.member_id).collect();
    let mut by_id: BTreeMap<i64, Member> = rows
        .into_iter()
        .map(|r| {
            (
                r.member_id,
                Member::new(MemberId::new(r.member_id), GroupId::new(r.group_id), &r.name),
            )
        })
        .collect();

    let held: Vec<(i64, i64)> = member_roles::table
        .filter(member_roles::member_id.eq_any(ids.iter().copied()))
        .select((member_roles::member_id, member_roles::role_id))
        .load(conn)?;
    for (member_id, role_id) in held {
        if let Some(member) = by_id.get_mut(&member_id) {
            member.roles.insert(RoleId::new(role_id));
        }
    }

    let windows: Vec<AvailabilityRow> = availabilities::table
        .filter(availabilities::member_id.eq_any(ids.iter().copied()))
        .order(availabilities::availability_id.asc())
        .select(AvailabilityRow::as_select())
        .load(conn)?;
    for row in windows {
        if let Some(member) = by_id.get_mut(&row.member_id) {
            member.availability.push(Availability {
                weekday: weekday_from_column(row.weekday)?,
                window: TimeWindow::parse(&row.start_time, &row.end_time)?,
            });
        }
    }

    let absences: Vec<HolidayRow> = holidays::table
        .filter(holidays::member_id.eq_any(ids.iter().copied()))
        .order(holidays::holiday_id.asc())
        .select(HolidayRow::as_select())
        .load(conn)?;
    for row in absences {
        if let Some(member) = by_id.get_mut(&row.member_id) {
            member.holidays.push(Holiday::new(
                parse_iso_date(&row.start_date)?,
                parse_iso_date(&row.end_date)?,
            )?);
        }
    }

    debug!(members = by_id.len(), "Assembled members");
    Ok(by_id.into_values().collect())
}
