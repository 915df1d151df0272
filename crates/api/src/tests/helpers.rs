// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Test helper functions and fixtures.

use diesel::{Connection, RunQueryDsl, SqliteConnection};
use rota_domain::{GroupId, RoleId, ScheduleId, Weekday, parse_iso_date};
use rota_persistence::Persistence;
use std::path::{Path, PathBuf};
use time::Date;

use crate::{
    AddAvailabilityRequest, CreateRecurringEventRequest, CreateRoleRequest,
    MaterializeScheduleRequest, MemberInfo, RecurringEventInfo, RoleInfo, add_availability,
    assign_member_role, create_group, create_member, create_recurring_event, create_role,
    materialize_schedule,
};

pub fn create_test_persistence() -> Persistence {
    Persistence::new_in_memory().expect("in-memory database")
}

pub fn create_test_group(persistence: &mut Persistence) -> GroupId {
    create_group(persistence, "Worship team").unwrap()
}

pub fn event_request(group_id: GroupId, weekday: &str, kind: &str) -> CreateRecurringEventRequest {
    CreateRecurringEventRequest {
        group_id: group_id.value(),
        weekday: weekday.to_string(),
        active: true,
        kind: kind.to_string(),
        label: Some(String::from("Rehearsal")),
        start_time: String::from("18:00"),
        end_time: String::from("20:00"),
    }
}

pub fn create_test_event(
    persistence: &mut Persistence,
    group_id: GroupId,
    weekday: &str,
) -> RecurringEventInfo {
    create_recurring_event(persistence, &event_request(group_id, weekday, "assignable")).unwrap()
}

pub fn role_request(group_id: GroupId, name: &str) -> CreateRoleRequest {
    CreateRoleRequest {
        group_id: group_id.value(),
        name: name.to_string(),
        required_count: 1,
        display_order: 0,
        depends_on: None,
        exclusive_group: None,
        is_relevant: true,
    }
}

pub fn create_test_role(persistence: &mut Persistence, group_id: GroupId, name: &str) -> RoleId {
    let role: RoleInfo = create_role(persistence, &role_request(group_id, name)).unwrap();
    RoleId::new(role.role_id)
}

/// Creates a member holding `roles`, available all day every day.
pub fn create_test_member(
    persistence: &mut Persistence,
    group_id: GroupId,
    name: &str,
    roles: &[RoleId],
) -> MemberInfo {
    let member: MemberInfo = create_member(persistence, group_id, name).unwrap();
    let member_id = rota_domain::MemberId::new(member.member_id);
    for role_id in roles {
        assign_member_role(persistence, member_id, *role_id).unwrap();
    }
    let mut info: MemberInfo = member;
    for weekday in Weekday::ALL {
        info = add_availability(
            persistence,
            &AddAvailabilityRequest {
                member_id: member_id.value(),
                weekday: weekday.to_string(),
                start_time: String::from("00:00"),
                end_time: String::from("23:59"),
            },
        )
        .unwrap();
    }
    info
}

/// Materializes a month and returns its schedule id.
pub fn materialize(persistence: &mut Persistence, group_id: GroupId, month: u8, year: i32) -> ScheduleId {
    let response = materialize_schedule(
        persistence,
        &MaterializeScheduleRequest {
            group_id: group_id.value(),
            month,
            year,
        },
    )
    .unwrap();
    ScheduleId::new(response.schedule.schedule_id)
}

pub fn date(value: &str) -> Date {
    parse_iso_date(value).unwrap()
}

/// A file database removed on drop.
///
/// Tests that need rows the API would never write reach the file through a
/// second connection.
pub struct TempDatabase {
    path: PathBuf,
}

impl TempDatabase {
    pub fn new(name: &str) -> Self {
        let path = std::env::temp_dir().join(format!("rota_api_{name}_{}.db", std::process::id()));
        remove_database_files(&path);
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Stores a date in `schedule_id` whose window ends before it starts,
    /// so reading the schedule back fails.
    pub fn store_unreadable_date(&self, schedule_id: ScheduleId, date: &str) {
        let mut conn = SqliteConnection::establish(self.path.to_str().unwrap()).unwrap();
        diesel::sql_query(format!(
            "INSERT INTO schedule_dates \
             (schedule_id, date, kind, label, start_time, end_time, recurring_event_id) \
             VALUES ({}, '{date}', 'assignable', NULL, '21:00', '19:00', NULL)",
            schedule_id.value()
        ))
        .execute(&mut conn)
        .unwrap();
    }
}

impl Drop for TempDatabase {
    fn drop(&mut self) {
        remove_database_files(&self.path);
    }
}

fn remove_database_files(path: &Path) {
    for suffix in ["", "-wal", "-shm"] {
        let mut file = path.as_os_str().to_owned();
        file.push(suffix);
        let _ = std::fs::remove_file(file);
    }
}
