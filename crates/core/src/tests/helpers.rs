// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::Roster;
use rota_domain::{
    Availability, EventKind, EventSnapshot, GroupId, Holiday, Member, MemberId, RecurringEvent,
    RecurringEventId, Role, RoleId, Schedule, ScheduleDate, ScheduleDateId, ScheduleId,
    ScheduleStatus, TimeWindow, Weekday, parse_iso_date,
};
use time::Date;

pub const GROUP: GroupId = GroupId::new(1);

pub fn date(value: &str) -> Date {
    parse_iso_date(value).unwrap()
}

pub fn create_test_schedule(id: i64, month: u8, year: i32) -> Schedule {
    Schedule {
        schedule_id: ScheduleId::new(id),
        group_id: GROUP,
        month,
        year,
        status: ScheduleStatus::Draft,
    }
}

pub fn create_test_event(id: i64, weekday: Weekday, kind: EventKind) -> RecurringEvent {
    RecurringEvent {
        recurring_event_id: RecurringEventId::new(id),
        group_id: GROUP,
        weekday,
        active: true,
        kind,
        label: Some(String::from("Rehearsal")),
        window: TimeWindow::parse("18:00", "20:00").unwrap(),
    }
}

pub fn create_test_role(id: i64, display_order: i32) -> Role {
    Role {
        role_id: RoleId::new(id),
        group_id: GROUP,
        name: format!("Role {id}"),
        required_count: 1,
        display_order,
        depends_on: None,
        exclusive_group: None,
        is_relevant: true,
    }
}

/// A member holding `roles`, available all day every day.
pub fn create_test_member(id: i64, roles: &[i64]) -> Member {
    let mut member: Member = Member::new(MemberId::new(id), GROUP, &format!("Member {id}"));
    member.roles = roles.iter().copied().map(RoleId::new).collect();
    member.availability = Weekday::ALL
        .iter()
        .map(|weekday| Availability {
            weekday: *weekday,
            window: TimeWindow::full_day(),
        })
        .collect();
    member
}

pub fn with_holiday(mut member: Member, start: &str, end: &str) -> Member {
    member
        .holidays
        .push(Holiday::new(date(start), date(end)).unwrap());
    member
}

pub fn create_test_roster(roles: Vec<Role>, members: Vec<Member>) -> Roster {
    let mut roster: Roster = Roster::new(GROUP);
    roster.roles = roles;
    roster.members = members;
    roster
}

/// Persisted rows for `event` on each of `dates`, numbered from `first_id`.
pub fn create_test_dates(
    schedule: &Schedule,
    event: &RecurringEvent,
    dates: &[&str],
    first_id: i64,
) -> Vec<ScheduleDate> {
    dates
        .iter()
        .zip(first_id..)
        .map(|(value, id)| {
            ScheduleDate::new(
                ScheduleDateId::new(id),
                schedule.schedule_id,
                date(value),
                Some(event.recurring_event_id),
                event.snapshot(),
            )
        })
        .collect()
}

pub fn manual_date(schedule: &Schedule, id: i64, value: &str, kind: EventKind) -> ScheduleDate {
    ScheduleDate::new(
        ScheduleDateId::new(id),
        schedule.schedule_id,
        date(value),
        None,
        EventSnapshot::new(kind, None, TimeWindow::full_day()),
    )
}
