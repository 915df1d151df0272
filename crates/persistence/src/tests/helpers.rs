// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{NewRecurringEvent, NewRole, Persistence};
use rota_domain::{
    EventKind, GroupId, NewScheduleDate, RecurringEvent, RecurringEventId, RoleId, ScheduleId,
    TimeWindow, Weekday, parse_iso_date,
};

pub fn create_test_persistence() -> Persistence {
    Persistence::new_in_memory().expect("in-memory database")
}

pub fn create_test_group(persistence: &mut Persistence) -> GroupId {
    persistence.create_group("Worship team").unwrap()
}

pub fn create_test_event(
    persistence: &mut Persistence,
    group_id: GroupId,
    weekday: Weekday,
) -> RecurringEvent {
    let new_event = NewRecurringEvent {
        group_id,
        weekday,
        active: true,
        kind: EventKind::Assignable,
        label: Some(String::from("Rehearsal")),
        window: TimeWindow::parse("18:00", "20:00").unwrap(),
    };
    let id: RecurringEventId = persistence.create_recurring_event(&new_event).unwrap();
    persistence.get_recurring_event(id).unwrap().unwrap()
}

pub fn create_test_role(persistence: &mut Persistence, group_id: GroupId, name: &str) -> RoleId {
    persistence
        .create_role(&NewRole {
            group_id,
            name: name.to_string(),
            required_count: 1,
            display_order: 0,
            depends_on: None,
            exclusive_group: None,
            is_relevant: true,
        })
        .unwrap()
}

pub fn new_date(schedule_id: ScheduleId, event: &RecurringEvent, date: &str) -> NewScheduleDate {
    NewScheduleDate {
        schedule_id,
        date: parse_iso_date(date).unwrap(),
        recurring_event_id: Some(event.recurring_event_id),
        snapshot: event.snapshot(),
    }
}
