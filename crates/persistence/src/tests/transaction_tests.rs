// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use super::helpers::{
    create_test_event, create_test_group, create_test_persistence, create_test_role, new_date,
};
use crate::{Persistence, PersistenceError};
use rota_domain::{
    Assignment, EventKind, EventSnapshot, MemberId, RoleId, Schedule, ScheduleDate,
    ScheduleDateId, TimeWindow, Weekday,
};

struct Fixture {
    persistence: Persistence,
    schedule: Schedule,
    other: Schedule,
    dates: Vec<ScheduleDate>,
    role_id: RoleId,
    member_id: MemberId,
}

fn fixture() -> Fixture {
    let mut persistence = create_test_persistence();
    let group_id = create_test_group(&mut persistence);
    let event = create_test_event(&mut persistence, group_id, Weekday::Friday);
    let role_id = create_test_role(&mut persistence, group_id, "Sound");
    let member_id = persistence.create_member(group_id, "Ada").unwrap();
    let schedule = persistence.get_or_create_schedule(group_id, 2, 2026).unwrap();
    let other = persistence.get_or_create_schedule(group_id, 3, 2026).unwrap();

    let dates = persistence
        .with_schedule_transaction(schedule.schedule_id, |tx| {
            tx.insert_dates(&[
                new_date(schedule.schedule_id, &event, "2026-02-06"),
                new_date(schedule.schedule_id, &event, "2026-02-13"),
            ])
        })
        .unwrap();

    Fixture {
        persistence,
        schedule,
        other,
        dates,
        role_id,
        member_id,
    }
}

fn assignment(f: &Fixture, index: usize) -> Assignment {
    Assignment {
        schedule_date_id: f.dates[index].schedule_date_id,
        role_id: f.role_id,
        member_id: f.member_id,
    }
}

#[test]
fn test_inserted_dates_read_back() {
    let mut f = fixture();
    let stored = f.persistence.list_schedule_dates(f.schedule.schedule_id).unwrap();
    assert_eq!(stored, f.dates);
    assert_ne!(f.dates[0].schedule_date_id, f.dates[1].schedule_date_id);
}

#[test]
fn test_assignments_visible_inside_and_after_unit() {
    let mut f = fixture();
    let first = assignment(&f, 0);
    let seen = f
        .persistence
        .with_schedule_transaction(f.schedule.schedule_id, |tx| {
            tx.insert_assignments(&[first])?;
            tx.assignments()
        })
        .unwrap();

    assert_eq!(seen, vec![first]);
    assert_eq!(
        f.persistence.list_assignments(f.schedule.schedule_id).unwrap(),
        vec![first]
    );
}

#[test]
fn test_error_rolls_back_whole_unit() {
    let mut f = fixture();
    let event_id = f.dates[0].recurring_event_id;
    let first = assignment(&f, 0);
    let doomed = f.dates[1].schedule_date_id;
    let schedule_id = f.schedule.schedule_id;

    let result: Result<(), PersistenceError> =
        f.persistence.with_schedule_transaction(schedule_id, |tx| {
            tx.insert_assignments(&[first])?;
            tx.delete_dates(&[doomed])?;
            Err(PersistenceError::QueryFailed(String::from("abort")))
        });

    assert!(result.is_err());
    assert!(f.persistence.list_assignments(schedule_id).unwrap().is_empty());
    let dates = f.persistence.list_schedule_dates(schedule_id).unwrap();
    assert_eq!(dates.len(), 2);
    assert!(dates.iter().all(|d| d.recurring_event_id == event_id));
}

#[test]
fn test_duplicate_date_rejected_and_rolled_back() {
    let mut f = fixture();
    let schedule_id = f.schedule.schedule_id;
    let duplicate = rota_domain::NewScheduleDate {
        schedule_id,
        date: f.dates[0].date,
        recurring_event_id: None,
        snapshot: f.dates[0].snapshot().clone(),
    };
    let fresh = rota_domain::NewScheduleDate {
        date: rota_domain::parse_iso_date("2026-02-20").unwrap(),
        ..duplicate.clone()
    };

    let result = f
        .persistence
        .with_schedule_transaction(schedule_id, |tx| tx.insert_dates(&[fresh, duplicate]));

    assert!(matches!(result, Err(PersistenceError::DatabaseError(_))));
    assert_eq!(f.persistence.list_schedule_dates(schedule_id).unwrap().len(), 2);
}

#[test]
fn test_foreign_schedule_row_rejected() {
    let mut f = fixture();
    let foreign = rota_domain::NewScheduleDate {
        schedule_id: f.other.schedule_id,
        date: rota_domain::parse_iso_date("2026-03-06").unwrap(),
        recurring_event_id: None,
        snapshot: f.dates[0].snapshot().clone(),
    };

    let result = f
        .persistence
        .with_schedule_transaction(f.schedule.schedule_id, |tx| tx.insert_dates(&[foreign]));

    assert_eq!(
        result,
        Err(PersistenceError::ForeignScheduleRow {
            schedule_id: f.schedule.schedule_id,
            found: f.other.schedule_id,
        })
    );
    assert!(
        f.persistence
            .list_schedule_dates(f.other.schedule_id)
            .unwrap()
            .is_empty()
    );
}

#[test]
fn test_dates_of_other_schedule_cannot_be_touched() {
    let mut f = fixture();
    let stray = f.dates[0].schedule_date_id;
    let first = assignment(&f, 0);

    let cleared = f
        .persistence
        .with_schedule_transaction(f.other.schedule_id, |tx| tx.clear_assignments(&[stray]));
    let inserted = f
        .persistence
        .with_schedule_transaction(f.other.schedule_id, |tx| tx.insert_assignments(&[first]));

    let expected = PersistenceError::UnknownScheduleDate {
        schedule_id: f.other.schedule_id,
        schedule_date_id: stray,
    };
    assert_eq!(cleared, Err(expected.clone()));
    assert_eq!(inserted, Err(expected));
}

#[test]
fn test_refresh_snapshots_overwrites_stored_copy() {
    let mut f = fixture();
    let event_id = f.dates[0].recurring_event_id.unwrap();
    let mut event = f.persistence.get_recurring_event(event_id).unwrap().unwrap();
    event.kind = EventKind::ForEveryone;
    event.label = Some(String::from("Open evening"));
    event.window = TimeWindow::parse("19:00", "21:30").unwrap();
    let moved: EventSnapshot = event.snapshot();
    let refreshed = f.dates[0].clone().with_refreshed_snapshot(&event);

    let count = f
        .persistence
        .with_schedule_transaction(f.schedule.schedule_id, |tx| {
            tx.refresh_snapshots(&[refreshed])
        })
        .unwrap();

    assert_eq!(count, 1);
    let stored = f.persistence.list_schedule_dates(f.schedule.schedule_id).unwrap();
    assert_eq!(stored[0].snapshot(), &moved);
    assert_eq!(stored[1].snapshot(), f.dates[1].snapshot());
}

#[test]
fn test_refresh_unknown_date_fails() {
    let mut f = fixture();
    let ghost = ScheduleDate::new(
        ScheduleDateId::new(999),
        f.schedule.schedule_id,
        f.dates[0].date,
        None,
        f.dates[0].snapshot().clone(),
    );

    let result = f
        .persistence
        .with_schedule_transaction(f.schedule.schedule_id, |tx| {
            tx.refresh_snapshots(&[ghost])
        });

    assert_eq!(
        result,
        Err(PersistenceError::UnknownScheduleDate {
            schedule_id: f.schedule.schedule_id,
            schedule_date_id: ScheduleDateId::new(999),
        })
    );
}

#[test]
fn test_delete_dates_takes_assignments_along() {
    let mut f = fixture();
    let rows = [assignment(&f, 0), assignment(&f, 1)];
    let doomed = f.dates[0].schedule_date_id;
    let schedule_id = f.schedule.schedule_id;

    let deleted = f
        .persistence
        .with_schedule_transaction(schedule_id, |tx| {
            tx.insert_assignments(&rows)?;
            tx.delete_dates(&[doomed])
        })
        .unwrap();

    assert_eq!(deleted, 1);
    assert_eq!(f.persistence.list_schedule_dates(schedule_id).unwrap().len(), 1);
    assert_eq!(
        f.persistence.list_assignments(schedule_id).unwrap(),
        vec![rows[1]]
    );
}

#[test]
fn test_clear_assignments_keeps_other_dates() {
    let mut f = fixture();
    let rows = [assignment(&f, 0), assignment(&f, 1)];
    let target = f.dates[1].schedule_date_id;
    let schedule_id = f.schedule.schedule_id;

    let cleared = f
        .persistence
        .with_schedule_transaction(schedule_id, |tx| {
            tx.insert_assignments(&rows)?;
            tx.clear_assignments(&[target])
        })
        .unwrap();

    assert_eq!(cleared, 1);
    assert_eq!(
        f.persistence.list_assignments(schedule_id).unwrap(),
        vec![rows[0]]
    );
    assert_eq!(f.persistence.list_schedule_dates(schedule_id).unwrap().len(), 2);
}

#[test]
fn test_duplicate_assignment_rejected() {
    let mut f = fixture();
    let first = assignment(&f, 0);
    let result = f
        .persistence
        .with_schedule_transaction(f.schedule.schedule_id, |tx| {
            tx.insert_assignments(&[first, first])
        });

    assert!(matches!(result, Err(PersistenceError::DatabaseError(_))));
    assert!(
        f.persistence
            .list_assignments(f.schedule.schedule_id)
            .unwrap()
            .is_empty()
    );
}
