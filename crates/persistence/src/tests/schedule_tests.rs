// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use super::helpers::{
    create_test_event, create_test_group, create_test_persistence, create_test_role, new_date,
};
use crate::{DeletePolicy, PersistenceError};
use rota_domain::{Assignment, ScheduleDate, ScheduleId, ScheduleStatus, Weekday};

#[test]
fn test_get_or_create_schedule_is_idempotent() {
    let mut persistence = create_test_persistence();
    let group_id = create_test_group(&mut persistence);

    let first = persistence.get_or_create_schedule(group_id, 2, 2026).unwrap();
    let second = persistence.get_or_create_schedule(group_id, 2, 2026).unwrap();

    assert_eq!(first, second);
    assert_eq!(first.status, ScheduleStatus::Draft);
    assert_eq!(persistence.list_schedules(group_id).unwrap().len(), 1);
}

#[test]
fn test_schedules_listed_in_calendar_order() {
    let mut persistence = create_test_persistence();
    let group_id = create_test_group(&mut persistence);
    persistence.get_or_create_schedule(group_id, 1, 2027).unwrap();
    persistence.get_or_create_schedule(group_id, 11, 2026).unwrap();
    persistence.get_or_create_schedule(group_id, 2, 2026).unwrap();

    let months: Vec<(i32, u8)> = persistence
        .list_schedules(group_id)
        .unwrap()
        .into_iter()
        .map(|s| (s.year, s.month))
        .collect();
    assert_eq!(months, vec![(2026, 2), (2026, 11), (2027, 1)]);
}

#[test]
fn test_schedule_status_update() {
    let mut persistence = create_test_persistence();
    let group_id = create_test_group(&mut persistence);
    let schedule = persistence.get_or_create_schedule(group_id, 2, 2026).unwrap();

    persistence
        .set_schedule_status(schedule.schedule_id, ScheduleStatus::Committed)
        .unwrap();

    let stored = persistence.get_schedule(schedule.schedule_id).unwrap().unwrap();
    assert_eq!(stored.status, ScheduleStatus::Committed);
    assert!(matches!(
        persistence.set_schedule_status(ScheduleId::new(999), ScheduleStatus::Draft),
        Err(PersistenceError::NotFound(_))
    ));
}

fn seed_event_dates(
    persistence: &mut crate::Persistence,
) -> (rota_domain::RecurringEvent, Vec<ScheduleDate>, Vec<ScheduleDate>) {
    let group_id = create_test_group(persistence);
    let event = create_test_event(persistence, group_id, Weekday::Friday);
    let february = persistence.get_or_create_schedule(group_id, 2, 2026).unwrap();
    let march = persistence.get_or_create_schedule(group_id, 3, 2026).unwrap();

    let feb_dates = persistence
        .with_schedule_transaction(february.schedule_id, |tx| {
            tx.insert_dates(&[
                new_date(february.schedule_id, &event, "2026-02-06"),
                new_date(february.schedule_id, &event, "2026-02-13"),
            ])
        })
        .unwrap();
    let mar_dates = persistence
        .with_schedule_transaction(march.schedule_id, |tx| {
            tx.insert_dates(&[new_date(march.schedule_id, &event, "2026-03-06")])
        })
        .unwrap();
    (event, feb_dates, mar_dates)
}

#[test]
fn test_dates_for_event_span_schedules() {
    let mut persistence = create_test_persistence();
    let (event, feb_dates, mar_dates) = seed_event_dates(&mut persistence);

    let dates = persistence
        .list_schedule_dates_for_event(event.recurring_event_id)
        .unwrap();

    let expected: Vec<ScheduleDate> = feb_dates.into_iter().chain(mar_dates).collect();
    assert_eq!(dates, expected);
}

#[test]
fn test_delete_event_nullify_keeps_dates() {
    let mut persistence = create_test_persistence();
    let (event, feb_dates, _) = seed_event_dates(&mut persistence);

    let affected = persistence
        .delete_recurring_event(event.recurring_event_id, DeletePolicy::Nullify)
        .unwrap();

    assert_eq!(affected, 3);
    assert!(
        persistence
            .get_recurring_event(event.recurring_event_id)
            .unwrap()
            .is_none()
    );
    let remaining = persistence
        .list_schedule_dates(feb_dates[0].schedule_id)
        .unwrap();
    assert_eq!(remaining.len(), 2);
    assert!(remaining.iter().all(|d| d.recurring_event_id.is_none()));
    assert_eq!(remaining[0].snapshot(), feb_dates[0].snapshot());
}

#[test]
fn test_delete_event_cascade_removes_dates_and_assignments() {
    let mut persistence = create_test_persistence();
    let (event, feb_dates, _) = seed_event_dates(&mut persistence);
    let group_id = event.group_id;
    let role_id = create_test_role(&mut persistence, group_id, "Sound");
    let member_id = persistence.create_member(group_id, "Ada").unwrap();
    let schedule_id = feb_dates[0].schedule_id;
    persistence
        .with_schedule_transaction(schedule_id, |tx| {
            tx.insert_assignments(&[Assignment {
                schedule_date_id: feb_dates[0].schedule_date_id,
                role_id,
                member_id,
            }])
        })
        .unwrap();

    let affected = persistence
        .delete_recurring_event(event.recurring_event_id, DeletePolicy::Cascade)
        .unwrap();

    assert_eq!(affected, 3);
    assert!(persistence.list_schedule_dates(schedule_id).unwrap().is_empty());
    assert!(persistence.list_assignments(schedule_id).unwrap().is_empty());
}

#[test]
fn test_delete_unknown_event_is_not_found() {
    let mut persistence = create_test_persistence();
    assert!(matches!(
        persistence.delete_recurring_event(
            rota_domain::RecurringEventId::new(42),
            DeletePolicy::Cascade
        ),
        Err(PersistenceError::NotFound(_))
    ));
}

#[test]
fn test_assignment_counts_by_member() {
    let mut persistence = create_test_persistence();
    let (event, feb_dates, mar_dates) = seed_event_dates(&mut persistence);
    let group_id = event.group_id;
    let role_id = create_test_role(&mut persistence, group_id, "Sound");
    let ada = persistence.create_member(group_id, "Ada").unwrap();
    let bob = persistence.create_member(group_id, "Bob").unwrap();

    let feb_id = feb_dates[0].schedule_id;
    persistence
        .with_schedule_transaction(feb_id, |tx| {
            tx.insert_assignments(&[
                Assignment {
                    schedule_date_id: feb_dates[0].schedule_date_id,
                    role_id,
                    member_id: ada,
                },
                Assignment {
                    schedule_date_id: feb_dates[1].schedule_date_id,
                    role_id,
                    member_id: ada,
                },
            ])
        })
        .unwrap();
    let mar_id = mar_dates[0].schedule_id;
    persistence
        .with_schedule_transaction(mar_id, |tx| {
            tx.insert_assignments(&[Assignment {
                schedule_date_id: mar_dates[0].schedule_date_id,
                role_id,
                member_id: bob,
            }])
        })
        .unwrap();

    let mut both = persistence
        .count_assignments_by_member(&[feb_id, mar_id])
        .unwrap();
    both.sort();
    assert_eq!(both, vec![(ada, 2), (bob, 1)]);

    let february_only = persistence.count_assignments_by_member(&[feb_id]).unwrap();
    assert_eq!(february_only, vec![(ada, 2)]);
    assert!(persistence.count_assignments_by_member(&[]).unwrap().is_empty());
}
