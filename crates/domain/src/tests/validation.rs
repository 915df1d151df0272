// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{
    DomainError, EventKind, GroupId, RecurringEvent, RecurringEventId, TimeWindow, Weekday,
    validate_member_name, validate_month, validate_role_fields, validate_unique_active_weekday,
    validate_year,
};

fn event(id: i64, weekday: Weekday, active: bool) -> RecurringEvent {
    RecurringEvent {
        recurring_event_id: RecurringEventId::new(id),
        group_id: GroupId::new(1),
        weekday,
        active,
        kind: EventKind::Assignable,
        label: None,
        window: TimeWindow::full_day(),
    }
}

#[test]
fn test_validate_month_accepts_calendar_months() {
    for month in 1..=12 {
        assert!(validate_month(month).is_ok());
    }
}

#[test]
fn test_validate_month_rejects_out_of_range() {
    assert_eq!(validate_month(0), Err(DomainError::InvalidMonth(0)));
    assert_eq!(validate_month(13), Err(DomainError::InvalidMonth(13)));
}

#[test]
fn test_validate_year_bounds() {
    assert!(validate_year(1900).is_ok());
    assert!(validate_year(2200).is_ok());
    assert_eq!(validate_year(1899), Err(DomainError::InvalidYear(1899)));
    assert_eq!(validate_year(2201), Err(DomainError::InvalidYear(2201)));
}

#[test]
fn test_validate_role_fields() {
    assert!(validate_role_fields("Sound", 1).is_ok());
    assert_eq!(validate_role_fields("  ", 1), Err(DomainError::InvalidRoleName));
    assert_eq!(
        validate_role_fields("Sound", 0),
        Err(DomainError::InvalidRequiredCount(0))
    );
}

#[test]
fn test_validate_member_name() {
    assert!(validate_member_name("Ada").is_ok());
    assert_eq!(validate_member_name(""), Err(DomainError::InvalidMemberName));
}

#[test]
fn test_duplicate_active_weekday_rejected() {
    let existing = vec![event(1, Weekday::Friday, true)];
    assert_eq!(
        validate_unique_active_weekday(&existing, GroupId::new(1), Weekday::Friday, None),
        Err(DomainError::DuplicateActiveWeekday {
            group_id: GroupId::new(1),
            weekday: Weekday::Friday,
        })
    );
}

#[test]
fn test_inactive_or_other_group_events_do_not_clash() {
    let existing = vec![event(1, Weekday::Friday, false)];
    assert!(
        validate_unique_active_weekday(&existing, GroupId::new(1), Weekday::Friday, None).is_ok()
    );
    assert!(
        validate_unique_active_weekday(
            &[event(1, Weekday::Friday, true)],
            GroupId::new(2),
            Weekday::Friday,
            None
        )
        .is_ok()
    );
}

#[test]
fn test_update_does_not_clash_with_itself() {
    let existing = vec![event(1, Weekday::Friday, true)];
    assert!(
        validate_unique_active_weekday(
            &existing,
            GroupId::new(1),
            Weekday::Friday,
            Some(RecurringEventId::new(1))
        )
        .is_ok()
    );
}
