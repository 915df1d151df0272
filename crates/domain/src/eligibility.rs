// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Eligibility of members for a role on a schedule date.
//!
//! A member is eligible iff:
//! - they hold the role
//! - an availability entry on the date's weekday contains the date's window
//! - no holiday covers the date (bounds inclusive)

use crate::types::{Member, MemberId, Role, RoleId, ScheduleDate};
use std::collections::BTreeSet;

/// Why a member cannot serve a role on a date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ineligibility {
    /// The member does not hold the role.
    MissingRole,
    /// No availability window on the weekday contains the date's window.
    Unavailable,
    /// A holiday covers the date.
    OnHoliday,
}

impl std::fmt::Display for Ineligibility {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingRole => write!(f, "does not hold the role"),
            Self::Unavailable => write!(f, "not available for the time window"),
            Self::OnHoliday => write!(f, "on holiday"),
        }
    }
}

/// Checks a single member, reporting the first failed rule.
///
/// # Errors
///
/// Returns the reason the member is not eligible.
pub fn check_eligibility(
    member: &Member,
    role_id: RoleId,
    date: &ScheduleDate,
) -> Result<(), Ineligibility> {
    if !member.holds_role(role_id) {
        return Err(Ineligibility::MissingRole);
    }
    if !member.is_available(date.weekday(), &date.snapshot().effective_window()) {
        return Err(Ineligibility::Unavailable);
    }
    if member.is_on_holiday(date.date) {
        return Err(Ineligibility::OnHoliday);
    }
    Ok(())
}

/// Returns whether `member` may serve `role_id` on `date`.
#[must_use]
pub fn is_eligible(member: &Member, role_id: RoleId, date: &ScheduleDate) -> bool {
    check_eligibility(member, role_id, date).is_ok()
}

/// Returns the members eligible for `role` on `date`.
///
/// Members of other groups are ignored.
#[must_use]
pub fn eligible_members(date: &ScheduleDate, role: &Role, members: &[Member]) -> BTreeSet<MemberId> {
    members
        .iter()
        .filter(|member| member.group_id == role.group_id)
        .filter(|member| is_eligible(member, role.role_id, date))
        .map(|member| member.member_id)
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::{
        Availability, EventKind, EventSnapshot, GroupId, Holiday, ScheduleDateId, ScheduleId,
        TimeWindow, Weekday, parse_iso_date,
    };

    fn friday_date(kind: EventKind, window: TimeWindow) -> ScheduleDate {
        ScheduleDate::new(
            ScheduleDateId::new(1),
            ScheduleId::new(1),
            parse_iso_date("2026-02-06").unwrap(),
            None,
            EventSnapshot::new(kind, Some(String::from("Rehearsal")), window),
        )
    }

    fn role() -> Role {
        Role {
            role_id: RoleId::new(10),
            group_id: GroupId::new(1),
            name: String::from("Sound"),
            required_count: 1,
            display_order: 0,
            depends_on: None,
            exclusive_group: None,
            is_relevant: true,
        }
    }

    fn member(id: i64, weekday: Weekday, start: &str, end: &str) -> Member {
        let mut member = Member::new(MemberId::new(id), GroupId::new(1), "Member");
        member.roles.insert(RoleId::new(10));
        member.availability.push(Availability {
            weekday,
            window: TimeWindow::parse(start, end).unwrap(),
        });
        member
    }

    #[test]
    fn test_window_containment_required() {
        let date = friday_date(
            EventKind::Assignable,
            TimeWindow::parse("18:00", "20:00").unwrap(),
        );
        let inside = member(1, Weekday::Friday, "17:00", "21:00");
        let exact = member(2, Weekday::Friday, "18:00", "20:00");
        let overlapping = member(3, Weekday::Friday, "19:00", "22:00");

        assert!(is_eligible(&inside, RoleId::new(10), &date));
        assert!(is_eligible(&exact, RoleId::new(10), &date));
        assert_eq!(
            check_eligibility(&overlapping, RoleId::new(10), &date),
            Err(Ineligibility::Unavailable)
        );
    }

    #[test]
    fn test_wrong_weekday_is_unavailable() {
        let date = friday_date(EventKind::Assignable, TimeWindow::full_day());
        let sunday_only = member(1, Weekday::Sunday, "00:00", "23:59");
        assert_eq!(
            check_eligibility(&sunday_only, RoleId::new(10), &date),
            Err(Ineligibility::Unavailable)
        );
    }

    #[test]
    fn test_any_of_several_windows_suffices() {
        let date = friday_date(
            EventKind::Assignable,
            TimeWindow::parse("18:00", "20:00").unwrap(),
        );
        let mut split = member(1, Weekday::Friday, "08:00", "12:00");
        split.availability.push(Availability {
            weekday: Weekday::Friday,
            window: TimeWindow::parse("17:30", "23:00").unwrap(),
        });
        assert!(is_eligible(&split, RoleId::new(10), &date));
    }

    #[test]
    fn test_for_everyone_only_checks_weekday() {
        let date = friday_date(
            EventKind::ForEveryone,
            TimeWindow::parse("18:00", "20:00").unwrap(),
        );
        let morning = member(1, Weekday::Friday, "08:00", "09:00");
        assert!(is_eligible(&morning, RoleId::new(10), &date));
    }

    #[test]
    fn test_holiday_bounds_are_inclusive() {
        let date = friday_date(EventKind::Assignable, TimeWindow::full_day());
        let mut starts_on = member(1, Weekday::Friday, "00:00", "23:59");
        starts_on.holidays.push(
            Holiday::new(
                parse_iso_date("2026-02-06").unwrap(),
                parse_iso_date("2026-02-10").unwrap(),
            )
            .unwrap(),
        );
        let mut ends_on = member(2, Weekday::Friday, "00:00", "23:59");
        ends_on.holidays.push(
            Holiday::new(
                parse_iso_date("2026-02-01").unwrap(),
                parse_iso_date("2026-02-06").unwrap(),
            )
            .unwrap(),
        );
        let mut before = member(3, Weekday::Friday, "00:00", "23:59");
        before.holidays.push(
            Holiday::new(
                parse_iso_date("2026-02-01").unwrap(),
                parse_iso_date("2026-02-05").unwrap(),
            )
            .unwrap(),
        );

        assert_eq!(
            check_eligibility(&starts_on, RoleId::new(10), &date),
            Err(Ineligibility::OnHoliday)
        );
        assert_eq!(
            check_eligibility(&ends_on, RoleId::new(10), &date),
            Err(Ineligibility::OnHoliday)
        );
        assert!(is_eligible(&before, RoleId::new(10), &date));
    }

    #[test]
    fn test_eligible_members_filters_role_and_group() {
        let date = friday_date(EventKind::Assignable, TimeWindow::full_day());
        let holder = member(1, Weekday::Friday, "00:00", "23:59");
        let mut no_role = member(2, Weekday::Friday, "00:00", "23:59");
        no_role.roles.clear();
        let mut other_group = member(3, Weekday::Friday, "00:00", "23:59");
        other_group.group_id = GroupId::new(2);

        let eligible = eligible_members(&date, &role(), &[holder, no_role, other_group]);
        assert_eq!(eligible.into_iter().collect::<Vec<_>>(), vec![MemberId::new(1)]);
    }
}
