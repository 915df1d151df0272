// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;
use crate::types::{GroupId, RecurringEvent, RecurringEventId, Weekday};
use time::Month;

/// Validates a 1-based month number.
///
/// # Errors
///
/// Returns `DomainError::InvalidMonth` if the month is outside 1-12.
pub fn validate_month(month: u8) -> Result<Month, DomainError> {
    Month::try_from(month).map_err(|_| DomainError::InvalidMonth(month))
}

/// Validates that a year is a reasonable calendar year.
///
/// # Errors
///
/// Returns an error if the year is not between 1900 and 2200.
pub fn validate_year(year: i32) -> Result<(), DomainError> {
    if !(1900..=2200).contains(&year) {
        return Err(DomainError::InvalidYear(year));
    }
    Ok(())
}

/// Validates a role's own fields.
///
/// Dependency validation needs the rest of the group and lives in
/// `validate_role_dependencies`.
///
/// # Errors
///
/// Returns an error if:
/// - The name is empty
/// - The required count is zero
pub fn validate_role_fields(name: &str, required_count: u32) -> Result<(), DomainError> {
    if name.trim().is_empty() {
        return Err(DomainError::InvalidRoleName);
    }
    if required_count == 0 {
        return Err(DomainError::InvalidRequiredCount(required_count));
    }
    Ok(())
}

/// Validates a member name.
///
/// # Errors
///
/// Returns an error if the name is empty.
pub fn validate_member_name(name: &str) -> Result<(), DomainError> {
    if name.trim().is_empty() {
        return Err(DomainError::InvalidMemberName);
    }
    Ok(())
}

/// Rejects a second active recurring event on an already-taken weekday.
///
/// `exclude` names the event being updated so it is never compared
/// against itself. Callers only validate events that will be active.
///
/// # Errors
///
/// Returns `DomainError::DuplicateActiveWeekday` if another active event of
/// the group already uses `weekday`.
pub fn validate_unique_active_weekday(
    existing: &[RecurringEvent],
    group_id: GroupId,
    weekday: Weekday,
    exclude: Option<RecurringEventId>,
) -> Result<(), DomainError> {
    let clash: bool = existing.iter().any(|event| {
        Some(event.recurring_event_id) != exclude
            && event.group_id == group_id
            && event.active
            && event.weekday == weekday
    });

    if clash {
        return Err(DomainError::DuplicateActiveWeekday { group_id, weekday });
    }
    Ok(())
}
