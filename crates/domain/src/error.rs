// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::types::{GroupId, RoleId, Weekday};

/// Errors that can occur during domain validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Month is outside 1-12.
    InvalidMonth(u8),
    /// Year is outside the supported calendar range.
    InvalidYear(i32),
    /// Weekday name could not be recognized.
    InvalidWeekday(String),
    /// A weekday index was outside 0-6.
    InvalidWeekdayIndex(i32),
    /// Failed to parse a time of day.
    TimeParseError {
        /// The invalid time string.
        time_string: String,
        /// The parsing error message.
        error: String,
    },
    /// Failed to parse a calendar date.
    DateParseError {
        /// The invalid date string.
        date_string: String,
        /// The parsing error message.
        error: String,
    },
    /// A time window does not end after it starts.
    InvalidTimeWindow {
        /// Window start (`HH:MM`).
        start: String,
        /// Window end (`HH:MM`).
        end: String,
    },
    /// A holiday ends before it starts.
    InvalidHolidayRange {
        /// First day of the holiday.
        start: time::Date,
        /// Last day of the holiday.
        end: time::Date,
    },
    /// Schedule-date type string was not recognized.
    InvalidEventKind(String),
    /// Schedule status string was not recognized.
    InvalidScheduleStatus(String),
    /// A role must require at least one member.
    InvalidRequiredCount(u32),
    /// A role name is empty.
    InvalidRoleName,
    /// A member name is empty.
    InvalidMemberName,
    /// A role dependency references a role that does not exist in the group.
    UnknownAnchorRole {
        /// The dependent role.
        role_id: RoleId,
        /// The missing anchor role.
        anchor_id: RoleId,
    },
    /// A role dependency references a role from another group.
    CrossGroupDependency {
        /// The dependent role.
        role_id: RoleId,
        /// The anchor role.
        anchor_id: RoleId,
    },
    /// Role dependencies form a cycle.
    DependencyCycle {
        /// The roles on the cycle, starting from the role being validated.
        cycle: Vec<RoleId>,
    },
    /// A second active recurring event targets a weekday that already has one.
    DuplicateActiveWeekday {
        /// The group.
        group_id: GroupId,
        /// The weekday already taken.
        weekday: Weekday,
    },
}

impl std::fmt::Display for DomainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidMonth(month) => {
                write!(f, "Invalid month: {month}. Must be between 1 and 12")
            }
            Self::InvalidYear(year) => {
                write!(f, "Invalid year: {year}. Must be between 1900 and 2200")
            }
            Self::InvalidWeekday(name) => write!(f, "Invalid weekday: '{name}'"),
            Self::InvalidWeekdayIndex(index) => {
                write!(f, "Invalid weekday index: {index}. Must be between 0 and 6")
            }
            Self::TimeParseError { time_string, error } => {
                write!(f, "Failed to parse time '{time_string}': {error}")
            }
            Self::DateParseError { date_string, error } => {
                write!(f, "Failed to parse date '{date_string}': {error}")
            }
            Self::InvalidTimeWindow { start, end } => {
                write!(f, "Time window must end after it starts ({start} - {end})")
            }
            Self::InvalidHolidayRange { start, end } => {
                write!(f, "Holiday ends ({end}) before it starts ({start})")
            }
            Self::InvalidEventKind(kind) => write!(f, "Invalid schedule date type: '{kind}'"),
            Self::InvalidScheduleStatus(status) => {
                write!(f, "Invalid schedule status: '{status}'")
            }
            Self::InvalidRequiredCount(count) => {
                write!(f, "Invalid required count: {count}. Must be at least 1")
            }
            Self::InvalidRoleName => write!(f, "Role name cannot be empty"),
            Self::InvalidMemberName => write!(f, "Member name cannot be empty"),
            Self::UnknownAnchorRole { role_id, anchor_id } => {
                write!(f, "Role {role_id} depends on unknown role {anchor_id}")
            }
            Self::CrossGroupDependency { role_id, anchor_id } => {
                write!(
                    f,
                    "Role {role_id} cannot depend on role {anchor_id} from another group"
                )
            }
            Self::DependencyCycle { cycle } => {
                let path: Vec<String> = cycle.iter().map(ToString::to_string).collect();
                write!(f, "Role dependencies form a cycle: {}", path.join(" -> "))
            }
            Self::DuplicateActiveWeekday { group_id, weekday } => {
                write!(
                    f,
                    "Group {group_id} already has an active recurring event on {weekday}"
                )
            }
        }
    }
}

impl std::error::Error for DomainError {}
