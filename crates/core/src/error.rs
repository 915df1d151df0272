// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use rota_domain::{DomainError, GroupId, ScheduleDateId, ScheduleId};

/// Errors raised by the engine before it produces any output.
///
/// Staffing shortfalls and consistency violations found while assigning are
/// not errors; they are reported as unfilled slots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// A domain rule was violated.
    DomainViolation(DomainError),
    /// A schedule date belongs to a different schedule than the one processed.
    ScheduleMismatch {
        /// The schedule being processed.
        expected: ScheduleId,
        /// The schedule the date belongs to.
        found: ScheduleId,
        /// The offending date.
        schedule_date_id: ScheduleDateId,
    },
    /// The roster and the schedule belong to different groups.
    GroupMismatch {
        /// The schedule's group.
        schedule_group: GroupId,
        /// The roster's group.
        roster_group: GroupId,
    },
    /// A schedule date references a schedule that was not supplied.
    UnknownSchedule(ScheduleId),
}

impl std::fmt::Display for CoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DomainViolation(err) => write!(f, "Domain violation: {err}"),
            Self::ScheduleMismatch {
                expected,
                found,
                schedule_date_id,
            } => write!(
                f,
                "Schedule date {schedule_date_id} belongs to schedule {found}, not {expected}"
            ),
            Self::GroupMismatch {
                schedule_group,
                roster_group,
            } => write!(
                f,
                "Roster of group {roster_group} cannot staff a schedule of group {schedule_group}"
            ),
            Self::UnknownSchedule(id) => write!(f, "Schedule {id} was not provided"),
        }
    }
}

impl std::error::Error for CoreError {}

impl From<DomainError> for CoreError {
    fn from(err: DomainError) -> Self {
        Self::DomainViolation(err)
    }
}
