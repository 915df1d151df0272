// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API request and response data transfer objects.
//!
//! Dates are ISO `YYYY-MM-DD` strings and times are `HH:MM` strings in UTC.

use rota::{ConsistencyViolation, ImpactReport, ScheduleImpact, UnfilledReason, UnfilledSlot};
use rota_domain::{
    Assignment, Member, RecurringEvent, Role, Schedule, ScheduleDate, format_iso_date,
    format_time_of_day,
};
use serde::{Deserialize, Serialize};

use crate::error::RecalculationFailure;

/// API request to materialize the schedule of a group for one month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaterializeScheduleRequest {
    /// The group.
    pub group_id: i64,
    /// The month (1-12).
    pub month: u8,
    /// The year.
    pub year: i32,
}

/// Schedule information.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleInfo {
    /// The canonical schedule identifier.
    pub schedule_id: i64,
    /// The owning group.
    pub group_id: i64,
    /// The month (1-12).
    pub month: u8,
    /// The year.
    pub year: i32,
    /// `draft` or `committed`.
    pub status: String,
}

impl From<&Schedule> for ScheduleInfo {
    fn from(schedule: &Schedule) -> Self {
        Self {
            schedule_id: schedule.schedule_id.value(),
            group_id: schedule.group_id.value(),
            month: schedule.month,
            year: schedule.year,
            status: schedule.status.as_str().to_string(),
        }
    }
}

/// A dated occurrence of a schedule, with the event values copied onto it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleDateInfo {
    /// The canonical schedule date identifier.
    pub schedule_date_id: i64,
    /// The date.
    pub date: String,
    /// Weekday name of the date.
    pub weekday: String,
    /// `assignable` or `for_everyone`.
    pub kind: String,
    /// Optional label.
    pub label: Option<String>,
    /// Window start.
    pub start_time: String,
    /// Window end.
    pub end_time: String,
    /// The recurring event the date was materialized from, if it still
    /// exists.
    pub recurring_event_id: Option<i64>,
}

impl From<&ScheduleDate> for ScheduleDateInfo {
    fn from(date: &ScheduleDate) -> Self {
        let snapshot = date.snapshot();
        Self {
            schedule_date_id: date.schedule_date_id.value(),
            date: format_iso_date(date.date),
            weekday: date.weekday().to_string(),
            kind: snapshot.kind().as_str().to_string(),
            label: snapshot.label().map(str::to_string),
            start_time: format_time_of_day(snapshot.window().start()),
            end_time: format_time_of_day(snapshot.window().end()),
            recurring_event_id: date.recurring_event_id.map(|id| id.value()),
        }
    }
}

/// API response for a materialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaterializeScheduleResponse {
    /// The schedule, created as a draft if it did not exist.
    pub schedule: ScheduleInfo,
    /// How many dates this call created.
    pub created: usize,
    /// Every date of the schedule in ascending order.
    pub dates: Vec<ScheduleDateInfo>,
}

/// One member serving one role on one date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentInfo {
    /// The schedule date.
    pub schedule_date_id: i64,
    /// The calendar date.
    pub date: String,
    /// The role.
    pub role_id: i64,
    /// The member.
    pub member_id: i64,
}

impl AssignmentInfo {
    pub(crate) fn new(assignment: &Assignment, dates: &[ScheduleDate]) -> Self {
        let date: String = dates
            .iter()
            .find(|d| d.schedule_date_id == assignment.schedule_date_id)
            .map(|d| format_iso_date(d.date))
            .unwrap_or_default();
        Self {
            schedule_date_id: assignment.schedule_date_id.value(),
            date,
            role_id: assignment.role_id.value(),
            member_id: assignment.member_id.value(),
        }
    }
}

/// A role on a date left short of members.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnfilledSlotInfo {
    /// The schedule date.
    pub schedule_date_id: i64,
    /// The calendar date.
    pub date: String,
    /// The role.
    pub role_id: i64,
    /// How many members are missing.
    pub missing: u32,
    /// `under_staffed`, `dependency_cycle` or `exclusive_group_conflict`.
    pub reason: String,
}

impl From<&UnfilledSlot> for UnfilledSlotInfo {
    fn from(slot: &UnfilledSlot) -> Self {
        let reason: &str = match slot.reason {
            UnfilledReason::UnderStaffed => "under_staffed",
            UnfilledReason::ConsistencyViolation(ConsistencyViolation::DependencyCycle) => {
                "dependency_cycle"
            }
            UnfilledReason::ConsistencyViolation(ConsistencyViolation::ExclusiveGroupConflict) => {
                "exclusive_group_conflict"
            }
        };
        Self {
            schedule_date_id: slot.schedule_date_id.value(),
            date: format_iso_date(slot.date),
            role_id: slot.role_id.value(),
            missing: slot.missing,
            reason: reason.to_string(),
        }
    }
}

/// API response for an assignment build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildAssignmentsResponse {
    /// The schedule.
    pub schedule_id: i64,
    /// Dates materialized before the build.
    pub materialized: usize,
    /// Every assignment of the schedule, in date order.
    pub assignments: Vec<AssignmentInfo>,
    /// Role slots that could not be fully staffed.
    pub unfilled: Vec<UnfilledSlotInfo>,
}

/// What a recalculation did to one schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleRecalculationInfo {
    /// The schedule.
    pub schedule_id: i64,
    /// The month (1-12).
    pub month: u8,
    /// The year.
    pub year: i32,
    /// Dates kept with the event's current values.
    pub dates_refreshed: usize,
    /// Dates deleted because they no longer match the event.
    pub dates_retired: usize,
    /// Dates created on the event's current weekday.
    pub dates_added: usize,
    /// Assignments written for the rebuilt dates.
    pub assignments_applied: usize,
    /// Role slots of the rebuilt dates that could not be fully staffed.
    pub unfilled: Vec<UnfilledSlotInfo>,
}

/// API response for a recalculation.
///
/// The response always carries the successes. Failing schedules are listed
/// in `failures`; [`RecalculateResponse::into_result`] turns a partial
/// failure into an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecalculateResponse {
    /// The recurring event that changed.
    pub recurring_event_id: i64,
    /// Number of schedules whose dates or assignments changed.
    pub schedules_updated: usize,
    /// Total assignments written.
    pub assignments_applied: usize,
    /// Ids of schedules whose recalculation failed and was rolled back.
    pub failures: Vec<i64>,
    /// Per-schedule breakdown of the successful recalculations.
    pub schedules: Vec<ScheduleRecalculationInfo>,
}

impl RecalculateResponse {
    /// Returns the response, or an aggregate error if any schedule failed.
    ///
    /// # Errors
    ///
    /// Returns `RecalculationFailure` if `failures` is not empty.
    pub fn into_result(self) -> Result<Self, RecalculationFailure> {
        if self.failures.is_empty() {
            Ok(self)
        } else {
            Err(RecalculationFailure {
                succeeded: self.schedules_updated,
                failed: self.failures,
            })
        }
    }
}

/// Dates of one schedule that reference a recurring event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleImpactInfo {
    /// The schedule.
    pub schedule_id: i64,
    /// The month (1-12).
    pub month: u8,
    /// The year.
    pub year: i32,
    /// Number of referencing dates.
    pub date_count: usize,
}

impl From<&ScheduleImpact> for ScheduleImpactInfo {
    fn from(impact: &ScheduleImpact) -> Self {
        Self {
            schedule_id: impact.schedule_id.value(),
            month: impact.month,
            year: impact.year,
            date_count: impact.date_count,
        }
    }
}

/// API response for an impact query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AffectedScheduleDatesResponse {
    /// The recurring event.
    pub recurring_event_id: i64,
    /// Total referencing dates.
    pub count: usize,
    /// Per-schedule breakdown in calendar order.
    pub schedules: Vec<ScheduleImpactInfo>,
}

impl From<&ImpactReport> for AffectedScheduleDatesResponse {
    fn from(report: &ImpactReport) -> Self {
        Self {
            recurring_event_id: report.recurring_event_id.value(),
            count: report.count,
            schedules: report.schedules.iter().map(ScheduleImpactInfo::from).collect(),
        }
    }
}

// ============================================================================
// Configuration
// ============================================================================

/// API request to create a recurring event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateRecurringEventRequest {
    /// The owning group.
    pub group_id: i64,
    /// Weekday name, case-insensitive.
    pub weekday: String,
    /// Whether the event is materialized.
    pub active: bool,
    /// `assignable` or `for_everyone`.
    pub kind: String,
    /// Optional label.
    pub label: Option<String>,
    /// Window start (`HH:MM`).
    pub start_time: String,
    /// Window end (`HH:MM`).
    pub end_time: String,
}

/// API request to change a recurring event.
///
/// Stored dates keep their copied values until the event is recalculated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateRecurringEventRequest {
    /// The event to change.
    pub recurring_event_id: i64,
    /// Weekday name, case-insensitive.
    pub weekday: String,
    /// Whether the event is materialized.
    pub active: bool,
    /// `assignable` or `for_everyone`.
    pub kind: String,
    /// Optional label.
    pub label: Option<String>,
    /// Window start (`HH:MM`).
    pub start_time: String,
    /// Window end (`HH:MM`).
    pub end_time: String,
}

/// Recurring event information.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecurringEventInfo {
    /// The canonical identifier.
    pub recurring_event_id: i64,
    /// The owning group.
    pub group_id: i64,
    /// Weekday name.
    pub weekday: String,
    /// Whether the event is materialized.
    pub active: bool,
    /// `assignable` or `for_everyone`.
    pub kind: String,
    /// Optional label.
    pub label: Option<String>,
    /// Window start.
    pub start_time: String,
    /// Window end.
    pub end_time: String,
}

impl From<&RecurringEvent> for RecurringEventInfo {
    fn from(event: &RecurringEvent) -> Self {
        Self {
            recurring_event_id: event.recurring_event_id.value(),
            group_id: event.group_id.value(),
            weekday: event.weekday.to_string(),
            active: event.active,
            kind: event.kind.as_str().to_string(),
            label: event.label.clone(),
            start_time: format_time_of_day(event.window.start()),
            end_time: format_time_of_day(event.window.end()),
        }
    }
}

/// API response for a recurring event deletion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteRecurringEventResponse {
    /// The deleted event.
    pub recurring_event_id: i64,
    /// Schedule dates that referenced it.
    pub affected_dates: usize,
}

/// API request to create a role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateRoleRequest {
    /// The owning group.
    pub group_id: i64,
    /// Role name.
    pub name: String,
    /// Members needed per date, at least 1.
    pub required_count: u32,
    /// Fallback fill order.
    pub display_order: i32,
    /// Anchor role whose member is preferred.
    pub depends_on: Option<i64>,
    /// Roles sharing an exclusive group never share a member on a date.
    pub exclusive_group: Option<i64>,
    /// Informational flag.
    pub is_relevant: bool,
}

/// Role information.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleInfo {
    /// The canonical identifier.
    pub role_id: i64,
    /// The owning group.
    pub group_id: i64,
    /// Role name.
    pub name: String,
    /// Members needed per date.
    pub required_count: u32,
    /// Fallback fill order.
    pub display_order: i32,
    /// Anchor role.
    pub depends_on: Option<i64>,
    /// Exclusive group.
    pub exclusive_group: Option<i64>,
    /// Informational flag.
    pub is_relevant: bool,
}

impl From<&Role> for RoleInfo {
    fn from(role: &Role) -> Self {
        Self {
            role_id: role.role_id.value(),
            group_id: role.group_id.value(),
            name: role.name.clone(),
            required_count: role.required_count,
            display_order: role.display_order,
            depends_on: role.depends_on.map(|id| id.value()),
            exclusive_group: role.exclusive_group.map(|id| id.value()),
            is_relevant: role.is_relevant,
        }
    }
}

/// Member information.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberInfo {
    /// The canonical identifier.
    pub member_id: i64,
    /// The owning group.
    pub group_id: i64,
    /// Display name.
    pub name: String,
    /// Roles the member holds.
    pub role_ids: Vec<i64>,
}

impl From<&Member> for MemberInfo {
    fn from(member: &Member) -> Self {
        Self {
            member_id: member.member_id.value(),
            group_id: member.group_id.value(),
            name: member.name.clone(),
            role_ids: member.roles.iter().map(|id| id.value()).collect(),
        }
    }
}

/// API request to record a weekly availability window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddAvailabilityRequest {
    /// The member.
    pub member_id: i64,
    /// Weekday name, case-insensitive.
    pub weekday: String,
    /// Window start (`HH:MM`).
    pub start_time: String,
    /// Window end (`HH:MM`).
    pub end_time: String,
}

/// API request to record a holiday.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddHolidayRequest {
    /// The member.
    pub member_id: i64,
    /// First day off, inclusive.
    pub start_date: String,
    /// Last day off, inclusive.
    pub end_date: String,
}
