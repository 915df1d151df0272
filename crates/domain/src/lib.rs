// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(clippy::cargo_common_metadata)]

mod calendar;
mod constraints;
mod eligibility;
mod error;
mod types;
mod validation;

#[cfg(test)]
mod tests;

pub use calendar::{expand_month, expand_month_by_names};
pub use constraints::{
    DateAssignments, effective_priority, find_dependency_cycle, order_roles, roles_on_cycles,
    validate_dependency_change, validate_role_dependencies,
};
pub use eligibility::{Ineligibility, check_eligibility, eligible_members, is_eligible};

// Re-export public types
pub use error::DomainError;
pub use types::{
    Assignment, Availability, EventKind, EventRolePriority, EventSnapshot, ExclusiveGroupId,
    GroupId, Holiday, Member, MemberId, NewScheduleDate, RecurringEvent, RecurringEventId, Role,
    RoleId, Schedule, ScheduleDate, ScheduleDateId, ScheduleId, ScheduleStatus, TimeWindow,
    Weekday, format_iso_date, format_time_of_day, parse_iso_date, parse_time_of_day,
};
pub use validation::{
    validate_member_name, validate_month, validate_role_fields, validate_unique_active_weekday,
    validate_year,
};
