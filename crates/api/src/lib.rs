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
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! API boundary for the rota engine.
//!
//! Callers hand in plain ids and strings and get back serializable
//! responses. Caller identity and group authorization are resolved before
//! any function here is called.
//!
//! The four engine operations live in [`handlers`]: materializing a month,
//! building its assignments, recalculating after a recurring event
//! changes, and measuring the impact of deleting one. Configuration writes
//! live in [`config`].

pub mod config;
mod error;
pub mod handlers;
mod request_response;

#[cfg(test)]
mod tests;

pub use config::{
    add_availability, add_holiday, assign_member_role, create_group, create_member,
    create_recurring_event, create_role, delete_recurring_event, set_event_role_priority,
    set_role_dependency, set_role_exclusive_group, set_schedule_status, update_recurring_event,
};
pub use error::{
    ApiError, RecalculationFailure, translate_core_error, translate_domain_error,
    translate_persistence_error,
};
pub use handlers::{
    affected_schedule_dates, build_assignments, materialize_schedule,
    recalculate_future_assignments,
};
pub use request_response::{
    AddAvailabilityRequest, AddHolidayRequest, AffectedScheduleDatesResponse, AssignmentInfo,
    BuildAssignmentsResponse, CreateRecurringEventRequest, CreateRoleRequest,
    DeleteRecurringEventResponse, MaterializeScheduleRequest, MaterializeScheduleResponse,
    MemberInfo, RecalculateResponse, RecurringEventInfo, RoleInfo, ScheduleDateInfo,
    ScheduleImpactInfo, ScheduleInfo, ScheduleRecalculationInfo, UnfilledSlotInfo,
    UpdateRecurringEventRequest,
};
pub use rota::FairnessPolicy;
pub use rota_persistence::DeletePolicy;
