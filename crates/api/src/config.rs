// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Configuration writes.
//!
//! Rules that need the rest of a group are enforced here, before the
//! write: one active recurring event per weekday, role anchors within the
//! group, and an acyclic dependency graph.

use rota_domain::{
    Availability, EventKind, ExclusiveGroupId, GroupId, Holiday, Member, MemberId,
    RecurringEvent, RecurringEventId, Role, RoleId, Schedule, ScheduleId, ScheduleStatus,
    TimeWindow, Weekday, parse_iso_date, validate_dependency_change, validate_member_name,
    validate_role_fields, validate_unique_active_weekday,
};
use rota_persistence::{DeletePolicy, NewRecurringEvent, NewRole, Persistence};
use tracing::info;

use crate::error::ApiError;
use crate::handlers::{require_event, require_group, require_schedule};
use crate::request_response::{
    AddAvailabilityRequest, AddHolidayRequest, CreateRecurringEventRequest, CreateRoleRequest,
    DeleteRecurringEventResponse, MemberInfo, RecurringEventInfo, RoleInfo, ScheduleInfo,
    UpdateRecurringEventRequest,
};

/// Creates a group and returns its id.
///
/// # Errors
///
/// Returns an error if the name is empty or the insert fails.
pub fn create_group(persistence: &mut Persistence, name: &str) -> Result<GroupId, ApiError> {
    if name.trim().is_empty() {
        return Err(ApiError::InvalidInput {
            field: String::from("name"),
            message: String::from("Group name cannot be empty"),
        });
    }
    let group_id: GroupId = persistence.create_group(name.trim())?;
    info!(%group_id, "Created group");
    Ok(group_id)
}

/// Creates a recurring event.
///
/// # Errors
///
/// Returns an error if:
/// - The weekday, kind or time window is invalid
/// - The group does not exist
/// - The event is active and the group already has an active event on the
///   same weekday
pub fn create_recurring_event(
    persistence: &mut Persistence,
    request: &CreateRecurringEventRequest,
) -> Result<RecurringEventInfo, ApiError> {
    let group_id: GroupId = GroupId::new(request.group_id);
    let weekday: Weekday = request.weekday.parse()?;
    let kind: EventKind = request.kind.parse()?;
    let window: TimeWindow = TimeWindow::parse(&request.start_time, &request.end_time)?;
    require_group(persistence, group_id)?;

    if request.active {
        let existing: Vec<RecurringEvent> = persistence.list_recurring_events(group_id)?;
        validate_unique_active_weekday(&existing, group_id, weekday, None)?;
    }

    let recurring_event_id: RecurringEventId =
        persistence.create_recurring_event(&NewRecurringEvent {
            group_id,
            weekday,
            active: request.active,
            kind,
            label: request.label.clone(),
            window,
        })?;
    let event: RecurringEvent = require_event(persistence, recurring_event_id)?;

    info!(%recurring_event_id, %group_id, %weekday, %kind, "Created recurring event");
    Ok(RecurringEventInfo::from(&event))
}

/// Changes a recurring event.
///
/// Stored schedule dates keep their copied values; run a recalculation to
/// carry the change onto future dates.
///
/// # Errors
///
/// Returns an error if:
/// - The event does not exist
/// - The weekday, kind or time window is invalid
/// - The event stays active and another active event of the group uses
///   the same weekday
pub fn update_recurring_event(
    persistence: &mut Persistence,
    request: &UpdateRecurringEventRequest,
) -> Result<RecurringEventInfo, ApiError> {
    let recurring_event_id: RecurringEventId = RecurringEventId::new(request.recurring_event_id);
    let current: RecurringEvent = require_event(persistence, recurring_event_id)?;

    let updated: RecurringEvent = RecurringEvent {
        recurring_event_id,
        group_id: current.group_id,
        weekday: request.weekday.parse()?,
        active: request.active,
        kind: request.kind.parse()?,
        label: request.label.clone(),
        window: TimeWindow::parse(&request.start_time, &request.end_time)?,
    };

    if updated.active {
        let existing: Vec<RecurringEvent> = persistence.list_recurring_events(current.group_id)?;
        validate_unique_active_weekday(
            &existing,
            current.group_id,
            updated.weekday,
            Some(recurring_event_id),
        )?;
    }

    persistence.update_recurring_event(&updated)?;
    info!(
        %recurring_event_id,
        from = %current.weekday,
        to = %updated.weekday,
        active = updated.active,
        "Updated recurring event"
    );
    Ok(RecurringEventInfo::from(&updated))
}

/// Deletes a recurring event, applying `policy` to its schedule dates.
///
/// # Errors
///
/// Returns an error if the event does not exist or the delete fails.
pub fn delete_recurring_event(
    persistence: &mut Persistence,
    recurring_event_id: RecurringEventId,
    policy: DeletePolicy,
) -> Result<DeleteRecurringEventResponse, ApiError> {
    require_event(persistence, recurring_event_id)?;
    let affected_dates: usize = persistence.delete_recurring_event(recurring_event_id, policy)?;
    Ok(DeleteRecurringEventResponse {
        recurring_event_id: recurring_event_id.value(),
        affected_dates,
    })
}

/// Creates a role.
///
/// # Errors
///
/// Returns an error if:
/// - The name is empty or the required count is zero
/// - The group does not exist
/// - The anchor role does not exist or belongs to another group
pub fn create_role(
    persistence: &mut Persistence,
    request: &CreateRoleRequest,
) -> Result<RoleInfo, ApiError> {
    validate_role_fields(&request.name, request.required_count)?;
    let group_id: GroupId = GroupId::new(request.group_id);
    require_group(persistence, group_id)?;

    let depends_on: Option<RoleId> = request.depends_on.map(RoleId::new);
    if let Some(anchor_id) = depends_on {
        let anchor: Role = require_role(persistence, anchor_id)?;
        if anchor.group_id != group_id {
            return Err(ApiError::rule(
                "same_group_dependency",
                format!("Role {anchor_id} belongs to another group"),
            ));
        }
    }

    let role_id: RoleId = persistence.create_role(&NewRole {
        group_id,
        name: request.name.trim().to_string(),
        required_count: request.required_count,
        display_order: request.display_order,
        depends_on,
        exclusive_group: request.exclusive_group.map(ExclusiveGroupId::new),
        is_relevant: request.is_relevant,
    })?;
    let role: Role = require_role(persistence, role_id)?;

    info!(%role_id, %group_id, name = %role.name, "Created role");
    Ok(RoleInfo::from(&role))
}

/// Sets or clears the anchor of a role.
///
/// # Errors
///
/// Returns an error if the role or anchor does not exist, the anchor
/// belongs to another group, or the change would close a dependency cycle.
pub fn set_role_dependency(
    persistence: &mut Persistence,
    role_id: RoleId,
    depends_on: Option<RoleId>,
) -> Result<RoleInfo, ApiError> {
    let role: Role = require_role(persistence, role_id)?;
    if let Some(anchor_id) = depends_on {
        let anchor: Role = require_role(persistence, anchor_id)?;
        if anchor.group_id != role.group_id {
            return Err(ApiError::rule(
                "same_group_dependency",
                format!("Role {role_id} cannot depend on role {anchor_id} from another group"),
            ));
        }
    }

    let roles: Vec<Role> = persistence.list_roles(role.group_id)?;
    validate_dependency_change(&roles, role_id, depends_on)?;
    persistence.set_role_dependency(role_id, depends_on)?;

    info!(%role_id, depends_on = ?depends_on.map(RoleId::value), "Set role dependency");
    let updated: Role = require_role(persistence, role_id)?;
    Ok(RoleInfo::from(&updated))
}

/// Puts a role into an exclusive group, or takes it out.
///
/// # Errors
///
/// Returns an error if the role does not exist or the update fails.
pub fn set_role_exclusive_group(
    persistence: &mut Persistence,
    role_id: RoleId,
    exclusive_group: Option<ExclusiveGroupId>,
) -> Result<RoleInfo, ApiError> {
    require_role(persistence, role_id)?;
    persistence.set_role_exclusive_group(role_id, exclusive_group)?;
    let updated: Role = require_role(persistence, role_id)?;
    Ok(RoleInfo::from(&updated))
}

/// Sets the fill priority of a role on dates of one recurring event.
///
/// Lower values fill first.
///
/// # Errors
///
/// Returns an error if the event or role does not exist, or they belong to
/// different groups.
pub fn set_event_role_priority(
    persistence: &mut Persistence,
    recurring_event_id: RecurringEventId,
    role_id: RoleId,
    priority: i32,
) -> Result<(), ApiError> {
    let event: RecurringEvent = require_event(persistence, recurring_event_id)?;
    let role: Role = require_role(persistence, role_id)?;
    if event.group_id != role.group_id {
        return Err(ApiError::rule(
            "same_group_priority",
            format!("Role {role_id} and recurring event {recurring_event_id} belong to different groups"),
        ));
    }
    persistence.set_event_role_priority(recurring_event_id, role_id, priority)?;
    Ok(())
}

/// Creates a member with no roles, availability or holidays.
///
/// # Errors
///
/// Returns an error if the name is empty or the group does not exist.
pub fn create_member(
    persistence: &mut Persistence,
    group_id: GroupId,
    name: &str,
) -> Result<MemberInfo, ApiError> {
    validate_member_name(name)?;
    require_group(persistence, group_id)?;
    let member_id: MemberId = persistence.create_member(group_id, name.trim())?;
    info!(%member_id, %group_id, "Created member");
    member_info(persistence, member_id)
}

/// Lets a member serve a role.
///
/// # Errors
///
/// Returns an error if the member or role does not exist, or they belong
/// to different groups.
pub fn assign_member_role(
    persistence: &mut Persistence,
    member_id: MemberId,
    role_id: RoleId,
) -> Result<MemberInfo, ApiError> {
    let member: Member = require_member(persistence, member_id)?;
    let role: Role = require_role(persistence, role_id)?;
    if member.group_id != role.group_id {
        return Err(ApiError::rule(
            "same_group_member_role",
            format!("Member {member_id} cannot hold role {role_id} of another group"),
        ));
    }
    persistence.assign_member_role(member_id, role_id)?;
    member_info(persistence, member_id)
}

/// Records a weekly availability window for a member.
///
/// # Errors
///
/// Returns an error if the weekday or window is invalid, or the member
/// does not exist.
pub fn add_availability(
    persistence: &mut Persistence,
    request: &AddAvailabilityRequest,
) -> Result<MemberInfo, ApiError> {
    let availability: Availability = Availability {
        weekday: request.weekday.parse()?,
        window: TimeWindow::parse(&request.start_time, &request.end_time)?,
    };
    let member_id: MemberId = MemberId::new(request.member_id);
    require_member(persistence, member_id)?;
    persistence.add_availability(member_id, &availability)?;
    member_info(persistence, member_id)
}

/// Records a holiday for a member. Both bounds are inclusive.
///
/// # Errors
///
/// Returns an error if a date is malformed, the range ends before it
/// starts, or the member does not exist.
pub fn add_holiday(
    persistence: &mut Persistence,
    request: &AddHolidayRequest,
) -> Result<MemberInfo, ApiError> {
    let holiday: Holiday = Holiday::new(
        parse_iso_date(&request.start_date)?,
        parse_iso_date(&request.end_date)?,
    )?;
    let member_id: MemberId = MemberId::new(request.member_id);
    require_member(persistence, member_id)?;
    persistence.add_holiday(member_id, &holiday)?;
    member_info(persistence, member_id)
}

/// Marks a schedule as draft or committed.
///
/// Committed schedules cannot be rebuilt and are the ones that seed the
/// fairness tally under the committed-history policy.
///
/// # Errors
///
/// Returns an error if the status is unknown or the schedule does not
/// exist.
pub fn set_schedule_status(
    persistence: &mut Persistence,
    schedule_id: ScheduleId,
    status: &str,
) -> Result<ScheduleInfo, ApiError> {
    let status: ScheduleStatus = status.parse()?;
    require_schedule(persistence, schedule_id)?;
    persistence.set_schedule_status(schedule_id, status)?;
    let schedule: Schedule = require_schedule(persistence, schedule_id)?;
    Ok(ScheduleInfo::from(&schedule))
}

fn require_role(persistence: &mut Persistence, role_id: RoleId) -> Result<Role, ApiError> {
    persistence
        .get_role(role_id)?
        .ok_or_else(|| ApiError::not_found("Role", format!("Role {role_id} does not exist")))
}

fn require_member(persistence: &mut Persistence, member_id: MemberId) -> Result<Member, ApiError> {
    persistence.get_member(member_id)?.ok_or_else(|| {
        ApiError::not_found("Member", format!("Member {member_id} does not exist"))
    })
}

fn member_info(persistence: &mut Persistence, member_id: MemberId) -> Result<MemberInfo, ApiError> {
    let member: Member = require_member(persistence, member_id)?;
    Ok(MemberInfo::from(&member))
}
