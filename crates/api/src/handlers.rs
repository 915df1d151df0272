// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! The engine operations: materialize, build, recalculate and impact.
//!
//! Each operation validates its input and resolves every referenced id
//! before anything is written. Writes for one schedule happen in one
//! schedule transaction, so a failed operation leaves the schedule as it
//! was.

use rota::{
    BuildOutcome, FairnessPolicy, FairnessTally, ImpactReport, Roster, ScheduleRecalculation,
    build_schedule, materialize_dates, plan_recalculation, summarize_impact,
};
use rota_domain::{
    Assignment, GroupId, NewScheduleDate, RecurringEvent, RecurringEventId, Schedule, ScheduleDate,
    ScheduleDateId, ScheduleId, ScheduleStatus, validate_month, validate_year,
};
use rota_persistence::Persistence;
use std::collections::BTreeSet;
use time::Date;
use tracing::{debug, info, warn};

use crate::error::ApiError;
use crate::request_response::{
    AffectedScheduleDatesResponse, AssignmentInfo, BuildAssignmentsResponse,
    MaterializeScheduleRequest, MaterializeScheduleResponse, RecalculateResponse,
    ScheduleDateInfo, ScheduleInfo, ScheduleRecalculationInfo, UnfilledSlotInfo,
};

/// Materializes the schedule of a group for one month.
///
/// The schedule is created as a draft if it does not exist. Dates that
/// already exist are left alone, so repeated calls never duplicate rows.
///
/// # Arguments
///
/// * `persistence` - The persistence layer
/// * `request` - The group and month to materialize
///
/// # Errors
///
/// Returns an error if:
/// - The month or year is invalid
/// - The group does not exist
/// - A database operation fails
pub fn materialize_schedule(
    persistence: &mut Persistence,
    request: &MaterializeScheduleRequest,
) -> Result<MaterializeScheduleResponse, ApiError> {
    validate_month(request.month)?;
    validate_year(request.year)?;
    let group_id: GroupId = GroupId::new(request.group_id);
    require_group(persistence, group_id)?;

    let schedule: Schedule =
        persistence.get_or_create_schedule(group_id, request.month, request.year)?;
    let created: usize = materialize_into(persistence, &schedule)?;
    let dates: Vec<ScheduleDate> = persistence.list_schedule_dates(schedule.schedule_id)?;

    info!(
        schedule_id = %schedule.schedule_id,
        %group_id,
        month = request.month,
        year = request.year,
        created,
        total = dates.len(),
        "Materialized schedule"
    );

    Ok(MaterializeScheduleResponse {
        schedule: ScheduleInfo::from(&schedule),
        created,
        dates: dates.iter().map(ScheduleDateInfo::from).collect(),
    })
}

/// Builds the assignments of a schedule from scratch.
///
/// Missing dates are materialized first. Every assignable date is then
/// restaffed in ascending date order and the previous assignments are
/// replaced, all in one transaction.
///
/// # Arguments
///
/// * `persistence` - The persistence layer
/// * `schedule_id` - The schedule to build
/// * `policy` - How the fairness tally is seeded
///
/// # Errors
///
/// Returns an error if:
/// - The schedule does not exist
/// - The schedule is committed
/// - A database operation fails
pub fn build_assignments(
    persistence: &mut Persistence,
    schedule_id: ScheduleId,
    policy: FairnessPolicy,
) -> Result<BuildAssignmentsResponse, ApiError> {
    let schedule: Schedule = require_schedule(persistence, schedule_id)?;
    if schedule.status == ScheduleStatus::Committed {
        return Err(ApiError::rule(
            "committed_schedule_locked",
            format!("Schedule {schedule_id} is committed and cannot be rebuilt"),
        ));
    }

    let materialized: usize = materialize_into(persistence, &schedule)?;
    let roster: Roster = load_roster(persistence, schedule.group_id)?;
    let tally: FairnessTally = seed_tally(persistence, &schedule, policy)?;

    let (dates, outcome): (Vec<ScheduleDate>, BuildOutcome) = persistence
        .with_schedule_transaction(schedule_id, |tx| -> Result<_, ApiError> {
            let dates: Vec<ScheduleDate> = tx.dates()?;
            let outcome: BuildOutcome = build_schedule(&roster, &schedule, &dates, tally)?;
            let ids: Vec<ScheduleDateId> = dates.iter().map(|d| d.schedule_date_id).collect();
            tx.clear_assignments(&ids)?;
            tx.insert_assignments(&outcome.assignments)?;
            Ok((dates, outcome))
        })?;

    info!(
        %schedule_id,
        ?policy,
        materialized,
        assignments = outcome.assignments.len(),
        unfilled = outcome.unfilled.len(),
        "Built assignments"
    );

    Ok(BuildAssignmentsResponse {
        schedule_id: schedule_id.value(),
        materialized,
        assignments: outcome
            .assignments
            .iter()
            .map(|a| AssignmentInfo::new(a, &dates))
            .collect(),
        unfilled: outcome.unfilled.iter().map(UnfilledSlotInfo::from).collect(),
    })
}

/// Rebuilds the future dates of every schedule referencing a changed
/// recurring event.
///
/// Dates before `today` are never touched. Dates from `today` on that
/// still fall on the event's weekday while it is active get its current
/// values and are restaffed. The rest are retired: deleted together with
/// their assignments, whatever delete policy the event itself would get.
/// The event's new weekday dates are then added. Each schedule is applied
/// in its own transaction: a schedule that fails is rolled back and reported in
/// `failures`, while schedules that succeeded keep their changes.
///
/// # Arguments
///
/// * `persistence` - The persistence layer
/// * `recurring_event_id` - The event whose configuration changed
/// * `today` - The cutoff date
/// * `policy` - How the fairness tally is seeded
///
/// # Errors
///
/// Returns an error if the event does not exist or the affected schedules
/// cannot be read. Failures of individual schedules are not errors.
pub fn recalculate_future_assignments(
    persistence: &mut Persistence,
    recurring_event_id: RecurringEventId,
    today: Date,
    policy: FairnessPolicy,
) -> Result<RecalculateResponse, ApiError> {
    let event: RecurringEvent = require_event(persistence, recurring_event_id)?;

    let schedule_ids: Vec<ScheduleId> = persistence
        .list_schedule_dates_for_event(recurring_event_id)?
        .iter()
        .filter(|d| d.date >= today)
        .map(|d| d.schedule_id)
        .collect::<BTreeSet<ScheduleId>>()
        .into_iter()
        .collect();
    let mut schedules: Vec<Schedule> = persistence.list_schedules_by_ids(&schedule_ids)?;
    schedules.sort_by_key(|s| (s.year, s.month, s.schedule_id));
    let roster: Roster = load_roster(persistence, event.group_id)?;

    let mut response: RecalculateResponse = RecalculateResponse {
        recurring_event_id: recurring_event_id.value(),
        schedules_updated: 0,
        assignments_applied: 0,
        failures: Vec::new(),
        schedules: Vec::new(),
    };

    for schedule in &schedules {
        match recalculate_schedule(persistence, &event, today, schedule, &roster, policy) {
            Ok(Some(info)) => {
                response.schedules_updated += 1;
                response.assignments_applied += info.assignments_applied;
                response.schedules.push(info);
            }
            Ok(None) => {
                debug!(schedule_id = %schedule.schedule_id, "Nothing to recalculate");
            }
            Err(err) => {
                warn!(
                    schedule_id = %schedule.schedule_id,
                    %recurring_event_id,
                    error = %err,
                    "Recalculation failed for schedule"
                );
                response.failures.push(schedule.schedule_id.value());
            }
        }
    }

    info!(
        %recurring_event_id,
        %today,
        schedules_updated = response.schedules_updated,
        assignments_applied = response.assignments_applied,
        failures = response.failures.len(),
        "Recalculated future assignments"
    );

    Ok(response)
}

/// Counts the schedule dates referencing a recurring event, per schedule.
///
/// Nothing is written. The count informs the choice of delete policy.
///
/// # Errors
///
/// Returns an error if the event does not exist or a query fails.
pub fn affected_schedule_dates(
    persistence: &mut Persistence,
    recurring_event_id: RecurringEventId,
) -> Result<AffectedScheduleDatesResponse, ApiError> {
    require_event(persistence, recurring_event_id)?;

    let dates: Vec<ScheduleDate> = persistence.list_schedule_dates_for_event(recurring_event_id)?;
    let schedule_ids: Vec<ScheduleId> = dates
        .iter()
        .map(|d| d.schedule_id)
        .collect::<BTreeSet<ScheduleId>>()
        .into_iter()
        .collect();
    let schedules: Vec<Schedule> = persistence.list_schedules_by_ids(&schedule_ids)?;
    let report: ImpactReport = summarize_impact(recurring_event_id, &schedules, &dates)?;

    debug!(%recurring_event_id, count = report.count, "Computed impact");
    Ok(AffectedScheduleDatesResponse::from(&report))
}

/// Applies a recalculation to one schedule in one transaction.
///
/// Returns `None` when no date of the schedule is in scope.
fn recalculate_schedule(
    persistence: &mut Persistence,
    event: &RecurringEvent,
    today: Date,
    schedule: &Schedule,
    roster: &Roster,
    policy: FairnessPolicy,
) -> Result<Option<ScheduleRecalculationInfo>, ApiError> {
    let tally: FairnessTally = seed_tally(persistence, schedule, policy)?;

    persistence.with_schedule_transaction(schedule.schedule_id, |tx| -> Result<_, ApiError> {
        let dates: Vec<ScheduleDate> = tx.dates()?;
        let plan: ScheduleRecalculation = plan_recalculation(event, today, schedule, &dates)?;
        if plan.is_empty() {
            return Ok(None);
        }
        let existing: Vec<Assignment> = tx.assignments()?;

        let in_scope: Vec<ScheduleDateId> = plan.in_scope_ids().into_iter().collect();
        let retired: Vec<ScheduleDateId> =
            plan.retired.iter().map(|d| d.schedule_date_id).collect();
        tx.clear_assignments(&in_scope)?;
        tx.delete_dates(&retired)?;
        tx.refresh_snapshots(&plan.refreshed)?;
        let inserted: Vec<ScheduleDate> = tx.insert_dates(&plan.added)?;

        let outcome: BuildOutcome = plan.rebuild(roster, &inserted, &existing, tally)?;
        let applied: usize = tx.insert_assignments(&outcome.assignments)?;

        debug!(
            schedule_id = %schedule.schedule_id,
            refreshed = plan.refreshed.len(),
            retired = plan.retired.len(),
            added = inserted.len(),
            applied,
            "Applied schedule recalculation"
        );

        Ok(Some(ScheduleRecalculationInfo {
            schedule_id: schedule.schedule_id.value(),
            month: schedule.month,
            year: schedule.year,
            dates_refreshed: plan.refreshed.len(),
            dates_retired: plan.retired.len(),
            dates_added: inserted.len(),
            assignments_applied: applied,
            unfilled: outcome.unfilled.iter().map(UnfilledSlotInfo::from).collect(),
        }))
    })
}

/// Inserts the dates the group's active events produce for a schedule and
/// returns how many were created.
///
/// Taken dates are read inside the transaction.
fn materialize_into(persistence: &mut Persistence, schedule: &Schedule) -> Result<usize, ApiError> {
    let events: Vec<RecurringEvent> = persistence.list_recurring_events(schedule.group_id)?;
    let candidates: Vec<NewScheduleDate> = materialize_dates(schedule, &events, &[], None)?;
    if candidates.is_empty() {
        return Ok(0);
    }

    let inserted: Vec<ScheduleDate> =
        persistence.with_schedule_transaction(schedule.schedule_id, |tx| -> Result<_, ApiError> {
            let taken: BTreeSet<Date> = tx.dates()?.into_iter().map(|d| d.date).collect();
            let fresh: Vec<NewScheduleDate> = candidates
                .into_iter()
                .filter(|c| !taken.contains(&c.date))
                .collect();
            Ok(tx.insert_dates(&fresh)?)
        })?;
    Ok(inserted.len())
}

pub(crate) fn load_roster(persistence: &mut Persistence, group_id: GroupId) -> Result<Roster, ApiError> {
    let mut roster: Roster = Roster::new(group_id);
    roster.roles = persistence.list_roles(group_id)?;
    roster.members = persistence.list_members(group_id)?;
    roster.priorities = persistence.list_event_role_priorities(group_id)?;
    Ok(roster)
}

/// Seeds the fairness tally of a build of `schedule` according to `policy`.
fn seed_tally(
    persistence: &mut Persistence,
    schedule: &Schedule,
    policy: FairnessPolicy,
) -> Result<FairnessTally, ApiError> {
    if policy == FairnessPolicy::ResetPerMonth {
        return Ok(FairnessTally::new());
    }

    let prior: Vec<ScheduleId> = persistence
        .list_schedules(schedule.group_id)?
        .iter()
        .filter(|candidate| policy.seeds_from(schedule, candidate))
        .map(|candidate| candidate.schedule_id)
        .collect();
    let counts: Vec<_> = persistence.count_assignments_by_member(&prior)?;
    debug!(
        schedule_id = %schedule.schedule_id,
        seeded_from = prior.len(),
        members = counts.len(),
        "Seeded fairness tally"
    );
    Ok(FairnessTally::from_counts(counts))
}

pub(crate) fn require_group(persistence: &mut Persistence, group_id: GroupId) -> Result<(), ApiError> {
    if persistence.group_exists(group_id)? {
        Ok(())
    } else {
        Err(ApiError::not_found(
            "Group",
            format!("Group {group_id} does not exist"),
        ))
    }
}

pub(crate) fn require_schedule(
    persistence: &mut Persistence,
    schedule_id: ScheduleId,
) -> Result<Schedule, ApiError> {
    persistence.get_schedule(schedule_id)?.ok_or_else(|| {
        ApiError::not_found("Schedule", format!("Schedule {schedule_id} does not exist"))
    })
}

pub(crate) fn require_event(
    persistence: &mut Persistence,
    recurring_event_id: RecurringEventId,
) -> Result<RecurringEvent, ApiError> {
    persistence
        .get_recurring_event(recurring_event_id)?
        .ok_or_else(|| {
            ApiError::not_found(
                "Recurring event",
                format!("Recurring event {recurring_event_id} does not exist"),
            )
        })
}
