// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::assign::{DateOutcome, UnfilledSlot, assign_date};
use crate::error::CoreError;
use crate::fairness::FairnessTally;
use crate::roster::Roster;
use rota_domain::{Assignment, RoleId, Schedule, ScheduleDate, roles_on_cycles};
use std::collections::BTreeSet;
use tracing::{debug, info};

/// The result of building a schedule's assignments.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildOutcome {
    /// Every assignment produced, in chronological date order.
    pub assignments: Vec<Assignment>,
    /// Every role slot left short.
    pub unfilled: Vec<UnfilledSlot>,
    /// The tally after the build.
    pub tally: FairnessTally,
}

/// Builds assignments for the assignable `dates` of `schedule`.
///
/// Dates are processed in ascending date order (then id), so the tally
/// evolves chronologically. Dates that need no per-role staffing are
/// skipped. The starting tally is consumed and the updated one returned in
/// the outcome.
///
/// # Arguments
///
/// * `roster` - The group's roles, members and priorities
/// * `schedule` - The schedule being built
/// * `dates` - The schedule dates to staff; every one must belong to `schedule`
/// * `tally` - The starting fairness counter
///
/// # Errors
///
/// Returns an error if the roster belongs to another group, or a date
/// belongs to another schedule. Nothing is assigned in that case.
pub fn build_schedule(
    roster: &Roster,
    schedule: &Schedule,
    dates: &[ScheduleDate],
    tally: FairnessTally,
) -> Result<BuildOutcome, CoreError> {
    if roster.group_id != schedule.group_id {
        return Err(CoreError::GroupMismatch {
            schedule_group: schedule.group_id,
            roster_group: roster.group_id,
        });
    }
    if let Some(stray) = dates
        .iter()
        .find(|d| d.schedule_id != schedule.schedule_id)
    {
        return Err(CoreError::ScheduleMismatch {
            expected: schedule.schedule_id,
            found: stray.schedule_id,
            schedule_date_id: stray.schedule_date_id,
        });
    }

    let mut ordered: Vec<&ScheduleDate> = dates.iter().filter(|d| d.is_assignable()).collect();
    ordered.sort_by_key(|d| (d.date, d.schedule_date_id));

    let cyclic: BTreeSet<RoleId> = roles_on_cycles(&roster.roles);
    let mut outcome: BuildOutcome = BuildOutcome {
        tally,
        ..BuildOutcome::default()
    };

    for date in ordered {
        let DateOutcome {
            assignments,
            unfilled,
        } = assign_date(roster, date, &cyclic, &mut outcome.tally);
        debug!(
            schedule_date_id = %date.schedule_date_id,
            assigned = assignments.len(),
            unfilled = unfilled.len(),
            "Staffed schedule date"
        );
        outcome.assignments.extend(assignments);
        outcome.unfilled.extend(unfilled);
    }

    info!(
        schedule_id = %schedule.schedule_id,
        assignments = outcome.assignments.len(),
        unfilled = outcome.unfilled.len(),
        "Built schedule assignments"
    );

    Ok(outcome)
}
