// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! The rotation assigner: staffs the roles of one schedule date.
//!
//! Roles are visited in priority order. For each role the eligible pool is
//! computed, members barred by an exclusive group are removed, anchor
//! members of a dependent role are placed first, and the remaining slots go
//! to the candidates with the lowest tally, ties broken by ascending member
//! id. The result is greedy, not a globally optimal matching.

use crate::fairness::FairnessTally;
use crate::roster::Roster;
use rota_domain::{
    Assignment, DateAssignments, MemberId, Role, RoleId, ScheduleDate, ScheduleDateId,
    eligible_members, order_roles,
};
use serde::Serialize;
use std::collections::BTreeSet;
use time::Date;
use tracing::debug;

/// A rule conflict that made a slot impossible to fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsistencyViolation {
    /// The role lies on a dependency cycle and was skipped.
    DependencyCycle,
    /// Eligible members were barred because they already serve another
    /// role of the same exclusive group on the date.
    ExclusiveGroupConflict,
}

/// Why a role slot was left unfilled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "violation")]
pub enum UnfilledReason {
    /// Not enough eligible candidates.
    UnderStaffed,
    /// A constraint conflict blocked the slot.
    ConsistencyViolation(ConsistencyViolation),
}

impl std::fmt::Display for UnfilledReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnderStaffed => write!(f, "not enough eligible members"),
            Self::ConsistencyViolation(ConsistencyViolation::DependencyCycle) => {
                write!(f, "role dependency cycle")
            }
            Self::ConsistencyViolation(ConsistencyViolation::ExclusiveGroupConflict) => {
                write!(f, "exclusive group conflict")
            }
        }
    }
}

/// A role on a date that could not be fully staffed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnfilledSlot {
    /// The schedule date.
    pub schedule_date_id: ScheduleDateId,
    /// The calendar date.
    pub date: Date,
    /// The role.
    pub role_id: RoleId,
    /// How many members are still missing.
    pub missing: u32,
    /// Why.
    pub reason: UnfilledReason,
}

/// The result of staffing one date.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DateOutcome {
    /// Assignments made on the date.
    pub assignments: Vec<Assignment>,
    /// Roles left short.
    pub unfilled: Vec<UnfilledSlot>,
}

/// Staffs every role of `roster` on `date`.
///
/// `cyclic` names roles on a dependency cycle; they are never filled. The
/// tally is updated for every member assigned.
#[must_use]
pub fn assign_date(
    roster: &Roster,
    date: &ScheduleDate,
    cyclic: &BTreeSet<RoleId>,
    tally: &mut FairnessTally,
) -> DateOutcome {
    let mut outcome: DateOutcome = DateOutcome::default();
    let mut on_date: DateAssignments = DateAssignments::new();

    for role in order_roles(&roster.roles, &roster.priorities, date.recurring_event_id) {
        if role.group_id != roster.group_id {
            continue;
        }

        if cyclic.contains(&role.role_id) {
            outcome.unfilled.push(unfilled(
                date,
                role,
                role.required_count,
                UnfilledReason::ConsistencyViolation(ConsistencyViolation::DependencyCycle),
            ));
            continue;
        }

        let eligible: BTreeSet<MemberId> = eligible_members(date, role, &roster.members);
        let pool: BTreeSet<MemberId> = eligible
            .iter()
            .copied()
            .filter(|member_id| !on_date.is_excluded(role, *member_id))
            .collect();

        let picked: Vec<MemberId> = pick_members(role, &pool, &on_date, tally);
        for member_id in &picked {
            on_date.record(role, *member_id);
            tally.record(*member_id);
            outcome.assignments.push(Assignment {
                schedule_date_id: date.schedule_date_id,
                role_id: role.role_id,
                member_id: *member_id,
            });
        }

        let filled: u32 = u32::try_from(picked.len()).unwrap_or(u32::MAX);
        let missing: u32 = role.required_count.saturating_sub(filled);
        let (understaffed, conflicted): (u32, u32) = split_shortfall(
            role.required_count,
            missing,
            eligible.len(),
            pool.len() < eligible.len(),
        );
        if understaffed > 0 {
            outcome.unfilled.push(unfilled(
                date,
                role,
                understaffed,
                UnfilledReason::UnderStaffed,
            ));
        }
        if conflicted > 0 {
            outcome.unfilled.push(unfilled(
                date,
                role,
                conflicted,
                UnfilledReason::ConsistencyViolation(ConsistencyViolation::ExclusiveGroupConflict),
            ));
        }
    }

    outcome
}

/// Splits a role's shortfall into the slots that no exclusion could have
/// filled and the slots lost to the exclusive-group filter.
///
/// Returns `(understaffed, conflicted)`, summing to `missing`.
fn split_shortfall(required: u32, missing: u32, eligible: usize, excluded_any: bool) -> (u32, u32) {
    if !excluded_any {
        return (missing, 0);
    }
    let eligible: u32 = u32::try_from(eligible).unwrap_or(u32::MAX);
    let understaffed: u32 = required.saturating_sub(eligible).min(missing);
    (understaffed, missing - understaffed)
}

/// Chooses up to `required_count` distinct members for `role` from `pool`.
fn pick_members(
    role: &Role,
    pool: &BTreeSet<MemberId>,
    on_date: &DateAssignments,
    tally: &FairnessTally,
) -> Vec<MemberId> {
    let required: usize = usize::try_from(role.required_count).unwrap_or(usize::MAX);
    let mut picked: Vec<MemberId> = Vec::new();

    for anchor_member in on_date.anchor_members(role) {
        if picked.len() >= required {
            break;
        }
        if pool.contains(&anchor_member) && !picked.contains(&anchor_member) {
            picked.push(anchor_member);
        }
    }

    let mut rest: Vec<MemberId> = pool
        .iter()
        .copied()
        .filter(|member_id| !picked.contains(member_id) && !on_date.holds(role.role_id, *member_id))
        .collect();
    rest.sort_by_key(|member_id| (tally.count(*member_id), *member_id));

    let remaining: usize = required.saturating_sub(picked.len());
    picked.extend(rest.into_iter().take(remaining));
    picked
}

fn unfilled(date: &ScheduleDate, role: &Role, missing: u32, reason: UnfilledReason) -> UnfilledSlot {
    debug!(
        schedule_date_id = %date.schedule_date_id,
        date = %date.date,
        role_id = %role.role_id,
        missing,
        %reason,
        "Role slot left unfilled"
    );
    UnfilledSlot {
        schedule_date_id: date.schedule_date_id,
        date: date.date,
        role_id: role.role_id,
        missing,
        reason,
    }
}
