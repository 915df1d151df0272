// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Hard constraints applied while assigning a schedule date.
//!
//! While a date is being assigned the rules are evaluated in a fixed order:
//!
//! 1. Required count: a role stops taking members once `required_count`
//!    distinct members are assigned.
//! 2. Exclusive group: a member already holding another role of the same
//!    exclusive group on the date is removed from the pool.
//! 3. Dependency propagation: a dependent role prefers the anchor role's
//!    member when that member is still eligible and not excluded.
//! 4. Priority ordering: roles are processed by ascending event priority,
//!    then display order, then id.
//!
//! Role dependencies must be acyclic. That is enforced when a dependency is
//! written, with `validate_role_dependencies`.

use crate::error::DomainError;
use crate::types::{
    EventRolePriority, ExclusiveGroupId, MemberId, RecurringEventId, Role, RoleId,
};
use std::collections::{BTreeMap, BTreeSet};

/// Walks the dependency chain starting at `start`.
///
/// Returns the roles visited up to and including the first repeat when the
/// chain loops back on itself, or `None` if the chain terminates.
#[must_use]
pub fn find_dependency_cycle(roles: &[Role], start: RoleId) -> Option<Vec<RoleId>> {
    let anchors: BTreeMap<RoleId, Option<RoleId>> =
        roles.iter().map(|r| (r.role_id, r.depends_on)).collect();

    let mut visited: BTreeSet<RoleId> = BTreeSet::new();
    let mut path: Vec<RoleId> = Vec::new();
    let mut current: Option<RoleId> = Some(start);

    while let Some(role_id) = current {
        path.push(role_id);
        if !visited.insert(role_id) {
            return Some(path);
        }
        current = anchors.get(&role_id).copied().flatten();
    }

    None
}

/// Returns the roles that lie on a dependency cycle.
///
/// Used at assignment time as a last line of defense; such roles are
/// skipped and reported as consistency violations.
#[must_use]
pub fn roles_on_cycles(roles: &[Role]) -> BTreeSet<RoleId> {
    roles
        .iter()
        .filter(|role| {
            find_dependency_cycle(roles, role.role_id)
                .is_some_and(|path| path.last() == Some(&role.role_id))
        })
        .map(|role| role.role_id)
        .collect()
}

/// Validates every dependency among a group's roles.
///
/// # Errors
///
/// Returns an error if:
/// - A role depends on a role that does not exist
/// - A role depends on a role of another group
/// - The dependencies form a cycle
pub fn validate_role_dependencies(roles: &[Role]) -> Result<(), DomainError> {
    let by_id: BTreeMap<RoleId, &Role> = roles.iter().map(|r| (r.role_id, r)).collect();

    for role in roles {
        let Some(anchor_id) = role.depends_on else {
            continue;
        };
        let anchor: &Role = by_id
            .get(&anchor_id)
            .ok_or(DomainError::UnknownAnchorRole {
                role_id: role.role_id,
                anchor_id,
            })?;
        if anchor.group_id != role.group_id {
            return Err(DomainError::CrossGroupDependency {
                role_id: role.role_id,
                anchor_id,
            });
        }
        if let Some(cycle) = find_dependency_cycle(roles, role.role_id) {
            return Err(DomainError::DependencyCycle { cycle });
        }
    }

    Ok(())
}

/// Validates a proposed change of one role's anchor against the group.
///
/// # Errors
///
/// Returns an error if the changed dependency graph would be invalid.
pub fn validate_dependency_change(
    roles: &[Role],
    role_id: RoleId,
    depends_on: Option<RoleId>,
) -> Result<(), DomainError> {
    let proposed: Vec<Role> = roles
        .iter()
        .cloned()
        .map(|mut role| {
            if role.role_id == role_id {
                role.depends_on = depends_on;
            }
            role
        })
        .collect();
    validate_role_dependencies(&proposed)
}

/// Returns the fill priority of `role` for an event.
///
/// Unset pairs, and dates with no recurring event, fall back to the role's
/// display order.
#[must_use]
pub fn effective_priority(
    role: &Role,
    priorities: &[EventRolePriority],
    event: Option<RecurringEventId>,
) -> i32 {
    event
        .and_then(|event_id| {
            priorities
                .iter()
                .find(|p| p.recurring_event_id == event_id && p.role_id == role.role_id)
        })
        .map_or(role.display_order, |p| p.priority)
}

/// Orders roles for filling on a date of `event`.
///
/// Sorted by ascending priority, ties broken by display order then id.
#[must_use]
pub fn order_roles<'a>(
    roles: &'a [Role],
    priorities: &[EventRolePriority],
    event: Option<RecurringEventId>,
) -> Vec<&'a Role> {
    let mut ordered: Vec<&Role> = roles.iter().collect();
    ordered.sort_by_key(|role| {
        (
            effective_priority(role, priorities, event),
            role.display_order,
            role.role_id,
        )
    });
    ordered
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct DateEntry {
    role_id: RoleId,
    exclusive_group: Option<ExclusiveGroupId>,
    member_id: MemberId,
}

/// The assignments made so far on a single schedule date.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DateAssignments {
    entries: Vec<DateEntry>,
}

impl DateAssignments {
    /// Creates an empty set.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Records `member_id` as filling `role`.
    pub fn record(&mut self, role: &Role, member_id: MemberId) {
        self.entries.push(DateEntry {
            role_id: role.role_id,
            exclusive_group: role.exclusive_group,
            member_id,
        });
    }

    /// Members assigned to `role_id`, in assignment order.
    #[must_use]
    pub fn members_of(&self, role_id: RoleId) -> Vec<MemberId> {
        self.entries
            .iter()
            .filter(|e| e.role_id == role_id)
            .map(|e| e.member_id)
            .collect()
    }

    /// Number of members assigned to `role_id`.
    #[must_use]
    pub fn count_for(&self, role_id: RoleId) -> usize {
        self.entries.iter().filter(|e| e.role_id == role_id).count()
    }

    /// Returns whether `member_id` already fills `role_id`.
    #[must_use]
    pub fn holds(&self, role_id: RoleId, member_id: MemberId) -> bool {
        self.entries
            .iter()
            .any(|e| e.role_id == role_id && e.member_id == member_id)
    }

    /// Returns whether the exclusive-group rule bars `member_id` from `role`.
    #[must_use]
    pub fn is_excluded(&self, role: &Role, member_id: MemberId) -> bool {
        let Some(group) = role.exclusive_group else {
            return false;
        };
        self.entries.iter().any(|e| {
            e.member_id == member_id && e.role_id != role.role_id && e.exclusive_group == Some(group)
        })
    }

    /// Members the dependency rule proposes for `role`: the anchor's members.
    ///
    /// Empty when the role has no anchor or the anchor is not filled yet.
    #[must_use]
    pub fn anchor_members(&self, role: &Role) -> Vec<MemberId> {
        role.depends_on
            .map(|anchor_id| self.members_of(anchor_id))
            .unwrap_or_default()
    }
}
