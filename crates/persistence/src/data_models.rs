// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use rota_domain::{EventKind, ExclusiveGroupId, GroupId, RoleId, TimeWindow, Weekday};

/// A recurring event that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRecurringEvent {
    pub group_id: GroupId,
    pub weekday: Weekday,
    pub active: bool,
    pub kind: EventKind,
    pub label: Option<String>,
    pub window: TimeWindow,
}

/// A role that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRole {
    pub group_id: GroupId,
    pub name: String,
    pub required_count: u32,
    pub display_order: i32,
    pub depends_on: Option<RoleId>,
    pub exclusive_group: Option<ExclusiveGroupId>,
    pub is_relevant: bool,
}

/// What happens to schedule dates when their recurring event is deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeletePolicy {
    /// Keep the dates and their snapshot; clear the back-reference.
    #[default]
    Nullify,
    /// Delete the dates and, through the foreign key, their assignments.
    Cascade,
}
