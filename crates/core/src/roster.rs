// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use rota_domain::{EventRolePriority, GroupId, Member, Role};

/// The staffing configuration of one group, as read at build time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Roster {
    /// The group this roster is scoped to.
    pub group_id: GroupId,
    /// All roles of the group.
    pub roles: Vec<Role>,
    /// All members of the group with their roles, availability and holidays.
    pub members: Vec<Member>,
    /// Per-event role priorities.
    pub priorities: Vec<EventRolePriority>,
}

impl Roster {
    /// Creates an empty roster for a group.
    #[must_use]
    pub const fn new(group_id: GroupId) -> Self {
        Self {
            group_id,
            roles: Vec::new(),
            members: Vec::new(),
            priorities: Vec::new(),
        }
    }
}
