// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! The fairness counter threaded through a schedule build.
//!
//! A tally is an explicit value: the builder takes one and returns the
//! updated one, so builds of different schedules never share state and a
//! run is reproducible from a given snapshot of counts.

use rota_domain::{Assignment, MemberId, Schedule, ScheduleStatus};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// How the tally is seeded before a build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FairnessPolicy {
    /// Start from zero every month. Rotation is fair within the month only.
    #[default]
    ResetPerMonth,
    /// Start from each member's assignment count in the group's committed
    /// schedules before the target month.
    SeedFromCommitted {
        /// Only count the last `n` months; all earlier months when `None`.
        lookback_months: Option<u32>,
    },
}

impl FairnessPolicy {
    /// Returns whether assignments of `prior` seed a build of `target`.
    #[must_use]
    pub fn seeds_from(&self, target: &Schedule, prior: &Schedule) -> bool {
        let Self::SeedFromCommitted { lookback_months } = self else {
            return false;
        };
        if prior.group_id != target.group_id
            || prior.status != ScheduleStatus::Committed
            || prior.month_index() >= target.month_index()
        {
            return false;
        }
        lookback_months.is_none_or(|months| {
            target.month_index() - prior.month_index() <= i64::from(months)
        })
    }
}

/// Per-member count of assignments.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FairnessTally {
    counts: BTreeMap<MemberId, u32>,
}

impl FairnessTally {
    /// Creates an empty tally.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            counts: BTreeMap::new(),
        }
    }

    /// Creates a tally seeded with existing counts.
    #[must_use]
    pub fn from_counts<I>(counts: I) -> Self
    where
        I: IntoIterator<Item = (MemberId, u32)>,
    {
        let mut tally: Self = Self::new();
        for (member_id, count) in counts {
            let entry: &mut u32 = tally.counts.entry(member_id).or_insert(0);
            *entry = entry.saturating_add(count);
        }
        tally
    }

    /// Current count of a member (zero if never assigned).
    #[must_use]
    pub fn count(&self, member_id: MemberId) -> u32 {
        self.counts.get(&member_id).copied().unwrap_or(0)
    }

    /// Counts one more assignment for a member.
    pub fn record(&mut self, member_id: MemberId) {
        let entry: &mut u32 = self.counts.entry(member_id).or_insert(0);
        *entry = entry.saturating_add(1);
    }

    /// Counts every assignment in `assignments`.
    pub fn absorb<'a, I>(&mut self, assignments: I)
    where
        I: IntoIterator<Item = &'a Assignment>,
    {
        for assignment in assignments {
            self.record(assignment.member_id);
        }
    }

    /// All non-zero counts.
    #[must_use]
    pub const fn counts(&self) -> &BTreeMap<MemberId, u32> {
        &self.counts
    }

    /// Largest minus smallest count among `members`.
    #[must_use]
    pub fn spread<I>(&self, members: I) -> u32
    where
        I: IntoIterator<Item = MemberId>,
    {
        let counts: Vec<u32> = members.into_iter().map(|m| self.count(m)).collect();
        match (counts.iter().max(), counts.iter().min()) {
            (Some(max), Some(min)) => max - min,
            _ => 0,
        }
    }
}
