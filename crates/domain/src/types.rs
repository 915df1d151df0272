// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::str::FromStr;
use time::macros::format_description;
use time::{Date, Time};

/// Declares a canonical numeric identifier assigned by the database.
macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Wraps a raw database identifier.
            #[must_use]
            pub const fn new(value: i64) -> Self {
                Self(value)
            }

            /// Returns the raw database identifier.
            #[must_use]
            pub const fn value(self) -> i64 {
                self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

entity_id!(
    /// Identifies a group (the tenant that owns events, roles and members).
    GroupId
);
entity_id!(
    /// Identifies a recurring weekly event.
    RecurringEventId
);
entity_id!(
    /// Identifies a role.
    RoleId
);
entity_id!(
    /// Identifies a set of mutually exclusive roles.
    ExclusiveGroupId
);
entity_id!(
    /// Identifies a member.
    MemberId
);
entity_id!(
    /// Identifies a monthly schedule.
    ScheduleId
);
entity_id!(
    /// Identifies a materialized schedule date.
    ScheduleDateId
);

/// Day of the week in canonical Monday-first order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Weekday {
    /// All weekdays in canonical order.
    pub const ALL: [Self; 7] = [
        Self::Monday,
        Self::Tuesday,
        Self::Wednesday,
        Self::Thursday,
        Self::Friday,
        Self::Saturday,
        Self::Sunday,
    ];

    /// Returns the 0-based canonical index (Monday = 0).
    #[must_use]
    pub const fn index(self) -> u8 {
        match self {
            Self::Monday => 0,
            Self::Tuesday => 1,
            Self::Wednesday => 2,
            Self::Thursday => 3,
            Self::Friday => 4,
            Self::Saturday => 5,
            Self::Sunday => 6,
        }
    }

    /// Looks up a weekday by its canonical index.
    ///
    /// # Errors
    ///
    /// Returns an error if the index is outside 0-6.
    pub fn from_index(index: i32) -> Result<Self, DomainError> {
        usize::try_from(index)
            .ok()
            .and_then(|i| Self::ALL.get(i).copied())
            .ok_or(DomainError::InvalidWeekdayIndex(index))
    }

    /// Returns the English name of this weekday.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Monday => "Monday",
            Self::Tuesday => "Tuesday",
            Self::Wednesday => "Wednesday",
            Self::Thursday => "Thursday",
            Self::Friday => "Friday",
            Self::Saturday => "Saturday",
            Self::Sunday => "Sunday",
        }
    }

    /// Returns the weekday a calendar date falls on.
    ///
    /// `time::Date` is a proleptic Gregorian date with no offset attached,
    /// so the result never depends on the host locale or timezone.
    #[must_use]
    pub fn of(date: Date) -> Self {
        Self::from(date.weekday())
    }
}

impl From<time::Weekday> for Weekday {
    fn from(weekday: time::Weekday) -> Self {
        match weekday {
            time::Weekday::Monday => Self::Monday,
            time::Weekday::Tuesday => Self::Tuesday,
            time::Weekday::Wednesday => Self::Wednesday,
            time::Weekday::Thursday => Self::Thursday,
            time::Weekday::Friday => Self::Friday,
            time::Weekday::Saturday => Self::Saturday,
            time::Weekday::Sunday => Self::Sunday,
        }
    }
}

impl FromStr for Weekday {
    type Err = DomainError;

    /// Parses full English names or three-letter abbreviations, ignoring case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|day| {
                let name: String = day.as_str().to_ascii_lowercase();
                normalized == name || (normalized.len() == 3 && name.starts_with(&normalized))
            })
            .ok_or_else(|| DomainError::InvalidWeekday(s.to_string()))
    }
}

impl std::fmt::Display for Weekday {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Parses an `HH:MM` time of day.
///
/// # Errors
///
/// Returns an error if the string is not a valid 24-hour `HH:MM` time.
pub fn parse_time_of_day(value: &str) -> Result<Time, DomainError> {
    Time::parse(value, format_description!("[hour]:[minute]")).map_err(|e| {
        DomainError::TimeParseError {
            time_string: value.to_string(),
            error: e.to_string(),
        }
    })
}

/// Formats a time of day as `HH:MM`.
#[must_use]
pub fn format_time_of_day(time: Time) -> String {
    format!("{:02}:{:02}", time.hour(), time.minute())
}

/// Parses an ISO `YYYY-MM-DD` calendar date.
///
/// # Errors
///
/// Returns an error if the string is not a valid ISO date.
pub fn parse_iso_date(value: &str) -> Result<Date, DomainError> {
    Date::parse(value, format_description!("[year]-[month]-[day]")).map_err(|e| {
        DomainError::DateParseError {
            date_string: value.to_string(),
            error: e.to_string(),
        }
    })
}

/// Formats a calendar date as ISO `YYYY-MM-DD`.
#[must_use]
pub fn format_iso_date(date: Date) -> String {
    format!(
        "{:04}-{:02}-{:02}",
        date.year(),
        u8::from(date.month()),
        date.day()
    )
}

/// A UTC time-of-day window, `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimeWindow {
    start: Time,
    end: Time,
}

impl TimeWindow {
    /// Creates a window, requiring `start < end`.
    ///
    /// # Errors
    ///
    /// Returns an error if the window does not end after it starts.
    pub fn new(start: Time, end: Time) -> Result<Self, DomainError> {
        if start >= end {
            return Err(DomainError::InvalidTimeWindow {
                start: format_time_of_day(start),
                end: format_time_of_day(end),
            });
        }
        Ok(Self { start, end })
    }

    /// Parses a window from two `HH:MM` strings.
    ///
    /// # Errors
    ///
    /// Returns an error if either bound fails to parse or the window is empty.
    pub fn parse(start: &str, end: &str) -> Result<Self, DomainError> {
        Self::new(parse_time_of_day(start)?, parse_time_of_day(end)?)
    }

    /// The default full-day window, `00:00`-`23:59`.
    #[must_use]
    pub const fn full_day() -> Self {
        Self {
            start: Time::MIDNIGHT,
            end: time::macros::time!(23:59),
        }
    }

    /// Window start.
    #[must_use]
    pub const fn start(&self) -> Time {
        self.start
    }

    /// Window end.
    #[must_use]
    pub const fn end(&self) -> Time {
        self.end
    }

    /// Returns whether `other` lies entirely inside this window.
    ///
    /// This is containment, not overlap.
    #[must_use]
    pub fn covers(&self, other: &Self) -> bool {
        self.start <= other.start && other.end <= self.end
    }
}

impl Default for TimeWindow {
    fn default() -> Self {
        Self::full_day()
    }
}

impl std::fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}-{}",
            format_time_of_day(self.start),
            format_time_of_day(self.end)
        )
    }
}

/// Whether a schedule date needs per-role staffing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// Roles must be staffed.
    #[default]
    Assignable,
    /// Everyone attends; no per-role assignment.
    ForEveryone,
}

impl EventKind {
    /// Converts this kind to its storage representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Assignable => "assignable",
            Self::ForEveryone => "for_everyone",
        }
    }
}

impl FromStr for EventKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "assignable" => Ok(Self::Assignable),
            "for_everyone" => Ok(Self::ForEveryone),
            _ => Err(DomainError::InvalidEventKind(s.to_string())),
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A weekly-repeating event template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecurringEvent {
    /// The canonical identifier.
    pub recurring_event_id: RecurringEventId,
    /// The owning group.
    pub group_id: GroupId,
    /// The weekday the event repeats on.
    pub weekday: Weekday,
    /// Inactive events are never materialized.
    pub active: bool,
    /// The type copied onto materialized dates.
    pub kind: EventKind,
    /// Optional label copied onto materialized dates.
    pub label: Option<String>,
    /// The UTC time window copied onto materialized dates.
    pub window: TimeWindow,
}

impl RecurringEvent {
    /// Captures the values a materialized date copies from this event.
    #[must_use]
    pub fn snapshot(&self) -> EventSnapshot {
        EventSnapshot::new(self.kind, self.label.clone(), self.window)
    }
}

/// The event values frozen into a schedule date when it is materialized.
///
/// Editing the recurring event never changes an existing snapshot; only a
/// recalculation replaces it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventSnapshot {
    kind: EventKind,
    label: Option<String>,
    window: TimeWindow,
}

impl EventSnapshot {
    /// Creates a snapshot.
    #[must_use]
    pub const fn new(kind: EventKind, label: Option<String>, window: TimeWindow) -> Self {
        Self {
            kind,
            label,
            window,
        }
    }

    /// The schedule-date type.
    #[must_use]
    pub const fn kind(&self) -> EventKind {
        self.kind
    }

    /// The label, if any.
    #[must_use]
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// The UTC time window.
    #[must_use]
    pub const fn window(&self) -> TimeWindow {
        self.window
    }

    /// The window eligibility is checked against.
    ///
    /// For-everyone dates use the full-day window, so only the
    /// availability weekday matters for them.
    #[must_use]
    pub fn effective_window(&self) -> TimeWindow {
        match self.kind {
            EventKind::Assignable => self.window,
            EventKind::ForEveryone => TimeWindow::full_day(),
        }
    }
}

/// A staffing role within a group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Role {
    /// The canonical identifier.
    pub role_id: RoleId,
    /// The owning group.
    pub group_id: GroupId,
    /// Display name.
    pub name: String,
    /// Members needed per assignable date (at least 1).
    pub required_count: u32,
    /// Position in listings; the default fill priority.
    pub display_order: i32,
    /// The anchor role this role should share a member with.
    pub depends_on: Option<RoleId>,
    /// Roles sharing this id may be held by a member at most once per date.
    pub exclusive_group: Option<ExclusiveGroupId>,
    /// Cosmetic flag; has no scheduling effect.
    pub is_relevant: bool,
}

/// Fill priority of a role for one recurring event. Lower fills first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRolePriority {
    /// The recurring event.
    pub recurring_event_id: RecurringEventId,
    /// The role.
    pub role_id: RoleId,
    /// The priority value.
    pub priority: i32,
}

/// A weekly availability window of a member.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Availability {
    /// The weekday.
    pub weekday: Weekday,
    /// The UTC window the member is available in.
    pub window: TimeWindow,
}

/// A holiday during which a member cannot be assigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Holiday {
    start: Date,
    end: Date,
}

impl Holiday {
    /// Creates a holiday spanning `start..=end`.
    ///
    /// # Errors
    ///
    /// Returns an error if `end` is before `start`.
    pub fn new(start: Date, end: Date) -> Result<Self, DomainError> {
        if end < start {
            return Err(DomainError::InvalidHolidayRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// First day of the holiday.
    #[must_use]
    pub const fn start(&self) -> Date {
        self.start
    }

    /// Last day of the holiday (inclusive).
    #[must_use]
    pub const fn end(&self) -> Date {
        self.end
    }

    /// Returns whether `date` falls within the holiday, bounds included.
    #[must_use]
    pub fn covers(&self, date: Date) -> bool {
        self.start <= date && date <= self.end
    }
}

/// A group member who can be assigned to roles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    /// The canonical identifier.
    pub member_id: MemberId,
    /// The owning group.
    pub group_id: GroupId,
    /// Display name.
    pub name: String,
    /// Roles this member holds.
    pub roles: BTreeSet<RoleId>,
    /// Weekly availability. No entry for a weekday means unavailable.
    pub availability: Vec<Availability>,
    /// Holidays.
    pub holidays: Vec<Holiday>,
}

impl Member {
    /// Creates a member with no roles, availability or holidays.
    #[must_use]
    pub fn new(member_id: MemberId, group_id: GroupId, name: &str) -> Self {
        Self {
            member_id,
            group_id,
            name: name.to_string(),
            roles: BTreeSet::new(),
            availability: Vec::new(),
            holidays: Vec::new(),
        }
    }

    /// Returns whether the member holds `role_id`.
    #[must_use]
    pub fn holds_role(&self, role_id: RoleId) -> bool {
        self.roles.contains(&role_id)
    }

    /// Returns whether any availability entry on `weekday` contains `window`.
    #[must_use]
    pub fn is_available(&self, weekday: Weekday, window: &TimeWindow) -> bool {
        self.availability
            .iter()
            .any(|a| a.weekday == weekday && a.window.covers(window))
    }

    /// Returns whether any holiday covers `date`.
    #[must_use]
    pub fn is_on_holiday(&self, date: Date) -> bool {
        self.holidays.iter().any(|h| h.covers(date))
    }
}

/// Publication state of a schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ScheduleStatus {
    /// Being prepared.
    #[default]
    Draft,
    /// Published.
    Committed,
}

impl ScheduleStatus {
    /// Converts this status to its storage representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Committed => "committed",
        }
    }
}

impl FromStr for ScheduleStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(Self::Draft),
            "committed" => Ok(Self::Committed),
            _ => Err(DomainError::InvalidScheduleStatus(s.to_string())),
        }
    }
}

impl std::fmt::Display for ScheduleStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A monthly schedule of one group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schedule {
    /// The canonical identifier.
    pub schedule_id: ScheduleId,
    /// The owning group.
    pub group_id: GroupId,
    /// Month (1-12).
    pub month: u8,
    /// Calendar year.
    pub year: i32,
    /// Publication state.
    pub status: ScheduleStatus,
}

impl Schedule {
    /// Months since year 0, for ordering and lookback arithmetic.
    #[must_use]
    pub fn month_index(&self) -> i64 {
        i64::from(self.year) * 12 + i64::from(self.month) - 1
    }
}

/// A concrete dated occurrence within a schedule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleDate {
    /// The canonical identifier.
    pub schedule_date_id: ScheduleDateId,
    /// The owning schedule.
    pub schedule_id: ScheduleId,
    /// The calendar date.
    pub date: Date,
    /// The recurring event this date was materialized from, if any.
    pub recurring_event_id: Option<RecurringEventId>,
    snapshot: EventSnapshot,
}

impl ScheduleDate {
    /// Creates a persisted schedule date.
    #[must_use]
    pub const fn new(
        schedule_date_id: ScheduleDateId,
        schedule_id: ScheduleId,
        date: Date,
        recurring_event_id: Option<RecurringEventId>,
        snapshot: EventSnapshot,
    ) -> Self {
        Self {
            schedule_date_id,
            schedule_id,
            date,
            recurring_event_id,
            snapshot,
        }
    }

    /// The frozen event values.
    #[must_use]
    pub const fn snapshot(&self) -> &EventSnapshot {
        &self.snapshot
    }

    /// The weekday the date falls on.
    #[must_use]
    pub fn weekday(&self) -> Weekday {
        Weekday::of(self.date)
    }

    /// Returns whether the date needs per-role staffing.
    #[must_use]
    pub fn is_assignable(&self) -> bool {
        self.snapshot.kind() == EventKind::Assignable
    }

    /// Replaces the snapshot with the event's current values.
    ///
    /// Only the recalculation path calls this.
    #[must_use]
    pub fn with_refreshed_snapshot(mut self, event: &RecurringEvent) -> Self {
        self.snapshot = event.snapshot();
        self
    }
}

/// A schedule date that has not been persisted yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewScheduleDate {
    /// The owning schedule.
    pub schedule_id: ScheduleId,
    /// The calendar date.
    pub date: Date,
    /// The recurring event it was materialized from.
    pub recurring_event_id: Option<RecurringEventId>,
    /// The frozen event values.
    pub snapshot: EventSnapshot,
}

/// One member filling one role on one schedule date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Assignment {
    /// The schedule date.
    pub schedule_date_id: ScheduleDateId,
    /// The role filled.
    pub role_id: RoleId,
    /// The member assigned.
    pub member_id: MemberId,
}
