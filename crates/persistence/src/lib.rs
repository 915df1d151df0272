// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Persistence layer for the rota engine.
//!
//! Configuration, schedules, schedule dates and assignments are stored in
//! `SQLite` through Diesel, with the schema applied from embedded
//! migrations when a connection opens. Foreign keys are enforced and
//! verified at startup.
//!
//! ## Transactional units
//!
//! Materialization, assignment builds and recalculations write through a
//! [`ScheduleTransaction`], opened with
//! [`Persistence::with_schedule_transaction`]. The unit runs inside an
//! IMMEDIATE transaction, so all writes for one schedule apply together or
//! not at all and concurrent writers serialize on the database lock.
//!
//! ## Testing
//!
//! `Persistence::new_in_memory()` gives every caller its own shared-cache
//! in-memory database, so tests never see each other's rows.

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

use diesel::SqliteConnection;
use rota_domain::{
    Assignment, Availability, EventRolePriority, ExclusiveGroupId, GroupId, Holiday, Member,
    MemberId, RecurringEvent, RecurringEventId, Role, RoleId, Schedule, ScheduleDate, ScheduleId,
    ScheduleStatus,
};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

mod backend;
mod data_models;
mod diesel_schema;
mod error;
mod mutations;
mod queries;

#[cfg(test)]
mod tests;

pub use data_models::{DeletePolicy, NewRecurringEvent, NewRole};
pub use error::PersistenceError;
pub use mutations::ScheduleTransaction;

/// Atomic counter for generating unique in-memory database names.
static DB_COUNTER: AtomicU64 = AtomicU64::new(0);

/// How long a file-database writer waits for the write lock.
const BUSY_TIMEOUT_MS: u32 = 5_000;

/// Persistence adapter over a single `SQLite` connection.
///
/// Every method takes `&mut self`; callers sharing one adapter across tasks
/// wrap it in a mutex.
pub struct Persistence {
    conn: SqliteConnection,
}

impl Persistence {
    /// Creates a new persistence adapter with an in-memory `SQLite` database.
    ///
    /// Each call receives a unique database instance via atomic counter.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be initialized.
    pub fn new_in_memory() -> Result<Self, PersistenceError> {
        let db_id: u64 = DB_COUNTER.fetch_add(1, Ordering::SeqCst);
        let shared_memory_url: String = format!("file:memdb_rota_{db_id}?mode=memory&cache=shared");

        let mut conn: SqliteConnection = backend::sqlite::initialize_database(&shared_memory_url)?;
        backend::sqlite::verify_foreign_key_enforcement(&mut conn)?;

        Ok(Self { conn })
    }

    /// Creates a new persistence adapter with a file-based `SQLite` database.
    ///
    /// # Arguments
    ///
    /// * `path` - The path to the `SQLite` database file
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or initialized.
    pub fn new_with_file<P: AsRef<Path>>(path: P) -> Result<Self, PersistenceError> {
        let path_str: &str = path.as_ref().to_str().ok_or_else(|| {
            PersistenceError::InitializationError("Invalid database path".to_string())
        })?;

        let mut conn: SqliteConnection = backend::sqlite::initialize_database(path_str)?;
        backend::sqlite::enable_wal_mode(&mut conn)?;
        backend::sqlite::set_busy_timeout(&mut conn, BUSY_TIMEOUT_MS)?;
        backend::sqlite::verify_foreign_key_enforcement(&mut conn)?;

        Ok(Self { conn })
    }

    /// Verifies that foreign key enforcement is enabled.
    ///
    /// # Errors
    ///
    /// Returns an error if foreign key enforcement is not enabled.
    pub fn verify_foreign_key_enforcement(&mut self) -> Result<(), PersistenceError> {
        backend::sqlite::verify_foreign_key_enforcement(&mut self.conn)
    }

    // ========================================================================
    // Configuration
    // ========================================================================

    /// Creates a group.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub fn create_group(&mut self, name: &str) -> Result<GroupId, PersistenceError> {
        mutations::config::create_group(&mut self.conn, name)
    }

    /// Returns whether a group exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn group_exists(&mut self, group_id: GroupId) -> Result<bool, PersistenceError> {
        queries::config::group_exists(&mut self.conn, group_id)
    }

    /// Creates a recurring event.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub fn create_recurring_event(
        &mut self,
        event: &NewRecurringEvent,
    ) -> Result<RecurringEventId, PersistenceError> {
        mutations::config::create_recurring_event(&mut self.conn, event)
    }

    /// Overwrites a recurring event's configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails or the event does not exist.
    pub fn update_recurring_event(&mut self, event: &RecurringEvent) -> Result<(), PersistenceError> {
        mutations::config::update_recurring_event(&mut self.conn, event)
    }

    /// Deletes a recurring event, applying `policy` to its schedule dates.
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails or the event does not exist.
    pub fn delete_recurring_event(
        &mut self,
        recurring_event_id: RecurringEventId,
        policy: DeletePolicy,
    ) -> Result<usize, PersistenceError> {
        mutations::schedules::delete_recurring_event(&mut self.conn, recurring_event_id, policy)
    }

    /// Retrieves a recurring event.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_recurring_event(
        &mut self,
        recurring_event_id: RecurringEventId,
    ) -> Result<Option<RecurringEvent>, PersistenceError> {
        queries::config::get_recurring_event(&mut self.conn, recurring_event_id)
    }

    /// Lists the recurring events of a group.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_recurring_events(
        &mut self,
        group_id: GroupId,
    ) -> Result<Vec<RecurringEvent>, PersistenceError> {
        queries::config::list_recurring_events(&mut self.conn, group_id)
    }

    /// Creates a role.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub fn create_role(&mut self, role: &NewRole) -> Result<RoleId, PersistenceError> {
        mutations::config::create_role(&mut self.conn, role)
    }

    /// Sets or clears a role's anchor.
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails.
    pub fn set_role_dependency(
        &mut self,
        role_id: RoleId,
        depends_on: Option<RoleId>,
    ) -> Result<(), PersistenceError> {
        mutations::config::set_role_dependency(&mut self.conn, role_id, depends_on)
    }

    /// Sets or clears a role's exclusive group.
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails.
    pub fn set_role_exclusive_group(
        &mut self,
        role_id: RoleId,
        exclusive_group: Option<ExclusiveGroupId>,
    ) -> Result<(), PersistenceError> {
        mutations::config::set_role_exclusive_group(&mut self.conn, role_id, exclusive_group)
    }

    /// Retrieves a role.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_role(&mut self, role_id: RoleId) -> Result<Option<Role>, PersistenceError> {
        queries::config::get_role(&mut self.conn, role_id)
    }

    /// Lists the roles of a group.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_roles(&mut self, group_id: GroupId) -> Result<Vec<Role>, PersistenceError> {
        queries::config::list_roles(&mut self.conn, group_id)
    }

    /// Sets the fill priority of a role for a recurring event.
    ///
    /// # Errors
    ///
    /// Returns an error if the upsert fails.
    pub fn set_event_role_priority(
        &mut self,
        recurring_event_id: RecurringEventId,
        role_id: RoleId,
        priority: i32,
    ) -> Result<(), PersistenceError> {
        mutations::config::set_event_role_priority(
            &mut self.conn,
            recurring_event_id,
            role_id,
            priority,
        )
    }

    /// Lists the event-role priorities of a group.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_event_role_priorities(
        &mut self,
        group_id: GroupId,
    ) -> Result<Vec<EventRolePriority>, PersistenceError> {
        queries::config::list_event_role_priorities(&mut self.conn, group_id)
    }

    /// Creates a member.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub fn create_member(&mut self, group_id: GroupId, name: &str) -> Result<MemberId, PersistenceError> {
        mutations::config::create_member(&mut self.conn, group_id, name)
    }

    /// Grants a role to a member.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub fn assign_member_role(
        &mut self,
        member_id: MemberId,
        role_id: RoleId,
    ) -> Result<(), PersistenceError> {
        mutations::config::assign_member_role(&mut self.conn, member_id, role_id)
    }

    /// Adds a weekly availability window to a member.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub fn add_availability(
        &mut self,
        member_id: MemberId,
        availability: &Availability,
    ) -> Result<i64, PersistenceError> {
        mutations::config::add_availability(&mut self.conn, member_id, availability)
    }

    /// Adds a holiday to a member.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub fn add_holiday(&mut self, member_id: MemberId, holiday: &Holiday) -> Result<i64, PersistenceError> {
        mutations::config::add_holiday(&mut self.conn, member_id, holiday)
    }

    /// Retrieves a member with roles, availability and holidays.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_member(&mut self, member_id: MemberId) -> Result<Option<Member>, PersistenceError> {
        queries::config::get_member(&mut self.conn, member_id)
    }

    /// Lists the members of a group with roles, availability and holidays.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_members(&mut self, group_id: GroupId) -> Result<Vec<Member>, PersistenceError> {
        queries::config::list_members(&mut self.conn, group_id)
    }

    // ========================================================================
    // Schedules
    // ========================================================================

    /// Returns the schedule of a group for a month, creating a draft if
    /// needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert or lookup fails.
    pub fn get_or_create_schedule(
        &mut self,
        group_id: GroupId,
        month: u8,
        year: i32,
    ) -> Result<Schedule, PersistenceError> {
        mutations::schedules::get_or_create_schedule(&mut self.conn, group_id, month, year)
    }

    /// Sets the publication status of a schedule.
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails or the schedule does not exist.
    pub fn set_schedule_status(
        &mut self,
        schedule_id: ScheduleId,
        status: ScheduleStatus,
    ) -> Result<(), PersistenceError> {
        mutations::schedules::set_schedule_status(&mut self.conn, schedule_id, status)
    }

    /// Retrieves a schedule.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_schedule(&mut self, schedule_id: ScheduleId) -> Result<Option<Schedule>, PersistenceError> {
        queries::schedules::get_schedule(&mut self.conn, schedule_id)
    }

    /// Lists every schedule of a group in calendar order.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_schedules(&mut self, group_id: GroupId) -> Result<Vec<Schedule>, PersistenceError> {
        queries::schedules::list_schedules(&mut self.conn, group_id)
    }

    /// Lists the schedules with the given ids.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_schedules_by_ids(
        &mut self,
        schedule_ids: &[ScheduleId],
    ) -> Result<Vec<Schedule>, PersistenceError> {
        queries::schedules::list_schedules_by_ids(&mut self.conn, schedule_ids)
    }

    /// Lists the dates of a schedule.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_schedule_dates(
        &mut self,
        schedule_id: ScheduleId,
    ) -> Result<Vec<ScheduleDate>, PersistenceError> {
        queries::schedules::list_schedule_dates(&mut self.conn, schedule_id)
    }

    /// Lists every schedule date referencing a recurring event.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_schedule_dates_for_event(
        &mut self,
        recurring_event_id: RecurringEventId,
    ) -> Result<Vec<ScheduleDate>, PersistenceError> {
        queries::schedules::list_schedule_dates_for_event(&mut self.conn, recurring_event_id)
    }

    /// Lists the assignments of a schedule.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_assignments(&mut self, schedule_id: ScheduleId) -> Result<Vec<Assignment>, PersistenceError> {
        queries::schedules::list_assignments(&mut self.conn, schedule_id)
    }

    /// Counts assignments per member across the given schedules.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn count_assignments_by_member(
        &mut self,
        schedule_ids: &[ScheduleId],
    ) -> Result<Vec<(MemberId, u32)>, PersistenceError> {
        queries::schedules::count_assignments_by_member(&mut self.conn, schedule_ids)
    }

    /// Runs `f` as one atomic write unit scoped to `schedule_id`.
    ///
    /// The write lock is taken before `f` runs. If `f` returns an error,
    /// every write it made is rolled back and the error is returned as is.
    /// `f` may fail with any error type that persistence errors convert
    /// into, so callers can run their own logic inside the unit.
    ///
    /// # Errors
    ///
    /// Returns the error of `f`, or an error if the transaction cannot be
    /// opened or committed.
    pub fn with_schedule_transaction<T, E, F>(
        &mut self,
        schedule_id: ScheduleId,
        f: F,
    ) -> Result<T, E>
    where
        E: From<PersistenceError>,
        F: FnOnce(&mut ScheduleTransaction<'_>) -> Result<T, E>,
    {
        debug!(%schedule_id, "Opening schedule transaction");
        self.conn
            .immediate_transaction::<T, UnitError<E>, _>(|conn| {
                let mut unit: ScheduleTransaction<'_> = ScheduleTransaction::new(conn, schedule_id);
                f(&mut unit).map_err(UnitError::Aborted)
            })
            .map_err(|err| match err {
                UnitError::Aborted(err) => err,
                UnitError::Database(err) => {
                    debug!(%schedule_id, error = %err, "Schedule transaction failed");
                    E::from(PersistenceError::from(err))
                }
            })
    }
}

/// Failure of a schedule transaction: either the caller's own error or a
/// database error raised while opening, committing or rolling back.
enum UnitError<E> {
    Aborted(E),
    Database(diesel::result::Error),
}

impl<E> From<diesel::result::Error> for UnitError<E> {
    fn from(err: diesel::result::Error) -> Self {
        Self::Database(err)
    }
}
