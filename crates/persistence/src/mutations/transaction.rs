// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! The per-schedule transactional write unit.
//!
//! A `ScheduleTransaction` lives inside an IMMEDIATE `SQLite` transaction:
//! the write lock is taken when the unit opens, so two writers on the same
//! database serialize instead of interleaving. Every write is checked
//! against the schedule the unit was opened for. If the closure returns an
//! error, every write of the unit is rolled back.

use diesel::SqliteConnection;
use diesel::prelude::*;
use rota_domain::{
    Assignment, NewScheduleDate, ScheduleDate, ScheduleDateId, ScheduleId, format_iso_date,
    format_time_of_day,
};
use std::collections::BTreeSet;
use tracing::debug;

use crate::backend::sqlite::get_last_insert_rowid;
use crate::diesel_schema::{assignments, schedule_dates};
use crate::error::PersistenceError;
use crate::queries::schedules::{list_assignments, list_schedule_dates};

/// Writes scoped to one schedule, applied atomically.
pub struct ScheduleTransaction<'a> {
    conn: &'a mut SqliteConnection,
    schedule_id: ScheduleId,
}

impl<'a> ScheduleTransaction<'a> {
    pub(crate) const fn new(conn: &'a mut SqliteConnection, schedule_id: ScheduleId) -> Self {
        Self { conn, schedule_id }
    }

    /// The schedule this unit writes to.
    #[must_use]
    pub const fn schedule_id(&self) -> ScheduleId {
        self.schedule_id
    }

    /// Reads the schedule's dates as seen inside the transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn dates(&mut self) -> Result<Vec<ScheduleDate>, PersistenceError> {
        list_schedule_dates(self.conn, self.schedule_id)
    }

    /// Reads the schedule's assignments as seen inside the transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn assignments(&mut self) -> Result<Vec<Assignment>, PersistenceError> {
        list_assignments(self.conn, self.schedule_id)
    }

    /// Inserts new schedule dates and returns them with their ids.
    ///
    /// # Errors
    ///
    /// Returns an error if a row targets another schedule or an insert
    /// fails (for example a duplicate date).
    pub fn insert_dates(
        &mut self,
        rows: &[NewScheduleDate],
    ) -> Result<Vec<ScheduleDate>, PersistenceError> {
        let mut inserted: Vec<ScheduleDate> = Vec::with_capacity(rows.len());
        for row in rows {
            if row.schedule_id != self.schedule_id {
                return Err(PersistenceError::ForeignScheduleRow {
                    schedule_id: self.schedule_id,
                    found: row.schedule_id,
                });
            }
            let window = row.snapshot.window();
            diesel::insert_into(schedule_dates::table)
                .values((
                    schedule_dates::schedule_id.eq(self.schedule_id.value()),
                    schedule_dates::date.eq(format_iso_date(row.date)),
                    schedule_dates::kind.eq(row.snapshot.kind().as_str()),
                    schedule_dates::label.eq(row.snapshot.label()),
                    schedule_dates::start_time.eq(format_time_of_day(window.start())),
                    schedule_dates::end_time.eq(format_time_of_day(window.end())),
                    schedule_dates::recurring_event_id
                        .eq(row.recurring_event_id.map(|id| id.value())),
                ))
                .execute(self.conn)?;
            let schedule_date_id: i64 = get_last_insert_rowid(self.conn)?;
            inserted.push(ScheduleDate::new(
                ScheduleDateId::new(schedule_date_id),
                self.schedule_id,
                row.date,
                row.recurring_event_id,
                row.snapshot.clone(),
            ));
        }
        debug!(schedule_id = %self.schedule_id, inserted = inserted.len(), "Inserted schedule dates");
        Ok(inserted)
    }

    /// Stores the snapshots carried by `rows` over the persisted ones.
    ///
    /// # Errors
    ///
    /// Returns an error if a row is not a date of this schedule.
    pub fn refresh_snapshots(&mut self, rows: &[ScheduleDate]) -> Result<usize, PersistenceError> {
        for row in rows {
            let window = row.snapshot().window();
            let updated: usize = diesel::update(schedule_dates::table)
                .filter(schedule_dates::schedule_date_id.eq(row.schedule_date_id.value()))
                .filter(schedule_dates::schedule_id.eq(self.schedule_id.value()))
                .set((
                    schedule_dates::kind.eq(row.snapshot().kind().as_str()),
                    schedule_dates::label.eq(row.snapshot().label()),
                    schedule_dates::start_time.eq(format_time_of_day(window.start())),
                    schedule_dates::end_time.eq(format_time_of_day(window.end())),
                ))
                .execute(self.conn)?;
            if updated == 0 {
                return Err(PersistenceError::UnknownScheduleDate {
                    schedule_id: self.schedule_id,
                    schedule_date_id: row.schedule_date_id,
                });
            }
        }
        debug!(schedule_id = %self.schedule_id, refreshed = rows.len(), "Refreshed snapshots");
        Ok(rows.len())
    }

    /// Deletes schedule dates; their assignments go with them.
    ///
    /// # Errors
    ///
    /// Returns an error if an id is not a date of this schedule.
    pub fn delete_dates(&mut self, ids: &[ScheduleDateId]) -> Result<usize, PersistenceError> {
        self.verify_owned(ids.iter().copied())?;
        let deleted: usize = diesel::delete(
            schedule_dates::table
                .filter(schedule_dates::schedule_id.eq(self.schedule_id.value()))
                .filter(schedule_dates::schedule_date_id.eq_any(ids.iter().map(|id| id.value()))),
        )
        .execute(self.conn)?;
        debug!(schedule_id = %self.schedule_id, deleted, "Deleted schedule dates");
        Ok(deleted)
    }

    /// Removes every assignment on the given dates.
    ///
    /// # Errors
    ///
    /// Returns an error if an id is not a date of this schedule.
    pub fn clear_assignments(&mut self, ids: &[ScheduleDateId]) -> Result<usize, PersistenceError> {
        self.verify_owned(ids.iter().copied())?;
        let cleared: usize = diesel::delete(
            assignments::table
                .filter(assignments::schedule_date_id.eq_any(ids.iter().map(|id| id.value()))),
        )
        .execute(self.conn)?;
        debug!(schedule_id = %self.schedule_id, cleared, "Cleared assignments");
        Ok(cleared)
    }

    /// Inserts assignments.
    ///
    /// # Errors
    ///
    /// Returns an error if an assignment's date is not a date of this
    /// schedule or the insert fails.
    pub fn insert_assignments(&mut self, rows: &[Assignment]) -> Result<usize, PersistenceError> {
        if rows.is_empty() {
            return Ok(0);
        }
        self.verify_owned(rows.iter().map(|a| a.schedule_date_id))?;

        let values: Vec<_> = rows
            .iter()
            .map(|a| {
                (
                    assignments::schedule_date_id.eq(a.schedule_date_id.value()),
                    assignments::role_id.eq(a.role_id.value()),
                    assignments::member_id.eq(a.member_id.value()),
                )
            })
            .collect();
        let inserted: usize = diesel::insert_into(assignments::table)
            .values(&values)
            .execute(self.conn)?;
        debug!(schedule_id = %self.schedule_id, inserted, "Inserted assignments");
        Ok(inserted)
    }

    fn verify_owned<I>(&mut self, ids: I) -> Result<(), PersistenceError>
    where
        I: IntoIterator<Item = ScheduleDateId>,
    {
        let wanted: BTreeSet<ScheduleDateId> = ids.into_iter().collect();
        if wanted.is_empty() {
            return Ok(());
        }
        let owned: BTreeSet<ScheduleDateId> = schedule_dates::table
            .filter(schedule_dates::schedule_id.eq(self.schedule_id.value()))
            .filter(schedule_dates::schedule_date_id.eq_any(wanted.iter().map(|id| id.value())))
            .select(schedule_dates::schedule_date_id)
            .load::<i64>(self.conn)?
            .into_iter()
            .map(ScheduleDateId::new)
            .collect();

        match wanted.difference(&owned).next() {
            Some(stray) => Err(PersistenceError::UnknownScheduleDate {
                schedule_id: self.schedule_id,
                schedule_date_id: *stray,
            }),
            None => Ok(()),
        }
    }
}
