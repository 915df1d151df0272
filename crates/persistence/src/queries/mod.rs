// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Read-only queries.
//!
//! - `config`: Groups, recurring events, roles, priorities and members
//! - `schedules`: Schedules, schedule dates, assignments and history counts
//!
//! Row structs stay private to their module; every query returns domain
//! values.

pub mod config;
pub mod schedules;

use num_traits::ToPrimitive;
use rota_domain::{EventKind, Weekday};

use crate::error::PersistenceError;

pub(crate) fn flag_from_column(value: i32) -> bool {
    value != 0
}

pub(crate) fn weekday_from_column(value: i32) -> Result<Weekday, PersistenceError> {
    Ok(Weekday::from_index(value)?)
}

pub(crate) fn kind_from_column(value: &str) -> Result<EventKind, PersistenceError> {
    Ok(value.parse::<EventKind>()?)
}

pub(crate) fn count_from_column(column: &str, value: i32) -> Result<u32, PersistenceError> {
    value.to_u32().ok_or_else(|| {
        PersistenceError::ReconstructionError(format!("{column} cannot be negative: {value}"))
    })
}
