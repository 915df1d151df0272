// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! State-changing operations.
//!
//! - `config`: Configuration writes (groups, events, roles, members)
//! - `schedules`: Schedule creation, status and recurring event deletion
//! - `transaction`: The per-schedule transactional write unit

pub mod config;
pub mod schedules;
pub mod transaction;

pub use transaction::ScheduleTransaction;
