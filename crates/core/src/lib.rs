// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

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
#![allow(clippy::cargo_common_metadata)]

//! The rota engine.
//!
//! Everything in this crate is pure and synchronous. Reads and writes are
//! the caller's business; the engine takes snapshots of configuration and
//! rows and returns what should be written.

mod assign;
mod build;
mod error;
mod fairness;
mod impact;
mod materialize;
mod recalculate;
mod roster;

#[cfg(test)]
mod tests;

// Re-export public types and functions
pub use assign::{ConsistencyViolation, DateOutcome, UnfilledReason, UnfilledSlot, assign_date};
pub use build::{BuildOutcome, build_schedule};
pub use error::CoreError;
pub use fairness::{FairnessPolicy, FairnessTally};
pub use impact::{ImpactReport, ScheduleImpact, summarize_impact};
pub use materialize::materialize_dates;
pub use recalculate::{ScheduleRecalculation, plan_recalculation};
pub use roster::Roster;
