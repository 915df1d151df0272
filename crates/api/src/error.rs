// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Error types for the API layer.

use rota::CoreError;
use rota_domain::DomainError;
use rota_persistence::PersistenceError;
use thiserror::Error;

/// API-level errors.
///
/// These are distinct from domain/core errors and represent the API contract.
/// Staffing shortfalls are never errors; they are returned as unfilled slots
/// in successful responses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// A domain rule was violated.
    DomainRuleViolation {
        /// The rule that was violated.
        rule: String,
        /// A human-readable description of the violation.
        message: String,
    },
    /// Invalid input was provided.
    InvalidInput {
        /// The field that was invalid.
        field: String,
        /// A human-readable description of the error.
        message: String,
    },
    /// A requested resource was not found.
    ResourceNotFound {
        /// The type of resource that was not found.
        resource_type: String,
        /// A human-readable description of what was not found.
        message: String,
    },
    /// An internal error occurred.
    Internal {
        /// A description of the internal error.
        message: String,
    },
}

impl ApiError {
    pub(crate) fn not_found(resource_type: &str, message: String) -> Self {
        Self::ResourceNotFound {
            resource_type: resource_type.to_string(),
            message,
        }
    }

    pub(crate) fn rule(rule: &str, message: String) -> Self {
        Self::DomainRuleViolation {
            rule: rule.to_string(),
            message,
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DomainRuleViolation { rule, message } => {
                write!(f, "Domain rule violation ({rule}): {message}")
            }
            Self::InvalidInput { field, message } => {
                write!(f, "Invalid input for field '{field}': {message}")
            }
            Self::ResourceNotFound {
                resource_type,
                message,
            } => {
                write!(f, "{resource_type} not found: {message}")
            }
            Self::Internal { message } => {
                write!(f, "Internal error: {message}")
            }
        }
    }
}

impl std::error::Error for ApiError {}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        translate_domain_error(err)
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        translate_core_error(err)
    }
}

impl From<PersistenceError> for ApiError {
    fn from(err: PersistenceError) -> Self {
        translate_persistence_error(err)
    }
}

/// Translates a domain error into an API error.
///
/// This translation is explicit and ensures domain errors are not leaked directly.
#[must_use]
pub fn translate_domain_error(err: DomainError) -> ApiError {
    let message: String = err.to_string();
    match err {
        DomainError::InvalidMonth(_) => invalid("month", message),
        DomainError::InvalidYear(_) => invalid("year", message),
        DomainError::InvalidWeekday(_) | DomainError::InvalidWeekdayIndex(_) => {
            invalid("weekday", message)
        }
        DomainError::TimeParseError { .. } | DomainError::InvalidTimeWindow { .. } => {
            invalid("time_window", message)
        }
        DomainError::DateParseError { .. } => invalid("date", message),
        DomainError::InvalidHolidayRange { .. } => invalid("holiday", message),
        DomainError::InvalidEventKind(_) => invalid("kind", message),
        DomainError::InvalidScheduleStatus(_) => invalid("status", message),
        DomainError::InvalidRequiredCount(_) => invalid("required_count", message),
        DomainError::InvalidRoleName | DomainError::InvalidMemberName => invalid("name", message),
        DomainError::UnknownAnchorRole { .. } => ApiError::not_found("Role", message),
        DomainError::CrossGroupDependency { .. } => {
            ApiError::rule("same_group_dependency", message)
        }
        DomainError::DependencyCycle { .. } => ApiError::rule("acyclic_role_dependencies", message),
        DomainError::DuplicateActiveWeekday { .. } => {
            ApiError::rule("unique_active_weekday", message)
        }
    }
}

/// Translates a core error into an API error.
///
/// Mismatches between rows and schedules mean stored data is inconsistent,
/// not that the caller sent bad input.
#[must_use]
pub fn translate_core_error(err: CoreError) -> ApiError {
    match err {
        CoreError::DomainViolation(domain_err) => translate_domain_error(domain_err),
        CoreError::ScheduleMismatch { .. }
        | CoreError::GroupMismatch { .. }
        | CoreError::UnknownSchedule(_) => ApiError::Internal {
            message: err.to_string(),
        },
    }
}

/// Translates a persistence error into an API error.
#[must_use]
pub fn translate_persistence_error(err: PersistenceError) -> ApiError {
    match err {
        PersistenceError::NotFound(message) => ApiError::not_found("Record", message),
        other => ApiError::Internal {
            message: other.to_string(),
        },
    }
}

fn invalid(field: &str, message: String) -> ApiError {
    ApiError::InvalidInput {
        field: field.to_string(),
        message,
    }
}

/// Aggregate error of a recalculation in which some schedules failed.
///
/// Schedules that succeeded keep their new assignments.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error(
    "Recalculation failed for {} schedule(s) ({succeeded} updated): {}",
    .failed.len(),
    .failed.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ")
)]
pub struct RecalculationFailure {
    /// Number of schedules that were recalculated successfully.
    pub succeeded: usize,
    /// Ids of the schedules that failed.
    pub failed: Vec<i64>,
}
