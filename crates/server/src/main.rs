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
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

use axum::{
    Json, Router,
    extract::{Path, State as AxumState},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use clap::{Parser, ValueEnum};
use rota_api::{
    AffectedScheduleDatesResponse, ApiError, BuildAssignmentsResponse, FairnessPolicy,
    MaterializeScheduleRequest, MaterializeScheduleResponse, RecalculateResponse,
    affected_schedule_dates, build_assignments, materialize_schedule,
    recalculate_future_assignments,
};
use rota_domain::{RecurringEventId, ScheduleId, parse_iso_date};
use rota_persistence::Persistence;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use time::{Date, OffsetDateTime};
use tokio::sync::Mutex;
use tracing::{error, info, warn};

/// Rota Server - HTTP server for the monthly rota engine
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the `SQLite` database file. If not provided, uses in-memory database.
    #[arg(short, long)]
    database: Option<String>,

    /// Port to bind the server to
    #[arg(short, long, default_value_t = 3000)]
    port: u16,

    /// How the rotation counter is seeded before each build
    #[arg(long, value_enum, default_value_t = FairnessArg::Reset)]
    fairness: FairnessArg,

    /// Months of committed history to count under `committed-history`.
    /// All earlier months are counted when omitted.
    #[arg(long)]
    history_months: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum FairnessArg {
    /// Every month starts from zero.
    Reset,
    /// Seed from committed schedules of earlier months.
    CommittedHistory,
}

impl Args {
    const fn fairness_policy(&self) -> FairnessPolicy {
        match self.fairness {
            FairnessArg::Reset => FairnessPolicy::ResetPerMonth,
            FairnessArg::CommittedHistory => FairnessPolicy::SeedFromCommitted {
                lookback_months: self.history_months,
            },
        }
    }
}

/// Application state shared across handlers.
#[derive(Clone)]
struct AppState {
    /// The persistence layer.
    persistence: Arc<Mutex<Persistence>>,
    /// Fairness seeding applied to builds and recalculations.
    policy: FairnessPolicy,
}

/// Body of a materialize request.
#[derive(Debug, Clone, Deserialize, Serialize)]
struct MaterializeApiRequest {
    /// Month number (1-12).
    month: u8,
    /// Calendar year.
    year: i32,
}

/// Body of a recalculate request.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
struct RecalculateApiRequest {
    /// Cutoff date (`YYYY-MM-DD`). Defaults to the current UTC date.
    #[serde(default)]
    today: Option<String>,
}

/// Error response type.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ErrorResponse {
    /// Error indicator.
    error: bool,
    /// Error message.
    message: String,
}

/// HTTP error wrapper that implements `IntoResponse`.
struct HttpError {
    /// The HTTP status code.
    status: StatusCode,
    /// The error message.
    message: String,
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let body: Json<ErrorResponse> = Json(ErrorResponse {
            error: true,
            message: self.message,
        });
        (self.status, body).into_response()
    }
}

impl From<ApiError> for HttpError {
    fn from(err: ApiError) -> Self {
        let status: StatusCode = match err {
            ApiError::InvalidInput { .. } => StatusCode::BAD_REQUEST,
            ApiError::ResourceNotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::DomainRuleViolation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Internal { .. } => {
                error!(error = %err, "Internal error");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

/// Handler for POST `/groups/{group_id}/schedules`.
///
/// Creates the month's schedule if needed and materializes its dates.
async fn handle_materialize_schedule(
    AxumState(app_state): AxumState<AppState>,
    Path(group_id): Path<i64>,
    Json(req): Json<MaterializeApiRequest>,
) -> Result<Json<MaterializeScheduleResponse>, HttpError> {
    info!(group_id, month = req.month, year = req.year, "Handling materialize request");

    let request: MaterializeScheduleRequest = MaterializeScheduleRequest {
        group_id,
        month: req.month,
        year: req.year,
    };
    let mut persistence = app_state.persistence.lock().await;
    let response: MaterializeScheduleResponse = materialize_schedule(&mut persistence, &request)?;
    drop(persistence);

    Ok(Json(response))
}

/// Handler for POST `/schedules/{schedule_id}/assignments`.
///
/// Rebuilds every assignment of the schedule.
async fn handle_build_assignments(
    AxumState(app_state): AxumState<AppState>,
    Path(schedule_id): Path<i64>,
) -> Result<Json<BuildAssignmentsResponse>, HttpError> {
    info!(schedule_id, "Handling build request");

    let mut persistence = app_state.persistence.lock().await;
    let response: BuildAssignmentsResponse = build_assignments(
        &mut persistence,
        ScheduleId::new(schedule_id),
        app_state.policy,
    )?;
    drop(persistence);

    Ok(Json(response))
}

/// Handler for POST `/recurring-events/{id}/recalculate`.
///
/// Responds with 500 and the full report when any schedule failed.
async fn handle_recalculate(
    AxumState(app_state): AxumState<AppState>,
    Path(recurring_event_id): Path<i64>,
    Json(req): Json<RecalculateApiRequest>,
) -> Result<(StatusCode, Json<RecalculateResponse>), HttpError> {
    let today: Date = match req.today.as_deref() {
        Some(value) => parse_iso_date(value).map_err(ApiError::from)?,
        None => OffsetDateTime::now_utc().date(),
    };
    info!(recurring_event_id, %today, "Handling recalculate request");

    let mut persistence = app_state.persistence.lock().await;
    let response: RecalculateResponse = recalculate_future_assignments(
        &mut persistence,
        RecurringEventId::new(recurring_event_id),
        today,
        app_state.policy,
    )?;
    drop(persistence);

    let status: StatusCode = match response.clone().into_result() {
        Ok(_) => StatusCode::OK,
        Err(failure) => {
            warn!(recurring_event_id, %failure, "Partial recalculation");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    Ok((status, Json(response)))
}

/// Handler for GET `/recurring-events/{id}/impact`.
async fn handle_impact(
    AxumState(app_state): AxumState<AppState>,
    Path(recurring_event_id): Path<i64>,
) -> Result<Json<AffectedScheduleDatesResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let response: AffectedScheduleDatesResponse =
        affected_schedule_dates(&mut persistence, RecurringEventId::new(recurring_event_id))?;
    drop(persistence);

    Ok(Json(response))
}

/// Builds the application router with all endpoints.
fn build_router(app_state: AppState) -> Router {
    Router::new()
        .route("/groups/{group_id}/schedules", post(handle_materialize_schedule))
        .route("/schedules/{schedule_id}/assignments", post(handle_build_assignments))
        .route("/recurring-events/{id}/recalculate", post(handle_recalculate))
        .route("/recurring-events/{id}/impact", get(handle_impact))
        .with_state(app_state)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!("Initializing rota server");

    let persistence: Persistence = if let Some(db_path) = &args.database {
        info!("Using file-based database at: {}", db_path);
        Persistence::new_with_file(db_path)?
    } else {
        info!("Using in-memory database");
        Persistence::new_in_memory()?
    };

    let policy: FairnessPolicy = args.fairness_policy();
    info!(?policy, "Fairness policy");

    let app_state: AppState = AppState {
        persistence: Arc::new(Mutex::new(persistence)),
        policy,
    };

    let app: Router = build_router(app_state);

    let addr: std::net::SocketAddr = format!("127.0.0.1:{}", args.port).parse()?;
    info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests;
