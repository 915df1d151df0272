// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use super::*;
use axum::{
    body::Body,
    http::{Request, StatusCode as HttpStatusCode},
};
use rota_api::{
    AddAvailabilityRequest, CreateRecurringEventRequest, CreateRoleRequest, assign_member_role,
    create_group, create_member, create_recurring_event, create_role, set_schedule_status,
};
use diesel::{Connection, RunQueryDsl, SqliteConnection};
use rota_domain::{GroupId, MemberId, RoleId};
use std::path::PathBuf;
use tower::ServiceExt;

/// Helper to create test app state with in-memory persistence.
fn create_test_app_state() -> AppState {
    let persistence: Persistence =
        Persistence::new_in_memory().expect("Failed to create in-memory persistence");
    AppState {
        persistence: Arc::new(Mutex::new(persistence)),
        policy: FairnessPolicy::ResetPerMonth,
    }
}

/// A file database removed on drop.
struct TempDatabase {
    path: PathBuf,
}

impl TempDatabase {
    fn new(name: &str) -> Self {
        let path = std::env::temp_dir().join(format!("rota_server_{name}_{}.db", std::process::id()));
        let db = Self { path };
        db.remove_files();
        db
    }

    /// Stores a date in `schedule_id` whose window ends before it starts,
    /// so reading the schedule back fails.
    fn store_unreadable_date(&self, schedule_id: i64, date: &str) {
        let mut conn = SqliteConnection::establish(self.path.to_str().unwrap()).unwrap();
        diesel::sql_query(format!(
            "INSERT INTO schedule_dates \
             (schedule_id, date, kind, label, start_time, end_time, recurring_event_id) \
             VALUES ({schedule_id}, '{date}', 'assignable', NULL, '21:00', '19:00', NULL)"
        ))
        .execute(&mut conn)
        .unwrap();
    }

    fn remove_files(&self) {
        for suffix in ["", "-wal", "-shm"] {
            let mut file = self.path.as_os_str().to_owned();
            file.push(suffix);
            let _ = std::fs::remove_file(file);
        }
    }
}

impl Drop for TempDatabase {
    fn drop(&mut self) {
        self.remove_files();
    }
}

/// Configures a group with a Friday rehearsal and two sound technicians.
async fn seed_group(app_state: &AppState) -> (GroupId, i64) {
    let mut persistence = app_state.persistence.lock().await;
    let group_id: GroupId = create_group(&mut persistence, "Worship team").unwrap();
    let event = create_recurring_event(
        &mut persistence,
        &CreateRecurringEventRequest {
            group_id: group_id.value(),
            weekday: String::from("Friday"),
            active: true,
            kind: String::from("assignable"),
            label: Some(String::from("Rehearsal")),
            start_time: String::from("18:00"),
            end_time: String::from("20:00"),
        },
    )
    .unwrap();
    let role = create_role(
        &mut persistence,
        &CreateRoleRequest {
            group_id: group_id.value(),
            name: String::from("Sound"),
            required_count: 1,
            display_order: 1,
            depends_on: None,
            exclusive_group: None,
            is_relevant: true,
        },
    )
    .unwrap();
    for name in ["Ada", "Bob"] {
        let member = create_member(&mut persistence, group_id, name).unwrap();
        assign_member_role(
            &mut persistence,
            MemberId::new(member.member_id),
            RoleId::new(role.role_id),
        )
        .unwrap();
        rota_api::add_availability(
            &mut persistence,
            &AddAvailabilityRequest {
                member_id: member.member_id,
                weekday: String::from("Friday"),
                start_time: String::from("17:00"),
                end_time: String::from("22:00"),
            },
        )
        .unwrap();
    }
    (group_id, event.recurring_event_id)
}

async fn send(app: Router, method: &str, uri: &str, body: Option<serde_json::Value>) -> Response {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    let body: Body = body.map_or_else(Body::empty, |json| Body::from(json.to_string()));
    app.oneshot(request.body(body).unwrap()).await.unwrap()
}

async fn read_json<T: serde::de::DeserializeOwned>(response: Response) -> T {
    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body_bytes).unwrap()
}

#[tokio::test]
async fn test_materialize_creates_event_dates() {
    let app_state: AppState = create_test_app_state();
    let (group_id, _) = seed_group(&app_state).await;
    let app: Router = build_router(app_state);

    let response = send(
        app,
        "POST",
        &format!("/groups/{group_id}/schedules"),
        Some(serde_json::json!({ "month": 2, "year": 2026 })),
    )
    .await;

    assert_eq!(response.status(), HttpStatusCode::OK);
    let body: MaterializeScheduleResponse = read_json(response).await;
    assert_eq!(body.created, 4);
    assert_eq!(body.schedule.month, 2);
    let dates: Vec<&str> = body.dates.iter().map(|d| d.date.as_str()).collect();
    assert_eq!(dates, vec!["2026-02-06", "2026-02-13", "2026-02-20", "2026-02-27"]);
}

#[tokio::test]
async fn test_materialize_rejects_invalid_month() {
    let app_state: AppState = create_test_app_state();
    let (group_id, _) = seed_group(&app_state).await;
    let app: Router = build_router(app_state);

    let response = send(
        app,
        "POST",
        &format!("/groups/{group_id}/schedules"),
        Some(serde_json::json!({ "month": 13, "year": 2026 })),
    )
    .await;

    assert_eq!(response.status(), HttpStatusCode::BAD_REQUEST);
    let body: ErrorResponse = read_json(response).await;
    assert!(body.error);
    assert!(body.message.contains("month"));
}

#[tokio::test]
async fn test_materialize_unknown_group_is_not_found() {
    let app: Router = build_router(create_test_app_state());

    let response = send(
        app,
        "POST",
        "/groups/42/schedules",
        Some(serde_json::json!({ "month": 2, "year": 2026 })),
    )
    .await;

    assert_eq!(response.status(), HttpStatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_build_rotates_members() {
    let app_state: AppState = create_test_app_state();
    let (group_id, _) = seed_group(&app_state).await;
    let app: Router = build_router(app_state);

    let materialized: MaterializeScheduleResponse = read_json(
        send(
            app.clone(),
            "POST",
            &format!("/groups/{group_id}/schedules"),
            Some(serde_json::json!({ "month": 2, "year": 2026 })),
        )
        .await,
    )
    .await;
    let schedule_id: i64 = materialized.schedule.schedule_id;

    let response = send(
        app,
        "POST",
        &format!("/schedules/{schedule_id}/assignments"),
        None,
    )
    .await;

    assert_eq!(response.status(), HttpStatusCode::OK);
    let body: BuildAssignmentsResponse = read_json(response).await;
    assert_eq!(body.assignments.len(), 4);
    assert!(body.unfilled.is_empty());
    let members: Vec<i64> = body.assignments.iter().map(|a| a.member_id).collect();
    assert_eq!(members[0], members[2]);
    assert_eq!(members[1], members[3]);
    assert_ne!(members[0], members[1]);
}

#[tokio::test]
async fn test_build_committed_schedule_is_unprocessable() {
    let app_state: AppState = create_test_app_state();
    let (group_id, _) = seed_group(&app_state).await;
    let schedule_id: i64 = {
        let mut persistence = app_state.persistence.lock().await;
        let response = materialize_schedule(
            &mut persistence,
            &MaterializeScheduleRequest {
                group_id: group_id.value(),
                month: 2,
                year: 2026,
            },
        )
        .unwrap();
        set_schedule_status(
            &mut persistence,
            ScheduleId::new(response.schedule.schedule_id),
            "committed",
        )
        .unwrap();
        response.schedule.schedule_id
    };
    let app: Router = build_router(app_state);

    let response = send(
        app,
        "POST",
        &format!("/schedules/{schedule_id}/assignments"),
        None,
    )
    .await;

    assert_eq!(response.status(), HttpStatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_recalculate_and_impact() {
    let app_state: AppState = create_test_app_state();
    let (group_id, event_id) = seed_group(&app_state).await;
    let app: Router = build_router(app_state);

    send(
        app.clone(),
        "POST",
        &format!("/groups/{group_id}/schedules"),
        Some(serde_json::json!({ "month": 2, "year": 2026 })),
    )
    .await;

    let impact = send(
        app.clone(),
        "GET",
        &format!("/recurring-events/{event_id}/impact"),
        None,
    )
    .await;
    assert_eq!(impact.status(), HttpStatusCode::OK);
    let impact: AffectedScheduleDatesResponse = read_json(impact).await;
    assert_eq!(impact.count, 4);

    let response = send(
        app,
        "POST",
        &format!("/recurring-events/{event_id}/recalculate"),
        Some(serde_json::json!({ "today": "2026-02-14" })),
    )
    .await;
    assert_eq!(response.status(), HttpStatusCode::OK);
    let body: RecalculateResponse = read_json(response).await;
    assert_eq!(body.schedules_updated, 1);
    assert_eq!(body.assignments_applied, 2);
    assert!(body.failures.is_empty());
}

#[tokio::test]
async fn test_partial_recalculation_answers_500_with_report() {
    let db = TempDatabase::new("partial_recalculation");
    let app_state: AppState = AppState {
        persistence: Arc::new(Mutex::new(Persistence::new_with_file(&db.path).unwrap())),
        policy: FairnessPolicy::ResetPerMonth,
    };
    let (group_id, event_id) = seed_group(&app_state).await;
    let mut schedule_ids: Vec<i64> = Vec::new();
    {
        let mut persistence = app_state.persistence.lock().await;
        for month in [2, 3] {
            let response = materialize_schedule(
                &mut persistence,
                &MaterializeScheduleRequest {
                    group_id: group_id.value(),
                    month,
                    year: 2026,
                },
            )
            .unwrap();
            schedule_ids.push(response.schedule.schedule_id);
        }
    }
    db.store_unreadable_date(schedule_ids[1], "2026-03-02");
    let app: Router = build_router(app_state);

    let response = send(
        app,
        "POST",
        &format!("/recurring-events/{event_id}/recalculate"),
        Some(serde_json::json!({ "today": "2026-02-14" })),
    )
    .await;

    assert_eq!(response.status(), HttpStatusCode::INTERNAL_SERVER_ERROR);
    let body: RecalculateResponse = read_json(response).await;
    assert_eq!(body.failures, vec![schedule_ids[1]]);
    assert_eq!(body.schedules_updated, 1);
    assert_eq!(body.schedules[0].schedule_id, schedule_ids[0]);
    assert_eq!(body.assignments_applied, 2);
}

#[tokio::test]
async fn test_recalculate_rejects_malformed_date() {
    let app_state: AppState = create_test_app_state();
    let (_, event_id) = seed_group(&app_state).await;
    let app: Router = build_router(app_state);

    let response = send(
        app,
        "POST",
        &format!("/recurring-events/{event_id}/recalculate"),
        Some(serde_json::json!({ "today": "14/02/2026" })),
    )
    .await;

    assert_eq!(response.status(), HttpStatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unknown_event_is_not_found() {
    let app: Router = build_router(create_test_app_state());

    let impact = send(app.clone(), "GET", "/recurring-events/9/impact", None).await;
    assert_eq!(impact.status(), HttpStatusCode::NOT_FOUND);

    let recalc = send(
        app,
        "POST",
        "/recurring-events/9/recalculate",
        Some(serde_json::json!({})),
    )
    .await;
    assert_eq!(recalc.status(), HttpStatusCode::NOT_FOUND);
}

#[test]
fn test_fairness_flags() {
    let defaults: Args = Args::try_parse_from(["rota-server"]).unwrap();
    assert_eq!(defaults.port, 3000);
    assert_eq!(defaults.fairness_policy(), FairnessPolicy::ResetPerMonth);

    let seeded: Args = Args::try_parse_from([
        "rota-server",
        "--fairness",
        "committed-history",
        "--history-months",
        "6",
    ])
    .unwrap();
    assert_eq!(
        seeded.fairness_policy(),
        FairnessPolicy::SeedFromCommitted {
            lookback_months: Some(6)
        }
    );
}
