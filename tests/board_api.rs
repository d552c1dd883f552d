//! Board API tests against the bundled fixtures

use axum::body::{to_bytes, Body};
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use huddle::server::{create_router, AppState};
use huddle::storage::MemoryStore;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

fn app() -> Router {
    let store = Arc::new(MemoryStore::bundled().unwrap());
    create_router(AppState::new(None, store))
}

async fn send(router: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn get(router: &Router, uri: &str) -> (StatusCode, Value) {
    send(router, Method::GET, uri, None).await
}

#[tokio::test]
async fn test_health() {
    let response = app()
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&body[..], b"ok");
}

#[tokio::test]
async fn test_dashboard_matches_fixtures() {
    let (status, body) = get(&app(), "/api/dashboard").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["stats"],
        json!({"todo": 2, "inProgress": 2, "pendingApproval": 1, "lowConfidence": 1})
    );

    let today: Vec<&str> = body["todaysTasks"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["id"].as_str().unwrap())
        .collect();
    assert_eq!(today, vec!["1", "2", "3"]);
    assert_eq!(body["recentMeetings"].as_array().unwrap().len(), 3);
    assert_eq!(body["activity"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_list_tasks_with_filters() {
    let router = app();

    let (_, all) = get(&router, "/api/tasks").await;
    assert_eq!(all.as_array().unwrap().len(), 6);

    let (_, todo) = get(&router, "/api/tasks?status=todo").await;
    assert_eq!(todo.as_array().unwrap().len(), 2);

    let (_, jordan) = get(&router, "/api/tasks?owner=3").await;
    let ids: Vec<&str> = jordan
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["2", "6"]);

    let (status, body) = get(&router, "/api/tasks?status=blocked").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_move_task_changes_only_status() {
    let router = app();
    let (_, before) = get(&router, "/api/tasks/1").await;

    let (status, moved) = send(
        &router,
        Method::PATCH,
        "/api/tasks/1",
        Some(json!({"status": "in-progress"})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(moved["status"], "in-progress");

    let mut expected = before.clone();
    expected["status"] = json!("in-progress");
    assert_eq!(moved, expected);

    let (_, board) = get(&router, "/api/board").await;
    let columns = board.as_array().unwrap();
    assert_eq!(columns[0]["status"], "todo");
    assert_eq!(columns[0]["tasks"].as_array().unwrap().len(), 1);
    assert_eq!(columns[1]["tasks"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_edit_task_fields() {
    let router = app();

    let (status, task) = send(
        &router,
        Method::PATCH,
        "/api/tasks/5",
        Some(json!({"title": "Draft 2026 roadmap", "dueDate": "2025-12-10", "ownerId": "4"})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(task["title"], "Draft 2026 roadmap");
    assert_eq!(task["dueDate"], "2025-12-10");
    assert_eq!(task["owner"]["name"], "Taylor Smith");
}

#[tokio::test]
async fn test_edit_errors() {
    let router = app();

    let (status, _) = send(&router, Method::PATCH, "/api/tasks/5", Some(json!({"title": "  "}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) =
        send(&router, Method::PATCH, "/api/tasks/5", Some(json!({"ownerId": "99"}))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "user 99 not found");

    let (status, _) =
        send(&router, Method::PATCH, "/api/tasks/99", Some(json!({"status": "done"}))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) =
        send(&router, Method::PATCH, "/api/tasks/5", Some(json!({"status": "blocked"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_approve_and_reject() {
    let router = app();

    let (status, task) = send(&router, Method::POST, "/api/tasks/5/approve", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(task["approved"], true);

    let (_, dashboard) = get(&router, "/api/dashboard").await;
    assert_eq!(dashboard["stats"]["pendingApproval"], 0);

    let (status, _) = send(&router, Method::DELETE, "/api/tasks/5", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = get(&router, "/api/tasks/5").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&router, Method::DELETE, "/api/tasks/5", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_meetings() {
    let router = app();

    let (_, meetings) = get(&router, "/api/meetings").await;
    let meetings = meetings.as_array().unwrap();
    assert_eq!(meetings.len(), 3);
    assert_eq!(meetings[0]["title"], "Weekly Team Standup");
    assert_eq!(meetings[0]["tasks"].as_array().unwrap().len(), 2);

    let (status, meeting) = get(&router, "/api/meetings/2").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(meeting["participants"].as_array().unwrap().len(), 3);

    let (status, _) = get(&router, "/api/meetings/42").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_review_scoping() {
    let router = app();

    let (_, manager) = get(&router, "/api/review").await;
    assert_eq!(manager["pending"].as_array().unwrap().len(), 1);
    assert_eq!(manager["approved"].as_array().unwrap().len(), 5);

    let (_, alex) = get(&router, "/api/review?user=2").await;
    let owners: Vec<&str> = alex["pending"]
        .as_array()
        .unwrap()
        .iter()
        .chain(alex["approved"].as_array().unwrap())
        .map(|t| t["owner"]["id"].as_str().unwrap())
        .collect();
    assert_eq!(owners.len(), 2);
    assert!(owners.iter().all(|id| *id == "2"));

    let (status, _) = get(&router, "/api/review?user=77").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = get(&router, "/api/review?user=1&user=2").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}
