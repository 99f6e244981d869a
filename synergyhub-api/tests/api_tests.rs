/// HTTP integration tests for the SynergyHub API
///
/// Drive the full router (middleware, extractors, handlers, services) over
/// the in-memory store.

mod common;

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
};
use common::TestContext;
use futures::future::join_all;
use serde_json::json;
use synergyhub_shared::models::project::FALLBACK_PROJECT_NAME;

// Health and probes

#[tokio::test]
async fn test_health_reports_database_status() {
    let ctx = TestContext::new();

    let (status, body) = ctx.get("/api/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], true);
    assert_eq!(body["database"], "connected");

    ctx.backend.set_unavailable(true);
    let (status, body) = ctx.get("/api/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], true);
    assert_eq!(body["database"], "disconnected");
}

#[tokio::test]
async fn test_tasks_probe() {
    let ctx = TestContext::new();

    let (status, body) = ctx.get("/api/tasks").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "ok": true, "route": "/api/tasks/" }));
}

#[tokio::test]
async fn test_security_headers_on_api_responses() {
    let ctx = TestContext::new();

    let response = tower::ServiceExt::oneshot(
        ctx.app.clone(),
        Request::builder()
            .uri("/api/health")
            .body(Body::empty())
            .unwrap(),
    )
    .await
    .unwrap();

    assert_eq!(
        response.headers().get("x-content-type-options").unwrap(),
        "nosniff"
    );
    assert!(response.headers().get("strict-transport-security").is_none());
}

// Task ingestion

#[tokio::test]
async fn test_create_task_without_project_uses_fallback() {
    let ctx = TestContext::new();

    let (status, body) = ctx.post("/api/tasks", json!({ "title": "Loose end" })).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "Task created");
    assert_eq!(body["task"]["title"], "Loose end");
    assert_eq!(body["task"]["status"], "todo");
    assert!(body["assigneeUser"].is_null());

    let project_id = body["task"]["projectId"].as_str().unwrap();
    let (status, project) = ctx.get(&format!("/api/projects/{}", project_id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(project["name"], FALLBACK_PROJECT_NAME);
}

#[tokio::test]
async fn test_create_task_with_existing_project() {
    let ctx = TestContext::new();
    let project_id = ctx.create_project("Website").await;

    let (status, body) = ctx
        .post(
            "/api/tasks",
            json!({ "title": "Write copy", "projectId": project_id }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["task"]["projectId"], project_id.as_str());
    assert_eq!(ctx.backend.project_count().await, 1);
}

#[tokio::test]
async fn test_create_task_with_unknown_or_malformed_project_falls_back() {
    let ctx = TestContext::new();

    let (status, unknown) = ctx
        .post(
            "/api/tasks",
            json!({ "title": "A", "projectId": "0b7f6a0e-7e0b-4e58-9a43-5a9d2f0c0c11" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, malformed) = ctx
        .post(
            "/api/tasks",
            json!({ "title": "B", "projectId": "64b7f0c2e4b0a1a2b3c4d5e6" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    assert_eq!(unknown["task"]["projectId"], malformed["task"]["projectId"]);
    assert_eq!(ctx.backend.project_count().await, 1);
}

#[tokio::test]
async fn test_concurrent_creates_share_one_fallback_project() {
    let ctx = TestContext::new();

    let responses = join_all((0..12).map(|i| {
        let ctx = &ctx;
        async move {
            ctx.post("/api/tasks", json!({ "title": format!("Task {}", i) }))
                .await
        }
    }))
    .await;

    let mut project_ids: Vec<String> = responses
        .into_iter()
        .map(|(status, body)| {
            assert_eq!(status, StatusCode::CREATED);
            body["task"]["projectId"].as_str().unwrap().to_string()
        })
        .collect();
    project_ids.dedup();

    assert_eq!(project_ids.len(), 1);
    assert_eq!(ctx.backend.project_count().await, 1);
    assert_eq!(ctx.backend.task_count().await, 12);
}

#[tokio::test]
async fn test_create_task_normalizes_fields() {
    let ctx = TestContext::new();

    let (status, body) = ctx
        .post(
            "/api/tasks",
            json!({
                "title": "  Release  ",
                "status": "in-progress",
                "tags": "a, b ,,c",
                "dueDate": 1735689600000_i64,
                "description": "Ship it",
                "image": "https://img.example/cover.png"
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let task = &body["task"];
    assert_eq!(task["title"], "Release");
    assert_eq!(task["status"], "in-progress");
    assert_eq!(task["tags"], json!(["a", "b", "c"]));
    assert!(task["dueDate"]
        .as_str()
        .unwrap()
        .starts_with("2025-01-01T00:00:00"));
    assert_eq!(task["description"], "Ship it");
    assert_eq!(task["image"], "https://img.example/cover.png");
    assert!(task["createdAt"].is_string());
}

#[tokio::test]
async fn test_create_task_resolves_assignee() {
    let ctx = TestContext::new();
    ctx.signup_and_login("ada", "ada@example.com", "hunter22").await;

    let (status, body) = ctx
        .post("/api/tasks", json!({ "title": "Review", "assignee": "ada" }))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["task"]["assignee"], "ada@example.com");
    assert_eq!(body["assigneeUser"]["username"], "ada");
    assert!(body["assigneeUser"].get("passwordHash").is_none());

    let (_, body) = ctx
        .post("/api/tasks", json!({ "title": "Review", "assignee": "nobody" }))
        .await;
    assert_eq!(body["task"]["assignee"], "nobody");
    assert!(body["assigneeUser"].is_null());
}

#[tokio::test]
async fn test_create_task_rejects_blank_title() {
    let ctx = TestContext::new();

    for payload in [json!({}), json!({ "title": "   " })] {
        let (status, body) = ctx.post("/api/tasks", payload).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "bad_request");
        assert_eq!(body["message"], "title is required");
    }

    assert_eq!(ctx.backend.task_count().await, 0);
}

#[tokio::test]
async fn test_create_task_rejects_malformed_bodies() {
    let ctx = TestContext::new();

    let (status, _) = ctx
        .post("/api/tasks", json!({ "title": "x", "priority": "high" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "unknown field");

    let (status, _) = ctx.post("/api/tasks", json!({ "title": 5 })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "wrong type");

    let (status, _) = ctx
        .post("/api/tasks", json!({ "title": "x", "status": "blocked" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "unknown status");

    let (status, body) = ctx
        .send_request(
            Request::builder()
                .method(Method::POST)
                .uri("/api/tasks")
                .header("content-type", "application/json")
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "syntax error");
    assert_eq!(body["error"], "bad_request");

    assert_eq!(ctx.backend.task_count().await, 0);
}

#[tokio::test]
async fn test_create_task_store_failure_is_generic_500() {
    let ctx = TestContext::new();
    ctx.backend.set_unavailable(true);

    let (status, body) = ctx.post("/api/tasks", json!({ "title": "Doomed" })).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "internal_error");
    assert_eq!(body["message"], "An internal error occurred");
}

#[tokio::test]
async fn test_identical_requests_create_distinct_tasks() {
    let ctx = TestContext::new();
    let payload = json!({ "title": "Twice" });

    let (_, first) = ctx.post("/api/tasks", payload.clone()).await;
    let (_, second) = ctx.post("/api/tasks", payload).await;

    assert_ne!(first["task"]["id"], second["task"]["id"]);
    assert_eq!(ctx.backend.task_count().await, 2);
}

// Auth

#[tokio::test]
async fn test_signup_login_me_flow() {
    let ctx = TestContext::new();

    let (status, body) = ctx
        .post(
            "/api/auth/signup",
            json!({
                "username": "grace",
                "email": "Grace@Example.com",
                "password": "cobol4ever",
                "jobTitle": "Admiral",
                "department": "Navy"
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "User created");
    assert_eq!(body["user"]["email"], "grace@example.com");
    assert_eq!(body["user"]["jobTitle"], "Admiral");
    assert!(body["user"].get("passwordHash").is_none());

    let (status, body) = ctx
        .post(
            "/api/auth/login",
            json!({ "email": "grace@example.com", "password": "cobol4ever" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Authenticated");
    let token = body["token"].as_str().unwrap().to_string();

    let (status, body) = ctx
        .send(Method::GET, "/api/auth/me", None, Some(&token))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["username"], "grace");
}

#[tokio::test]
async fn test_signup_rejects_missing_and_duplicate() {
    let ctx = TestContext::new();

    let (status, body) = ctx
        .post("/api/auth/signup", json!({ "username": "x", "password": "p" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");

    ctx.signup_and_login("ada", "ada@example.com", "pw").await;

    let (status, body) = ctx
        .post(
            "/api/auth/signup",
            json!({ "username": "ada", "email": "other@example.com", "password": "pw" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Email or username already in use");
}

#[tokio::test]
async fn test_signup_accepts_any_non_empty_email() {
    let ctx = TestContext::new();

    let (status, body) = ctx
        .post(
            "/api/auth/signup",
            json!({ "username": "lin", "email": "Lin-At-Home", "password": "pw" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["user"]["email"], "lin-at-home");

    let (status, _) = ctx
        .post(
            "/api/auth/login",
            json!({ "email": "lin-at-home", "password": "pw" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_login_failures() {
    let ctx = TestContext::new();
    ctx.signup_and_login("ada", "ada@example.com", "right").await;

    let (status, _) = ctx
        .post("/api/auth/login", json!({ "email": "ada@example.com" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = ctx
        .post(
            "/api/auth/login",
            json!({ "email": "ada@example.com", "password": "wrong" }),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid credentials");

    let (status, _) = ctx
        .post(
            "/api/auth/login",
            json!({ "email": "nobody@example.com", "password": "right" }),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_me_requires_valid_token() {
    let ctx = TestContext::new();

    let (status, _) = ctx.get("/api/auth/me").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = ctx
        .send(Method::GET, "/api/auth/me", None, Some("not.a.jwt"))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

// Projects

#[tokio::test]
async fn test_project_crud() {
    let ctx = TestContext::new();

    let (status, created) = ctx
        .post(
            "/api/projects",
            json!({
                "name": "  Website  ",
                "description": "Relaunch",
                "members": ["ada", " ", "grace"]
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["name"], "Website");
    assert_eq!(created["status"], "active");
    assert_eq!(created["members"], json!(["ada", "grace"]));
    let id = created["id"].as_str().unwrap().to_string();

    let (status, updated) = ctx
        .send(
            Method::PUT,
            &format!("/api/projects/{}", id),
            Some(json!({ "status": "archived" })),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["status"], "archived");
    assert_eq!(updated["name"], "Website");

    let (status, body) = ctx
        .send(Method::DELETE, &format!("/api/projects/{}", id), None, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Project deleted");

    let (status, _) = ctx.get(&format!("/api/projects/{}", id)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = ctx
        .send(Method::DELETE, &format!("/api/projects/{}", id), None, None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_project_validation_and_ids() {
    let ctx = TestContext::new();

    let (status, _) = ctx.post("/api/projects", json!({ "name": "  " })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = ctx.get("/api/projects/not-a-uuid").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "bad_request");

    let (status, _) = ctx
        .get("/api/projects/0b7f6a0e-7e0b-4e58-9a43-5a9d2f0c0c11")
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = ctx
        .send(
            Method::PUT,
            "/api/projects/0b7f6a0e-7e0b-4e58-9a43-5a9d2f0c0c11",
            Some(json!({ "description": "x" })),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_projects_listed_newest_first() {
    let ctx = TestContext::new();
    ctx.create_project("First").await;
    ctx.create_project("Second").await;

    let (status, body) = ctx.get("/api/projects").await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Second", "First"]);
}

#[tokio::test]
async fn test_fallback_project_is_protected() {
    let ctx = TestContext::new();
    let (_, body) = ctx.post("/api/tasks", json!({ "title": "Orphan" })).await;
    let fallback_id = body["task"]["projectId"].as_str().unwrap().to_string();

    let (status, _) = ctx
        .send(
            Method::DELETE,
            &format!("/api/projects/{}", fallback_id),
            None,
            None,
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = ctx
        .send(
            Method::PUT,
            &format!("/api/projects/{}", fallback_id),
            Some(json!({ "name": "Mine now" })),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = ctx
        .send(
            Method::PUT,
            &format!("/api/projects/{}", fallback_id),
            Some(json!({ "description": "Catch-all" })),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_list_project_tasks_with_status_filter() {
    let ctx = TestContext::new();
    let project_id = ctx.create_project("Ops").await;

    for (title, status) in [("a", "todo"), ("b", "done"), ("c", "done")] {
        let (code, _) = ctx
            .post(
                "/api/tasks",
                json!({ "title": title, "status": status, "projectId": project_id }),
            )
            .await;
        assert_eq!(code, StatusCode::CREATED);
    }

    let (status, all) = ctx
        .get(&format!("/api/projects/{}/tasks", project_id))
        .await;
    assert_eq!(status, StatusCode::OK);
    let titles: Vec<&str> = all
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["c", "b", "a"]);

    let (status, done) = ctx
        .get(&format!("/api/projects/{}/tasks?status=done", project_id))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(done.as_array().unwrap().len(), 2);

    let (status, _) = ctx
        .get(&format!("/api/projects/{}/tasks?status=blocked", project_id))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_deleting_project_removes_its_tasks() {
    let ctx = TestContext::new();
    let project_id = ctx.create_project("Temp").await;
    ctx.post(
        "/api/tasks",
        json!({ "title": "Gone soon", "projectId": project_id }),
    )
    .await;
    assert_eq!(ctx.backend.task_count().await, 1);

    let (status, _) = ctx
        .send(
            Method::DELETE,
            &format!("/api/projects/{}", project_id),
            None,
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ctx.backend.task_count().await, 0);
}
