/// Task ingestion endpoints
///
/// - `GET /api/tasks` - liveness probe for the tasks router
/// - `POST /api/tasks` - create a task
///
/// Creation never fails because of the project reference: a missing,
/// malformed or unknown `projectId` puts the task into the fallback project.

use crate::{
    app::AppState,
    error::{ApiJson, ApiResult},
};
use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use serde_json::{json, Value};
use synergyhub_shared::{
    ingest::TaskInput,
    models::{task::Task, user::UserProfile},
};

/// Response body for a created task
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskResponse {
    pub message: &'static str,
    pub task: Task,

    /// Profile of the matched assignee, `null` when the assignee matched nobody
    pub assignee_user: Option<UserProfile>,
}

pub async fn tasks_probe() -> Json<Value> {
    Json(json!({ "ok": true, "route": "/api/tasks/" }))
}

/// Creates a task
///
/// # Request
///
/// ```text
/// POST /api/tasks
/// Content-Type: application/json
///
/// {
///   "title": "Draft release notes",
///   "projectId": "3f2b...",
///   "status": "in-progress",
///   "dueDate": "2025-03-01",
///   "assignee": "ada@example.com",
///   "tags": "docs, release"
/// }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: blank or missing title, malformed body
/// - `500 Internal Server Error`: storage failure
pub async fn create_task(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<TaskInput>,
) -> ApiResult<(StatusCode, Json<CreateTaskResponse>)> {
    let outcome = state.ingest.ingest(input).await?;

    Ok((
        StatusCode::CREATED,
        Json(CreateTaskResponse {
            message: "Task created",
            task: outcome.task,
            assignee_user: outcome.assignee_user,
        }),
    ))
}
