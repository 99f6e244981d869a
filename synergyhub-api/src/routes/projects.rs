/// Project endpoints
///
/// - `POST /api/projects` - create a project
/// - `GET /api/projects` - list projects, newest first
/// - `GET /api/projects/:id` - fetch one project
/// - `PUT /api/projects/:id` - partial update
/// - `DELETE /api/projects/:id` - delete a project and its tasks
/// - `GET /api/projects/:id/tasks[?status=]` - tasks of a project, newest first
///
/// The fallback project can be listed and read like any other, but it cannot
/// be deleted or renamed: task ingestion looks it up by name.

use crate::{
    app::AppState,
    error::{ApiError, ApiJson, ApiPath, ApiQuery, ApiResult},
};
use axum::{extract::State, http::StatusCode, Json};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{json, Value};
use synergyhub_shared::models::{
    project::{normalize_members, NewProject, Project, ProjectStatus, UpdateProject},
    task::{Task, TaskStatus},
};
use uuid::Uuid;
use validator::Validate;

/// Create project request
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct CreateProjectRequest {
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    pub description: String,
    pub status: ProjectStatus,
    pub members: Vec<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub image_url: String,
}

/// Update project request; absent fields are left unchanged
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct UpdateProjectRequest {
    #[validate(length(min = 1, message = "name must not be blank"))]
    pub name: Option<String>,
    pub description: Option<String>,
    pub status: Option<ProjectStatus>,
    pub members: Option<Vec<String>>,
    pub start_date: Option<DateTime<Utc>>,
    pub image_url: Option<String>,
}

/// Query for listing a project's tasks
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TaskListQuery {
    pub status: Option<TaskStatus>,
}

fn not_found(id: Uuid) -> ApiError {
    ApiError::NotFound(format!("Project {} not found", id))
}

async fn load_project(state: &AppState, id: Uuid) -> ApiResult<Project> {
    state
        .stores
        .projects
        .find_project(id)
        .await?
        .ok_or_else(|| not_found(id))
}

pub async fn create_project(
    State(state): State<AppState>,
    ApiJson(mut req): ApiJson<CreateProjectRequest>,
) -> ApiResult<(StatusCode, Json<Project>)> {
    req.name = req.name.trim().to_string();
    req.validate()?;

    let project = state
        .stores
        .projects
        .create_project(NewProject {
            name: req.name,
            description: req.description,
            status: req.status,
            members: normalize_members(req.members),
            start_date: req.start_date,
            image_url: req.image_url,
        })
        .await?;

    tracing::info!(project_id = %project.id, name = %project.name, "Project created");
    Ok((StatusCode::CREATED, Json(project)))
}

pub async fn list_projects(State(state): State<AppState>) -> ApiResult<Json<Vec<Project>>> {
    Ok(Json(state.stores.projects.list_projects().await?))
}

pub async fn get_project(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<Project>> {
    Ok(Json(load_project(&state, id).await?))
}

pub async fn update_project(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(mut req): ApiJson<UpdateProjectRequest>,
) -> ApiResult<Json<Project>> {
    req.name = req.name.map(|n| n.trim().to_string());
    req.validate()?;

    let existing = load_project(&state, id).await?;
    if existing.reserved && req.name.as_deref().is_some_and(|n| n != existing.name) {
        return Err(ApiError::BadRequest(
            "The fallback project cannot be renamed".to_string(),
        ));
    }

    let update = UpdateProject {
        name: req.name,
        description: req.description,
        status: req.status,
        members: req.members.map(normalize_members),
        start_date: req.start_date,
        image_url: req.image_url,
    };

    let project = state
        .stores
        .projects
        .update_project(id, update)
        .await?
        .ok_or_else(|| not_found(id))?;

    tracing::info!(project_id = %project.id, "Project updated");
    Ok(Json(project))
}

pub async fn delete_project(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<Value>> {
    let project = load_project(&state, id).await?;
    if project.reserved {
        return Err(ApiError::BadRequest(
            "The fallback project cannot be deleted".to_string(),
        ));
    }

    if !state.stores.projects.delete_project(id).await? {
        return Err(not_found(id));
    }

    tracing::info!(project_id = %id, "Project deleted");
    Ok(Json(json!({ "message": "Project deleted" })))
}

pub async fn list_project_tasks(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiQuery(query): ApiQuery<TaskListQuery>,
) -> ApiResult<Json<Vec<Task>>> {
    load_project(&state, id).await?;

    let tasks = state
        .stores
        .tasks
        .list_tasks_by_project(id, query.status)
        .await?;

    Ok(Json(tasks))
}
