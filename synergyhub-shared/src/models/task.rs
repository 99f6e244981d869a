/// Task model and database operations
///
/// A task is one unit of work inside a project. Tasks are only created through
/// the ingestion service (`crate::ingest`), which guarantees that `project_id`
/// points at a project that exists when the row is written.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE task_status AS ENUM ('todo', 'in-progress', 'done');
///
/// CREATE TABLE tasks (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     project_id UUID NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
///     title TEXT NOT NULL,
///     status task_status NOT NULL DEFAULT 'todo',
///     due_date TIMESTAMPTZ,
///     assignee TEXT NOT NULL DEFAULT '',
///     description TEXT NOT NULL DEFAULT '',
///     tags TEXT[] NOT NULL DEFAULT '{}',
///     image TEXT NOT NULL DEFAULT '',
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::fmt;
use uuid::Uuid;

/// Task workflow status
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type,
)]
#[sqlx(type_name = "task_status", rename_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
    /// Not started yet
    #[default]
    Todo,

    /// Being worked on
    InProgress,

    /// Finished
    Done,
}

impl TaskStatus {
    /// Wire/database representation
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Todo => "todo",
            TaskStatus::InProgress => "in-progress",
            TaskStatus::Done => "done",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Task record as persisted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Unique task ID
    pub id: Uuid,

    /// Owning project (never dangling at creation time)
    pub project_id: Uuid,

    /// Trimmed, non-empty title
    pub title: String,

    /// Workflow status
    pub status: TaskStatus,

    /// Optional deadline
    pub due_date: Option<DateTime<Utc>>,

    /// Email or username of the assignee, possibly empty
    pub assignee: String,

    /// Free-form description
    pub description: String,

    /// Normalized tags, order preserved
    pub tags: Vec<String>,

    /// Image URL or path
    pub image: String,

    /// When the task was created
    pub created_at: DateTime<Utc>,

    /// When the task was last updated
    pub updated_at: DateTime<Utc>,
}

/// Fully resolved input for inserting a task
///
/// Built by the ingestion service after project/assignee resolution and
/// tag normalization. Nothing here is re-validated by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTask {
    pub project_id: Uuid,
    pub title: String,
    pub status: TaskStatus,
    pub due_date: Option<DateTime<Utc>>,
    pub assignee: String,
    pub description: String,
    pub tags: Vec<String>,
    pub image: String,
}

impl Task {
    /// Inserts a new task
    ///
    /// # Errors
    ///
    /// Returns an error if the project does not exist (foreign key) or the
    /// database operation fails
    pub async fn create(pool: &PgPool, data: NewTask) -> Result<Self, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            INSERT INTO tasks (project_id, title, status, due_date, assignee,
                               description, tags, image)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, project_id, title, status, due_date, assignee,
                      description, tags, image, created_at, updated_at
            "#,
        )
        .bind(data.project_id)
        .bind(data.title)
        .bind(data.status)
        .bind(data.due_date)
        .bind(data.assignee)
        .bind(data.description)
        .bind(data.tags)
        .bind(data.image)
        .fetch_one(pool)
        .await?;

        Ok(task)
    }

    /// Finds a task by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, project_id, title, status, due_date, assignee,
                   description, tags, image, created_at, updated_at
            FROM tasks
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }

    /// Lists tasks of a project, newest first, optionally filtered by status
    pub async fn list_by_project(
        pool: &PgPool,
        project_id: Uuid,
        status: Option<TaskStatus>,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let tasks = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, project_id, title, status, due_date, assignee,
                   description, tags, image, created_at, updated_at
            FROM tasks
            WHERE project_id = $1 AND ($2::task_status IS NULL OR status = $2)
            ORDER BY created_at DESC
            "#,
        )
        .bind(project_id)
        .bind(status)
        .fetch_all(pool)
        .await?;

        Ok(tasks)
    }
}
