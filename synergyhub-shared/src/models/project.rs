/// Project model and database operations
///
/// Projects own tasks. One project is special: the fallback project, named
/// [`FALLBACK_PROJECT_NAME`], owns every task whose client-supplied project
/// reference could not be resolved. It is flagged `reserved` and a unique
/// partial index guarantees there is at most one reserved project per name.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE project_status AS ENUM ('active', 'archived');
///
/// CREATE TABLE projects (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     name TEXT NOT NULL,
///     description TEXT NOT NULL DEFAULT '',
///     status project_status NOT NULL DEFAULT 'active',
///     members TEXT[] NOT NULL DEFAULT '{}',
///     start_date TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     image_url TEXT NOT NULL DEFAULT '',
///     reserved BOOLEAN NOT NULL DEFAULT FALSE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
///
/// CREATE UNIQUE INDEX idx_projects_reserved_name ON projects (name) WHERE reserved;
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Name of the catch-all project for tasks without a usable project reference
pub const FALLBACK_PROJECT_NAME: &str = "Unassigned Project";

/// Description given to the fallback project when it is created
pub const FALLBACK_PROJECT_DESCRIPTION: &str =
    "Fallback project for tasks without a valid projectId";

/// Project lifecycle status
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type,
)]
#[sqlx(type_name = "project_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ProjectStatus {
    #[default]
    Active,
    Archived,
}

/// Project record as persisted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    /// Unique project ID
    pub id: Uuid,

    /// Trimmed, non-empty name
    pub name: String,

    pub description: String,

    pub status: ProjectStatus,

    /// Member identifiers (email or username)
    pub members: Vec<String>,

    pub start_date: DateTime<Utc>,

    pub image_url: String,

    /// True only for the fallback project
    pub reserved: bool,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

/// Input for creating a project
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewProject {
    pub name: String,
    pub description: String,
    pub status: ProjectStatus,
    pub members: Vec<String>,

    /// Defaults to the creation time when `None`
    pub start_date: Option<DateTime<Utc>>,

    pub image_url: String,
}

impl NewProject {
    /// Creates input with the given name and defaults everywhere else
    pub fn named(name: &str) -> Self {
        Self {
            name: name.trim().to_string(),
            description: String::new(),
            status: ProjectStatus::Active,
            members: Vec::new(),
            start_date: None,
            image_url: String::new(),
        }
    }

    /// Input for the fallback project
    pub fn fallback() -> Self {
        Self {
            description: FALLBACK_PROJECT_DESCRIPTION.to_string(),
            ..Self::named(FALLBACK_PROJECT_NAME)
        }
    }
}

/// Input for updating a project
///
/// Only `Some` fields are written.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateProject {
    pub name: Option<String>,
    pub description: Option<String>,
    pub status: Option<ProjectStatus>,
    pub members: Option<Vec<String>>,
    pub start_date: Option<DateTime<Utc>>,
    pub image_url: Option<String>,
}

impl UpdateProject {
    /// Applies this update to an in-memory project
    pub fn apply_to(&self, project: &mut Project) {
        if let Some(name) = &self.name {
            project.name = name.clone();
        }
        if let Some(description) = &self.description {
            project.description = description.clone();
        }
        if let Some(status) = self.status {
            project.status = status;
        }
        if let Some(members) = &self.members {
            project.members = members.clone();
        }
        if let Some(start_date) = self.start_date {
            project.start_date = start_date;
        }
        if let Some(image_url) = &self.image_url {
            project.image_url = image_url.clone();
        }
    }
}

/// Trims member identifiers and drops empty ones
pub fn normalize_members(members: Vec<String>) -> Vec<String> {
    members
        .into_iter()
        .map(|m| m.trim().to_string())
        .filter(|m| !m.is_empty())
        .collect()
}

impl Project {
    /// Inserts a regular (non-reserved) project
    pub async fn create(pool: &PgPool, data: NewProject) -> Result<Self, sqlx::Error> {
        let project = sqlx::query_as::<_, Project>(
            r#"
            INSERT INTO projects (name, description, status, members, start_date, image_url)
            VALUES ($1, $2, $3, $4, COALESCE($5, NOW()), $6)
            RETURNING id, name, description, status, members, start_date, image_url,
                      reserved, created_at, updated_at
            "#,
        )
        .bind(data.name)
        .bind(data.description)
        .bind(data.status)
        .bind(data.members)
        .bind(data.start_date)
        .bind(data.image_url)
        .fetch_one(pool)
        .await?;

        Ok(project)
    }

    /// Returns the reserved project with `data.name`, creating it if needed
    ///
    /// Single statement upsert against `idx_projects_reserved_name`, so
    /// concurrent callers always get the same row. The no-op `DO UPDATE` is
    /// what makes `RETURNING` yield the existing row on conflict.
    pub async fn find_or_create_reserved(
        pool: &PgPool,
        data: NewProject,
    ) -> Result<Self, sqlx::Error> {
        let project = sqlx::query_as::<_, Project>(
            r#"
            INSERT INTO projects (name, description, status, members, start_date, image_url, reserved)
            VALUES ($1, $2, $3, $4, COALESCE($5, NOW()), $6, TRUE)
            ON CONFLICT (name) WHERE reserved DO UPDATE SET name = EXCLUDED.name
            RETURNING id, name, description, status, members, start_date, image_url,
                      reserved, created_at, updated_at
            "#,
        )
        .bind(data.name)
        .bind(data.description)
        .bind(data.status)
        .bind(data.members)
        .bind(data.start_date)
        .bind(data.image_url)
        .fetch_one(pool)
        .await?;

        Ok(project)
    }

    /// Finds a project by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let project = sqlx::query_as::<_, Project>(
            r#"
            SELECT id, name, description, status, members, start_date, image_url,
                   reserved, created_at, updated_at
            FROM projects
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(project)
    }

    /// Checks whether a project exists
    pub async fn exists(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let (exists,): (bool,) =
            sqlx::query_as("SELECT EXISTS(SELECT 1 FROM projects WHERE id = $1)")
                .bind(id)
                .fetch_one(pool)
                .await?;

        Ok(exists)
    }

    /// Finds a project by exact name
    ///
    /// Names are not unique. A reserved project wins, then the oldest.
    pub async fn find_by_name(pool: &PgPool, name: &str) -> Result<Option<Self>, sqlx::Error> {
        let project = sqlx::query_as::<_, Project>(
            r#"
            SELECT id, name, description, status, members, start_date, image_url,
                   reserved, created_at, updated_at
            FROM projects
            WHERE name = $1
            ORDER BY reserved DESC, created_at ASC
            LIMIT 1
            "#,
        )
        .bind(name)
        .fetch_optional(pool)
        .await?;

        Ok(project)
    }

    /// Lists all projects, newest first
    pub async fn list_recent(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        let projects = sqlx::query_as::<_, Project>(
            r#"
            SELECT id, name, description, status, members, start_date, image_url,
                   reserved, created_at, updated_at
            FROM projects
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(pool)
        .await?;

        Ok(projects)
    }

    /// Updates an existing project
    ///
    /// Only `Some` fields are written; `updated_at` is always bumped.
    /// Returns `None` if the project doesn't exist.
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateProject,
    ) -> Result<Option<Self>, sqlx::Error> {
        // Build dynamic update query based on which fields are present
        let mut query = String::from("UPDATE projects SET updated_at = NOW()");
        let mut bind_count = 1;

        if data.name.is_some() {
            bind_count += 1;
            query.push_str(&format!(", name = ${}", bind_count));
        }
        if data.description.is_some() {
            bind_count += 1;
            query.push_str(&format!(", description = ${}", bind_count));
        }
        if data.status.is_some() {
            bind_count += 1;
            query.push_str(&format!(", status = ${}", bind_count));
        }
        if data.members.is_some() {
            bind_count += 1;
            query.push_str(&format!(", members = ${}", bind_count));
        }
        if data.start_date.is_some() {
            bind_count += 1;
            query.push_str(&format!(", start_date = ${}", bind_count));
        }
        if data.image_url.is_some() {
            bind_count += 1;
            query.push_str(&format!(", image_url = ${}", bind_count));
        }

        query.push_str(
            " WHERE id = $1 RETURNING id, name, description, status, members, start_date, \
             image_url, reserved, created_at, updated_at",
        );

        let mut q = sqlx::query_as::<_, Project>(&query).bind(id);

        if let Some(name) = data.name {
            q = q.bind(name);
        }
        if let Some(description) = data.description {
            q = q.bind(description);
        }
        if let Some(status) = data.status {
            q = q.bind(status);
        }
        if let Some(members) = data.members {
            q = q.bind(members);
        }
        if let Some(start_date) = data.start_date {
            q = q.bind(start_date);
        }
        if let Some(image_url) = data.image_url {
            q = q.bind(image_url);
        }

        let project = q.fetch_optional(pool).await?;

        Ok(project)
    }

    /// Deletes a project by ID
    ///
    /// ⚠️  Tasks owned by the project are deleted too (CASCADE).
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
