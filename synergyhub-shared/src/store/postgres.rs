/// PostgreSQL store backend
///
/// Thin adapter from the store traits onto the model queries in
/// [`crate::models`]. All rows live in the schema created by
/// `migrations/` (see [`crate::db::migrations`]).

use super::{ProjectStore, StoreHealth, StoreResult, TaskStore, UserStore};
use crate::db::pool::health_check;
use crate::error::StoreError;
use crate::models::{
    project::{NewProject, Project, UpdateProject},
    task::{NewTask, Task, TaskStatus},
    user::{NewUser, User},
};
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

/// Store backed by a PostgreSQL connection pool
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Wraps an existing pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProjectStore for PgStore {
    async fn find_project(&self, id: Uuid) -> StoreResult<Option<Project>> {
        Ok(Project::find_by_id(&self.pool, id).await?)
    }

    async fn project_exists(&self, id: Uuid) -> StoreResult<bool> {
        Ok(Project::exists(&self.pool, id).await?)
    }

    async fn find_project_by_name(&self, name: &str) -> StoreResult<Option<Project>> {
        Ok(Project::find_by_name(&self.pool, name).await?)
    }

    async fn create_project(&self, data: NewProject) -> StoreResult<Project> {
        Ok(Project::create(&self.pool, data).await?)
    }

    async fn find_or_create_reserved_project(&self, data: NewProject) -> StoreResult<Project> {
        Ok(Project::find_or_create_reserved(&self.pool, data).await?)
    }

    async fn list_projects(&self) -> StoreResult<Vec<Project>> {
        Ok(Project::list_recent(&self.pool).await?)
    }

    async fn update_project(
        &self,
        id: Uuid,
        data: UpdateProject,
    ) -> StoreResult<Option<Project>> {
        Ok(Project::update(&self.pool, id, data).await?)
    }

    async fn delete_project(&self, id: Uuid) -> StoreResult<bool> {
        Ok(Project::delete(&self.pool, id).await?)
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn find_user(&self, id: Uuid) -> StoreResult<Option<User>> {
        Ok(User::find_by_id(&self.pool, id).await?)
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        Ok(User::find_by_email(&self.pool, email).await?)
    }

    async fn find_user_by_email_or_username(
        &self,
        identifier: &str,
    ) -> StoreResult<Option<User>> {
        Ok(User::find_by_email_or_username(&self.pool, identifier).await?)
    }

    async fn create_user(&self, data: NewUser) -> StoreResult<User> {
        User::create(&self.pool, data).await.map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                StoreError::Conflict("Email or username already in use".to_string())
            }
            other => StoreError::Database(other),
        })
    }
}

#[async_trait]
impl TaskStore for PgStore {
    async fn create_task(&self, data: NewTask) -> StoreResult<Task> {
        let project_id = data.project_id;
        Task::create(&self.pool, data).await.map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.is_foreign_key_violation() => {
                StoreError::Integrity(format!("project {} does not exist", project_id))
            }
            other => StoreError::Database(other),
        })
    }

    async fn find_task(&self, id: Uuid) -> StoreResult<Option<Task>> {
        Ok(Task::find_by_id(&self.pool, id).await?)
    }

    async fn list_tasks_by_project(
        &self,
        project_id: Uuid,
        status: Option<TaskStatus>,
    ) -> StoreResult<Vec<Task>> {
        Ok(Task::list_by_project(&self.pool, project_id, status).await?)
    }
}

#[async_trait]
impl StoreHealth for PgStore {
    async fn ping(&self) -> StoreResult<()> {
        Ok(health_check(&self.pool).await?)
    }
}
