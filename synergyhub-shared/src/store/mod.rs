/// Persistence collaborators
///
/// The ingestion service and the HTTP handlers never talk to the database
/// directly. They go through these traits, each operation of which is
/// individually atomic. Composition across operations is NOT atomic, with one
/// exception: [`ProjectStore::find_or_create_reserved_project`] is a single
/// find-or-create step, so concurrent callers observe one record.
///
/// # Backends
///
/// - [`postgres::PgStore`]: production backend on top of `sqlx`
/// - [`memory::MemoryStore`]: in-process backend for tests and local runs
///
/// # Example
///
/// ```
/// use synergyhub_shared::store::Stores;
/// use synergyhub_shared::models::project::NewProject;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let stores = Stores::memory();
/// let project = stores.projects.create_project(NewProject::named("Docs")).await?;
/// assert!(stores.projects.project_exists(project.id).await?);
/// # Ok(())
/// # }
/// ```

pub mod memory;
pub mod postgres;

use crate::error::StoreError;
use crate::models::{
    project::{NewProject, Project, UpdateProject},
    task::{NewTask, Task, TaskStatus},
    user::{NewUser, User},
};
use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

/// Store result type alias
pub type StoreResult<T> = Result<T, StoreError>;

/// Project persistence
#[async_trait]
pub trait ProjectStore: Send + Sync {
    /// Gets a project by ID
    async fn find_project(&self, id: Uuid) -> StoreResult<Option<Project>>;

    /// Checks whether a project with this ID exists
    async fn project_exists(&self, id: Uuid) -> StoreResult<bool>;

    /// Gets a project by exact name (reserved first, then oldest)
    async fn find_project_by_name(&self, name: &str) -> StoreResult<Option<Project>>;

    /// Creates a regular project
    async fn create_project(&self, data: NewProject) -> StoreResult<Project>;

    /// Returns the reserved project named `data.name`, creating it if absent
    async fn find_or_create_reserved_project(&self, data: NewProject) -> StoreResult<Project>;

    /// Lists all projects, newest first
    async fn list_projects(&self) -> StoreResult<Vec<Project>>;

    /// Updates a project; `None` if it doesn't exist
    async fn update_project(&self, id: Uuid, data: UpdateProject)
        -> StoreResult<Option<Project>>;

    /// Deletes a project and its tasks; `false` if it didn't exist
    async fn delete_project(&self, id: Uuid) -> StoreResult<bool>;
}

/// Identity persistence
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Gets a user by ID
    async fn find_user(&self, id: Uuid) -> StoreResult<Option<User>>;

    /// Gets a user by email (normalized)
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;

    /// Gets a user whose email or username equals `identifier`
    ///
    /// Pure lookup, never has authentication side effects.
    async fn find_user_by_email_or_username(&self, identifier: &str)
        -> StoreResult<Option<User>>;

    /// Creates a user
    ///
    /// Fails with [`StoreError::Conflict`] if the username or email is taken.
    async fn create_user(&self, data: NewUser) -> StoreResult<User>;
}

/// Task persistence
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Inserts a task
    async fn create_task(&self, data: NewTask) -> StoreResult<Task>;

    /// Gets a task by ID
    async fn find_task(&self, id: Uuid) -> StoreResult<Option<Task>>;

    /// Lists a project's tasks, newest first
    async fn list_tasks_by_project(
        &self,
        project_id: Uuid,
        status: Option<TaskStatus>,
    ) -> StoreResult<Vec<Task>>;
}

/// Backend liveness
#[async_trait]
pub trait StoreHealth: Send + Sync {
    /// Succeeds if the backend can serve requests
    async fn ping(&self) -> StoreResult<()>;
}

/// Handles to every store, cheap to clone
#[derive(Clone)]
pub struct Stores {
    pub projects: Arc<dyn ProjectStore>,
    pub users: Arc<dyn UserStore>,
    pub tasks: Arc<dyn TaskStore>,
    pub health: Arc<dyn StoreHealth>,
}

impl Stores {
    /// Uses one backend for every store
    pub fn from_backend<B>(backend: Arc<B>) -> Self
    where
        B: ProjectStore + UserStore + TaskStore + StoreHealth + 'static,
    {
        Self {
            projects: backend.clone(),
            users: backend.clone(),
            tasks: backend.clone(),
            health: backend,
        }
    }

    /// PostgreSQL-backed stores
    pub fn postgres(pool: sqlx::PgPool) -> Self {
        Self::from_backend(Arc::new(postgres::PgStore::new(pool)))
    }

    /// Fresh, empty in-memory stores
    pub fn memory() -> Self {
        Self::from_backend(Arc::new(memory::MemoryStore::new()))
    }
}
