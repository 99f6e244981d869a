/// In-memory store backend
///
/// Keeps every record in process memory behind a single `tokio::sync::RwLock`.
/// Semantics match [`super::postgres::PgStore`]:
///
/// - usernames and emails are unique, emails stored lowercase
/// - a task must reference an existing project
/// - deleting a project deletes its tasks
/// - at most one reserved project per name
///
/// Listing order is insertion order reversed, which is newest first.
///
/// [`MemoryStore::set_unavailable`] makes every operation fail, for exercising
/// error paths.

use super::{ProjectStore, StoreHealth, StoreResult, TaskStore, UserStore};
use crate::error::StoreError;
use crate::models::{
    project::{NewProject, Project, UpdateProject},
    task::{NewTask, Task, TaskStatus},
    user::{normalize_email, NewUser, User},
};
use async_trait::async_trait;
use chrono::Utc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Debug, Default)]
struct State {
    projects: Vec<Project>,
    users: Vec<User>,
    tasks: Vec<Task>,
}

/// Store holding all records in memory
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<State>,
    unavailable: AtomicBool,
}

impl MemoryStore {
    /// Creates an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent operation fail with [`StoreError::Unavailable`]
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Number of stored projects
    pub async fn project_count(&self) -> usize {
        self.state.read().await.projects.len()
    }

    /// Number of stored tasks
    pub async fn task_count(&self) -> usize {
        self.state.read().await.tasks.len()
    }

    fn check_available(&self) -> StoreResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            Err(StoreError::Unavailable)
        } else {
            Ok(())
        }
    }

    fn build_project(data: NewProject, reserved: bool) -> Project {
        let now = Utc::now();
        Project {
            id: Uuid::new_v4(),
            name: data.name,
            description: data.description,
            status: data.status,
            members: data.members,
            start_date: data.start_date.unwrap_or(now),
            image_url: data.image_url,
            reserved,
            created_at: now,
            updated_at: now,
        }
    }
}

#[async_trait]
impl ProjectStore for MemoryStore {
    async fn find_project(&self, id: Uuid) -> StoreResult<Option<Project>> {
        self.check_available()?;
        let state = self.state.read().await;
        Ok(state.projects.iter().find(|p| p.id == id).cloned())
    }

    async fn project_exists(&self, id: Uuid) -> StoreResult<bool> {
        self.check_available()?;
        let state = self.state.read().await;
        Ok(state.projects.iter().any(|p| p.id == id))
    }

    async fn find_project_by_name(&self, name: &str) -> StoreResult<Option<Project>> {
        self.check_available()?;
        let state = self.state.read().await;
        let mut matches = state.projects.iter().filter(|p| p.name == name);
        let first = matches.clone().find(|p| p.reserved).or_else(|| matches.next());
        Ok(first.cloned())
    }

    async fn create_project(&self, data: NewProject) -> StoreResult<Project> {
        self.check_available()?;
        let project = Self::build_project(data, false);
        self.state.write().await.projects.push(project.clone());
        Ok(project)
    }

    async fn find_or_create_reserved_project(&self, data: NewProject) -> StoreResult<Project> {
        self.check_available()?;
        // Lookup and insert under one write guard
        let mut state = self.state.write().await;
        if let Some(existing) = state
            .projects
            .iter()
            .find(|p| p.reserved && p.name == data.name)
        {
            return Ok(existing.clone());
        }

        let project = Self::build_project(data, true);
        state.projects.push(project.clone());
        Ok(project)
    }

    async fn list_projects(&self) -> StoreResult<Vec<Project>> {
        self.check_available()?;
        let state = self.state.read().await;
        Ok(state.projects.iter().rev().cloned().collect())
    }

    async fn update_project(
        &self,
        id: Uuid,
        data: UpdateProject,
    ) -> StoreResult<Option<Project>> {
        self.check_available()?;
        let mut state = self.state.write().await;
        let Some(project) = state.projects.iter_mut().find(|p| p.id == id) else {
            return Ok(None);
        };

        data.apply_to(project);
        project.updated_at = Utc::now();
        Ok(Some(project.clone()))
    }

    async fn delete_project(&self, id: Uuid) -> StoreResult<bool> {
        self.check_available()?;
        let mut state = self.state.write().await;
        let before = state.projects.len();
        state.projects.retain(|p| p.id != id);
        if state.projects.len() == before {
            return Ok(false);
        }

        state.tasks.retain(|t| t.project_id != id);
        Ok(true)
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_user(&self, id: Uuid) -> StoreResult<Option<User>> {
        self.check_available()?;
        let state = self.state.read().await;
        Ok(state.users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        self.check_available()?;
        let email = normalize_email(email);
        let state = self.state.read().await;
        Ok(state.users.iter().find(|u| u.email == email).cloned())
    }

    async fn find_user_by_email_or_username(
        &self,
        identifier: &str,
    ) -> StoreResult<Option<User>> {
        self.check_available()?;
        let email = normalize_email(identifier);
        let state = self.state.read().await;
        let found = state
            .users
            .iter()
            .find(|u| u.email == email)
            .or_else(|| state.users.iter().find(|u| u.username == identifier));
        Ok(found.cloned())
    }

    async fn create_user(&self, data: NewUser) -> StoreResult<User> {
        self.check_available()?;
        let mut state = self.state.write().await;
        if state
            .users
            .iter()
            .any(|u| u.email == data.email || u.username == data.username)
        {
            return Err(StoreError::Conflict(
                "Email or username already in use".to_string(),
            ));
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            username: data.username,
            email: data.email,
            password_hash: data.password_hash,
            job_title: data.job_title,
            department: data.department,
            created_at: now,
            updated_at: now,
        };
        state.users.push(user.clone());
        Ok(user)
    }
}

#[async_trait]
impl TaskStore for MemoryStore {
    async fn create_task(&self, data: NewTask) -> StoreResult<Task> {
        self.check_available()?;
        let mut state = self.state.write().await;
        if !state.projects.iter().any(|p| p.id == data.project_id) {
            return Err(StoreError::Integrity(format!(
                "project {} does not exist",
                data.project_id
            )));
        }

        let now = Utc::now();
        let task = Task {
            id: Uuid::new_v4(),
            project_id: data.project_id,
            title: data.title,
            status: data.status,
            due_date: data.due_date,
            assignee: data.assignee,
            description: data.description,
            tags: data.tags,
            image: data.image,
            created_at: now,
            updated_at: now,
        };
        state.tasks.push(task.clone());
        Ok(task)
    }

    async fn find_task(&self, id: Uuid) -> StoreResult<Option<Task>> {
        self.check_available()?;
        let state = self.state.read().await;
        Ok(state.tasks.iter().find(|t| t.id == id).cloned())
    }

    async fn list_tasks_by_project(
        &self,
        project_id: Uuid,
        status: Option<TaskStatus>,
    ) -> StoreResult<Vec<Task>> {
        self.check_available()?;
        let state = self.state.read().await;
        Ok(state
            .tasks
            .iter()
            .rev()
            .filter(|t| t.project_id == project_id)
            .filter(|t| status.map_or(true, |s| t.status == s))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl StoreHealth for MemoryStore {
    async fn ping(&self) -> StoreResult<()> {
        self.check_available()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn new_task(project_id: Uuid, title: &str, status: TaskStatus) -> NewTask {
        NewTask {
            project_id,
            title: title.to_string(),
            status,
            due_date: None,
            assignee: String::new(),
            description: String::new(),
            tags: vec![],
            image: String::new(),
        }
    }

    #[tokio::test]
    async fn test_create_user_rejects_duplicates() {
        let store = MemoryStore::new();
        store
            .create_user(NewUser::new("alice", "alice@example.com", "h"))
            .await
            .unwrap();

        let dup_email = store
            .create_user(NewUser::new("alice2", "ALICE@example.com", "h"))
            .await;
        assert!(matches!(dup_email, Err(StoreError::Conflict(_))));

        let dup_username = store
            .create_user(NewUser::new("alice", "other@example.com", "h"))
            .await;
        assert!(matches!(dup_username, Err(StoreError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_find_user_by_email_or_username() {
        let store = MemoryStore::new();
        let user = store
            .create_user(NewUser::new("bob", "bob@example.com", "h"))
            .await
            .unwrap();

        let by_email = store.find_user_by_email_or_username("Bob@Example.com").await.unwrap();
        assert_eq!(by_email.map(|u| u.id), Some(user.id));

        let by_username = store.find_user_by_email_or_username("bob").await.unwrap();
        assert_eq!(by_username.map(|u| u.id), Some(user.id));

        assert!(store.find_user_by_email_or_username("carol").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_create_task_requires_existing_project() {
        let store = MemoryStore::new();
        let result = store
            .create_task(new_task(Uuid::new_v4(), "orphan", TaskStatus::Todo))
            .await;
        assert!(matches!(result, Err(StoreError::Integrity(_))));
        assert_eq!(store.task_count().await, 0);
    }

    #[tokio::test]
    async fn test_delete_project_cascades_tasks() {
        let store = MemoryStore::new();
        let project = store.create_project(NewProject::named("P")).await.unwrap();
        store
            .create_task(new_task(project.id, "t", TaskStatus::Todo))
            .await
            .unwrap();

        assert!(store.delete_project(project.id).await.unwrap());
        assert_eq!(store.task_count().await, 0);
        assert!(!store.delete_project(project.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_list_tasks_newest_first_with_filter() {
        let store = MemoryStore::new();
        let project = store.create_project(NewProject::named("P")).await.unwrap();
        for (title, status) in [
            ("first", TaskStatus::Todo),
            ("second", TaskStatus::Done),
            ("third", TaskStatus::Todo),
        ] {
            store
                .create_task(new_task(project.id, title, status))
                .await
                .unwrap();
        }

        let all = store.list_tasks_by_project(project.id, None).await.unwrap();
        let titles: Vec<_> = all.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["third", "second", "first"]);

        let todo = store
            .list_tasks_by_project(project.id, Some(TaskStatus::Todo))
            .await
            .unwrap();
        assert_eq!(todo.len(), 2);
    }

    #[tokio::test]
    async fn test_find_by_name_prefers_reserved() {
        let store = MemoryStore::new();
        store.create_project(NewProject::named("Shared")).await.unwrap();
        let reserved = store
            .find_or_create_reserved_project(NewProject::named("Shared"))
            .await
            .unwrap();

        let found = store.find_project_by_name("Shared").await.unwrap().unwrap();
        assert_eq!(found.id, reserved.id);
        assert!(found.reserved);
    }

    #[tokio::test]
    async fn test_reserved_project_created_once_under_contention() {
        let store = Arc::new(MemoryStore::new());

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let store = store.clone();
                tokio::spawn(async move {
                    store
                        .find_or_create_reserved_project(NewProject::fallback())
                        .await
                        .unwrap()
                        .id
                })
            })
            .collect();

        let ids: Vec<Uuid> = futures::future::join_all(handles)
            .await
            .into_iter()
            .map(|r| r.unwrap())
            .collect();

        assert!(ids.windows(2).all(|w| w[0] == w[1]));
        assert_eq!(store.project_count().await, 1);
    }

    #[tokio::test]
    async fn test_unavailable_store_fails_every_call() {
        let store = MemoryStore::new();
        store.set_unavailable(true);

        assert!(matches!(store.ping().await, Err(StoreError::Unavailable)));
        assert!(store.list_projects().await.is_err());

        store.set_unavailable(false);
        assert!(store.ping().await.is_ok());
    }
}
