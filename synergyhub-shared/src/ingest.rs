//! Task ingestion
//!
//! Turns an untrusted task-creation request into a persisted [`Task`]:
//!
//! ```text
//! TaskInput
//!   ├─> validate title            (blank/missing -> ServiceError::Validation)
//!   ├─> resolve project           (provided id, else the fallback project)
//!   ├─> resolve assignee          (email/username -> canonical email)
//!   ├─> normalize tags, due date
//!   └─> TaskStore::create_task    (exactly one write)
//! ```
//!
//! Nothing is retried. Issuing the same request twice creates two tasks.
//!
//! # Fallback project
//!
//! A task whose `projectId` is missing, malformed, or unknown is owned by the
//! project named [`FALLBACK_PROJECT_NAME`]. It is created on first use through
//! [`ProjectStore::find_or_create_reserved_project`], which is atomic per
//! backend, so concurrent ingestions never produce two fallback projects.
//! [`IngestService::ensure_fallback_project`] is meant to be called once at
//! startup so steady-state requests only read it.
//!
//! # Example
//!
//! ```
//! use synergyhub_shared::ingest::{IngestService, TaskInput};
//! use synergyhub_shared::store::Stores;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let service = IngestService::new(&Stores::memory());
//!
//! let outcome = service
//!     .ingest(TaskInput {
//!         title: Some("Write release notes".to_string()),
//!         ..Default::default()
//!     })
//!     .await?;
//!
//! assert!(outcome.resolution.is_fallback());
//! # Ok(())
//! # }
//! ```

use crate::error::{ServiceError, ServiceResult};
use crate::models::{
    project::{NewProject, Project, FALLBACK_PROJECT_NAME},
    task::{NewTask, Task, TaskStatus},
    user::UserProfile,
};
use crate::store::{ProjectStore, Stores, TaskStore, UserStore};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::Deserialize;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Task-creation request body
///
/// Every field is optional at the type level so that a missing title is
/// reported as a validation error rather than a decoding error. Unknown
/// fields and mistyped values are rejected during deserialization.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TaskInput {
    /// Requested owning project; expected to be a UUID string
    pub project_id: Option<String>,

    /// Required, must be non-blank
    pub title: Option<String>,

    /// Defaults to `todo`
    pub status: Option<TaskStatus>,

    pub due_date: Option<DueDateInput>,

    /// Email or username
    pub assignee: Option<String>,

    pub description: Option<String>,

    pub tags: Option<TagsInput>,

    pub image: Option<String>,
}

/// Tags as accepted on the wire
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum TagsInput {
    /// `["a", "b"]`
    List(Vec<String>),

    /// `"a, b"`
    Csv(String),
}

/// Due date as accepted on the wire
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum DueDateInput {
    /// Epoch milliseconds
    EpochMillis(i64),

    /// RFC 3339, `YYYY-MM-DDTHH:MM[:SS]` or `YYYY-MM-DD`, all UTC
    Text(String),
}

/// Why a task ended up in the fallback project
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackReason {
    /// No `projectId` (or a blank one) was supplied
    Missing,

    /// `projectId` is not a valid identifier
    Malformed,

    /// `projectId` is well-formed but no such project exists
    NotFound,
}

impl fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FallbackReason::Missing => "missing",
            FallbackReason::Malformed => "malformed",
            FallbackReason::NotFound => "not_found",
        })
    }
}

/// How the owning project was chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectResolution {
    /// The requested project exists and was used
    Provided(Uuid),

    /// The fallback project was used
    Fallback { project_id: Uuid, reason: FallbackReason },
}

impl ProjectResolution {
    /// Project the task is attached to
    pub fn project_id(&self) -> Uuid {
        match *self {
            ProjectResolution::Provided(id) => id,
            ProjectResolution::Fallback { project_id, .. } => project_id,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, ProjectResolution::Fallback { .. })
    }
}

/// Result of a successful ingestion
#[derive(Debug, Clone)]
pub struct IngestOutcome {
    /// The persisted task
    pub task: Task,

    /// Public profile of the matched assignee, if any
    pub assignee_user: Option<UserProfile>,

    /// How the owning project was chosen
    pub resolution: ProjectResolution,
}

/// Validate-resolve-normalize-persist pipeline for new tasks
#[derive(Clone)]
pub struct IngestService {
    projects: Arc<dyn ProjectStore>,
    users: Arc<dyn UserStore>,
    tasks: Arc<dyn TaskStore>,
}

impl IngestService {
    /// Creates a service over the given stores
    pub fn new(stores: &Stores) -> Self {
        Self {
            projects: stores.projects.clone(),
            users: stores.users.clone(),
            tasks: stores.tasks.clone(),
        }
    }

    /// Ingests one task-creation request
    ///
    /// # Errors
    ///
    /// - `ServiceError::Validation` if the title is missing or blank; nothing
    ///   is written in that case
    /// - `ServiceError::Internal` if any store operation fails
    pub async fn ingest(&self, input: TaskInput) -> ServiceResult<IngestOutcome> {
        let title = input
            .title
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ServiceError::Validation("title is required".to_string()))?
            .to_string();

        let resolution = self.resolve_project(input.project_id.as_deref()).await?;
        let (assignee, assignee_user) = self.resolve_assignee(input.assignee.as_deref()).await?;

        let due_date = input.due_date.as_ref().and_then(|raw| {
            let parsed = parse_due_date(raw);
            if parsed.is_none() {
                warn!(due_date = ?raw, "Ignoring unparseable dueDate");
            }
            parsed
        });

        let new_task = NewTask {
            project_id: resolution.project_id(),
            title,
            status: input.status.unwrap_or_default(),
            due_date,
            assignee,
            description: input.description.unwrap_or_default(),
            tags: normalize_tags(input.tags),
            image: input.image.unwrap_or_default(),
        };

        let task = self.tasks.create_task(new_task).await.map_err(|e| {
            error!(error = %e, project_id = %resolution.project_id(), "Failed to create task");
            ServiceError::from(e)
        })?;

        info!(
            task_id = %task.id,
            project_id = %task.project_id,
            fallback = resolution.is_fallback(),
            assignee_matched = assignee_user.is_some(),
            "Task created"
        );

        Ok(IngestOutcome {
            task,
            assignee_user,
            resolution,
        })
    }

    /// Picks the owning project for a requested `projectId`
    ///
    /// Uses the requested project when it parses and exists, the fallback
    /// project otherwise.
    pub async fn resolve_project(
        &self,
        requested: Option<&str>,
    ) -> ServiceResult<ProjectResolution> {
        let requested = requested.map(str::trim).filter(|s| !s.is_empty());

        let reason = match requested {
            None => FallbackReason::Missing,
            Some(raw) => match Uuid::parse_str(raw) {
                Err(_) => FallbackReason::Malformed,
                Ok(id) => {
                    if self.projects.project_exists(id).await? {
                        return Ok(ProjectResolution::Provided(id));
                    }
                    FallbackReason::NotFound
                }
            },
        };

        let fallback = self.fallback_project().await?;

        match reason {
            FallbackReason::NotFound => warn!(
                requested_project_id = requested.unwrap_or_default(),
                fallback_project_id = %fallback.id,
                "Provided projectId not found, using fallback project"
            ),
            FallbackReason::Malformed => warn!(
                requested_project_id = requested.unwrap_or_default(),
                fallback_project_id = %fallback.id,
                "Provided projectId is malformed, using fallback project"
            ),
            FallbackReason::Missing => debug!(
                fallback_project_id = %fallback.id,
                "No projectId provided, using fallback project"
            ),
        }

        Ok(ProjectResolution::Fallback {
            project_id: fallback.id,
            reason,
        })
    }

    /// Returns the fallback project, creating it on first use
    pub async fn fallback_project(&self) -> ServiceResult<Project> {
        if let Some(existing) = self.projects.find_project_by_name(FALLBACK_PROJECT_NAME).await? {
            return Ok(existing);
        }

        let project = self
            .projects
            .find_or_create_reserved_project(NewProject::fallback())
            .await?;
        info!(project_id = %project.id, name = %project.name, "Fallback project ready");
        Ok(project)
    }

    /// Resolves (creating if needed) the fallback project ahead of traffic
    pub async fn ensure_fallback_project(&self) -> ServiceResult<Project> {
        let project = self.fallback_project().await?;
        info!(project_id = %project.id, "Fallback project ensured at startup");
        Ok(project)
    }

    /// Maps an assignee identifier to the value stored on the task
    ///
    /// Returns the stored value and, when the identifier matched a user, that
    /// user's public profile.
    pub async fn resolve_assignee(
        &self,
        assignee: Option<&str>,
    ) -> ServiceResult<(String, Option<UserProfile>)> {
        let Some(raw) = assignee.map(str::trim).filter(|a| !a.is_empty()) else {
            return Ok((String::new(), None));
        };

        match self.users.find_user_by_email_or_username(raw).await? {
            Some(user) => {
                debug!(user_id = %user.id, "Assignee resolved to existing user");
                Ok((user.canonical_identifier().to_string(), Some(user.profile())))
            }
            None => {
                debug!(assignee = raw, "Assignee does not match any user, storing as given");
                Ok((raw.to_string(), None))
            }
        }
    }
}

/// Trims tags and drops empty ones
///
/// A string is split on commas first.
pub fn normalize_tags(tags: Option<TagsInput>) -> Vec<String> {
    let clean = |t: &str| {
        let t = t.trim();
        (!t.is_empty()).then(|| t.to_string())
    };

    match tags {
        Some(TagsInput::List(list)) => list.iter().filter_map(|t| clean(t)).collect(),
        Some(TagsInput::Csv(csv)) => csv.split(',').filter_map(clean).collect(),
        None => Vec::new(),
    }
}

/// Parses a due date; `None` when the value cannot be interpreted
pub fn parse_due_date(input: &DueDateInput) -> Option<DateTime<Utc>> {
    let raw = match input {
        DueDateInput::EpochMillis(ms) => return DateTime::from_timestamp_millis(*ms),
        DueDateInput::Text(raw) => raw.trim(),
    };

    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
