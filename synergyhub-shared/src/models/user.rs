/// User model and database operations
///
/// Users sign up with a unique username and a unique email. Emails are stored
/// lowercase so lookups by email are effectively case-insensitive. Passwords
/// are stored as Argon2id hashes, never in plaintext.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE users (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     username TEXT NOT NULL UNIQUE,
///     email TEXT NOT NULL UNIQUE,
///     password_hash TEXT NOT NULL,
///     job_title TEXT NOT NULL DEFAULT '',
///     department TEXT NOT NULL DEFAULT '',
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use synergyhub_shared::models::user::{User, NewUser};
/// use synergyhub_shared::db::pool::{create_pool, DatabaseConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// let user = User::create(&pool, NewUser::new("alice", "Alice@Example.com", "$argon2id$...")).await?;
/// assert_eq!(user.email, "alice@example.com");
///
/// let found = User::find_by_email_or_username(&pool, "alice").await?;
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// User model representing an account
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Unique user ID
    pub id: Uuid,

    /// Unique handle
    pub username: String,

    /// Unique email address, stored lowercase
    pub email: String,

    /// Argon2id password hash
    ///
    /// Never serialized. Use [`User::profile`] for anything sent to clients.
    #[serde(skip_serializing, default)]
    pub password_hash: String,

    /// Job title shown on the profile
    pub job_title: String,

    /// Department shown on the profile
    pub department: String,

    /// When the account was created
    pub created_at: DateTime<Utc>,

    /// When the account was last updated
    pub updated_at: DateTime<Utc>,
}

/// Public view of a user: the account minus credential fields
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub job_title: String,
    pub department: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewUser {
    /// Trimmed username
    pub username: String,

    /// Trimmed, lowercased email
    pub email: String,

    /// Argon2id password hash (NOT plaintext password!)
    pub password_hash: String,

    pub job_title: String,

    pub department: String,
}

impl NewUser {
    /// Builds a user input, normalizing username and email
    pub fn new(username: &str, email: &str, password_hash: impl Into<String>) -> Self {
        Self {
            username: username.trim().to_string(),
            email: normalize_email(email),
            password_hash: password_hash.into(),
            job_title: String::new(),
            department: String::new(),
        }
    }

    /// Sets profile fields
    pub fn with_profile(mut self, job_title: &str, department: &str) -> Self {
        self.job_title = job_title.trim().to_string();
        self.department = department.trim().to_string();
        self
    }
}

/// Canonical form of an email address for storage and lookup
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

impl User {
    /// Returns the public profile of this user
    pub fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.id,
            username: self.username.clone(),
            email: self.email.clone(),
            job_title: self.job_title.clone(),
            department: self.department.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    /// Canonical identifier used when this user is assigned a task
    ///
    /// The email, or the username when the email is empty.
    pub fn canonical_identifier(&self) -> &str {
        if self.email.is_empty() {
            &self.username
        } else {
            &self.email
        }
    }

    /// Creates a new user in the database
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Username or email already exists (unique constraint violation)
    /// - Database connection fails
    pub async fn create(pool: &PgPool, data: NewUser) -> Result<Self, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, email, password_hash, job_title, department)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, username, email, password_hash, job_title, department,
                      created_at, updated_at
            "#,
        )
        .bind(data.username)
        .bind(data.email)
        .bind(data.password_hash)
        .bind(data.job_title)
        .bind(data.department)
        .fetch_one(pool)
        .await?;

        Ok(user)
    }

    /// Finds a user by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, password_hash, job_title, department,
                   created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Finds a user by email address
    ///
    /// The lookup value is normalized the same way stored emails are.
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, password_hash, job_title, department,
                   created_at, updated_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(normalize_email(email))
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Finds a user whose email or username equals `identifier`
    ///
    /// Email is matched after normalization, username exactly. When one user's
    /// email and another user's username both match, the email match wins.
    pub async fn find_by_email_or_username(
        pool: &PgPool,
        identifier: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, password_hash, job_title, department,
                   created_at, updated_at
            FROM users
            WHERE email = $1 OR username = $2
            ORDER BY (email = $1) DESC
            LIMIT 1
            "#,
        )
        .bind(normalize_email(identifier))
        .bind(identifier)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }
}
