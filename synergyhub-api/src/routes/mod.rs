/// API route handlers, one module per resource
///
/// - `health`: health check
/// - `tasks`: task ingestion
/// - `auth`: signup, login, current user
/// - `projects`: project CRUD and per-project task listing

pub mod auth;
pub mod health;
pub mod projects;
pub mod tasks;
