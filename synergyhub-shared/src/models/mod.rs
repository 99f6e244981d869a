/// Database models for SynergyHub
///
/// Each model carries its own sqlx queries; the store backends in
/// [`crate::store`] call into them.
///
/// # Models
///
/// - `user`: Accounts and their public profile
/// - `project`: Task containers, including the reserved fallback project
/// - `task`: Units of work owned by a project
///
/// # Example
///
/// ```no_run
/// use synergyhub_shared::models::project::{NewProject, Project};
/// use synergyhub_shared::db::pool::{create_pool, DatabaseConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// let project = Project::create(&pool, NewProject::named("Website relaunch")).await?;
/// println!("Created project {}", project.id);
/// # Ok(())
/// # }
/// ```

pub mod project;
pub mod task;
pub mod user;
