/// Database layer
///
/// # Modules
///
/// - `pool`: PostgreSQL connection pool with health check
/// - `migrations`: embedded schema migrations
///
/// Row types and their queries are in [`crate::models`]; the trait-based
/// access used by the services is in [`crate::store`].

pub mod migrations;
pub mod pool;
