//! # SynergyHub Shared Library
//!
//! Domain types, persistence and the task ingestion service used by the
//! SynergyHub API server.
//!
//! ## Module Organization
//!
//! - `models`: database rows and their queries
//! - `store`: storage traits with PostgreSQL and in-memory backends
//! - `ingest`: task ingestion (project fallback, assignee, tags, due dates)
//! - `auth`: password hashing and JWT tokens
//! - `db`: connection pool and migrations
//! - `error`: store and service error types

pub mod auth;
pub mod db;
pub mod error;
pub mod ingest;
pub mod models;
pub mod store;

/// Current version of the SynergyHub shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
