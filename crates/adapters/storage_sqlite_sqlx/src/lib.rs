//! # gardenhub-adapter-storage-sqlite-sqlx
//!
//! `SQLite` persistence adapter using [sqlx](https://docs.rs/sqlx).
//!
//! ## Responsibilities
//! - Implement `GardenRepository` and `UnitOfWork` from `gardenhub-app::ports::storage`
//! - Manage `SQLite` connection pool lifecycle
//! - Run database migrations (using sqlx embedded migrations)
//! - Map between domain types and database rows
//! - Hide soft-deleted gardens from every read
//! - Enforce optimistic concurrency with a per-garden version column
//!
//! ## Dependency rule
//! Depends on `gardenhub-app` (for port traits) and `gardenhub-domain` (for domain types).
//! The `app` and `domain` crates must never reference this adapter.

pub mod error;
pub mod garden_store;
pub mod pool;

pub use garden_store::SqliteGardenStore;
pub use pool::{Config, Database};
