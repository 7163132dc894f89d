//! `SQLite` backend for the activity log.
//!
//! - **[`connection`]**: `r2d2` pool with WAL mode and foreign keys applied to
//!   every connection. A single connection by default.
//! - **[`migrations`]**: versioned schema embedded at compile time.
//! - **[`repositories`]**: stateless structs whose methods take `&Connection`.

pub mod connection;
pub mod migrations;
pub mod repositories;

pub use connection::{ConnectionConfig, ConnectionPool, PooledConnection, new_file, new_in_memory};
pub use migrations::{current_version, latest_version, run_migrations};
