//! PostgreSQL integration for the Copyforge gate.
//!
//! This crate provides the database-backed [`PrincipalStore`] implementation:
//! schema definitions, row models, and a repository whose consume path runs
//! as a single row-locked transaction.
//!
//! # Example
//!
//! ```rust,ignore
//! use copyforge_database::{PostgresPrincipalStore, establish_pool, run_migrations};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let pool = establish_pool()?;
//! run_migrations(&mut pool.get()?)?;
//! let store = PostgresPrincipalStore::new(pool);
//! # Ok(())
//! # }
//! ```
//!
//! [`PrincipalStore`]: copyforge_interface::PrincipalStore

mod connection;
mod models;
mod principal_repository;

// Public module for external access
pub mod schema;

// Re-export connection utilities
pub use connection::{MIGRATIONS, establish_connection, establish_pool, run_migrations};

// Re-export row models
pub use models::{NewPrincipalRow, PrincipalRow, UsageCounterRow};

// Re-export the store
pub use principal_repository::PostgresPrincipalStore;

use copyforge_error::DatabaseError;

/// Result type for database operations.
pub type DatabaseResult<T> = Result<T, DatabaseError>;
