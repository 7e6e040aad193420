//! Error types for the Copyforge gate.
//!
//! This crate provides the foundation error types used throughout the
//! Copyforge workspace.
//!
//! # Error Hierarchy
//!
//! All errors follow the `ErrorKind` + wrapper struct pattern for clean error
//! handling:
//! - `*ErrorKind` enum defines specific error conditions
//! - `*Error` struct wraps the kind with source location tracking
//! - All errors use `#[track_caller]` for automatic location capture
//!
//! # Examples
//!
//! ```
//! use copyforge_error::{ConfigError, CopyforgeResult};
//!
//! fn load_table() -> CopyforgeResult<()> {
//!     Err(ConfigError::new("window length must be at least one day"))?
//! }
//!
//! match load_table() {
//!     Ok(_) => println!("loaded"),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
#[cfg(feature = "database")]
mod database;
mod error;
mod gate;

pub use config::ConfigError;
#[cfg(feature = "database")]
pub use database::{DatabaseError, DatabaseErrorKind};
pub use error::{CopyforgeError, CopyforgeErrorKind, CopyforgeResult};
pub use gate::{GateError, GateErrorKind};
