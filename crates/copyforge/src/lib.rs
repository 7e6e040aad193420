//! Copyforge - Tier & Credit Gate
//!
//! Copyforge gates a catalog of AI-assisted marketing tools behind a
//! four-tier subscription system. This crate re-exports the gating core:
//! given an authenticated principal and a requested feature, decide
//! allow/deny, and on consumption atomically debit the usage counter for the
//! current billing window.
//!
//! # Features
//!
//! - **Closed tier set**: Free, Core, Pro, and Pro+ compared by numeric rank
//! - **Validated tier table**: TOML-configured quotas, features, and window
//!   length, failing fast on unknown entries at startup
//! - **Pure checks**: `check_access` and feature visibility never mutate
//! - **Atomic consumption**: re-validation and increment in one critical
//!   section, in-process or database-backed
//! - **Billing events**: signup and tier-change events from external
//!   providers, including future-dated downgrades
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use copyforge::{GateConfig, MemoryPrincipalStore, SignupEvent, Tier, TierGate};
//! use chrono::Utc;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let table = Arc::new(GateConfig::load()?.build_table()?);
//!     let gate = TierGate::new(table, MemoryPrincipalStore::new());
//!
//!     let signup = SignupEvent::new("acct_1".into(), Tier::Core, Utc::now());
//!     let principal = gate.register_principal(&signup).await?;
//!
//!     let decision = gate.check_access(&principal, &"caption_writer".into());
//!     if decision.allowed() {
//!         gate.consume(principal.id(), &"caption_writer".into()).await?;
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Cargo Features
//!
//! - `database` - PostgreSQL-backed principal store
//!
//! # Architecture
//!
//! Copyforge is organized as a workspace with focused crates:
//!
//! - `copyforge_core` - Domain types, tier table, pure access evaluation
//! - `copyforge_interface` - PrincipalStore trait seam
//! - `copyforge_error` - Error types
//! - `copyforge_gate` - Gate orchestration, configuration, in-process store
//! - `copyforge_database` - PostgreSQL persistence
//!
//! This crate (`copyforge`) re-exports everything for convenience.

#![forbid(unsafe_code)]

pub use copyforge_core::{
    CategoryId, DenyReason, FeatureId, FeatureSpec, FeatureVisibility, GateDecision, Principal,
    PrincipalBuilder, PrincipalId, Quota, Remaining, SignupEvent, Tier, TierChange,
    TierChangeEvent, TierTable, advance_anchor, check_access, consume, init_telemetry,
    shutdown_telemetry, window_from_days,
};

pub use copyforge_error::{
    ConfigError, CopyforgeError, CopyforgeErrorKind, CopyforgeResult, GateError, GateErrorKind,
};

pub use copyforge_interface::PrincipalStore;

pub use copyforge_gate::{
    FeatureConfig, GateConfig, MemoryPrincipalStore, QuotaSetting, TierGate, TierQuotaConfig,
    WindowConfig,
};

#[cfg(feature = "database")]
pub use copyforge_database::{
    PostgresPrincipalStore, establish_connection, establish_pool, run_migrations,
};

#[cfg(feature = "database")]
pub use copyforge_error::{DatabaseError, DatabaseErrorKind};
