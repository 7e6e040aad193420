//! Core domain types for the Copyforge tier and credit gate.
//!
//! This crate provides the foundation data types shared across the Copyforge
//! workspace: the closed tier set, the validated tier table, principal usage
//! records, gate decisions, and the pure access-evaluation functions every
//! store implementation routes through.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod access;
mod decision;
mod event;
mod feature;
mod principal;
mod quota;
mod table;
mod telemetry;
mod tier;
mod window;

pub use access::{check_access, consume};
pub use decision::{DenyReason, FeatureVisibility, GateDecision};
pub use event::{SignupEvent, TierChangeEvent};
pub use feature::{CategoryId, FeatureId, FeatureSpec};
pub use principal::{Principal, PrincipalBuilder, PrincipalId, TierChange};
pub use quota::{Quota, Remaining};
pub use table::TierTable;
pub use telemetry::{init_telemetry, shutdown_telemetry};
pub use tier::Tier;
pub use window::{advance_anchor, window_from_days};
