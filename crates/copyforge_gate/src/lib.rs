//! Tier gating and credit accounting.
//!
//! This crate is the decision-and-accounting unit in front of every Copyforge
//! feature handler: given an authenticated principal and a requested feature,
//! it decides allow/deny and, on consumption, atomically debits the usage
//! counter for the current billing window.
//!
//! Configuration is TOML-based with bundled defaults and optional user
//! overrides:
//! ```ignore
//! use copyforge_gate::GateConfig;
//!
//! let table = GateConfig::load()?.build_table()?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod gate;
mod store;

pub use config::{FeatureConfig, GateConfig, QuotaSetting, TierQuotaConfig, WindowConfig};
pub use gate::TierGate;
pub use store::MemoryPrincipalStore;
