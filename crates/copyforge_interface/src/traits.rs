//! Persistence boundary consumed by the gate.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use copyforge_core::{
    CategoryId, FeatureId, GateDecision, Principal, PrincipalId, TierChange, TierTable,
};
use copyforge_error::CopyforgeResult;

/// Store of principal gating records.
///
/// The contract every implementation must honor: `try_consume` is one atomic
/// operation. Window rollover, pending tier promotion, quota check, and
/// counter increment happen inside a single critical section, so two
/// concurrent consumers can never jointly overshoot a quota. Implementations
/// reach that through a map-level lock (in-process) or a row-locked database
/// transaction; never through separate read and write calls.
///
/// Store failures propagate as errors and the gate fails closed: an
/// unreachable store denies access, it never allows.
#[async_trait]
pub trait PrincipalStore: Send + Sync {
    /// Fetch a principal's record, `None` if unknown.
    async fn fetch(&self, id: &PrincipalId) -> CopyforgeResult<Option<Principal>>;

    /// Insert a freshly registered principal.
    async fn insert(&self, principal: Principal) -> CopyforgeResult<()>;

    /// Atomically re-validate and debit one feature use.
    ///
    /// Returns the decision; on deny the stored counters are unchanged,
    /// though time-based normalizations (rollover, due tier promotion) may
    /// still persist. An unknown principal yields a `principal_not_found`
    /// denial, not an error.
    async fn try_consume(
        &self,
        table: &TierTable,
        id: &PrincipalId,
        feature: &FeatureId,
        now: DateTime<Utc>,
    ) -> CopyforgeResult<GateDecision>;

    /// Record a tier change, immediate or future-dated.
    ///
    /// Never alters counters.
    async fn apply_tier_change(
        &self,
        id: &PrincipalId,
        change: TierChange,
        now: DateTime<Utc>,
    ) -> CopyforgeResult<()>;

    /// Grant admin bonus credits on a category for the current window.
    ///
    /// Rolls an elapsed window first, under the same critical section, so
    /// the credit always lands in the window containing `now`.
    async fn grant_bonus(
        &self,
        table: &TierTable,
        id: &PrincipalId,
        category: &CategoryId,
        amount: u32,
        now: DateTime<Utc>,
    ) -> CopyforgeResult<()>;
}
