//! The tier and credit gate.

use chrono::{DateTime, Utc};
use copyforge_core::{
    CategoryId, FeatureId, FeatureVisibility, GateDecision, Principal, PrincipalId, SignupEvent,
    TierChangeEvent, TierTable, check_access,
};
use copyforge_error::{CopyforgeResult, GateError, GateErrorKind};
use copyforge_interface::PrincipalStore;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Decision-and-accounting unit in front of feature handlers.
///
/// Holds the immutable tier table and a [`PrincipalStore`]. Checks are pure;
/// consumption delegates to the store's atomic critical section, so a denied
/// check can never be raced into an overshoot by concurrent consumers.
///
/// # Example
///
/// ```no_run
/// use copyforge_gate::{GateConfig, MemoryPrincipalStore, TierGate};
/// use std::sync::Arc;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let table = Arc::new(GateConfig::load()?.build_table()?);
/// let gate = TierGate::new(table, MemoryPrincipalStore::new());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct TierGate<S> {
    table: Arc<TierTable>,
    store: S,
}

impl<S: PrincipalStore> TierGate<S> {
    /// Create a gate over a validated tier table and a principal store.
    pub fn new(table: Arc<TierTable>, store: S) -> Self {
        Self { table, store }
    }

    /// The static tier table this gate decides against.
    pub fn table(&self) -> &TierTable {
        &self.table
    }

    /// Decide whether a principal may invoke a feature, without consuming.
    ///
    /// Pure with respect to stored state; two calls with no intervening
    /// consume return identical decisions.
    #[instrument(skip(self, principal), fields(principal = %principal.id(), feature = %feature))]
    pub fn check_access(&self, principal: &Principal, feature: &FeatureId) -> GateDecision {
        self.check_access_at(principal, feature, Utc::now())
    }

    /// [`TierGate::check_access`] at an explicit instant.
    pub fn check_access_at(
        &self,
        principal: &Principal,
        feature: &FeatureId,
        now: DateTime<Utc>,
    ) -> GateDecision {
        check_access(&self.table, principal, feature, now)
    }

    /// Register a principal announced by a signup event.
    ///
    /// The signup instant anchors the first usage window.
    #[instrument(skip(self, event), fields(principal = %event.principal_id(), tier = %event.tier()))]
    pub async fn register_principal(&self, event: &SignupEvent) -> CopyforgeResult<Principal> {
        let principal = Principal::new(
            event.principal_id().clone(),
            *event.tier(),
            *event.occurred_at(),
        );
        self.store.insert(principal.clone()).await?;
        debug!("Registered principal");
        Ok(principal)
    }

    /// Atomically re-validate and debit one feature use.
    ///
    /// Must follow an allowed [`TierGate::check_access`]; the rules are
    /// re-applied under the store's critical section, so a concurrent
    /// consumer exhausting the quota in between turns this call into a
    /// `quota_exceeded` denial rather than an overshoot.
    #[instrument(skip(self), fields(principal = %id, feature = %feature))]
    pub async fn consume(
        &self,
        id: &PrincipalId,
        feature: &FeatureId,
    ) -> CopyforgeResult<GateDecision> {
        self.consume_at(id, feature, Utc::now()).await
    }

    /// [`TierGate::consume`] at an explicit instant.
    pub async fn consume_at(
        &self,
        id: &PrincipalId,
        feature: &FeatureId,
        now: DateTime<Utc>,
    ) -> CopyforgeResult<GateDecision> {
        let decision = self.store.try_consume(&self.table, id, feature, now).await?;
        if let Some(reason) = decision.reason() {
            debug!(reason = reason.as_ref(), "Consumption denied");
        }
        Ok(decision)
    }

    /// Apply a tier change announced by the billing provider.
    ///
    /// Immediate changes take effect now; future-dated changes are parked on
    /// the principal and promoted when due. Counters are never altered.
    #[instrument(skip(self, event), fields(principal = %event.principal_id(), tier = %event.tier()))]
    pub async fn apply_tier_change(&self, event: &TierChangeEvent) -> CopyforgeResult<()> {
        self.apply_tier_change_at(event, Utc::now()).await
    }

    /// [`TierGate::apply_tier_change`] at an explicit instant.
    pub async fn apply_tier_change_at(
        &self,
        event: &TierChangeEvent,
        now: DateTime<Utc>,
    ) -> CopyforgeResult<()> {
        self.store
            .apply_tier_change(event.principal_id(), event.change(), now)
            .await
    }

    /// Grant admin bonus credits on a category for the current window.
    #[instrument(skip(self), fields(principal = %id, category = %category, amount))]
    pub async fn grant_bonus(
        &self,
        id: &PrincipalId,
        category: &CategoryId,
        amount: u32,
    ) -> CopyforgeResult<()> {
        self.grant_bonus_at(id, category, amount, Utc::now()).await
    }

    /// [`TierGate::grant_bonus`] at an explicit instant.
    pub async fn grant_bonus_at(
        &self,
        id: &PrincipalId,
        category: &CategoryId,
        amount: u32,
        now: DateTime<Utc>,
    ) -> CopyforgeResult<()> {
        if !self.table.has_category(category) {
            return Err(GateError::new(GateErrorKind::UnknownCategory(
                category.to_string(),
            )))?;
        }
        self.store
            .grant_bonus(&self.table, id, category, amount, now)
            .await
    }

    /// Fetch a principal's stored record.
    pub async fn fetch_principal(&self, id: &PrincipalId) -> CopyforgeResult<Option<Principal>> {
        self.store.fetch(id).await
    }

    /// Visibility of every known feature for a principal.
    ///
    /// Pure function of the principal's tier and the static table; used by
    /// presentation layers to decide what to show versus gate behind an
    /// upgrade prompt.
    pub fn resolve_feature_visibility(&self, principal: &Principal) -> Vec<FeatureVisibility> {
        self.table.visibility_for(*principal.tier())
    }
}
