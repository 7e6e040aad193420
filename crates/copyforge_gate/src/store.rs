//! In-process principal store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use copyforge_core::{
    CategoryId, DenyReason, FeatureId, GateDecision, Principal, PrincipalId, TierChange,
    TierTable, consume,
};
use copyforge_error::{CopyforgeResult, GateError, GateErrorKind};
use copyforge_interface::PrincipalStore;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Principal store backed by an in-process map.
///
/// Suited to tests and single-node deployments. One async mutex guards the
/// map, so `try_consume` holds the lock across rollover, re-validation, and
/// increment; the whole sequence is a single critical section.
#[derive(Debug, Clone, Default)]
pub struct MemoryPrincipalStore {
    principals: Arc<Mutex<HashMap<PrincipalId, Principal>>>,
}

impl MemoryPrincipalStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PrincipalStore for MemoryPrincipalStore {
    async fn fetch(&self, id: &PrincipalId) -> CopyforgeResult<Option<Principal>> {
        let principals = self.principals.lock().await;
        Ok(principals.get(id).cloned())
    }

    async fn insert(&self, principal: Principal) -> CopyforgeResult<()> {
        let mut principals = self.principals.lock().await;
        principals.insert(principal.id().clone(), principal);
        Ok(())
    }

    async fn try_consume(
        &self,
        table: &TierTable,
        id: &PrincipalId,
        feature: &FeatureId,
        now: DateTime<Utc>,
    ) -> CopyforgeResult<GateDecision> {
        let mut principals = self.principals.lock().await;
        match principals.get_mut(id) {
            None => Ok(GateDecision::deny(DenyReason::PrincipalNotFound)),
            Some(principal) => Ok(consume(table, principal, feature, now)),
        }
    }

    async fn apply_tier_change(
        &self,
        id: &PrincipalId,
        change: TierChange,
        now: DateTime<Utc>,
    ) -> CopyforgeResult<()> {
        let mut principals = self.principals.lock().await;
        let principal = principals.get_mut(id).ok_or_else(|| {
            GateError::new(GateErrorKind::PrincipalNotFound(id.to_string()))
        })?;
        principal.promote_pending(now);
        principal.set_tier_change(change, now);
        Ok(())
    }

    async fn grant_bonus(
        &self,
        table: &TierTable,
        id: &PrincipalId,
        category: &CategoryId,
        amount: u32,
        now: DateTime<Utc>,
    ) -> CopyforgeResult<()> {
        let mut principals = self.principals.lock().await;
        let principal = principals.get_mut(id).ok_or_else(|| {
            GateError::new(GateErrorKind::PrincipalNotFound(id.to_string()))
        })?;
        principal.roll_window(table.window(), now);
        principal.grant_bonus(category, amount);
        Ok(())
    }
}
