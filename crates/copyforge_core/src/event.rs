//! Inbound lifecycle events.
//!
//! Signups come from the identity provider and tier changes from the billing
//! provider's webhook; the gate consumes both as plain data.

use crate::{PrincipalId, Tier, TierChange};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A new account, as announced by the external identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, derive_getters::Getters)]
pub struct SignupEvent {
    /// Identifier assigned by the identity provider
    principal_id: PrincipalId,
    /// Tier selected at signup
    tier: Tier,
    /// Signup instant; becomes the usage-window anchor
    occurred_at: DateTime<Utc>,
}

impl SignupEvent {
    /// Create a signup event.
    pub fn new(principal_id: PrincipalId, tier: Tier, occurred_at: DateTime<Utc>) -> Self {
        Self {
            principal_id,
            tier,
            occurred_at,
        }
    }
}

/// A subscription change, as announced by the billing provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, derive_getters::Getters)]
pub struct TierChangeEvent {
    /// Principal whose subscription changed
    principal_id: PrincipalId,
    /// Target tier
    tier: Tier,
    /// When the change takes effect (end of paid period for downgrades)
    effective_at: DateTime<Utc>,
}

impl TierChangeEvent {
    /// Create a tier change event.
    pub fn new(principal_id: PrincipalId, tier: Tier, effective_at: DateTime<Utc>) -> Self {
        Self {
            principal_id,
            tier,
            effective_at,
        }
    }

    /// The change payload without the principal id.
    pub fn change(&self) -> TierChange {
        TierChange::new(self.tier, self.effective_at)
    }
}
