//! Principal usage records.

use crate::{CategoryId, Tier, advance_anchor};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Opaque identifier of a principal (user or business account).
///
/// Ids are minted by the external identity provider; the gate never
/// interprets them.
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    derive_more::Display,
)]
#[serde(transparent)]
pub struct PrincipalId(String);

impl PrincipalId {
    /// Create a principal id from a raw string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The raw id string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for PrincipalId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// A tier change, immediate or future-dated.
///
/// Downgrades are typically dated to the end of the paid period; upgrades
/// take effect immediately.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, derive_getters::Getters,
)]
pub struct TierChange {
    /// The target tier
    tier: Tier,
    /// Instant at which the change takes effect
    effective_at: DateTime<Utc>,
}

impl TierChange {
    /// Create a tier change effective at the given instant.
    pub fn new(tier: Tier, effective_at: DateTime<Utc>) -> Self {
        Self { tier, effective_at }
    }

    /// Whether the change is due at `now`.
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        now >= self.effective_at
    }
}

/// A principal's stored gating state.
///
/// All mutation routes through the store's atomic consume/tier-change
/// operations; this type itself is a plain value. Counters and bonus credits
/// are keyed by category and cover the current usage window only.
///
/// # Examples
///
/// ```
/// use chrono::Utc;
/// use copyforge_core::{Principal, PrincipalId, Tier};
///
/// let principal = Principal::new(PrincipalId::new("acct_9"), Tier::Core, Utc::now());
/// assert_eq!(*principal.tier(), Tier::Core);
/// assert_eq!(principal.used(&"text_generation".into()), 0);
/// ```
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    derive_getters::Getters,
    derive_builder::Builder,
)]
#[builder(setter(into))]
pub struct Principal {
    /// Principal identifier
    id: PrincipalId,
    /// Current tier
    tier: Tier,
    /// Start of the current usage window
    window_anchor: DateTime<Utc>,
    /// Future-dated tier change, if one is scheduled
    #[builder(default)]
    pending_change: Option<TierChange>,
    /// Per-category usage counters for the current window
    #[builder(default)]
    counters: BTreeMap<CategoryId, u32>,
    /// Per-category admin-granted bonus credits for the current window
    #[builder(default)]
    bonus: BTreeMap<CategoryId, u32>,
}

impl Principal {
    /// Create a fresh principal with empty counters.
    pub fn new(id: PrincipalId, tier: Tier, window_anchor: DateTime<Utc>) -> Self {
        Self {
            id,
            tier,
            window_anchor,
            pending_change: None,
            counters: BTreeMap::new(),
            bonus: BTreeMap::new(),
        }
    }

    /// Builder for principals with pre-populated counters.
    pub fn builder() -> PrincipalBuilder {
        PrincipalBuilder::default()
    }

    /// Counter value for a category, zero if never used this window.
    pub fn used(&self, category: &CategoryId) -> u32 {
        self.counters.get(category).copied().unwrap_or(0)
    }

    /// Bonus credits granted for a category this window.
    pub fn bonus_for(&self, category: &CategoryId) -> u32 {
        self.bonus.get(category).copied().unwrap_or(0)
    }

    /// The tier in effect at `now`, honoring a due pending change.
    ///
    /// Read-only companion to [`Principal::promote_pending`]; used by the
    /// pure check path, which must not mutate.
    pub fn effective_tier(&self, now: DateTime<Utc>) -> Tier {
        match self.pending_change {
            Some(change) if change.is_due(now) => *change.tier(),
            _ => self.tier,
        }
    }

    /// Apply a due pending tier change in place.
    ///
    /// Returns `true` if the stored tier changed. Idempotent: once promoted,
    /// the pending slot is cleared.
    pub fn promote_pending(&mut self, now: DateTime<Utc>) -> bool {
        match self.pending_change {
            Some(change) if change.is_due(now) => {
                self.tier = *change.tier();
                self.pending_change = None;
                true
            }
            _ => false,
        }
    }

    /// Record a tier change, applying it now or parking it as pending.
    ///
    /// Counters are never altered: a downgrade below the current counter
    /// leaves the principal over quota for the rest of the window.
    pub fn set_tier_change(&mut self, change: TierChange, now: DateTime<Utc>) {
        if change.is_due(now) {
            self.tier = *change.tier();
            self.pending_change = None;
        } else {
            self.pending_change = Some(change);
        }
    }

    /// Advance the window anchor past elapsed windows, resetting counters.
    ///
    /// Returns `true` if a rollover happened. Bonus credits are scoped to a
    /// window and clear with it.
    pub fn roll_window(&mut self, window: Duration, now: DateTime<Utc>) -> bool {
        let advanced = advance_anchor(self.window_anchor, window, now);
        if advanced == self.window_anchor {
            return false;
        }
        self.window_anchor = advanced;
        self.counters.clear();
        self.bonus.clear();
        true
    }

    /// Debit a category counter by a feature's cost.
    pub fn record_use(&mut self, category: &CategoryId, cost: u32) {
        let counter = self.counters.entry(category.clone()).or_insert(0);
        *counter = counter.saturating_add(cost);
    }

    /// Grant bonus credits on a category for the current window.
    pub fn grant_bonus(&mut self, category: &CategoryId, amount: u32) {
        let credit = self.bonus.entry(category.clone()).or_insert(0);
        *credit = credit.saturating_add(amount);
    }
}
