//! Gate decision values.

use crate::{CategoryId, FeatureId, Remaining, Tier};
use serde::{Deserialize, Serialize};

/// Why a gate check denied access.
///
/// Tier and quota denials are normal outcomes with a user-facing path
/// (upgrade prompt, wait for reset). `UnknownFeature` marks a defect in the
/// static table and `PrincipalNotFound` a caller precondition violation;
/// both still surface as structured denials rather than panics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::AsRefStr)]
#[serde(tag = "reason", rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum DenyReason {
    /// Principal's tier ranks below the feature's minimum tier
    TierInsufficient {
        /// Minimum tier that unlocks the feature
        required: Tier,
    },
    /// The category quota cannot cover the feature's cost this window
    QuotaExceeded {
        /// Credit still available in the window (zero or more)
        remaining: u32,
    },
    /// Feature id absent from the static feature table
    UnknownFeature,
    /// Principal id absent from the store
    PrincipalNotFound,
}

/// Result of a gate check: allow or structured deny, plus remaining credit.
///
/// Ephemeral: produced per request and never persisted.
///
/// # Examples
///
/// ```
/// use copyforge_core::{DenyReason, GateDecision, Remaining, Tier};
///
/// let allowed = GateDecision::allow(Remaining::Limited(4));
/// assert!(allowed.allowed());
///
/// let denied = GateDecision::deny(DenyReason::TierInsufficient { required: Tier::Core });
/// assert!(!denied.allowed());
/// assert_eq!(denied.reason().as_ref().map(|r| r.as_ref()), Some("tier_insufficient"));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateDecision {
    allowed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    reason: Option<DenyReason>,
    remaining: Remaining,
}

impl GateDecision {
    /// An allow decision with the credit left after the checked cost.
    pub fn allow(remaining: Remaining) -> Self {
        Self {
            allowed: true,
            reason: None,
            remaining,
        }
    }

    /// A deny decision for the given reason.
    pub fn deny(reason: DenyReason) -> Self {
        let remaining = match reason {
            DenyReason::QuotaExceeded { remaining } => Remaining::Limited(remaining),
            _ => Remaining::Limited(0),
        };
        Self {
            allowed: false,
            reason: Some(reason),
            remaining,
        }
    }

    /// Whether the gated action may proceed.
    pub fn allowed(&self) -> bool {
        self.allowed
    }

    /// Deny reason, `None` when allowed.
    pub fn reason(&self) -> Option<DenyReason> {
        self.reason
    }

    /// Credit remaining in the current window.
    pub fn remaining(&self) -> Remaining {
        self.remaining
    }
}

/// Visibility of one feature for a given principal.
///
/// Presentation layers use this to decide what to show versus gate behind an
/// upgrade prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, derive_getters::Getters)]
pub struct FeatureVisibility {
    /// Feature identifier
    feature: FeatureId,
    /// Category the feature debits
    category: CategoryId,
    /// Whether the principal's tier unlocks the feature
    unlocked: bool,
    /// Minimum tier required to unlock it
    required_tier: Tier,
}

impl FeatureVisibility {
    /// Create a visibility record.
    pub fn new(
        feature: FeatureId,
        category: CategoryId,
        unlocked: bool,
        required_tier: Tier,
    ) -> Self {
        Self {
            feature,
            category,
            unlocked,
            required_tier,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deny_reasons_serialize_to_snake_case_tags() {
        let denied = GateDecision::deny(DenyReason::QuotaExceeded { remaining: 2 });
        let json = serde_json::to_value(&denied).unwrap();
        assert_eq!(json["allowed"], false);
        assert_eq!(json["reason"]["reason"], "quota_exceeded");
        assert_eq!(json["reason"]["remaining"], 2);
    }

    #[test]
    fn allow_omits_reason() {
        let json = serde_json::to_value(GateDecision::allow(Remaining::Unlimited)).unwrap();
        assert!(json.get("reason").is_none());
    }
}
