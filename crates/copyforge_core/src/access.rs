//! Pure access evaluation.
//!
//! Every store implementation routes its critical section through
//! [`consume`], and every caller-facing check through [`check_access`], so
//! the decision rules live in exactly one place.

use crate::{
    DenyReason, FeatureId, FeatureSpec, GateDecision, Principal, Quota, Remaining, TierTable,
    advance_anchor,
};
use chrono::{DateTime, Utc};
use tracing::warn;

/// Decide whether a feature invocation may proceed, without mutating state.
///
/// Resolves the feature against the static table, compares tier ranks, and
/// evaluates the category quota against the principal's *effective* usage
/// window: a stale window anchor is treated as rolled over (counter and
/// bonus at zero) without being written back. Calling this twice with no
/// intervening consume yields identical results.
pub fn check_access(
    table: &TierTable,
    principal: &Principal,
    feature_id: &FeatureId,
    now: DateTime<Utc>,
) -> GateDecision {
    let Some(spec) = table.feature(feature_id) else {
        warn!(feature = %feature_id, "gate check against unknown feature");
        return GateDecision::deny(DenyReason::UnknownFeature);
    };

    let tier = principal.effective_tier(now);
    if !tier.unlocks(*spec.min_tier()) {
        return GateDecision::deny(DenyReason::TierInsufficient {
            required: *spec.min_tier(),
        });
    }

    let Some(quota) = table.quota(tier, spec.category()) else {
        warn!(feature = %feature_id, category = %spec.category(), "feature category missing from tier table");
        return GateDecision::deny(DenyReason::UnknownFeature);
    };

    let rolled = advance_anchor(*principal.window_anchor(), table.window(), now)
        != *principal.window_anchor();
    let (used, bonus) = if rolled {
        (0, 0)
    } else {
        (
            principal.used(spec.category()),
            principal.bonus_for(spec.category()),
        )
    };

    decide(quota, used, bonus, spec)
}

/// Re-validate and debit a principal's counter for one feature use.
///
/// Intended to run inside a store's critical section (map lock or row-locked
/// transaction). Due tier changes promote and elapsed windows roll over
/// before the quota rules of [`check_access`] apply; on allow the counter is
/// debited in place. On deny the counter is untouched, though the
/// normalizations alone may still have changed the record. Both are
/// idempotent and safe to persist.
pub fn consume(
    table: &TierTable,
    principal: &mut Principal,
    feature_id: &FeatureId,
    now: DateTime<Utc>,
) -> GateDecision {
    principal.promote_pending(now);
    principal.roll_window(table.window(), now);

    let Some(spec) = table.feature(feature_id) else {
        warn!(feature = %feature_id, "consume against unknown feature");
        return GateDecision::deny(DenyReason::UnknownFeature);
    };

    let tier = *principal.tier();
    if !tier.unlocks(*spec.min_tier()) {
        return GateDecision::deny(DenyReason::TierInsufficient {
            required: *spec.min_tier(),
        });
    }

    let Some(quota) = table.quota(tier, spec.category()) else {
        warn!(feature = %feature_id, category = %spec.category(), "feature category missing from tier table");
        return GateDecision::deny(DenyReason::UnknownFeature);
    };

    let decision = decide(
        quota,
        principal.used(spec.category()),
        principal.bonus_for(spec.category()),
        spec,
    );
    if decision.allowed() {
        principal.record_use(spec.category(), *spec.cost());
    }
    decision
}

/// Quota arithmetic shared by check and consume.
///
/// Bonus credits extend the limit for the current window; `remaining` is
/// reported against that extended limit and saturates at zero when a
/// downgrade left the counter above it.
fn decide(quota: Quota, used: u32, bonus: u32, spec: &FeatureSpec) -> GateDecision {
    match quota {
        Quota::Unlimited => GateDecision::allow(Remaining::Unlimited),
        Quota::Limited(limit) => {
            let limit = limit.saturating_add(bonus);
            if used.saturating_add(*spec.cost()) > limit {
                GateDecision::deny(DenyReason::QuotaExceeded {
                    remaining: limit.saturating_sub(used),
                })
            } else {
                GateDecision::allow(Remaining::Limited(limit - (used + spec.cost())))
            }
        }
    }
}
