//! End-to-end tests for the tier gate over the in-process store.

use chrono::{DateTime, Duration, TimeZone, Utc};
use copyforge_core::{
    CategoryId, DenyReason, FeatureId, FeatureSpec, Principal, PrincipalId, Quota, Remaining,
    SignupEvent, Tier, TierChangeEvent, TierTable,
};
use copyforge_gate::{MemoryPrincipalStore, TierGate};
use std::collections::BTreeMap;
use std::sync::Arc;

fn at(y: i32, mo: u32, d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, mo, d, 0, 0, 0).unwrap()
}

fn table() -> Arc<TierTable> {
    let tiers = [
        (Tier::Free, 2u32),
        (Tier::Core, 10),
        (Tier::Pro, 100),
        (Tier::ProPlus, 500),
    ];
    let quotas = tiers
        .into_iter()
        .map(|(tier, posts)| {
            (
                tier,
                BTreeMap::from([(CategoryId::new("posts"), Quota::Limited(posts))]),
            )
        })
        .collect();

    let features = [
        FeatureSpec::new(
            FeatureId::new("caption_writer"),
            CategoryId::new("posts"),
            Tier::Free,
            1,
        ),
        FeatureSpec::new(
            FeatureId::new("post_scheduler"),
            CategoryId::new("posts"),
            Tier::Core,
            1,
        ),
    ]
    .into_iter()
    .map(|spec| (spec.id().clone(), spec))
    .collect();

    Arc::new(TierTable::new(Duration::days(30), quotas, features).unwrap())
}

fn gate() -> TierGate<MemoryPrincipalStore> {
    TierGate::new(table(), MemoryPrincipalStore::new())
}

#[tokio::test]
async fn signup_then_consume_and_check_stays_pure() {
    let gate = gate();
    let id = PrincipalId::new("acct_1");
    let signup = SignupEvent::new(id.clone(), Tier::Core, at(2025, 1, 1));
    let principal = gate.register_principal(&signup).await.unwrap();

    let feature: FeatureId = "post_scheduler".into();
    let now = at(2025, 1, 5);

    // Pure check: repeated calls agree and mutate nothing.
    let check = gate.check_access_at(&principal, &feature, now);
    assert_eq!(check, gate.check_access_at(&principal, &feature, now));
    assert!(check.allowed());

    let consumed = gate.consume_at(&id, &feature, now).await.unwrap();
    assert!(consumed.allowed());
    assert_eq!(consumed.remaining(), Remaining::Limited(9));

    let stored = gate.fetch_principal(&id).await.unwrap().unwrap();
    assert_eq!(stored.used(&CategoryId::new("posts")), 1);
}

#[tokio::test]
async fn free_tier_denied_core_feature_with_required_tier() {
    let gate = gate();
    let id = PrincipalId::new("acct_2");
    let signup = SignupEvent::new(id.clone(), Tier::Free, at(2025, 1, 1));
    let principal = gate.register_principal(&signup).await.unwrap();

    let decision = gate.check_access_at(&principal, &"post_scheduler".into(), at(2025, 1, 2));
    assert!(!decision.allowed());
    assert_eq!(
        decision.reason(),
        Some(DenyReason::TierInsufficient {
            required: Tier::Core
        })
    );

    // Consume path agrees with the check.
    let consumed = gate
        .consume_at(&id, &"post_scheduler".into(), at(2025, 1, 2))
        .await
        .unwrap();
    assert!(!consumed.allowed());
}

#[tokio::test]
async fn consume_to_quota_then_denied() {
    let gate = gate();
    let id = PrincipalId::new("acct_3");
    gate.register_principal(&SignupEvent::new(id.clone(), Tier::Core, at(2025, 1, 1)))
        .await
        .unwrap();

    let feature: FeatureId = "post_scheduler".into();
    let now = at(2025, 1, 5);
    for expected_remaining in (0..10).rev() {
        let decision = gate.consume_at(&id, &feature, now).await.unwrap();
        assert!(decision.allowed());
        assert_eq!(decision.remaining(), Remaining::Limited(expected_remaining));
    }

    let denied = gate.consume_at(&id, &feature, now).await.unwrap();
    assert!(!denied.allowed());
    assert_eq!(
        denied.reason(),
        Some(DenyReason::QuotaExceeded { remaining: 0 })
    );
    let stored = gate.fetch_principal(&id).await.unwrap().unwrap();
    assert_eq!(stored.used(&CategoryId::new("posts")), 10);
}

#[tokio::test]
async fn downgrade_mid_window_denies_without_clamping() {
    let gate = gate();
    let id = PrincipalId::new("acct_4");
    gate.register_principal(&SignupEvent::new(id.clone(), Tier::Pro, at(2025, 1, 1)))
        .await
        .unwrap();

    // Burn 80 of the Pro-tier quota of 100.
    let feature: FeatureId = "post_scheduler".into();
    for _ in 0..80 {
        assert!(
            gate.consume_at(&id, &feature, at(2025, 1, 5))
                .await
                .unwrap()
                .allowed()
        );
    }

    // Billing downgrades to Core (quota 10), effective immediately.
    let event = TierChangeEvent::new(id.clone(), Tier::Core, at(2025, 1, 10));
    gate.apply_tier_change_at(&event, at(2025, 1, 10)).await.unwrap();

    let denied = gate.consume_at(&id, &feature, at(2025, 1, 11)).await.unwrap();
    assert!(!denied.allowed());
    assert_eq!(
        denied.reason(),
        Some(DenyReason::QuotaExceeded { remaining: 0 })
    );

    // Counter untouched: no clamping, no refund.
    let stored = gate.fetch_principal(&id).await.unwrap().unwrap();
    assert_eq!(stored.used(&CategoryId::new("posts")), 80);
    assert_eq!(*stored.tier(), Tier::Core);
}

#[tokio::test]
async fn future_dated_downgrade_promotes_when_due() {
    let gate = gate();
    let id = PrincipalId::new("acct_5");
    gate.register_principal(&SignupEvent::new(id.clone(), Tier::Pro, at(2025, 1, 1)))
        .await
        .unwrap();

    // Downgrade effective at end of the paid period.
    let event = TierChangeEvent::new(id.clone(), Tier::Free, at(2025, 2, 1));
    gate.apply_tier_change_at(&event, at(2025, 1, 10)).await.unwrap();

    // Still Pro before the effective instant.
    let stored = gate.fetch_principal(&id).await.unwrap().unwrap();
    assert_eq!(*stored.tier(), Tier::Pro);
    assert!(
        gate.consume_at(&id, &"post_scheduler".into(), at(2025, 1, 15))
            .await
            .unwrap()
            .allowed()
    );

    // Past the effective instant the next consume promotes, then denies by tier.
    let denied = gate
        .consume_at(&id, &"post_scheduler".into(), at(2025, 2, 2))
        .await
        .unwrap();
    assert_eq!(
        denied.reason(),
        Some(DenyReason::TierInsufficient {
            required: Tier::Core
        })
    );
    let stored = gate.fetch_principal(&id).await.unwrap().unwrap();
    assert_eq!(*stored.tier(), Tier::Free);
}

#[tokio::test]
async fn window_rollover_resets_credit() {
    let gate = gate();
    let id = PrincipalId::new("acct_6");
    gate.register_principal(&SignupEvent::new(id.clone(), Tier::Core, at(2025, 1, 1)))
        .await
        .unwrap();

    let feature: FeatureId = "post_scheduler".into();
    for _ in 0..10 {
        assert!(
            gate.consume_at(&id, &feature, at(2025, 1, 5))
                .await
                .unwrap()
                .allowed()
        );
    }
    assert!(
        !gate
            .consume_at(&id, &feature, at(2025, 1, 6))
            .await
            .unwrap()
            .allowed()
    );

    // Next window: full quota again, anchor advanced by one window.
    let decision = gate.consume_at(&id, &feature, at(2025, 2, 3)).await.unwrap();
    assert!(decision.allowed());
    assert_eq!(decision.remaining(), Remaining::Limited(9));
    let stored = gate.fetch_principal(&id).await.unwrap().unwrap();
    assert_eq!(*stored.window_anchor(), at(2025, 1, 31));
}

#[tokio::test]
async fn unknown_principal_is_a_structured_denial_on_consume() {
    let gate = gate();
    let decision = gate
        .consume_at(&PrincipalId::new("ghost"), &"caption_writer".into(), at(2025, 1, 1))
        .await
        .unwrap();
    assert!(!decision.allowed());
    assert_eq!(decision.reason(), Some(DenyReason::PrincipalNotFound));
}

#[tokio::test]
async fn tier_change_for_unknown_principal_errors() {
    let gate = gate();
    let event = TierChangeEvent::new(PrincipalId::new("ghost"), Tier::Pro, at(2025, 1, 1));
    assert!(gate.apply_tier_change_at(&event, at(2025, 1, 1)).await.is_err());
}

#[tokio::test]
async fn bonus_grant_extends_current_window_only() {
    let gate = gate();
    let id = PrincipalId::new("acct_7");
    gate.register_principal(&SignupEvent::new(id.clone(), Tier::Free, at(2025, 1, 1)))
        .await
        .unwrap();

    let feature: FeatureId = "caption_writer".into();
    for _ in 0..2 {
        assert!(
            gate.consume_at(&id, &feature, at(2025, 1, 2))
                .await
                .unwrap()
                .allowed()
        );
    }
    assert!(
        !gate
            .consume_at(&id, &feature, at(2025, 1, 3))
            .await
            .unwrap()
            .allowed()
    );

    gate.grant_bonus_at(&id, &CategoryId::new("posts"), 1, at(2025, 1, 3))
        .await
        .unwrap();
    assert!(
        gate.consume_at(&id, &feature, at(2025, 1, 4))
            .await
            .unwrap()
            .allowed()
    );

    // Unknown category is rejected before touching the store.
    assert!(
        gate.grant_bonus(&id, &CategoryId::new("mainframes"), 1)
            .await
            .is_err()
    );
}

#[tokio::test]
async fn visibility_reports_locked_features_with_required_tier() {
    let gate = gate();
    let principal = Principal::new(PrincipalId::new("p"), Tier::Free, at(2025, 1, 1));

    let visibility = gate.resolve_feature_visibility(&principal);
    assert_eq!(visibility.len(), 2);

    let scheduler = visibility
        .iter()
        .find(|v| v.feature().as_str() == "post_scheduler")
        .unwrap();
    assert!(!*scheduler.unlocked());
    assert_eq!(*scheduler.required_tier(), Tier::Core);

    let caption = visibility
        .iter()
        .find(|v| v.feature().as_str() == "caption_writer")
        .unwrap();
    assert!(*caption.unlocked());
}
