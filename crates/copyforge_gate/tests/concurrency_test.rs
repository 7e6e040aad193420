//! Concurrency tests: the double-spend race and rollover idempotence.

use chrono::{DateTime, Duration, TimeZone, Utc};
use copyforge_core::{
    CategoryId, DenyReason, FeatureId, FeatureSpec, PrincipalId, Quota, SignupEvent, Tier,
    TierTable,
};
use copyforge_gate::{MemoryPrincipalStore, TierGate};
use std::collections::BTreeMap;
use std::sync::Arc;

fn at(y: i32, mo: u32, d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, mo, d, 0, 0, 0).unwrap()
}

fn table(quota: u32) -> Arc<TierTable> {
    let quotas = [Tier::Free, Tier::Core, Tier::Pro, Tier::ProPlus]
        .into_iter()
        .map(|tier| {
            (
                tier,
                BTreeMap::from([(CategoryId::new("posts"), Quota::Limited(quota))]),
            )
        })
        .collect();
    let features = BTreeMap::from([(
        FeatureId::new("caption_writer"),
        FeatureSpec::new(
            FeatureId::new("caption_writer"),
            CategoryId::new("posts"),
            Tier::Free,
            1,
        ),
    )]);
    Arc::new(TierTable::new(Duration::days(30), quotas, features).unwrap())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn concurrent_consumers_never_overshoot_quota() {
    let quota = 10u32;
    let callers = 25usize;

    let gate = Arc::new(TierGate::new(table(quota), MemoryPrincipalStore::new()));
    let id = PrincipalId::new("acct_race");
    gate.register_principal(&SignupEvent::new(id.clone(), Tier::Core, at(2025, 1, 1)))
        .await
        .unwrap();

    let now = at(2025, 1, 5);
    let mut handles = Vec::with_capacity(callers);
    for _ in 0..callers {
        let gate = Arc::clone(&gate);
        let id = id.clone();
        handles.push(tokio::spawn(async move {
            let feature: FeatureId = "caption_writer".into();
            gate.consume_at(&id, &feature, now).await.unwrap()
        }));
    }

    let mut allowed = 0usize;
    let mut denied = 0usize;
    for handle in handles {
        let decision = handle.await.unwrap();
        if decision.allowed() {
            allowed += 1;
        } else {
            assert!(matches!(
                decision.reason(),
                Some(DenyReason::QuotaExceeded { .. })
            ));
            denied += 1;
        }
    }

    // Exactly quota successes, the rest denied, counter exactly at quota.
    assert_eq!(allowed, quota as usize);
    assert_eq!(denied, callers - quota as usize);
    let stored = gate.fetch_principal(&id).await.unwrap().unwrap();
    assert_eq!(stored.used(&CategoryId::new("posts")), quota);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_rollover_lands_on_one_anchor() {
    let gate = Arc::new(TierGate::new(table(10), MemoryPrincipalStore::new()));
    let id = PrincipalId::new("acct_rollover");
    gate.register_principal(&SignupEvent::new(id.clone(), Tier::Core, at(2025, 1, 1)))
        .await
        .unwrap();

    // Exhaust part of the first window.
    for _ in 0..5 {
        assert!(
            gate.consume_at(&id, &"caption_writer".into(), at(2025, 1, 2))
                .await
                .unwrap()
                .allowed()
        );
    }

    // Both observers see the same stale window; both attempt rollover.
    let late = at(2025, 3, 20);
    let mut handles = Vec::new();
    for _ in 0..2 {
        let gate = Arc::clone(&gate);
        let id = id.clone();
        handles.push(tokio::spawn(async move {
            let feature: FeatureId = "caption_writer".into();
            gate.consume_at(&id, &feature, late).await.unwrap()
        }));
    }
    for handle in handles {
        assert!(handle.await.unwrap().allowed());
    }

    // Same final state as a single rollover: anchor advanced by two whole
    // windows, counter holds exactly the two new consumptions.
    let stored = gate.fetch_principal(&id).await.unwrap().unwrap();
    assert_eq!(*stored.window_anchor(), at(2025, 1, 1) + Duration::days(60));
    assert_eq!(stored.used(&CategoryId::new("posts")), 2);
}
