//! The validated static tier table.

use crate::{CategoryId, FeatureId, FeatureSpec, FeatureVisibility, Quota, Tier};
use chrono::Duration;
use copyforge_error::{CopyforgeResult, GateError, GateErrorKind};
use std::collections::{BTreeMap, BTreeSet};
use strum::IntoEnumIterator;

/// Static tier configuration: window length, per-tier category quotas, and
/// the feature catalog.
///
/// Built once at startup from validated configuration and treated as
/// immutable for the process lifetime. Construction fails fast on structural
/// defects instead of silently defaulting.
#[derive(Debug, Clone, PartialEq)]
pub struct TierTable {
    window: Duration,
    quotas: BTreeMap<Tier, BTreeMap<CategoryId, Quota>>,
    features: BTreeMap<FeatureId, FeatureSpec>,
}

impl TierTable {
    /// Build a tier table, validating structural invariants.
    ///
    /// # Errors
    ///
    /// Returns a validation error if:
    /// - the window is shorter than one day
    /// - any of the four tiers is missing a quota map
    /// - tiers disagree on the category set, or it is empty
    /// - a feature references an unknown category or has zero cost
    pub fn new(
        window: Duration,
        quotas: BTreeMap<Tier, BTreeMap<CategoryId, Quota>>,
        features: BTreeMap<FeatureId, FeatureSpec>,
    ) -> CopyforgeResult<Self> {
        if window < Duration::days(1) {
            return Err(GateError::new(GateErrorKind::Validation(
                "usage window must be at least one day".into(),
            )))?;
        }

        let mut categories: Option<BTreeSet<CategoryId>> = None;
        for tier in Tier::iter() {
            let Some(tier_quotas) = quotas.get(&tier) else {
                return Err(GateError::new(GateErrorKind::Validation(format!(
                    "tier '{}' has no quota map",
                    tier
                ))))?;
            };
            let tier_categories: BTreeSet<CategoryId> = tier_quotas.keys().cloned().collect();
            if tier_categories.is_empty() {
                return Err(GateError::new(GateErrorKind::Validation(format!(
                    "tier '{}' defines no categories",
                    tier
                ))))?;
            }
            match &categories {
                None => categories = Some(tier_categories),
                Some(expected) if *expected != tier_categories => {
                    return Err(GateError::new(GateErrorKind::Validation(format!(
                        "tier '{}' disagrees with the shared category set",
                        tier
                    ))))?;
                }
                Some(_) => {}
            }
        }
        let categories = categories.unwrap_or_default();

        for (id, spec) in &features {
            if !categories.contains(spec.category()) {
                return Err(GateError::new(GateErrorKind::UnknownCategory(
                    spec.category().to_string(),
                )))?;
            }
            if *spec.cost() == 0 {
                return Err(GateError::new(GateErrorKind::Validation(format!(
                    "feature '{}' has zero cost",
                    id
                ))))?;
            }
        }

        Ok(Self {
            window,
            quotas,
            features,
        })
    }

    /// Length of the usage window.
    pub fn window(&self) -> Duration {
        self.window
    }

    /// Look up a feature specification.
    pub fn feature(&self, id: &FeatureId) -> Option<&FeatureSpec> {
        self.features.get(id)
    }

    /// Quota for a category at a tier.
    ///
    /// `None` only for categories outside the validated set.
    pub fn quota(&self, tier: Tier, category: &CategoryId) -> Option<Quota> {
        self.quotas.get(&tier).and_then(|q| q.get(category)).copied()
    }

    /// The shared category set.
    pub fn categories(&self) -> impl Iterator<Item = &CategoryId> {
        // All tiers share one category set post-validation; Free always exists.
        self.quotas.values().next().into_iter().flat_map(|q| q.keys())
    }

    /// Whether a category exists in the table.
    pub fn has_category(&self, category: &CategoryId) -> bool {
        self.quotas
            .values()
            .next()
            .is_some_and(|q| q.contains_key(category))
    }

    /// All known features, in stable id order.
    pub fn features(&self) -> impl Iterator<Item = &FeatureSpec> {
        self.features.values()
    }

    /// Visibility of every known feature at the given tier.
    ///
    /// Pure function of the tier and this table. Feature availability is
    /// monotonic in rank: anything unlocked at a tier stays unlocked at every
    /// higher tier.
    pub fn visibility_for(&self, tier: Tier) -> Vec<FeatureVisibility> {
        self.features
            .values()
            .map(|spec| {
                FeatureVisibility::new(
                    spec.id().clone(),
                    spec.category().clone(),
                    tier.unlocks(*spec.min_tier()),
                    *spec.min_tier(),
                )
            })
            .collect()
    }
}
