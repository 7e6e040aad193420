//! Feature and category identifiers with their static specifications.

use crate::Tier;
use serde::{Deserialize, Serialize};

/// Identifier of a gated feature (e.g. `blog_outline`).
///
/// Feature ids are opaque to the gate; they are validated against the static
/// feature table at startup and resolved to a [`FeatureSpec`] per request.
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
pub struct FeatureId(String);

impl FeatureId {
    /// Create a feature id from a raw name.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The raw feature name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for FeatureId {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// Identifier of a feature category (e.g. `text_generation`).
///
/// Categories are the unit of quota accounting: each tier defines one quota
/// per category, and every feature belongs to exactly one category.
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
pub struct CategoryId(String);

impl CategoryId {
    /// Create a category id from a raw name.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The raw category name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for CategoryId {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// Static specification of a single feature.
///
/// Resolved from the tier table per request: the category it debits, the
/// minimum tier that unlocks it, and its cost in counter units per use.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, derive_getters::Getters)]
pub struct FeatureSpec {
    /// Feature identifier
    id: FeatureId,
    /// Category whose counter this feature debits
    category: CategoryId,
    /// Minimum tier required to invoke the feature
    min_tier: Tier,
    /// Cost in counter units per use
    cost: u32,
}

impl FeatureSpec {
    /// Create a new feature specification.
    pub fn new(id: FeatureId, category: CategoryId, min_tier: Tier, cost: u32) -> Self {
        Self {
            id,
            category,
            min_tier,
            cost,
        }
    }
}
