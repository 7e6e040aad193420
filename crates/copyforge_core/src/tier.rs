//! The closed subscription tier set.

use serde::{Deserialize, Serialize};

/// Subscription tier.
///
/// The tier set is closed and totally ordered: every principal holds exactly
/// one of these four values, and feature access compares numeric ranks, never
/// tier names.
///
/// # Examples
///
/// ```
/// use copyforge_core::Tier;
///
/// assert!(Tier::Pro.unlocks(Tier::Core));
/// assert!(!Tier::Free.unlocks(Tier::Core));
/// assert_eq!(Tier::ProPlus.rank(), 3);
/// ```
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Tier {
    /// Entry tier, no subscription
    Free,
    /// First paid tier
    Core,
    /// Professional tier
    Pro,
    /// Top tier, unlocks the Intelligence Suite
    ProPlus,
}

impl Tier {
    /// Ordered rank of this tier, Free = 0 through Pro+ = 3.
    pub fn rank(&self) -> u8 {
        match self {
            Tier::Free => 0,
            Tier::Core => 1,
            Tier::Pro => 2,
            Tier::ProPlus => 3,
        }
    }

    /// Human-facing label for this tier.
    pub fn label(&self) -> &'static str {
        match self {
            Tier::Free => "Free",
            Tier::Core => "Core",
            Tier::Pro => "Pro",
            Tier::ProPlus => "Pro+",
        }
    }

    /// Whether this tier meets or exceeds the given minimum tier.
    pub fn unlocks(&self, required: Tier) -> bool {
        self.rank() >= required.rank()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn ranks_are_strictly_increasing() {
        let ranks: Vec<u8> = Tier::iter().map(|t| t.rank()).collect();
        assert_eq!(ranks, vec![0, 1, 2, 3]);
    }

    #[test]
    fn parses_snake_case_names() {
        assert_eq!("pro_plus".parse::<Tier>().unwrap(), Tier::ProPlus);
        assert_eq!("free".parse::<Tier>().unwrap(), Tier::Free);
        assert!("platinum".parse::<Tier>().is_err());
    }
}
