//! Quota and remaining-credit values.

use serde::{Deserialize, Serialize};

/// Per-window quota for one category at one tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Quota {
    /// At most this many counter units per window
    Limited(u32),
    /// No cap for this category
    Unlimited,
}

impl Quota {
    /// Whether this quota is the unlimited sentinel.
    pub fn is_unlimited(&self) -> bool {
        matches!(self, Quota::Unlimited)
    }

    /// Remaining credit given the current counter value.
    ///
    /// Saturates at zero when the counter sits above the quota, which happens
    /// transiently after a tier downgrade.
    pub fn remaining(&self, used: u32) -> Remaining {
        match self {
            Quota::Limited(limit) => Remaining::Limited(limit.saturating_sub(used)),
            Quota::Unlimited => Remaining::Unlimited,
        }
    }
}

/// Credit remaining in the current window, as reported to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Remaining {
    /// This many counter units left
    Limited(u32),
    /// No cap applies
    Unlimited,
}

impl Remaining {
    /// The remaining count, or `None` for unlimited.
    pub fn as_count(&self) -> Option<u32> {
        match self {
            Remaining::Limited(count) => Some(*count),
            Remaining::Unlimited => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remaining_saturates_when_over_quota() {
        assert_eq!(Quota::Limited(50).remaining(80), Remaining::Limited(0));
        assert_eq!(Quota::Limited(100).remaining(80), Remaining::Limited(20));
        assert_eq!(Quota::Unlimited.remaining(1_000_000), Remaining::Unlimited);
    }
}
