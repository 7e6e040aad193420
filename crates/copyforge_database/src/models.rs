//! Row models and conversions between rows and domain types.

use crate::schema::{principals, usage_counters};
use chrono::{DateTime, Utc};
use copyforge_core::{CategoryId, Principal, PrincipalId, Tier, TierChange};
use copyforge_error::{DatabaseError, DatabaseErrorKind};
use diesel::prelude::*;
use std::collections::{BTreeMap, BTreeSet};

/// A stored principal record.
#[derive(Debug, Clone, Queryable, Selectable, Identifiable, AsChangeset)]
#[diesel(table_name = principals)]
pub struct PrincipalRow {
    /// Principal identifier (primary key)
    pub id: String,
    /// Current tier name
    pub tier: String,
    /// Start of the current usage window
    pub window_anchor: DateTime<Utc>,
    /// Pending tier name, if a change is scheduled
    pub pending_tier: Option<String>,
    /// When the pending change takes effect
    pub pending_tier_effective_at: Option<DateTime<Utc>>,
    /// Row creation instant
    pub created_at: DateTime<Utc>,
    /// Last mutation instant
    pub updated_at: DateTime<Utc>,
}

/// Insertable principal record.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = principals)]
pub struct NewPrincipalRow {
    /// Principal identifier
    pub id: String,
    /// Tier name
    pub tier: String,
    /// Start of the first usage window
    pub window_anchor: DateTime<Utc>,
    /// Pending tier name
    pub pending_tier: Option<String>,
    /// When the pending change takes effect
    pub pending_tier_effective_at: Option<DateTime<Utc>>,
    /// Row creation instant
    pub created_at: DateTime<Utc>,
    /// Last mutation instant
    pub updated_at: DateTime<Utc>,
}

/// One per-category counter row for a principal.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = usage_counters)]
pub struct UsageCounterRow {
    /// Owning principal
    pub principal_id: String,
    /// Category name
    pub category: String,
    /// Counter units consumed this window
    pub used: i64,
    /// Bonus credits granted this window
    pub bonus: i64,
}

fn parse_tier(name: &str) -> Result<Tier, DatabaseError> {
    name.parse().map_err(|_| {
        DatabaseError::new(DatabaseErrorKind::Conversion(format!(
            "stored tier '{}' is outside the tier set",
            name
        )))
    })
}

fn count_from_row(value: i64, column: &str) -> Result<u32, DatabaseError> {
    u32::try_from(value).map_err(|_| {
        DatabaseError::new(DatabaseErrorKind::Conversion(format!(
            "stored {} value {} does not fit a counter",
            column, value
        )))
    })
}

/// Assemble a domain principal from its rows.
pub(crate) fn rows_to_principal(
    row: PrincipalRow,
    counter_rows: Vec<UsageCounterRow>,
) -> Result<Principal, DatabaseError> {
    let tier = parse_tier(&row.tier)?;
    let pending_change = match (row.pending_tier.as_deref(), row.pending_tier_effective_at) {
        (Some(name), Some(effective_at)) => Some(TierChange::new(parse_tier(name)?, effective_at)),
        (None, None) => None,
        _ => {
            return Err(DatabaseError::new(DatabaseErrorKind::Conversion(format!(
                "principal '{}' has a half-set pending tier change",
                row.id
            ))));
        }
    };

    let mut counters = BTreeMap::new();
    let mut bonus = BTreeMap::new();
    for counter in counter_rows {
        let category = CategoryId::new(counter.category.as_str());
        let used = count_from_row(counter.used, "used")?;
        if used > 0 {
            counters.insert(category.clone(), used);
        }
        let credit = count_from_row(counter.bonus, "bonus")?;
        if credit > 0 {
            bonus.insert(category, credit);
        }
    }

    Principal::builder()
        .id(PrincipalId::new(row.id.as_str()))
        .tier(tier)
        .window_anchor(row.window_anchor)
        .pending_change(pending_change)
        .counters(counters)
        .bonus(bonus)
        .build()
        .map_err(|e| DatabaseError::new(DatabaseErrorKind::Conversion(e.to_string())))
}

/// Counter rows for every category the principal currently tracks.
pub(crate) fn principal_counter_rows(principal: &Principal) -> Vec<UsageCounterRow> {
    let categories: BTreeSet<&CategoryId> = principal
        .counters()
        .keys()
        .chain(principal.bonus().keys())
        .collect();

    categories
        .into_iter()
        .map(|category| UsageCounterRow {
            principal_id: principal.id().to_string(),
            category: category.to_string(),
            used: i64::from(principal.used(category)),
            bonus: i64::from(principal.bonus_for(category)),
        })
        .collect()
}

/// Insertable row for a freshly registered principal.
pub(crate) fn principal_to_new_row(principal: &Principal, now: DateTime<Utc>) -> NewPrincipalRow {
    NewPrincipalRow {
        id: principal.id().to_string(),
        tier: principal.tier().to_string(),
        window_anchor: *principal.window_anchor(),
        pending_tier: principal
            .pending_change()
            .as_ref()
            .map(|change| change.tier().to_string()),
        pending_tier_effective_at: principal
            .pending_change()
            .as_ref()
            .map(|change| *change.effective_at()),
        created_at: now,
        updated_at: now,
    }
}
