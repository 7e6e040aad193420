//! PrincipalStore implementation backed by PostgreSQL.

use crate::models::{
    PrincipalRow, UsageCounterRow, principal_counter_rows, principal_to_new_row,
    rows_to_principal,
};
use crate::schema::{principals, usage_counters};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use copyforge_core::{
    CategoryId, DenyReason, FeatureId, GateDecision, Principal, PrincipalId, TierChange,
    TierTable, consume,
};
use copyforge_error::{CopyforgeResult, DatabaseError, DatabaseErrorKind};
use copyforge_interface::PrincipalStore;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use tracing::debug;

/// Database-backed principal store.
///
/// Every mutating operation runs inside one transaction that takes a
/// `SELECT … FOR UPDATE` row lock on the principal, so re-validation and
/// increment form a single critical section even across processes. Reads
/// from the same rows queue behind the lock; two concurrent consumers can
/// never both observe the same pre-increment counter.
#[derive(Clone)]
pub struct PostgresPrincipalStore {
    pool: Pool<ConnectionManager<PgConnection>>,
}

impl PostgresPrincipalStore {
    /// Create a store over an existing connection pool.
    pub fn new(pool: Pool<ConnectionManager<PgConnection>>) -> Self {
        Self { pool }
    }
}

fn get_conn(
    pool: &Pool<ConnectionManager<PgConnection>>,
) -> Result<diesel::r2d2::PooledConnection<ConnectionManager<PgConnection>>, DatabaseError> {
    pool.get()
        .map_err(|e| DatabaseError::new(DatabaseErrorKind::Connection(e.to_string())))
}

fn join_err(e: tokio::task::JoinError) -> DatabaseError {
    DatabaseError::new(DatabaseErrorKind::Query(e.to_string()))
}

/// Load a principal and its counters under a row lock.
fn load_for_update(
    conn: &mut PgConnection,
    id: &str,
) -> Result<Option<Principal>, DatabaseError> {
    let row: Option<PrincipalRow> = principals::table
        .find(id)
        .for_update()
        .first::<PrincipalRow>(conn)
        .optional()?;
    let Some(row) = row else {
        return Ok(None);
    };
    let counters: Vec<UsageCounterRow> = usage_counters::table
        .filter(usage_counters::principal_id.eq(id))
        .for_update()
        .load(conn)?;
    rows_to_principal(row, counters).map(Some)
}

/// Write back a mutated principal; no-op when nothing changed.
fn persist(
    conn: &mut PgConnection,
    before: &Principal,
    after: &Principal,
    now: DateTime<Utc>,
) -> Result<(), DatabaseError> {
    if before == after {
        return Ok(());
    }

    diesel::update(principals::table.find(after.id().as_str()))
        .set((
            principals::tier.eq(after.tier().to_string()),
            principals::window_anchor.eq(*after.window_anchor()),
            principals::pending_tier.eq(after
                .pending_change()
                .as_ref()
                .map(|change| change.tier().to_string())),
            principals::pending_tier_effective_at.eq(after
                .pending_change()
                .as_ref()
                .map(|change| *change.effective_at())),
            principals::updated_at.eq(now),
        ))
        .execute(conn)?;

    // Counter rows are replaced wholesale; the row lock makes this safe and
    // a rollover may have dropped categories.
    diesel::delete(
        usage_counters::table.filter(usage_counters::principal_id.eq(after.id().as_str())),
    )
    .execute(conn)?;
    let rows = principal_counter_rows(after);
    if !rows.is_empty() {
        diesel::insert_into(usage_counters::table)
            .values(&rows)
            .execute(conn)?;
    }
    Ok(())
}

#[async_trait]
impl PrincipalStore for PostgresPrincipalStore {
    async fn fetch(&self, id: &PrincipalId) -> CopyforgeResult<Option<Principal>> {
        let pool = self.pool.clone();
        let id = id.clone();

        let principal = tokio::task::spawn_blocking(move || {
            let mut conn = get_conn(&pool)?;
            let row: Option<PrincipalRow> = principals::table
                .find(id.as_str())
                .first::<PrincipalRow>(&mut conn)
                .optional()?;
            let Some(row) = row else {
                return Ok(None);
            };
            let counters: Vec<UsageCounterRow> = usage_counters::table
                .filter(usage_counters::principal_id.eq(id.as_str()))
                .load(&mut conn)?;
            rows_to_principal(row, counters).map(Some)
        })
        .await
        .map_err(join_err)?;

        Ok(principal?)
    }

    async fn insert(&self, principal: Principal) -> CopyforgeResult<()> {
        let pool = self.pool.clone();

        let result = tokio::task::spawn_blocking(move || {
            let mut conn = get_conn(&pool)?;
            conn.transaction::<_, DatabaseError, _>(|conn| {
                let now = Utc::now();
                diesel::insert_into(principals::table)
                    .values(principal_to_new_row(&principal, now))
                    .execute(conn)?;
                let rows = principal_counter_rows(&principal);
                if !rows.is_empty() {
                    diesel::insert_into(usage_counters::table)
                        .values(&rows)
                        .execute(conn)?;
                }
                Ok(())
            })
        })
        .await
        .map_err(join_err)?;

        Ok(result?)
    }

    async fn try_consume(
        &self,
        table: &TierTable,
        id: &PrincipalId,
        feature: &FeatureId,
        now: DateTime<Utc>,
    ) -> CopyforgeResult<GateDecision> {
        let pool = self.pool.clone();
        let table = table.clone();
        let id = id.clone();
        let feature = feature.clone();

        let decision = tokio::task::spawn_blocking(move || {
            let mut conn = get_conn(&pool)?;
            conn.transaction::<_, DatabaseError, _>(|conn| {
                let Some(mut principal) = load_for_update(conn, id.as_str())? else {
                    debug!(principal = %id, "consume for unknown principal");
                    return Ok(GateDecision::deny(DenyReason::PrincipalNotFound));
                };
                let before = principal.clone();
                let decision = consume(&table, &mut principal, &feature, now);
                persist(conn, &before, &principal, now)?;
                Ok(decision)
            })
        })
        .await
        .map_err(join_err)?;

        Ok(decision?)
    }

    async fn apply_tier_change(
        &self,
        id: &PrincipalId,
        change: TierChange,
        now: DateTime<Utc>,
    ) -> CopyforgeResult<()> {
        let pool = self.pool.clone();
        let id = id.clone();

        let result = tokio::task::spawn_blocking(move || {
            let mut conn = get_conn(&pool)?;
            conn.transaction::<_, DatabaseError, _>(|conn| {
                let Some(mut principal) = load_for_update(conn, id.as_str())? else {
                    return Err(DatabaseError::new(DatabaseErrorKind::NotFound));
                };
                let before = principal.clone();
                principal.promote_pending(now);
                principal.set_tier_change(change, now);
                persist(conn, &before, &principal, now)
            })
        })
        .await
        .map_err(join_err)?;

        Ok(result?)
    }

    async fn grant_bonus(
        &self,
        table: &TierTable,
        id: &PrincipalId,
        category: &CategoryId,
        amount: u32,
        now: DateTime<Utc>,
    ) -> CopyforgeResult<()> {
        let pool = self.pool.clone();
        let window = table.window();
        let id = id.clone();
        let category = category.clone();

        let result = tokio::task::spawn_blocking(move || {
            let mut conn = get_conn(&pool)?;
            conn.transaction::<_, DatabaseError, _>(|conn| {
                let Some(mut principal) = load_for_update(conn, id.as_str())? else {
                    return Err(DatabaseError::new(DatabaseErrorKind::NotFound));
                };
                let before = principal.clone();
                principal.roll_window(window, now);
                principal.grant_bonus(&category, amount);
                persist(conn, &before, &principal, now)
            })
        })
        .await
        .map_err(join_err)?;

        Ok(result?)
    }
}
