//! SQL-backed slot storage using PostgreSQL via sqlx.
//!
//! Table:
//! - `raffle_slots`: one row per board slot, ids 0..=99
//!
//! This module is only available when the `sql` feature is enabled.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgPool;

use crate::error::RaffleError;
use crate::slot_store::SlotStore;
use crate::types::{truncate_name, Slot, SlotId, SlotUpdate};

type SlotRow = (i16, bool, String, DateTime<Utc>);

/// Seeds the 100 free rows on an empty table. Instances starting together
/// may both pass the `NOT EXISTS` check; the conflict clause makes the loser
/// a no-op.
const SEED_SLOTS_SQL: &str = r#"
    INSERT INTO raffle_slots (id, taken, name, updated_at)
    SELECT g, FALSE, '', NOW()
    FROM generate_series(0, 99) AS g
    WHERE NOT EXISTS (SELECT 1 FROM raffle_slots)
    ON CONFLICT (id) DO NOTHING
"#;

fn slot_from_row((id, taken, claimant_name, updated_at): SlotRow) -> Result<Slot, RaffleError> {
    let id = SlotId::validated(i64::from(id)).map_err(|e| RaffleError::Storage {
        reason: format!("corrupt slot row: {e}"),
        source: None,
    })?;
    Ok(Slot {
        id,
        taken,
        claimant_name,
        updated_at,
    })
}

/// PostgreSQL-backed slot storage.
pub struct SqlSlotStore {
    pool: PgPool,
}

impl SqlSlotStore {
    /// Create a new SQL slot store with the given connection pool.
    ///
    /// Call [`init_schema()`](Self::init_schema) before first use.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Ensure the `raffle_slots` table exists.
    ///
    /// Safe to call on every startup.
    pub async fn init_schema(&self) -> Result<(), RaffleError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS raffle_slots (
                id SMALLINT PRIMARY KEY,
                taken BOOLEAN NOT NULL DEFAULT FALSE,
                name VARCHAR(80) NOT NULL DEFAULT '',
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                CONSTRAINT raffle_slots_id_range CHECK (id BETWEEN 0 AND 99),
                CONSTRAINT raffle_slots_name_iff_taken CHECK (taken = (name <> ''))
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| RaffleError::storage(format!("failed to create slot table: {e}"), e))?;

        Ok(())
    }
}

#[async_trait]
impl SlotStore for SqlSlotStore {
    async fn initialize_if_empty(&self) -> Result<bool, RaffleError> {
        let result = sqlx::query(SEED_SLOTS_SQL)
            .execute(&self.pool)
            .await
            .map_err(|e| RaffleError::storage(format!("slot store initialize failed: {e}"), e))?;

        Ok(result.rows_affected() > 0)
    }

    async fn get(&self, id: SlotId) -> Result<Option<Slot>, RaffleError> {
        let row = sqlx::query_as::<_, SlotRow>(
            "SELECT id, taken, name, updated_at FROM raffle_slots WHERE id = $1",
        )
        .bind(i16::from(id.value()))
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RaffleError::storage(format!("slot store get failed: {e}"), e))?;

        row.map(slot_from_row).transpose()
    }

    async fn list_all(&self) -> Result<Vec<Slot>, RaffleError> {
        let rows = sqlx::query_as::<_, SlotRow>(
            "SELECT id, taken, name, updated_at FROM raffle_slots ORDER BY id ASC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RaffleError::storage(format!("slot store list_all failed: {e}"), e))?;

        rows.into_iter().map(slot_from_row).collect()
    }

    async fn update(&self, id: SlotId, update: SlotUpdate) -> Result<bool, RaffleError> {
        let result = sqlx::query(
            "UPDATE raffle_slots SET taken = $2, name = $3, updated_at = $4 WHERE id = $1",
        )
        .bind(i16::from(id.value()))
        .bind(update.taken)
        .bind(truncate_name(&update.claimant_name))
        .bind(update.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| RaffleError::storage(format!("slot store update failed: {e}"), e))?;

        Ok(result.rows_affected() == 1)
    }

    async fn claim_if_free(
        &self,
        id: SlotId,
        name: &str,
        now: DateTime<Utc>,
    ) -> Result<bool, RaffleError> {
        let result = sqlx::query(
            "UPDATE raffle_slots SET taken = TRUE, name = $2, updated_at = $3
             WHERE id = $1 AND taken = FALSE",
        )
        .bind(i16::from(id.value()))
        .bind(truncate_name(name))
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| RaffleError::storage(format!("slot store claim failed: {e}"), e))?;

        Ok(result.rows_affected() == 1)
    }

    async fn reset_all(&self, now: DateTime<Utc>) -> Result<(), RaffleError> {
        sqlx::query("UPDATE raffle_slots SET taken = FALSE, name = '', updated_at = $1")
            .bind(now)
            .execute(&self.pool)
            .await
            .map_err(|e| RaffleError::storage(format!("slot store reset failed: {e}"), e))?;

        Ok(())
    }
}
