use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::RaffleError;
use crate::types::{Slot, SlotId, SlotUpdate};

/// Storage backend for the 100 board slots.
///
/// Every write is a single atomic step: a failed write leaves the row as it was.
#[async_trait]
pub trait SlotStore: Send + Sync {
    /// Seed all 100 free slots if the table is empty. Returns `true` when rows
    /// were inserted.
    async fn initialize_if_empty(&self) -> Result<bool, RaffleError>;

    /// Get a single slot.
    async fn get(&self, id: SlotId) -> Result<Option<Slot>, RaffleError>;

    /// Get every slot ordered by id ascending.
    async fn list_all(&self) -> Result<Vec<Slot>, RaffleError>;

    /// Overwrite the mutable fields of a slot. Returns `false` if the row does
    /// not exist.
    async fn update(&self, id: SlotId, update: SlotUpdate) -> Result<bool, RaffleError>;

    /// Take a slot only if it is currently free. Returns whether the row changed.
    ///
    /// This is the conditional "update where taken = false" step that keeps the
    /// one-claim invariant even when several processes share the store.
    async fn claim_if_free(
        &self,
        id: SlotId,
        name: &str,
        now: DateTime<Utc>,
    ) -> Result<bool, RaffleError>;

    /// Free every slot.
    ///
    /// The default implementation releases slot by slot; backends may override
    /// this with a single statement.
    async fn reset_all(&self, now: DateTime<Utc>) -> Result<(), RaffleError> {
        for id in SlotId::all() {
            self.update(id, SlotUpdate::released(now)).await?;
        }
        Ok(())
    }
}
