use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;

use crate::error::RaffleError;
use crate::slot_store::SlotStore;
use crate::types::{truncate_name, Slot, SlotId, SlotUpdate};

/// In-memory slot storage for tests and database-less runs.
///
/// Nothing survives a restart.
pub struct MemorySlotStore {
    slots: Mutex<Vec<Slot>>,
    /// When set, every call fails with [`RaffleError::Storage`].
    unavailable: AtomicBool,
}

impl MemorySlotStore {
    pub fn new() -> Self {
        Self {
            slots: Mutex::new(Vec::new()),
            unavailable: AtomicBool::new(false),
        }
    }

    /// Simulate the backing store going away (or coming back).
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check_available(&self, op: &str) -> Result<(), RaffleError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(RaffleError::Storage {
                reason: format!("memory slot store {op} failed: store marked unavailable"),
                source: None,
            });
        }
        Ok(())
    }
}

impl Default for MemorySlotStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SlotStore for MemorySlotStore {
    async fn initialize_if_empty(&self) -> Result<bool, RaffleError> {
        self.check_available("initialize")?;
        let mut slots = self.slots.lock();
        if !slots.is_empty() {
            return Ok(false);
        }
        let now = Utc::now();
        slots.extend(SlotId::all().map(|id| Slot::free(id, now)));
        Ok(true)
    }

    async fn get(&self, id: SlotId) -> Result<Option<Slot>, RaffleError> {
        self.check_available("get")?;
        let slots = self.slots.lock();
        Ok(slots.get(usize::from(id.value())).cloned())
    }

    async fn list_all(&self) -> Result<Vec<Slot>, RaffleError> {
        self.check_available("list_all")?;
        // Rows are seeded in id order and never reordered.
        Ok(self.slots.lock().clone())
    }

    async fn update(&self, id: SlotId, update: SlotUpdate) -> Result<bool, RaffleError> {
        self.check_available("update")?;
        let mut slots = self.slots.lock();
        let Some(slot) = slots.get_mut(usize::from(id.value())) else {
            return Ok(false);
        };
        slot.taken = update.taken;
        slot.claimant_name = update.claimant_name;
        slot.updated_at = update.updated_at;
        Ok(true)
    }

    async fn claim_if_free(
        &self,
        id: SlotId,
        name: &str,
        now: DateTime<Utc>,
    ) -> Result<bool, RaffleError> {
        self.check_available("claim_if_free")?;
        let mut slots = self.slots.lock();
        match slots.get_mut(usize::from(id.value())) {
            Some(slot) if !slot.taken => {
                slot.taken = true;
                slot.claimant_name = truncate_name(name);
                slot.updated_at = now;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn reset_all(&self, now: DateTime<Utc>) -> Result<(), RaffleError> {
        self.check_available("reset_all")?;
        let mut slots = self.slots.lock();
        for slot in slots.iter_mut() {
            slot.taken = false;
            slot.claimant_name.clear();
            slot.updated_at = now;
        }
        Ok(())
    }
}
