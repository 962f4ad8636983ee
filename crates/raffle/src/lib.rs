//! Numbered-slot raffle board.
//!
//! One hundred slots (`00`–`99`) can each be claimed once under a participant
//! name. An administrator can release single slots, reset the board, and export
//! the participants as spreadsheets.
//!
//! ```text
//! use raffle::prelude::*;
//!
//! let store = Arc::new(MemorySlotStore::new());
//! let service = RaffleService::new(store, Arc::new(RaffleConfig::default()),
//!     Arc::new(RaffleMetrics::unregistered()))?;
//! service.init().await?;
//! service.claim("07", "Ana").await?;
//! ```

pub mod auth;
pub mod config;
pub mod error;
pub mod export;
pub mod metrics;
pub mod reservation;
pub mod service;
pub mod slot_store;
pub mod storage;
pub mod testing;
pub mod types;

/// Prelude module for convenient glob imports.
pub mod prelude {
    pub use crate::config::{NamePolicy, RaffleConfig, TakenPolicy};
    pub use crate::error::RaffleError;
    pub use crate::export::{ExportFile, ReportKind};
    pub use crate::metrics::RaffleMetrics;
    pub use crate::service::{ClaimOutcome, RaffleService};
    pub use crate::slot_store::SlotStore;
    pub use crate::storage::memory_slots::MemorySlotStore;
    pub use crate::types::{Slot, SlotId, SlotState};
}
