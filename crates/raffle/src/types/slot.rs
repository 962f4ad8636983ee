use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::SlotId;

/// Maximum number of characters kept from a claimant name.
pub const MAX_NAME_CHARS: usize = 80;

/// One row of the board.
///
/// `taken == false` always goes together with an empty `claimant_name`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot {
    pub id: SlotId,
    pub taken: bool,
    pub claimant_name: String,
    pub updated_at: DateTime<Utc>,
}

impl Slot {
    /// A free slot stamped with `now`.
    pub fn free(id: SlotId, now: DateTime<Utc>) -> Self {
        Self {
            id,
            taken: false,
            claimant_name: String::new(),
            updated_at: now,
        }
    }
}

/// Field values written by an unconditional [`SlotStore::update`](crate::slot_store::SlotStore::update).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotUpdate {
    pub taken: bool,
    pub claimant_name: String,
    pub updated_at: DateTime<Utc>,
}

impl SlotUpdate {
    /// Mark the slot taken by `name` (truncated to [`MAX_NAME_CHARS`]).
    pub fn claimed(name: &str, now: DateTime<Utc>) -> Self {
        Self {
            taken: true,
            claimant_name: truncate_name(name),
            updated_at: now,
        }
    }

    /// Mark the slot free.
    pub fn released(now: DateTime<Utc>) -> Self {
        Self {
            taken: false,
            claimant_name: String::new(),
            updated_at: now,
        }
    }
}

/// Truncate to at most [`MAX_NAME_CHARS`] characters without splitting a code point.
pub fn truncate_name(name: &str) -> String {
    match name.char_indices().nth(MAX_NAME_CHARS) {
        Some((byte_idx, _)) => name[..byte_idx].to_string(),
        None => name.to_string(),
    }
}

/// Public projection of a slot used by the page and the polling endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotState {
    pub id: u8,
    /// Two-digit form (`"07"`).
    pub num: String,
    pub taken: bool,
    pub name: String,
}

impl From<&Slot> for SlotState {
    fn from(slot: &Slot) -> Self {
        Self {
            id: slot.id.value(),
            num: slot.id.to_string(),
            taken: slot.taken,
            name: slot.claimant_name.clone(),
        }
    }
}
