mod slot;
mod slot_id;

pub use slot::{truncate_name, Slot, SlotState, SlotUpdate, MAX_NAME_CHARS};
pub use slot_id::{SlotId, SlotIdError, MAX_SLOT_ID, SLOT_COUNT};
