pub mod memory_slots;

#[cfg(feature = "sql")]
pub mod sql_slots;
