use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Number of slots on the board.
pub const SLOT_COUNT: u8 = 100;

/// Highest valid slot number.
pub const MAX_SLOT_ID: u8 = SLOT_COUNT - 1; // 99

/// Identifies one of the 100 raffle slots (valid range 0-99).
///
/// The wire form is always the two-digit, zero-padded numeral (`"07"`), which is
/// what [`FromStr`] accepts and what [`fmt::Display`] produces. Use
/// [`SlotId::validated`] when starting from an integer.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
pub struct SlotId(u8);

impl SlotId {
    /// Get the inner integer value.
    pub fn value(&self) -> u8 {
        self.0
    }

    /// Create a new `SlotId` with validation.
    ///
    /// Returns `Err` if the value is outside the valid range `0..=99`.
    pub fn validated(id: i64) -> Result<Self, SlotIdError> {
        if !(0..=i64::from(MAX_SLOT_ID)).contains(&id) {
            return Err(SlotIdError::OutOfRange { value: id });
        }
        Ok(Self(id as u8))
    }

    /// Iterate over every slot id in ascending order.
    pub fn all() -> impl Iterator<Item = SlotId> {
        (0..SLOT_COUNT).map(SlotId)
    }
}

/// Error returned when a slot number is malformed or out of range.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SlotIdError {
    #[error("slot number must be two digits (00-99), got {input:?}")]
    Malformed { input: String },

    #[error("slot {value} is out of range (valid: 0..=99)")]
    OutOfRange { value: i64 },
}

impl FromStr for SlotId {
    type Err = SlotIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = s.as_bytes();
        if bytes.len() != 2 || !bytes.iter().all(u8::is_ascii_digit) {
            return Err(SlotIdError::Malformed {
                input: s.to_string(),
            });
        }
        Ok(Self((bytes[0] - b'0') * 10 + (bytes[1] - b'0')))
    }
}

impl fmt::Display for SlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_two_digit_numerals() {
        assert_eq!("00".parse::<SlotId>().unwrap().value(), 0);
        assert_eq!("07".parse::<SlotId>().unwrap().value(), 7);
        assert_eq!("99".parse::<SlotId>().unwrap().value(), 99);
    }

    #[test]
    fn rejects_malformed_numerals() {
        for input in ["", "7", "100", "-1", "ab", "0x", " 7", "٠٧"] {
            let err = input.parse::<SlotId>().unwrap_err();
            assert!(
                matches!(err, SlotIdError::Malformed { .. }),
                "{input:?} -> {err:?}"
            );
        }
    }

    #[test]
    fn validated_range() {
        assert!(SlotId::validated(0).is_ok());
        assert!(SlotId::validated(99).is_ok());
        assert_eq!(
            SlotId::validated(100).unwrap_err(),
            SlotIdError::OutOfRange { value: 100 }
        );
        assert!(SlotId::validated(-1).is_err());
    }

    #[test]
    fn display_is_zero_padded() {
        assert_eq!(SlotId::validated(7).unwrap().to_string(), "07");
        assert_eq!(SlotId::validated(42).unwrap().to_string(), "42");
    }

    #[test]
    fn all_covers_board_in_order() {
        let ids: Vec<u8> = SlotId::all().map(|id| id.value()).collect();
        assert_eq!(ids.len(), 100);
        assert_eq!(ids.first(), Some(&0));
        assert_eq!(ids.last(), Some(&99));
        assert!(ids.windows(2).all(|w| w[0] < w[1]));
    }
}
