use crate::types::{SlotId, SlotIdError};

/// Errors that can occur in the raffle system.
#[derive(Debug, thiserror::Error)]
pub enum RaffleError {
    #[error("invalid request: {reason}")]
    Validation { reason: String },

    #[error("not authorized")]
    Unauthorized,

    #[error("storage unavailable: {reason}")]
    Storage {
        reason: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("slot {slot} is already taken")]
    SlotTaken { slot: SlotId },

    #[error("export failed: {reason}")]
    Export {
        reason: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("invalid configuration: {reason}")]
    InvalidConfig { reason: String },
}

impl RaffleError {
    /// Shorthand for a storage failure with an underlying cause.
    pub fn storage(
        reason: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Storage {
            reason: reason.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Whether the caller may retry the same request later.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Storage { .. })
    }
}

impl From<SlotIdError> for RaffleError {
    fn from(err: SlotIdError) -> Self {
        Self::Validation {
            reason: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_messages() {
        let err = RaffleError::SlotTaken {
            slot: SlotId::validated(7).unwrap(),
        };
        assert_eq!(err.to_string(), "slot 07 is already taken");

        let err = RaffleError::Storage {
            reason: "connection refused".into(),
            source: None,
        };
        assert_eq!(err.to_string(), "storage unavailable: connection refused");

        assert_eq!(RaffleError::Unauthorized.to_string(), "not authorized");
    }

    #[test]
    fn slot_id_errors_become_validation() {
        let err: RaffleError = "7".parse::<SlotId>().unwrap_err().into();
        assert!(matches!(err, RaffleError::Validation { .. }));
        assert!(!err.is_transient());
    }

    #[test]
    fn only_storage_is_transient() {
        let err = RaffleError::storage("down", std::io::Error::other("boom"));
        assert!(err.is_transient());
        assert!(!RaffleError::Unauthorized.is_transient());
    }

    #[test]
    fn errors_are_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<RaffleError>();
    }
}
