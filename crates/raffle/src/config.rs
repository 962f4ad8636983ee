use crate::error::RaffleError;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// How a claim with an empty name is handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NamePolicy {
    /// Reject the claim with a validation error.
    #[default]
    Strict,
    /// Record the configured placeholder name instead.
    Lenient,
}

/// How a claim on an already-taken slot is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TakenPolicy {
    /// Acknowledge as success without touching the existing claimant.
    #[default]
    Silent,
    /// Fail with [`RaffleError::SlotTaken`].
    Conflict,
}

impl FromStr for NamePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "strict" => Ok(Self::Strict),
            "lenient" => Ok(Self::Lenient),
            other => Err(format!(
                "unknown name policy {other:?} (expected strict or lenient)"
            )),
        }
    }
}

impl FromStr for TakenPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "silent" => Ok(Self::Silent),
            "conflict" => Ok(Self::Conflict),
            other => Err(format!(
                "unknown taken policy {other:?} (expected silent or conflict)"
            )),
        }
    }
}

impl fmt::Display for NamePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Strict => f.write_str("strict"),
            Self::Lenient => f.write_str("lenient"),
        }
    }
}

impl fmt::Display for TakenPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Silent => f.write_str("silent"),
            Self::Conflict => f.write_str("conflict"),
        }
    }
}

/// Configuration for a raffle board.
#[derive(Debug, Clone)]
pub struct RaffleConfig {
    /// Page and spreadsheet title. Default: "Rifa Fin de Año".
    pub title: String,
    /// Free-text prize description shown under the title.
    pub prize_text: String,
    /// Free-text draw date / price note shown next to the prize.
    pub date_text: String,
    /// Bank transfer details. Empty hides the bank section.
    pub bank_info: String,
    /// Numeric price of one slot, used for the collected total. Default: 10.0.
    pub price_per_slot: f64,
    /// Secret for release, reset and export. Empty disables those operations.
    pub admin_key: String,
    /// Secret that unlocks the admin panel and the admin session cookie.
    /// Empty disables the panel.
    pub admin_view_key: String,
    /// Empty-name handling on claim. Default: strict.
    pub name_policy: NamePolicy,
    /// Name recorded under [`NamePolicy::Lenient`]. Default: "Anónimo".
    pub name_placeholder: String,
    /// Already-taken handling on claim. Default: silent.
    pub taken_policy: TakenPolicy,
    /// Lifetime of the admin session cookie. Default: 24h.
    pub admin_session_max_age: Duration,
}

impl RaffleConfig {
    /// Validate configuration values.
    ///
    /// Checks:
    /// - `price_per_slot` is finite and not negative
    /// - `name_placeholder` is not blank under the lenient policy
    /// - `admin_session_max_age` is non-zero
    pub fn validate(&self) -> Result<(), RaffleError> {
        if !self.price_per_slot.is_finite() || self.price_per_slot < 0.0 {
            return Err(RaffleError::InvalidConfig {
                reason: format!(
                    "price_per_slot must be a finite value >= 0, got {}",
                    self.price_per_slot
                ),
            });
        }
        if self.name_policy == NamePolicy::Lenient && self.name_placeholder.trim().is_empty() {
            return Err(RaffleError::InvalidConfig {
                reason: "name_placeholder must not be empty with the lenient name policy"
                    .to_string(),
            });
        }
        if self.admin_session_max_age.is_zero() {
            return Err(RaffleError::InvalidConfig {
                reason: "admin_session_max_age must be > 0".to_string(),
            });
        }
        Ok(())
    }

    /// Parse a price the way the deployment environment supplies it, falling
    /// back to the default on garbage.
    pub fn parse_price(raw: &str) -> f64 {
        match raw.trim().parse::<f64>() {
            Ok(value) if value.is_finite() => value,
            _ => {
                tracing::warn!(raw = %raw, "unparseable slot price, using default");
                Self::default().price_per_slot
            }
        }
    }
}

impl Default for RaffleConfig {
    fn default() -> Self {
        Self {
            title: "Rifa Fin de Año".to_string(),
            prize_text: "Primer premio: Bolsa de Golf Wilson, Segundo Premio: Termo Stanley, Tercer Premio: Jarra Stanley".to_string(),
            date_text: "Valor 10 Mil pesos, Se sortea al venderse todos los numeros".to_string(),
            bank_info: String::new(),
            price_per_slot: 10.0,
            admin_key: String::new(),
            admin_view_key: String::new(),
            name_policy: NamePolicy::Strict,
            name_placeholder: "Anónimo".to_string(),
            taken_policy: TakenPolicy::Silent,
            admin_session_max_age: Duration::from_secs(86_400),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_values() {
        let config = RaffleConfig::default();
        assert_eq!(config.title, "Rifa Fin de Año");
        assert!(config.prize_text.starts_with("Primer premio"));
        assert!(!config.date_text.is_empty());
        assert_eq!(config.price_per_slot, 10.0);
        assert_eq!(config.name_policy, NamePolicy::Strict);
        assert_eq!(config.taken_policy, TakenPolicy::Silent);
        assert_eq!(config.admin_session_max_age, Duration::from_secs(86_400));
        assert!(config.admin_key.is_empty());
    }

    #[test]
    fn custom_config() {
        let config = RaffleConfig {
            price_per_slot: 2500.0,
            taken_policy: TakenPolicy::Conflict,
            ..Default::default()
        };
        assert_eq!(config.price_per_slot, 2500.0);
        assert_eq!(config.taken_policy, TakenPolicy::Conflict);
        // Other fields keep defaults
        assert_eq!(config.name_policy, NamePolicy::Strict);
    }

    #[test]
    fn default_config_is_valid() {
        RaffleConfig::default().validate().unwrap();
    }

    #[test]
    fn validate_negative_price() {
        let config = RaffleConfig {
            price_per_slot: -1.0,
            ..Default::default()
        };
        let msg = config.validate().unwrap_err().to_string();
        assert!(msg.contains("price_per_slot"), "got: {msg}");
    }

    #[test]
    fn validate_nan_price() {
        let config = RaffleConfig {
            price_per_slot: f64::NAN,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_blank_placeholder_only_matters_when_lenient() {
        let strict = RaffleConfig {
            name_placeholder: "  ".into(),
            ..Default::default()
        };
        strict.validate().unwrap();

        let lenient = RaffleConfig {
            name_policy: NamePolicy::Lenient,
            ..strict
        };
        let msg = lenient.validate().unwrap_err().to_string();
        assert!(msg.contains("name_placeholder"), "got: {msg}");
    }

    #[test]
    fn validate_zero_session_age() {
        let config = RaffleConfig {
            admin_session_max_age: Duration::ZERO,
            ..Default::default()
        };
        let msg = config.validate().unwrap_err().to_string();
        assert!(msg.contains("admin_session_max_age"), "got: {msg}");
    }

    #[test]
    fn parse_price_falls_back() {
        assert_eq!(RaffleConfig::parse_price("2500"), 2500.0);
        assert_eq!(RaffleConfig::parse_price(" 12.5 "), 12.5);
        assert_eq!(RaffleConfig::parse_price("diez"), 10.0);
        assert_eq!(RaffleConfig::parse_price("inf"), 10.0);
    }

    #[test]
    fn policies_parse_case_insensitively() {
        assert_eq!("STRICT".parse::<NamePolicy>().unwrap(), NamePolicy::Strict);
        assert_eq!(
            "lenient".parse::<NamePolicy>().unwrap(),
            NamePolicy::Lenient
        );
        assert_eq!(
            "Conflict".parse::<TakenPolicy>().unwrap(),
            TakenPolicy::Conflict
        );
        assert!("loud".parse::<TakenPolicy>().is_err());
        assert_eq!(TakenPolicy::Silent.to_string(), "silent");
    }
}
