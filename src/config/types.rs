//! Configuration types for the settlement engine.
//!
//! This module contains the strongly-typed configuration structure that
//! is deserialized from `engine.yaml`.

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::error::{EngineError, EngineResult};

/// Largest rounding scale accepted for emitted amounts.
pub const MAX_DECIMAL_PLACES: u32 = 10;

fn default_tolerance() -> Decimal {
    Decimal::new(1, 2)
}

fn default_decimal_places() -> u32 {
    2
}

fn default_category() -> String {
    "Other".to_string()
}

/// Tunables for every stage of the engine.
///
/// All fields have defaults, so an empty YAML document yields the same
/// configuration as [`EngineConfig::default`].
///
/// # Example
///
/// ```
/// use settle_engine::config::EngineConfig;
/// use rust_decimal::Decimal;
///
/// let config = EngineConfig::default();
/// assert_eq!(config.tolerance, Decimal::new(1, 2));
/// assert_eq!(config.decimal_places, 2);
/// assert_eq!(config.default_category, "Other");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EngineConfig {
    /// Threshold below which a balance or split discrepancy counts as zero.
    #[serde(default = "default_tolerance")]
    pub tolerance: Decimal,
    /// Scale used when rounding emitted instruction amounts.
    #[serde(default = "default_decimal_places")]
    pub decimal_places: u32,
    /// Skip splits flagged as settled when building the debt graph.
    #[serde(default)]
    pub exclude_settled_splits: bool,
    /// Category assigned to expenses recorded without one.
    #[serde(default = "default_category")]
    pub default_category: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tolerance: default_tolerance(),
            decimal_places: default_decimal_places(),
            exclude_settled_splits: false,
            default_category: default_category(),
        }
    }
}

impl EngineConfig {
    /// Returns the smallest amount representable at `decimal_places`.
    pub fn rounding_unit(&self) -> Decimal {
        Decimal::new(1, self.decimal_places)
    }

    /// Checks that every field is within its accepted range.
    pub fn validate(&self) -> EngineResult<()> {
        if self.tolerance <= Decimal::ZERO {
            return Err(EngineError::InvalidConfig {
                field: "tolerance".to_string(),
                message: format!("must be greater than zero, got {}", self.tolerance),
            });
        }
        if self.decimal_places > MAX_DECIMAL_PLACES {
            return Err(EngineError::InvalidConfig {
                field: "decimal_places".to_string(),
                message: format!(
                    "must be at most {}, got {}",
                    MAX_DECIMAL_PLACES, self.decimal_places
                ),
            });
        }
        if self.tolerance < self.rounding_unit() {
            return Err(EngineError::InvalidConfig {
                field: "tolerance".to_string(),
                message: format!(
                    "must be at least one rounding unit ({}), got {}",
                    self.rounding_unit(),
                    self.tolerance
                ),
            });
        }
        if self.default_category.trim().is_empty() {
            return Err(EngineError::InvalidConfig {
                field: "default_category".to_string(),
                message: "must not be blank".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(EngineConfig::default().validate().is_ok());
    }

    #[test]
    fn test_zero_tolerance_rejected() {
        let config = EngineConfig {
            tolerance: Decimal::ZERO,
            ..EngineConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(matches!(err, EngineError::InvalidConfig { ref field, .. } if field == "tolerance"));
    }

    #[test]
    fn test_excessive_decimal_places_rejected() {
        let config = EngineConfig {
            decimal_places: 11,
            ..EngineConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_tolerance_below_rounding_unit_rejected() {
        let config = EngineConfig {
            tolerance: Decimal::new(1, 3),
            decimal_places: 2,
            ..EngineConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("rounding unit"));
    }

    #[test]
    fn test_rounding_unit_follows_decimal_places() {
        let config = EngineConfig {
            decimal_places: 3,
            ..EngineConfig::default()
        };
        assert_eq!(config.rounding_unit(), Decimal::new(1, 3));
    }

    #[test]
    fn test_blank_default_category_rejected() {
        let config = EngineConfig {
            default_category: "  ".to_string(),
            ..EngineConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
