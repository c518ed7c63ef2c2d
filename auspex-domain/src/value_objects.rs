//! Value Objects for the Auspex Domain
//!
//! Immutable, validated domain primitives.
//! All value objects enforce invariants at construction time.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Domain errors for value object validation
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomainError {
    /// Instrument symbol must be a non-empty alphanumeric token
    #[error("Invalid instrument: {0}")]
    InvalidInstrument(String),

    /// Quantity must be positive
    #[error("Invalid quantity: {0}")]
    InvalidQuantity(String),

    /// Direction must be "long" or "short"
    #[error("Invalid direction: {0}")]
    InvalidDirection(String),

    /// Trigger term must be non-empty
    #[error("Invalid trigger term: {0}")]
    InvalidTrigger(String),
}

// =============================================================================
// Instrument
// =============================================================================

/// Identifier for a tradeable asset (e.g., "ADA").
///
/// # Invariants
/// - Non-empty ASCII alphanumeric token
/// - Stored uppercase
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Instrument(String);

impl Instrument {
    /// Create a new Instrument with validation.
    ///
    /// # Errors
    /// Returns `DomainError::InvalidInstrument` for an empty or
    /// non-alphanumeric symbol.
    pub fn new(symbol: &str) -> Result<Self, DomainError> {
        let symbol = symbol.trim();
        if symbol.is_empty() {
            return Err(DomainError::InvalidInstrument(
                "Symbol must not be empty".to_string(),
            ));
        }
        if !symbol.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(DomainError::InvalidInstrument(format!(
                "Symbol must be alphanumeric: {}",
                symbol
            )));
        }
        Ok(Self(symbol.to_ascii_uppercase()))
    }

    /// Get the symbol as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Instrument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// =============================================================================
// Direction
// =============================================================================

/// Trade direction for an exposure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Open a long position
    Long,
    /// Open a short position
    Short,
}

impl Direction {
    /// Both directions, in registry provisioning order.
    pub fn all() -> [Direction; 2] {
        [Direction::Long, Direction::Short]
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Long => write!(f, "long"),
            Direction::Short => write!(f, "short"),
        }
    }
}

impl std::str::FromStr for Direction {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "long" => Ok(Direction::Long),
            "short" => Ok(Direction::Short),
            other => Err(DomainError::InvalidDirection(other.to_string())),
        }
    }
}

// =============================================================================
// Quantity
// =============================================================================

/// Quantity represents a positive decimal trade size.
///
/// # Invariants
/// - Must be > 0
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Quantity(Decimal);

impl Quantity {
    /// Create a new Quantity with validation.
    ///
    /// # Errors
    /// Returns `DomainError::InvalidQuantity` if value <= 0
    pub fn new(value: Decimal) -> Result<Self, DomainError> {
        if value <= Decimal::ZERO {
            return Err(DomainError::InvalidQuantity(
                "Quantity must be positive".to_string(),
            ));
        }
        Ok(Self(value))
    }

    /// Get the underlying Decimal value.
    pub fn as_decimal(&self) -> Decimal {
        self.0
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for Quantity {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s
            .trim()
            .parse::<Decimal>()
            .map_err(|e| DomainError::InvalidQuantity(format!("{}: {}", s, e)))?;
        Quantity::new(value)
    }
}

// =============================================================================
// Exposure Key
// =============================================================================

/// The (instrument, direction) pair identifying one persistent execution
/// surface. Unique across the registry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExposureKey {
    /// Instrument this exposure is on
    pub instrument: Instrument,
    /// Trade direction
    pub direction: Direction,
}

impl ExposureKey {
    /// Create a new exposure key.
    pub fn new(instrument: Instrument, direction: Direction) -> Self {
        Self {
            instrument,
            direction,
        }
    }
}

impl fmt::Display for ExposureKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.instrument, self.direction)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_instrument_uppercases() {
        let instrument = Instrument::new("ada").unwrap();
        assert_eq!(instrument.as_str(), "ADA");
    }

    #[test]
    fn test_instrument_rejects_empty() {
        assert!(Instrument::new("").is_err());
        assert!(Instrument::new("   ").is_err());
    }

    #[test]
    fn test_instrument_rejects_non_alphanumeric() {
        assert!(Instrument::new("ADA_USDT").is_err());
        assert!(Instrument::new("ADA/USDT").is_err());
    }

    #[test]
    fn test_direction_parse_and_display() {
        assert_eq!("long".parse::<Direction>().unwrap(), Direction::Long);
        assert_eq!(" SHORT ".parse::<Direction>().unwrap(), Direction::Short);
        assert!("sideways".parse::<Direction>().is_err());
        assert_eq!(Direction::Long.to_string(), "long");
        assert_eq!(Direction::Short.to_string(), "short");
    }

    #[test]
    fn test_quantity_must_be_positive() {
        assert!(Quantity::new(dec!(10)).is_ok());
        assert!(Quantity::new(dec!(0)).is_err());
        assert!(Quantity::new(dec!(-1)).is_err());
    }

    #[test]
    fn test_quantity_from_str() {
        let qty = "20".parse::<Quantity>().unwrap();
        assert_eq!(qty.as_decimal(), dec!(20));
        assert!("zero".parse::<Quantity>().is_err());
        assert!("-5".parse::<Quantity>().is_err());
    }

    #[test]
    fn test_exposure_key_identity() {
        let ada = Instrument::new("ADA").unwrap();
        let long = ExposureKey::new(ada.clone(), Direction::Long);
        let short = ExposureKey::new(ada.clone(), Direction::Short);

        assert_ne!(long, short);
        assert_eq!(long, ExposureKey::new(ada, Direction::Long));
        assert_eq!(long.to_string(), "ADA/long");
    }
}
