//! # Money Module
//!
//! Provides the `Money` type used for delivery zone prices.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  The settings document stores prices as plain JSON numbers (3.5).      │
//! │  Doing arithmetic or comparisons on those floats drifts:               │
//! │    0.1 + 0.2 = 0.30000000000000004                                      │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents                                            │
//! │    JSON 3.5 ──► 350 cents ──► (edit, validate) ──► JSON 3.5            │
//! │    Floats exist only at the document boundary                          │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use serali_core::money::Money;
//!
//! let price = Money::from_major_minor(3, 50);
//! assert_eq!(price.cents(), 350);
//! assert_eq!(serde_json::to_string(&price).unwrap(), "3.5");
//! ```

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit (cents).
///
/// ## Design Decisions
/// - **i64 (signed)**: a negative price must be representable so the
///   validator can reject it with a useful message
/// - **Decimal on the wire**: serialized as a JSON number of major units,
///   which is the shape older readers of the document expect
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents.
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Creates a Money value from major and minor units.
    ///
    /// ## Example
    /// ```rust
    /// use serali_core::money::Money;
    ///
    /// assert_eq!(Money::from_major_minor(5, 0).cents(), 500);
    /// assert_eq!(Money::from_major_minor(-1, 25).cents(), -125);
    /// ```
    ///
    /// ## Note
    /// For negative amounts, only the major unit should be negative.
    #[inline]
    pub const fn from_major_minor(major: i64, minor: i64) -> Self {
        if major < 0 {
            Money(major * 100 - minor)
        } else {
            Money(major * 100 + minor)
        }
    }

    /// Converts a decimal amount of major units, rounding to the nearest cent.
    ///
    /// Returns `None` for NaN and infinities.
    ///
    /// ## Example
    /// ```rust
    /// use serali_core::money::Money;
    ///
    /// assert_eq!(Money::from_decimal(3.5).unwrap().cents(), 350);
    /// assert_eq!(Money::from_decimal(0.015).unwrap().cents(), 2);
    /// assert!(Money::from_decimal(f64::NAN).is_none());
    /// ```
    pub fn from_decimal(amount: f64) -> Option<Self> {
        if !amount.is_finite() {
            return None;
        }
        Some(Money((amount * 100.0).round() as i64))
    }

    /// Returns the value in cents.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit portion.
    #[inline]
    pub const fn major(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit portion (always 0-99).
    #[inline]
    pub const fn minor_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Returns the amount as a decimal number of major units.
    ///
    /// Only meant for the document boundary.
    pub fn to_decimal(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display shows money as `$major.minor`.
///
/// ## Note
/// This is for messages and logs. The settings page formats prices itself.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}${}.{:02}", sign, self.major().abs(), self.minor_part())
    }
}

/// Whole amounts are written as integers (`5`), others as decimals (`3.5`).
impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.0 % 100 == 0 {
            serializer.serialize_i64(self.major())
        } else {
            serializer.serialize_f64(self.to_decimal())
        }
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let amount = f64::deserialize(deserializer)?;
        Money::from_decimal(amount)
            .ok_or_else(|| serde::de::Error::custom("price must be a finite number"))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
