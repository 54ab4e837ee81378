//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │    0.1 + 0.2 = 0.30000000000000004                                      │
//! │                                                                         │
//! │  OUR SOLUTION: Integer minor units (cents)                              │
//! │    Every price, subtotal, VAT amount and payment is an i64 of cents.   │
//! │    Decimals only exist at the edge, where the caller hands us a price  │
//! │    or a payment, and are converted ONCE with from_decimal_truncated.   │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use stockflow_core::money::Money;
//!
//! let price = Money::from_cents(1099); // 10.99
//! let line = price.multiply_quantity(3).unwrap();
//! assert_eq!(line.cents(), 3297);
//!
//! // Overflow is reported, never wrapped
//! assert!(Money::from_cents(i64::MAX).multiply_quantity(2).is_none());
//!
//! // Decimal input is truncated, never rounded
//! assert_eq!(Money::from_decimal_truncated(19.995).cents(), 1999);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

use crate::types::TaxRate;

/// Basis points in 100 %.
const BPS_SCALE: i128 = 10_000;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit (cents).
///
/// ## Design Decisions
/// - **i64 (signed)**: payment differences can go negative before clamping
/// - **Single field tuple struct**: zero-cost abstraction over i64
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents (the smallest currency unit).
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Converts a decimal amount to minor units by multiplying by 100 and
    /// truncating toward zero.
    ///
    /// Truncation is the pricing policy: a fractional cent is dropped, not
    /// rounded. Binary floating point means some inputs land just below the
    /// next cent and lose it:
    ///
    /// ```rust
    /// use stockflow_core::money::Money;
    ///
    /// assert_eq!(Money::from_decimal_truncated(10.00).cents(), 1000);
    /// assert_eq!(Money::from_decimal_truncated(19.995).cents(), 1999);
    /// assert_eq!(Money::from_decimal_truncated(0.29).cents(), 28);
    /// ```
    ///
    /// Non-finite input maps to zero and values past `i64` saturate; callers
    /// validate with
    /// [`validate_decimal_amount`](crate::validation::validate_decimal_amount)
    /// first.
    #[inline]
    pub fn from_decimal_truncated(amount: f64) -> Self {
        if !amount.is_finite() {
            return Money::zero();
        }
        Money((amount * 100.0).trunc() as i64)
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

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Clamps negative values to zero.
    ///
    /// Used for the amount due: overpaying never produces a negative due.
    #[inline]
    pub const fn clamp_non_negative(&self) -> Self {
        if self.0 < 0 {
            Money(0)
        } else {
            Money(self.0)
        }
    }

    /// Multiplies money by a quantity, `None` on overflow.
    ///
    /// ```rust
    /// use stockflow_core::money::Money;
    ///
    /// let unit_price = Money::from_cents(299);
    /// assert_eq!(unit_price.multiply_quantity(3).unwrap().cents(), 897);
    /// ```
    #[inline]
    pub fn multiply_quantity(&self, qty: i64) -> Option<Self> {
        self.0.checked_mul(qty).map(Money)
    }

    /// Checked addition, `None` on overflow.
    #[inline]
    pub fn checked_add(self, other: Money) -> Option<Self> {
        self.0.checked_add(other.0).map(Money)
    }

    /// Checked subtraction, `None` on overflow.
    #[inline]
    pub fn checked_sub(self, other: Money) -> Option<Self> {
        self.0.checked_sub(other.0).map(Money)
    }

    /// Tax to add on top of this amount: `floor(amount × rate)`.
    ///
    /// ```rust
    /// use stockflow_core::money::Money;
    /// use stockflow_core::types::TaxRate;
    ///
    /// let tax = Money::from_cents(2000).tax_on_top(TaxRate::from_bps(1600));
    /// assert_eq!(tax.cents(), 320);
    /// ```
    pub fn tax_on_top(&self, rate: TaxRate) -> Money {
        let scaled = self.0 as i128 * rate.bps() as i128;
        Money::from_cents(scaled.div_euclid(BPS_SCALE) as i64)
    }

    /// Tax already embedded in this amount: `floor(amount × rate / (1 + rate))`.
    ///
    /// Extracted for display only; it is never added to a total again.
    ///
    /// ```rust
    /// use stockflow_core::money::Money;
    /// use stockflow_core::types::TaxRate;
    ///
    /// let vat = Money::from_cents(11600).tax_included(TaxRate::from_bps(1600));
    /// assert_eq!(vat.cents(), 1600);
    /// ```
    pub fn tax_included(&self, rate: TaxRate) -> Money {
        let scaled = self.0 as i128 * rate.bps() as i128;
        let divisor = BPS_SCALE + rate.bps() as i128;
        Money::from_cents(scaled.div_euclid(divisor) as i64)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Debug-friendly rendering. Currency symbols are the UI's job.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}{}.{:02}", sign, self.major().abs(), self.minor_part())
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
