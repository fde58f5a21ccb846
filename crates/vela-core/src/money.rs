//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In JavaScript/floating point:                                          │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  In the old checkout screen:                                            │
//! │    R$90,00 / 3 payments = R$30,000000000000004 → toFixed(2) strings    │
//! │    and the sum of payments drifted off the sale total.                  │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Centavos                                         │
//! │    9000 cents / 3 = 3000 cents each, and when it does not divide       │
//! │    evenly the LAST share absorbs the remainder - explicitly.           │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use vela_core::money::Money;
//!
//! // Create from cents (preferred)
//! let price = Money::from_cents(10_050); // R$100,50
//!
//! // Arithmetic operations
//! let total = price + Money::from_cents(500);
//!
//! // NEVER do this:
//! // let bad = Money::from_float(100.50); // NO SUCH METHOD EXISTS!
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use ts_rs::TS;

use crate::fees::FeeRate;

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in the smallest currency unit (centavos).
///
/// ## Design Decisions
/// - **i64 (signed)**: Allows negative values for corrections and refunds
/// - **Single field tuple struct**: Zero-cost abstraction over i64
/// - **Derives**: Full serde support for JSON serialization
///
/// ## Where Money Flows
/// ```text
/// Catalog.unit_amount ──► CartItem.unit_amount ──► Cart.subtotal
///                                                       │
///      Cart.discount_amount ◄── FeeRate.percentage ◄────┤
///                                                       ▼
///      Cart.base_total ──► PaymentPlan shares ──► surcharge ──► final total
///                                                       │
///                                      PaymentInstruction.amount
///
/// EVERY monetary value in the engine flows through this type.
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents (the smallest currency unit).
    ///
    /// ## Example
    /// ```rust
    /// use vela_core::money::Money;
    ///
    /// let price = Money::from_cents(10_050); // Represents R$100,50
    /// assert_eq!(price.cents(), 10_050);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Returns the value in cents (smallest currency unit).
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
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

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Returns the absolute value.
    #[inline]
    pub const fn abs(&self) -> Self {
        Money(self.0.abs())
    }

    /// Calculates a percentage of this amount, rounding half-up to the
    /// nearest cent.
    ///
    /// ## Implementation
    /// Integer math only: `(cents * bps + 5000) / 10000`.
    /// The +5000 provides the half-up rounding (5000/10000 = 0.5).
    /// i128 intermediate prevents overflow on large amounts.
    ///
    /// ## Example
    /// ```rust
    /// use vela_core::money::Money;
    /// use vela_core::fees::FeeRate;
    ///
    /// let subtotal = Money::from_cents(10_000); // R$100,00
    /// let discount = subtotal.percentage_of(FeeRate::from_percent(10));
    /// assert_eq!(discount.cents(), 1_000); // R$10,00
    ///
    /// // Rounding: 3333 × 5% = 166,65 → 167
    /// let share = Money::from_cents(3_333);
    /// assert_eq!(share.percentage_of(FeeRate::from_bps(500)).cents(), 167);
    /// ```
    pub fn percentage_of(&self, rate: FeeRate) -> Money {
        let cents = (self.0 as i128 * rate.bps() as i128 + 5000) / 10000;
        Money::from_cents(cents as i64)
    }

    /// Splits this amount into `n` shares that sum **exactly** to the total.
    ///
    /// ## Remainder Policy
    /// ```text
    /// ┌─────────────────────────────────────────────────────────────────────┐
    /// │  split_evenly(10_501, 3)                                            │
    /// │                                                                     │
    /// │  floor(10501 / 3) = 3500                                            │
    /// │                                                                     │
    /// │  share[0] = 3500                                                    │
    /// │  share[1] = 3500                                                    │
    /// │  share[2] = 3501  ◄── LAST share absorbs the remainder             │
    /// │                                                                     │
    /// │  3500 + 3500 + 3501 = 10501  ✓ not a cent lost or invented         │
    /// └─────────────────────────────────────────────────────────────────────┘
    /// ```
    ///
    /// The last-in-order carrier is a deliberate, testable tie-break: the
    /// final payment instruction in creation order always carries any
    /// leftover cents.
    ///
    /// ## Panics
    /// Panics if `n == 0`. Splitting across zero shares is a programmer
    /// error, not an operator error - fail fast.
    pub fn split_evenly(&self, n: usize) -> Vec<Money> {
        assert!(n > 0, "cannot split money across zero shares");

        let base = self.0 / n as i64;
        let mut shares = vec![Money::from_cents(base); n];
        // Whatever integer division dropped lands on the last share.
        shares[n - 1] = Money::from_cents(self.0 - base * (n as i64 - 1));
        shares
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display implementation shows money in a human-readable BRL format.
///
/// ## Note
/// This is for debugging and logs. Use frontend formatting for actual UI
/// display to handle localization properly.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(
            f,
            "{}R${},{:02}",
            sign,
            (self.0 / 100).abs(),
            (self.0 % 100).abs()
        )
    }
}

/// Default money is zero.
impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

/// Addition of two Money values.
impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

/// Addition assignment (+=).
impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

/// Subtraction of two Money values.
impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

/// Subtraction assignment (-=).
impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

/// Multiplication by i64 (for quantity calculations).
impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

/// Sums an iterator of Money values.
impl std::iter::Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_cents() {
        let money = Money::from_cents(10_050);
        assert_eq!(money.cents(), 10_050);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Money::from_cents(10_050)), "R$100,50");
        assert_eq!(format!("{}", Money::from_cents(500)), "R$5,00");
        assert_eq!(format!("{}", Money::from_cents(-550)), "-R$5,50");
        assert_eq!(format!("{}", Money::from_cents(0)), "R$0,00");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(500);

        assert_eq!((a + b).cents(), 1500);
        assert_eq!((a - b).cents(), 500);
        assert_eq!((a * 3).cents(), 3000);
    }

    #[test]
    fn test_sum() {
        let total: Money = [100, 200, 300]
            .into_iter()
            .map(Money::from_cents)
            .sum();
        assert_eq!(total.cents(), 600);
    }

    #[test]
    fn test_percentage_exact() {
        // R$100,00 × 10% = R$10,00
        let subtotal = Money::from_cents(10_000);
        assert_eq!(subtotal.percentage_of(FeeRate::from_percent(10)).cents(), 1_000);
    }

    #[test]
    fn test_percentage_half_up_rounding() {
        // 3333 × 5% = 166,65 → rounds up to 167
        let share = Money::from_cents(3_333);
        assert_eq!(share.percentage_of(FeeRate::from_bps(500)).cents(), 167);

        // 3334 × 5% = 166,7 → 167
        let share = Money::from_cents(3_334);
        assert_eq!(share.percentage_of(FeeRate::from_bps(500)).cents(), 167);

        // 1010 × 4,99% = 50,399 → 50
        let share = Money::from_cents(1_010);
        assert_eq!(share.percentage_of(FeeRate::from_bps(499)).cents(), 50);
    }

    #[test]
    fn test_percentage_of_zero_rate() {
        let amount = Money::from_cents(9_999);
        assert_eq!(amount.percentage_of(FeeRate::zero()).cents(), 0);
    }

    #[test]
    fn test_split_evenly_exact() {
        let shares = Money::from_cents(9_000).split_evenly(2);
        assert_eq!(shares, vec![Money::from_cents(4_500), Money::from_cents(4_500)]);
    }

    #[test]
    fn test_split_evenly_last_absorbs_remainder() {
        let shares = Money::from_cents(10_501).split_evenly(3);
        assert_eq!(
            shares,
            vec![
                Money::from_cents(3_500),
                Money::from_cents(3_500),
                Money::from_cents(3_501),
            ]
        );
    }

    #[test]
    fn test_split_evenly_single_share() {
        let shares = Money::from_cents(777).split_evenly(1);
        assert_eq!(shares, vec![Money::from_cents(777)]);
    }

    #[test]
    fn test_split_evenly_more_shares_than_cents() {
        // 2 cents across 5 shares: first four get 0, last carries it all
        let shares = Money::from_cents(2).split_evenly(5);
        assert_eq!(shares.iter().map(|s| s.cents()).sum::<i64>(), 2);
        assert_eq!(shares[4].cents(), 2);
    }

    /// Split correctness property: for any total and n ≥ 1, shares sum
    /// exactly to the total, all but the last are equal, and the last is at
    /// most `n - 1` cents larger.
    #[test]
    fn test_split_evenly_property_sweep() {
        for total in [0i64, 1, 2, 99, 100, 101, 9_999, 10_000, 10_501, 123_457] {
            for n in 1usize..=7 {
                let shares = Money::from_cents(total).split_evenly(n);
                assert_eq!(shares.len(), n);
                assert_eq!(
                    shares.iter().map(|s| s.cents()).sum::<i64>(),
                    total,
                    "split of {} into {} must preserve the total",
                    total,
                    n
                );
                let base = shares[0].cents();
                assert!(shares[..n - 1].iter().all(|s| s.cents() == base));
                let last = shares[n - 1].cents();
                assert!(last >= base && last <= base + n as i64 - 1);
            }
        }
    }

    #[test]
    #[should_panic(expected = "zero shares")]
    fn test_split_evenly_zero_shares_panics() {
        Money::from_cents(100).split_evenly(0);
    }
}
