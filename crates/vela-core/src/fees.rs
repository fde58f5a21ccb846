//! # Fee Schedule Module
//!
//! Payment methods, their banded fee tiers, and surcharge resolution.
//!
//! ## How Surcharges Work
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Payment method: "Cartão de crédito"                                    │
//! │                                                                         │
//! │  Tier 1:  1-1  installments   1.99%  customer_interest=false  D+1      │
//! │  Tier 2:  2-6  installments   4.59%  customer_interest=true   D+30     │
//! │  Tier 3:  7-12 installments   6.99%  customer_interest=true   D+30     │
//! │                                                                         │
//! │  installments=4  → Tier 2 → 4.59% of the instruction's base share      │
//! │                              is passed on to the customer               │
//! │  installments=1  → Tier 1 → fee exists but the BUSINESS absorbs it:    │
//! │                              customer surcharge is ZERO                 │
//! │  installments=18 → no tier → no surcharge                               │
//! │                                                                         │
//! │  Tiers must not overlap: lookup returns exactly one tier or none.      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::ScheduleError;
use crate::money::Money;

// =============================================================================
// Fee Rate
// =============================================================================

/// Percentage rate represented in basis points (bps).
///
/// ## Why Basis Points?
/// 1 basis point = 0.01% = 1/10000
/// 459 bps = 4.59% (a typical card-installment fee)
///
/// Shared by discount percentages and fee-tier percentages so every
/// percentage in the engine rounds the same way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct FeeRate(u32);

impl FeeRate {
    /// Creates a rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        FeeRate(bps)
    }

    /// Creates a rate from whole percent (10 → 10.00%).
    #[inline]
    pub const fn from_percent(pct: u32) -> Self {
        FeeRate(pct * 100)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Zero rate.
    #[inline]
    pub const fn zero() -> Self {
        FeeRate(0)
    }

    /// Checks if the rate is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl Default for FeeRate {
    fn default() -> Self {
        FeeRate::zero()
    }
}

// =============================================================================
// Fee Tier
// =============================================================================

/// A banded fee rule attached to a payment method.
///
/// A tier applies when the instruction's installment count falls inside
/// `min_installments..=max_installments`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct FeeTier {
    /// Lowest installment count this tier covers (inclusive, ≥ 1).
    pub min_installments: u32,

    /// Highest installment count this tier covers (inclusive).
    pub max_installments: u32,

    /// Processing fee percentage in basis points.
    pub rate: FeeRate,

    /// Whether the fee is passed on to the customer as a surcharge.
    /// When false the business absorbs it; the tier still exists in the
    /// schedule for internal cost reporting.
    pub customer_interest: bool,

    /// Settlement delay in days (D+n) before funds are received.
    pub receive_in_days: u32,
}

impl FeeTier {
    /// Checks whether this tier covers the given installment count.
    #[inline]
    pub fn covers(&self, installments: u32) -> bool {
        installments >= self.min_installments && installments <= self.max_installments
    }

    fn overlaps(&self, other: &FeeTier) -> bool {
        self.min_installments <= other.max_installments
            && other.min_installments <= self.max_installments
    }
}

// =============================================================================
// Payment Method
// =============================================================================

/// A form of receipt (cash, pix, card brand, ...) with its fee tiers.
///
/// Tiers are ordered by `min_installments` and guaranteed non-overlapping
/// once the method sits inside a [`FeeSchedule`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PaymentMethod {
    /// Remote API identifier (`formsOfReceiptId` on the sale payload).
    pub id: String,

    /// Display name shown to the operator.
    pub name: String,

    /// Fee tiers, banded by installment range. May be empty: a method
    /// without tiers never produces a surcharge (cash).
    pub tiers: Vec<FeeTier>,
}

impl PaymentMethod {
    /// Returns the tier covering the installment count, if any.
    pub fn tier_for(&self, installments: u32) -> Option<&FeeTier> {
        self.tiers.iter().find(|t| t.covers(installments))
    }

    /// Checks whether an instruction on this method may use the given
    /// installment count.
    ///
    /// A method with no tiers accepts any count ≥ 1 (it simply carries no
    /// fee); a method with tiers requires one of them to cover the count.
    pub fn supports_installments(&self, installments: u32) -> bool {
        if installments == 0 {
            return false;
        }
        self.tiers.is_empty() || self.tier_for(installments).is_some()
    }

    /// Default installment count to seed a fresh instruction with: the
    /// first tier's minimum, or 1 for tier-less methods.
    pub fn default_installments(&self) -> u32 {
        self.tiers.first().map(|t| t.min_installments).unwrap_or(1)
    }
}

// =============================================================================
// Fee Schedule
// =============================================================================

/// The full set of payment methods available to a checkout session.
///
/// ## Snapshot Semantics
/// The schedule is fetched from the remote API before checkout starts and
/// handed to the engine as an immutable snapshot. Every surcharge
/// recomputation reads the same snapshot synchronously - the engine never
/// waits on the network mid-calculation.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct FeeSchedule {
    methods: Vec<PaymentMethod>,
}

impl FeeSchedule {
    /// Builds a schedule, validating every method's tiers.
    ///
    /// ## Validation
    /// - tier ranges must be well-formed (`1 ≤ min ≤ max`)
    /// - tiers of one method must not overlap (lookup must be unambiguous)
    /// - method ids must be unique
    pub fn new(mut methods: Vec<PaymentMethod>) -> Result<Self, ScheduleError> {
        for method in &mut methods {
            for tier in &method.tiers {
                if tier.min_installments == 0 || tier.min_installments > tier.max_installments {
                    return Err(ScheduleError::EmptyInstallmentRange {
                        method: method.id.clone(),
                        min: tier.min_installments,
                        max: tier.max_installments,
                    });
                }
            }

            method.tiers.sort_by_key(|t| t.min_installments);
            for pair in method.tiers.windows(2) {
                if pair[0].overlaps(&pair[1]) {
                    return Err(ScheduleError::OverlappingTiers {
                        method: method.id.clone(),
                        a_min: pair[0].min_installments,
                        a_max: pair[0].max_installments,
                        b_min: pair[1].min_installments,
                        b_max: pair[1].max_installments,
                    });
                }
            }
        }

        for (i, method) in methods.iter().enumerate() {
            if methods[..i].iter().any(|m| m.id == method.id) {
                return Err(ScheduleError::DuplicateMethod {
                    method: method.id.clone(),
                });
            }
        }

        Ok(FeeSchedule { methods })
    }

    /// Empty schedule (no methods, no surcharges). Useful for carts settled
    /// before payment methods have loaded and in tests.
    pub fn empty() -> Self {
        FeeSchedule::default()
    }

    /// Looks up a payment method by id.
    pub fn method(&self, method_id: &str) -> Option<&PaymentMethod> {
        self.methods.iter().find(|m| m.id == method_id)
    }

    /// All methods, in catalog order.
    pub fn methods(&self) -> &[PaymentMethod] {
        &self.methods
    }

    /// Returns the tier covering `installments` for the method, if any.
    ///
    /// No tier means no surcharge - not an error.
    pub fn resolve_tier(&self, method_id: &str, installments: u32) -> Option<&FeeTier> {
        self.method(method_id)?.tier_for(installments)
    }

    /// Computes the customer-facing surcharge for one payment instruction.
    ///
    /// Zero when no tier covers the installment count, and zero when the
    /// matching tier's fee is absorbed by the business
    /// (`customer_interest == false`).
    pub fn surcharge_for(&self, method_id: &str, installments: u32, base: Money) -> Money {
        match self.resolve_tier(method_id, installments) {
            Some(tier) if tier.customer_interest => base.percentage_of(tier.rate),
            _ => Money::zero(),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
