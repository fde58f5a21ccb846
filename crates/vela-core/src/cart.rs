//! # Cart Module
//!
//! The checkout cart: line items plus a discount percentage.
//!
//! ## Cart Invariants
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Cart Contents                                    │
//! │                                                                         │
//! │   Products          ─ any number, quantity fixed at 1 per line         │
//! │   Subscription plan ─ AT MOST ONE (second add is rejected)             │
//! │   Enrollment fee    ─ AT MOST ONE (second add is rejected)             │
//! │                                                                         │
//! │   subtotal        = Σ unit_amount                                      │
//! │   discount_amount = subtotal × discount%, half-up                      │
//! │   base_total      = subtotal - discount_amount                         │
//! │                                                                         │
//! │   Totals are DERIVED, never stored: callers recompute after every      │
//! │   mutation instead of caching stale values.                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};
use crate::fees::FeeRate;
use crate::money::Money;
use crate::MAX_DISCOUNT_PERCENT;

// =============================================================================
// Line Kind
// =============================================================================

/// What a cart line represents.
///
/// The kind carries the cardinality rules: a cart holds any number of
/// `Product` lines but at most one `Plan` and one `EnrollmentFee`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum LineKind {
    /// A catalog product (uniform, material, private lesson, ...).
    Product,
    /// A subscription plan. Carries the contract the student signs.
    Plan,
    /// The one-off enrollment fee.
    EnrollmentFee,
}

// =============================================================================
// Cart Item
// =============================================================================

/// A line in the cart, quantity fixed at 1.
///
/// ## Immutability
/// Once added, a line never changes. To alter an amount, remove the line and
/// add a replacement - this keeps every derived total trivially consistent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    /// Cart-local line id.
    #[ts(as = "String")]
    pub id: Uuid,

    /// Catalog reference (plan id, product id, ...) on the remote API.
    pub product_id: String,

    /// Description shown to the operator and printed on the sale.
    pub description: String,

    /// Price at the moment the line was added (frozen).
    pub unit_amount: Money,

    /// What this line represents.
    pub kind: LineKind,

    /// Contract HTML attached to plan lines; `None` for everything else.
    pub contract_html: Option<String>,
}

impl CartItem {
    /// Creates a product line.
    pub fn product(product_id: impl Into<String>, description: impl Into<String>, unit_amount: Money) -> Self {
        CartItem {
            id: Uuid::new_v4(),
            product_id: product_id.into(),
            description: description.into(),
            unit_amount,
            kind: LineKind::Product,
            contract_html: None,
        }
    }

    /// Creates a subscription-plan line, optionally carrying the contract.
    pub fn plan(
        plan_id: impl Into<String>,
        description: impl Into<String>,
        unit_amount: Money,
        contract_html: Option<String>,
    ) -> Self {
        CartItem {
            id: Uuid::new_v4(),
            product_id: plan_id.into(),
            description: description.into(),
            unit_amount,
            kind: LineKind::Plan,
            contract_html,
        }
    }

    /// Creates the enrollment-fee line.
    pub fn enrollment_fee(description: impl Into<String>, unit_amount: Money) -> Self {
        CartItem {
            id: Uuid::new_v4(),
            product_id: String::new(),
            description: description.into(),
            unit_amount,
            kind: LineKind::EnrollmentFee,
            contract_html: None,
        }
    }

    /// Checks if this line is the subscription plan.
    #[inline]
    pub fn is_plan(&self) -> bool {
        self.kind == LineKind::Plan
    }

    /// Checks if this line is the enrollment fee.
    #[inline]
    pub fn is_enrollment_fee(&self) -> bool {
        self.kind == LineKind::EnrollmentFee
    }
}

// =============================================================================
// Cart
// =============================================================================

/// The checkout cart.
///
/// Created when a checkout session opens, destroyed when it completes or is
/// abandoned. All mutation goes through methods; totals are recomputed on
/// demand.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    items: Vec<CartItem>,
    discount: FeeRate,
}

impl Cart {
    /// Creates a new empty cart with no discount.
    pub fn new() -> Self {
        Cart::default()
    }

    /// Adds a line to the cart.
    ///
    /// ## Errors
    /// - [`EngineError::DuplicatePlan`] when the line is a plan and the cart
    ///   already holds one
    /// - [`EngineError::DuplicateEnrollmentFee`] likewise for the fee
    ///
    /// On error the item list is exactly as it was before the call.
    pub fn add_item(&mut self, item: CartItem) -> EngineResult<()> {
        match item.kind {
            LineKind::Plan if self.items.iter().any(CartItem::is_plan) => {
                return Err(EngineError::DuplicatePlan);
            }
            LineKind::EnrollmentFee if self.items.iter().any(CartItem::is_enrollment_fee) => {
                return Err(EngineError::DuplicateEnrollmentFee);
            }
            _ => {}
        }

        self.items.push(item);
        Ok(())
    }

    /// Removes a line by id. Removing an absent id is a no-op, not an error:
    /// the operator's intent (line gone) is already satisfied.
    pub fn remove_item(&mut self, id: Uuid) {
        self.items.retain(|i| i.id != id);
    }

    /// Sets the discount as a whole percentage.
    ///
    /// ## Errors
    /// [`EngineError::InvalidDiscount`] outside `0..=100`; the previous
    /// discount is retained.
    pub fn set_discount_percent(&mut self, pct: u32) -> EngineResult<()> {
        if pct > MAX_DISCOUNT_PERCENT {
            return Err(EngineError::InvalidDiscount { pct });
        }
        self.discount = FeeRate::from_percent(pct);
        Ok(())
    }

    /// The current discount rate.
    #[inline]
    pub fn discount(&self) -> FeeRate {
        self.discount
    }

    /// Lines currently in the cart, in insertion order.
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Checks if the cart has no lines.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of lines in the cart.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Sum of all line amounts, before discount.
    pub fn subtotal(&self) -> Money {
        self.items.iter().map(|i| i.unit_amount).sum()
    }

    /// Discount amount: `subtotal × discount%`, rounded half-up.
    pub fn discount_amount(&self) -> Money {
        self.subtotal().percentage_of(self.discount)
    }

    /// Subtotal after discount, before any payment-method surcharge.
    pub fn base_total(&self) -> Money {
        self.subtotal() - self.discount_amount()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn uniform() -> CartItem {
        CartItem::product("prod-uniform", "Uniforme", Money::from_cents(8_000))
    }

    fn plan() -> CartItem {
        CartItem::plan(
            "plan-monthly",
            "Plano mensal",
            Money::from_cents(20_000),
            Some("<p>contrato</p>".to_string()),
        )
    }

    fn fee() -> CartItem {
        CartItem::enrollment_fee("Matrícula", Money::from_cents(5_000))
    }

    #[test]
    fn test_add_and_totals() {
        let mut cart = Cart::new();
        cart.add_item(uniform()).unwrap();
        cart.add_item(plan()).unwrap();

        assert_eq!(cart.len(), 2);
        assert_eq!(cart.subtotal().cents(), 28_000);
        assert_eq!(cart.base_total().cents(), 28_000); // no discount yet
    }

    #[test]
    fn test_discount_derivation() {
        // subtotal R$100,00, 10% discount → base R$90,00
        let mut cart = Cart::new();
        cart.add_item(CartItem::product("p", "Curso", Money::from_cents(10_000)))
            .unwrap();
        cart.set_discount_percent(10).unwrap();

        assert_eq!(cart.subtotal().cents(), 10_000);
        assert_eq!(cart.discount_amount().cents(), 1_000);
        assert_eq!(cart.base_total().cents(), 9_000);
    }

    #[test]
    fn test_second_plan_rejected_cart_unchanged() {
        let mut cart = Cart::new();
        cart.add_item(plan()).unwrap();
        let before = cart.items().to_vec();

        let err = cart.add_item(plan()).unwrap_err();
        assert_eq!(err, EngineError::DuplicatePlan);
        assert_eq!(cart.items(), &before[..]);
    }

    #[test]
    fn test_second_enrollment_fee_rejected() {
        let mut cart = Cart::new();
        cart.add_item(fee()).unwrap();
        let err = cart.add_item(fee()).unwrap_err();
        assert_eq!(err, EngineError::DuplicateEnrollmentFee);
        assert_eq!(cart.len(), 1);
    }

    #[test]
    fn test_plan_and_fee_can_coexist() {
        let mut cart = Cart::new();
        cart.add_item(plan()).unwrap();
        cart.add_item(fee()).unwrap();
        cart.add_item(uniform()).unwrap();
        assert_eq!(cart.len(), 3);
    }

    #[test]
    fn test_remove_item_and_absent_is_noop() {
        let mut cart = Cart::new();
        let item = uniform();
        let id = item.id;
        cart.add_item(item).unwrap();

        cart.remove_item(id);
        assert!(cart.is_empty());

        // Removing again: no-op, no panic
        cart.remove_item(id);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_removing_plan_allows_new_plan() {
        let mut cart = Cart::new();
        let first = plan();
        let id = first.id;
        cart.add_item(first).unwrap();
        cart.remove_item(id);
        assert!(cart.add_item(plan()).is_ok());
    }

    #[test]
    fn test_invalid_discount_rejected_prior_kept() {
        let mut cart = Cart::new();
        cart.set_discount_percent(15).unwrap();

        let err = cart.set_discount_percent(101).unwrap_err();
        assert_eq!(err, EngineError::InvalidDiscount { pct: 101 });
        assert_eq!(cart.discount().bps(), 1_500);
    }

    #[test]
    fn test_discount_bounds() {
        let mut cart = Cart::new();
        assert!(cart.set_discount_percent(0).is_ok());
        assert!(cart.set_discount_percent(100).is_ok());
        cart.add_item(uniform()).unwrap();
        assert_eq!(cart.base_total().cents(), 0);
    }

    #[test]
    fn test_discount_rounds_half_up() {
        // 8099 × 15% = 1214,85 → 1215
        let mut cart = Cart::new();
        cart.add_item(CartItem::product("p", "Apostila", Money::from_cents(8_099)))
            .unwrap();
        cart.set_discount_percent(15).unwrap();
        assert_eq!(cart.discount_amount().cents(), 1_215);
        assert_eq!(cart.base_total().cents(), 6_884);
    }
}
