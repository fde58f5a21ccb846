//! # Checkout Validation Module
//!
//! Submission-time validation. Unlike the per-call errors in [`crate::cart`]
//! and [`crate::plan`], these checks are **all evaluated** and reported
//! together so the operator sees every problem at once instead of fixing
//! them one by one.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use ts_rs::TS;

use crate::cart::Cart;
use crate::money::Money;
use crate::plan::PaymentPlan;
use crate::AMOUNT_MISMATCH_TOLERANCE;

// =============================================================================
// Student Reference
// =============================================================================

/// The selected student, as read from the remote API.
///
/// Students are external entities; the engine only needs the id to stamp on
/// the sale and the `active` flag to gate submission. Inactive students are
/// blocked from any new financial commitment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct StudentRef {
    pub id: String,
    pub active: bool,
}

// =============================================================================
// Checkout Issues
// =============================================================================

/// One problem found at submission time.
///
/// Issues are collected into a `Vec`, never raised individually, so the UI
/// can render the full list in a single pass.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CheckoutIssue {
    /// No student selected for the sale.
    #[error("no student selected")]
    MissingStudent,

    /// The selected student is inactive and may not take on new charges.
    #[error("student {id} is inactive and blocked from new sales")]
    StudentBlocked { id: String },

    /// The cart has no lines.
    #[error("cart is empty")]
    EmptyCart,

    /// A payment instruction has no method selected.
    #[error("payment {index} has no method selected")]
    MissingPaymentMethod { index: usize },

    /// The assigned payment amounts drifted from the final total by more
    /// than the tolerated cent.
    #[error("payments sum to {assigned} but the sale total is {expected}")]
    AmountMismatch { expected: Money, assigned: Money },
}

// =============================================================================
// Checkout Validator
// =============================================================================

/// Gates the transition to `Submitted`.
pub struct CheckoutValidator;

impl CheckoutValidator {
    /// Runs every check and returns the full list of issues found.
    ///
    /// ## Checks (all evaluated, none short-circuits)
    /// 1. a student is selected
    /// 2. the student is active
    /// 3. the cart is non-empty
    /// 4. every instruction has a payment method
    /// 5. `|Σ amounts − final_total| ≤ 1` cent (manual-override drift
    ///    allowance; anything larger blocks submission)
    pub fn validate(
        cart: &Cart,
        plan: &PaymentPlan,
        student: Option<&StudentRef>,
    ) -> Result<(), Vec<CheckoutIssue>> {
        let mut issues = Vec::new();

        match student {
            None => issues.push(CheckoutIssue::MissingStudent),
            Some(student) if !student.active => issues.push(CheckoutIssue::StudentBlocked {
                id: student.id.clone(),
            }),
            Some(_) => {}
        }

        if cart.is_empty() {
            issues.push(CheckoutIssue::EmptyCart);
        }

        for (index, instruction) in plan.instructions().iter().enumerate() {
            if instruction.method_id.is_none() {
                issues.push(CheckoutIssue::MissingPaymentMethod { index });
            }
        }

        let expected = plan.final_total();
        let assigned = plan.assigned_total();
        if (assigned - expected).cents().abs() > AMOUNT_MISMATCH_TOLERANCE {
            issues.push(CheckoutIssue::AmountMismatch { expected, assigned });
        }

        if issues.is_empty() {
            Ok(())
        } else {
            Err(issues)
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cart::CartItem;
    use crate::fees::FeeSchedule;

    fn active_student() -> StudentRef {
        StudentRef {
            id: "stu-1".to_string(),
            active: true,
        }
    }

    fn ready_checkout() -> (Cart, PaymentPlan) {
        let schedule = FeeSchedule::empty();
        let mut cart = Cart::new();
        cart.add_item(CartItem::product("p", "Curso", Money::from_cents(9_000)))
            .unwrap();

        let mut plan = PaymentPlan::new();
        plan.add_instruction(Some("cash".to_string()), &schedule).unwrap();
        plan.rebalance(cart.base_total(), &schedule);
        (cart, plan)
    }

    #[test]
    fn test_valid_checkout_passes() {
        let (cart, plan) = ready_checkout();
        assert!(CheckoutValidator::validate(&cart, &plan, Some(&active_student())).is_ok());
    }

    #[test]
    fn test_missing_student() {
        let (cart, plan) = ready_checkout();
        let issues = CheckoutValidator::validate(&cart, &plan, None).unwrap_err();
        assert_eq!(issues, vec![CheckoutIssue::MissingStudent]);
    }

    #[test]
    fn test_blocked_student_and_empty_cart_both_reported() {
        // No short-circuiting: an inactive student must not suppress the
        // empty-cart issue.
        let cart = Cart::new();
        let plan = PaymentPlan::new();
        let student = StudentRef {
            id: "stu-9".to_string(),
            active: false,
        };

        let issues = CheckoutValidator::validate(&cart, &plan, Some(&student)).unwrap_err();
        assert!(issues.contains(&CheckoutIssue::StudentBlocked {
            id: "stu-9".to_string()
        }));
        assert!(issues.contains(&CheckoutIssue::EmptyCart));
    }

    #[test]
    fn test_missing_payment_method_reports_index() {
        let schedule = FeeSchedule::empty();
        let (cart, mut plan) = ready_checkout();
        plan.add_instruction(None, &schedule).unwrap();
        plan.rebalance(cart.base_total(), &schedule);

        let issues =
            CheckoutValidator::validate(&cart, &plan, Some(&active_student())).unwrap_err();
        assert_eq!(issues, vec![CheckoutIssue::MissingPaymentMethod { index: 1 }]);
    }

    #[test]
    fn test_one_cent_drift_tolerated() {
        let (cart, mut plan) = ready_checkout();
        plan.set_manual_amount(0, Money::from_cents(9_001)).unwrap();
        assert!(CheckoutValidator::validate(&cart, &plan, Some(&active_student())).is_ok());
    }

    #[test]
    fn test_two_cent_drift_rejected() {
        let (cart, mut plan) = ready_checkout();
        plan.set_manual_amount(0, Money::from_cents(9_002)).unwrap();

        let issues =
            CheckoutValidator::validate(&cart, &plan, Some(&active_student())).unwrap_err();
        assert_eq!(
            issues,
            vec![CheckoutIssue::AmountMismatch {
                expected: Money::from_cents(9_000),
                assigned: Money::from_cents(9_002),
            }]
        );
    }
}
