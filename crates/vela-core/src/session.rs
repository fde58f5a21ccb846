//! # Checkout Session Module
//!
//! One checkout = one owned [`CheckoutSession`] value. The session ties the
//! cart, the payment plan, the fee-schedule snapshot and the selected
//! student together and re-runs the balance transition after every mutation,
//! so callers never observe a stale plan.
//!
//! ## Ownership Model
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  CheckoutSession { cart, plan, schedule, student }                      │
//! │                                                                         │
//! │  • owned by exactly ONE operator's checkout flow                        │
//! │  • all mutation goes through session methods, never field assignment    │
//! │  • every mutation synchronously rebalances before returning -           │
//! │    no suspension points, no locking needed                              │
//! │  • concurrent sessions each own an independent Cart/PaymentPlan pair    │
//! │  • cancellation = dropping the session (Abandoned); nothing external    │
//! │    to roll back, nothing is persisted until explicit submission         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::cart::{Cart, CartItem};
use crate::checkout::{CheckoutIssue, CheckoutValidator, StudentRef};
use crate::error::EngineResult;
use crate::fees::FeeSchedule;
use crate::money::Money;
use crate::plan::{PaymentPlan, PlanState};

/// A single checkout in progress.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutSession {
    cart: Cart,
    plan: PaymentPlan,
    schedule: FeeSchedule,
    student: Option<StudentRef>,
}

impl CheckoutSession {
    /// Opens a session against a fee-schedule snapshot.
    ///
    /// The snapshot is fetched once, before checkout starts; the engine
    /// only ever reads it synchronously.
    pub fn new(schedule: FeeSchedule) -> Self {
        CheckoutSession {
            cart: Cart::new(),
            plan: PaymentPlan::new(),
            schedule,
            student: None,
        }
    }

    // -------------------------------------------------------------------------
    // Read access
    // -------------------------------------------------------------------------

    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    pub fn plan(&self) -> &PaymentPlan {
        &self.plan
    }

    pub fn schedule(&self) -> &FeeSchedule {
        &self.schedule
    }

    pub fn student(&self) -> Option<&StudentRef> {
        self.student.as_ref()
    }

    // -------------------------------------------------------------------------
    // Cart mutations (each rebalances the plan before returning)
    // -------------------------------------------------------------------------

    /// Adds a line to the cart. Cart invariant violations leave both cart
    /// and plan untouched.
    pub fn add_item(&mut self, item: CartItem) -> EngineResult<()> {
        self.cart.add_item(item)?;
        self.cart_changed();
        Ok(())
    }

    /// Removes a cart line by id (no-op when absent, but still rebalances:
    /// callers cannot tell whether the id was present).
    pub fn remove_item(&mut self, id: Uuid) {
        self.cart.remove_item(id);
        self.cart_changed();
    }

    /// Sets the cart discount as a whole percentage.
    pub fn set_discount_percent(&mut self, pct: u32) -> EngineResult<()> {
        self.cart.set_discount_percent(pct)?;
        self.cart_changed();
        Ok(())
    }

    /// Selects the student for this sale.
    pub fn select_student(&mut self, student: StudentRef) {
        self.student = Some(student);
    }

    // -------------------------------------------------------------------------
    // Plan mutations (each rebalances before returning)
    // -------------------------------------------------------------------------

    /// Appends a payment instruction, seeding installments from the
    /// method's first fee tier.
    pub fn add_instruction(&mut self, method_id: Option<String>) -> EngineResult<()> {
        self.plan.add_instruction(method_id, &self.schedule)?;
        self.rebalance();
        Ok(())
    }

    /// Removes the instruction at `index`; the last instruction of a
    /// non-empty cart cannot be removed.
    pub fn remove_instruction(&mut self, index: usize) -> EngineResult<()> {
        self.plan.remove_instruction(index, self.cart.is_empty())?;
        self.rebalance();
        Ok(())
    }

    /// Changes an instruction's installment count; rejected counts leave
    /// the prior value in place.
    pub fn set_installments(&mut self, index: usize, n: u32) -> EngineResult<()> {
        self.plan.set_installments(index, n, &self.schedule)?;
        self.rebalance();
        Ok(())
    }

    /// Selects (or changes) an instruction's payment method.
    pub fn set_method(&mut self, index: usize, method_id: Option<String>) -> EngineResult<()> {
        self.plan.set_method(index, method_id, &self.schedule)?;
        self.rebalance();
        Ok(())
    }

    /// Operator override of one instruction's amount. Not a structural
    /// change: no rebalance, the override stands until the next one.
    pub fn set_manual_amount(&mut self, index: usize, amount: Money) -> EngineResult<()> {
        self.plan.set_manual_amount(index, amount)
    }

    // -------------------------------------------------------------------------
    // Submission lifecycle
    // -------------------------------------------------------------------------

    /// Runs the full checkout validation, returning every issue found.
    pub fn validate(&self) -> Result<(), Vec<CheckoutIssue>> {
        CheckoutValidator::validate(&self.cart, &self.plan, self.student.as_ref())
    }

    /// Marks the plan submitted after the external Sale API accepted it.
    ///
    /// Callers must validate first (the gateway's payload builder does) and
    /// must NOT call this when the HTTP submission failed - the plan then
    /// stays Balanced so the operator can retry without re-entering data.
    pub fn mark_submitted(&mut self) -> EngineResult<()> {
        self.plan.mark_submitted()
    }

    /// Abandons the checkout. Terminal; the session is discarded in memory
    /// and nothing external needs rolling back.
    pub fn abandon(&mut self) {
        self.plan.abandon();
    }

    /// Current plan lifecycle state.
    pub fn state(&self) -> PlanState {
        self.plan.state()
    }

    // -------------------------------------------------------------------------
    // Internal
    // -------------------------------------------------------------------------

    fn cart_changed(&mut self) {
        self.plan.mark_cart_changed();
        self.rebalance();
    }

    fn rebalance(&mut self) {
        self.plan.rebalance(self.cart.base_total(), &self.schedule);
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
