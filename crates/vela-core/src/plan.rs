//! # Payment Plan Module
//!
//! The central allocation algorithm: given the cart's base total and a fee
//! schedule, compute each instruction's surcharge, derive the final total,
//! and redistribute it across instructions with exact-cent accounting.
//!
//! ## Plan Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   Empty ──add──► Pending ──rebalance──► Balanced ──validate──► Submitted│
//! │                     ▲                    │    ▲                (terminal)│
//! │                     │                 mutation│                          │
//! │                     │                    ▼    │rebalance                │
//! │                     └────────────────── Dirty ┘                         │
//! │                                                                         │
//! │   any non-terminal state ──abandon──► Abandoned (terminal)              │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## The Balance Transition (run after every triggering mutation)
//! ```text
//! 1. base share per instruction = base_total.split_evenly(count)
//!    (surcharge is EXCLUDED from the shares on purpose: shares depend on
//!    instruction count only, breaking the circular dependency between
//!    "surcharge needs each share" and "shares need the final total")
//! 2. surcharge(i) = schedule.surcharge_for(method, installments, share(i))
//! 3. final_total  = base_total + Σ surcharge(i)
//! 4. re-split final_total evenly, overwriting each instruction's amount
//!    (manual overrides excepted - see below)
//! ```
//!
//! ## Manual Overrides
//! An operator may hand-edit an instruction's amount (to round a quote).
//! The override survives rebalances **only until** the cart or the
//! instruction set changes again; any structural change wipes every manual
//! amount and automatic balancing takes back over. Consistency wins over
//! stale hand edits.

use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

use crate::error::{EngineError, EngineResult};
use crate::fees::FeeSchedule;
use crate::money::Money;

// =============================================================================
// Plan State
// =============================================================================

/// Lifecycle state of a payment plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PlanState {
    /// No instructions yet.
    Empty,
    /// Instructions exist but the balance transition has not run yet.
    Pending,
    /// Instructions or cart changed since the last balance.
    Dirty,
    /// Auto-redistribution has just run; amounts are consistent.
    Balanced,
    /// Handed to the external Sale API. Terminal.
    Submitted,
    /// Checkout discarded. Terminal.
    Abandoned,
}

impl PlanState {
    /// Checks if the plan can still change.
    #[inline]
    pub fn is_terminal(&self) -> bool {
        matches!(self, PlanState::Submitted | PlanState::Abandoned)
    }
}

impl fmt::Display for PlanState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PlanState::Empty => "empty",
            PlanState::Pending => "pending",
            PlanState::Dirty => "dirty",
            PlanState::Balanced => "balanced",
            PlanState::Submitted => "submitted",
            PlanState::Abandoned => "abandoned",
        };
        f.write_str(s)
    }
}

// =============================================================================
// Payment Instruction
// =============================================================================

/// One payment leg: method + installment count + amount.
///
/// `amount` is derived by the balance transition; `manual` marks an operator
/// override that the next rebalance must not clobber.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PaymentInstruction {
    /// Selected payment method, `None` while the operator has not picked
    /// one yet. Missing methods are caught at validation, not here.
    pub method_id: Option<String>,

    /// Installment count, always ≥ 1.
    pub installments: u32,

    /// This instruction's share of the final total.
    pub amount: Money,

    /// True when the operator hand-edited `amount`.
    pub manual: bool,
}

// =============================================================================
// Payment Plan
// =============================================================================

/// An ordered list of payment instructions plus the cached results of the
/// last balance transition.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PaymentPlan {
    instructions: Vec<PaymentInstruction>,
    state: PlanState,
    surcharge_total: Money,
    final_total: Money,
}

impl PaymentPlan {
    /// Creates an empty plan.
    pub fn new() -> Self {
        PaymentPlan {
            instructions: Vec::new(),
            state: PlanState::Empty,
            surcharge_total: Money::zero(),
            final_total: Money::zero(),
        }
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    /// Instructions in creation order. The last one carries remainder cents.
    pub fn instructions(&self) -> &[PaymentInstruction] {
        &self.instructions
    }

    /// Current lifecycle state.
    #[inline]
    pub fn state(&self) -> PlanState {
        self.state
    }

    /// Aggregate customer-facing surcharge from the last rebalance.
    #[inline]
    pub fn surcharge_total(&self) -> Money {
        self.surcharge_total
    }

    /// Base total plus surcharge, from the last rebalance. The sum of all
    /// instruction amounts must equal this at submission time.
    #[inline]
    pub fn final_total(&self) -> Money {
        self.final_total
    }

    /// Sum of the amounts currently assigned to instructions. May differ
    /// from [`final_total`](Self::final_total) mid-edit.
    pub fn assigned_total(&self) -> Money {
        self.instructions.iter().map(|i| i.amount).sum()
    }

    // -------------------------------------------------------------------------
    // Mutations
    // -------------------------------------------------------------------------

    /// Appends a new instruction.
    ///
    /// Installments are seeded from the method's first tier's minimum (1 for
    /// unknown or tier-less methods). Callers rebalance afterwards.
    pub fn add_instruction(
        &mut self,
        method_id: Option<String>,
        schedule: &FeeSchedule,
    ) -> EngineResult<()> {
        self.check_mutable()?;

        let installments = method_id
            .as_deref()
            .and_then(|id| schedule.method(id))
            .map(|m| m.default_installments())
            .unwrap_or(1);

        self.instructions.push(PaymentInstruction {
            method_id,
            installments,
            amount: Money::zero(),
            manual: false,
        });
        self.mark_structural_change();
        Ok(())
    }

    /// Removes the instruction at `index`.
    ///
    /// ## Errors
    /// - [`EngineError::LastInstruction`] when it is the only instruction
    ///   left and the cart still has items (`cart_empty == false`)
    /// - [`EngineError::InstructionIndex`] when out of bounds
    pub fn remove_instruction(&mut self, index: usize, cart_empty: bool) -> EngineResult<()> {
        self.check_mutable()?;
        self.check_index(index)?;

        if self.instructions.len() == 1 && !cart_empty {
            return Err(EngineError::LastInstruction);
        }

        self.instructions.remove(index);
        self.mark_structural_change();
        Ok(())
    }

    /// Changes the installment count of one instruction.
    ///
    /// ## Errors
    /// [`EngineError::InstallmentOutOfRange`] when the chosen method has
    /// tiers and none of them covers `n` - the prior count is retained.
    /// With no method selected only `n ≥ 1` is enforced; the missing method
    /// itself is a validation issue, not a configuration error.
    pub fn set_installments(
        &mut self,
        index: usize,
        n: u32,
        schedule: &FeeSchedule,
    ) -> EngineResult<()> {
        self.check_mutable()?;
        self.check_index(index)?;

        let method_id = self.instructions[index].method_id.clone();
        let supported = match method_id.as_deref().and_then(|id| schedule.method(id)) {
            Some(method) => method.supports_installments(n),
            None => n >= 1,
        };
        if !supported {
            return Err(EngineError::InstallmentOutOfRange {
                method: method_id.unwrap_or_default(),
                installments: n,
            });
        }

        self.instructions[index].installments = n;
        self.mark_structural_change();
        Ok(())
    }

    /// Selects (or changes) the payment method of one instruction.
    ///
    /// When the new method no longer supports the current installment count
    /// the count is re-seeded from the method's first tier.
    pub fn set_method(
        &mut self,
        index: usize,
        method_id: Option<String>,
        schedule: &FeeSchedule,
    ) -> EngineResult<()> {
        self.check_mutable()?;
        self.check_index(index)?;

        let instruction = &mut self.instructions[index];
        if let Some(method) = method_id.as_deref().and_then(|id| schedule.method(id)) {
            if !method.supports_installments(instruction.installments) {
                instruction.installments = method.default_installments();
            }
        }
        instruction.method_id = method_id;
        self.mark_structural_change();
        Ok(())
    }

    /// Operator override of one instruction's amount.
    ///
    /// The override is honored by subsequent rebalances until the next
    /// structural change (cart or instruction set), which discards it.
    pub fn set_manual_amount(&mut self, index: usize, amount: Money) -> EngineResult<()> {
        self.check_mutable()?;
        self.check_index(index)?;

        self.instructions[index].amount = amount;
        self.instructions[index].manual = true;
        Ok(())
    }

    /// The balance transition (steps 1-4 in the module docs).
    ///
    /// Runs synchronously to completion; idempotent when nothing changed in
    /// between. No-op once the plan is terminal.
    pub fn rebalance(&mut self, base_total: Money, schedule: &FeeSchedule) {
        if self.state.is_terminal() {
            return;
        }

        if self.instructions.is_empty() {
            self.surcharge_total = Money::zero();
            self.final_total = base_total;
            self.state = PlanState::Empty;
            return;
        }

        // Step 1+2: each instruction's surcharge is computed on its share of
        // the BASE total, not the final total - surcharge is layered on top,
        // never redistributed.
        let count = self.instructions.len();
        let base_shares = base_total.split_evenly(count);
        let surcharge_total: Money = self
            .instructions
            .iter()
            .zip(&base_shares)
            .map(|(instruction, share)| match &instruction.method_id {
                Some(method) => schedule.surcharge_for(method, instruction.installments, *share),
                None => Money::zero(),
            })
            .sum();

        // Step 3
        self.surcharge_total = surcharge_total;
        self.final_total = base_total + surcharge_total;

        // Step 4: overwrite amounts, skipping live manual overrides
        let amounts = self.final_total.split_evenly(count);
        for (instruction, amount) in self.instructions.iter_mut().zip(amounts) {
            if !instruction.manual {
                instruction.amount = amount;
            }
        }

        self.state = PlanState::Balanced;
    }

    /// Marks the plan submitted. Only a balanced plan may be submitted, and
    /// only after validation passed (the session enforces the latter).
    pub fn mark_submitted(&mut self) -> EngineResult<()> {
        if self.state != PlanState::Balanced {
            return Err(EngineError::PlanFinalized {
                state: self.state.to_string(),
            });
        }
        self.state = PlanState::Submitted;
        Ok(())
    }

    /// Discards the plan. Terminal; nothing external to roll back since
    /// nothing was persisted.
    pub fn abandon(&mut self) {
        if !self.state.is_terminal() {
            self.state = PlanState::Abandoned;
        }
    }

    /// Marks the plan dirty after a cart-side change (items or discount).
    /// Cart mutations invalidate manual overrides exactly like instruction
    /// mutations do.
    pub fn mark_cart_changed(&mut self) {
        if !self.state.is_terminal() {
            self.mark_structural_change();
        }
    }

    // -------------------------------------------------------------------------
    // Internal helpers
    // -------------------------------------------------------------------------

    fn check_mutable(&self) -> EngineResult<()> {
        if self.state.is_terminal() {
            return Err(EngineError::PlanFinalized {
                state: self.state.to_string(),
            });
        }
        Ok(())
    }

    fn check_index(&self, index: usize) -> EngineResult<()> {
        if index >= self.instructions.len() {
            return Err(EngineError::InstructionIndex { index });
        }
        Ok(())
    }

    fn mark_structural_change(&mut self) {
        for instruction in &mut self.instructions {
            instruction.manual = false;
        }
        self.state = if self.instructions.is_empty() {
            PlanState::Empty
        } else if matches!(self.state, PlanState::Empty | PlanState::Pending) {
            PlanState::Pending
        } else {
            PlanState::Dirty
        };
    }
}

impl Default for PaymentPlan {
    fn default() -> Self {
        PaymentPlan::new()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fees::{FeeRate, FeeTier, PaymentMethod};

    /// Card method with a single customer-facing 5% tier covering 1-12.
    fn five_percent_schedule() -> FeeSchedule {
        FeeSchedule::new(vec![PaymentMethod {
            id: "card".to_string(),
            name: "Cartão".to_string(),
            tiers: vec![FeeTier {
                min_installments: 1,
                max_installments: 12,
                rate: FeeRate::from_bps(500),
                customer_interest: true,
                receive_in_days: 30,
            }],
        }])
        .unwrap()
    }

    fn no_fee_schedule() -> FeeSchedule {
        FeeSchedule::new(vec![PaymentMethod {
            id: "cash".to_string(),
            name: "Dinheiro".to_string(),
            tiers: vec![],
        }])
        .unwrap()
    }

    fn plan_with(n: usize, method: &str, schedule: &FeeSchedule) -> PaymentPlan {
        let mut plan = PaymentPlan::new();
        for _ in 0..n {
            plan.add_instruction(Some(method.to_string()), schedule).unwrap();
        }
        plan
    }

    #[test]
    fn test_example_no_fee_two_payments() {
        // base R$90,00, two cash payments, no tier → 4500 / 4500
        let schedule = no_fee_schedule();
        let mut plan = plan_with(2, "cash", &schedule);
        plan.rebalance(Money::from_cents(9_000), &schedule);

        assert_eq!(plan.state(), PlanState::Balanced);
        assert!(plan.surcharge_total().is_zero());
        assert_eq!(plan.final_total().cents(), 9_000);
        let amounts: Vec<i64> = plan.instructions().iter().map(|i| i.amount.cents()).collect();
        assert_eq!(amounts, vec![4_500, 4_500]);
    }

    #[test]
    fn test_example_five_percent_three_payments() {
        // base R$100,00 across 3 card payments at 5% customer-facing:
        //   base shares   3333 / 3333 / 3334
        //   surcharges     167 /  167 /  167  → total 501
        //   final total  10501 → 3500 / 3500 / 3501
        let schedule = five_percent_schedule();
        let mut plan = plan_with(3, "card", &schedule);
        plan.rebalance(Money::from_cents(10_000), &schedule);

        assert_eq!(plan.surcharge_total().cents(), 501);
        assert_eq!(plan.final_total().cents(), 10_501);
        let amounts: Vec<i64> = plan.instructions().iter().map(|i| i.amount.cents()).collect();
        assert_eq!(amounts, vec![3_500, 3_500, 3_501]);
        assert_eq!(plan.assigned_total().cents(), 10_501);
    }

    #[test]
    fn test_rebalance_is_idempotent() {
        let schedule = five_percent_schedule();
        let mut plan = plan_with(3, "card", &schedule);
        plan.rebalance(Money::from_cents(10_000), &schedule);
        let first: Vec<Money> = plan.instructions().iter().map(|i| i.amount).collect();

        plan.rebalance(Money::from_cents(10_000), &schedule);
        let second: Vec<Money> = plan.instructions().iter().map(|i| i.amount).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_surcharge_excluded_from_base_shares() {
        // Shares must come from the base total only: with one 5% instruction
        // the surcharge is 5% of 10000 = 500, never 5% of 10500.
        let schedule = five_percent_schedule();
        let mut plan = plan_with(1, "card", &schedule);
        plan.rebalance(Money::from_cents(10_000), &schedule);
        assert_eq!(plan.surcharge_total().cents(), 500);
        assert_eq!(plan.final_total().cents(), 10_500);
    }

    #[test]
    fn test_instruction_without_method_contributes_no_surcharge() {
        let schedule = five_percent_schedule();
        let mut plan = PaymentPlan::new();
        plan.add_instruction(None, &schedule).unwrap();
        plan.add_instruction(Some("card".to_string()), &schedule).unwrap();
        plan.rebalance(Money::from_cents(10_000), &schedule);

        // only the card leg's 5000-cent share carries 5% = 250
        assert_eq!(plan.surcharge_total().cents(), 250);
    }

    #[test]
    fn test_add_instruction_seeds_default_installments() {
        let schedule = FeeSchedule::new(vec![PaymentMethod {
            id: "card".to_string(),
            name: "Cartão".to_string(),
            tiers: vec![FeeTier {
                min_installments: 3,
                max_installments: 12,
                rate: FeeRate::from_bps(500),
                customer_interest: true,
                receive_in_days: 30,
            }],
        }])
        .unwrap();

        let mut plan = PaymentPlan::new();
        plan.add_instruction(Some("card".to_string()), &schedule).unwrap();
        assert_eq!(plan.instructions()[0].installments, 3);

        plan.add_instruction(None, &schedule).unwrap();
        assert_eq!(plan.instructions()[1].installments, 1);
    }

    #[test]
    fn test_set_installments_out_of_range_keeps_prior() {
        let schedule = five_percent_schedule();
        let mut plan = plan_with(1, "card", &schedule);
        plan.set_installments(0, 6, &schedule).unwrap();

        let err = plan.set_installments(0, 24, &schedule).unwrap_err();
        assert_eq!(
            err,
            EngineError::InstallmentOutOfRange {
                method: "card".to_string(),
                installments: 24,
            }
        );
        assert_eq!(plan.instructions()[0].installments, 6);
    }

    #[test]
    fn test_set_installments_no_method_only_requires_positive() {
        let schedule = five_percent_schedule();
        let mut plan = PaymentPlan::new();
        plan.add_instruction(None, &schedule).unwrap();

        assert!(plan.set_installments(0, 48, &schedule).is_ok());
        assert!(plan.set_installments(0, 0, &schedule).is_err());
    }

    #[test]
    fn test_remove_last_instruction_blocked_while_cart_has_items() {
        let schedule = no_fee_schedule();
        let mut plan = plan_with(1, "cash", &schedule);

        let err = plan.remove_instruction(0, false).unwrap_err();
        assert_eq!(err, EngineError::LastInstruction);
        assert_eq!(plan.instructions().len(), 1);

        // Allowed once the cart is empty
        plan.remove_instruction(0, true).unwrap();
        assert!(plan.instructions().is_empty());
        assert_eq!(plan.state(), PlanState::Empty);
    }

    #[test]
    fn test_manual_amount_survives_plain_rebalance() {
        let schedule = no_fee_schedule();
        let mut plan = plan_with(2, "cash", &schedule);
        plan.rebalance(Money::from_cents(9_000), &schedule);

        plan.set_manual_amount(0, Money::from_cents(5_000)).unwrap();
        plan.rebalance(Money::from_cents(9_000), &schedule);

        assert_eq!(plan.instructions()[0].amount.cents(), 5_000);
        assert_eq!(plan.instructions()[1].amount.cents(), 4_500);
    }

    #[test]
    fn test_manual_amount_discarded_on_structural_change() {
        let schedule = no_fee_schedule();
        let mut plan = plan_with(2, "cash", &schedule);
        plan.rebalance(Money::from_cents(9_000), &schedule);
        plan.set_manual_amount(0, Money::from_cents(5_000)).unwrap();

        // Adding a third leg is a structural change: the override dies
        plan.add_instruction(Some("cash".to_string()), &schedule).unwrap();
        plan.rebalance(Money::from_cents(9_000), &schedule);

        let amounts: Vec<i64> = plan.instructions().iter().map(|i| i.amount.cents()).collect();
        assert_eq!(amounts, vec![3_000, 3_000, 3_000]);
    }

    #[test]
    fn test_manual_amount_discarded_on_cart_change() {
        let schedule = no_fee_schedule();
        let mut plan = plan_with(2, "cash", &schedule);
        plan.rebalance(Money::from_cents(9_000), &schedule);
        plan.set_manual_amount(0, Money::from_cents(5_000)).unwrap();

        plan.mark_cart_changed();
        plan.rebalance(Money::from_cents(10_000), &schedule);

        let amounts: Vec<i64> = plan.instructions().iter().map(|i| i.amount.cents()).collect();
        assert_eq!(amounts, vec![5_000, 5_000]);
    }

    #[test]
    fn test_state_machine_walk() {
        let schedule = no_fee_schedule();
        let mut plan = PaymentPlan::new();
        assert_eq!(plan.state(), PlanState::Empty);

        plan.add_instruction(Some("cash".to_string()), &schedule).unwrap();
        assert_eq!(plan.state(), PlanState::Pending);

        plan.rebalance(Money::from_cents(1_000), &schedule);
        assert_eq!(plan.state(), PlanState::Balanced);

        plan.add_instruction(Some("cash".to_string()), &schedule).unwrap();
        assert_eq!(plan.state(), PlanState::Dirty);

        plan.rebalance(Money::from_cents(1_000), &schedule);
        plan.mark_submitted().unwrap();
        assert_eq!(plan.state(), PlanState::Submitted);

        // Terminal: every further mutation is rejected
        let err = plan.add_instruction(None, &schedule).unwrap_err();
        assert!(matches!(err, EngineError::PlanFinalized { .. }));
    }

    #[test]
    fn test_submit_requires_balanced() {
        let schedule = no_fee_schedule();
        let mut plan = plan_with(1, "cash", &schedule);
        // Pending, never balanced
        assert!(plan.mark_submitted().is_err());
    }

    #[test]
    fn test_abandon_is_terminal() {
        let mut plan = PaymentPlan::new();
        plan.abandon();
        assert_eq!(plan.state(), PlanState::Abandoned);
        let err = plan.add_instruction(None, &FeeSchedule::empty()).unwrap_err();
        assert!(matches!(err, EngineError::PlanFinalized { .. }));
    }

    #[test]
    fn test_rebalance_with_no_instructions_tracks_base() {
        let mut plan = PaymentPlan::new();
        plan.rebalance(Money::from_cents(4_200), &FeeSchedule::empty());
        assert_eq!(plan.state(), PlanState::Empty);
        assert_eq!(plan.final_total().cents(), 4_200);
        assert!(plan.surcharge_total().is_zero());
    }
}
