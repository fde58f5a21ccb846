//! # Error Types
//!
//! Domain-specific error types for vela-core.
//!
//! ## Error Taxonomy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Classes                                   │
//! │                                                                         │
//! │  (a) Cart invariant violations      → EngineError, reported at the     │
//! │      (duplicate plan, bad discount)   call, cart state unchanged       │
//! │                                                                         │
//! │  (b) Instruction configuration      → EngineError, reported at the     │
//! │      (unsupported installments)       call, prior value retained       │
//! │                                                                         │
//! │  (c) Validation at submit           → Vec<CheckoutIssue>, collected    │
//! │      (missing student, mismatch)      together, never thrown one by    │
//! │                                       one (see checkout module)        │
//! │                                                                         │
//! │  (d) External submission failure    → vela-gateway's error type; the   │
//! │                                       plan stays Balanced for retry    │
//! │                                                                         │
//! │  Nothing here is fatal to the process - every failure is recoverable   │
//! │  by operator correction or retry.                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (method id, index, etc.)
//! 3. Errors are enum variants, never String

use thiserror::Error;

// =============================================================================
// Engine Error
// =============================================================================

/// Checkout engine errors: cart invariant violations and instruction
/// configuration errors.
///
/// These are reported immediately at the mutating call that caused them, and
/// the engine state is left exactly as it was before the call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// A cart may hold at most one subscription plan line.
    ///
    /// ## When This Occurs
    /// - Operator clicks a second plan in the catalog while one is already
    ///   in the cart. The first plan stays; the second add is rejected.
    #[error("cart already contains a plan item")]
    DuplicatePlan,

    /// A cart may hold at most one enrollment-fee line.
    #[error("cart already contains an enrollment fee item")]
    DuplicateEnrollmentFee,

    /// Discount percentage outside the allowed 0..=100 range.
    #[error("discount of {pct}% is outside the 0-100 range")]
    InvalidDiscount { pct: u32 },

    /// No fee tier of the chosen payment method covers the requested
    /// installment count.
    ///
    /// ## When This Occurs
    /// - Operator types 24 installments but the method's tiers stop at 12.
    ///   The instruction keeps its previous installment count.
    #[error("method {method} has no fee tier covering {installments} installments")]
    InstallmentOutOfRange { method: String, installments: u32 },

    /// The last payment instruction cannot be removed while the cart still
    /// has items to pay for. Zero instructions are allowed only while the
    /// cart is empty.
    #[error("cannot remove the last payment instruction of a non-empty checkout")]
    LastInstruction,

    /// Instruction index out of bounds.
    #[error("no payment instruction at index {index}")]
    InstructionIndex { index: usize },

    /// The plan has reached a terminal state (Submitted or Abandoned) and
    /// no longer accepts mutations.
    #[error("payment plan is {state} and can no longer change")]
    PlanFinalized { state: String },
}

// =============================================================================
// Schedule Error
// =============================================================================

/// Fee schedule construction errors.
///
/// Raised when parsing remote payment-method data into a [`FeeSchedule`]
/// (crate::fees::FeeSchedule). A schedule that fails these checks never
/// enters the engine - tier lookup relies on non-overlapping ranges.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScheduleError {
    /// Two tiers of one method overlap in their installment ranges; lookup
    /// would be ambiguous.
    #[error("method {method} has overlapping fee tiers ({a_min}-{a_max} and {b_min}-{b_max})")]
    OverlappingTiers {
        method: String,
        a_min: u32,
        a_max: u32,
        b_min: u32,
        b_max: u32,
    },

    /// A tier's minimum exceeds its maximum, or the minimum is zero.
    #[error("method {method} has an invalid tier range {min}-{max}")]
    EmptyInstallmentRange { method: String, min: u32, max: u32 },

    /// Two methods share the same id.
    #[error("duplicate payment method id: {method}")]
    DuplicateMethod { method: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with EngineError.
pub type EngineResult<T> = Result<T, EngineError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = EngineError::InstallmentOutOfRange {
            method: "credit-card".to_string(),
            installments: 24,
        };
        assert_eq!(
            err.to_string(),
            "method credit-card has no fee tier covering 24 installments"
        );

        let err = EngineError::InvalidDiscount { pct: 150 };
        assert_eq!(err.to_string(), "discount of 150% is outside the 0-100 range");
    }

    #[test]
    fn test_schedule_error_messages() {
        let err = ScheduleError::OverlappingTiers {
            method: "credit-card".to_string(),
            a_min: 1,
            a_max: 6,
            b_min: 6,
            b_max: 12,
        };
        assert_eq!(
            err.to_string(),
            "method credit-card has overlapping fee tiers (1-6 and 6-12)"
        );
    }
}
