//! # vela-core: Pure Checkout Engine for Vela Admin
//!
//! This crate is the **heart** of the Vela point-of-sale flow. It contains
//! the sale pricing and payment allocation engine as pure functions with
//! zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Vela Admin Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  Back-office Frontend (TypeScript)              │   │
//! │  │    Catalog UI ──► Cart UI ──► Payments UI ──► Submit button    │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ vela-core (THIS CRATE) ★                        │   │
//! │  │                                                                 │   │
//! │  │   ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌─────────┐ │   │
//! │  │   │  money  │ │  fees   │ │  cart   │ │  plan   │ │checkout │ │   │
//! │  │   │  Money  │ │FeeSched.│ │  Cart   │ │ Payment │ │Validator│ │   │
//! │  │   │ FeeRate │ │ FeeTier │ │CartItem │ │  Plan   │ │ Session │ │   │
//! │  │   └─────────┘ └─────────┘ └─────────┘ └─────────┘ └─────────┘ │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO NETWORK • PURE FUNCTIONS                         │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                  vela-gateway (Boundary Layer)                  │   │
//! │  │        Remote API parsing, sale payload, HTTP submission        │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`fees`] - Payment methods, fee tiers, surcharge resolution
//! - [`cart`] - Cart with single-plan/single-enrollment-fee invariants
//! - [`plan`] - Payment plan balancing (the central algorithm)
//! - [`checkout`] - Submission-time validation (collects every issue)
//! - [`session`] - The single owned checkout session value
//! - [`error`] - Domain error types
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every recomputation is deterministic and runs to
//!    completion on the caller's thread - no suspension points
//! 2. **No I/O**: Network, file system, database access is FORBIDDEN here
//! 3. **Integer Money**: All monetary values are centavos (i64); floats never
//!    touch currency
//! 4. **Explicit Errors**: All errors are typed, never strings or panics
//!
//! ## Example Usage
//!
//! ```rust
//! use vela_core::money::Money;
//!
//! // Create money from cents (never from floats!)
//! let base = Money::from_cents(10_000); // R$100,00
//!
//! // Split across three payments without losing a cent
//! let shares = base.split_evenly(3);
//! assert_eq!(shares.iter().map(|s| s.cents()).sum::<i64>(), 10_000);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod checkout;
pub mod error;
pub mod fees;
pub mod money;
pub mod plan;
pub mod session;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use vela_core::Money` instead of
// `use vela_core::money::Money`

pub use cart::{Cart, CartItem, LineKind};
pub use checkout::{CheckoutIssue, CheckoutValidator, StudentRef};
pub use error::{EngineError, EngineResult, ScheduleError};
pub use fees::{FeeRate, FeeSchedule, FeeTier, PaymentMethod};
pub use money::Money;
pub use plan::{PaymentInstruction, PaymentPlan, PlanState};
pub use session::CheckoutSession;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Tolerance, in cents, between the sum of payment amounts and the plan's
/// final total at submission time.
///
/// ## Why one cent?
/// Operators may hand-round a single payment amount on a quote. One cent of
/// drift is accepted; anything larger blocks submission.
pub const AMOUNT_MISMATCH_TOLERANCE: i64 = 1;

/// Maximum discount, in whole percent, a cart will accept.
pub const MAX_DISCOUNT_PERCENT: u32 = 100;

/// Description used for the synthetic surcharge line item on the submitted
/// sale. The customer-facing fee is a line of its own, never folded into a
/// product price.
pub const SURCHARGE_LINE_DESCRIPTION: &str = "Taxa (repassada ao cliente)";
