//! # vela-gateway: Remote API Boundary for Vela Checkout
//!
//! Everything that crosses the wire lives in this crate. The engine in
//! `vela-core` is pure and synchronous; this crate feeds it validated
//! snapshots and drains it into the sale-creation endpoint.
//!
//! ## Data Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   Remote API ──GET /forms-of-receipt──► dto ──► FeeSchedule snapshot   │
//! │   Remote API ──GET /students/{id}─────► dto ──► StudentRef             │
//! │                                              │                          │
//! │                                              ▼                          │
//! │                                    CheckoutSession (vela-core)         │
//! │                                              │                          │
//! │                    payload::SaleRequest ◄────┘ (validated sessions     │
//! │                              │                  only)                   │
//! │                              ▼                                          │
//! │   Remote API ◄──POST /sales── client::SaleClient                       │
//! │                                                                         │
//! │   Submission failure? The session stays Balanced; retry is free.       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`dto`] - raw remote shapes and their one-time conversion to core types
//! - [`payload`] - the sale-creation request builder
//! - [`client`] - the HTTP client
//! - [`error`] - boundary error type

pub mod client;
pub mod dto;
pub mod error;
pub mod payload;

pub use client::{SaleClient, SaleResponse};
pub use dto::{build_schedule, PaymentMethodDto, PlanDto, ProductDto, StudentDto};
pub use error::{GatewayError, GatewayResult};
pub use payload::{SaleItemRequest, SalePaymentRequest, SaleRequest};
