//! # Sale Payload Builder
//!
//! Turns a validated [`CheckoutSession`] into the sale-creation request the
//! remote API expects.
//!
//! ## The Synthetic Surcharge Line
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  The customer-facing surcharge is NEVER folded into a product price.   │
//! │  It travels as a line item of its own:                                  │
//! │                                                                         │
//! │    items: [                                                             │
//! │      { description: "Plano mensal",                unitAmount: 20000 }, │
//! │      { description: "Taxa (repassada ao cliente)", unitAmount:   501 }  │
//! │    ]                                                                    │
//! │                                                                         │
//! │  so that Σ items − discount == Σ payments, cent for cent, and the      │
//! │  fee stays visible on the printed sale.                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{GatewayError, GatewayResult};
use vela_core::{CheckoutSession, SURCHARGE_LINE_DESCRIPTION};

// =============================================================================
// Request Shapes
// =============================================================================

/// The sale-creation request body. Amounts are integer cents.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleRequest {
    pub student_id: String,
    pub discount_percentage: u32,
    pub items: Vec<SaleItemRequest>,
    pub payments: Vec<SalePaymentRequest>,
}

/// One sale line. `plan_id` and `contract_html_content` are only present on
/// the subscription-plan line.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleItemRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plan_id: Option<String>,
    pub description: String,
    pub quantity: i64,
    pub unit_amount: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contract_html_content: Option<String>,
}

/// One payment leg on the sale.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalePaymentRequest {
    pub forms_of_receipt_id: String,
    pub amount: i64,
    pub installments: u32,
}

// =============================================================================
// Builder
// =============================================================================

impl SaleRequest {
    /// Builds the request from a checkout session.
    ///
    /// Validation runs first; a session with outstanding issues never
    /// produces a payload ([`GatewayError::Checkout`] carries them all).
    pub fn from_session(session: &CheckoutSession) -> GatewayResult<SaleRequest> {
        session.validate().map_err(GatewayError::Checkout)?;

        // Validation guarantees a student and a method on every instruction.
        let student_id = session
            .student()
            .map(|s| s.id.clone())
            .ok_or(GatewayError::Checkout(vec![
                vela_core::CheckoutIssue::MissingStudent,
            ]))?;

        let mut items: Vec<SaleItemRequest> = session
            .cart()
            .items()
            .iter()
            .map(|line| SaleItemRequest {
                plan_id: line.is_plan().then(|| line.product_id.clone()),
                description: line.description.clone(),
                quantity: 1,
                unit_amount: line.unit_amount.cents(),
                contract_html_content: line.contract_html.clone(),
            })
            .collect();

        let surcharge = session.plan().surcharge_total();
        if surcharge.is_positive() {
            items.push(SaleItemRequest {
                plan_id: None,
                description: SURCHARGE_LINE_DESCRIPTION.to_string(),
                quantity: 1,
                unit_amount: surcharge.cents(),
                contract_html_content: None,
            });
        }

        let payments = session
            .plan()
            .instructions()
            .iter()
            .map(|instruction| SalePaymentRequest {
                forms_of_receipt_id: instruction.method_id.clone().unwrap_or_default(),
                amount: instruction.amount.cents(),
                installments: instruction.installments,
            })
            .collect();

        Ok(SaleRequest {
            student_id,
            discount_percentage: session.cart().discount().bps() / 100,
            items,
            payments,
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
