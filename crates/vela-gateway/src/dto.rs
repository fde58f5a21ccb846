//! # Remote API DTOs
//!
//! Raw shapes of the back-office API's responses, and their one-time
//! conversion into strict core types.
//!
//! The remote API is loosely typed: money arrives as `"150.00"` or `150.0`
//! depending on the endpoint, percentages are floats, optional lists come
//! back as `null`. Everything is validated and converted HERE, once; the
//! engine only ever sees integer cents and basis points.

use serde::Deserialize;

use crate::error::{GatewayError, GatewayResult};
use vela_core::{CartItem, FeeRate, FeeSchedule, FeeTier, Money, PaymentMethod, StudentRef};

// =============================================================================
// Raw Amount
// =============================================================================

/// A monetary value as the remote API sends it: decimal string or float.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawAmount {
    Text(String),
    Number(f64),
}

impl RawAmount {
    /// Converts to integer cents, the only money representation allowed
    /// past this crate.
    ///
    /// Decimal strings accept at most two fraction digits; floats are
    /// rounded to the nearest cent (they were never exact to begin with,
    /// rounding once at the edge is the best that can be done).
    pub fn to_cents(&self, field: &str) -> GatewayResult<Money> {
        match self {
            RawAmount::Number(v) => {
                if !v.is_finite() {
                    return Err(GatewayError::parse(field, "not a finite number"));
                }
                Ok(Money::from_cents((v * 100.0).round() as i64))
            }
            RawAmount::Text(s) => parse_decimal_cents(s)
                .ok_or_else(|| GatewayError::parse(field, format!("malformed decimal '{s}'"))),
        }
    }
}

/// Parses `"150"`, `"150.5"`, `"150.50"` or `"-3.25"` into cents.
/// Returns `None` on anything else (three fraction digits, empty, letters).
fn parse_decimal_cents(s: &str) -> Option<Money> {
    let s = s.trim();
    let (sign, digits) = match s.strip_prefix('-') {
        Some(rest) => (-1i64, rest),
        None => (1i64, s),
    };

    let (whole, frac) = match digits.split_once('.') {
        Some((w, f)) => (w, f),
        None => (digits, ""),
    };
    if whole.is_empty() || frac.len() > 2 {
        return None;
    }
    if !whole.bytes().all(|b| b.is_ascii_digit()) || !frac.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let whole: i64 = whole.parse().ok()?;
    let frac_cents = match frac.len() {
        0 => 0,
        1 => frac.parse::<i64>().ok()? * 10,
        _ => frac.parse::<i64>().ok()?,
    };
    Some(Money::from_cents(sign * (whole * 100 + frac_cents)))
}

// =============================================================================
// Payment Methods / Fee Tiers
// =============================================================================

/// A fee tier as the forms-of-receipt endpoint returns it.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeeTierDto {
    pub minimum_installments: u32,
    pub maximum_installments: u32,
    /// Percentage as a float, e.g. `4.59`.
    pub fee_percentage: f64,
    pub customer_interest: bool,
    pub receive_in_days: u32,
}

impl FeeTierDto {
    fn into_tier(self) -> GatewayResult<FeeTier> {
        if !self.fee_percentage.is_finite() || self.fee_percentage < 0.0 {
            return Err(GatewayError::parse(
                "feePercentage",
                format!("invalid rate {}", self.fee_percentage),
            ));
        }
        Ok(FeeTier {
            min_installments: self.minimum_installments,
            max_installments: self.maximum_installments,
            rate: FeeRate::from_bps((self.fee_percentage * 100.0).round() as u32),
            customer_interest: self.customer_interest,
            receive_in_days: self.receive_in_days,
        })
    }
}

/// A payment method ("form of receipt") as the remote API returns it.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentMethodDto {
    pub id: String,
    pub description: String,
    /// Tier list; `null` and absent both mean "no fees" (cash).
    #[serde(default)]
    pub fees: Option<Vec<FeeTierDto>>,
}

impl PaymentMethodDto {
    fn into_method(self) -> GatewayResult<PaymentMethod> {
        let tiers = self
            .fees
            .unwrap_or_default()
            .into_iter()
            .map(FeeTierDto::into_tier)
            .collect::<GatewayResult<Vec<_>>>()?;
        Ok(PaymentMethod {
            id: self.id,
            name: self.description,
            tiers,
        })
    }
}

/// Builds the validated fee-schedule snapshot from the raw method list.
/// Overlapping or inverted tier ranges surface here, before checkout opens.
pub fn build_schedule(methods: Vec<PaymentMethodDto>) -> GatewayResult<FeeSchedule> {
    let methods = methods
        .into_iter()
        .map(PaymentMethodDto::into_method)
        .collect::<GatewayResult<Vec<_>>>()?;
    Ok(FeeSchedule::new(methods)?)
}

// =============================================================================
// Catalog
// =============================================================================

/// A sellable product.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDto {
    pub id: String,
    pub description: String,
    pub unit_amount: RawAmount,
}

impl ProductDto {
    /// Converts into a cart line, freezing the price.
    pub fn into_item(self) -> GatewayResult<CartItem> {
        let amount = self.unit_amount.to_cents("unitAmount")?;
        Ok(CartItem::product(self.id, self.description, amount))
    }
}

/// A subscription plan, with the contract the student signs.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanDto {
    pub id: String,
    pub description: String,
    pub unit_amount: RawAmount,
    #[serde(default)]
    pub contract_html_content: Option<String>,
}

impl PlanDto {
    pub fn into_item(self) -> GatewayResult<CartItem> {
        let amount = self.unit_amount.to_cents("unitAmount")?;
        Ok(CartItem::plan(
            self.id,
            self.description,
            amount,
            self.contract_html_content,
        ))
    }
}

// =============================================================================
// Student
// =============================================================================

/// The student as the students endpoint returns it.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentDto {
    pub id: String,
    pub name: String,
    pub active: bool,
}

impl StudentDto {
    pub fn into_ref(self) -> StudentRef {
        StudentRef {
            id: self.id,
            active: self.active,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
