//! # Back-office API Client
//!
//! HTTP client for the three conversations the checkout flow has with the
//! remote API: fetching the payment-method/fee-tier snapshot, fetching the
//! selected student, and submitting the finalized sale.
//!
//! ## Retry Contract
//! `create_sale` failing (transport or non-2xx) leaves the in-memory
//! session untouched and **Balanced** - the caller simply retries the same
//! request. Nothing is persisted remotely until the API answers 2xx.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::dto::{build_schedule, PaymentMethodDto, StudentDto};
use crate::error::{GatewayError, GatewayResult};
use crate::payload::SaleRequest;
use vela_core::{FeeSchedule, StudentRef};

/// The created sale, as acknowledged by the remote API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleResponse {
    pub id: String,
    pub created_at: DateTime<Utc>,
}

/// HTTP client for the back-office REST API.
#[derive(Debug, Clone)]
pub struct SaleClient {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl SaleClient {
    /// Creates a client against a base URL.
    pub fn new(base_url: &str) -> GatewayResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()?;

        Ok(SaleClient {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: None,
        })
    }

    /// Sets the bearer token for subsequent requests.
    pub fn set_token(&mut self, token: impl Into<String>) {
        self.token = Some(token.into());
    }

    /// Fetches the payment methods and builds the validated fee-schedule
    /// snapshot the engine computes against.
    pub async fn fetch_payment_methods(&self) -> GatewayResult<FeeSchedule> {
        debug!("fetching payment methods");
        let methods: Vec<PaymentMethodDto> = self.get("/forms-of-receipt").await?;
        let schedule = build_schedule(methods)?;
        debug!(methods = schedule.methods().len(), "fee schedule ready");
        Ok(schedule)
    }

    /// Fetches the selected student's reference data.
    pub async fn fetch_student(&self, student_id: &str) -> GatewayResult<StudentRef> {
        debug!(student_id = %student_id, "fetching student");
        let student: StudentDto = self.get(&format!("/students/{student_id}")).await?;
        if !student.active {
            warn!(student_id = %student.id, "student is inactive");
        }
        Ok(student.into_ref())
    }

    /// Submits the finalized sale.
    ///
    /// On success the caller marks the session submitted; on any error the
    /// session stays Balanced for retry.
    pub async fn create_sale(&self, request: &SaleRequest) -> GatewayResult<SaleResponse> {
        debug!(
            student_id = %request.student_id,
            items = request.items.len(),
            payments = request.payments.len(),
            "submitting sale"
        );

        let response: SaleResponse = self.post("/sales", request).await?;
        info!(sale_id = %response.id, "sale created");
        Ok(response)
    }

    // -------------------------------------------------------------------------
    // Internal HTTP helpers
    // -------------------------------------------------------------------------

    fn auth_header(&self) -> Option<String> {
        self.token.as_ref().map(|t| format!("Bearer {t}"))
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> GatewayResult<T> {
        let url = format!("{}{}", self.base_url, path);
        let mut req = self.client.get(&url);
        if let Some(auth) = self.auth_header() {
            req = req.header(reqwest::header::AUTHORIZATION, auth);
        }
        Self::decode(req.send().await?).await
    }

    async fn post<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> GatewayResult<T> {
        let url = format!("{}{}", self.base_url, path);
        let mut req = self.client.post(&url).json(body);
        if let Some(auth) = self.auth_header() {
            req = req.header(reqwest::header::AUTHORIZATION, auth);
        }
        Self::decode(req.send().await?).await
    }

    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> GatewayResult<T> {
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "api request failed");
            return Err(GatewayError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = SaleClient::new("https://api.vela.example/v1/").unwrap();
        assert_eq!(client.base_url, "https://api.vela.example/v1");
    }

    #[test]
    fn test_auth_header() {
        let mut client = SaleClient::new("https://api.vela.example").unwrap();
        assert!(client.auth_header().is_none());
        client.set_token("abc123");
        assert_eq!(client.auth_header().as_deref(), Some("Bearer abc123"));
    }

    #[test]
    fn test_sale_response_decodes() {
        let json = r#"{"id": "sale-1", "createdAt": "2025-03-10T12:00:00Z"}"#;
        let response: SaleResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.id, "sale-1");
    }
}
