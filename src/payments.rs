//! Outbound HTTP client for the payment provider. A thin sequence of calls
//! with no retry, idempotency or reconciliation of its own; the provider's
//! answer is mirrored straight into `orders.payment_status`.

use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;

use crate::config::AppConfig;
use crate::entities::{order, order_item};

#[derive(Clone, Debug)]
pub struct PaymentGateway {
    http: reqwest::Client,
    base_url: String,
    access_token: String,
    frontend_url: String,
}

#[derive(Error, Debug)]
pub enum PaymentError {
    #[error("Provider request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("Provider rejected the call: {0}")]
    Provider(String),
}

/// Provider-side checkout preference: the correlation id stored on the order
/// plus the redirect URL the storefront sends the customer to.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct PreferenceResponse {
    pub id: String,
    pub init_point: String,
}

/// A single payment as the provider reports it. `external_reference` carries
/// our order id when the payment came out of one of our preferences.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct PaymentInfo {
    pub id: serde_json::Value,
    pub status: String,
    pub external_reference: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct CardPaymentRequest {
    pub order_id: i32,
    pub token: String,
    pub payment_method_id: String,
    pub installments: i32,
    pub payer_email: String,
}

impl PaymentGateway {
    pub fn new(config: &AppConfig) -> Self {
        PaymentGateway {
            http: reqwest::Client::new(),
            base_url: config.mp_base_url.clone(),
            access_token: config.mp_access_token.clone(),
            frontend_url: config.frontend_url.clone(),
        }
    }

    /// Creates a checkout preference for the order, one provider item per
    /// order item, with the order id as external reference.
    pub async fn create_preference(
        &self,
        order: &order::Model,
        items: &[order_item::Model],
    ) -> Result<PreferenceResponse, PaymentError> {
        let provider_items: Vec<serde_json::Value> = items
            .iter()
            .map(|item| {
                json!({
                    "title": item.product_name,
                    "quantity": item.quantity,
                    "unit_price": item.unit_price,
                    "currency_id": "BRL",
                })
            })
            .collect();

        let body = json!({
            "items": provider_items,
            "external_reference": order.id.to_string(),
            "back_urls": {
                "success": format!("{}/pedido/{}/sucesso", self.frontend_url, order.id),
                "failure": format!("{}/pedido/{}/falha", self.frontend_url, order.id),
                "pending": format!("{}/pedido/{}/pendente", self.frontend_url, order.id),
            },
        });

        let response = self
            .http
            .post(format!("{}/checkout/preferences", self.base_url))
            .bearer_auth(&self.access_token)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(PaymentError::Provider(detail));
        }

        Ok(response.json::<PreferenceResponse>().await?)
    }

    /// Synchronous card charge. The provider answers with the payment status
    /// in the same response.
    pub async fn process_card(
        &self,
        order: &order::Model,
        request: &CardPaymentRequest,
    ) -> Result<PaymentInfo, PaymentError> {
        let body = json!({
            "transaction_amount": order.total_amount,
            "token": request.token,
            "installments": request.installments,
            "payment_method_id": request.payment_method_id,
            "external_reference": order.id.to_string(),
            "payer": { "email": request.payer_email },
        });

        let response = self
            .http
            .post(format!("{}/v1/payments", self.base_url))
            .bearer_auth(&self.access_token)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(PaymentError::Provider(detail));
        }

        Ok(response.json::<PaymentInfo>().await?)
    }

    /// Fetches one payment by the provider's id, used by the webhook and the
    /// status poll to read the latest status.
    pub async fn fetch_payment(&self, payment_id: &str) -> Result<PaymentInfo, PaymentError> {
        let response = self
            .http
            .get(format!("{}/v1/payments/{}", self.base_url, payment_id))
            .bearer_auth(&self.access_token)
            .send()
            .await?;

        if !response.status().is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(PaymentError::Provider(detail));
        }

        Ok(response.json::<PaymentInfo>().await?)
    }
}
