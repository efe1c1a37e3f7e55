use async_trait::async_trait;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use super::gateway_trait::PaymentGatewayAdapter;
use super::provider_http::{decimal_field, read_json, string_field};
use super::signature::{constant_time_eq, sha512_hex};
use crate::config::{parse_environment, MidtransConfig, MIDTRANS};
use crate::core::{is_valid_email, validate_base_url, AppError, Result};
use crate::modules::gateways::models::{
    Invoice, NormalizedWebhookResult, PaymentMethodInfo, PaymentRequest, WebhookHeaders,
    WebhookStatus,
};

const SANDBOX_SNAP_URL: &str = "https://app.sandbox.midtrans.com";
const PRODUCTION_SNAP_URL: &str = "https://app.midtrans.com";

/// Snap transactions expire after 24 hours
const EXPIRY_MINUTES: i64 = 1440;

/// Midtrans item names are capped at 50 characters
const ITEM_NAME_MAX: usize = 50;

/// Midtrans Snap adapter
///
/// API Documentation: https://docs.midtrans.com/reference/api-reference
pub struct MidtransAdapter {
    client: Client,
    server_key: String,
    snap_url: String,
    finish_url: Option<String>,
}

impl MidtransAdapter {
    /// Create a new Midtrans adapter
    ///
    /// # Errors
    /// `AppError::Configuration` when the server key is missing or the
    /// optional `base_url` is not an http(s) URL.
    pub fn new(config: &MidtransConfig, client: Client) -> Result<Self> {
        let server_key = config.server_key.trim();
        if server_key.is_empty() {
            return Err(AppError::configuration("midtrans server_key is required"));
        }

        let environment = parse_environment(MIDTRANS, config.environment.as_deref())?;
        if environment.is_production() && server_key.starts_with("SB-") {
            warn!(
                gateway = MIDTRANS,
                "Sandbox server key configured for production environment"
            );
        }

        let finish_url = match config.base_url.as_deref() {
            Some(base_url) => Some(format!(
                "{}/payment/finish",
                validate_base_url(MIDTRANS, Some(base_url))?
            )),
            None => None,
        };

        let snap_url = config
            .api_base_url
            .clone()
            .unwrap_or_else(|| {
                if environment.is_production() {
                    PRODUCTION_SNAP_URL.to_string()
                } else {
                    SANDBOX_SNAP_URL.to_string()
                }
            })
            .trim_end_matches('/')
            .to_string();

        Ok(Self {
            client,
            server_key: server_key.to_string(),
            snap_url,
            finish_url,
        })
    }

    /// Midtrans signature format: SHA512(order_id + status_code + gross_amount + server_key)
    fn expected_signature(&self, order_id: &str, status_code: &str, gross_amount: &str) -> String {
        let signature_string = format!(
            "{}{}{}{}",
            order_id, status_code, gross_amount, self.server_key
        );
        sha512_hex(signature_string.as_bytes())
    }

    fn build_request(&self, invoice: &Invoice) -> SnapTransactionRequest {
        let order_id = invoice.order_id();

        let email = invoice
            .customer_email
            .as_deref()
            .map(str::trim)
            .filter(|email| is_valid_email(email));
        if email.is_none() && invoice.customer_email.is_some() {
            debug!(
                gateway = MIDTRANS,
                order_id = %order_id,
                "Dropping malformed customer email from Snap request"
            );
        }

        let item_name: String = invoice.item_name().chars().take(ITEM_NAME_MAX).collect();

        SnapTransactionRequest {
            transaction_details: TransactionDetails {
                order_id: order_id.clone(),
                gross_amount: invoice.amount,
            },
            customer_details: CustomerDetails {
                first_name: invoice.customer_name.clone(),
                email: email.map(ToString::to_string),
                phone: invoice
                    .customer_phone
                    .clone()
                    .filter(|phone| !phone.trim().is_empty()),
            },
            item_details: vec![ItemDetails {
                id: invoice.package_id.clone().unwrap_or(order_id),
                price: invoice.amount,
                quantity: 1,
                name: item_name,
            }],
            callbacks: self.finish_url.clone().map(|finish| Callbacks { finish }),
            expiry: Expiry {
                unit: "minutes",
                duration: EXPIRY_MINUTES,
            },
        }
    }
}

/// Map a Midtrans `transaction_status` into the canonical status
pub fn map_midtrans_status(transaction_status: &str) -> WebhookStatus {
    match transaction_status {
        "settlement" | "capture" => WebhookStatus::Settlement,
        "pending" => WebhookStatus::Pending,
        "deny" | "expire" | "cancel" => WebhookStatus::Failed,
        other => WebhookStatus::Other(other.to_string()),
    }
}

#[async_trait]
impl PaymentGatewayAdapter for MidtransAdapter {
    fn name(&self) -> &'static str {
        MIDTRANS
    }

    async fn create_payment(&self, invoice: &Invoice) -> Result<PaymentRequest> {
        invoice.validate()?;

        let url = format!("{}/snap/v1/transactions", self.snap_url);
        let request = self.build_request(invoice);

        let response = self
            .client
            .post(&url)
            .basic_auth(&self.server_key, Some(""))
            .header("Accept", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| AppError::transport(MIDTRANS, e))?;

        let body = read_json(MIDTRANS, response).await?;
        let snap: SnapResponse = serde_json::from_value(body)
            .map_err(|e| AppError::provider(format!("Failed to parse Midtrans response: {}", e)))?;

        Ok(PaymentRequest {
            payment_url: snap.redirect_url,
            token: snap.token,
            reference: None,
            order_id: request.transaction_details.order_id,
            gateway: MIDTRANS.to_string(),
            payment_method: None,
            expires_at: Some(chrono::Utc::now() + chrono::Duration::minutes(EXPIRY_MINUTES)),
        })
    }

    async fn handle_webhook(
        &self,
        body: &[u8],
        _headers: &WebhookHeaders,
    ) -> Result<NormalizedWebhookResult> {
        let notification: Value = serde_json::from_slice(body)
            .map_err(|e| AppError::validation(format!("Invalid Midtrans notification: {}", e)))?;

        let signature = string_field(&notification, "signature_key")
            .ok_or_else(|| AppError::signature("Midtrans notification has no signature_key"))?;

        let order_id = string_field(&notification, "order_id").unwrap_or_default();
        let status_code = string_field(&notification, "status_code").unwrap_or_default();
        let gross_amount = string_field(&notification, "gross_amount").unwrap_or_default();

        let expected = self.expected_signature(&order_id, &status_code, &gross_amount);
        if !constant_time_eq(signature.as_bytes(), expected.as_bytes()) {
            warn!(gateway = MIDTRANS, order_id = %order_id, "Webhook signature mismatch");
            return Err(AppError::signature(format!(
                "Midtrans signature mismatch for order {}",
                order_id
            )));
        }

        let amount: Option<Decimal> = decimal_field(&notification, "gross_amount");

        Ok(NormalizedWebhookResult {
            order_id: Some(order_id).filter(|id| !id.is_empty()),
            status: string_field(&notification, "transaction_status")
                .map(|status| map_midtrans_status(&status)),
            amount,
            payment_type: string_field(&notification, "payment_type"),
            fraud_status: string_field(&notification, "fraud_status"),
            reference: string_field(&notification, "transaction_id"),
        })
    }

    async fn available_payment_methods(&self) -> Vec<PaymentMethodInfo> {
        vec![PaymentMethodInfo::bundled(MIDTRANS, "Midtrans (all payment methods)")]
    }
}

// Midtrans API request/response structures

#[derive(Debug, Serialize)]
struct SnapTransactionRequest {
    transaction_details: TransactionDetails,
    customer_details: CustomerDetails,
    item_details: Vec<ItemDetails>,
    #[serde(skip_serializing_if = "Option::is_none")]
    callbacks: Option<Callbacks>,
    expiry: Expiry,
}

#[derive(Debug, Serialize)]
struct TransactionDetails {
    order_id: String,
    gross_amount: u64,
}

#[derive(Debug, Serialize)]
struct CustomerDetails {
    first_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    phone: Option<String>,
}

#[derive(Debug, Serialize)]
struct ItemDetails {
    id: String,
    price: u64,
    quantity: u32,
    name: String,
}

#[derive(Debug, Serialize)]
struct Callbacks {
    finish: String,
}

#[derive(Debug, Serialize)]
struct Expiry {
    unit: &'static str,
    duration: i64,
}

#[derive(Debug, Deserialize)]
struct SnapResponse {
    token: String,
    redirect_url: String,
}
