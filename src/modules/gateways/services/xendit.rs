use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use super::gateway_trait::PaymentGatewayAdapter;
use super::provider_http::{decimal_field, read_json, string_field};
use super::signature::{constant_time_eq, verify_hmac_sha256_hex};
use crate::config::{parse_environment, XenditConfig, XENDIT};
use crate::core::{is_valid_email, validate_base_url, AppError, Result};
use crate::modules::gateways::models::{
    Invoice, NormalizedWebhookResult, PaymentMethodInfo, PaymentRequest, WebhookHeaders,
    WebhookStatus,
};

/// Xendit uses the same host for test and live keys
const XENDIT_API_URL: &str = "https://api.xendit.co";

/// Documented prefix of every Xendit secret key
const SECRET_KEY_PREFIX: &str = "xnd_";

pub const CALLBACK_TOKEN_HEADER: &str = "x-callback-token";

/// Header carrying the legacy body HMAC, honoured only without a callback token
pub const LEGACY_SIGNATURE_HEADER: &str = "x-callback-signature";

/// Xendit invoice adapter
pub struct XenditAdapter {
    client: Client,
    secret_key: String,
    callback_token: String,
    api_url: String,
    success_url: String,
    failure_url: String,
}

impl XenditAdapter {
    /// `fallback_base_url` is `http://{server_host}:{server_port}`, used when the
    /// Xendit section has no `base_url`
    pub fn new(config: &XenditConfig, fallback_base_url: &str, client: Client) -> Result<Self> {
        let secret_key = config.secret_key.trim();
        if secret_key.is_empty() {
            return Err(AppError::configuration("xendit secret_key is required"));
        }
        if !secret_key.starts_with(SECRET_KEY_PREFIX) {
            return Err(AppError::configuration(format!(
                "xendit secret_key must start with '{}'",
                SECRET_KEY_PREFIX
            )));
        }

        // One host serves both environments; the value is still checked
        parse_environment(XENDIT, config.environment.as_deref())?;

        let callback_token = config.callback_token.trim();
        if callback_token.is_empty() {
            return Err(AppError::configuration("xendit callback_token is required"));
        }

        let base_url = validate_base_url(
            XENDIT,
            Some(config.base_url.as_deref().unwrap_or(fallback_base_url)),
        )?;

        Ok(Self {
            client,
            secret_key: secret_key.to_string(),
            callback_token: callback_token.to_string(),
            api_url: config
                .api_base_url
                .as_deref()
                .unwrap_or(XENDIT_API_URL)
                .trim_end_matches('/')
                .to_string(),
            success_url: format!("{}/payment/finish", base_url),
            failure_url: format!("{}/payment/failed", base_url),
        })
    }

    /// Check the callback token, or the legacy body signature when the token header is absent.
    ///
    /// A present token header never falls through to the legacy check, even
    /// when it is empty or wrong.
    fn verify(&self, body: &[u8], headers: &WebhookHeaders) -> Result<()> {
        if let Some(token) = headers.get(CALLBACK_TOKEN_HEADER) {
            if constant_time_eq(token.as_bytes(), self.callback_token.as_bytes()) {
                return Ok(());
            }
            return Err(AppError::signature("Xendit callback token mismatch"));
        }

        match headers.get(LEGACY_SIGNATURE_HEADER) {
            Some(signature)
                if verify_hmac_sha256_hex(self.callback_token.as_bytes(), body, signature) =>
            {
                Ok(())
            }
            Some(_) => Err(AppError::signature("Xendit legacy signature mismatch")),
            None => Err(AppError::signature(format!(
                "Xendit webhook has neither {} nor {} header",
                CALLBACK_TOKEN_HEADER, LEGACY_SIGNATURE_HEADER
            ))),
        }
    }

    fn build_request(&self, invoice: &Invoice) -> XenditInvoiceRequest {
        let order_id = invoice.order_id();
        let email = invoice
            .customer_email
            .as_deref()
            .map(str::trim)
            .filter(|email| is_valid_email(email))
            .map(ToString::to_string);

        XenditInvoiceRequest {
            external_id: order_id.clone(),
            amount: invoice.amount,
            description: format!("Payment for {}", invoice.item_name()),
            payer_email: email.clone(),
            customer: XenditCustomer {
                given_names: invoice.customer_name.clone(),
                email,
                mobile_number: invoice
                    .customer_phone
                    .clone()
                    .filter(|phone| !phone.trim().is_empty()),
            },
            items: vec![XenditItem {
                name: invoice.item_name(),
                quantity: 1,
                price: invoice.amount,
            }],
            currency: "IDR",
            success_redirect_url: format!("{}?order_id={}", self.success_url, order_id),
            failure_redirect_url: format!("{}?order_id={}", self.failure_url, order_id),
        }
    }
}

/// Map a Xendit invoice status into the canonical status
pub fn map_xendit_status(status: &str) -> WebhookStatus {
    match status {
        "PAID" => WebhookStatus::Success,
        "PENDING" => WebhookStatus::Pending,
        "EXPIRED" | "FAILED" => WebhookStatus::Failed,
        other => WebhookStatus::Other(other.to_string()),
    }
}

#[async_trait]
impl PaymentGatewayAdapter for XenditAdapter {
    fn name(&self) -> &'static str {
        XENDIT
    }

    async fn create_payment(&self, invoice: &Invoice) -> Result<PaymentRequest> {
        // Xendit Invoice API: https://developers.xendit.co/api-reference/#create-invoice
        invoice.validate()?;

        let url = format!("{}/v2/invoices", self.api_url);
        let request = self.build_request(invoice);

        let response = self
            .client
            .post(&url)
            .basic_auth(&self.secret_key, Some(""))
            .json(&request)
            .send()
            .await
            .map_err(|e| AppError::transport(XENDIT, e))?;

        let body = read_json(XENDIT, response).await?;
        let xendit_invoice: XenditInvoiceResponse = serde_json::from_value(body)
            .map_err(|e| AppError::provider(format!("Failed to parse Xendit response: {}", e)))?;

        let expires_at = xendit_invoice
            .expiry_date
            .as_deref()
            .and_then(|raw| chrono::DateTime::parse_from_rfc3339(raw).ok())
            .map(|dt| dt.with_timezone(&Utc));

        Ok(PaymentRequest {
            payment_url: xendit_invoice.invoice_url,
            token: xendit_invoice.id.clone(),
            reference: Some(xendit_invoice.id),
            order_id: request.external_id,
            gateway: XENDIT.to_string(),
            payment_method: None,
            expires_at,
        })
    }

    async fn handle_webhook(
        &self,
        body: &[u8],
        headers: &WebhookHeaders,
    ) -> Result<NormalizedWebhookResult> {
        if let Err(e) = self.verify(body, headers) {
            warn!(gateway = XENDIT, error = %e, "Rejected webhook");
            return Err(e);
        }

        let callback: Value = serde_json::from_slice(body)
            .map_err(|e| AppError::validation(format!("Invalid Xendit callback: {}", e)))?;

        Ok(NormalizedWebhookResult {
            order_id: string_field(&callback, "external_id"),
            status: string_field(&callback, "status").map(|status| map_xendit_status(&status)),
            amount: decimal_field(&callback, "paid_amount")
                .or_else(|| decimal_field(&callback, "amount")),
            payment_type: string_field(&callback, "payment_method"),
            fraud_status: None,
            reference: string_field(&callback, "id"),
        })
    }

    async fn available_payment_methods(&self) -> Vec<PaymentMethodInfo> {
        vec![PaymentMethodInfo::bundled(XENDIT, "Xendit (all payment methods)")]
    }
}

// Xendit API request/response structures

#[derive(Debug, Serialize)]
struct XenditInvoiceRequest {
    external_id: String,
    amount: u64,
    description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    payer_email: Option<String>,
    customer: XenditCustomer,
    items: Vec<XenditItem>,
    currency: &'static str,
    success_redirect_url: String,
    failure_redirect_url: String,
}

#[derive(Debug, Serialize)]
struct XenditCustomer {
    given_names: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    mobile_number: Option<String>,
}

#[derive(Debug, Serialize)]
struct XenditItem {
    name: String,
    quantity: u32,
    price: u64,
}

#[derive(Debug, Deserialize)]
struct XenditInvoiceResponse {
    id: String,
    invoice_url: String,
    #[serde(default)]
    expiry_date: Option<String>,
}
