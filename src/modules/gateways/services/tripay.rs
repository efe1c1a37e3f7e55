use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use reqwest::Client;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use super::gateway_trait::PaymentGatewayAdapter;
use super::provider_http::{decimal_field, decimal_value, read_json, string_field};
use super::signature::{hmac_sha256_hex, verify_hmac_sha256_hex};
use crate::config::{parse_environment, TripayConfig, TRIPAY};
use crate::core::{
    format_percent, format_rupiah, is_valid_email, validate_base_url, AppError, Result,
};
use crate::modules::gateways::models::{
    Invoice, NormalizedWebhookResult, PaymentMethodInfo, PaymentRequest, WebhookHeaders,
    WebhookStatus,
};

const SANDBOX_API_URL: &str = "https://tripay.co.id/api-sandbox";
const PRODUCTION_API_URL: &str = "https://tripay.co.id/api";

/// Channel used when neither the caller nor the administrator picked one
const DEFAULT_METHOD: &str = "QRIS";

const DEFAULT_EXPIRY_HOURS: u32 = 24;

pub const CALLBACK_SIGNATURE_HEADER: &str = "x-callback-signature";

/// Channels offered when the live channel list cannot be fetched
const FALLBACK_CHANNELS: [(&str, &str, &str); 7] = [
    ("QRIS", "QRIS", "E-Wallet"),
    ("OVO", "OVO", "E-Wallet"),
    ("DANA", "DANA", "E-Wallet"),
    ("SHOPEEPAY", "ShopeePay", "E-Wallet"),
    ("BRIVA", "BRI Virtual Account", "Virtual Account"),
    ("BNIVA", "BNI Virtual Account", "Virtual Account"),
    ("MANDIRIVA", "Mandiri Virtual Account", "Virtual Account"),
];

/// Tripay closed-payment adapter
///
/// API Documentation: https://tripay.co.id/developer
pub struct TripayAdapter {
    client: Client,
    api_key: String,
    private_key: String,
    merchant_code: String,
    api_url: String,
    callback_url: String,
    return_url: String,
    default_method: String,
    expiry_hours: u32,
}

impl TripayAdapter {
    /// Create a new Tripay adapter
    ///
    /// Unlike the other providers Tripay has no server-address fallback: a
    /// callback URL it cannot reach only shows up later as undelivered
    /// callbacks, so `base_url` must be set explicitly.
    pub fn new(config: &TripayConfig, client: Client) -> Result<Self> {
        let required = [
            ("api_key", &config.api_key),
            ("private_key", &config.private_key),
            ("merchant_code", &config.merchant_code),
        ];
        let missing: Vec<&str> = required
            .iter()
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(name, _)| *name)
            .collect();
        if !missing.is_empty() {
            return Err(AppError::configuration(format!(
                "tripay {} required",
                missing.join(", ")
            )));
        }

        let base_url = validate_base_url(TRIPAY, config.base_url.as_deref())?;

        let environment = parse_environment(TRIPAY, config.environment.as_deref())?;
        let expiry_hours = parse_expiry_hours(config.expiry_hours.as_deref())?;

        let api_url = config
            .api_base_url
            .clone()
            .unwrap_or_else(|| {
                if environment.is_production() {
                    PRODUCTION_API_URL.to_string()
                } else {
                    SANDBOX_API_URL.to_string()
                }
            })
            .trim_end_matches('/')
            .to_string();

        let default_method = config
            .default_method
            .as_deref()
            .map(str::trim)
            .filter(|method| !method.is_empty())
            .unwrap_or(DEFAULT_METHOD)
            .to_string();

        Ok(Self {
            client,
            api_key: config.api_key.trim().to_string(),
            private_key: config.private_key.trim().to_string(),
            merchant_code: config.merchant_code.trim().to_string(),
            api_url,
            callback_url: format!("{}/payment/webhook/{}", base_url, TRIPAY),
            return_url: format!("{}/payment/finish", base_url),
            default_method,
            expiry_hours,
        })
    }

    /// Transaction signature: HMAC-SHA256(merchant_code + merchant_ref + amount, private_key)
    pub fn sign_order(&self, merchant_ref: &str, amount: u64) -> String {
        let payload = format!("{}{}{}", self.merchant_code, merchant_ref, amount);
        hmac_sha256_hex(self.private_key.as_bytes(), payload.as_bytes())
    }

    fn build_request(&self, invoice: &Invoice, method: &str) -> TripayTransactionRequest {
        let merchant_ref = invoice.order_id();
        let expired_time = Utc::now().timestamp() + i64::from(self.expiry_hours) * 3600;

        TripayTransactionRequest {
            method: method.to_string(),
            signature: self.sign_order(&merchant_ref, invoice.amount),
            merchant_ref: merchant_ref.clone(),
            amount: invoice.amount,
            customer_name: invoice.customer_name.clone(),
            customer_email: invoice
                .customer_email
                .as_deref()
                .map(str::trim)
                .filter(|email| is_valid_email(email))
                .map(ToString::to_string),
            customer_phone: invoice
                .customer_phone
                .clone()
                .filter(|phone| !phone.trim().is_empty()),
            order_items: vec![TripayOrderItem {
                sku: invoice.package_id.clone().unwrap_or(merchant_ref),
                name: invoice.item_name(),
                price: invoice.amount,
                quantity: 1,
            }],
            callback_url: self.callback_url.clone(),
            return_url: self.return_url.clone(),
            expired_time,
        }
    }

    async fn create_transaction(&self, invoice: &Invoice, method: &str) -> Result<PaymentRequest> {
        invoice.validate()?;

        let url = format!("{}/transaction/create", self.api_url);
        let request = self.build_request(invoice, method);

        info!(
            gateway = TRIPAY,
            order_id = %request.merchant_ref,
            method = %method,
            amount = invoice.amount,
            "Creating Tripay transaction"
        );

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| AppError::transport(TRIPAY, e))?;

        let body = read_json(TRIPAY, response).await?;
        let data = unwrap_envelope(body)?;
        let transaction: TripayTransaction = serde_json::from_value(data)
            .map_err(|e| AppError::provider(format!("Failed to parse Tripay response: {}", e)))?;

        let expires_at = transaction
            .expired_time
            .and_then(|ts| Utc.timestamp_opt(ts, 0).single());

        Ok(PaymentRequest {
            payment_url: transaction.checkout_url,
            token: transaction.reference.clone(),
            reference: Some(transaction.reference),
            order_id: request.merchant_ref,
            gateway: TRIPAY.to_string(),
            payment_method: Some(method.to_string()),
            expires_at,
        })
    }

    /// Live channel list, active channels only
    pub async fn fetch_payment_channels(&self) -> Result<Vec<PaymentMethodInfo>> {
        let url = format!("{}/merchant/payment-channel", self.api_url);

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(|e| AppError::transport(TRIPAY, e))?;

        let body = read_json(TRIPAY, response).await?;
        let data = unwrap_envelope(body)?;
        let channels: Vec<TripayChannel> = serde_json::from_value(data).map_err(|e| {
            AppError::provider(format!("Failed to parse Tripay payment channels: {}", e))
        })?;

        Ok(channels
            .into_iter()
            .filter(|channel| channel.active)
            .map(|channel| PaymentMethodInfo {
                gateway: TRIPAY.to_string(),
                fee: Some(channel.fee_description()),
                code: channel.code,
                name: channel.name,
                group: channel.group,
                icon_url: channel.icon_url,
            })
            .collect())
    }
}

/// Unset or blank means 24 hours
fn parse_expiry_hours(raw: Option<&str>) -> Result<u32> {
    let Some(raw) = raw.map(str::trim).filter(|value| !value.is_empty()) else {
        return Ok(DEFAULT_EXPIRY_HOURS);
    };

    match raw.parse::<u32>() {
        Ok(hours) if hours > 0 => Ok(hours),
        _ => Err(AppError::configuration(format!(
            "tripay expiry_hours must be a whole number of hours greater than 0, got '{}'",
            raw
        ))),
    }
}

/// Tripay wraps every response in `{success, message, data}`
fn unwrap_envelope(mut body: Value) -> Result<Value> {
    let success = body.get("success").and_then(Value::as_bool).unwrap_or(false);
    if !success {
        let message = body
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("request was not successful");
        return Err(AppError::provider(format!("Tripay API error: {}", message)));
    }

    body.get_mut("data")
        .map(Value::take)
        .ok_or_else(|| AppError::provider("Tripay response has no data"))
}

/// Customer-facing fee: `Free`, `Rp 4.250`, `0.7%` or `Rp 750 + 0.7%`
pub fn format_fee(flat: Decimal, percent: Decimal) -> String {
    match (flat.is_zero(), percent.is_zero()) {
        (true, true) => "Free".to_string(),
        (false, true) => format_rupiah(flat),
        (true, false) => format_percent(percent),
        (false, false) => format!("{} + {}", format_rupiah(flat), format_percent(percent)),
    }
}

/// Fixed list of common channels
pub fn fallback_payment_methods() -> Vec<PaymentMethodInfo> {
    FALLBACK_CHANNELS
        .iter()
        .map(|(code, name, group)| PaymentMethodInfo {
            gateway: TRIPAY.to_string(),
            code: code.to_string(),
            name: name.to_string(),
            group: Some(group.to_string()),
            fee: None,
            icon_url: None,
        })
        .collect()
}

/// Map a Tripay transaction status into the canonical status
pub fn map_tripay_status(status: &str) -> WebhookStatus {
    match status {
        "PAID" => WebhookStatus::Success,
        "UNPAID" => WebhookStatus::Pending,
        "EXPIRED" | "FAILED" => WebhookStatus::Failed,
        other => WebhookStatus::Other(other.to_string()),
    }
}

#[async_trait]
impl PaymentGatewayAdapter for TripayAdapter {
    fn name(&self) -> &'static str {
        TRIPAY
    }

    async fn create_payment(&self, invoice: &Invoice) -> Result<PaymentRequest> {
        self.create_transaction(invoice, &self.default_method).await
    }

    fn supports_method_selection(&self) -> bool {
        true
    }

    /// The customer's channel overrides the administrator default
    async fn create_payment_with_method(
        &self,
        invoice: &Invoice,
        method: &str,
    ) -> Result<PaymentRequest> {
        let method = method.trim();
        if method.is_empty() {
            return self.create_payment(invoice).await;
        }
        self.create_transaction(invoice, method).await
    }

    async fn handle_webhook(
        &self,
        body: &[u8],
        headers: &WebhookHeaders,
    ) -> Result<NormalizedWebhookResult> {
        // Signed over the exact bytes Tripay sent, never a re-serialization
        let signature = headers.get(CALLBACK_SIGNATURE_HEADER).ok_or_else(|| {
            warn!(gateway = TRIPAY, "Webhook without callback signature");
            AppError::signature(format!("Tripay webhook has no {} header", CALLBACK_SIGNATURE_HEADER))
        })?;

        if !verify_hmac_sha256_hex(self.private_key.as_bytes(), body, signature) {
            warn!(gateway = TRIPAY, "Webhook signature mismatch");
            return Err(AppError::signature("Tripay callback signature mismatch"));
        }

        let callback: Value = serde_json::from_slice(body)
            .map_err(|e| AppError::validation(format!("Invalid Tripay callback: {}", e)))?;

        Ok(NormalizedWebhookResult {
            order_id: string_field(&callback, "merchant_ref"),
            status: string_field(&callback, "status").map(|status| map_tripay_status(&status)),
            amount: decimal_field(&callback, "total_amount")
                .or_else(|| decimal_field(&callback, "amount_received")),
            payment_type: string_field(&callback, "payment_method_code")
                .or_else(|| string_field(&callback, "payment_method")),
            fraud_status: None,
            reference: string_field(&callback, "reference"),
        })
    }

    async fn available_payment_methods(&self) -> Vec<PaymentMethodInfo> {
        match self.fetch_payment_channels().await {
            Ok(channels) if !channels.is_empty() => channels,
            Ok(_) => {
                warn!(gateway = TRIPAY, "No active payment channels, using fallback list");
                fallback_payment_methods()
            }
            Err(e) => {
                warn!(gateway = TRIPAY, error = %e, "Payment channel lookup failed, using fallback list");
                fallback_payment_methods()
            }
        }
    }
}

// Tripay API request/response structures

#[derive(Debug, Serialize)]
struct TripayTransactionRequest {
    method: String,
    merchant_ref: String,
    amount: u64,
    customer_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    customer_email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    customer_phone: Option<String>,
    order_items: Vec<TripayOrderItem>,
    callback_url: String,
    return_url: String,
    expired_time: i64,
    signature: String,
}

#[derive(Debug, Serialize)]
struct TripayOrderItem {
    sku: String,
    name: String,
    price: u64,
    quantity: u32,
}

#[derive(Debug, Deserialize)]
struct TripayTransaction {
    reference: String,
    checkout_url: String,
    #[serde(default)]
    expired_time: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct TripayChannel {
    #[serde(default)]
    group: Option<String>,
    code: String,
    name: String,
    #[serde(default)]
    fee_customer: Option<TripayFee>,
    #[serde(default)]
    total_fee: Option<TripayFee>,
    #[serde(default)]
    icon_url: Option<String>,
    #[serde(default)]
    active: bool,
}

/// Tripay sends fee parts as numbers or numeric strings
#[derive(Debug, Deserialize)]
struct TripayFee {
    #[serde(default)]
    flat: Value,
    #[serde(default)]
    percent: Value,
}

impl TripayChannel {
    fn fee_description(&self) -> String {
        let fee = self.fee_customer.as_ref().or(self.total_fee.as_ref());
        let (flat, percent) = fee
            .map(|fee| {
                (
                    decimal_value(&fee.flat).unwrap_or_default(),
                    decimal_value(&fee.percent).unwrap_or_default(),
                )
            })
            .unwrap_or_default();
        format_fee(flat, percent)
    }
}
