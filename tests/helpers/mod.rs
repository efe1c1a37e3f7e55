// Shared builders for gateway integration tests
//
// Every adapter is pointed at a mockito server through `api_base_url`, so no
// test leaves the machine.

#![allow(dead_code)]

use paygate::config::{
    GatewaySettings, MidtransConfig, PaymentGatewayConfig, TripayConfig, XenditConfig,
};
use paygate::gateways::services::signature::{hmac_sha256_hex, sha512_hex};
use paygate::Invoice;
use serde_json::{json, Value};

pub const MIDTRANS_SERVER_KEY: &str = "SB-Mid-server-test-key";
pub const XENDIT_SECRET_KEY: &str = "xnd_development_test_key";
pub const XENDIT_CALLBACK_TOKEN: &str = "xendit-callback-token";
pub const TRIPAY_API_KEY: &str = "DEV-tripay-api-key";
pub const TRIPAY_PRIVATE_KEY: &str = "tripay-private-key";
pub const TRIPAY_MERCHANT_CODE: &str = "T0001";
pub const BILLING_BASE_URL: &str = "https://billing.example.com";

pub fn midtrans_config(api_base_url: Option<String>) -> MidtransConfig {
    MidtransConfig {
        enabled: true,
        server_key: MIDTRANS_SERVER_KEY.to_string(),
        client_key: Some("SB-Mid-client-test-key".to_string()),
        environment: Some("sandbox".to_string()),
        base_url: Some(BILLING_BASE_URL.to_string()),
        api_base_url,
    }
}

pub fn xendit_config(api_base_url: Option<String>) -> XenditConfig {
    XenditConfig {
        enabled: true,
        secret_key: XENDIT_SECRET_KEY.to_string(),
        callback_token: XENDIT_CALLBACK_TOKEN.to_string(),
        environment: Some("sandbox".to_string()),
        base_url: Some(BILLING_BASE_URL.to_string()),
        api_base_url,
    }
}

pub fn tripay_config(api_base_url: Option<String>) -> TripayConfig {
    TripayConfig {
        enabled: true,
        api_key: TRIPAY_API_KEY.to_string(),
        private_key: TRIPAY_PRIVATE_KEY.to_string(),
        merchant_code: TRIPAY_MERCHANT_CODE.to_string(),
        environment: Some("sandbox".to_string()),
        base_url: Some(BILLING_BASE_URL.to_string()),
        api_base_url,
        default_method: None,
        expiry_hours: None,
    }
}

/// All three providers enabled against one mock server
pub fn all_gateways(active: &str, api_base_url: Option<String>) -> GatewaySettings {
    GatewaySettings {
        payment_gateway: PaymentGatewayConfig {
            active: Some(active.to_string()),
            midtrans: Some(midtrans_config(api_base_url.clone())),
            xendit: Some(xendit_config(api_base_url.clone())),
            tripay: Some(tripay_config(api_base_url)),
        },
        ..Default::default()
    }
}

pub fn budi_invoice() -> Invoice {
    Invoice::new("2024-001", 150_000, "Budi")
        .with_email("budi@example.com")
        .with_phone("081234567890")
        .with_package("PKG-PRO", "Pro Package")
}

/// Midtrans notification body carrying a valid signature_key
pub fn midtrans_notification(order_id: &str, status: &str, gross_amount: &str) -> Value {
    let signature = sha512_hex(
        format!("{}200{}{}", order_id, gross_amount, MIDTRANS_SERVER_KEY).as_bytes(),
    );
    json!({
        "order_id": order_id,
        "status_code": "200",
        "gross_amount": gross_amount,
        "transaction_status": status,
        "transaction_id": "mid-txn-001",
        "payment_type": "bank_transfer",
        "fraud_status": "accept",
        "signature_key": signature,
    })
}

pub fn xendit_callback(external_id: &str, status: &str) -> Value {
    json!({
        "id": "xnd-inv-001",
        "external_id": external_id,
        "status": status,
        "amount": 150000,
        "paid_amount": 150000,
        "payment_method": "BANK_TRANSFER",
    })
}

pub fn tripay_callback(merchant_ref: &str, status: &str) -> Value {
    json!({
        "reference": "T0001000000000001",
        "merchant_ref": merchant_ref,
        "payment_method": "QRIS",
        "payment_method_code": "QRIS",
        "total_amount": 150000,
        "amount_received": 148950,
        "status": status,
    })
}

/// Signature Tripay would put in `X-Callback-Signature` for these exact bytes
pub fn tripay_signature(body: &[u8]) -> String {
    hmac_sha256_hex(TRIPAY_PRIVATE_KEY.as_bytes(), body)
}
