#[path = "../helpers/mod.rs"]
mod helpers;

use helpers::*;
use paygate::core::AppError;
use paygate::gateways::models::WebhookHeaders;
use paygate::gateways::services::signature::hmac_sha256_hex;
use paygate::gateways::{MidtransAdapter, PaymentGatewayAdapter, TripayAdapter, XenditAdapter};
use proptest::prelude::*;
use serde_json::json;

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap()
}

/// Flip one of the low seven bits so ASCII stays ASCII
fn flip(bytes: &[u8], index: usize, bit: u8) -> Vec<u8> {
    let mut tampered = bytes.to_vec();
    let i = index % tampered.len();
    tampered[i] ^= 1 << (bit % 7);
    tampered
}

fn flip_str(value: &str, index: usize, bit: u8) -> String {
    String::from_utf8(flip(value.as_bytes(), index, bit)).unwrap()
}

fn is_signature_error<T: std::fmt::Debug>(result: &Result<T, AppError>) -> bool {
    matches!(result, Err(AppError::SignatureVerification(_)))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn tripay_rejects_any_flipped_body_bit(index in 0usize..4096, bit in 0u8..7) {
        let adapter = TripayAdapter::new(&tripay_config(None), reqwest::Client::new()).unwrap();
        let body = serde_json::to_vec(&tripay_callback("INV-2024-001", "PAID")).unwrap();
        let headers = WebhookHeaders::new().with("X-Callback-Signature", tripay_signature(&body));

        let rt = runtime();
        prop_assert!(rt.block_on(adapter.handle_webhook(&body, &headers)).is_ok());

        let tampered = flip(&body, index, bit);
        let result = rt.block_on(adapter.handle_webhook(&tampered, &headers));
        prop_assert!(is_signature_error(&result), "accepted tampered body: {:?}", result);
    }

    #[test]
    fn tripay_rejects_any_flipped_signature_bit(index in 0usize..64, bit in 0u8..7) {
        let adapter = TripayAdapter::new(&tripay_config(None), reqwest::Client::new()).unwrap();
        let body = serde_json::to_vec(&tripay_callback("INV-2024-001", "PAID")).unwrap();
        let signature = flip_str(&tripay_signature(&body), index, bit);
        let headers = WebhookHeaders::new().with("X-Callback-Signature", signature);

        let result = runtime().block_on(adapter.handle_webhook(&body, &headers));
        prop_assert!(is_signature_error(&result));
    }

    #[test]
    fn midtrans_rejects_any_flipped_signed_field(index in 0usize..64, bit in 0u8..7) {
        let adapter = MidtransAdapter::new(&midtrans_config(None), reqwest::Client::new()).unwrap();
        let mut notification = midtrans_notification("INV-2024-001", "settlement", "150000.00");
        let order_id = notification["order_id"].as_str().unwrap().to_string();
        notification["order_id"] = json!(flip_str(&order_id, index, bit));

        let body = serde_json::to_vec(&notification).unwrap();
        let result = runtime().block_on(adapter.handle_webhook(&body, &WebhookHeaders::new()));
        prop_assert!(is_signature_error(&result));
    }

    #[test]
    fn midtrans_rejects_any_flipped_signature_bit(index in 0usize..128, bit in 0u8..7) {
        let adapter = MidtransAdapter::new(&midtrans_config(None), reqwest::Client::new()).unwrap();
        let mut notification = midtrans_notification("INV-2024-001", "settlement", "150000.00");
        let signature = notification["signature_key"].as_str().unwrap().to_string();
        notification["signature_key"] = json!(flip_str(&signature, index, bit));

        let body = serde_json::to_vec(&notification).unwrap();
        let result = runtime().block_on(adapter.handle_webhook(&body, &WebhookHeaders::new()));
        prop_assert!(is_signature_error(&result));
    }

    #[test]
    fn xendit_rejects_any_flipped_token_bit(index in 0usize..64, bit in 0u8..7) {
        let adapter = XenditAdapter::new(&xendit_config(None), BILLING_BASE_URL, reqwest::Client::new()).unwrap();
        let body = serde_json::to_vec(&xendit_callback("INV-2024-001", "PAID")).unwrap();
        let token = flip_str(XENDIT_CALLBACK_TOKEN, index, bit);
        let headers = WebhookHeaders::new().with("X-CALLBACK-TOKEN", token);

        let result = runtime().block_on(adapter.handle_webhook(&body, &headers));
        prop_assert!(is_signature_error(&result));
    }

    #[test]
    fn xendit_legacy_signature_rejects_any_flipped_body_bit(index in 0usize..4096, bit in 0u8..7) {
        let adapter = XenditAdapter::new(&xendit_config(None), BILLING_BASE_URL, reqwest::Client::new()).unwrap();
        let body = serde_json::to_vec(&xendit_callback("INV-2024-001", "PAID")).unwrap();
        let signature = hmac_sha256_hex(XENDIT_CALLBACK_TOKEN.as_bytes(), &body);
        let headers = WebhookHeaders::new().with("x-callback-signature", signature);

        let rt = runtime();
        prop_assert!(rt.block_on(adapter.handle_webhook(&body, &headers)).is_ok());

        let tampered = flip(&body, index, bit);
        let result = rt.block_on(adapter.handle_webhook(&tampered, &headers));
        prop_assert!(is_signature_error(&result));
    }

    #[test]
    fn xendit_legacy_signature_rejects_any_flipped_signature_bit(index in 0usize..64, bit in 0u8..7) {
        let adapter = XenditAdapter::new(&xendit_config(None), BILLING_BASE_URL, reqwest::Client::new()).unwrap();
        let body = serde_json::to_vec(&xendit_callback("INV-2024-001", "PAID")).unwrap();
        let signature = flip_str(&hmac_sha256_hex(XENDIT_CALLBACK_TOKEN.as_bytes(), &body), index, bit);
        let headers = WebhookHeaders::new().with("x-callback-signature", signature);

        let result = runtime().block_on(adapter.handle_webhook(&body, &headers));
        prop_assert!(is_signature_error(&result));
    }
}
