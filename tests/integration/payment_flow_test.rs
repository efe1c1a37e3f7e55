#[path = "../helpers/mod.rs"]
mod helpers;

use helpers::*;
use mockito::{Matcher, Server};
use paygate::core::AppError;
use paygate::{GatewayRegistry, Invoice};
use serde_json::json;

/// Checkout against Tripay with the customer's QRIS choice
#[tokio::test]
async fn test_tripay_checkout_with_customer_method() {
    let mut server = Server::new_async().await;
    let _create = server
        .mock("POST", "/transaction/create")
        .match_header("authorization", format!("Bearer {}", TRIPAY_API_KEY).as_str())
        .match_body(Matcher::PartialJson(json!({
            "method": "QRIS",
            "merchant_ref": "INV-2024-001",
            "amount": 150000,
            "customer_name": "Budi",
            "callback_url": "https://billing.example.com/payment/webhook/tripay",
            "return_url": "https://billing.example.com/payment/finish"
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "success": true,
                "message": "",
                "data": {
                    "reference": "T0001000000000001",
                    "merchant_ref": "INV-2024-001",
                    "checkout_url": "https://tripay.co.id/checkout/T0001000000000001",
                    "status": "UNPAID",
                    "expired_time": 1704189600
                }
            })
            .to_string(),
        )
        .create_async()
        .await;

    let registry =
        GatewayRegistry::from_settings(all_gateways("tripay", Some(server.url())), reqwest::Client::new())
            .unwrap();

    let invoice = Invoice::new("2024-001", 150_000, "Budi");
    let payment = registry
        .create_payment_with_method(&invoice, None, Some("QRIS"))
        .await
        .unwrap();

    assert_eq!(payment.order_id, "INV-2024-001");
    assert_eq!(payment.gateway, "tripay");
    assert_eq!(payment.payment_method.as_deref(), Some("QRIS"));
    assert_eq!(
        payment.payment_url,
        "https://tripay.co.id/checkout/T0001000000000001"
    );
    assert_eq!(payment.token, "T0001000000000001");
    assert!(payment.expires_at.is_some());
}

/// Invoice is never mutated while a payment is created
#[tokio::test]
async fn test_create_payment_leaves_invoice_untouched() {
    let mut server = Server::new_async().await;
    let _snap = server
        .mock("POST", "/snap/v1/transactions")
        .with_status(201)
        .with_header("content-type", "application/json")
        .with_body(r#"{"token":"snap-token","redirect_url":"https://app.sandbox.midtrans.com/snap/v4/redirection/snap-token"}"#)
        .create_async()
        .await;

    let registry =
        GatewayRegistry::from_settings(all_gateways("midtrans", Some(server.url())), reqwest::Client::new())
            .unwrap();

    let invoice = budi_invoice();
    let before = invoice.clone();
    let payment = registry.create_payment(&invoice, None).await.unwrap();

    assert_eq!(invoice, before);
    assert_eq!(payment.order_id, "INV-2024-001");
    assert_eq!(payment.gateway, "midtrans");
    assert_eq!(payment.token, "snap-token");
}

/// Explicit gateway overrides the active one
#[tokio::test]
async fn test_explicit_gateway_overrides_active() {
    let mut server = Server::new_async().await;
    let _invoice = server
        .mock("POST", "/v2/invoices")
        .match_body(Matcher::PartialJson(json!({
            "external_id": "INV-2024-001",
            "success_redirect_url": "https://billing.example.com/payment/finish?order_id=INV-2024-001"
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "id": "xnd-inv-001",
                "external_id": "INV-2024-001",
                "invoice_url": "https://checkout-staging.xendit.co/web/xnd-inv-001",
                "expiry_date": "2024-01-02T10:00:00.000Z"
            })
            .to_string(),
        )
        .create_async()
        .await;

    let registry =
        GatewayRegistry::from_settings(all_gateways("midtrans", Some(server.url())), reqwest::Client::new())
            .unwrap();

    let payment = registry
        .create_payment(&budi_invoice(), Some("xendit"))
        .await
        .unwrap();

    assert_eq!(payment.gateway, "xendit");
    assert_eq!(payment.token, "xnd-inv-001");
    assert!(payment.expires_at.is_some());
}

/// Provider failures reach the caller with the provider's message
#[tokio::test]
async fn test_provider_error_propagates() {
    let mut server = Server::new_async().await;
    let _create = server
        .mock("POST", "/transaction/create")
        .with_status(400)
        .with_header("content-type", "application/json")
        .with_body(r#"{"success":false,"message":"Invalid payment method"}"#)
        .create_async()
        .await;

    let registry =
        GatewayRegistry::from_settings(all_gateways("tripay", Some(server.url())), reqwest::Client::new())
            .unwrap();

    let err = registry
        .create_payment_with_method(&budi_invoice(), None, Some("NOPE"))
        .await
        .unwrap_err();

    match err {
        AppError::ProviderRequest(msg) => assert!(msg.contains("Invalid payment method")),
        other => panic!("expected provider error, got {:?}", other),
    }
}

/// An HTML error page is a hard error carrying a body snippet
#[tokio::test]
async fn test_non_json_response_is_provider_error() {
    let mut server = Server::new_async().await;
    let _create = server
        .mock("POST", "/transaction/create")
        .with_status(200)
        .with_header("content-type", "text/html")
        .with_body("<html><body>502 Bad Gateway</body></html>")
        .create_async()
        .await;

    let registry =
        GatewayRegistry::from_settings(all_gateways("tripay", Some(server.url())), reqwest::Client::new())
            .unwrap();

    let err = registry.create_payment(&budi_invoice(), None).await.unwrap_err();
    match err {
        AppError::ProviderRequest(msg) => assert!(msg.contains("502 Bad Gateway")),
        other => panic!("expected provider error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_no_active_gateway() {
    let mut settings = all_gateways("tripay", None);
    settings.payment_gateway.active = None;
    let registry = GatewayRegistry::from_settings(settings, reqwest::Client::new()).unwrap();

    let err = registry.create_payment(&budi_invoice(), None).await.unwrap_err();
    assert!(matches!(err, AppError::NoActiveGateway));
}

#[tokio::test]
async fn test_disabled_gateway_is_unavailable() {
    let mut settings = all_gateways("tripay", None);
    if let Some(tripay) = settings.payment_gateway.tripay.as_mut() {
        tripay.enabled = false;
    }
    let registry = GatewayRegistry::from_settings(settings, reqwest::Client::new()).unwrap();

    let err = registry.create_payment(&budi_invoice(), None).await.unwrap_err();
    assert!(matches!(err, AppError::GatewayNotAvailable(_)));
    assert_eq!(err.to_string(), "Payment gateway unavailable: tripay");
}
