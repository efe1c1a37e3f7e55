#[path = "../helpers/mod.rs"]
mod helpers;

use std::io::Write;
use std::sync::Arc;

use helpers::*;
use mockito::Server;
use paygate::config::{ConfigSource, InMemoryConfigSource, YamlConfigSource};
use paygate::core::AppError;
use paygate::GatewayRegistry;

fn snap_mock_body() -> &'static str {
    r#"{"token":"snap-token","redirect_url":"https://app.sandbox.midtrans.com/snap/v4/redirection/snap-token"}"#
}

/// Enabling a provider takes effect on reload without a restart
#[tokio::test]
async fn test_reload_enables_disabled_provider() {
    let mut server = Server::new_async().await;
    let _snap = server
        .mock("POST", "/snap/v1/transactions")
        .with_status(201)
        .with_header("content-type", "application/json")
        .with_body(snap_mock_body())
        .create_async()
        .await;

    let mut settings = all_gateways("tripay", Some(server.url()));
    if let Some(midtrans) = settings.payment_gateway.midtrans.as_mut() {
        midtrans.enabled = false;
    }

    let source = Arc::new(InMemoryConfigSource::new(settings.clone()));
    let registry = GatewayRegistry::new(source.clone(), reqwest::Client::new()).unwrap();

    let err = registry
        .create_payment(&budi_invoice(), Some("midtrans"))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::GatewayNotAvailable(_)));

    if let Some(midtrans) = settings.payment_gateway.midtrans.as_mut() {
        midtrans.enabled = true;
    }
    source.replace(settings).unwrap();
    registry.reload().await.unwrap();

    let payment = registry
        .create_payment(&budi_invoice(), Some("midtrans"))
        .await
        .unwrap();
    assert_eq!(payment.order_id, "INV-2024-001");
    assert_eq!(payment.gateway, "midtrans");
}

/// Switching the active gateway on reload
#[tokio::test]
async fn test_reload_switches_active_gateway() {
    let settings = all_gateways("tripay", None);
    let source = Arc::new(InMemoryConfigSource::new(settings.clone()));
    let registry = GatewayRegistry::new(source.clone(), reqwest::Client::new()).unwrap();
    assert_eq!(registry.active_gateway().await.as_deref(), Some("tripay"));

    let mut next = settings;
    next.payment_gateway.active = Some("Xendit".to_string());
    source.replace(next).unwrap();
    registry.reload().await.unwrap();

    assert_eq!(registry.active_gateway().await.as_deref(), Some("xendit"));
    let status = registry.gateway_status().await;
    assert!(status["xendit"].active);
    assert!(!status["tripay"].active);
}

/// Bad credentials picked up on reload disable only that provider
#[tokio::test]
async fn test_reload_with_bad_credentials_isolates_provider() {
    let mut settings = all_gateways("tripay", None);
    let source = Arc::new(InMemoryConfigSource::new(settings.clone()));
    let registry = GatewayRegistry::new(source.clone(), reqwest::Client::new()).unwrap();
    assert_eq!(
        registry.initialized_gateways().await,
        vec!["midtrans", "tripay", "xendit"]
    );

    if let Some(xendit) = settings.payment_gateway.xendit.as_mut() {
        xendit.secret_key = "sk_missing_prefix".to_string();
    }
    source.replace(settings).unwrap();
    registry.reload().await.unwrap();

    assert_eq!(registry.initialized_gateways().await, vec!["midtrans", "tripay"]);
    let status = registry.gateway_status().await;
    assert!(status["xendit"].enabled);
    assert!(!status["xendit"].initialized);
}

/// A source that cannot be read leaves the current adapters in place
#[tokio::test]
async fn test_failed_reload_keeps_current_adapters() {
    let mut file = temp_yaml_file("gateway_reload_test.yaml");
    writeln!(
        file.1,
        "payment_gateway:\n  active: midtrans\n  midtrans:\n    enabled: true\n    server_key: {}\n",
        MIDTRANS_SERVER_KEY
    )
    .unwrap();
    drop(file.1);

    let source = Arc::new(YamlConfigSource::new(file.0.clone()));
    assert!(source.load().is_ok());
    let registry = GatewayRegistry::new(source, reqwest::Client::new()).unwrap();

    std::fs::write(&file.0, "payment_gateway: [not, a, mapping").unwrap();
    let err = registry.reload().await.unwrap_err();
    assert!(matches!(err, AppError::Configuration(_)));

    assert_eq!(registry.initialized_gateways().await, vec!["midtrans"]);
    assert_eq!(registry.active_gateway().await.as_deref(), Some("midtrans"));

    let _ = std::fs::remove_file(&file.0);
}

fn temp_yaml_file(name: &str) -> (std::path::PathBuf, std::fs::File) {
    let dir = std::env::temp_dir().join(format!("paygate-{}", uuid::Uuid::new_v4()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join(name);
    let file = std::fs::File::create(&path).unwrap();
    (path, file)
}
