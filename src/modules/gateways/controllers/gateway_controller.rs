use actix_web::{web, HttpRequest, HttpResponse};
use serde::Deserialize;
use tracing::info;

use crate::core::AppError;
use crate::modules::gateways::models::{Invoice, WebhookHeaders, WebhookPayload};
use crate::modules::gateways::services::GatewayRegistry;

/// Checkout request body
#[derive(Debug, Deserialize)]
pub struct CheckoutRequest {
    pub invoice: Invoice,
    #[serde(default)]
    pub gateway: Option<String>,
    #[serde(default)]
    pub method: Option<String>,
}

/// Create a payment for an invoice
/// POST /payment/checkout
pub async fn checkout(
    registry: web::Data<GatewayRegistry>,
    body: web::Json<CheckoutRequest>,
) -> Result<HttpResponse, AppError> {
    let request = body.into_inner();
    let payment = registry
        .create_payment_with_method(
            &request.invoice,
            request.gateway.as_deref(),
            request.method.as_deref(),
        )
        .await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "data": payment,
    })))
}

/// Receive a provider webhook
/// POST /payment/webhook/{gateway}
///
/// The body is passed on as raw bytes: Tripay signs the exact bytes it sent.
pub async fn webhook(
    registry: web::Data<GatewayRegistry>,
    path: web::Path<String>,
    req: HttpRequest,
    body: web::Bytes,
) -> Result<HttpResponse, AppError> {
    let gateway = path.into_inner();

    let headers: WebhookHeaders = req
        .headers()
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|value| (name.as_str().to_string(), value.to_string()))
        })
        .collect();

    info!(gateway = %gateway, bytes = body.len(), "Received webhook request");

    let result = registry
        .handle_webhook(WebhookPayload::envelope(body.to_vec(), headers), &gateway)
        .await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "data": result,
    })))
}

/// Gateway diagnostics
/// GET /payment/gateways
pub async fn gateway_status(registry: web::Data<GatewayRegistry>) -> HttpResponse {
    HttpResponse::Ok().json(registry.gateway_status().await)
}

/// Payment options across enabled gateways
/// GET /payment/methods
pub async fn payment_methods(registry: web::Data<GatewayRegistry>) -> HttpResponse {
    HttpResponse::Ok().json(registry.available_payment_methods().await)
}

/// Re-read gateway settings
/// POST /payment/gateways/reload
pub async fn reload(registry: web::Data<GatewayRegistry>) -> Result<HttpResponse, AppError> {
    registry.reload().await?;
    Ok(HttpResponse::Ok().json(registry.gateway_status().await))
}

/// Configure payment routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/payment")
            .route("/checkout", web::post().to(checkout))
            .route("/webhook/{gateway}", web::post().to(webhook))
            .route("/methods", web::get().to(payment_methods))
            .route("/gateways", web::get().to(gateway_status))
            .route("/gateways/reload", web::post().to(reload)),
    );
}
