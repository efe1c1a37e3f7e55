use std::sync::Arc;
use std::time::Duration;

use actix_web::{web, App, HttpResponse, HttpServer};
use anyhow::Context;
use paygate::config::{Config, LogFormat};
use paygate::gateways::{self, GatewayRegistry};
use paygate::middleware::RequestId;
use tracing_actix_web::TracingLogger;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env().context("Failed to load configuration")?;
    config.validate().context("Configuration validation failed")?;

    // Initialize tracing
    let json = config.app.log_format == LogFormat::Json;
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "paygate=debug,actix_web=info".into()),
        )
        .with(json.then(|| fmt::layer().json()))
        .with((!json).then(|| fmt::layer()))
        .init();

    tracing::info!(env = %config.app.env, "Starting payment gateway service");

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.app.provider_timeout_secs))
        .build()
        .context("Failed to build HTTP client")?;

    let registry = GatewayRegistry::new(config.gateway_source(), client)
        .context("Failed to load gateway settings")?;

    match registry.active_gateway().await {
        Some(active) => tracing::info!(
            active = %active,
            initialized = ?registry.initialized_gateways().await,
            "Gateway registry ready"
        ),
        None => tracing::warn!("No active payment gateway configured"),
    }

    let registry = web::Data::from(Arc::new(registry));
    let bind_address = config.server.bind_address();
    let workers = config.server.workers;

    let server = HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            .wrap(RequestId)
            .app_data(registry.clone())
            .route("/health", web::get().to(health_check))
            .configure(gateways::configure)
    })
    .workers(workers)
    .bind(&bind_address)
    .with_context(|| format!("Failed to bind {}", bind_address))?
    .run();

    tracing::info!("Server started at http://{}", bind_address);

    server.await?;
    Ok(())
}

async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "service": "paygate"
    }))
}
