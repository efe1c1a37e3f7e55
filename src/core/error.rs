use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};

/// Application-wide Result type
pub type Result<T> = std::result::Result<T, AppError>;

/// Main application error type
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    /// Missing or malformed gateway credentials, raised while constructing an adapter
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Malformed invoice field or base URL
    #[error("Validation error: {0}")]
    Validation(String),

    /// No gateway was requested and none is configured as active
    #[error("No active payment gateway configured")]
    NoActiveGateway,

    /// Unknown, uninitialized or disabled gateway
    #[error("Payment gateway unavailable: {0}")]
    GatewayNotAvailable(String),

    /// Network failure, non-2xx status or non-JSON body from a provider
    #[error("Gateway error: {0}")]
    ProviderRequest(String),

    /// Webhook authenticity check failed
    #[error("Signature verification failed: {0}")]
    SignatureVerification(String),

    /// Internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        let status_code = self.status_code();
        let error_message = self.to_string();

        HttpResponse::build(status_code).json(serde_json::json!({
            "success": false,
            "error": {
                "message": error_message,
                "code": status_code.as_u16(),
            }
        }))
    }

    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Configuration(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NoActiveGateway => StatusCode::SERVICE_UNAVAILABLE,
            AppError::GatewayNotAvailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::ProviderRequest(_) => StatusCode::BAD_GATEWAY,
            AppError::SignatureVerification(_) => StatusCode::UNAUTHORIZED,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

// Helper functions for common error scenarios
impl AppError {
    pub fn configuration(msg: impl Into<String>) -> Self {
        AppError::Configuration(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::Validation(msg.into())
    }

    pub fn unavailable(gateway: impl Into<String>) -> Self {
        AppError::GatewayNotAvailable(gateway.into())
    }

    pub fn provider(msg: impl Into<String>) -> Self {
        AppError::ProviderRequest(msg.into())
    }

    pub fn signature(msg: impl Into<String>) -> Self {
        AppError::SignatureVerification(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        AppError::Internal(msg.into())
    }

    /// Wrap a transport error from `reqwest` with the gateway name
    pub fn transport(gateway: &str, err: reqwest::Error) -> Self {
        if err.is_connect() || err.is_timeout() {
            AppError::ProviderRequest(format!(
                "{} gateway unreachable: {} ({})",
                gateway,
                if err.is_timeout() {
                    "timeout"
                } else {
                    "connection failed"
                },
                err
            ))
        } else {
            AppError::ProviderRequest(format!("{} API request failed: {}", gateway, err))
        }
    }
}
