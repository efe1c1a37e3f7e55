use crate::core::{AppError, Result};
use std::env;
use std::path::PathBuf;
use std::sync::Arc;

pub mod gateway;
pub mod server;
pub mod source;

pub use gateway::{
    parse_environment, GatewaySettings, MidtransConfig, PaymentGatewayConfig, TripayConfig,
    XenditConfig, KNOWN_GATEWAYS, MIDTRANS, TRIPAY, XENDIT,
};
pub use server::ServerConfig;
pub use source::{
    settings_from_vars, ConfigSource, EnvConfigSource, InMemoryConfigSource, YamlConfigSource,
};

/// Main application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub app: AppConfig,
    pub server: ServerConfig,
    /// YAML gateway settings; gateway settings come from the environment when unset
    pub gateway_config_path: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: String,
    pub log_format: LogFormat,
    pub provider_timeout_secs: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present
        dotenvy::dotenv().ok();

        let log_format = match env::var("LOG_FORMAT")
            .unwrap_or_else(|_| "pretty".to_string())
            .to_ascii_lowercase()
            .as_str()
        {
            "json" => LogFormat::Json,
            "pretty" | "text" => LogFormat::Pretty,
            other => {
                return Err(AppError::configuration(format!(
                    "Invalid LOG_FORMAT '{}'",
                    other
                )))
            }
        };

        Ok(Config {
            app: AppConfig {
                env: env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
                log_format,
                provider_timeout_secs: env::var("PROVIDER_TIMEOUT_SECS")
                    .unwrap_or_else(|_| "30".to_string())
                    .parse()
                    .map_err(|_| AppError::configuration("Invalid PROVIDER_TIMEOUT_SECS"))?,
            },
            server: ServerConfig::from_env()?,
            gateway_config_path: env::var("PAYMENT_GATEWAY_CONFIG").ok().map(PathBuf::from),
        })
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.app.provider_timeout_secs == 0 {
            return Err(AppError::configuration(
                "Provider timeout must be greater than 0",
            ));
        }

        if let Some(path) = &self.gateway_config_path {
            if !path.exists() {
                return Err(AppError::configuration(format!(
                    "PAYMENT_GATEWAY_CONFIG {} does not exist",
                    path.display()
                )));
            }
        }

        Ok(())
    }

    /// Config source the gateway registry reloads from
    pub fn gateway_source(&self) -> Arc<dyn ConfigSource> {
        match &self.gateway_config_path {
            Some(path) => Arc::new(YamlConfigSource::new(path.clone())),
            None => Arc::new(EnvConfigSource::new()),
        }
    }
}
