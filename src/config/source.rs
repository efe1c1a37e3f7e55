use std::env;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use tracing::warn;

use crate::core::{AppError, Result};

use super::gateway::{
    GatewaySettings, MidtransConfig, PaymentGatewayConfig, TripayConfig, XenditConfig,
};

/// Supplier of gateway settings
///
/// `load` is called once when the registry is built and again on every
/// `GatewayRegistry::reload`, so implementations must return fresh values.
pub trait ConfigSource: Send + Sync {
    fn load(&self) -> Result<GatewaySettings>;
}

/// Settings held in memory and replaced by the embedding application
#[derive(Debug, Default)]
pub struct InMemoryConfigSource {
    settings: RwLock<GatewaySettings>,
}

impl InMemoryConfigSource {
    pub fn new(settings: GatewaySettings) -> Self {
        Self {
            settings: RwLock::new(settings),
        }
    }

    /// Swap in new settings; picked up on the next reload
    pub fn replace(&self, settings: GatewaySettings) -> Result<()> {
        let mut guard = self
            .settings
            .write()
            .map_err(|_| AppError::internal("gateway settings lock poisoned"))?;
        *guard = settings;
        Ok(())
    }
}

impl ConfigSource for InMemoryConfigSource {
    fn load(&self) -> Result<GatewaySettings> {
        self.settings
            .read()
            .map(|settings| settings.clone())
            .map_err(|_| AppError::internal("gateway settings lock poisoned"))
    }
}

/// YAML file re-read on every load
#[derive(Debug, Clone)]
pub struct YamlConfigSource {
    path: PathBuf,
}

impl YamlConfigSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ConfigSource for YamlConfigSource {
    fn load(&self) -> Result<GatewaySettings> {
        let raw = std::fs::read_to_string(&self.path).map_err(|e| {
            AppError::configuration(format!(
                "failed to read gateway config {}: {}",
                self.path.display(),
                e
            ))
        })?;

        serde_yaml::from_str(&raw).map_err(|e| {
            AppError::configuration(format!(
                "invalid gateway config {}: {}",
                self.path.display(),
                e
            ))
        })
    }
}

/// Environment variables, with `.env` re-applied on every load
#[derive(Debug, Clone, Default)]
pub struct EnvConfigSource;

impl EnvConfigSource {
    pub fn new() -> Self {
        Self
    }
}

impl ConfigSource for EnvConfigSource {
    fn load(&self) -> Result<GatewaySettings> {
        // Override so edits to .env are visible on reload
        dotenvy::dotenv_override().ok();
        settings_from_vars(|key| env::var(key).ok())
    }
}

/// Build settings from a variable lookup.
///
/// A provider section exists when `{PREFIX}_ENABLED` or any of its credential
/// variables is set. Missing credentials stay empty so that the adapter
/// constructor reports them.
pub fn settings_from_vars<F>(var: F) -> Result<GatewaySettings>
where
    F: Fn(&str) -> Option<String>,
{
    let defaults = GatewaySettings::default();

    let server_port = match var("SERVER_PORT") {
        Some(port) => port
            .trim()
            .parse()
            .map_err(|_| AppError::configuration(format!("Invalid SERVER_PORT '{}'", port)))?,
        None => defaults.server_port,
    };

    let midtrans = if section_present(&var, "MIDTRANS", &["SERVER_KEY", "CLIENT_KEY"]) {
        Some(MidtransConfig {
            enabled: flag(&var, "MIDTRANS_ENABLED"),
            server_key: var("MIDTRANS_SERVER_KEY").unwrap_or_default(),
            client_key: var("MIDTRANS_CLIENT_KEY"),
            environment: var("MIDTRANS_ENVIRONMENT"),
            base_url: var("MIDTRANS_BASE_URL"),
            api_base_url: var("MIDTRANS_API_BASE_URL"),
        })
    } else {
        None
    };

    let xendit = if section_present(&var, "XENDIT", &["SECRET_KEY", "CALLBACK_TOKEN"]) {
        Some(XenditConfig {
            enabled: flag(&var, "XENDIT_ENABLED"),
            secret_key: var("XENDIT_SECRET_KEY").unwrap_or_default(),
            callback_token: var("XENDIT_CALLBACK_TOKEN").unwrap_or_default(),
            environment: var("XENDIT_ENVIRONMENT"),
            base_url: var("XENDIT_BASE_URL"),
            api_base_url: var("XENDIT_API_BASE_URL"),
        })
    } else {
        None
    };

    let tripay = if section_present(
        &var,
        "TRIPAY",
        &["API_KEY", "PRIVATE_KEY", "MERCHANT_CODE"],
    ) {
        Some(TripayConfig {
            enabled: flag(&var, "TRIPAY_ENABLED"),
            api_key: var("TRIPAY_API_KEY").unwrap_or_default(),
            private_key: var("TRIPAY_PRIVATE_KEY").unwrap_or_default(),
            merchant_code: var("TRIPAY_MERCHANT_CODE").unwrap_or_default(),
            environment: var("TRIPAY_ENVIRONMENT"),
            base_url: var("TRIPAY_BASE_URL"),
            api_base_url: var("TRIPAY_API_BASE_URL"),
            default_method: var("TRIPAY_DEFAULT_METHOD"),
            expiry_hours: var("TRIPAY_EXPIRY_HOURS"),
        })
    } else {
        None
    };

    Ok(GatewaySettings {
        server_host: var("SERVER_HOST").unwrap_or(defaults.server_host),
        server_port,
        payment_gateway: PaymentGatewayConfig {
            active: var("PAYMENT_GATEWAY_ACTIVE"),
            midtrans,
            xendit,
            tripay,
        },
    })
}

fn section_present<F>(var: &F, prefix: &str, keys: &[&str]) -> bool
where
    F: Fn(&str) -> Option<String>,
{
    var(&format!("{}_ENABLED", prefix)).is_some()
        || keys
            .iter()
            .any(|key| var(&format!("{}_{}", prefix, key)).is_some())
}

/// Unrecognized values disable that one provider
fn flag<F>(var: &F, key: &str) -> bool
where
    F: Fn(&str) -> Option<String>,
{
    let Some(value) = var(key) else {
        return false;
    };

    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => true,
        "0" | "false" | "no" | "off" | "" => false,
        _ => {
            warn!(key = key, value = %value, "Invalid boolean, provider left disabled");
            false
        }
    }
}
