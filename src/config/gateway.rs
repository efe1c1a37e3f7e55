use serde::{Deserialize, Deserializer, Serialize};

use crate::core::{AppError, Result};
use crate::modules::gateways::models::GatewayEnvironment;

pub const MIDTRANS: &str = "midtrans";
pub const XENDIT: &str = "xendit";
pub const TRIPAY: &str = "tripay";

/// Every provider this crate knows how to talk to
pub const KNOWN_GATEWAYS: [&str; 3] = [MIDTRANS, XENDIT, TRIPAY];

/// Settings document read from a [`ConfigSource`](super::ConfigSource)
///
/// ```yaml
/// server_host: 0.0.0.0
/// server_port: 3000
/// payment_gateway:
///   active: tripay
///   tripay:
///     enabled: true
///     api_key: DEV-xxxx
///     private_key: xxxx
///     merchant_code: T1234
///     base_url: https://billing.example.com
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GatewaySettings {
    #[serde(default = "default_server_host")]
    pub server_host: String,

    #[serde(default = "default_server_port")]
    pub server_port: u16,

    #[serde(default)]
    pub payment_gateway: PaymentGatewayConfig,
}

impl Default for GatewaySettings {
    fn default() -> Self {
        Self {
            server_host: default_server_host(),
            server_port: default_server_port(),
            payment_gateway: PaymentGatewayConfig::default(),
        }
    }
}

impl GatewaySettings {
    /// Base URL used when a provider has no explicit `base_url`
    pub fn fallback_base_url(&self) -> String {
        format!("http://{}:{}", self.server_host, self.server_port)
    }
}

/// `payment_gateway.*`: one optional section per provider plus the active selector
///
/// A provider is "configured" when its section is present.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PaymentGatewayConfig {
    #[serde(default)]
    pub active: Option<String>,

    #[serde(default)]
    pub midtrans: Option<MidtransConfig>,

    #[serde(default)]
    pub xendit: Option<XenditConfig>,

    #[serde(default)]
    pub tripay: Option<TripayConfig>,
}

impl PaymentGatewayConfig {
    /// Active gateway name, normalized; `None` when unset or blank
    pub fn active_gateway(&self) -> Option<String> {
        self.active
            .as_deref()
            .map(|name| name.trim().to_ascii_lowercase())
            .filter(|name| !name.is_empty())
    }

    pub fn is_configured(&self, gateway: &str) -> bool {
        match gateway {
            MIDTRANS => self.midtrans.is_some(),
            XENDIT => self.xendit.is_some(),
            TRIPAY => self.tripay.is_some(),
            _ => false,
        }
    }

    pub fn is_enabled(&self, gateway: &str) -> bool {
        match gateway {
            MIDTRANS => self.midtrans.as_ref().is_some_and(|c| c.enabled),
            XENDIT => self.xendit.as_ref().is_some_and(|c| c.enabled),
            TRIPAY => self.tripay.as_ref().is_some_and(|c| c.enabled),
            _ => false,
        }
    }

    /// Names of every configured provider, in a stable order
    pub fn configured_gateways(&self) -> Vec<&'static str> {
        KNOWN_GATEWAYS
            .into_iter()
            .filter(|name| self.is_configured(name))
            .collect()
    }
}

/// Midtrans Snap credentials
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MidtransConfig {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default)]
    pub server_key: String,

    #[serde(default)]
    pub client_key: Option<String>,

    /// `sandbox` (default) or `production`; checked when the adapter is built
    #[serde(default, deserialize_with = "scalar_string")]
    pub environment: Option<String>,

    /// Application base URL for the Snap finish redirect
    #[serde(default)]
    pub base_url: Option<String>,

    /// Override for the Snap host
    #[serde(default)]
    pub api_base_url: Option<String>,
}

/// Xendit invoice API credentials
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct XenditConfig {
    #[serde(default)]
    pub enabled: bool,

    /// Secret API key, `xnd_development_...` or `xnd_production_...`
    #[serde(default)]
    pub secret_key: String,

    /// Verification token configured in the Xendit dashboard
    #[serde(default)]
    pub callback_token: String,

    /// `sandbox` (default) or `production`; checked when the adapter is built
    #[serde(default, deserialize_with = "scalar_string")]
    pub environment: Option<String>,

    #[serde(default)]
    pub base_url: Option<String>,

    #[serde(default)]
    pub api_base_url: Option<String>,
}

/// Tripay merchant credentials
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TripayConfig {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default)]
    pub api_key: String,

    #[serde(default)]
    pub private_key: String,

    #[serde(default)]
    pub merchant_code: String,

    /// `sandbox` (default) or `production`; checked when the adapter is built
    #[serde(default, deserialize_with = "scalar_string")]
    pub environment: Option<String>,

    /// Required: callback and return URLs are built from it
    #[serde(default)]
    pub base_url: Option<String>,

    #[serde(default)]
    pub api_base_url: Option<String>,

    /// Channel used when the caller does not pick one
    #[serde(default)]
    pub default_method: Option<String>,

    /// Payment window in hours, 24 when unset; checked when the adapter is built
    #[serde(default, deserialize_with = "scalar_string")]
    pub expiry_hours: Option<String>,
}

/// Parse a provider's `environment` value; unset or blank means sandbox
pub fn parse_environment(gateway: &str, raw: Option<&str>) -> Result<GatewayEnvironment> {
    match raw.map(str::trim).filter(|value| !value.is_empty()) {
        None => Ok(GatewayEnvironment::default()),
        Some(value) => value
            .parse()
            .map_err(|e| AppError::configuration(format!("{} environment: {}", gateway, e))),
    }
}

/// Plain YAML/env scalar kept as text
#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Text(String),
    Integer(i64),
    Float(f64),
    Flag(bool),
}

/// Provider values whose format is checked per adapter, so one bad value
/// disables only that provider instead of failing the whole document
fn scalar_string<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<Scalar> = Option::deserialize(deserializer)?;
    Ok(value.map(|scalar| match scalar {
        Scalar::Text(text) => text,
        Scalar::Integer(n) => n.to_string(),
        Scalar::Float(n) => n.to_string(),
        Scalar::Flag(b) => b.to_string(),
    }))
}

fn default_server_host() -> String {
    "localhost".to_string()
}

fn default_server_port() -> u16 {
    3000
}
