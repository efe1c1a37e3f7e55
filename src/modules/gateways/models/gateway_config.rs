use serde::{Deserialize, Serialize};

/// Provider environment
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GatewayEnvironment {
    #[default]
    Sandbox,
    Production,
}

impl GatewayEnvironment {
    pub fn is_production(&self) -> bool {
        matches!(self, GatewayEnvironment::Production)
    }
}

impl std::str::FromStr for GatewayEnvironment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sandbox" | "development" | "test" => Ok(GatewayEnvironment::Sandbox),
            "production" | "live" => Ok(GatewayEnvironment::Production),
            other => Err(format!("unknown gateway environment '{}'", other)),
        }
    }
}

impl std::fmt::Display for GatewayEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GatewayEnvironment::Sandbox => write!(f, "sandbox"),
            GatewayEnvironment::Production => write!(f, "production"),
        }
    }
}

/// Diagnostic snapshot of one configured gateway
///
/// `enabled && !initialized` means the credentials were rejected at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayStatus {
    pub enabled: bool,
    pub active: bool,
    pub initialized: bool,
}
