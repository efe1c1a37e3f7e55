use std::collections::HashMap;
use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Canonical webhook status
///
/// Provider strings without a canonical meaning are carried through untouched
/// in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum WebhookStatus {
    Pending,
    /// Midtrans `settlement`/`capture`
    Settlement,
    /// Xendit/Tripay `PAID`
    Success,
    Failed,
    Other(String),
}

impl WebhookStatus {
    pub fn as_str(&self) -> &str {
        match self {
            WebhookStatus::Pending => "pending",
            WebhookStatus::Settlement => "settlement",
            WebhookStatus::Success => "success",
            WebhookStatus::Failed => "failed",
            WebhookStatus::Other(raw) => raw,
        }
    }

    /// Whether the payment is settled and the invoice can be marked paid
    pub fn is_paid(&self) -> bool {
        matches!(self, WebhookStatus::Settlement | WebhookStatus::Success)
    }
}

impl From<String> for WebhookStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "pending" => WebhookStatus::Pending,
            "settlement" => WebhookStatus::Settlement,
            "success" => WebhookStatus::Success,
            "failed" => WebhookStatus::Failed,
            _ => WebhookStatus::Other(value),
        }
    }
}

impl From<WebhookStatus> for String {
    fn from(status: WebhookStatus) -> Self {
        match status {
            WebhookStatus::Other(raw) => raw,
            other => other.as_str().to_string(),
        }
    }
}

impl fmt::Display for WebhookStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Verified webhook, mapped into one shape for every provider
///
/// Every field is always serialized; missing values come out as `null`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NormalizedWebhookResult {
    pub order_id: Option<String>,
    pub status: Option<WebhookStatus>,
    pub amount: Option<Decimal>,
    pub payment_type: Option<String>,
    pub fraud_status: Option<String>,
    pub reference: Option<String>,
}

/// Inbound webhook headers with case-insensitive lookup
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WebhookHeaders {
    inner: HashMap<String, String>,
}

impl WebhookHeaders {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl AsRef<str>, value: impl Into<String>) {
        self.inner
            .insert(name.as_ref().to_ascii_lowercase(), value.into());
    }

    pub fn with(mut self, name: impl AsRef<str>, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.inner
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }
}

impl<K: AsRef<str>, V: Into<String>> FromIterator<(K, V)> for WebhookHeaders {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut headers = WebhookHeaders::new();
        for (name, value) in iter {
            headers.insert(name, value);
        }
        headers
    }
}

/// What the route layer hands over: either the bare body or body plus headers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookPayload {
    Raw(Vec<u8>),
    Envelope {
        body: Vec<u8>,
        headers: WebhookHeaders,
    },
}

impl WebhookPayload {
    pub fn envelope(body: impl Into<Vec<u8>>, headers: WebhookHeaders) -> Self {
        WebhookPayload::Envelope {
            body: body.into(),
            headers,
        }
    }

    /// Split into `(body, headers)`; a raw body has no headers
    pub fn into_parts(self) -> (Vec<u8>, WebhookHeaders) {
        match self {
            WebhookPayload::Raw(body) => (body, WebhookHeaders::new()),
            WebhookPayload::Envelope { body, headers } => (body, headers),
        }
    }
}

impl From<Vec<u8>> for WebhookPayload {
    fn from(body: Vec<u8>) -> Self {
        WebhookPayload::Raw(body)
    }
}

impl From<&str> for WebhookPayload {
    fn from(body: &str) -> Self {
        WebhookPayload::Raw(body.as_bytes().to_vec())
    }
}

impl From<String> for WebhookPayload {
    fn from(body: String) -> Self {
        WebhookPayload::Raw(body.into_bytes())
    }
}
