use std::str::FromStr;

use rust_decimal::Decimal;
use serde_json::Value;

use crate::core::{body_snippet, AppError, Result};

/// Read a provider response as JSON.
///
/// Non-2xx statuses and bodies that are not JSON (HTML error pages from a
/// proxy, for instance) become `ProviderRequest` errors that keep a snippet of
/// the raw body. When the provider returns a JSON error, its own message is
/// passed through.
pub async fn read_json(gateway: &str, response: reqwest::Response) -> Result<Value> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| AppError::provider(format!("Failed to read {} response: {}", gateway, e)))?;

    let parsed: Option<Value> = serde_json::from_str(&body).ok();

    if !status.is_success() {
        let detail = parsed
            .as_ref()
            .and_then(provider_message)
            .unwrap_or_else(|| body_snippet(&body));
        return Err(AppError::provider(format!(
            "{} API error - HTTP {} ({})",
            gateway,
            status.as_u16(),
            detail
        )));
    }

    parsed.ok_or_else(|| {
        AppError::provider(format!(
            "{} returned a non-JSON response (HTTP {}): {}",
            gateway,
            status.as_u16(),
            body_snippet(&body)
        ))
    })
}

/// Error message from the JSON error shapes the supported providers use
fn provider_message(body: &Value) -> Option<String> {
    if let Some(messages) = body.get("error_messages").and_then(Value::as_array) {
        let joined: Vec<&str> = messages.iter().filter_map(Value::as_str).collect();
        if !joined.is_empty() {
            return Some(joined.join("; "));
        }
    }

    body.get("message")
        .and_then(Value::as_str)
        .map(ToString::to_string)
}

/// String view of a JSON field that providers send either as a string or a number
pub fn string_field(body: &Value, field: &str) -> Option<String> {
    match body.get(field)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Decimal view of a JSON amount field (`"150000.00"`, `150000`, `0.7`)
pub fn decimal_field(body: &Value, field: &str) -> Option<Decimal> {
    body.get(field).and_then(decimal_value)
}

pub fn decimal_value(value: &Value) -> Option<Decimal> {
    let raw = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };

    Decimal::from_str(&raw)
        .or_else(|_| Decimal::from_scientific(&raw))
        .ok()
}
