use crate::core::{AppError, Result};

/// Maximum number of characters of a provider body kept in error messages
pub const BODY_SNIPPET_LEN: usize = 500;

/// Syntactic email check: one `@`, a non-empty local part and a dotted domain,
/// no whitespace. Adapters omit addresses failing this check from provider requests.
pub fn is_valid_email(email: &str) -> bool {
    let email = email.trim();
    if email.is_empty() || email.chars().any(char::is_whitespace) {
        return false;
    }

    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };

    if local.is_empty() || domain.contains('@') {
        return false;
    }

    let labels: Vec<&str> = domain.split('.').collect();
    labels.len() >= 2 && labels.iter().all(|label| !label.is_empty())
}

/// Validate an application base URL used to build callback/return URLs.
///
/// Returns the URL without a trailing slash.
pub fn validate_base_url(gateway: &str, base_url: Option<&str>) -> Result<String> {
    let base_url = base_url.map(str::trim).unwrap_or_default();

    if base_url.is_empty() {
        return Err(AppError::configuration(format!(
            "{} requires base_url for callback and return URLs",
            gateway
        )));
    }

    let invalid = || {
        AppError::configuration(format!(
            "{} base_url must be an http:// or https:// URL with a host, got '{}'",
            gateway, base_url
        ))
    };

    let url = reqwest::Url::parse(base_url).map_err(|_| invalid())?;
    if !matches!(url.scheme(), "http" | "https") || !url.host_str().is_some_and(|h| !h.is_empty())
    {
        return Err(invalid());
    }

    Ok(url.as_str().trim_end_matches('/').to_string())
}

/// Truncate a raw provider body for diagnostics
pub fn body_snippet(body: &str) -> String {
    if body.chars().count() <= BODY_SNIPPET_LEN {
        return body.to_string();
    }

    let truncated: String = body.chars().take(BODY_SNIPPET_LEN).collect();
    format!("{}...", truncated)
}
