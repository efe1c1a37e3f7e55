use serde::{Deserialize, Serialize};

/// Sentinel method meaning "let the customer pick on the provider page"
pub const ALL_METHODS: &str = "all";

/// Payment created at a provider, returned to the checkout collaborator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentRequest {
    /// Hosted checkout URL for the customer
    pub payment_url: String,

    /// Provider token (Midtrans Snap token, Xendit invoice id, Tripay reference)
    pub token: String,

    /// Provider-side transaction reference, when the provider issues one
    pub reference: Option<String>,

    /// `INV-{invoice_number}`
    pub order_id: String,

    /// Gateway that created the payment
    pub gateway: String,

    /// Payment method requested by the caller
    pub payment_method: Option<String>,

    /// Expiry reported or requested by the provider
    pub expires_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// A payment option offered to customers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentMethodInfo {
    pub gateway: String,

    /// Method code passed back to `create_payment_with_method`
    pub code: String,

    pub name: String,

    pub group: Option<String>,

    /// Human-readable fee, e.g. `Rp 750 + 0.7%`
    pub fee: Option<String>,

    pub icon_url: Option<String>,
}

impl PaymentMethodInfo {
    /// Single bundled checkout entry for providers without per-channel creation
    pub fn bundled(gateway: &str, name: &str) -> Self {
        Self {
            gateway: gateway.to_string(),
            code: ALL_METHODS.to_string(),
            name: name.to_string(),
            group: None,
            fee: None,
            icon_url: None,
        }
    }
}
