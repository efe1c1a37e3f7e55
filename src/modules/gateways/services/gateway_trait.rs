use async_trait::async_trait;

use crate::core::Result;
use crate::modules::gateways::models::{
    Invoice, NormalizedWebhookResult, PaymentMethodInfo, PaymentRequest, WebhookHeaders,
};

/// Provider-specific payment creation and webhook verification
///
/// Constructors validate credentials and return `AppError::Configuration` when
/// they are unusable; the registry relies on that to leave the provider out.
#[async_trait]
pub trait PaymentGatewayAdapter: Send + Sync {
    /// Gateway name used for lookup and tagging
    fn name(&self) -> &'static str;

    /// Create a hosted checkout for the invoice
    async fn create_payment(&self, invoice: &Invoice) -> Result<PaymentRequest>;

    /// Whether `create_payment_with_method` honours the method
    fn supports_method_selection(&self) -> bool {
        false
    }

    /// Create a payment on a specific channel; adapters without channel
    /// selection fall back to `create_payment`
    async fn create_payment_with_method(
        &self,
        invoice: &Invoice,
        _method: &str,
    ) -> Result<PaymentRequest> {
        self.create_payment(invoice).await
    }

    /// Verify authenticity of a webhook, then map it into the canonical shape.
    ///
    /// Must return `AppError::SignatureVerification` on any authenticity failure
    /// and must not read status fields before verification succeeds.
    async fn handle_webhook(
        &self,
        body: &[u8],
        headers: &WebhookHeaders,
    ) -> Result<NormalizedWebhookResult>;

    /// Payment options offered to customers. Never fails.
    async fn available_payment_methods(&self) -> Vec<PaymentMethodInfo>;
}
