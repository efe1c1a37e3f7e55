pub mod gateway_config;
pub mod invoice;
pub mod payment;
pub mod webhook;

pub use gateway_config::{GatewayEnvironment, GatewayStatus};
pub use invoice::{Invoice, ORDER_ID_PREFIX};
pub use payment::{PaymentMethodInfo, PaymentRequest, ALL_METHODS};
pub use webhook::{NormalizedWebhookResult, WebhookHeaders, WebhookPayload, WebhookStatus};
