pub mod controllers;
pub mod models;
pub mod services;

pub use controllers::configure;
pub use models::{
    GatewayEnvironment, GatewayStatus, Invoice, NormalizedWebhookResult, PaymentMethodInfo,
    PaymentRequest, WebhookHeaders, WebhookPayload, WebhookStatus,
};
pub use services::{
    GatewayRegistry, MidtransAdapter, PaymentGatewayAdapter, TripayAdapter, XenditAdapter,
};
