//! Payment gateway integration core
//!
//! Routes invoices to Midtrans, Xendit or Tripay, verifies their webhook
//! notifications and normalizes the results into one shape.

pub mod config;
pub mod core;
pub mod middleware;
pub mod modules;

// Re-export commonly used types
pub use modules::gateways;
pub use modules::gateways::{GatewayRegistry, Invoice, NormalizedWebhookResult, PaymentRequest};
