pub mod gateway_registry;
pub mod gateway_trait;
pub mod midtrans;
pub mod provider_http;
pub mod signature;
pub mod tripay;
pub mod xendit;

pub use gateway_registry::GatewayRegistry;
pub use gateway_trait::PaymentGatewayAdapter;
pub use midtrans::MidtransAdapter;
pub use tripay::TripayAdapter;
pub use xendit::XenditAdapter;
