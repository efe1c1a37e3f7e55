use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use futures_util::future::join_all;
use reqwest::Client;
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::{error, info, warn};

use super::gateway_trait::PaymentGatewayAdapter;
use super::midtrans::MidtransAdapter;
use super::provider_http::{decimal_field, string_field};
use super::tripay::TripayAdapter;
use super::xendit::XenditAdapter;
use crate::config::{ConfigSource, GatewaySettings, InMemoryConfigSource, MIDTRANS, TRIPAY, XENDIT};
use crate::core::{AppError, Result};
use crate::modules::gateways::models::{
    GatewayStatus, Invoice, NormalizedWebhookResult, PaymentMethodInfo, PaymentRequest,
    WebhookPayload, WebhookStatus, ALL_METHODS,
};

type SharedAdapter = Arc<dyn PaymentGatewayAdapter>;

/// Builds one adapter from settings; `None` when the provider is absent or disabled
type AdapterFactory = fn(&GatewaySettings, Client) -> Option<Result<SharedAdapter>>;

/// Provider-name lookup table
const ADAPTER_FACTORIES: [(&str, AdapterFactory); 3] = [
    (MIDTRANS, build_midtrans),
    (XENDIT, build_xendit),
    (TRIPAY, build_tripay),
];

fn build_midtrans(settings: &GatewaySettings, client: Client) -> Option<Result<SharedAdapter>> {
    let config = settings.payment_gateway.midtrans.as_ref().filter(|c| c.enabled)?;
    Some(MidtransAdapter::new(config, client).map(|a| Arc::new(a) as SharedAdapter))
}

fn build_xendit(settings: &GatewaySettings, client: Client) -> Option<Result<SharedAdapter>> {
    let config = settings.payment_gateway.xendit.as_ref().filter(|c| c.enabled)?;
    Some(
        XenditAdapter::new(config, &settings.fallback_base_url(), client)
            .map(|a| Arc::new(a) as SharedAdapter),
    )
}

fn build_tripay(settings: &GatewaySettings, client: Client) -> Option<Result<SharedAdapter>> {
    let config = settings.payment_gateway.tripay.as_ref().filter(|c| c.enabled)?;
    Some(TripayAdapter::new(config, client).map(|a| Arc::new(a) as SharedAdapter))
}

/// Settings and the adapters built from them
struct RegistryState {
    settings: GatewaySettings,
    adapters: HashMap<&'static str, SharedAdapter>,
}

impl RegistryState {
    fn build(settings: GatewaySettings, client: &Client) -> Self {
        let mut adapters = HashMap::new();

        for (name, factory) in ADAPTER_FACTORIES {
            match factory(&settings, client.clone()) {
                None => {}
                Some(Ok(adapter)) => {
                    adapters.insert(name, adapter);
                }
                Some(Err(e)) => {
                    error!(
                        gateway = name,
                        error = %e,
                        "Gateway adapter failed to initialize, provider disabled"
                    );
                }
            }
        }

        if let Some(active) = settings.payment_gateway.active_gateway() {
            if !adapters.contains_key(active.as_str()) {
                warn!(gateway = %active, "Active gateway is not initialized");
            }
        }

        Self { settings, adapters }
    }

    /// Pick the adapter for an explicit gateway or the active one
    fn resolve(&self, gateway: Option<&str>) -> Result<(&'static str, SharedAdapter)> {
        let target = gateway
            .map(|name| name.trim().to_ascii_lowercase())
            .filter(|name| !name.is_empty())
            .or_else(|| self.settings.payment_gateway.active_gateway())
            .ok_or(AppError::NoActiveGateway)?;

        let (name, adapter) = self
            .adapters
            .get_key_value(target.as_str())
            .ok_or_else(|| AppError::unavailable(target.clone()))?;

        if !self.settings.payment_gateway.is_enabled(name) {
            return Err(AppError::unavailable(target));
        }

        Ok((*name, adapter.clone()))
    }
}

/// Composes gateway adapters from configuration and dispatches payment and webhook calls
///
/// The adapter map is replaced wholesale by [`reload`](Self::reload). Calls in
/// flight keep the adapter they resolved when they started.
pub struct GatewayRegistry {
    source: Arc<dyn ConfigSource>,
    client: Client,
    state: RwLock<Arc<RegistryState>>,
}

impl GatewayRegistry {
    /// Build the registry from the source's current settings.
    ///
    /// Fails only when the source itself cannot be read; a provider with bad
    /// credentials is logged and left uninitialized.
    pub fn new(source: Arc<dyn ConfigSource>, client: Client) -> Result<Self> {
        let settings = source.load()?;
        let state = RegistryState::build(settings, &client);

        info!(
            initialized = ?sorted_names(&state.adapters),
            active = ?state.settings.payment_gateway.active_gateway(),
            "Gateway registry initialized"
        );

        Ok(Self {
            source,
            client,
            state: RwLock::new(Arc::new(state)),
        })
    }

    /// Registry over fixed settings
    pub fn from_settings(settings: GatewaySettings, client: Client) -> Result<Self> {
        Self::new(Arc::new(InMemoryConfigSource::new(settings)), client)
    }

    /// Discard every adapter and rebuild from fresh settings.
    ///
    /// When the source cannot be read the current adapters stay in place and
    /// the error is returned.
    pub async fn reload(&self) -> Result<()> {
        let settings = self.source.load().map_err(|e| {
            error!(error = %e, "Gateway settings reload failed, keeping current adapters");
            e
        })?;

        let state = Arc::new(RegistryState::build(settings, &self.client));
        info!(
            initialized = ?sorted_names(&state.adapters),
            active = ?state.settings.payment_gateway.active_gateway(),
            "Gateway registry reloaded"
        );

        *self.state.write().await = state;
        Ok(())
    }

    async fn snapshot(&self) -> Arc<RegistryState> {
        self.state.read().await.clone()
    }

    /// Active gateway from the current settings
    pub async fn active_gateway(&self) -> Option<String> {
        self.snapshot().await.settings.payment_gateway.active_gateway()
    }

    /// Names of the gateways whose adapters constructed successfully
    pub async fn initialized_gateways(&self) -> Vec<&'static str> {
        sorted_names(&self.snapshot().await.adapters)
    }

    /// Create a payment on `gateway`, or on the active gateway when `None`
    pub async fn create_payment(
        &self,
        invoice: &Invoice,
        gateway: Option<&str>,
    ) -> Result<PaymentRequest> {
        let (name, adapter) = self.snapshot().await.resolve(gateway)?;

        info!(
            gateway = name,
            order_id = %invoice.order_id(),
            amount = invoice.amount,
            "Creating payment with gateway"
        );

        match adapter.create_payment(invoice).await {
            Ok(mut payment) => {
                payment.gateway = name.to_string();
                info!(
                    gateway = name,
                    order_id = %payment.order_id,
                    token = %payment.token,
                    "Payment created successfully"
                );
                Ok(payment)
            }
            Err(e) => {
                error!(gateway = name, error = %e, "Failed to create payment");
                Err(e)
            }
        }
    }

    /// Create a payment on a customer-chosen channel.
    ///
    /// Adapters without channel selection, a missing method and the `all`
    /// sentinel all go through plain payment creation. The result carries the
    /// requested method either way.
    pub async fn create_payment_with_method(
        &self,
        invoice: &Invoice,
        gateway: Option<&str>,
        method: Option<&str>,
    ) -> Result<PaymentRequest> {
        let (name, adapter) = self.snapshot().await.resolve(gateway)?;
        let method = method.map(str::trim).filter(|m| !m.is_empty());

        info!(
            gateway = name,
            order_id = %invoice.order_id(),
            method = ?method,
            "Creating payment with method"
        );

        let result = match method {
            Some(m) if adapter.supports_method_selection() && !m.eq_ignore_ascii_case(ALL_METHODS) => {
                adapter.create_payment_with_method(invoice, m).await
            }
            _ => adapter.create_payment(invoice).await,
        };

        match result {
            Ok(mut payment) => {
                payment.gateway = name.to_string();
                if let Some(m) = method {
                    payment.payment_method = Some(m.to_string());
                }
                Ok(payment)
            }
            Err(e) => {
                error!(gateway = name, method = ?method, error = %e, "Failed to create payment");
                Err(e)
            }
        }
    }

    /// Verify and normalize a provider webhook.
    ///
    /// The adapter verifies authenticity first; its errors, signature failures
    /// included, are returned as-is. Fields the adapter left empty are filled
    /// from the body: same-named field first, then the provider's own name for it.
    pub async fn handle_webhook(
        &self,
        payload: impl Into<WebhookPayload>,
        gateway: &str,
    ) -> Result<NormalizedWebhookResult> {
        let (body, headers) = payload.into().into_parts();
        let target = gateway.trim().to_ascii_lowercase();

        let (name, adapter) = {
            let state = self.snapshot().await;
            let (name, adapter) = state
                .adapters
                .get_key_value(target.as_str())
                .ok_or_else(|| AppError::unavailable(target.clone()))?;
            (*name, adapter.clone())
        };

        let mut result = adapter.handle_webhook(&body, &headers).await?;

        if let Ok(raw) = serde_json::from_slice::<Value>(&body) {
            fill_missing_fields(&mut result, &raw, name);
        }

        info!(
            gateway = name,
            order_id = ?result.order_id,
            status = ?result.status.as_ref().map(WebhookStatus::as_str),
            paid = result.status.as_ref().is_some_and(WebhookStatus::is_paid),
            "Webhook verified"
        );

        Ok(result)
    }

    /// `{enabled, active, initialized}` for every configured provider
    pub async fn gateway_status(&self) -> BTreeMap<String, GatewayStatus> {
        let state = self.snapshot().await;
        let gateways = &state.settings.payment_gateway;
        let active = gateways.active_gateway();

        gateways
            .configured_gateways()
            .into_iter()
            .map(|name| {
                (
                    name.to_string(),
                    GatewayStatus {
                        enabled: gateways.is_enabled(name),
                        active: active.as_deref() == Some(name),
                        initialized: state.adapters.contains_key(name),
                    },
                )
            })
            .collect()
    }

    /// Payment options across every initialized, enabled provider
    pub async fn available_payment_methods(&self) -> Vec<PaymentMethodInfo> {
        let state = self.snapshot().await;

        let adapters: Vec<SharedAdapter> = ADAPTER_FACTORIES
            .iter()
            .filter(|(name, _)| state.settings.payment_gateway.is_enabled(name))
            .filter_map(|(name, _)| state.adapters.get(*name).cloned())
            .collect();

        join_all(
            adapters
                .iter()
                .map(|adapter| adapter.available_payment_methods()),
        )
        .await
        .into_iter()
        .flatten()
        .collect()
    }
}

fn sorted_names(adapters: &HashMap<&'static str, SharedAdapter>) -> Vec<&'static str> {
    let mut names: Vec<&'static str> = adapters.keys().copied().collect();
    names.sort_unstable();
    names
}

/// Provider-specific body field names for a canonical field
fn alternate_fields(gateway: &str, field: &str) -> &'static [&'static str] {
    match (gateway, field) {
        (MIDTRANS, "status") => &["transaction_status"],
        (MIDTRANS, "amount") => &["gross_amount"],
        (MIDTRANS, "reference") => &["transaction_id"],
        (XENDIT, "order_id") => &["external_id"],
        (XENDIT, "amount") => &["paid_amount"],
        (XENDIT, "payment_type") => &["payment_method", "payment_channel"],
        (XENDIT, "reference") => &["id"],
        (TRIPAY, "order_id") => &["merchant_ref"],
        (TRIPAY, "amount") => &["total_amount", "amount_received"],
        (TRIPAY, "payment_type") => &["payment_method_code", "payment_method"],
        _ => &[],
    }
}

fn body_string(body: &Value, gateway: &str, field: &str) -> Option<String> {
    std::iter::once(field)
        .chain(alternate_fields(gateway, field).iter().copied())
        .find_map(|name| string_field(body, name))
}

/// Adapter value, then same-named body field, then the provider's alternate name
fn fill_missing_fields(result: &mut NormalizedWebhookResult, body: &Value, gateway: &str) {
    if result.order_id.is_none() {
        result.order_id = body_string(body, gateway, "order_id");
    }
    if result.status.is_none() {
        result.status = body_string(body, gateway, "status").map(WebhookStatus::from);
    }
    if result.amount.is_none() {
        result.amount = std::iter::once("amount")
            .chain(alternate_fields(gateway, "amount").iter().copied())
            .find_map(|name| decimal_field(body, name));
    }
    if result.payment_type.is_none() {
        result.payment_type = body_string(body, gateway, "payment_type");
    }
    if result.fraud_status.is_none() {
        result.fraud_status = body_string(body, gateway, "fraud_status");
    }
    if result.reference.is_none() {
        result.reference = body_string(body, gateway, "reference");
    }
}
