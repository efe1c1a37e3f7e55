use serde::{Deserialize, Serialize};

use crate::core::{AppError, Result};

/// Prefix shared by every order id sent to a provider
pub const ORDER_ID_PREFIX: &str = "INV-";

/// Invoice supplied by the billing collaborator
///
/// Adapters only ever borrow it; nothing here is mutated during payment creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invoice {
    /// Unique invoice number
    pub invoice_number: String,

    /// Amount in the smallest currency unit (whole rupiah)
    pub amount: u64,

    pub customer_name: String,

    #[serde(default)]
    pub customer_email: Option<String>,

    #[serde(default)]
    pub customer_phone: Option<String>,

    #[serde(default)]
    pub package_id: Option<String>,

    #[serde(default)]
    pub package_name: Option<String>,
}

impl Invoice {
    pub fn new(
        invoice_number: impl Into<String>,
        amount: u64,
        customer_name: impl Into<String>,
    ) -> Self {
        Self {
            invoice_number: invoice_number.into(),
            amount,
            customer_name: customer_name.into(),
            customer_email: None,
            customer_phone: None,
            package_id: None,
            package_name: None,
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.customer_email = Some(email.into());
        self
    }

    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.customer_phone = Some(phone.into());
        self
    }

    pub fn with_package(mut self, id: impl Into<String>, name: impl Into<String>) -> Self {
        self.package_id = Some(id.into());
        self.package_name = Some(name.into());
        self
    }

    /// Correlation id sent to every provider: `INV-{invoice_number}`
    pub fn order_id(&self) -> String {
        format!("{}{}", ORDER_ID_PREFIX, self.invoice_number)
    }

    /// Line item label shown on the provider's checkout page
    pub fn item_name(&self) -> String {
        self.package_name
            .clone()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| format!("Invoice {}", self.invoice_number))
    }

    /// Check the fields every provider needs
    pub fn validate(&self) -> Result<()> {
        if self.invoice_number.trim().is_empty() {
            return Err(AppError::validation("invoice_number must not be empty"));
        }

        if self.amount == 0 {
            return Err(AppError::validation(format!(
                "invoice {} amount must be positive",
                self.invoice_number
            )));
        }

        if self.customer_name.trim().is_empty() {
            return Err(AppError::validation(format!(
                "invoice {} customer_name must not be empty",
                self.invoice_number
            )));
        }

        Ok(())
    }
}
