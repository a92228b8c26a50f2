//! Store settings: name, WhatsApp number and the payment methods offered at
//! checkout.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Payment method id whose description is left out of the order message.
pub const CASH_PAYMENT_METHOD_ID: &str = "efectivo";

/// A payment method offered at checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentMethod {
    pub id: String,
    pub name: String,
    /// Free text shown to the shopper, e.g. bank transfer details.
    pub description: String,
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
}

const fn enabled_by_default() -> bool {
    true
}

impl PaymentMethod {
    fn new(id: &str, name: &str, description: &str) -> Self {
        Self {
            id: id.to_owned(),
            name: name.to_owned(),
            description: description.to_owned(),
            enabled: true,
        }
    }

    /// Cash payments carry no transfer details in the order message.
    #[must_use]
    pub fn is_cash(&self) -> bool {
        self.id == CASH_PAYMENT_METHOD_ID
    }
}

/// The settings document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreSettings {
    pub store_name: String,
    pub whatsapp_number: String,
    pub payment_methods: Vec<PaymentMethod>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            store_name: "SIMEA".to_owned(),
            whatsapp_number: "5493794000000".to_owned(),
            payment_methods: vec![
                PaymentMethod::new(
                    "efectivo",
                    "Efectivo",
                    "Pago en efectivo al momento de la entrega",
                ),
                PaymentMethod::new(
                    "transferencia",
                    "Transferencia Bancaria",
                    "CBU: 0000003100012345678901 - Banco Nación",
                ),
                PaymentMethod::new("mercadopago", "Mercado Pago", "Alias: SIMEA.ROPA.MP"),
                PaymentMethod::new(
                    "uala",
                    "Ualá",
                    "CVU: 0000000000000000000000 - Alias: SIMEA.UALA",
                ),
            ],
            updated_at: None,
        }
    }
}

impl StoreSettings {
    /// Payment methods that may be offered at checkout.
    pub fn enabled_payment_methods(&self) -> impl Iterator<Item = &PaymentMethod> {
        self.payment_methods.iter().filter(|m| m.enabled)
    }

    /// Resolve the payment method for a checkout.
    ///
    /// With no explicit choice the first enabled method is used. Disabled or
    /// unknown methods resolve to `None`.
    #[must_use]
    pub fn select_payment_method(&self, id: Option<&str>) -> Option<&PaymentMethod> {
        match id {
            Some(id) => self.enabled_payment_methods().find(|m| m.id == id),
            None => self.enabled_payment_methods().next(),
        }
    }
}

/// Full-replace input for the settings document.
#[derive(Debug, Clone, Deserialize)]
pub struct StoreSettingsInput {
    pub store_name: String,
    pub whatsapp_number: String,
    pub payment_methods: Vec<PaymentMethod>,
}

impl StoreSettingsInput {
    /// Stamp the input into a settings document.
    #[must_use]
    pub fn into_settings(self, updated_at: DateTime<Utc>) -> StoreSettings {
        StoreSettings {
            store_name: self.store_name,
            whatsapp_number: self.whatsapp_number,
            payment_methods: self.payment_methods,
            updated_at: Some(updated_at),
        }
    }
}
