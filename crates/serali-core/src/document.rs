//! # Settings Document
//!
//! The `BrandConfig` document as written to the configuration store.
//!
//! ```text
//! FormState ──to_document()──► BrandConfig ──serde_json──► store
//!     ▲                                                      │
//!     └──────── FormState::merged() ◄── PartialBrandConfig ◄─┘
//! ```
//!
//! Writes are always complete documents; reads are partial (see
//! [`crate::merge`]).

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::form::FormState;
use crate::money::Money;
use crate::types::{BankInfo, DeliveryTypes, DeliveryZone, PaymentMethods};

/// Complete settings document, keyed the way older readers expect.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct BrandConfig {
    pub business_name: String,
    pub whatsapp_number: String,
    pub primary_color: String,
    pub secondary_color: String,
    pub accent_color: String,
    pub logo_url: String,
    pub payment_methods: PaymentMethods,
    pub bank_info: BankInfo,
    pub delivery_types: DeliveryTypes,
    pub delivery_zones: Vec<DeliveryZone>,
    pub customer_fields: CustomerFieldsDocument,
    /// Single delivery fee from before per-zone pricing. Only written when
    /// [`DocumentOptions::write_legacy_delivery_fee`] is set, and always 0.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(type = "number | null")]
    pub delivery_fee: Option<Money>,
}

/// Flat customer-field flags as stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CustomerFieldsDocument {
    pub email_enabled: bool,
    pub email_required: bool,
    pub birthday_enabled: bool,
    pub birthday_required: bool,
}

/// Knobs for [`FormState::to_document`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DocumentOptions {
    /// Also write `deliveryFee: 0` for readers that predate zone pricing.
    pub write_legacy_delivery_fee: bool,
}

impl FormState {
    /// Maps the form onto the stored document shape.
    ///
    /// Session-only state (preview, uploaded file metadata) is not written.
    pub fn to_document(&self, options: DocumentOptions) -> BrandConfig {
        let fields = &self.customer_fields;
        BrandConfig {
            business_name: self.business_name.clone(),
            whatsapp_number: self.whatsapp_number.clone(),
            primary_color: self.primary_color.clone(),
            secondary_color: self.secondary_color.clone(),
            accent_color: self.accent_color.clone(),
            logo_url: self.logo_url.clone(),
            payment_methods: self.payment_methods,
            bank_info: self.bank_info.clone(),
            delivery_types: self.delivery_types,
            delivery_zones: self.delivery_zones.clone(),
            customer_fields: CustomerFieldsDocument {
                email_enabled: fields.email.enabled(),
                email_required: fields.email.required(),
                birthday_enabled: fields.birthday.enabled(),
                birthday_required: fields.birthday.required(),
            },
            delivery_fee: options
                .write_legacy_delivery_fee
                .then(Money::zero),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
