//! # Remote-over-Defaults Merge
//!
//! Turns a stored document, which may be missing any key, into a complete
//! [`FormState`].
//!
//! ## Coalescing Rules
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  stored document (partial)          default table                       │
//! │  ─────────────────────────          ─────────────                       │
//! │  businessName: "Acme"        ┐                                          │
//! │  paymentMethods: {           │      paymentMethods: {                   │
//! │     cash: false              ├──►      cash: true,     ──► cash: false  │
//! │  }                           │         transfer: true, ──► transfer:true│
//! │                              │         card: true      ──► card: true   │
//! │  (deliveryZones missing)     ┘      deliveryZones: []  ──► []           │
//! │                                                                         │
//! │  Every key, at every nesting level, falls back on its own.             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Reading a Stored Document
//! The stored document is written by more than one client over time, so a key
//! may hold the wrong JSON type (a zone id from `Date.now()`, a phone number
//! stored as a number). Reading coalesces key by key:
//!
//! ```text
//! key missing or null ──────────────► None (default applies)
//! key of the expected type ─────────► Some(value)
//! numeric text key (ids, phones) ───► Some(number as text)
//! anything else ────────────────────► None, path recorded in `skipped`
//! ```
//!
//! Only a document that is not a JSON object at all is rejected.
//!
//! Each partial struct lists its keys explicitly, so a key added to the
//! form without a merge rule is a compile error rather than a silent gap.

use serde::de::{self, DeserializeOwned, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::form::FormState;
use crate::money::Money;
use crate::types::{
    BankInfo, CustomerFields, DeliveryTypes, DeliveryZone, OptionalField, PaymentMethods, ZoneId,
};

// =============================================================================
// Partial Document
// =============================================================================

/// A stored settings document as read, with every key optional.
///
/// Unknown keys (including the legacy `deliveryFee`) are ignored. `null`
/// counts as missing. Deserializing goes through
/// [`PartialBrandConfig::from_value`], so a mistyped key never loses the rest
/// of the document.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PartialBrandConfig {
    pub business_name: Option<String>,
    pub whatsapp_number: Option<String>,
    pub primary_color: Option<String>,
    pub secondary_color: Option<String>,
    pub accent_color: Option<String>,
    pub logo_url: Option<String>,
    pub delivery_types: Option<PartialDeliveryTypes>,
    pub delivery_zones: Option<Vec<PartialDeliveryZone>>,
    pub payment_methods: Option<PartialPaymentMethods>,
    pub bank_info: Option<PartialBankInfo>,
    pub customer_fields: Option<PartialCustomerFields>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PartialDeliveryTypes {
    pub pickup: Option<bool>,
    pub delivery: Option<bool>,
    pub table: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PartialPaymentMethods {
    pub cash: Option<bool>,
    pub transfer: Option<bool>,
    pub card: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PartialBankInfo {
    pub bank_name: Option<String>,
    pub account_number: Option<String>,
    pub account_holder: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PartialCustomerFields {
    pub email_enabled: Option<bool>,
    pub email_required: Option<bool>,
    pub birthday_enabled: Option<bool>,
    pub birthday_required: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PartialDeliveryZone {
    pub id: Option<ZoneId>,
    pub name: Option<String>,
    pub price: Option<Money>,
    pub active: Option<bool>,
    pub order: Option<u32>,
}

// =============================================================================
// Lenient Reading
// =============================================================================

/// A stored document and the keys that had to be ignored while reading it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DecodedDocument {
    pub document: PartialBrandConfig,
    /// Paths like `whatsappNumber` or `deliveryZones[1].order`.
    pub skipped: Vec<String>,
}

/// Reads keys out of JSON objects, recording the ones with the wrong type.
#[derive(Default)]
struct KeyReader {
    skipped: Vec<String>,
}

impl KeyReader {
    fn skip(&mut self, path: &str, key: &str) {
        if path.is_empty() {
            self.skipped.push(key.to_string());
        } else {
            self.skipped.push(format!("{path}.{key}"));
        }
    }

    fn value<T: DeserializeOwned>(&mut self, object: &Map<String, Value>, path: &str, key: &str) -> Option<T> {
        match object.get(key) {
            None | Some(Value::Null) => None,
            Some(value) => match T::deserialize(value) {
                Ok(parsed) => Some(parsed),
                Err(_) => {
                    self.skip(path, key);
                    None
                }
            },
        }
    }

    /// Text that older clients may have stored as a number.
    fn text(&mut self, object: &Map<String, Value>, path: &str, key: &str) -> Option<String> {
        match object.get(key) {
            None | Some(Value::Null) => None,
            Some(Value::String(text)) => Some(text.clone()),
            Some(Value::Number(number)) => Some(number.to_string()),
            Some(_) => {
                self.skip(path, key);
                None
            }
        }
    }

    fn object<'v>(
        &mut self,
        object: &'v Map<String, Value>,
        path: &str,
        key: &str,
    ) -> Option<&'v Map<String, Value>> {
        match object.get(key) {
            None | Some(Value::Null) => None,
            Some(Value::Object(inner)) => Some(inner),
            Some(_) => {
                self.skip(path, key);
                None
            }
        }
    }
}

impl PartialBrandConfig {
    /// Reads a stored document key by key.
    ///
    /// Returns `None` only when `value` is not a JSON object.
    pub fn from_value(value: &Value) -> Option<DecodedDocument> {
        let root = value.as_object()?;
        let mut reader = KeyReader::default();

        let delivery_types = reader.object(root, "", "deliveryTypes").map(|types| PartialDeliveryTypes {
            pickup: reader.value(types, "deliveryTypes", "pickup"),
            delivery: reader.value(types, "deliveryTypes", "delivery"),
            table: reader.value(types, "deliveryTypes", "table"),
        });
        let payment_methods = reader.object(root, "", "paymentMethods").map(|methods| PartialPaymentMethods {
            cash: reader.value(methods, "paymentMethods", "cash"),
            transfer: reader.value(methods, "paymentMethods", "transfer"),
            card: reader.value(methods, "paymentMethods", "card"),
        });
        let bank_info = reader.object(root, "", "bankInfo").map(|bank| PartialBankInfo {
            bank_name: reader.value(bank, "bankInfo", "bankName"),
            account_number: reader.text(bank, "bankInfo", "accountNumber"),
            account_holder: reader.value(bank, "bankInfo", "accountHolder"),
        });
        let customer_fields = reader.object(root, "", "customerFields").map(|fields| PartialCustomerFields {
            email_enabled: reader.value(fields, "customerFields", "emailEnabled"),
            email_required: reader.value(fields, "customerFields", "emailRequired"),
            birthday_enabled: reader.value(fields, "customerFields", "birthdayEnabled"),
            birthday_required: reader.value(fields, "customerFields", "birthdayRequired"),
        });
        let delivery_zones = read_zones(&mut reader, root);

        let document = PartialBrandConfig {
            business_name: reader.value(root, "", "businessName"),
            whatsapp_number: reader.text(root, "", "whatsappNumber"),
            primary_color: reader.value(root, "", "primaryColor"),
            secondary_color: reader.value(root, "", "secondaryColor"),
            accent_color: reader.value(root, "", "accentColor"),
            logo_url: reader.value(root, "", "logoUrl"),
            delivery_types,
            delivery_zones,
            payment_methods,
            bank_info,
            customer_fields,
        };

        Some(DecodedDocument {
            document,
            skipped: reader.skipped,
        })
    }
}

/// Entries that are not objects are dropped; the others keep whatever keys
/// read cleanly.
fn read_zones(reader: &mut KeyReader, root: &Map<String, Value>) -> Option<Vec<PartialDeliveryZone>> {
    let entries = match root.get("deliveryZones") {
        None | Some(Value::Null) => return None,
        Some(Value::Array(entries)) => entries,
        Some(_) => {
            reader.skip("", "deliveryZones");
            return None;
        }
    };

    let zones = entries
        .iter()
        .enumerate()
        .filter_map(|(index, entry)| {
            let path = format!("deliveryZones[{index}]");
            let Some(zone) = entry.as_object() else {
                reader.skipped.push(path);
                return None;
            };
            Some(PartialDeliveryZone {
                id: reader.text(zone, &path, "id").map(ZoneId::from),
                name: reader.value(zone, &path, "name"),
                price: reader.value(zone, &path, "price"),
                active: reader.value(zone, &path, "active"),
                order: reader.value(zone, &path, "order"),
            })
        })
        .collect();
    Some(zones)
}

impl<'de> Deserialize<'de> for PartialBrandConfig {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        PartialBrandConfig::from_value(&value)
            .map(|decoded| decoded.document)
            .ok_or_else(|| de::Error::custom("settings document must be a JSON object"))
    }
}

// =============================================================================
// Merge
// =============================================================================

impl FormState {
    /// Builds the form from the stored document, or the defaults if there is
    /// none.
    ///
    /// The logo preview starts out equal to the resolved logo.
    pub fn merged(remote: Option<PartialBrandConfig>) -> FormState {
        let defaults = FormState::default();
        let Some(remote) = remote else {
            return defaults;
        };

        let logo_url = remote.logo_url.unwrap_or(defaults.logo_url);

        FormState {
            business_name: remote.business_name.unwrap_or(defaults.business_name),
            whatsapp_number: remote.whatsapp_number.unwrap_or(defaults.whatsapp_number),
            primary_color: remote.primary_color.unwrap_or(defaults.primary_color),
            secondary_color: remote.secondary_color.unwrap_or(defaults.secondary_color),
            accent_color: remote.accent_color.unwrap_or(defaults.accent_color),
            logo_preview: logo_url.clone(),
            logo_url,
            logo_upload: None,
            delivery_types: merge_delivery_types(remote.delivery_types, defaults.delivery_types),
            delivery_zones: remote
                .delivery_zones
                .map(merge_zones)
                .unwrap_or(defaults.delivery_zones),
            payment_methods: merge_payment_methods(remote.payment_methods, defaults.payment_methods),
            bank_info: merge_bank_info(remote.bank_info, defaults.bank_info),
            customer_fields: merge_customer_fields(remote.customer_fields, defaults.customer_fields),
        }
    }
}

fn merge_delivery_types(remote: Option<PartialDeliveryTypes>, defaults: DeliveryTypes) -> DeliveryTypes {
    let remote = remote.unwrap_or_default();
    DeliveryTypes {
        pickup: remote.pickup.unwrap_or(defaults.pickup),
        home: remote.delivery.unwrap_or(defaults.home),
        table: remote.table.unwrap_or(defaults.table),
    }
}

fn merge_payment_methods(
    remote: Option<PartialPaymentMethods>,
    defaults: PaymentMethods,
) -> PaymentMethods {
    let remote = remote.unwrap_or_default();
    PaymentMethods {
        cash: remote.cash.unwrap_or(defaults.cash),
        transfer: remote.transfer.unwrap_or(defaults.transfer),
        card: remote.card.unwrap_or(defaults.card),
    }
}

fn merge_bank_info(remote: Option<PartialBankInfo>, defaults: BankInfo) -> BankInfo {
    let remote = remote.unwrap_or_default();
    BankInfo {
        bank_name: remote.bank_name.unwrap_or(defaults.bank_name),
        account_number: remote.account_number.unwrap_or(defaults.account_number),
        account_holder: remote.account_holder.unwrap_or(defaults.account_holder),
    }
}

/// `required` without `enabled` in storage is normalized away here.
fn merge_customer_fields(
    remote: Option<PartialCustomerFields>,
    defaults: CustomerFields,
) -> CustomerFields {
    let remote = remote.unwrap_or_default();
    CustomerFields {
        email: OptionalField::new(
            remote.email_enabled.unwrap_or(defaults.email.enabled()),
            remote.email_required.unwrap_or(defaults.email.required()),
        ),
        birthday: OptionalField::new(
            remote.birthday_enabled.unwrap_or(defaults.birthday.enabled()),
            remote.birthday_required.unwrap_or(defaults.birthday.required()),
        ),
    }
}

/// Zones without an id get a fresh one; a missing `order` becomes the
/// zone's list index.
fn merge_zones(remote: Vec<PartialDeliveryZone>) -> Vec<DeliveryZone> {
    remote
        .into_iter()
        .enumerate()
        .map(|(index, zone)| {
            let blank = DeliveryZone::blank(index as u32);
            DeliveryZone {
                id: zone.id.unwrap_or(blank.id),
                name: zone.name.unwrap_or(blank.name),
                price: zone.price.unwrap_or(blank.price),
                active: zone.active.unwrap_or(blank.active),
                order: zone.order.unwrap_or(blank.order),
            }
        })
        .collect()
}

// =============================================================================
// Unit Tests
// =============================================================================
