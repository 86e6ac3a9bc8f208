//! # Domain Types
//!
//! Building blocks of the brand settings form.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │  DeliveryZone   │   │ DeliveryTypes   │   │ PaymentMethods  │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (ZoneId)    │   │  pickup         │   │  cash           │       │
//! │  │  name           │   │  home           │   │  transfer       │       │
//! │  │  price (Money)  │   │  table          │   │  card           │       │
//! │  │  active, order  │   └─────────────────┘   └─────────────────┘       │
//! │  └─────────────────┘                                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    BankInfo     │   │ CustomerFields  │   │  OptionalField  │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  bank_name      │   │  email ─────────┼──►│  enabled        │       │
//! │  │  account_number │   │  birthday ──────┼──►│  required       │       │
//! │  │  account_holder │   └─────────────────┘   │  (⇒ enabled)    │       │
//! │  └─────────────────┘                          └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;
use uuid::Uuid;

use crate::money::Money;

// =============================================================================
// Zone Identity
// =============================================================================

/// Stable identifier of a delivery zone.
///
/// Generated once when the zone is created (UUID v4) and never reused.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ZoneId(String);

impl ZoneId {
    /// Generates a fresh identifier.
    pub fn generate() -> Self {
        ZoneId(Uuid::new_v4().to_string())
    }

    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ZoneId {
    fn from(id: &str) -> Self {
        ZoneId(id.to_string())
    }
}

impl From<String> for ZoneId {
    fn from(id: String) -> Self {
        ZoneId(id)
    }
}

impl fmt::Display for ZoneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// =============================================================================
// Delivery Zone
// =============================================================================

/// A priced home-delivery area.
///
/// Inactive zones stay in the list (and in storage) but are ignored when
/// checking that home delivery has somewhere to deliver to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryZone {
    pub id: ZoneId,
    pub name: String,
    #[ts(type = "number")]
    pub price: Money,
    pub active: bool,
    /// Display position. Assigned at creation, never renumbered.
    pub order: u32,
}

impl DeliveryZone {
    /// Creates a blank, active zone at the given display position.
    pub fn blank(order: u32) -> Self {
        DeliveryZone {
            id: ZoneId::generate(),
            name: String::new(),
            price: Money::zero(),
            active: true,
            order,
        }
    }

    /// Applies the fields present in `patch`, leaving the rest untouched.
    pub fn apply(&mut self, patch: &ZonePatch) {
        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        if let Some(price) = patch.price {
            self.price = price;
        }
        if let Some(active) = patch.active {
            self.active = active;
        }
        if let Some(order) = patch.order {
            self.order = order;
        }
    }
}

/// Partial update for a zone. `None` means "leave as is".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ZonePatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    #[ts(type = "number | null")]
    pub price: Option<Money>,
    #[serde(default)]
    pub active: Option<bool>,
    #[serde(default)]
    pub order: Option<u32>,
}

impl ZonePatch {
    /// Sets the name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the price.
    pub fn with_price(mut self, price: Money) -> Self {
        self.price = Some(price);
        self
    }

    /// Sets the active flag.
    pub fn with_active(mut self, active: bool) -> Self {
        self.active = Some(active);
        self
    }

    /// Returns true if the patch changes nothing.
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.price.is_none() && self.active.is_none() && self.order.is_none()
    }
}

// =============================================================================
// Optional Customer Field
// =============================================================================

/// An optional checkout field with an "enabled" and a "required" switch.
///
/// ## Invariant
/// `required` implies `enabled`. The fields are private so the invariant can
/// only be changed through the setters below.
///
/// ```text
/// enabled │ required
/// ────────┼─────────
///  false  │  false     ◄── switching enabled off lands here, always
///  true   │  false
///  true   │  true
///  false  │  true      ✗ unreachable
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
pub struct OptionalField {
    enabled: bool,
    required: bool,
}

impl OptionalField {
    /// Creates a field, dropping `required` if the field is not enabled.
    pub const fn new(enabled: bool, required: bool) -> Self {
        OptionalField {
            enabled,
            required: enabled && required,
        }
    }

    /// Whether the field is shown at checkout.
    #[inline]
    pub const fn enabled(&self) -> bool {
        self.enabled
    }

    /// Whether the customer must fill the field in.
    #[inline]
    pub const fn required(&self) -> bool {
        self.required
    }

    /// Switches the field on or off. Switching off also clears `required`.
    #[must_use]
    pub const fn set_enabled(self, enabled: bool) -> Self {
        OptionalField::new(enabled, self.required)
    }

    /// Sets `required`. Ignored while the field is disabled.
    #[must_use]
    pub const fn set_required(self, required: bool) -> Self {
        OptionalField::new(self.enabled, required)
    }

    /// The "required" switch is only offered while the field is enabled.
    #[inline]
    pub const fn required_toggle_visible(&self) -> bool {
        self.enabled
    }
}

// =============================================================================
// Toggle Groups
// =============================================================================

/// How customers can receive their order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DeliveryTypes {
    pub pickup: bool,
    /// Home delivery. Named `delivery` in the stored document.
    #[serde(rename = "delivery")]
    pub home: bool,
    pub table: bool,
}

/// Accepted payment methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PaymentMethods {
    pub cash: bool,
    pub transfer: bool,
    pub card: bool,
}

/// Bank details shown to customers paying by transfer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct BankInfo {
    pub bank_name: String,
    pub account_number: String,
    pub account_holder: String,
}

impl BankInfo {
    /// True when every bank field has non-blank content.
    pub fn is_complete(&self) -> bool {
        [&self.bank_name, &self.account_number, &self.account_holder]
            .iter()
            .all(|value| !value.trim().is_empty())
    }
}

/// Extra customer information requested at checkout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
pub struct CustomerFields {
    pub email: OptionalField,
    pub birthday: OptionalField,
}

// =============================================================================
// Logo Upload
// =============================================================================

/// Metadata of a logo file picked in this session.
///
/// Kept only in memory; while present, the URL input is disabled and blank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct LogoUpload {
    pub mime_type: String,
    pub size_bytes: u64,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_optional_field_required_implies_enabled() {
        let field = OptionalField::new(false, true);
        assert!(!field.enabled());
        assert!(!field.required());

        let field = OptionalField::new(true, false).set_required(true);
        assert!(field.required());

        let field = field.set_enabled(false);
        assert!(!field.enabled());
        assert!(!field.required());
    }

    #[test]
    fn test_optional_field_required_ignored_while_disabled() {
        let field = OptionalField::default().set_required(true);
        assert!(!field.required());
        assert!(!field.required_toggle_visible());
    }

    #[test]
    fn test_optional_field_reenable_does_not_restore_required() {
        let field = OptionalField::new(true, true)
            .set_enabled(false)
            .set_enabled(true);
        assert!(field.enabled());
        assert!(!field.required());
    }

    #[test]
    fn test_zone_apply_only_touches_given_fields() {
        let mut zone = DeliveryZone::blank(0);
        zone.name = "Centro".to_string();
        let id = zone.id.clone();

        zone.apply(&ZonePatch::default().with_price(Money::from_cents(500)));

        assert_eq!(zone.id, id);
        assert_eq!(zone.name, "Centro");
        assert_eq!(zone.price.cents(), 500);
        assert!(zone.active);
        assert_eq!(zone.order, 0);
    }

    #[test]
    fn test_zone_ids_are_unique() {
        assert_ne!(ZoneId::generate(), ZoneId::generate());
    }

    #[test]
    fn test_zone_patch_deserializes_partial_json() {
        let patch: ZonePatch = serde_json::from_str(r#"{"name":"North","price":3.5}"#).unwrap();
        assert_eq!(patch.name.as_deref(), Some("North"));
        assert_eq!(patch.price, Some(Money::from_cents(350)));
        assert!(patch.active.is_none());
        assert!(!patch.is_empty());
        assert!(ZonePatch::default().is_empty());
    }

    #[test]
    fn test_bank_info_completeness() {
        let mut bank = BankInfo::default();
        assert!(!bank.is_complete());

        bank.bank_name = "Bancolombia".to_string();
        bank.account_number = "0123456789".to_string();
        bank.account_holder = "  ".to_string();
        assert!(!bank.is_complete());

        bank.account_holder = "Serali SAS".to_string();
        assert!(bank.is_complete());
    }

    #[test]
    fn test_delivery_types_document_key() {
        let types = DeliveryTypes {
            pickup: true,
            home: false,
            table: true,
        };
        let json = serde_json::to_value(types).unwrap();
        assert_eq!(json["delivery"], false);
        assert!(json.get("home").is_none());
    }
}
