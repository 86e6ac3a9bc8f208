//! # serali-core: Pure Settings Logic for Serali
//!
//! This crate holds the brand settings editor's logic as pure functions with
//! zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Serali Settings Architecture                        │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 Settings page (web admin)                       │   │
//! │  │   Identity ──► Branding ──► Delivery ──► Payments ──► Fields    │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ commands                               │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 serali-admin (EditorSession)                    │   │
//! │  │      load, set_field, add_zone, submit, notices                 │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ serali-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   form    │  │   merge   │  │ validation│  │ document  │  │   │
//! │  │   │ FormState │  │  partial  │  │ validate  │  │BrandConfig│  │   │
//! │  │   │transitions│  │ ⊕ default │  │  review   │  │           │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO TIMERS • PURE FUNCTIONS            │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 serali-db (Configuration store)                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Zones, toggle groups, bank details, `OptionalField`
//! - [`money`] - Integer-cent prices
//! - [`form`] - `FormState` and its transitions
//! - [`merge`] - Stored document over defaults
//! - [`document`] - The written `BrandConfig` document
//! - [`validation`] - Blocking validation and advisory review
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use serali_core::form::{FormState, TextField, Toggle};
//! use serali_core::types::ZonePatch;
//! use serali_core::validation::validate;
//! use serali_core::Money;
//!
//! let (form, zone) = FormState::default()
//!     .set_field(TextField::BusinessName, "Acme")
//!     .set_toggle(Toggle::DeliveryHome, true)
//!     .add_zone();
//! let form = form.update_zone(
//!     &zone,
//!     &ZonePatch::default().with_name("North").with_price(Money::from_cents(350)),
//! );
//!
//! assert!(validate(&form).is_ok());
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod document;
pub mod error;
pub mod form;
pub mod merge;
pub mod money;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use document::{BrandConfig, DocumentOptions};
pub use error::{CoreError, CoreResult, ValidationError};
pub use form::{FormState, TextField, Toggle};
pub use merge::{DecodedDocument, PartialBrandConfig};
pub use money::Money;
pub use types::*;
pub use validation::{review, validate, SettingsWarning};

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Largest logo file accepted for inline storage (500 KiB).
///
/// The logo lives inside the settings document, so this bounds the
/// document size too.
pub const MAX_LOGO_BYTES: u64 = 500 * 1024;

pub const DEFAULT_BUSINESS_NAME: &str = "Serali Food";

/// Country code (57) followed by the number.
pub const DEFAULT_WHATSAPP_NUMBER: &str = "573117411194";

pub const DEFAULT_PRIMARY_COLOR: &str = "#F4C542";
pub const DEFAULT_SECONDARY_COLOR: &str = "#E67E22";
pub const DEFAULT_ACCENT_COLOR: &str = "#C0392B";
