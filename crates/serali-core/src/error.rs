//! # Error Types
//!
//! Domain-specific error types for serali-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  serali-core errors (this file)                                        │
//! │  ├── CoreError        - Rejected edits (logo size, unknown field)      │
//! │  └── ValidationError  - Pre-save failures that block persistence       │
//! │                                                                         │
//! │  serali-db errors (separate crate)                                     │
//! │  └── DbError          - Store failures (the PersistError cause)        │
//! │                                                                         │
//! │  serali-admin errors (in app)                                          │
//! │  ├── EditorError      - Everything the editor session can refuse       │
//! │  └── ApiError         - What the settings page sees (serialized)       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (zone id, sizes, ...)
//! 3. Every message is fit to show to the operator as-is

use thiserror::Error;

use crate::money::Money;
use crate::types::ZoneId;

// =============================================================================
// Core Error
// =============================================================================

/// Errors raised while applying an edit to the form.
///
/// A failed edit never changes the form state.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Uploaded logo exceeds the inline size limit.
    ///
    /// ## User Workflow
    /// ```text
    /// Choose file (620 KB)
    ///      │
    ///      ▼
    /// set_logo_from_file ── size > 500 KB ──► LogoTooLarge
    ///      │                                     │
    ///      ▼                                     ▼
    /// (logo unchanged)            UI shows: "The image is too large..."
    /// ```
    #[error("The image is too large ({size_bytes} bytes). Please use an image under {}KB.", .max_bytes / 1024)]
    LogoTooLarge { size_bytes: u64, max_bytes: u64 },

    /// A field or toggle name sent by the settings page is not known.
    #[error("Unknown settings field: {0}")]
    UnknownField(String),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Pre-save validation failures.
///
/// Only the first failure is reported; the save is aborted.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// Home delivery is on but every zone is inactive (or there are none).
    #[error("Home delivery is enabled, so at least one active delivery zone is required")]
    NoActiveZone,

    /// An active zone has an empty (or whitespace-only) name.
    ///
    /// `position` is the 1-based position of the zone in the list.
    #[error("Delivery zone #{position} needs a name")]
    ZoneNameRequired { zone_id: ZoneId, position: usize },

    /// An active zone has a price below zero.
    #[error("Delivery zone '{name}' cannot have a negative price ({price})")]
    ZoneNegativePrice {
        zone_id: ZoneId,
        name: String,
        price: Money,
    },
}

impl ValidationError {
    /// Returns the zone the failure refers to, if any.
    pub fn zone_id(&self) -> Option<&ZoneId> {
        match self {
            ValidationError::NoActiveZone => None,
            ValidationError::ZoneNameRequired { zone_id, .. }
            | ValidationError::ZoneNegativePrice { zone_id, .. } => Some(zone_id),
        }
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
