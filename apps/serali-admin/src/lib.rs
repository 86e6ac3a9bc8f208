//! # Serali Admin
//!
//! Brand settings editor for the Serali ordering storefront.
//!
//! ## Module Organization
//! ```text
//! serali_admin/
//! ├── lib.rs          ◄─── You are here (tracing setup)
//! ├── config.rs       ◄─── admin.toml + environment overrides
//! ├── error.rs        ◄─── EditorError, ConfigError, ApiError
//! ├── state/
//! │   └── session.rs  ◄─── EditorSession: form, notice, save flag
//! └── commands/
//!     └── settings.rs ◄─── What the settings page calls
//! ```
//!
//! ## Wiring
//! ```text
//! AdminConfig ──► DbConfig ──► Database ──► BrandConfigRepository
//!      │                                          │
//!      └──► EditorSettings ──► EditorSession ◄────┘ (Arc<dyn ConfigStore>)
//!                                   │
//!                                   ▼
//!                           commands::settings
//! ```

pub mod commands;
pub mod config;
pub mod error;
pub mod state;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, reload, EnvFilter, Registry};

pub use config::AdminConfig;
pub use error::{ApiError, EditorError, ErrorCode};
pub use state::{EditorSession, EditorSettings};

/// Initializes the tracing subscriber with a filter that can be swapped later.
///
/// Called before the config file is read, so config loading is logged under
/// `filter`; [`LogFilterHandle::apply`] then switches to the configured one.
/// `RUST_LOG` wins over either filter when set, e.g. `RUST_LOG=serali=trace`.
pub fn init_tracing(filter: &str) -> LogFilterHandle {
    let (filter_layer, handle) = reload::Layer::new(build_filter(filter));

    // A subscriber may already be installed (tests, embedding apps)
    let installed = tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt::layer())
        .try_init()
        .is_ok();

    LogFilterHandle { handle, installed }
}

fn build_filter(filter: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter))
}

/// Swaps the filter of the subscriber installed by [`init_tracing`].
#[derive(Debug)]
pub struct LogFilterHandle {
    handle: reload::Handle<EnvFilter, Registry>,
    installed: bool,
}

impl LogFilterHandle {
    /// False when another subscriber was already installed.
    pub fn is_installed(&self) -> bool {
        self.installed
    }

    /// Replaces the active filter. Returns false if this handle's subscriber
    /// is not the one receiving events.
    pub fn apply(&self, filter: &str) -> bool {
        self.installed && self.handle.reload(build_filter(filter)).is_ok()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_LOG_FILTER;

    #[test]
    fn test_only_first_tracing_init_installs() {
        let first = init_tracing(DEFAULT_LOG_FILTER);
        let second = init_tracing("debug");

        assert!(!second.is_installed());
        assert!(!second.apply("warn"));
        if first.is_installed() {
            assert!(first.apply("info,serali=trace"));
        }
    }
}
