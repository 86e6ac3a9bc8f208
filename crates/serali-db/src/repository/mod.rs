//! # Repository Module
//!
//! SQLite repositories for the settings store.
//!
//! ## Available Repositories
//!
//! - [`brand_config::BrandConfigRepository`] - The singleton settings document

pub mod brand_config;
