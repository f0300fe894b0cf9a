//! Admin handlers for ga4tag
//!
//! The settings page, the plugin listing and the permission middleware that
//! guards them.

#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![forbid(unsafe_code)]

pub mod perm;
pub mod plugins;
pub mod settings_page;
pub mod templates;

mod prelude;

pub use templates::AdminTemplates;

// vim: ts=4
