//! ga4tag adds Google Analytics 4 tracking to the pages of a site.
//!
//! # Features
//!
//! - Admin settings page for the Measurement ID
//!     - validated on submit, invalid IDs are never stored
//!     - anti-forgery token bound to the admin session
//! - Per-role opt-out of tracking for logged-in visitors
//! - Snippet placed at the end of every public HTML page
//! - Lifecycle hooks for menu building, deactivation and uninstall

#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![forbid(unsafe_code)]

// Re-export shared types and adapter traits from ga4tag-types
pub use ga4tag_types::error;
pub use ga4tag_types::session_adapter;
pub use ga4tag_types::settings_adapter;
pub use ga4tag_types::types;
pub use ga4tag_types::utils;

// Feature crate re-exports
pub use ga4tag_admin as admin;
pub use ga4tag_core as core;
pub use ga4tag_core::hooks;
pub use ga4tag_core::roles;
pub use ga4tag_core::settings;
pub use ga4tag_core::tracking;

// Local modules
pub mod app;
pub mod plugin;
pub mod prelude;
pub mod render;
pub mod routes;
pub mod webserver;

pub use crate::app::{App, AppBuilder};

// vim: ts=4
