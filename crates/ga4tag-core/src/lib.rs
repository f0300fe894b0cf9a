//! Core logic for ga4tag.
//!
//! Everything that makes a decision lives here: validating submitted
//! settings, gating tracking by visitor role, deciding whether a page gets
//! the tracking snippet, and rendering that snippet safely. The host-facing
//! glue (settings storage, sessions, lifecycle hooks) is modelled through
//! the adapter traits of `ga4tag-types` and the hook registry.

#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![forbid(unsafe_code)]

pub mod app;
pub mod escape;
pub mod extensions;
pub mod extract;
pub mod hooks;
pub mod inject;
pub mod middleware;
pub mod nonce;
pub mod prelude;
pub mod role_gate;
pub mod roles;
pub mod settings;
pub mod tracking;
pub mod validate;

pub use app::{App, AppOpts, AppState};
pub use extract::{Auth, CurrentVisitor};
pub use hooks::{HookContext, HookRegistry, HookResult, LifecycleEvent};
pub use inject::{should_inject, TrackingSnippet};
pub use role_gate::has_excluded_role;
pub use validate::{validate_measurement_id, validate_roles, MeasurementId, ValidationError};

// vim: ts=4
