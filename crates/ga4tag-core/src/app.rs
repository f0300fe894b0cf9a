//! App state type

use std::sync::Arc;

use ga4tag_types::session_adapter::SessionAdapter;

use crate::extensions::Extensions;
use crate::hooks::HookRegistry;
use crate::nonce::NonceService;
use crate::prelude::*;
use crate::roles::RoleRegistry;
use crate::settings::service::SettingsService;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub struct AppState {
	pub opts: AppOpts,
	pub session_adapter: Arc<dyn SessionAdapter>,

	// Settings subsystem
	pub settings: Arc<SettingsService>,

	pub roles: Arc<RoleRegistry>,
	pub hooks: Arc<HookRegistry>,
	pub nonces: NonceService,

	// Type-erased extension map for feature-specific state
	pub extensions: Extensions,
}

impl AppState {
	/// Get a registered extension by type. Returns error if not found.
	pub fn ext<T: Send + Sync + 'static>(&self) -> ClResult<&T> {
		self.extensions.get::<T>().ok_or_else(|| {
			Error::Internal(format!("Extension {} not registered", std::any::type_name::<T>()))
		})
	}

	/// Whether a request path belongs to the administrative interface
	pub fn is_admin_path(&self, path: &str) -> bool {
		let prefix = self.opts.admin_prefix.trim_end_matches('/');
		path == prefix || path.strip_prefix(prefix).is_some_and(|rest| rest.starts_with('/'))
	}
}

pub type App = Arc<AppState>;

#[derive(Debug, Clone)]
pub struct AppOpts {
	pub listen: Box<str>,
	/// Path prefix of the administrative interface
	pub admin_prefix: Box<str>,
	/// Name of the session cookie the host sets
	pub session_cookie: Box<str>,
	/// Capacity of the settings cache
	pub settings_cache_size: usize,
}

impl Default for AppOpts {
	fn default() -> Self {
		Self {
			listen: "127.0.0.1:8080".into(),
			admin_prefix: "/admin".into(),
			session_cookie: "ga4tag_session".into(),
			settings_cache_size: 64,
		}
	}
}

// vim: ts=4
