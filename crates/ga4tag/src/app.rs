//! App builder - constructs and runs the ga4tag application

use std::sync::Arc;

use axum::Router;

use crate::prelude::*;
use crate::session_adapter::SessionAdapter;
use crate::settings::service::SettingsService;
use crate::settings::SettingsRegistry;
use crate::settings_adapter::SettingsAdapter;
use crate::{plugin, routes, webserver};
pub use ga4tag_core::app::{App, AppOpts, AppState, VERSION};
use ga4tag_core::extensions::Extensions;
use ga4tag_core::hooks::HookRegistry;
use ga4tag_core::nonce::NonceService;
use ga4tag_core::roles::RoleRegistry;
use ga4tag_admin::AdminTemplates;

#[derive(Default)]
struct Adapters {
	settings_adapter: Option<Arc<dyn SettingsAdapter>>,
	session_adapter: Option<Arc<dyn SessionAdapter>>,
}

pub struct AppBuilder {
	opts: AppOpts,
	secret: Option<Box<str>>,
	roles: RoleRegistry,
	adapters: Adapters,
	site_router: Option<Router<App>>,
}

impl AppBuilder {
	pub fn new() -> Self {
		// A subscriber may already be installed by the embedding host or a test
		let _ = tracing_subscriber::fmt()
			.with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
			.with_target(false)
			.try_init();
		AppBuilder {
			opts: AppOpts::default(),
			secret: None,
			roles: RoleRegistry::with_defaults(),
			adapters: Adapters::default(),
			site_router: None,
		}
	}

	// Opts
	pub fn listen(&mut self, listen: impl Into<Box<str>>) -> &mut Self {
		self.opts.listen = listen.into();
		self
	}
	pub fn admin_prefix(&mut self, admin_prefix: impl Into<Box<str>>) -> &mut Self {
		self.opts.admin_prefix = admin_prefix.into();
		self
	}
	pub fn session_cookie(&mut self, session_cookie: impl Into<Box<str>>) -> &mut Self {
		self.opts.session_cookie = session_cookie.into();
		self
	}
	pub fn settings_cache_size(&mut self, size: usize) -> &mut Self {
		self.opts.settings_cache_size = size;
		self
	}
	/// Server secret the anti-forgery tokens are derived from
	pub fn secret(&mut self, secret: impl Into<Box<str>>) -> &mut Self {
		self.secret = Some(secret.into());
		self
	}
	/// Register a site-specific role in addition to the standard ones
	pub fn role(&mut self, slug: &str, name: &str, capabilities: &[&str]) -> ClResult<&mut Self> {
		self.roles.add(slug, name, capabilities)?;
		Ok(self)
	}
	/// Routes serving the public pages of the site
	pub fn site_router(&mut self, router: Router<App>) -> &mut Self {
		self.site_router = Some(router);
		self
	}

	// Adapters
	pub fn settings_adapter(&mut self, settings_adapter: Arc<dyn SettingsAdapter>) -> &mut Self {
		self.adapters.settings_adapter = Some(settings_adapter);
		self
	}
	pub fn session_adapter(&mut self, session_adapter: Arc<dyn SessionAdapter>) -> &mut Self {
		self.adapters.session_adapter = Some(session_adapter);
		self
	}

	/// Assemble the app state without starting the web server
	pub async fn build(&mut self) -> ClResult<App> {
		let prefix = self.opts.admin_prefix.trim_end_matches('/');
		if !prefix.starts_with('/') {
			error!("FATAL: Invalid admin prefix: {:?}", self.opts.admin_prefix);
			return Err(Error::ConfigError(format!(
				"Admin prefix must be a non-root path, got {:?}",
				self.opts.admin_prefix
			)));
		}

		let Some(settings_adapter) = self.adapters.settings_adapter.clone() else {
			error!("FATAL: No settings adapter configured");
			return Err(Error::Internal("No settings adapter configured".to_string()));
		};
		let Some(session_adapter) = self.adapters.session_adapter.clone() else {
			error!("FATAL: No session adapter configured");
			return Err(Error::Internal("No session adapter configured".to_string()));
		};
		let nonces = match &self.secret {
			Some(secret) => NonceService::new(secret)?,
			None => {
				warn!("No server secret configured, generating an ephemeral one");
				NonceService::new(&ga4tag_types::utils::random_secret())?
			}
		};

		// Register lifecycle hooks
		let mut hooks = HookRegistry::new();
		plugin::register(&mut hooks)?;

		// Initialize settings registry and service
		let mut settings_registry = SettingsRegistry::new();
		hooks.run_settings_init(&mut settings_registry)?;
		info!("Registered {} settings", settings_registry.len());

		let roles = Arc::new(self.roles.clone());
		let settings_service = Arc::new(SettingsService::new(
			Arc::new(settings_registry.freeze()),
			roles.clone(),
			settings_adapter,
			self.opts.settings_cache_size,
		));

		// Validate required settings are configured
		settings_service.validate_required_settings().await?;
		info!("Settings subsystem initialized and validated");

		// Build extensions map for feature-specific state
		let mut extensions = Extensions::new();
		extensions.insert(AdminTemplates::new()?);

		let app: App = Arc::new(AppState {
			opts: self.opts.clone(),
			session_adapter,

			// Settings
			settings: settings_service,

			roles,
			hooks: Arc::new(hooks),
			nonces,

			// Extensions
			extensions,
		});

		Ok(app)
	}

	/// Build the app together with its router
	pub async fn build_router(&mut self) -> ClResult<(App, Router)> {
		let app = self.build().await?;
		let site_router = self.site_router.take().unwrap_or_default();
		let router = routes::init(app.clone(), site_router);
		Ok((app, router))
	}

	pub async fn run(mut self) -> ClResult<()> {
		info!("ga4tag V{}", VERSION);

		let (app, router) = self.build_router().await?;
		webserver::serve(&app, router).await
	}
}

impl Default for AppBuilder {
	fn default() -> Self {
		Self::new()
	}
}

// vim: ts=4
