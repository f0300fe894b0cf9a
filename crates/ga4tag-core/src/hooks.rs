//! Lifecycle hooks
//!
//! The host calls into ga4tag at a few well-defined points. Callbacks are
//! registered by name against a [`LifecycleEvent`] and run in registration
//! order when the event is dispatched.
//!
//! `SettingsInit` runs before the app exists, so its callbacks receive the
//! mutable settings registry instead of the app.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::Serialize;

use crate::prelude::*;
use crate::settings::SettingsRegistry;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecycleEvent {
	SettingsInit,
	MenuBuild,
	PageRender,
	Deactivate,
	Uninstall,
}

impl LifecycleEvent {
	pub fn name(&self) -> &'static str {
		match self {
			LifecycleEvent::SettingsInit => "on-settings-init",
			LifecycleEvent::MenuBuild => "on-menu-build",
			LifecycleEvent::PageRender => "on-page-render",
			LifecycleEvent::Deactivate => "on-deactivate",
			LifecycleEvent::Uninstall => "on-uninstall",
		}
	}

	/// Events that only fire while the feature is active
	fn requires_active(&self) -> bool {
		matches!(self, LifecycleEvent::MenuBuild | LifecycleEvent::PageRender)
	}
}

impl std::fmt::Display for LifecycleEvent {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.name())
	}
}

/// Request-derived input of a hook invocation
#[derive(Debug, Clone, Default)]
pub struct HookContext {
	pub visitor: Visitor,
	pub is_admin_context: bool,
	pub path: String,
}

/// An entry of the admin menu
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuEntry {
	pub page_title: String,
	pub menu_title: String,
	pub path: String,
	pub capability: &'static str,
}

/// A link shown next to the feature in the plugin listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionLink {
	pub label: String,
	pub href: String,
}

/// Combined output of the callbacks of one dispatch
#[derive(Debug, Clone, Default)]
pub struct HookResult {
	pub menu_entries: Vec<MenuEntry>,
	pub action_links: Vec<ActionLink>,
	/// Markup to place at the end of the page body
	pub footer_html: Vec<String>,
}

impl HookResult {
	pub fn footer(html: String) -> Self {
		Self { footer_html: vec![html], ..Default::default() }
	}

	fn merge(&mut self, other: HookResult) {
		self.menu_entries.extend(other.menu_entries);
		self.action_links.extend(other.action_links);
		self.footer_html.extend(other.footer_html);
	}
}

pub type HookFuture = Pin<Box<dyn Future<Output = ClResult<HookResult>> + Send>>;
pub type HookFn = Arc<dyn Fn(App, HookContext) -> HookFuture + Send + Sync>;
pub type SettingsInitFn = Box<dyn Fn(&mut SettingsRegistry) -> ClResult<()> + Send + Sync>;

pub struct HookRegistry {
	settings_init: Vec<(Box<str>, SettingsInitFn)>,
	hooks: HashMap<LifecycleEvent, Vec<(Box<str>, HookFn)>>,
	active: AtomicBool,
}

impl HookRegistry {
	pub fn new() -> Self {
		Self { settings_init: Vec::new(), hooks: HashMap::new(), active: AtomicBool::new(true) }
	}

	/// Register a settings-init callback
	pub fn register_settings_init<F>(&mut self, name: &str, f: F)
	where
		F: Fn(&mut SettingsRegistry) -> ClResult<()> + Send + Sync + 'static,
	{
		debug!("Registering {} hook: {}", LifecycleEvent::SettingsInit, name);
		self.settings_init.push((name.into(), Box::new(f)));
	}

	/// Register a callback for a runtime event
	pub fn register<F, Fut>(&mut self, event: LifecycleEvent, name: &str, f: F) -> ClResult<()>
	where
		F: Fn(App, HookContext) -> Fut + Send + Sync + 'static,
		Fut: Future<Output = ClResult<HookResult>> + Send + 'static,
	{
		if event == LifecycleEvent::SettingsInit {
			return Err(Error::ConfigError(format!(
				"Hook '{}': use register_settings_init for {}",
				name, event
			)));
		}
		debug!("Registering {} hook: {}", event, name);
		let hook: HookFn = Arc::new(move |app, ctx| Box::pin(f(app, ctx)));
		self.hooks.entry(event).or_default().push((name.into(), hook));
		Ok(())
	}

	/// Number of callbacks registered for an event
	pub fn count(&self, event: LifecycleEvent) -> usize {
		match event {
			LifecycleEvent::SettingsInit => self.settings_init.len(),
			event => self.hooks.get(&event).map_or(0, Vec::len),
		}
	}

	pub fn is_active(&self) -> bool {
		self.active.load(Ordering::Acquire)
	}

	pub fn activate(&self) {
		if !self.active.swap(true, Ordering::AcqRel) {
			info!("Activated");
		}
	}

	/// Run the settings-init callbacks against the registry being built
	pub fn run_settings_init(&self, registry: &mut SettingsRegistry) -> ClResult<()> {
		for (name, f) in &self.settings_init {
			debug!("Running {} hook: {}", LifecycleEvent::SettingsInit, name);
			f(registry)?;
		}
		Ok(())
	}

	/// Run the callbacks of a runtime event
	///
	/// Menu and page-render callbacks are skipped while inactive. Dispatching
	/// `Deactivate` marks the registry inactive once its callbacks ran.
	pub async fn dispatch(
		&self,
		app: &App,
		event: LifecycleEvent,
		ctx: HookContext,
	) -> ClResult<HookResult> {
		let mut result = HookResult::default();
		if event == LifecycleEvent::SettingsInit {
			return Err(Error::ConfigError(format!("{} cannot be dispatched at runtime", event)));
		}
		if event.requires_active() && !self.is_active() {
			return Ok(result);
		}

		if let Some(hooks) = self.hooks.get(&event) {
			for (name, hook) in hooks {
				debug!("Running {} hook: {}", event, name);
				result.merge(hook(app.clone(), ctx.clone()).await?);
			}
		}

		if event == LifecycleEvent::Deactivate {
			self.active.store(false, Ordering::Release);
			info!("Deactivated");
		}
		Ok(result)
	}
}

impl Default for HookRegistry {
	fn default() -> Self {
		Self::new()
	}
}


// vim: ts=4
