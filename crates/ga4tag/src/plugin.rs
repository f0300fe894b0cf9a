//! Lifecycle hook callbacks of the tracking feature
//!
//! Thin adapters between the host events and the core logic: settings
//! registration, the admin menu entry, snippet rendering, and cleanup.

use ga4tag_admin::plugins::{menu_entry, settings_link};
use ga4tag_core::hooks::{HookContext, HookRegistry, HookResult, LifecycleEvent};
use ga4tag_core::inject::TrackingSnippet;
use ga4tag_core::tracking::{self, TrackingConfig};

use crate::prelude::*;

/// Register every lifecycle callback of the feature
pub fn register(hooks: &mut HookRegistry) -> ClResult<()> {
	hooks.register_settings_init("ga4tag.settings", tracking::register_settings);
	hooks.register(LifecycleEvent::MenuBuild, "ga4tag.menu", on_menu_build)?;
	hooks.register(LifecycleEvent::PageRender, "ga4tag.snippet", on_page_render)?;
	hooks.register(LifecycleEvent::Deactivate, "ga4tag.deactivate", on_deactivate)?;
	hooks.register(LifecycleEvent::Uninstall, "ga4tag.uninstall", on_uninstall)?;
	Ok(())
}

async fn on_menu_build(app: App, _ctx: HookContext) -> ClResult<HookResult> {
	Ok(HookResult {
		menu_entries: vec![menu_entry(&app)],
		action_links: vec![settings_link(&app)],
		..Default::default()
	})
}

/// Render the tracking snippet for a page, if it applies
///
/// Never fails: a settings read error means no snippet.
async fn on_page_render(app: App, ctx: HookContext) -> ClResult<HookResult> {
	let config = match TrackingConfig::load(&app.settings).await {
		Ok(config) => config,
		Err(e) => {
			warn!("Failed to load tracking settings, not injecting: {}", e);
			return Ok(HookResult::default());
		}
	};

	let snippet = TrackingSnippet::for_render(
		&config.measurement_id,
		&config.excluded_roles,
		&ctx.visitor,
		ctx.is_admin_context,
	);
	match snippet {
		Some(snippet) => {
			debug!(path = %ctx.path, "Injecting tracking snippet");
			Ok(HookResult::footer(snippet.render()))
		}
		None => Ok(HookResult::default()),
	}
}

async fn on_deactivate(_app: App, _ctx: HookContext) -> ClResult<HookResult> {
	info!("Tracking disabled, stored settings kept");
	Ok(HookResult::default())
}

async fn on_uninstall(app: App, _ctx: HookContext) -> ClResult<HookResult> {
	tracking::delete_settings(&app.settings).await?;
	info!("Tracking settings removed");
	Ok(HookResult::default())
}

// vim: ts=4
