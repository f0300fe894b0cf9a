//! Plugin listing, admin menu and lifecycle actions
//!
//! The listing and the menu are assembled from the `MenuBuild` hook, so they
//! disappear once the feature is deactivated. Every lifecycle action needs
//! an anti-forgery token issued for that action, handed out by the listing.

use axum::{extract::State, Form, Json};
use serde::{Deserialize, Serialize};

use ga4tag_core::app::VERSION;
use ga4tag_core::extract::Auth;
use ga4tag_core::hooks::{ActionLink, HookContext, LifecycleEvent, MenuEntry};
use ga4tag_core::roles::MANAGE_OPTIONS;
use ga4tag_types::types::ApiResponse;

use crate::prelude::*;
use crate::settings_page::{settings_path, MENU_TITLE, NONCE_FIELD, PAGE_TITLE};

pub const PLUGIN_NAME: &str = "Integrate GA4 Google Analytics";

/// Menu entry of the settings page
pub fn menu_entry(app: &App) -> MenuEntry {
	MenuEntry {
		page_title: PAGE_TITLE.into(),
		menu_title: MENU_TITLE.into(),
		path: settings_path(app),
		capability: MANAGE_OPTIONS,
	}
}

/// "Settings" link shown in the plugin listing
pub fn settings_link(app: &App) -> ActionLink {
	ActionLink { label: "Settings".into(), href: settings_path(app) }
}

// LifecycleAction //
//*****************//
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleAction {
	Activate,
	Deactivate,
	Uninstall,
}

impl LifecycleAction {
	/// Action name the anti-forgery token is bound to
	pub fn nonce_action(self) -> &'static str {
		match self {
			LifecycleAction::Activate => "ga4tag_activate",
			LifecycleAction::Deactivate => "ga4tag_deactivate",
			LifecycleAction::Uninstall => "ga4tag_uninstall",
		}
	}
}

/// Form body of a lifecycle action post
#[derive(Debug, Default, Deserialize)]
pub struct LifecycleForm {
	#[serde(rename = "ga4tag_nonce")]
	pub nonce: Option<String>,
}

fn verify_lifecycle_nonce(
	app: &App,
	auth: &AuthCtx,
	action: LifecycleAction,
	form: &LifecycleForm,
) -> ClResult<()> {
	let nonce = form.nonce.as_deref().ok_or_else(|| {
		warn!(subject = %auth.id_tag, "{:?} rejected: missing {}", action, NONCE_FIELD);
		Error::InvalidToken
	})?;
	app.nonces.verify(nonce, action.nonce_action(), &auth.id_tag).inspect_err(|_| {
		warn!(subject = %auth.id_tag, "{:?} rejected: invalid nonce", action);
	})
}

/// Tokens for the lifecycle actions, bound to the caller
#[derive(Debug, Serialize)]
pub struct LifecycleNonces {
	pub activate: String,
	pub deactivate: String,
	pub uninstall: String,
}

impl LifecycleNonces {
	fn issue(app: &App, auth: &AuthCtx) -> ClResult<Self> {
		let create =
			|action: LifecycleAction| app.nonces.create(action.nonce_action(), &auth.id_tag);
		Ok(Self {
			activate: create(LifecycleAction::Activate)?,
			deactivate: create(LifecycleAction::Deactivate)?,
			uninstall: create(LifecycleAction::Uninstall)?,
		})
	}
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginInfo {
	pub name: &'static str,
	pub version: &'static str,
	pub active: bool,
	pub action_links: Vec<ActionLink>,
	/// Tokens to submit as `ga4tag_nonce` with the lifecycle actions
	pub nonces: LifecycleNonces,
}

fn admin_ctx(app: &App, auth: AuthCtx, path: &str) -> HookContext {
	HookContext {
		visitor: Visitor::Authenticated(auth),
		is_admin_context: true,
		path: format!("{}{}", app.opts.admin_prefix.trim_end_matches('/'), path),
	}
}

/// GET <admin>/plugins
pub async fn list_plugins(
	State(app): State<App>,
	Auth(auth): Auth,
) -> ClResult<Json<ApiResponse<Vec<PluginInfo>>>> {
	let nonces = LifecycleNonces::issue(&app, &auth)?;
	let ctx = admin_ctx(&app, auth, "/plugins");
	let res = app.hooks.dispatch(&app, LifecycleEvent::MenuBuild, ctx).await?;

	let plugin = PluginInfo {
		name: PLUGIN_NAME,
		version: VERSION,
		active: app.hooks.is_active(),
		action_links: res.action_links,
		nonces,
	};
	Ok(Json(ApiResponse::new(vec![plugin])))
}

/// GET <admin>/menu
///
/// Entries the caller lacks the capability for are left out.
pub async fn list_menu(
	State(app): State<App>,
	Auth(auth): Auth,
) -> ClResult<Json<ApiResponse<Vec<MenuEntry>>>> {
	let roles = auth.roles.clone();
	let ctx = admin_ctx(&app, auth, "/menu");
	let res = app.hooks.dispatch(&app, LifecycleEvent::MenuBuild, ctx).await?;

	let entries = res
		.menu_entries
		.into_iter()
		.filter(|entry| app.roles.has_capability(&roles, entry.capability))
		.collect();
	Ok(Json(ApiResponse::new(entries)))
}

/// POST <admin>/plugins/ga4tag/activate
pub async fn activate_plugin(
	State(app): State<App>,
	Auth(auth): Auth,
	Form(form): Form<LifecycleForm>,
) -> ClResult<Json<ApiResponse<bool>>> {
	verify_lifecycle_nonce(&app, &auth, LifecycleAction::Activate, &form)?;
	info!(subject = %auth.id_tag, "Activating {}", PLUGIN_NAME);
	app.hooks.activate();
	Ok(Json(ApiResponse::new(app.hooks.is_active())))
}

/// POST <admin>/plugins/ga4tag/deactivate
///
/// Stored settings are kept; page renders stop emitting the snippet.
pub async fn deactivate_plugin(
	State(app): State<App>,
	Auth(auth): Auth,
	Form(form): Form<LifecycleForm>,
) -> ClResult<Json<ApiResponse<bool>>> {
	verify_lifecycle_nonce(&app, &auth, LifecycleAction::Deactivate, &form)?;
	info!(subject = %auth.id_tag, "Deactivating {}", PLUGIN_NAME);
	let ctx = admin_ctx(&app, auth, "/plugins");
	app.hooks.dispatch(&app, LifecycleEvent::Deactivate, ctx).await?;
	Ok(Json(ApiResponse::new(app.hooks.is_active())))
}

/// POST <admin>/plugins/ga4tag/uninstall
///
/// Deletes the stored settings. The feature is deactivated first if needed.
pub async fn uninstall_plugin(
	State(app): State<App>,
	Auth(auth): Auth,
	Form(form): Form<LifecycleForm>,
) -> ClResult<Json<ApiResponse<bool>>> {
	verify_lifecycle_nonce(&app, &auth, LifecycleAction::Uninstall, &form)?;
	info!(subject = %auth.id_tag, "Uninstalling {}", PLUGIN_NAME);
	if app.hooks.is_active() {
		app.hooks
			.dispatch(&app, LifecycleEvent::Deactivate, admin_ctx(&app, auth.clone(), "/plugins"))
			.await?;
	}
	let ctx = admin_ctx(&app, auth, "/plugins");
	app.hooks.dispatch(&app, LifecycleEvent::Uninstall, ctx).await?;
	Ok(Json(ApiResponse::new(app.hooks.is_active())))
}

// vim: ts=4
