//! Router assembly

use axum::{
	middleware,
	routing::{get, post},
	Router,
};
use tower_http::trace::TraceLayer;

use ga4tag_admin::{perm, plugins, settings_page};
use ga4tag_core::middleware::resolve_visitor;

use crate::prelude::*;
use crate::render;

fn init_admin(app: &App) -> Router<App> {
	let settings_path = format!("/options/{}", settings_page::PAGE_SLUG);
	Router::new()
		.route(
			&settings_path,
			get(settings_page::get_settings_page).post(settings_page::post_settings_page),
		)
		.route("/menu", get(plugins::list_menu))
		.route("/plugins", get(plugins::list_plugins))
		.route("/plugins/ga4tag/activate", post(plugins::activate_plugin))
		.route("/plugins/ga4tag/deactivate", post(plugins::deactivate_plugin))
		.route("/plugins/ga4tag/uninstall", post(plugins::uninstall_plugin))
		.route_layer(middleware::from_fn_with_state(app.clone(), perm::require_admin))
}

/// Combine the admin routes with the site routes
///
/// Every request gets its visitor resolved; HTML pages outside the admin
/// prefix pass through the footer injection.
pub fn init(app: App, site_router: Router<App>) -> Router {
	let admin_prefix = app.opts.admin_prefix.trim_end_matches('/').to_string();

	Router::new()
		.nest(&admin_prefix, init_admin(&app))
		.merge(site_router)
		.layer(middleware::from_fn_with_state(app.clone(), render::inject_footer))
		.layer(middleware::from_fn_with_state(app.clone(), resolve_visitor))
		.layer(TraceLayer::new_for_http())
		.with_state(app)
}

// vim: ts=4
