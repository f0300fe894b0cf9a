//! Admin permission middleware

use axum::{
	extract::{Request, State},
	middleware::Next,
	response::Response,
};

use ga4tag_core::extract::Auth;
use ga4tag_core::roles::MANAGE_OPTIONS;

use crate::prelude::*;

/// Middleware that checks if the current user may manage options
///
/// The capability is resolved through the role registry, so any role granted
/// `manage_options` passes. Anonymous requests are rejected by the `Auth`
/// extractor before this runs.
pub async fn require_admin(
	State(app): State<App>,
	Auth(auth_ctx): Auth,
	req: Request,
	next: Next,
) -> Result<Response, Error> {
	if !app.roles.has_capability(&auth_ctx.roles, MANAGE_OPTIONS) {
		warn!(
			subject = %auth_ctx.id_tag,
			roles = ?auth_ctx.roles,
			"Admin permission denied - {} capability required",
			MANAGE_OPTIONS
		);
		return Err(Error::Unauthorized);
	}

	Ok(next.run(req).await)
}

// vim: ts=4
