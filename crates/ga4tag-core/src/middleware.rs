//! Visitor resolution middleware

use axum::{
	body::Body,
	extract::State,
	http::{header, HeaderMap, Request, Response},
	middleware::Next,
};

use crate::extract::Auth;
use crate::prelude::*;

/// Extract the session token from a bearer header or the session cookie
pub fn session_token<'a>(headers: &'a HeaderMap, cookie_name: &str) -> Option<&'a str> {
	if let Some(token) = headers
		.get(header::AUTHORIZATION)
		.and_then(|h| h.to_str().ok())
		.and_then(|h| h.strip_prefix("Bearer "))
	{
		return Some(token.trim());
	}

	headers
		.get_all(header::COOKIE)
		.iter()
		.filter_map(|h| h.to_str().ok())
		.flat_map(|h| h.split(';'))
		.filter_map(|pair| pair.trim().split_once('='))
		.find(|(name, _)| *name == cookie_name)
		.map(|(_, value)| value.trim())
}

/// Resolve the visitor of the request and store it as `Auth`
///
/// Requests without a session, with an unknown token, or hitting a session
/// store error proceed as anonymous.
pub async fn resolve_visitor(
	State(app): State<App>,
	mut req: Request<Body>,
	next: Next,
) -> ClResult<Response<Body>> {
	let token = session_token(req.headers(), &app.opts.session_cookie).map(str::to_string);

	if let Some(token) = token.filter(|t| !t.is_empty()) {
		match app.session_adapter.resolve_session(&token).await {
			Ok(Some(auth)) => {
				debug!(subject = %auth.id_tag, "Resolved session");
				req.extensions_mut().insert(Auth(auth));
			}
			Ok(None) => debug!("Unknown session token"),
			Err(e) => warn!("Session lookup failed: {}", e),
		}
	}

	Ok(next.run(req).await)
}


// vim: ts=4
