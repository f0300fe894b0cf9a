//! Page footer injection
//!
//! Dispatches the page-render hooks for every HTML response outside the
//! admin interface and places their output right before `</body>`.

use axum::{
	body::{to_bytes, Body, HttpBody},
	extract::{Request, State},
	http::{header, HeaderMap, Response},
	middleware::Next,
	response::IntoResponse,
};

use ga4tag_core::extract::CurrentVisitor;
use ga4tag_core::hooks::{HookContext, LifecycleEvent};
use ga4tag_core::inject::inject_into_html;

use crate::prelude::*;

/// Pages larger than this are passed through untouched
pub const MAX_PAGE_SIZE: usize = 8 * 1024 * 1024;

fn is_injectable(headers: &HeaderMap) -> bool {
	let is_html = headers
		.get(header::CONTENT_TYPE)
		.and_then(|v| v.to_str().ok())
		.is_some_and(|v| v.trim_start().to_ascii_lowercase().starts_with("text/html"));
	let is_encoded = headers.contains_key(header::CONTENT_ENCODING);
	is_html && !is_encoded
}

/// Size of a response body, from the body itself or its `Content-Length`
fn body_size(headers: &HeaderMap, body: &Body) -> Option<u64> {
	body.size_hint().upper().or_else(|| {
		headers
			.get(header::CONTENT_LENGTH)
			.and_then(|v| v.to_str().ok())
			.and_then(|v| v.parse::<u64>().ok())
	})
}

pub async fn inject_footer(
	State(app): State<App>,
	CurrentVisitor(visitor): CurrentVisitor,
	req: Request,
	next: Next,
) -> Response<Body> {
	let path = req.uri().path().to_string();
	let is_admin_context = app.is_admin_path(&path);

	let res = next.run(req).await;
	if is_admin_context || !res.status().is_success() || !is_injectable(res.headers()) {
		return res;
	}
	match body_size(res.headers(), res.body()) {
		Some(size) if size <= MAX_PAGE_SIZE as u64 => {}
		Some(size) => {
			debug!("Page of {} bytes is too large, not injecting", size);
			return res;
		}
		None => {
			debug!("Page size unknown, not injecting");
			return res;
		}
	}

	let ctx = HookContext { visitor, is_admin_context, path };
	let footer = match app.hooks.dispatch(&app, LifecycleEvent::PageRender, ctx).await {
		Ok(result) => result.footer_html,
		Err(e) => {
			warn!("Page render hooks failed: {}", e);
			return res;
		}
	};
	if footer.is_empty() {
		return res;
	}

	let (mut parts, body) = res.into_parts();
	let bytes = match to_bytes(body, MAX_PAGE_SIZE).await {
		Ok(bytes) => bytes,
		Err(e) => {
			warn!("Failed to read page body: {}", e);
			return Error::Internal(format!("Failed to read page body: {}", e)).into_response();
		}
	};
	let Ok(html) = std::str::from_utf8(&bytes) else {
		debug!("Page is not valid UTF-8, not injecting");
		return Response::from_parts(parts, Body::from(bytes));
	};

	let page = inject_into_html(html, &footer.concat());
	parts.headers.remove(header::CONTENT_LENGTH);
	Response::from_parts(parts, Body::from(page))
}


// vim: ts=4
