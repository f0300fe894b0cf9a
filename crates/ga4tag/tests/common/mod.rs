//! Shared test setup for the router-level tests
//!
//! Builds an app with an in-memory settings store, a fixed session table
//! and a tiny site with one HTML page and one JSON endpoint.

#![allow(dead_code)]

use std::sync::Arc;

use axum::{
	body::{to_bytes, Body},
	http::{header, Request, StatusCode},
	response::Html,
	routing::get,
	Json, Router,
};
use tower::ServiceExt;

use ga4tag::session_adapter::{StaticSession, StaticSessionAdapter};
use ga4tag::settings_adapter::MemorySettingsAdapter;
use ga4tag::tracking::{self, SettingsSubmission};
use ga4tag::{App, AppBuilder};

pub const SECRET: &str = "test-secret-0123456789abcdef";

pub const ADMIN_TOKEN: &str = "admin-token";
pub const SECOND_ADMIN_TOKEN: &str = "second-admin-token";
pub const EDITOR_TOKEN: &str = "editor-token";
pub const SUBSCRIBER_TOKEN: &str = "subscriber-token";

pub const HOME_PAGE: &str = "<html><head><title>Home</title></head><body><h1>Home</h1></body></html>";

/// Size of the page served at `/large`, above the injection limit
pub const LARGE_PAGE_SIZE: usize = 9 * 1024 * 1024;

fn large_page() -> String {
	let mut page = String::with_capacity(LARGE_PAGE_SIZE);
	page.push_str("<html><body>");
	page.push_str(&"x".repeat(LARGE_PAGE_SIZE - "<html><body></body></html>".len()));
	page.push_str("</body></html>");
	page
}

pub struct TestApp {
	pub app: App,
	pub router: Router,
	pub settings: Arc<MemorySettingsAdapter>,
}

/// Common test setup helper
pub fn setup_test_logging() {
	let _ = tracing_subscriber::fmt()
		.with_test_writer()
		.with_max_level(tracing::Level::DEBUG)
		.try_init();
}

fn session(token: &str, id_tag: &str, roles: &[&str]) -> StaticSession {
	StaticSession {
		token: token.to_string(),
		id_tag: id_tag.to_string(),
		roles: roles.iter().map(ToString::to_string).collect(),
	}
}

pub async fn test_app() -> TestApp {
	setup_test_logging();

	let settings = Arc::new(MemorySettingsAdapter::new());
	let sessions = StaticSessionAdapter::new(vec![
		session(ADMIN_TOKEN, "alice", &["administrator"]),
		session(SECOND_ADMIN_TOKEN, "bob", &["administrator"]),
		session(EDITOR_TOKEN, "erin", &["editor"]),
		session(SUBSCRIBER_TOKEN, "sam", &["subscriber"]),
	]);
	let site = Router::new()
		.route("/", get(|| async { Html(HOME_PAGE) }))
		.route("/large", get(|| async { Html(large_page()) }))
		.route("/api/data", get(|| async { Json(serde_json::json!({ "ok": true })) }));

	let mut builder = AppBuilder::new();
	builder
		.secret(SECRET)
		.settings_adapter(settings.clone())
		.session_adapter(Arc::new(sessions))
		.site_router(site);
	let (app, router) = builder.build_router().await.unwrap();

	TestApp { app, router, settings }
}

impl TestApp {
	/// Store tracking settings as an administrator would
	pub async fn configure(&self, measurement_id: &str, excluded_roles: &[&str]) {
		let submission = SettingsSubmission {
			measurement_id: measurement_id.to_string(),
			excluded_roles: Some(excluded_roles.iter().map(ToString::to_string).collect()),
		};
		let (_, errors) =
			tracking::save_settings(&self.app.settings, &submission, &["administrator"])
				.await
				.unwrap();
		assert!(errors.is_empty());
	}

	pub async fn send(&self, req: Request<Body>) -> (StatusCode, String) {
		let res = self.router.clone().oneshot(req).await.unwrap();
		let status = res.status();
		let body = to_bytes(res.into_body(), usize::MAX).await.unwrap();
		(status, String::from_utf8(body.to_vec()).unwrap())
	}
}

/// GET request, authenticated through the session cookie when a token is given
pub fn get_req(path: &str, token: Option<&str>) -> Request<Body> {
	let mut req = Request::builder().method("GET").uri(path);
	if let Some(token) = token {
		req = req.header(header::COOKIE, format!("theme=dark; ga4tag_session={}", token));
	}
	req.body(Body::empty()).unwrap()
}

/// POST request with a bearer token and a form body
pub fn post_form(path: &str, token: Option<&str>, fields: &[(&str, &str)]) -> Request<Body> {
	let mut req = Request::builder()
		.method("POST")
		.uri(path)
		.header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
	if let Some(token) = token {
		req = req.header(header::AUTHORIZATION, format!("Bearer {}", token));
	}
	req.body(Body::from(serde_urlencoded::to_string(fields).unwrap())).unwrap()
}

/// POST request authenticated only through the session cookie
pub fn post_form_with_cookie(path: &str, token: &str, fields: &[(&str, &str)]) -> Request<Body> {
	Request::builder()
		.method("POST")
		.uri(path)
		.header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
		.header(header::COOKIE, format!("ga4tag_session={}", token))
		.body(Body::from(serde_urlencoded::to_string(fields).unwrap()))
		.unwrap()
}

/// Pull the anti-forgery token out of a rendered settings page
pub fn extract_nonce(html: &str) -> String {
	let marker = "name=\"ga4tag_nonce\" value=\"";
	let start = html.find(marker).unwrap() + marker.len();
	let len = html[start..].find('"').unwrap();
	html[start..start + len].to_string()
}

// vim: ts=4
