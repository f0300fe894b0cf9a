//! Snippet injection into site pages

mod common;

use axum::http::StatusCode;
use common::*;

/// Loader URL as it appears in the `src` attribute
const LOADER: &str = "https://www.googletagmanager.com/gtag/js?id&#x3D;G-ABC123";

#[tokio::test]
async fn test_anonymous_visitor_gets_snippet() {
	let t = test_app().await;
	t.configure("G-ABC123", &["subscriber"]).await;

	let (status, body) = t.send(get_req("/", None)).await;
	assert_eq!(status, StatusCode::OK);
	assert!(body.contains(LOADER));
	assert!(body.contains("gtag('config', 'G-ABC123');"));
	assert_eq!(body.matches("<script").count(), 2);

	// Snippet sits right before the closing body tag
	let snippet_at = body.find("<script").unwrap();
	assert!(snippet_at > body.find("<h1>Home</h1>").unwrap());
	assert!(body.trim_end().ends_with("</script>\n</body></html>"));
}

#[tokio::test]
async fn test_no_measurement_id_leaves_page_unchanged() {
	let t = test_app().await;

	let (status, body) = t.send(get_req("/", None)).await;
	assert_eq!(status, StatusCode::OK);
	assert_eq!(body, HOME_PAGE);
}

#[tokio::test]
async fn test_excluded_role_gets_no_snippet() {
	let t = test_app().await;
	t.configure("G-ABC123", &["subscriber"]).await;

	let (_, body) = t.send(get_req("/", Some(SUBSCRIBER_TOKEN))).await;
	assert_eq!(body, HOME_PAGE);

	let (_, body) = t.send(get_req("/", Some(EDITOR_TOKEN))).await;
	assert!(body.contains(LOADER));
}

#[tokio::test]
async fn test_unknown_session_is_anonymous() {
	let t = test_app().await;
	t.configure("G-ABC123", &["subscriber"]).await;

	let (status, body) = t.send(get_req("/", Some("no-such-token"))).await;
	assert_eq!(status, StatusCode::OK);
	assert!(body.contains(LOADER));
}

#[tokio::test]
async fn test_non_html_response_untouched() {
	let t = test_app().await;
	t.configure("G-ABC123", &[]).await;

	let (status, body) = t.send(get_req("/api/data", None)).await;
	assert_eq!(status, StatusCode::OK);
	assert_eq!(body, r#"{"ok":true}"#);
}

#[tokio::test]
async fn test_admin_pages_never_injected() {
	let t = test_app().await;
	t.configure("G-ABC123", &[]).await;

	let (status, body) = t.send(get_req("/admin/options/ga4tag", Some(ADMIN_TOKEN))).await;
	assert_eq!(status, StatusCode::OK);
	assert!(!body.contains("googletagmanager"));
	assert!(body.contains("value=\"G-ABC123\""));
}

#[tokio::test]
async fn test_missing_page_not_injected() {
	let t = test_app().await;
	t.configure("G-ABC123", &[]).await;

	let (status, body) = t.send(get_req("/missing", None)).await;
	assert_eq!(status, StatusCode::NOT_FOUND);
	assert!(!body.contains("googletagmanager"));
}

#[tokio::test]
async fn test_page_over_size_limit_passes_through() {
	let t = test_app().await;
	t.configure("G-ABC123", &[]).await;

	let (status, body) = t.send(get_req("/large", None)).await;
	assert_eq!(status, StatusCode::OK);
	assert_eq!(body.len(), LARGE_PAGE_SIZE);
	assert!(!body.contains("googletagmanager"));
	assert!(body.ends_with("</body></html>"));
}

// vim: ts=4
