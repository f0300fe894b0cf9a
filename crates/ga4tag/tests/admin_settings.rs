//! Settings page access control and form handling

mod common;

use axum::http::StatusCode;
use common::*;
use ga4tag::settings_adapter::SettingsAdapter;
use ga4tag::tracking::{TrackingConfig, EXCLUDED_ROLES_KEY, MEASUREMENT_ID_KEY};

const SETTINGS_PATH: &str = "/admin/options/ga4tag";

async fn admin_nonce(t: &TestApp) -> String {
	let (status, body) = t.send(get_req(SETTINGS_PATH, Some(ADMIN_TOKEN))).await;
	assert_eq!(status, StatusCode::OK);
	extract_nonce(&body)
}

fn form<'a>(nonce: &'a str, measurement_id: &'a str, roles: &[&'a str]) -> Vec<(&'a str, &'a str)> {
	let mut fields = vec![
		("ga4tag_nonce", nonce),
		("option_page", "ga4tag_settings"),
		("action", "update"),
		("measurement_id", measurement_id),
	];
	fields.extend(roles.iter().map(|role| ("excluded_roles[]", *role)));
	fields
}

#[tokio::test]
async fn test_settings_page_renders_for_admin() {
	let t = test_app().await;
	t.configure("G-ABC123", &["editor"]).await;

	let (status, body) = t.send(get_req(SETTINGS_PATH, Some(ADMIN_TOKEN))).await;
	assert_eq!(status, StatusCode::OK);
	assert!(body.contains("Integrate GA4 Google Analytics Settings"));
	assert!(body.contains("value=\"G-ABC123\""));
	assert_eq!(body.matches("name=\"excluded_roles[]\"").count(), 5);
	assert_eq!(body.matches("checked=\"checked\"").count(), 1);
	assert!(!extract_nonce(&body).is_empty());
	assert!(body.contains("How to find your Google Analytics GA4 Measurement ID"));
}

#[tokio::test]
async fn test_settings_page_requires_capability() {
	let t = test_app().await;

	let (status, _) = t.send(get_req(SETTINGS_PATH, None)).await;
	assert_eq!(status, StatusCode::FORBIDDEN);

	let (status, _) = t.send(get_req(SETTINGS_PATH, Some(EDITOR_TOKEN))).await;
	assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_valid_submission_is_saved() {
	let t = test_app().await;
	let nonce = admin_nonce(&t).await;

	let fields = form(&nonce, "  G-NEW999 ", &["subscriber", "ghost", "subscriber"]);
	let (status, body) = t.send(post_form(SETTINGS_PATH, Some(ADMIN_TOKEN), &fields)).await;
	assert_eq!(status, StatusCode::OK);
	assert!(body.contains("Settings saved."));
	assert!(body.contains("value=\"G-NEW999\""));

	let config = TrackingConfig::load(&t.app.settings).await.unwrap();
	assert_eq!(config.measurement_id, "G-NEW999");
	assert_eq!(config.excluded_roles, vec!["subscriber"]);
}

#[tokio::test]
async fn test_invalid_id_reported_and_cleared() {
	let t = test_app().await;
	t.configure("G-ABC123", &[]).await;
	let nonce = admin_nonce(&t).await;

	let fields = form(&nonce, "UA-12345-1", &[]);
	let (status, body) = t.send(post_form(SETTINGS_PATH, Some(ADMIN_TOKEN), &fields)).await;
	assert_eq!(status, StatusCode::OK);
	assert!(body.contains("Measurement ID must begin with G- followed by a string of letters and numbers."));
	assert!(!body.contains("Settings saved."));
	assert_eq!(t.app.settings.get_string(MEASUREMENT_ID_KEY).await.unwrap(), "");

	let fields = form(&nonce, "   ", &[]);
	let (_, body) = t.send(post_form(SETTINGS_PATH, Some(ADMIN_TOKEN), &fields)).await;
	assert!(body.contains("Measurement ID is required."));
}

#[tokio::test]
async fn test_bad_nonce_rejected_without_change() {
	let t = test_app().await;
	t.configure("G-ABC123", &[]).await;

	let fields = form("forged", "G-EVIL1", &["administrator"]);
	let (status, _) = t.send(post_form(SETTINGS_PATH, Some(ADMIN_TOKEN), &fields)).await;
	assert_eq!(status, StatusCode::FORBIDDEN);

	let mut fields = form("", "G-EVIL1", &[]);
	fields.retain(|(name, _)| *name != "ga4tag_nonce");
	let (status, _) = t.send(post_form(SETTINGS_PATH, Some(ADMIN_TOKEN), &fields)).await;
	assert_eq!(status, StatusCode::FORBIDDEN);

	let config = TrackingConfig::load(&t.app.settings).await.unwrap();
	assert_eq!(config.measurement_id, "G-ABC123");
	assert!(config.excluded_roles.is_empty());
}

#[tokio::test]
async fn test_nonce_bound_to_session() {
	let t = test_app().await;
	let nonce = admin_nonce(&t).await;

	let fields = form(&nonce, "G-ABC123", &[]);
	let (status, _) = t.send(post_form(SETTINGS_PATH, Some(SECOND_ADMIN_TOKEN), &fields)).await;
	assert_eq!(status, StatusCode::FORBIDDEN);
	assert!(t.settings.read_setting(MEASUREMENT_ID_KEY).await.unwrap().is_none());
}

#[tokio::test]
async fn test_submission_without_capability_rejected() {
	let t = test_app().await;
	let nonce = t.app.nonces.create("ga4tag_settings", "erin").unwrap();

	let fields = form(&nonce, "G-ABC123", &[]);
	let (status, _) = t.send(post_form(SETTINGS_PATH, Some(EDITOR_TOKEN), &fields)).await;
	assert_eq!(status, StatusCode::FORBIDDEN);

	let (status, _) = t.send(post_form(SETTINGS_PATH, None, &fields)).await;
	assert_eq!(status, StatusCode::FORBIDDEN);

	assert!(t.settings.read_setting(MEASUREMENT_ID_KEY).await.unwrap().is_none());
	assert!(t.settings.read_setting(EXCLUDED_ROLES_KEY).await.unwrap().is_none());
}

#[tokio::test]
async fn test_wrong_form_envelope_rejected() {
	let t = test_app().await;
	let nonce = admin_nonce(&t).await;

	let mut fields = form(&nonce, "G-ABC123", &[]);
	fields[1] = ("option_page", "general");
	let (status, _) = t.send(post_form(SETTINGS_PATH, Some(ADMIN_TOKEN), &fields)).await;
	assert_eq!(status, StatusCode::FORBIDDEN);
	assert!(t.settings.read_setting(MEASUREMENT_ID_KEY).await.unwrap().is_none());
}

// vim: ts=4
